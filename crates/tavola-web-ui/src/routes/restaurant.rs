use axum::extract::{Path, State};
use axum::response::IntoResponse;
use maud::html;
use tavola_api::{Anonymous, RequestDescriptor};
use tavola_core::restaurant::Restaurant;

use super::Maud;
use crate::error::RequestResult;
use crate::session::SessionContext;
use crate::{SharedState, UiState};

pub async fn get_restaurant(
    state: State<SharedState>,
    session: SessionContext,
    Path(id): Path<String>,
) -> RequestResult<impl IntoResponse> {
    // The backend takes the id as the request body
    let restaurant = state
        .api
        .request::<Restaurant, _>(
            &Anonymous,
            RequestDescriptor::post("restaurants/id", id.clone()),
        )
        .await;

    let restaurant = match restaurant {
        Ok(restaurant) => restaurant,
        Err(err) => {
            let content = html! {
                div ."o-card -error" {
                    h2 ."o-card__title" { "Error" }
                    p { (err) " " (id) }
                }
            };
            return Ok(Maud(state.render_html_page("Error", &session, content)));
        }
    };

    let content = html! {
        section ."o-card o-restaurantHeader" {
            div ."o-restaurantHeader__top" {
                div {
                    h1 ."o-restaurantHeader__name" { (restaurant.name) }
                    @if let Some(description) = &restaurant.description {
                        p ."o-restaurantHeader__description" { (description) }
                    }
                }
                (UiState::render_badge(restaurant.status_label(), restaurant.opened))
            }
            div ."o-restaurantHeader__cuisines" {
                @for cuisine in &restaurant.cuisine {
                    span ."u-tag -outline" { (cuisine) }
                }
            }
            p ."o-restaurantHeader__rating" { "★ " (restaurant.rating_summary()) }
        }

        div ."o-restaurantInfo" {
            section ."o-card o-restaurantInfo__images" {
                h2 ."o-card__title" { "Restaurant Images" }
                div ."o-imageGrid" {
                    @for (i, image) in restaurant.images.iter().enumerate() {
                        img src=(image) alt={ (restaurant.name) " - Image " (i + 1) };
                    }
                }
            }
            section ."o-card o-restaurantInfo__contact" {
                h2 ."o-card__title" { "Contact Information" }
                dl {
                    dt { "Address" }
                    dd { (restaurant.address.one_line()) }
                    dt { "Phone" }
                    dd { (restaurant.contact_information.phone_number) }
                    dt { "Email" }
                    dd { (restaurant.contact_information.email) }
                    dt { "Opening Hours" }
                    dd { (restaurant.opening_hours) }
                }
            }
        }

        section ."o-card o-restaurantTabs" {
            h2 ."o-card__title" { "Menu" }
            p { "No menu items available at the moment." }
        }
        section ."o-card o-restaurantTabs" {
            h2 ."o-card__title" { "Location" }
            p { "Coordinates: " (restaurant.location.coordinates_label()) }
        }
    };

    Ok(Maud(state.render_html_page(&restaurant.name, &session, content)))
}
