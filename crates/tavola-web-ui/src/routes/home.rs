use axum::extract::State;
use axum::response::IntoResponse;
use maud::{Markup, html};
use tavola_api::{Anonymous, RequestDescriptor};
use tavola_core::restaurant::Restaurant;

use super::Maud;
use crate::error::RequestResult;
use crate::session::SessionContext;
use crate::{SharedState, UiState};

pub async fn get_home(
    state: State<SharedState>,
    session: SessionContext,
) -> RequestResult<impl IntoResponse> {
    let restaurants = state
        .api
        .request::<Vec<Restaurant>, _>(&Anonymous, RequestDescriptor::get("restaurants"))
        .await;

    let content = match restaurants {
        Err(_) => UiState::render_notice("No restaurants found"),
        Ok(restaurants) => html! {
            div ."o-restaurantGrid" {
                @for restaurant in &restaurants {
                    (render_restaurant_card(restaurant))
                }
            }
            @if restaurants.is_empty() {
                (UiState::render_notice("No restaurants available at the moment"))
            }
        },
    };

    Ok(Maud(state.render_html_page("Restaurants", &session, content)))
}

fn render_restaurant_card(restaurant: &Restaurant) -> Markup {
    html! {
        article ."o-restaurantCard" {
            div ."o-restaurantCard__status" {
                (UiState::render_badge(restaurant.status_label(), restaurant.opened))
            }
            div ."o-restaurantCard__body" {
                h2 ."o-restaurantCard__name" { (restaurant.name) }
                @if let Some(description) = &restaurant.description {
                    p ."o-restaurantCard__description" { (description) }
                }
                div ."o-restaurantCard__cuisines" {
                    @for cuisine in &restaurant.cuisine {
                        span ."u-tag" { (cuisine) }
                    }
                }
                p ."o-restaurantCard__rating" { "★ " (restaurant.rating_summary()) }
                p ."o-restaurantCard__hours" { (restaurant.opening_hours) }
                p ."o-restaurantCard__city" { (restaurant.address.city_country()) }
                p ."o-restaurantCard__phone" { (restaurant.contact_information.phone_number) }
            }
            a ."o-restaurantCard__details u-button" href={ "/restaurant/" (urlencoding::encode(&restaurant.id)) } {
                "View Details"
            }
        }
    }
}
