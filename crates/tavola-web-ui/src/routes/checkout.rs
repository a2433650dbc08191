use axum::extract::{Path, State};
use axum::response::IntoResponse;
use maud::html;
use tavola_api::RequestDescriptor;
use tavola_core::restaurant::{CheckoutData, format_price};

use super::Maud;
use crate::SharedState;
use crate::error::RequestResult;
use crate::session::SessionContext;

pub async fn get_checkout(
    state: State<SharedState>,
    session: SessionContext,
    Path(slug): Path<String>,
) -> RequestResult<impl IntoResponse> {
    let endpoint = format!("api/restaurant/{}/checkout", urlencoding::encode(&slug));
    let checkout = state
        .api
        .request::<CheckoutData, _>(&session, RequestDescriptor::get(endpoint).bearer())
        .await;

    let Ok(CheckoutData {
        restaurant,
        items,
        total,
    }) = checkout
    else {
        let content = html! { div ."o-notice" { "Error loading checkout data" } };
        return Ok(Maud(state.render_html_page("Checkout", &session, content)));
    };

    let content = html! {
        h1 ."o-pageTitle" { "Checkout - " (restaurant.name) }
        div ."o-checkout" {
            section ."o-card" {
                h2 ."o-card__title" { "Your Order" }
                p ."o-card__description" { "Review your selected items" }
                @for item in &items {
                    div ."o-checkout__item" {
                        div {
                            p ."o-checkout__itemName" { (item.name) }
                            p ."o-checkout__quantity" { "Quantity: " (item.quantity) }
                        }
                        p { (format_price(item.line_total())) }
                    }
                }
                hr;
                div ."o-checkout__total" {
                    p { "Total" }
                    p { (format_price(total)) }
                }
            }
            section ."o-card" {
                h2 ."o-card__title" { "Payment" }
                p ."o-card__description" { "Secure payment processing" }
                p ."o-checkout__placeholder" { "Payment details form placeholder" }
                button ."u-button -wide" type="button" { "Pay " (format_price(total)) }
            }
        }
    };

    Ok(Maud(state.render_html_page(
        &format!("Checkout - {}", restaurant.name),
        &session,
        content,
    )))
}
