use axum::extract::State;
use axum::response::IntoResponse;
use maud::{Markup, html};
use tavola_core::{Role, SessionUser};

use super::Maud;
use crate::error::RequestResult;
use crate::session::SessionContext;
use crate::{SharedState, UiState};

pub async fn get_profile(
    state: State<SharedState>,
    session: SessionContext,
) -> RequestResult<impl IntoResponse> {
    let content = match session.user() {
        Some(user) if user.role == Role::Customer => render_customer_profile(&user),
        Some(user) if user.role == Role::RestaurantManager => render_manager_profile(&user),
        _ => html! {
            div ."o-card o-unauthorized" {
                h1 ."o-card__title" { "You are not authorized to view this page" }
                p ."o-card__description" { "Please log in" }
                a ."u-button" href="/auth?redirect=profile" { "Login" }
            }
        },
    };

    Ok(Maud(state.render_html_page("Profile", &session, content)))
}

fn render_account(user: &SessionUser) -> Markup {
    html! {
        dl ."o-details" {
            dt { "Email" }
            dd { (user.email) }
            dt { "Account type" }
            dd { (UiState::render_badge(user.role.label(), true)) }
        }
    }
}

fn render_customer_profile(user: &SessionUser) -> Markup {
    html! {
        h1 ."o-pageTitle" { "Customer Profile" }
        section ."o-card" {
            h2 ."o-card__title" { "Account" }
            (render_account(user))
        }
        section ."o-card" {
            h2 ."o-card__title" { "Find something to eat" }
            p ."o-card__description" { "Browse restaurants near you and order from their menus." }
            a ."u-button" href="/" { "Browse Restaurants" }
        }
    }
}

fn render_manager_profile(user: &SessionUser) -> Markup {
    html! {
        h1 ."o-pageTitle" { "Restaurant Manager Profile" }
        section ."o-card" {
            h2 ."o-card__title" { "Account" }
            (render_account(user))
        }
        section ."o-card" {
            h2 ."o-card__title" { "Your Restaurants" }
            p ."o-card__description" { "List a new restaurant, then add its menu from the admin panel." }
            a ."u-button" href="/admin/restaurant/new" { "Add Restaurant" }
        }
    }
}
