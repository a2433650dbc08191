use maud::{DOCTYPE, Markup, html};
use tavola_core::Role;

use crate::UiState;
use crate::session::SessionContext;

impl UiState {
    /// Html page header
    pub(crate) fn render_html_head(&self, page_title: &str) -> Markup {
        html! {
            (DOCTYPE)
            html lang="en";
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                meta name="color-scheme" content="light dark";
                link rel="stylesheet" type="text/css" href="/assets/style.css";
                title { (page_title) " | Tavola" }
            }
        }
    }

    pub(crate) fn render_html_page(
        &self,
        title: &str,
        session: &SessionContext,
        content: Markup,
    ) -> Markup {
        html! {
            (self.render_html_head(title))
            body ."o-body" {
                (self.render_navbar(session))
                main ."o-main" { (content) }
            }
        }
    }

    /// Top bar: links, and either `Login` or who is logged in.
    pub(crate) fn render_navbar(&self, session: &SessionContext) -> Markup {
        let user = session.user();
        html! {
            nav ."o-navbar" {
                a ."o-navbar__brand" href="/" { "Tavola" }
                div ."o-navbar__links" {
                    a ."o-navbar__item" href="/" { "Restaurants" }
                    @if user.as_ref().is_some_and(|u| u.role == Role::RestaurantManager) {
                        a ."o-navbar__item" href="/admin/restaurant/new" { "Add Restaurant" }
                    }
                }
                div ."o-navbar__session" {
                    @match user {
                        Some(user) => {
                            a ."o-navbar__item" href="/profile" { "Profile" }
                            span ."o-navbar__email" { (user.email) }
                            a ."o-navbar__logout u-button -danger" href="/auth/logout" { "Logout" }
                        }
                        None => {
                            a ."o-navbar__item" href="/auth" { "Login" }
                        }
                    }
                }
            }
        }
    }

    /// Centered one-line notice, used for empty and failed fetches.
    pub(crate) fn render_notice(message: &str) -> Markup {
        html! {
            div ."o-notice" {
                p ."o-notice__text" { (message) }
            }
        }
    }

    /// Labeled `<input>` with its validation message, if any.
    pub(crate) fn render_input(
        label: &str,
        name: &str,
        kind: &str,
        value: &str,
        placeholder: &str,
        error: Option<&str>,
    ) -> Markup {
        html! {
            label ."o-form__field" {
                span ."o-form__label" { (label) }
                input ."o-form__input" ."-invalid"[error.is_some()]
                    type=(kind) name=(name) value=(value) placeholder=(placeholder);
                (Self::render_field_error(error))
            }
        }
    }

    pub(crate) fn render_field_error(error: Option<&str>) -> Markup {
        html! {
            @if let Some(error) = error {
                p ."o-form__error" { (error) }
            }
        }
    }

    /// Form-wide failure, typically what the backend said.
    pub(crate) fn render_form_alert(message: Option<&str>) -> Markup {
        html! {
            @if let Some(message) = message {
                div ."o-form__alert" role="alert" { (message) }
            }
        }
    }

    pub(crate) fn render_badge(label: &str, positive: bool) -> Markup {
        html! {
            span ."u-badge" ."-positive"[positive] ."-negative"[!positive] { (label) }
        }
    }
}
