use axum::Form;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use maud::{Markup, html};
use serde::Deserialize;
use tavola_core::Role;
use tavola_core::form::{LoginForm, SignupForm, ValidationErrors};
use tavola_util_error::FmtCompact as _;
use tracing::{debug, info};

use super::{Maud, local_redirect};
use crate::cookies::{CookieStore as _, TOKEN_COOKIE};
use crate::error::RequestResult;
use crate::serde_util::empty_string_as_none;
use crate::session::SessionContext;
use crate::{LOG_TARGET, SharedState, UiState};

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tab {
    #[default]
    Login,
    Signup,
}

#[derive(Deserialize)]
pub struct AuthQuery {
    #[serde(default)]
    tab: Tab,
    #[serde(default)]
    #[serde(deserialize_with = "empty_string_as_none")]
    redirect: Option<String>,
}

pub async fn get_auth(
    state: State<SharedState>,
    session: SessionContext,
    Query(query): Query<AuthQuery>,
) -> RequestResult<impl IntoResponse> {
    let page = AuthPage {
        tab: query.tab,
        redirect: query.redirect,
        ..AuthPage::default()
    };
    Ok(Maud(state.render_auth_page(&session, &page)))
}

#[derive(Deserialize)]
pub struct LoginInput {
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
    #[serde(default)]
    #[serde(deserialize_with = "empty_string_as_none")]
    redirect: Option<String>,
}

pub async fn post_login(
    state: State<SharedState>,
    session: SessionContext,
    Form(input): Form<LoginInput>,
) -> RequestResult<Response> {
    let form = LoginForm {
        email: input.email,
        password: input.password,
    };
    let mut page = AuthPage {
        tab: Tab::Login,
        email: form.email.clone(),
        redirect: input.redirect,
        ..AuthPage::default()
    };

    let request = match form.validate() {
        Ok(request) => request,
        Err(errors) => {
            page.errors = errors;
            return Ok(state.render_auth_rejection(&session, &page));
        }
    };

    if let Err(err) = crate::login(&state.api, session.cookies(), &request).await {
        debug!(target: LOG_TARGET, err = %err.fmt_compact(), "Login failed");
        page.alert = Some(err.to_string());
        return Ok(state.render_auth_rejection(&session, &page));
    }

    session.recheck_session();
    Ok(Redirect::to(&local_redirect(page.redirect.as_deref())).into_response())
}

#[derive(Deserialize)]
pub struct SignupInput {
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
    #[serde(default)]
    confirm_password: String,
    #[serde(default)]
    role: String,
    #[serde(default)]
    #[serde(deserialize_with = "empty_string_as_none")]
    redirect: Option<String>,
}

pub async fn post_signup(
    state: State<SharedState>,
    session: SessionContext,
    Form(input): Form<SignupInput>,
) -> RequestResult<Response> {
    let form = SignupForm {
        email: input.email,
        password: input.password,
        confirm_password: input.confirm_password,
        role: input.role,
    };
    let mut page = AuthPage {
        tab: Tab::Signup,
        email: form.email.clone(),
        role: form.role.parse().ok(),
        redirect: input.redirect,
        ..AuthPage::default()
    };

    let request = match form.validate() {
        Ok(request) => request,
        Err(errors) => {
            page.errors = errors;
            return Ok(state.render_auth_rejection(&session, &page));
        }
    };

    match crate::signup(&state.api, session.cookies(), &request).await {
        Ok(reply) => {
            if let Some(message) = reply.message {
                info!(target: LOG_TARGET, %message, "Signup reply");
            }
        }
        Err(err) => {
            debug!(target: LOG_TARGET, err = %err.fmt_compact(), "Signup failed");
            page.alert = Some(err.to_string());
            return Ok(state.render_auth_rejection(&session, &page));
        }
    }

    session.recheck_session();
    Ok(Redirect::to(&local_redirect(page.redirect.as_deref())).into_response())
}

#[derive(Deserialize)]
pub struct LogoutInput {
    #[serde(default)]
    #[serde(deserialize_with = "empty_string_as_none")]
    redirect: Option<String>,
}

/// Confirmation page, so logging out works without scripts.
pub async fn get_logout(
    state: State<SharedState>,
    session: SessionContext,
    Query(query): Query<LogoutInput>,
) -> RequestResult<impl IntoResponse> {
    let content = html! {
        div ."o-card o-confirm" {
            h1 ."o-card__title" { "Confirm Logout" }
            p ."o-card__description" {
                "Are you sure you want to log out? You will need to log in again to access your account."
            }
            form ."o-confirm__actions" method="post" action="/auth/logout" {
                @if let Some(redirect) = &query.redirect {
                    input type="hidden" name="redirect" value=(redirect);
                }
                a ."u-button -outline" href="/" { "Cancel" }
                button ."u-button -danger" type="submit" { "Logout" }
            }
        }
    };
    Ok(Maud(state.render_html_page("Logout", &session, content)))
}

pub async fn post_logout(
    session: SessionContext,
    Form(input): Form<LogoutInput>,
) -> RequestResult<Response> {
    let email = session.user().map(|user| user.email);
    session.cookies().delete(TOKEN_COOKIE);
    session.recheck_session();
    info!(target: LOG_TARGET, email = ?email, "Logged out");

    Ok(Redirect::to(&local_redirect(input.redirect.as_deref())).into_response())
}

/// What the auth page shows: which tab, what was typed, and what went wrong.
#[derive(Default)]
struct AuthPage {
    tab: Tab,
    email: String,
    role: Option<Role>,
    redirect: Option<String>,
    errors: ValidationErrors,
    alert: Option<String>,
}

impl UiState {
    fn render_auth_rejection(&self, session: &SessionContext, page: &AuthPage) -> Response {
        (
            StatusCode::UNPROCESSABLE_ENTITY,
            Maud(self.render_auth_page(session, page)),
        )
            .into_response()
    }

    fn render_auth_page(&self, session: &SessionContext, page: &AuthPage) -> Markup {
        let tab_href = |tab: &str| match &page.redirect {
            Some(redirect) => format!("/auth?tab={tab}&redirect={}", urlencoding::encode(redirect)),
            None => format!("/auth?tab={tab}"),
        };

        let content = html! {
            div ."o-auth" {
                div ."o-auth__tabs" role="tablist" {
                    a ."o-auth__tab" ."-active"[page.tab == Tab::Login] href=(tab_href("login")) {
                        "Login"
                    }
                    a ."o-auth__tab" ."-active"[page.tab == Tab::Signup] href=(tab_href("signup")) {
                        "Sign Up"
                    }
                }
                div ."o-card" {
                    @match page.tab {
                        Tab::Login => { (render_login_form(page)) }
                        Tab::Signup => { (render_signup_form(page)) }
                    }
                }
            }
        };

        self.render_html_page("Authentication", session, content)
    }
}

fn render_redirect_field(page: &AuthPage) -> Markup {
    html! {
        @if let Some(redirect) = &page.redirect {
            input type="hidden" name="redirect" value=(redirect);
        }
    }
}

fn render_login_form(page: &AuthPage) -> Markup {
    let errors = &page.errors;
    html! {
        h1 ."o-card__title" { "Login" }
        p ."o-card__description" { "Enter your credentials to access your account" }
        (UiState::render_form_alert(page.alert.as_deref()))
        form ."o-form" method="post" action="/auth/login" {
            (render_redirect_field(page))
            (UiState::render_input("Email", "email", "email", &page.email, "you@example.com", errors.get("email")))
            (UiState::render_input("Password", "password", "password", "", "", errors.get("password")))
            button ."u-button -wide" type="submit" { "Login" }
        }
    }
}

fn render_signup_form(page: &AuthPage) -> Markup {
    let errors = &page.errors;
    html! {
        h1 ."o-card__title" { "Sign Up" }
        p ."o-card__description" { "Create a new account" }
        (UiState::render_form_alert(page.alert.as_deref()))
        form ."o-form" method="post" action="/auth/signup" {
            (render_redirect_field(page))
            (UiState::render_input("Email", "email", "email", &page.email, "you@example.com", errors.get("email")))
            (UiState::render_input("Password", "password", "password", "", "", errors.get("password")))
            (UiState::render_input(
                "Confirm Password",
                "confirm_password",
                "password",
                "",
                "",
                errors.get("confirm_password"),
            ))
            label ."o-form__field" {
                span ."o-form__label" { "User Type" }
                select ."o-form__input" name="role" {
                    option value="" disabled selected[page.role.is_none()] { "Select user type" }
                    @for role in Role::ALL {
                        option value=(role.as_str()) selected[page.role == Some(role)] { (role.label()) }
                    }
                }
                (UiState::render_field_error(errors.get("role")))
            }
            button ."u-button -wide" type="submit" { "Sign Up" }
        }
    }
}
