mod actions;
mod admin;
mod auth;
mod checkout;
mod home;
mod profile;
mod restaurant;

use axum::Router;
use axum::body::Body;
use axum::extract::{FromRequest, Request};
use axum::http::header::{self, CONTENT_TYPE};
use axum::http::{HeaderValue, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use maud::Markup;

use super::SharedState;
use super::error::{RequestError, UserErrorResponse};

#[derive(Clone, Debug)]
#[must_use]
pub struct Maud(pub Markup);

impl IntoResponse for Maud {
    fn into_response(self) -> Response {
        (
            [(
                header::CONTENT_TYPE,
                HeaderValue::from_static("text/html; charset=utf-8"),
            )],
            self.0.0,
        )
            .into_response()
    }
}

#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(RequestError))]
pub struct AppJson<T>(pub T);

impl<T> IntoResponse for AppJson<T>
where
    axum::Json<T>: IntoResponse,
{
    fn into_response(self) -> Response {
        axum::Json(self.0).into_response()
    }
}

pub async fn cache_control(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;

    if let Some(content_type) = response.headers().get(CONTENT_TYPE) {
        const NON_CACHEABLE_CONTENT_TYPES: &[&str] = &["text/html", "application/json"];
        const SHORT_CACHE_CONTENT_TYPES: &[&str] = &["text/css"];

        let cache_duration_secs = if SHORT_CACHE_CONTENT_TYPES
            .iter()
            .any(|&ct| content_type.as_bytes().starts_with(ct.as_bytes()))
        {
            Some(10 * 60)
        } else if NON_CACHEABLE_CONTENT_TYPES
            .iter()
            .any(|&ct| content_type.as_bytes().starts_with(ct.as_bytes()))
        {
            None
        } else {
            Some(60 * 60)
        };

        let value = match cache_duration_secs {
            Some(dur) => HeaderValue::from_str(&format!("public, max-age={dur}")).ok(),
            // Pages depend on the session cookie
            None => Some(HeaderValue::from_static("no-store")),
        };
        if let Some(value) = value {
            response.headers_mut().insert(header::CACHE_CONTROL, value);
        }
    }

    response
}

pub async fn not_found(_req: Request<Body>) -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        AppJson(UserErrorResponse {
            message: "Not Found".to_string(),
        }),
    )
}

/// Turn a `redirect` parameter into a same-site path.
///
/// Anything that could leave the site collapses to `/`. Browsers drop tabs
/// and newlines while parsing a `Location`, so control characters are
/// rejected before the leading slashes are collapsed.
pub(crate) fn local_redirect(redirect: Option<&str>) -> String {
    let raw = redirect.unwrap_or_default();
    if raw.chars().any(char::is_control) {
        return "/".to_owned();
    }
    let path = raw.trim().trim_start_matches('/');
    if path.contains("://") || path.contains('\\') || path.starts_with("..") {
        return "/".to_owned();
    }
    format!("/{path}")
}

pub fn route_handler(state: SharedState) -> Router {
    Router::new()
        .route("/", get(home::get_home))
        .route("/restaurant/{id}", get(restaurant::get_restaurant))
        .route("/restaurant/{id}/checkout", get(checkout::get_checkout))
        .route(
            "/admin/restaurant/new",
            get(admin::get_new_restaurant).post(admin::post_new_restaurant),
        )
        .route("/admin/{id}", get(admin::get_admin))
        .route(
            "/admin/{id}/menu",
            get(admin::get_menu_form).post(admin::post_menu_form),
        )
        .route("/auth", get(auth::get_auth))
        .route("/auth/login", post(auth::post_login))
        .route("/auth/signup", post(auth::post_signup))
        .route("/auth/logout", get(auth::get_logout).post(auth::post_logout))
        .route("/profile", get(profile::get_profile))
        .route("/actions/login", post(actions::login))
        .route("/actions/signup", post(actions::signup))
        .route("/actions/session", get(actions::session))
        .fallback(not_found)
        .with_state(state)
}
