use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use serde::Serialize;
use snafu::Snafu;
use tavola_util_error::FmtCompact as _;
use tracing::{debug, warn};

use super::routes::AppJson;
use crate::LOG_TARGET;

/// Walk the error source chain looking for a specific error type.
fn find_in_chain<'a, T: std::error::Error + 'static>(
    e: &'a (dyn std::error::Error + 'static),
) -> Option<&'a T> {
    let mut cur: &dyn std::error::Error = e;
    loop {
        if let Some(t) = cur.downcast_ref::<T>() {
            return Some(t);
        }
        cur = cur.source()?;
    }
}

/// Error by the user
#[derive(Debug, Snafu)]
pub enum UserRequestError {
    #[snafu(visibility(pub(crate)))]
    #[snafu(display("{message}"))]
    BadRequest { message: String },
}

impl IntoResponse for &UserRequestError {
    fn into_response(self) -> Response {
        (
            StatusCode::BAD_REQUEST,
            AppJson(UserErrorResponse {
                message: self.to_string(),
            }),
        )
            .into_response()
    }
}

// How we want user errors responses to be serialized
#[derive(Serialize)]
pub struct UserErrorResponse {
    pub message: String,
}

#[derive(Debug, Snafu)]
pub enum RequestError {
    #[snafu(visibility(pub(crate)))]
    #[snafu(display("InternalServerError: {msg}"))]
    InternalServerError { msg: &'static str },
    #[snafu(visibility(pub(crate)))]
    LoginRequired { redirect: Option<String> },
    #[snafu(visibility(pub(crate)))]
    User { source: UserRequestError },
}
pub type RequestResult<T> = std::result::Result<T, RequestError>;

impl From<UserRequestError> for RequestError {
    fn from(source: UserRequestError) -> Self {
        RequestError::User { source }
    }
}

/// Malformed JSON bodies are the caller's fault.
impl From<JsonRejection> for RequestError {
    fn from(rejection: JsonRejection) -> Self {
        UserRequestError::BadRequest {
            message: rejection.body_text(),
        }
        .into()
    }
}

impl IntoResponse for RequestError {
    fn into_response(self) -> Response {
        debug!(
            target: LOG_TARGET,
            err = %self.fmt_compact(),
            "Request Error"
        );

        if let Some(user_err) = find_in_chain::<UserRequestError>(&self) {
            return user_err.into_response();
        }

        let (status_code, message) = match self {
            RequestError::LoginRequired { redirect } => {
                let url = match redirect {
                    Some(ref path) => {
                        format!("/auth?redirect={}", urlencoding::encode(path))
                    }
                    None => "/auth".to_string(),
                };
                return Redirect::to(&url).into_response();
            }
            err => {
                warn!(
                    target: LOG_TARGET,
                    err = %err.fmt_compact(),
                    "Unexpected Request Error"
                );
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Service Error".to_owned(),
                )
            }
        };

        (status_code, AppJson(UserErrorResponse { message })).into_response()
    }
}
