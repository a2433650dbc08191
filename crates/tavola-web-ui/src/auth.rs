//! Login and signup against the backend, persisting the issued token.

use snafu::{OptionExt as _, Snafu};
use tavola_api::{AUTH_TIMEOUT, Anonymous, ApiClient, ApiError, RequestDescriptor};
use tavola_core::auth::{
    LoginReply, LoginRequest, LoginResponse, SignupReply, SignupRequest, SignupResponse,
};
use tavola_core::token::TokenPayload;
use tavola_util_error::FmtCompact as _;
use tracing::{debug, info};

use crate::LOG_TARGET;
use crate::cookies::{CookieOptions, CookieStore, TOKEN_COOKIE};

#[derive(Debug, Snafu)]
pub enum AuthError {
    #[snafu(transparent)]
    Api { source: ApiError },
    #[snafu(display("Access token is missing from the response"))]
    TokenMissing,
    #[snafu(display("Invalid token or missing expiration"))]
    InvalidToken,
}

pub type AuthResult<T> = std::result::Result<T, AuthError>;

pub async fn login(
    api: &ApiClient,
    cookies: &impl CookieStore,
    input: &LoginRequest,
) -> AuthResult<LoginResponse> {
    let reply: LoginReply = api
        .request(
            &Anonymous,
            RequestDescriptor::post("auth/login", input).timeout(AUTH_TIMEOUT),
        )
        .await?;

    let token = persist_token(cookies, reply.token)?;
    info!(target: LOG_TARGET, email = %input.email, "Logged in");

    Ok(LoginResponse {
        token,
        user_id: reply.user_id,
    })
}

pub async fn signup(
    api: &ApiClient,
    cookies: &impl CookieStore,
    input: &SignupRequest,
) -> AuthResult<SignupResponse> {
    let reply: SignupReply = api
        .request(
            &Anonymous,
            RequestDescriptor::post("auth/signup", input).timeout(AUTH_TIMEOUT),
        )
        .await?;

    let token = persist_token(cookies, reply.token)?;
    info!(target: LOG_TARGET, email = %input.email, role = %input.role, "Signed up");

    Ok(SignupResponse {
        token,
        user_id: reply.user_id,
        user_role: reply.user_role,
        message: reply.message,
    })
}

/// Store `token` in the session cookie, expiring together with the token.
///
/// Nothing is written unless the token carries a usable `exp`.
fn persist_token(cookies: &impl CookieStore, token: Option<String>) -> AuthResult<String> {
    let token = token
        .filter(|token| !token.is_empty())
        .context(TokenMissingSnafu)?;

    let payload = match TokenPayload::decode(&token) {
        Ok(payload) => payload,
        Err(err) => {
            debug!(target: LOG_TARGET, err = %err.fmt_compact(), "Undecodable token from backend");
            return InvalidTokenSnafu.fail();
        }
    };
    let expires = payload.expires_at().context(InvalidTokenSnafu)?;

    cookies.set(TOKEN_COOKIE, &token, CookieOptions::session_token(expires));
    Ok(token)
}
