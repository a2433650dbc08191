//! Per-request view of who is logged in.

use std::sync::{Mutex, PoisonError};

use axum::extract::FromRequestParts;
use axum::http::request;
use serde::Serialize;
use tavola_api::TokenSource;
use tavola_core::SessionUser;
use tavola_core::token::TokenPayload;
use tavola_util_error::FmtCompact as _;
use tower_cookies::Cookies;
use tracing::debug;

use crate::LOG_TARGET;
use crate::cookies::{CookieStore, TOKEN_COOKIE};
use crate::error::{InternalServerSnafu, RequestError};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    pub is_authorized: bool,
    pub loading: bool,
    pub user: Option<SessionUser>,
}

/// Session derived from the token cookie.
///
/// Built by an extractor for every request and checked right away. Handlers
/// that change the cookie call [`SessionContext::recheck_session`] to bring
/// it up to date. Fields are updated one at a time, so of two overlapping
/// rechecks the last write wins.
pub struct SessionContext<C = Cookies> {
    cookies: C,
    state: Mutex<SessionState>,
}

impl<C> SessionContext<C>
where
    C: CookieStore,
{
    pub fn new(cookies: C) -> Self {
        let ctx = Self {
            cookies,
            state: Mutex::new(SessionState {
                loading: true,
                ..Default::default()
            }),
        };
        ctx.recheck_session();
        ctx
    }

    pub fn cookies(&self) -> &C {
        &self.cookies
    }

    pub fn state(&self) -> SessionState {
        self.lock().clone()
    }

    pub fn user(&self) -> Option<SessionUser> {
        self.lock().user.clone()
    }

    pub fn is_authorized(&self) -> bool {
        self.lock().is_authorized
    }

    pub fn loading(&self) -> bool {
        self.lock().loading
    }

    /// Re-read the token cookie and recompute the state.
    ///
    /// Never fails: a token that can't be decoded is as good as none.
    pub fn recheck_session(&self) {
        self.update(|s| {
            s.loading = true;
            s.is_authorized = false;
        });
        let _loading = LoadingGuard(self);

        let Some(token) = self.cookies.get(TOKEN_COOKIE) else {
            self.update(|s| s.user = None);
            return;
        };

        self.update(|s| s.is_authorized = true);
        match TokenPayload::decode(&token).and_then(|payload| payload.session_user()) {
            Ok(user) => self.update(|s| s.user = Some(user)),
            Err(err) => {
                debug!(target: LOG_TARGET, err = %err.fmt_compact(), "Invalid session token");
                self.update(|s| {
                    s.is_authorized = false;
                    s.user = None;
                });
            }
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn update(&self, f: impl FnOnce(&mut SessionState)) {
        f(&mut self.lock());
    }
}

/// Clears `loading` however the recheck ends.
struct LoadingGuard<'s, C: CookieStore>(&'s SessionContext<C>);

impl<C: CookieStore> Drop for LoadingGuard<'_, C> {
    fn drop(&mut self) {
        self.0.update(|s| s.loading = false);
    }
}

impl<C> TokenSource for SessionContext<C>
where
    C: CookieStore,
{
    fn session_token(&self) -> Option<String> {
        self.cookies.get(TOKEN_COOKIE)
    }
}

impl<S> FromRequestParts<S> for SessionContext
where
    S: Send + Sync,
{
    type Rejection = RequestError;

    async fn from_request_parts(
        req: &mut request::Parts,
        state: &S,
    ) -> Result<Self, Self::Rejection> {
        let cookies = Cookies::from_request_parts(req, state)
            .await
            .map_err(|(_, msg)| InternalServerSnafu { msg }.build())?;

        Ok(SessionContext::new(cookies))
    }
}
