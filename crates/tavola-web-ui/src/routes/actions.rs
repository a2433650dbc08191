//! JSON counterparts of the form routes, for script-driven clients.

use axum::extract::State;
use tavola_api::ActionResult;
use tavola_core::auth::{LoginRequest, LoginResponse, SignupRequest, SignupResponse};

use super::AppJson;
use crate::SharedState;
use crate::error::RequestResult;
use crate::session::{SessionContext, SessionState};

pub async fn login(
    state: State<SharedState>,
    session: SessionContext,
    AppJson(input): AppJson<LoginRequest>,
) -> RequestResult<AppJson<ActionResult<LoginResponse>>> {
    let result = crate::login(&state.api, session.cookies(), &input).await;
    if result.is_ok() {
        session.recheck_session();
    }
    Ok(AppJson(ActionResult::from(result)))
}

pub async fn signup(
    state: State<SharedState>,
    session: SessionContext,
    AppJson(input): AppJson<SignupRequest>,
) -> RequestResult<AppJson<ActionResult<SignupResponse>>> {
    let result = crate::signup(&state.api, session.cookies(), &input).await;
    if result.is_ok() {
        session.recheck_session();
    }
    Ok(AppJson(ActionResult::from(result)))
}

pub async fn session(session: SessionContext) -> AppJson<SessionState> {
    AppJson(session.state())
}
