//! Bodies exchanged with the backend's `auth/*` endpoints.

use serde::{Deserialize, Serialize};

use crate::Role;
use crate::serde_util::{optional_string_or_number, parsed_or_none};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    pub role: Role,
}

/// What `auth/login` sends back. Everything is optional, the handler decides
/// what is acceptable.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct LoginReply {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(rename = "userID", default, deserialize_with = "optional_string_or_number")]
    pub user_id: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct SignupReply {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(rename = "userID", default, deserialize_with = "optional_string_or_number")]
    pub user_id: Option<String>,
    /// Roles this client does not know are dropped, the token is what counts.
    #[serde(rename = "userRole", default, deserialize_with = "parsed_or_none")]
    pub user_role: Option<Role>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Successful login, as handed back to callers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LoginResponse {
    pub token: String,
    #[serde(rename = "userID")]
    pub user_id: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SignupResponse {
    pub token: String,
    #[serde(rename = "userID")]
    pub user_id: Option<String>,
    #[serde(rename = "userRole")]
    pub user_role: Option<Role>,
    pub message: Option<String>,
}
