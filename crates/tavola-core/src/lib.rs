pub mod auth;
pub mod form;
pub mod restaurant;
mod serde_util;
pub mod token;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use snafu::Snafu;

/// Authorization level of a user, as carried in the session token's
/// `roles` claim.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Customer,
    RestaurantManager,
}

impl Role {
    pub const ALL: [Role; 2] = [Role::Customer, Role::RestaurantManager];

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Customer => "CUSTOMER",
            Role::RestaurantManager => "RESTAURANT_MANAGER",
        }
    }

    /// Human readable label for forms.
    pub fn label(self) -> &'static str {
        match self {
            Role::Customer => "Customer",
            Role::RestaurantManager => "Restaurant Manager",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Snafu)]
#[snafu(display("Unknown role: {value}"))]
pub struct UnknownRoleError {
    value: String,
}

impl FromStr for Role {
    type Err = UnknownRoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| UnknownRoleError {
                value: s.to_owned(),
            })
    }
}

/// Identity derived from a decoded session token. Never persisted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SessionUser {
    pub email: String,
    pub role: Role,
}
