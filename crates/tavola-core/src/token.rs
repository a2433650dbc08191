//! Session token payload decoding.
//!
//! Tokens are JWTs issued by the backend. We only ever *read* their claims
//! here: the signature is not verified, the backend checks it on every
//! bearer request anyway.

use data_encoding::BASE64URL_NOPAD;
use serde::Deserialize;
use serde_json::{Map, Value};
use snafu::{OptionExt as _, ResultExt as _, Snafu};
use time::OffsetDateTime;

use crate::{Role, SessionUser};

#[derive(Debug, Snafu)]
pub enum TokenDecodeError {
    #[snafu(display("Token is not in header.payload.signature form"))]
    Malformed,
    #[snafu(display("Token payload is not valid base64url"))]
    PayloadEncoding { source: data_encoding::DecodeError },
    #[snafu(display("Token payload is not a JSON object"))]
    NotAnObject,
    #[snafu(display("Token has no `{claim}` claim"))]
    MissingClaim { claim: &'static str },
    #[snafu(display("Token claim `{claim}` has an invalid value"))]
    InvalidClaim {
        claim: &'static str,
        source: serde_json::Error,
    },
}

pub type TokenDecodeResult<T> = std::result::Result<T, TokenDecodeError>;

/// Decoded (but not verified) claims of a session token.
#[derive(Clone, Debug)]
pub struct TokenPayload {
    claims: Map<String, Value>,
}

#[derive(Deserialize)]
struct RoleClaim {
    authority: Role,
}

impl TokenPayload {
    pub fn decode(token: &str) -> TokenDecodeResult<Self> {
        let mut parts = token.split('.');
        let (Some(_header), Some(payload), Some(_signature), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return MalformedSnafu.fail();
        };

        // Some issuers pad anyway
        let payload = BASE64URL_NOPAD
            .decode(payload.trim_end_matches('=').as_bytes())
            .context(PayloadEncodingSnafu)?;

        // A payload that is not JSON decodes to a plain string in most JWT
        // libraries; either way there are no claims to read.
        match serde_json::from_slice::<Value>(&payload) {
            Ok(Value::Object(claims)) => Ok(Self { claims }),
            _ => NotAnObjectSnafu.fail(),
        }
    }

    pub fn claim(&self, name: &str) -> Option<&Value> {
        self.claims.get(name)
    }

    /// The `exp` claim as an absolute instant.
    ///
    /// `None` if absent, not a number, zero, or out of range.
    pub fn expires_at(&self) -> Option<OffsetDateTime> {
        let exp = self.claims.get("exp")?;
        let secs = exp.as_i64().or_else(|| exp.as_f64().map(|f| f.trunc() as i64))?;
        if secs == 0 {
            return None;
        }
        OffsetDateTime::from_unix_timestamp(secs).ok()
    }

    pub fn subject(&self) -> Option<&str> {
        self.claims.get("sub").and_then(Value::as_str)
    }

    /// The first `authority` in the `roles` claim.
    pub fn first_role(&self) -> TokenDecodeResult<Role> {
        let roles = self
            .claims
            .get("roles")
            .context(MissingClaimSnafu { claim: "roles" })?;
        let roles: Vec<RoleClaim> = serde_json::from_value(roles.clone())
            .context(InvalidClaimSnafu { claim: "roles" })?;
        roles
            .into_iter()
            .next()
            .map(|r| r.authority)
            .context(MissingClaimSnafu { claim: "roles" })
    }

    /// Project the claims into the identity the UI works with.
    pub fn session_user(&self) -> TokenDecodeResult<SessionUser> {
        let email = self
            .subject()
            .context(MissingClaimSnafu { claim: "sub" })?
            .to_owned();
        Ok(SessionUser {
            email,
            role: self.first_role()?,
        })
    }
}

/// Build an unsigned token around `claims`. Only meant for tests and local
/// fakes of the backend.
pub fn encode_unsigned(claims: &Value) -> String {
    let header = BASE64URL_NOPAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = BASE64URL_NOPAD.encode(claims.to_string().as_bytes());
    let signature = BASE64URL_NOPAD.encode(b"unverified");
    format!("{header}.{payload}.{signature}")
}
