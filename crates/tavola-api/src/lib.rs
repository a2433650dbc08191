//! HTTP gateway to the restaurant platform's REST backend.
//!
//! Every call the web UI makes goes through [`ApiClient::request`]: one
//! request, optional bearer token, bounded by a timeout, with the outcome
//! collapsed into [`ApiResult`].

use std::fmt;
use std::time::Duration;

use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::ser::SerializeMap as _;
use serde::{Serialize, Serializer};
use snafu::{ResultExt as _, Snafu};
use tavola_util_error::FmtCompact as _;
use tokio::time::Instant;
use tracing::debug;
use url::Url;

pub const LOG_TARGET: &str = "tavola::api";

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Timeout used for `auth/login` and `auth/signup`.
pub const AUTH_TIMEOUT: Duration = Duration::from_secs(5);

/// Where bearer requests get their session token from.
pub trait TokenSource {
    fn session_token(&self) -> Option<String>;
}

/// No session at all.
#[derive(Clone, Copy, Debug, Default)]
pub struct Anonymous;

impl TokenSource for Anonymous {
    fn session_token(&self) -> Option<String> {
        None
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Auth {
    #[default]
    None,
    Bearer,
}

/// A single backend call, built fresh for every request.
#[derive(Clone, Debug)]
pub struct RequestDescriptor<B = ()> {
    pub method: Method,
    /// Relative to the client's base URL.
    pub endpoint: String,
    pub auth: Auth,
    pub body: Option<B>,
    /// `None` means the client's default.
    pub timeout: Option<Duration>,
}

impl RequestDescriptor<()> {
    pub fn get(endpoint: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            endpoint: endpoint.into(),
            auth: Auth::None,
            body: None,
            timeout: None,
        }
    }
}

impl<B> RequestDescriptor<B> {
    pub fn post(endpoint: impl Into<String>, body: B) -> Self {
        Self {
            method: Method::POST,
            endpoint: endpoint.into(),
            auth: Auth::None,
            body: Some(body),
            timeout: None,
        }
    }

    pub fn bearer(mut self) -> Self {
        self.auth = Auth::Bearer;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

#[derive(Debug, Snafu)]
pub enum ApiError {
    #[snafu(display("Request timed out after {}ms", timeout.as_millis()))]
    Timeout { timeout: Duration },
    #[snafu(display("Network error"))]
    Transport { source: reqwest::Error },
    /// Non-2xx answer; `message` is what the backend said, if anything.
    #[snafu(display("{message}"))]
    Status { status: u16, message: String },
    #[snafu(display("Unexpected response from server"))]
    Decode { source: serde_json::Error },
    #[snafu(display("Invalid endpoint: {endpoint}"))]
    Endpoint {
        endpoint: String,
        source: url::ParseError,
    },
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[derive(Debug, Snafu)]
pub enum ApiClientError {
    #[snafu(display("Invalid API base URL: {base_url}"))]
    BaseUrl {
        base_url: String,
        source: url::ParseError,
    },
    #[snafu(display("Failed to build HTTP client"))]
    HttpClient { source: reqwest::Error },
}

pub type ApiClientResult<T> = std::result::Result<T, ApiClientError>;

#[derive(Clone, Debug)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    default_timeout: Duration,
}

impl ApiClient {
    pub fn new(base_url: &str, default_timeout: Duration) -> ApiClientResult<Self> {
        // `Url::join` drops the last path segment unless it ends with `/`
        let normalized = if base_url.ends_with('/') {
            base_url.to_owned()
        } else {
            format!("{base_url}/")
        };
        let base_url = Url::parse(&normalized).context(BaseUrlSnafu { base_url })?;

        let http = reqwest::Client::builder()
            .user_agent(concat!("tavola/", env!("CARGO_PKG_VERSION")))
            .build()
            .context(HttpClientSnafu)?;

        Ok(Self {
            http,
            base_url,
            default_timeout,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn default_timeout(&self) -> Duration {
        self.default_timeout
    }

    pub fn endpoint_url(&self, endpoint: &str) -> ApiResult<Url> {
        self.base_url
            .join(endpoint.trim_start_matches('/'))
            .context(EndpointSnafu { endpoint })
    }

    /// Perform one backend call and decode its JSON answer as `R`.
    ///
    /// A bearer descriptor without a session token is still sent, without
    /// the `Authorization` header; the backend decides what to do with it.
    pub async fn request<R, B>(
        &self,
        tokens: &(dyn TokenSource + Sync),
        desc: RequestDescriptor<B>,
    ) -> ApiResult<R>
    where
        R: DeserializeOwned,
        B: Serialize,
    {
        let url = self.endpoint_url(&desc.endpoint)?;
        let timeout = desc.timeout.unwrap_or(self.default_timeout);

        let mut req = self.http.request(desc.method.clone(), url);
        if desc.auth == Auth::Bearer {
            match tokens.session_token() {
                Some(token) => {
                    req = req.bearer_auth(token);
                }
                None => {
                    debug!(
                        target: LOG_TARGET,
                        endpoint = %desc.endpoint,
                        "No session token for bearer request"
                    );
                }
            }
        }
        if let Some(body) = desc.body.as_ref() {
            req = req.json(body);
        }

        let start = Instant::now();
        let res = match tokio::time::timeout(timeout, Self::exchange(req)).await {
            Ok(res) => res,
            Err(_elapsed) => TimeoutSnafu { timeout }.fail(),
        };
        let elapsed_ms = start.elapsed().as_millis() as u64;

        match &res {
            Ok(_) => debug!(
                target: LOG_TARGET,
                method = %desc.method,
                endpoint = %desc.endpoint,
                elapsed_ms,
                "API call"
            ),
            Err(err) => debug!(
                target: LOG_TARGET,
                method = %desc.method,
                endpoint = %desc.endpoint,
                elapsed_ms,
                err = %err.fmt_compact(),
                "API call failed"
            ),
        }
        res
    }

    async fn exchange<R>(req: RequestBuilder) -> ApiResult<R>
    where
        R: DeserializeOwned,
    {
        let resp = req.send().await.context(TransportSnafu)?;
        let status = resp.status();
        let body = resp.bytes().await.context(TransportSnafu)?;

        if !status.is_success() {
            let message = backend_message(&body)
                .unwrap_or_else(|| format!("Request failed with status {}", status.as_u16()));
            return StatusSnafu {
                status: status.as_u16(),
                message,
            }
            .fail();
        }

        // Some write endpoints answer with an empty body
        let body: &[u8] = if body.is_empty() { b"null" } else { &body };
        serde_json::from_slice(body).context(DecodeSnafu)
    }
}

/// The `message` (or `error`) field of a JSON error body.
fn backend_message(body: &[u8]) -> Option<String> {
    let value: serde_json::Value = serde_json::from_slice(body).ok()?;
    ["message", "error"]
        .into_iter()
        .filter_map(|key| value.get(key)?.as_str())
        .find(|msg| !msg.is_empty())
        .map(ToOwned::to_owned)
}

/// Outcome of an action as the JSON endpoints report it:
/// `{"success": true, "data": ..}` or `{"success": false, "error": ".."}`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ActionResult<T> {
    Success(T),
    Failure(String),
}

impl<T> ActionResult<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, ActionResult::Success(_))
    }
}

impl<T, E> From<Result<T, E>> for ActionResult<T>
where
    E: fmt::Display,
{
    fn from(res: Result<T, E>) -> Self {
        match res {
            Ok(data) => ActionResult::Success(data),
            Err(err) => ActionResult::Failure(err.to_string()),
        }
    }
}

impl<T> Serialize for ActionResult<T>
where
    T: Serialize,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(2))?;
        match self {
            ActionResult::Success(data) => {
                map.serialize_entry("success", &true)?;
                map.serialize_entry("data", data)?;
            }
            ActionResult::Failure(error) => {
                map.serialize_entry("success", &false)?;
                map.serialize_entry("error", error)?;
            }
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn base_url_gets_trailing_slash() {
        let client = ApiClient::new("http://backend.test/v1", DEFAULT_TIMEOUT).unwrap();
        assert_eq!(
            client.endpoint_url("auth/login").unwrap().as_str(),
            "http://backend.test/v1/auth/login"
        );
        assert_eq!(
            client.endpoint_url("/restaurants").unwrap().as_str(),
            "http://backend.test/v1/restaurants"
        );

        assert!(matches!(
            ApiClient::new("not a url", DEFAULT_TIMEOUT),
            Err(ApiClientError::BaseUrl { .. })
        ));
    }

    #[test]
    fn backend_message_prefers_message_then_error() {
        assert_eq!(
            backend_message(br#"{"message": "Bad credentials", "error": "x"}"#).as_deref(),
            Some("Bad credentials")
        );
        assert_eq!(
            backend_message(br#"{"message": "", "error": "Forbidden"}"#).as_deref(),
            Some("Forbidden")
        );
        assert_eq!(backend_message(br#"{"status": 500}"#), None);
        assert_eq!(backend_message(b"<html>oops</html>"), None);
    }

    #[test]
    fn timeout_message_uses_milliseconds() {
        let err = ApiError::Timeout {
            timeout: Duration::from_secs(5),
        };
        assert_eq!(err.to_string(), "Request timed out after 5000ms");
    }

    #[test]
    fn action_result_shape() {
        let ok: ActionResult<_> = Ok::<_, ApiError>(json!({"token": "t"})).into();
        assert_eq!(
            serde_json::to_value(&ok).unwrap(),
            json!({"success": true, "data": {"token": "t"}})
        );

        let failed: ActionResult<()> = Err::<(), _>(ApiError::Status {
            status: 401,
            message: "Bad credentials".into(),
        })
        .into();
        assert_eq!(
            serde_json::to_value(&failed).unwrap(),
            json!({"success": false, "error": "Bad credentials"})
        );
    }
}
