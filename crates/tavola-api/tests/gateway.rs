use std::net::SocketAddr;
use std::time::Duration;

use axum::Router;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use serde_json::{Value, json};
use tavola_api::{Anonymous, ApiClient, ApiError, DEFAULT_TIMEOUT, RequestDescriptor, TokenSource};

struct FixedToken(&'static str);

impl TokenSource for FixedToken {
    fn session_token(&self) -> Option<String> {
        Some(self.0.to_owned())
    }
}

async fn echo_auth(headers: HeaderMap) -> axum::Json<Value> {
    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(ToOwned::to_owned);
    axum::Json(json!({ "authorization": auth }))
}

async fn echo_body(body: axum::Json<Value>) -> axum::Json<Value> {
    body
}

fn backend() -> Router {
    let api = Router::new()
        .route(
            "/slow",
            get(|| async {
                tokio::time::sleep(Duration::from_millis(500)).await;
                axum::Json(json!({}))
            }),
        )
        .route(
            "/fail-message",
            get(|| async {
                (
                    StatusCode::UNAUTHORIZED,
                    axum::Json(json!({"message": "Bad credentials"})),
                )
            }),
        )
        .route(
            "/fail-error",
            get(|| async {
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    axum::Json(json!({"error": "Database unavailable"})),
                )
            }),
        )
        .route(
            "/fail-plain",
            get(|| async { (StatusCode::SERVICE_UNAVAILABLE, "try later") }),
        )
        .route("/not-json", get(|| async { "hello" }))
        .route("/created", post(|| async { StatusCode::CREATED }))
        .route("/echo-auth", get(echo_auth))
        .route("/echo-body", post(echo_body));

    Router::new().nest("/v1", api)
}

async fn start_backend() -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, backend()).await.unwrap();
    });
    addr
}

async fn client() -> ApiClient {
    let addr = start_backend().await;
    // No trailing slash on purpose
    ApiClient::new(&format!("http://{addr}/v1"), DEFAULT_TIMEOUT).unwrap()
}

#[test_log::test(tokio::test(flavor = "multi_thread"))]
async fn timeout_yields_timeout_error() {
    let client = client().await;

    let err = client
        .request::<Value, _>(
            &Anonymous,
            RequestDescriptor::get("slow").timeout(Duration::from_millis(50)),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::Timeout { .. }));
    assert_eq!(err.to_string(), "Request timed out after 50ms");
}

#[test_log::test(tokio::test(flavor = "multi_thread"))]
async fn backend_error_messages_are_surfaced() {
    let client = client().await;

    let err = client
        .request::<Value, _>(&Anonymous, RequestDescriptor::get("fail-message"))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Bad credentials");
    assert_eq!(err.status(), Some(401));

    let err = client
        .request::<Value, _>(&Anonymous, RequestDescriptor::get("fail-error"))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Database unavailable");

    let err = client
        .request::<Value, _>(&Anonymous, RequestDescriptor::get("fail-plain"))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Request failed with status 503");
}

#[test_log::test(tokio::test(flavor = "multi_thread"))]
async fn undecodable_success_body_is_unexpected() {
    let client = client().await;

    let err = client
        .request::<Value, _>(&Anonymous, RequestDescriptor::get("not-json"))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Decode { .. }));
    assert_eq!(err.to_string(), "Unexpected response from server");
}

#[test_log::test(tokio::test(flavor = "multi_thread"))]
async fn empty_success_body_reads_as_null() {
    let client = client().await;

    let created: Value = client
        .request(&Anonymous, RequestDescriptor::post("created", json!({})))
        .await
        .unwrap();
    assert_eq!(created, Value::Null);
}

#[test_log::test(tokio::test(flavor = "multi_thread"))]
async fn bearer_header_only_when_requested_and_present() {
    let client = client().await;
    let token = FixedToken("abc.def.ghi");

    let with_bearer: Value = client
        .request(&token, RequestDescriptor::get("echo-auth").bearer())
        .await
        .unwrap();
    assert_eq!(with_bearer["authorization"], "Bearer abc.def.ghi");

    let without_auth: Value = client
        .request(&token, RequestDescriptor::get("echo-auth"))
        .await
        .unwrap();
    assert_eq!(without_auth["authorization"], Value::Null);

    // No token: the request still goes out, just without the header
    let anonymous_bearer: Value = client
        .request(&Anonymous, RequestDescriptor::get("echo-auth").bearer())
        .await
        .unwrap();
    assert_eq!(anonymous_bearer["authorization"], Value::Null);
}

#[test_log::test(tokio::test(flavor = "multi_thread"))]
async fn bodies_are_sent_as_json() {
    let client = client().await;

    let echoed: Value = client
        .request(
            &Anonymous,
            RequestDescriptor::post("echo-body", json!({"email": "a@b.com"})),
        )
        .await
        .unwrap();
    assert_eq!(echoed, json!({"email": "a@b.com"}));

    // A bare id is sent as a JSON string
    let echoed: Value = client
        .request(
            &Anonymous,
            RequestDescriptor::post("/echo-body", "r1".to_owned()),
        )
        .await
        .unwrap();
    assert_eq!(echoed, json!("r1"));
}

#[test_log::test(tokio::test(flavor = "multi_thread"))]
async fn unreachable_backend_is_network_error() {
    let addr = {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap()
    };
    let client = ApiClient::new(&format!("http://{addr}/"), DEFAULT_TIMEOUT).unwrap();

    let err = client
        .request::<Value, _>(&Anonymous, RequestDescriptor::get("restaurants"))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Transport { .. }));
    assert_eq!(err.to_string(), "Network error");
}
