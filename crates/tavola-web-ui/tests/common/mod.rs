#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::Json;
use axum::Router;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use serde_json::{Value, json};
use tavola_core::token::encode_unsigned;
use tavola_web_ui::{Opts, UiServer};
use time::OffsetDateTime;

pub const PASSWORD: &str = "secret123";

/// A token the way the backend issues them, valid for an hour.
pub fn token_for(email: &str, role: &str) -> String {
    encode_unsigned(&json!({
        "sub": email,
        "exp": OffsetDateTime::now_utc().unix_timestamp() + 3600,
        "roles": [{ "authority": role }],
    }))
}

pub fn sample_restaurant() -> Value {
    json!({
        "id": "r1",
        "name": "Trattoria Roma",
        "description": "Fresh pasta every day",
        "cuisine": ["Italian", "Pizza"],
        "address": {
            "street": "1 Via Appia",
            "city": "Rome",
            "state": "RM",
            "country": "Italy",
            "zipCode": 100
        },
        "location": { "type": "Point", "coordinates": [12.4964, 41.9028] },
        "rating": 4.56,
        "ratingCount": 12,
        "openingHours": "Mon-Sun: 12PM-11PM",
        "images": ["https://img.example/roma.jpg"],
        "opened": true,
        "contactInformation": { "phoneNumber": "555-0100", "email": "roma@example.com" }
    })
}

/// In-process stand-in for the backend REST API.
///
/// Remembers the bodies of write requests so tests can check what was sent.
#[derive(Clone, Default)]
pub struct FakeBackend {
    pub restaurants: Arc<Mutex<Vec<Value>>>,
    pub posted: Arc<Mutex<Vec<(String, Value)>>>,
}

impl FakeBackend {
    pub fn with_restaurants(restaurants: Vec<Value>) -> Self {
        Self {
            restaurants: Arc::new(Mutex::new(restaurants)),
            ..Self::default()
        }
    }

    pub fn posted(&self, path: &str) -> Vec<Value> {
        self.posted
            .lock()
            .unwrap()
            .iter()
            .filter(|(p, _)| p == path)
            .map(|(_, body)| body.clone())
            .collect()
    }

    fn record(&self, path: &str, body: Value) {
        self.posted.lock().unwrap().push((path.to_owned(), body));
    }

    fn router(self) -> Router {
        Router::new()
            .route("/auth/login", post(login))
            .route("/auth/signup", post(signup))
            .route("/restaurants", get(restaurants))
            .route("/restaurants/id", post(restaurant_by_id))
            .route("/api/restaurant/admin", post(add_restaurant))
            .route("/api/restaurant/menu/", post(add_menu))
            .route("/api/restaurant/menu/{id}", get(menu))
            .route("/api/restaurant/{id}", get(admin_restaurant))
            .route("/api/restaurant/{id}/checkout", get(checkout))
            .with_state(self)
    }

    async fn start(self) -> SocketAddr {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let router = self.router();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        addr
    }
}

fn error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "message": message }))).into_response()
}

fn has_bearer(headers: &HeaderMap) -> bool {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("Bearer "))
}

async fn login(Json(body): Json<Value>) -> Response {
    let email = body["email"].as_str().unwrap_or_default();
    if body["password"] != PASSWORD {
        return error(StatusCode::UNAUTHORIZED, "Invalid credentials");
    }
    let role = if email.starts_with("manager") {
        "RESTAURANT_MANAGER"
    } else {
        "CUSTOMER"
    };
    if email.starts_with("legacy") {
        return Json(json!({ "token": token_for(email, role), "userID": 42 })).into_response();
    }
    Json(json!({ "token": token_for(email, role), "userID": "u1" })).into_response()
}

async fn signup(Json(body): Json<Value>) -> Response {
    let email = body["email"].as_str().unwrap_or_default();
    if email == "taken@example.com" {
        return error(StatusCode::CONFLICT, "Email already registered");
    }
    let role = body["role"].as_str().unwrap_or_default();
    if email.starts_with("legacy") {
        return Json(json!({
            "token": token_for(email, role),
            "userID": 7,
            "userRole": role.to_lowercase(),
            "message": "User registered successfully"
        }))
        .into_response();
    }
    Json(json!({
        "token": token_for(email, role),
        "userID": "u2",
        "userRole": role,
        "message": "User registered successfully"
    }))
    .into_response()
}

async fn restaurants(State(backend): State<FakeBackend>) -> Json<Value> {
    Json(Value::Array(backend.restaurants.lock().unwrap().clone()))
}

async fn restaurant_by_id(State(backend): State<FakeBackend>, Json(id): Json<Value>) -> Response {
    let found = backend
        .restaurants
        .lock()
        .unwrap()
        .iter()
        .find(|r| r["id"] == id)
        .cloned();
    match found {
        Some(restaurant) => Json(restaurant).into_response(),
        None => error(StatusCode::NOT_FOUND, "Restaurant not found"),
    }
}

async fn admin_restaurant(headers: HeaderMap, Path(id): Path<String>) -> Response {
    if !has_bearer(&headers) {
        return error(StatusCode::UNAUTHORIZED, "Unauthorized");
    }
    let mut restaurant = sample_restaurant();
    restaurant["id"] = json!(id);
    Json(restaurant).into_response()
}

async fn menu(headers: HeaderMap, Path(_id): Path<String>) -> Response {
    if !has_bearer(&headers) {
        return error(StatusCode::UNAUTHORIZED, "Unauthorized");
    }
    Json(json!([
        {
            "id": "d1",
            "name": "Margherita",
            "description": "Tomato, mozzarella, basil",
            "isVeg": true,
            "kcal": 800,
            "price": 9.5,
            "isAvailable": true
        },
        {
            "id": "d2",
            "name": "Diavola",
            "description": "Spicy salami",
            "isVeg": false,
            "kcal": 950,
            "price": 11,
            "isAvailable": false
        }
    ]))
    .into_response()
}

async fn checkout(headers: HeaderMap, Path(slug): Path<String>) -> Response {
    if !has_bearer(&headers) {
        return error(StatusCode::UNAUTHORIZED, "Unauthorized");
    }
    Json(json!({
        "restaurant": { "id": "r1", "name": "Trattoria Roma", "slug": slug },
        "items": [
            { "id": "d1", "name": "Margherita", "price": 9.5, "quantity": 2 },
            { "id": "d2", "name": "Tiramisu", "price": 6, "quantity": 1 }
        ],
        "total": 25
    }))
    .into_response()
}

async fn add_restaurant(
    State(backend): State<FakeBackend>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if !has_bearer(&headers) {
        return error(StatusCode::UNAUTHORIZED, "Unauthorized");
    }
    if body["name"] == "Duplicate" {
        return error(StatusCode::CONFLICT, "Restaurant already exists");
    }
    backend.record("/api/restaurant/admin", body);
    StatusCode::CREATED.into_response()
}

async fn add_menu(
    State(backend): State<FakeBackend>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if !has_bearer(&headers) {
        return error(StatusCode::UNAUTHORIZED, "Unauthorized");
    }
    if body["restaurantId"] == "locked" {
        return error(StatusCode::FORBIDDEN, "Not your restaurant");
    }
    backend.record("/api/restaurant/menu/", body.clone());
    Json(body).into_response()
}

/// A test web UI server running on a random port, talking to a [`FakeBackend`].
pub struct TestServer {
    server: UiServer,
    base_url: String,
    pub backend: FakeBackend,
}

impl TestServer {
    pub async fn start() -> Self {
        Self::start_with(FakeBackend::with_restaurants(vec![sample_restaurant()])).await
    }

    pub async fn start_with(backend: FakeBackend) -> Self {
        let backend_addr = backend.clone().start().await;
        Self::start_against(&format!("http://{backend_addr}"), backend).await
    }

    /// Point the UI at a backend that refuses connections.
    pub async fn start_unreachable() -> Self {
        let addr = {
            let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
            listener.local_addr().unwrap()
        };
        Self::start_against(&format!("http://{addr}"), FakeBackend::default()).await
    }

    async fn start_against(api_url: &str, backend: FakeBackend) -> Self {
        let opts = Opts::builder()
            .listen("127.0.0.1:0")
            .api_url(api_url)
            .build();

        let server = tavola_web_ui::start_ui(opts)
            .await
            .expect("Failed to start test server");

        let base_url = format!("http://{}", server.local_addr());

        Self {
            server,
            base_url,
            backend,
        }
    }

    /// Create a new `UiDriver` with its own session.
    pub fn driver(&self) -> UiDriver {
        UiDriver::new(self.base_url.clone())
    }

    pub async fn shutdown(self) {
        self.server
            .shutdown()
            .await
            .expect("Server shutdown failed");
    }
}

/// HTTP client driver for interacting with the web UI in tests.
///
/// The session cookie is `Secure`, which a cookie jar would not send back
/// over plain http, so the driver tracks it by hand.
pub struct UiDriver {
    client: reqwest::Client,
    base_url: String,
    token: Mutex<Option<String>>,
}

impl UiDriver {
    fn new(base_url: String) -> Self {
        let client = reqwest::Client::builder()
            // Don't auto-follow redirects, let tests assert on redirect targets.
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            base_url,
            token: Mutex::new(None),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn token(&self) -> Option<String> {
        self.token.lock().unwrap().clone()
    }

    /// Present an arbitrary session cookie on the following requests.
    pub fn set_token(&self, token: Option<&str>) {
        *self.token.lock().unwrap() = token.map(ToOwned::to_owned);
    }

    async fn send(&self, req: reqwest::RequestBuilder) -> reqwest::Response {
        let req = match self.token() {
            Some(token) => req.header("cookie", format!("token={token}")),
            None => req,
        };
        let resp = req.send().await.expect("Request failed");

        for cookie in resp.cookies().filter(|c| c.name() == "token") {
            let expired = cookie
                .expires()
                .is_some_and(|at| at <= std::time::SystemTime::now());
            *self.token.lock().unwrap() = if cookie.value().is_empty() || expired {
                None
            } else {
                Some(cookie.value().to_owned())
            };
        }
        resp
    }

    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.send(self.client.get(self.url(path))).await
    }

    pub async fn post_form(&self, path: &str, form: &[(&str, &str)]) -> reqwest::Response {
        self.send(self.client.post(self.url(path)).form(form)).await
    }

    pub async fn post_json(&self, path: &str, body: &Value) -> reqwest::Response {
        self.send(self.client.post(self.url(path)).json(body)).await
    }

    /// Log in through the form and expect the redirect home.
    pub async fn login(&self, email: &str) {
        let resp = self
            .post_form("/auth/login", &[("email", email), ("password", PASSWORD)])
            .await;

        assert_eq!(
            resp.status(),
            reqwest::StatusCode::SEE_OTHER,
            "Expected redirect after login, got {}",
            resp.status()
        );
        assert_eq!(location(&resp), "/");
        assert!(self.token().is_some(), "Login should set the token cookie");
    }
}

pub fn location(resp: &reqwest::Response) -> &str {
    resp.headers()
        .get("location")
        .expect("Missing Location header")
        .to_str()
        .expect("Invalid Location header")
}
