//! In-process stand-in for Neon Auth and the Neon Data API

use axum::{
    extract::{Query, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use neon_client::{create_client, ClientConfig, NeonClient};
use serde_json::{json, Value};
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

pub const SESSION_TOKEN: &str = "sess-1";
pub const JWT: &str = "jwt-1";

/// Signing in with this address yields a session the server refuses to end
pub const FLAKY_EMAIL: &str = "flaky@example.com";
const FLAKY_TOKEN: &str = "sess-flaky";

/// Counts JWTs minted by `/auth/token`
#[derive(Clone, Default)]
pub struct Minted(Arc<AtomicUsize>);

impl Minted {
    pub fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

/// Start the stand-in server and return its base URL
pub async fn spawn_server() -> String {
    spawn_server_with_state().await.0
}

/// Start the stand-in server, also returning its JWT counter
pub async fn spawn_server_with_state() -> (String, Minted) {
    let minted = Minted::default();
    let app = Router::new()
        .route("/auth/ok", get(|| async { Json(json!({ "ok": true })) }))
        .route("/auth/sign-in/email", post(sign_in))
        .route("/auth/sign-up/email", post(sign_up))
        .route("/auth/get-session", get(get_session))
        .route("/auth/token", get(token))
        .route("/auth/sign-out", post(sign_out))
        .route(
            "/rest/todos",
            get(echo).post(echo).patch(echo).delete(echo),
        )
        .route("/rest/fresh_only", get(fresh_only))
        .route("/rest/missing", get(missing_table))
        .route("/rest/rpc/add", post(add))
        .with_state(minted.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}", addr), minted)
}

/// A client pointed at the given stand-in server
pub fn client_for(base: &str) -> NeonClient {
    create_client(ClientConfig::new(
        format!("{}/auth", base),
        format!("{}/rest", base),
    ))
}

/// A client pointed at a fresh stand-in server
pub async fn connected_client() -> NeonClient {
    client_for(&spawn_server().await)
}

fn bearer(headers: &HeaderMap) -> Option<String> {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::to_string)
}

fn is_session(token: Option<&str>) -> bool {
    matches!(token, Some(SESSION_TOKEN) | Some(FLAKY_TOKEN))
}

fn user(email: &str) -> Value {
    json!({ "id": "u1", "email": email, "name": "Ann", "emailVerified": false })
}

async fn sign_in(Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    let email = body["email"].as_str().unwrap_or_default();
    if body["password"] != "secret" {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "code": "INVALID_EMAIL_OR_PASSWORD", "message": "Invalid email or password" })),
        );
    }

    let token = if email == FLAKY_EMAIL { FLAKY_TOKEN } else { SESSION_TOKEN };
    (
        StatusCode::OK,
        Json(json!({ "redirect": false, "token": token, "user": user(email) })),
    )
}

async fn sign_up(Json(body): Json<Value>) -> Json<Value> {
    let email = body["email"].as_str().unwrap_or_default();
    Json(json!({ "token": SESSION_TOKEN, "user": user(email) }))
}

async fn get_session(headers: HeaderMap) -> Json<Value> {
    if bearer(&headers).as_deref() != Some(SESSION_TOKEN) {
        return Json(Value::Null);
    }
    Json(json!({
        "session": {
            "id": "s1",
            "token": SESSION_TOKEN,
            "userId": "u1",
            "expiresAt": "2099-01-01T00:00:00Z"
        },
        "user": user("ann@example.com")
    }))
}

async fn token(State(minted): State<Minted>, headers: HeaderMap) -> (StatusCode, Json<Value>) {
    if !is_session(bearer(&headers).as_deref()) {
        return (StatusCode::UNAUTHORIZED, Json(json!({ "message": "Unauthorized" })));
    }
    let n = minted.0.fetch_add(1, Ordering::SeqCst) + 1;
    (StatusCode::OK, Json(json!({ "token": format!("jwt-{}", n) })))
}

async fn sign_out(headers: HeaderMap) -> (StatusCode, Json<Value>) {
    if bearer(&headers).as_deref() == Some(FLAKY_TOKEN) {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "message": "session store unavailable" })),
        );
    }
    (StatusCode::OK, Json(json!({ "success": true })))
}

/// Reflects the request back as a single row
async fn echo(
    headers: HeaderMap,
    Query(params): Query<Vec<(String, String)>>,
    body: String,
) -> Json<Value> {
    let prefer = headers
        .get("Prefer")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let row: Value = serde_json::from_str(&body).unwrap_or(Value::Null);

    Json(json!([{ "params": params, "prefer": prefer, "auth": bearer(&headers), "row": row }]))
}

/// Only accepts JWTs newer than the first one minted
async fn fresh_only(headers: HeaderMap) -> (StatusCode, Json<Value>) {
    match bearer(&headers) {
        Some(jwt) if jwt != JWT => (StatusCode::OK, Json(json!([{ "auth": jwt }]))),
        _ => (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "code": "PGRST301", "message": "JWT expired" })),
        ),
    }
}

async fn missing_table() -> (StatusCode, Json<Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "code": "42P01", "message": "relation \"public.missing\" does not exist" })),
    )
}

async fn add(Json(body): Json<Value>) -> Json<Value> {
    let sum = body["a"].as_i64().unwrap_or(0) + body["b"].as_i64().unwrap_or(0);
    Json(json!(sum))
}
