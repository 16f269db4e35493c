// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::{
    body::Body,
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
    Router,
};
use campus_hub::api::ApiClient;
use campus_hub::storage::SessionStorage;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// A request as the mock server saw it.
#[derive(Debug, Clone)]
#[allow(dead_code)]
pub struct SeenRequest {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub authorization: Option<String>,
    pub content_type: Option<String>,
    pub body: String,
}

/// Requests received by a mock server, in arrival order.
#[derive(Clone, Default)]
pub struct Seen(Arc<Mutex<Vec<SeenRequest>>>);

#[allow(dead_code)]
impl Seen {
    pub fn all(&self) -> Vec<SeenRequest> {
        self.0.lock().unwrap().clone()
    }

    pub fn last(&self) -> SeenRequest {
        self.all().pop().expect("no request received")
    }

    pub fn count(&self) -> usize {
        self.0.lock().unwrap().len()
    }
}

async fn record(State(seen): State<Seen>, req: Request, next: Next) -> Response {
    let (parts, body) = req.into_parts();
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .unwrap_or_default();

    let header_str = |name| {
        parts
            .headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    seen.0.lock().unwrap().push(SeenRequest {
        method: parts.method.to_string(),
        path: parts.uri.path().to_string(),
        query: parts.uri.query().map(str::to_string),
        authorization: header_str(header::AUTHORIZATION),
        content_type: header_str(header::CONTENT_TYPE),
        body: String::from_utf8_lossy(&bytes).into_owned(),
    });

    next.run(Request::from_parts(parts, Body::from(bytes))).await
}

/// Serve `router` on an ephemeral local port and return its base URL.
#[allow(dead_code)]
pub async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

/// Serve `router` and record every request it receives.
#[allow(dead_code)]
pub async fn serve_recorded(router: Router) -> (String, Seen) {
    let seen = Seen::default();
    let router = router.layer(axum::middleware::from_fn_with_state(seen.clone(), record));
    (serve(router).await, seen)
}

/// A base URL where nothing is listening.
#[allow(dead_code)]
pub async fn unreachable_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

/// Client with fresh in-memory session storage.
#[allow(dead_code)]
pub fn test_client(base_url: &str) -> ApiClient {
    ApiClient::with_base_url(base_url, Duration::from_secs(5), SessionStorage::in_memory())
        .expect("client should build")
}

/// Create a test JWT expiring `ttl_secs` from now (negative for expired).
#[allow(dead_code)]
pub fn create_test_jwt(user_id: i64, ttl_secs: i64) -> String {
    #[derive(Serialize)]
    struct Claims {
        sub: String,
        exp: i64,
        iat: i64,
    }

    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs() as i64;

    let claims = Claims {
        sub: user_id.to_string(),
        exp: now + ttl_secs,
        iat: now,
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(b"server-only-secret"),
    )
    .unwrap()
}

#[allow(dead_code)]
pub fn user_json(id: i64) -> Value {
    json!({
        "id": id,
        "username": "asha",
        "email": "asha@uni.edu",
        "firstName": "Asha",
        "lastName": "Rao",
        "role": "STUDENT"
    })
}
