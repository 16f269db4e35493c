// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Request dispatch shared by every endpoint.
//!
//! Handles:
//! - Bearer token attachment from session storage
//! - Mapping transport failures to `ApiError`
//! - Session teardown when the server answers 401
//! - JSON and multipart bodies

use crate::config::Config;
use crate::error::{ApiError, Result};
use crate::models::Upload;
use crate::storage::SessionStorage;
use reqwest::multipart::{Form, Part};
use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::{Arc, RwLock};
use std::time::Duration;

/// Callback run after a 401 has cleared the stored session.
pub type LogoutHandler = Arc<dyn Fn() + Send + Sync>;

/// Campus API client.
///
/// Cheap to clone; clones share the HTTP connection pool, the session storage
/// and the logout handler.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    storage: SessionStorage,
    logout_handler: Arc<RwLock<Option<LogoutHandler>>>,
}

impl ApiClient {
    /// Create a client for the configured API.
    pub fn new(config: &Config, storage: SessionStorage) -> Result<Self> {
        Self::with_base_url(&config.api_url, config.request_timeout, storage)
    }

    /// Create a client for an explicit base URL.
    pub fn with_base_url(base_url: &str, timeout: Duration, storage: SessionStorage) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("campus-hub/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ApiError::Unexpected(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            storage,
            logout_handler: Arc::new(RwLock::new(None)),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn storage(&self) -> &SessionStorage {
        &self.storage
    }

    /// Register the callback run when a 401 ends the session.
    pub fn set_logout_handler(&self, handler: impl Fn() + Send + Sync + 'static) {
        match self.logout_handler.write() {
            Ok(mut slot) => *slot = Some(Arc::new(handler)),
            Err(poisoned) => *poisoned.into_inner() = Some(Arc::new(handler)),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    // ─── Verb Helpers ────────────────────────────────────────────

    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.dispatch(self.http.get(self.url(path))).await
    }

    pub(crate) async fn get_query<T, Q>(&self, path: &str, query: &Q) -> Result<T>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        self.dispatch(self.http.get(self.url(path)).query(query))
            .await
    }

    pub(crate) async fn post<T, B>(&self, path: &str, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.dispatch(self.http.post(self.url(path)).json(body))
            .await
    }

    pub(crate) async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.dispatch(self.http.post(self.url(path))).await
    }

    pub(crate) async fn put<T, B>(&self, path: &str, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.dispatch(self.http.put(self.url(path)).json(body)).await
    }

    pub(crate) async fn put_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.dispatch(self.http.put(self.url(path))).await
    }

    pub(crate) async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.dispatch(self.http.delete(self.url(path))).await
    }

    pub(crate) async fn post_multipart<T: DeserializeOwned>(
        &self,
        path: &str,
        form: Form,
    ) -> Result<T> {
        self.dispatch(self.http.post(self.url(path)).multipart(form))
            .await
    }

    // ─── Interceptors ────────────────────────────────────────────

    /// Attach the stored bearer token, if any.
    ///
    /// A storage failure does not block the request; it simply goes out
    /// unauthenticated.
    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match self.storage.token() {
            Ok(Some(token)) => request.bearer_auth(token),
            Ok(None) => request,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read session token");
                request
            }
        }
    }

    /// Clear the stored session and notify the logout handler.
    fn handle_unauthorized(&self) {
        tracing::info!("Received 401, clearing local session");

        if let Err(e) = self.storage.clear_all() {
            tracing::warn!(error = %e, "Failed to clear session storage");
        }

        // Clone out of the lock so the handler may call back into the client.
        let handler = match self.logout_handler.read() {
            Ok(slot) => slot.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        };
        if let Some(handler) = handler {
            handler();
        }
    }

    /// Send a request and decode its JSON response.
    async fn dispatch<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = self.authorize(request).send().await.map_err(|e| {
            tracing::debug!(error = %e, "Request failed without a response");
            ApiError::from(e)
        })?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            self.handle_unauthorized();
        }

        if !status.is_success() {
            // The error body is best effort; a truncated one still yields the status.
            let body = match response.bytes().await {
                Ok(bytes) => serde_json::from_slice::<Value>(&bytes).ok(),
                Err(e) => {
                    tracing::debug!(error = %e, "Failed to read error body");
                    None
                }
            };
            tracing::debug!(status = status.as_u16(), "Server rejected request");
            return Err(ApiError::from_response(status.as_u16(), body));
        }

        let bytes = response.bytes().await?;
        decode_body(&bytes)
    }
}

/// Decode a success body.
///
/// An empty body decodes as JSON `null`. A body that is not JSON is offered to
/// the target type as a JSON string, which covers endpoints answering with a
/// bare text confirmation.
fn decode_body<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return serde_json::from_slice(b"null")
            .map_err(|e| ApiError::Unexpected(format!("Empty response body: {}", e)));
    }

    match serde_json::from_slice(bytes) {
        Ok(value) => Ok(value),
        Err(json_err) => {
            let text = std::str::from_utf8(bytes)
                .map_err(|_| ApiError::Unexpected(format!("Invalid response body: {}", json_err)))?;
            serde_json::from_value(Value::String(text.to_string()))
                .map_err(|_| ApiError::Unexpected(format!("Invalid response body: {}", json_err)))
        }
    }
}

/// Build a multipart file part from an upload.
pub(crate) fn file_part(upload: &Upload) -> Result<Part> {
    Part::bytes(upload.bytes.clone())
        .file_name(upload.file_name.clone())
        .mime_str(&upload.mime_type)
        .map_err(|e| ApiError::Validation(format!("Invalid content type {}: {}", upload.mime_type, e)))
}

/// Build a multipart form from text fields.
pub(crate) fn text_form(fields: Vec<(&'static str, String)>) -> Form {
    fields
        .into_iter()
        .fold(Form::new(), |form, (name, value)| form.text(name, value))
}
