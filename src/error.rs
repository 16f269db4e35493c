// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Request outcome types with consistent user-facing messages.

use serde_json::Value;

/// Outcome of a failed API call.
///
/// The first three variants cover everything that can happen once a request
/// is dispatched. `Validation` is only produced before dispatch, when an input
/// is rejected locally.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Server rejected request ({status}): {message}")]
    Server {
        status: u16,
        message: String,
        body: Option<Value>,
    },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Unexpected error: {0}")]
    Unexpected(String),

    #[error("Invalid input: {0}")]
    Validation(String),
}

impl ApiError {
    pub const NETWORK_MESSAGE: &'static str = "Network error. Please check your connection.";
    pub const SERVER_FALLBACK_MESSAGE: &'static str = "An error occurred";
    pub const UNEXPECTED_FALLBACK_MESSAGE: &'static str = "An unexpected error occurred";
    pub const SESSION_EXPIRED_MESSAGE: &'static str = "Session expired. Please login again.";

    /// Build a server error from a status code and an optional response body.
    ///
    /// The message is taken from the body's `message` field, then its `error`
    /// field, then a generic fallback. A bare 401 reads as an expired session.
    pub fn from_response(status: u16, body: Option<Value>) -> Self {
        let fallback = if status == 401 {
            Self::SESSION_EXPIRED_MESSAGE
        } else {
            Self::SERVER_FALLBACK_MESSAGE
        };
        let message = body
            .as_ref()
            .and_then(|b| {
                b.get("message")
                    .and_then(Value::as_str)
                    .or_else(|| b.get("error").and_then(Value::as_str))
            })
            .filter(|m| !m.is_empty())
            .unwrap_or(fallback)
            .to_string();

        ApiError::Server {
            status,
            message,
            body,
        }
    }

    /// Message suitable for showing to a user.
    pub fn message(&self) -> String {
        match self {
            ApiError::Server { message, .. } => message.clone(),
            ApiError::Network(_) => Self::NETWORK_MESSAGE.to_string(),
            ApiError::Unexpected(msg) if msg.is_empty() => {
                Self::UNEXPECTED_FALLBACK_MESSAGE.to_string()
            }
            ApiError::Unexpected(msg) | ApiError::Validation(msg) => msg.clone(),
        }
    }

    /// HTTP status of a server rejection, or 0 when no response was received.
    pub fn status(&self) -> u16 {
        match self {
            ApiError::Server { status, .. } => *status,
            _ => 0,
        }
    }

    /// True when the server rejected the request as unauthenticated.
    pub fn is_unauthorized(&self) -> bool {
        self.status() == 401
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_builder() || err.is_decode() {
            ApiError::Unexpected(err.to_string())
        } else {
            // Connect failures, timeouts and interrupted bodies all mean no
            // usable response arrived.
            ApiError::Network(err.to_string())
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
        fields.sort_by(|a, b| a.0.cmp(&b.0));

        let first = fields
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| {
                    e.message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("{} is invalid", field))
                })
            })
            .next()
            .unwrap_or_else(|| "Please check your input and try again.".to_string());
        ApiError::Validation(first)
    }
}

/// Result type alias for API calls
pub type Result<T> = std::result::Result<T, ApiError>;
