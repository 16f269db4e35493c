// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Authentication endpoints.

use super::ApiClient;
use crate::error::Result;
use crate::models::{AuthResponse, OAuthProvider, ResetPasswordRequest, SignupRequest};
use serde::Serialize;
use serde_json::{json, Value};
use validator::Validate;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SigninRequest<'a> {
    username_or_email: &'a str,
    password: &'a str,
}

impl ApiClient {
    /// Sign in with a username or email and a password.
    pub async fn signin(&self, username_or_email: &str, password: &str) -> Result<AuthResponse> {
        self.post(
            "/auth/signin",
            &SigninRequest {
                username_or_email,
                password,
            },
        )
        .await
    }

    /// Register a new account. The form is validated before it is sent.
    pub async fn signup(&self, request: &SignupRequest) -> Result<AuthResponse> {
        request.validate()?;
        self.post("/auth/signup", request).await
    }

    /// Register or sign in with a third-party identity.
    pub async fn oauth_register(
        &self,
        provider: OAuthProvider,
        token: &str,
        profile: &Value,
    ) -> Result<AuthResponse> {
        self.post(
            "/auth/oauth/register",
            &json!({
                "provider": provider,
                "token": token,
                "profile": profile,
            }),
        )
        .await
    }

    /// Ask the server to email a password-reset code.
    pub async fn forgot_password(&self, email: &str) -> Result<Value> {
        self.post("/auth/forgot-password", &json!({ "email": email }))
            .await
    }

    /// Set a new password using the emailed code.
    pub async fn reset_password(&self, request: &ResetPasswordRequest) -> Result<Value> {
        request.validate()?;
        self.post("/auth/reset-password", request).await
    }

    /// Check an emailed code without consuming it.
    pub async fn verify_otp(&self, email: &str, otp: &str) -> Result<Value> {
        self.post("/auth/verify-otp", &json!({ "email": email, "otp": otp }))
            .await
    }
}
