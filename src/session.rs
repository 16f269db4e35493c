// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! The signed-in session: token and user, persisted and observable.
//!
//! `SessionManager` is the only writer of session state. Observers get a
//! `watch` receiver and see every transition. A 401 from any request ends the
//! session through the client's logout handler; concurrent 401s end it once.

use crate::api::ApiClient;
use crate::error::Result;
use crate::models::{AuthResponse, SignupRequest, User};
use crate::storage::SessionStorage;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use std::collections::HashSet;
use std::sync::{Arc, RwLock};
use tokio::sync::watch;

/// Snapshot of the session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    pub token: Option<String>,
    pub user: Option<User>,
    /// True until stored credentials have been checked
    pub is_loading: bool,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            token: None,
            user: None,
            is_loading: true,
        }
    }
}

impl SessionState {
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some() && self.user.is_some()
    }
}

type SignOutHook = Box<dyn Fn() + Send + Sync>;

/// State shared with the client's logout handler.
///
/// Holds no reference to the client, so the handler does not keep the
/// client alive.
struct Shared {
    state: watch::Sender<SessionState>,
    sign_out_hooks: RwLock<Vec<SignOutHook>>,
}

impl Shared {
    /// Clear the session. Returns false if there was nothing to clear.
    fn sign_out(&self) -> bool {
        let changed = self.state.send_if_modified(|s| {
            let had_session = s.token.is_some() || s.user.is_some();
            s.token = None;
            s.user = None;
            let was_loading = std::mem::replace(&mut s.is_loading, false);
            had_session || was_loading
        });

        if changed {
            let hooks = match self.sign_out_hooks.read() {
                Ok(hooks) => hooks,
                Err(poisoned) => poisoned.into_inner(),
            };
            for hook in hooks.iter() {
                hook();
            }
        }
        changed
    }
}

/// Login state machine over an `ApiClient` and its session storage.
pub struct SessionManager {
    client: ApiClient,
    shared: Arc<Shared>,
}

impl SessionManager {
    /// Create the manager and install it as the client's logout handler.
    pub fn new(client: ApiClient) -> Self {
        let (state, _) = watch::channel(SessionState::default());
        let shared = Arc::new(Shared {
            state,
            sign_out_hooks: RwLock::new(Vec::new()),
        });

        let handler_shared = Arc::clone(&shared);
        client.set_logout_handler(move || {
            if handler_shared.sign_out() {
                tracing::info!("Session ended by server");
            }
        });

        Self { client, shared }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    fn storage(&self) -> &SessionStorage {
        self.client.storage()
    }

    /// Run `hook` every time the session ends, whether by `logout` or a 401.
    pub fn on_sign_out(&self, hook: impl Fn() + Send + Sync + 'static) {
        match self.shared.sign_out_hooks.write() {
            Ok(mut hooks) => hooks.push(Box::new(hook)),
            Err(poisoned) => poisoned.into_inner().push(Box::new(hook)),
        }
    }

    /// Current session snapshot.
    pub fn current(&self) -> SessionState {
        self.shared.state.borrow().clone()
    }

    /// Observe session changes.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.shared.state.subscribe()
    }

    /// Restore the session from storage.
    ///
    /// Both token and user must be present. A token that is a JWT past its
    /// `exp` is discarded along with the rest of the stored session.
    pub fn load_stored_auth(&self) -> SessionState {
        let storage = self.storage();

        let token = storage.token().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Failed to read stored token");
            None
        });
        let user = storage.user().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Failed to read stored user");
            None
        });

        let restored = match (token, user) {
            (Some(token), Some(user)) if token_expired(&token) => {
                tracing::info!(user_id = user.id, "Stored token has expired, discarding session");
                if let Err(e) = storage.clear_all() {
                    tracing::warn!(error = %e, "Failed to clear expired session");
                }
                None
            }
            (Some(token), Some(user)) => Some((token, user)),
            _ => None,
        };

        self.shared.state.send_modify(|s| {
            s.is_loading = false;
            match restored {
                Some((token, user)) => {
                    tracing::info!(user_id = user.id, "Restored stored session");
                    s.token = Some(token);
                    s.user = Some(user);
                }
                None => {
                    s.token = None;
                    s.user = None;
                }
            }
        });
        self.current()
    }

    /// Sign in and persist the session.
    pub async fn login(&self, username_or_email: &str, password: &str) -> Result<User> {
        let auth = self.client.signin(username_or_email, password).await?;
        tracing::info!(user_id = auth.user.id, "Signed in");
        Ok(self.establish(auth))
    }

    /// Register, then hold the new account's session.
    pub async fn signup(&self, request: &SignupRequest) -> Result<User> {
        let auth = self.client.signup(request).await?;
        tracing::info!(user_id = auth.user.id, "Account created");
        Ok(self.establish(auth))
    }

    /// Clear stored credentials and the in-memory session.
    pub fn logout(&self) {
        if let Err(e) = self.storage().clear_all() {
            tracing::warn!(error = %e, "Failed to clear session storage");
        }
        if self.shared.sign_out() {
            tracing::info!("Signed out");
        }
    }

    /// Replace the session's user record, e.g. after a profile edit.
    pub fn update_user(&self, user: User) {
        if let Err(e) = self.storage().save_user(&user) {
            tracing::warn!(user_id = user.id, error = %e, "Failed to persist user");
        }
        self.shared.state.send_modify(|s| s.user = Some(user));
    }

    fn establish(&self, auth: AuthResponse) -> User {
        let storage = self.storage();
        if let Err(e) = storage.save_token(&auth.token) {
            tracing::warn!(error = %e, "Failed to persist token");
        }
        if let Err(e) = storage.save_user(&auth.user) {
            tracing::warn!(error = %e, "Failed to persist user");
        }
        if let Some(refresh) = &auth.refresh_token {
            if let Err(e) = storage.save_refresh_token(refresh) {
                tracing::warn!(error = %e, "Failed to persist refresh token");
            }
        }

        let user = auth.user;
        self.shared.state.send_modify(|s| {
            s.token = Some(auth.token);
            s.user = Some(user.clone());
            s.is_loading = false;
        });
        user
    }
}

#[derive(Debug, Deserialize)]
struct ExpiryClaims {
    #[serde(default)]
    exp: Option<i64>,
}

/// True if `token` is a JWT whose `exp` is in the past.
///
/// The signature is not checked; the server remains the authority. Tokens
/// that are not JWTs, or carry no `exp`, are never considered expired.
fn token_expired(token: &str) -> bool {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims = HashSet::new();

    match decode::<ExpiryClaims>(token, &DecodingKey::from_secret(&[]), &validation) {
        Ok(data) => data
            .claims
            .exp
            .is_some_and(|exp| exp <= chrono::Utc::now().timestamp()),
        Err(_) => false,
    }
}
