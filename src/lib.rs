// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Campus Hub: client library for the campus services API
//!
//! This crate provides the typed REST client, the persisted login session,
//! a query cache, and the STOMP subscriber that keeps the cache current
//! from server push notifications.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod push;
pub mod session;
pub mod storage;
pub mod time_utils;

use api::ApiClient;
use cache::{QueryCache, QueryKey};
use config::Config;
use error::{ApiError, Result};
use models::{Event, Notification};
use push::{NotificationSubscriber, SubscriptionHandle};
use session::SessionManager;
use std::sync::Arc;
use storage::{SecureStore, SessionStorage};

/// The client's collaborators, wired together.
pub struct CampusHub {
    pub config: Config,
    pub session: SessionManager,
    pub cache: Arc<QueryCache>,
}

impl CampusHub {
    /// Build the client, session manager and cache over `store`.
    ///
    /// The cache is emptied whenever the session ends.
    pub fn new(config: Config, store: Arc<dyn SecureStore>) -> Result<Self> {
        let client = ApiClient::new(&config, SessionStorage::new(store))?;
        let session = SessionManager::new(client);
        let cache = Arc::new(QueryCache::new());

        let on_sign_out = Arc::clone(&cache);
        session.on_sign_out(move || {
            on_sign_out.clear();
            tracing::debug!("Query cache cleared on sign-out");
        });

        Ok(Self {
            config,
            session,
            cache,
        })
    }

    pub fn client(&self) -> &ApiClient {
        self.session.client()
    }

    /// Start receiving push notifications for the signed-in user.
    ///
    /// The subscriber stops by itself once that user signs out. Must be
    /// called from within a Tokio runtime.
    pub fn start_notifications(&self) -> Result<SubscriptionHandle> {
        let state = self.session.current();
        let (Some(token), Some(user)) = (state.token, state.user) else {
            return Err(ApiError::Validation(
                "Sign in to receive notifications".to_string(),
            ));
        };

        Ok(NotificationSubscriber::new(&self.config, user.id)
            .with_token(token)
            .with_cache(Arc::clone(&self.cache))
            .with_session(self.session.subscribe())
            .start())
    }

    // ─── Cached Queries ──────────────────────────────────────────

    pub async fn upcoming_events(&self) -> Result<Vec<Event>> {
        let client = self.client();
        self.cache
            .fetch(QueryKey::new("events").with("upcoming"), || {
                client.upcoming_events()
            })
            .await
    }

    /// The signed-in user's notifications.
    pub async fn notifications(&self) -> Result<Vec<Notification>> {
        let user_id = self
            .session
            .current()
            .user
            .map(|u| u.id)
            .ok_or_else(|| ApiError::Validation("Sign in to view notifications".to_string()))?;

        let client = self.client();
        self.cache
            .fetch(QueryKey::new("notifications").with(user_id), || {
                client.user_notifications(user_id)
            })
            .await
    }
}
