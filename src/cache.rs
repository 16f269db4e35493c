// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Cache of server state keyed by hierarchical query keys.
//!
//! Keys are ordered segments such as `["events", "upcoming", "42"]`.
//! Invalidating a prefix (`["events"]`) marks every key under it stale; the
//! next `fetch` for a stale key goes back to the server. Invalidations are also
//! published so that long-lived views can refetch eagerly.

use crate::error::ApiError;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::broadcast;

/// Capacity of the invalidation broadcast channel.
const INVALIDATION_CHANNEL_CAPACITY: usize = 64;

/// Hierarchical cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey(Vec<String>);

impl QueryKey {
    pub fn new(root: impl Into<String>) -> Self {
        Self(vec![root.into()])
    }

    /// Append a segment.
    pub fn with(mut self, segment: impl ToString) -> Self {
        self.0.push(segment.to_string());
        self
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// True if `prefix` is this key or an ancestor of it.
    pub fn starts_with(&self, prefix: &QueryKey) -> bool {
        self.0.starts_with(&prefix.0)
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.0.join(", "))
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    value: Value,
    fetched_at: DateTime<Utc>,
    stale: bool,
}

/// Shared query cache.
pub struct QueryCache {
    entries: DashMap<QueryKey, CacheEntry>,
    /// Bumped by every `invalidate`
    generation: AtomicU64,
    /// Generation at which each prefix was last invalidated
    invalidated_at: DashMap<QueryKey, u64>,
    invalidations: broadcast::Sender<QueryKey>,
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryCache {
    pub fn new() -> Self {
        let (invalidations, _) = broadcast::channel(INVALIDATION_CHANNEL_CAPACITY);
        Self {
            entries: DashMap::new(),
            generation: AtomicU64::new(0),
            invalidated_at: DashMap::new(),
            invalidations,
        }
    }

    /// Return the cached value for `key` if fresh, otherwise run `fetcher`
    /// and cache its result. Fetch errors are returned and nothing is cached.
    ///
    /// An invalidation that lands while the fetch is in flight leaves the
    /// newly stored value stale, so the next `fetch` goes back to the server.
    pub async fn fetch<T, F, Fut>(&self, key: QueryKey, fetcher: F) -> Result<T, ApiError>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, ApiError>>,
    {
        if let Some(value) = self.fresh(&key) {
            match serde_json::from_value(value) {
                Ok(cached) => return Ok(cached),
                Err(e) => {
                    tracing::warn!(key = %key, error = %e, "Cached value has unexpected shape, refetching");
                }
            }
        }

        let started = self.generation.load(Ordering::SeqCst);
        let fetched = fetcher().await?;
        match serde_json::to_value(&fetched) {
            Ok(value) => {
                self.insert(key.clone(), value);
                // Checked after the insert: a concurrent invalidate either shows
                // up here or marks the new entry itself.
                if self.invalidated_since(&key, started) {
                    tracing::debug!(key = %key, "Invalidated during fetch, storing as stale");
                    if let Some(mut entry) = self.entries.get_mut(&key) {
                        entry.stale = true;
                    }
                }
            }
            Err(e) => tracing::warn!(key = %key, error = %e, "Failed to cache fetched value"),
        }
        Ok(fetched)
    }

    /// Cached value for `key`, fresh or stale.
    pub fn peek(&self, key: &QueryKey) -> Option<Value> {
        self.entries.get(key).map(|e| e.value.clone())
    }

    /// True if `key` has a cached value that has not been invalidated.
    pub fn is_fresh(&self, key: &QueryKey) -> bool {
        self.entries.get(key).is_some_and(|e| !e.stale)
    }

    /// When the value for `key` was last stored.
    pub fn fetched_at(&self, key: &QueryKey) -> Option<DateTime<Utc>> {
        self.entries.get(key).map(|e| e.fetched_at)
    }

    pub fn insert(&self, key: QueryKey, value: Value) {
        self.entries.insert(
            key,
            CacheEntry {
                value,
                fetched_at: Utc::now(),
                stale: false,
            },
        );
    }

    /// Mark every key under `prefix` stale and publish the prefix.
    /// Returns the number of entries affected.
    pub fn invalidate(&self, prefix: &QueryKey) -> usize {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.invalidated_at.insert(prefix.clone(), generation);

        let mut count = 0;
        for mut entry in self.entries.iter_mut() {
            if entry.key().starts_with(prefix) && !entry.stale {
                entry.stale = true;
                count += 1;
            }
        }
        tracing::debug!(prefix = %prefix, count, "Invalidated cached queries");

        // No receivers is fine; invalidation still applies to the map.
        let _ = self.invalidations.send(prefix.clone());
        count
    }

    /// Receive every invalidated prefix from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<QueryKey> {
        self.invalidations.subscribe()
    }

    /// Drop everything, e.g. when the session ends.
    pub fn clear(&self) {
        self.entries.clear();
        self.invalidated_at.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// True if a prefix of `key` was invalidated after `generation`.
    fn invalidated_since(&self, key: &QueryKey, generation: u64) -> bool {
        self.invalidated_at
            .iter()
            .any(|e| *e.value() > generation && key.starts_with(e.key()))
    }

    fn fresh(&self, key: &QueryKey) -> Option<Value> {
        self.entries
            .get(key)
            .filter(|e| !e.stale)
            .map(|e| e.value.clone())
    }
}
