// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Event endpoints.

use super::ApiClient;
use crate::error::Result;
use crate::models::comment::CommentInput;
use crate::models::event::registration_flag;
use crate::models::{Comment, Event, EventCategory, EventInput, Registration};
use serde_json::Value;
use validator::Validate;

impl ApiClient {
    // ─── Listings ────────────────────────────────────────────────

    pub async fn approved_events(&self) -> Result<Vec<Event>> {
        self.get("/events/approved").await
    }

    pub async fn upcoming_events(&self) -> Result<Vec<Event>> {
        self.get("/events/upcoming").await
    }

    pub async fn past_events(&self) -> Result<Vec<Event>> {
        self.get("/events/past").await
    }

    pub async fn events_by_category(&self, category: EventCategory) -> Result<Vec<Event>> {
        self.get(&format!("/events/category/{}", category)).await
    }

    pub async fn event(&self, event_id: i64) -> Result<Event> {
        self.get(&format!("/events/{}", event_id)).await
    }

    /// Events created by a user.
    pub async fn my_events(&self, creator_id: i64) -> Result<Vec<Event>> {
        self.get(&format!("/events/my-events/{}", creator_id)).await
    }

    /// Events a user has registered for.
    pub async fn registered_events(&self, user_id: i64) -> Result<Vec<Event>> {
        self.get(&format!("/events/user/{}/registered", user_id))
            .await
    }

    // ─── Authoring ───────────────────────────────────────────────

    /// Submit a new event. It stays pending until approved server-side.
    pub async fn create_event(&self, input: &EventInput) -> Result<Event> {
        input.validate()?;
        self.post("/events", input).await
    }

    pub async fn update_event(&self, event_id: i64, input: &EventInput) -> Result<Event> {
        input.validate()?;
        self.put(&format!("/events/{}", event_id), input).await
    }

    pub async fn delete_event(&self, event_id: i64) -> Result<Value> {
        self.delete(&format!("/events/{}", event_id)).await
    }

    // ─── Registration ────────────────────────────────────────────

    pub async fn register_for_event(&self, event_id: i64) -> Result<Value> {
        self.post_empty(&format!("/events/{}/register", event_id))
            .await
    }

    pub async fn cancel_event_registration(&self, event_id: i64) -> Result<Value> {
        self.post_empty(&format!("/events/{}/cancel-registration", event_id))
            .await
    }

    pub async fn event_registrations(&self, event_id: i64) -> Result<Vec<Registration>> {
        self.get(&format!("/events/{}/registrations", event_id))
            .await
    }

    /// Whether the signed-in user is registered for an event.
    pub async fn is_registered_for_event(&self, event_id: i64) -> Result<bool> {
        let value: Value = self
            .get(&format!("/events/{}/is-registered", event_id))
            .await?;
        Ok(registration_flag(&value))
    }

    // ─── Comments ────────────────────────────────────────────────

    pub async fn event_comments(&self, event_id: i64) -> Result<Vec<Comment>> {
        self.get(&format!("/events/{}/comments", event_id)).await
    }

    pub async fn add_event_comment(&self, event_id: i64, comment: &str) -> Result<Comment> {
        self.post(
            &format!("/events/{}/comments", event_id),
            &CommentInput { comment },
        )
        .await
    }

    pub async fn delete_event_comment(&self, event_id: i64, comment_id: i64) -> Result<Value> {
        self.delete(&format!("/events/{}/comments/{}", event_id, comment_id))
            .await
    }
}
