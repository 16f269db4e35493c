// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Campus event records.

use super::Extra;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::Validate;

wire_enum! {
    /// Event category.
    EventCategory {
        Academic => "ACADEMIC",
        Cultural => "CULTURAL",
        Sports => "SPORTS",
        Technical => "TECHNICAL",
        Workshop => "WORKSHOP",
        Seminar => "SEMINAR",
    }
}

wire_enum! {
    /// Approval state of an event.
    EventStatus {
        Pending => "PENDING",
        Approved => "APPROVED",
        Rejected => "REJECTED",
        Cancelled => "CANCELLED",
    }
}

/// Event record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Start date/time (ISO 8601)
    #[serde(default)]
    pub event_date: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub category: Option<EventCategory>,
    #[serde(default)]
    pub status: Option<EventStatus>,
    #[serde(default)]
    pub max_participants: Option<u32>,
    #[serde(default)]
    pub registered_count: Option<u32>,
    #[serde(flatten)]
    pub extra: Extra,
}

impl Event {
    /// True when the server-reported registration count has reached capacity.
    pub fn is_full(&self) -> bool {
        match (self.max_participants, self.registered_count) {
            (Some(max), Some(count)) => max > 0 && count >= max,
            _ => false,
        }
    }
}

/// Body for creating or updating an event.
#[derive(Debug, Clone, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct EventInput {
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,
    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,
    #[validate(length(min = 1, message = "Event date is required"))]
    pub event_date: String,
    #[validate(length(min = 1, message = "Location is required"))]
    pub location: String,
    pub category: EventCategory,
    #[validate(range(min = 1, message = "Max participants must be at least 1"))]
    pub max_participants: u32,
}

/// A user's registration for an event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub user_id: Option<i64>,
    #[serde(default)]
    pub event_id: Option<i64>,
    #[serde(default)]
    pub registered_at: Option<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

/// Interpret an `is-registered` response.
///
/// The server answers either with a bare boolean or with an object carrying
/// `registered` / `isRegistered`.
pub(crate) fn registration_flag(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Object(map) => map
            .get("registered")
            .or_else(|| map.get("isRegistered"))
            .and_then(Value::as_bool)
            .unwrap_or(false),
        _ => false,
    }
}
