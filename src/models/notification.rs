// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Notifications, both listed over REST and pushed over STOMP.

use super::Extra;
use serde::{Deserialize, Serialize};

wire_enum! {
    /// What a notification is about. Drives which cached queries go stale.
    NotificationType {
        Event => "EVENT",
        Achievement => "ACHIEVEMENT",
        Book => "BOOK",
        LostFound => "LOST_FOUND",
        System => "SYSTEM",
        Emergency => "EMERGENCY",
    }
}

/// A notification record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(rename = "type", default)]
    pub notification_type: Option<NotificationType>,
    /// Recipient; absent for broadcasts
    #[serde(default)]
    pub user_id: Option<i64>,
    /// Read flag under either name the server uses. Null and absent both
    /// mean unread; each is written back under the name it arrived with.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_read: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read: Option<bool>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

impl Notification {
    pub fn is_read(&self) -> bool {
        self.is_read.or(self.read).unwrap_or(false)
    }

    /// Title and message joined for one-line display.
    pub fn summary(&self) -> String {
        match (self.title.as_deref(), self.message.as_deref()) {
            (Some(t), Some(m)) => format!("{}: {}", t, m),
            (Some(t), None) => t.to_string(),
            (None, Some(m)) => m.to_string(),
            (None, None) => "(empty notification)".to_string(),
        }
    }
}
