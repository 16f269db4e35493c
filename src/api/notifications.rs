//! Notification endpoints.

use super::ApiClient;
use crate::error::Result;
use crate::models::Notification;
use serde_json::Value;

impl ApiClient {
    pub async fn user_notifications(&self, user_id: i64) -> Result<Vec<Notification>> {
        self.get(&format!("/notifications/user/{}", user_id)).await
    }

    pub async fn mark_notification_read(&self, notification_id: i64) -> Result<Value> {
        self.put_empty(&format!("/notifications/{}/read", notification_id))
            .await
    }

    pub async fn delete_notification(&self, notification_id: i64) -> Result<Value> {
        self.delete(&format!("/notifications/{}", notification_id))
            .await
    }
}
