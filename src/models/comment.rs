//! Comments attached to events and achievements.

use super::Extra;
use serde::{Deserialize, Serialize};

/// A comment as returned by the comment listing endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: i64,
    #[serde(default, alias = "content")]
    pub comment: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

/// Body of a new comment.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct CommentInput<'a> {
    pub comment: &'a str,
}
