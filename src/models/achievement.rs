//! Student achievement records.

use super::Extra;
use serde::{Deserialize, Serialize};
use validator::Validate;

wire_enum! {
    /// Achievement category.
    AchievementCategory {
        Academic => "ACADEMIC",
        Sports => "SPORTS",
        Cultural => "CULTURAL",
        Technical => "TECHNICAL",
        Social => "SOCIAL",
    }
}

/// Achievement record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Achievement {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<AchievementCategory>,
    #[serde(default)]
    pub achieved_date: Option<String>,
    #[serde(default)]
    pub student_name: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub likes_count: u32,
    #[serde(default)]
    pub comments_count: u32,
    #[serde(default)]
    pub shares_count: u32,
    #[serde(flatten)]
    pub extra: Extra,
}

/// Body for creating or updating an achievement.
#[derive(Debug, Clone, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AchievementInput {
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,
    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,
    pub category: AchievementCategory,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub achieved_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}
