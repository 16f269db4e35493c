//! Lost & found items.

use super::{Extra, Upload};
use serde::{Deserialize, Serialize};
use validator::Validate;

wire_enum! {
    /// Whether an item was lost or found.
    ItemType {
        Lost => "LOST",
        Found => "FOUND",
    }
}

wire_enum! {
    /// Item category.
    LostFoundCategory {
        Electronics => "ELECTRONICS",
        Books => "BOOKS",
        Clothing => "CLOTHING",
        Accessories => "ACCESSORIES",
        Documents => "DOCUMENTS",
    }
}

/// Lost or found item report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LostFoundItem {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<LostFoundCategory>,
    #[serde(rename = "type", default)]
    pub item_type: Option<ItemType>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub date_reported: Option<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

/// Query parameters for `GET /lost-found/items`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct LostFoundFilter {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub item_type: Option<ItemType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<LostFoundCategory>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// New report, sent as a multipart form.
#[derive(Debug, Clone, Validate)]
pub struct NewLostFoundItem {
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,
    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,
    pub category: LostFoundCategory,
    pub item_type: ItemType,
    #[validate(length(min = 1, message = "Location is required"))]
    pub location: String,
    pub image: Option<Upload>,
}

impl NewLostFoundItem {
    pub(crate) fn form_fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("title", self.title.trim().to_string()),
            ("description", self.description.trim().to_string()),
            ("category", self.category.as_str().to_string()),
            ("type", self.item_type.as_str().to_string()),
            ("location", self.location.trim().to_string()),
        ]
    }
}

/// Partial item update.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LostFoundUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ClaimRequest<'a> {
    pub claim_message: &'a str,
}
