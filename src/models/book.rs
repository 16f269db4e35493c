// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Book exchange records and forms.

use super::{Extra, Upload};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

wire_enum! {
    /// How a listed book is offered.
    BookType {
        Sell => "SELL",
        Donate => "DONATE",
        Exchange => "EXCHANGE",
    }
}

wire_enum! {
    /// Listing state of a book.
    BookStatus {
        Pending => "PENDING",
        Approved => "APPROVED",
        Rejected => "REJECTED",
        Sold => "SOLD",
        Donated => "DONATED",
    }
}

/// Book listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub book_type: Option<BookType>,
    #[serde(default)]
    pub status: Option<BookStatus>,
    #[serde(default)]
    pub condition: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub owner_name: Option<String>,
    #[serde(default)]
    pub download_count: u32,
    #[serde(flatten)]
    pub extra: Extra,
}

/// Query parameters for `GET /books`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BookFilter {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub book_type: Option<BookType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<i64>,
}

/// New listing, sent as a multipart form.
#[derive(Debug, Clone, Validate)]
#[validate(schema(function = "validate_sell_price"))]
pub struct NewBook {
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,
    #[validate(length(min = 1, message = "Author is required"))]
    pub author: String,
    pub description: String,
    pub isbn: String,
    pub category: String,
    pub condition: String,
    pub book_type: BookType,
    /// Only sent for `SELL` listings
    pub price: Option<f64>,
    /// Optional PDF or scan of the book
    pub file: Option<Upload>,
}

/// A book offered for sale needs a positive price.
fn validate_sell_price(book: &NewBook) -> Result<(), ValidationError> {
    if book.book_type != BookType::Sell {
        return Ok(());
    }
    match book.price {
        Some(price) if price.is_finite() && price > 0.0 => Ok(()),
        _ => Err(ValidationError::new("price")
            .with_message("Please enter a valid price for a book you are selling".into())),
    }
}

impl NewBook {
    /// Text fields in the order the server expects them.
    pub(crate) fn form_fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![
            ("title", self.title.trim().to_string()),
            ("author", self.author.trim().to_string()),
            ("description", self.description.trim().to_string()),
            ("isbn", self.isbn.trim().to_string()),
            ("category", self.category.clone()),
            ("condition", self.condition.clone()),
            ("bookType", self.book_type.as_str().to_string()),
        ];
        if self.book_type == BookType::Sell {
            if let Some(price) = self.price {
                fields.push(("price", format!("{:.2}", price)));
            }
        }
        fields
    }
}

/// Partial book update.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<BookStatus>,
}

/// Request to obtain a listed book.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBookRequest {
    pub book_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// A request made against a listing, as seen by its owner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookRequest {
    pub id: i64,
    #[serde(default)]
    pub book_id: Option<i64>,
    #[serde(default)]
    pub requester_name: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(flatten)]
    pub extra: Extra,
}
