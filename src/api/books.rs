// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Book exchange endpoints.

use super::client::{file_part, text_form};
use super::ApiClient;
use crate::error::Result;
use crate::models::{Book, BookFilter, BookRequest, BookType, BookUpdate, NewBook, NewBookRequest};
use serde_json::Value;
use validator::Validate;

impl ApiClient {
    /// Approved listings, optionally filtered by type, free text and owner.
    pub async fn books(&self, filter: &BookFilter) -> Result<Vec<Book>> {
        self.get_query("/books", filter).await
    }

    pub async fn books_by_type(&self, book_type: BookType) -> Result<Vec<Book>> {
        self.get(&format!("/books/type/{}", book_type)).await
    }

    pub async fn books_by_owner(&self, owner_id: i64) -> Result<Vec<Book>> {
        self.get(&format!("/books/owner/{}", owner_id)).await
    }

    pub async fn book(&self, book_id: i64) -> Result<Book> {
        self.get(&format!("/books/{}", book_id)).await
    }

    pub async fn search_books(&self, query: &str) -> Result<Vec<Book>> {
        self.get_query("/books/search", &[("query", query)]).await
    }

    /// List a book. An attached file is sent as the `file` part.
    pub async fn create_book(&self, book: &NewBook) -> Result<Book> {
        book.validate()?;
        let mut form = text_form(book.form_fields());
        if let Some(file) = &book.file {
            form = form.part("file", file_part(file)?);
        }
        self.post_multipart("/books", form).await
    }

    pub async fn update_book(&self, book_id: i64, update: &BookUpdate) -> Result<Book> {
        self.put(&format!("/books/{}", book_id), update).await
    }

    pub async fn delete_book(&self, book_id: i64) -> Result<Value> {
        self.delete(&format!("/books/{}", book_id)).await
    }

    /// Record a download of the listing's file.
    pub async fn track_book_download(&self, book_id: i64) -> Result<Value> {
        self.post_empty(&format!("/books/{}/download", book_id))
            .await
    }

    pub async fn create_book_request(&self, request: &NewBookRequest) -> Result<BookRequest> {
        self.post("/books/requests", request).await
    }

    pub async fn book_requests(&self, book_id: i64) -> Result<Vec<BookRequest>> {
        self.get(&format!("/books/{}/requests", book_id)).await
    }
}
