// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Endpoint wire-format tests: paths, query strings, JSON and multipart bodies.

use axum::{
    routing::{get, post, put},
    Json, Router,
};
use campus_hub::error::ApiError;
use campus_hub::models::{
    BookFilter, BookType, ChatHistory, ItemType, LostFoundCategory, NewBook, NewLostFoundItem,
    Upload,
};
use serde_json::{json, Value};

mod common;

fn book_json(id: i64) -> Value {
    json!({"id": id, "title": "Linear Algebra", "bookType": "SELL", "price": 12.5})
}

#[tokio::test]
async fn test_book_filter_query_string() {
    let router = Router::new().route("/books", get(|| async { Json(json!([book_json(1)])) }));
    let (base, seen) = common::serve_recorded(router).await;
    let client = common::test_client(&base);

    let filter = BookFilter {
        book_type: Some(BookType::Sell),
        search: Some("algebra".to_string()),
        owner: None,
    };
    let books = client.books(&filter).await.unwrap();
    assert_eq!(books.len(), 1);

    let query = seen.last().query.unwrap();
    assert!(query.contains("type=SELL"), "query was {}", query);
    assert!(query.contains("search=algebra"), "query was {}", query);
    assert!(!query.contains("owner"), "query was {}", query);
}

#[tokio::test]
async fn test_signin_body() {
    let router = Router::new().route(
        "/auth/signin",
        post(|| async { Json(json!({"token": "t", "user": common::user_json(3)})) }),
    );
    let (base, seen) = common::serve_recorded(router).await;
    let client = common::test_client(&base);

    let auth = client.signin("asha@uni.edu", "secret123").await.unwrap();
    assert_eq!(auth.user.id, 3);

    let body: Value = serde_json::from_str(&seen.last().body).unwrap();
    assert_eq!(
        body,
        json!({"usernameOrEmail": "asha@uni.edu", "password": "secret123"})
    );
}

#[tokio::test]
async fn test_create_book_multipart() {
    let router = Router::new().route("/books", post(|| async { Json(book_json(9)) }));
    let (base, seen) = common::serve_recorded(router).await;
    let client = common::test_client(&base);

    let book = NewBook {
        title: " Linear Algebra ".to_string(),
        author: "Strang".to_string(),
        description: String::new(),
        isbn: String::new(),
        category: "Mathematics".to_string(),
        condition: "Good".to_string(),
        book_type: BookType::Sell,
        price: Some(12.5),
        file: Some(Upload::new("notes.pdf", "application/pdf", b"%PDF-1.4".to_vec())),
    };
    let created = client.create_book(&book).await.unwrap();
    assert_eq!(created.id, 9);

    let req = seen.last();
    assert!(req
        .content_type
        .unwrap()
        .starts_with("multipart/form-data"));
    assert!(req.body.contains("name=\"title\"\r\n\r\nLinear Algebra\r\n"));
    assert!(req.body.contains("name=\"price\"\r\n\r\n12.50\r\n"));
    assert!(req.body.contains("name=\"bookType\"\r\n\r\nSELL\r\n"));
    assert!(req.body.contains("filename=\"notes.pdf\""));
}

#[tokio::test]
async fn test_unpriced_sale_rejected_before_dispatch() {
    let router = Router::new().route("/books", post(|| async { Json(book_json(9)) }));
    let (base, seen) = common::serve_recorded(router).await;
    let client = common::test_client(&base);

    let book = NewBook {
        title: "Linear Algebra".to_string(),
        author: "Strang".to_string(),
        description: String::new(),
        isbn: String::new(),
        category: "Mathematics".to_string(),
        condition: "Good".to_string(),
        book_type: BookType::Sell,
        price: None,
        file: None,
    };
    let err = client.create_book(&book).await.unwrap_err();
    assert_eq!(
        err.message(),
        "Please enter a valid price for a book you are selling"
    );
    assert_eq!(seen.count(), 0);
}

#[tokio::test]
async fn test_invalid_image_rejected_before_dispatch() {
    let router = Router::new().route(
        "/lost-found/items",
        post(|| async { Json(json!({"id": 1, "title": "x"})) }),
    );
    let (base, seen) = common::serve_recorded(router).await;
    let client = common::test_client(&base);

    let item = NewLostFoundItem {
        title: "Calculator".to_string(),
        description: "Grey TI-84".to_string(),
        category: LostFoundCategory::Electronics,
        item_type: ItemType::Lost,
        location: "Library".to_string(),
        image: Some(Upload::new("photo.gif", "image/gif", vec![0; 16])),
    };
    let err = client.create_lost_found_item(&item).await.unwrap_err();
    assert!(matches!(err, ApiError::Validation(_)));
    assert_eq!(seen.count(), 0);
}

#[tokio::test]
async fn test_is_registered_accepts_both_shapes() {
    let router = Router::new()
        .route("/events/1/is-registered", get(|| async { Json(json!(true)) }))
        .route(
            "/events/2/is-registered",
            get(|| async { Json(json!({"registered": false})) }),
        )
        .route(
            "/events/3/is-registered",
            get(|| async { Json(json!({"isRegistered": true})) }),
        );
    let base = common::serve(router).await;
    let client = common::test_client(&base);

    assert!(client.is_registered_for_event(1).await.unwrap());
    assert!(!client.is_registered_for_event(2).await.unwrap());
    assert!(client.is_registered_for_event(3).await.unwrap());
}

#[tokio::test]
async fn test_converse_sends_history_window() {
    let router = Router::new().route(
        "/chatbot/ask",
        post(|| async { Json(json!({"response": "Library closes at 10pm."})) }),
    );
    let (base, seen) = common::serve_recorded(router).await;
    let client = common::test_client(&base);

    let mut history = ChatHistory::new();
    for i in 0..6 {
        client
            .converse(&mut history, &format!("question {}", i))
            .await
            .unwrap();
    }
    assert_eq!(history.turns().len(), 12);

    let body: Value = serde_json::from_str(&seen.last().body).unwrap();
    assert_eq!(body["message"], "question 5");
    let sent = body["conversationHistory"].as_array().unwrap();
    assert_eq!(sent.len(), 10);
    assert_eq!(sent[0]["role"], "user");
    assert_eq!(sent[0]["content"], "question 0");
}

#[tokio::test]
async fn test_mark_notification_read_and_weather_city() {
    let router = Router::new()
        .route("/notifications/4/read", put(|| async { "" }))
        .route(
            "/weather/current",
            get(|| async { Json(json!({"temperature": 21})) }),
        );
    let (base, seen) = common::serve_recorded(router).await;
    let client = common::test_client(&base);

    assert_eq!(client.mark_notification_read(4).await.unwrap(), Value::Null);
    assert_eq!(seen.last().method, "PUT");

    let weather = client.current_weather(Some("Pune")).await.unwrap();
    assert_eq!(weather["temperature"], 21);
    assert_eq!(seen.last().query.as_deref(), Some("city=Pune"));
}
