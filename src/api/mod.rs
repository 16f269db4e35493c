// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Campus REST API client.
//!
//! `client` holds the request dispatch core; each other module adds the
//! endpoints of one API area as methods on [`ApiClient`].

pub mod achievements;
pub mod auth;
pub mod books;
pub mod chatbot;
pub mod client;
pub mod events;
pub mod lost_found;
pub mod notifications;
pub mod user;
pub mod weather;

pub use client::{ApiClient, LogoutHandler};
