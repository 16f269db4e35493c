// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Push notifications over STOMP.

pub mod invalidation;
pub mod stomp;
pub mod subscriber;

pub use subscriber::{
    NotificationSubscriber, SubscriberConfig, SubscriberError, SubscriptionHandle,
    BROADCAST_TOPIC,
};
