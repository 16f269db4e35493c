// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Records exchanged with the campus API.
//!
//! Entities are owned by the server. Each record names the fields this crate
//! reads and keeps everything else in an `extra` map, so a record written back
//! carries the fields it was fetched with.

/// Declare a SCREAMING_SNAKE_CASE wire enum with an `Other` fallback for
/// values this client does not know about. `Other` keeps the raw wire value so
/// it is written back unchanged.
macro_rules! wire_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $wire:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant,)+
            Other(String),
        }

        impl $name {
            /// Wire representation, as used in URL paths and form fields.
            pub fn as_str(&self) -> &str {
                match self {
                    $(Self::$variant => $wire,)+
                    Self::Other(raw) => raw.as_str(),
                }
            }

            fn from_wire(raw: &str) -> Self {
                match raw {
                    $($wire => Self::$variant,)+
                    other => Self::Other(other.to_string()),
                }
            }
        }

        impl ::serde::Serialize for $name {
            fn serialize<S: ::serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> ::serde::Deserialize<'de> for $name {
            fn deserialize<D: ::serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = <String as ::serde::Deserialize>::deserialize(deserializer)?;
                Ok(Self::from_wire(&raw))
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = String;

            /// Parse user input. Unlike deserialization, unknown values are rejected.
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let normalized = s.trim().to_ascii_uppercase().replace('-', "_");
                match normalized.as_str() {
                    $($wire => Ok(Self::$variant),)+
                    "OTHER" => Ok(Self::Other(normalized)),
                    other => Err(format!("unknown {}: {}", stringify!($name), other)),
                }
            }
        }
    };
}

pub mod achievement;
pub mod book;
pub mod chat;
pub mod comment;
pub mod event;
pub mod lost_found;
pub mod notification;
pub mod upload;
pub mod user;

pub use achievement::{Achievement, AchievementCategory, AchievementInput};
pub use book::{Book, BookFilter, BookRequest, BookStatus, BookType, BookUpdate, NewBook, NewBookRequest};
pub use chat::{ChatHistory, ChatReply, ChatRole, ChatTurn};
pub use comment::Comment;
pub use event::{Event, EventCategory, EventInput, EventStatus, Registration};
pub use lost_found::{
    ItemType, LostFoundCategory, LostFoundFilter, LostFoundItem, LostFoundUpdate, NewLostFoundItem,
};
pub use notification::{Notification, NotificationType};
pub use upload::Upload;
pub use user::{AuthResponse, OAuthProvider, ProfileUpdate, ResetPasswordRequest, Role, SignupRequest, User};

/// Fields of a record this client does not model explicitly.
pub type Extra = serde_json::Map<String, serde_json::Value>;
