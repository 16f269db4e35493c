//! Which cached queries a pushed notification makes stale.

use crate::cache::{QueryCache, QueryKey};
use crate::models::{Notification, NotificationType};

/// Query-key roots refreshed by a notification.
///
/// The notification list itself is always refreshed; the rest depends on what
/// the notification is about.
pub fn stale_keys(notification: &Notification) -> Vec<QueryKey> {
    let roots: &[&str] = match &notification.notification_type {
        Some(NotificationType::Event) => &["events", "event", "eventRegistration", "eventComments"],
        Some(NotificationType::Achievement) => {
            &["achievements", "achievement", "achievementComments"]
        }
        Some(NotificationType::Book) => &["books", "book", "bookRequests"],
        Some(NotificationType::LostFound) => &["lostFoundItems", "lostFoundItem"],
        Some(NotificationType::System | NotificationType::Emergency | NotificationType::Other(_))
        | None => &[],
    };

    std::iter::once("notifications")
        .chain(roots.iter().copied())
        .map(QueryKey::new)
        .collect()
}

/// Invalidate everything `notification` makes stale. Returns the number of
/// cache entries marked stale.
pub fn apply(cache: &QueryCache, notification: &Notification) -> usize {
    stale_keys(notification)
        .iter()
        .map(|key| cache.invalidate(key))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn notification(kind: &str) -> Notification {
        serde_json::from_value(json!({"type": kind, "title": "t"})).unwrap()
    }

    fn roots(n: &Notification) -> Vec<String> {
        stale_keys(n)
            .into_iter()
            .map(|k| k.segments()[0].clone())
            .collect()
    }

    #[test]
    fn test_event_notification_keys() {
        assert_eq!(
            roots(&notification("EVENT")),
            vec!["notifications", "events", "event", "eventRegistration", "eventComments"]
        );
    }

    #[test]
    fn test_system_notification_only_refreshes_list() {
        assert_eq!(roots(&notification("SYSTEM")), vec!["notifications"]);
        assert_eq!(roots(&notification("EMERGENCY")), vec!["notifications"]);
        let untyped: Notification = serde_json::from_value(json!({})).unwrap();
        assert_eq!(roots(&untyped), vec!["notifications"]);
    }

    #[test]
    fn test_apply_marks_matching_entries() {
        let cache = QueryCache::new();
        cache.insert(QueryKey::new("books").with("SELL").with(""), Value::Null);
        cache.insert(QueryKey::new("book").with(3), Value::Null);
        cache.insert(QueryKey::new("events").with("upcoming"), Value::Null);

        assert_eq!(apply(&cache, &notification("BOOK")), 2);
        assert!(cache.is_fresh(&QueryKey::new("events").with("upcoming")));
    }
}
