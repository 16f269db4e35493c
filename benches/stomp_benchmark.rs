use campus_hub::cache::{QueryCache, QueryKey};
use campus_hub::models::Notification;
use campus_hub::push::invalidation;
use campus_hub::push::stomp::decode_frames;
use criterion::{criterion_group, criterion_main, Criterion};
use serde_json::json;
use std::hint::black_box;

fn notification_payload(count: usize) -> Vec<u8> {
    let mut payload = Vec::new();
    for i in 0..count {
        let body = json!({
            "id": i,
            "title": "Library hours",
            "message": "The main library closes early on Friday",
            "type": if i % 2 == 0 { "EVENT" } else { "BOOK" },
            "userId": 42,
            "createdAt": "2026-01-05T15:04:00"
        })
        .to_string();
        payload.extend_from_slice(
            format!(
                "MESSAGE\ndestination:/topic/notifications/42\nsubscription:sub-0\nmessage-id:{}\ncontent-length:{}\n\n{}\0\n",
                i,
                body.len(),
                body
            )
            .as_bytes(),
        );
    }
    payload
}

fn benchmark_decode_frames(c: &mut Criterion) {
    let single = notification_payload(1);
    let batch = notification_payload(32);

    let mut group = c.benchmark_group("stomp_decode");

    group.bench_function("single_message", |b| {
        b.iter(|| decode_frames(black_box(&single)))
    });

    group.bench_function("batch_of_32", |b| {
        b.iter(|| decode_frames(black_box(&batch)))
    });

    group.finish();
}

fn benchmark_invalidation(c: &mut Criterion) {
    // A cache the size of a busy session
    let cache = QueryCache::new();
    for i in 0..500 {
        let root = ["events", "books", "achievements", "lostFoundItems"][i % 4];
        cache.insert(QueryKey::new(root).with(i), json!({"id": i}));
    }

    let notification: Notification =
        serde_json::from_value(json!({"id": 1, "type": "EVENT"})).expect("valid notification");

    c.bench_function("invalidate_for_event_notification", |b| {
        b.iter(|| invalidation::apply(&cache, black_box(&notification)))
    });
}

criterion_group!(benches, benchmark_decode_frames, benchmark_invalidation);
criterion_main!(benches);
