use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

use purple_sui_server::idempotency::{self, Claim, IdempotencyCache};

#[test]
fn first_claim_is_fresh_and_duplicate_waits() {
    let cache = IdempotencyCache::new(Duration::from_secs(60));
    assert_eq!(cache.claim("k"), Claim::Fresh);
    assert_eq!(cache.claim("k"), Claim::InFlight);
    assert_eq!(cache.claim("other"), Claim::Fresh);
}

#[test]
fn completed_key_replays_the_stored_response() {
    let cache = IdempotencyCache::new(Duration::from_secs(60));
    assert_eq!(cache.claim("k"), Claim::Fresh);
    cache.complete("k", json!({ "success": true, "digest": "abc" }));
    assert_eq!(
        cache.claim("k"),
        Claim::Replay(json!({ "success": true, "digest": "abc" }))
    );
}

#[test]
fn released_key_can_be_retried() {
    let cache = IdempotencyCache::new(Duration::from_secs(60));
    assert_eq!(cache.claim("k"), Claim::Fresh);
    cache.release("k");
    assert!(cache.is_empty());
    assert_eq!(cache.claim("k"), Claim::Fresh);
}

#[test]
fn held_key_is_released_unless_completed() {
    let cache = IdempotencyCache::new(Duration::from_secs(60));

    assert_eq!(cache.claim("dropped"), Claim::Fresh);
    drop(cache.hold("dropped"));
    assert_eq!(cache.claim("dropped"), Claim::Fresh);

    assert_eq!(cache.claim("kept"), Claim::Fresh);
    cache.hold("kept").complete(json!({ "digest": "d" }));
    assert_eq!(cache.claim("kept"), Claim::Replay(json!({ "digest": "d" })));
}

#[test]
fn expired_entries_are_reclaimed_and_purged() {
    let cache = IdempotencyCache::new(Duration::ZERO);
    assert_eq!(cache.claim("done"), Claim::Fresh);
    cache.complete("done", json!({}));
    assert_eq!(cache.claim("done"), Claim::Fresh);

    cache.complete("done", json!({}));
    assert_eq!(cache.claim("busy"), Claim::Fresh);
    cache.purge_expired();
    // in-flight keys survive a purge
    assert_eq!(cache.len(), 1);
    assert_eq!(cache.claim("busy"), Claim::InFlight);
}

#[tokio::test]
async fn background_purge_runs() {
    let cache = Arc::new(IdempotencyCache::new(Duration::ZERO));
    cache.claim("k");
    cache.complete("k", json!({}));

    idempotency::start(cache.clone(), Duration::from_millis(10));
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(cache.is_empty());
}
