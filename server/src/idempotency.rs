//! In-memory idempotency table for write routes.
//!
//! A client-supplied `Idempotency-Key` is claimed before the chain call. A
//! second request with the same key is refused while the first is in flight
//! and gets the stored response once it has completed. Failed attempts
//! release the key so the caller may retry, and so does a request whose
//! future is dropped or panics before completing (see [`HeldKey`]).

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde_json::Value;
use std::sync::Arc;
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
enum Slot {
    InFlight,
    Done { response: Value, at: Instant },
}

/// Result of [`IdempotencyCache::claim`].
#[derive(Debug, Clone, PartialEq)]
pub enum Claim {
    /// Caller owns the key and must `complete` or `release` it.
    Fresh,
    InFlight,
    Replay(Value),
}

#[derive(Debug)]
pub struct IdempotencyCache {
    slots: DashMap<String, Slot>,
    ttl: Duration,
}

impl IdempotencyCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            slots: DashMap::new(),
            ttl,
        }
    }

    pub fn claim(&self, key: &str) -> Claim {
        match self.slots.entry(key.to_owned()) {
            Entry::Vacant(v) => {
                v.insert(Slot::InFlight);
                Claim::Fresh
            }
            Entry::Occupied(mut o) => {
                match o.get() {
                    Slot::InFlight => return Claim::InFlight,
                    Slot::Done { response, at } if at.elapsed() < self.ttl => {
                        return Claim::Replay(response.clone())
                    }
                    Slot::Done { .. } => {}
                }
                // expired: reuse the key
                o.insert(Slot::InFlight);
                Claim::Fresh
            }
        }
    }

    /// Hold a freshly claimed key; it is released when the guard drops
    /// without [`HeldKey::complete`].
    pub fn hold<'a>(&'a self, key: &'a str) -> HeldKey<'a> {
        HeldKey {
            cache: self,
            key,
            completed: false,
        }
    }

    pub fn complete(&self, key: &str, response: Value) {
        self.slots.insert(
            key.to_owned(),
            Slot::Done {
                response,
                at: Instant::now(),
            },
        );
    }

    pub fn release(&self, key: &str) {
        self.slots.remove(key);
    }

    /// Drop completed entries older than the TTL. In-flight keys are kept.
    pub fn purge_expired(&self) {
        let ttl = self.ttl;
        self.slots
            .retain(|_, slot| !matches!(slot, Slot::Done { at, .. } if at.elapsed() >= ttl));
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

/// Ownership of an in-flight key.
#[must_use]
pub struct HeldKey<'a> {
    cache: &'a IdempotencyCache,
    key: &'a str,
    completed: bool,
}

impl HeldKey<'_> {
    pub fn complete(mut self, response: Value) {
        self.cache.complete(self.key, response);
        self.completed = true;
    }
}

impl Drop for HeldKey<'_> {
    fn drop(&mut self) {
        if !self.completed {
            log::debug!("clé {} libérée sans réponse", self.key);
            self.cache.release(self.key);
        }
    }
}

/// Periodically purge expired keys.
pub fn start(cache: Arc<IdempotencyCache>, every: Duration) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        loop {
            ticker.tick().await;
            cache.purge_expired();
            log::debug!("idempotency table: {} clés", cache.len());
        }
    });
}
