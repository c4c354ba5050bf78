//! TTL result cache
//!
//! Memoizes expensive multi-room pagination for identical requests within a
//! short window. This is a throughput guard, not a freshness guarantee:
//! callers must tolerate slightly stale payloads.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use sha2::{Digest, Sha256};

/// Default entry lifetime.
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

struct Entry<T> {
    payload: T,
    expires_at: Instant,
}

/// A thread-safe map with per-entry expiry, checked lazily at lookup time.
///
/// Expired entries behave identically to absence and are evicted by the
/// next lookup that observes them. Same-key concurrent puts resolve as
/// last-writer-wins.
pub struct TtlCache<T> {
    entries: Mutex<HashMap<String, Entry<T>>>,
    ttl: Duration,
}

impl<T: Clone> TtlCache<T> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    /// Look up a live entry. Evicts the entry instead when it has expired.
    pub fn get(&self, key: &str) -> Option<T> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        match entries.get(key) {
            Some(entry) if Instant::now() < entry.expires_at => Some(entry.payload.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    /// Insert a payload with the cache's TTL.
    pub fn put(&self, key: &str, payload: T) {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.insert(
            key.to_string(),
            Entry {
                payload,
                expires_at: Instant::now() + self.ttl,
            },
        );
    }
}

impl<T: Clone> Default for TtlCache<T> {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

/// Build the canonical cache key for a request shape.
///
/// The user and room ID lists are sorted and deduplicated first so the same
/// logical query hashes identically regardless of input ordering. The
/// canonical string is then SHA-256 hashed to keep keys uniform and free of
/// delimiter collisions with raw identifiers.
pub fn request_key(
    operation: &str,
    session_id: &str,
    start: &str,
    end: &str,
    user_ids: &[String],
    room_ids: &[String],
) -> String {
    let mut users: Vec<&str> = user_ids.iter().map(String::as_str).collect();
    users.sort_unstable();
    users.dedup();
    let mut rooms: Vec<&str> = room_ids.iter().map(String::as_str).collect();
    rooms.sort_unstable();
    rooms.dedup();

    let mut hasher = Sha256::new();
    hasher.update(operation.as_bytes());
    for part in [session_id, start, end] {
        hasher.update(b"\x1f");
        hasher.update(part.as_bytes());
    }
    hasher.update(b"\x1fu");
    for user in &users {
        hasher.update(b"\x1f");
        hasher.update(user.as_bytes());
    }
    hasher.update(b"\x1fr");
    for room in &rooms {
        hasher.update(b"\x1f");
        hasher.update(room.as_bytes());
    }
    format!("{:x}", hasher.finalize())
}
