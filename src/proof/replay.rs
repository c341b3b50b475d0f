// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Single-use markers for accepted proofs.
//!
//! Payloads are stateless, so without this guard a signed proof could be
//! replayed until its payload expires. Each accepted payload leaves a marker
//! that lives exactly as long as the payload itself.

use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::num::NonZeroUsize;
use std::sync::Mutex;

use lru::LruCache;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ReplayRejected {
    #[error("payload already consumed")]
    AlreadyConsumed,
    /// Every slot holds a live marker; evicting one would reopen a replay.
    #[error("replay cache is full of live markers")]
    Full,
}

/// Markers plus an index ordered by expiry.
///
/// Acceptance order is not expiry order (a payload issued early may be
/// redeemed late), so the LRU order alone cannot tell which markers are
/// stale. The heap can hold entries whose marker is already gone; those are
/// skipped when popped.
struct Markers {
    live: LruCache<Vec<u8>, u64>,
    by_expiry: BinaryHeap<Reverse<(u64, Vec<u8>)>>,
}

impl Markers {
    /// Drop every marker that expired before `now`. Returns how many.
    fn drop_expired(&mut self, now: u64) -> usize {
        let mut dropped = 0;
        while let Some(Reverse((expires_at, _))) = self.by_expiry.peek() {
            if *expires_at >= now {
                break;
            }
            let Some(Reverse((expires_at, key))) = self.by_expiry.pop() else {
                break;
            };
            if self.live.peek(&key) == Some(&expires_at) {
                self.live.pop(&key);
                dropped += 1;
            }
        }
        dropped
    }
}

/// In-process store of consumed payloads.
pub struct ReplayGuard {
    markers: Mutex<Markers>,
}

impl ReplayGuard {
    /// Create a guard holding at most `capacity` live markers.
    pub fn new(capacity: usize) -> Self {
        Self {
            markers: Mutex::new(Markers {
                live: LruCache::new(NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN)),
                by_expiry: BinaryHeap::new(),
            }),
        }
    }

    /// Record `key` as consumed until `expires_at`.
    ///
    /// Fails if a live marker for `key` already exists.
    pub fn consume(&self, key: &[u8], expires_at: u64, now: u64) -> Result<(), ReplayRejected> {
        // A poisoned lock means another thread panicked mid-update; refuse.
        let mut markers = self.markers.lock().map_err(|_| ReplayRejected::Full)?;

        if let Some(&existing) = markers.live.peek(key) {
            if existing >= now {
                return Err(ReplayRejected::AlreadyConsumed);
            }
            markers.live.pop(key);
        }

        if markers.live.len() == markers.live.cap().get() && markers.drop_expired(now) == 0 {
            return Err(ReplayRejected::Full);
        }

        markers.live.put(key.to_vec(), expires_at);
        markers.by_expiry.push(Reverse((expires_at, key.to_vec())));
        Ok(())
    }

    /// Drop markers whose payloads have expired. Returns how many were dropped.
    pub fn purge_expired(&self, now: u64) -> usize {
        match self.markers.lock() {
            Ok(mut markers) => markers.drop_expired(now),
            Err(_) => 0,
        }
    }

    pub fn len(&self) -> usize {
        self.markers.lock().map(|m| m.live.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_use_is_rejected() {
        let guard = ReplayGuard::new(10);
        assert_eq!(guard.consume(b"p1", 300, 100), Ok(()));
        assert_eq!(
            guard.consume(b"p1", 300, 200),
            Err(ReplayRejected::AlreadyConsumed)
        );
        assert_eq!(guard.consume(b"p2", 300, 200), Ok(()));
    }

    #[test]
    fn marker_lives_through_the_expiry_second() {
        let guard = ReplayGuard::new(10);
        guard.consume(b"p1", 300, 0).unwrap();
        assert_eq!(
            guard.consume(b"p1", 300, 300),
            Err(ReplayRejected::AlreadyConsumed)
        );
        // Past expiry the payload itself is refused upstream; the stale
        // marker is simply replaced.
        assert_eq!(guard.consume(b"p1", 300, 301), Ok(()));
    }

    #[test]
    fn full_cache_evicts_only_expired_markers() {
        let guard = ReplayGuard::new(2);
        guard.consume(b"a", 100, 0).unwrap();
        guard.consume(b"b", 500, 0).unwrap();

        assert_eq!(guard.consume(b"c", 500, 50), Err(ReplayRejected::Full));

        // "a" has expired by t=101 and makes room.
        assert_eq!(guard.consume(b"c", 500, 101), Ok(()));
        assert_eq!(guard.len(), 2);
        assert_eq!(
            guard.consume(b"b", 500, 102),
            Err(ReplayRejected::AlreadyConsumed)
        );
    }

    #[test]
    fn full_cache_finds_expired_marker_accepted_late() {
        let guard = ReplayGuard::new(2);
        // "late" was issued first (expires 900) but redeemed after "early".
        guard.consume(b"early", 1_000, 200).unwrap();
        guard.consume(b"late", 900, 500).unwrap();

        assert_eq!(guard.consume(b"next", 1_200, 950), Ok(()));
        assert_eq!(
            guard.consume(b"early", 1_000, 960),
            Err(ReplayRejected::AlreadyConsumed)
        );
        assert_eq!(guard.len(), 2);
    }

    #[test]
    fn stale_index_entries_are_skipped() {
        let guard = ReplayGuard::new(4);
        guard.consume(b"a", 100, 0).unwrap();
        // Re-consumed after its marker went stale: the old index entry stays
        // behind but must not drop the new marker.
        guard.consume(b"a", 300, 150).unwrap();

        assert_eq!(guard.purge_expired(200), 0);
        assert_eq!(
            guard.consume(b"a", 300, 250),
            Err(ReplayRejected::AlreadyConsumed)
        );
        assert_eq!(guard.purge_expired(301), 1);
        assert!(guard.is_empty());
    }

    #[test]
    fn purge_drops_only_expired() {
        let guard = ReplayGuard::new(10);
        guard.consume(b"a", 100, 0).unwrap();
        guard.consume(b"b", 200, 0).unwrap();
        guard.consume(b"c", 300, 0).unwrap();

        assert_eq!(guard.purge_expired(150), 1);
        assert_eq!(guard.len(), 2);
        assert_eq!(guard.purge_expired(1_000), 2);
        assert!(guard.is_empty());
    }
}
