// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Replay Marker Sweeper
//!
//! Background task that drops single-use markers once their payloads have
//! expired, so the replay guard's capacity goes to live payloads only.
//!
//! ## Shutdown
//!
//! Uses `tokio_util::sync::CancellationToken` for graceful shutdown.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::proof::{Clock, ReplayGuard};

/// Default interval between sweeps.
const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

pub struct ReplaySweeper {
    replay: Arc<ReplayGuard>,
    clock: Arc<dyn Clock>,
    interval: Duration,
}

impl ReplaySweeper {
    pub fn new(replay: Arc<ReplayGuard>, clock: Arc<dyn Clock>) -> Self {
        Self {
            replay,
            clock,
            interval: DEFAULT_SWEEP_INTERVAL,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Run the sweep loop until the cancellation token is triggered.
    ///
    /// Should be spawned as a background task:
    /// ```rust,ignore
    /// tokio::spawn(sweeper.run(shutdown.clone()));
    /// ```
    pub async fn run(self, shutdown: CancellationToken) {
        info!(
            interval_secs = self.interval.as_secs(),
            "Replay marker sweeper starting"
        );

        loop {
            if shutdown.is_cancelled() {
                info!("Replay marker sweeper shutting down");
                return;
            }

            self.sweep();

            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {},
                _ = shutdown.cancelled() => {
                    info!("Replay marker sweeper shutting down");
                    return;
                }
            }
        }
    }

    /// Execute one sweep. Returns how many markers were dropped.
    pub fn sweep(&self) -> usize {
        let dropped = self.replay.purge_expired(self.clock.now_unix());
        if dropped > 0 {
            debug!(
                dropped,
                remaining = self.replay.len(),
                "Replay sweeper: purged expired markers"
            );
        }
        dropped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proof::ManualClock;

    #[test]
    fn sweep_uses_injected_clock() {
        let replay = Arc::new(ReplayGuard::new(8));
        replay.consume(b"a", 100, 0).unwrap();
        replay.consume(b"b", 200, 0).unwrap();

        let clock = Arc::new(ManualClock::new(50));
        let sweeper = ReplaySweeper::new(replay.clone(), clock.clone());
        assert_eq!(sweeper.sweep(), 0);

        clock.set(150);
        assert_eq!(sweeper.sweep(), 1);
        assert_eq!(replay.len(), 1);
    }

    #[tokio::test]
    async fn run_stops_on_cancel() {
        let replay = Arc::new(ReplayGuard::new(8));
        replay.consume(b"a", 10, 0).unwrap();

        let sweeper = ReplaySweeper::new(replay.clone(), Arc::new(ManualClock::new(100)))
            .with_interval(Duration::from_millis(10));
        let shutdown = CancellationToken::new();
        let handle = tokio::spawn(sweeper.run(shutdown.clone()));

        tokio::time::sleep(Duration::from_millis(30)).await;
        shutdown.cancel();
        handle.await.expect("sweeper task exits cleanly");

        assert!(replay.is_empty());
    }
}
