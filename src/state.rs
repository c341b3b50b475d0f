// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::{
    auth::SessionIssuer,
    config::{ProofConfig, SessionConfig},
    proof::{Clock, NonceSource, OsNonceSource, PayloadIssuer, ProofVerifier, ReplayGuard, SystemClock},
};

#[derive(Clone)]
pub struct AppState {
    pub issuer: Arc<PayloadIssuer>,
    pub verifier: Arc<ProofVerifier>,
    pub replay: Arc<ReplayGuard>,
    pub sessions: Arc<SessionIssuer>,
}

impl AppState {
    /// Wire every component to the same clock and random source.
    pub fn new(
        proof: ProofConfig,
        session: &SessionConfig,
        replay_capacity: usize,
        clock: Arc<dyn Clock>,
        random: Arc<dyn NonceSource>,
    ) -> Self {
        let replay = Arc::new(ReplayGuard::new(replay_capacity));
        let issuer = Arc::new(PayloadIssuer::new(proof, clock.clone(), random));
        let verifier = Arc::new(ProofVerifier::new(issuer.clone(), replay.clone()));
        let sessions = Arc::new(SessionIssuer::new(session, clock));

        Self {
            issuer,
            verifier,
            replay,
            sessions,
        }
    }

    /// Production wiring: wall clock and OS randomness.
    pub fn from_config(config: &crate::config::AppConfig) -> Self {
        Self::new(
            config.proof.clone(),
            &config.session,
            config.replay_capacity,
            Arc::new(SystemClock),
            Arc::new(OsNonceSource::new()),
        )
    }

    pub fn clock_now(&self) -> u64 {
        self.issuer.now()
    }
}

#[cfg(test)]
impl AppState {
    pub(crate) const TEST_PROOF_SECRET: &'static [u8] = b"test-proof-secret-test-proof-sec";
    pub(crate) const TEST_SESSION_SECRET: &'static [u8] = b"test-session-secret-test-session";

    /// State with fixed secrets and the wall clock.
    pub(crate) fn for_tests() -> Self {
        Self::with_clock(Arc::new(SystemClock), crate::config::DEFAULT_PROOF_TTL)
    }

    /// State with fixed secrets, the given clock and payload TTL.
    pub(crate) fn with_clock(clock: Arc<dyn Clock>, ttl: std::time::Duration) -> Self {
        Self::new(
            ProofConfig::new(Self::TEST_PROOF_SECRET).with_ttl(ttl),
            &SessionConfig {
                secret: Self::TEST_SESSION_SECRET.to_vec(),
                ttl: crate::config::DEFAULT_SESSION_TTL,
            },
            1_024,
            clock,
            Arc::new(OsNonceSource::new()),
        )
    }
}
