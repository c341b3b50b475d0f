// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Stateless payload issuance.
//!
//! A payload binds a random nonce and an expiry second under the server's
//! HMAC key. Nothing is stored: any payload this issuer produced can later be
//! checked with the same secret alone.

use std::sync::Arc;

use super::clock::Clock;
use super::error::{InvalidProof, IssueError, RejectReason};
use super::payload::{TagLength, WalletProofPayload};
use super::random::NonceSource;
use crate::config::ProofConfig;

/// A freshly issued payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedPayload {
    /// Hex wire form handed to the client.
    pub payload: String,
    /// Unix second after which the payload is refused.
    pub expires_at: u64,
}

pub struct PayloadIssuer {
    config: ProofConfig,
    clock: Arc<dyn Clock>,
    random: Arc<dyn NonceSource>,
}

impl PayloadIssuer {
    pub fn new(config: ProofConfig, clock: Arc<dyn Clock>, random: Arc<dyn NonceSource>) -> Self {
        Self {
            config,
            clock,
            random,
        }
    }

    pub fn config(&self) -> &ProofConfig {
        &self.config
    }

    pub fn tag_len(&self) -> TagLength {
        self.config.tag_len
    }

    pub(crate) fn now(&self) -> u64 {
        self.clock.now_unix()
    }

    /// Issue a new payload valid for the configured TTL.
    pub fn issue(&self) -> Result<IssuedPayload, IssueError> {
        let nonce = self.random.nonce()?;

        let now = self.clock.now_unix();
        let ttl_secs = self.config.ttl.as_secs();
        let expires_at = now
            .checked_add(ttl_secs)
            .ok_or(IssueError::ExpiryOverflow { now, ttl_secs })?;

        let payload =
            WalletProofPayload::sign(&self.config.secret, nonce, expires_at, self.config.tag_len);

        tracing::debug!(expires_at, "Issued proof payload");

        Ok(IssuedPayload {
            payload: payload.encode(),
            expires_at,
        })
    }

    /// Whether [`issue`](Self::issue) would succeed right now: the random
    /// source answers and the expiry fits. Nothing is signed or logged.
    pub fn ready(&self) -> bool {
        let ttl_secs = self.config.ttl.as_secs();
        self.random.nonce().is_ok() && self.clock.now_unix().checked_add(ttl_secs).is_some()
    }

    /// Decode a payload and check its integrity and freshness.
    ///
    /// The tag is recomputed from the embedded nonce and expiry; the expiry is
    /// compared against the current time, not the time of issuance.
    pub fn check(&self, payload: &str) -> Result<WalletProofPayload, InvalidProof> {
        let decoded = WalletProofPayload::decode(payload, self.config.tag_len)
            .map_err(|_| RejectReason::MalformedPayload)?;

        if !decoded.verify_tag(&self.config.secret) {
            return Err(RejectReason::TagMismatch.into());
        }

        let now = self.clock.now_unix();
        if decoded.is_expired(now) {
            return Err(RejectReason::Expired {
                expires_at: decoded.expires_at,
                now,
            }
            .into());
        }

        Ok(decoded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proof::clock::ManualClock;
    use crate::proof::payload::compute_tag;
    use crate::proof::random::{OsNonceSource, RandomUnavailable};
    use std::collections::HashSet;
    use std::sync::Mutex;
    use std::time::Duration;

    const SECRET: &[u8] = b"issuer-secret-issuer-secret-0001";
    const T0: u64 = 1_700_000_000;

    /// Replays a fixed queue of nonces.
    struct FixedNonces(Mutex<Vec<[u8; 8]>>);

    impl NonceSource for FixedNonces {
        fn nonce(&self) -> Result<[u8; 8], RandomUnavailable> {
            self.0.lock().unwrap().pop().ok_or(RandomUnavailable)
        }
    }

    struct BrokenRandom;

    impl NonceSource for BrokenRandom {
        fn nonce(&self) -> Result<[u8; 8], RandomUnavailable> {
            Err(RandomUnavailable)
        }
    }

    fn issuer_with(ttl: u64, clock: Arc<ManualClock>) -> PayloadIssuer {
        PayloadIssuer::new(
            ProofConfig::new(SECRET).with_ttl(Duration::from_secs(ttl)),
            clock,
            Arc::new(OsNonceSource::new()),
        )
    }

    #[test]
    fn issued_payload_is_64_hex_chars() {
        let issuer = issuer_with(900, Arc::new(ManualClock::new(T0)));
        for _ in 0..100 {
            let issued = issuer.issue().unwrap();
            assert_eq!(issued.payload.len(), 64);
            assert!(issued.payload.chars().all(|c| c.is_ascii_hexdigit()));
        }
    }

    #[test]
    fn expiry_is_now_plus_ttl() {
        let issuer = issuer_with(900, Arc::new(ManualClock::new(T0)));
        let issued = issuer.issue().unwrap();
        let raw = hex::decode(&issued.payload).unwrap();

        let expires_at = u64::from_be_bytes(raw[8..16].try_into().unwrap());
        assert!(expires_at > T0);
        assert_eq!(expires_at - T0, 900);
        assert_eq!(issued.expires_at, expires_at);
    }

    #[test]
    fn tag_matches_recomputed_hmac_prefix() {
        let issuer = issuer_with(900, Arc::new(ManualClock::new(T0)));
        let issued = issuer.issue().unwrap();
        let raw = hex::decode(&issued.payload).unwrap();

        let nonce: [u8; 8] = raw[..8].try_into().unwrap();
        let expires_at = u64::from_be_bytes(raw[8..16].try_into().unwrap());
        let full = compute_tag(SECRET, &nonce, expires_at);
        assert_eq!(&raw[16..32], &full[..16]);
    }

    #[test]
    fn deterministic_with_fixed_nonce() {
        let issuer = PayloadIssuer::new(
            ProofConfig::new(SECRET).with_ttl(Duration::from_secs(300)),
            Arc::new(ManualClock::new(T0)),
            Arc::new(FixedNonces(Mutex::new(vec![[7u8; 8]]))),
        );
        let issued = issuer.issue().unwrap();
        let expected = WalletProofPayload::sign(SECRET, [7u8; 8], T0 + 300, TagLength::default());
        assert_eq!(issued.payload, expected.encode());
    }

    #[test]
    fn nonces_do_not_repeat_within_one_second() {
        let issuer = issuer_with(900, Arc::new(ManualClock::new(T0)));
        let mut nonces = HashSet::new();
        for _ in 0..5_000 {
            let issued = issuer.issue().unwrap();
            assert_eq!(issued.expires_at, T0 + 900);
            assert!(nonces.insert(issued.payload[..16].to_string()));
        }
    }

    #[test]
    fn random_failure_is_terminal() {
        let issuer = PayloadIssuer::new(
            ProofConfig::new(SECRET),
            Arc::new(ManualClock::new(T0)),
            Arc::new(BrokenRandom),
        );
        assert_eq!(
            issuer.issue(),
            Err(IssueError::Randomness(RandomUnavailable))
        );
    }

    #[test]
    fn ready_reflects_random_source_and_clock() {
        assert!(issuer_with(900, Arc::new(ManualClock::new(T0))).ready());
        assert!(!issuer_with(10, Arc::new(ManualClock::new(u64::MAX - 5))).ready());

        let broken = PayloadIssuer::new(
            ProofConfig::new(SECRET),
            Arc::new(ManualClock::new(T0)),
            Arc::new(BrokenRandom),
        );
        assert!(!broken.ready());
    }

    #[test]
    fn expiry_overflow_is_an_error() {
        let issuer = issuer_with(10, Arc::new(ManualClock::new(u64::MAX - 5)));
        assert!(matches!(
            issuer.issue(),
            Err(IssueError::ExpiryOverflow { .. })
        ));
    }

    #[test]
    fn check_rejects_tampered_nonce_and_expiry() {
        let issuer = issuer_with(900, Arc::new(ManualClock::new(T0)));
        let issued = issuer.issue().unwrap();
        let raw = hex::decode(&issued.payload).unwrap();

        for byte in 0..16 {
            let mut tampered = raw.clone();
            tampered[byte] ^= 0x01;
            let err = issuer.check(&hex::encode(&tampered)).unwrap_err();
            assert_eq!(err.reason(), &RejectReason::TagMismatch);
        }
    }

    #[test]
    fn check_rejects_foreign_secret() {
        let clock = Arc::new(ManualClock::new(T0));
        let other = PayloadIssuer::new(
            ProofConfig::new(b"some-other-deployment-secret-000".to_vec()),
            clock.clone(),
            Arc::new(OsNonceSource::new()),
        );
        let issued = other.issue().unwrap();
        let issuer = issuer_with(900, clock);
        assert_eq!(
            issuer.check(&issued.payload).unwrap_err().reason(),
            &RejectReason::TagMismatch
        );
    }

    #[test]
    fn check_rejects_garbage() {
        let issuer = issuer_with(900, Arc::new(ManualClock::new(T0)));
        for input in ["", "not-hex", "abcd", &"0".repeat(66)] {
            assert_eq!(
                issuer.check(input).unwrap_err().reason(),
                &RejectReason::MalformedPayload
            );
        }
    }

    #[test]
    fn ttl_window_accept_then_reject() {
        let clock = Arc::new(ManualClock::new(0));
        let issuer = issuer_with(300, clock.clone());
        let issued = issuer.issue().unwrap();

        clock.set(299);
        assert!(issuer.check(&issued.payload).is_ok());

        clock.set(301);
        let err = issuer.check(&issued.payload).unwrap_err();
        assert_eq!(
            err.reason(),
            &RejectReason::Expired {
                expires_at: 300,
                now: 301
            }
        );
    }
}
