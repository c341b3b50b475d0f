// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Nonce randomness.

use ring::rand::{SecureRandom, SystemRandom};

use super::payload::NONCE_LEN;

/// The random source failed to produce bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("secure random source unavailable")]
pub struct RandomUnavailable;

/// Cryptographically secure source of payload nonces.
pub trait NonceSource: Send + Sync {
    fn nonce(&self) -> Result<[u8; NONCE_LEN], RandomUnavailable>;
}

/// OS-backed randomness through `ring`.
#[derive(Debug)]
pub struct OsNonceSource {
    rng: SystemRandom,
}

impl OsNonceSource {
    pub fn new() -> Self {
        Self {
            rng: SystemRandom::new(),
        }
    }
}

impl Default for OsNonceSource {
    fn default() -> Self {
        Self::new()
    }
}

impl NonceSource for OsNonceSource {
    fn nonce(&self) -> Result<[u8; NONCE_LEN], RandomUnavailable> {
        let mut buf = [0u8; NONCE_LEN];
        self.rng.fill(&mut buf).map_err(|_| RandomUnavailable)?;
        Ok(buf)
    }
}
