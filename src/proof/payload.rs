// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Wallet-proof payload wire format.
//!
//! ```text
//! +----------+----------------+-----------------------------+
//! | nonce 8B | expires_at 8B  | HMAC-SHA256 tag[..tag_len]  |
//! +----------+----------------+-----------------------------+
//!            big-endian secs    keyed over nonce || expires_at
//! ```
//!
//! The whole thing travels as lowercase hex. With the default 16-byte tag the
//! payload is 32 bytes (64 hex characters). A 16-byte truncated HMAC-SHA256
//! leaves 128 bits of forgery resistance; raise [`TagLength`] when payloads
//! can carry the extra characters.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

pub const NONCE_LEN: usize = 8;
pub const EXPIRY_LEN: usize = 8;

/// Length of the authenticated message (`nonce || expires_at`).
pub const MESSAGE_LEN: usize = NONCE_LEN + EXPIRY_LEN;

/// Full HMAC-SHA256 output length.
pub const FULL_TAG_LEN: usize = 32;

/// Shortest tag the payload format accepts.
pub const MIN_TAG_LEN: usize = 16;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PayloadError {
    #[error("payload is not valid hex")]
    NotHex,
    #[error("payload has {actual} bytes, expected {expected}")]
    WrongLength { expected: usize, actual: usize },
    #[error("tag length must be between 16 and 32 bytes, got {0}")]
    TagLengthOutOfRange(usize),
}

/// Number of HMAC bytes carried on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagLength(usize);

impl TagLength {
    pub fn new(bytes: usize) -> Result<Self, PayloadError> {
        if (MIN_TAG_LEN..=FULL_TAG_LEN).contains(&bytes) {
            Ok(Self(bytes))
        } else {
            Err(PayloadError::TagLengthOutOfRange(bytes))
        }
    }

    pub fn bytes(self) -> usize {
        self.0
    }

    /// Binary payload length for this tag length.
    pub fn payload_len(self) -> usize {
        MESSAGE_LEN + self.0
    }

    /// Hex-encoded payload length for this tag length.
    pub fn hex_len(self) -> usize {
        self.payload_len() * 2
    }
}

impl Default for TagLength {
    fn default() -> Self {
        Self(MIN_TAG_LEN)
    }
}

/// Compute the full HMAC-SHA256 over `nonce || expires_at`.
pub fn compute_tag(secret: &[u8], nonce: &[u8; NONCE_LEN], expires_at: u64) -> [u8; FULL_TAG_LEN] {
    keyed(secret, nonce, expires_at).finalize().into_bytes().into()
}

fn keyed(secret: &[u8], nonce: &[u8; NONCE_LEN], expires_at: u64) -> HmacSha256 {
    let mut mac = HmacSha256::new_from_slice(secret).expect("HMAC accepts keys of any length");
    mac.update(nonce);
    mac.update(&expires_at.to_be_bytes());
    mac
}

/// A decoded payload. The tag is whatever was transmitted and carries no
/// authority until [`WalletProofPayload::verify_tag`] succeeds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalletProofPayload {
    pub nonce: [u8; NONCE_LEN],
    pub expires_at: u64,
    pub tag: Vec<u8>,
}

impl WalletProofPayload {
    /// Build a payload with a freshly computed tag truncated to `tag_len`.
    pub fn sign(secret: &[u8], nonce: [u8; NONCE_LEN], expires_at: u64, tag_len: TagLength) -> Self {
        let full = compute_tag(secret, &nonce, expires_at);
        Self {
            nonce,
            expires_at,
            tag: full[..tag_len.bytes()].to_vec(),
        }
    }

    /// Raw wire bytes: `nonce || expires_at || tag`.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(MESSAGE_LEN + self.tag.len());
        out.extend_from_slice(&self.nonce);
        out.extend_from_slice(&self.expires_at.to_be_bytes());
        out.extend_from_slice(&self.tag);
        out
    }

    /// Lowercase hex wire form.
    pub fn encode(&self) -> String {
        hex::encode(self.to_bytes())
    }

    /// Parse the hex wire form. Accepts either letter case.
    pub fn decode(payload: &str, tag_len: TagLength) -> Result<Self, PayloadError> {
        let raw = hex::decode(payload).map_err(|e| match e {
            hex::FromHexError::OddLength => PayloadError::WrongLength {
                expected: tag_len.payload_len(),
                actual: payload.len() / 2,
            },
            _ => PayloadError::NotHex,
        })?;
        Self::from_bytes(&raw, tag_len)
    }

    pub fn from_bytes(raw: &[u8], tag_len: TagLength) -> Result<Self, PayloadError> {
        if raw.len() != tag_len.payload_len() {
            return Err(PayloadError::WrongLength {
                expected: tag_len.payload_len(),
                actual: raw.len(),
            });
        }

        let mut nonce = [0u8; NONCE_LEN];
        nonce.copy_from_slice(&raw[..NONCE_LEN]);
        let mut expiry = [0u8; EXPIRY_LEN];
        expiry.copy_from_slice(&raw[NONCE_LEN..MESSAGE_LEN]);

        Ok(Self {
            nonce,
            expires_at: u64::from_be_bytes(expiry),
            tag: raw[MESSAGE_LEN..].to_vec(),
        })
    }

    /// Recompute the HMAC with `secret` and compare it against the
    /// transmitted tag prefix in constant time.
    pub fn verify_tag(&self, secret: &[u8]) -> bool {
        if self.tag.len() < MIN_TAG_LEN {
            return false;
        }
        keyed(secret, &self.nonce, self.expires_at)
            .verify_truncated_left(&self.tag)
            .is_ok()
    }

    /// `true` once `now` is past the expiry second.
    pub fn is_expired(&self, now: u64) -> bool {
        now > self.expires_at
    }
}
