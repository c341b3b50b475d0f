// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! TON Connect `ton_proof` signing message.
//!
//! ```text
//! message = "ton-proof-item-v2/"
//!           || workchain    (i32, big-endian)
//!           || address hash (32 bytes)
//!           || domain len   (u32, little-endian)
//!           || domain
//!           || timestamp    (u64, little-endian)
//!           || payload      (as transmitted)
//!
//! signed  = sha256(0xffff || "ton-connect" || sha256(message))
//! ```
//!
//! The wallet signs `signed` with its Ed25519 key.

use sha2::{Digest, Sha256};

use super::address::TonAddress;

const PROOF_PREFIX: &[u8] = b"ton-proof-item-v2/";
const CONNECT_PREFIX: &[u8] = b"ton-connect";

/// The fields of a proof that the wallet commits to.
#[derive(Debug, Clone, Copy)]
pub struct ProofMessage<'a> {
    pub address: &'a TonAddress,
    pub domain: &'a str,
    pub timestamp: u64,
    pub payload: &'a str,
}

impl ProofMessage<'_> {
    /// Assemble the inner message bytes.
    pub fn message(&self) -> Vec<u8> {
        let domain = self.domain.as_bytes();
        let mut msg = Vec::with_capacity(
            PROOF_PREFIX.len() + 4 + 32 + 4 + domain.len() + 8 + self.payload.len(),
        );
        msg.extend_from_slice(PROOF_PREFIX);
        msg.extend_from_slice(&self.address.workchain.to_be_bytes());
        msg.extend_from_slice(&self.address.hash);
        msg.extend_from_slice(&(domain.len() as u32).to_le_bytes());
        msg.extend_from_slice(domain);
        msg.extend_from_slice(&self.timestamp.to_le_bytes());
        msg.extend_from_slice(self.payload.as_bytes());
        msg
    }

    /// The 32-byte digest the wallet signs.
    pub fn signing_digest(&self) -> [u8; 32] {
        let inner = Sha256::digest(self.message());

        let mut outer = Sha256::new();
        outer.update([0xff, 0xff]);
        outer.update(CONNECT_PREFIX);
        outer.update(inner);
        outer.finalize().into()
    }
}
