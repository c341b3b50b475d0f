// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Proof verification.
//!
//! Checks run in this order, stopping at the first failure:
//!
//! 1. payload decodes and its HMAC tag matches a recomputation
//! 2. payload has not expired
//! 3. signed domain is allowed and its declared length is honest
//! 4. signing time falls within the payload's lifetime
//! 5. address parses; a user-friendly address agrees with the reported network
//! 6. state init hashes to the address; its public key is the one claimed
//! 7. Ed25519 signature over the `ton_proof` digest verifies under that key
//! 8. payload has not been consumed before
//!
//! Every failure is reported as the same [`InvalidProof`].

use std::sync::Arc;

use base64ct::{Base64, Encoding};
use ring::signature::{UnparsedPublicKey, ED25519};

use super::address::TonAddress;
use super::error::{InvalidProof, RejectReason};
use super::issuer::PayloadIssuer;
use super::message::ProofMessage;
use super::replay::{ReplayGuard, ReplayRejected};
use super::wallet::WalletStateInit;

const PUBLIC_KEY_LEN: usize = 32;
const SIGNATURE_LEN: usize = 64;

/// Tolerated difference between wallet and server clocks.
const TIMESTAMP_SKEW_SECS: u64 = 60;

/// A wallet's answer to an issued payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalletProof {
    /// Raw or user-friendly TON address.
    pub address: String,
    /// Network id reported by the wallet (`-239` mainnet, `-3` testnet).
    pub network: String,
    /// Hex-encoded Ed25519 public key.
    pub public_key: String,
    pub timestamp: u64,
    pub domain_length: u32,
    pub domain: String,
    /// Base64 Ed25519 signature.
    pub signature: String,
    /// The payload exactly as issued.
    pub payload: String,
    /// Base64 bag of cells holding the wallet's state init.
    pub state_init: String,
}

/// Identity established by an accepted proof.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedWallet {
    pub address: TonAddress,
    /// Reported network. Checked against the address flags when the wallet
    /// sent a user-friendly address.
    pub network: String,
    pub public_key: [u8; PUBLIC_KEY_LEN],
    pub payload_expires_at: u64,
}

pub struct ProofVerifier {
    issuer: Arc<PayloadIssuer>,
    replay: Arc<ReplayGuard>,
}

impl ProofVerifier {
    pub fn new(issuer: Arc<PayloadIssuer>, replay: Arc<ReplayGuard>) -> Self {
        Self { issuer, replay }
    }

    pub fn verify(&self, proof: &WalletProof) -> Result<VerifiedWallet, InvalidProof> {
        let payload = self.issuer.check(&proof.payload)?;
        let now = self.issuer.now();

        self.check_domain(proof)?;

        let issued_at = payload
            .expires_at
            .saturating_sub(self.issuer.config().ttl.as_secs());
        if proof.timestamp.saturating_add(TIMESTAMP_SKEW_SECS) < issued_at
            || proof.timestamp > now.saturating_add(TIMESTAMP_SKEW_SECS)
        {
            return Err(RejectReason::StaleTimestamp {
                timestamp: proof.timestamp,
                now,
            }
            .into());
        }

        let (address, encoded_network) = TonAddress::parse_with_network(&proof.address)
            .map_err(|_| RejectReason::MalformedAddress)?;
        if encoded_network.is_some_and(|network| network.id() != proof.network) {
            return Err(RejectReason::NetworkMismatch.into());
        }

        let state_init = WalletStateInit::from_base64(&proof.state_init)
            .map_err(|_| RejectReason::MalformedStateInit)?;
        if state_init.hash != address.hash {
            return Err(RejectReason::StateInitMismatch.into());
        }

        let mut claimed_key = [0u8; PUBLIC_KEY_LEN];
        hex::decode_to_slice(&proof.public_key, &mut claimed_key)
            .map_err(|_| RejectReason::MalformedPublicKey)?;
        if claimed_key != state_init.public_key {
            return Err(RejectReason::PublicKeyMismatch.into());
        }

        let signature = Base64::decode_vec(&proof.signature)
            .ok()
            .filter(|sig| sig.len() == SIGNATURE_LEN)
            .ok_or(RejectReason::MalformedSignature)?;

        let digest = ProofMessage {
            address: &address,
            domain: &proof.domain,
            timestamp: proof.timestamp,
            payload: &proof.payload,
        }
        .signing_digest();

        UnparsedPublicKey::new(&ED25519, &state_init.public_key)
            .verify(&digest, &signature)
            .map_err(|_| RejectReason::BadSignature)?;

        self.replay
            .consume(&payload.to_bytes(), payload.expires_at, now)
            .map_err(|e| match e {
                ReplayRejected::AlreadyConsumed => RejectReason::Replayed,
                ReplayRejected::Full => RejectReason::ReplayCacheFull,
            })?;

        tracing::info!(address = %address, network = %proof.network, "Wallet proof accepted");

        Ok(VerifiedWallet {
            address,
            network: proof.network.clone(),
            public_key: state_init.public_key,
            payload_expires_at: payload.expires_at,
        })
    }

    fn check_domain(&self, proof: &WalletProof) -> Result<(), RejectReason> {
        if proof.domain.len() != proof.domain_length as usize {
            return Err(RejectReason::DomainLengthMismatch);
        }

        let allowed = &self.issuer.config().allowed_domains;
        if !allowed.is_empty() && !allowed.iter().any(|d| d == &proof.domain) {
            return Err(RejectReason::DomainNotAllowed(proof.domain.clone()));
        }
        Ok(())
    }
}
