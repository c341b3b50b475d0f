// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! Request and response bodies for the proof endpoints. The check request
//! mirrors the TON Connect `ton_proof` reply so wallets' output can be
//! forwarded verbatim. All types derive `ToSchema` for the OpenAPI document.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::proof::{AddressNetwork, WalletProof};

/// Network id for TON mainnet.
pub const MAINNET: &str = AddressNetwork::Mainnet.id();
/// Network id for TON testnet.
pub const TESTNET: &str = AddressNetwork::Testnet.id();

// =============================================================================
// Payload
// =============================================================================

/// A freshly issued proof payload.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct GeneratePayloadResponse {
    /// Hex payload to pass to the wallet's `tonProof` request unchanged.
    #[schema(example = "3f2a9c01d4e5b6a700000000655e0b5c1b2f4e6a8c0d2e4f6a8b0c1d2e3f4a5b")]
    pub payload: String,
    /// Unix second after which the payload is refused.
    pub expires_at: u64,
}

// =============================================================================
// Proof check
// =============================================================================

/// Domain the wallet signed for.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct ProofDomain {
    /// UTF-8 byte length of `value`.
    #[serde(rename = "lengthBytes")]
    pub length_bytes: u32,
    pub value: String,
}

/// The `ton_proof` object returned by the wallet.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct TonProof {
    /// Unix seconds at which the wallet signed.
    pub timestamp: u64,
    pub domain: ProofDomain,
    /// Base64 Ed25519 signature.
    pub signature: String,
    /// The payload exactly as issued.
    pub payload: String,
    /// Base64 bag of cells with the wallet's state init (`walletStateInit`).
    /// Its hash must equal the address; the public key is read from it.
    pub state_init: String,
}

/// Wallet proof submitted for verification.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct CheckProofRequest {
    /// Raw (`0:<hex>`) or user-friendly wallet address.
    pub address: String,
    /// `-239` for mainnet, `-3` for testnet.
    pub network: String,
    /// Hex-encoded Ed25519 public key; must match the state init.
    pub public_key: String,
    pub proof: TonProof,
}

impl From<CheckProofRequest> for WalletProof {
    fn from(req: CheckProofRequest) -> Self {
        Self {
            address: req.address,
            network: req.network,
            public_key: req.public_key,
            timestamp: req.proof.timestamp,
            domain_length: req.proof.domain.length_bytes,
            domain: req.proof.domain.value,
            signature: req.proof.signature,
            payload: req.proof.payload,
            state_init: req.proof.state_init,
        }
    }
}

/// Result of an accepted proof.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct CheckProofResponse {
    /// Canonical raw address of the proven wallet.
    pub address: String,
    /// Session token (HS256 JWT) for authenticated endpoints.
    pub token: String,
    /// Unix second the session token expires.
    pub expires_at: u64,
}
