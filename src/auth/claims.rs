// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Session token claims.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Claims carried by a session token.
///
/// The subject is the canonical raw address of the wallet that produced the
/// accepted proof.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Raw wallet address (`workchain:hex`)
    pub sub: String,
    /// Network id (`-239` mainnet, `-3` testnet). Checked against the address
    /// flags when the wallet sent a user-friendly address; otherwise as reported.
    pub network: String,
    /// Issued at (Unix seconds)
    pub iat: u64,
    /// Expiration (Unix seconds)
    pub exp: u64,
    /// Issuer
    pub iss: String,
    /// Unique token id
    pub jti: String,
}

/// Wallet identity attached to an authenticated request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct WalletSession {
    /// Raw wallet address
    pub address: String,
    /// Network id
    pub network: String,
    /// Token expiration (Unix timestamp)
    pub expires_at: u64,
    /// Token id, useful for log correlation
    #[serde(skip)]
    pub token_id: String,
}

impl From<SessionClaims> for WalletSession {
    fn from(claims: SessionClaims) -> Self {
        Self {
            address: claims.sub,
            network: claims.network,
            expires_at: claims.exp,
            token_id: claims.jti,
        }
    }
}
