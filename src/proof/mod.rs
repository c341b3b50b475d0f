// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Wallet Proof Module
//!
//! Lets a user prove ownership of a TON wallet without sending a transaction.
//!
//! ## Flow
//!
//! 1. Client asks for a payload; [`PayloadIssuer`] returns
//!    `hex(nonce || expires_at || truncated HMAC)`. Nothing is stored.
//! 2. The wallet signs a `ton_proof` message embedding that payload.
//! 3. [`ProofVerifier`] recomputes the HMAC, checks expiry and domain,
//!    checks that the wallet's state init hashes to the claimed address,
//!    verifies the Ed25519 signature under the key from that state init and
//!    marks the payload consumed.
//!
//! ## Security
//!
//! - The transmitted tag is never trusted; it is always recomputed
//! - Expiry is checked against server time at verification
//! - The signing key is taken from the state init, never from the request
//! - All rejections look identical to the caller
//! - Each payload is accepted at most once ([`ReplayGuard`])

pub mod address;
pub mod boc;
pub mod clock;
pub mod error;
pub mod issuer;
pub mod message;
pub mod payload;
pub mod random;
pub mod replay;
pub mod verifier;
pub mod wallet;

pub use address::{AddressNetwork, TonAddress};
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{InvalidProof, IssueError, RejectReason};
pub use issuer::{IssuedPayload, PayloadIssuer};
pub use payload::{TagLength, WalletProofPayload};
pub use random::{NonceSource, OsNonceSource};
pub use replay::ReplayGuard;
pub use verifier::{ProofVerifier, VerifiedWallet, WalletProof};
pub use wallet::WalletStateInit;
