// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Session tokens for wallets that completed the proof flow.
//!
//! ## Auth Flow
//!
//! 1. Client obtains a payload and has the wallet sign a `ton_proof`
//! 2. `POST /v1/proof/check` verifies the proof and mints an HS256 JWT whose
//!    `sub` is the raw wallet address
//! 3. Client sends `Authorization: Bearer <jwt>` on later requests
//! 4. The `Session` extractor validates signature, issuer and expiry
//!
//! ## Security
//!
//! - Tokens are signed with a server-held secret separate from the proof key
//! - Clock skew tolerance is 60 seconds

pub mod claims;
pub mod error;
pub mod extractor;
pub mod session;

pub use claims::{SessionClaims, WalletSession};
pub use error::AuthError;
pub use extractor::Session;
pub use session::{SessionIssuer, SessionToken};
