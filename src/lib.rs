// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Onton Proof Server - TON Connect wallet-proof service
//!
//! Lets a user prove ownership of a TON wallet to the backend without a
//! blockchain transaction, then hands out a session token for that wallet.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `auth` - Session tokens for proven wallets
//! - `proof` - Payload issuance, proof verification, replay guard
//! - `replay_sweeper` - Background purge of expired replay markers

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod proof;
pub mod replay_sweeper;
pub mod state;
