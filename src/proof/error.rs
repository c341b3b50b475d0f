// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Proof errors.
//!
//! Issuance failures surface as a generic 500. Verification failures all
//! collapse into [`InvalidProof`]; the specific [`RejectReason`] is only
//! written to server logs.

use axum::response::{IntoResponse, Response};
use thiserror::Error;

use super::random::RandomUnavailable;
use crate::error::ApiError;

/// Payload issuance failed. Nothing was handed out.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum IssueError {
    #[error("nonce generation failed: {0}")]
    Randomness(#[from] RandomUnavailable),
    #[error("expiry overflows u64 (now={now}, ttl={ttl_secs}s)")]
    ExpiryOverflow { now: u64, ttl_secs: u64 },
}

impl From<IssueError> for ApiError {
    fn from(err: IssueError) -> Self {
        tracing::error!(error = %err, "Proof payload issuance failed");
        ApiError::internal("Internal server error")
    }
}

impl IntoResponse for IssueError {
    fn into_response(self) -> Response {
        ApiError::from(self).into_response()
    }
}

/// Why a proof was rejected. Never sent to clients.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    MalformedPayload,
    TagMismatch,
    Expired { expires_at: u64, now: u64 },
    DomainNotAllowed(String),
    DomainLengthMismatch,
    MalformedAddress,
    /// Reported network contradicts the user-friendly address flags.
    NetworkMismatch,
    MalformedStateInit,
    /// State init does not hash to the claimed address.
    StateInitMismatch,
    MalformedPublicKey,
    /// Request key differs from the one in the wallet's state init.
    PublicKeyMismatch,
    /// Signing time outside the payload's lifetime.
    StaleTimestamp { timestamp: u64, now: u64 },
    MalformedSignature,
    BadSignature,
    Replayed,
    ReplayCacheFull,
}

/// Uniform verification failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid proof")]
pub struct InvalidProof {
    reason: RejectReason,
}

impl InvalidProof {
    pub(crate) fn new(reason: RejectReason) -> Self {
        tracing::debug!(reason = ?reason, "Wallet proof rejected");
        Self { reason }
    }

    /// Internal rejection reason, for logs and tests.
    pub fn reason(&self) -> &RejectReason {
        &self.reason
    }
}

impl From<RejectReason> for InvalidProof {
    fn from(reason: RejectReason) -> Self {
        Self::new(reason)
    }
}

impl From<InvalidProof> for ApiError {
    fn from(_: InvalidProof) -> Self {
        ApiError::unauthorized("Invalid proof")
    }
}

impl IntoResponse for InvalidProof {
    fn into_response(self) -> Response {
        ApiError::from(self).into_response()
    }
}
