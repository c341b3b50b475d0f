// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Wallet proof endpoints.

use axum::{extract::State, Json};

use crate::{
    error::ApiError,
    models::{CheckProofRequest, CheckProofResponse, GeneratePayloadResponse, MAINNET, TESTNET},
    proof::WalletProof,
    state::AppState,
};

/// Issue a fresh proof payload.
///
/// The payload is stateless: nothing is stored until a proof using it is
/// accepted.
#[utoipa::path(
    post,
    path = "/v1/proof/payload",
    tag = "Proof",
    responses(
        (status = 200, description = "Payload issued", body = GeneratePayloadResponse),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn generate_payload(
    State(state): State<AppState>,
) -> Result<Json<GeneratePayloadResponse>, ApiError> {
    let issued = state.issuer.issue()?;
    Ok(Json(GeneratePayloadResponse {
        payload: issued.payload,
        expires_at: issued.expires_at,
    }))
}

/// Verify a signed `ton_proof` and open a session for the wallet.
#[utoipa::path(
    post,
    path = "/v1/proof/check",
    request_body = CheckProofRequest,
    tag = "Proof",
    responses(
        (status = 200, description = "Proof accepted", body = CheckProofResponse),
        (status = 400, description = "Unknown network"),
        (status = 401, description = "Invalid proof")
    )
)]
pub async fn check_proof(
    State(state): State<AppState>,
    Json(request): Json<CheckProofRequest>,
) -> Result<Json<CheckProofResponse>, ApiError> {
    if request.network != MAINNET && request.network != TESTNET {
        return Err(ApiError::bad_request(format!(
            "Unknown network '{}'",
            request.network
        )));
    }

    let proof: WalletProof = request.into();
    let wallet = state.verifier.verify(&proof)?;

    let session = state.sessions.mint(&wallet).map_err(|e| {
        tracing::error!(error = ?e, "Failed to mint session token");
        ApiError::internal("Internal server error")
    })?;

    Ok(Json(CheckProofResponse {
        address: session.claims.sub,
        token: session.token,
        expires_at: session.claims.exp,
    }))
}
