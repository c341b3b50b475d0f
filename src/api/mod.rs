// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    auth::WalletSession,
    models::{CheckProofRequest, CheckProofResponse, GeneratePayloadResponse, ProofDomain, TonProof},
    state::AppState,
};

pub mod account;
pub mod health;
pub mod proof;

pub fn router(state: AppState) -> Router {
    let v1_routes = Router::new()
        .route(
            "/proof/payload",
            get(proof::generate_payload).post(proof::generate_payload),
        )
        .route("/proof/check", post(proof::check_proof))
        .route("/account/me", get(account::get_current_wallet));

    let health_routes = Router::new()
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness));

    Router::new()
        .nest("/v1", v1_routes)
        .merge(health_routes)
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

struct BearerSecurity;

impl Modify for BearerSecurity {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        proof::generate_payload,
        proof::check_proof,
        account::get_current_wallet,
        health::health,
        health::liveness,
        health::readiness
    ),
    components(
        schemas(
            GeneratePayloadResponse,
            CheckProofRequest,
            CheckProofResponse,
            TonProof,
            ProofDomain,
            WalletSession,
            health::ReadyResponse,
            health::HealthChecks,
            health::HealthResponse
        )
    ),
    modifiers(&BearerSecurity),
    tags(
        (name = "Proof", description = "TON Connect wallet proof issuance and verification"),
        (name = "Account", description = "Session-authenticated wallet identity"),
        (name = "Health", description = "Liveness and readiness probes")
    )
)]
struct ApiDoc;
