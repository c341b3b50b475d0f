// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::state::AppState;

/// Health check response with individual component status.
#[derive(Debug, Serialize, ToSchema)]
pub struct ReadyResponse {
    /// Overall health status ("ok" or "degraded").
    pub status: String,
    /// Individual health checks and their results.
    pub checks: HealthChecks,
}

/// Individual health check results.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthChecks {
    /// Whether the service process is running.
    pub service: String,
    /// Whether a payload can be issued right now (random source and clock).
    pub issuer: String,
    /// Live single-use markers held by the replay guard.
    pub replay_markers: usize,
}

/// Simple health check response for liveness probes.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
}

/// Health check endpoint handler.
///
/// Returns 200 if all checks pass, 503 if any check fails.
#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service is healthy", body = ReadyResponse),
        (status = 503, description = "Service is unhealthy", body = ReadyResponse)
    )
)]
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<ReadyResponse>) {
    let issuer_ok = state.issuer.ready();

    let response = ReadyResponse {
        status: if issuer_ok { "ok" } else { "degraded" }.to_string(),
        checks: HealthChecks {
            service: "ok".to_string(),
            issuer: if issuer_ok { "ok" } else { "unavailable" }.to_string(),
            replay_markers: state.replay.len(),
        },
    };

    let status = if issuer_ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, Json(response))
}

/// Liveness probe handler.
///
/// Always returns 200 if the process is running.
/// Does not check dependencies - use readiness for that.
#[utoipa::path(
    get,
    path = "/health/live",
    tag = "Health",
    responses(
        (status = 200, description = "Service is alive", body = HealthResponse)
    )
)]
pub async fn liveness() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

/// Readiness probe handler.
#[utoipa::path(
    get,
    path = "/health/ready",
    tag = "Health",
    responses(
        (status = 200, description = "Service is ready", body = ReadyResponse),
        (status = 503, description = "Service is not ready", body = ReadyResponse)
    )
)]
pub async fn readiness(state: State<AppState>) -> (StatusCode, Json<ReadyResponse>) {
    health(state).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ProofConfig, SessionConfig, DEFAULT_SESSION_TTL};
    use crate::proof::random::RandomUnavailable;
    use crate::proof::{NonceSource, SystemClock};
    use std::sync::Arc;

    struct NoEntropy;

    impl NonceSource for NoEntropy {
        fn nonce(&self) -> Result<[u8; 8], RandomUnavailable> {
            Err(RandomUnavailable)
        }
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let (status, Json(body)) = health(State(AppState::for_tests())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.status, "ok");
        assert_eq!(body.checks.issuer, "ok");
        assert_eq!(body.checks.replay_markers, 0);
    }

    #[tokio::test]
    async fn health_degrades_without_entropy() {
        let state = AppState::new(
            ProofConfig::new(AppState::TEST_PROOF_SECRET),
            &SessionConfig {
                secret: AppState::TEST_SESSION_SECRET.to_vec(),
                ttl: DEFAULT_SESSION_TTL,
            },
            16,
            Arc::new(SystemClock),
            Arc::new(NoEntropy),
        );

        let (status, Json(body)) = health(State(state)).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body.status, "degraded");
        assert_eq!(body.checks.issuer, "unavailable");
    }

    #[tokio::test]
    async fn liveness_is_ok() {
        let Json(body) = liveness().await;
        assert_eq!(body.status, "ok");
    }
}
