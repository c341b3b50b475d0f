// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use axum_server::tls_rustls::RustlsConfig;
use onton_proof_server::{
    api::router,
    config::{AppConfig, LOG_FORMAT_ENV},
    proof::SystemClock,
    replay_sweeper::ReplaySweeper,
    state::AppState,
};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug"));

    let json = std::env::var(LOG_FORMAT_ENV)
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

async fn shutdown_signal(shutdown: CancellationToken) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for shutdown signal");
        return;
    }
    tracing::info!("Shutdown signal received");
    shutdown.cancel();
}

#[tokio::main]
async fn main() {
    init_tracing();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Invalid configuration");
            std::process::exit(1);
        }
    };

    tracing::info!(
        ttl_secs = config.proof.ttl.as_secs(),
        tag_len = config.proof.tag_len.bytes(),
        allowed_domains = ?config.proof.allowed_domains,
        replay_capacity = config.replay_capacity,
        "Proof configuration loaded"
    );

    let state = AppState::from_config(&config);
    let shutdown = CancellationToken::new();

    let sweeper = ReplaySweeper::new(state.replay.clone(), Arc::new(SystemClock));
    let sweeper_task = tokio::spawn(sweeper.run(shutdown.clone()));

    let app = router(state);
    let addr = config.bind_addr;
    let handle = axum_server::Handle::new();
    tokio::spawn(shutdown_signal(shutdown.clone()));
    {
        let handle = handle.clone();
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            shutdown.cancelled().await;
            handle.graceful_shutdown(Some(std::time::Duration::from_secs(10)));
        });
    }

    let served = match &config.tls {
        Some(tls) => {
            // Install the ring crypto provider for rustls (must be done before any TLS operations)
            let _ = rustls::crypto::ring::default_provider().install_default();

            let tls_config = match RustlsConfig::from_pem_file(&tls.cert, &tls.key).await {
                Ok(tls_config) => tls_config,
                Err(e) => {
                    tracing::error!(error = %e, cert = ?tls.cert, "Failed to load TLS credentials");
                    std::process::exit(1);
                }
            };

            tracing::info!("Onton proof server listening on https://{addr} (docs at /docs)");
            axum_server::bind_rustls(addr, tls_config)
                .handle(handle)
                .serve(app.into_make_service())
                .await
        }
        None => {
            tracing::info!("Onton proof server listening on http://{addr} (docs at /docs)");
            axum_server::bind(addr)
                .handle(handle)
                .serve(app.into_make_service())
                .await
        }
    };

    shutdown.cancel();
    let _ = sweeper_task.await;

    if let Err(e) = served {
        tracing::error!(error = %e, "Server failed");
        std::process::exit(1);
    }
}
