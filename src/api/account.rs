// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Account endpoints.

use axum::Json;

use crate::auth::{Session, WalletSession};

/// Get the wallet behind the current session token.
#[utoipa::path(
    get,
    path = "/v1/account/me",
    tag = "Account",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Wallet identity", body = WalletSession),
        (status = 401, description = "Unauthorized - invalid or missing token"),
    )
)]
pub async fn get_current_wallet(Session(wallet): Session) -> Json<WalletSession> {
    Json(wallet)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn returns_session_wallet() {
        let wallet = WalletSession {
            address: "0:abcd".to_string(),
            network: "-3".to_string(),
            expires_at: 42,
            token_id: "jti".to_string(),
        };

        let Json(body) = get_current_wallet(Session(wallet.clone())).await;
        assert_eq!(body, wallet);
    }
}
