// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum extractor for wallet sessions.
//!
//! Use the `Session` extractor in handlers to require a session token:
//!
//! ```rust,ignore
//! async fn my_handler(Session(wallet): Session) -> impl IntoResponse {
//!     // wallet is WalletSession
//! }
//! ```

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use super::{AuthError, WalletSession};
use crate::state::AppState;

/// Extractor for requests carrying a valid session token.
pub struct Session(pub WalletSession);

impl FromRequestParts<AppState> for Session {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        // Extract Authorization header
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .ok_or(AuthError::MissingAuthHeader)?
            .to_str()
            .map_err(|_| AuthError::InvalidAuthHeader)?;

        // Extract Bearer token
        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or(AuthError::InvalidAuthHeader)?;

        let claims = state.sessions.validate(token)?;
        Ok(Session(claims.into()))
    }
}
