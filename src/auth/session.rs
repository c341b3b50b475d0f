// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! HS256 session tokens minted after an accepted wallet proof.

use std::sync::Arc;

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use super::{AuthError, SessionClaims};
use crate::config::SessionConfig;
use crate::proof::{Clock, VerifiedWallet};

/// Issuer claim stamped into every session token.
pub const SESSION_ISSUER: &str = "onton-proof-server";

/// Clock skew tolerance (60 seconds).
const CLOCK_SKEW_LEEWAY: u64 = 60;

/// A minted session token.
#[derive(Debug, Clone)]
pub struct SessionToken {
    pub token: String,
    pub claims: SessionClaims,
}

pub struct SessionIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl_secs: u64,
    clock: Arc<dyn Clock>,
}

impl SessionIssuer {
    pub fn new(config: &SessionConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            encoding: EncodingKey::from_secret(&config.secret),
            decoding: DecodingKey::from_secret(&config.secret),
            ttl_secs: config.ttl.as_secs(),
            clock,
        }
    }

    /// Mint a token for a wallet whose proof was just accepted.
    pub fn mint(&self, wallet: &VerifiedWallet) -> Result<SessionToken, AuthError> {
        let iat = self.clock.now_unix();
        let claims = SessionClaims {
            sub: wallet.address.to_string(),
            network: wallet.network.clone(),
            iat,
            exp: iat.saturating_add(self.ttl_secs),
            iss: SESSION_ISSUER.to_string(),
            jti: uuid::Uuid::new_v4().to_string(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AuthError::InternalError(e.to_string()))?;

        Ok(SessionToken { token, claims })
    }

    /// Verify signature, issuer and expiry of a session token.
    ///
    /// Expiry is checked against the injected clock rather than the system
    /// time so token lifetimes line up with payload lifetimes.
    pub fn validate(&self, token: &str) -> Result<SessionClaims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.set_issuer(&[SESSION_ISSUER]);
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);

        let claims = decode::<SessionClaims>(token, &self.decoding, &validation)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::InvalidSignature => AuthError::InvalidSignature,
                jsonwebtoken::errors::ErrorKind::InvalidIssuer => AuthError::InvalidIssuer,
                _ => AuthError::MalformedToken,
            })?
            .claims;

        let now = self.clock.now_unix();
        if claims.exp.saturating_add(CLOCK_SKEW_LEEWAY) < now {
            return Err(AuthError::TokenExpired);
        }

        Ok(claims)
    }
}
