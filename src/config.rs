// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! This module defines environment variable names, default values and the
//! typed configuration loaded from the environment at startup. Nothing reads
//! the environment after `main` has built [`AppConfig`]; every component gets
//! its settings injected at construction.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `PROOF_SECRET` | HMAC key binding issued payloads (>= 32 bytes) | Required |
//! | `PROOF_TTL_SECS` | Payload validity window in seconds | `900` |
//! | `PROOF_TAG_LEN` | Transmitted HMAC tag length in bytes (16..=32) | `16` |
//! | `PROOF_ALLOWED_DOMAINS` | Comma-separated dApp domains accepted in proofs | any |
//! | `REPLAY_CACHE_CAPACITY` | Max live single-use proof markers | `100000` |
//! | `SESSION_SECRET` | HS256 key for session tokens (>= 32 bytes) | Required |
//! | `SESSION_TTL_SECS` | Session token lifetime in seconds | `86400` |
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `TLS_CERT_PATH` / `TLS_KEY_PATH` | PEM cert chain and key; both set enables HTTPS | unset |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::proof::payload::TagLength;

pub const PROOF_SECRET_ENV: &str = "PROOF_SECRET";
pub const PROOF_TTL_ENV: &str = "PROOF_TTL_SECS";
pub const PROOF_TAG_LEN_ENV: &str = "PROOF_TAG_LEN";
pub const PROOF_ALLOWED_DOMAINS_ENV: &str = "PROOF_ALLOWED_DOMAINS";
pub const REPLAY_CACHE_CAPACITY_ENV: &str = "REPLAY_CACHE_CAPACITY";
pub const SESSION_SECRET_ENV: &str = "SESSION_SECRET";
pub const SESSION_TTL_ENV: &str = "SESSION_TTL_SECS";
pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const TLS_CERT_PATH_ENV: &str = "TLS_CERT_PATH";
pub const TLS_KEY_PATH_ENV: &str = "TLS_KEY_PATH";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

/// Default payload TTL (15 minutes).
pub const DEFAULT_PROOF_TTL: Duration = Duration::from_secs(15 * 60);

/// Default session token lifetime (24 hours).
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Default number of single-use markers held by the replay guard.
pub const DEFAULT_REPLAY_CAPACITY: usize = 100_000;

/// Minimum accepted length for HMAC and JWT secrets.
pub const MIN_SECRET_LEN: usize = 32;

/// Configuration errors. These are fatal at startup.
///
/// Messages name the offending variable but never echo its value.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),
    #[error("{0} must be at least 32 bytes")]
    SecretTooShort(&'static str),
    #[error("{name} has an invalid value: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Settings for payload issuance and proof verification.
#[derive(Clone)]
pub struct ProofConfig {
    /// Server-held HMAC key. Never logged.
    pub secret: Vec<u8>,
    /// How long an issued payload stays valid.
    pub ttl: Duration,
    /// How many bytes of the HMAC tag travel with the payload.
    pub tag_len: TagLength,
    /// Domains a proof may be signed for. Empty accepts any domain.
    pub allowed_domains: Vec<String>,
}

impl ProofConfig {
    /// Build a config with default TTL and tag length.
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        Self {
            secret: secret.into(),
            ttl: DEFAULT_PROOF_TTL,
            tag_len: TagLength::default(),
            allowed_domains: Vec::new(),
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn with_tag_len(mut self, tag_len: TagLength) -> Self {
        self.tag_len = tag_len;
        self
    }

    pub fn with_allowed_domains<I, S>(mut self, domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_domains = domains.into_iter().map(Into::into).collect();
        self
    }
}

impl std::fmt::Debug for ProofConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProofConfig")
            .field("secret", &"<redacted>")
            .field("ttl", &self.ttl)
            .field("tag_len", &self.tag_len)
            .field("allowed_domains", &self.allowed_domains)
            .finish()
    }
}

/// Session token settings.
#[derive(Clone)]
pub struct SessionConfig {
    pub secret: Vec<u8>,
    pub ttl: Duration,
}

impl std::fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionConfig")
            .field("secret", &"<redacted>")
            .field("ttl", &self.ttl)
            .finish()
    }
}

/// PEM file locations for HTTPS.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsPaths {
    pub cert: PathBuf,
    pub key: PathBuf,
}

/// Full process configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub proof: ProofConfig,
    pub session: SessionConfig,
    pub replay_capacity: usize,
    pub bind_addr: SocketAddr,
    pub tls: Option<TlsPaths>,
}

impl AppConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let proof_secret = required_secret(&lookup, PROOF_SECRET_ENV)?;
        let session_secret = required_secret(&lookup, SESSION_SECRET_ENV)?;

        let proof_ttl = optional_secs(&lookup, PROOF_TTL_ENV)?.unwrap_or(DEFAULT_PROOF_TTL);
        if proof_ttl.is_zero() {
            return Err(ConfigError::Invalid {
                name: PROOF_TTL_ENV,
                reason: "must be greater than zero".to_string(),
            });
        }
        let session_ttl = optional_secs(&lookup, SESSION_TTL_ENV)?.unwrap_or(DEFAULT_SESSION_TTL);

        let tag_len = match lookup(PROOF_TAG_LEN_ENV) {
            Some(raw) => {
                let bytes: usize = parse(PROOF_TAG_LEN_ENV, &raw)?;
                TagLength::new(bytes).map_err(|e| ConfigError::Invalid {
                    name: PROOF_TAG_LEN_ENV,
                    reason: e.to_string(),
                })?
            }
            None => TagLength::default(),
        };

        let allowed_domains = lookup(PROOF_ALLOWED_DOMAINS_ENV)
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|d| !d.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        let replay_capacity = match lookup(REPLAY_CACHE_CAPACITY_ENV) {
            Some(raw) => parse(REPLAY_CACHE_CAPACITY_ENV, &raw)?,
            None => DEFAULT_REPLAY_CAPACITY,
        };
        if replay_capacity == 0 {
            return Err(ConfigError::Invalid {
                name: REPLAY_CACHE_CAPACITY_ENV,
                reason: "must be greater than zero".to_string(),
            });
        }

        let host = lookup(HOST_ENV).unwrap_or_else(|| "0.0.0.0".to_string());
        let port: u16 = match lookup(PORT_ENV) {
            Some(raw) => parse(PORT_ENV, &raw)?,
            None => 8080,
        };
        let bind_addr: SocketAddr =
            format!("{host}:{port}")
                .parse()
                .map_err(|_| ConfigError::Invalid {
                    name: HOST_ENV,
                    reason: format!("'{host}' is not a valid IP address"),
                })?;

        let tls = match (lookup(TLS_CERT_PATH_ENV), lookup(TLS_KEY_PATH_ENV)) {
            (Some(cert), Some(key)) => Some(TlsPaths {
                cert: PathBuf::from(cert),
                key: PathBuf::from(key),
            }),
            (None, None) => None,
            (Some(_), None) => return Err(ConfigError::Missing(TLS_KEY_PATH_ENV)),
            (None, Some(_)) => return Err(ConfigError::Missing(TLS_CERT_PATH_ENV)),
        };

        Ok(Self {
            proof: ProofConfig {
                secret: proof_secret,
                ttl: proof_ttl,
                tag_len,
                allowed_domains,
            },
            session: SessionConfig {
                secret: session_secret,
                ttl: session_ttl,
            },
            replay_capacity,
            bind_addr,
            tls,
        })
    }
}

fn required_secret<F>(lookup: &F, name: &'static str) -> Result<Vec<u8>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let value = lookup(name)
        .filter(|v| !v.is_empty())
        .ok_or(ConfigError::Missing(name))?;
    if value.len() < MIN_SECRET_LEN {
        return Err(ConfigError::SecretTooShort(name));
    }
    Ok(value.into_bytes())
}

fn optional_secs<F>(lookup: &F, name: &'static str) -> Result<Option<Duration>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name)
        .map(|raw| parse::<u64>(name, &raw).map(Duration::from_secs))
        .transpose()
}

fn parse<T>(name: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
        name,
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const SECRET_A: &str = "0123456789abcdef0123456789abcdef";
    const SECRET_B: &str = "fedcba9876543210fedcba9876543210";

    fn load(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|name| map.get(name).cloned())
    }

    fn base() -> Vec<(&'static str, &'static str)> {
        vec![(PROOF_SECRET_ENV, SECRET_A), (SESSION_SECRET_ENV, SECRET_B)]
    }

    #[test]
    fn defaults_applied() {
        let config = load(&base()).expect("config loads");
        assert_eq!(config.proof.ttl, DEFAULT_PROOF_TTL);
        assert_eq!(config.proof.tag_len.bytes(), 16);
        assert!(config.proof.allowed_domains.is_empty());
        assert_eq!(config.session.ttl, DEFAULT_SESSION_TTL);
        assert_eq!(config.replay_capacity, DEFAULT_REPLAY_CAPACITY);
        assert_eq!(config.bind_addr, "0.0.0.0:8080".parse::<SocketAddr>().unwrap());
        assert!(config.tls.is_none());
    }

    #[test]
    fn missing_proof_secret_is_fatal() {
        let err = load(&[(SESSION_SECRET_ENV, SECRET_B)]).unwrap_err();
        assert_eq!(err, ConfigError::Missing(PROOF_SECRET_ENV));
    }

    #[test]
    fn short_secret_rejected_without_echoing_value() {
        let err = load(&[(PROOF_SECRET_ENV, "hunter2"), (SESSION_SECRET_ENV, SECRET_B)])
            .unwrap_err();
        assert_eq!(err, ConfigError::SecretTooShort(PROOF_SECRET_ENV));
        assert!(!err.to_string().contains("hunter2"));
    }

    #[test]
    fn overrides_parsed() {
        let mut vars = base();
        vars.extend([
            (PROOF_TTL_ENV, "300"),
            (PROOF_TAG_LEN_ENV, "32"),
            (PROOF_ALLOWED_DOMAINS_ENV, "onton.live, app.onton.live ,"),
            (REPLAY_CACHE_CAPACITY_ENV, "10"),
            (HOST_ENV, "127.0.0.1"),
            (PORT_ENV, "9000"),
        ]);
        let config = load(&vars).expect("config loads");
        assert_eq!(config.proof.ttl, Duration::from_secs(300));
        assert_eq!(config.proof.tag_len.bytes(), 32);
        assert_eq!(
            config.proof.allowed_domains,
            vec!["onton.live".to_string(), "app.onton.live".to_string()]
        );
        assert_eq!(config.replay_capacity, 10);
        assert_eq!(config.bind_addr, "127.0.0.1:9000".parse::<SocketAddr>().unwrap());
    }

    #[test]
    fn tag_len_out_of_range_rejected() {
        let mut vars = base();
        vars.push((PROOF_TAG_LEN_ENV, "8"));
        assert!(matches!(
            load(&vars),
            Err(ConfigError::Invalid { name: PROOF_TAG_LEN_ENV, .. })
        ));
    }

    #[test]
    fn zero_ttl_rejected() {
        let mut vars = base();
        vars.push((PROOF_TTL_ENV, "0"));
        assert!(matches!(
            load(&vars),
            Err(ConfigError::Invalid { name: PROOF_TTL_ENV, .. })
        ));
    }

    #[test]
    fn tls_requires_both_paths() {
        let mut vars = base();
        vars.push((TLS_CERT_PATH_ENV, "/etc/tls/cert.pem"));
        assert_eq!(load(&vars).unwrap_err(), ConfigError::Missing(TLS_KEY_PATH_ENV));

        vars.push((TLS_KEY_PATH_ENV, "/etc/tls/key.pem"));
        let tls = load(&vars).expect("config loads").tls.expect("tls set");
        assert_eq!(tls.cert, PathBuf::from("/etc/tls/cert.pem"));
        assert_eq!(tls.key, PathBuf::from("/etc/tls/key.pem"));
    }

    #[test]
    fn debug_output_redacts_secrets() {
        let config = load(&base()).expect("config loads");
        let rendered = format!("{config:?}");
        assert!(!rendered.contains(SECRET_A));
        assert!(!rendered.contains(SECRET_B));
        assert!(rendered.contains("<redacted>"));
    }
}
