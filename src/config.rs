// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! This module defines environment variable names and default values used
//! throughout the application. Configuration is loaded from the environment
//! once at startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `DATA_DIR` | Directory holding `carelink.redb` | `./data` |
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `JWT_SECRET` | HS256 signing secret (min. 32 bytes) | Required unless built with `dev` |
//! | `ACCESS_TOKEN_TTL_SECS` | Access token lifetime | `900` |
//! | `REFRESH_TOKEN_TTL_SECS` | Refresh token and session lifetime | `604800` |
//! | `BCRYPT_COST` | Password hashing cost | `12` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

use thiserror::Error;

use crate::state::AuthConfig;

/// Environment variable name for the data directory path.
pub const DATA_DIR_ENV: &str = "DATA_DIR";
pub const DEFAULT_DATA_DIR: &str = "./data";

/// Database file name inside the data directory.
pub const DATABASE_FILE: &str = "carelink.redb";

pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;

/// Environment variable name for the JWT signing secret.
///
/// Release builds refuse to start without it.
pub const JWT_SECRET_ENV: &str = "JWT_SECRET";

/// Minimum accepted secret length in bytes.
pub const MIN_JWT_SECRET_LEN: usize = 32;

pub const ACCESS_TOKEN_TTL_ENV: &str = "ACCESS_TOKEN_TTL_SECS";
pub const REFRESH_TOKEN_TTL_ENV: &str = "REFRESH_TOKEN_TTL_SECS";
pub const DEFAULT_ACCESS_TOKEN_TTL_SECS: i64 = 15 * 60;
pub const DEFAULT_REFRESH_TOKEN_TTL_SECS: i64 = 7 * 24 * 60 * 60;
/// Upper bound for either token lifetime (ten years).
pub const MAX_TOKEN_TTL_SECS: i64 = 10 * 365 * 24 * 60 * 60;

pub const BCRYPT_COST_ENV: &str = "BCRYPT_COST";
pub const DEFAULT_BCRYPT_COST: u32 = 12;

/// Issuer claim written into and expected on every token.
pub const TOKEN_ISSUER: &str = "carelink";

pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";
pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";

#[cfg(feature = "dev")]
const DEV_JWT_SECRET: &str = "carelink-development-secret-do-not-deploy";

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} is invalid: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Settings resolved from the environment.
#[derive(Debug, Clone)]
pub struct Settings {
    pub data_dir: PathBuf,
    pub bind_addr: SocketAddr,
    pub auth: AuthConfig,
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Resolve settings through an arbitrary lookup (tests pass a map).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let data_dir = PathBuf::from(
            lookup(DATA_DIR_ENV).unwrap_or_else(|| DEFAULT_DATA_DIR.to_string()),
        );

        let host = lookup(HOST_ENV).unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = parse_or(&lookup, PORT_ENV, DEFAULT_PORT)?;
        let bind_addr: SocketAddr =
            format!("{host}:{port}")
                .parse()
                .map_err(|e: std::net::AddrParseError| ConfigError::Invalid {
                    name: HOST_ENV,
                    reason: e.to_string(),
                })?;

        let jwt_secret = jwt_secret(&lookup)?;
        let access_token_ttl =
            token_ttl(&lookup, ACCESS_TOKEN_TTL_ENV, DEFAULT_ACCESS_TOKEN_TTL_SECS)?;
        let refresh_token_ttl =
            token_ttl(&lookup, REFRESH_TOKEN_TTL_ENV, DEFAULT_REFRESH_TOKEN_TTL_SECS)?;

        let password_cost = parse_or(&lookup, BCRYPT_COST_ENV, DEFAULT_BCRYPT_COST)?;
        if !(4..=31).contains(&password_cost) {
            return Err(ConfigError::Invalid {
                name: BCRYPT_COST_ENV,
                reason: format!("{password_cost} is outside 4..=31"),
            });
        }

        Ok(Self {
            data_dir,
            bind_addr,
            auth: AuthConfig {
                jwt_secret,
                issuer: TOKEN_ISSUER.to_string(),
                access_token_ttl,
                refresh_token_ttl,
                password_cost,
            },
        })
    }

    /// Full path of the database file.
    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(DATABASE_FILE)
    }
}

fn parse_or<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(name) {
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            name,
            reason: e.to_string(),
        }),
        None => Ok(default),
    }
}

/// Token lifetime in seconds, within `1..=MAX_TOKEN_TTL_SECS`.
fn token_ttl<F>(
    lookup: &F,
    name: &'static str,
    default: i64,
) -> Result<chrono::Duration, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let secs = parse_or(lookup, name, default)?;
    if !(1..=MAX_TOKEN_TTL_SECS).contains(&secs) {
        return Err(ConfigError::Invalid {
            name,
            reason: format!("{secs} is outside 1..={MAX_TOKEN_TTL_SECS}"),
        });
    }
    chrono::Duration::try_seconds(secs).ok_or(ConfigError::Invalid {
        name,
        reason: format!("{secs} seconds is out of range"),
    })
}

fn jwt_secret<F>(lookup: &F) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(JWT_SECRET_ENV) {
        Some(secret) if secret.len() >= MIN_JWT_SECRET_LEN => Ok(secret),
        Some(_) => Err(ConfigError::Invalid {
            name: JWT_SECRET_ENV,
            reason: format!("must be at least {MIN_JWT_SECRET_LEN} bytes"),
        }),
        None => missing_secret(),
    }
}

#[cfg(feature = "dev")]
fn missing_secret() -> Result<String, ConfigError> {
    tracing::warn!(
        "{} not set, using the built-in development secret",
        JWT_SECRET_ENV
    );
    Ok(DEV_JWT_SECRET.to_string())
}

#[cfg(not(feature = "dev"))]
fn missing_secret() -> Result<String, ConfigError> {
    Err(ConfigError::Missing(JWT_SECRET_ENV))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn defaults_apply() {
        let settings = Settings::from_lookup(lookup(&[(JWT_SECRET_ENV, SECRET)])).unwrap();
        assert_eq!(settings.bind_addr.port(), DEFAULT_PORT);
        assert_eq!(settings.database_path(), PathBuf::from("./data/carelink.redb"));
        assert_eq!(settings.auth.access_token_ttl, chrono::Duration::minutes(15));
        assert_eq!(settings.auth.refresh_token_ttl, chrono::Duration::days(7));
        assert_eq!(settings.auth.password_cost, DEFAULT_BCRYPT_COST);
        assert_eq!(settings.auth.issuer, TOKEN_ISSUER);
    }

    #[test]
    fn overrides_are_read() {
        let settings = Settings::from_lookup(lookup(&[
            (JWT_SECRET_ENV, SECRET),
            (HOST_ENV, "127.0.0.1"),
            (PORT_ENV, "9000"),
            (DATA_DIR_ENV, "/var/lib/carelink"),
            (ACCESS_TOKEN_TTL_ENV, "60"),
            (BCRYPT_COST_ENV, "10"),
        ]))
        .unwrap();
        assert_eq!(settings.bind_addr.to_string(), "127.0.0.1:9000");
        assert_eq!(
            settings.database_path(),
            PathBuf::from("/var/lib/carelink/carelink.redb")
        );
        assert_eq!(settings.auth.access_token_ttl, chrono::Duration::seconds(60));
        assert_eq!(settings.auth.password_cost, 10);
    }

    #[test]
    fn short_secret_rejected() {
        let result = Settings::from_lookup(lookup(&[(JWT_SECRET_ENV, "short")]));
        assert!(matches!(
            result,
            Err(ConfigError::Invalid { name: JWT_SECRET_ENV, .. })
        ));
    }

    #[test]
    fn bad_port_rejected() {
        let result = Settings::from_lookup(lookup(&[(JWT_SECRET_ENV, SECRET), (PORT_ENV, "http")]));
        assert!(matches!(result, Err(ConfigError::Invalid { name: PORT_ENV, .. })));
    }

    #[test]
    fn out_of_range_token_lifetimes_rejected() {
        for raw in ["0", "-5", "9223372036854775807", "315360001"] {
            let result = Settings::from_lookup(lookup(&[
                (JWT_SECRET_ENV, SECRET),
                (ACCESS_TOKEN_TTL_ENV, raw),
            ]));
            assert!(
                matches!(result, Err(ConfigError::Invalid { name: ACCESS_TOKEN_TTL_ENV, .. })),
                "{raw}"
            );
        }

        let result = Settings::from_lookup(lookup(&[
            (JWT_SECRET_ENV, SECRET),
            (REFRESH_TOKEN_TTL_ENV, "9223372036854775807"),
        ]));
        assert!(matches!(
            result,
            Err(ConfigError::Invalid { name: REFRESH_TOKEN_TTL_ENV, .. })
        ));
    }

    #[cfg(not(feature = "dev"))]
    #[test]
    fn missing_secret_is_fatal() {
        let result = Settings::from_lookup(lookup(&[]));
        assert!(matches!(result, Err(ConfigError::Missing(JWT_SECRET_ENV))));
    }
}
