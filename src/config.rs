// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Configuration is loaded from the environment at startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `AWS_DEFAULT_REGION` | Cognito region (falls back to `AWS_REGION`) | Required |
//! | `COGNITO_APP_CLIENT_ID` | App client ID, also the expected token audience | Required |
//! | `COGNITO_USER_POOL_ID` | User pool ID | Required |
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `COGNITO_AUTO_CONFIRM` | Confirm new users without email/SMS verification | `true` |
//! | `COGNITO_JWKS_URL` | Override for the derived JWKS endpoint | Derived |
//! | `UPSTREAM_TIMEOUT_SECS` | Timeout for Cognito and JWKS calls | `10` |
//! | `JWT_CLOCK_SKEW_SECONDS` | Leeway applied to `exp`/`nbf` | `0` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `IDENTITY_PROVIDER` | `cognito`, or `memory` (builds with `--features dev` only) | `cognito` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::collections::HashMap;
use std::env;
use std::net::SocketAddr;
use std::time::Duration;

use thiserror::Error;
use url::Url;

/// Default bind host.
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default bind port.
pub const DEFAULT_PORT: u16 = 8080;

/// Default timeout for outbound calls to Cognito and the JWKS endpoint.
pub const DEFAULT_UPSTREAM_TIMEOUT: Duration = Duration::from_secs(10);

/// Upper bound for `JWT_CLOCK_SKEW_SECONDS`.
pub const MAX_CLOCK_SKEW_SECONDS: u64 = 300;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Invalid value for {name}: {reason}")]
    InvalidValue { name: &'static str, reason: String },
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl LogFormat {
    fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::to_ascii_lowercase).as_deref() {
            Some("json") => LogFormat::Json,
            _ => LogFormat::Pretty,
        }
    }
}

/// Backend that stores users and issues tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProviderKind {
    #[default]
    Cognito,
    /// Process-local user table. Development only.
    Memory,
}

impl ProviderKind {
    fn parse(raw: &str) -> Result<Self, ConfigError> {
        match raw.to_ascii_lowercase().as_str() {
            "cognito" => Ok(ProviderKind::Cognito),
            "memory" => Ok(ProviderKind::Memory),
            _ => Err(ConfigError::InvalidValue {
                name: "IDENTITY_PROVIDER",
                reason: format!("expected 'cognito' or 'memory', got '{raw}'"),
            }),
        }
    }
}

/// Gateway configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Cognito region, e.g. `eu-west-1`.
    pub region: String,
    /// App client ID used for sign-up/sign-in and as the expected audience.
    pub app_client_id: String,
    /// User pool ID, e.g. `eu-west-1_AbCdEf123`.
    pub user_pool_id: String,
    pub host: String,
    pub port: u16,
    /// Auto-confirm every registered user.
    ///
    /// This skips the pool's email/phone verification step. It is on by
    /// default to keep the historical behaviour; turn it off to leave new
    /// accounts unconfirmed.
    pub auto_confirm: bool,
    /// Explicit JWKS endpoint, replacing the one derived from region + pool.
    pub jwks_url_override: Option<String>,
    pub upstream_timeout: Duration,
    pub clock_skew_seconds: u64,
    pub log_format: LogFormat,
    pub identity_provider: ProviderKind,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    /// Load configuration from a map of variables.
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let get = |name: &str| {
            vars.get(name)
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };

        let region = get("AWS_DEFAULT_REGION")
            .or_else(|| get("AWS_REGION"))
            .ok_or(ConfigError::MissingEnvVar("AWS_DEFAULT_REGION"))?;
        let app_client_id = get("COGNITO_APP_CLIENT_ID")
            .ok_or(ConfigError::MissingEnvVar("COGNITO_APP_CLIENT_ID"))?;
        let user_pool_id = get("COGNITO_USER_POOL_ID")
            .ok_or(ConfigError::MissingEnvVar("COGNITO_USER_POOL_ID"))?;

        let host = get("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = match get("PORT") {
            Some(raw) => raw.parse::<u16>().map_err(|e| ConfigError::InvalidValue {
                name: "PORT",
                reason: format!("'{raw}' is not a valid port: {e}"),
            })?,
            None => DEFAULT_PORT,
        };

        let auto_confirm = match get("COGNITO_AUTO_CONFIRM") {
            Some(raw) => parse_bool(&raw).ok_or_else(|| ConfigError::InvalidValue {
                name: "COGNITO_AUTO_CONFIRM",
                reason: format!("expected true/false, got '{raw}'"),
            })?,
            None => true,
        };

        let jwks_url_override = match get("COGNITO_JWKS_URL") {
            Some(raw) => {
                Url::parse(&raw).map_err(|e| ConfigError::InvalidValue {
                    name: "COGNITO_JWKS_URL",
                    reason: e.to_string(),
                })?;
                Some(raw)
            }
            None => None,
        };

        let upstream_timeout = match get("UPSTREAM_TIMEOUT_SECS") {
            Some(raw) => match raw.parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    return Err(ConfigError::InvalidValue {
                        name: "UPSTREAM_TIMEOUT_SECS",
                        reason: format!("expected a positive integer, got '{raw}'"),
                    })
                }
            },
            None => DEFAULT_UPSTREAM_TIMEOUT,
        };

        let clock_skew_seconds = match get("JWT_CLOCK_SKEW_SECONDS") {
            Some(raw) => match raw.parse::<u64>() {
                Ok(secs) if secs <= MAX_CLOCK_SKEW_SECONDS => secs,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        name: "JWT_CLOCK_SKEW_SECONDS",
                        reason: format!(
                            "expected an integer between 0 and {}, got '{raw}'",
                            MAX_CLOCK_SKEW_SECONDS
                        ),
                    })
                }
            },
            None => 0,
        };

        let identity_provider = match get("IDENTITY_PROVIDER") {
            Some(raw) => ProviderKind::parse(&raw)?,
            None => ProviderKind::default(),
        };

        Ok(Self {
            region,
            app_client_id,
            user_pool_id,
            host,
            port,
            auto_confirm,
            jwks_url_override,
            upstream_timeout,
            clock_skew_seconds,
            log_format: LogFormat::parse(get("LOG_FORMAT").as_deref()),
            identity_provider,
        })
    }

    /// Issuer expected in tokens minted by the user pool.
    pub fn issuer(&self) -> String {
        format!(
            "https://cognito-idp.{}.amazonaws.com/{}",
            self.region, self.user_pool_id
        )
    }

    /// JWKS endpoint for the user pool.
    pub fn jwks_url(&self) -> String {
        self.jwks_url_override
            .clone()
            .unwrap_or_else(|| format!("{}/.well-known/jwks.json", self.issuer()))
    }

    pub fn bind_address(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| ConfigError::InvalidValue {
                name: "HOST",
                reason: format!("'{}' is not a valid bind address: {e}", self.host),
            })
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}
