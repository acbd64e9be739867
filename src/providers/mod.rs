// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Identity Provider Client
//!
//! The gateway never stores users or passwords itself. Registration and
//! password authentication are forwarded to an [`IdentityProvider`]:
//!
//! - [`CognitoClient`] talks to an Amazon Cognito user pool (production)
//! - `InMemoryProvider` is a local stand-in for tests and `--features dev`
//!
//! Providers do not retry; every failure is surfaced to the caller.

pub mod cognito;
#[cfg(any(test, feature = "dev"))]
pub mod memory;

use std::sync::Arc;

use async_trait::async_trait;
use axum::http::StatusCode;
use tracing::{info, instrument, warn};

use crate::config::{Config, ConfigError, ProviderKind};
use crate::models::{AuthenticationResult, Credentials};

pub use cognito::CognitoClient;
#[cfg(any(test, feature = "dev"))]
pub use memory::InMemoryProvider;

/// Provider error codes that describe a problem with the caller's input
/// (bad credentials, duplicate user, password policy...). Anything else is
/// treated as the provider being unavailable.
const CLIENT_ERROR_CODES: &[&str] = &[
    "AliasExistsException",
    "ChallengeRequired",
    "CodeMismatchException",
    "ExpiredCodeException",
    "InvalidParameterException",
    "InvalidPasswordException",
    "NotAuthorizedException",
    "PasswordResetRequiredException",
    "UserLambdaValidationException",
    "UserNotConfirmedException",
    "UserNotFoundException",
    "UsernameExistsException",
];

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// The provider refused the request because of the caller's input.
    #[error("{operation} rejected ({code}): {message}")]
    Rejected {
        operation: &'static str,
        code: String,
        message: String,
    },

    /// Transport failure, timeout, throttling or a provider-side fault.
    #[error("{operation} failed: {message}")]
    Unavailable {
        operation: &'static str,
        message: String,
    },

    /// The account was created but could not be confirmed. The user exists
    /// in the pool in an unconfirmed state.
    #[error("user '{username}' was registered but confirmation failed: {source}")]
    ConfirmationFailed {
        username: String,
        #[source]
        source: Box<ProviderError>,
    },
}

impl ProviderError {
    /// Build an error from a provider error code, choosing the variant by
    /// whether the code describes a client mistake.
    pub fn from_code(
        operation: &'static str,
        code: Option<&str>,
        message: impl Into<String>,
    ) -> Self {
        let message = message.into();
        match code {
            Some(code) if CLIENT_ERROR_CODES.contains(&code) => ProviderError::Rejected {
                operation,
                code: code.to_string(),
                message,
            },
            Some(code) => ProviderError::Unavailable {
                operation,
                message: format!("{code}: {message}"),
            },
            None => ProviderError::Unavailable { operation, message },
        }
    }

    /// HTTP status used when this error reaches a client.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ProviderError::Rejected { .. } => StatusCode::BAD_REQUEST,
            ProviderError::Unavailable { .. } | ProviderError::ConfirmationFailed { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

/// Remote user directory operations.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Create a user in the pool.
    async fn sign_up(&self, credentials: &Credentials) -> Result<(), ProviderError>;

    /// Administratively confirm a user so no verification step is needed.
    async fn confirm_sign_up(&self, username: &str) -> Result<(), ProviderError>;

    /// Run the server-side password authentication flow.
    async fn authenticate(
        &self,
        credentials: &Credentials,
    ) -> Result<AuthenticationResult, ProviderError>;
}

/// Outcome of a successful [`register`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
    Confirmed,
    PendingConfirmation,
}

/// Create a user and, when `auto_confirm` is set, confirm it straight away.
///
/// A confirmation failure after a successful sign-up is reported as
/// [`ProviderError::ConfirmationFailed`]; the account is left unconfirmed.
#[instrument(skip(provider, credentials), fields(username = %credentials.username))]
pub async fn register(
    provider: &dyn IdentityProvider,
    credentials: &Credentials,
    auto_confirm: bool,
) -> Result<Registration, ProviderError> {
    provider.sign_up(credentials).await?;

    if !auto_confirm {
        info!("User registered, confirmation left to the user pool");
        return Ok(Registration::PendingConfirmation);
    }

    if let Err(e) = provider.confirm_sign_up(&credentials.username).await {
        warn!(error = %e, "User registered but auto-confirmation failed");
        return Err(ProviderError::ConfirmationFailed {
            username: credentials.username.clone(),
            source: Box::new(e),
        });
    }

    info!("User registered and confirmed");
    Ok(Registration::Confirmed)
}

/// Build the provider selected by `IDENTITY_PROVIDER`.
///
/// The in-memory provider only exists in builds with the `dev` feature.
pub async fn from_config(config: &Config) -> Result<Arc<dyn IdentityProvider>, ConfigError> {
    match config.identity_provider {
        ProviderKind::Cognito => Ok(Arc::new(CognitoClient::from_config(config).await)),
        #[cfg(any(test, feature = "dev"))]
        ProviderKind::Memory => {
            warn!("Using the in-memory identity provider; users are lost on restart");
            Ok(Arc::new(InMemoryProvider::new()))
        }
        #[cfg(not(any(test, feature = "dev")))]
        ProviderKind::Memory => Err(ConfigError::InvalidValue {
            name: "IDENTITY_PROVIDER",
            reason: "the memory provider requires a build with --features dev".to_string(),
        }),
    }
}
