// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum extractors for bearer tokens.
//!
//! Use the `Auth` extractor in handlers to require a verified token:
//!
//! ```rust,ignore
//! async fn my_handler(Auth(identity): Auth) -> impl IntoResponse {
//!     // identity is VerifiedIdentity
//! }
//! ```

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use tracing::{error, warn};

use super::{AuthError, VerifiedIdentity};
use crate::state::AppState;

/// Raw token from an `Authorization: Bearer <token>` header.
///
/// The header value must be exactly two space-separated parts, the first
/// being `Bearer` in any letter case. Nothing is verified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BearerToken(pub String);

impl BearerToken {
    pub fn parse(header: &str) -> Result<Self, AuthError> {
        let mut parts = header.split(' ');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(scheme), Some(token), None)
                if scheme.eq_ignore_ascii_case("bearer") && !token.is_empty() =>
            {
                Ok(Self(token.to_string()))
            }
            _ => Err(AuthError::InvalidAuthHeader),
        }
    }
}

impl<S: Send + Sync> FromRequestParts<S> for BearerToken {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .ok_or(AuthError::MissingAuthHeader)?
            .to_str()
            .map_err(|_| AuthError::InvalidAuthHeader)?;

        BearerToken::parse(header)
    }
}

/// Extractor for a verified identity.
///
/// Reads the bearer token and runs it through the state's verifier.
/// Rejection reasons are logged here and never returned to the caller.
pub struct Auth(pub VerifiedIdentity);

impl FromRequestParts<AppState> for Auth {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let BearerToken(token) = match BearerToken::from_request_parts(parts, state).await {
            Ok(token) => token,
            Err(e) => {
                warn!(reason = e.error_code(), "Bearer token missing or malformed");
                return Err(e);
            }
        };

        match state.verifier.verify(&token).await {
            Ok(identity) => Ok(Auth(identity)),
            Err(e @ AuthError::KeyFetch(_)) => {
                error!(error = %e, "Could not load signing keys");
                Err(e)
            }
            Err(e) => {
                warn!(reason = e.error_code(), detail = %e, "Token rejected");
                Err(e)
            }
        }
    }
}
