// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication errors.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Failure to obtain a key set from the JWKS endpoint.
///
/// Always an infrastructure problem, never the caller's fault.
#[derive(Debug, thiserror::Error)]
pub enum KeyFetchError {
    #[error("failed to build JWKS HTTP client: {0}")]
    Client(String),

    #[error("JWKS request to {url} failed: {message}")]
    Transport { url: String, message: String },

    #[error("JWKS endpoint {url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("JWKS endpoint {url} returned an invalid document: {message}")]
    Malformed { url: String, message: String },
}

/// Authentication error type.
///
/// Header problems and token rejections are client errors (400). Key fetch
/// failures are server errors (500).
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Authorization header is required")]
    MissingAuthHeader,

    #[error("Invalid authorization header format (expected 'Bearer <token>')")]
    InvalidAuthHeader,

    #[error("Token is malformed: {0}")]
    MalformedToken(&'static str),

    #[error("Token algorithm '{0}' is not allowed")]
    DisallowedAlgorithm(String),

    #[error("No key with id '{0}' in the JWKS")]
    UnknownKey(String),

    #[error("Token signature is invalid")]
    BadSignature,

    #[error("Token has expired")]
    Expired,

    #[error("Token is not yet valid")]
    NotYetValid,

    #[error("Token issuer is invalid")]
    IssuerMismatch,

    #[error("Token audience is invalid")]
    AudienceMismatch,

    #[error(transparent)]
    KeyFetch(#[from] KeyFetchError),
}

#[derive(Serialize)]
struct AuthErrorBody {
    error: String,
    error_code: String,
}

impl AuthError {
    /// Reason code for logs and metrics.
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::MissingAuthHeader => "missing_auth_header",
            AuthError::InvalidAuthHeader => "invalid_auth_header",
            AuthError::MalformedToken(_) => "malformed_token",
            AuthError::DisallowedAlgorithm(_) => "disallowed_algorithm",
            AuthError::UnknownKey(_) => "unknown_key",
            AuthError::BadSignature => "bad_signature",
            AuthError::Expired => "expired",
            AuthError::NotYetValid => "not_yet_valid",
            AuthError::IssuerMismatch => "issuer_mismatch",
            AuthError::AudienceMismatch => "audience_mismatch",
            AuthError::KeyFetch(_) => "jwks_fetch_error",
        }
    }

    /// Whether the token itself was rejected (as opposed to a header or
    /// infrastructure problem).
    pub fn is_rejection(&self) -> bool {
        !matches!(
            self,
            AuthError::MissingAuthHeader | AuthError::InvalidAuthHeader | AuthError::KeyFetch(_)
        )
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::KeyFetch(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        // Rejection details stay in the logs; clients only learn the token is bad.
        let body = if self.is_rejection() {
            AuthErrorBody {
                error: "invalid token".to_string(),
                error_code: "invalid_token".to_string(),
            }
        } else if let AuthError::KeyFetch(_) = self {
            AuthErrorBody {
                error: "token verification is temporarily unavailable".to_string(),
                error_code: self.error_code().to_string(),
            }
        } else {
            AuthErrorBody {
                error: self.to_string(),
                error_code: self.error_code().to_string(),
            }
        };
        (status, Json(body)).into_response()
    }
}
