// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! Request and response bodies for the gateway endpoints. All types derive
//! `ToSchema` for the OpenAPI document.

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// =============================================================================
// Credentials
// =============================================================================

/// Username/password pair used by `/signup` and `/signin`.
///
/// Lives only for the duration of one request. `Debug` output never contains
/// the password.
#[derive(Clone, Deserialize, ToSchema)]
pub struct Credentials {
    #[schema(example = "alice")]
    pub username: String,
    #[schema(example = "Secr3t!23", format = Password)]
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Reject blank fields before anything reaches the identity provider.
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.username.trim().is_empty() {
            return Err("username must not be empty");
        }
        if self.password.is_empty() {
            return Err("password must not be empty");
        }
        Ok(())
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

// =============================================================================
// Authentication Result
// =============================================================================

/// Token bundle issued by the identity provider, passed through unmodified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AuthenticationResult {
    /// The access token.
    pub access_token: String,
    /// The expiration period of the authentication result in seconds.
    pub expires_in: i32,
    /// The ID token.
    pub id_token: Option<String>,
    /// The refresh token.
    pub refresh_token: Option<String>,
    /// The token type.
    #[schema(example = "Bearer")]
    pub token_type: Option<String>,
}
