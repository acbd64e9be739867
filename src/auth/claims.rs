// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Verified identity extracted from an accepted token.

use serde::Serialize;
use serde_json::{Map, Value};
use utoipa::ToSchema;

use super::AuthError;

/// Claims that may carry the username, in lookup order.
///
/// Cognito ID tokens use `cognito:username`, access tokens use `username`.
pub const USERNAME_CLAIMS: &[&str] = &["cognito:username", "username", "sub"];

/// Identity proven by a verified token.
///
/// Derived per request, never stored.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct VerifiedIdentity {
    /// Username (or subject when no username claim is present).
    pub username: String,

    /// Subject (`sub` claim), if present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,

    /// Every claim in the token payload.
    #[schema(value_type = Object)]
    pub claims: Map<String, Value>,
}

impl VerifiedIdentity {
    /// Build from a validated claim set.
    pub fn from_claims(claims: Map<String, Value>) -> Result<Self, AuthError> {
        let username = USERNAME_CLAIMS
            .iter()
            .find_map(|name| {
                claims
                    .get(*name)
                    .and_then(Value::as_str)
                    .filter(|u| !u.is_empty())
            })
            .ok_or(AuthError::MalformedToken("missing username claim"))?
            .to_string();

        let subject = claims.get("sub").and_then(Value::as_str).map(str::to_string);

        Ok(Self {
            username,
            subject,
            claims,
        })
    }

    /// Expiry as a Unix timestamp.
    pub fn expires_at(&self) -> Option<i64> {
        self.claims.get("exp").and_then(Value::as_i64)
    }

    pub fn claim(&self, name: &str) -> Option<&Value> {
        self.claims.get(name)
    }
}
