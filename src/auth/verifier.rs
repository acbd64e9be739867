// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Bearer token verification against the user pool JWKS.
//!
//! A token moves through these steps and is rejected at the first failure:
//!
//! 1. **Header** - three base64url segments; `alg` must be an asymmetric
//!    signing algorithm (never `none` or HMAC) and `kid` must be present
//! 2. **Key** - `kid` is resolved through [`JwksCache`], with one refetch
//!    on a miss
//! 3. **Signature** - checked with the resolved key and the declared `alg`
//! 4. **Claims** - `exp` strictly in the future, `nbf` (if present) reached,
//!    issuer and audience/client id matched when configured, a username
//!    claim present
//!
//! The result is a [`VerifiedIdentity`].

use std::str::FromStr;
use std::sync::Arc;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::Utc;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, Algorithm, Validation};
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, instrument};

use super::jwks::JwksCache;
use super::{AuthError, VerifiedIdentity};
use crate::config::Config;

/// Algorithms a token may be signed with.
pub const ALLOWED_ALGORITHMS: &[Algorithm] = &[
    Algorithm::RS256,
    Algorithm::RS384,
    Algorithm::RS512,
    Algorithm::PS256,
    Algorithm::PS384,
    Algorithm::PS512,
    Algorithm::ES256,
    Algorithm::ES384,
    Algorithm::EdDSA,
];

#[derive(Deserialize)]
struct RawHeader {
    alg: String,
    #[serde(default)]
    kid: Option<String>,
}

/// The parts of a token header needed to pick a key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenHeader {
    pub algorithm: Algorithm,
    pub kid: String,
}

/// Decode and vet the header segment without touching any key.
pub fn parse_header(token: &str) -> Result<TokenHeader, AuthError> {
    let mut segments = token.split('.');
    let (Some(header), Some(payload), Some(_signature), None) = (
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
    ) else {
        return Err(AuthError::MalformedToken("expected three dot-separated segments"));
    };
    if header.is_empty() || payload.is_empty() {
        return Err(AuthError::MalformedToken("empty header or payload segment"));
    }

    let bytes = URL_SAFE_NO_PAD
        .decode(header)
        .map_err(|_| AuthError::MalformedToken("header is not base64url"))?;
    let raw: RawHeader = serde_json::from_slice(&bytes)
        .map_err(|_| AuthError::MalformedToken("header is not a JSON object with alg"))?;

    let algorithm = Algorithm::from_str(&raw.alg)
        .ok()
        .filter(|alg| ALLOWED_ALGORITHMS.contains(alg))
        .ok_or_else(|| AuthError::DisallowedAlgorithm(raw.alg.clone()))?;

    let kid = raw
        .kid
        .filter(|kid| !kid.is_empty())
        .ok_or(AuthError::MalformedToken("missing kid"))?;

    Ok(TokenHeader { algorithm, kid })
}

/// What a token must match to be accepted.
#[derive(Debug, Clone)]
pub struct VerifierSettings {
    pub jwks_url: String,
    /// Expected `iss`; unchecked when `None`.
    pub issuer: Option<String>,
    /// Expected `aud` or `client_id`; unchecked when `None`.
    pub client_id: Option<String>,
    /// Seconds of clock skew tolerated on `exp` and `nbf`.
    pub leeway: u64,
}

impl VerifierSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            jwks_url: config.jwks_url(),
            issuer: Some(config.issuer()),
            client_id: Some(config.app_client_id.clone()),
            leeway: config.clock_skew_seconds,
        }
    }
}

/// Token verifier bound to one JWKS URL.
pub struct TokenVerifier {
    keys: Arc<JwksCache>,
    settings: VerifierSettings,
}

impl TokenVerifier {
    pub fn new(keys: Arc<JwksCache>, settings: VerifierSettings) -> Self {
        Self { keys, settings }
    }

    pub fn jwks_url(&self) -> &str {
        &self.settings.jwks_url
    }

    pub fn key_source(&self) -> &JwksCache {
        &self.keys
    }

    /// Verify `token` against the configured issuer and client id.
    pub async fn verify(&self, token: &str) -> Result<VerifiedIdentity, AuthError> {
        self.verify_with(
            token,
            self.settings.issuer.as_deref(),
            self.settings.client_id.as_deref(),
        )
        .await
    }

    /// Verify `token` against explicit expectations.
    #[instrument(skip_all)]
    pub async fn verify_with(
        &self,
        token: &str,
        expected_issuer: Option<&str>,
        expected_client_id: Option<&str>,
    ) -> Result<VerifiedIdentity, AuthError> {
        let header = parse_header(token)?;

        let key = self.keys.key(&self.settings.jwks_url, &header.kid).await?;
        if key.algorithm.is_some_and(|pinned| pinned != header.algorithm) {
            debug!(kid = %header.kid, "Token alg does not match the algorithm pinned by its JWK");
            return Err(AuthError::BadSignature);
        }

        let mut validation = Validation::new(header.algorithm);
        validation.leeway = self.settings.leeway;
        validation.validate_exp = true;
        validation.validate_nbf = true;
        // Cognito access tokens carry `client_id` instead of `aud`; checked below.
        validation.validate_aud = false;
        match expected_issuer {
            Some(issuer) => {
                validation.set_issuer(&[issuer]);
                validation.set_required_spec_claims(&["exp", "iss"]);
            }
            None => validation.set_required_spec_claims(&["exp"]),
        }

        let claims = decode::<Map<String, Value>>(token, &key.decoding_key, &validation)
            .map_err(map_jwt_error)?
            .claims;

        ensure_not_expired(&claims, Utc::now().timestamp(), self.settings.leeway)?;
        if let Some(client_id) = expected_client_id {
            if !audience_matches(&claims, client_id) {
                return Err(AuthError::AudienceMismatch);
            }
        }

        VerifiedIdentity::from_claims(claims)
    }
}

/// `exp` must be strictly after `now` (minus leeway).
fn ensure_not_expired(claims: &Map<String, Value>, now: i64, leeway: u64) -> Result<(), AuthError> {
    let exp = claims
        .get("exp")
        .and_then(Value::as_i64)
        .ok_or(AuthError::MalformedToken("exp is missing or not an integer"))?;
    let leeway = i64::try_from(leeway).unwrap_or(i64::MAX);
    if exp <= now.saturating_sub(leeway) {
        return Err(AuthError::Expired);
    }
    Ok(())
}

/// Accept the client id in `aud` (string or array) or in `client_id`.
fn audience_matches(claims: &Map<String, Value>, client_id: &str) -> bool {
    let in_aud = match claims.get("aud") {
        Some(Value::String(aud)) => aud == client_id,
        Some(Value::Array(auds)) => auds.iter().any(|aud| aud.as_str() == Some(client_id)),
        _ => false,
    };
    in_aud || claims.get("client_id").and_then(Value::as_str) == Some(client_id)
}

fn map_jwt_error(e: jsonwebtoken::errors::Error) -> AuthError {
    match e.kind() {
        ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => AuthError::BadSignature,
        ErrorKind::ExpiredSignature => AuthError::Expired,
        ErrorKind::ImmatureSignature => AuthError::NotYetValid,
        ErrorKind::InvalidIssuer => AuthError::IssuerMismatch,
        ErrorKind::InvalidAudience => AuthError::AudienceMismatch,
        ErrorKind::MissingRequiredClaim(claim) if claim == "iss" => AuthError::IssuerMismatch,
        ErrorKind::MissingRequiredClaim(_) => AuthError::MalformedToken("missing required claim"),
        _ => AuthError::MalformedToken("token could not be decoded"),
    }
}
