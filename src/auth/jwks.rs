// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! JWKS (JSON Web Key Set) fetching and caching.
//!
//! ## Caching
//!
//! - Key sets are cached in memory per JWKS URL
//! - A cached set is reused until invalidated, or until a token names a key
//!   id the set does not contain; then the set is fetched once more
//! - A refresh builds a complete new set and swaps it in; concurrent
//!   refreshes of the same URL are allowed and the last one wins
//!
//! ## Usage
//!
//! Build one `JwksCache` in main.rs and share it through `AppState`.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use jsonwebtoken::jwk::{AlgorithmParameters, Jwk, KeyAlgorithm, PublicKeyUse};
use jsonwebtoken::{Algorithm, DecodingKey};
use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::{debug, instrument, warn};

use super::error::{AuthError, KeyFetchError};

/// A public key usable for signature verification.
#[derive(Clone)]
pub struct SigningKey {
    pub decoding_key: DecodingKey,
    /// Algorithm pinned by the JWK's `alg`, if it declared one.
    pub algorithm: Option<Algorithm>,
}

/// Snapshot of the keys published at one JWKS URL.
pub struct SigningKeySet {
    keys: HashMap<String, SigningKey>,
    fetched_at: DateTime<Utc>,
}

/// Raw JWKS document. Keys stay untyped so one unsupported entry does not
/// invalidate the whole set.
#[derive(Deserialize)]
struct JwksDocument {
    keys: Vec<serde_json::Value>,
}

impl SigningKeySet {
    /// Parse a JWKS document body.
    pub fn from_document(url: &str, body: &[u8]) -> Result<Self, KeyFetchError> {
        let document: JwksDocument =
            serde_json::from_slice(body).map_err(|e| KeyFetchError::Malformed {
                url: url.to_string(),
                message: e.to_string(),
            })?;

        let mut keys = HashMap::with_capacity(document.keys.len());
        for raw in document.keys {
            let jwk: Jwk = match serde_json::from_value(raw) {
                Ok(jwk) => jwk,
                Err(e) => {
                    warn!(url, error = %e, "Skipping unparseable JWK");
                    continue;
                }
            };
            let Some(kid) = jwk.common.key_id.clone() else {
                warn!(url, "Skipping JWK without kid");
                continue;
            };
            match jwk_to_signing_key(&jwk) {
                Ok(key) => {
                    keys.insert(kid, key);
                }
                Err(reason) => warn!(url, kid = %kid, reason, "Skipping unusable JWK"),
            }
        }

        Ok(Self {
            keys,
            fetched_at: Utc::now(),
        })
    }

    pub fn get(&self, kid: &str) -> Option<&SigningKey> {
        self.keys.get(kid)
    }

    pub fn contains(&self, kid: &str) -> bool {
        self.keys.contains_key(kid)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn fetched_at(&self) -> DateTime<Utc> {
        self.fetched_at
    }
}

/// JWKS cache shared by all verification requests.
pub struct JwksCache {
    client: reqwest::Client,
    sets: RwLock<HashMap<String, Arc<SigningKeySet>>>,
}

impl JwksCache {
    /// Create an empty cache whose fetches time out after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, KeyFetchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| KeyFetchError::Client(e.to_string()))?;
        Ok(Self {
            client,
            sets: RwLock::new(HashMap::new()),
        })
    }

    /// Resolve `kid` against the keys published at `url`.
    ///
    /// Uses the cached set when it has the key. Otherwise fetches the set
    /// exactly once and looks again before giving up.
    pub async fn key(&self, url: &str, kid: &str) -> Result<SigningKey, AuthError> {
        if let Some(set) = self.cached(url).await {
            if let Some(key) = set.get(kid) {
                debug!(kid, "JWKS cache hit");
                return Ok(key.clone());
            }
            debug!(kid, "Key id not in cached JWKS, refetching");
        }

        let set = self.refresh(url).await?;
        set.get(kid).cloned().ok_or_else(|| {
            warn!(kid, url, "Key id not found in JWKS after refresh");
            AuthError::UnknownKey(kid.to_string())
        })
    }

    /// The cached set for `url`, if any.
    pub async fn cached(&self, url: &str) -> Option<Arc<SigningKeySet>> {
        self.sets.read().await.get(url).cloned()
    }

    /// Check if a key set is cached for `url`.
    pub async fn is_cached(&self, url: &str) -> bool {
        self.sets.read().await.contains_key(url)
    }

    /// Fetch the set at `url` and replace whatever is cached.
    pub async fn refresh(&self, url: &str) -> Result<Arc<SigningKeySet>, KeyFetchError> {
        let set = Arc::new(self.fetch(url).await?);
        debug!(url, keys = set.len(), fetched_at = %set.fetched_at(), "Replacing cached JWKS");
        self.sets
            .write()
            .await
            .insert(url.to_string(), Arc::clone(&set));
        Ok(set)
    }

    /// Drop the cached set for `url`.
    pub async fn invalidate(&self, url: &str) {
        self.sets.write().await.remove(url);
    }

    pub async fn invalidate_all(&self) {
        self.sets.write().await.clear();
    }

    #[instrument(skip(self))]
    async fn fetch(&self, url: &str) -> Result<SigningKeySet, KeyFetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| KeyFetchError::Transport {
                url: url.to_string(),
                message: e.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(KeyFetchError::Status {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| KeyFetchError::Transport {
                url: url.to_string(),
                message: e.to_string(),
            })?;

        SigningKeySet::from_document(url, &body)
    }
}

/// Convert a JWK to a signing key.
///
/// Symmetric keys and encryption keys are refused.
fn jwk_to_signing_key(jwk: &Jwk) -> Result<SigningKey, &'static str> {
    if matches!(jwk.common.public_key_use, Some(PublicKeyUse::Encryption)) {
        return Err("key is published for encryption");
    }

    let algorithm = match jwk.common.key_algorithm {
        None => None,
        Some(alg) => Some(
            signing_algorithm(alg).ok_or("key algorithm is not an asymmetric signing algorithm")?,
        ),
    };

    let decoding_key = match &jwk.algorithm {
        AlgorithmParameters::RSA(rsa) => DecodingKey::from_rsa_components(&rsa.n, &rsa.e)
            .map_err(|_| "invalid RSA components")?,
        AlgorithmParameters::EllipticCurve(ec) => DecodingKey::from_ec_components(&ec.x, &ec.y)
            .map_err(|_| "invalid EC components")?,
        AlgorithmParameters::OctetKeyPair(okp) => {
            DecodingKey::from_ed_components(&okp.x).map_err(|_| "invalid OKP components")?
        }
        _ => return Err("symmetric keys are not accepted"),
    };

    Ok(SigningKey {
        decoding_key,
        algorithm,
    })
}

fn signing_algorithm(alg: KeyAlgorithm) -> Option<Algorithm> {
    match alg {
        KeyAlgorithm::RS256 => Some(Algorithm::RS256),
        KeyAlgorithm::RS384 => Some(Algorithm::RS384),
        KeyAlgorithm::RS512 => Some(Algorithm::RS512),
        KeyAlgorithm::PS256 => Some(Algorithm::PS256),
        KeyAlgorithm::PS384 => Some(Algorithm::PS384),
        KeyAlgorithm::PS512 => Some(Algorithm::PS512),
        KeyAlgorithm::ES256 => Some(Algorithm::ES256),
        KeyAlgorithm::ES384 => Some(Algorithm::ES384),
        KeyAlgorithm::EdDSA => Some(Algorithm::EdDSA),
        _ => None,
    }
}
