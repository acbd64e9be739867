// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Verification of Cognito-issued bearer tokens.
//!
//! ## Flow
//!
//! 1. Client sends `Authorization: Bearer <token>` (ID or access token)
//! 2. Gateway:
//!    - Reads the token header, refusing `none` and HMAC algorithms
//!    - Resolves `kid` against the user pool JWKS (cached, refetched once on a miss)
//!    - Verifies signature, expiry, not-before, issuer and audience/client id
//!    - Extracts the username (`cognito:username`, `username`, then `sub`)
//!
//! ## Security
//!
//! - JWKS documents are fetched over HTTPS from the pool's well-known URL
//! - Rejection reasons are logged, never returned to the caller
//! - Key fetch failures surface as server errors, not as token rejections

pub mod claims;
pub mod error;
pub mod extractor;
pub mod jwks;
pub mod verifier;

#[cfg(test)]
pub(crate) mod test_support;

pub use claims::VerifiedIdentity;
pub use error::{AuthError, KeyFetchError};
pub use extractor::{Auth, BearerToken};
pub use jwks::JwksCache;
pub use verifier::{TokenVerifier, VerifierSettings};
