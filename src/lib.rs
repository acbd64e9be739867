// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Cognito Gateway - HTTP front door for an Amazon Cognito user pool
//!
//! Registers users, exchanges passwords for tokens and verifies bearer
//! tokens against the pool's published signing keys.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `auth` - Bearer token verification (JWKS)
//! - `providers` - Identity provider clients (Cognito)
//! - `config` - Environment configuration

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod providers;
pub mod state;
pub mod telemetry;
