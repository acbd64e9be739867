// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::http::StatusCode;
use tracing::info;

use crate::auth::Auth;

/// Verify the bearer token in the `Authorization` header.
///
/// Empty 200 on acceptance. Every rejection gets the same generic 400 body.
#[utoipa::path(
    get,
    path = "/verify",
    tag = "Tokens",
    responses(
        (status = 200, description = "Token is valid"),
        (status = 400, description = "Missing or malformed header, or token rejected"),
        (status = 500, description = "Signing keys could not be fetched")
    )
)]
pub async fn verify(Auth(identity): Auth) -> StatusCode {
    info!(
        username = %identity.username,
        expires_at = identity.expires_at(),
        "Token verified"
    );
    StatusCode::OK
}
