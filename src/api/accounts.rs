// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use tracing::info;

use crate::{
    error::ApiError,
    models::{AuthenticationResult, Credentials},
    providers::{self, Registration},
    state::AppState,
};

fn credentials(body: Result<Json<Credentials>, JsonRejection>) -> Result<Credentials, ApiError> {
    let Json(credentials) = body?;
    credentials.validate().map_err(ApiError::bad_request)?;
    Ok(credentials)
}

/// Register a new user, confirming it when auto-confirm is enabled.
#[utoipa::path(
    post,
    path = "/signup",
    request_body = Credentials,
    tag = "Accounts",
    responses(
        (status = 200, description = "User registered (body `signup!`)", body = String),
        (status = 400, description = "Invalid body or rejected by the identity provider"),
        (status = 500, description = "Identity provider unavailable or confirmation failed")
    )
)]
pub async fn signup(
    State(state): State<AppState>,
    body: Result<Json<Credentials>, JsonRejection>,
) -> Result<&'static str, ApiError> {
    let credentials = credentials(body)?;
    let outcome =
        providers::register(state.provider.as_ref(), &credentials, state.auto_confirm).await?;
    info!(
        username = %credentials.username,
        confirmed = outcome == Registration::Confirmed,
        "Signup completed"
    );
    Ok("signup!")
}

/// Authenticate with username and password.
#[utoipa::path(
    post,
    path = "/signin",
    request_body = Credentials,
    tag = "Accounts",
    responses(
        (
            status = 200,
            description = "Tokens issued by the identity provider",
            body = AuthenticationResult
        ),
        (status = 400, description = "Invalid body or credentials"),
        (status = 500, description = "Identity provider unavailable")
    )
)]
pub async fn signin(
    State(state): State<AppState>,
    body: Result<Json<Credentials>, JsonRejection>,
) -> Result<Json<AuthenticationResult>, ApiError> {
    let credentials = credentials(body)?;
    let result = state.provider.authenticate(&credentials).await?;
    info!(username = %credentials.username, "Signin succeeded");
    Ok(Json(result))
}
