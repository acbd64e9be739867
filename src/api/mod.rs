// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    models::{AuthenticationResult, Credentials},
    state::AppState,
};

pub mod accounts;
pub mod health;
pub mod verify;

pub fn router(state: AppState) -> Router {
    let routes = Router::new()
        .route("/", get(health::root))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .route("/signup", post(accounts::signup))
        .route("/signin", post(accounts::signin))
        .route("/verify", get(verify::verify))
        .with_state(state);

    Router::new()
        .merge(routes)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::root,
        health::liveness,
        health::readiness,
        accounts::signup,
        accounts::signin,
        verify::verify
    ),
    components(
        schemas(
            Credentials,
            AuthenticationResult,
            health::HealthResponse,
            health::ReadyResponse,
            health::HealthChecks
        )
    ),
    tags(
        (name = "Health", description = "Liveness and readiness"),
        (name = "Accounts", description = "User registration and password sign-in"),
        (name = "Tokens", description = "Bearer token verification")
    )
)]
struct ApiDoc;
