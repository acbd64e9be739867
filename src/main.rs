// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use cognito_gateway::{
    api::router,
    auth::{JwksCache, TokenVerifier, VerifierSettings},
    config::Config,
    providers,
    state::AppState,
    telemetry,
};
use tokio::signal;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env()?;
    telemetry::init_tracing(config.log_format);

    info!(
        region = %config.region,
        user_pool_id = %config.user_pool_id,
        auto_confirm = config.auto_confirm,
        identity_provider = ?config.identity_provider,
        jwks_url = %config.jwks_url(),
        "Configuration loaded"
    );

    let provider = providers::from_config(&config).await?;
    let keys = Arc::new(JwksCache::new(config.upstream_timeout)?);
    let verifier = TokenVerifier::new(keys, VerifierSettings::from_config(&config));

    let state = AppState::new(provider, Arc::new(verifier))
        .with_auto_confirm(config.auto_confirm);
    let app = router(state);

    let addr = config.bind_address()?;
    let listener = tokio::net::TcpListener::bind(addr).await.map_err(|e| {
        error!(%addr, "Failed to bind: {e}");
        e
    })?;

    info!("Cognito gateway listening on http://{addr} (docs at /docs)");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shutdown complete");
    Ok(())
}

/// Resolves on Ctrl-C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl-C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, draining connections");
}
