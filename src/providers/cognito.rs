// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Amazon Cognito user pool integration.
//!
//! Uses the trusted-server pattern: the gateway holds AWS credentials and
//! calls the admin APIs (`AdminConfirmSignUp`, `AdminInitiateAuth`) on the
//! user's behalf. Credentials come from the default AWS provider chain.

use async_trait::async_trait;
use aws_config::{timeout::TimeoutConfig, BehaviorVersion};
use aws_sdk_cognitoidentityprovider::{
    config::Region,
    error::{DisplayErrorContext, ProvideErrorMetadata, SdkError},
    types::AuthFlowType,
    Client,
};
use tracing::{debug, instrument};

use super::{IdentityProvider, ProviderError};
use crate::config::Config;
use crate::models::{AuthenticationResult, Credentials};

#[derive(Debug, Clone)]
pub struct CognitoClient {
    app_client_id: String,
    user_pool_id: String,
    client: Client,
}

impl CognitoClient {
    pub fn new(
        client: Client,
        app_client_id: impl Into<String>,
        user_pool_id: impl Into<String>,
    ) -> Self {
        Self {
            app_client_id: app_client_id.into(),
            user_pool_id: user_pool_id.into(),
            client,
        }
    }

    /// Build a client for the configured region with a bounded operation timeout.
    pub async fn from_config(config: &Config) -> Self {
        let sdk_config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .timeout_config(
                TimeoutConfig::builder()
                    .operation_timeout(config.upstream_timeout)
                    .build(),
            )
            .load()
            .await;

        Self::new(
            Client::new(&sdk_config),
            config.app_client_id.clone(),
            config.user_pool_id.clone(),
        )
    }
}

#[async_trait]
impl IdentityProvider for CognitoClient {
    #[instrument(skip(self, credentials), fields(username = %credentials.username))]
    async fn sign_up(&self, credentials: &Credentials) -> Result<(), ProviderError> {
        let output = self
            .client
            .sign_up()
            .client_id(&self.app_client_id)
            .username(&credentials.username)
            .password(&credentials.password)
            .send()
            .await
            .map_err(|e| classify("SignUp", e))?;

        debug!(
            user_sub = %output.user_sub(),
            confirmed = output.user_confirmed(),
            "Cognito SignUp succeeded"
        );
        Ok(())
    }

    #[instrument(skip(self))]
    async fn confirm_sign_up(&self, username: &str) -> Result<(), ProviderError> {
        self.client
            .admin_confirm_sign_up()
            .user_pool_id(&self.user_pool_id)
            .username(username)
            .send()
            .await
            .map_err(|e| classify("AdminConfirmSignUp", e))?;
        Ok(())
    }

    #[instrument(skip(self, credentials), fields(username = %credentials.username))]
    async fn authenticate(
        &self,
        credentials: &Credentials,
    ) -> Result<AuthenticationResult, ProviderError> {
        let output = self
            .client
            .admin_initiate_auth()
            .user_pool_id(&self.user_pool_id)
            .client_id(&self.app_client_id)
            .auth_flow(AuthFlowType::AdminUserPasswordAuth)
            .auth_parameters("USERNAME", &credentials.username)
            .auth_parameters("PASSWORD", &credentials.password)
            .send()
            .await
            .map_err(|e| classify("AdminInitiateAuth", e))?;

        let Some(result) = output.authentication_result() else {
            // MFA, NEW_PASSWORD_REQUIRED and friends: no tokens yet.
            let challenge = output
                .challenge_name()
                .map(|c| c.as_str().to_string())
                .unwrap_or_else(|| "unknown".to_string());
            return Err(ProviderError::from_code(
                "AdminInitiateAuth",
                Some("ChallengeRequired"),
                format!("authentication requires challenge {challenge}"),
            ));
        };

        let access_token = result
            .access_token()
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ProviderError::Unavailable {
                operation: "AdminInitiateAuth",
                message: "response did not include an access token".to_string(),
            })?
            .to_string();

        Ok(AuthenticationResult {
            access_token,
            expires_in: result.expires_in(),
            id_token: result.id_token().map(str::to_string),
            refresh_token: result.refresh_token().map(str::to_string),
            token_type: result.token_type().map(str::to_string),
        })
    }
}

/// Map an SDK failure onto the gateway's error model.
///
/// Service errors keep Cognito's code and message; everything else
/// (dispatch failure, timeout, unparseable response) is an outage.
fn classify<E, R>(operation: &'static str, err: SdkError<E, R>) -> ProviderError
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
    R: std::fmt::Debug,
{
    match &err {
        SdkError::ServiceError(service_err) => {
            let inner = service_err.err();
            ProviderError::from_code(
                operation,
                inner.code(),
                inner.message().unwrap_or("no message from identity provider"),
            )
        }
        _ => ProviderError::Unavailable {
            operation,
            message: DisplayErrorContext(&err).to_string(),
        },
    }
}
