// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! In-memory identity provider.
//!
//! Mimics the Cognito error codes closely enough for the HTTP layer to be
//! exercised without AWS. Development and tests only.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{IdentityProvider, ProviderError};
use crate::models::{AuthenticationResult, Credentials};

const TOKEN_LIFETIME_SECS: i32 = 3600;

struct UserRecord {
    password: String,
    confirmed: bool,
}

#[derive(Default)]
pub struct InMemoryProvider {
    users: RwLock<HashMap<String, UserRecord>>,
    fail_confirmations: bool,
}

impl InMemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every `confirm_sign_up` call fail with a provider fault.
    pub fn failing_confirmations(mut self) -> Self {
        self.fail_confirmations = true;
        self
    }

    /// `None` when the user does not exist.
    pub async fn is_confirmed(&self, username: &str) -> Option<bool> {
        self.users.read().await.get(username).map(|u| u.confirmed)
    }
}

#[async_trait]
impl IdentityProvider for InMemoryProvider {
    async fn sign_up(&self, credentials: &Credentials) -> Result<(), ProviderError> {
        let mut users = self.users.write().await;
        if users.contains_key(&credentials.username) {
            return Err(ProviderError::from_code(
                "SignUp",
                Some("UsernameExistsException"),
                "User already exists",
            ));
        }
        users.insert(
            credentials.username.clone(),
            UserRecord {
                password: credentials.password.clone(),
                confirmed: false,
            },
        );
        Ok(())
    }

    async fn confirm_sign_up(&self, username: &str) -> Result<(), ProviderError> {
        if self.fail_confirmations {
            return Err(ProviderError::from_code(
                "AdminConfirmSignUp",
                Some("InternalErrorException"),
                "confirmation unavailable",
            ));
        }
        let mut users = self.users.write().await;
        let user = users.get_mut(username).ok_or_else(|| {
            ProviderError::from_code(
                "AdminConfirmSignUp",
                Some("UserNotFoundException"),
                "User does not exist.",
            )
        })?;
        user.confirmed = true;
        Ok(())
    }

    async fn authenticate(
        &self,
        credentials: &Credentials,
    ) -> Result<AuthenticationResult, ProviderError> {
        let users = self.users.read().await;
        let user = users
            .get(&credentials.username)
            .filter(|u| u.password == credentials.password)
            .ok_or_else(|| {
                ProviderError::from_code(
                    "AdminInitiateAuth",
                    Some("NotAuthorizedException"),
                    "Incorrect username or password.",
                )
            })?;

        if !user.confirmed {
            return Err(ProviderError::from_code(
                "AdminInitiateAuth",
                Some("UserNotConfirmedException"),
                "User is not confirmed.",
            ));
        }

        Ok(AuthenticationResult {
            access_token: format!("access-{}", Uuid::new_v4()),
            expires_in: TOKEN_LIFETIME_SECS,
            id_token: Some(format!("id-{}", Uuid::new_v4())),
            refresh_token: Some(format!("refresh-{}", Uuid::new_v4())),
            token_type: Some("Bearer".to_string()),
        })
    }
}
