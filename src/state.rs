// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::auth::TokenVerifier;
use crate::providers::IdentityProvider;

#[derive(Clone)]
pub struct AppState {
    pub provider: Arc<dyn IdentityProvider>,
    pub verifier: Arc<TokenVerifier>,
    /// Confirm new users immediately after sign-up.
    pub auto_confirm: bool,
}

impl AppState {
    pub fn new(provider: Arc<dyn IdentityProvider>, verifier: Arc<TokenVerifier>) -> Self {
        Self {
            provider,
            verifier,
            auto_confirm: true,
        }
    }

    pub fn with_auto_confirm(mut self, auto_confirm: bool) -> Self {
        self.auto_confirm = auto_confirm;
        self
    }
}
