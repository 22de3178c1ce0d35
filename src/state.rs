// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::auth::{ApiKeyStore, AuthGate};
use crate::config::RuntimeConfig;
use crate::rate_limit::RateLimiter;
use crate::store::ChatStore;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<RuntimeConfig>,
    pub gate: Arc<AuthGate>,
    pub store: Arc<RwLock<ChatStore>>,
    pub rate_limiter: Arc<RateLimiter>,
}

impl AppState {
    /// State with the standard bearer-then-API-key gate over `key_store`.
    pub fn new(config: Arc<RuntimeConfig>, key_store: Arc<dyn ApiKeyStore>) -> Self {
        let gate = AuthGate::bearer_then_api_key(&config, key_store);
        Self::with_gate(config, gate)
    }

    pub fn with_gate(config: Arc<RuntimeConfig>, gate: AuthGate) -> Self {
        Self {
            rate_limiter: Arc::new(RateLimiter::from_config(&config)),
            gate: Arc::new(gate),
            store: Arc::new(RwLock::new(ChatStore::new())),
            config,
        }
    }
}
