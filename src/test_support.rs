// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Shared fixtures for unit tests.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;

use crate::auth::{encode_token, ApiKeyRecord, InMemoryApiKeyStore, TokenClaims};
use crate::config::{ConfigResolver, EnvFileLoader, EnvFileStatus, RuntimeConfig};
use crate::state::AppState;

pub(crate) const TEST_SECRET: &str = "test_jwt_secret";

/// Seeded key owned by `key_owner` in `org_key`.
pub(crate) const TEST_API_KEY: &str = "clk_test_scoped_key";

/// Seeded key with no organization.
pub(crate) const UNSCOPED_API_KEY: &str = "clk_test_unscoped_key";

struct NoopLoader;

impl EnvFileLoader for NoopLoader {
    fn load(&self) -> EnvFileStatus {
        EnvFileStatus::NotFound
    }
}

pub(crate) fn test_env() -> HashMap<String, String> {
    [
        ("NODE_ENV", "test"),
        ("JWT_SECRET", TEST_SECRET),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

pub(crate) fn test_config() -> RuntimeConfig {
    config_with(&[])
}

pub(crate) fn config_with(overrides: &[(&str, &str)]) -> RuntimeConfig {
    let mut env = test_env();
    for (key, value) in overrides {
        env.insert(key.to_string(), value.to_string());
    }
    ConfigResolver::with_loader(NoopLoader)
        .resolve(&env)
        .expect("test config resolves")
}

pub(crate) async fn test_state() -> AppState {
    state_for(test_config()).await
}

pub(crate) async fn state_for(config: RuntimeConfig) -> AppState {
    let keys = InMemoryApiKeyStore::new();
    keys.insert(
        TEST_API_KEY,
        ApiKeyRecord {
            key_id: "key_scoped".into(),
            owner_id: "key_owner".into(),
            organization_id: Some("org_key".into()),
        },
    )
    .await;
    keys.insert(
        UNSCOPED_API_KEY,
        ApiKeyRecord {
            key_id: "key_unscoped".into(),
            owner_id: "lonely_owner".into(),
            organization_id: None,
        },
    )
    .await;

    AppState::new(Arc::new(config), Arc::new(keys))
}

fn token_expiring_at(user_id: &str, organization_id: Option<&str>, exp: i64) -> String {
    let claims = TokenClaims::new(user_id, organization_id.map(str::to_string), exp);
    encode_token(TEST_SECRET, &claims).expect("token encodes")
}

pub(crate) fn bearer_token(user_id: &str, organization_id: Option<&str>) -> String {
    token_expiring_at(user_id, organization_id, Utc::now().timestamp() + 3600)
}

/// Expired well beyond the verifier's leeway.
pub(crate) fn expired_bearer_token(user_id: &str, organization_id: Option<&str>) -> String {
    token_expiring_at(user_id, organization_id, Utc::now().timestamp() - 3600)
}
