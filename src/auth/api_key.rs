// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! API key verification.
//!
//! Keys arrive in the `X-API-Key` header and are resolved through an
//! [`ApiKeyStore`]. Stores only ever see and keep SHA-256 digests of keys.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::http::HeaderMap;
use sha2::{Digest, Sha256};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{AuthError, KeyStoreError, Principal};
use crate::config::{ConfigSource, RuntimeConfig};

/// Header carrying the API key.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Prefix of generated keys.
pub const API_KEY_PREFIX: &str = "clk_";

pub const SEED_API_KEY_ENV: &str = "SEED_API_KEY";
pub const SEED_API_KEY_OWNER_ENV: &str = "SEED_API_KEY_OWNER";
pub const SEED_ORGANIZATION_ID_ENV: &str = "SEED_ORGANIZATION_ID";

const DEFAULT_SEED_OWNER: &str = "seed-owner";
const DEFAULT_SEED_ORGANIZATION: &str = "seed-organization";

/// Default upper bound for a single key store lookup.
const DEFAULT_LOOKUP_TIMEOUT: Duration = Duration::from_secs(5);

/// What a key store knows about a key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiKeyRecord {
    pub key_id: String,
    pub owner_id: String,
    pub organization_id: Option<String>,
}

impl From<ApiKeyRecord> for Principal {
    fn from(record: ApiKeyRecord) -> Self {
        Principal::ApiKey {
            key_id: record.key_id,
            owner_id: record.owner_id,
            organization_id: record.organization_id,
        }
    }
}

/// Persistence-backed key lookup.
#[async_trait]
pub trait ApiKeyStore: Send + Sync {
    /// Look up a raw key. `Ok(None)` means the key is unknown.
    async fn lookup_api_key(&self, key: &str) -> Result<Option<ApiKeyRecord>, KeyStoreError>;
}

/// Hash an API key for storage/lookup.
pub fn hash_api_key(key: &str) -> String {
    hex::encode(Sha256::digest(key.as_bytes()))
}

/// Freshly generated API key. The full key is only available here.
#[derive(Debug)]
pub struct GeneratedApiKey {
    /// Full API key (`clk_<32 hex>`)
    pub key: String,
    /// SHA-256 hex digest used as the store key
    pub key_hash: String,
    /// Prefix for display (e.g. `clk_1a2b3c4d...`)
    pub key_prefix: String,
}

/// Generate a new random API key.
pub fn generate_api_key() -> GeneratedApiKey {
    let random_hex = Uuid::new_v4().simple().to_string();
    let key = format!("{API_KEY_PREFIX}{random_hex}");
    let key_hash = hash_api_key(&key);
    let key_prefix = format!("{API_KEY_PREFIX}{}...", &random_hex[..8]);

    GeneratedApiKey {
        key,
        key_hash,
        key_prefix,
    }
}

/// Key store held in process memory.
#[derive(Default)]
pub struct InMemoryApiKeyStore {
    keys: RwLock<HashMap<String, ApiKeyRecord>>,
}

impl InMemoryApiKeyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an existing raw key.
    pub async fn insert(&self, key: &str, record: ApiKeyRecord) {
        self.keys.write().await.insert(hash_api_key(key), record);
    }

    /// Generate and register a key for `owner_id` in `organization_id`.
    pub async fn issue(
        &self,
        owner_id: impl Into<String>,
        organization_id: Option<String>,
    ) -> (GeneratedApiKey, ApiKeyRecord) {
        let generated = generate_api_key();
        let record = ApiKeyRecord {
            key_id: Uuid::new_v4().to_string(),
            owner_id: owner_id.into(),
            organization_id,
        };
        self.keys
            .write()
            .await
            .insert(generated.key_hash.clone(), record.clone());
        (generated, record)
    }
}

#[async_trait]
impl ApiKeyStore for InMemoryApiKeyStore {
    async fn lookup_api_key(&self, key: &str) -> Result<Option<ApiKeyRecord>, KeyStoreError> {
        Ok(self.keys.read().await.get(&hash_api_key(key)).cloned())
    }
}

/// How the startup key store was seeded.
#[derive(Debug)]
pub enum SeededKey {
    /// `SEED_API_KEY` was registered as given.
    Configured(ApiKeyRecord),
    /// No key was configured in development, so one was generated.
    Generated {
        key: GeneratedApiKey,
        record: ApiKeyRecord,
    },
    /// Nothing was seeded.
    Skipped,
}

/// Seed `store` from `SEED_API_KEY`, `SEED_API_KEY_OWNER` and
/// `SEED_ORGANIZATION_ID`.
///
/// Without `SEED_API_KEY`, development instances get a freshly generated key
/// (scoped to `SEED_ORGANIZATION_ID`, or `seed-organization`) so the API can
/// be exercised without a token issuer. Other environments seed nothing.
pub async fn seed_api_key<S>(
    store: &InMemoryApiKeyStore,
    source: &S,
    config: &RuntimeConfig,
) -> SeededKey
where
    S: ConfigSource + ?Sized,
{
    let read = |key: &str| source.get(key).filter(|value| !value.is_empty());
    let owner_id = read(SEED_API_KEY_OWNER_ENV).unwrap_or_else(|| DEFAULT_SEED_OWNER.to_string());

    if let Some(key) = read(SEED_API_KEY_ENV) {
        let record = ApiKeyRecord {
            key_id: "seed".to_string(),
            owner_id,
            organization_id: read(SEED_ORGANIZATION_ID_ENV),
        };
        store.insert(&key, record.clone()).await;
        return SeededKey::Configured(record);
    }

    if !config.is_development() {
        return SeededKey::Skipped;
    }

    let organization_id =
        read(SEED_ORGANIZATION_ID_ENV).unwrap_or_else(|| DEFAULT_SEED_ORGANIZATION.to_string());
    let (key, record) = store.issue(owner_id, Some(organization_id)).await;
    SeededKey::Generated { key, record }
}

/// Verifies the `X-API-Key` header through a key store.
#[derive(Clone)]
pub struct ApiKeyVerifier {
    store: Arc<dyn ApiKeyStore>,
    lookup_timeout: Duration,
}

impl ApiKeyVerifier {
    pub fn new(store: Arc<dyn ApiKeyStore>) -> Self {
        Self {
            store,
            lookup_timeout: DEFAULT_LOOKUP_TIMEOUT,
        }
    }

    pub fn with_lookup_timeout(mut self, timeout: Duration) -> Self {
        self.lookup_timeout = timeout;
        self
    }

    /// Authenticate the request headers.
    ///
    /// A missing, unreadable or unknown key is `Invalid`, as is any store
    /// failure. Lookups are not retried.
    pub async fn verify_headers(&self, headers: &HeaderMap) -> Result<Principal, AuthError> {
        let key = headers
            .get(API_KEY_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or(AuthError::Invalid)?;

        let lookup = tokio::time::timeout(self.lookup_timeout, self.store.lookup_api_key(key))
            .await
            .unwrap_or(Err(KeyStoreError::Timeout));

        match lookup {
            Ok(Some(record)) => Ok(record.into()),
            Ok(None) => {
                tracing::debug!("Unknown API key");
                Err(AuthError::Invalid)
            }
            Err(e) => {
                tracing::warn!(error = %e, "API key lookup failed");
                Err(AuthError::Invalid)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with_key(key: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(API_KEY_HEADER, HeaderValue::from_str(key).unwrap());
        headers
    }

    fn record() -> ApiKeyRecord {
        ApiKeyRecord {
            key_id: "key_1".into(),
            owner_id: "owner_1".into(),
            organization_id: Some("org_1".into()),
        }
    }

    struct FailingStore;

    #[async_trait]
    impl ApiKeyStore for FailingStore {
        async fn lookup_api_key(&self, _key: &str) -> Result<Option<ApiKeyRecord>, KeyStoreError> {
            Err(KeyStoreError::Unavailable("connection refused".into()))
        }
    }

    struct StalledStore;

    #[async_trait]
    impl ApiKeyStore for StalledStore {
        async fn lookup_api_key(&self, _key: &str) -> Result<Option<ApiKeyRecord>, KeyStoreError> {
            std::future::pending().await
        }
    }

    #[test]
    fn generated_keys_are_prefixed_and_hashed() {
        let generated = generate_api_key();
        assert!(generated.key.starts_with(API_KEY_PREFIX));
        assert_eq!(generated.key.len(), API_KEY_PREFIX.len() + 32);
        assert_eq!(generated.key_hash, hash_api_key(&generated.key));
        assert!(generated.key_prefix.ends_with("..."));
        assert_ne!(generate_api_key().key, generated.key);
    }

    #[tokio::test]
    async fn known_key_yields_api_key_principal() {
        let store = InMemoryApiKeyStore::new();
        store.insert("secret-key", record()).await;
        let verifier = ApiKeyVerifier::new(Arc::new(store));

        let principal = verifier
            .verify_headers(&headers_with_key("secret-key"))
            .await
            .unwrap();

        assert_eq!(
            principal,
            Principal::ApiKey {
                key_id: "key_1".into(),
                owner_id: "owner_1".into(),
                organization_id: Some("org_1".into()),
            }
        );
    }

    #[tokio::test]
    async fn issued_key_verifies() {
        let store = Arc::new(InMemoryApiKeyStore::new());
        let (generated, issued) = store.issue("owner_2", Some("org_2".into())).await;
        let verifier = ApiKeyVerifier::new(store.clone());

        let principal = verifier
            .verify_headers(&headers_with_key(&generated.key))
            .await
            .unwrap();
        assert_eq!(principal, Principal::from(issued));
        assert_eq!(
            store.lookup_api_key(&generated.key_hash).await.unwrap(),
            None
        );
    }

    fn seed_env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[tokio::test]
    async fn configured_seed_key_is_registered() {
        let config = crate::test_support::test_config();
        let store = Arc::new(InMemoryApiKeyStore::new());
        let env = seed_env(&[
            (SEED_API_KEY_ENV, "clk_from_env"),
            (SEED_ORGANIZATION_ID_ENV, "org_seed"),
        ]);

        let seeded = seed_api_key(&store, &env, &config).await;
        assert!(matches!(&seeded, SeededKey::Configured(record) if record.owner_id == "seed-owner"));

        let principal = ApiKeyVerifier::new(store)
            .verify_headers(&headers_with_key("clk_from_env"))
            .await
            .unwrap();
        assert_eq!(principal.subject(), "seed-owner");
    }

    #[tokio::test]
    async fn development_without_seed_key_generates_one() {
        let config = crate::test_support::config_with(&[
            ("NODE_ENV", "development"),
            ("MONGODB_URI", "mongodb://localhost:27017/chatlogger"),
        ]);
        let store = Arc::new(InMemoryApiKeyStore::new());

        let SeededKey::Generated { key, record } =
            seed_api_key(&store, &seed_env(&[]), &config).await
        else {
            panic!("expected a generated key");
        };
        assert!(key.key.starts_with(API_KEY_PREFIX));
        assert_eq!(record.organization_id.as_deref(), Some("seed-organization"));

        let principal = ApiKeyVerifier::new(store)
            .verify_headers(&headers_with_key(&key.key))
            .await
            .unwrap();
        assert_eq!(principal, Principal::from(record));
    }

    #[tokio::test]
    async fn other_environments_seed_nothing_by_default() {
        let config = crate::test_support::test_config();
        let store = InMemoryApiKeyStore::new();

        let seeded = seed_api_key(&store, &seed_env(&[]), &config).await;
        assert!(matches!(seeded, SeededKey::Skipped));
        assert!(store.keys.read().await.is_empty());
    }

    #[tokio::test]
    async fn missing_or_unknown_key_is_invalid() {
        let verifier = ApiKeyVerifier::new(Arc::new(InMemoryApiKeyStore::new()));

        assert_eq!(
            verifier.verify_headers(&HeaderMap::new()).await,
            Err(AuthError::Invalid)
        );
        assert_eq!(
            verifier.verify_headers(&headers_with_key("nope")).await,
            Err(AuthError::Invalid)
        );
    }

    #[tokio::test]
    async fn store_failure_is_invalid() {
        let verifier = ApiKeyVerifier::new(Arc::new(FailingStore));
        assert_eq!(
            verifier.verify_headers(&headers_with_key("any")).await,
            Err(AuthError::Invalid)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn stalled_lookup_times_out() {
        let verifier = ApiKeyVerifier::new(Arc::new(StalledStore))
            .with_lookup_timeout(Duration::from_millis(50));
        assert_eq!(
            verifier.verify_headers(&headers_with_key("any")).await,
            Err(AuthError::Invalid)
        );
    }
}
