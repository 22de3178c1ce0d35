// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! The credential gate.
//!
//! The gate holds an ordered list of verification strategies and asks each
//! one in turn. The first success wins and later strategies are never
//! consulted; any failure (missing or invalid credential) moves on to the
//! next strategy. When every strategy has failed the request is rejected
//! with an opaque [`AuthError::Unauthorized`].
//!
//! The production order is bearer token first, then API key.

use std::sync::Arc;

use async_trait::async_trait;
use axum::http::HeaderMap;

use super::{ApiKeyStore, ApiKeyVerifier, AuthError, BearerVerifier, Principal};
use crate::config::RuntimeConfig;

/// One way of authenticating a request.
#[async_trait]
pub trait CredentialVerifier: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    async fn verify(&self, headers: &HeaderMap) -> Result<Principal, AuthError>;
}

#[async_trait]
impl CredentialVerifier for BearerVerifier {
    fn name(&self) -> &'static str {
        "bearer"
    }

    async fn verify(&self, headers: &HeaderMap) -> Result<Principal, AuthError> {
        self.verify_headers(headers)
    }
}

#[async_trait]
impl CredentialVerifier for ApiKeyVerifier {
    fn name(&self) -> &'static str {
        "api_key"
    }

    async fn verify(&self, headers: &HeaderMap) -> Result<Principal, AuthError> {
        self.verify_headers(headers).await
    }
}

/// Ordered, short-circuiting credential gate.
#[derive(Clone)]
pub struct AuthGate {
    verifiers: Vec<Arc<dyn CredentialVerifier>>,
}

impl AuthGate {
    pub fn new(verifiers: Vec<Arc<dyn CredentialVerifier>>) -> Self {
        Self { verifiers }
    }

    /// Bearer token first, API key as the fallback.
    pub fn bearer_then_api_key(config: &RuntimeConfig, key_store: Arc<dyn ApiKeyStore>) -> Self {
        Self::new(vec![
            Arc::new(BearerVerifier::new(config)),
            Arc::new(ApiKeyVerifier::new(key_store)),
        ])
    }

    /// Authenticate a request.
    ///
    /// # Errors
    /// `Unauthorized` when no strategy accepts the request.
    pub async fn authenticate(&self, headers: &HeaderMap) -> Result<Principal, AuthError> {
        for verifier in &self.verifiers {
            match verifier.verify(headers).await {
                Ok(principal) => {
                    tracing::debug!(
                        strategy = verifier.name(),
                        kind = %principal.kind(),
                        subject = principal.subject(),
                        "Request authenticated"
                    );
                    return Ok(principal);
                }
                Err(reason) => {
                    tracing::debug!(
                        strategy = verifier.name(),
                        reason = reason.error_code(),
                        "Credential rejected, trying next strategy"
                    );
                }
            }
        }
        Err(AuthError::Unauthorized)
    }
}
