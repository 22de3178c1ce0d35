// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authenticated principals and bearer token claims.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Claims carried by a bearer token.
///
/// Tokens identify their user either through `userId` or the standard `sub`
/// claim. `organizationId` names the tenant the token acts for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject (standard claim)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,

    /// Application user ID
    #[serde(
        default,
        rename = "userId",
        alias = "user_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub user_id: Option<String>,

    /// Tenant the token is scoped to
    #[serde(
        default,
        rename = "organizationId",
        alias = "organization_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub organization_id: Option<String>,

    /// Issued at timestamp
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,

    /// Expiration timestamp
    pub exp: i64,

    /// Any other claims, preserved for handlers
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

impl TokenClaims {
    /// Claims for `user_id` in `organization_id`, expiring at `exp`.
    pub fn new(user_id: impl Into<String>, organization_id: Option<String>, exp: i64) -> Self {
        Self {
            sub: None,
            user_id: Some(user_id.into()),
            organization_id,
            iat: None,
            exp,
            extra: HashMap::new(),
        }
    }

    /// The user this token was issued to: `userId`, falling back to `sub`.
    pub fn subject(&self) -> Option<&str> {
        self.user_id
            .as_deref()
            .filter(|id| !id.is_empty())
            .or_else(|| self.sub.as_deref().filter(|id| !id.is_empty()))
    }
}

/// How a principal authenticated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrincipalKind {
    Jwt,
    ApiKey,
}

impl std::fmt::Display for PrincipalKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PrincipalKind::Jwt => write!(f, "jwt"),
            PrincipalKind::ApiKey => write!(f, "api_key"),
        }
    }
}

/// The identity behind a request, produced by the auth gate.
///
/// Lives for one request only.
#[derive(Debug, Clone, PartialEq)]
pub enum Principal {
    /// Authenticated with a bearer token
    Jwt { user_id: String, claims: TokenClaims },
    /// Authenticated with an API key
    ApiKey {
        key_id: String,
        owner_id: String,
        /// Owning organization, as returned by the key store lookup
        organization_id: Option<String>,
    },
}

impl Principal {
    pub fn kind(&self) -> PrincipalKind {
        match self {
            Principal::Jwt { .. } => PrincipalKind::Jwt,
            Principal::ApiKey { .. } => PrincipalKind::ApiKey,
        }
    }

    /// The acting user: the token's user or the key's owner.
    pub fn subject(&self) -> &str {
        match self {
            Principal::Jwt { user_id, .. } => user_id,
            Principal::ApiKey { owner_id, .. } => owner_id,
        }
    }
}
