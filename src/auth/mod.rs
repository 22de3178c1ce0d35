// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Credential checks and tenant scoping for the Chatlogger API.
//!
//! ## Auth Flow
//!
//! 1. The gate tries the bearer token (`Authorization: Bearer <JWT>`):
//!    - HS256 signature against `JWT_SECRET`, expiry with 60s leeway
//!    - `userId` (or `sub`) → acting user
//! 2. Only if that fails for any reason, it tries the API key (`X-API-Key`)
//!    through the key store.
//! 3. If both fail the request gets an opaque 401.
//! 4. The principal is mapped to its organization; a principal without one
//!    gets a 400, not a 401.
//!
//! ## Security
//!
//! - All `/chats` endpoints require authentication
//! - API keys are stored and looked up as SHA-256 digests
//! - Credentials are never logged

pub mod api_key;
pub mod bearer;
pub mod error;
pub mod extractor;
pub mod gate;
pub mod middleware;
pub mod organization;
pub mod principal;

pub use api_key::{ApiKeyRecord, ApiKeyStore, ApiKeyVerifier, InMemoryApiKeyStore};
pub use bearer::{encode_token, BearerVerifier};
pub use error::{AuthError, KeyStoreError, OrganizationError};
pub use extractor::{Auth, Tenant};
pub use gate::{AuthGate, CredentialVerifier};
pub use organization::{resolve_organization, OrganizationContext};
pub use principal::{Principal, PrincipalKind, TokenClaims};
