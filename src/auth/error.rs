// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication and tenant scoping errors.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Authentication error type.
///
/// `Missing` and `Invalid` are produced by the individual credential
/// verifiers. The gate itself only ever rejects with `Unauthorized`, so
/// callers never learn which credential failed or why.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// The credential this verifier handles is absent
    Missing,
    /// The credential is present but bad (signature, expiry, payload, unknown key)
    Invalid,
    /// Every configured verifier failed
    Unauthorized,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    error_code: String,
}

impl AuthError {
    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::Missing => "missing_credentials",
            AuthError::Invalid => "invalid_credentials",
            AuthError::Unauthorized => "unauthorized",
        }
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        StatusCode::UNAUTHORIZED
    }
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthError::Missing => write!(f, "Credentials are missing"),
            AuthError::Invalid => write!(f, "Credentials are invalid"),
            AuthError::Unauthorized => {
                write!(f, "Authentication required: provide a valid bearer token or API key")
            }
        }
    }
}

impl std::error::Error for AuthError {}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(ErrorBody {
            error: self.to_string(),
            error_code: self.error_code().to_string(),
        });
        (status, body).into_response()
    }
}

/// The authenticated principal could not be tied to an organization.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OrganizationError {
    #[error("Organization context is missing for this credential")]
    Missing,
}

impl OrganizationError {
    pub fn error_code(&self) -> &'static str {
        match self {
            OrganizationError::Missing => "organization_missing",
        }
    }
}

impl IntoResponse for OrganizationError {
    fn into_response(self) -> Response {
        let body = Json(ErrorBody {
            error: self.to_string(),
            error_code: self.error_code().to_string(),
        });
        (StatusCode::BAD_REQUEST, body).into_response()
    }
}

/// Failures of the API-key store collaborator.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum KeyStoreError {
    #[error("API key store unavailable: {0}")]
    Unavailable(String),

    #[error("API key lookup timed out")]
    Timeout,
}
