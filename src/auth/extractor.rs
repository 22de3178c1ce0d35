// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum extractors for authenticated requests.
//!
//! Use the `Auth` and `Tenant` extractors in handlers:
//!
//! ```rust,ignore
//! async fn my_handler(Auth(principal): Auth, Tenant(org): Tenant) -> impl IntoResponse {
//!     // principal is Principal, org is OrganizationContext
//! }
//! ```
//!
//! Both prefer what the middleware already stored in the request extensions
//! and only run the gate themselves when a route is not behind it.

use axum::{
    extract::FromRequestParts,
    http::request::Parts,
    response::{IntoResponse, Response},
};

use super::{resolve_organization, AuthError, OrganizationContext, OrganizationError, Principal};
use crate::state::AppState;

/// Extractor for the authenticated principal.
pub struct Auth(pub Principal);

impl FromRequestParts<AppState> for Auth {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        // First check if middleware already set the principal
        if let Some(principal) = parts.extensions.get::<Principal>().cloned() {
            return Ok(Auth(principal));
        }

        let principal = state.gate.authenticate(&parts.headers).await?;
        parts.extensions.insert(principal.clone());
        Ok(Auth(principal))
    }
}

/// Extractor for the request's organization.
pub struct Tenant(pub OrganizationContext);

/// Why a [`Tenant`] could not be extracted.
#[derive(Debug)]
pub enum TenantRejection {
    Auth(AuthError),
    Organization(OrganizationError),
}

impl IntoResponse for TenantRejection {
    fn into_response(self) -> Response {
        match self {
            TenantRejection::Auth(e) => e.into_response(),
            TenantRejection::Organization(e) => e.into_response(),
        }
    }
}

impl FromRequestParts<AppState> for Tenant {
    type Rejection = TenantRejection;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        if let Some(organization) = parts.extensions.get::<OrganizationContext>().cloned() {
            return Ok(Tenant(organization));
        }

        let Auth(principal) = Auth::from_request_parts(parts, state)
            .await
            .map_err(TenantRejection::Auth)?;
        let organization =
            resolve_organization(&principal).map_err(TenantRejection::Organization)?;
        parts.extensions.insert(organization.clone());
        Ok(Tenant(organization))
    }
}
