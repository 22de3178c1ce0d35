// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication middleware for Axum.
//!
//! Protected routers stack two layers:
//!
//! ```rust,ignore
//! let app = Router::new()
//!     .route("/protected", get(protected_handler))
//!     .route_layer(axum::middleware::from_fn(attach_organization))
//!     .route_layer(axum::middleware::from_fn_with_state(state.clone(), require_auth));
//! ```
//!
//! `require_auth` runs first and stores the [`Principal`] in the request
//! extensions; `attach_organization` then adds the
//! [`OrganizationContext`](super::OrganizationContext).

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};

use super::{resolve_organization, AuthError, Principal};
use crate::state::AppState;

/// Run the credential gate; reject with 401 if it fails.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    match state.gate.authenticate(request.headers()).await {
        Ok(principal) => {
            request.extensions_mut().insert(principal);
            next.run(request).await
        }
        Err(e) => {
            tracing::warn!(
                method = %request.method(),
                path = %request.uri().path(),
                "Rejected unauthenticated request"
            );
            e.into_response()
        }
    }
}

/// Attach the principal's organization; reject with 400 if it has none.
pub async fn attach_organization(mut request: Request, next: Next) -> Response {
    let Some(principal) = request.extensions().get::<Principal>() else {
        return AuthError::Unauthorized.into_response();
    };

    match resolve_organization(principal) {
        Ok(organization) => {
            request.extensions_mut().insert(organization);
            next.run(request).await
        }
        Err(e) => {
            tracing::warn!(
                path = %request.uri().path(),
                "Authenticated request has no organization"
            );
            e.into_response()
        }
    }
}
