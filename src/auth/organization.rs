// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Tenant scoping for authenticated principals.

use serde::Serialize;
use utoipa::ToSchema;

use super::{OrganizationError, Principal};

/// The organization a request acts for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationContext {
    pub organization_id: String,
}

/// Resolve the tenant of an authenticated principal.
///
/// Bearer principals carry it in the `organizationId` claim; API-key
/// principals carry the owning organization from the key lookup, so the key
/// store is not consulted again.
///
/// # Errors
/// `OrganizationError::Missing` when no non-empty organization is known.
pub fn resolve_organization(principal: &Principal) -> Result<OrganizationContext, OrganizationError> {
    let organization_id = match principal {
        Principal::Jwt { claims, .. } => claims.organization_id.as_deref(),
        Principal::ApiKey {
            organization_id, ..
        } => organization_id.as_deref(),
    };

    organization_id
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(|id| OrganizationContext {
            organization_id: id.to_string(),
        })
        .ok_or(OrganizationError::Missing)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::TokenClaims;

    fn jwt(organization_id: Option<&str>) -> Principal {
        Principal::Jwt {
            user_id: "user_1".into(),
            claims: TokenClaims::new("user_1", organization_id.map(String::from), 0),
        }
    }

    fn api_key(organization_id: Option<&str>) -> Principal {
        Principal::ApiKey {
            key_id: "key_1".into(),
            owner_id: "owner_1".into(),
            organization_id: organization_id.map(String::from),
        }
    }

    #[test]
    fn jwt_principal_uses_claim() {
        assert_eq!(
            resolve_organization(&jwt(Some("org_1"))),
            Ok(OrganizationContext {
                organization_id: "org_1".into()
            })
        );
    }

    #[test]
    fn api_key_principal_uses_lookup_result() {
        assert_eq!(
            resolve_organization(&api_key(Some("org_2"))).unwrap().organization_id,
            "org_2"
        );
    }

    #[test]
    fn absent_or_blank_organization_is_missing() {
        for principal in [jwt(None), jwt(Some("  ")), api_key(None), api_key(Some(""))] {
            assert_eq!(
                resolve_organization(&principal),
                Err(OrganizationError::Missing)
            );
        }
    }
}
