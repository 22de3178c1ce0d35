// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Bearer token verification.
//!
//! Tokens are HS256 JWTs signed with `JWT_SECRET`. Verification is
//! synchronous and CPU-bound; nothing here performs I/O.

use axum::http::{header::AUTHORIZATION, HeaderMap};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use super::{AuthError, Principal, TokenClaims};
use crate::config::RuntimeConfig;

/// Clock skew tolerance (60 seconds).
const CLOCK_SKEW_LEEWAY: u64 = 60;

const BEARER_PREFIX: &str = "Bearer ";

/// Verifies `Authorization: Bearer <token>` headers against the signing secret.
#[derive(Clone)]
pub struct BearerVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl BearerVerifier {
    pub fn new(config: &RuntimeConfig) -> Self {
        Self::from_secret(config.jwt_secret())
    }

    pub fn from_secret(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = CLOCK_SKEW_LEEWAY;
        validation.validate_aud = false;

        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Authenticate the request headers.
    ///
    /// # Errors
    /// `Missing` when there is no bearer credential, `Invalid` when the
    /// token does not verify.
    pub fn verify_headers(&self, headers: &HeaderMap) -> Result<Principal, AuthError> {
        let token = bearer_token(headers)?;
        self.verify_token(token)
    }

    /// Verify a raw token and turn its claims into a principal.
    pub fn verify_token(&self, token: &str) -> Result<Principal, AuthError> {
        let token_data =
            decode::<TokenClaims>(token, &self.decoding_key, &self.validation).map_err(|e| {
                tracing::debug!(reason = ?e.kind(), "Bearer token rejected");
                AuthError::Invalid
            })?;

        let claims = token_data.claims;
        let user_id = claims
            .subject()
            .ok_or_else(|| {
                tracing::debug!("Bearer token has no subject");
                AuthError::Invalid
            })?
            .to_string();

        Ok(Principal::Jwt { user_id, claims })
    }
}

/// Extract the token from an `Authorization: Bearer <token>` header.
///
/// Any other scheme, an unreadable header or an empty token counts as missing.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(AUTHORIZATION)
        .ok_or(AuthError::Missing)?
        .to_str()
        .map_err(|_| AuthError::Missing)?;

    let token = value
        .strip_prefix(BEARER_PREFIX)
        .ok_or(AuthError::Missing)?
        .trim();

    if token.is_empty() {
        return Err(AuthError::Missing);
    }
    Ok(token)
}

/// Sign `claims` with `secret` using HS256.
pub fn encode_token(
    secret: &str,
    claims: &TokenClaims,
) -> Result<String, jsonwebtoken::errors::Error> {
    encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use chrono::Utc;

    const SECRET: &str = "test_jwt_secret";

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    fn token(claims: &TokenClaims) -> String {
        encode_token(SECRET, claims).unwrap()
    }

    fn valid_claims() -> TokenClaims {
        TokenClaims::new(
            "user_1",
            Some("org_1".into()),
            Utc::now().timestamp() + 3600,
        )
    }

    #[test]
    fn missing_header_is_missing() {
        let verifier = BearerVerifier::from_secret(SECRET);
        assert_eq!(
            verifier.verify_headers(&HeaderMap::new()),
            Err(AuthError::Missing)
        );
    }

    #[test]
    fn other_schemes_are_missing() {
        let verifier = BearerVerifier::from_secret(SECRET);
        for value in ["Basic dXNlcjpwYXNz", "Token abc", "bearer abc", "Bearer ", "Bearer    "] {
            assert_eq!(
                verifier.verify_headers(&headers_with(value)),
                Err(AuthError::Missing),
                "{value}"
            );
        }
    }

    #[test]
    fn valid_token_yields_jwt_principal() {
        let verifier = BearerVerifier::from_secret(SECRET);
        let claims = valid_claims();
        let headers = headers_with(&format!("Bearer {}", token(&claims)));

        let principal = verifier.verify_headers(&headers).unwrap();
        match principal {
            Principal::Jwt { user_id, claims } => {
                assert_eq!(user_id, "user_1");
                assert_eq!(claims.organization_id.as_deref(), Some("org_1"));
            }
            other => panic!("unexpected principal {other:?}"),
        }
    }

    #[test]
    fn sub_claim_is_accepted_as_subject() {
        let verifier = BearerVerifier::from_secret(SECRET);
        let mut claims = valid_claims();
        claims.user_id = None;
        claims.sub = Some("sub_user".into());

        let principal = verifier.verify_token(&token(&claims)).unwrap();
        assert_eq!(principal.subject(), "sub_user");
    }

    #[test]
    fn wrong_signature_is_invalid() {
        let verifier = BearerVerifier::from_secret(SECRET);
        let forged = encode_token("another_secret", &valid_claims()).unwrap();
        assert_eq!(verifier.verify_token(&forged), Err(AuthError::Invalid));
    }

    #[test]
    fn expired_token_is_invalid() {
        let verifier = BearerVerifier::from_secret(SECRET);
        let mut claims = valid_claims();
        claims.exp = Utc::now().timestamp() - 3600;
        assert_eq!(verifier.verify_token(&token(&claims)), Err(AuthError::Invalid));
    }

    #[test]
    fn token_without_subject_is_invalid() {
        let verifier = BearerVerifier::from_secret(SECRET);
        let mut claims = valid_claims();
        claims.user_id = None;
        assert_eq!(verifier.verify_token(&token(&claims)), Err(AuthError::Invalid));
    }

    #[test]
    fn malformed_token_is_invalid() {
        let verifier = BearerVerifier::from_secret(SECRET);
        assert_eq!(verifier.verify_token("not.a.jwt"), Err(AuthError::Invalid));
        assert_eq!(verifier.verify_token("garbage"), Err(AuthError::Invalid));
    }

    #[test]
    fn token_without_expiry_is_invalid() {
        let verifier = BearerVerifier::from_secret(SECRET);
        let no_expiry = encode(
            &Header::new(Algorithm::HS256),
            &serde_json::json!({ "userId": "user_1" }),
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();
        assert_eq!(verifier.verify_token(&no_expiry), Err(AuthError::Invalid));
    }
}
