// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum extractors for authenticated users.
//!
//! ```rust,ignore
//! async fn my_handler(Auth(user): Auth) -> impl IntoResponse {
//!     // user is AuthenticatedUser
//! }
//! ```

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use jsonwebtoken::{decode, errors::ErrorKind, Algorithm, DecodingKey, Validation};

use super::claims::TokenClaims;
use super::{AuthConfig, AuthError, AuthenticatedUser, Role};
use crate::state::AppState;

/// Clock skew tolerance (60 seconds).
const CLOCK_SKEW_LEEWAY: u64 = 60;

/// Any authenticated caller.
pub struct Auth(pub AuthenticatedUser);

impl FromRequestParts<AppState> for Auth {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .ok_or(AuthError::MissingAuthHeader)?
            .to_str()
            .map_err(|_| AuthError::InvalidAuthHeader)?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or(AuthError::InvalidAuthHeader)?;

        let user = verify_jwt(token, &state.auth_config)?;
        Ok(Auth(user))
    }
}

/// Verify a bearer token and extract the caller.
pub fn verify_jwt(token: &str, config: &AuthConfig) -> Result<AuthenticatedUser, AuthError> {
    match config.jwt_secret {
        Some(ref secret) => verify_jwt_production(token, secret, config.issuer.as_deref()),
        None => verify_jwt_development(token),
    }
}

fn verify_jwt_production(
    token: &str,
    secret: &str,
    issuer: Option<&str>,
) -> Result<AuthenticatedUser, AuthError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = CLOCK_SKEW_LEEWAY;
    validation.validate_aud = false;
    if let Some(issuer) = issuer {
        validation.set_issuer(&[issuer]);
    }

    let token_data = decode::<TokenClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => AuthError::TokenExpired,
        ErrorKind::InvalidSignature => AuthError::InvalidSignature,
        ErrorKind::InvalidIssuer => AuthError::InvalidIssuer,
        ErrorKind::ImmatureSignature => AuthError::TokenNotYetValid,
        _ => AuthError::MalformedToken,
    })?;

    Ok(AuthenticatedUser::from_claims(token_data.claims))
}

/// Structure and expiry only, no signature check.
fn verify_jwt_development(token: &str) -> Result<AuthenticatedUser, AuthError> {
    let token_data = jsonwebtoken::dangerous::insecure_decode::<TokenClaims>(token)
        .map_err(|_| AuthError::MalformedToken)?;
    let claims = token_data.claims;

    let now = chrono::Utc::now().timestamp();
    if claims.exp > 0 && claims.exp < now - CLOCK_SKEW_LEEWAY as i64 {
        return Err(AuthError::TokenExpired);
    }

    Ok(AuthenticatedUser::from_claims(claims))
}

/// Extractor that requires admin role.
pub struct AdminOnly(pub AuthenticatedUser);

impl FromRequestParts<AppState> for AdminOnly {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let Auth(user) = Auth::from_request_parts(parts, state).await?;

        if !user.is_admin() {
            return Err(AuthError::InsufficientPermissions);
        }

        Ok(AdminOnly(user))
    }
}

/// Extractor for audit trail readers (admin or auditor).
pub struct AuditReader(pub AuthenticatedUser);

impl FromRequestParts<AppState> for AuditReader {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let Auth(user) = Auth::from_request_parts(parts, state).await?;

        if !user.has_role(Role::Auditor) {
            return Err(AuthError::InsufficientPermissions);
        }

        Ok(AuditReader(user))
    }
}


#[cfg(test)]
mod tests {
    use super::test_tokens::{signed, unsigned};
    use super::*;
    use crate::state::test_state;
    use axum::http::Request;

    const SECRET: &str = "test-secret-with-enough-entropy";

    fn parts_with(token: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/test");
        if let Some(token) = token {
            builder = builder.header("Authorization", format!("Bearer {token}"));
        }
        builder.body(()).unwrap().into_parts().0
    }

    fn claims(exp: i64, iss: &str) -> TokenClaims {
        TokenClaims {
            sub: "user_123".to_string(),
            exp,
            iss: iss.to_string(),
            role: Some("client".to_string()),
        }
    }

    fn production() -> AuthConfig {
        AuthConfig {
            jwt_secret: Some(SECRET.to_string()),
            issuer: Some("https://id.example.com".to_string()),
        }
    }

    fn in_an_hour() -> i64 {
        chrono::Utc::now().timestamp() + 3600
    }

    #[tokio::test]
    async fn auth_extractor_requires_auth_header() {
        let (state, _temp) = test_state();
        let mut parts = parts_with(None);

        let result = Auth::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(AuthError::MissingAuthHeader)));
    }

    #[tokio::test]
    async fn auth_extractor_rejects_non_bearer() {
        let (state, _temp) = test_state();
        let mut parts = Request::builder()
            .uri("/test")
            .header("Authorization", "Basic dXNlcjpwYXNz")
            .body(())
            .unwrap()
            .into_parts()
            .0;

        let result = Auth::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(AuthError::InvalidAuthHeader)));
    }

    #[tokio::test]
    async fn development_mode_accepts_unsigned_token() {
        let (state, _temp) = test_state();
        let token = unsigned("user_123", "client");
        let mut parts = parts_with(Some(&token));

        let Auth(user) = Auth::from_request_parts(&mut parts, &state).await.unwrap();
        assert_eq!(user.user_id, "user_123");
        assert_eq!(user.role, Role::Client);
    }

    #[tokio::test]
    async fn admin_only_rejects_non_admin() {
        let (state, _temp) = test_state();
        let token = unsigned("user_123", "client");
        let mut parts = parts_with(Some(&token));

        let result = AdminOnly::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(AuthError::InsufficientPermissions)));
    }

    #[tokio::test]
    async fn audit_reader_accepts_auditor_and_admin() {
        let (state, _temp) = test_state();
        for role in ["auditor", "admin"] {
            let token = unsigned("u", role);
            let mut parts = parts_with(Some(&token));
            assert!(AuditReader::from_request_parts(&mut parts, &state).await.is_ok());
        }

        let token = unsigned("u", "client");
        let mut parts = parts_with(Some(&token));
        assert!(matches!(
            AuditReader::from_request_parts(&mut parts, &state).await,
            Err(AuthError::InsufficientPermissions)
        ));
    }

    #[test]
    fn production_mode_verifies_signature() {
        let config = production();
        let good = signed(SECRET, &claims(in_an_hour(), "https://id.example.com"));
        let user = verify_jwt(&good, &config).unwrap();
        assert_eq!(user.user_id, "user_123");

        let forged = signed("other-secret", &claims(in_an_hour(), "https://id.example.com"));
        assert_eq!(verify_jwt(&forged, &config).unwrap_err(), AuthError::InvalidSignature);

        let unsigned = unsigned("user_123", "admin");
        assert!(verify_jwt(&unsigned, &config).is_err());
    }

    #[test]
    fn production_mode_checks_expiry_and_issuer() {
        let config = production();

        let expired = signed(SECRET, &claims(1_000_000, "https://id.example.com"));
        assert_eq!(verify_jwt(&expired, &config).unwrap_err(), AuthError::TokenExpired);

        let wrong_issuer = signed(SECRET, &claims(in_an_hour(), "https://evil.example.com"));
        assert_eq!(verify_jwt(&wrong_issuer, &config).unwrap_err(), AuthError::InvalidIssuer);
    }

    #[test]
    fn development_mode_still_checks_expiry() {
        let expired = signed("anything", &claims(1_000_000, "x"));
        assert_eq!(
            verify_jwt(&expired, &AuthConfig::default()).unwrap_err(),
            AuthError::TokenExpired
        );
        assert_eq!(
            verify_jwt("not-a-jwt", &AuthConfig::default()).unwrap_err(),
            AuthError::MalformedToken
        );
    }
}
