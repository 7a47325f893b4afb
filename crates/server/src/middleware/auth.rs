//! Authentication extractors.
//!
//! `RequireAuth` parses the `Authorization: Bearer` header, verifies the
//! token, and re-checks the account against the store so revoked accounts
//! are rejected even while their tokens are still unexpired. The role
//! wrappers add a 403 check on top.
//!
//! # Example
//!
//! ```rust,ignore
//! async fn protected_handler(
//!     RequireAuth(account): RequireAuth,
//! ) -> impl IntoResponse {
//!     format!("Hello, {}!", account.display_name)
//! }
//! ```

use axum::{
    extract::{FromRequestParts, OptionalFromRequestParts},
    http::{header, request::Parts},
};

use farm_village_core::Role;

use crate::error::ApiError;
use crate::models::Account;
use crate::services::auth::AuthService;
use crate::state::AppState;

/// Extractor that requires a valid bearer token backed by a live account.
pub struct RequireAuth(pub Account);

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?;
        let current = state.tokens().verify(token)?;

        let auth = AuthService::new(state.pool(), state.tokens(), state.lockout_policy());
        let account = auth.resolve(current).await?;

        Ok(Self(account))
    }
}

impl OptionalFromRequestParts<AppState> for RequireAuth {
    type Rejection = ApiError;

    /// Anonymous requests pass through as `None`; a present but invalid
    /// token is still rejected.
    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Option<Self>, Self::Rejection> {
        if !parts.headers.contains_key(header::AUTHORIZATION) {
            return Ok(None);
        }

        <Self as FromRequestParts<AppState>>::from_request_parts(parts, state)
            .await
            .map(Some)
    }
}

/// Extractor that requires an authenticated admin.
pub struct RequireAdmin(pub Account);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let RequireAuth(account) =
            <RequireAuth as FromRequestParts<AppState>>::from_request_parts(parts, state).await?;
        require_role(&account, Role::Admin)?;
        Ok(Self(account))
    }
}

/// Extractor that requires an authenticated seller.
pub struct RequireSeller(pub Account);

impl FromRequestParts<AppState> for RequireSeller {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let RequireAuth(account) =
            <RequireAuth as FromRequestParts<AppState>>::from_request_parts(parts, state).await?;
        require_role(&account, Role::Seller)?;
        Ok(Self(account))
    }
}

/// Extractor that requires an authenticated buyer.
pub struct RequireBuyer(pub Account);

impl FromRequestParts<AppState> for RequireBuyer {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let RequireAuth(account) =
            <RequireAuth as FromRequestParts<AppState>>::from_request_parts(parts, state).await?;
        require_role(&account, Role::Buyer)?;
        Ok(Self(account))
    }
}

/// Pull the bearer token out of the Authorization header.
fn bearer_token(parts: &Parts) -> Result<&str, ApiError> {
    let header = parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::Unauthorized("missing bearer token".to_owned()))?;

    header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::Unauthorized("missing bearer token".to_owned()))
}

fn require_role(account: &Account, role: Role) -> Result<(), ApiError> {
    if account.role == role {
        Ok(())
    } else {
        Err(ApiError::Forbidden(format!(
            "this endpoint requires the {role} role"
        )))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::Request;
    use secrecy::SecretString;
    use sqlx::postgres::PgPoolOptions;

    use super::*;
    use crate::config::ServerConfig;
    use crate::services::auth::LockoutPolicy;

    fn test_state() -> AppState {
        let config = ServerConfig {
            database_url: SecretString::from("postgres://localhost/unused"),
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            token_secret: SecretString::from("aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6!"),
            token_ttl_days: 7,
            lockout: LockoutPolicy::default(),
            sentry_dsn: None,
            sentry_environment: None,
        };

        // Lazy pool: never connects unless a query runs
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/unused")
            .unwrap();

        AppState::new(config, pool)
    }

    fn anonymous_parts() -> Parts {
        Request::builder().body(()).unwrap().into_parts().0
    }

    #[tokio::test]
    async fn test_role_extractors_reject_anonymous_requests() {
        let state = test_state();

        let mut parts = anonymous_parts();
        let admin =
            <RequireAdmin as FromRequestParts<AppState>>::from_request_parts(&mut parts, &state)
                .await;
        assert!(matches!(admin, Err(ApiError::Unauthorized(_))));

        let mut parts = anonymous_parts();
        let seller =
            <RequireSeller as FromRequestParts<AppState>>::from_request_parts(&mut parts, &state)
                .await;
        assert!(matches!(seller, Err(ApiError::Unauthorized(_))));

        let mut parts = anonymous_parts();
        let buyer =
            <RequireBuyer as FromRequestParts<AppState>>::from_request_parts(&mut parts, &state)
                .await;
        assert!(matches!(buyer, Err(ApiError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn test_optional_auth_passes_anonymous_through() {
        let state = test_state();
        let mut parts = anonymous_parts();

        let result = <RequireAuth as OptionalFromRequestParts<AppState>>::from_request_parts(
            &mut parts, &state,
        )
        .await;

        assert!(matches!(result, Ok(None)));
    }

    #[test]
    fn test_bearer_token_extraction() {
        let mut parts = anonymous_parts();
        assert!(bearer_token(&parts).is_err());

        parts
            .headers
            .insert(header::AUTHORIZATION, "Bearer abc123".parse().unwrap());
        assert_eq!(bearer_token(&parts).unwrap(), "abc123");

        parts
            .headers
            .insert(header::AUTHORIZATION, "Bearer ".parse().unwrap());
        assert!(bearer_token(&parts).is_err());

        parts
            .headers
            .insert(header::AUTHORIZATION, "Basic abc123".parse().unwrap());
        assert!(bearer_token(&parts).is_err());
    }
}
