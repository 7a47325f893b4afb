//! Unified error handling with Sentry integration.
//!
//! Provides a unified `ApiError` type that captures server-side errors to
//! Sentry before responding to the client. All route handlers return
//! `Result<T, ApiError>`. Every error response is a JSON body with a
//! machine-readable `error` kind and a human-readable `message`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::auth::AuthError;
use crate::services::checkout::CheckoutError;
use crate::services::tokens::TokenError;

/// Application-level error type for the server.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Checkout operation failed.
    #[error("Checkout error: {0}")]
    Checkout(#[from] CheckoutError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Caller is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Caller lacks the required role or ownership.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    Validation(String),

    /// Duplicate unique identity.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Rate limited.
    #[error("Rate limited")]
    RateLimited,

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<TokenError> for ApiError {
    fn from(e: TokenError) -> Self {
        Self::Auth(AuthError::Token(e))
    }
}

/// JSON body returned for every error response.
#[derive(Debug, Serialize)]
struct ErrorBody {
    /// Machine-readable error kind.
    error: &'static str,
    /// Human-readable message.
    message: String,
    /// Seconds to wait before retrying (lockout errors only).
    #[serde(skip_serializing_if = "Option::is_none")]
    retry_after_secs: Option<i64>,
    /// The product that caused the failure (stock errors only).
    #[serde(skip_serializing_if = "Option::is_none")]
    product_id: Option<i32>,
}

impl ErrorBody {
    fn new(error: &'static str, message: impl Into<String>) -> Self {
        Self {
            error,
            message: message.into(),
            retry_after_secs: None,
            product_id: None,
        }
    }
}

impl ApiError {
    fn is_server_error(&self) -> bool {
        match self {
            Self::Database(e) => matches!(
                e,
                RepositoryError::Database(_) | RepositoryError::DataCorruption(_)
            ),
            Self::Internal(_) => true,
            Self::Auth(AuthError::Repository(_) | AuthError::PasswordHash) => true,
            Self::Auth(AuthError::Token(TokenError::Signing)) => true,
            Self::Checkout(CheckoutError::Failed(_)) => true,
            _ => false,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if self.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let (status, body) = match &self {
            Self::Database(RepositoryError::NotFound) => (
                StatusCode::NOT_FOUND,
                ErrorBody::new("not_found", "resource not found"),
            ),
            Self::Database(RepositoryError::Conflict(msg)) => {
                (StatusCode::CONFLICT, ErrorBody::new("conflict", msg.clone()))
            }
            Self::Database(_) | Self::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorBody::new("internal", "Internal server error"),
            ),
            Self::Auth(err) => auth_response(err),
            Self::Checkout(err) => checkout_response(err),
            Self::NotFound(what) => (
                StatusCode::NOT_FOUND,
                ErrorBody::new("not_found", format!("{what} not found")),
            ),
            Self::Unauthorized(msg) => {
                (StatusCode::UNAUTHORIZED, ErrorBody::new("unauthorized", msg))
            }
            Self::Forbidden(msg) => (StatusCode::FORBIDDEN, ErrorBody::new("forbidden", msg)),
            Self::Validation(msg) => (StatusCode::BAD_REQUEST, ErrorBody::new("validation", msg)),
            Self::Conflict(msg) => (StatusCode::CONFLICT, ErrorBody::new("conflict", msg)),
            Self::RateLimited => (
                StatusCode::TOO_MANY_REQUESTS,
                ErrorBody::new("rate_limited", "Too many requests"),
            ),
        };

        (status, Json(body)).into_response()
    }
}

/// Map authentication errors to responses without leaking internals.
fn auth_response(err: &AuthError) -> (StatusCode, ErrorBody) {
    match err {
        AuthError::InvalidCredentials { attempts_remaining } => {
            let message = attempts_remaining.map_or_else(
                || "Invalid credentials".to_owned(),
                |n| format!("Invalid credentials ({n} attempts remaining)"),
            );
            (
                StatusCode::UNAUTHORIZED,
                ErrorBody::new("unauthorized", message),
            )
        }
        AuthError::AccountLocked { retry_after_secs } => {
            let mut body = ErrorBody::new(
                "account_locked",
                format!("Account locked, retry in {retry_after_secs} seconds"),
            );
            body.retry_after_secs = Some(*retry_after_secs);
            (StatusCode::LOCKED, body)
        }
        AuthError::RevokedOrMissing => (
            StatusCode::UNAUTHORIZED,
            ErrorBody::new("unauthorized", "Account revoked or missing"),
        ),
        AuthError::Token(TokenError::Expired) => (
            StatusCode::UNAUTHORIZED,
            ErrorBody::new("unauthorized", "Token expired"),
        ),
        AuthError::Token(TokenError::Malformed) => (
            StatusCode::UNAUTHORIZED,
            ErrorBody::new("unauthorized", "Invalid token"),
        ),
        AuthError::ReservedRole(role) => (
            StatusCode::FORBIDDEN,
            ErrorBody::new("forbidden", format!("{role} accounts cannot be registered")),
        ),
        AuthError::AccountExists => (
            StatusCode::CONFLICT,
            ErrorBody::new("conflict", "An account with this username already exists"),
        ),
        AuthError::InvalidUsername(e) => {
            (StatusCode::BAD_REQUEST, ErrorBody::new("validation", e.to_string()))
        }
        AuthError::WeakPassword(msg) => {
            (StatusCode::BAD_REQUEST, ErrorBody::new("validation", msg.clone()))
        }
        AuthError::Repository(_) | AuthError::PasswordHash | AuthError::Token(TokenError::Signing) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            ErrorBody::new("internal", "Internal server error"),
        ),
    }
}

/// Map checkout errors to responses; stock errors name the product.
fn checkout_response(err: &CheckoutError) -> (StatusCode, ErrorBody) {
    match err {
        CheckoutError::Validation(msg) => {
            (StatusCode::BAD_REQUEST, ErrorBody::new("validation", msg.clone()))
        }
        CheckoutError::ProductNotFound(id) => (
            StatusCode::NOT_FOUND,
            ErrorBody::new("not_found", format!("product {id} not found")),
        ),
        CheckoutError::InsufficientStock {
            product_id,
            name,
            available,
            requested,
        } => {
            let mut body = ErrorBody::new(
                "insufficient_stock",
                format!("Insufficient stock for {name}: {available} available, {requested} requested"),
            );
            body.product_id = Some(product_id.as_i32());
            (StatusCode::CONFLICT, body)
        }
        CheckoutError::Failed(_) => (
            StatusCode::CONFLICT,
            ErrorBody::new("order_failed", "Order could not be completed"),
        ),
    }
}

/// Result type alias for `ApiError`.
pub type Result<T> = std::result::Result<T, ApiError>;
