//! Authentication error types.

use thiserror::Error;

use farm_village_core::Role;

use crate::db::RepositoryError;
use crate::services::tokens::TokenError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid username format.
    #[error("invalid username: {0}")]
    InvalidUsername(#[from] farm_village_core::UsernameError),

    /// Invalid credentials (wrong password or account not found).
    ///
    /// When the account exists, `attempts_remaining` tells the caller how
    /// many tries are left before the lockout window starts.
    #[error("invalid credentials")]
    InvalidCredentials {
        /// Failed attempts left before the account locks, if known.
        attempts_remaining: Option<u32>,
    },

    /// The account is temporarily locked after repeated failures.
    #[error("account locked, retry in {retry_after_secs}s")]
    AccountLocked {
        /// Seconds until the lockout window elapses.
        retry_after_secs: i64,
    },

    /// The token's account no longer exists or was deactivated.
    #[error("account revoked or missing")]
    RevokedOrMissing,

    /// Account already exists for this (username, role).
    #[error("account already exists")]
    AccountExists,

    /// The role cannot be claimed through registration.
    #[error("{0} accounts cannot be registered")]
    ReservedRole(Role),

    /// Password too weak or invalid.
    #[error("password validation failed: {0}")]
    WeakPassword(String),

    /// Token issuance or verification failure.
    #[error("token error: {0}")]
    Token(#[from] TokenError),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,
}
