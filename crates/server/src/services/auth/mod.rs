//! Authentication service.
//!
//! Handles registration, password login with per-account lockout, and bearer
//! token verification.
//!
//! # Lockout policy
//!
//! The failed-attempt counter is per-account, not per-IP. It is reset only by
//! a successful login. A currently locked account rejects every attempt
//! without touching the counter, so continued attacks cannot extend the
//! lockout window.

mod error;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::{DateTime, Duration, Utc};
use sqlx::PgPool;

use farm_village_core::{Role, Username};

use crate::db::{AccountRepository, RepositoryError};
use crate::models::{Account, CurrentAccount};
use crate::services::tokens::TokenService;

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 8;

/// Lockout policy applied to failed logins.
#[derive(Debug, Clone, Copy)]
pub struct LockoutPolicy {
    /// Failed attempts before the account locks.
    pub threshold: u32,
    /// How long the account stays locked.
    pub duration: Duration,
}

impl Default for LockoutPolicy {
    fn default() -> Self {
        Self {
            threshold: 5,
            duration: Duration::minutes(30),
        }
    }
}

/// What a failed login attempt turns into under a [`LockoutPolicy`].
#[derive(Debug, PartialEq, Eq)]
enum FailureOutcome {
    /// The attempt crossed the threshold; the account locks until the given time.
    Locked { attempts: i32, until: DateTime<Utc> },
    /// The attempt was counted; this many tries remain before a lock.
    Counted { attempts: i32, remaining: u32 },
}

/// Apply the lockout policy to one more failed attempt.
fn register_failure(
    previous_attempts: i32,
    policy: LockoutPolicy,
    now: DateTime<Utc>,
) -> FailureOutcome {
    let attempts = previous_attempts.saturating_add(1);
    let threshold = i32::try_from(policy.threshold).unwrap_or(i32::MAX);

    if attempts >= threshold {
        FailureOutcome::Locked {
            attempts,
            until: now + policy.duration,
        }
    } else {
        #[allow(clippy::cast_sign_loss)] // attempts < threshold here, both positive
        FailureOutcome::Counted {
            attempts,
            remaining: (threshold - attempts) as u32,
        }
    }
}

/// A successful login.
#[derive(Debug)]
pub struct LoginOutcome {
    pub account: Account,
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Authentication service.
pub struct AuthService<'a> {
    accounts: AccountRepository<'a>,
    tokens: &'a TokenService,
    policy: LockoutPolicy,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a PgPool, tokens: &'a TokenService, policy: LockoutPolicy) -> Self {
        Self {
            accounts: AccountRepository::new(pool),
            tokens,
            policy,
        }
    }

    /// Register a new account.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidUsername` if the username format is invalid.
    /// Returns `AuthError::WeakPassword` if the password doesn't meet requirements.
    /// Returns `AuthError::ReservedRole` when the request asks for an admin account.
    /// Returns `AuthError::AccountExists` if (username, role) is already taken.
    pub async fn register(
        &self,
        username: &str,
        password: &str,
        role: Role,
        display_name: &str,
    ) -> Result<Account, AuthError> {
        ensure_registerable(role)?;

        let username = Username::parse(username)?;
        validate_password(password)?;

        let password_hash = hash_password(password)?;

        let account = self
            .accounts
            .create(&username, &password_hash, role, display_name)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::AccountExists,
                other => AuthError::Repository(other),
            })?;

        Ok(account)
    }

    /// Login with username, password, and role.
    ///
    /// A locked account fails with `AccountLocked` without consuming an
    /// attempt. A wrong password increments the counter and may start the
    /// lockout window. Success resets counter and lockout and returns a
    /// signed bearer token.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` on unknown account or wrong password.
    /// Returns `AuthError::AccountLocked` while the lockout window is open.
    pub async fn login(
        &self,
        username: &str,
        password: &str,
        role: Role,
    ) -> Result<LoginOutcome, AuthError> {
        let username = Username::parse(username)?;

        let Some((account, password_hash)) =
            self.accounts.get_auth_data(&username, role).await?
        else {
            return Err(AuthError::InvalidCredentials {
                attempts_remaining: None,
            });
        };

        let now = Utc::now();

        // Locked accounts reject attempts without counting them.
        if account.is_locked(now)
            && let Some(until) = account.locked_until
        {
            return Err(AuthError::AccountLocked {
                retry_after_secs: (until - now).num_seconds().max(1),
            });
        }

        if verify_password(password, &password_hash).is_err() {
            return Err(self.handle_failed_attempt(&account, now).await?);
        }

        self.accounts.reset_lockout(account.id).await?;

        let (token, expires_at) = self.tokens.issue(account.id, account.role)?;

        tracing::info!(account_id = %account.id, role = %account.role, "login succeeded");

        Ok(LoginOutcome {
            account,
            token,
            expires_at,
        })
    }

    /// Re-check a verified token against the account store.
    ///
    /// Token signature and expiry are checked by the middleware before this;
    /// here we reject tokens whose account disappeared or was deactivated.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::RevokedOrMissing` if the account is gone or inactive.
    pub async fn resolve(&self, current: CurrentAccount) -> Result<Account, AuthError> {
        let account = self
            .accounts
            .get_by_id(current.id)
            .await?
            .ok_or(AuthError::RevokedOrMissing)?;

        if !account.active {
            return Err(AuthError::RevokedOrMissing);
        }

        Ok(account)
    }

    /// Count a failed attempt and map it to the error the caller sees.
    async fn handle_failed_attempt(
        &self,
        account: &Account,
        now: DateTime<Utc>,
    ) -> Result<AuthError, AuthError> {
        match register_failure(account.failed_attempts, self.policy, now) {
            FailureOutcome::Locked { attempts, until } => {
                self.accounts
                    .record_failed_attempt(account.id, attempts, Some(until))
                    .await?;

                tracing::warn!(account_id = %account.id, attempts, "account locked");

                Ok(AuthError::AccountLocked {
                    retry_after_secs: (until - now).num_seconds().max(1),
                })
            }
            FailureOutcome::Counted {
                attempts,
                remaining,
            } => {
                self.accounts
                    .record_failed_attempt(account.id, attempts, None)
                    .await?;

                Ok(AuthError::InvalidCredentials {
                    attempts_remaining: Some(remaining),
                })
            }
        }
    }
}

// =============================================================================
// Password Helpers
// =============================================================================

/// Admin accounts are provisioned out of band, never through registration.
fn ensure_registerable(role: Role) -> Result<(), AuthError> {
    if role == Role::Admin {
        return Err(AuthError::ReservedRole(role));
    }

    Ok(())
}

/// Validate that a password meets the minimum policy.
fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }

    Ok(())
}

/// Hash a password using Argon2id.
fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials {
        attempts_remaining: None,
    })?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials {
            attempts_remaining: None,
        })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn policy() -> LockoutPolicy {
        LockoutPolicy {
            threshold: 5,
            duration: Duration::minutes(30),
        }
    }

    #[test]
    fn test_register_failure_counts_below_threshold() {
        let now = Utc::now();

        match register_failure(0, policy(), now) {
            FailureOutcome::Counted {
                attempts,
                remaining,
            } => {
                assert_eq!(attempts, 1);
                assert_eq!(remaining, 4);
            }
            FailureOutcome::Locked { .. } => panic!("first failure must not lock"),
        }
    }

    #[test]
    fn test_register_failure_locks_at_threshold() {
        let now = Utc::now();

        // Four prior failures; the fifth crosses the threshold.
        match register_failure(4, policy(), now) {
            FailureOutcome::Locked { attempts, until } => {
                assert_eq!(attempts, 5);
                assert_eq!(until, now + Duration::minutes(30));
            }
            FailureOutcome::Counted { .. } => panic!("fifth failure must lock"),
        }
    }

    #[test]
    fn test_register_failure_last_warning() {
        let now = Utc::now();

        match register_failure(3, policy(), now) {
            FailureOutcome::Counted {
                attempts,
                remaining,
            } => {
                assert_eq!(attempts, 4);
                assert_eq!(remaining, 1);
            }
            FailureOutcome::Locked { .. } => panic!("fourth failure must not lock"),
        }
    }

    #[test]
    fn test_admin_role_cannot_be_registered() {
        assert!(matches!(
            ensure_registerable(Role::Admin),
            Err(AuthError::ReservedRole(Role::Admin))
        ));
        assert!(ensure_registerable(Role::Buyer).is_ok());
        assert!(ensure_registerable(Role::Seller).is_ok());
    }

    #[test]
    fn test_validate_password_too_short() {
        assert!(matches!(
            validate_password("short"),
            Err(AuthError::WeakPassword(_))
        ));
    }

    #[test]
    fn test_validate_password_ok() {
        assert!(validate_password("long-enough-password").is_ok());
    }

    #[test]
    fn test_hash_and_verify_password() {
        let hash = hash_password("correct horse battery").unwrap();
        assert!(verify_password("correct horse battery", &hash).is_ok());
        assert!(verify_password("wrong password", &hash).is_err());
    }

    #[test]
    fn test_verify_password_bad_hash() {
        assert!(verify_password("whatever", "not-a-phc-string").is_err());
    }
}
