//! Admin account management commands.
//!
//! # Usage
//!
//! ```bash
//! farm-village-cli admin create -u marketmaster -n "Market Master" -p <password>
//! ```
//!
//! Admin accounts cannot be created through the public registration endpoint;
//! this command is the only way to mint one.

use argon2::{
    Argon2,
    password_hash::{PasswordHasher, SaltString, rand_core::OsRng},
};
use sqlx::PgPool;

use farm_village_core::{Role, Username};

use super::CommandError;

const MIN_PASSWORD_LENGTH: usize = 8;

/// Create a new admin account.
///
/// # Errors
///
/// Returns `CommandError::Invalid` for a bad username or short password.
/// Returns `CommandError::Database` if the insert fails (including a
/// duplicate admin username).
pub async fn create_account(
    username: &str,
    display_name: &str,
    password: &str,
) -> Result<i32, CommandError> {
    let username =
        Username::parse(username).map_err(|e| CommandError::Invalid(e.to_string()))?;

    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(CommandError::Invalid(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }

    let password_hash = hash_password(password)?;

    let database_url = super::database_url()?;

    tracing::info!("Connecting to database...");
    let pool = PgPool::connect(&database_url).await?;

    tracing::info!("Creating admin account: {}", username);

    let (id,): (i32,) = sqlx::query_as(
        "INSERT INTO account (username, password_hash, role, display_name)
         VALUES ($1, $2, $3, $4)
         RETURNING id",
    )
    .bind(&username)
    .bind(&password_hash)
    .bind(Role::Admin)
    .bind(display_name)
    .fetch_one(&pool)
    .await?;

    tracing::info!("Admin account created! ID: {}, Username: {}", id, username);

    Ok(id)
}

/// Hash a password using Argon2id.
pub(crate) fn hash_password(password: &str) -> Result<String, CommandError> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| CommandError::PasswordHash)
}
