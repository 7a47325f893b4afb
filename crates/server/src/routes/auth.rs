//! Registration and login handlers.

use axum::{Json, extract::State, http::StatusCode};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use farm_village_core::Role;

use crate::error::Result;
use crate::models::Account;
use crate::services::auth::AuthService;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    pub role: Role,
    pub display_name: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
    pub role: Role,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub account: Account,
}

/// `POST /auth/register`
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<Account>)> {
    let auth = AuthService::new(state.pool(), state.tokens(), state.lockout_policy());

    let account = auth
        .register(&req.username, &req.password, req.role, &req.display_name)
        .await?;

    tracing::info!(account_id = %account.id, role = %account.role, "account registered");

    Ok((StatusCode::CREATED, Json(account)))
}

/// `POST /auth/login`
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>> {
    let auth = AuthService::new(state.pool(), state.tokens(), state.lockout_policy());

    let outcome = auth.login(&req.username, &req.password, req.role).await?;

    Ok(Json(LoginResponse {
        token: outcome.token,
        expires_at: outcome.expires_at,
        account: outcome.account,
    }))
}
