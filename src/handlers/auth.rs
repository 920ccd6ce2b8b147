use axum::{extract::State, Extension, Json};
use chrono::{Duration, NaiveDate, Utc};
use serde::Deserialize;
use sqlx::SqlitePool;
use uuid::Uuid;
use validator::Validate;

use crate::auth::{
    jwt::{create_token_pair, hash_token, verify_token, TokenPair, TokenType},
    middleware::AuthUser,
    password::{hash_password, verify_password},
};
use crate::config::Config;
use crate::db;
use crate::error::{AppError, AppResult};
use crate::models::user::{NewUser, RefreshToken, UserProfile};
use crate::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email(message = "Invalid email format"), length(max = 64, message = "Email too long"))]
    pub email: String,
    #[validate(length(min = 8, max = 128, message = "Password must be 8-128 characters"))]
    pub password: String,
    pub password_check: String,
    #[validate(length(min = 1, max = 64, message = "First name must be 1-64 characters"))]
    pub first_name: String,
    #[validate(length(min = 1, max = 64, message = "Last name must be 1-64 characters"))]
    pub last_name: String,
    pub birthdate: Option<NaiveDate>,
    #[validate(length(max = 15))]
    pub sex: Option<String>,
    #[validate(length(max = 15))]
    pub zipcode: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

async fn store_refresh_token(
    db: &SqlitePool,
    user_id: Uuid,
    raw_refresh_token: &str,
    ttl_secs: i64,
    parent_token_id: Option<Uuid>,
) -> AppResult<()> {
    let now = Utc::now();

    sqlx::query(
        r#"
        INSERT INTO refresh_tokens (id, user_id, token_hash, expires_at, parent_token_id, created_at)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(hash_token(raw_refresh_token))
    .bind(now + Duration::seconds(ttl_secs))
    .bind(parent_token_id)
    .bind(now)
    .execute(db)
    .await?;

    Ok(())
}

/// Signs a token pair and records the refresh token hash.
async fn issue_token_pair(
    db: &SqlitePool,
    user_id: Uuid,
    email: &str,
    config: &Config,
    parent_token_id: Option<Uuid>,
) -> AppResult<TokenPair> {
    let tokens = create_token_pair(user_id, email, config)?;
    store_refresh_token(
        db,
        user_id,
        &tokens.refresh_token,
        config.jwt_refresh_ttl_secs,
        parent_token_id,
    )
    .await?;
    Ok(tokens)
}

async fn revoke_all_user_tokens(db: &SqlitePool, user_id: Uuid) -> AppResult<()> {
    sqlx::query(
        "UPDATE refresh_tokens SET revoked = 1, revoked_at = ? WHERE user_id = ? AND revoked = 0",
    )
    .bind(Utc::now())
    .bind(user_id)
    .execute(db)
    .await?;
    Ok(())
}

/// A concurrent registration can pass `email_taken` and still hit the
/// unique index.
fn duplicate_email_as_conflict(err: sqlx::Error) -> AppError {
    match err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            AppError::Conflict("Email already registered".into())
        }
        other => AppError::Database(other),
    }
}

pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> AppResult<Json<TokenPair>> {
    body.validate()?;
    if body.password != body.password_check {
        return Err(AppError::Validation("Passwords do not match".into()));
    }

    if db::users::email_taken(&state.db, &body.email).await? {
        return Err(AppError::Conflict("Email already registered".into()));
    }

    let user = db::users::create_user(
        &state.db,
        &NewUser {
            email: body.email,
            password_hash: hash_password(&body.password)?,
            first_name: body.first_name,
            last_name: body.last_name,
            birthdate: body.birthdate,
            sex: body.sex,
            zipcode: body.zipcode,
        },
    )
    .await
    .map_err(duplicate_email_as_conflict)?;

    tracing::info!(user_id = %user.id, "User registered");

    let tokens = issue_token_pair(&state.db, user.id, &user.email, &state.config, None).await?;
    Ok(Json(tokens))
}

pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> AppResult<Json<TokenPair>> {
    let user = db::users::find_by_email(&state.db, &body.email)
        .await?
        .ok_or(AppError::Unauthorized)?;

    if !verify_password(&body.password, &user.password_hash)? {
        return Err(AppError::Unauthorized);
    }

    let tokens = issue_token_pair(&state.db, user.id, &user.email, &state.config, None).await?;
    Ok(Json(tokens))
}

/// Single-use refresh token rotation. Presenting an already rotated token
/// revokes every token the user holds.
pub async fn refresh(
    State(state): State<AppState>,
    Json(body): Json<RefreshRequest>,
) -> AppResult<Json<TokenPair>> {
    let token_data = verify_token(&body.refresh_token, &state.config)?;

    if token_data.claims.token_type != TokenType::Refresh {
        return Err(AppError::Unauthorized);
    }

    let stored = sqlx::query_as::<_, RefreshToken>(
        r#"
        SELECT id, user_id, token_hash, expires_at, revoked
        FROM refresh_tokens
        WHERE token_hash = ?
        "#,
    )
    .bind(hash_token(&body.refresh_token))
    .fetch_optional(&state.db)
    .await?
    .ok_or(AppError::Unauthorized)?;

    if stored.revoked {
        tracing::warn!(
            user_id = %stored.user_id,
            token_id = %stored.id,
            "Refresh token reuse detected, revoking all tokens for user"
        );
        revoke_all_user_tokens(&state.db, stored.user_id).await?;
        return Err(AppError::Unauthorized);
    }

    if stored.user_id != token_data.claims.sub || stored.expires_at < Utc::now() {
        return Err(AppError::Unauthorized);
    }

    sqlx::query("UPDATE refresh_tokens SET revoked = 1, revoked_at = ? WHERE id = ?")
        .bind(Utc::now())
        .bind(stored.id)
        .execute(&state.db)
        .await?;

    let tokens = issue_token_pair(
        &state.db,
        token_data.claims.sub,
        &token_data.claims.email,
        &state.config,
        Some(stored.id),
    )
    .await?;
    Ok(Json(tokens))
}

pub async fn logout(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<serde_json::Value>> {
    revoke_all_user_tokens(&state.db, auth_user.id).await?;
    tracing::info!(user_id = %auth_user.id, email = %auth_user.email, "User signed out");
    Ok(Json(serde_json::json!({ "message": "Logged out successfully" })))
}

pub async fn me(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<UserProfile>> {
    let user = db::users::find_by_id(&state.db, auth_user.id)
        .await?
        .ok_or(AppError::NotFound("User not found".into()))?;

    Ok(Json(user.into()))
}
