use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, TokenData, Validation};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::config::Config;
use crate::error::{AppError, AppResult};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub exp: i64,
    pub iat: i64,
    pub token_type: TokenType,
    #[serde(default)]
    pub jti: Option<Uuid>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

#[derive(Debug, Serialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
}

fn sign(
    user_id: Uuid,
    email: &str,
    token_type: TokenType,
    ttl_secs: i64,
    config: &Config,
) -> AppResult<String> {
    let now = Utc::now();
    // Refresh tokens carry a unique id so two issued in the same second differ
    let jti = match token_type {
        TokenType::Refresh => Some(Uuid::new_v4()),
        TokenType::Access => None,
    };
    let claims = Claims {
        sub: user_id,
        email: email.to_string(),
        exp: (now + Duration::seconds(ttl_secs)).timestamp(),
        iat: now.timestamp(),
        token_type,
        jti,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to sign token: {}", e)))
}

pub fn create_token_pair(user_id: Uuid, email: &str, config: &Config) -> AppResult<TokenPair> {
    let access_token = sign(user_id, email, TokenType::Access, config.jwt_access_ttl_secs, config)?;
    let refresh_token = sign(user_id, email, TokenType::Refresh, config.jwt_refresh_ttl_secs, config)?;

    Ok(TokenPair {
        access_token,
        refresh_token,
        expires_in: config.jwt_access_ttl_secs,
    })
}

/// SHA-256 of a raw token as lowercase hex; only the hash is stored.
pub fn hash_token(raw_token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(raw_token.as_bytes());
    format!("{:x}", hasher.finalize())
}

pub fn verify_token(token: &str, config: &Config) -> AppResult<TokenData<Claims>> {
    let mut validation = Validation::default();
    validation.validate_exp = true;

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
        &validation,
    )
    .map_err(|_| AppError::Unauthorized)
}
