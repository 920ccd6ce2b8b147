use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::auth::jwt::{verify_token, TokenType};
use crate::error::AppError;
use crate::AppState;

#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: String,
}

pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or(AppError::Unauthorized)?;

    let token_data = verify_token(token, &state.config)?;

    if token_data.claims.token_type != TokenType::Access {
        return Err(AppError::Unauthorized);
    }

    req.extensions_mut().insert(AuthUser {
        id: token_data.claims.sub,
        email: token_data.claims.email,
    });
    Ok(next.run(req).await)
}
