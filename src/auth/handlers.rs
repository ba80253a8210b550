use axum::{extract::State, http::StatusCode, Json};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, instrument};

use crate::auth::dto::{AuthResponse, LoginRequest, RefreshRequest, RegisterRequest, TokenResponse, UserOut};
use crate::auth::jwt::JwtKeys;
use crate::auth::password::{hash_password, verify_password};
use crate::auth::repo::User;
use crate::error::ApiError;
use crate::state::AppState;

const MIN_PASSWORD_LEN: usize = 8;

fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

#[instrument(skip(state, body))]
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    let email = body.email.trim().to_lowercase();
    if !is_valid_email(&email) {
        return Err(ApiError::InvalidInput("invalid email address".into()));
    }
    if body.password.len() < MIN_PASSWORD_LEN {
        return Err(ApiError::InvalidInput(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }

    if User::find_by_email(&state.db, &email).await?.is_some() {
        return Err(ApiError::Conflict("email already registered".into()));
    }

    let hash = hash_password(&body.password)?;
    let user = User::create(&state.db, &email, &hash).await?;
    info!(user_id = %user.id, "user registered");

    let response = issue_tokens(&state, user)?;
    Ok((StatusCode::CREATED, Json(response)))
}

#[instrument(skip(state, body))]
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let email = body.email.trim().to_lowercase();
    let user = User::find_by_email(&state.db, &email)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("invalid email or password".into()))?;

    if !verify_password(&body.password, &user.password_hash)? {
        return Err(ApiError::Unauthorized("invalid email or password".into()));
    }

    let response = issue_tokens(&state, user)?;
    Ok(Json(response))
}

#[instrument(skip(state, body))]
pub async fn refresh(
    State(state): State<AppState>,
    Json(body): Json<RefreshRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let keys = JwtKeys::from_config(&state.config.jwt);
    let claims = keys
        .verify_refresh(&body.refresh_token)
        .map_err(|_| ApiError::Unauthorized("invalid refresh token".into()))?;

    // The account may have been removed since the token was issued.
    User::find_by_id(&state.db, claims.sub)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("invalid refresh token".into()))?;

    Ok(Json(TokenResponse {
        access_token: keys.sign_access(claims.sub)?,
        refresh_token: keys.sign_refresh(claims.sub)?,
        expires_in: keys.access_ttl.as_secs(),
    }))
}

fn issue_tokens(state: &AppState, user: User) -> Result<AuthResponse, ApiError> {
    let keys = JwtKeys::from_config(&state.config.jwt);
    Ok(AuthResponse {
        access_token: keys.sign_access(user.id)?,
        refresh_token: keys.sign_refresh(user.id)?,
        expires_in: keys.access_ttl.as_secs(),
        user: UserOut {
            id: user.id,
            email: user.email,
            created_at: user.created_at,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_validation() {
        assert!(is_valid_email("someone@example.com"));
        assert!(is_valid_email("a.b+c@sub.example.co"));
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("missing@tld"));
        assert!(!is_valid_email("spaces in@example.com"));
    }
}
