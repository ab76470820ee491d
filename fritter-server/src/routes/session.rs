use axum::extract::State;
use chrono::{Duration, Utc};
use diesel::pg::PgConnection;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use fritter_shared::clients::db::checkout;
use fritter_shared::errors::{AppError, AppResult, ErrorCode};
use fritter_shared::middleware::OptionalAuthUser;
use fritter_shared::types::auth::{AuthUser, TokenPair};
use fritter_shared::types::ApiResponse;
use fritter_shared::middleware::Json;

use crate::config::AppConfig;
use crate::models::{NewRefreshToken, RefreshToken, User};
use crate::schema::refresh_tokens;
use crate::services::{auth_service, token_service, user_service};
use crate::validation::{require, Location};
use crate::views::UserResponse;
use crate::AppState;

/// A signed-in user together with fresh credentials.
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub user: UserResponse,
    pub tokens: TokenPair,
}

/// Issues an access token and stores the hash of a new refresh token.
pub(crate) fn start_session(conn: &mut PgConnection, config: &AppConfig, user: &User) -> AppResult<TokenPair> {
    let (token_pair, refresh_hash) = token_service::create_token_pair(
        user.id,
        &user.username,
        &config.jwt_secret,
        config.jwt_access_ttl,
    )?;

    diesel::insert_into(refresh_tokens::table)
        .values(&NewRefreshToken {
            user_id: user.id,
            token_hash: refresh_hash,
            expires_at: Utc::now() + Duration::seconds(config.jwt_refresh_ttl),
        })
        .execute(conn)?;

    Ok(token_pair)
}

// --- GET /api/users/session ---

pub async fn current_user(
    OptionalAuthUser(user): OptionalAuthUser,
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<ApiResponse<Option<UserResponse>>>> {
    let Some(user) = user else {
        return Ok(Json(ApiResponse::ok(None)));
    };

    let mut conn = checkout(&state.db)?;
    let account = match user_service::find_by_id(&mut conn, user.id) {
        Ok(account) => Some(UserResponse::from(account)),
        Err(e) if e.code() == Some(ErrorCode::UserNotFound) => None,
        Err(e) => return Err(e),
    };

    Ok(Json(ApiResponse::ok(account)))
}

// --- POST /api/users/session ---

#[derive(Debug, Deserialize)]
pub struct SignInRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

pub async fn sign_in(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SignInRequest>,
) -> AppResult<Json<ApiResponse<SessionResponse>>> {
    let username = require(req.username.as_deref(), "username", Location::Body)?;
    let password = require(req.password.as_deref(), "password", Location::Body)?;

    let mut conn = checkout(&state.db)?;

    let account = user_service::find_by_username(&mut conn, username).map_err(unknown_user_as_bad_credentials)?;

    if !auth_service::verify_password(password, &account.password_hash)? {
        return Err(invalid_credentials());
    }

    let tokens = start_session(&mut conn, &state.config, &account)?;

    tracing::info!(user_id = %account.id, "signed in");

    let message = format!("you have been logged in as {}", account.username);
    Ok(Json(ApiResponse::ok_with_message(
        SessionResponse {
            user: UserResponse::from(account),
            tokens,
        },
        message,
    )))
}

fn invalid_credentials() -> AppError {
    AppError::new(ErrorCode::InvalidCredentials, "incorrect username or password")
}

/// An unknown username reads as bad credentials; anything else is a real failure.
fn unknown_user_as_bad_credentials(err: AppError) -> AppError {
    match err.code() {
        Some(ErrorCode::UserNotFound) => invalid_credentials(),
        _ => err,
    }
}

// --- POST /api/users/session/refresh ---

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: Option<String>,
}

pub async fn refresh(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RefreshRequest>,
) -> AppResult<Json<ApiResponse<TokenPair>>> {
    let presented = require(req.refresh_token.as_deref(), "refresh_token", Location::Body)?;
    let token_hash = token_service::hash_token(presented);

    let mut conn = checkout(&state.db)?;

    let tokens = conn.transaction::<_, AppError, _>(|conn| {
        let stored = refresh_tokens::table
            .filter(refresh_tokens::token_hash.eq(&token_hash))
            .select(RefreshToken::as_select())
            .first::<RefreshToken>(conn)
            .optional()?
            .ok_or_else(|| AppError::new(ErrorCode::TokenInvalid, "invalid refresh token"))?;

        if stored.revoked {
            return Err(AppError::new(ErrorCode::RefreshTokenRevoked, "refresh token has been revoked"));
        }
        if stored.expires_at < Utc::now() {
            return Err(AppError::new(ErrorCode::TokenExpired, "refresh token expired"));
        }

        diesel::update(refresh_tokens::table.find(stored.id))
            .set(refresh_tokens::revoked.eq(true))
            .execute(conn)?;

        let account = user_service::require_account(conn, stored.user_id)?;
        start_session(conn, &state.config, &account)
    })?;

    Ok(Json(ApiResponse::ok(tokens)))
}

// --- DELETE /api/users/session ---

pub async fn sign_out(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<ApiResponse<&'static str>>> {
    let mut conn = checkout(&state.db)?;

    let revoked = diesel::update(
        refresh_tokens::table
            .filter(refresh_tokens::user_id.eq(user.id))
            .filter(refresh_tokens::revoked.eq(false)),
    )
    .set(refresh_tokens::revoked.eq(true))
    .execute(&mut conn)?;

    tracing::info!(user_id = %user.id, revoked, "signed out");

    Ok(Json(ApiResponse::ok_with_message("logged out", "you have been logged out successfully")))
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};

    use fritter_shared::errors::{AppError, ErrorCode};

    use super::unknown_user_as_bad_credentials;
    use crate::routes::test_support::{bearer, error_code, send};

    #[test]
    fn unknown_user_reads_as_bad_credentials() {
        let err = unknown_user_as_bad_credentials(AppError::new(ErrorCode::UserNotFound, "no such user"));
        assert_eq!(err.code(), Some(ErrorCode::InvalidCredentials));
    }

    #[test]
    fn lookup_failures_are_not_bad_credentials() {
        let err = unknown_user_as_bad_credentials(AppError::internal("db pool error"));
        assert_eq!(err.code(), Some(ErrorCode::InternalError));

        let err = unknown_user_as_bad_credentials(AppError::from(diesel::result::Error::BrokenTransactionManager));
        assert!(matches!(err, AppError::Database(_)));
    }

    #[tokio::test]
    async fn sign_in_rejects_mistyped_fields() {
        let (status, body) = send(
            Method::POST,
            "/api/users/session",
            None,
            Some(serde_json::json!({ "username": "alice", "password": 12345678 })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(error_code(&body), "E0002");
    }

    #[tokio::test]
    async fn session_is_null_when_signed_out() {
        let (status, body) = send(Method::GET, "/api/users/session", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert!(body["data"].is_null());
    }

    #[tokio::test]
    async fn sign_in_requires_both_fields() {
        let (status, body) = send(
            Method::POST,
            "/api/users/session",
            None,
            Some(serde_json::json!({ "username": "alice" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(error_code(&body), "E0008");
        assert_eq!(body["error"]["message"], "field 'password' not supplied in request body");
    }

    #[tokio::test]
    async fn refresh_requires_a_token() {
        let (status, _) = send(
            Method::POST,
            "/api/users/session/refresh",
            None,
            Some(serde_json::json!({ "refresh_token": "" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn sign_out_requires_sign_in() {
        let (status, body) = send(Method::DELETE, "/api/users/session", None, None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(error_code(&body), "E0004");
    }

    #[tokio::test]
    async fn garbage_bearer_is_rejected() {
        let (status, _) = send(Method::DELETE, "/api/users/session", Some("Bearer nonsense"), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        // a well-formed token passes the extractor and only then needs the database
        let (status, _) = send(Method::DELETE, "/api/users/session", Some(&bearer()), None).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
