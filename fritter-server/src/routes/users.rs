use axum::extract::{Path, State};
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

use fritter_shared::clients::db::checkout;
use fritter_shared::errors::{AppError, AppResult, ErrorCode};
use fritter_shared::types::auth::AuthUser;
use fritter_shared::types::{ApiResponse, Created, Deleted};
use fritter_shared::middleware::Json;

use crate::models::{NewUser, UpdateUser, User};
use crate::schema::users;
use crate::services::auth_service::{self, validate_username_chars};
use crate::services::{cascade, freet_service, score_service, user_service};
use crate::validation::{require, Location};
use crate::views::{FreetResponse, UserResponse};
use crate::AppState;

use super::session::{start_session, SessionResponse};

#[derive(Debug, Deserialize, Validate)]
pub struct AccountRequest {
    #[validate(
        length(min = 1, max = 32, message = "username must be between 1 and 32 characters"),
        custom(function = "validate_username_chars", message = "username must be letters, numbers and underscores")
    )]
    pub username: Option<String>,
    pub password: Option<String>,
}

impl AccountRequest {
    fn check(&self) -> AppResult<()> {
        self.validate().map_err(|e| {
            let details = serde_json::to_value(e.field_errors()).unwrap_or_default();
            AppError::with_details(ErrorCode::InvalidUsername, e.to_string(), details)
        })?;
        if let Some(password) = &self.password {
            auth_service::validate_password(password)?;
        }
        Ok(())
    }
}

fn username_taken(username: &str) -> AppError {
    AppError::new(
        ErrorCode::UsernameTaken,
        format!("an account with username '{username}' already exists"),
    )
}

/// Maps a unique violation on `users.username` to the domain error.
fn unique_username(username: &str) -> impl FnOnce(DieselError) -> AppError + '_ {
    move |e| match e {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => username_taken(username),
        other => other.into(),
    }
}

// --- POST /api/users ---

pub async fn create_user(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AccountRequest>,
) -> AppResult<Created<SessionResponse>> {
    let username = require(req.username.as_deref(), "username", Location::Body)?;
    let password = require(req.password.as_deref(), "password", Location::Body)?;
    req.check()?;

    let password_hash = auth_service::hash_password(password)?;
    let mut conn = checkout(&state.db)?;

    let (account, tokens) = conn.transaction::<_, AppError, _>(|conn| {
        if user_service::username_taken(conn, username)? {
            return Err(username_taken(username));
        }

        let account = diesel::insert_into(users::table)
            .values(&NewUser {
                username: username.to_string(),
                password_hash,
            })
            .returning(User::as_returning())
            .get_result::<User>(conn)
            .map_err(unique_username(username))?;

        score_service::create_for_user(conn, account.id)?;
        let tokens = start_session(conn, &state.config, &account)?;
        Ok((account, tokens))
    })?;

    tracing::info!(user_id = %account.id, username = %account.username, "account created");

    let message = format!(
        "your account was created successfully. you have been logged in as {}",
        account.username
    );
    Ok(Created(ApiResponse::ok_with_message(
        SessionResponse {
            user: UserResponse::from(account),
            tokens,
        },
        message,
    )))
}

// --- PUT /api/users ---

pub async fn update_user(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Json(req): Json<AccountRequest>,
) -> AppResult<Json<ApiResponse<UserResponse>>> {
    req.check()?;

    let password_hash = req
        .password
        .as_deref()
        .map(auth_service::hash_password)
        .transpose()?;

    let mut conn = checkout(&state.db)?;

    let account = conn.transaction::<_, AppError, _>(|conn| {
        let current = user_service::require_account(conn, user.id)?;

        let username = req.username.as_deref().filter(|name| *name != current.username);
        if let Some(name) = username {
            if user_service::username_taken(conn, name)? {
                return Err(username_taken(name));
            }
        }

        let changes = UpdateUser {
            username: username.map(str::to_string),
            password_hash,
        };
        if changes.username.is_none() && changes.password_hash.is_none() {
            return Ok(current);
        }

        let updated = diesel::update(users::table.find(current.id))
            .set(&changes)
            .returning(User::as_returning())
            .get_result::<User>(conn)
            .map_err(unique_username(username.unwrap_or_default()))?;
        Ok(updated)
    })?;

    tracing::info!(user_id = %account.id, "account updated");

    Ok(Json(ApiResponse::ok_with_message(
        UserResponse::from(account),
        "your profile was updated successfully",
    )))
}

// --- DELETE /api/users ---

pub async fn delete_user(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<ApiResponse<Deleted>>> {
    let mut conn = checkout(&state.db)?;

    conn.transaction::<_, AppError, _>(|conn| {
        user_service::require_account(conn, user.id)?;
        cascade::delete_account(conn, user.id)
    })?;

    Ok(Json(ApiResponse::deleted("your account has been deleted successfully")))
}

// --- GET /api/users/:username/freets ---

pub async fn freets_by_username(
    State(state): State<Arc<AppState>>,
    Path(username): Path<String>,
) -> AppResult<Json<ApiResponse<Vec<FreetResponse>>>> {
    let mut conn = checkout(&state.db)?;

    let author = user_service::find_by_username(&mut conn, &username)?;
    let rows = freet_service::by_author(&mut conn, author.id)?;

    Ok(Json(ApiResponse::ok(FreetResponse::list(rows))))
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    use crate::routes::test_support::{error_code, send};

    #[tokio::test]
    async fn create_requires_username() {
        let (status, body) = send(Method::POST, "/api/users", None, Some(json!({ "password": "hunter22" }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(error_code(&body), "E0008");
    }

    #[tokio::test]
    async fn create_rejects_bad_usernames() {
        let long = "a".repeat(33);
        for name in ["has space", "émile", long.as_str()] {
            let (status, body) = send(
                Method::POST,
                "/api/users",
                None,
                Some(json!({ "username": name, "password": "hunter22" })),
            )
            .await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{name}");
            assert_eq!(error_code(&body), "E1003");
        }
    }

    #[tokio::test]
    async fn create_rejects_weak_passwords() {
        let (status, body) = send(
            Method::POST,
            "/api/users",
            None,
            Some(json!({ "username": "alice", "password": "short1" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(error_code(&body), "E1004");
    }

    #[tokio::test]
    async fn update_and_delete_require_sign_in() {
        let (status, _) = send(Method::PUT, "/api/users", None, Some(json!({ "username": "bob" }))).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        let (status, _) = send(Method::DELETE, "/api/users", None, None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }
}
