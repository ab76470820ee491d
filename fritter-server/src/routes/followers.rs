use axum::extract::{Path, Query, State};
use diesel::prelude::*;
use serde::Deserialize;
use std::sync::Arc;

use fritter_shared::clients::db::checkout;
use fritter_shared::errors::{AppError, AppResult, ErrorCode};
use fritter_shared::types::auth::AuthUser;
use fritter_shared::types::{ApiResponse, Created, Deleted};
use fritter_shared::middleware::Json;

use crate::services::follower_service::{self, FollowStats};
use crate::services::user_service;
use crate::validation::{parse_id, require_id, Location};
use crate::views::FollowResponse;
use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsQuery {
    pub user_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct FollowRequest {
    pub followee: Option<String>,
}

// --- GET /api/followers ---

pub async fn follow_stats(
    State(state): State<Arc<AppState>>,
    Query(query): Query<StatsQuery>,
) -> AppResult<Json<ApiResponse<FollowStats>>> {
    let user_id = require_id(query.user_id.as_deref(), "userId", Location::Query)?;
    let mut conn = checkout(&state.db)?;
    let stats = follower_service::stats(&mut conn, user_id)?;
    Ok(Json(ApiResponse::ok(stats)))
}

// --- POST /api/followers ---

pub async fn follow(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Json(req): Json<FollowRequest>,
) -> AppResult<Created<FollowResponse>> {
    let followee_id = require_id(req.followee.as_deref(), "followee", Location::Body)?;
    if followee_id == user.id {
        return Err(AppError::new(ErrorCode::CannotFollowSelf, "you cannot follow yourself"));
    }

    let mut conn = checkout(&state.db)?;
    let (row, follower, followee) = conn.transaction::<_, AppError, _>(|conn| {
        let follower = user_service::require_account(conn, user.id)?;
        let followee = user_service::find_by_id(conn, followee_id)?;
        let row = follower_service::follow(conn, follower.id, followee.id)?;
        Ok((row, follower.username, followee.username))
    })?;

    tracing::info!(follower_id = %row.follower_id, followee_id = %row.followee_id, "follow started");

    Ok(Created(ApiResponse::ok_with_message(
        FollowResponse::new(row, follower, followee),
        format!("you are now following {followee_id}"),
    )))
}

// --- DELETE /api/followers/:followee ---

pub async fn unfollow(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(raw_id): Path<String>,
) -> AppResult<Json<ApiResponse<Deleted>>> {
    let followee_id = parse_id(&raw_id, "followee", Location::Params)?;

    let mut conn = checkout(&state.db)?;
    follower_service::unfollow(&mut conn, user.id, followee_id)?;

    tracing::info!(follower_id = %user.id, followee_id = %followee_id, "follow ended");

    Ok(Json(ApiResponse::deleted("your follow was deleted successfully")))
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    use fritter_shared::middleware::{jwt_secret, sign_jwt};
    use fritter_shared::types::auth::Claims;
    use uuid::Uuid;

    use crate::routes::test_support::{bearer, error_code, send};

    #[tokio::test]
    async fn stats_need_a_user_id() {
        let (status, body) = send(Method::GET, "/api/followers", None, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["message"], "field 'userId' not supplied in query string");
    }

    #[tokio::test]
    async fn following_yourself_is_rejected() {
        let me = Uuid::new_v4();
        let token = sign_jwt(&Claims::new(me, "alice", 600), &jwt_secret()).unwrap();
        let (status, body) = send(
            Method::POST,
            "/api/followers",
            Some(&format!("Bearer {token}")),
            Some(json!({ "followee": me })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(error_code(&body), "E5003");
    }

    #[tokio::test]
    async fn follow_requires_valid_followee() {
        let (status, body) = send(Method::POST, "/api/followers", Some(&bearer()), Some(json!({ "followee": "bob" }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(error_code(&body), "E0009");
    }

    #[tokio::test]
    async fn unfollow_requires_sign_in_and_valid_id() {
        let (status, _) = send(Method::DELETE, &format!("/api/followers/{}", Uuid::new_v4()), None, None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        let (status, _) = send(Method::DELETE, "/api/followers/bob", Some(&bearer()), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
