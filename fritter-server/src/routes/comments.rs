use axum::extract::{Path, Query, State};
use diesel::prelude::*;
use serde::Deserialize;
use std::sync::Arc;

use fritter_shared::clients::db::checkout;
use fritter_shared::errors::{AppError, AppResult, ErrorCode};
use fritter_shared::types::auth::AuthUser;
use fritter_shared::types::{ApiResponse, Created, Deleted};
use fritter_shared::middleware::Json;

use crate::services::{cascade, comment_service, parent_service, user_service};
use crate::validation::{parse_id, parse_parent_type, require_id, validate_content, Location};
use crate::views::CommentResponse;
use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentsQuery {
    pub parent_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentRequest {
    pub parent_id: Option<String>,
    pub parent_type: Option<String>,
    pub content: Option<String>,
}

// --- GET /api/comments ---

pub async fn list_comments(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CommentsQuery>,
) -> AppResult<Json<ApiResponse<Vec<CommentResponse>>>> {
    let parent_id = require_id(query.parent_id.as_deref(), "parentId", Location::Query)?;
    let mut conn = checkout(&state.db)?;

    let comments = comment_service::by_parent(&mut conn, parent_id)?
        .into_iter()
        .map(|(comment, author)| CommentResponse::new(comment, author))
        .collect();

    Ok(Json(ApiResponse::ok(comments)))
}

// --- POST /api/comments ---

pub async fn create_comment(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Json(req): Json<CommentRequest>,
) -> AppResult<Created<CommentResponse>> {
    let parent_id = require_id(req.parent_id.as_deref(), "parentId", Location::Body)?;
    let content = validate_content(req.content.as_deref())?;
    let parent_type = parse_parent_type(req.parent_type.as_deref())?;

    let mut conn = checkout(&state.db)?;

    let (comment, author) = conn.transaction::<_, AppError, _>(|conn| {
        let account = user_service::require_account(conn, user.id)?;
        parent_service::require_parent(conn, parent_type, parent_id)?;
        let comment = comment_service::create(conn, account.id, parent_id, parent_type, content)?;
        Ok((comment, account.username))
    })?;

    tracing::info!(
        comment_id = %comment.id,
        parent_id = %parent_id,
        parent_type = %parent_type,
        "comment created"
    );

    Ok(Created(ApiResponse::ok_with_message(
        CommentResponse::new(comment, author),
        "your comment was created successfully",
    )))
}

// --- DELETE /api/comments/:commentId ---

pub async fn delete_comment(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(raw_id): Path<String>,
) -> AppResult<Json<ApiResponse<Deleted>>> {
    let comment_id = parse_id(&raw_id, "commentId", Location::Params)?;
    let mut conn = checkout(&state.db)?;

    let removed = conn.transaction::<_, AppError, _>(|conn| {
        let comment = comment_service::find(conn, comment_id)?;
        if comment.author_id != user.id {
            return Err(AppError::new(
                ErrorCode::NotCommentAuthor,
                "cannot delete other users' comments",
            ));
        }
        cascade::delete_comment(conn, &comment)
    })?;

    tracing::info!(comment_id = %comment_id, removed, "comment deleted");

    Ok(Json(ApiResponse::deleted("your comment was deleted successfully")))
}
