//! `/api/likes` and `/api/flags` share one implementation.

use axum::extract::{Path, Query, State};
use diesel::prelude::*;
use serde::Deserialize;
use std::sync::Arc;

use fritter_shared::clients::db::checkout;
use fritter_shared::errors::{AppError, AppResult};
use fritter_shared::types::auth::AuthUser;
use fritter_shared::types::{ApiResponse, Created, Deleted, Exists};
use fritter_shared::middleware::Json;

use crate::services::reaction_service::{self, Reaction};
use crate::services::user_service;
use crate::validation::{parse_id, parse_parent_type, require_id, Location};
use crate::views::ReactionResponse;
use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReactionQuery {
    pub parent_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReactionRequest {
    pub parent_id: Option<String>,
    pub parent_type: Option<String>,
}

async fn check(
    kind: Reaction,
    user: AuthUser,
    state: Arc<AppState>,
    query: ReactionQuery,
) -> AppResult<Json<ApiResponse<Exists>>> {
    let parent_id = require_id(query.parent_id.as_deref(), "parentId", Location::Query)?;
    let mut conn = checkout(&state.db)?;
    let exists = reaction_service::exists_for(&mut conn, kind, user.id, parent_id)?;
    Ok(Json(ApiResponse::ok(Exists { exists })))
}

async fn add(
    kind: Reaction,
    user: AuthUser,
    state: Arc<AppState>,
    req: ReactionRequest,
) -> AppResult<Created<ReactionResponse>> {
    let parent_id = require_id(req.parent_id.as_deref(), "parentId", Location::Body)?;
    let parent_type = parse_parent_type(req.parent_type.as_deref())?;

    let mut conn = checkout(&state.db)?;
    conn.transaction::<_, AppError, _>(|conn| {
        user_service::require_account(conn, user.id)?;
        reaction_service::add(conn, kind, user.id, parent_id, parent_type)
    })?;

    tracing::info!(user_id = %user.id, parent_id = %parent_id, kind = kind.noun(), "reaction added");

    Ok(Created(ApiResponse::ok_with_message(
        ReactionResponse {
            user_id: user.id,
            parent_id,
            parent_type,
        },
        format!("your {} was added successfully", kind.noun()),
    )))
}

async fn remove(
    kind: Reaction,
    user: AuthUser,
    state: Arc<AppState>,
    raw_id: String,
) -> AppResult<Json<ApiResponse<Deleted>>> {
    let parent_id = parse_id(&raw_id, "parentId", Location::Params)?;

    let mut conn = checkout(&state.db)?;
    let parent_type = conn.transaction::<_, AppError, _>(|conn| {
        reaction_service::remove(conn, kind, user.id, parent_id)
    })?;

    tracing::info!(
        user_id = %user.id,
        parent_id = %parent_id,
        parent_type = %parent_type,
        kind = kind.noun(),
        "reaction removed"
    );

    Ok(Json(ApiResponse::deleted(format!("your {} was removed successfully", kind.noun()))))
}

// --- /api/likes ---

pub async fn like_exists(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Query(query): Query<ReactionQuery>,
) -> AppResult<Json<ApiResponse<Exists>>> {
    check(Reaction::Like, user, state, query).await
}

pub async fn add_like(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Json(req): Json<ReactionRequest>,
) -> AppResult<Created<ReactionResponse>> {
    add(Reaction::Like, user, state, req).await
}

pub async fn remove_like(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(raw_id): Path<String>,
) -> AppResult<Json<ApiResponse<Deleted>>> {
    remove(Reaction::Like, user, state, raw_id).await
}

// --- /api/flags ---

pub async fn flag_exists(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Query(query): Query<ReactionQuery>,
) -> AppResult<Json<ApiResponse<Exists>>> {
    check(Reaction::Flag, user, state, query).await
}

pub async fn add_flag(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Json(req): Json<ReactionRequest>,
) -> AppResult<Created<ReactionResponse>> {
    add(Reaction::Flag, user, state, req).await
}

pub async fn remove_flag(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(raw_id): Path<String>,
) -> AppResult<Json<ApiResponse<Deleted>>> {
    remove(Reaction::Flag, user, state, raw_id).await
}
