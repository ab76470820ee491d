use axum::extract::{Path, Query, State};
use axum::response::{IntoResponse, Response};
use chrono::Utc;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use fritter_shared::clients::db::checkout;
use fritter_shared::errors::{AppError, AppResult, ErrorCode};
use fritter_shared::types::auth::AuthUser;
use fritter_shared::types::{ApiResponse, Created, Deleted};
use fritter_shared::middleware::Json;

use crate::models::{Freet, NewFreet};
use crate::schema::freets;
use crate::services::freet_service::{self, FeedScope, FreetWithAuthor};
use crate::services::score_service::{self, ScoreChange};
use crate::services::{cascade, user_service};
use crate::validation::{parse_id, validate_content, Location};
use crate::views::FreetResponse;
use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FreetsQuery {
    pub author: Option<String>,
    pub freet_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineQuery {
    pub author_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct FreetRequest {
    pub content: Option<String>,
}

fn existing(conn: &mut PgConnection, freet_id: Uuid) -> AppResult<FreetWithAuthor> {
    freet_service::find(conn, freet_id)?.ok_or_else(|| {
        AppError::new(
            ErrorCode::FreetNotFound,
            format!("freet with freet ID {freet_id} does not exist"),
        )
    })
}

fn ensure_author(user: &AuthUser, freet: &Freet) -> AppResult<()> {
    if freet.author_id != user.id {
        return Err(AppError::new(
            ErrorCode::NotFreetAuthor,
            "cannot modify other users' freets",
        ));
    }
    Ok(())
}

// --- GET /api/freets ---

pub async fn list_freets(
    State(state): State<Arc<AppState>>,
    Query(query): Query<FreetsQuery>,
) -> AppResult<Response> {
    let author = query.author.as_deref().filter(|value| !value.is_empty());
    let freet_id = query.freet_id.as_deref().filter(|value| !value.is_empty());

    if let Some(username) = author {
        let mut conn = checkout(&state.db)?;
        let author = user_service::find_by_username(&mut conn, username)?;
        let rows = freet_service::by_author(&mut conn, author.id)?;
        return Ok(Json(ApiResponse::ok(FreetResponse::list(rows))).into_response());
    }

    if let Some(raw) = freet_id {
        let freet_id = parse_id(raw, "freetId", Location::Query)?;
        let mut conn = checkout(&state.db)?;
        let (freet, author) = existing(&mut conn, freet_id)?;
        return Ok(Json(ApiResponse::ok(FreetResponse::new(freet, author))).into_response());
    }

    let mut conn = checkout(&state.db)?;
    let rows = freet_service::all(&mut conn)?;
    Ok(Json(ApiResponse::ok(FreetResponse::list(rows))).into_response())
}

// --- GET /api/freets/feed, /api/freets/explore ---

async fn timeline(
    user: AuthUser,
    state: Arc<AppState>,
    query: TimelineQuery,
    scope: FeedScope,
) -> AppResult<Json<ApiResponse<Vec<FreetResponse>>>> {
    let author = query
        .author_id
        .as_deref()
        .filter(|raw| !raw.is_empty())
        .map(|raw| parse_id(raw, "authorId", Location::Query))
        .transpose()?;

    let mut conn = checkout(&state.db)?;
    let rows = freet_service::timeline(&mut conn, user.id, scope, author)?;

    tracing::debug!(user_id = %user.id, ?scope, count = rows.len(), "timeline loaded");

    Ok(Json(ApiResponse::ok(FreetResponse::list(rows))))
}

pub async fn feed(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Query(query): Query<TimelineQuery>,
) -> AppResult<Json<ApiResponse<Vec<FreetResponse>>>> {
    timeline(user, state, query, FeedScope::Following).await
}

pub async fn explore(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Query(query): Query<TimelineQuery>,
) -> AppResult<Json<ApiResponse<Vec<FreetResponse>>>> {
    timeline(user, state, query, FeedScope::Explore).await
}

// --- GET /api/freets/memories ---

pub async fn memories(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<ApiResponse<Vec<FreetResponse>>>> {
    let mut conn = checkout(&state.db)?;
    let rows = freet_service::memories(&mut conn, user.id, Utc::now())?;
    Ok(Json(ApiResponse::ok(FreetResponse::list(rows))))
}

// --- POST /api/freets ---

pub async fn create_freet(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Json(req): Json<FreetRequest>,
) -> AppResult<Created<FreetResponse>> {
    let content = validate_content(req.content.as_deref())?;
    let mut conn = checkout(&state.db)?;

    let (freet, author) = conn.transaction::<_, AppError, _>(|conn| {
        let account = user_service::require_account(conn, user.id)?;

        let freet = diesel::insert_into(freets::table)
            .values(&NewFreet {
                author_id: account.id,
                content: content.to_string(),
            })
            .returning(Freet::as_returning())
            .get_result::<Freet>(conn)?;

        score_service::apply(conn, account.id, ScoreChange::Posted, content)?;
        Ok((freet, account.username))
    })?;

    tracing::info!(freet_id = %freet.id, author_id = %freet.author_id, "freet created");

    Ok(Created(ApiResponse::ok_with_message(
        FreetResponse::new(freet, author),
        "your freet was created successfully",
    )))
}

// --- PUT /api/freets/:freetId ---

pub async fn update_freet(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(raw_id): Path<String>,
    Json(req): Json<FreetRequest>,
) -> AppResult<Json<ApiResponse<FreetResponse>>> {
    let freet_id = parse_id(&raw_id, "freetId", Location::Params)?;
    let mut conn = checkout(&state.db)?;

    let (freet, author) = conn.transaction::<_, AppError, _>(|conn| {
        let (current, author) = existing(conn, freet_id)?;
        ensure_author(&user, &current)?;
        let content = validate_content(req.content.as_deref())?;

        let updated = diesel::update(freets::table.find(current.id))
            .set((
                freets::content.eq(content),
                freets::date_modified.eq(Utc::now()),
            ))
            .returning(Freet::as_returning())
            .get_result::<Freet>(conn)?;

        score_service::replace(conn, current.author_id, &current.content, &updated.content)?;
        Ok((updated, author))
    })?;

    tracing::info!(freet_id = %freet.id, "freet updated");

    Ok(Json(ApiResponse::ok_with_message(
        FreetResponse::new(freet, author),
        "your freet was updated successfully",
    )))
}

// --- DELETE /api/freets/:freetId ---

pub async fn delete_freet(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(raw_id): Path<String>,
) -> AppResult<Json<ApiResponse<Deleted>>> {
    let freet_id = parse_id(&raw_id, "freetId", Location::Params)?;
    let mut conn = checkout(&state.db)?;

    let removed_comments = conn.transaction::<_, AppError, _>(|conn| {
        let (freet, _) = existing(conn, freet_id)?;
        ensure_author(&user, &freet)?;
        cascade::delete_freet(conn, &freet)
    })?;

    tracing::info!(freet_id = %freet_id, removed_comments, "freet deleted");

    Ok(Json(ApiResponse::deleted("your freet was deleted successfully")))
}
