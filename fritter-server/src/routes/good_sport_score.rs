use axum::extract::State;
use axum::Json;
use std::sync::Arc;

use fritter_shared::clients::db::checkout;
use fritter_shared::errors::AppResult;
use fritter_shared::types::auth::AuthUser;
use fritter_shared::types::ApiResponse;

use crate::services::score_service;
use crate::views::ScoreResponse;
use crate::AppState;

// --- GET /api/goodsportscore ---

pub async fn get_score(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<ApiResponse<ScoreResponse>>> {
    let mut conn = checkout(&state.db)?;
    let score = score_service::find_by_user(&mut conn, user.id)?;
    Ok(Json(ApiResponse::ok(ScoreResponse::from(score))))
}
