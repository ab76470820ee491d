use diesel::pg::PgConnection;
use diesel::prelude::*;
use uuid::Uuid;

use fritter_shared::errors::{AppError, AppResult, ErrorCode};

use crate::models::{GoodSportScore, NewGoodSportScore};
use crate::schema::good_sport_scores;
use crate::services::sentiment::sentiment_score;

/// Which way a piece of text moves its author's score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreChange {
    Posted,
    Removed,
}

impl ScoreChange {
    pub fn delta(self, content: &str) -> f64 {
        let value = sentiment_score(content);
        match self {
            ScoreChange::Posted => value,
            ScoreChange::Removed => -value,
        }
    }
}

pub fn create_for_user(conn: &mut PgConnection, user_id: Uuid) -> AppResult<GoodSportScore> {
    let score = diesel::insert_into(good_sport_scores::table)
        .values(&NewGoodSportScore { user_id })
        .get_result::<GoodSportScore>(conn)?;
    Ok(score)
}

pub fn find_by_user(conn: &mut PgConnection, user_id: Uuid) -> AppResult<GoodSportScore> {
    good_sport_scores::table
        .filter(good_sport_scores::user_id.eq(user_id))
        .first::<GoodSportScore>(conn)
        .optional()?
        .ok_or_else(|| AppError::new(ErrorCode::ScoreNotFound, "no good sport score for this user"))
}

/// Moves a user's score by the sentiment of `content`.
pub fn apply(conn: &mut PgConnection, user_id: Uuid, change: ScoreChange, content: &str) -> AppResult<()> {
    let delta = change.delta(content);
    if delta == 0.0 {
        return Ok(());
    }

    diesel::update(good_sport_scores::table.filter(good_sport_scores::user_id.eq(user_id)))
        .set(good_sport_scores::score.eq(good_sport_scores::score + delta))
        .execute(conn)?;
    Ok(())
}

/// Replaces the contribution of `old` with that of `new` in one update.
pub fn replace(conn: &mut PgConnection, user_id: Uuid, old: &str, new: &str) -> AppResult<()> {
    let delta = ScoreChange::Posted.delta(new) + ScoreChange::Removed.delta(old);
    if delta == 0.0 {
        return Ok(());
    }

    diesel::update(good_sport_scores::table.filter(good_sport_scores::user_id.eq(user_id)))
        .set(good_sport_scores::score.eq(good_sport_scores::score + delta))
        .execute(conn)?;
    Ok(())
}
