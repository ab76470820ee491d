//! Likes and flags: one row per (user, parent), mirrored in the parent's
//! counters.

use diesel::dsl::exists;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use uuid::Uuid;

use fritter_shared::errors::{AppError, AppResult, ErrorCode};

use crate::models::{NewFlag, NewLike, ParentType};
use crate::schema::{flags, likes};
use crate::services::parent_service::{self, Stat};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reaction {
    Like,
    Flag,
}

impl Reaction {
    pub fn noun(self) -> &'static str {
        match self {
            Reaction::Like => "like",
            Reaction::Flag => "flag",
        }
    }

    fn stat(self) -> Stat {
        match self {
            Reaction::Like => Stat::Likes,
            Reaction::Flag => Stat::Flags,
        }
    }

    fn duplicate(self, parent_id: Uuid) -> AppError {
        let code = match self {
            Reaction::Like => ErrorCode::LikeAlreadyExists,
            Reaction::Flag => ErrorCode::FlagAlreadyExists,
        };
        AppError::new(code, format!("you have already {} {parent_id}", self.past_tense()))
    }

    fn missing(self, parent_id: Uuid) -> AppError {
        let code = match self {
            Reaction::Like => ErrorCode::LikeNotFound,
            Reaction::Flag => ErrorCode::FlagNotFound,
        };
        AppError::new(code, format!("you have not {} {parent_id}", self.past_tense()))
    }

    /// Maps a unique violation on (user, parent) to the duplicate error, for
    /// the insert that races past the existence check.
    fn on_conflict(self, parent_id: Uuid) -> impl FnOnce(DieselError) -> AppError {
        move |e| match e {
            DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => self.duplicate(parent_id),
            other => other.into(),
        }
    }

    fn past_tense(self) -> &'static str {
        match self {
            Reaction::Like => "liked",
            Reaction::Flag => "flagged",
        }
    }
}

pub fn exists_for(conn: &mut PgConnection, kind: Reaction, user_id: Uuid, parent_id: Uuid) -> AppResult<bool> {
    let found = match kind {
        Reaction::Like => diesel::select(exists(
            likes::table
                .filter(likes::user_id.eq(user_id))
                .filter(likes::parent_id.eq(parent_id)),
        ))
        .get_result::<bool>(conn)?,
        Reaction::Flag => diesel::select(exists(
            flags::table
                .filter(flags::user_id.eq(user_id))
                .filter(flags::parent_id.eq(parent_id)),
        ))
        .get_result::<bool>(conn)?,
    };
    Ok(found)
}

/// Records the reaction and bumps the parent's counter. Run inside a
/// transaction.
pub fn add(
    conn: &mut PgConnection,
    kind: Reaction,
    user_id: Uuid,
    parent_id: Uuid,
    parent_type: ParentType,
) -> AppResult<()> {
    parent_service::require_parent(conn, parent_type, parent_id)?;
    if exists_for(conn, kind, user_id, parent_id)? {
        return Err(kind.duplicate(parent_id));
    }

    let parent_type_tag = parent_type.to_string();
    match kind {
        Reaction::Like => {
            diesel::insert_into(likes::table)
                .values(&NewLike { user_id, parent_id, parent_type: parent_type_tag })
                .execute(conn)
                .map_err(kind.on_conflict(parent_id))?;
        }
        Reaction::Flag => {
            diesel::insert_into(flags::table)
                .values(&NewFlag { user_id, parent_id, parent_type: parent_type_tag })
                .execute(conn)
                .map_err(kind.on_conflict(parent_id))?;
        }
    }

    parent_service::adjust_stat(conn, parent_type, parent_id, kind.stat(), 1)
}

/// Withdraws the caller's reaction and drops the parent's counter. Returns
/// the parent type the reaction pointed at.
pub fn remove(conn: &mut PgConnection, kind: Reaction, user_id: Uuid, parent_id: Uuid) -> AppResult<ParentType> {
    let removed = match kind {
        Reaction::Like => diesel::delete(
            likes::table
                .filter(likes::user_id.eq(user_id))
                .filter(likes::parent_id.eq(parent_id)),
        )
        .returning(likes::parent_type)
        .get_result::<String>(conn)
        .optional()?,
        Reaction::Flag => diesel::delete(
            flags::table
                .filter(flags::user_id.eq(user_id))
                .filter(flags::parent_id.eq(parent_id)),
        )
        .returning(flags::parent_type)
        .get_result::<String>(conn)
        .optional()?,
    };

    let raw = removed.ok_or_else(|| kind.missing(parent_id))?;
    let parent_type = parent_service::stored_parent_type(&raw)?;
    parent_service::adjust_stat(conn, parent_type, parent_id, kind.stat(), -1)?;
    Ok(parent_type)
}
