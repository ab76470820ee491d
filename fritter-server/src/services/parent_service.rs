use diesel::dsl::exists;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use uuid::Uuid;

use fritter_shared::errors::{AppError, AppResult, ErrorCode};

use crate::models::ParentType;
use crate::schema::{comments, freets};

/// Counters kept on freets and comments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stat {
    Likes,
    Comments,
    Flags,
}

pub fn parent_exists(conn: &mut PgConnection, parent_type: ParentType, parent_id: Uuid) -> AppResult<bool> {
    let found = match parent_type {
        ParentType::Freet => diesel::select(exists(freets::table.find(parent_id))).get_result::<bool>(conn)?,
        ParentType::Comment => diesel::select(exists(comments::table.find(parent_id))).get_result::<bool>(conn)?,
    };
    Ok(found)
}

pub fn require_parent(conn: &mut PgConnection, parent_type: ParentType, parent_id: Uuid) -> AppResult<()> {
    if parent_exists(conn, parent_type, parent_id)? {
        Ok(())
    } else {
        Err(AppError::new(
            ErrorCode::ParentNotFound,
            format!("parentId '{parent_id}' does not exist with parentType '{parent_type}'"),
        ))
    }
}

/// Adds `delta` to one counter on the parent. Comments carry no comment
/// counter, so `Stat::Comments` on a comment parent is a no-op.
pub fn adjust_stat(
    conn: &mut PgConnection,
    parent_type: ParentType,
    parent_id: Uuid,
    stat: Stat,
    delta: i32,
) -> AppResult<()> {
    match (parent_type, stat) {
        (ParentType::Freet, Stat::Likes) => {
            diesel::update(freets::table.find(parent_id))
                .set(freets::likes.eq(freets::likes + delta))
                .execute(conn)?;
        }
        (ParentType::Freet, Stat::Comments) => {
            diesel::update(freets::table.find(parent_id))
                .set(freets::comments.eq(freets::comments + delta))
                .execute(conn)?;
        }
        (ParentType::Freet, Stat::Flags) => {
            diesel::update(freets::table.find(parent_id))
                .set(freets::flags.eq(freets::flags + delta))
                .execute(conn)?;
        }
        (ParentType::Comment, Stat::Likes) => {
            diesel::update(comments::table.find(parent_id))
                .set(comments::likes.eq(comments::likes + delta))
                .execute(conn)?;
        }
        (ParentType::Comment, Stat::Flags) => {
            diesel::update(comments::table.find(parent_id))
                .set(comments::flags.eq(comments::flags + delta))
                .execute(conn)?;
        }
        (ParentType::Comment, Stat::Comments) => {}
    }
    Ok(())
}

/// Parses a stored `parent_type` column. Rows only ever hold the two tags,
/// so anything else is data corruption.
pub fn stored_parent_type(raw: &str) -> AppResult<ParentType> {
    raw.parse::<ParentType>()
        .map_err(|e| AppError::internal(format!("corrupt parent_type column: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::comment_service;
    use crate::services::test_db::{self, db_or_skip};

    #[test]
    fn stored_parent_type_accepts_both_tags() {
        assert_eq!(stored_parent_type("freet").unwrap(), ParentType::Freet);
        assert_eq!(stored_parent_type("comment").unwrap(), ParentType::Comment);
    }

    #[test]
    fn stored_parent_type_rejects_garbage_as_internal() {
        let err = stored_parent_type("tweet").unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::InternalError));
    }

    #[test]
    fn parents_must_exist_under_their_own_type() {
        let mut conn = db_or_skip!();
        let alice = test_db::user(&mut conn, "alice");
        let freet = test_db::freet(&mut conn, &alice, "first freet");
        let comment = comment_service::create(&mut conn, alice.id, freet.id, ParentType::Freet, "reply").unwrap();

        require_parent(&mut conn, ParentType::Freet, freet.id).unwrap();
        require_parent(&mut conn, ParentType::Comment, comment.id).unwrap();

        let err = require_parent(&mut conn, ParentType::Comment, freet.id).unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::ParentNotFound));
        let err = require_parent(&mut conn, ParentType::Freet, Uuid::new_v4()).unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::ParentNotFound));
    }

    #[test]
    fn comments_have_no_comment_counter() {
        let mut conn = db_or_skip!();
        let alice = test_db::user(&mut conn, "alice");
        let freet = test_db::freet(&mut conn, &alice, "first freet");
        let comment = comment_service::create(&mut conn, alice.id, freet.id, ParentType::Freet, "reply").unwrap();

        adjust_stat(&mut conn, ParentType::Comment, comment.id, Stat::Comments, 1).unwrap();
        adjust_stat(&mut conn, ParentType::Comment, comment.id, Stat::Likes, 3).unwrap();
        let reloaded = comment_service::find(&mut conn, comment.id).unwrap();
        assert_eq!((reloaded.likes, reloaded.flags), (3, 0));
        assert_eq!(test_db::reload_freet(&mut conn, freet.id).comments, 1);
    }
}
