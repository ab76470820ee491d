use diesel::pg::PgConnection;
use diesel::prelude::*;
use uuid::Uuid;

use fritter_shared::errors::{AppError, AppResult, ErrorCode};

use crate::models::{Comment, NewComment, ParentType};
use crate::schema::{comments, users};
use crate::services::parent_service::{self, Stat};
use crate::services::score_service::{self, ScoreChange};

/// A comment and its author's username.
pub type CommentWithAuthor = (Comment, String);

pub fn by_parent(conn: &mut PgConnection, parent_id: Uuid) -> AppResult<Vec<CommentWithAuthor>> {
    let rows = comments::table
        .inner_join(users::table)
        .filter(comments::parent_id.eq(parent_id))
        .select((Comment::as_select(), users::username))
        .order(comments::date_created.desc())
        .load::<CommentWithAuthor>(conn)?;
    Ok(rows)
}

pub fn find(conn: &mut PgConnection, comment_id: Uuid) -> AppResult<Comment> {
    comments::table
        .find(comment_id)
        .select(Comment::as_select())
        .first::<Comment>(conn)
        .optional()?
        .ok_or_else(|| {
            AppError::new(
                ErrorCode::CommentNotFound,
                format!("comment with comment ID {comment_id} does not exist"),
            )
        })
}

/// Inserts a comment, bumps the parent freet's counter and credits the
/// author's score. Run inside a transaction.
pub fn create(
    conn: &mut PgConnection,
    author_id: Uuid,
    parent_id: Uuid,
    parent_type: ParentType,
    content: &str,
) -> AppResult<Comment> {
    let comment = diesel::insert_into(comments::table)
        .values(&NewComment {
            author_id,
            parent_id,
            parent_type: parent_type.to_string(),
            content: content.to_string(),
        })
        .returning(Comment::as_returning())
        .get_result::<Comment>(conn)?;

    parent_service::adjust_stat(conn, parent_type, parent_id, Stat::Comments, 1)?;
    score_service::apply(conn, author_id, ScoreChange::Posted, content)?;

    Ok(comment)
}
