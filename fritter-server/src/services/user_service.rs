use diesel::dsl::exists;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use uuid::Uuid;

use fritter_shared::errors::{AppError, AppResult, ErrorCode};

use crate::models::User;
use crate::schema::users;

pub fn find_by_id(conn: &mut PgConnection, user_id: Uuid) -> AppResult<User> {
    users::table
        .find(user_id)
        .select(User::as_select())
        .first::<User>(conn)
        .optional()?
        .ok_or_else(|| AppError::new(ErrorCode::UserNotFound, format!("no user with id {user_id}")))
}

/// The account behind a valid access token. A token can outlive its account,
/// which then counts as signed out.
pub fn require_account(conn: &mut PgConnection, user_id: Uuid) -> AppResult<User> {
    users::table
        .find(user_id)
        .select(User::as_select())
        .first::<User>(conn)
        .optional()?
        .ok_or_else(AppError::not_signed_in)
}

pub fn find_by_username(conn: &mut PgConnection, username: &str) -> AppResult<User> {
    users::table
        .filter(users::username.eq(username))
        .select(User::as_select())
        .first::<User>(conn)
        .optional()?
        .ok_or_else(|| AppError::new(ErrorCode::UserNotFound, format!("a user with username {username} does not exist")))
}

pub fn username_taken(conn: &mut PgConnection, username: &str) -> AppResult<bool> {
    let taken = diesel::select(exists(users::table.filter(users::username.eq(username))))
        .get_result::<bool>(conn)?;
    Ok(taken)
}
