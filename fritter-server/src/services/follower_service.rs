use diesel::dsl::exists;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use uuid::Uuid;

use fritter_shared::errors::{AppError, AppResult, ErrorCode};

use crate::models::{Follower, NewFollower};
use crate::schema::followers;

/// How many users follow someone, and how many they follow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct FollowStats {
    pub followers: i64,
    pub followees: i64,
}

pub fn stats(conn: &mut PgConnection, user_id: Uuid) -> AppResult<FollowStats> {
    let followers = followers::table
        .filter(followers::followee_id.eq(user_id))
        .count()
        .get_result::<i64>(conn)?;
    let followees = followers::table
        .filter(followers::follower_id.eq(user_id))
        .count()
        .get_result::<i64>(conn)?;
    Ok(FollowStats { followers, followees })
}

pub fn follows(conn: &mut PgConnection, follower_id: Uuid, followee_id: Uuid) -> AppResult<bool> {
    let found = diesel::select(exists(
        followers::table
            .filter(followers::follower_id.eq(follower_id))
            .filter(followers::followee_id.eq(followee_id)),
    ))
    .get_result::<bool>(conn)?;
    Ok(found)
}

/// Starts a follow. The followee must already be known to exist.
pub fn follow(conn: &mut PgConnection, follower_id: Uuid, followee_id: Uuid) -> AppResult<Follower> {
    if follows(conn, follower_id, followee_id)? {
        return Err(already_follows(follower_id, followee_id));
    }

    let row = diesel::insert_into(followers::table)
        .values(&NewFollower { follower_id, followee_id })
        .returning(Follower::as_returning())
        .get_result::<Follower>(conn)
        .map_err(unique_follow(follower_id, followee_id))?;
    Ok(row)
}

/// Maps a unique violation on (follower, followee) to the duplicate error.
fn unique_follow(follower_id: Uuid, followee_id: Uuid) -> impl FnOnce(DieselError) -> AppError {
    move |e| match e {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => already_follows(follower_id, followee_id),
        other => other.into(),
    }
}

fn already_follows(follower_id: Uuid, followee_id: Uuid) -> AppError {
    AppError::new(
        ErrorCode::FollowAlreadyExists,
        format!("{follower_id} already follows {followee_id}"),
    )
}

/// Ends the caller's own follow of `followee_id`.
pub fn unfollow(conn: &mut PgConnection, follower_id: Uuid, followee_id: Uuid) -> AppResult<()> {
    let deleted = diesel::delete(
        followers::table
            .filter(followers::follower_id.eq(follower_id))
            .filter(followers::followee_id.eq(followee_id)),
    )
    .execute(conn)?;

    if deleted == 0 {
        return Err(AppError::new(
            ErrorCode::FollowNotFound,
            format!("you do not follow {followee_id}"),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_db::{self, db_or_skip};

    #[test]
    fn unique_violation_on_insert_is_already_following() {
        let (follower, followee) = (Uuid::new_v4(), Uuid::new_v4());
        let violation = DieselError::DatabaseError(
            DatabaseErrorKind::UniqueViolation,
            Box::new(String::from("duplicate key value violates unique constraint")),
        );
        let err = unique_follow(follower, followee)(violation);
        assert_eq!(err.code(), Some(ErrorCode::FollowAlreadyExists));
        assert_eq!(err.to_string(), format!("{follower} already follows {followee}"));
    }

    #[test]
    fn other_insert_failures_pass_through() {
        let err = unique_follow(Uuid::new_v4(), Uuid::new_v4())(DieselError::RollbackTransaction);
        assert!(matches!(err, AppError::Database(DieselError::RollbackTransaction)));
    }

    #[test]
    fn follow_counts_and_duplicates() {
        let mut conn = db_or_skip!();
        let alice = test_db::user(&mut conn, "alice");
        let bob = test_db::user(&mut conn, "bob");
        let carol = test_db::user(&mut conn, "carol");

        follow(&mut conn, alice.id, bob.id).unwrap();
        follow(&mut conn, carol.id, bob.id).unwrap();
        let err = follow(&mut conn, alice.id, bob.id).unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::FollowAlreadyExists));

        assert_eq!(stats(&mut conn, bob.id).unwrap(), FollowStats { followers: 2, followees: 0 });
        assert_eq!(stats(&mut conn, alice.id).unwrap(), FollowStats { followers: 0, followees: 1 });
    }

    #[test]
    fn unfollow_only_touches_the_callers_follow() {
        let mut conn = db_or_skip!();
        let alice = test_db::user(&mut conn, "alice");
        let bob = test_db::user(&mut conn, "bob");
        let carol = test_db::user(&mut conn, "carol");

        follow(&mut conn, carol.id, bob.id).unwrap();
        let err = unfollow(&mut conn, alice.id, bob.id).unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::FollowNotFound));
        assert!(follows(&mut conn, carol.id, bob.id).unwrap());

        unfollow(&mut conn, carol.id, bob.id).unwrap();
        assert!(!follows(&mut conn, carol.id, bob.id).unwrap());
    }
}
