use chrono::{DateTime, Duration, Months, NaiveDate, NaiveTime, TimeZone, Utc};
use diesel::pg::PgConnection;
use diesel::prelude::*;
use uuid::Uuid;

use fritter_shared::errors::AppResult;

use crate::models::Freet;
use crate::schema::{followers, freets, users};

/// A freet and its author's username.
pub type FreetWithAuthor = (Freet, String);

/// Which side of the follow graph a timeline draws from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedScope {
    /// The caller and everyone they follow.
    Following,
    /// Everyone else.
    Explore,
}

pub fn all(conn: &mut PgConnection) -> AppResult<Vec<FreetWithAuthor>> {
    let rows = freets::table
        .inner_join(users::table)
        .select((Freet::as_select(), users::username))
        .order(freets::date_modified.desc())
        .load::<FreetWithAuthor>(conn)?;
    Ok(rows)
}

pub fn find(conn: &mut PgConnection, freet_id: Uuid) -> AppResult<Option<FreetWithAuthor>> {
    let row = freets::table
        .inner_join(users::table)
        .filter(freets::id.eq(freet_id))
        .select((Freet::as_select(), users::username))
        .first::<FreetWithAuthor>(conn)
        .optional()?;
    Ok(row)
}

pub fn by_author(conn: &mut PgConnection, author_id: Uuid) -> AppResult<Vec<FreetWithAuthor>> {
    let rows = freets::table
        .inner_join(users::table)
        .filter(freets::author_id.eq(author_id))
        .select((Freet::as_select(), users::username))
        .order(freets::date_modified.desc())
        .load::<FreetWithAuthor>(conn)?;
    Ok(rows)
}

pub fn followee_ids(conn: &mut PgConnection, user_id: Uuid) -> AppResult<Vec<Uuid>> {
    let ids = followers::table
        .filter(followers::follower_id.eq(user_id))
        .select(followers::followee_id)
        .load::<Uuid>(conn)?;
    Ok(ids)
}

/// Feed or explore timeline for `user_id`, optionally narrowed to one author.
pub fn timeline(
    conn: &mut PgConnection,
    user_id: Uuid,
    scope: FeedScope,
    author: Option<Uuid>,
) -> AppResult<Vec<FreetWithAuthor>> {
    let mut circle = followee_ids(conn, user_id)?;
    circle.push(user_id);

    let mut query = freets::table
        .inner_join(users::table)
        .select((Freet::as_select(), users::username))
        .order(freets::date_modified.desc())
        .into_boxed();

    query = match scope {
        FeedScope::Following => query.filter(freets::author_id.eq_any(circle)),
        FeedScope::Explore => query.filter(freets::author_id.ne_all(circle)),
    };

    if let Some(author_id) = author {
        query = query.filter(freets::author_id.eq(author_id));
    }

    Ok(query.load::<FreetWithAuthor>(conn)?)
}

/// The UTC calendar day one year before `now`, as an inclusive range with
/// millisecond precision. Feb 29 maps to Feb 28.
pub fn memories_window(now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
    let today = now.date_naive();
    let day: NaiveDate = today
        .checked_sub_months(Months::new(12))
        .unwrap_or(today);

    let start = Utc.from_utc_datetime(&day.and_time(NaiveTime::default()));
    let end = start + Duration::milliseconds(86_399_999);
    (start, end)
}

pub fn memories(conn: &mut PgConnection, user_id: Uuid, now: DateTime<Utc>) -> AppResult<Vec<FreetWithAuthor>> {
    let (start, end) = memories_window(now);
    let rows = freets::table
        .inner_join(users::table)
        .filter(freets::author_id.eq(user_id))
        .filter(freets::date_created.between(start, end))
        .select((Freet::as_select(), users::username))
        .order(freets::date_created.asc())
        .load::<FreetWithAuthor>(conn)?;
    Ok(rows)
}
