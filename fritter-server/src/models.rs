use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::schema::{comments, flags, followers, freets, good_sport_scores, likes, refresh_tokens, users};

// --- Parent reference ---

/// What a comment, like or flag hangs off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParentType {
    Freet,
    Comment,
}

impl ParentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParentType::Freet => "freet",
            ParentType::Comment => "comment",
        }
    }
}

impl std::fmt::Display for ParentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ParentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "freet" => Ok(ParentType::Freet),
            "comment" => Ok(ParentType::Comment),
            _ => Err(format!("unknown parent type: {s}")),
        }
    }
}

// --- User ---

#[derive(Debug, Queryable, Selectable, Identifiable, Serialize, Clone)]
#[diesel(table_name = users)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub date_joined: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = users)]
pub struct NewUser {
    pub username: String,
    pub password_hash: String,
}

#[derive(Debug, AsChangeset, Default)]
#[diesel(table_name = users)]
pub struct UpdateUser {
    pub username: Option<String>,
    pub password_hash: Option<String>,
}

// --- Refresh tokens ---

#[derive(Debug, Queryable, Selectable, Identifiable)]
#[diesel(table_name = refresh_tokens)]
pub struct RefreshToken {
    pub id: Uuid,
    pub user_id: Uuid,
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
    pub revoked: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = refresh_tokens)]
pub struct NewRefreshToken {
    pub user_id: Uuid,
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
}

// --- Freet ---

#[derive(Debug, Queryable, Selectable, Identifiable, Serialize, Clone)]
#[diesel(table_name = freets)]
pub struct Freet {
    pub id: Uuid,
    pub author_id: Uuid,
    pub content: String,
    pub date_created: DateTime<Utc>,
    pub date_modified: DateTime<Utc>,
    pub likes: i32,
    pub comments: i32,
    pub flags: i32,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = freets)]
pub struct NewFreet {
    pub author_id: Uuid,
    pub content: String,
}

// --- Comment ---

#[derive(Debug, Queryable, Selectable, Identifiable, Serialize, Clone)]
#[diesel(table_name = comments)]
pub struct Comment {
    pub id: Uuid,
    pub author_id: Uuid,
    pub parent_id: Uuid,
    pub parent_type: String,
    pub content: String,
    pub date_created: DateTime<Utc>,
    pub likes: i32,
    pub flags: i32,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = comments)]
pub struct NewComment {
    pub author_id: Uuid,
    pub parent_id: Uuid,
    pub parent_type: String,
    pub content: String,
}

// --- Like ---

#[derive(Debug, Queryable, Selectable, Identifiable, Serialize)]
#[diesel(table_name = likes)]
pub struct Like {
    pub id: Uuid,
    pub user_id: Uuid,
    pub parent_id: Uuid,
    pub parent_type: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = likes)]
pub struct NewLike {
    pub user_id: Uuid,
    pub parent_id: Uuid,
    pub parent_type: String,
}

// --- Flag ---

#[derive(Debug, Queryable, Selectable, Identifiable, Serialize)]
#[diesel(table_name = flags)]
pub struct Flag {
    pub id: Uuid,
    pub user_id: Uuid,
    pub parent_id: Uuid,
    pub parent_type: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = flags)]
pub struct NewFlag {
    pub user_id: Uuid,
    pub parent_id: Uuid,
    pub parent_type: String,
}

// --- Follower ---

#[derive(Debug, Queryable, Selectable, Identifiable, Serialize)]
#[diesel(table_name = followers)]
pub struct Follower {
    pub id: Uuid,
    pub follower_id: Uuid,
    pub followee_id: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = followers)]
pub struct NewFollower {
    pub follower_id: Uuid,
    pub followee_id: Uuid,
}

// --- Good sport score ---

#[derive(Debug, Queryable, Selectable, Identifiable, Serialize)]
#[diesel(table_name = good_sport_scores)]
pub struct GoodSportScore {
    pub id: Uuid,
    pub user_id: Uuid,
    pub score: f64,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = good_sport_scores)]
pub struct NewGoodSportScore {
    pub user_id: Uuid,
}
