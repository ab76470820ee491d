//! Response shapes the web client consumes.

use chrono::{DateTime, Datelike, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::models::{Comment, Follower, Freet, GoodSportScore, ParentType, User};

#[derive(Debug, Serialize)]
pub struct FreetResponse {
    pub id: Uuid,
    pub author: String,
    pub author_id: Uuid,
    pub content: String,
    pub date_created: String,
    pub date_modified: String,
    pub likes: i32,
    pub comments: i32,
    pub flags: i32,
}

impl FreetResponse {
    pub fn new(freet: Freet, author: String) -> Self {
        Self {
            id: freet.id,
            author,
            author_id: freet.author_id,
            date_created: format_date(&freet.date_created),
            date_modified: format_date(&freet.date_modified),
            content: freet.content,
            likes: freet.likes,
            comments: freet.comments,
            flags: freet.flags,
        }
    }

    pub fn list(rows: Vec<(Freet, String)>) -> Vec<Self> {
        rows.into_iter().map(|(freet, author)| Self::new(freet, author)).collect()
    }
}

#[derive(Debug, Serialize)]
pub struct CommentResponse {
    pub id: Uuid,
    pub author: String,
    pub author_id: Uuid,
    pub parent_id: Uuid,
    pub parent_type: String,
    pub content: String,
    pub date_created: String,
    pub likes: i32,
    pub flags: i32,
}

impl CommentResponse {
    pub fn new(comment: Comment, author: String) -> Self {
        Self {
            id: comment.id,
            author,
            author_id: comment.author_id,
            parent_id: comment.parent_id,
            parent_type: comment.parent_type,
            date_created: format_date(&comment.date_created),
            content: comment.content,
            likes: comment.likes,
            flags: comment.flags,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub username: String,
    pub date_joined: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            date_joined: format_date(&user.date_joined),
            username: user.username,
        }
    }
}

/// A follow, with both usernames resolved.
#[derive(Debug, Serialize)]
pub struct FollowResponse {
    pub id: Uuid,
    pub follower: String,
    pub follower_id: Uuid,
    pub followee: String,
    pub followee_id: Uuid,
    pub date_followed: String,
}

impl FollowResponse {
    pub fn new(row: Follower, follower: String, followee: String) -> Self {
        Self {
            id: row.id,
            follower,
            follower_id: row.follower_id,
            followee,
            followee_id: row.followee_id,
            date_followed: format_date(&row.created_at),
        }
    }
}

/// A like or flag the caller just placed.
#[derive(Debug, Serialize)]
pub struct ReactionResponse {
    pub user_id: Uuid,
    pub parent_id: Uuid,
    pub parent_type: ParentType,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct ScoreResponse {
    pub user_id: Uuid,
    pub score: f64,
}

impl From<GoodSportScore> for ScoreResponse {
    fn from(score: GoodSportScore) -> Self {
        Self {
            user_id: score.user_id,
            score: score.score,
        }
    }
}

/// Renders a timestamp like `October 16th 2026, 3:04:05 pm`.
pub fn format_date(date: &DateTime<Utc>) -> String {
    let day = date.day();
    format!(
        "{} {}{} {}",
        date.format("%B"),
        day,
        ordinal_suffix(day),
        date.format("%Y, %-I:%M:%S %P"),
    )
}

fn ordinal_suffix(day: u32) -> &'static str {
    match (day % 10, day % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    }
}
