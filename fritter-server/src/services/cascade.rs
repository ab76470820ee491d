//! Deleting a freet, comment or account takes everything hanging off it.
//! All functions expect to run inside the caller's transaction.

use diesel::pg::PgConnection;
use diesel::prelude::*;
use uuid::Uuid;

use fritter_shared::errors::AppResult;

use crate::models::{Comment, Flag, Freet, Like};
use crate::schema::{comments, flags, followers, freets, good_sport_scores, likes, refresh_tokens, users};
use crate::services::parent_service::{self, Stat};
use crate::services::score_service::{self, ScoreChange};

/// Every comment below `root` (a freet or a comment), breadth-first.
pub fn comment_subtree(conn: &mut PgConnection, root: Uuid) -> AppResult<Vec<Comment>> {
    let mut found = Vec::new();
    let mut frontier = vec![root];

    while !frontier.is_empty() {
        let children = comments::table
            .filter(comments::parent_id.eq_any(&frontier))
            .select(Comment::as_select())
            .load::<Comment>(conn)?;
        frontier = children.iter().map(|c| c.id).collect();
        found.extend(children);
    }

    Ok(found)
}

fn delete_reactions_on(conn: &mut PgConnection, parent_ids: &[Uuid]) -> AppResult<()> {
    diesel::delete(likes::table.filter(likes::parent_id.eq_any(parent_ids))).execute(conn)?;
    diesel::delete(flags::table.filter(flags::parent_id.eq_any(parent_ids))).execute(conn)?;
    Ok(())
}

fn purge_comments(conn: &mut PgConnection, doomed: &[Comment]) -> AppResult<()> {
    if doomed.is_empty() {
        return Ok(());
    }

    let ids: Vec<Uuid> = doomed.iter().map(|c| c.id).collect();
    delete_reactions_on(conn, &ids)?;
    diesel::delete(comments::table.filter(comments::id.eq_any(&ids))).execute(conn)?;

    for comment in doomed {
        score_service::apply(conn, comment.author_id, ScoreChange::Removed, &comment.content)?;
    }
    Ok(())
}

/// Removes a freet, its comment tree and every like/flag on any of them.
/// Returns how many comments went with it.
pub fn delete_freet(conn: &mut PgConnection, freet: &Freet) -> AppResult<usize> {
    let subtree = comment_subtree(conn, freet.id)?;
    purge_comments(conn, &subtree)?;

    delete_reactions_on(conn, &[freet.id])?;
    diesel::delete(freets::table.find(freet.id)).execute(conn)?;
    score_service::apply(conn, freet.author_id, ScoreChange::Removed, &freet.content)?;

    Ok(subtree.len())
}

/// Removes a comment and its replies. The parent freet's comment counter
/// drops by one; replies never counted toward it.
pub fn delete_comment(conn: &mut PgConnection, comment: &Comment) -> AppResult<usize> {
    let mut doomed = vec![comment.clone()];
    doomed.extend(comment_subtree(conn, comment.id)?);
    purge_comments(conn, &doomed)?;

    let parent_type = parent_service::stored_parent_type(&comment.parent_type)?;
    parent_service::adjust_stat(conn, parent_type, comment.parent_id, Stat::Comments, -1)?;

    Ok(doomed.len())
}

/// Withdraws every like and flag a user has given, keeping counters right.
fn withdraw_reactions(conn: &mut PgConnection, user_id: Uuid) -> AppResult<()> {
    let given_likes = likes::table
        .filter(likes::user_id.eq(user_id))
        .select(Like::as_select())
        .load::<Like>(conn)?;
    for like in &given_likes {
        let parent_type = parent_service::stored_parent_type(&like.parent_type)?;
        parent_service::adjust_stat(conn, parent_type, like.parent_id, Stat::Likes, -1)?;
    }
    diesel::delete(likes::table.filter(likes::user_id.eq(user_id))).execute(conn)?;

    let given_flags = flags::table
        .filter(flags::user_id.eq(user_id))
        .select(Flag::as_select())
        .load::<Flag>(conn)?;
    for flag in &given_flags {
        let parent_type = parent_service::stored_parent_type(&flag.parent_type)?;
        parent_service::adjust_stat(conn, parent_type, flag.parent_id, Stat::Flags, -1)?;
    }
    diesel::delete(flags::table.filter(flags::user_id.eq(user_id))).execute(conn)?;

    Ok(())
}

/// Removes a user and everything they own or gave.
pub fn delete_account(conn: &mut PgConnection, user_id: Uuid) -> AppResult<()> {
    withdraw_reactions(conn, user_id)?;

    // A comment may already be gone as part of an earlier subtree.
    let own_comment_ids: Vec<Uuid> = comments::table
        .filter(comments::author_id.eq(user_id))
        .select(comments::id)
        .load::<Uuid>(conn)?;
    for id in own_comment_ids {
        let comment = comments::table
            .find(id)
            .select(Comment::as_select())
            .first::<Comment>(conn)
            .optional()?;
        if let Some(comment) = comment {
            delete_comment(conn, &comment)?;
        }
    }

    let own_freets = freets::table
        .filter(freets::author_id.eq(user_id))
        .select(Freet::as_select())
        .load::<Freet>(conn)?;
    for freet in &own_freets {
        delete_freet(conn, freet)?;
    }

    diesel::delete(
        followers::table.filter(
            followers::follower_id.eq(user_id).or(followers::followee_id.eq(user_id)),
        ),
    )
    .execute(conn)?;
    diesel::delete(refresh_tokens::table.filter(refresh_tokens::user_id.eq(user_id))).execute(conn)?;
    diesel::delete(good_sport_scores::table.filter(good_sport_scores::user_id.eq(user_id))).execute(conn)?;
    diesel::delete(users::table.find(user_id)).execute(conn)?;

    tracing::info!(user_id = %user_id, freets = own_freets.len(), "account deleted");
    Ok(())
}
