pub mod auth_service;
pub mod cascade;
pub mod comment_service;
pub mod follower_service;
pub mod freet_service;
pub mod lexicon;
pub mod parent_service;
pub mod reaction_service;
pub mod score_service;
pub mod sentiment;
pub mod token_service;
pub mod user_service;

#[cfg(test)]
pub(crate) mod test_db;
