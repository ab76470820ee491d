use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::types::ApiErrorResponse;

/// Application error codes following the pattern E{area}{sequence}
///
/// Ranges:
/// - E0xxx: Shared/infrastructure errors
/// - E1xxx: Users and sessions
/// - E2xxx: Freets
/// - E3xxx: Comments
/// - E4xxx: Likes and flags
/// - E5xxx: Followers
/// - E6xxx: Good sport scores
///
/// Duplicate likes, flags and follows answer 404 rather than 409; the web
/// client treats every "cannot do that again" case as a missing resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    // Shared (E0xxx)
    InternalError,
    ValidationError,
    NotFound,
    NotSignedIn,
    MissingField,
    InvalidId,

    // Users (E1xxx)
    InvalidCredentials,
    UsernameTaken,
    InvalidUsername,
    PasswordTooWeak,
    TokenExpired,
    TokenInvalid,
    RefreshTokenRevoked,
    UserNotFound,

    // Freets (E2xxx)
    FreetNotFound,
    NotFreetAuthor,
    ContentEmpty,
    ContentTooLong,

    // Comments (E3xxx)
    CommentNotFound,
    NotCommentAuthor,
    InvalidParentType,
    ParentNotFound,

    // Likes and flags (E4xxx)
    LikeAlreadyExists,
    LikeNotFound,
    FlagAlreadyExists,
    FlagNotFound,

    // Followers (E5xxx)
    FollowAlreadyExists,
    FollowNotFound,
    CannotFollowSelf,

    // Good sport scores (E6xxx)
    ScoreNotFound,
}

impl ErrorCode {
    pub fn code(&self) -> &'static str {
        match self {
            // Shared
            Self::InternalError => "E0001",
            Self::ValidationError => "E0002",
            Self::NotFound => "E0003",
            Self::NotSignedIn => "E0004",
            Self::MissingField => "E0008",
            Self::InvalidId => "E0009",

            // Users
            Self::InvalidCredentials => "E1001",
            Self::UsernameTaken => "E1002",
            Self::InvalidUsername => "E1003",
            Self::PasswordTooWeak => "E1004",
            Self::TokenExpired => "E1005",
            Self::TokenInvalid => "E1006",
            Self::RefreshTokenRevoked => "E1007",
            Self::UserNotFound => "E1008",

            // Freets
            Self::FreetNotFound => "E2001",
            Self::NotFreetAuthor => "E2002",
            Self::ContentEmpty => "E2003",
            Self::ContentTooLong => "E2004",

            // Comments
            Self::CommentNotFound => "E3001",
            Self::NotCommentAuthor => "E3002",
            Self::InvalidParentType => "E3003",
            Self::ParentNotFound => "E3004",

            // Likes and flags
            Self::LikeAlreadyExists => "E4001",
            Self::LikeNotFound => "E4002",
            Self::FlagAlreadyExists => "E4003",
            Self::FlagNotFound => "E4004",

            // Followers
            Self::FollowAlreadyExists => "E5001",
            Self::FollowNotFound => "E5002",
            Self::CannotFollowSelf => "E5003",

            // Scores
            Self::ScoreNotFound => "E6001",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ValidationError | Self::MissingField | Self::InvalidId
            | Self::InvalidUsername | Self::PasswordTooWeak | Self::ContentEmpty
            | Self::InvalidParentType | Self::CannotFollowSelf => StatusCode::BAD_REQUEST,
            Self::ContentTooLong => StatusCode::PAYLOAD_TOO_LARGE,
            Self::NotFound | Self::UserNotFound | Self::FreetNotFound | Self::CommentNotFound
            | Self::ParentNotFound | Self::LikeNotFound | Self::FlagNotFound
            | Self::FollowNotFound | Self::ScoreNotFound => StatusCode::NOT_FOUND,
            Self::LikeAlreadyExists | Self::FlagAlreadyExists
            | Self::FollowAlreadyExists => StatusCode::NOT_FOUND,
            Self::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::NotSignedIn | Self::TokenExpired | Self::TokenInvalid
            | Self::RefreshTokenRevoked | Self::NotFreetAuthor
            | Self::NotCommentAuthor => StatusCode::FORBIDDEN,
            Self::UsernameTaken => StatusCode::CONFLICT,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{message}")]
    Known {
        code: ErrorCode,
        message: String,
        details: Option<serde_json::Value>,
    },

    #[error("internal server error")]
    Internal(#[from] anyhow::Error),

    #[error("database error: {0}")]
    Database(#[from] diesel::result::Error),

    #[error("validation error: {0}")]
    Validation(String),
}

impl AppError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::Known {
            code,
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(code: ErrorCode, message: impl Into<String>, details: serde_json::Value) -> Self {
        Self::Known {
            code,
            message: message.into(),
            details: Some(details),
        }
    }

    pub fn not_signed_in() -> Self {
        Self::new(ErrorCode::NotSignedIn, "you must be signed in to do that")
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    /// Code carried by a known error, if any.
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            AppError::Known { code, .. } => Some(*code),
            _ => None,
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_response) = match &self {
            AppError::Known { code, message, details } => {
                let status = code.status_code();
                let mut resp = ApiErrorResponse::new(code.code(), message);
                if let Some(d) = details {
                    resp = resp.with_details(d.clone());
                }
                (status, resp)
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ApiErrorResponse::new(ErrorCode::InternalError.code(), "internal server error"),
                )
            }
            AppError::Database(err) => {
                tracing::error!(error = %err, "database error");
                match err {
                    diesel::result::Error::NotFound => (
                        StatusCode::NOT_FOUND,
                        ApiErrorResponse::new(ErrorCode::NotFound.code(), "resource not found"),
                    ),
                    _ => (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        ApiErrorResponse::new(ErrorCode::InternalError.code(), "database error"),
                    ),
                }
            }
            AppError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                ApiErrorResponse::new(ErrorCode::ValidationError.code(), msg),
            ),
        };

        (status, Json(error_response)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    #[test]
    fn duplicates_answer_not_found() {
        assert_eq!(ErrorCode::LikeAlreadyExists.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(ErrorCode::FlagAlreadyExists.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(ErrorCode::FollowAlreadyExists.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn auth_failures_are_forbidden() {
        assert_eq!(ErrorCode::NotSignedIn.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(ErrorCode::TokenInvalid.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(ErrorCode::NotFreetAuthor.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(ErrorCode::InvalidCredentials.status_code(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn content_too_long_is_413() {
        assert_eq!(ErrorCode::ContentTooLong.status_code(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(ErrorCode::ContentEmpty.status_code(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn known_error_renders_envelope() {
        let resp = AppError::new(ErrorCode::FreetNotFound, "freet does not exist").into_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["success"], false);
        assert_eq!(body["error"]["code"], "E2001");
        assert_eq!(body["error"]["message"], "freet does not exist");
    }

    #[tokio::test]
    async fn details_are_rendered_when_present() {
        let err = AppError::with_details(
            ErrorCode::InvalidUsername,
            "username is invalid",
            serde_json::json!({ "username": ["username_chars"] }),
        );
        let bytes = err.into_response().into_body().collect().await.unwrap().to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"]["details"]["username"][0], "username_chars");
    }

    #[tokio::test]
    async fn diesel_not_found_maps_to_404() {
        let resp = AppError::from(diesel::result::Error::NotFound).into_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
