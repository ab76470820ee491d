//! Request checks shared by every resource: required fields, id format,
//! post content and parent type.

use uuid::Uuid;

use fritter_shared::errors::{AppError, AppResult, ErrorCode};

use crate::models::ParentType;

pub const MAX_CONTENT_CHARS: usize = 140;

/// Where a request field came from, for error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location {
    Body,
    Params,
    Query,
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Location::Body => f.write_str("request body"),
            Location::Params => f.write_str("path"),
            Location::Query => f.write_str("query string"),
        }
    }
}

/// A field that must be present and non-empty.
pub fn require<'a>(value: Option<&'a str>, field: &str, location: Location) -> AppResult<&'a str> {
    match value {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(AppError::new(
            ErrorCode::MissingField,
            format!("field '{field}' not supplied in {location}"),
        )),
    }
}

pub fn parse_id(value: &str, field: &str, location: Location) -> AppResult<Uuid> {
    Uuid::parse_str(value).map_err(|_| {
        AppError::new(
            ErrorCode::InvalidId,
            format!("field '{field}' is not a valid id in {location}"),
        )
    })
}

/// `require` followed by `parse_id`.
pub fn require_id(value: Option<&str>, field: &str, location: Location) -> AppResult<Uuid> {
    let raw = require(value, field, location)?;
    parse_id(raw, field, location)
}

/// Freet and comment bodies: not blank, at most 140 characters.
pub fn validate_content(content: Option<&str>) -> AppResult<&str> {
    let content = content.unwrap_or_default();
    if content.trim().is_empty() {
        return Err(AppError::new(
            ErrorCode::ContentEmpty,
            "content must be at least one character long",
        ));
    }
    if content.chars().count() > MAX_CONTENT_CHARS {
        return Err(AppError::new(
            ErrorCode::ContentTooLong,
            format!("content must be no more than {MAX_CONTENT_CHARS} characters"),
        ));
    }
    Ok(content)
}

pub fn parse_parent_type(value: Option<&str>) -> AppResult<ParentType> {
    value
        .and_then(|v| v.parse::<ParentType>().ok())
        .ok_or_else(|| AppError::new(ErrorCode::InvalidParentType, "parentType must be 'freet' or 'comment'"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_and_empty_fields_are_rejected() {
        let err = require(None, "parentId", Location::Query).unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::MissingField));
        assert_eq!(err.to_string(), "field 'parentId' not supplied in query string");

        let err = require(Some(""), "parentId", Location::Body).unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::MissingField));
    }

    #[test]
    fn ids_must_parse() {
        let id = Uuid::new_v4();
        let raw = id.to_string();
        assert_eq!(require_id(Some(raw.as_str()), "freetId", Location::Params).unwrap(), id);

        let err = require_id(Some("507f1f77bcf86cd799439011"), "freetId", Location::Params).unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::InvalidId));
    }

    #[test]
    fn blank_content_is_rejected() {
        assert_eq!(validate_content(Some("   \n\t")).unwrap_err().code(), Some(ErrorCode::ContentEmpty));
        assert_eq!(validate_content(None).unwrap_err().code(), Some(ErrorCode::ContentEmpty));
    }

    #[test]
    fn content_limit_counts_characters_not_bytes() {
        let at_limit = "é".repeat(MAX_CONTENT_CHARS);
        assert!(validate_content(Some(at_limit.as_str())).is_ok());

        let over = "a".repeat(MAX_CONTENT_CHARS + 1);
        assert_eq!(validate_content(Some(over.as_str())).unwrap_err().code(), Some(ErrorCode::ContentTooLong));
    }

    #[test]
    fn parent_type_must_be_known() {
        assert_eq!(parse_parent_type(Some("freet")).unwrap(), ParentType::Freet);
        assert_eq!(parse_parent_type(Some("comment")).unwrap(), ParentType::Comment);
        assert_eq!(parse_parent_type(Some("user")).unwrap_err().code(), Some(ErrorCode::InvalidParentType));
        assert_eq!(parse_parent_type(None).unwrap_err().code(), Some(ErrorCode::InvalidParentType));
    }
}
