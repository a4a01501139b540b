//! Shared validation helpers for inbound HTTP adapters.

use actix_web::http::header;
use actix_web::HttpRequest;
use pagination::Cursor;
use serde_json::json;
use uuid::Uuid;

use crate::domain::Error;

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    InvalidUuid,
    InvalidCursor,
    InvalidLimit,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            ErrorCode::InvalidUuid => "invalid_uuid",
            ErrorCode::InvalidCursor => "invalid_cursor",
            ErrorCode::InvalidLimit => "invalid_limit",
        }
    }
}

/// Newtype wrapper for HTTP field names to provide type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(&self) -> &str {
        self.0
    }
}

fn validation_error(
    field: FieldName,
    message: String,
    code: ErrorCode,
    value: impl Into<String>,
) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field.as_str(),
        "value": value.into(),
        "code": code.as_str(),
    }))
}

/// Parse a path or body segment expected to be a UUID.
pub(crate) fn parse_uuid(value: &str, field: FieldName) -> Result<Uuid, Error> {
    Uuid::parse_str(value).map_err(|_| {
        validation_error(
            field,
            format!("{field} must be a valid UUID", field = field.as_str()),
            ErrorCode::InvalidUuid,
            value,
        )
    })
}

/// Decode an optional opaque cursor from a query parameter.
pub(crate) fn parse_cursor(raw: Option<&str>) -> Result<Option<Cursor>, Error> {
    let field = FieldName::new("cursor");
    raw.map(|raw| {
        Cursor::decode(raw).map_err(|_| {
            validation_error(
                field,
                "cursor is not a valid continuation token".to_owned(),
                ErrorCode::InvalidCursor,
                raw,
            )
        })
    })
    .transpose()
}

/// Resolve a requested page size against a default and an upper bound.
///
/// Absent means the default; zero, negative, or over-bound requests are
/// rejected rather than silently clamped.
pub(crate) fn resolve_limit(requested: Option<i64>, default: i64, max: i64) -> Result<i64, Error> {
    let field = FieldName::new("limit");
    match requested {
        None => Ok(default),
        Some(limit) if (1..=max).contains(&limit) => Ok(limit),
        Some(limit) => Err(validation_error(
            field,
            format!("limit must be between 1 and {max}"),
            ErrorCode::InvalidLimit,
            limit.to_string(),
        )),
    }
}

/// Extract the media type from the `Content-Type` header, dropping any
/// parameters such as `charset`.
pub(crate) fn content_type(req: &HttpRequest) -> Result<String, Error> {
    req.headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.split(';').next().unwrap_or(value).trim().to_owned())
        .ok_or_else(|| Error::invalid_request("Content-Type header is required"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn rejects_malformed_uuids_with_field_details() {
        let error = parse_uuid("nope", FieldName::new("postId")).expect_err("invalid uuid");
        let details = error.details().expect("details");
        assert_eq!(details["field"], "postId");
        assert_eq!(details["code"], "invalid_uuid");
    }

    #[test]
    fn accepts_well_formed_uuids() {
        let uuid = Uuid::new_v4();
        let parsed = parse_uuid(&uuid.to_string(), FieldName::new("postId")).expect("valid uuid");
        assert_eq!(parsed, uuid);
    }

    #[test]
    fn absent_cursor_is_none() {
        assert_eq!(parse_cursor(None).expect("absent cursor"), None);
    }

    #[test]
    fn malformed_cursor_is_invalid_request() {
        let error = parse_cursor(Some("!!not-base64!!")).expect_err("bad cursor");
        let details = error.details().expect("details");
        assert_eq!(details["code"], "invalid_cursor");
    }

    #[rstest]
    #[case(None, 10)]
    #[case(Some(1), 1)]
    #[case(Some(50), 50)]
    fn limits_within_bounds_are_accepted(#[case] requested: Option<i64>, #[case] expected: i64) {
        assert_eq!(
            resolve_limit(requested, 10, 50).expect("valid limit"),
            expected
        );
    }

    #[rstest]
    #[case(Some(0))]
    #[case(Some(-3))]
    #[case(Some(51))]
    fn limits_outside_bounds_are_rejected(#[case] requested: Option<i64>) {
        assert!(resolve_limit(requested, 10, 50).is_err());
    }
}
