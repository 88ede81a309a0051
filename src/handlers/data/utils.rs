use axum::body::Bytes;
use serde_json::Value;

use crate::database::{Collection, Record};
use crate::error::ApiError;

/// Resolve the plural segment of a list route (`/houses`).
pub fn collection_from_plural(segment: &str) -> Result<Collection, ApiError> {
    segment
        .parse()
        .map_err(|_| ApiError::not_found(format!("no collection at /{segment}")))
}

/// Resolve the singular segment of a record route (`/house/:id`, `POST /house`).
pub fn collection_from_singular(segment: &str) -> Result<Collection, ApiError> {
    Collection::from_singular(segment)
        .ok_or_else(|| ApiError::not_found(format!("no collection at /{segment}")))
}

/// Parse a request body into a record plus its `auth_token`, if any.
///
/// An empty body is an empty object so GET and DELETE may omit it.
pub fn parse_payload(body: &Bytes) -> Result<(Record, Option<String>), ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok((Record::new(), None));
    }

    let value: Value = serde_json::from_slice(body)
        .map_err(|e| ApiError::bad_request(format!("Invalid JSON format: {e}")))?;
    let mut record = Record::from_json(value)?;
    let token = record.take_auth_token()?;
    Ok((record, token))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_body_is_an_empty_payload() {
        let (record, token) = parse_payload(&Bytes::from_static(b"  \n")).unwrap();
        assert!(record.is_empty());
        assert!(token.is_none());
    }

    #[test]
    fn token_is_split_from_fields() {
        let (record, token) =
            parse_payload(&Bytes::from_static(br#"{"name": "Home", "auth_token": "abc"}"#)).unwrap();
        assert_eq!(record.len(), 1);
        assert_eq!(token.as_deref(), Some("abc"));
    }

    #[test]
    fn malformed_payloads_are_bad_requests() {
        let bodies: [&[u8]; 4] = [b"{not json", b"[1, 2]", br#"{"a": [1]}"#, br#"{"auth_token": 1}"#];
        for body in bodies {
            let err = parse_payload(&Bytes::copy_from_slice(body)).unwrap_err();
            assert_eq!(err.status_code(), axum::http::StatusCode::BAD_REQUEST);
        }
    }

    #[test]
    fn segments_resolve_by_route_form() {
        assert_eq!(collection_from_plural("batteries").unwrap(), Collection::Batteries);
        assert_eq!(collection_from_singular("battery").unwrap(), Collection::Batteries);
        assert!(collection_from_plural("battery").is_err());
        assert!(collection_from_singular("batteries").is_err());
    }
}
