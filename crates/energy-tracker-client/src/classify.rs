//! Mapping of HTTP error responses onto [`ApiError`]
//!
//! Classification is a pure function of status, headers and body. It never
//! fails: an unreadable body only means an empty `api_message`.

use std::time::Duration;

use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::StatusCode;
use serde_json::Value;

use crate::error::{ApiError, ApiErrorKind};

/// Classify an error response (status >= 400)
pub fn classify(status: StatusCode, headers: &HeaderMap, body: &[u8]) -> ApiError {
    let kind = match status {
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => ApiErrorKind::Validation,
        StatusCode::UNAUTHORIZED => ApiErrorKind::Authentication,
        StatusCode::FORBIDDEN => ApiErrorKind::Forbidden,
        StatusCode::NOT_FOUND => ApiErrorKind::NotFound,
        StatusCode::CONFLICT => ApiErrorKind::Conflict,
        StatusCode::TOO_MANY_REQUESTS => ApiErrorKind::RateLimited {
            retry_after: retry_after(headers),
        },
        _ => ApiErrorKind::Other,
    };

    ApiError::new(status, kind, extract_api_message(body))
}

/// Messages from a `{"message": ...}` error body
///
/// A list yields one entry per element, a string yields a single entry.
/// Anything else, including malformed JSON, yields nothing.
pub fn extract_api_message(body: &[u8]) -> Vec<String> {
    let Ok(Value::Object(map)) = serde_json::from_slice::<Value>(body) else {
        return Vec::new();
    };

    match map.get("message") {
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect(),
        Some(Value::String(message)) => vec![message.clone()],
        _ => Vec::new(),
    }
}

/// `Retry-After` as whole seconds; HTTP-date values are ignored
fn retry_after(headers: &HeaderMap) -> Option<Duration> {
    let value = headers.get(RETRY_AFTER)?.to_str().ok()?;
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    value.parse::<u64>().ok().map(Duration::from_secs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use reqwest::header::HeaderValue;
    use rstest::rstest;

    fn headers_with_retry_after(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(RETRY_AFTER, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[rstest]
    #[case(400, ApiErrorKind::Validation)]
    #[case(422, ApiErrorKind::Validation)]
    #[case(401, ApiErrorKind::Authentication)]
    #[case(403, ApiErrorKind::Forbidden)]
    #[case(404, ApiErrorKind::NotFound)]
    #[case(409, ApiErrorKind::Conflict)]
    #[case(429, ApiErrorKind::RateLimited { retry_after: None })]
    #[case(405, ApiErrorKind::Other)]
    #[case(418, ApiErrorKind::Other)]
    #[case(500, ApiErrorKind::Other)]
    #[case(503, ApiErrorKind::Other)]
    fn test_status_mapping(#[case] status: u16, #[case] expected: ApiErrorKind) {
        let status = StatusCode::from_u16(status).unwrap();
        let bodies: [&[u8]; 4] = [b"", b"{}", b"<html>oops</html>", br#"{"message": ["x"]}"#];
        for body in bodies {
            let err = classify(status, &HeaderMap::new(), body);
            assert_eq!(err.kind, expected);
            assert_eq!(err.status, status);
        }
    }

    #[rstest]
    #[case(&b"{not json"[..])]
    #[case(&b""[..])]
    #[case(&b"null"[..])]
    #[case(&br#"["message"]"#[..])]
    #[case(&br#"{"message": 42}"#[..])]
    #[case(&br#"{"error": "nope"}"#[..])]
    fn test_unusable_body_yields_empty_messages(#[case] body: &[u8]) {
        let err = classify(StatusCode::BAD_REQUEST, &HeaderMap::new(), body);
        assert_eq!(err.kind, ApiErrorKind::Validation);
        assert!(err.api_message.is_empty());
    }

    #[test]
    fn test_message_list() {
        let messages = extract_api_message(br#"{"message": ["Error 1", "Error 2"]}"#);
        assert_eq!(messages, vec!["Error 1".to_string(), "Error 2".to_string()]);
    }

    #[test]
    fn test_message_string() {
        let messages = extract_api_message(br#"{"message": "Single error message"}"#);
        assert_eq!(messages, vec!["Single error message".to_string()]);
    }

    #[test]
    fn test_message_list_with_non_string_items() {
        let messages = extract_api_message(br#"{"message": [123, 456, true]}"#);
        assert_eq!(
            messages,
            vec!["123".to_string(), "456".to_string(), "true".to_string()]
        );
    }

    #[test]
    fn test_retry_after_seconds() {
        let err = classify(
            StatusCode::TOO_MANY_REQUESTS,
            &headers_with_retry_after("30"),
            b"{}",
        );
        assert_eq!(
            err.kind,
            ApiErrorKind::RateLimited {
                retry_after: Some(Duration::from_secs(30))
            }
        );
    }

    #[rstest]
    #[case("soon")]
    #[case("-5")]
    #[case("1.5")]
    #[case("Wed, 21 Oct 2015 07:28:00 GMT")]
    fn test_retry_after_non_numeric(#[case] value: &str) {
        let err = classify(
            StatusCode::TOO_MANY_REQUESTS,
            &headers_with_retry_after(value),
            b"",
        );
        assert_eq!(err.retry_after(), None);
    }

    #[test]
    fn test_retry_after_only_for_rate_limits() {
        let err = classify(
            StatusCode::SERVICE_UNAVAILABLE,
            &headers_with_retry_after("30"),
            b"",
        );
        assert_eq!(err.kind, ApiErrorKind::Other);
        assert_eq!(err.retry_after(), None);
    }
}
