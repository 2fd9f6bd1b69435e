//! Normalization of backend error responses into one readable message

use reqwest::{Response, StatusCode, header::CONTENT_TYPE};
use serde_json::Value;
use tracing::warn;

use crate::error::ApiError;

/// Generic message used when the body carries nothing readable
pub fn server_error_message(status: StatusCode) -> String {
    format!(
        "Server error: {} {}",
        status.as_u16(),
        status.canonical_reason().unwrap_or_default()
    )
    .trim_end()
    .to_string()
}

/// Turn a failed response into an error, reading its JSON body when there is one
///
/// A message found in the body becomes [`ApiError::Validation`]; anything
/// else falls back to [`ApiError::RequestFailed`] with the status line.
pub(crate) async fn parse_error_response(response: Response) -> ApiError {
    let status = response.status();
    let fallback = server_error_message(status);

    let is_json = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|content_type| content_type.contains("application/json"));
    if !is_json {
        return ApiError::RequestFailed(fallback);
    }

    let body = match response.text().await {
        Ok(body) => body,
        Err(e) => {
            warn!("Failed to read error body: {}", e);
            return ApiError::RequestFailed(fallback);
        }
    };

    match error_message_from_body(&body) {
        Some(message) => ApiError::Validation(message),
        None => ApiError::RequestFailed(fallback),
    }
}

/// Extract the message from a JSON error body
///
/// Precedence: `detail`, `message`, first of `non_field_errors`, a bare
/// string body, then per-field errors flattened as `"field: a, b; other: c"`.
pub fn error_message_from_body(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;

    match value {
        Value::String(message) if !message.is_empty() => Some(message),
        Value::Object(fields) => {
            for key in ["detail", "message"] {
                if let Some(value) = fields.get(key).filter(|v| is_truthy(v)) {
                    return Some(as_text(value));
                }
            }

            if let Some(first) = fields
                .get("non_field_errors")
                .and_then(Value::as_array)
                .and_then(|errors| errors.first())
            {
                return Some(as_text(first));
            }

            let flattened = fields
                .iter()
                .map(|(field, messages)| {
                    let messages = match messages {
                        Value::Array(items) => {
                            items.iter().map(as_text).collect::<Vec<_>>().join(", ")
                        }
                        other => as_text(other),
                    };
                    format!("{}: {}", field, messages)
                })
                .collect::<Vec<_>>()
                .join("; ");

            (!flattened.is_empty()).then_some(flattened)
        }
        _ => None,
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn as_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detail_wins() {
        let body = r#"{"detail": "Invalid credentials", "message": "ignored"}"#;
        assert_eq!(
            error_message_from_body(body).as_deref(),
            Some("Invalid credentials")
        );
    }

    #[test]
    fn test_message_then_non_field_errors() {
        assert_eq!(
            error_message_from_body(r#"{"detail": "", "message": "Try again"}"#).as_deref(),
            Some("Try again")
        );
        assert_eq!(
            error_message_from_body(
                r#"{"non_field_errors": ["Unable to log in with provided credentials.", "x"]}"#
            )
            .as_deref(),
            Some("Unable to log in with provided credentials.")
        );
    }

    #[test]
    fn test_string_body() {
        assert_eq!(
            error_message_from_body(r#""Account locked""#).as_deref(),
            Some("Account locked")
        );
    }

    #[test]
    fn test_single_field_error() {
        assert_eq!(
            error_message_from_body(r#"{"email": ["Invalid"]}"#).as_deref(),
            Some("email: Invalid")
        );
    }

    #[test]
    fn test_field_errors_keep_body_order() {
        let body = r#"{"username": ["Taken", "Too short"], "email": ["Invalid"], "age": "Required"}"#;
        assert_eq!(
            error_message_from_body(body).as_deref(),
            Some("username: Taken, Too short; email: Invalid; age: Required")
        );
    }

    #[test]
    fn test_unreadable_bodies_yield_nothing() {
        assert_eq!(error_message_from_body("<html>oops</html>"), None);
        assert_eq!(error_message_from_body("{}"), None);
        assert_eq!(error_message_from_body("[1, 2]"), None);
        assert_eq!(error_message_from_body("42"), None);
        assert_eq!(error_message_from_body(r#""""#), None);
    }

    #[test]
    fn test_server_error_message() {
        assert_eq!(
            server_error_message(StatusCode::INTERNAL_SERVER_ERROR),
            "Server error: 500 Internal Server Error"
        );
        assert_eq!(
            server_error_message(StatusCode::BAD_GATEWAY),
            "Server error: 502 Bad Gateway"
        );
    }
}
