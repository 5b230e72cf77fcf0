//! Classification of HTTP outcomes into the desk's failure taxonomy.
//!
//! A response that never arrived is a transport failure. A response that did
//! arrive but carries an error status, or a body flagged `success: false`, is
//! an application failure whose reason comes from the body's `message` (or
//! `error`) field, falling back to the status text.

use std::time::Duration;

use reqwest::StatusCode;
use serde_json::Value;

use crate::error::DeskError;

/// Extract the server's own reason from an error body
pub fn reason_from_body(body: &Value) -> Option<String> {
    ["message", "error"]
        .iter()
        .filter_map(|key| body.get(*key))
        .find_map(|v| match v {
            Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            Value::Object(inner) => inner
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string),
            _ => None,
        })
}

/// Build the failure for a non-success HTTP status
pub fn from_status(status: StatusCode, body: &[u8]) -> DeskError {
    let reason = serde_json::from_slice::<Value>(body)
        .ok()
        .as_ref()
        .and_then(reason_from_body)
        .unwrap_or_else(|| {
            format!(
                "HTTP {} {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("Unknown")
            )
        });

    DeskError::Application {
        status: Some(status.as_u16()),
        reason,
    }
}

/// Detect a 2xx body that still reports failure
pub fn from_success_body(body: &Value) -> Option<DeskError> {
    if body.get("success").and_then(Value::as_bool) == Some(false) {
        let reason =
            reason_from_body(body).unwrap_or_else(|| "the server rejected the request".to_string());
        return Some(DeskError::application(reason));
    }
    None
}

/// Classify a send/receive error from reqwest
pub fn from_request_error(err: reqwest::Error, timeout: Duration) -> DeskError {
    if err.is_timeout() {
        return DeskError::Timeout(timeout.as_secs());
    }
    if err.is_connect() {
        return DeskError::Transport(format!("connection failed: {}", root_cause(&err)));
    }
    DeskError::from(err)
}

fn root_cause(err: &(dyn std::error::Error + 'static)) -> String {
    let mut current = err;
    while let Some(source) = current.source() {
        current = source;
    }
    current.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FailureKind;
    use serde_json::json;

    #[test]
    fn test_reason_from_message_field() {
        let err = from_status(
            StatusCode::CONFLICT,
            br#"{"message": "A ship with IMO 9074729 already exists"}"#,
        );
        assert_eq!(err.kind(), FailureKind::Application);
        assert_eq!(err.to_string(), "A ship with IMO 9074729 already exists");
    }

    #[test]
    fn test_reason_from_error_field() {
        let err = from_status(StatusCode::BAD_REQUEST, br#"{"error": "name is required"}"#);
        assert_eq!(err.to_string(), "name is required");
    }

    #[test]
    fn test_reason_falls_back_to_status() {
        let err = from_status(StatusCode::INTERNAL_SERVER_ERROR, b"<html>oops</html>");
        assert_eq!(err.to_string(), "HTTP 500 Internal Server Error");
        match err {
            DeskError::Application { status, .. } => assert_eq!(status, Some(500)),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_success_false_body() {
        let err = from_success_body(&json!({"success": false, "message": "Report not saved"}))
            .expect("should be a failure");
        assert_eq!(err.to_string(), "Report not saved");
        assert!(from_success_body(&json!({"success": true, "message": "ok"})).is_none());
        assert!(from_success_body(&json!({"message": "ok"})).is_none());
    }
}
