//! Error types for the Dixa client, and the classifier that maps failed
//! responses onto them.
//!
//! # Design
//! The remote side only ever produces three kinds of failure from the
//! caller's point of view, and the status code alone decides which:
//! 400 is `BadRequest`, 401 is `Unauthorized`, everything else non-2xx is
//! `ServerError`. The remaining variants cover failures that happen on our
//! side of the wire and never come from `classify`.

use serde_json::Value;

use crate::http::HttpResponse;

/// Errors returned by `DixaClient` operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// The server returned 400. `message` is the entire raw response body,
    /// decoded lossily if it was not valid UTF-8.
    #[error("bad request: {message}")]
    BadRequest { message: String },

    /// The server returned 401. `message` is the body's `message` field.
    #[error("unauthorized: {message}")]
    Unauthorized { message: String },

    /// The server returned any other non-2xx status.
    #[error("server error (HTTP {status}): {message}")]
    ServerError { status: u16, message: String },

    /// No response was received (DNS failure, refused connection, timeout).
    #[error("transport failed: {0}")]
    Transport(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// A 2xx response body was not valid JSON.
    #[error("deserialization failed: {0}")]
    Deserialization(String),
}

impl ApiError {
    /// HTTP status behind a classified error, if there is one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::BadRequest { .. } => Some(400),
            ApiError::Unauthorized { .. } => Some(401),
            ApiError::ServerError { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Map a failed response to exactly one classified error.
///
/// Total over the status domain: any status other than 400 and 401 becomes
/// `ServerError`, including codes that are not errors at all.
pub fn classify(response: &HttpResponse) -> ApiError {
    match response.status {
        400 => ApiError::BadRequest {
            message: response.body.clone(),
        },
        401 => ApiError::Unauthorized {
            message: message_field(&response.body),
        },
        status => ApiError::ServerError {
            status,
            message: message_field(&response.body),
        },
    }
}

/// The body's `message` field as text, or empty when the body is not a JSON
/// object carrying one.
fn message_field(body: &str) -> String {
    let Ok(value) = serde_json::from_str::<Value>(body) else {
        return String::new();
    };
    match value.get("message") {
        Some(Value::String(message)) => message.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(status: u16, body: &str) -> HttpResponse {
        HttpResponse {
            status,
            headers: Vec::new(),
            body: body.to_string(),
        }
    }

    #[test]
    fn bad_request_carries_entire_body() {
        let body = r#"{"message":"Invalid email","errors":[{"field":"email"}]}"#;
        let err = classify(&response(400, body));
        assert_eq!(
            err,
            ApiError::BadRequest {
                message: body.to_string()
            }
        );
    }

    #[test]
    fn bad_request_keeps_non_json_body() {
        let err = classify(&response(400, "plain text failure"));
        assert!(matches!(err, ApiError::BadRequest { message } if message == "plain text failure"));
    }

    #[test]
    fn unauthorized_uses_message_field() {
        let err = classify(&response(401, r#"{"message":"Invalid token"}"#));
        assert_eq!(
            err,
            ApiError::Unauthorized {
                message: "Invalid token".to_string()
            }
        );
    }

    #[test]
    fn other_statuses_are_server_errors() {
        for status in [403, 404, 409, 429, 500, 502, 503] {
            let err = classify(&response(status, r#"{"message":"nope"}"#));
            assert_eq!(
                err,
                ApiError::ServerError {
                    status,
                    message: "nope".to_string()
                },
                "status {status}"
            );
        }
    }

    #[test]
    fn missing_message_field_is_empty() {
        let err = classify(&response(500, r#"{"error":"boom"}"#));
        assert!(matches!(err, ApiError::ServerError { status: 500, message } if message.is_empty()));

        let err = classify(&response(401, "<html>gateway</html>"));
        assert!(matches!(err, ApiError::Unauthorized { message } if message.is_empty()));
    }

    #[test]
    fn structured_message_field_is_rendered_as_json() {
        let err = classify(&response(503, r#"{"message":{"code":7}}"#));
        assert!(matches!(err, ApiError::ServerError { message, .. } if message == r#"{"code":7}"#));
    }

    #[test]
    fn status_accessor() {
        assert_eq!(classify(&response(400, "")).status(), Some(400));
        assert_eq!(classify(&response(401, "")).status(), Some(401));
        assert_eq!(classify(&response(418, "")).status(), Some(418));
        assert_eq!(ApiError::Transport("refused".into()).status(), None);
    }

    #[test]
    fn display_includes_kind_and_message() {
        let err = classify(&response(502, r#"{"message":"upstream"}"#));
        assert_eq!(err.to_string(), "server error (HTTP 502): upstream");
    }
}
