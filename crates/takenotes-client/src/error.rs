use serde_json::Value;
use thiserror::Error;

const GENERIC_MESSAGE: &str = "An unexpected error occurred";
const NETWORK_MESSAGE: &str = "Network error. Please check your connection.";

/// Failure taxonomy for TakeNotes API calls.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced an HTTP response.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The server answered with a non-success status. The body is kept as
    /// parsed JSON (or a JSON string for non-JSON bodies) for message
    /// derivation.
    #[error("request failed with status {status}")]
    Status { status: u16, body: Option<Value> },

    /// A 2xx body did not match the expected shape.
    #[error("unexpected response shape: {0}")]
    Decode(#[from] serde_json::Error),

    /// A registration or refresh response carried no token material.
    #[error("server response did not include tokens")]
    MissingTokens,

    #[error("invalid API base URL: {0}")]
    BaseUrl(#[from] url::ParseError),
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// Human-readable message for toasts.
    ///
    /// Inspects, in order: network failure, a string body, an array body
    /// (joined by newline), then the structured fields `detail`, `message`,
    /// `error`, `non_field_errors` and per-field error arrays, falling back
    /// to a generic message.
    pub fn user_message(&self) -> String {
        match self {
            Self::Network(_) => NETWORK_MESSAGE.to_owned(),
            Self::Status {
                body: Some(body), ..
            } => message_from_body(body).unwrap_or_else(|| GENERIC_MESSAGE.to_owned()),
            Self::Status { body: None, .. } => GENERIC_MESSAGE.to_owned(),
            other => other.to_string(),
        }
    }
}

fn message_from_body(body: &Value) -> Option<String> {
    match body {
        Value::String(s) => Some(s.clone()),
        Value::Array(items) if !items.is_empty() => Some(join_values(items, "\n")),
        Value::Object(map) => {
            for key in ["detail", "message", "error"] {
                if let Some(Value::String(s)) = map.get(key) {
                    return Some(s.clone());
                }
            }

            if let Some(Value::Array(items)) = map.get("non_field_errors")
                && !items.is_empty()
            {
                return Some(join_values(items, "\n"));
            }

            // Per-field validation errors: { field: ["msg", ...], ... },
            // possibly nested one level under an "errors" object.
            let mut parts = Vec::new();
            for (key, value) in map {
                if key.as_str() == "errors" {
                    if let Value::Object(fields) = value {
                        for (field, messages) in fields {
                            push_field_error(&mut parts, field, messages);
                        }
                    }
                } else {
                    push_field_error(&mut parts, key, value);
                }
            }
            if parts.is_empty() {
                None
            } else {
                Some(parts.join("\n"))
            }
        }
        _ => None,
    }
}

fn push_field_error(parts: &mut Vec<String>, field: &str, value: &Value) {
    match value {
        Value::Array(messages) if !messages.is_empty() => {
            parts.push(format!("{field}: {}", join_values(messages, ", ")));
        }
        Value::String(s) => parts.push(format!("{field}: {s}")),
        _ => {}
    }
}

fn join_values(items: &[Value], separator: &str) -> String {
    items
        .iter()
        .map(|item| match item {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
        .collect::<Vec<_>>()
        .join(separator)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn status_error(body: Value) -> ApiError {
        ApiError::Status {
            status: 400,
            body: Some(body),
        }
    }

    #[test]
    fn string_body_is_returned_verbatim() {
        assert_eq!(status_error(json!("quota exceeded")).user_message(), "quota exceeded");
    }

    #[test]
    fn array_body_joins_with_newlines() {
        let err = status_error(json!(["first", "second"]));
        assert_eq!(err.user_message(), "first\nsecond");
    }

    #[test]
    fn detail_takes_precedence() {
        let err = status_error(json!({"detail": "not found", "message": "ignored"}));
        assert_eq!(err.user_message(), "not found");
    }

    #[test]
    fn message_and_error_fields_are_recognized() {
        assert_eq!(status_error(json!({"message": "m"})).user_message(), "m");
        assert_eq!(status_error(json!({"error": "e"})).user_message(), "e");
    }

    #[test]
    fn non_field_errors_join_with_newlines() {
        let err = status_error(json!({"non_field_errors": ["a", "b"]}));
        assert_eq!(err.user_message(), "a\nb");
    }

    #[test]
    fn field_errors_render_as_field_lines() {
        let err = status_error(json!({"password": ["too short", "too common"]}));
        assert_eq!(err.user_message(), "password: too short, too common");
    }

    #[test]
    fn nested_errors_object_is_flattened() {
        let err = status_error(json!({"errors": {"title": ["required"]}}));
        assert_eq!(err.user_message(), "title: required");
    }

    #[test]
    fn unrecognized_body_falls_back_to_generic() {
        assert_eq!(status_error(json!(42)).user_message(), GENERIC_MESSAGE);
        assert_eq!(status_error(json!({})).user_message(), GENERIC_MESSAGE);
        let bodyless = ApiError::Status {
            status: 500,
            body: None,
        };
        assert_eq!(bodyless.user_message(), GENERIC_MESSAGE);
    }

    #[test]
    fn status_helpers() {
        let err = ApiError::Status {
            status: 401,
            body: None,
        };
        assert!(err.is_unauthorized());
        assert!(!err.is_not_found());
        assert!(ApiError::MissingTokens.status().is_none());
    }
}
