//! Mapping of Admin API responses to client errors
//!
//! Ghost reports failures as `{"errors": [{"message": ..., "type": ...}]}`.
//! The status code decides the error class; the body only supplies detail.

use ghostkit_domain::{GhostError, ServerErrorDetail};
use reqwest::StatusCode;
use serde_json::Value;

const DEFAULT_VALIDATION_MESSAGE: &str = "Validation failed";

/// Map a response to an error, or `None` for 2xx statuses.
pub fn map_response(status: StatusCode, resource: &str, body: &str) -> Option<GhostError> {
    if status.is_success() {
        None
    } else {
        Some(map_status_error(status, resource, body))
    }
}

/// Map a non-2xx status and its raw body to a [`GhostError`].
///
/// 401 and 403 are authentication failures whatever the body says. A body
/// that is not JSON is kept as a string value on [`GhostError::Api`].
pub fn map_status_error(status: StatusCode, resource: &str, body: &str) -> GhostError {
    let payload = parse_body(body);
    let details = payload.as_ref().map(parse_server_errors).unwrap_or_default();
    let first_message = details.iter().map(|d| d.message.as_str()).find(|m| !m.is_empty());

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => GhostError::Auth {
            status: Some(status.as_u16()),
            message: first_message.map_or_else(|| status_text(status), str::to_string),
        },
        StatusCode::NOT_FOUND => GhostError::NotFound {
            resource: resource.to_string(),
            message: first_message.unwrap_or_default().to_string(),
        },
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => GhostError::Validation {
            status: status.as_u16(),
            message: first_message.unwrap_or(DEFAULT_VALIDATION_MESSAGE).to_string(),
            errors: details,
            payload,
        },
        _ => {
            let message = first_message.map_or_else(|| status_text(status), str::to_string);
            let body = payload.or_else(|| {
                let trimmed = body.trim();
                (!trimmed.is_empty()).then(|| Value::String(trimmed.to_string()))
            });
            GhostError::Api { status: status.as_u16(), message, body }
        }
    }
}

/// Extract the `errors` array from a Ghost error payload.
///
/// Entries that are not objects are skipped; a missing array yields nothing.
pub fn parse_server_errors(payload: &Value) -> Vec<ServerErrorDetail> {
    payload
        .get("errors")
        .and_then(Value::as_array)
        .map(|entries| {
            entries
                .iter()
                .filter(|entry| entry.is_object())
                .filter_map(|entry| serde_json::from_value(entry.clone()).ok())
                .collect()
        })
        .unwrap_or_default()
}

fn parse_body(body: &str) -> Option<Value> {
    if body.trim().is_empty() {
        return None;
    }
    serde_json::from_str(body).ok()
}

fn status_text(status: StatusCode) -> String {
    status.canonical_reason().map_or_else(|| format!("HTTP {}", status.as_u16()), str::to_string)
}

#[cfg(test)]
mod tests {
    use ghostkit_domain::GhostErrorKind;
    use serde_json::json;

    use super::*;

    #[test]
    fn test_success_maps_to_none() {
        assert!(map_response(StatusCode::OK, "/site/", "{}").is_none());
        assert!(map_response(StatusCode::NO_CONTENT, "/posts/1/", "").is_none());
        assert!(map_response(StatusCode::BAD_GATEWAY, "/site/", "").is_some());
    }

    #[test]
    fn test_auth_regardless_of_body() {
        for (status, body) in [
            (StatusCode::UNAUTHORIZED, ""),
            (StatusCode::UNAUTHORIZED, "<html>nope</html>"),
            (StatusCode::FORBIDDEN, r#"{"errors":[{"message":"Permission error"}]}"#),
        ] {
            let err = map_status_error(status, "/site/", body);
            assert_eq!(err.kind(), GhostErrorKind::Auth, "{status} {body}");
            assert_eq!(err.status(), Some(status.as_u16()));
        }

        let err = map_status_error(StatusCode::UNAUTHORIZED, "/site/", "");
        assert_eq!(err.to_string(), "Authentication failed: Unauthorized");
    }

    #[test]
    fn test_not_found_keeps_resource() {
        let err = map_status_error(
            StatusCode::NOT_FOUND,
            "/ghost/api/admin/posts/abc/",
            r#"{"errors":[{"message":"Post not found."}]}"#,
        );

        match err {
            GhostError::NotFound { resource, message } => {
                assert_eq!(resource, "/ghost/api/admin/posts/abc/");
                assert_eq!(message, "Post not found.");
            }
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[test]
    fn test_validation_carries_messages_and_payload() {
        let body = r#"{"errors":[
            {"message":"Validation error, cannot save post.","type":"ValidationError"},
            {"message":"Title is too long"}
        ]}"#;
        let err = map_status_error(StatusCode::UNPROCESSABLE_ENTITY, "/posts/", body);

        assert_eq!(err.kind(), GhostErrorKind::Validation);
        assert_eq!(
            err.validation_messages(),
            vec!["Validation error, cannot save post.", "Title is too long"]
        );
        assert_eq!(err.to_string(), "Validation failed: Validation error, cannot save post.");
        assert_eq!(err.payload().and_then(|p| p["errors"].as_array()).map(Vec::len), Some(2));
    }

    #[test]
    fn test_validation_default_message() {
        let err = map_status_error(StatusCode::BAD_REQUEST, "/posts/", "not json");

        assert!(matches!(
            &err,
            GhostError::Validation { status: 400, message, payload: None, .. }
                if message == "Validation failed"
        ));
        assert!(err.validation_messages().is_empty());
    }

    #[test]
    fn test_other_statuses_keep_body() {
        let err = map_status_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "/site/",
            r#"{"errors":[{"message":"Something broke"}]}"#,
        );
        assert!(matches!(&err, GhostError::Api { status: 500, message, body: Some(_) }
            if message == "Something broke"));

        let err = map_status_error(StatusCode::SERVICE_UNAVAILABLE, "/site/", "upstream down");
        assert_eq!(err.payload(), Some(&json!("upstream down")));
        assert_eq!(err.to_string(), "API error 503: Service Unavailable");

        let err = map_status_error(StatusCode::TOO_MANY_REQUESTS, "/site/", "");
        assert_eq!(err.kind(), GhostErrorKind::Api);
        assert_eq!(err.payload(), None);
    }

    #[test]
    fn test_parse_server_errors_skips_garbage() {
        let payload = json!({"errors": ["oops", {"message": "real", "context": "ctx"}, 5]});
        let details = parse_server_errors(&payload);

        assert_eq!(details.len(), 1);
        assert_eq!(details[0].message, "real");
        assert_eq!(details[0].context.as_deref(), Some("ctx"));
        assert!(parse_server_errors(&json!({"posts": []})).is_empty());
    }
}
