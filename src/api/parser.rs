// src/api/parser.rs
//! Response parsing: status checks and JSON envelope extraction.
//!
//! Keeps the HTTP clients free of JSON handling and the pipeline stages
//! free of status-code handling.

use super::pagination::Page;
use super::ApiResponse;
use crate::error::{preview_body, ApiErrorCode, LoaderError};
use crate::model::ObjectRecord;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

/// Error body shape returned by the Anytype API.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default, deserialize_with = "crate::model::lenient")]
    code: Option<String>,
    #[serde(default, deserialize_with = "crate::model::lenient")]
    message: Option<String>,
    #[serde(default, deserialize_with = "crate::model::lenient")]
    error: Option<String>,
}

/// Passes success responses through and turns anything else into
/// [`LoaderError::Api`].
pub fn ensure_success(response: ApiResponse<String>) -> Result<ApiResponse<String>, LoaderError> {
    if response.status.is_success() {
        return Ok(response);
    }
    Err(error_from_response(&response))
}

fn error_from_response(response: &ApiResponse<String>) -> LoaderError {
    let body: ErrorBody = serde_json::from_str(&response.data).unwrap_or_default();

    let status_code = ApiErrorCode::from_http_status(response.status.as_u16());
    let code = body
        .code
        .as_deref()
        .map(ApiErrorCode::from_api_response)
        .filter(|code| !matches!(code, ApiErrorCode::Unknown(_)))
        .unwrap_or(status_code);

    let message = body
        .message
        .or(body.error)
        .filter(|message| !message.is_empty())
        .unwrap_or_else(|| {
            if response.data.trim().is_empty() {
                response.status.to_string()
            } else {
                preview_body(&response.data)
            }
        });

    log::debug!(
        "API error {} from {}: {}",
        response.status,
        response.url,
        message
    );

    LoaderError::Api {
        code,
        status: response.status,
        url: response.url.clone(),
        message,
    }
}

fn parse_json(response: &ApiResponse<String>) -> Result<Value, LoaderError> {
    serde_json::from_str(&response.data).map_err(|e| {
        LoaderError::MalformedResponse(format!(
            "{} from {}: {}",
            e,
            response.url,
            preview_body(&response.data)
        ))
    })
}

/// Parses a `{"data": [...], "pagination": {...}}` listing page.
///
/// A body without a `data` array is treated as an empty page. Entries
/// that do not deserialize as `T` are skipped but still counted in
/// [`Page::returned`].
pub fn parse_list_page<T: DeserializeOwned>(
    response: &ApiResponse<String>,
) -> Result<Page<T>, LoaderError> {
    let value = parse_json(response)?;

    let Some(entries) = value.get("data").and_then(Value::as_array) else {
        log::warn!(
            "Unexpected listing response from {}; treating it as empty",
            response.url
        );
        return Ok(Page::empty());
    };

    let has_more = value
        .get("pagination")
        .and_then(|p| p.get("has_more"))
        .and_then(Value::as_bool);

    let items = entries
        .iter()
        .filter_map(|entry| match T::deserialize(entry) {
            Ok(item) => Some(item),
            Err(e) => {
                log::warn!("Skipping malformed listing entry from {}: {}", response.url, e);
                None
            }
        })
        .collect();

    Ok(Page {
        items,
        returned: entries.len(),
        has_more,
    })
}

/// Extracts the record from a `{"object": {...}}` envelope.
pub fn parse_object_envelope(response: &ApiResponse<String>) -> Result<ObjectRecord, LoaderError> {
    let mut value = parse_json(response)?;

    match value.get_mut("object").map(Value::take) {
        Some(object @ Value::Object(_)) => Ok(serde_json::from_value(object)?),
        _ => Err(LoaderError::MalformedResponse(format!(
            "missing object envelope in response from {}: {}",
            response.url,
            preview_body(&response.data)
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SpaceSummary;
    use reqwest::StatusCode;

    fn response(status: u16, body: &str) -> ApiResponse<String> {
        ApiResponse {
            data: body.to_string(),
            status: StatusCode::from_u16(status).unwrap(),
            url: "http://localhost:31009/v1/spaces".to_string(),
        }
    }

    #[test]
    fn test_success_passes_through() {
        assert!(ensure_success(response(200, "{}")).is_ok());
    }

    #[test]
    fn test_error_body_code_and_message() {
        let err = ensure_success(response(
            401,
            r#"{"object":"error","status":401,"code":"unauthorized","message":"invalid api key"}"#,
        ))
        .unwrap_err();

        match err {
            LoaderError::Api { code, message, .. } => {
                assert_eq!(code, ApiErrorCode::Unauthorized);
                assert_eq!(message, "invalid api key");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_error_falls_back_to_status() {
        let err = ensure_success(response(503, "")).unwrap_err();
        assert_eq!(err.api_code(), Some(&ApiErrorCode::ServiceUnavailable));
        assert!(err.is_retryable());
    }

    #[test]
    fn test_list_page_counts_skipped_entries() {
        let page: Page<SpaceSummary> = parse_list_page(&response(
            200,
            r#"{"data":[{"id":"s1","name":"A"},"junk"],"pagination":{"has_more":true}}"#,
        ))
        .unwrap();

        assert_eq!(page.items.len(), 1);
        assert_eq!(page.returned, 2);
        assert_eq!(page.has_more, Some(true));
    }

    #[test]
    fn test_list_page_without_data_is_empty() {
        let page: Page<SpaceSummary> = parse_list_page(&response(200, r#"{"items":[]}"#)).unwrap();
        assert_eq!(page.returned, 0);
        assert_eq!(page.has_more, None);
    }

    #[test]
    fn test_invalid_json_is_malformed() {
        let err = parse_list_page::<SpaceSummary>(&response(200, "<html>")).unwrap_err();
        assert!(matches!(err, LoaderError::MalformedResponse(_)));
    }

    #[test]
    fn test_object_envelope() {
        let record = parse_object_envelope(&response(
            200,
            r##"{"object":{"id":"o1","markdown":"# Hi"}}"##,
        ))
        .unwrap();
        assert_eq!(record.id.as_deref(), Some("o1"));

        let err = parse_object_envelope(&response(200, r#"{"id":"o1"}"#)).unwrap_err();
        assert!(matches!(err, LoaderError::MalformedResponse(_)));
    }
}
