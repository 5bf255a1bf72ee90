// src/error.rs
//! Loader error types with structured error handling.
//!
//! Error types form the vocabulary for failure modes in the loader.
//! Each variant tells the story of what went wrong and where, so a caller
//! can tell a missing space from a vanished object from a dead network.

use crate::constants::ERROR_BODY_PREVIEW_LENGTH;
use std::fmt;
use thiserror::Error;

/// Anytype API error codes as a typed vocabulary.
///
/// The API reports failures as `{"code": "...", "message": "..."}`; the
/// code is decoded here so recovery can match on variants instead of
/// strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiErrorCode {
    /// Request parameters failed validation
    BadRequest,
    /// API key is missing, invalid or revoked
    Unauthorized,
    /// API key lacks permission for this space or object
    Forbidden,
    /// The requested space or object does not exist
    NotFound,
    /// The object existed but was deleted
    Gone,
    /// API rate limit exceeded
    RateLimited,
    /// Anytype internal server error
    InternalError,
    /// Anytype is temporarily unavailable
    ServiceUnavailable,
    /// HTTP status code fallback when the error body is unparseable
    HttpStatus(u16),
    /// An error code this client doesn't recognize yet
    Unknown(String),
}

impl ApiErrorCode {
    /// Parse an Anytype API error code string into the typed vocabulary.
    pub fn from_api_response(code: &str) -> Self {
        match code {
            "bad_request" | "validation_error" => Self::BadRequest,
            "unauthorized" => Self::Unauthorized,
            "forbidden" => Self::Forbidden,
            "not_found" | "object_not_found" => Self::NotFound,
            "gone" => Self::Gone,
            "rate_limit_exceeded" | "rate_limited" => Self::RateLimited,
            "internal_server_error" => Self::InternalError,
            "service_unavailable" => Self::ServiceUnavailable,
            other => Self::Unknown(other.to_string()),
        }
    }

    /// Create from an HTTP status code when the error body is unparseable.
    pub fn from_http_status(status: u16) -> Self {
        match status {
            400 => Self::BadRequest,
            401 => Self::Unauthorized,
            403 => Self::Forbidden,
            404 => Self::NotFound,
            410 => Self::Gone,
            429 => Self::RateLimited,
            500 => Self::InternalError,
            503 => Self::ServiceUnavailable,
            other => Self::HttpStatus(other),
        }
    }

    /// Whether this error is transient and worth retrying.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::RateLimited | Self::ServiceUnavailable)
    }

    /// Whether this error means the resource simply doesn't exist (anymore).
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound | Self::Gone)
    }
}

impl fmt::Display for ApiErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BadRequest => write!(f, "bad_request"),
            Self::Unauthorized => write!(f, "unauthorized"),
            Self::Forbidden => write!(f, "forbidden"),
            Self::NotFound => write!(f, "not_found"),
            Self::Gone => write!(f, "gone"),
            Self::RateLimited => write!(f, "rate_limit_exceeded"),
            Self::InternalError => write!(f, "internal_server_error"),
            Self::ServiceUnavailable => write!(f, "service_unavailable"),
            Self::HttpStatus(code) => write!(f, "http_{}", code),
            Self::Unknown(code) => write!(f, "{}", code),
        }
    }
}

/// Coarse classification of a [`LoaderError`], one per failure policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad or missing options; raised before any request is made.
    Configuration,
    /// A requested space name did not resolve; aborts the whole run.
    SpaceResolution,
    /// Paginating a space's objects failed; aborts that space.
    Listing,
    /// An object vanished between listing and fetch; skipped by the loader.
    ObjectNotFound,
    /// Network, auth or rate-limit failure; propagated without retry.
    Transport,
    /// The API answered with a body the loader cannot interpret.
    MalformedResponse,
    /// The caller cancelled the run.
    Cancelled,
}

/// Main loader error type.
#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    #[error(transparent)]
    Validation(#[from] crate::types::ValidationError),

    #[error("Space not found: {}", names.join(", "))]
    SpaceNotFound { names: Vec<String> },

    #[error("Listing objects of space {space_id} failed at offset {offset}: {source}")]
    Listing {
        space_id: String,
        offset: usize,
        #[source]
        source: Box<LoaderError>,
    },

    #[error("Object {object_id} not found in space {space_id}")]
    ObjectNotFound { space_id: String, object_id: String },

    #[error("Network failure: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Anytype API returned an error ({code}) for {url}: {message}")]
    Api {
        code: ApiErrorCode,
        status: reqwest::StatusCode,
        url: String,
        message: String,
    },

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Loading was cancelled")]
    Cancelled,
}

impl LoaderError {
    /// Maps this error onto the failure policy it belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Configuration(_) | Self::Validation(_) => ErrorKind::Configuration,
            Self::SpaceNotFound { .. } => ErrorKind::SpaceResolution,
            Self::Listing { .. } => ErrorKind::Listing,
            Self::ObjectNotFound { .. } => ErrorKind::ObjectNotFound,
            Self::Network(_) | Self::Api { .. } => ErrorKind::Transport,
            Self::MalformedResponse(_) => ErrorKind::MalformedResponse,
            Self::Cancelled => ErrorKind::Cancelled,
        }
    }

    /// The API error code, if this error (or the listing failure it wraps)
    /// came from a non-success HTTP response.
    pub fn api_code(&self) -> Option<&ApiErrorCode> {
        match self {
            Self::Api { code, .. } => Some(code),
            Self::Listing { source, .. } => source.api_code(),
            _ => None,
        }
    }

    /// Whether retrying the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        self.api_code().is_some_and(ApiErrorCode::is_retryable)
    }

    pub(crate) fn listing(space_id: &str, offset: usize, source: LoaderError) -> Self {
        Self::Listing {
            space_id: space_id.to_string(),
            offset,
            source: Box::new(source),
        }
    }
}

impl From<serde_json::Error> for LoaderError {
    fn from(err: serde_json::Error) -> Self {
        LoaderError::MalformedResponse(err.to_string())
    }
}

/// Truncates a response body for inclusion in an error message.
pub(crate) fn preview_body(body: &str) -> String {
    if body.chars().count() > ERROR_BODY_PREVIEW_LENGTH {
        let head: String = body.chars().take(ERROR_BODY_PREVIEW_LENGTH).collect();
        format!("{}...", head)
    } else {
        body.to_string()
    }
}
