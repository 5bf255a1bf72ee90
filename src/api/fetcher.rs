// src/api/fetcher.rs
//! Retrieves the full record behind an object reference.

use super::endpoints::get_object;
use super::parser::parse_object_envelope;
use super::{execute_async, execute_blocking, ApiResponse, AsyncTransport, Transport};
use crate::error::LoaderError;
use crate::error_recovery::RetryPolicy;
use crate::model::{ObjectRecord, ObjectReference};

/// What a single object fetch produced.
#[derive(Debug, Clone)]
pub enum FetchOutcome {
    Found(ObjectRecord),
    /// The object was listed but is gone (404/410). Callers skip it.
    Missing,
}

impl FetchOutcome {
    /// The record, or [`LoaderError::ObjectNotFound`] for a missing object.
    pub fn into_record(self, reference: &ObjectReference) -> Result<ObjectRecord, LoaderError> {
        match self {
            FetchOutcome::Found(record) => Ok(record),
            FetchOutcome::Missing => Err(LoaderError::ObjectNotFound {
                space_id: reference.space_id.to_string(),
                object_id: reference.object_id.to_string(),
            }),
        }
    }
}

fn classify(
    reference: &ObjectReference,
    response: Result<ApiResponse<String>, LoaderError>,
) -> Result<FetchOutcome, LoaderError> {
    match response {
        Ok(response) => Ok(FetchOutcome::Found(parse_object_envelope(&response)?)),
        Err(e) if e.api_code().is_some_and(|code| code.is_not_found()) => {
            log::debug!(
                "Object {} vanished from space {}: {}",
                reference.object_id,
                reference.space_id,
                e
            );
            Ok(FetchOutcome::Missing)
        }
        Err(e) => Err(e),
    }
}

pub fn fetch_object_blocking(
    transport: &dyn Transport,
    reference: &ObjectReference,
    retry: &RetryPolicy,
) -> Result<FetchOutcome, LoaderError> {
    classify(
        reference,
        execute_blocking(transport, &get_object(reference), retry),
    )
}

pub async fn fetch_object_async(
    transport: &dyn AsyncTransport,
    reference: &ObjectReference,
    retry: &RetryPolicy,
) -> Result<FetchOutcome, LoaderError> {
    let response = execute_async(transport, &get_object(reference), retry).await;
    classify(reference, response)
}
