// src/api/endpoints.rs
//! Request builders for the four endpoints the loader reads.

use super::pagination::PageWindow;
use super::ApiRequest;
use crate::model::ObjectReference;
use crate::types::SpaceId;
use serde_json::json;

const API_PREFIX: &str = "v1";

fn paged(request: ApiRequest, window: PageWindow) -> ApiRequest {
    request
        .with_query("limit", window.limit)
        .with_query("offset", window.offset)
}

/// `GET /v1/spaces?limit&offset`
pub fn list_spaces(window: PageWindow) -> ApiRequest {
    paged(ApiRequest::get([API_PREFIX, "spaces"]), window)
}

/// `GET /v1/spaces/:space_id/objects?limit&offset`
pub fn list_objects(space_id: &SpaceId, window: PageWindow) -> ApiRequest {
    paged(
        ApiRequest::get([API_PREFIX, "spaces", space_id.as_str(), "objects"]),
        window,
    )
}

/// `POST /v1/spaces/:space_id/search?limit&offset` with `{"query": ...}`.
pub fn search_objects(space_id: &SpaceId, query: &str, window: PageWindow) -> ApiRequest {
    paged(
        ApiRequest::post(
            [API_PREFIX, "spaces", space_id.as_str(), "search"],
            json!({ "query": query }),
        ),
        window,
    )
}

/// `GET /v1/spaces/:space_id/objects/:object_id`
pub fn get_object(reference: &ObjectReference) -> ApiRequest {
    ApiRequest::get([
        API_PREFIX,
        "spaces",
        reference.space_id.as_str(),
        "objects",
        reference.object_id.as_str(),
    ])
}
