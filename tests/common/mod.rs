//! Shared test utilities: an in-memory Anytype API.
#![allow(dead_code)]

use anytype_loader::api::{ApiRequest, ApiResponse, AsyncTransport, HttpMethod, Transport};
use anytype_loader::{AnytypeLoader, LoaderConfig, LoaderError, LoaderOptions};
use parking_lot::Mutex;
use reqwest::StatusCode;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

pub const BASE_URL: &str = "http://127.0.0.1:31009";
pub const API_KEY: &str = "test-api-key";

/// The full object record used by the mapping tests.
pub fn full_object_fixture() -> Value {
    serde_json::from_str(include_str!("../fixtures/object_full.json"))
        .expect("fixture should be valid JSON")
}

/// A minimal object record with markdown content.
pub fn simple_object(id: &str, markdown: &str) -> Value {
    json!({
        "object": "object",
        "id": id,
        "name": format!("Object {}", id),
        "archived": false,
        "markdown": markdown,
        "type": {"object": "type", "id": "ot-page", "key": "page", "name": "Page"},
        "properties": []
    })
}

/// In-memory Anytype API implementing both transport traits.
#[derive(Default)]
pub struct FixtureTransport {
    spaces: Vec<Value>,
    listings: HashMap<String, Vec<String>>,
    search_hits: HashMap<String, Vec<String>>,
    records: HashMap<(String, String), Value>,
    object_failures: HashMap<(String, String), u16>,
    listing_failures: HashMap<(String, usize), u16>,
    delays: HashMap<String, Duration>,
    report_has_more: bool,
    requests: Mutex<Vec<ApiRequest>>,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl FixtureTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_space(mut self, id: &str, name: &str) -> Self {
        self.spaces.push(json!({"object": "space", "id": id, "name": name}));
        self
    }

    /// Adds an object to a space's listing and makes it fetchable.
    pub fn with_object(mut self, space_id: &str, record: Value) -> Self {
        let object_id = record["id"].as_str().expect("record needs an id").to_string();
        self.listings
            .entry(space_id.to_string())
            .or_default()
            .push(object_id.clone());
        self.records
            .insert((space_id.to_string(), object_id), record);
        self
    }

    /// Adds `count` simple objects named `<prefix>-<n>`.
    pub fn with_objects(mut self, space_id: &str, prefix: &str, count: usize) -> Self {
        for n in 0..count {
            let id = format!("{}-{}", prefix, n);
            self = self.with_object(space_id, simple_object(&id, &format!("# {}", id)));
        }
        self
    }

    /// Makes an already added object a search hit.
    pub fn with_search_hit(mut self, space_id: &str, object_id: &str) -> Self {
        self.search_hits
            .entry(space_id.to_string())
            .or_default()
            .push(object_id.to_string());
        self
    }

    /// Keeps the object listed but answers its fetch with 404.
    pub fn vanish(mut self, space_id: &str, object_id: &str) -> Self {
        self.records
            .remove(&(space_id.to_string(), object_id.to_string()));
        self
    }

    pub fn fail_object(mut self, space_id: &str, object_id: &str, status: u16) -> Self {
        self.object_failures
            .insert((space_id.to_string(), object_id.to_string()), status);
        self
    }

    pub fn fail_listing_at(mut self, space_id: &str, offset: usize, status: u16) -> Self {
        self.listing_failures
            .insert((space_id.to_string(), offset), status);
        self
    }

    /// Delays the async fetch of one object.
    pub fn delay(mut self, object_id: &str, millis: u64) -> Self {
        self.delays
            .insert(object_id.to_string(), Duration::from_millis(millis));
        self
    }

    /// Includes `pagination.has_more` in listing responses.
    pub fn reporting_has_more(mut self) -> Self {
        self.report_has_more = true;
        self
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().clone()
    }

    pub fn request_lines(&self) -> Vec<String> {
        self.requests().iter().map(ToString::to_string).collect()
    }

    /// Object listing or search requests for one space.
    pub fn listing_requests(&self, space_id: &str) -> Vec<ApiRequest> {
        self.requests()
            .into_iter()
            .filter(|r| {
                r.segments.len() == 4
                    && r.segments[2] == space_id
                    && (r.segments[3] == "objects" || r.segments[3] == "search")
            })
            .collect()
    }

    pub fn space_listing_count(&self) -> usize {
        self.requests()
            .iter()
            .filter(|r| r.path() == "/v1/spaces")
            .count()
    }

    pub fn object_fetch_count(&self) -> usize {
        self.requests()
            .iter()
            .filter(|r| r.segments.len() == 5)
            .count()
    }

    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    fn respond(&self, request: &ApiRequest) -> ApiResponse<String> {
        self.requests.lock().push(request.clone());

        let segments: Vec<&str> = request.segments.iter().map(String::as_str).collect();
        match (request.method, segments.as_slice()) {
            (HttpMethod::Get, ["v1", "spaces"]) => {
                let window = window(request);
                self.page(&self.spaces, window)
            }
            (HttpMethod::Get, ["v1", "spaces", space, "objects"]) => {
                self.listing_page(space, self.listings.get(*space), request)
            }
            (HttpMethod::Post, ["v1", "spaces", space, "search"]) => {
                self.listing_page(space, self.search_hits.get(*space), request)
            }
            (HttpMethod::Get, ["v1", "spaces", space, "objects", object]) => {
                let key = (space.to_string(), object.to_string());
                if let Some(status) = self.object_failures.get(&key) {
                    return error(*status, "internal_server_error", "fixture failure");
                }
                match self.records.get(&key) {
                    Some(record) => ok(json!({ "object": record })),
                    None => error(404, "not_found", "object not found"),
                }
            }
            _ => error(404, "not_found", "unknown endpoint"),
        }
    }

    fn listing_page(
        &self,
        space: &str,
        ids: Option<&Vec<String>>,
        request: &ApiRequest,
    ) -> ApiResponse<String> {
        let (limit, offset) = window(request);
        if let Some(status) = self.listing_failures.get(&(space.to_string(), offset)) {
            return error(*status, "internal_server_error", "listing failed");
        }
        let entries: Vec<Value> = ids
            .map(|ids| {
                ids.iter()
                    .map(|id| json!({"object": "object", "id": id, "space_id": space}))
                    .collect()
            })
            .unwrap_or_default();
        self.page(&entries, (limit, offset))
    }

    fn page(&self, entries: &[Value], (limit, offset): (usize, usize)) -> ApiResponse<String> {
        let data: Vec<&Value> = entries.iter().skip(offset).take(limit).collect();
        let mut body = json!({ "data": data });
        if self.report_has_more {
            body["pagination"] = json!({
                "total": entries.len(),
                "offset": offset,
                "limit": limit,
                "has_more": offset + data.len() < entries.len(),
            });
        }
        ok(body)
    }
}

impl Transport for FixtureTransport {
    fn send(&self, request: &ApiRequest) -> Result<ApiResponse<String>, LoaderError> {
        Ok(self.respond(request))
    }
}

#[async_trait::async_trait]
impl AsyncTransport for FixtureTransport {
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse<String>, LoaderError> {
        let is_fetch = request.segments.len() == 5;
        if is_fetch {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak_in_flight.fetch_max(now, Ordering::SeqCst);

            let delay = self
                .delays
                .get(&request.segments[4])
                .copied()
                .unwrap_or(Duration::from_millis(5));
            tokio::time::sleep(delay).await;
        }

        let response = self.respond(request);

        if is_fetch {
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
        }
        Ok(response)
    }
}

fn window(request: &ApiRequest) -> (usize, usize) {
    let parse = |key: &str| {
        request
            .query_value(key)
            .and_then(|v| v.parse::<usize>().ok())
    };
    (parse("limit").unwrap_or(100), parse("offset").unwrap_or(0))
}

fn ok(body: Value) -> ApiResponse<String> {
    ApiResponse {
        data: body.to_string(),
        status: StatusCode::OK,
        url: "fixture".to_string(),
    }
}

fn error(status: u16, code: &str, message: &str) -> ApiResponse<String> {
    ApiResponse {
        data: json!({"object": "error", "status": status, "code": code, "message": message})
            .to_string(),
        status: StatusCode::from_u16(status).expect("valid status"),
        url: "fixture".to_string(),
    }
}

/// Options for one space by id, with the given page size.
pub fn options_for_id(space_id: &str, page_size: usize) -> LoaderOptions {
    LoaderOptions {
        page_size,
        ..LoaderOptions::for_space_id(BASE_URL, API_KEY, space_id)
    }
}

pub fn options_for_names(names: &[&str], page_size: usize) -> LoaderOptions {
    LoaderOptions {
        page_size,
        ..LoaderOptions::for_space_names(BASE_URL, API_KEY, names.iter().copied())
    }
}

/// A loader whose both transports are the given fixture.
pub fn loader(fixture: &Arc<FixtureTransport>, options: LoaderOptions) -> AnytypeLoader {
    let config = LoaderConfig::resolve(options).expect("test options should be valid");
    AnytypeLoader::with_transports(
        config,
        Arc::clone(fixture) as Arc<dyn Transport>,
        Arc::clone(fixture) as Arc<dyn AsyncTransport>,
    )
}
