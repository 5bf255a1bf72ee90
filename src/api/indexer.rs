// src/api/indexer.rs
//! Enumerates object references in a space, page by page.
//!
//! Pages are requested only as the consumer pulls references, so a caller
//! that stops early never pays for the rest of the listing.

use super::endpoints::{list_objects, search_objects};
use super::pagination::{Page, PageWindow};
use super::parser::parse_list_page;
use super::{execute_async, execute_blocking, ApiRequest, AsyncTransport, Transport};
use crate::error::LoaderError;
use crate::error_recovery::RetryPolicy;
use crate::model::ObjectReference;
use crate::types::{ObjectId, SpaceId};
use futures::stream::{self, BoxStream, StreamExt, TryStreamExt};
use serde::Deserialize;
use std::collections::VecDeque;
use std::sync::Arc;

/// Which endpoint enumerates the space.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListingMode {
    /// Every object in the space.
    All,
    /// Objects matching a full-text query.
    Search(String),
}

impl ListingMode {
    /// `Search` for a non-blank query, `All` otherwise.
    pub fn from_query(query: Option<&str>) -> Self {
        match query {
            Some(q) if !q.trim().is_empty() => Self::Search(q.to_string()),
            _ => Self::All,
        }
    }
}

/// Everything needed to walk one space's listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexRequest {
    pub space_id: SpaceId,
    pub page_size: usize,
    pub mode: ListingMode,
}

impl IndexRequest {
    pub fn new(space_id: SpaceId, page_size: usize, mode: ListingMode) -> Self {
        Self {
            space_id,
            page_size,
            mode,
        }
    }

    fn first_window(&self) -> PageWindow {
        PageWindow::first(self.page_size)
    }

    fn page_request(&self, window: PageWindow) -> ApiRequest {
        match &self.mode {
            ListingMode::All => list_objects(&self.space_id, window),
            ListingMode::Search(query) => search_objects(&self.space_id, query, window),
        }
    }

    /// Parses a page into references, wrapping any failure with the space
    /// and offset it happened at.
    fn references(
        &self,
        window: PageWindow,
        response: Result<super::ApiResponse<String>, LoaderError>,
    ) -> Result<Page<ObjectReference>, LoaderError> {
        let page = response
            .and_then(|response| parse_list_page::<ListedObject>(&response))
            .map_err(|e| LoaderError::listing(self.space_id.as_str(), window.offset, e))?;

        if window.offset == 0 && page.returned == 0 {
            log::warn!("No objects listed in space {}", self.space_id);
        }

        Ok(page.map_items(|listed| {
            let id = listed.id.as_deref().and_then(|id| ObjectId::parse(id).ok());
            if id.is_none() {
                log::warn!(
                    "Skipping listed object without a usable id in space {}",
                    self.space_id
                );
            }
            id.map(|object_id| ObjectReference::new(self.space_id.clone(), object_id))
        }))
    }
}

/// The only field of a listing entry the indexer needs.
#[derive(Debug, Deserialize)]
struct ListedObject {
    #[serde(default, deserialize_with = "crate::model::lenient")]
    id: Option<String>,
}

/// Blocking, lazily paginated iterator over a space's references.
///
/// After an error the iterator is fused: it yields the wrapped
/// [`LoaderError::Listing`] once and then `None`.
pub struct ObjectIndex {
    transport: Arc<dyn Transport>,
    request: IndexRequest,
    retry: RetryPolicy,
    buffer: VecDeque<ObjectReference>,
    next_window: Option<PageWindow>,
}

impl ObjectIndex {
    pub fn new(transport: Arc<dyn Transport>, request: IndexRequest, retry: RetryPolicy) -> Self {
        let next_window = Some(request.first_window());
        Self {
            transport,
            request,
            retry,
            buffer: VecDeque::new(),
            next_window,
        }
    }

    fn fetch_page(&mut self, window: PageWindow) -> Result<(), LoaderError> {
        let response = execute_blocking(
            self.transport.as_ref(),
            &self.request.page_request(window),
            &self.retry,
        );
        let page = self.request.references(window, response)?;
        self.next_window = window.advance(page.returned, page.has_more);
        self.buffer.extend(page.items);
        Ok(())
    }
}

impl Iterator for ObjectIndex {
    type Item = Result<ObjectReference, LoaderError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(reference) = self.buffer.pop_front() {
                return Some(Ok(reference));
            }
            let window = self.next_window.take()?;
            if let Err(e) = self.fetch_page(window) {
                return Some(Err(e));
            }
        }
    }
}

impl std::iter::FusedIterator for ObjectIndex {}

/// Async, lazily paginated stream over a space's references.
///
/// The stream ends after the first error, which carries the space and
/// offset of the failed page.
pub fn object_references(
    transport: Arc<dyn AsyncTransport>,
    request: IndexRequest,
    retry: RetryPolicy,
) -> BoxStream<'static, Result<ObjectReference, LoaderError>> {
    let request = Arc::new(request);
    let first = Some(request.first_window());

    stream::try_unfold(first, move |window| {
        let transport = Arc::clone(&transport);
        let request = Arc::clone(&request);
        async move {
            let Some(window) = window else {
                return Ok::<_, LoaderError>(None);
            };
            let response =
                execute_async(transport.as_ref(), &request.page_request(window), &retry).await;
            let page = request.references(window, response)?;
            let next = window.advance(page.returned, page.has_more);
            let items = stream::iter(page.items.into_iter().map(Ok::<_, LoaderError>));
            Ok(Some((items, next)))
        }
    })
    .try_flatten()
    .boxed()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listing_mode_from_query() {
        assert_eq!(ListingMode::from_query(None), ListingMode::All);
        assert_eq!(ListingMode::from_query(Some("   ")), ListingMode::All);
        assert_eq!(
            ListingMode::from_query(Some(" notes ")),
            ListingMode::Search(" notes ".to_string())
        );
    }
}
