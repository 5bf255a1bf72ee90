// src/api/concurrency.rs
//! Bounded, order-preserving concurrent object fetching.

use super::fetcher::{fetch_object_async, FetchOutcome};
use super::AsyncTransport;
use crate::error::LoaderError;
use crate::error_recovery::RetryPolicy;
use crate::model::ObjectReference;
use futures::stream::{BoxStream, Stream, StreamExt};
use std::sync::Arc;

/// Fetches objects with at most `limit` requests in flight.
///
/// Results come back in submission order no matter which request finishes
/// first. Dropping the returned stream cancels every outstanding fetch.
#[derive(Clone)]
pub struct BoundedFetcher {
    transport: Arc<dyn AsyncTransport>,
    limit: usize,
    retry: RetryPolicy,
}

impl BoundedFetcher {
    /// A zero limit is raised to one.
    pub fn new(transport: Arc<dyn AsyncTransport>, limit: usize, retry: RetryPolicy) -> Self {
        Self {
            transport,
            limit: limit.max(1),
            retry,
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Fetches every reference the stream yields. An error in `references`
    /// is passed through in its position.
    pub fn fetch_ordered<S>(
        &self,
        references: S,
    ) -> BoxStream<'static, Result<(ObjectReference, FetchOutcome), LoaderError>>
    where
        S: Stream<Item = Result<ObjectReference, LoaderError>> + Send + 'static,
    {
        let transport = Arc::clone(&self.transport);
        let retry = self.retry;

        references
            .map(move |reference| {
                let transport = Arc::clone(&transport);
                async move {
                    let reference = reference?;
                    let outcome = fetch_object_async(transport.as_ref(), &reference, &retry).await?;
                    Ok::<_, LoaderError>((reference, outcome))
                }
            })
            .buffered(self.limit)
            .boxed()
    }
}
