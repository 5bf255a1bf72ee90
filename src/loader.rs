// src/loader.rs
//! The loader facade: spaces in, documents out.
//!
//! Four entry points share one pipeline (resolve spaces, index each space,
//! fetch each object, map it):
//!
//! | entry point        | execution                 | materialization |
//! |--------------------|---------------------------|-----------------|
//! | [`AnytypeLoader::load`]        | blocking, one at a time | eager |
//! | [`AnytypeLoader::lazy_load`]   | blocking, one at a time | lazy  |
//! | [`AnytypeLoader::aload`]       | async, bounded fan-out  | eager |
//! | [`AnytypeLoader::alazy_load`]  | async, bounded fan-out  | lazy  |
//!
//! All four yield the same documents in the same order: spaces in the
//! order they were requested, objects in listing order within a space.
//!
//! Lazy sequences are not replay buffers. Iterating a second time
//! re-issues every listing and fetch request; only the space resolution
//! is remembered for the loader's lifetime.
//!
//! Closing the loader while a lazy sequence is running ends that sequence
//! with [`LoaderError::Cancelled`] and abandons its outstanding fetches.

use crate::api::{
    fetch_object_blocking, object_references, AnytypeHttpClient, AsyncTransport,
    BlockingHttpClient, BoundedFetcher, FetchOutcome, IndexRequest, ObjectIndex, SpaceResolver,
    Transport, TransportPool,
};
use crate::config::{LoaderConfig, LoaderOptions};
use crate::error::LoaderError;
use crate::mapping::map_document;
use crate::model::{Document, ObjectReference, Space};
use async_stream::try_stream;
use futures::future::{self, Either};
use futures::stream::{BoxStream, Stream, StreamExt, TryStreamExt};
use once_cell::sync::OnceCell;
use std::future::Future;
use std::ops::Deref;
use std::sync::Arc;

/// Loads Anytype objects as [`Document`]s.
///
/// The loader owns its HTTP transports. They are opened on first use and
/// released by [`AnytypeLoader::close`] or when the loader is dropped.
///
/// The blocking entry points drive `reqwest::blocking` and must not be
/// called from inside an async runtime; use the `a`-prefixed ones there.
pub struct AnytypeLoader {
    config: LoaderConfig,
    blocking: TransportPool<dyn Transport>,
    concurrent: TransportPool<dyn AsyncTransport>,
    spaces: OnceCell<Vec<Space>>,
}

impl AnytypeLoader {
    /// Creates a loader over the real HTTP API. No request is made and no
    /// client is built until the first load.
    pub fn new(config: LoaderConfig) -> Self {
        let blocking = {
            let (base_url, api_key, pool) =
                (config.base_url.clone(), config.api_key.clone(), config.pool.clone());
            TransportPool::new("blocking", move || {
                let client = BlockingHttpClient::new(&base_url, &api_key, &pool)?;
                Ok(Arc::new(client) as Arc<dyn Transport>)
            })
        };

        let concurrent = {
            let (base_url, api_key, pool) =
                (config.base_url.clone(), config.api_key.clone(), config.pool.clone());
            TransportPool::new("async", move || {
                let client = AnytypeHttpClient::new(&base_url, &api_key, &pool)?;
                Ok(Arc::new(client) as Arc<dyn AsyncTransport>)
            })
        };

        Self::with_pools(config, blocking, concurrent)
    }

    /// Validates raw options and creates a loader.
    pub fn from_options(options: LoaderOptions) -> Result<Self, LoaderError> {
        Ok(Self::new(LoaderConfig::resolve(options)?))
    }

    /// Creates a loader over caller-supplied transports.
    pub fn with_transports(
        config: LoaderConfig,
        blocking: Arc<dyn Transport>,
        concurrent: Arc<dyn AsyncTransport>,
    ) -> Self {
        Self::with_pools(
            config,
            TransportPool::ready("blocking", blocking),
            TransportPool::ready("async", concurrent),
        )
    }

    fn with_pools(
        config: LoaderConfig,
        blocking: TransportPool<dyn Transport>,
        concurrent: TransportPool<dyn AsyncTransport>,
    ) -> Self {
        Self {
            config,
            blocking,
            concurrent,
            spaces: OnceCell::new(),
        }
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    /// The spaces this loader reads, resolving names on first call.
    pub fn resolve_spaces(&self) -> Result<Vec<Space>, LoaderError> {
        self.spaces
            .get_or_try_init(|| {
                let transport = self.blocking.acquire()?;
                let spaces = SpaceResolver::new(self.config.retry)
                    .resolve(transport.as_ref(), &self.config.spaces)?;
                log_resolved(&spaces);
                Ok(spaces)
            })
            .cloned()
    }

    /// Async counterpart of [`AnytypeLoader::resolve_spaces`].
    pub async fn aresolve_spaces(&self) -> Result<Vec<Space>, LoaderError> {
        if let Some(spaces) = self.spaces.get() {
            return Ok(spaces.clone());
        }

        let transport = self.concurrent.acquire()?;
        let spaces = SpaceResolver::new(self.config.retry)
            .resolve_async(transport.as_ref(), &self.config.spaces)
            .await?;
        log_resolved(&spaces);
        Ok(self.spaces.get_or_init(|| spaces).clone())
    }

    /// Blocking lazy entry point. Each document is fetched when the
    /// iterator is advanced; the first error ends the iteration.
    pub fn lazy_load(&self) -> DocumentIter<&Self> {
        DocumentIter::new(self)
    }

    /// [`AnytypeLoader::lazy_load`] over a shared loader, for callers that
    /// need a `'static` iterator.
    pub fn lazy_load_owned(self: Arc<Self>) -> DocumentIter<Arc<Self>> {
        DocumentIter::new(self)
    }

    /// Blocking eager entry point.
    pub fn load(&self) -> Result<Vec<Document>, LoaderError> {
        self.lazy_load().collect()
    }

    /// Async lazy entry point. Up to `max_concurrency` object fetches run
    /// at once; documents still arrive in listing order.
    ///
    /// Dropping the stream, or closing the loader, abandons every
    /// outstanding fetch.
    pub fn alazy_load(&self) -> BoxStream<'_, Result<Document, LoaderError>> {
        // Subscribed on first poll, so a close before the run starts is not
        // mistaken for a close during it.
        let closed = async move {
            self.concurrent.released().await;
            log::info!("Loader closed while loading");
        };
        cancellable(self.document_stream().boxed(), closed).boxed()
    }

    /// [`AnytypeLoader::alazy_load`] over a shared loader, for callers that
    /// need a `'static` stream.
    pub fn alazy_load_owned(self: Arc<Self>) -> BoxStream<'static, Result<Document, LoaderError>> {
        try_stream! {
            let mut documents = self.alazy_load();
            while let Some(document) = documents.next().await {
                yield document?;
            }
        }
        .boxed()
    }

    /// Async eager entry point.
    pub async fn aload(&self) -> Result<Vec<Document>, LoaderError> {
        self.alazy_load().try_collect().await
    }

    /// Like [`AnytypeLoader::alazy_load`], but stops when `cancel`
    /// completes. A cancelled run ends with [`LoaderError::Cancelled`] and
    /// closes the loader.
    pub fn alazy_load_until<'a, F>(&'a self, cancel: F) -> BoxStream<'a, Result<Document, LoaderError>>
    where
        F: Future<Output = ()> + Send + 'a,
    {
        let cancel = async move {
            cancel.await;
            log::info!("Loading cancelled");
            self.close();
        };
        cancellable(self.alazy_load(), cancel).boxed()
    }

    /// Releases both transports. Safe to call any number of times; a later
    /// load opens fresh transports.
    pub fn close(&self) {
        self.blocking.release();
        self.concurrent.release();
    }

    /// Whether either transport is currently open.
    pub fn is_open(&self) -> bool {
        self.blocking.is_open() || self.concurrent.is_open()
    }

    fn index_request(&self, space: &Space) -> IndexRequest {
        IndexRequest::new(
            space.id.clone(),
            self.config.page_size,
            self.config.listing.clone(),
        )
    }

    fn document_stream(&self) -> impl Stream<Item = Result<Document, LoaderError>> + Send + '_ {
        try_stream! {
            let spaces = self.aresolve_spaces().await?;
            let transport = self.concurrent.acquire()?;
            let fetcher = BoundedFetcher::new(
                Arc::clone(&transport),
                self.config.max_concurrency,
                self.config.retry,
            );

            for space in spaces {
                let references = object_references(
                    Arc::clone(&transport),
                    self.index_request(&space),
                    self.config.retry,
                );
                let mut fetched = fetcher.fetch_ordered(references);

                while let Some(item) = fetched.next().await {
                    let (reference, outcome) = item?;
                    match outcome {
                        FetchOutcome::Found(record) => {
                            yield map_document(record, &reference, &space, &self.config.mapping);
                        }
                        FetchOutcome::Missing => skip_missing(&reference),
                    }
                }
                log::info!("Finished loading space {}", space.id);
            }
        }
    }
}

impl Drop for AnytypeLoader {
    fn drop(&mut self) {
        self.close();
    }
}

impl std::fmt::Debug for AnytypeLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnytypeLoader")
            .field("base_url", &self.config.base_url)
            .field("spaces", &self.config.spaces)
            .field("open", &self.is_open())
            .finish()
    }
}

fn log_resolved(spaces: &[Space]) {
    for space in spaces {
        match &space.name {
            Some(name) => log::info!("Loading space '{}' ({})", name, space.id),
            None => log::info!("Loading space {}", space.id),
        }
    }
}

fn skip_missing(reference: &ObjectReference) {
    log::warn!(
        "Skipping object {} in space {}: it no longer exists",
        reference.object_id,
        reference.space_id
    );
}

/// Ends `documents` with [`LoaderError::Cancelled`] once `stop` completes.
/// The inner stream is dropped with the outer one, abandoning its fetches.
fn cancellable<'a, S, F>(
    documents: S,
    stop: F,
) -> impl Stream<Item = Result<Document, LoaderError>> + Send + 'a
where
    S: Stream<Item = Result<Document, LoaderError>> + Send + Unpin + 'a,
    F: Future<Output = ()> + Send + 'a,
{
    try_stream! {
        let mut documents = documents;
        let mut stop = Box::pin(stop);
        loop {
            match future::select(stop.as_mut(), documents.next()).await {
                Either::Left(((), _)) => {
                    Err::<(), _>(LoaderError::Cancelled)?;
                }
                Either::Right((Some(item), _)) => {
                    yield item?;
                }
                Either::Right((None, _)) => break,
            }
        }
    }
}

/// Blocking, lazy document sequence returned by
/// [`AnytypeLoader::lazy_load`] and [`AnytypeLoader::lazy_load_owned`].
///
/// Fused: after the first error or the last document it yields `None`.
/// Closing the loader mid-iteration ends it with
/// [`LoaderError::Cancelled`].
pub struct DocumentIter<L> {
    loader: L,
    /// Release generation of the blocking transport when iteration began.
    generation: Option<u64>,
    spaces: Option<std::vec::IntoIter<Space>>,
    current: Option<(Space, ObjectIndex)>,
    finished: bool,
}

impl<L: Deref<Target = AnytypeLoader>> DocumentIter<L> {
    fn new(loader: L) -> Self {
        Self {
            loader,
            generation: None,
            spaces: None,
            current: None,
            finished: false,
        }
    }

    fn advance(&mut self) -> Result<Option<Document>, LoaderError> {
        let Self {
            loader,
            spaces,
            current,
            ..
        } = self;
        let loader: &AnytypeLoader = loader;
        loop {
            if let Some((space, index)) = current.as_mut() {
                let Some(reference) = index.next() else {
                    log::info!("Finished loading space {}", space.id);
                    *current = None;
                    continue;
                };
                let reference = reference?;
                let transport = loader.blocking.acquire()?;
                match fetch_object_blocking(transport.as_ref(), &reference, &loader.config.retry)? {
                    FetchOutcome::Found(record) => {
                        return Ok(Some(map_document(
                            record,
                            &reference,
                            space,
                            &loader.config.mapping,
                        )));
                    }
                    FetchOutcome::Missing => {
                        skip_missing(&reference);
                        continue;
                    }
                }
            }

            if spaces.is_none() {
                *spaces = Some(loader.resolve_spaces()?.into_iter());
            }
            let Some(space) = spaces.as_mut().and_then(Iterator::next) else {
                return Ok(None);
            };
            let index = ObjectIndex::new(
                loader.blocking.acquire()?,
                loader.index_request(&space),
                loader.config.retry,
            );
            *current = Some((space, index));
        }
    }
}

impl<L: Deref<Target = AnytypeLoader>> Iterator for DocumentIter<L> {
    type Item = Result<Document, LoaderError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        let generation = self.loader.blocking.generation();
        if *self.generation.get_or_insert(generation) != generation {
            log::info!("Loader closed while loading");
            self.finished = true;
            return Some(Err(LoaderError::Cancelled));
        }
        match self.advance() {
            Ok(Some(document)) => Some(Ok(document)),
            Ok(None) => {
                self.finished = true;
                None
            }
            Err(e) => {
                self.finished = true;
                Some(Err(e))
            }
        }
    }
}

impl<L: Deref<Target = AnytypeLoader>> std::iter::FusedIterator for DocumentIter<L> {}
