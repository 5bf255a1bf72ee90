// src/api/connection_pool.rs
//! Per-loader HTTP client lifecycle.
//!
//! Each loader owns its transports. A transport is built on first use,
//! shared by every request after that, and dropped on close. Using the
//! loader after close builds a fresh one.
//!
//! Every release bumps a generation counter. Runs that started under an
//! earlier generation watch it and stop instead of carrying on with a
//! transport the loader has already let go of.

use crate::constants::{CONNECT_TIMEOUT, POOL_IDLE_TIMEOUT, POOL_MAX_IDLE_PER_HOST, REQUEST_TIMEOUT};
use crate::error::LoaderError;
use parking_lot::Mutex;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

/// Connection settings applied to both HTTP clients.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolConfig {
    /// Maximum idle connections per host
    pub max_idle_per_host: usize,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    /// How long an idle connection stays pooled
    pub idle_timeout: Duration,
    pub tcp_keepalive: Option<Duration>,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_idle_per_host: POOL_MAX_IDLE_PER_HOST,
            connect_timeout: CONNECT_TIMEOUT,
            request_timeout: REQUEST_TIMEOUT,
            idle_timeout: POOL_IDLE_TIMEOUT,
            tcp_keepalive: Some(Duration::from_secs(60)),
        }
    }
}

impl PoolConfig {
    pub(crate) fn configure_async(&self, builder: reqwest::ClientBuilder) -> reqwest::ClientBuilder {
        let builder = builder
            .pool_max_idle_per_host(self.max_idle_per_host)
            .connect_timeout(self.connect_timeout)
            .timeout(self.request_timeout)
            .pool_idle_timeout(self.idle_timeout);

        match self.tcp_keepalive {
            Some(keepalive) => builder.tcp_keepalive(keepalive),
            None => builder,
        }
    }

    pub(crate) fn configure_blocking(
        &self,
        builder: reqwest::blocking::ClientBuilder,
    ) -> reqwest::blocking::ClientBuilder {
        let builder = builder
            .pool_max_idle_per_host(self.max_idle_per_host)
            .connect_timeout(self.connect_timeout)
            .timeout(self.request_timeout)
            .pool_idle_timeout(self.idle_timeout);

        match self.tcp_keepalive {
            Some(keepalive) => builder.tcp_keepalive(keepalive),
            None => builder,
        }
    }
}

type Connector<T> = Box<dyn Fn() -> Result<Arc<T>, LoaderError> + Send + Sync>;

/// A lazily created, releasable transport.
pub struct TransportPool<T: ?Sized> {
    label: &'static str,
    connect: Connector<T>,
    current: Mutex<Option<Arc<T>>>,
    generation: watch::Sender<u64>,
}

impl<T: ?Sized> TransportPool<T> {
    pub fn new<F>(label: &'static str, connect: F) -> Self
    where
        F: Fn() -> Result<Arc<T>, LoaderError> + Send + Sync + 'static,
    {
        Self {
            label,
            connect: Box::new(connect),
            current: Mutex::new(None),
            generation: watch::Sender::new(0),
        }
    }

    /// A pool around a transport that already exists. After a release the
    /// same transport is handed out again.
    pub fn ready(label: &'static str, transport: Arc<T>) -> Self
    where
        T: Send + Sync + 'static,
    {
        let shared = Arc::clone(&transport);
        Self {
            label,
            connect: Box::new(move || Ok(Arc::clone(&shared))),
            current: Mutex::new(Some(transport)),
            generation: watch::Sender::new(0),
        }
    }

    /// Returns the current transport, creating it if needed.
    pub fn acquire(&self) -> Result<Arc<T>, LoaderError> {
        let mut current = self.current.lock();
        if let Some(transport) = current.as_ref() {
            return Ok(Arc::clone(transport));
        }

        log::debug!("Opening {} transport", self.label);
        let transport = (self.connect)()?;
        *current = Some(Arc::clone(&transport));
        Ok(transport)
    }

    /// Drops the pooled transport and signals runs watching
    /// [`TransportPool::released`]. Calling this on a released pool does
    /// nothing.
    pub fn release(&self) {
        if self.current.lock().take().is_some() {
            self.generation.send_modify(|generation| *generation += 1);
            log::debug!("Released {} transport", self.label);
        }
    }

    /// Number of releases so far.
    pub fn generation(&self) -> u64 {
        *self.generation.borrow()
    }

    /// Completes at the next release after this call.
    pub fn released(&self) -> impl Future<Output = ()> + Send + 'static {
        let mut generation = self.generation.subscribe();
        async move {
            // An error means the pool itself is gone, which also ends the run.
            let _ = generation.changed().await;
        }
    }

    pub fn is_open(&self) -> bool {
        self.current.lock().is_some()
    }
}

impl<T: ?Sized> fmt::Debug for TransportPool<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransportPool")
            .field("label", &self.label)
            .field("open", &self.is_open())
            .finish()
    }
}
