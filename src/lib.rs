// src/lib.rs
//! anytype-loader library. Loads objects from Anytype spaces as normalized
//! documents over the Anytype HTTP API.
//!
//! # Public API
//!
//! The library exposes types organized by concern:
//! - **Loader**: `AnytypeLoader`, `DocumentIter`
//! - **Error handling**: `LoaderError`, `ErrorKind`, `ApiErrorCode`, `ValidationError`
//! - **Configuration**: `LoaderOptions`, `LoaderConfig`, `RetryPolicy`
//! - **Domain model**: `Document`, `Metadata`, `Space`, `ObjectRecord`, etc.
//! - **Domain types**: `SpaceId`, `ObjectId`, `ApiKey`, `BaseUrl`
//! - **API**: transport traits, HTTP clients, resolver, indexer, fetcher
//!
//! ```no_run
//! use anytype_loader::{AnytypeLoader, LoaderOptions};
//!
//! let options = LoaderOptions::for_space_names("http://127.0.0.1:31009", "api-key", ["Personal"]);
//! let loader = AnytypeLoader::from_options(options)?;
//! for document in loader.lazy_load() {
//!     println!("{}", document?.content());
//! }
//! # Ok::<(), anytype_loader::LoaderError>(())
//! ```

pub mod api;
mod config;
mod constants;
mod error;
mod error_recovery;
mod loader;
mod mapping;
pub mod model;
pub mod types;

// --- Loader ---
pub use crate::loader::{AnytypeLoader, DocumentIter};

// --- Error Handling ---
pub use crate::error::{ApiErrorCode, ErrorKind, LoaderError};
pub use crate::types::ValidationError;

// --- Configuration ---
pub use crate::config::{CommandLineInput, LoaderConfig, LoaderOptions};
pub use crate::error_recovery::RetryPolicy;
pub use crate::mapping::{map_document, MappingOptions};

// --- Domain Model ---
pub use crate::model::{
    keys, Document, Metadata, MetadataValue, ObjectRecord, ObjectReference, Space, SpaceSelector,
};

// --- Domain Types ---
pub use crate::types::{ApiKey, BaseUrl, ObjectId, SpaceId};

// --- Defaults ---
pub use crate::constants::{DEFAULT_MAX_CONCURRENCY, DEFAULT_PAGE_SIZE};
