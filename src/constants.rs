// src/constants.rs
//! Domain constants that define the operational boundaries of the loader.
//!
//! Each constant is named for the domain concept it constrains, not its
//! technical role.

use std::time::Duration;

// ---------------------------------------------------------------------------
// Anytype API boundaries
// ---------------------------------------------------------------------------

/// API version sent with every request in the `Anytype-Version` header.
pub const ANYTYPE_API_VERSION: &str = "2025-05-20";

/// User agent presented to the Anytype API.
pub const USER_AGENT: &str = "anytype-loader";

/// How many objects are requested per listing or search page by default.
pub const DEFAULT_PAGE_SIZE: usize = 50;

/// Page size used when listing spaces to resolve names.
///
/// Accounts rarely hold more than a handful of spaces, so one page
/// usually covers them all.
pub const SPACE_LISTING_PAGE_SIZE: usize = 100;

// ---------------------------------------------------------------------------
// Concurrency and timing
// ---------------------------------------------------------------------------

/// How many object fetches may be in flight at once in the concurrent mode.
pub const DEFAULT_MAX_CONCURRENCY: usize = 10;

/// Per-request timeout applied by both HTTP clients.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Time allowed to establish a TCP connection.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// How long idle pooled connections are kept open.
pub const POOL_IDLE_TIMEOUT: Duration = Duration::from_secs(90);

/// Maximum idle connections kept per host.
pub const POOL_MAX_IDLE_PER_HOST: usize = 10;

/// Base delay of the opt-in linear retry backoff.
pub const DEFAULT_RETRY_BACKOFF: Duration = Duration::from_secs(1);

// ---------------------------------------------------------------------------
// Error display
// ---------------------------------------------------------------------------

/// Maximum characters shown when previewing error response bodies.
pub const ERROR_BODY_PREVIEW_LENGTH: usize = 200;
