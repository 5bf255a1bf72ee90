// src/config.rs
use crate::api::{ListingMode, PoolConfig};
use crate::constants::{DEFAULT_MAX_CONCURRENCY, DEFAULT_PAGE_SIZE, DEFAULT_RETRY_BACKOFF, REQUEST_TIMEOUT};
use crate::error::LoaderError;
use crate::error_recovery::RetryPolicy;
use crate::mapping::MappingOptions;
use crate::model::SpaceSelector;
use crate::types::{ApiKey, BaseUrl, SpaceId, ValidationError};
use clap::Parser;
use std::time::Duration;

/// Raw loader options, as a caller or binding layer supplies them.
///
/// Nothing is validated here; [`LoaderConfig::resolve`] does that before
/// any request is made.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoaderOptions {
    pub url: Option<String>,
    pub api_key: Option<String>,
    pub space_id: Option<String>,
    pub space_names: Option<Vec<String>>,
    pub page_size: usize,
    pub query: Option<String>,
    pub max_concurrency: usize,
    pub legacy_date_aliases: bool,
    pub max_retries: u32,
    pub retry_backoff: Duration,
    pub request_timeout: Duration,
}

impl Default for LoaderOptions {
    fn default() -> Self {
        Self {
            url: None,
            api_key: None,
            space_id: None,
            space_names: None,
            page_size: DEFAULT_PAGE_SIZE,
            query: None,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            legacy_date_aliases: false,
            max_retries: 0,
            retry_backoff: DEFAULT_RETRY_BACKOFF,
            request_timeout: REQUEST_TIMEOUT,
        }
    }
}

impl LoaderOptions {
    /// Options for one space given by id.
    pub fn for_space_id(url: &str, api_key: &str, space_id: &str) -> Self {
        Self {
            url: Some(url.to_string()),
            api_key: Some(api_key.to_string()),
            space_id: Some(space_id.to_string()),
            ..Self::default()
        }
    }

    /// Options for spaces looked up by name.
    pub fn for_space_names<S: Into<String>>(
        url: &str,
        api_key: &str,
        names: impl IntoIterator<Item = S>,
    ) -> Self {
        Self {
            url: Some(url.to_string()),
            api_key: Some(api_key.to_string()),
            space_names: Some(names.into_iter().map(Into::into).collect()),
            ..Self::default()
        }
    }
}

/// Validated loader configuration.
#[derive(Debug, Clone)]
pub struct LoaderConfig {
    pub base_url: BaseUrl,
    pub api_key: ApiKey,
    pub spaces: SpaceSelector,
    pub page_size: usize,
    pub listing: ListingMode,
    pub max_concurrency: usize,
    pub mapping: MappingOptions,
    pub retry: RetryPolicy,
    pub pool: PoolConfig,
}

impl LoaderConfig {
    /// Validates raw options. Fails with a configuration error before any
    /// network activity.
    pub fn resolve(options: LoaderOptions) -> Result<Self, LoaderError> {
        let url = options
            .url
            .ok_or_else(|| LoaderError::Configuration("url is required".to_string()))?;
        let base_url = BaseUrl::parse(&url)?;

        let api_key = options
            .api_key
            .ok_or_else(|| LoaderError::Configuration("api_key is required".to_string()))?;
        let api_key = ApiKey::new(api_key)?;

        let spaces = resolve_selector(options.space_id, options.space_names)?;

        let page_size = at_least_one("page_size", options.page_size)?;
        let max_concurrency = at_least_one("max_concurrency", options.max_concurrency)?;

        Ok(Self {
            base_url,
            api_key,
            spaces,
            page_size,
            listing: ListingMode::from_query(options.query.as_deref()),
            max_concurrency,
            mapping: MappingOptions {
                legacy_date_aliases: options.legacy_date_aliases,
            },
            retry: RetryPolicy::new(options.max_retries, options.retry_backoff),
            pool: PoolConfig {
                request_timeout: options.request_timeout,
                ..PoolConfig::default()
            },
        })
    }
}

fn resolve_selector(
    space_id: Option<String>,
    space_names: Option<Vec<String>>,
) -> Result<SpaceSelector, LoaderError> {
    let space_id = space_id.filter(|id| !id.trim().is_empty());
    let space_names = space_names.map(|names| {
        let mut unique: Vec<String> = Vec::with_capacity(names.len());
        for name in names.into_iter().filter(|n| !n.is_empty()) {
            if !unique.contains(&name) {
                unique.push(name);
            }
        }
        unique
    });

    match (space_id, space_names) {
        (Some(_), Some(_)) => Err(LoaderError::Configuration(
            "space_id and space_names are mutually exclusive".to_string(),
        )),
        (Some(id), None) => Ok(SpaceSelector::Id(SpaceId::parse(&id)?)),
        (None, Some(names)) if !names.is_empty() => Ok(SpaceSelector::Names(names)),
        (None, Some(_)) => Err(LoaderError::Configuration(
            "space_names must contain at least one non-empty name".to_string(),
        )),
        (None, None) => Err(LoaderError::Configuration(
            "one of space_id or space_names is required".to_string(),
        )),
    }
}

fn at_least_one(field: &'static str, value: usize) -> Result<usize, ValidationError> {
    if value < 1 {
        return Err(ValidationError::BelowMinimum {
            field,
            value,
            min: 1,
        });
    }
    Ok(value)
}

/// Parsed command-line input.
#[derive(Parser, Debug)]
#[command(author, version, about = "Load Anytype objects as JSON-lines documents", long_about = None)]
pub struct CommandLineInput {
    /// Base URL of the Anytype API (e.g., "http://127.0.0.1:31009")
    #[arg(long, env = "ANYTYPE_URL")]
    pub url: String,

    /// API key; falls back to the ANYTYPE_API_KEY environment variable
    #[arg(long, env = "ANYTYPE_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Space id to load from
    #[arg(long, conflicts_with = "space_name")]
    pub space_id: Option<String>,

    /// Space name to load from (repeatable)
    #[arg(long = "space-name")]
    pub space_name: Vec<String>,

    /// Objects requested per listing page
    #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
    pub page_size: usize,

    /// Full-text query; switches listing to search
    #[arg(short, long)]
    pub query: Option<String>,

    /// Maximum concurrent object fetches
    #[arg(long, default_value_t = DEFAULT_MAX_CONCURRENCY)]
    pub concurrency: usize,

    /// Fetch objects one at a time with blocking requests
    #[arg(long, default_value_t = false)]
    pub sequential: bool,

    /// Also emit dates under their raw Anytype property keys
    #[arg(long, default_value_t = false)]
    pub legacy_date_aliases: bool,

    /// Retries for rate-limited or unavailable responses (0 disables)
    #[arg(long, default_value_t = 0)]
    pub max_retries: u32,

    /// Enable verbose logging (debug level)
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

impl From<&CommandLineInput> for LoaderOptions {
    fn from(cli: &CommandLineInput) -> Self {
        Self {
            url: Some(cli.url.clone()),
            api_key: cli.api_key.clone(),
            space_id: cli.space_id.clone(),
            space_names: (!cli.space_name.is_empty()).then(|| cli.space_name.clone()),
            page_size: cli.page_size,
            query: cli.query.clone(),
            max_concurrency: cli.concurrency,
            legacy_date_aliases: cli.legacy_date_aliases,
            max_retries: cli.max_retries,
            ..LoaderOptions::default()
        }
    }
}
