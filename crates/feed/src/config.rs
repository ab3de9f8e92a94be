//! Environment-driven settings for the `campus-feed` binary.

use campus_core::filter::{CategoryFilter, FilterOptions, Tab};
use campus_core::pipeline::DEFAULT_LOOKUP_BATCH_SIZE;
use campus_core::types::UserId;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{var} is invalid: {reason}")]
    Invalid { var: &'static str, reason: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct FeedConfig {
    pub database_url: String,
    pub max_connections: u32,
    /// Maximum ids per batched lookup.
    pub lookup_batch_size: usize,
    pub bus_capacity: usize,
    /// `None` runs the session unauthenticated.
    pub viewer_id: Option<UserId>,
    pub filter: FilterOptions,
}

impl FeedConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                    | Default           |
    /// |----------------------------|-------------------|
    /// | `DATABASE_URL`             | required          |
    /// | `DATABASE_MAX_CONNECTIONS` | `20`              |
    /// | `FEED_LOOKUP_BATCH_SIZE`   | `200`             |
    /// | `FEED_EVENT_BUS_CAPACITY`  | `1024`            |
    /// | `FEED_VIEWER_ID`           | unset (anonymous) |
    /// | `FEED_TAB`                 | `upcoming`        |
    /// | `FEED_CATEGORY`            | `all`             |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let database_url = get("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;

        let max_connections = parse_or(
            "DATABASE_MAX_CONNECTIONS",
            get("DATABASE_MAX_CONNECTIONS"),
            campus_db::DEFAULT_MAX_CONNECTIONS,
        )?;

        let lookup_batch_size = parse_or(
            "FEED_LOOKUP_BATCH_SIZE",
            get("FEED_LOOKUP_BATCH_SIZE"),
            DEFAULT_LOOKUP_BATCH_SIZE,
        )?;
        if lookup_batch_size == 0 {
            return Err(ConfigError::Invalid {
                var: "FEED_LOOKUP_BATCH_SIZE",
                reason: "must be at least 1".into(),
            });
        }

        let bus_capacity = parse_or(
            "FEED_EVENT_BUS_CAPACITY",
            get("FEED_EVENT_BUS_CAPACITY"),
            campus_events::DEFAULT_CAPACITY,
        )?;

        let viewer_id = get("FEED_VIEWER_ID")
            .map(|v| {
                v.trim().parse::<UserId>().map_err(|e| ConfigError::Invalid {
                    var: "FEED_VIEWER_ID",
                    reason: e.to_string(),
                })
            })
            .transpose()?;

        let tab = match get("FEED_TAB") {
            Some(v) => Tab::from_str_value(v.trim()).map_err(|reason| ConfigError::Invalid {
                var: "FEED_TAB",
                reason,
            })?,
            None => Tab::default(),
        };
        let category = get("FEED_CATEGORY")
            .map(|v| CategoryFilter::parse(&v))
            .unwrap_or_default();

        Ok(Self {
            database_url,
            max_connections,
            lookup_batch_size,
            bus_capacity,
            viewer_id,
            filter: FilterOptions { tab, category },
        })
    }
}

fn parse_or<T>(var: &'static str, value: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match value {
        Some(v) => v.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            var,
            reason: e.to_string(),
        }),
        None => Ok(default),
    }
}
