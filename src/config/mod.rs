pub mod toml_config;

use crate::core::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation::{
    validate_distinct_params, validate_non_empty_string, validate_range, Validate,
};
#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_START_PARAM: &str = "start_date";
pub const DEFAULT_END_PARAM: &str = "end_date";
pub const DEFAULT_CACHE_TTL_SECS: u64 = 3600;
pub const DEFAULT_CATEGORIES_CACHE_TTL_SECS: u64 = 86_400;
pub const DEFAULT_CACHE_MAX_ENTRIES: usize = crate::core::cache::DEFAULT_MAX_ENTRIES;
pub const MAX_TTL_SECS: u64 = 86_400 * 30;
pub const MAX_CACHE_ENTRIES: usize = 1_000_000;

/// Resolved query settings handed to the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuerySettings {
    pub start_param: String,
    pub end_param: String,
    pub cache_ttl: Duration,
    pub categories_cache_ttl: Duration,
    pub cache_max_entries: usize,
}

impl Default for QuerySettings {
    fn default() -> Self {
        Self {
            start_param: DEFAULT_START_PARAM.to_string(),
            end_param: DEFAULT_END_PARAM.to_string(),
            cache_ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
            categories_cache_ttl: Duration::from_secs(DEFAULT_CATEGORIES_CACHE_TTL_SECS),
            cache_max_entries: DEFAULT_CACHE_MAX_ENTRIES,
        }
    }
}

impl QuerySettings {
    pub fn uncached() -> Self {
        Self {
            cache_ttl: Duration::ZERO,
            categories_cache_ttl: Duration::ZERO,
            ..Self::default()
        }
    }

    pub fn from_provider<C: ConfigProvider + ?Sized>(config: &C) -> Self {
        Self {
            start_param: config.start_param().to_string(),
            end_param: config.end_param().to_string(),
            cache_ttl: config.cache_ttl(),
            categories_cache_ttl: config.categories_cache_ttl(),
            cache_max_entries: config.cache_max_entries(),
        }
    }
}

impl ConfigProvider for QuerySettings {
    fn start_param(&self) -> &str {
        &self.start_param
    }

    fn end_param(&self) -> &str {
        &self.end_param
    }

    fn cache_ttl(&self) -> Duration {
        self.cache_ttl
    }

    fn categories_cache_ttl(&self) -> Duration {
        self.categories_cache_ttl
    }

    fn cache_max_entries(&self) -> usize {
        self.cache_max_entries
    }
}

impl Validate for QuerySettings {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("start_param", &self.start_param)?;
        validate_non_empty_string("end_param", &self.end_param)?;
        validate_distinct_params("query", &self.start_param, &self.end_param)?;
        validate_range("cache_ttl", self.cache_ttl.as_secs(), 0, MAX_TTL_SECS)?;
        validate_range(
            "categories_cache_ttl",
            self.categories_cache_ttl.as_secs(),
            0,
            MAX_TTL_SECS,
        )?;
        validate_range("cache_max_entries", self.cache_max_entries, 1, MAX_CACHE_ENTRIES)
    }
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "available-cars")]
#[command(about = "List cars a requester may book for a time window")]
pub struct CliConfig {
    #[arg(long, default_value = "./fleet.json", help = "JSON snapshot of the entity store")]
    pub store: String,

    #[arg(long, help = "TOML config file; overrides the query and cache flags")]
    pub config: Option<String>,

    #[arg(long, help = "Authenticated requester id")]
    pub user: Option<u64>,

    #[arg(long, help = "Window start, e.g. 2024-01-04T10:00:00")]
    pub start: Option<String>,

    #[arg(long, help = "Window end")]
    pub end: Option<String>,

    #[arg(long, default_value = DEFAULT_START_PARAM)]
    pub start_param: String,

    #[arg(long, default_value = DEFAULT_END_PARAM)]
    pub end_param: String,

    #[arg(long, default_value_t = DEFAULT_CACHE_TTL_SECS, help = "Result cache TTL in seconds, 0 disables")]
    pub cache_time: u64,

    #[arg(long, default_value_t = DEFAULT_CATEGORIES_CACHE_TTL_SECS)]
    pub categories_cache_time: u64,

    #[arg(long, default_value_t = DEFAULT_CACHE_MAX_ENTRIES, help = "Most results kept in the cache")]
    pub cache_max_entries: usize,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub json_logs: bool,
}

#[cfg(feature = "cli")]
impl ConfigProvider for CliConfig {
    fn start_param(&self) -> &str {
        &self.start_param
    }

    fn end_param(&self) -> &str {
        &self.end_param
    }

    fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_time)
    }

    fn categories_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.categories_cache_time)
    }

    fn cache_max_entries(&self) -> usize {
        self.cache_max_entries
    }
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        crate::utils::validation::validate_path("store", &self.store)?;
        crate::utils::validation::validate_file_extension("store", &self.store, &["json"])?;
        QuerySettings::from_provider(self).validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = QuerySettings::default();
        assert_eq!(settings.start_param(), "start_date");
        assert_eq!(settings.end_param(), "end_date");
        assert_eq!(settings.cache_ttl(), Duration::from_secs(3600));
        assert_eq!(settings.categories_cache_ttl(), Duration::from_secs(86_400));
        assert_eq!(settings.cache_max_entries(), 10_000);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_settings_validation() {
        let same = QuerySettings {
            end_param: "start_date".into(),
            ..QuerySettings::default()
        };
        assert!(same.validate().is_err());

        let blank = QuerySettings {
            start_param: " ".into(),
            ..QuerySettings::default()
        };
        assert!(blank.validate().is_err());

        let unbounded = QuerySettings {
            cache_max_entries: 0,
            ..QuerySettings::default()
        };
        assert!(unbounded.validate().is_err());

        assert!(QuerySettings::uncached().validate().is_ok());
    }

    #[cfg(feature = "cli")]
    #[test]
    fn test_cli_parsing() {
        let config = CliConfig::parse_from([
            "available-cars",
            "--store",
            "fleet.json",
            "--user",
            "7",
            "--start",
            "2024-01-04",
            "--end",
            "2024-01-06",
            "--cache-time",
            "0",
        ]);

        assert_eq!(config.user, Some(7));
        assert_eq!(config.cache_ttl(), Duration::ZERO);
        assert_eq!(config.start_param(), DEFAULT_START_PARAM);
        assert!(config.validate().is_ok());

        let bad = CliConfig::parse_from(["available-cars", "--store", "fleet.csv"]);
        assert!(bad.validate().is_err());
    }
}
