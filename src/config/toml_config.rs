use crate::config::{
    QuerySettings, DEFAULT_CACHE_MAX_ENTRIES, DEFAULT_CACHE_TTL_SECS, DEFAULT_CATEGORIES_CACHE_TTL_SECS, DEFAULT_END_PARAM,
    DEFAULT_START_PARAM,
};
use crate::core::ConfigProvider;
use crate::utils::error::{AvailabilityError, Result};
use crate::utils::validation::Validate;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::OnceLock;
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub query: QueryConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    pub store: Option<StoreConfig>,
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryConfig {
    #[serde(default = "default_start_param")]
    pub start_param: String,
    #[serde(default = "default_end_param")]
    pub end_param: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    pub result_ttl_seconds: Option<u64>,
    pub categories_ttl_seconds: Option<u64>,
    pub max_entries: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    pub path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub verbose: Option<bool>,
    pub json: Option<bool>,
}

fn default_start_param() -> String {
    DEFAULT_START_PARAM.to_string()
}

fn default_end_param() -> String {
    DEFAULT_END_PARAM.to_string()
}

fn default_enabled() -> bool {
    true
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            start_param: default_start_param(),
            end_param: default_end_param(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            result_ttl_seconds: None,
            categories_ttl_seconds: None,
            max_entries: None,
        }
    }
}

fn env_var_pattern() -> &'static regex::Regex {
    static PATTERN: OnceLock<regex::Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        regex::Regex::new(r"\$\{([^}]+)\}").expect("env var pattern is a valid regex")
    })
}

impl TomlConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| AvailabilityError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the environment value; unknown variables stay as written.
    fn substitute_env_vars(content: &str) -> String {
        env_var_pattern()
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }

    pub fn validate_config(&self) -> Result<()> {
        if let Some(store) = &self.store {
            crate::utils::validation::validate_path("store.path", &store.path)?;
            crate::utils::validation::validate_file_extension("store.path", &store.path, &["json"])?;
        }

        self.query_settings().validate()
    }

    pub fn store_path(&self) -> Option<&str> {
        self.store.as_ref().map(|s| s.path.as_str())
    }

    pub fn verbose(&self) -> bool {
        self.logging.as_ref().and_then(|l| l.verbose).unwrap_or(false)
    }

    pub fn json_logs(&self) -> bool {
        self.logging.as_ref().and_then(|l| l.json).unwrap_or(false)
    }

    pub fn query_settings(&self) -> QuerySettings {
        QuerySettings::from_provider(self)
    }
}

impl ConfigProvider for TomlConfig {
    fn start_param(&self) -> &str {
        &self.query.start_param
    }

    fn end_param(&self) -> &str {
        &self.query.end_param
    }

    fn cache_ttl(&self) -> Duration {
        if !self.cache.enabled {
            return Duration::ZERO;
        }
        Duration::from_secs(self.cache.result_ttl_seconds.unwrap_or(DEFAULT_CACHE_TTL_SECS))
    }

    fn categories_cache_ttl(&self) -> Duration {
        if !self.cache.enabled {
            return Duration::ZERO;
        }
        Duration::from_secs(
            self.cache
                .categories_ttl_seconds
                .unwrap_or(DEFAULT_CATEGORIES_CACHE_TTL_SECS),
        )
    }

    fn cache_max_entries(&self) -> usize {
        self.cache.max_entries.unwrap_or(DEFAULT_CACHE_MAX_ENTRIES)
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
