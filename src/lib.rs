pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::{toml_config::TomlConfig, QuerySettings};

pub use adapters::memory::{InMemoryStore, StoreSnapshot};
pub use core::query::{AvailabilityQuery, QueryRequest};
pub use domain::model::{AvailabilityResult, EnrichedCar};
pub use utils::error::{AvailabilityError, Result};
