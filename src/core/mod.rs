pub mod access;
pub mod assembler;
pub mod busy;
pub mod cache;
pub mod date_filter;
pub mod query;

pub use crate::domain::model::{AvailabilityResult, EnrichedCar, TimeRange};
pub use crate::domain::ports::{ConfigProvider, EntityStore, Repository, UserDirectory};
pub use crate::utils::error::Result;
