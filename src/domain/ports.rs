use crate::domain::filter::{Filter, Record};
use crate::domain::model::{
    Car, ComfortCategory, Driver, Position, PositionId, RequesterId, Trip,
};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::time::Duration;

/// Read access to one record kind.
#[async_trait]
pub trait Repository<T: Record>: Send + Sync {
    async fn find_by_id(&self, id: u64) -> Result<Option<T>>;
    async fn query(&self, filter: &Filter) -> Result<Vec<T>>;
}

/// The five record kinds the availability query reads, fixed at construction.
pub trait EntityStore: Send + Sync {
    fn positions(&self) -> &dyn Repository<Position>;
    fn categories(&self) -> &dyn Repository<ComfortCategory>;
    fn drivers(&self) -> &dyn Repository<Driver>;
    fn cars(&self) -> &dyn Repository<Car>;
    fn trips(&self) -> &dyn Repository<Trip>;
}

/// The host's user table. Only the position assignment is read.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn position_of(&self, requester: RequesterId) -> Result<Option<PositionId>>;
}

pub trait ConfigProvider: Send + Sync {
    fn start_param(&self) -> &str;
    fn end_param(&self) -> &str;
    /// Zero disables the result cache.
    fn cache_ttl(&self) -> Duration;
    /// Zero disables the allowed-categories cache.
    fn categories_cache_ttl(&self) -> Duration;
    /// Upper bound on live result-cache entries.
    fn cache_max_entries(&self) -> usize;
}
