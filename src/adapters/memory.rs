use crate::domain::filter::{Filter, Record};
use crate::domain::model::{
    Car, ComfortCategory, Driver, Position, PositionId, RequesterId, Trip,
};
use crate::domain::ports::{EntityStore, Repository, UserDirectory};
use crate::utils::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: RequesterId,
    #[serde(default)]
    pub position_id: Option<PositionId>,
}

/// Everything the store holds, as read from a JSON file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreSnapshot {
    #[serde(default)]
    pub positions: Vec<Position>,
    #[serde(default)]
    pub categories: Vec<ComfortCategory>,
    #[serde(default)]
    pub drivers: Vec<Driver>,
    #[serde(default)]
    pub cars: Vec<Car>,
    #[serde(default)]
    pub trips: Vec<Trip>,
    #[serde(default)]
    pub users: Vec<UserRecord>,
}

#[derive(Debug, Clone)]
pub struct MemoryRepository<T> {
    records: Vec<T>,
}

impl<T: Record> MemoryRepository<T> {
    pub fn new(records: Vec<T>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait]
impl<T: Record> Repository<T> for MemoryRepository<T> {
    async fn find_by_id(&self, id: u64) -> Result<Option<T>> {
        Ok(self.records.iter().find(|r| r.id() == id).cloned())
    }

    async fn query(&self, filter: &Filter) -> Result<Vec<T>> {
        Ok(self
            .records
            .iter()
            .filter(|r| filter.matches(*r))
            .cloned()
            .collect())
    }
}

/// In-memory store over a snapshot. Records keep the snapshot's order.
#[derive(Debug, Clone)]
pub struct InMemoryStore {
    positions: MemoryRepository<Position>,
    categories: MemoryRepository<ComfortCategory>,
    drivers: MemoryRepository<Driver>,
    cars: MemoryRepository<Car>,
    trips: MemoryRepository<Trip>,
    users: HashMap<RequesterId, Option<PositionId>>,
}

impl InMemoryStore {
    pub fn new(snapshot: StoreSnapshot) -> Self {
        Self {
            positions: MemoryRepository::new(snapshot.positions),
            categories: MemoryRepository::new(snapshot.categories),
            drivers: MemoryRepository::new(snapshot.drivers),
            cars: MemoryRepository::new(snapshot.cars),
            trips: MemoryRepository::new(snapshot.trips),
            users: snapshot
                .users
                .into_iter()
                .map(|u| (u.id, u.position_id))
                .collect(),
        }
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        let snapshot: StoreSnapshot = serde_json::from_str(content)?;
        Ok(Self::new(snapshot))
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        let store = Self::from_json_str(&content)?;

        tracing::info!(
            "Loaded store from {}: {} cars, {} drivers, {} trips",
            path.as_ref().display(),
            store.cars.len(),
            store.drivers.len(),
            store.trips.len()
        );
        Ok(store)
    }
}

impl EntityStore for InMemoryStore {
    fn positions(&self) -> &dyn Repository<Position> {
        &self.positions
    }

    fn categories(&self) -> &dyn Repository<ComfortCategory> {
        &self.categories
    }

    fn drivers(&self) -> &dyn Repository<Driver> {
        &self.drivers
    }

    fn cars(&self) -> &dyn Repository<Car> {
        &self.cars
    }

    fn trips(&self) -> &dyn Repository<Trip> {
        &self.trips
    }
}

#[async_trait]
impl UserDirectory for InMemoryStore {
    async fn position_of(&self, requester: RequesterId) -> Result<Option<PositionId>> {
        Ok(self.users.get(&requester).copied().flatten())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::fields;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SNAPSHOT: &str = r#"{
        "positions": [{"id": 1, "allowed_category_ids": [10], "is_active": true}],
        "categories": [{"id": 10, "name": "economy"}],
        "cars": [
            {"id": 1, "name": "Lada Vesta", "state_number": "A001AA", "category_id": 10, "driver_id": 3, "is_active": true},
            {"id": 2, "name": "Kia Rio", "state_number": "B002BB", "category_id": 10, "is_active": true}
        ],
        "users": [{"id": 100, "position_id": 1}, {"id": 101}]
    }"#;

    #[test]
    fn test_load_snapshot_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(SNAPSHOT.as_bytes()).unwrap();

        let store = InMemoryStore::from_file(temp_file.path()).unwrap();
        let car = tokio_test::block_on(store.cars().find_by_id(2)).unwrap().unwrap();
        assert_eq!(car.name, "Kia Rio");
        assert_eq!(car.driver_id, None);
        assert!(tokio_test::block_on(store.trips().query(&Filter::And(vec![]))).unwrap().is_empty());
    }

    #[test]
    fn test_user_directory() {
        let store = InMemoryStore::from_json_str(SNAPSHOT).unwrap();
        assert_eq!(tokio_test::block_on(store.position_of(100)).unwrap(), Some(1));
        assert_eq!(tokio_test::block_on(store.position_of(101)).unwrap(), None);
        assert_eq!(tokio_test::block_on(store.position_of(999)).unwrap(), None);
    }

    #[test]
    fn test_query_keeps_snapshot_order() {
        let store = InMemoryStore::from_json_str(SNAPSHOT).unwrap();
        let cars = tokio_test::block_on(store.cars().query(&Filter::eq(fields::CATEGORY_ID, 10u64))).unwrap();
        let ids: Vec<u64> = cars.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn test_malformed_snapshot_is_an_error() {
        assert!(InMemoryStore::from_json_str("{\"cars\": 3}").is_err());
    }
}
