use crate::domain::filter::{Record, Value};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

pub type CategoryId = u64;
pub type PositionId = u64;
pub type DriverId = u64;
pub type CarId = u64;
pub type TripId = u64;
pub type RequesterId = u64;

/// Field names shared by records and filters.
pub mod fields {
    pub const ID: &str = "id";
    pub const IS_ACTIVE: &str = "is_active";
    pub const NAME: &str = "name";
    pub const CATEGORY_ID: &str = "category_id";
    pub const DRIVER_ID: &str = "driver_id";
    pub const STATE_NUMBER: &str = "state_number";
    pub const FIRST_NAME: &str = "first_name";
    pub const LAST_NAME: &str = "last_name";
    pub const PATRONYMIC: &str = "patronymic";
    pub const PHONE: &str = "phone";
    pub const CAR_ID: &str = "car_id";
    pub const STATUS: &str = "status";
    pub const START_TIME: &str = "start_time";
    pub const END_TIME: &str = "end_time";
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub id: PositionId,
    #[serde(default)]
    pub allowed_category_ids: BTreeSet<CategoryId>,
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComfortCategory {
    pub id: CategoryId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Driver {
    pub id: DriverId,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub patronymic: String,
    #[serde(default)]
    pub phone: String,
    pub is_active: bool,
}

impl Driver {
    /// "first last patronymic", skipping empty parts.
    pub fn full_name(&self) -> String {
        [&self.first_name, &self.last_name, &self.patronymic]
            .into_iter()
            .map(|part| part.trim())
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Car {
    pub id: CarId,
    pub name: String,
    pub state_number: String,
    pub category_id: CategoryId,
    #[serde(default)]
    pub driver_id: Option<DriverId>,
    pub is_active: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TripStatus {
    Active,
    #[serde(other)]
    Other,
}

impl TripStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TripStatus::Active => "active",
            TripStatus::Other => "other",
        }
    }
}

/// Trip times carry no zone and are read as UTC.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trip {
    pub id: TripId,
    pub car_id: CarId,
    pub status: TripStatus,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
}

/// A closed time window with `start < end`, in UTC. Trips overlapping it are
/// selected by `core::busy::overlap_filter`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimeRange {
    start: NaiveDateTime,
    end: NaiveDateTime,
}

impl TimeRange {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Option<Self> {
        (start < end).then_some(Self { start, end })
    }

    pub fn start(&self) -> NaiveDateTime {
        self.start
    }

    pub fn end(&self) -> NaiveDateTime {
        self.end
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedCar {
    pub id: CarId,
    pub name: String,
    pub state_number: String,
    pub category_id: CategoryId,
    pub driver_id: Option<DriverId>,
    pub category_name: String,
    pub driver_name: String,
    pub driver_phone: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AvailabilityResult {
    pub items: Vec<EnrichedCar>,
    pub error: Option<String>,
}

impl AvailabilityResult {
    pub fn ok(items: Vec<EnrichedCar>) -> Self {
        Self { items, error: None }
    }

    pub fn failed(reason: impl Into<String>) -> Self {
        Self {
            items: Vec::new(),
            error: Some(reason.into()),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

impl Record for Position {
    fn id(&self) -> u64 {
        self.id
    }

    fn field(&self, name: &str) -> Option<Value> {
        match name {
            fields::ID => Some(Value::Id(self.id)),
            fields::IS_ACTIVE => Some(Value::Bool(self.is_active)),
            _ => None,
        }
    }
}

impl Record for ComfortCategory {
    fn id(&self) -> u64 {
        self.id
    }

    fn field(&self, name: &str) -> Option<Value> {
        match name {
            fields::ID => Some(Value::Id(self.id)),
            fields::NAME => Some(Value::Text(self.name.clone())),
            _ => None,
        }
    }
}

impl Record for Driver {
    fn id(&self) -> u64 {
        self.id
    }

    fn field(&self, name: &str) -> Option<Value> {
        match name {
            fields::ID => Some(Value::Id(self.id)),
            fields::FIRST_NAME => Some(Value::Text(self.first_name.clone())),
            fields::LAST_NAME => Some(Value::Text(self.last_name.clone())),
            fields::PATRONYMIC => Some(Value::Text(self.patronymic.clone())),
            fields::PHONE => Some(Value::Text(self.phone.clone())),
            fields::IS_ACTIVE => Some(Value::Bool(self.is_active)),
            _ => None,
        }
    }
}

impl Record for Car {
    fn id(&self) -> u64 {
        self.id
    }

    fn field(&self, name: &str) -> Option<Value> {
        match name {
            fields::ID => Some(Value::Id(self.id)),
            fields::NAME => Some(Value::Text(self.name.clone())),
            fields::STATE_NUMBER => Some(Value::Text(self.state_number.clone())),
            fields::CATEGORY_ID => Some(Value::Id(self.category_id)),
            fields::DRIVER_ID => self.driver_id.map(Value::Id),
            fields::IS_ACTIVE => Some(Value::Bool(self.is_active)),
            _ => None,
        }
    }
}

impl Record for Trip {
    fn id(&self) -> u64 {
        self.id
    }

    fn field(&self, name: &str) -> Option<Value> {
        match name {
            fields::ID => Some(Value::Id(self.id)),
            fields::CAR_ID => Some(Value::Id(self.car_id)),
            fields::STATUS => Some(Value::Text(self.status.as_str().to_string())),
            fields::START_TIME => Some(Value::Time(self.start_time)),
            fields::END_TIME => Some(Value::Time(self.end_time)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn jan(day: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, day)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_time_range_requires_start_before_end() {
        assert!(TimeRange::new(jan(4), jan(6)).is_some());
        assert!(TimeRange::new(jan(6), jan(4)).is_none());
        assert!(TimeRange::new(jan(4), jan(4)).is_none());
    }

    #[test]
    fn test_driver_full_name_skips_empty_parts() {
        let driver = Driver {
            id: 1,
            first_name: "Ivan".into(),
            last_name: "Petrov".into(),
            patronymic: String::new(),
            phone: "+7 900 000 00 00".into(),
            is_active: true,
        };
        assert_eq!(driver.full_name(), "Ivan Petrov");
    }

    #[test]
    fn test_unknown_trip_status_deserializes_as_other() {
        let trip: Trip = serde_json::from_str(
            r#"{"id":1,"car_id":2,"status":"cancelled","start_time":"2024-01-01T00:00:00","end_time":"2024-01-02T00:00:00"}"#,
        )
        .unwrap();
        assert_eq!(trip.status, TripStatus::Other);
    }
}
