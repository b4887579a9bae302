use crate::domain::filter::Filter;
use crate::domain::model::{fields, Car, CarId, CategoryId, DriverId, EnrichedCar};
use crate::domain::ports::EntityStore;
use crate::utils::error::Result;
use std::collections::{BTreeSet, HashMap};

pub const UNASSIGNED_DRIVER: &str = "unassigned";
pub const CATEGORY_NOT_FOUND: &str = "category not found";

/// Active cars in `allowed` categories minus `busy`, with driver and category
/// details attached. Issues at most one query per record kind.
pub async fn assemble<S>(
    store: &S,
    allowed: &BTreeSet<CategoryId>,
    busy: &BTreeSet<CarId>,
) -> Result<Vec<EnrichedCar>>
where
    S: EntityStore + ?Sized,
{
    if allowed.is_empty() {
        return Ok(Vec::new());
    }

    let cars = store.cars().query(&eligible_cars_filter(allowed, busy)).await?;
    tracing::debug!("{} eligible cars before enrichment", cars.len());

    if cars.is_empty() {
        return Ok(Vec::new());
    }

    let mut enriched: Vec<EnrichedCar> = cars.into_iter().map(bare).collect();
    fill_drivers(store, &mut enriched).await?;
    fill_categories(store, &mut enriched).await?;

    Ok(enriched)
}

pub fn eligible_cars_filter(allowed: &BTreeSet<CategoryId>, busy: &BTreeSet<CarId>) -> Filter {
    let mut conditions = vec![
        Filter::eq(fields::IS_ACTIVE, true),
        Filter::is_in(fields::CATEGORY_ID, allowed.iter().copied()),
    ];
    if !busy.is_empty() {
        conditions.push(Filter::not_in(fields::ID, busy.iter().copied()));
    }
    Filter::And(conditions)
}

fn bare(car: Car) -> EnrichedCar {
    EnrichedCar {
        id: car.id,
        name: car.name,
        state_number: car.state_number,
        category_id: car.category_id,
        driver_id: car.driver_id,
        category_name: CATEGORY_NOT_FOUND.to_string(),
        driver_name: UNASSIGNED_DRIVER.to_string(),
        driver_phone: String::new(),
    }
}

async fn fill_drivers<S>(store: &S, cars: &mut [EnrichedCar]) -> Result<()>
where
    S: EntityStore + ?Sized,
{
    let driver_ids: BTreeSet<DriverId> = cars.iter().filter_map(|car| car.driver_id).collect();
    if driver_ids.is_empty() {
        return Ok(());
    }

    let filter = Filter::And(vec![
        Filter::is_in(fields::ID, driver_ids.iter().copied()),
        Filter::eq(fields::IS_ACTIVE, true),
    ]);
    let drivers: HashMap<DriverId, _> = store
        .drivers()
        .query(&filter)
        .await?
        .into_iter()
        .map(|driver| (driver.id, driver))
        .collect();

    for car in cars.iter_mut() {
        match car.driver_id.and_then(|id| drivers.get(&id)) {
            Some(driver) => {
                car.driver_name = driver.full_name();
                car.driver_phone = driver.phone.clone();
            }
            None => {
                car.driver_name = UNASSIGNED_DRIVER.to_string();
                car.driver_phone = String::new();
            }
        }
    }

    Ok(())
}

async fn fill_categories<S>(store: &S, cars: &mut [EnrichedCar]) -> Result<()>
where
    S: EntityStore + ?Sized,
{
    let category_ids: BTreeSet<CategoryId> = cars.iter().map(|car| car.category_id).collect();

    let names: HashMap<CategoryId, String> = store
        .categories()
        .query(&Filter::is_in(fields::ID, category_ids.iter().copied()))
        .await?
        .into_iter()
        .map(|category| (category.id, category.name))
        .collect();

    for car in cars.iter_mut() {
        match names.get(&car.category_id) {
            Some(name) => car.category_name = name.clone(),
            None => {
                tracing::warn!(
                    "Car {} references unknown category {}",
                    car.id,
                    car.category_id
                );
                car.category_name = CATEGORY_NOT_FOUND.to_string();
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{InMemoryStore, StoreSnapshot};
    use crate::domain::model::{ComfortCategory, Driver};

    fn car(id: u64, category_id: u64, driver_id: Option<u64>, is_active: bool) -> Car {
        Car {
            id,
            name: format!("Car {}", id),
            state_number: format!("A{:03}AA", id),
            category_id,
            driver_id,
            is_active,
        }
    }

    fn driver(id: u64, is_active: bool) -> Driver {
        Driver {
            id,
            first_name: "Anna".into(),
            last_name: format!("Driver{}", id),
            patronymic: "Sergeevna".into(),
            phone: format!("+7-000-{}", id),
            is_active,
        }
    }

    fn category(id: u64, name: &str) -> ComfortCategory {
        ComfortCategory {
            id,
            name: name.to_string(),
        }
    }

    fn ids(cars: &[EnrichedCar]) -> Vec<u64> {
        cars.iter().map(|car| car.id).collect()
    }

    #[test]
    fn test_filters_by_category_busy_and_active() {
        let store = InMemoryStore::new(StoreSnapshot {
            categories: vec![category(1, "economy"), category(2, "comfort"), category(3, "business")],
            cars: vec![
                car(1, 1, None, true),
                car(5, 1, None, true),
                car(9, 3, None, true),
                car(11, 2, None, false),
            ],
            ..StoreSnapshot::default()
        });
        let allowed = [1, 2].into_iter().collect();
        let busy = [5].into_iter().collect();

        let result = tokio_test::block_on(assemble(&store, &allowed, &busy)).unwrap();
        assert_eq!(ids(&result), vec![1]);
        assert_eq!(result[0].category_name, "economy");
    }

    #[test]
    fn test_empty_allowed_categories_short_circuit() {
        let store = InMemoryStore::new(StoreSnapshot {
            cars: vec![car(1, 1, None, true)],
            ..StoreSnapshot::default()
        });
        let result =
            tokio_test::block_on(assemble(&store, &BTreeSet::new(), &BTreeSet::new())).unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn test_driver_sentinels() {
        let store = InMemoryStore::new(StoreSnapshot {
            categories: vec![category(1, "economy")],
            drivers: vec![driver(1, true), driver(2, false)],
            cars: vec![
                car(1, 1, Some(1), true),
                car(2, 1, Some(2), true),
                car(3, 1, None, true),
                car(4, 1, Some(42), true),
            ],
            ..StoreSnapshot::default()
        });
        let allowed = [1].into_iter().collect();

        let result = tokio_test::block_on(assemble(&store, &allowed, &BTreeSet::new())).unwrap();
        assert_eq!(result.len(), 4);

        assert_eq!(result[0].driver_name, "Anna Driver1 Sergeevna");
        assert_eq!(result[0].driver_phone, "+7-000-1");
        for unassigned in &result[1..] {
            assert_eq!(unassigned.driver_name, UNASSIGNED_DRIVER);
            assert!(unassigned.driver_phone.is_empty());
        }
    }

    #[test]
    fn test_unknown_category_uses_sentinel() {
        let store = InMemoryStore::new(StoreSnapshot {
            categories: vec![category(1, "economy")],
            cars: vec![car(1, 1, None, true), car(2, 7, None, true)],
            ..StoreSnapshot::default()
        });
        let allowed = [1, 7].into_iter().collect();

        let result = tokio_test::block_on(assemble(&store, &allowed, &BTreeSet::new())).unwrap();
        assert_eq!(result[0].category_name, "economy");
        assert_eq!(result[1].category_name, CATEGORY_NOT_FOUND);
    }

    #[test]
    fn test_busy_filter_omitted_when_nothing_is_busy() {
        let allowed = [1].into_iter().collect();
        match eligible_cars_filter(&allowed, &BTreeSet::new()) {
            Filter::And(conditions) => assert_eq!(conditions.len(), 2),
            other => panic!("unexpected filter {:?}", other),
        }
    }
}
