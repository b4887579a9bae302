use crate::domain::filter::Filter;
use crate::domain::model::{fields, CarId, TimeRange, TripStatus};
use crate::domain::ports::EntityStore;
use crate::utils::error::Result;
use std::collections::BTreeSet;

/// Active trips whose closed interval overlaps `range`: `start <= range.end AND end >= range.start`.
/// This is the only overlap rule; touching bounds count.
pub fn overlap_filter(range: &TimeRange) -> Filter {
    Filter::And(vec![
        Filter::eq(fields::STATUS, TripStatus::Active.as_str()),
        Filter::le(fields::START_TIME, range.end()),
        Filter::ge(fields::END_TIME, range.start()),
    ])
}

/// Cars committed to an active trip overlapping `range`.
pub async fn resolve_busy_cars<S>(store: &S, range: &TimeRange) -> Result<BTreeSet<CarId>>
where
    S: EntityStore + ?Sized,
{
    let trips = store.trips().query(&overlap_filter(range)).await?;
    let busy: BTreeSet<CarId> = trips.iter().map(|trip| trip.car_id).collect();

    tracing::debug!(
        "{} overlapping trips keep {} cars busy between {} and {}",
        trips.len(),
        busy.len(),
        range.start(),
        range.end()
    );

    Ok(busy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{InMemoryStore, StoreSnapshot};
    use crate::domain::model::Trip;
    use chrono::{NaiveDate, NaiveDateTime};

    fn jan(day: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, day)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    fn trip(id: u64, car_id: u64, status: TripStatus, start: u32, end: u32) -> Trip {
        Trip {
            id,
            car_id,
            status,
            start_time: jan(start),
            end_time: jan(end),
        }
    }

    fn busy_for(trips: Vec<Trip>, start: u32, end: u32) -> BTreeSet<CarId> {
        let store = InMemoryStore::new(StoreSnapshot {
            trips,
            ..StoreSnapshot::default()
        });
        let range = TimeRange::new(jan(start), jan(end)).unwrap();
        tokio_test::block_on(resolve_busy_cars(&store, &range)).unwrap()
    }

    #[test]
    fn test_end_inside_window_is_busy() {
        let busy = busy_for(vec![trip(1, 7, TripStatus::Active, 2, 5)], 4, 6);
        assert!(busy.contains(&7));
    }

    #[test]
    fn test_window_inside_trip_is_busy() {
        let busy = busy_for(vec![trip(1, 7, TripStatus::Active, 1, 10)], 4, 6);
        assert!(busy.contains(&7));
    }

    #[test]
    fn test_start_inside_window_is_busy() {
        let busy = busy_for(vec![trip(1, 7, TripStatus::Active, 5, 9)], 4, 6);
        assert!(busy.contains(&7));
    }

    #[test]
    fn test_trip_inside_window_is_busy() {
        let busy = busy_for(vec![trip(1, 7, TripStatus::Active, 4, 5)], 3, 6);
        assert!(busy.contains(&7));
    }

    #[test]
    fn test_disjoint_trip_is_free() {
        let busy = busy_for(
            vec![
                trip(1, 7, TripStatus::Active, 1, 2),
                trip(2, 8, TripStatus::Active, 7, 9),
            ],
            4,
            6,
        );
        assert!(busy.is_empty());
    }

    #[test]
    fn test_touching_bounds_are_busy() {
        let busy = busy_for(
            vec![
                trip(1, 7, TripStatus::Active, 1, 4),
                trip(2, 8, TripStatus::Active, 6, 9),
            ],
            4,
            6,
        );
        assert_eq!(busy, [7, 8].into_iter().collect::<BTreeSet<_>>());
    }

    #[test]
    fn test_inactive_trips_never_count() {
        let busy = busy_for(vec![trip(1, 7, TripStatus::Other, 1, 10)], 4, 6);
        assert!(busy.is_empty());
    }

    #[test]
    fn test_car_ids_are_distinct() {
        let busy = busy_for(
            vec![
                trip(1, 7, TripStatus::Active, 3, 4),
                trip(2, 7, TripStatus::Active, 5, 6),
            ],
            4,
            6,
        );
        assert_eq!(busy.len(), 1);
    }
}
