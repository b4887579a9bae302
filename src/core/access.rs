use crate::core::cache::{CacheStatsReport, TtlCache};
use crate::domain::model::{CategoryId, Position, PositionId, RequesterId};
use crate::domain::ports::{EntityStore, UserDirectory};
use crate::utils::error::{AvailabilityError, Result};
use std::collections::BTreeSet;
use std::time::Duration;

pub fn requester_tag(requester: RequesterId) -> String {
    format!("user_id_{}", requester)
}

pub fn position_tag(position: PositionId) -> String {
    format!("position_id_{}", position)
}

/// Maps a requester to the comfort categories their position may book.
pub struct AccessResolver {
    cache: TtlCache<RequesterId, Option<Position>>,
    ttl: Duration,
}

impl AccessResolver {
    pub fn new(ttl: Duration) -> Self {
        Self {
            cache: TtlCache::new(),
            ttl,
        }
    }

    pub async fn resolve<S, U>(
        &self,
        store: &S,
        users: &U,
        requester: Option<RequesterId>,
    ) -> Result<BTreeSet<CategoryId>>
    where
        S: EntityStore + ?Sized,
        U: UserDirectory + ?Sized,
    {
        let requester = requester.ok_or(AvailabilityError::Unauthenticated)?;

        let position = match self.cache.get(&requester) {
            Some(cached) => {
                tracing::debug!("Position for requester {} served from cache", requester);
                cached
            }
            None => self.load_position(store, users, requester).await?,
        };

        let position = position.ok_or(AvailabilityError::NoPosition)?;
        if position.allowed_category_ids.is_empty() {
            return Err(AvailabilityError::NoAllowedCategories);
        }

        Ok(position.allowed_category_ids)
    }

    async fn load_position<S, U>(
        &self,
        store: &S,
        users: &U,
        requester: RequesterId,
    ) -> Result<Option<Position>>
    where
        S: EntityStore + ?Sized,
        U: UserDirectory + ?Sized,
    {
        // A missing assignment is never cached.
        let Some(position_id) = users.position_of(requester).await? else {
            tracing::debug!("Requester {} has no position assigned", requester);
            return Ok(None);
        };

        let position = store
            .positions()
            .find_by_id(position_id)
            .await?
            .filter(|p| p.is_active);

        if position.is_none() {
            tracing::debug!(
                "Position {} of requester {} is missing or inactive",
                position_id,
                requester
            );
        }

        let mut tags = vec![requester_tag(requester)];
        if let Some(p) = &position {
            tags.push(position_tag(p.id));
        }
        self.cache.insert(requester, position.clone(), self.ttl, tags);

        Ok(position)
    }

    pub fn invalidate_requester(&self, requester: RequesterId) -> usize {
        self.cache.invalidate_tag(&requester_tag(requester))
    }

    pub fn invalidate_position(&self, position: PositionId) -> usize {
        self.cache.invalidate_tag(&position_tag(position))
    }

    pub fn cache_stats(&self) -> CacheStatsReport {
        self.cache.stats()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{InMemoryStore, StoreSnapshot, UserRecord};

    fn store() -> InMemoryStore {
        InMemoryStore::new(StoreSnapshot {
            positions: vec![
                Position {
                    id: 1,
                    allowed_category_ids: [10, 20].into_iter().collect(),
                    is_active: true,
                },
                Position {
                    id: 2,
                    allowed_category_ids: [10].into_iter().collect(),
                    is_active: false,
                },
                Position {
                    id: 3,
                    allowed_category_ids: BTreeSet::new(),
                    is_active: true,
                },
            ],
            users: vec![
                UserRecord { id: 100, position_id: Some(1) },
                UserRecord { id: 101, position_id: Some(2) },
                UserRecord { id: 102, position_id: None },
                UserRecord { id: 103, position_id: Some(3) },
                UserRecord { id: 104, position_id: Some(99) },
            ],
            ..StoreSnapshot::default()
        })
    }

    #[test]
    fn test_resolves_allowed_categories() {
        let store = store();
        let resolver = AccessResolver::new(Duration::from_secs(60));
        let allowed = tokio_test::block_on(resolver.resolve(&store, &store, Some(100))).unwrap();
        assert_eq!(allowed, [10, 20].into_iter().collect::<BTreeSet<_>>());
    }

    #[test]
    fn test_rejections() {
        let store = store();
        let resolver = AccessResolver::new(Duration::from_secs(60));

        let result = tokio_test::block_on(resolver.resolve(&store, &store, None));
        assert!(matches!(result, Err(AvailabilityError::Unauthenticated)));

        for requester in [101, 102, 104] {
            let result = tokio_test::block_on(resolver.resolve(&store, &store, Some(requester)));
            assert!(matches!(result, Err(AvailabilityError::NoPosition)));
        }

        let result = tokio_test::block_on(resolver.resolve(&store, &store, Some(103)));
        assert!(matches!(result, Err(AvailabilityError::NoAllowedCategories)));
    }

    #[test]
    fn test_cache_and_tag_invalidation() {
        let store = store();
        let resolver = AccessResolver::new(Duration::from_secs(60));

        tokio_test::block_on(resolver.resolve(&store, &store, Some(100))).unwrap();
        tokio_test::block_on(resolver.resolve(&store, &store, Some(100))).unwrap();
        assert_eq!(resolver.cache_stats().hit_count, 1);

        assert_eq!(resolver.invalidate_position(1), 1);
        assert_eq!(resolver.invalidate_requester(100), 0);

        tokio_test::block_on(resolver.resolve(&store, &store, Some(100))).unwrap();
        assert_eq!(resolver.cache_stats().hit_count, 1);
    }

    #[test]
    fn test_user_without_position_is_not_cached() {
        let store = store();
        let resolver = AccessResolver::new(Duration::from_secs(60));

        let _ = tokio_test::block_on(resolver.resolve(&store, &store, Some(102)));
        let _ = tokio_test::block_on(resolver.resolve(&store, &store, Some(101)));
        // only the inactive-position lookup is remembered
        assert_eq!(resolver.cache_stats().items_count, 1);
    }
}
