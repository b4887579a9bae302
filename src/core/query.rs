use crate::core::access::AccessResolver;
use crate::core::assembler::assemble;
use crate::core::busy::resolve_busy_cars;
use crate::core::cache::{CacheStatsReport, TtlCache};
use crate::core::date_filter::time_range_from_params;
use crate::domain::model::{AvailabilityResult, EnrichedCar, RequesterId};
use crate::domain::ports::{ConfigProvider, EntityStore, UserDirectory};
use crate::utils::error::{AvailabilityError, Result, TRY_AGAIN_MESSAGE};
use std::collections::HashMap;
use std::time::Instant;

/// One incoming availability request. The caller has already authenticated
/// the requester; `params` is the raw query string.
#[derive(Debug, Clone, Default)]
pub struct QueryRequest {
    pub requester: Option<RequesterId>,
    pub params: HashMap<String, String>,
}

impl QueryRequest {
    pub fn new(requester: Option<RequesterId>) -> Self {
        Self {
            requester,
            params: HashMap::new(),
        }
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct ResultCacheKey {
    requester: Option<RequesterId>,
    start: Option<String>,
    end: Option<String>,
}

pub struct AvailabilityQuery<S: EntityStore, U: UserDirectory, C: ConfigProvider> {
    store: S,
    users: U,
    config: C,
    access: AccessResolver,
    results: TtlCache<ResultCacheKey, AvailabilityResult>,
}

impl<S: EntityStore, U: UserDirectory, C: ConfigProvider> AvailabilityQuery<S, U, C> {
    pub fn new(store: S, users: U, config: C) -> Self {
        let access = AccessResolver::new(config.categories_cache_ttl());
        let results = TtlCache::with_capacity(config.cache_max_entries());
        Self {
            store,
            users,
            config,
            access,
            results,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn access(&self) -> &AccessResolver {
        &self.access
    }

    /// Always returns a well-formed result; store faults become "try again later".
    pub async fn execute(&self, request: &QueryRequest) -> AvailabilityResult {
        let key = ResultCacheKey {
            requester: request.requester,
            start: request.params.get(self.config.start_param()).cloned(),
            end: request.params.get(self.config.end_param()).cloned(),
        };

        if let Some(cached) = self.results.get(&key) {
            tracing::debug!("Availability for {:?} served from cache", request.requester);
            return cached;
        }

        let started = Instant::now();
        let result = match self.available_cars(request).await {
            Ok(items) => {
                tracing::info!(
                    "{} cars available for requester {:?} ({:?})",
                    items.len(),
                    request.requester,
                    started.elapsed()
                );
                AvailabilityResult::ok(items)
            }
            Err(e) if e.is_rejection() => {
                tracing::debug!("Query for {:?} rejected: {}", request.requester, e);
                AvailabilityResult::failed(e.user_friendly_message())
            }
            Err(e) => {
                tracing::error!(
                    "Availability query failed for requester {:?}: {} (Category: {:?}, Severity: {:?})",
                    request.requester,
                    e,
                    e.category(),
                    e.severity()
                );
                return AvailabilityResult::failed(TRY_AGAIN_MESSAGE);
            }
        };

        self.results
            .insert(key, result.clone(), self.config.cache_ttl(), Vec::new());
        result
    }

    async fn available_cars(&self, request: &QueryRequest) -> Result<Vec<EnrichedCar>> {
        let allowed = self
            .access
            .resolve(&self.store, &self.users, request.requester)
            .await?;

        let range = time_range_from_params(
            &request.params,
            self.config.start_param(),
            self.config.end_param(),
        )
        .ok_or(AvailabilityError::InvalidOrMissingDateRange)?;

        let busy = resolve_busy_cars(&self.store, &range).await?;
        assemble(&self.store, &allowed, &busy).await
    }

    pub fn invalidate_results(&self) {
        self.results.clear();
    }

    pub fn result_cache_stats(&self) -> CacheStatsReport {
        self.results.stats()
    }
}
