//! Caching layer for planned itineraries.
//!
//! With a fixed seed, a search that stops on its iteration budget (or
//! exhausts its search space) always produces the same itinerary, so the
//! outcome can be reused for an identical validated request. Searches cut
//! short by the wall clock depend on machine load and are never cached.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache as MokaCache;

use crate::planner::{PlanOutcome, SearchRequest, Termination};

/// Configuration for the cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// TTL for cached entries.
    pub ttl: Duration,

    /// Maximum number of cached entries.
    pub max_capacity: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(600),
            max_capacity: 1000,
        }
    }
}

/// Cache of planned itineraries keyed by validated request.
pub struct PlanCache {
    plans: MokaCache<SearchRequest, Arc<PlanOutcome>>,
}

impl PlanCache {
    /// Create a new cache with the given configuration.
    pub fn new(config: &CacheConfig) -> Self {
        let plans = MokaCache::builder()
            .time_to_live(config.ttl)
            .max_capacity(config.max_capacity)
            .build();

        Self { plans }
    }

    /// Whether an outcome is reproducible and so safe to cache.
    pub fn is_cacheable(outcome: &PlanOutcome) -> bool {
        outcome.report.termination != Termination::TimeLimit
    }

    /// Get a cached outcome.
    pub async fn get(&self, request: &SearchRequest) -> Option<Arc<PlanOutcome>> {
        self.plans.get(request).await
    }

    /// Cache an outcome if it is reproducible.
    ///
    /// Returns whether the outcome was stored.
    pub async fn insert(&self, request: SearchRequest, outcome: Arc<PlanOutcome>) -> bool {
        if !Self::is_cacheable(&outcome) {
            return false;
        }
        self.plans.insert(request, outcome).await;
        true
    }

    /// Get cache statistics (for monitoring).
    pub fn entry_count(&self) -> u64 {
        self.plans.entry_count()
    }

    /// Invalidate all cached entries.
    pub fn invalidate_all(&self) {
        self.plans.invalidate_all();
    }
}
