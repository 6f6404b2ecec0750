/*!
 * Resolver Metrics
 * Lock-free counters describing resolution traffic
 */

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Counters updated by the resolver
#[derive(Debug, Default)]
pub struct ResolverStats {
    resolutions: AtomicU64,
    cache_hits: AtomicU64,
    system_synthesized: AtomicU64,
    unprofiled: AtomicU64,
    merges: AtomicU64,
    rewrites: AtomicU64,
    ascents: AtomicU64,
    icon_backfills: AtomicU64,
    single_flight_waits: AtomicU64,
}

/// Point-in-time copy of [`ResolverStats`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ResolverStatsSnapshot {
    pub resolutions: u64,
    pub cache_hits: u64,
    pub system_synthesized: u64,
    pub unprofiled: u64,
    pub merges: u64,
    pub rewrites: u64,
    pub ascents: u64,
    pub icon_backfills: u64,
    pub single_flight_waits: u64,
}

impl ResolverStatsSnapshot {
    /// Share of lookups served from the process store, in percent
    pub fn hit_rate(&self) -> f64 {
        let total = self.cache_hits + self.resolutions;
        if total > 0 {
            (self.cache_hits as f64 / total as f64) * 100.0
        } else {
            0.0
        }
    }
}

impl ResolverStats {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn record_resolution(&self) {
        self.resolutions.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_cache_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_system(&self) {
        self.system_synthesized.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_unprofiled(&self) {
        self.unprofiled.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_merge(&self) {
        self.merges.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_rewrite(&self) {
        self.rewrites.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_ascent(&self) {
        self.ascents.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_icon_backfill(&self) {
        self.icon_backfills.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_single_flight_wait(&self) {
        self.single_flight_waits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> ResolverStatsSnapshot {
        ResolverStatsSnapshot {
            resolutions: self.resolutions.load(Ordering::Relaxed),
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            system_synthesized: self.system_synthesized.load(Ordering::Relaxed),
            unprofiled: self.unprofiled.load(Ordering::Relaxed),
            merges: self.merges.load(Ordering::Relaxed),
            rewrites: self.rewrites.load(Ordering::Relaxed),
            ascents: self.ascents.load(Ordering::Relaxed),
            icon_backfills: self.icon_backfills.load(Ordering::Relaxed),
            single_flight_waits: self.single_flight_waits.load(Ordering::Relaxed),
        }
    }
}
