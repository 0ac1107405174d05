//! Statistics Facades - Per-Cycle and Allocation-Rate Inputs
//!
//! Read-only views of the runtime statistics the heuristics consume:
//! per-generation cycle timing aggregates, the mutator allocation rate,
//! and heap occupancy. Providers must return snapshot-consistent values;
//! the plain snapshot structs below implement the facade traits so fixed
//! values can stand in for a live collector in tests and benchmarks.

/// One-sided 99.9% confidence margin (~3.3 sigma)
///
/// Added to decaying averages so that the probability of a sample falling
/// outside the predicted bound is 1 in 1000.
pub const ONE_IN_1000: f64 = 3.290527;

/// Decaying average and standard deviation of a per-cycle timing series
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TimeStats {
    /// Decaying (exponentially weighted) average in seconds
    pub davg: f64,
    /// Decaying standard deviation in seconds
    pub dsd: f64,
}

impl TimeStats {
    pub fn new(davg: f64, dsd: f64) -> Self {
        Self { davg, dsd }
    }

    /// Average plus the one-in-1000 deviation margin
    ///
    /// Negative deviations are treated as zero.
    pub fn upper_bound(&self) -> f64 {
        self.davg + self.dsd.max(0.0) * ONE_IN_1000
    }
}

/// Mutator allocation rate statistics in bytes per second
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AllocRateStats {
    /// Decaying average rate
    pub avg: f64,
    /// Decaying standard deviation of the rate
    pub sd: f64,
    /// One-step predictor of the next sample
    pub predict: f64,
}

/// Per-generation cycle statistics snapshot
///
/// All fields mirror the facade methods of [`GenerationStats`]; a value of
/// this type is itself a valid (constant) facade.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CycleStats {
    /// Serial (non-parallelizable) time of a cycle
    pub serial_time: TimeStats,
    /// Parallelizable time of a cycle
    pub parallelizable_time: TimeStats,
    /// Seconds since the last cycle of this generation finished
    pub time_since_last: f64,
    /// Enough cycles completed to trust duration predictions broadly
    pub is_warm: bool,
    /// Cycle durations usable for deadline math (may precede warmth)
    pub is_time_trustable: bool,
    /// Completed warmup cycles (0..=3)
    pub nwarmup_cycles: u32,
    /// Worker count used by the last cycle
    pub last_active_workers: u32,
    /// Average seconds between consecutive cycles
    pub avg_cycle_interval: f64,
    /// Live bytes at the end of the last mark
    pub live_at_mark_end: usize,
    /// Average bytes reclaimed per cycle
    pub reclaimed_avg: usize,
    /// Heap usage when the last relocation finished
    pub used_at_relocate_end: usize,
    /// Total collection count when the last cycle of this generation ended
    pub total_collections_at_end: u64,
}

/// Statistics facade for one generation
pub trait GenerationStats: Send + Sync {
    fn serial_time(&self) -> TimeStats;
    fn parallelizable_time(&self) -> TimeStats;
    fn time_since_last(&self) -> f64;
    fn is_warm(&self) -> bool;
    fn is_time_trustable(&self) -> bool;
    fn nwarmup_cycles(&self) -> u32;
    fn last_active_workers(&self) -> u32;
    fn avg_cycle_interval(&self) -> f64;
    fn live_at_mark_end(&self) -> usize;
    fn reclaimed_avg(&self) -> usize;
    fn used_at_relocate_end(&self) -> usize;
    fn total_collections_at_end(&self) -> u64;
}

impl GenerationStats for CycleStats {
    fn serial_time(&self) -> TimeStats {
        self.serial_time
    }

    fn parallelizable_time(&self) -> TimeStats {
        self.parallelizable_time
    }

    fn time_since_last(&self) -> f64 {
        self.time_since_last
    }

    fn is_warm(&self) -> bool {
        self.is_warm
    }

    fn is_time_trustable(&self) -> bool {
        self.is_time_trustable
    }

    fn nwarmup_cycles(&self) -> u32 {
        self.nwarmup_cycles
    }

    fn last_active_workers(&self) -> u32 {
        self.last_active_workers
    }

    fn avg_cycle_interval(&self) -> f64 {
        self.avg_cycle_interval
    }

    fn live_at_mark_end(&self) -> usize {
        self.live_at_mark_end
    }

    fn reclaimed_avg(&self) -> usize {
        self.reclaimed_avg
    }

    fn used_at_relocate_end(&self) -> usize {
        self.used_at_relocate_end
    }

    fn total_collections_at_end(&self) -> u64 {
        self.total_collections_at_end
    }
}

/// Mutator allocation rate facade
pub trait MutatorAllocRate: Send + Sync {
    fn stats(&self) -> AllocRateStats;
}

impl MutatorAllocRate for AllocRateStats {
    fn stats(&self) -> AllocRateStats {
        *self
    }
}

/// Heap occupancy snapshot
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HeapSnapshot {
    /// Soft maximum heap capacity in bytes
    pub soft_max_capacity: usize,
    /// Bytes currently used, both generations
    pub used: usize,
    /// Bytes currently used by the old generation
    pub used_old: usize,
    /// An allocating thread is stalled waiting for an old collection
    pub alloc_stalling_for_old: bool,
    /// Total collections started since VM start
    pub total_collections: u64,
}

/// Heap occupancy facade
pub trait HeapInfo: Send + Sync {
    fn soft_max_capacity(&self) -> usize;
    fn used(&self) -> usize;
    fn used_old(&self) -> usize;
    fn is_alloc_stalling_for_old(&self) -> bool;
    fn total_collections(&self) -> u64;
}

impl HeapInfo for HeapSnapshot {
    fn soft_max_capacity(&self) -> usize {
        self.soft_max_capacity
    }

    fn used(&self) -> usize {
        self.used
    }

    fn used_old(&self) -> usize {
        self.used_old
    }

    fn is_alloc_stalling_for_old(&self) -> bool {
        self.alloc_stalling_for_old
    }

    fn total_collections(&self) -> u64 {
        self.total_collections
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upper_bound() {
        let time = TimeStats::new(0.5, 0.1);
        let expected = 0.5 + 0.1 * ONE_IN_1000;
        assert!((time.upper_bound() - expected).abs() < 1e-12);
    }

    #[test]
    fn test_upper_bound_clamps_negative_sd() {
        let time = TimeStats::new(0.5, -0.1);
        assert_eq!(time.upper_bound(), 0.5);
    }

    #[test]
    fn test_cycle_stats_as_facade() {
        let stats = CycleStats {
            serial_time: TimeStats::new(0.05, 0.01),
            is_warm: true,
            last_active_workers: 4,
            ..Default::default()
        };
        let facade: &dyn GenerationStats = &stats;
        assert_eq!(facade.serial_time(), TimeStats::new(0.05, 0.01));
        assert!(facade.is_warm());
        assert_eq!(facade.last_active_workers(), 4);
    }

    #[test]
    fn test_heap_snapshot_as_facade() {
        let heap = HeapSnapshot {
            soft_max_capacity: 1024,
            used: 512,
            ..Default::default()
        };
        let facade: &dyn HeapInfo = &heap;
        assert_eq!(facade.soft_max_capacity(), 1024);
        assert_eq!(facade.used(), 512);
        assert!(!facade.is_alloc_stalling_for_old());
    }
}
