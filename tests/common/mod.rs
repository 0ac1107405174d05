//! Shared test fixtures for the director suites
//!
//! Provides recording mocks for the driver and worker pool facades and a
//! fixture that wires snapshot-backed statistics into a heuristics policy
//! or a running director.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use gc_director::driver::{CollectionDriver, DriverRequest};
use gc_director::stats::{AllocRateStats, CycleStats, HeapSnapshot, TimeStats};
use gc_director::workers::{WorkerPool, WorkerResizeStats};
use gc_director::{CollectorContext, DirectorConfig, RuleBasedHeuristics};

pub const MB: usize = 1024 * 1024;
pub const GB: usize = 1024 * MB;

/// Recording driver mock with a settable busy flag
pub struct MockDriver {
    busy: AtomicBool,
    requests: Mutex<Vec<DriverRequest>>,
}

impl MockDriver {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            busy: AtomicBool::new(false),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn set_busy(&self, busy: bool) {
        self.busy.store(busy, Ordering::SeqCst);
    }

    pub fn requests(&self) -> Vec<DriverRequest> {
        self.requests.lock().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().len()
    }
}

impl CollectionDriver for MockDriver {
    fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }

    fn collect(&self, request: DriverRequest) {
        self.requests.lock().push(request);
    }
}

/// Recording worker pool mock with settable resize stats
pub struct MockPool {
    stats: Mutex<WorkerResizeStats>,
    requests: Mutex<Vec<u32>>,
}

impl MockPool {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            stats: Mutex::new(WorkerResizeStats::default()),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn set_stats(&self, stats: WorkerResizeStats) {
        *self.stats.lock() = stats;
    }

    pub fn requests(&self) -> Vec<u32> {
        self.requests.lock().clone()
    }
}

impl WorkerPool for MockPool {
    fn resize_stats(&self) -> WorkerResizeStats {
        *self.stats.lock()
    }

    fn request_resize_workers(&self, nworkers: u32) {
        self.requests.lock().push(nworkers);
    }
}

/// Facade bundle with recording mocks
pub struct Fixture {
    pub major: Arc<MockDriver>,
    pub minor: Arc<MockDriver>,
    pub young_pool: Arc<MockPool>,
    pub old_pool: Arc<MockPool>,
    pub ctx: CollectorContext,
}

impl Fixture {
    pub fn new(
        young: CycleStats,
        old: CycleStats,
        alloc_rate: AllocRateStats,
        heap: HeapSnapshot,
    ) -> Self {
        let major = MockDriver::new();
        let minor = MockDriver::new();
        let young_pool = MockPool::new();
        let old_pool = MockPool::new();

        let ctx = CollectorContext {
            young_stats: Arc::new(young),
            old_stats: Arc::new(old),
            alloc_rate: Arc::new(alloc_rate),
            heap: Arc::new(heap),
            young_workers: young_pool.clone(),
            old_workers: old_pool.clone(),
            major_driver: major.clone(),
            minor_driver: minor.clone(),
        };

        Self {
            major,
            minor,
            young_pool,
            old_pool,
            ctx,
        }
    }

    /// Build the rule-based policy over this fixture's facades
    pub fn heuristics(&self, config: DirectorConfig) -> RuleBasedHeuristics {
        RuleBasedHeuristics::new(Arc::new(config), self.ctx.clone())
    }
}

/// Canonical test configuration: 8 workers, 32 CPUs, 1GB heap, 2MB pages
///
/// The derived medium page size is 32MB, making the relocation headroom
/// 8 x 2MB + 32MB = 48MB.
pub fn test_config() -> DirectorConfig {
    DirectorConfig {
        conc_gc_threads: 8,
        active_cpus: 32,
        max_heap_size: GB,
        page_size_small: 2 * MB,
        granule_size: 2 * MB,
        ..Default::default()
    }
}

/// Young-generation stats typical of a warmed-up workload
pub fn warm_young() -> CycleStats {
    CycleStats {
        serial_time: TimeStats::new(0.05, 0.0),
        parallelizable_time: TimeStats::new(2.0, 0.0),
        is_warm: true,
        is_time_trustable: true,
        last_active_workers: 4,
        avg_cycle_interval: 1.0,
        reclaimed_avg: 64 * MB,
        ..Default::default()
    }
}

/// Old-generation stats typical of a warmed-up workload
pub fn warm_old() -> CycleStats {
    CycleStats {
        serial_time: TimeStats::new(0.05, 0.0),
        parallelizable_time: TimeStats::new(2.0, 0.0),
        is_warm: true,
        is_time_trustable: true,
        last_active_workers: 2,
        avg_cycle_interval: 60.0,
        ..Default::default()
    }
}

/// Allocation rate of `mib_per_s` MB/s with the given deviation
pub fn alloc_rate(mib_per_s: f64, sd_mib_per_s: f64) -> AllocRateStats {
    AllocRateStats {
        avg: mib_per_s * MB as f64,
        sd: sd_mib_per_s * MB as f64,
        predict: mib_per_s * MB as f64,
    }
}

/// Heap snapshot for a 1GB soft max with the given usage
pub fn heap_used(used: usize) -> HeapSnapshot {
    HeapSnapshot {
        soft_max_capacity: GB,
        used,
        ..Default::default()
    }
}
