//! Heuristics Rule Tests - Decision Scenarios
//!
//! Exercises the rule-based policy against fixed facade snapshots: cold
//! start, allocation pressure under the static and dynamic models, the
//! proactive gate, minor-into-major merging, and the busy-driver guards.

mod common;

use common::{
    alloc_rate, heap_used, test_config, warm_old, warm_young, Fixture, GB, MB,
};
use gc_director::stats::{AllocRateStats, CycleStats, HeapSnapshot, TimeStats};
use gc_director::{DirectorConfig, GcCause, Heuristics};

/// Old-generation stats whose cycle times are trustable before warmth
fn trustable_cold_old() -> CycleStats {
    CycleStats {
        is_time_trustable: true,
        ..Default::default()
    }
}

// ============================================================================
// COLD START (SCENARIO: not trustable, not warm)
// ============================================================================

#[test]
fn test_cold_start_major_no_gc_below_first_warmup_threshold() {
    let fixture = Fixture::new(
        CycleStats::default(),
        CycleStats::default(),
        AllocRateStats::default(),
        heap_used(51 * MB), // ~5% of 1GB
    );
    let heuristics = fixture.heuristics(test_config());

    let decision = heuristics.make_major_gc_decision();
    assert_eq!(decision.cause, GcCause::NoGc);
    assert!(!decision.should_gc());
}

#[test]
fn test_cold_start_warmup_triggers_at_ten_percent() {
    let fixture = Fixture::new(
        CycleStats::default(),
        CycleStats::default(),
        AllocRateStats::default(),
        heap_used(103 * MB), // just above 10% of 1GB
    );
    let heuristics = fixture.heuristics(test_config());

    let decision = heuristics.make_major_gc_decision();
    assert_eq!(decision.cause, GcCause::Warmup);
    // Cold old generation gets a single worker; young uses the full budget
    assert_eq!(decision.workers.young, 8);
    assert!(decision.workers.old >= 1);
}

#[test]
fn test_warmup_thresholds_scale_with_completed_cycles() {
    let old = CycleStats {
        nwarmup_cycles: 1,
        ..Default::default()
    };
    let fixture = Fixture::new(
        CycleStats::default(),
        old.clone(),
        AllocRateStats::default(),
        heap_used(150 * MB), // between 10% and 20%
    );
    let heuristics = fixture.heuristics(test_config());
    assert_eq!(heuristics.make_major_gc_decision().cause, GcCause::NoGc);

    let fixture = Fixture::new(
        CycleStats::default(),
        old,
        AllocRateStats::default(),
        heap_used(205 * MB), // just above 20%
    );
    let heuristics = fixture.heuristics(test_config());
    assert_eq!(heuristics.make_major_gc_decision().cause, GcCause::Warmup);
}

#[test]
fn test_cold_start_minor_no_gc_with_free_memory() {
    let fixture = Fixture::new(
        CycleStats::default(),
        CycleStats::default(),
        AllocRateStats::default(),
        heap_used(576 * MB), // ~39% free after headroom
    );
    let heuristics = fixture.heuristics(test_config());

    assert_eq!(heuristics.make_minor_gc_decision().cause, GcCause::NoGc);
}

#[test]
fn test_cold_start_minor_high_usage_at_five_percent_free() {
    let fixture = Fixture::new(
        CycleStats::default(),
        CycleStats::default(),
        AllocRateStats::default(),
        heap_used(980 * MB), // free (after headroom) is exhausted
    );
    let heuristics = fixture.heuristics(test_config());

    let decision = heuristics.make_minor_gc_decision();
    assert_eq!(decision.cause, GcCause::HighUsage);
    assert!(decision.workers.young >= 1);
    assert_eq!(decision.workers.old, 0);
}

// ============================================================================
// STATIC ALLOCATION-RATE MODEL
// ============================================================================

fn static_model_config() -> DirectorConfig {
    DirectorConfig {
        use_dynamic_gc_threads: false,
        ..test_config()
    }
}

/// 100MB/s average, 10MB/s deviation: max rate is about 232.9MB/s
fn static_model_fixture(used: usize) -> Fixture {
    let young = CycleStats {
        serial_time: TimeStats::new(0.05, 0.0),
        parallelizable_time: TimeStats::new(2.0, 0.0),
        last_active_workers: 4,
        ..Default::default()
    };
    Fixture::new(young, trustable_cold_old(), alloc_rate(100.0, 10.0), heap_used(used))
}

#[test]
fn test_static_model_ample_free_memory_no_trigger() {
    // 400MB free: time until OOM ~1.72s, GC duration 0.3s
    let fixture = static_model_fixture(576 * MB);
    let heuristics = fixture.heuristics(static_model_config());

    assert_eq!(heuristics.make_minor_gc_decision().cause, GcCause::NoGc);
}

#[test]
fn test_static_model_moderate_free_memory_no_trigger() {
    // 100MB free: time until OOM ~0.43s, still ahead of the 0.3s duration
    let fixture = static_model_fixture(876 * MB);
    let heuristics = fixture.heuristics(static_model_config());

    assert_eq!(heuristics.make_minor_gc_decision().cause, GcCause::NoGc);
}

#[test]
fn test_static_model_low_free_memory_triggers() {
    // 50MB free: time until OOM ~0.21s drops below the GC duration
    let fixture = static_model_fixture(926 * MB);
    let heuristics = fixture.heuristics(static_model_config());

    let decision = heuristics.make_minor_gc_decision();
    assert_eq!(decision.cause, GcCause::AllocationRate);
    // Static split: old would get 4 of 8, young the remainder; no old
    // cycle is requested without the amortization rule
    assert_eq!(decision.workers.young, 4);
    assert_eq!(decision.workers.old, 0);
}

#[test]
fn test_static_model_disabled_without_trustable_time() {
    let young = CycleStats {
        serial_time: TimeStats::new(0.05, 0.0),
        parallelizable_time: TimeStats::new(2.0, 0.0),
        ..Default::default()
    };
    // Old cycle times not trustable: the rate rule stays off even at 50MB
    // free, leaving high-usage as the only trigger (free is still ~4.9%)
    let fixture = Fixture::new(
        young,
        CycleStats::default(),
        alloc_rate(100.0, 10.0),
        heap_used(926 * MB),
    );
    let heuristics = fixture.heuristics(static_model_config());

    let decision = heuristics.make_minor_gc_decision();
    assert_eq!(decision.cause, GcCause::HighUsage);
}

// ============================================================================
// DYNAMIC ALLOCATION-RATE MODEL
// ============================================================================

/// Serial budget 0.1s, parallel budget 2.3s, last cycle ran 4 workers
fn dynamic_model_fixture(used: usize) -> Fixture {
    let young = CycleStats {
        serial_time: TimeStats::new(0.1, 0.0),
        parallelizable_time: TimeStats::new(2.3, 0.0),
        time_since_last: 0.5,
        last_active_workers: 4,
        ..Default::default()
    };
    let old = CycleStats {
        is_warm: true,
        is_time_trustable: true,
        ..Default::default()
    };
    Fixture::new(young, old, alloc_rate(100.0, 0.0), heap_used(used))
}

#[test]
fn test_dynamic_model_friction_keeps_worker_count() {
    // 220MB free at 200MB/s: ~1.1s until OOM estimates 2.3 workers, but
    // the next-cycle simulation refuses to drop below 3 of the last 4
    let fixture = dynamic_model_fixture(756 * MB);
    let heuristics = fixture.heuristics(test_config());

    let decision = heuristics.make_minor_gc_decision();
    assert_eq!(decision.cause, GcCause::NoGc);
    assert_eq!(decision.workers.young, 3);
}

#[test]
fn test_dynamic_model_triggers_near_deadline() {
    // 100MB free: the deadline tightens to ~0.5s, needing 6 workers and
    // landing within 5% of the OOM horizon
    let fixture = dynamic_model_fixture(876 * MB);
    let heuristics = fixture.heuristics(test_config());

    let decision = heuristics.make_minor_gc_decision();
    assert_eq!(decision.cause, GcCause::AllocationRate);
    assert_eq!(decision.workers.young, 6);
    assert_eq!(decision.workers.old, 0);
}

#[test]
fn test_dynamic_model_stalling_for_old_disables_rate_rule() {
    let young = CycleStats {
        serial_time: TimeStats::new(0.1, 0.0),
        parallelizable_time: TimeStats::new(2.3, 0.0),
        time_since_last: 0.5,
        last_active_workers: 4,
        ..Default::default()
    };
    let old = CycleStats {
        is_warm: true,
        is_time_trustable: true,
        ..Default::default()
    };
    let heap = HeapSnapshot {
        soft_max_capacity: GB,
        used: 876 * MB,
        alloc_stalling_for_old: true,
        ..Default::default()
    };
    let fixture = Fixture::new(young, old, alloc_rate(100.0, 0.0), heap);
    let heuristics = fixture.heuristics(test_config());

    // The same pressure that triggered above must not start a young
    // collection while allocations stall on the old generation
    let decision = heuristics.make_minor_gc_decision();
    assert_ne!(decision.cause, GcCause::AllocationRate);
}

// ============================================================================
// PROACTIVE RULE
// ============================================================================

fn proactive_fixture(time_since_last: f64, used: usize, used_at_relocate_end: usize) -> Fixture {
    let old = CycleStats {
        time_since_last,
        used_at_relocate_end,
        ..warm_old()
    };
    Fixture::new(warm_young(), old, AllocRateStats::default(), heap_used(used))
}

#[test]
fn test_proactive_triggers_after_five_minutes() {
    // GC duration 0.3s makes the acceptable interval 14.7s; the 5-minute
    // gate opens the rule and 301s clears the interval easily
    let fixture = proactive_fixture(301.0, 100 * MB, 90 * MB);
    let heuristics = fixture.heuristics(test_config());

    assert_eq!(heuristics.make_major_gc_decision().cause, GcCause::Proactive);
}

#[test]
fn test_proactive_gated_without_growth_or_elapsed_time() {
    // Used grew by less than 10% of capacity and only 10s passed
    let fixture = proactive_fixture(10.0, 100 * MB, 90 * MB);
    let heuristics = fixture.heuristics(test_config());

    assert_eq!(heuristics.make_major_gc_decision().cause, GcCause::NoGc);
}

#[test]
fn test_proactive_usage_growth_opens_gate() {
    // 150MB used against 0 at last relocate end exceeds the 10% growth
    // gate; 20s is past the 14.7s acceptable interval
    let fixture = proactive_fixture(20.0, 150 * MB, 0);
    let heuristics = fixture.heuristics(test_config());

    assert_eq!(heuristics.make_major_gc_decision().cause, GcCause::Proactive);
}

#[test]
fn test_proactive_disabled_by_config() {
    let config = DirectorConfig {
        proactive: false,
        ..test_config()
    };
    let fixture = proactive_fixture(301.0, 100 * MB, 90 * MB);
    let heuristics = fixture.heuristics(config);

    assert_eq!(heuristics.make_major_gc_decision().cause, GcCause::NoGc);
}

// ============================================================================
// MINOR-INTO-MAJOR MERGE
// ============================================================================

#[test]
fn test_minor_merges_into_major_under_old_garbage_pressure() {
    let config = DirectorConfig {
        collection_interval_minor: 1.0,
        ..test_config()
    };
    let young = CycleStats {
        serial_time: TimeStats::new(0.05, 0.0),
        parallelizable_time: TimeStats::new(1.0, 0.0),
        time_since_last: 2.0,
        last_active_workers: 4,
        avg_cycle_interval: 0.5,
        reclaimed_avg: 64 * MB,
        ..Default::default()
    };
    let old = CycleStats {
        serial_time: TimeStats::new(0.1, 0.0),
        parallelizable_time: TimeStats::new(8.0, 0.0),
        is_warm: true,
        is_time_trustable: true,
        last_active_workers: 2,
        live_at_mark_end: 100 * MB,
        total_collections_at_end: 10,
        ..Default::default()
    };
    let heap = HeapSnapshot {
        soft_max_capacity: GB,
        used: 800 * MB,
        used_old: 600 * MB,
        total_collections: 20,
        ..Default::default()
    };
    let fixture = Fixture::new(young, old, AllocRateStats::default(), heap);
    let heuristics = fixture.heuristics(config);

    // 500MB of old garbage inflates each of the 10 lookahead young cycles
    // far beyond the old collection's own cost: the timer-triggered minor
    // carries an old cycle with it
    let decision = heuristics.make_minor_gc_decision();
    assert_eq!(decision.cause, GcCause::Timer);
    assert!(decision.workers.old >= 2);
    assert!(decision.workers.young >= 1);
}

#[test]
fn test_minor_does_not_merge_without_old_garbage() {
    let fixture = Fixture::new(
        warm_young(),
        warm_old(),
        alloc_rate(100.0, 10.0),
        heap_used(980 * MB),
    );
    let heuristics = fixture.heuristics(test_config());

    let decision = heuristics.make_minor_gc_decision();
    assert!(decision.should_gc());
    assert_eq!(decision.workers.old, 0);
}

// ============================================================================
// BUSY-DRIVER GUARDS
// ============================================================================

#[test]
fn test_busy_major_driver_blocks_major_decision() {
    let config = DirectorConfig {
        collection_interval_major: 1.0,
        ..test_config()
    };
    let old = CycleStats {
        time_since_last: 100.0, // timer long expired
        ..warm_old()
    };
    let fixture = Fixture::new(warm_young(), old, AllocRateStats::default(), heap_used(900 * MB));
    fixture.major.set_busy(true);
    let heuristics = fixture.heuristics(config);

    assert!(!heuristics.make_major_gc_decision().should_gc());
}

#[test]
fn test_busy_minor_driver_blocks_minor_decision() {
    let fixture = Fixture::new(
        CycleStats::default(),
        CycleStats::default(),
        AllocRateStats::default(),
        heap_used(1000 * MB), // would trigger high usage
    );
    fixture.minor.set_busy(true);
    let heuristics = fixture.heuristics(test_config());

    assert!(!heuristics.make_minor_gc_decision().should_gc());
}

// ============================================================================
// WORKER-ADJUST DECISION
// ============================================================================

#[test]
fn test_adjust_decision_disabled_without_dynamic_threads() {
    let config = DirectorConfig {
        use_dynamic_gc_threads: false,
        ..test_config()
    };
    let fixture = Fixture::new(
        warm_young(),
        warm_old(),
        alloc_rate(500.0, 50.0),
        heap_used(1000 * MB),
    );
    let heuristics = fixture.heuristics(config);

    let decision = heuristics.make_adjust_workers_decision();
    assert!(!decision.should_adjust_young);
    assert!(!decision.should_adjust_old);
    assert_eq!(decision.workers.young, 0);
    assert_eq!(decision.workers.old, 0);
}

#[test]
fn test_adjust_decision_idle_pools_request_nothing() {
    let fixture = Fixture::new(
        warm_young(),
        warm_old(),
        alloc_rate(100.0, 10.0),
        heap_used(500 * MB),
    );
    let heuristics = fixture.heuristics(test_config());

    let decision = heuristics.make_adjust_workers_decision();
    assert!(!decision.should_adjust_young);
    assert!(!decision.should_adjust_old);
}

// ============================================================================
// INITIAL CONFIGURATION (SCENARIO: 16GB heap, 32 CPUs, 2MB small pages)
// ============================================================================

#[test]
fn test_initial_configuration_sixteen_gb_heap() {
    let config = DirectorConfig {
        max_heap_size: 16 * GB,
        ..test_config()
    };
    let fixture = Fixture::new(
        CycleStats::default(),
        CycleStats::default(),
        AllocRateStats::default(),
        HeapSnapshot::default(),
    );
    let heuristics = fixture.heuristics(config);

    let initial = heuristics.initial_configuration();
    // ceil(32 * 0.60) = 20, heap cap floor(16GB * 0.02 / 2MB) = 163
    assert_eq!(initial.num_parallel_workers, 20);
    // ceil(32 * 0.25) = 8 under the same cap
    assert_eq!(initial.num_concurrent_workers, 8);

    let page = &initial.page_configuration;
    assert!(page.use_medium_pages);
    assert_eq!(page.medium_page_size, 32 * MB);
    assert_eq!(page.medium_page_size_shift, 25);
    assert_eq!(page.medium_object_size_limit, 4 * MB);
    assert_eq!(page.medium_object_alignment, 4096);

    // 48MB of page overhead per object age against a 512MB budget
    assert_eq!(initial.tenuring_threshold, 11);
}

#[test]
fn test_initial_configuration_small_heap_caps_workers() {
    let config = DirectorConfig {
        max_heap_size: 64 * MB,
        ..test_config()
    };
    let fixture = Fixture::new(
        CycleStats::default(),
        CycleStats::default(),
        AllocRateStats::default(),
        HeapSnapshot::default(),
    );
    let heuristics = fixture.heuristics(config);

    let initial = heuristics.initial_configuration();
    // floor(64MB * 0.02 / 2MB) = 0, clamped up to 1 worker
    assert_eq!(initial.num_parallel_workers, 1);
    assert_eq!(initial.num_concurrent_workers, 1);
    assert!(!initial.page_configuration.use_medium_pages);
}

// ============================================================================
// DETERMINISM
// ============================================================================

#[test]
fn test_identical_snapshots_produce_identical_decisions() {
    let fixture = dynamic_model_fixture(876 * MB);
    let heuristics = fixture.heuristics(test_config());

    let first_major = heuristics.make_major_gc_decision();
    let first_minor = heuristics.make_minor_gc_decision();
    let first_adjust = heuristics.make_adjust_workers_decision();

    for _ in 0..10 {
        assert_eq!(heuristics.make_major_gc_decision(), first_major);
        assert_eq!(heuristics.make_minor_gc_decision(), first_minor);
        assert_eq!(heuristics.make_adjust_workers_decision(), first_adjust);
    }
}

// ============================================================================
// DECISION INVARIANTS
// ============================================================================

#[test]
fn test_old_workers_imply_young_workers() {
    // Any decision that requests an old cycle must also request young
    // workers, across a spread of usage levels
    for used in [100 * MB, 500 * MB, 800 * MB, 980 * MB] {
        let fixture = static_model_fixture(used);
        let heuristics = fixture.heuristics(test_config());

        for decision in [
            heuristics.make_major_gc_decision(),
            heuristics.make_minor_gc_decision(),
        ] {
            if decision.workers.old > 0 {
                assert!(
                    decision.workers.young > 0,
                    "old workers without young workers at used={}",
                    used
                );
            }
        }
    }
}
