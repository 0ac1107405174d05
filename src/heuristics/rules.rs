//! Rule-Based Heuristics - The Default Scheduling Policy
//!
//! Encodes the numerical rules that decide when to start minor and major
//! collections and how many concurrent workers each generation should use:
//! moving averages padded with a one-in-1000 variance margin, allocation
//! spike tolerance, workers-per-deadline estimation, and the young/old
//! amortization trade-off.
//!
//! Every rule is a total function: disabled rules (untrusted timing,
//! interval-only mode, cold old generation) report "no GC" or zero desired
//! workers rather than failing. Non-finite intermediate values never
//! trigger a rule.

use std::sync::Arc;

use crate::config::DirectorConfig;
use crate::context::CollectorContext;
use crate::heuristics::{
    GcCause, GcDecision, Heuristics, InitialConfiguration, PageConfiguration,
    WorkerConfiguration, WorkerDecision,
};
use crate::stats::ONE_IN_1000;

const MB: usize = 1024 * 1024;
const M: f64 = (1024 * 1024) as f64;

/// Per-generation resize evaluation, produced once per tick
#[derive(Debug, Clone, Copy)]
struct WorkerResizeInfo {
    is_active: bool,
    current_nworkers: u32,
    desired_nworkers: u32,
}

/// The rule-based heuristics policy
///
/// Holds shared handles to the facades plus the page geometry computed at
/// construction; carries no other state, so all decisions are pure
/// functions of the facade snapshots.
pub struct RuleBasedHeuristics {
    config: Arc<DirectorConfig>,
    ctx: CollectorContext,
    page_config: PageConfiguration,
}

impl RuleBasedHeuristics {
    /// Registry name of this policy
    pub const NAME: &'static str = "rules";

    pub fn new(config: Arc<DirectorConfig>, ctx: CollectorContext) -> Self {
        let page_config = Self::calculate_page_configuration(&config);
        Self {
            config,
            ctx,
            page_config,
        }
    }

    /// Page geometry chosen by this policy
    pub fn page_configuration(&self) -> &PageConfiguration {
        &self.page_config
    }

    fn relocation_headroom(&self) -> usize {
        // Headroom needed to avoid in-place relocation. Each worker will
        // try to allocate a small page, and all workers share a single
        // medium page.
        (self.config.conc_gc_threads as usize * self.config.page_size_small)
            + self.page_config.medium_page_size
    }

    /// Free memory net of the relocation headroom
    fn free_after_headroom(&self, soft_max_capacity: usize, used: usize) -> usize {
        let free_including_headroom = soft_max_capacity.saturating_sub(used);
        free_including_headroom.saturating_sub(self.relocation_headroom())
    }

    // ========================================================================
    // MINOR GC RULES
    // ========================================================================

    fn rule_minor_timer(&self) -> bool {
        let interval = self.config.collection_interval_minor;
        if interval <= 0.0 {
            // Rule disabled
            return false;
        }

        let time_since_last_gc = self.ctx.young_stats.time_since_last();
        let time_until_gc = interval - time_since_last_gc;

        log::debug!(
            "[Director] Rule Minor: Timer, Interval: {:.3}s, TimeUntilGC: {:.3}s",
            interval,
            time_until_gc
        );

        time_until_gc <= 0.0
    }

    fn rule_minor_allocation_rate(&self) -> bool {
        if self.config.collection_interval_only {
            // Rule disabled
            return false;
        }

        if self.ctx.heap.is_alloc_stalling_for_old() {
            // Don't collect young while threads stall waiting for an old
            // collection
            return false;
        }

        if self.config.use_dynamic_gc_threads {
            self.rule_minor_allocation_rate_dynamic(0.0, 0.0).should_gc()
        } else {
            self.rule_minor_allocation_rate_static()
        }
    }

    fn rule_minor_allocation_rate_static(&self) -> bool {
        if !self.ctx.old_stats.is_time_trustable() {
            // Rule disabled
            return false;
        }

        // Trigger when the estimated max allocation rate would exhaust
        // free memory before a collection at full parallelism finishes.
        // The rate is a moving average scaled by the spike tolerance, plus
        // ~3.3 sigma so that 1 in 1000 samples falls outside the bound.
        let soft_max_capacity = self.ctx.heap.soft_max_capacity();
        let used = self.ctx.heap.used();
        let free = self.free_after_headroom(soft_max_capacity, used);

        let alloc_rate_stats = self.ctx.alloc_rate.stats();
        let max_alloc_rate = (alloc_rate_stats.avg * self.config.allocation_spike_tolerance)
            + (alloc_rate_stats.sd.max(0.0) * ONE_IN_1000);
        let time_until_oom = free as f64 / (max_alloc_rate + 1.0); // Plus 1.0B/s to avoid division by zero

        let serial_gc_time = self.ctx.young_stats.serial_time().upper_bound();
        let parallelizable_gc_time = self.ctx.young_stats.parallelizable_time().upper_bound();
        let gc_duration =
            serial_gc_time + (parallelizable_gc_time / self.config.conc_gc_threads as f64);

        let time_until_gc = time_until_oom - gc_duration;

        log::debug!(
            "[Director] Rule Minor: Allocation Rate (Static GC Workers), MaxAllocRate: {:.1}MB/s, \
             Free: {}MB, GCDuration: {:.3}s, TimeUntilGC: {:.3}s",
            max_alloc_rate / M,
            free / MB,
            gc_duration,
            time_until_gc
        );

        time_until_gc <= 0.0
    }

    fn rule_minor_high_usage(&self) -> bool {
        if self.config.collection_interval_only {
            // Rule disabled
            return false;
        }

        // Collect preventively once free memory drops to 5% or less. This
        // covers workloads whose allocation rate is too low to trip the
        // rate rule while usage still creeps toward an allocation stall.
        let soft_max_capacity = self.ctx.heap.soft_max_capacity();
        let used = self.ctx.heap.used();
        let free = self.free_after_headroom(soft_max_capacity, used);
        let free_percent = percent_of(free, soft_max_capacity);

        log::debug!(
            "[Director] Rule Minor: High Usage, Free: {}MB({:.1}%)",
            free / MB,
            free_percent
        );

        free_percent <= 5.0
    }

    /// Dynamic allocation-rate model
    ///
    /// Called with zero time-passed values before a cycle, or with the
    /// running cycle's elapsed serial/parallel times when re-evaluating
    /// worker counts mid-cycle. Always reports a worker count, even when
    /// the verdict is "no GC yet".
    fn rule_minor_allocation_rate_dynamic(
        &self,
        serial_gc_time_passed: f64,
        parallel_gc_time_passed: f64,
    ) -> GcDecision {
        if !self.ctx.old_stats.is_time_trustable() {
            // Rule disabled
            return GcDecision::new(
                GcCause::NoGc,
                WorkerConfiguration::new(self.config.conc_gc_threads, 0),
            );
        }

        let soft_max_capacity = self.ctx.heap.soft_max_capacity();
        let used = self.ctx.heap.used();
        let free = self.free_after_headroom(soft_max_capacity, used);

        // Project time until OOM from the predicted allocation rate,
        // scaled by the spike tolerance and padded with ~3.3 sigma, then
        // discounted by the rate's relative variance.
        let alloc_rate_stats = self.ctx.alloc_rate.stats();
        let alloc_rate_predict = alloc_rate_stats.predict;
        let alloc_rate_avg = alloc_rate_stats.avg;
        let alloc_rate_sd = alloc_rate_stats.sd.max(0.0);
        let alloc_rate_sd_percent = alloc_rate_sd / (alloc_rate_avg + 1.0);
        let alloc_rate = (alloc_rate_predict.max(alloc_rate_avg)
            * self.config.allocation_spike_tolerance)
            + (alloc_rate_sd * ONE_IN_1000)
            + 1.0;
        let time_until_oom = (free as f64 / alloc_rate) / (1.0 + alloc_rate_sd_percent);

        // Remaining serial/parallel budget of the cycle being considered
        let serial_gc_time =
            (self.ctx.young_stats.serial_time().upper_bound() - serial_gc_time_passed).abs();
        let parallelizable_gc_time = (self.ctx.young_stats.parallelizable_time().upper_bound()
            - parallel_gc_time_passed)
            .abs();

        let gc_workers = self.select_young_gc_workers(
            serial_gc_time,
            parallelizable_gc_time,
            alloc_rate_sd_percent,
            time_until_oom,
        );

        // Convert to a discrete number of GC workers within limits
        let actual_gc_workers = self.discrete_young_gc_workers(gc_workers);

        let actual_gc_duration =
            serial_gc_time + (parallelizable_gc_time / actual_gc_workers as f64);
        let time_until_gc = time_until_oom - actual_gc_duration;

        log::debug!(
            "[Director] Rule Minor: Allocation Rate (Dynamic GC Workers), MaxAllocRate: {:.1}MB/s \
             (+/-{:.1}%), Free: {}MB, GCCPUTime: {:.3}, GCDuration: {:.3}s, TimeUntilOOM: {:.3}s, \
             TimeUntilGC: {:.3}s, GCWorkers: {}",
            alloc_rate / M,
            alloc_rate_sd_percent * 100.0,
            free / MB,
            serial_gc_time + parallelizable_gc_time,
            actual_gc_duration,
            time_until_oom,
            time_until_gc,
            actual_gc_workers
        );

        // Only trigger within 5% of the OOM deadline. Without this bound
        // the model keeps adding workers instead of starting collections
        // until it hits the worker cap.
        if time_until_gc > time_until_oom * 0.05 {
            return GcDecision::new(
                GcCause::NoGc,
                WorkerConfiguration::new(actual_gc_workers, 0),
            );
        }

        GcDecision::new(
            GcCause::AllocationRate,
            WorkerConfiguration::new(actual_gc_workers, 0),
        )
    }

    /// Workers needed to finish `parallelizable_gc_time` before the deadline
    fn estimated_gc_workers(
        &self,
        serial_gc_time: f64,
        parallelizable_gc_time: f64,
        time_until_deadline: f64,
    ) -> f64 {
        let parallelizable_time_until_deadline = (time_until_deadline - serial_gc_time).max(0.001);
        parallelizable_gc_time / parallelizable_time_until_deadline
    }

    fn discrete_young_gc_workers(&self, gc_workers: f64) -> u32 {
        // Yield one thread to the old generation while a major collection
        // is in flight
        let max_young_nworkers = if self.ctx.major_driver.is_busy() {
            self.config.conc_gc_threads.saturating_sub(1).max(1)
        } else {
            self.config.conc_gc_threads
        };
        (gc_workers.ceil() as u32).clamp(1, max_young_nworkers)
    }

    fn select_young_gc_workers(
        &self,
        serial_gc_time: f64,
        parallelizable_gc_time: f64,
        _alloc_rate_sd_percent: f64,
        time_until_oom: f64,
    ) -> f64 {
        // Use all workers until we're warm
        if !self.ctx.old_stats.is_warm() {
            let not_warm_gc_workers = self.config.conc_gc_threads as f64;
            log::debug!(
                "[Director] Select Minor GC Workers (Not Warm), GCWorkers: {:.3}",
                not_warm_gc_workers
            );
            return not_warm_gc_workers;
        }

        // Number of GC workers needed to avoid OOM
        let gc_workers =
            self.estimated_gc_workers(serial_gc_time, parallelizable_gc_time, time_until_oom);
        let actual_gc_workers = self.discrete_young_gc_workers(gc_workers);
        let last_gc_workers = self.ctx.young_stats.last_active_workers() as f64;

        if (actual_gc_workers as f64) < last_gc_workers {
            // Before decreasing the worker count, check whether the next
            // cycle would have to increase it again. If so, keep the count
            // the next cycle will need.
            let gc_duration_delta = (parallelizable_gc_time / actual_gc_workers as f64)
                - (parallelizable_gc_time / last_gc_workers);
            let additional_time_for_allocations =
                self.ctx.young_stats.time_since_last() - gc_duration_delta;
            let next_time_until_oom = time_until_oom + additional_time_for_allocations;
            let next_avoid_oom_gc_workers = self.estimated_gc_workers(
                serial_gc_time,
                parallelizable_gc_time,
                next_time_until_oom,
            );

            // Add 0.5 to increase friction and avoid lowering too eagerly
            let next_gc_workers = next_avoid_oom_gc_workers + 0.5;
            let try_lowering_gc_workers =
                next_gc_workers.clamp(actual_gc_workers as f64, last_gc_workers);

            log::debug!(
                "[Director] Select Minor GC Workers (Try Lowering), AvoidOOMGCWorkers: {:.3}, \
                 NextAvoidOOMGCWorkers: {:.3}, LastGCWorkers: {:.3}, GCWorkers: {:.3}",
                gc_workers,
                next_avoid_oom_gc_workers,
                last_gc_workers,
                try_lowering_gc_workers
            );
            return try_lowering_gc_workers;
        }

        log::debug!(
            "[Director] Select Minor GC Workers (Normal), AvoidOOMGCWorkers: {:.3}, \
             LastGCWorkers: {:.3}, GCWorkers: {:.3}",
            gc_workers,
            last_gc_workers,
            gc_workers
        );
        gc_workers
    }

    // ========================================================================
    // MAJOR GC RULES
    // ========================================================================

    fn rule_major_timer(&self) -> bool {
        let interval = self.config.collection_interval_major;
        if interval <= 0.0 {
            // Rule disabled
            return false;
        }

        let time_since_last_gc = self.ctx.old_stats.time_since_last();
        let time_until_gc = interval - time_since_last_gc;

        log::debug!(
            "[Director] Rule Major: Timer, Interval: {:.3}s, TimeUntilGC: {:.3}s",
            interval,
            time_until_gc
        );

        time_until_gc <= 0.0
    }

    fn rule_major_warmup(&self) -> bool {
        if self.config.collection_interval_only {
            // Rule disabled
            return false;
        }

        if self.ctx.old_stats.is_warm() {
            // Rule disabled
            return false;
        }

        // Collect when heap usage passes 10/20/30% and no other collection
        // has happened yet, to get early samples of the GC duration for
        // the other rules.
        let soft_max_capacity = self.ctx.heap.soft_max_capacity();
        let used = self.ctx.heap.used();
        let used_threshold_percent = (self.ctx.old_stats.nwarmup_cycles() + 1) as f64 * 0.1;
        let used_threshold = (soft_max_capacity as f64 * used_threshold_percent) as usize;

        log::debug!(
            "[Director] Rule Major: Warmup {:.0}%, Used: {}MB, UsedThreshold: {}MB",
            used_threshold_percent * 100.0,
            used / MB,
            used_threshold / MB
        );

        used >= used_threshold
    }

    fn rule_major_proactive(&self) -> bool {
        if self.config.collection_interval_only {
            // Rule disabled
            return false;
        }

        if !self.config.proactive {
            // Rule disabled
            return false;
        }

        if !self.ctx.old_stats.is_warm() {
            // Rule disabled
            return false;
        }

        // Collect proactively when the throughput impact is acceptable,
        // keeping heap size down and reference processing alive even with
        // plenty of free space. Only consider it once usage has grown by
        // 10% of capacity since the last collection, or 5 minutes have
        // passed, to avoid superfluous collections at very low allocation
        // rates.
        let soft_max_capacity = self.ctx.heap.soft_max_capacity();
        let used_after_last_gc = self.ctx.old_stats.used_at_relocate_end();
        let used_increase_threshold = (soft_max_capacity as f64 * 0.10) as usize;
        let used_threshold = used_after_last_gc + used_increase_threshold;
        let used = self.ctx.heap.used();
        let time_since_last_gc = self.ctx.old_stats.time_since_last();
        let time_since_last_gc_threshold = 5.0 * 60.0;

        if used < used_threshold && time_since_last_gc < time_since_last_gc_threshold {
            log::debug!(
                "[Director] Rule Major: Proactive, UsedUntilEnabled: {}MB, TimeUntilEnabled: {:.3}s",
                (used_threshold - used) / MB,
                time_since_last_gc_threshold - time_since_last_gc
            );
            return false;
        }

        let assumed_throughput_drop_during_gc = 0.50;
        let acceptable_throughput_drop = 0.01;
        let serial_gc_time = self.ctx.old_stats.serial_time().upper_bound();
        let parallelizable_gc_time = self.ctx.old_stats.parallelizable_time().upper_bound();
        let gc_duration =
            serial_gc_time + (parallelizable_gc_time / self.config.conc_gc_threads as f64);
        let acceptable_gc_interval = gc_duration
            * ((assumed_throughput_drop_during_gc / acceptable_throughput_drop) - 1.0);
        let time_until_gc = acceptable_gc_interval - time_since_last_gc;

        log::debug!(
            "[Director] Rule Major: Proactive, AcceptableGCInterval: {:.3}s, \
             TimeSinceLastGC: {:.3}s, TimeUntilGC: {:.3}s",
            acceptable_gc_interval,
            time_since_last_gc,
            time_until_gc
        );

        time_until_gc <= 0.0
    }

    /// Extra time each young collection spends because old garbage has not
    /// been reclaimed
    fn calculate_extra_young_gc_time(&self) -> f64 {
        if !self.ctx.old_stats.is_time_trustable() {
            return 0.0;
        }

        let old_used = self.ctx.heap.used_old();
        let old_live = self.ctx.old_stats.live_at_mark_end();
        let old_garbage = old_used.saturating_sub(old_live);

        // The serial margin carries the parallelizable deviation here.
        let parallelizable_margin =
            self.ctx.young_stats.parallelizable_time().dsd.max(0.0) * ONE_IN_1000;
        let young_serial_gc_time = self.ctx.young_stats.serial_time().davg + parallelizable_margin;
        let young_parallelizable_gc_time =
            self.ctx.young_stats.parallelizable_time().davg + parallelizable_margin;
        let young_gc_time = young_serial_gc_time + young_parallelizable_gc_time;

        // Memory young collections are predicted to free
        let reclaimed_per_young_gc = self.ctx.young_stats.reclaimed_avg() as f64;

        // Current young GC time per byte freed, and the predicted value
        // after an old collection has freed the old garbage
        let current_young_gc_time_per_bytes_freed = young_gc_time / reclaimed_per_young_gc;
        let potential_young_gc_time_per_bytes_freed =
            young_gc_time / (reclaimed_per_young_gc + old_garbage as f64);

        let extra_young_gc_time_per_bytes_freed =
            current_young_gc_time_per_bytes_freed - potential_young_gc_time_per_bytes_freed;
        let extra_young_gc_time =
            extra_young_gc_time_per_bytes_freed * (reclaimed_per_young_gc + old_garbage as f64);

        if !extra_young_gc_time.is_finite() {
            // No reclaimed-bytes samples yet
            return 0.0;
        }

        extra_young_gc_time
    }

    fn rule_major_allocation_rate(&self) -> bool {
        if !self.ctx.old_stats.is_time_trustable() {
            // Rule disabled
            return false;
        }

        let old_serial_gc_time = self.ctx.old_stats.serial_time().upper_bound();
        let old_parallelizable_gc_time = self.ctx.old_stats.parallelizable_time().upper_bound();
        let old_gc_time = old_serial_gc_time + old_parallelizable_gc_time;

        let extra_young_gc_time = self.calculate_extra_young_gc_time();

        // An old collection makes subsequent young collections cheaper.
        // Amortize its cost over as many young collections ahead as have
        // run since the last old collection.
        let lookahead = self.ctx.heap.total_collections() as i64
            - self.ctx.old_stats.total_collections_at_end() as i64;

        let extra_young_gc_time_for_lookahead = extra_young_gc_time * lookahead as f64;

        log::debug!(
            "[Director] Rule Major: Allocation Rate, ExtraYoungGCTime: {:.3}s, OldGCTime: {:.3}s, \
             Lookahead: {}, ExtraYoungGCTimeForLookahead: {:.3}s",
            extra_young_gc_time,
            old_gc_time,
            lookahead,
            extra_young_gc_time_for_lookahead
        );

        // Trigger once the extra young effort projected over the lookahead
        // exceeds the cost of the old collection itself.
        extra_young_gc_time_for_lookahead > old_gc_time
    }

    // ========================================================================
    // WORKER SIZING
    // ========================================================================

    fn calculate_old_workers(&self) -> u32 {
        let old_serial_gc_time = self.ctx.old_stats.serial_time().upper_bound();
        let old_parallelizable_gc_time = self.ctx.old_stats.parallelizable_time().upper_bound();

        let old_last_gc_workers = self.ctx.old_stats.last_active_workers() as f64;
        let old_parallelizable_gc_duration = old_parallelizable_gc_time / old_last_gc_workers;

        let young_gc_interval = self.ctx.young_stats.avg_cycle_interval();

        // Inflated GC time per young collection while old is uncollected
        let extra_young_gc_time = self.calculate_extra_young_gc_time();

        // Promote to a higher worker count only while the amortized saving
        // in young GC effort exceeds the extra old GC cost.
        let mut gc_workers: u32 = 1;

        for i in 2..=self.config.conc_gc_threads {
            let baseline_old_duration =
                old_serial_gc_time + (old_parallelizable_gc_time / gc_workers as f64);
            let potential_old_duration =
                old_serial_gc_time + (old_parallelizable_gc_time / i as f64);
            let potential_reduced_old_duration = baseline_old_duration - potential_old_duration;
            let potential_reduced_young_count =
                (potential_reduced_old_duration / young_gc_interval) as u32;
            let reduced_extra_young_gc_time =
                extra_young_gc_time * potential_reduced_young_count as f64;
            let extra_gc_workers = (i - gc_workers) as f64;
            let extra_old_gc_time = extra_gc_workers * old_parallelizable_gc_duration;
            if reduced_extra_young_gc_time > extra_old_gc_time {
                gc_workers = i;
            }
        }

        gc_workers
    }

    fn initial_old_workers(&self) -> u32 {
        if !self.config.use_dynamic_gc_threads {
            return (self.config.conc_gc_threads / 2).max(1);
        }

        self.calculate_old_workers()
    }

    fn initial_young_workers(&self) -> u32 {
        if !self.config.use_dynamic_gc_threads {
            return self
                .config
                .conc_gc_threads
                .saturating_sub(self.initial_old_workers())
                .max(1);
        }

        // The discrete cap already yields one thread to the old generation
        // while the major driver is busy.
        let decision = self.rule_minor_allocation_rate_dynamic(0.0, 0.0);
        decision.workers.young
    }

    fn wanted_young_nworkers(&self) -> WorkerResizeInfo {
        let stats = self.ctx.young_workers.resize_stats();

        if !stats.is_active {
            // Collection is not running
            return WorkerResizeInfo {
                is_active: false,
                current_nworkers: stats.nworkers_current,
                desired_nworkers: 0,
            };
        }

        let decision = self.rule_minor_allocation_rate_dynamic(
            stats.serial_gc_time_passed,
            stats.parallel_gc_time_passed,
        );
        if !decision.should_gc() {
            // No urgency
            return WorkerResizeInfo {
                is_active: true,
                current_nworkers: stats.nworkers_current,
                desired_nworkers: 0,
            };
        }

        WorkerResizeInfo {
            is_active: true,
            current_nworkers: stats.nworkers_current,
            desired_nworkers: decision.workers.young,
        }
    }

    fn wanted_old_nworkers(&self) -> WorkerResizeInfo {
        let stats = self.ctx.old_workers.resize_stats();

        if !stats.is_active {
            // Collection is not running
            return WorkerResizeInfo {
                is_active: false,
                current_nworkers: stats.nworkers_current,
                desired_nworkers: 0,
            };
        }

        if !self.rule_major_allocation_rate() {
            // No urgency
            return WorkerResizeInfo {
                is_active: true,
                current_nworkers: stats.nworkers_current,
                desired_nworkers: 0,
            };
        }

        WorkerResizeInfo {
            is_active: true,
            current_nworkers: stats.nworkers_current,
            desired_nworkers: self.calculate_old_workers(),
        }
    }

    fn adjust_workers(
        &self,
        mut young_info: WorkerResizeInfo,
        mut old_info: WorkerResizeInfo,
    ) -> WorkerDecision {
        let conc_gc_threads = self.config.conc_gc_threads;

        if young_info.is_active && old_info.is_active {
            // Need at least 1 thread for the old generation
            let max_young_nworkers = conc_gc_threads.saturating_sub(1).max(1);
            young_info.desired_nworkers = young_info.desired_nworkers.min(max_young_nworkers);
            // Cap old so the total stays within conc_gc_threads
            let max_old_nworkers = conc_gc_threads
                .saturating_sub(young_info.current_nworkers.max(young_info.desired_nworkers))
                .max(1);
            old_info.desired_nworkers = old_info.desired_nworkers.min(max_old_nworkers);
        }

        // At least one thread for each generation
        let max_total_nworkers = conc_gc_threads.max(2);

        let need_more_young_workers = young_info.current_nworkers < young_info.desired_nworkers;
        let need_more_old_workers = old_info.current_nworkers < old_info.desired_nworkers;
        let too_many_total_nworkers = young_info
            .current_nworkers
            .max(young_info.desired_nworkers)
            + old_info.current_nworkers
            > max_total_nworkers;

        let mut should_adjust_old_workers = false;
        let mut num_old_workers = 0;
        if (old_info.desired_nworkers != 0 && need_more_old_workers) || too_many_total_nworkers {
            should_adjust_old_workers = true;
            num_old_workers = old_info.desired_nworkers.max(1);
        }

        let mut should_adjust_young_workers = false;
        let mut num_young_workers = 0;
        if young_info.desired_nworkers != 0 && need_more_young_workers {
            // More workers needed than currently in use; trigger a resize
            should_adjust_young_workers = true;
            num_young_workers = young_info.desired_nworkers;
        }

        WorkerDecision::new(
            should_adjust_young_workers,
            should_adjust_old_workers,
            WorkerConfiguration::new(num_young_workers, num_old_workers),
        )
    }

    // ========================================================================
    // DECISION CAUSES
    // ========================================================================

    fn make_major_gc_decision_cause(&self) -> GcCause {
        if self.ctx.major_driver.is_busy() {
            return GcCause::NoGc;
        }

        if self.rule_major_timer() {
            return GcCause::Timer;
        }

        if self.rule_major_warmup() {
            return GcCause::Warmup;
        }

        if self.rule_major_proactive() {
            return GcCause::Proactive;
        }

        GcCause::NoGc
    }

    fn make_minor_gc_decision_cause(&self) -> GcCause {
        if self.ctx.minor_driver.is_busy() {
            return GcCause::NoGc;
        }

        if self.rule_minor_timer() {
            return GcCause::Timer;
        }

        if self.rule_minor_allocation_rate() {
            return GcCause::AllocationRate;
        }

        if self.rule_minor_high_usage() {
            return GcCause::HighUsage;
        }

        GcCause::NoGc
    }

    // ========================================================================
    // INITIAL CONFIGURATION
    // ========================================================================

    fn calculate_page_configuration(config: &DirectorConfig) -> PageConfiguration {
        // Size medium pages so one occupies at most 3.125% of the max
        // heap; they stay disabled unless that exceeds the small page
        // size.
        let min = config.granule_size;
        let max = config.granule_size * 16;
        let unclamped = (config.max_heap_size as f64 * 0.03125) as usize;
        let clamped = unclamped.clamp(min, max);
        let size = round_down_power_of_two(clamped);

        if size > config.page_size_small {
            // Enable medium pages
            let shift = size.trailing_zeros();
            let object_alignment_shift = shift.saturating_sub(13);
            PageConfiguration::with_medium_pages(
                Self::use_per_cpu_shared_small_pages(config),
                size,
                shift,
                size / 8,
                object_alignment_shift,
                1usize << object_alignment_shift,
            )
        } else {
            PageConfiguration::without_medium_pages(Self::use_per_cpu_shared_small_pages(config))
        }
    }

    fn use_per_cpu_shared_small_pages(config: &DirectorConfig) -> bool {
        // Use per-CPU shared small pages only if they occupy at most
        // 3.125% of the max heap; otherwise fall back to a single shared
        // small page. Matters for small heaps on large machines.
        let per_cpu_share = Self::significant_heap_overhead(config) / config.active_cpus as usize;
        per_cpu_share >= config.page_size_small
    }

    fn significant_heap_overhead(config: &DirectorConfig) -> usize {
        (config.max_heap_size as f64 * 0.03125) as usize
    }

    fn nworkers_based_on_ncpus(&self, cpu_share_in_percent: f64) -> u32 {
        (self.config.active_cpus as f64 * cpu_share_in_percent / 100.0).ceil() as u32
    }

    fn nworkers_based_on_heap_size(&self, heap_share_in_percent: f64) -> u32 {
        ((self.config.max_heap_size as f64 * (heap_share_in_percent / 100.0)) as usize
            / self.config.page_size_small) as u32
    }

    fn nworkers(&self, cpu_share_in_percent: f64) -> u32 {
        // Cap workers so they use at most 2% of the max heap during
        // relocation. Matters for small heaps on large machines.
        self.nworkers_based_on_ncpus(cpu_share_in_percent)
            .min(self.nworkers_based_on_heap_size(2.0))
    }

    fn nparallel_workers(&self) -> u32 {
        // Use 60% of the CPUs, rounded up. Thread counts close to the
        // processor count tend to over-provision and add scheduling
        // latency.
        self.nworkers(60.0).max(1)
    }

    fn nconcurrent_workers(&self) -> u32 {
        // Too many concurrent threads hurt application throughput, too few
        // prolong the cycle and risk being out-run by the application.
        self.nworkers(25.0).max(1)
    }

    fn calculate_tenuring_threshold(&self) -> u32 {
        let significant = Self::significant_heap_overhead(&self.config);
        let mut tenuring_threshold = 0;
        while tenuring_threshold < self.config.max_tenuring_threshold {
            // Reduce the number of object ages if the resident page
            // overhead grows too high
            let medium_page_overhead =
                self.page_config.medium_page_size * tenuring_threshold as usize;
            let small_page_overhead = self.config.page_size_small
                * self.config.conc_gc_threads as usize
                * tenuring_threshold as usize;
            if small_page_overhead + medium_page_overhead >= significant {
                break;
            }
            tenuring_threshold += 1;
        }
        tenuring_threshold
    }
}

impl Heuristics for RuleBasedHeuristics {
    fn initial_configuration(&self) -> InitialConfiguration {
        InitialConfiguration {
            page_configuration: self.page_config.clone(),
            num_parallel_workers: self.nparallel_workers(),
            num_concurrent_workers: self.nconcurrent_workers(),
            tenuring_threshold: self.calculate_tenuring_threshold(),
        }
    }

    fn make_major_gc_decision(&self) -> GcDecision {
        GcDecision::new(
            self.make_major_gc_decision_cause(),
            WorkerConfiguration::new(self.initial_young_workers(), self.initial_old_workers()),
        )
    }

    fn make_minor_gc_decision(&self) -> GcDecision {
        if !self.ctx.major_driver.is_busy() && self.rule_major_allocation_rate() {
            // Merge the minor collection into a major collection
            GcDecision::new(
                self.make_minor_gc_decision_cause(),
                WorkerConfiguration::new(self.initial_young_workers(), self.initial_old_workers()),
            )
        } else {
            GcDecision::new(
                self.make_minor_gc_decision_cause(),
                WorkerConfiguration::new(self.initial_young_workers(), 0),
            )
        }
    }

    fn make_adjust_workers_decision(&self) -> WorkerDecision {
        if !self.config.use_dynamic_gc_threads {
            return WorkerDecision::none();
        }

        self.adjust_workers(self.wanted_young_nworkers(), self.wanted_old_nworkers())
    }
}

/// Percentage of `part` in `total`; 0 when `total` is 0
fn percent_of(part: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    part as f64 / total as f64 * 100.0
}

/// Largest power of two less than or equal to `value`; 0 for 0
fn round_down_power_of_two(value: usize) -> usize {
    if value == 0 {
        return 0;
    }
    1usize << (usize::BITS - 1 - value.leading_zeros())
}
