//! Heuristics Module - GC-Start and Worker-Sizing Decisions
//!
//! A heuristics policy turns facade snapshots into two decision products:
//! GC-start decisions ([`GcDecision`]) and worker-count adjustments
//! ([`WorkerDecision`]). Policies are pure over the facades: identical
//! snapshots produce identical decisions.
//!
//! The only policy shipped today is the rule-based one in [`rules`],
//! registered under the name `"rules"`.

pub mod rules;

pub use rules::RuleBasedHeuristics;

use std::sync::Arc;

use crate::config::DirectorConfig;
use crate::context::CollectorContext;

/// Reason for starting a collection cycle
///
/// `NoGc` is the distinguished "don't collect" value; every other variant
/// names the rule that fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GcCause {
    /// No collection warranted
    NoGc,
    /// Collection interval timer expired
    Timer,
    /// Early collection to gather duration samples
    Warmup,
    /// Idle-time collection with acceptable throughput impact
    Proactive,
    /// Projected allocation rate would exhaust free memory
    AllocationRate,
    /// Free memory at or below 5%
    HighUsage,
}

impl std::fmt::Display for GcCause {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            GcCause::NoGc => "No GC",
            GcCause::Timer => "Timer",
            GcCause::Warmup => "Warmup",
            GcCause::Proactive => "Proactive",
            GcCause::AllocationRate => "Allocation Rate",
            GcCause::HighUsage => "High Usage",
        };
        write!(f, "{}", name)
    }
}

/// Ordered pair of per-generation worker counts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerConfiguration {
    pub young: u32,
    pub old: u32,
}

impl WorkerConfiguration {
    pub fn new(young: u32, old: u32) -> Self {
        Self { young, old }
    }
}

/// A GC-start decision
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GcDecision {
    pub cause: GcCause,
    pub workers: WorkerConfiguration,
}

impl GcDecision {
    pub fn new(cause: GcCause, workers: WorkerConfiguration) -> Self {
        Self { cause, workers }
    }

    /// A collection should be started
    pub fn should_gc(&self) -> bool {
        self.cause != GcCause::NoGc
    }
}

/// A worker-count adjustment decision
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerDecision {
    pub should_adjust_young: bool,
    pub should_adjust_old: bool,
    pub workers: WorkerConfiguration,
}

impl WorkerDecision {
    pub fn new(
        should_adjust_young: bool,
        should_adjust_old: bool,
        workers: WorkerConfiguration,
    ) -> Self {
        Self {
            should_adjust_young,
            should_adjust_old,
            workers,
        }
    }

    /// No adjustment for either generation
    pub fn none() -> Self {
        Self::new(false, false, WorkerConfiguration::new(0, 0))
    }
}

/// Page geometry computed once at initialization
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageConfiguration {
    /// Small pages are shared per CPU rather than globally
    pub use_per_cpu_shared_small_pages: bool,
    /// Medium pages are enabled
    pub use_medium_pages: bool,
    /// Medium page size in bytes; 0 when disabled
    pub medium_page_size: usize,
    /// log2 of the medium page size; 0 when disabled
    pub medium_page_size_shift: u32,
    /// Largest object placed on a medium page
    pub medium_object_size_limit: usize,
    /// log2 of the medium object alignment; 0 when disabled
    pub medium_object_alignment_shift: u32,
    /// Alignment of objects on medium pages
    pub medium_object_alignment: usize,
}

impl PageConfiguration {
    /// Configuration with medium pages disabled
    pub fn without_medium_pages(use_per_cpu_shared_small_pages: bool) -> Self {
        Self {
            use_per_cpu_shared_small_pages,
            use_medium_pages: false,
            medium_page_size: 0,
            medium_page_size_shift: 0,
            medium_object_size_limit: 0,
            medium_object_alignment_shift: 0,
            medium_object_alignment: 0,
        }
    }

    /// Configuration with medium pages enabled
    pub fn with_medium_pages(
        use_per_cpu_shared_small_pages: bool,
        medium_page_size: usize,
        medium_page_size_shift: u32,
        medium_object_size_limit: usize,
        medium_object_alignment_shift: u32,
        medium_object_alignment: usize,
    ) -> Self {
        Self {
            use_per_cpu_shared_small_pages,
            use_medium_pages: true,
            medium_page_size,
            medium_page_size_shift,
            medium_object_size_limit,
            medium_object_alignment_shift,
            medium_object_alignment,
        }
    }
}

/// Collector configuration computed once before the director loop starts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitialConfiguration {
    pub page_configuration: PageConfiguration,
    /// Workers for stop-the-world phases
    pub num_parallel_workers: u32,
    /// Workers for concurrent phases
    pub num_concurrent_workers: u32,
    /// Initial object tenuring threshold
    pub tenuring_threshold: u32,
}

/// A heuristics policy
///
/// All four operations are pure functions of the external facades; they
/// hold no hidden state and take no locks.
pub trait Heuristics: Send + Sync {
    /// Compute the one-time initial configuration
    fn initial_configuration(&self) -> InitialConfiguration;

    /// Decide whether to start a major (young+old) collection
    fn make_major_gc_decision(&self) -> GcDecision;

    /// Decide whether to start a minor (young-only) collection
    fn make_minor_gc_decision(&self) -> GcDecision;

    /// Decide whether to resize the per-generation worker pools
    fn make_adjust_workers_decision(&self) -> WorkerDecision;
}

/// Construct a heuristics policy by name
///
/// Returns `None` for unknown policy names.
pub fn by_name(
    name: &str,
    config: Arc<DirectorConfig>,
    ctx: CollectorContext,
) -> Option<Box<dyn Heuristics>> {
    if name == RuleBasedHeuristics::NAME {
        return Some(Box::new(RuleBasedHeuristics::new(config, ctx)));
    }
    None
}
