//! # GC Director - Collection-Scheduling Service
//!
//! `gc-director` is the control plane of a generational, concurrent,
//! region-based garbage collector: a dedicated thread that periodically
//! decides whether to start a minor (young-only) or major (young+old)
//! collection cycle, and how many concurrent workers each generation
//! should currently employ. It performs no collection work itself; it
//! submits requests to the collection driver and resize requests to the
//! per-generation worker pools.
//!
//! ## Overview
//!
//! Decisions come from a rule-based heuristics policy built on:
//!
//! - **Timer rules**: fixed minor/major collection intervals
//! - **Warmup rule**: early collections at 10/20/30% heap usage to seed
//!   duration samples
//! - **Allocation-rate rules**: moving averages with a one-in-1000
//!   variance margin and an allocation spike tolerance, projected against
//!   free memory to estimate time-until-OOM
//! - **Proactive rule**: idle-time majors whose amortized throughput
//!   impact stays under 1%
//! - **High-usage rule**: preventive collection at 5% free
//! - **Worker sizing**: workers-per-deadline estimation for the young
//!   generation (with a friction damper against oscillation) and a
//!   young/old amortization search for the old generation
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                     Director Thread                      │
//! │   tick (10 Hz) or notify()                               │
//! │        │                                                 │
//! │        ▼                                                 │
//! │   make_major_gc_decision ──should_gc──► major.collect()  │
//! │        │ no                                              │
//! │        ▼                                                 │
//! │   make_minor_gc_decision ──should_gc──► major.collect()  │
//! │        │ no                                              │
//! │        ▼                                                 │
//! │   make_adjust_workers_decision ──► pool.request_resize() │
//! └──────────────────────────────────────────────────────────┘
//!          ▲                ▲                 ▲
//!    GenerationStats     HeapInfo      MutatorAllocRate
//!    (young / old)      (occupancy)     (bytes/second)
//! ```
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use gc_director::{CollectorContext, DirectorConfig};
//! use gc_director::stats::{AllocRateStats, CycleStats, HeapSnapshot};
//! # use gc_director::driver::{CollectionDriver, DriverRequest};
//! # use gc_director::workers::{WorkerPool, WorkerResizeStats};
//! # struct Driver;
//! # impl CollectionDriver for Driver {
//! #     fn is_busy(&self) -> bool { false }
//! #     fn collect(&self, _request: DriverRequest) {}
//! # }
//! # struct Pool;
//! # impl WorkerPool for Pool {
//! #     fn resize_stats(&self) -> WorkerResizeStats { WorkerResizeStats::default() }
//! #     fn request_resize_workers(&self, _nworkers: u32) {}
//! # }
//!
//! // The embedding collector provides the facades; plain snapshots
//! // implement the statistics traits and work for static deployments.
//! let ctx = CollectorContext {
//!     young_stats: Arc::new(CycleStats::default()),
//!     old_stats: Arc::new(CycleStats::default()),
//!     alloc_rate: Arc::new(AllocRateStats::default()),
//!     heap: Arc::new(HeapSnapshot::default()),
//!     young_workers: Arc::new(Pool),
//!     old_workers: Arc::new(Pool),
//!     major_driver: Arc::new(Driver),
//!     minor_driver: Arc::new(Driver),
//! };
//!
//! let director = gc_director::start_with_config(DirectorConfig::default(), ctx)?;
//!
//! // Wake the director early, e.g. after an allocation stall
//! director.notify();
//!
//! // Shut down with the collector
//! director.stop()?;
//! # Ok::<(), gc_director::DirectorError>(())
//! ```
//!
//! ## Modules
//!
//! - [`config`]: director tuning parameters and validation
//! - [`context`]: the facade bundle handed to the director
//! - [`director`]: the service thread, monitor and dispatch
//! - [`driver`]: collection submission facade
//! - [`error`]: error types for service lifecycle faults
//! - [`heuristics`]: decision types and the rule-based policy
//! - [`logging`]: decision event logging
//! - [`stats`]: statistics facades and snapshot types
//! - [`workers`]: worker pool facade
//!
//! ## Guarantees
//!
//! - Decisions are deterministic: identical facade snapshots produce
//!   identical decisions (no randomness, no wall-clock reads in rules)
//! - The heuristics are total: anomalous inputs (zero rates, missing
//!   samples, non-finite derived values) disable rules instead of failing
//! - At most one collect call per tick, and one resize request per pool
//!   per tick

// Core decision making
pub mod heuristics;

// Service loop
pub mod director;

// Facades
pub mod context;
pub mod driver;
pub mod stats;
pub mod workers;

// Configuration and errors
pub mod config;
pub mod error;

// Monitoring
pub mod logging;

// Re-export main types for convenience
pub use config::DirectorConfig;
pub use context::CollectorContext;
pub use director::Director;
pub use driver::{CollectionDriver, DriverRequest};
pub use error::{DirectorError, Result};
pub use heuristics::{
    GcCause, GcDecision, Heuristics, InitialConfiguration, PageConfiguration,
    RuleBasedHeuristics, WorkerConfiguration, WorkerDecision,
};
pub use workers::{WorkerPool, WorkerResizeStats};

use std::sync::Arc;

/// Crate version string from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Start a director with the default configuration
///
/// Builds the rule-based heuristics policy over the given facades and
/// spawns the service thread.
///
/// # Errors
///
/// Returns an error if the default configuration is invalid for this host
/// or the thread cannot be spawned.
pub fn start(ctx: CollectorContext) -> Result<Director> {
    start_with_config(DirectorConfig::default(), ctx)
}

/// Start a director with a custom configuration
///
/// # Examples
///
/// ```no_run
/// # use std::sync::Arc;
/// # use gc_director::{CollectorContext, DirectorConfig};
/// # use gc_director::stats::{AllocRateStats, CycleStats, HeapSnapshot};
/// # use gc_director::driver::{CollectionDriver, DriverRequest};
/// # use gc_director::workers::{WorkerPool, WorkerResizeStats};
/// # struct Driver;
/// # impl CollectionDriver for Driver {
/// #     fn is_busy(&self) -> bool { false }
/// #     fn collect(&self, _request: DriverRequest) {}
/// # }
/// # struct Pool;
/// # impl WorkerPool for Pool {
/// #     fn resize_stats(&self) -> WorkerResizeStats { WorkerResizeStats::default() }
/// #     fn request_resize_workers(&self, _nworkers: u32) {}
/// # }
/// # let ctx = CollectorContext {
/// #     young_stats: Arc::new(CycleStats::default()),
/// #     old_stats: Arc::new(CycleStats::default()),
/// #     alloc_rate: Arc::new(AllocRateStats::default()),
/// #     heap: Arc::new(HeapSnapshot::default()),
/// #     young_workers: Arc::new(Pool),
/// #     old_workers: Arc::new(Pool),
/// #     major_driver: Arc::new(Driver),
/// #     minor_driver: Arc::new(Driver),
/// # };
/// let config = DirectorConfig {
///     conc_gc_threads: 4,
///     collection_interval_major: 3600.0,
///     ..Default::default()
/// };
///
/// let director = gc_director::start_with_config(config, ctx)?;
/// # director.stop()?;
/// # Ok::<(), gc_director::DirectorError>(())
/// ```
pub fn start_with_config(config: DirectorConfig, ctx: CollectorContext) -> Result<Director> {
    config.validate()?;
    let config = Arc::new(config);
    let policy = Arc::new(RuleBasedHeuristics::new(config.clone(), ctx.clone()));
    Director::start(config, policy, ctx)
}
