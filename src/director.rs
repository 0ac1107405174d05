//! Director Module - Collection-Scheduling Service
//!
//! A single long-running thread that wakes every decision quantum (or
//! earlier, when notified), asks the heuristics for decisions and
//! dispatches them: GC-start requests go to the major driver, worker
//! resize requests to the per-generation pools.
//!
//! Within one tick the phases are strictly serial: major-decide,
//! minor-decide, adjust-decide. A dispatched GC request ends the tick; at
//! most one collect call and one resize request per pool are issued per
//! tick.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use indexmap::IndexMap;
use parking_lot::{Condvar, Mutex};

use crate::config::DirectorConfig;
use crate::context::CollectorContext;
use crate::driver::DriverRequest;
use crate::error::{DirectorError, Result};
use crate::heuristics::Heuristics;
use crate::logging::{self, DirectorEvent};

/// Monitor shared between the service thread and its controllers
struct DirectorShared {
    /// Stop flag, read and set under the monitor lock
    stopped: Mutex<bool>,
    monitor: Condvar,

    /// Decision ticks evaluated
    ticks: AtomicU64,
    /// GC requests dispatched to the driver
    gcs_requested: AtomicU64,
    /// Worker resize requests dispatched to the pools
    resizes_requested: AtomicU64,
}

/// The collection-scheduling director service
///
/// Owns the dedicated decision thread. Exactly one instance should exist
/// per collected heap; the embedding collector holds it for the lifetime
/// of the process and calls [`Director::stop`] on shutdown.
///
/// `notify()` may be called from any thread, typically after an
/// allocation stall or when a driver finishes a cycle, to re-evaluate the
/// rules before the next tick.
pub struct Director {
    shared: Arc<DirectorShared>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl Director {
    /// Start the director service thread
    ///
    /// Validates the configuration, computes and logs the initial
    /// configuration, then spawns the decision loop.
    ///
    /// # Errors
    ///
    /// Returns `Configuration` if the config is invalid and `ThreadSpawn`
    /// if the OS refuses the thread.
    pub fn start(
        config: Arc<DirectorConfig>,
        heuristics: Arc<dyn Heuristics>,
        ctx: CollectorContext,
    ) -> Result<Self> {
        config.validate()?;

        let shared = Arc::new(DirectorShared {
            stopped: Mutex::new(false),
            monitor: Condvar::new(),
            ticks: AtomicU64::new(0),
            gcs_requested: AtomicU64::new(0),
            resizes_requested: AtomicU64::new(0),
        });

        let thread_shared = shared.clone();
        let quantum = config.decision_quantum();
        let decision_hz = config.decision_hz;

        let handle = std::thread::Builder::new()
            .name("gc-director".to_string())
            .spawn(move || {
                run_service(thread_shared, heuristics, ctx, quantum, decision_hz);
            })?;

        Ok(Self {
            shared,
            handle: Mutex::new(Some(handle)),
        })
    }

    /// Wake the director before its next tick
    ///
    /// Idempotent; may be called from any thread.
    pub fn notify(&self) {
        let _stopped = self.shared.stopped.lock();
        self.shared.monitor.notify_one();
    }

    /// Stop the service and join the decision thread
    ///
    /// # Errors
    ///
    /// Returns `NotRunning` if the service was already stopped.
    pub fn stop(&self) -> Result<()> {
        let handle = self
            .handle
            .lock()
            .take()
            .ok_or(DirectorError::NotRunning)?;

        {
            let mut stopped = self.shared.stopped.lock();
            *stopped = true;
            self.shared.monitor.notify_one();
        }

        // The loop observes the flag at its next wait; joining cannot hang
        let _ = handle.join();

        logging::log_event(DirectorEvent::ServiceStopped {
            ticks: self.shared.ticks.load(Ordering::Relaxed),
        });

        Ok(())
    }

    /// The decision thread is still running
    pub fn is_running(&self) -> bool {
        self.handle.lock().is_some()
    }

    /// Decision ticks evaluated so far
    pub fn ticks(&self) -> u64 {
        self.shared.ticks.load(Ordering::Relaxed)
    }

    /// Get detailed diagnostic information
    pub fn diagnostics(&self) -> IndexMap<String, String> {
        let mut diagnostics = IndexMap::new();

        diagnostics.insert("running".to_string(), self.is_running().to_string());
        diagnostics.insert(
            "ticks".to_string(),
            self.shared.ticks.load(Ordering::Relaxed).to_string(),
        );
        diagnostics.insert(
            "gcs_requested".to_string(),
            self.shared.gcs_requested.load(Ordering::Relaxed).to_string(),
        );
        diagnostics.insert(
            "resizes_requested".to_string(),
            self.shared
                .resizes_requested
                .load(Ordering::Relaxed)
                .to_string(),
        );

        diagnostics
    }
}

impl Drop for Director {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}

// ============================================================================
// SERVICE LOOP
// ============================================================================

fn run_service(
    shared: Arc<DirectorShared>,
    heuristics: Arc<dyn Heuristics>,
    ctx: CollectorContext,
    quantum: Duration,
    decision_hz: u32,
) {
    logging::log_event(DirectorEvent::ServiceStarted { decision_hz });

    // Computed once, before the first tick
    let initial = heuristics.initial_configuration();
    log::info!(
        "[Director] Initial configuration: {} parallel workers, {} concurrent workers, \
         tenuring threshold {}",
        initial.num_parallel_workers,
        initial.num_concurrent_workers,
        initial.tenuring_threshold
    );
    logging::log_event(DirectorEvent::InitialConfigurationChosen {
        parallel_workers: initial.num_parallel_workers,
        concurrent_workers: initial.num_concurrent_workers,
        tenuring_threshold: initial.tenuring_threshold,
        medium_page_size: initial.page_configuration.medium_page_size,
    });

    // Main loop
    while wait_for_tick(&shared, quantum) {
        shared.ticks.fetch_add(1, Ordering::Relaxed);
        if !start_gc(&shared, heuristics.as_ref(), &ctx) {
            adjust_workers(&shared, heuristics.as_ref(), &ctx);
        }
    }
}

fn wait_for_tick(shared: &DirectorShared, quantum: Duration) -> bool {
    let mut stopped = shared.stopped.lock();

    if *stopped {
        // Stopped
        return false;
    }

    // Wait for the quantum to elapse or a notify, whichever comes first
    let _ = shared.monitor.wait_for(&mut stopped, quantum);
    true
}

fn start_gc(
    shared: &DirectorShared,
    heuristics: &dyn Heuristics,
    ctx: &CollectorContext,
) -> bool {
    // Try to start a major collection first, as it includes a minor one
    let major_decision = heuristics.make_major_gc_decision();
    if major_decision.should_gc() {
        submit(shared, ctx, &major_decision);
        return true;
    }

    // Minor requests also go to the major submitter, which routes on the
    // request's cause
    let minor_decision = heuristics.make_minor_gc_decision();
    if minor_decision.should_gc() {
        submit(shared, ctx, &minor_decision);
        return true;
    }

    false
}

fn submit(shared: &DirectorShared, ctx: &CollectorContext, decision: &crate::heuristics::GcDecision) {
    let request = DriverRequest::new(
        decision.cause,
        decision.workers.young,
        decision.workers.old,
    );

    log::info!(
        "[Director] Requesting GC: {} ({} young workers, {} old workers)",
        request.cause,
        request.young_workers,
        request.old_workers
    );
    logging::log_event(DirectorEvent::GcRequested {
        cause: request.cause.to_string(),
        young_workers: request.young_workers,
        old_workers: request.old_workers,
    });

    ctx.major_driver.collect(request);
    shared.gcs_requested.fetch_add(1, Ordering::Relaxed);
}

fn adjust_workers(shared: &DirectorShared, heuristics: &dyn Heuristics, ctx: &CollectorContext) {
    let decision = heuristics.make_adjust_workers_decision();

    if decision.should_adjust_old {
        logging::log_event(DirectorEvent::WorkerResizeRequested {
            generation: "old".to_string(),
            requested_nworkers: decision.workers.old,
        });
        ctx.old_workers.request_resize_workers(decision.workers.old);
        shared.resizes_requested.fetch_add(1, Ordering::Relaxed);
    }

    if decision.should_adjust_young {
        logging::log_event(DirectorEvent::WorkerResizeRequested {
            generation: "young".to_string(),
            requested_nworkers: decision.workers.young,
        });
        ctx.young_workers
            .request_resize_workers(decision.workers.young);
        shared.resizes_requested.fetch_add(1, Ordering::Relaxed);
    }
}
