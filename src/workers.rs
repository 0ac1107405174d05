//! Worker Pool Facade - Per-Generation Worker Control
//!
//! The director observes each generation's worker pool through
//! [`WorkerPool`] and asks it to change size asynchronously. The pool is
//! owned by the collector; resize requests take effect at the pool's next
//! convenient point, not synchronously.

/// Snapshot of a worker pool, taken once per decision tick
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WorkerResizeStats {
    /// A collection is currently running on this pool
    pub is_active: bool,
    /// Workers currently employed
    pub nworkers_current: u32,
    /// Serial GC time already spent in the running cycle, in seconds
    ///
    /// Zero when the pool is inactive.
    pub serial_gc_time_passed: f64,
    /// Parallel GC time already spent in the running cycle, in seconds
    pub parallel_gc_time_passed: f64,
}

/// Worker pool facade for one generation
pub trait WorkerPool: Send + Sync {
    /// Snapshot-consistent view of the pool and the running cycle
    fn resize_stats(&self) -> WorkerResizeStats;

    /// Request an asynchronous change of the worker count
    ///
    /// The director issues at most one request per pool per tick.
    fn request_resize_workers(&self, nworkers: u32);
}
