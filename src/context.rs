//! Collector Context - Facade Bundle
//!
//! Everything the director and its heuristics observe or control, bundled
//! as shared trait objects. The embedding collector constructs one of
//! these and hands clones to the director service.

use std::sync::Arc;

use crate::driver::CollectionDriver;
use crate::stats::{GenerationStats, HeapInfo, MutatorAllocRate};
use crate::workers::WorkerPool;

/// Shared handles to the collector's statistics, pools and drivers
#[derive(Clone)]
pub struct CollectorContext {
    /// Young-generation cycle statistics
    pub young_stats: Arc<dyn GenerationStats>,
    /// Old-generation cycle statistics
    pub old_stats: Arc<dyn GenerationStats>,
    /// Mutator allocation rate statistics
    pub alloc_rate: Arc<dyn MutatorAllocRate>,
    /// Heap occupancy
    pub heap: Arc<dyn HeapInfo>,
    /// Young-generation worker pool
    pub young_workers: Arc<dyn WorkerPool>,
    /// Old-generation worker pool
    pub old_workers: Arc<dyn WorkerPool>,
    /// Major collection submitter (also serves minor-only requests)
    pub major_driver: Arc<dyn CollectionDriver>,
    /// Minor collection submitter (busy predicate only)
    pub minor_driver: Arc<dyn CollectionDriver>,
}
