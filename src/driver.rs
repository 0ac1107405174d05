//! Driver Facade - Collection Submission
//!
//! The director never collects; it submits [`DriverRequest`]s to the
//! collection driver and lets the driver schedule the actual cycle.

use crate::heuristics::GcCause;

/// A request to start a collection cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DriverRequest {
    /// Why the cycle is being started
    pub cause: GcCause,
    /// Young-generation worker count for the cycle
    pub young_workers: u32,
    /// Old-generation worker count; 0 means no old cycle
    pub old_workers: u32,
}

impl DriverRequest {
    pub fn new(cause: GcCause, young_workers: u32, old_workers: u32) -> Self {
        Self {
            cause,
            young_workers,
            old_workers,
        }
    }
}

/// Collection submitter facade
///
/// The collector exposes two submitters, `major` and `minor`. The major
/// submitter multiplexes on [`DriverRequest::cause`] and also serves
/// minor-only requests (`old_workers == 0`); the director therefore routes
/// every start request through it, and uses the minor submitter only for
/// its busy predicate.
pub trait CollectionDriver: Send + Sync {
    /// A cycle submitted here is still pending or running
    fn is_busy(&self) -> bool;

    /// Submit a collection request; fire-and-forget
    fn collect(&self, request: DriverRequest);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_driver_request() {
        let request = DriverRequest::new(GcCause::Warmup, 4, 2);
        assert_eq!(request.cause, GcCause::Warmup);
        assert_eq!(request.young_workers, 4);
        assert_eq!(request.old_workers, 2);
    }
}
