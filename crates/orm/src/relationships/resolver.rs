//! Fixed-point resolution of deferred relationship declarations
//!
//! Deferred tasks are retried in enqueue order until a full pass no longer
//! shrinks the queue. Whatever remains is genuinely unresolvable and is
//! re-run in resolving mode so every failure is reported with a freshly
//! computed reason.

use tracing::{debug, warn};

use crate::error::DeclarationError;

use super::registry::{Registry, ResolutionMode};

/// Scoped acquisition of resolving mode; the registry drops back to
/// deferring on every exit path, including panics.
struct ResolvingGuard<'a> {
    registry: &'a mut Registry,
}

impl<'a> ResolvingGuard<'a> {
    fn new(registry: &'a mut Registry) -> Self {
        registry.mode = ResolutionMode::Resolving;
        Self { registry }
    }
}

impl Drop for ResolvingGuard<'_> {
    fn drop(&mut self) {
        self.registry.mode = ResolutionMode::Deferring;
    }
}

impl Registry {
    /// Drain the deferred queue to a fixed point, then report whatever is
    /// left as terminal errors.
    ///
    /// Each pass re-attempts every queued task in original enqueue order;
    /// failures re-enqueue, so the queue length is monotonically
    /// non-increasing and the loop finishes in at most `initial length`
    /// passes. Idempotent: an empty queue is an immediate fixed point.
    pub fn solve(&mut self) -> Result<(), Vec<DeclarationError>> {
        let mut pass = 0usize;
        loop {
            let queue: Vec<_> = self.take_deferred();
            if queue.is_empty() {
                return Ok(());
            }

            pass += 1;
            let before = queue.len();
            for task in queue {
                // Deferring mode re-enqueues failures for the next pass.
                let _ = self.attempt(task, ResolutionMode::Deferring);
            }
            let after = self.deferred_count();
            debug!(pass, before, after, "resolution pass complete");

            if after == before {
                break;
            }
        }

        // Fixed point reached with tasks remaining: re-run them in resolving
        // mode and report every failure, in queue order.
        let guard = ResolvingGuard::new(self);
        let remaining = guard.registry.take_deferred();
        let mut errors = Vec::new();
        for task in remaining {
            if let Err(error) = guard.registry.attempt(task, ResolutionMode::Resolving) {
                warn!(%error, "unresolvable relationship declaration");
                errors.push(error);
            }
        }
        drop(guard);

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
