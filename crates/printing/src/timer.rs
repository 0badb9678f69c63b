use std::time::Duration;

use futures::future::LocalBoxFuture;

/// Host-scheduled delays.
///
/// The pipeline's grace periods are liveness heuristics, not
/// correctness guarantees; routing them through this trait keeps the
/// settlement logic testable with clocks that fire immediately or
/// never.
pub trait Timer {
    /// Resolves once `duration` has elapsed on the host's clock.
    fn sleep(&self, duration: Duration) -> LocalBoxFuture<'static, ()>;
}
