//! Write-behind click accounting.
//!
//! Clicks are absorbed as `clicks:{id}` counters in the fast tier and merged
//! into the store's authoritative totals by [`ClickSyncDaemon`]. Counts are
//! approximate by design: a late increment racing the daemon's read-then-
//! delete is the accepted loss window.

pub mod accumulator;
pub mod sink;
pub mod sync;

pub use accumulator::ClickAccumulator;
pub use sink::ClickSink;
pub use sync::ClickSyncDaemon;
