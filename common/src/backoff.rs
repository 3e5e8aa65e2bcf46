//! Retry-interval iterator used by the broadcast retry loop.
//!
//! Unlike most services in this family, the hub retries a broadcast on a
//! *fixed* 10-second interval rather than exponential backoff. We keep that
//! fixed cadence but expose it through the same "iterator of `Duration`s"
//! shape an exponential `get_backoff_iter`-style helper would use, so the
//! broadcaster can be written the same way regardless of which interval
//! policy backs it.

use std::time::Duration;

/// The fixed interval between rebroadcast attempts: re-submit every 10
/// seconds until the chain client reports at least one confirmation.
pub const REBROADCAST_INTERVAL: Duration = Duration::from_secs(10);

/// An infinite iterator of [`REBROADCAST_INTERVAL`]-spaced durations, for use
/// with `tokio::time::sleep` in a retry loop.
///
/// The caller is responsible for bounding the loop with a deadline — see
/// [`crate::Deadline`].
pub fn get_rebroadcast_iter() -> impl Iterator<Item = Duration> {
    std::iter::repeat(REBROADCAST_INTERVAL)
}
