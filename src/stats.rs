//! Global runtime counters.
//!
//! Process-wide, monotonically increasing, updated with relaxed atomics on
//! the hot paths. Cheap enough to leave always-on; read them through
//! [`snapshot`].

use std::sync::atomic::{AtomicU64, Ordering};

pub(crate) static ACTORS_HATCHED: AtomicU64 = AtomicU64::new(0);
pub(crate) static ACTORS_RETIRED: AtomicU64 = AtomicU64::new(0);
pub(crate) static MESSAGES_SENT: AtomicU64 = AtomicU64::new(0);
pub(crate) static MESSAGES_RECEIVED: AtomicU64 = AtomicU64::new(0);

/// Point-in-time copy of the runtime counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatsSnapshot {
    /// Actors hatched since process start.
    pub actors_hatched: u64,
    /// Actors that have terminated.
    pub actors_retired: u64,
    /// Messages enqueued into any mailbox.
    pub messages_sent: u64,
    /// Messages popped from any mailbox.
    pub messages_received: u64,
}

/// Read all counters. The values are individually consistent but not
/// mutually atomic.
pub fn snapshot() -> StatsSnapshot {
    StatsSnapshot {
        actors_hatched: ACTORS_HATCHED.load(Ordering::Relaxed),
        actors_retired: ACTORS_RETIRED.load(Ordering::Relaxed),
        messages_sent: MESSAGES_SENT.load(Ordering::Relaxed),
        messages_received: MESSAGES_RECEIVED.load(Ordering::Relaxed),
    }
}
