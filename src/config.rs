use std::time::Duration;

/// Configuration for a [`Pool`](crate::pool::Pool).
#[derive(Clone, Debug)]
pub struct PoolConfig {
    /// Number of worker threads.
    pub workers: usize,
    /// Cadence of the supervision loop's quiescence check in
    /// [`Pool::run`](crate::pool::Pool::run).
    pub supervise_interval: Duration,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            workers: num_cpus::get(),
            supervise_interval: Duration::from_millis(10),
        }
    }
}
