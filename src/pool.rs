//! The pool: worker threads, scheduler state, and the supervision loop.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

#[cfg(unix)]
use parking_lot::RwLock;
use tracing::{debug, info, trace, warn};

use crate::actor::{Actor, ActorBody};
use crate::config::PoolConfig;
use crate::error::PoolError;
use crate::hub::MailHub;
use crate::message::{ActorId, Message};
use crate::scheduler::{worker, Scheduler};
use crate::stats;

#[cfg(unix)]
use std::os::fd::RawFd;

/// The event-loop wake registration: sends to `actor` additionally write
/// one byte to `fd`, so an external poll/epoll loop learns that mail is
/// waiting. The byte is a level trigger, not a message channel.
#[cfg(unix)]
#[derive(Debug, Clone, Copy)]
struct EventWake {
    actor: ActorId,
    fd: RawFd,
}

/// State shared between the pool handle, the workers, and every
/// [`ActorContext`](crate::actor::ActorContext).
///
/// Workers hold `Arc`s to this struct, which pins it for their lifetime;
/// the pool itself must not be dropped before the workers are joined, and
/// [`Pool`]'s `Drop` enforces that.
pub(crate) struct PoolCore {
    hub: MailHub,
    sched: Scheduler,
    /// Next actor id; ids start at 1, 0 being the reserved system source.
    next_id: AtomicU64,
    #[cfg(unix)]
    event_wake: RwLock<Option<EventWake>>,
}

impl PoolCore {
    fn new() -> Self {
        PoolCore {
            hub: MailHub::new(),
            sched: Scheduler::new(),
            next_id: AtomicU64::new(1),
            #[cfg(unix)]
            event_wake: RwLock::new(None),
        }
    }

    pub(crate) fn hub(&self) -> &MailHub {
        &self.hub
    }

    pub(crate) fn sched(&self) -> &Scheduler {
        &self.sched
    }

    /// Register a new actor and make it runnable.
    pub(crate) fn hatch_with_parent(
        &self,
        parent: Option<ActorId>,
        body: Box<dyn ActorBody>,
    ) -> ActorId {
        let id = ActorId::from_raw(self.next_id.fetch_add(1, Ordering::Relaxed));
        // The id was just minted from the monotonic counter, so a collision
        // is a broken runtime invariant, not a user error.
        self.hub
            .register(id)
            .expect("freshly allocated actor id already had a mailbox");
        stats::ACTORS_HATCHED.fetch_add(1, Ordering::Relaxed);
        debug!(
            target: "roost::pool",
            actor = id.as_u64(),
            parent = parent.map(ActorId::as_u64),
            "hatched"
        );
        self.sched.push(Actor { id, parent, body });
        id
    }

    /// The one send path: enqueue, wake a parked receiver, poke the event
    /// fd. The mailbox enqueue happens-before the idle-map probe, which
    /// together with the receiver-side re-check closes the park/wake race.
    pub(crate) fn route(&self, dst: ActorId, msg: Message) {
        if !self.hub.deliver(dst, msg) {
            return;
        }
        self.sched.wake(dst);
        #[cfg(unix)]
        self.poke_event_fd(dst);
    }

    #[cfg(unix)]
    fn set_event_wake(&self, actor: ActorId, fd: RawFd) {
        *self.event_wake.write() = Some(EventWake { actor, fd });
    }

    #[cfg(unix)]
    fn poke_event_fd(&self, dst: ActorId) {
        let gate = *self.event_wake.read();
        if let Some(EventWake { actor, fd }) = gate {
            if actor == dst {
                write_wake_byte(fd);
            }
        }
    }
}

/// Best-effort single-byte write. Retried on EINTR; any other failure
/// (including a full pipe, which already guarantees a pending wake) is
/// logged at trace and ignored.
#[cfg(unix)]
fn write_wake_byte(fd: RawFd) {
    let buf = [b'x'];
    loop {
        let n = unsafe { libc::write(fd, buf.as_ptr().cast(), 1) };
        if n >= 0 {
            return;
        }
        let err = std::io::Error::last_os_error();
        if err.raw_os_error() == Some(libc::EINTR) {
            continue;
        }
        trace!(target: "roost::pool", error = %err, "wake fd write failed");
        return;
    }
}

/// Snapshot of the pool's scheduler state.
#[derive(Debug, Clone)]
pub struct PoolMetrics {
    /// Number of worker threads.
    pub workers: usize,
    /// Actors currently in the run queue.
    pub runnable: usize,
    /// Actors parked awaiting mail.
    pub idle: usize,
    /// Registered mailboxes, i.e. live actors.
    pub mailboxes: usize,
    /// Whether shutdown has been signalled.
    pub stopping: bool,
}

/// A pool of worker threads running actors to quiescence.
///
/// Construct with [`Pool::new`], seed it with [`Pool::hatch`], then drive
/// it with [`Pool::run`], which returns once every actor has terminated.
///
/// # Thread safety
///
/// Scheduler structures are shared through one `Arc`'d core; actors are
/// moved between them, never aliased. A pool that is dropped without
/// running is shut down and joined by `Drop`, so worker threads never
/// outlive the pool.
pub struct Pool {
    core: Arc<PoolCore>,
    workers: Vec<JoinHandle<()>>,
    config: PoolConfig,
}

impl Pool {
    /// Create a pool with `workers` worker threads.
    pub fn new(workers: usize) -> Result<Self, PoolError> {
        Pool::with_config(PoolConfig {
            workers,
            ..PoolConfig::default()
        })
    }

    /// Create a pool from an explicit configuration.
    pub fn with_config(config: PoolConfig) -> Result<Self, PoolError> {
        let core = Arc::new(PoolCore::new());
        let mut workers = Vec::with_capacity(config.workers);
        for worker_id in 0..config.workers {
            match worker::spawn(Arc::clone(&core), worker_id) {
                Ok(handle) => workers.push(handle),
                Err(err) => {
                    // Unblock and join the workers spawned so far; no pool
                    // handle will ever exist to stop them otherwise, and
                    // they would wait on the scheduler condvar forever.
                    core.sched.stop();
                    for handle in workers {
                        let _ = handle.join();
                    }
                    return Err(PoolError::ThreadSetup(err));
                }
            }
        }
        info!(target: "roost::pool", workers = config.workers, "pool started");
        Ok(Pool {
            core,
            workers,
            config,
        })
    }

    /// Hatch a top-level actor. It has no parent, so no death notice is
    /// produced when it terminates.
    pub fn hatch(&self, body: impl ActorBody) -> ActorId {
        self.core.hatch_with_parent(None, Box::new(body))
    }

    /// Inject a message from outside the pool, stamped with the system
    /// source id. Dropped silently if `dst` has terminated.
    pub fn post<T: std::any::Any + Send>(&self, dst: ActorId, payload: T) {
        self.core.route(dst, Message::user(payload));
    }

    /// Register the event-loop wake pair: every send routed to `actor`
    /// additionally writes one byte `b'x'` to `fd`.
    #[cfg(unix)]
    pub fn set_event_wake(&self, actor: ActorId, fd: RawFd) {
        self.core.set_event_wake(actor, fd);
    }

    /// Snapshot the scheduler state.
    pub fn metrics(&self) -> PoolMetrics {
        PoolMetrics {
            workers: self.config.workers,
            runnable: self.core.sched.runnable_len(),
            idle: self.core.sched.idle_len(),
            mailboxes: self.core.hub.len(),
            stopping: self.core.sched.is_stopping(),
        }
    }

    /// Supervise the pool until quiescence, then stop and join the
    /// workers.
    ///
    /// Quiescence is "no mailboxes remain": a mailbox exists exactly from
    /// hatch to termination, so an empty hub means every actor has
    /// finished. The loop polls at the configured interval and emits the
    /// mailbox-count gauge on each tick. Cannot fail; termination depends
    /// on user actors not parking forever without a possible wake.
    pub fn run(&mut self) {
        loop {
            let mailboxes = self.core.hub.len();
            trace!(target: "roost::stats", mailboxes, "supervision tick");
            if mailboxes == 0 {
                break;
            }
            thread::sleep(self.config.supervise_interval);
        }
        self.shutdown_workers();
        info!(target: "roost::pool", "pool quiesced");
    }

    fn shutdown_workers(&mut self) {
        if self.workers.is_empty() {
            return;
        }
        self.core.sched.stop();
        for handle in self.workers.drain(..) {
            let _ = handle.join();
        }
        let dropped = self.core.sched.drain();
        if dropped > 0 {
            warn!(target: "roost::pool", dropped, "actors discarded at shutdown");
        }
    }
}

impl Drop for Pool {
    fn drop(&mut self) {
        self.shutdown_workers();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_pool_runs_to_quiescence() {
        let mut pool = Pool::new(2).unwrap();
        pool.run();
        let metrics = pool.metrics();
        assert_eq!(metrics.mailboxes, 0);
        assert!(metrics.stopping);
    }

    #[test]
    fn drop_without_run_joins_workers() {
        let pool = Pool::new(2).unwrap();
        drop(pool);
    }

    #[test]
    fn hatch_assigns_monotonic_ids() {
        let mut pool = Pool::new(1).unwrap();
        let a = pool.hatch(|_: &mut crate::actor::ActorContext<'_>| crate::actor::Turn::Exit);
        let b = pool.hatch(|_: &mut crate::actor::ActorContext<'_>| crate::actor::Turn::Exit);
        assert!(b > a);
        assert!(!a.is_system());
        pool.run();
    }

    #[test]
    fn post_to_absent_actor_is_silent() {
        let pool = Pool::new(1).unwrap();
        pool.post(ActorId::from_raw(999), 1_u32);
    }
}
