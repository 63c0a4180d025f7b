//! Scheduler state: the runnable queue and the idle-parking map.

pub(crate) mod worker;

use std::collections::{HashMap, VecDeque};

use parking_lot::{Condvar, Mutex};
use tracing::trace;

use crate::actor::Actor;
use crate::message::ActorId;

/// Everything the workers share, behind one lock.
///
/// An actor id present in `idle` is not in `run_queue` and not in flight
/// on any worker; moves between the two structures happen atomically under
/// the lock, so single ownership is never violated.
struct SchedState {
    run_queue: VecDeque<Actor>,
    idle: HashMap<ActorId, Actor>,
    stopping: bool,
}

/// The shared scheduler: FIFO run queue plus idle map plus stop flag,
/// paired with the condvar workers sleep on.
///
/// Every critical section is an O(1) pointer move (push, pop, or move one
/// actor), and the lock is never held across a resume slice.
pub(crate) struct Scheduler {
    state: Mutex<SchedState>,
    ready: Condvar,
}

impl Scheduler {
    pub(crate) fn new() -> Self {
        Scheduler {
            state: Mutex::new(SchedState {
                run_queue: VecDeque::new(),
                idle: HashMap::new(),
                stopping: false,
            }),
            ready: Condvar::new(),
        }
    }

    /// Enqueue a runnable actor at the tail and wake one worker.
    pub(crate) fn push(&self, actor: Actor) {
        let mut st = self.state.lock();
        st.run_queue.push_back(actor);
        self.ready.notify_one();
    }

    /// Park an actor awaiting mail, unless `has_mail` reports that a
    /// message arrived after the body last looked, in which case the actor
    /// goes straight back to the run queue.
    ///
    /// The check runs under the scheduler lock. A concurrent sender
    /// enqueues mail *before* probing the idle map (which also needs this
    /// lock), so either the sender's probe sees the actor parked and wakes
    /// it, or the check here sees the mail. There is no interleaving in
    /// which the actor parks with a non-empty mailbox and nobody wakes it.
    pub(crate) fn park_idle_unless<F>(&self, actor: Actor, has_mail: F)
    where
        F: FnOnce() -> bool,
    {
        let mut st = self.state.lock();
        if has_mail() {
            st.run_queue.push_back(actor);
            self.ready.notify_one();
            return;
        }
        trace!(target: "roost::scheduler", actor = actor.id.as_u64(), "parked awaiting mail");
        st.idle.insert(actor.id, actor);
    }

    /// Park an actor unconditionally. It stays parked until [`wake`]d.
    ///
    /// [`wake`]: Scheduler::wake
    pub(crate) fn park(&self, actor: Actor) {
        let mut st = self.state.lock();
        trace!(target: "roost::scheduler", actor = actor.id.as_u64(), "parked");
        st.idle.insert(actor.id, actor);
    }

    /// If `id` is parked, move it to the run-queue tail and signal one
    /// worker. Returns whether a transfer happened.
    pub(crate) fn wake(&self, id: ActorId) -> bool {
        let mut st = self.state.lock();
        match st.idle.remove(&id) {
            Some(actor) => {
                st.run_queue.push_back(actor);
                self.ready.notify_one();
                true
            }
            None => false,
        }
    }

    /// Blocking pop for workers. Waits on the condvar while the run queue
    /// is empty; returns `None` once the scheduler is stopping.
    pub(crate) fn next(&self) -> Option<Actor> {
        let mut st = self.state.lock();
        while st.run_queue.is_empty() && !st.stopping {
            self.ready.wait(&mut st);
        }
        if st.stopping {
            return None;
        }
        st.run_queue.pop_front()
    }

    /// Flag the scheduler as stopping and wake every worker so it can
    /// observe the flag.
    pub(crate) fn stop(&self) {
        let mut st = self.state.lock();
        st.stopping = true;
        self.ready.notify_all();
    }

    /// Drop anything still owned by the scheduler structures. Called after
    /// the workers are joined; returns how many actors were discarded.
    pub(crate) fn drain(&self) -> usize {
        let mut st = self.state.lock();
        let leftover = st.run_queue.len() + st.idle.len();
        st.run_queue.clear();
        st.idle.clear();
        leftover
    }

    pub(crate) fn runnable_len(&self) -> usize {
        self.state.lock().run_queue.len()
    }

    pub(crate) fn idle_len(&self) -> usize {
        self.state.lock().idle.len()
    }

    pub(crate) fn is_stopping(&self) -> bool {
        self.state.lock().stopping
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::{ActorContext, Turn};
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    fn actor(id: u64) -> Actor {
        Actor {
            id: ActorId::from_raw(id),
            parent: None,
            body: Box::new(|_ctx: &mut ActorContext<'_>| Turn::Exit),
        }
    }

    #[test]
    fn next_pops_in_fifo_order() {
        let sched = Scheduler::new();
        sched.push(actor(1));
        sched.push(actor(2));
        assert_eq!(sched.next().unwrap().id, ActorId::from_raw(1));
        assert_eq!(sched.next().unwrap().id, ActorId::from_raw(2));
    }

    #[test]
    fn wake_moves_idle_actor_to_queue() {
        let sched = Scheduler::new();
        sched.park(actor(3));
        assert_eq!(sched.idle_len(), 1);
        assert!(sched.wake(ActorId::from_raw(3)));
        assert_eq!(sched.idle_len(), 0);
        assert_eq!(sched.runnable_len(), 1);
        // A second wake is a no-op.
        assert!(!sched.wake(ActorId::from_raw(3)));
    }

    #[test]
    fn park_idle_unless_requeues_when_mail_arrived() {
        let sched = Scheduler::new();
        sched.park_idle_unless(actor(4), || true);
        assert_eq!(sched.idle_len(), 0);
        assert_eq!(sched.runnable_len(), 1);

        sched.park_idle_unless(actor(5), || false);
        assert_eq!(sched.idle_len(), 1);
    }

    #[test]
    fn stop_unblocks_waiting_next() {
        let sched = Arc::new(Scheduler::new());
        let waiter = {
            let sched = Arc::clone(&sched);
            thread::spawn(move || sched.next())
        };
        thread::sleep(Duration::from_millis(20));
        sched.stop();
        assert!(waiter.join().unwrap().is_none());
    }

    #[test]
    fn push_wakes_a_waiting_worker() {
        let sched = Arc::new(Scheduler::new());
        let waiter = {
            let sched = Arc::clone(&sched);
            thread::spawn(move || sched.next().map(|a| a.id))
        };
        thread::sleep(Duration::from_millis(20));
        sched.push(actor(6));
        assert_eq!(waiter.join().unwrap(), Some(ActorId::from_raw(6)));
    }

    #[test]
    fn drain_counts_leftovers() {
        let sched = Scheduler::new();
        sched.push(actor(7));
        sched.park(actor(8));
        assert_eq!(sched.drain(), 2);
        assert_eq!(sched.runnable_len(), 0);
        assert_eq!(sched.idle_len(), 0);
    }
}
