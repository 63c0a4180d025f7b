//! Worker thread loop: dequeue, resume one slice, reclassify.

use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use tracing::{debug, debug_span, error, trace_span};

use crate::actor::{Actor, ActorContext, Turn};
use crate::message::Message;
use crate::pool::PoolCore;
use crate::stats;

/// Spawn one worker thread running the scheduling loop.
pub(crate) fn spawn(core: Arc<PoolCore>, worker_id: usize) -> io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name(format!("roost-worker-{worker_id}"))
        .spawn(move || run(&core, worker_id))
}

fn run(core: &PoolCore, worker_id: usize) {
    debug!(target: "roost::worker", worker = worker_id, "worker started");

    loop {
        let actor = {
            let _wait = trace_span!(target: "roost::worker", "wait", worker = worker_id).entered();
            match core.sched().next() {
                Some(actor) => actor,
                None => break,
            }
        };
        resume_slice(core, worker_id, actor);
    }

    debug!(target: "roost::worker", worker = worker_id, "worker stopped");
}

/// Resume an actor once and hand it back to whichever structure the
/// returned [`Turn`] names. The actor is exclusively owned here for the
/// duration of the slice; no lock is held across the resume.
fn resume_slice(core: &PoolCore, worker_id: usize, mut actor: Actor) {
    let id = actor.id;

    let turn = {
        let _run = debug_span!(
            target: "roost::worker",
            "run",
            worker = worker_id,
            actor = id.as_u64()
        )
        .entered();
        let mut ctx = ActorContext::new(core, id, actor.parent);
        // A panicking body is an actor failure, not a worker failure: the
        // slice is aborted and the actor terminates through the normal
        // path, so its parent still learns of the death.
        match panic::catch_unwind(AssertUnwindSafe(|| actor.body.resume(&mut ctx))) {
            Ok(turn) => turn,
            Err(payload) => {
                let reason = panic_message(&payload);
                error!(
                    target: "roost::worker",
                    worker = worker_id,
                    actor = id.as_u64(),
                    reason,
                    "actor panicked; terminating"
                );
                Turn::Exit
            }
        }
    };

    match turn {
        Turn::Exit => retire(core, actor),
        Turn::Backoff => core.sched().push(actor),
        Turn::AwaitMail => {
            core.sched()
                .park_idle_unless(actor, || !core.hub().is_empty(id));
        }
        Turn::Park => core.sched().park(actor),
    }
}

/// Tear down a finished actor: destroy its mailbox and notify the parent.
fn retire(core: &PoolCore, actor: Actor) {
    core.hub()
        .unregister(actor.id)
        .expect("terminated actor had no registered mailbox");
    stats::ACTORS_RETIRED.fetch_add(1, Ordering::Relaxed);
    debug!(target: "roost::worker", actor = actor.id.as_u64(), "actor finished");

    // Death notice goes through the normal send path and may wake the
    // parent if it is parked.
    if let Some(parent) = actor.parent {
        core.route(parent, Message::died(actor.id));
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s
    } else {
        "non-string panic payload"
    }
}
