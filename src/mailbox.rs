//! Per-actor FIFO mailbox.

use std::collections::VecDeque;
use std::sync::atomic::Ordering;

use parking_lot::Mutex;
use tracing::trace;

use crate::message::{ActorId, Message};
use crate::stats;

/// FIFO queue of messages addressed to one actor.
///
/// Each mailbox carries its own lock, so senders to different actors never
/// contend with each other and the hub's index lock is never held while a
/// message is being moved. Messages from one sender to one destination are
/// observed in send order; no cross-mailbox order is promised.
pub struct Mailbox {
    owner: ActorId,
    queue: Mutex<VecDeque<Message>>,
}

impl Mailbox {
    pub(crate) fn new(owner: ActorId) -> Self {
        Mailbox {
            owner,
            queue: Mutex::new(VecDeque::new()),
        }
    }

    /// Id of the actor this mailbox belongs to.
    pub fn owner(&self) -> ActorId {
        self.owner
    }

    /// Append a message at the tail. Returns the queue depth after the
    /// enqueue.
    pub fn push(&self, msg: Message) -> usize {
        let depth = {
            let mut queue = self.queue.lock();
            queue.push_back(msg);
            queue.len()
        };
        stats::MESSAGES_SENT.fetch_add(1, Ordering::Relaxed);
        trace!(
            target: "roost::mailbox",
            actor = self.owner.as_u64(),
            depth,
            "enqueued"
        );
        depth
    }

    /// Pop the head message, or `None` if the mailbox is empty.
    pub fn try_pop(&self) -> Option<Message> {
        let (msg, depth) = {
            let mut queue = self.queue.lock();
            let msg = queue.pop_front();
            (msg, queue.len())
        };
        if msg.is_some() {
            stats::MESSAGES_RECEIVED.fetch_add(1, Ordering::Relaxed);
            trace!(
                target: "roost::mailbox",
                actor = self.owner.as_u64(),
                depth,
                "dequeued"
            );
        }
        msg
    }

    pub fn is_empty(&self) -> bool {
        self.queue.lock().is_empty()
    }

    pub fn len(&self) -> usize {
        self.queue.lock().len()
    }
}
