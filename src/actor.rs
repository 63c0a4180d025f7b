//! Actor identity, the continuation protocol, and the per-slice context.

use std::any::Any;
use std::fmt;

use crate::message::{ActorId, Message};
use crate::pool::PoolCore;

/// What an actor decided at the end of one resume slice.
///
/// A slice is one non-preemptible invocation of [`ActorBody::resume`]; the
/// returned `Turn` is the only way a slice ends, and it transfers ownership
/// of the actor back to the scheduler structures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Turn {
    /// Wait for mail. The worker parks the actor in the idle map unless a
    /// message arrived after the body last looked; in that case the actor
    /// goes straight back to the run queue and is resumed again.
    AwaitMail,
    /// Park unconditionally. The actor stays parked until a send wakes it;
    /// only for bodies that have arranged an external wake path.
    Park,
    /// Surrender the worker but stay runnable: re-enqueued at the tail of
    /// the run queue. Voluntary fairness for long-running bodies.
    Backoff,
    /// The actor is finished. Its mailbox is destroyed and, if it has a
    /// parent, a [`Body::Died`](crate::message::Body::Died) notice is
    /// routed there.
    Exit,
}

/// A resumable actor continuation.
///
/// `resume` runs one cooperative slice: typically drain or inspect the
/// mailbox via [`ActorContext::try_recv`], do some work, and return a
/// [`Turn`]. The runtime never preempts a slice; a body that needs to run
/// long should return [`Turn::Backoff`] periodically.
///
/// The blocking `recv` of the abstract actor model is the loop the caller
/// writes: `try_recv` returning `None` followed by `Turn::AwaitMail`, then
/// re-checking on the next slice. Re-checking makes the body robust to
/// spurious wakes by construction.
pub trait ActorBody: Send + 'static {
    fn resume(&mut self, ctx: &mut ActorContext<'_>) -> Turn;
}

impl<F> ActorBody for F
where
    F: FnMut(&mut ActorContext<'_>) -> Turn + Send + 'static,
{
    fn resume(&mut self, ctx: &mut ActorContext<'_>) -> Turn {
        self(ctx)
    }
}

/// An actor: identity plus continuation.
///
/// Owned by exactly one place at any instant: the run queue, the idle map,
/// or the worker currently resuming it. Moves between those owners are
/// pointer moves under the scheduler lock.
pub(crate) struct Actor {
    pub(crate) id: ActorId,
    pub(crate) parent: Option<ActorId>,
    pub(crate) body: Box<dyn ActorBody>,
}

impl fmt::Debug for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Actor")
            .field("id", &self.id)
            .field("parent", &self.parent)
            .finish_non_exhaustive()
    }
}

/// Execution context handed to a body for the duration of one slice.
///
/// Borrows the pool's shared core; an actor can therefore never outlive
/// the pool it runs on.
pub struct ActorContext<'a> {
    core: &'a PoolCore,
    id: ActorId,
    parent: Option<ActorId>,
}

impl<'a> ActorContext<'a> {
    pub(crate) fn new(core: &'a PoolCore, id: ActorId, parent: Option<ActorId>) -> Self {
        ActorContext { core, id, parent }
    }

    /// Id of the actor being resumed.
    pub fn actor_id(&self) -> ActorId {
        self.id
    }

    /// Id of the parent actor, if this actor was hatched from within
    /// another actor.
    pub fn parent_id(&self) -> Option<ActorId> {
        self.parent
    }

    /// Pop the next message from this actor's mailbox, if any.
    ///
    /// Returning `None` is the cue to end the slice with
    /// [`Turn::AwaitMail`].
    pub fn try_recv(&mut self) -> Option<Message> {
        self.core.hub().try_pop(self.id)
    }

    /// Send `payload` to `dst`, stamped with this actor's id as source.
    ///
    /// Consumes the payload, so after the call the sender holds no
    /// reference to it. Returns immediately; if `dst` has terminated the
    /// message is dropped silently.
    pub fn send<T: Any + Send>(&self, dst: ActorId, payload: T) {
        let mut msg = Message::user(payload);
        msg.src = self.id;
        self.core.route(dst, msg);
    }

    /// Hatch a child actor; the parent link points at this actor, so it
    /// will receive a `Died` notice when the child terminates.
    pub fn hatch(&self, body: impl ActorBody) -> ActorId {
        self.core.hatch_with_parent(Some(self.id), Box::new(body))
    }
}
