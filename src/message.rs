//! Message and identity types.

use std::any::Any;
use std::fmt;

/// Unique identifier of an actor within one pool.
///
/// Assigned monotonically at hatch time, starting at 1, and never reused
/// for the lifetime of the pool. Id 0 is reserved as the source of
/// runtime-originated messages (see [`ActorId::SYSTEM`]).
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub struct ActorId(u64);

impl ActorId {
    /// Source id stamped on runtime-originated messages such as
    /// [`Body::Died`]. No actor is ever hatched with this id.
    pub const SYSTEM: ActorId = ActorId(0);

    pub(crate) fn from_raw(raw: u64) -> Self {
        ActorId(raw)
    }

    /// The raw numeric id, mainly for logging and span fields.
    pub fn as_u64(self) -> u64 {
        self.0
    }

    /// Whether this is the reserved runtime source id.
    pub fn is_system(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Type-erased owned message payload.
pub type BoxedPayload = Box<dyn Any + Send>;

/// Contents of a delivered message.
pub enum Body {
    /// Application payload, downcast by the receiver.
    User(BoxedPayload),
    /// Runtime notification that actor `id` has terminated. Delivered to
    /// the terminated actor's parent with `src == ActorId::SYSTEM`.
    Died {
        /// Id of the actor that terminated.
        id: ActorId,
    },
}

/// A message as it sits in a mailbox: a payload plus the sender's id.
///
/// Ownership transfers from the sender to the mailbox to the next receiver;
/// the runtime stamps `src` on the way in, so user code never fabricates it.
pub struct Message {
    /// Id of the sending actor; [`ActorId::SYSTEM`] for runtime messages
    /// and external posts.
    pub src: ActorId,
    /// The payload.
    pub body: Body,
}

impl Message {
    /// Wrap a user payload. The source id is stamped by the runtime when
    /// the message is routed.
    pub fn user<T: Any + Send>(payload: T) -> Self {
        Message {
            src: ActorId::SYSTEM,
            body: Body::User(Box::new(payload)),
        }
    }

    /// Build the death notice for a terminated actor.
    pub(crate) fn died(id: ActorId) -> Self {
        Message {
            src: ActorId::SYSTEM,
            body: Body::Died { id },
        }
    }

    /// If this is a death notice, the id of the dead actor.
    pub fn died_id(&self) -> Option<ActorId> {
        match self.body {
            Body::Died { id } => Some(id),
            Body::User(_) => None,
        }
    }

    /// Borrow the user payload as `T`, if the types match.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        match &self.body {
            Body::User(payload) => payload.downcast_ref::<T>(),
            Body::Died { .. } => None,
        }
    }

    /// Take the user payload as `T`, handing the message back on mismatch.
    pub fn downcast<T: Any>(self) -> Result<T, Message> {
        match self.body {
            Body::User(payload) => match payload.downcast::<T>() {
                Ok(value) => Ok(*value),
                Err(payload) => Err(Message {
                    src: self.src,
                    body: Body::User(payload),
                }),
            },
            body @ Body::Died { .. } => Err(Message {
                src: self.src,
                body,
            }),
        }
    }
}

impl fmt::Debug for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.body {
            Body::User(_) => f
                .debug_struct("Message")
                .field("src", &self.src)
                .field("body", &"User(..)")
                .finish(),
            Body::Died { id } => f
                .debug_struct("Message")
                .field("src", &self.src)
                .field("died", id)
                .finish(),
        }
    }
}
