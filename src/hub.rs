//! Registry mapping live actors to their mailboxes.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::trace;

use crate::error::HubError;
use crate::mailbox::Mailbox;
use crate::message::{ActorId, Message};

/// The mailbox index: `ActorId -> Mailbox` for every live actor.
///
/// Presence in the hub is the authoritative liveness signal: a mailbox
/// exists exactly from hatch to termination, and the pool's supervision
/// loop declares quiescence when the hub is empty.
///
/// # Locking
///
/// The index lock is held only to locate (or fail to locate) a mailbox;
/// the returned handle is ref-counted, so delivery enqueues under the
/// mailbox's own lock with the index free. `unregister` removes the entry
/// first; senders that already hold a handle finish against the orphaned
/// mailbox, whose queued messages are discarded when the last handle drops.
pub struct MailHub {
    index: Mutex<HashMap<ActorId, Arc<Mailbox>>>,
}

impl MailHub {
    pub fn new() -> Self {
        MailHub {
            index: Mutex::new(HashMap::new()),
        }
    }

    /// Create an empty mailbox for `id`.
    pub fn register(&self, id: ActorId) -> Result<(), HubError> {
        let mut index = self.index.lock();
        if index.contains_key(&id) {
            return Err(HubError::AlreadyRegistered(id));
        }
        index.insert(id, Arc::new(Mailbox::new(id)));
        Ok(())
    }

    /// Remove and drop the mailbox for `id`; queued messages are dropped.
    ///
    /// Must only be called by the worker that observed the actor's
    /// termination.
    pub fn unregister(&self, id: ActorId) -> Result<(), HubError> {
        let mut index = self.index.lock();
        match index.remove(&id) {
            Some(_) => Ok(()),
            None => Err(HubError::NotRegistered(id)),
        }
    }

    /// Fetch a handle to `id`'s mailbox, if the actor is live.
    pub fn lookup(&self, id: ActorId) -> Option<Arc<Mailbox>> {
        self.index.lock().get(&id).cloned()
    }

    /// Append `msg` to `dst`'s mailbox. Returns `false` if `dst` has no
    /// mailbox (the actor is dead or never existed) and the message was
    /// dropped. That outcome is a tolerated race, not an error: actor
    /// termination and in-flight sends cannot be ordered from the sender's
    /// side.
    pub fn deliver(&self, dst: ActorId, msg: Message) -> bool {
        match self.lookup(dst) {
            Some(mailbox) => {
                mailbox.push(msg);
                true
            }
            None => {
                trace!(target: "roost::hub", actor = dst.as_u64(), "message to absent mailbox dropped");
                false
            }
        }
    }

    /// Non-blocking pop of `id`'s head message. `None` if the mailbox is
    /// empty or absent.
    pub fn try_pop(&self, id: ActorId) -> Option<Message> {
        self.lookup(id)?.try_pop()
    }

    /// Whether `id`'s mailbox is empty. An absent mailbox counts as empty.
    pub fn is_empty(&self, id: ActorId) -> bool {
        match self.lookup(id) {
            Some(mailbox) => mailbox.is_empty(),
            None => true,
        }
    }

    /// Number of registered mailboxes, i.e. live actors.
    pub fn len(&self) -> usize {
        self.index.lock().len()
    }
}

impl Default for MailHub {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(raw: u64) -> ActorId {
        ActorId::from_raw(raw)
    }

    #[test]
    fn register_twice_fails() {
        let hub = MailHub::new();
        hub.register(id(1)).unwrap();
        assert_eq!(hub.register(id(1)), Err(HubError::AlreadyRegistered(id(1))));
        assert_eq!(hub.len(), 1);
    }

    #[test]
    fn unregister_absent_fails() {
        let hub = MailHub::new();
        assert_eq!(hub.unregister(id(9)), Err(HubError::NotRegistered(id(9))));
    }

    #[test]
    fn deliver_to_absent_drops() {
        let hub = MailHub::new();
        assert!(!hub.deliver(id(3), Message::user(1_u32)));
        assert!(hub.try_pop(id(3)).is_none());
    }

    #[test]
    fn deliver_and_pop_round_trip() {
        let hub = MailHub::new();
        hub.register(id(2)).unwrap();
        assert!(hub.deliver(id(2), Message::user(7_u32)));
        assert!(!hub.is_empty(id(2)));
        let msg = hub.try_pop(id(2)).unwrap();
        assert_eq!(msg.downcast::<u32>().unwrap(), 7);
        assert!(hub.is_empty(id(2)));
    }

    #[test]
    fn unregister_discards_queued_messages() {
        let hub = MailHub::new();
        hub.register(id(4)).unwrap();
        hub.deliver(id(4), Message::user(1_u32));
        hub.deliver(id(4), Message::user(2_u32));
        hub.unregister(id(4)).unwrap();
        assert_eq!(hub.len(), 0);
        // The id is gone; later sends drop silently.
        assert!(!hub.deliver(id(4), Message::user(3_u32)));
    }

    #[test]
    fn in_flight_handle_survives_unregister() {
        let hub = MailHub::new();
        hub.register(id(5)).unwrap();
        let handle = hub.lookup(id(5)).unwrap();
        hub.unregister(id(5)).unwrap();
        // A sender that grabbed the handle before unregister finishes its
        // enqueue against the orphaned mailbox; the message goes nowhere.
        handle.push(Message::user(1_u32));
        assert!(hub.lookup(id(5)).is_none());
    }
}
