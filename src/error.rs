use std::io;
use thiserror::Error;

use crate::message::ActorId;

/// Errors related to the mailbox registry.
///
/// Both variants indicate a broken runtime invariant rather than a routine
/// condition: ids are allocated from a monotonic counter and unregistered
/// exactly once, by the worker that observed the actor's termination.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HubError {
    #[error("mailbox already registered for actor {0}")]
    AlreadyRegistered(ActorId),
    #[error("no mailbox registered for actor {0}")]
    NotRegistered(ActorId),
}

/// Errors related to pool construction and lifecycle.
///
/// Note what is *not* here: sending to a terminated actor is a tolerated
/// race (the message is dropped silently), and a failed wake-fd write is
/// retried on EINTR and otherwise ignored.
#[derive(Error, Debug)]
pub enum PoolError {
    #[error("worker thread setup failed: {0}")]
    ThreadSetup(#[from] io::Error),
    #[error("internal runtime error: {0}")]
    Other(#[from] anyhow::Error),
}
