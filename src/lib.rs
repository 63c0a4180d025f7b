//! Roost is a lightweight, in-process actor runtime.
//!
//! A fixed pool of OS worker threads cooperatively executes actor
//! continuations. Each actor owns a FIFO mailbox; message passing is the
//! only synchronization primitive exposed to user code. An actor's body is
//! resumed one slice at a time and tells the scheduler what to do next by
//! returning a [`Turn`]: wait for mail, yield the worker, park, or exit.
//!
//! ```no_run
//! use roost::{ActorContext, Pool, Turn};
//!
//! let mut pool = Pool::new(2).unwrap();
//! pool.hatch(|ctx: &mut ActorContext<'_>| match ctx.try_recv() {
//!     Some(msg) => {
//!         println!("got mail from {}", msg.src);
//!         Turn::Exit
//!     }
//!     None => Turn::AwaitMail,
//! });
//! pool.run();
//! ```

pub mod actor;
pub mod config;
pub mod error;
pub mod hub;
pub mod logging;
pub mod mailbox;
pub mod message;
pub mod pool;
pub mod stats;

mod scheduler;

// Re-export key types for easier usage
pub use actor::{ActorBody, ActorContext, Turn};
pub use config::PoolConfig;
pub use error::{HubError, PoolError};
pub use hub::MailHub;
pub use mailbox::Mailbox;
pub use message::{ActorId, Body, Message};
pub use pool::{Pool, PoolMetrics};
