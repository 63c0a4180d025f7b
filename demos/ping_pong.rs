//! Two actors playing ping-pong, then a clean shutdown.
//!
//! Run with `cargo run --example ping_pong`.

use roost::{logging, stats, ActorBody, ActorContext, ActorId, Pool, Turn};

const ROUNDS: u32 = 5;

struct Ping(u32);
struct Pong(u32);

/// Replies `Pong(n)` to every `Ping(n)`; exits after the last round.
struct Ponger;

impl ActorBody for Ponger {
    fn resume(&mut self, ctx: &mut ActorContext<'_>) -> Turn {
        loop {
            let Some(msg) = ctx.try_recv() else {
                return Turn::AwaitMail;
            };
            let src = msg.src;
            if let Some(Ping(n)) = msg.downcast_ref::<Ping>() {
                let n = *n;
                println!("ponger got ping {n}");
                ctx.send(src, Pong(n));
                if n + 1 == ROUNDS {
                    return Turn::Exit;
                }
            }
        }
    }
}

/// Drives the rally and collects the ponger's death notice at the end.
struct Pinger {
    peer: Option<ActorId>,
}

impl ActorBody for Pinger {
    fn resume(&mut self, ctx: &mut ActorContext<'_>) -> Turn {
        if self.peer.is_none() {
            let peer = ctx.hatch(Ponger);
            ctx.send(peer, Ping(0));
            self.peer = Some(peer);
        }
        loop {
            let Some(msg) = ctx.try_recv() else {
                return Turn::AwaitMail;
            };
            if let Some(Pong(n)) = msg.downcast_ref::<Pong>() {
                let n = *n;
                println!("pinger got pong {n}");
                if n + 1 < ROUNDS {
                    ctx.send(msg.src, Ping(n + 1));
                }
            } else if let Some(id) = msg.died_id() {
                println!("peer {id} is done");
                return Turn::Exit;
            }
        }
    }
}

fn main() {
    logging::init_default();

    let mut pool = Pool::new(2).expect("failed to start pool");
    pool.hatch(Pinger { peer: None });
    pool.run();

    let snapshot = stats::snapshot();
    println!(
        "hatched {} actors, moved {} messages",
        snapshot.actors_hatched, snapshot.messages_sent
    );
}
