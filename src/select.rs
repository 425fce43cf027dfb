//! The select engine (§4.6) — the heart of the crate.
//!
//! Everything else exists to serve this: a single-channel `send`/`recv` is
//! just a one-op select, and the multi-way case is what makes the channel
//! genuinely CSP-style instead of a plain blocking queue.

use std::cell::RefCell;
use std::sync::{Arc, MutexGuard};

use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::channel::{Channel, ChannelInner};
use crate::error::ChannelError;
use crate::table;
use crate::value::Value;

thread_local! {
    // Seeded once per thread rather than reseeded on every select() call —
    // reseeding from the wall clock each time (as the C source does with
    // `srand(time(NULL))`) is both slow and a well-known source of bias
    // when calls land in the same clock tick.
    static RNG: RefCell<SmallRng> = RefCell::new(SmallRng::from_entropy());
}

/// One candidate operation in a select set.
#[derive(Debug, Clone, Copy)]
pub enum SelectOp {
    Send { cd: i32, value: Value },
    Recv { cd: i32 },
}

impl SelectOp {
    fn cd(&self) -> i32 {
        match *self {
            SelectOp::Send { cd, .. } => cd,
            SelectOp::Recv { cd } => cd,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum OpKind {
    Send,
    Recv,
}

/// The op that completed, and the value read if it was a `Recv`.
#[derive(Debug, Clone, Copy)]
pub struct Completed {
    pub cd: i32,
    pub value: Option<Value>,
}

#[derive(Debug, Clone, Copy)]
pub enum SelectOutcome {
    Completed(Completed),
    /// Nothing was ready and `should_block` was `false`, or `ops` was empty.
    WouldBlock,
}

/// Atomically chooses at most one ready operation among `ops`. Blocks the
/// caller until one becomes ready when `should_block` is true.
///
/// Returns `Err(ChannelError::UnknownDescriptor(cd))` if any referenced
/// channel doesn't exist — callers that want the legacy `-cd` integer
/// encoding should go through [`crate::raw::select`] instead.
pub fn select(ops: &mut [SelectOp], should_block: bool) -> Result<SelectOutcome, ChannelError> {
    select_inner(ops, should_block)
}

fn select_inner(ops: &mut [SelectOp], should_block: bool) -> Result<SelectOutcome, ChannelError> {
    if ops.is_empty() {
        return Ok(SelectOutcome::WouldBlock);
    }

    // Step 2: the sole source of fairness when several ops are ready at once.
    if ops.len() > 1 {
        RNG.with(|rng| ops.shuffle(&mut *rng.borrow_mut()));
    }

    // Step 3: ascending lock order over the *distinct* channels referenced,
    // so two concurrent selects sharing channels never deadlock against
    // each other.
    let mut lock_order: Vec<i32> = ops.iter().map(SelectOp::cd).collect();
    lock_order.sort_unstable();
    lock_order.dedup();

    let mut channels: Vec<(i32, Arc<Channel>)> = Vec::with_capacity(lock_order.len());
    for cd in &lock_order {
        match table::lookup(*cd) {
            Some(chan) => channels.push((*cd, chan)),
            None => return Err(ChannelError::UnknownDescriptor(*cd)),
        }
    }

    let mut guards: Vec<(i32, MutexGuard<'_, ChannelInner>)> = Vec::with_capacity(channels.len());
    for (cd, chan) in &channels {
        guards.push((*cd, crate::util::lock_recover(chan.inner.lock())));
    }

    let thread = std::thread::current().id();

    // Step 4: try phase, in the (possibly shuffled) op order.
    for op in ops.iter() {
        let cd = op.cd();
        let idx = guards
            .iter()
            .position(|(c, _)| *c == cd)
            .expect("every op's channel was locked above");
        let guard = &mut guards[idx].1;

        match *op {
            SelectOp::Send { value, .. } => {
                if guard.try_send(thread, value) {
                    wake_counterpart(guard, OpKind::Send, cd);
                    drop(guards);
                    tracing::trace!(cd, "select: send completed without blocking");
                    return Ok(SelectOutcome::Completed(Completed { cd, value: None }));
                }
            }
            SelectOp::Recv { .. } => {
                if let Some(v) = guard.try_recv(thread) {
                    wake_counterpart(guard, OpKind::Recv, cd);
                    drop(guards);
                    tracing::trace!(cd, "select: recv completed without blocking");
                    return Ok(SelectOutcome::Completed(Completed {
                        cd,
                        value: Some(v),
                    }));
                }
            }
        }
    }

    // Step 5.
    if !should_block {
        drop(guards);
        return Ok(SelectOutcome::WouldBlock);
    }

    // Step 6: park phase. One token, enqueued on every candidate's wait
    // queue, shared via `Arc` and kept alive by a protocol refcount that is
    // distinct from `Arc`'s own strong count (see `DESIGN.md`).
    let pool = table::pool();
    let token = pool.acquire();
    token.inc_ref(); // the caller's own hold, released in step 7 below

    for op in ops.iter() {
        let cd = op.cd();
        let idx = guards.iter().position(|(c, _)| *c == cd).unwrap();
        let guard = &mut guards[idx].1;
        token.inc_ref();
        match op {
            SelectOp::Send { .. } => guard.sendq.enqueue(Arc::clone(&token)),
            SelectOp::Recv { .. } => guard.recvq.enqueue(Arc::clone(&token)),
        }
    }
    drop(guards); // release every channel lock before blocking

    tracing::trace!(n = ops.len(), "select: parked, waiting for a counterpart");

    // Step 7.
    let won_cd = token.wait_for_claim();
    if token.dec_ref() {
        pool.release(token);
    }

    // Step 8: retry just the winning op, guaranteed to succeed on the first
    // try because wake-counterpart reserved a shift slot for us.
    let idx = ops
        .iter()
        .position(|op| op.cd() == won_cd)
        .expect("a waker only ever claims a cd present in this select's ops");
    select_inner(std::slice::from_mut(&mut ops[idx]), true)
}

/// Delivers the completion opportunity to at most one parked participant on
/// the opposite wait queue. Called holding `chan`'s mutex, right after a
/// successful try.
fn wake_counterpart(chan: &mut ChannelInner, kind_just_completed: OpKind, cd: i32) {
    loop {
        let tok = match kind_just_completed {
            OpKind::Send => {
                if chan.recv_shift.is_some() {
                    break;
                }
                match chan.recvq.dequeue() {
                    Some(t) => t,
                    None => break,
                }
            }
            OpKind::Recv => {
                if chan.send_shift.is_some() {
                    break;
                }
                match chan.sendq.dequeue() {
                    Some(t) => t,
                    None => break,
                }
            }
        };

        if tok.try_claim(cd) {
            match kind_just_completed {
                OpKind::Send => chan.recv_shift = Some(tok.thread()),
                OpKind::Recv => chan.send_shift = Some(tok.thread()),
            }
            tok.signal();
            // This dequeue's own enqueue hold is spent now that the token is
            // claimed — transfer it away so the waiter's final `dec_ref` in
            // step 7 is the one that actually drives the count to 0.
            if tok.dec_ref() {
                table::pool().release(tok);
            }
            break;
        } else if tok.dec_ref() {
            table::pool().release(tok);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_on_capacity_one_channel() {
        let cd = table::make(1).unwrap();
        let mut send = [SelectOp::Send {
            cd,
            value: Value::Int64(99),
        }];
        let out = select(&mut send, true).unwrap();
        assert!(matches!(
            out,
            SelectOutcome::Completed(Completed { value: None, .. })
        ));

        let mut recv = [SelectOp::Recv { cd }];
        match select(&mut recv, true).unwrap() {
            SelectOutcome::Completed(Completed { value: Some(v), .. }) => {
                assert_eq!(v, Value::Int64(99))
            }
            other => panic!("expected a completed recv, got {other:?}"),
        }
    }

    #[test]
    fn non_blocking_send_would_block_when_full() {
        let cd = table::make(1).unwrap();
        let mut first = [SelectOp::Send {
            cd,
            value: Value::Int8(1),
        }];
        assert!(matches!(
            select(&mut first, false).unwrap(),
            SelectOutcome::Completed(_)
        ));

        let mut second = [SelectOp::Send {
            cd,
            value: Value::Int8(2),
        }];
        assert!(matches!(
            select(&mut second, false).unwrap(),
            SelectOutcome::WouldBlock
        ));
    }

    #[test]
    fn non_blocking_recv_would_block_when_empty() {
        let cd = table::make(1).unwrap();
        let mut ops = [SelectOp::Recv { cd }];
        assert!(matches!(
            select(&mut ops, false).unwrap(),
            SelectOutcome::WouldBlock
        ));
    }

    #[test]
    fn unknown_descriptor_is_reported() {
        let mut ops = [SelectOp::Recv { cd: 987_654 }];
        assert!(matches!(
            select(&mut ops, false),
            Err(ChannelError::UnknownDescriptor(987_654))
        ));
    }

    #[test]
    fn empty_op_set_would_block() {
        let mut ops: [SelectOp; 0] = [];
        assert!(matches!(
            select(&mut ops, true).unwrap(),
            SelectOutcome::WouldBlock
        ));
    }

    #[test]
    fn multi_channel_select_picks_the_ready_side() {
        let a = table::make(1).unwrap();
        let b = table::make(1).unwrap();
        let mut preload = [SelectOp::Send {
            cd: a,
            value: Value::Int32(5),
        }];
        select(&mut preload, true).unwrap();

        let mut ops = [SelectOp::Recv { cd: a }, SelectOp::Recv { cd: b }];
        match select(&mut ops, true).unwrap() {
            SelectOutcome::Completed(Completed { cd, value }) => {
                assert_eq!(cd, a);
                assert_eq!(value, Some(Value::Int32(5)));
            }
            SelectOutcome::WouldBlock => panic!("expected channel a to be ready"),
        }
    }
}
