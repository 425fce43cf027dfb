//! The literal C-style calling surface from §6's table: every function
//! returns the source's historical `int` encoding (`cd` on success, `0`
//! for "would block" or an empty op set, `-cd` for an unknown descriptor)
//! instead of a typed `Result`. Meant for callers porting code that already
//! speaks that convention, or for wiring this crate up behind `extern "C"`;
//! ordinary Rust callers should prefer [`crate::api`].

use crate::error::ChannelError;
use crate::select::{Completed, SelectOp, SelectOutcome};
use crate::value::Value;

/// `init()` — always succeeds.
pub fn init() -> i32 {
    crate::api::init();
    0
}

/// `make(cap) -> cd`. Returns 0 on allocation failure (capacity 0 or the
/// descriptor table is full), matching §7 item 5.
pub fn make(cap: usize) -> i32 {
    crate::api::make(cap).unwrap_or(0)
}

/// `close(cd) -> 0 | -1`.
pub fn close(cd: i32) -> i32 {
    match crate::api::close(cd) {
        Ok(()) => 0,
        Err(_) => -1,
    }
}

/// `send(cd, v) -> cd | -cd`. Blocks until the send completes or the
/// descriptor is discovered to be unknown.
pub fn send(cd: i32, value: Value) -> i32 {
    encode_send(crate::select::select(&mut [SelectOp::Send { cd, value }], true))
}

/// `send_nb(cd, v) -> cd | 0 | -cd`.
pub fn send_nb(cd: i32, value: Value) -> i32 {
    encode_send(crate::select::select(
        &mut [SelectOp::Send { cd, value }],
        false,
    ))
}

/// `recv(cd) -> (cd | 0 | -cd, value)`. There is no pointer-output
/// parameter in this rendering — the value travels back alongside the
/// encoded result instead of through a caller-supplied `any_t *`.
pub fn recv(cd: i32) -> (i32, Option<Value>) {
    encode_recv(crate::select::select(&mut [SelectOp::Recv { cd }], true))
}

/// `recv_nb(cd) -> (cd | 0 | -cd, value)`.
pub fn recv_nb(cd: i32) -> (i32, Option<Value>) {
    encode_recv(crate::select::select(&mut [SelectOp::Recv { cd }], false))
}

/// `select(ops[], n, block) -> cd | 0 | -cd`, plus the received value (if
/// any) for whichever op completed.
pub fn select(ops: &mut [SelectOp], should_block: bool) -> (i32, Option<Value>) {
    encode_recv(crate::select::select(ops, should_block))
}

/// `cap(cd)`.
pub fn cap(cd: i32) -> usize {
    crate::api::cap(cd)
}

/// `len(cd)`.
pub fn len(cd: i32) -> usize {
    crate::api::len(cd)
}

fn encode_send(result: Result<SelectOutcome, ChannelError>) -> i32 {
    match result {
        Ok(SelectOutcome::Completed(Completed { cd, .. })) => cd,
        Ok(SelectOutcome::WouldBlock) => 0,
        Err(ChannelError::UnknownDescriptor(missing)) => -missing,
        Err(_) => 0,
    }
}

fn encode_recv(result: Result<SelectOutcome, ChannelError>) -> (i32, Option<Value>) {
    match result {
        Ok(SelectOutcome::Completed(Completed { cd, value })) => (cd, value),
        Ok(SelectOutcome::WouldBlock) => (0, None),
        Err(ChannelError::UnknownDescriptor(missing)) => (-missing, None),
        Err(_) => (0, None),
    }
}
