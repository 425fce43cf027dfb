//! Public surface (§4.7, §6): `init`, `make`, `close`, `send`/`recv` and
//! their non-blocking variants, `select`, `cap`, `len`.
//!
//! This is the idiomatic, typed entry point — `Result`s and a real error
//! enum instead of sentinel integers. Callers that specifically want the
//! source's literal `cd` / `0` / `-cd` return-value encoding (e.g. when
//! wiring this crate up behind an FFI boundary that expects `int`) should
//! use [`crate::raw`] instead, which is built on top of this module.

use crate::error::ChannelError;
use crate::select::{self, Completed, SelectOp, SelectOutcome};
use crate::table::{self, Config};
use crate::value::Value;

/// Installs process-wide state with a non-default [`Config`]. Idempotent:
/// if something (including a prior lazy default) already installed the
/// table, this is a no-op. Calling this is optional — every other function
/// in this module lazily installs [`Config::default`] on first use.
pub fn init_with(config: Config) {
    table::install(config);
}

/// Installs process-wide state with [`Config::default`]. Equivalent to
/// letting the first [`make`]/[`send`]/[`recv`]/[`select`] call do it
/// lazily, spelled out for callers who want an explicit startup step.
pub fn init() {
    table::install(Config::default());
}

/// Creates a channel of the given capacity, returning its descriptor.
pub fn make(cap: usize) -> Result<i32, ChannelError> {
    table::make(cap)
}

/// Closes a channel if it has no parked participants or shift
/// reservations. See `DESIGN.md` for the chosen stance on buffered-but-
/// undelivered values.
pub fn close(cd: i32) -> Result<(), ChannelError> {
    table::close(cd)
}

/// Blocking send.
pub fn send(cd: i32, value: Value) -> Result<(), ChannelError> {
    match select_send(cd, value, true)? {
        SelectOutcome::Completed(_) => Ok(()),
        SelectOutcome::WouldBlock => unreachable!("blocking select cannot report WouldBlock"),
    }
}

/// Non-blocking send. Returns `Ok(false)` if the channel was full.
pub fn send_nb(cd: i32, value: Value) -> Result<bool, ChannelError> {
    match select_send(cd, value, false)? {
        SelectOutcome::Completed(_) => Ok(true),
        SelectOutcome::WouldBlock => Ok(false),
    }
}

/// Blocking receive.
pub fn recv(cd: i32) -> Result<Value, ChannelError> {
    match select_recv(cd, true)? {
        SelectOutcome::Completed(Completed { value: Some(v), .. }) => Ok(v),
        SelectOutcome::Completed(Completed { value: None, .. }) => {
            unreachable!("a completed recv always carries a value")
        }
        SelectOutcome::WouldBlock => unreachable!("blocking select cannot report WouldBlock"),
    }
}

/// Non-blocking receive. Returns `Ok(None)` if the channel was empty.
pub fn recv_nb(cd: i32) -> Result<Option<Value>, ChannelError> {
    match select_recv(cd, false)? {
        SelectOutcome::Completed(Completed { value, .. }) => Ok(value),
        SelectOutcome::WouldBlock => Ok(None),
    }
}

/// Multi-way select over `ops` (§4.6). See [`crate::select::select`] for
/// the full algorithm description.
pub fn select(ops: &mut [SelectOp], should_block: bool) -> Result<SelectOutcome, ChannelError> {
    select::select(ops, should_block)
}

/// The channel's fixed capacity, or 0 if `cd` doesn't name a live channel.
pub fn cap(cd: i32) -> usize {
    table::lookup(cd).map(|chan| chan.cap()).unwrap_or(0)
}

/// A snapshot of the channel's current occupancy, or 0 if `cd` doesn't
/// name a live channel. Like the source, this is a point-in-time read
/// under the channel mutex — by the time the caller observes it, another
/// thread may already have changed it.
pub fn len(cd: i32) -> usize {
    table::lookup(cd)
        .map(|chan| crate::util::lock_recover(chan.inner.lock()).buffer.len())
        .unwrap_or(0)
}

fn select_send(cd: i32, value: Value, block: bool) -> Result<SelectOutcome, ChannelError> {
    let mut ops = [SelectOp::Send { cd, value }];
    select::select(&mut ops, block)
}

fn select_recv(cd: i32, block: bool) -> Result<SelectOutcome, ChannelError> {
    let mut ops = [SelectOp::Recv { cd }];
    select::select(&mut ops, block)
}
