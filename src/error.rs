//! Crate-wide error taxonomy (§7 of the design doc).
//!
//! The descriptor-shaped public surface still returns the historical
//! `cd` / `0` / `-cd` encodings for compatibility, but everything underneath
//! threads a typed `Result` so call sites can match on a real error instead
//! of guessing at a sentinel integer.

use thiserror::Error;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ChannelError {
    #[error("channel descriptor {0} does not name a live channel")]
    UnknownDescriptor(i32),

    #[error("channel table is full (max {max} channels)")]
    TableExhausted { max: usize },

    #[error("channel {0} has parked participants or a shift reservation, not closeable")]
    NotCloseable(i32),

    #[error("capacity must be at least 1, got {0}")]
    InvalidCapacity(usize),

    /// Surfaced only if a prior panic poisoned a lock this call needed.
    /// In practice the engine recovers the guard's inner state instead of
    /// propagating this (see [`crate::util::lock_recover`]), so this
    /// variant exists to complete the taxonomy rather than being returned
    /// from ordinary operation.
    #[error("an internal lock was poisoned by a prior panic")]
    LockPoisoned,
}
