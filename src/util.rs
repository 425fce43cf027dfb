//! Small shared helpers that don't belong to any one component.

use std::sync::{LockResult, MutexGuard};

/// Recovers a poisoned mutex guard instead of propagating the poison.
///
/// A lock only poisons if some other thread panicked while holding it,
/// which nothing in this crate's own code does. In debug builds that would
/// be a genuine bug, so we assert loudly; in release builds we recover the
/// guard's inner state and carry on rather than cascading the panic into
/// every other caller of this channel.
#[inline]
pub(crate) fn lock_recover<T>(result: LockResult<MutexGuard<'_, T>>) -> MutexGuard<'_, T> {
    match result {
        Ok(guard) => guard,
        Err(poisoned) => {
            debug_assert!(false, "a channel-library lock was poisoned by a prior panic");
            poisoned.into_inner()
        }
    }
}
