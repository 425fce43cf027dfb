//! Parking token and its pool (§4.3).
//!
//! A token is the shared rendezvous object a blocked select parks on. It may
//! be linked into several channels' wait queues at once, so its lifetime is
//! governed by an atomic reference count rather than ordinary ownership: the
//! count tracks "one hold per wait-queue enqueue plus one for the waiter
//! itself", not Rust's own `Arc` strong count (see `DESIGN.md`). The claim
//! field (`cd`) is a one-shot CAS slot: whichever channel's wake-counterpart
//! wins the race writes its descriptor there exactly once.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicI32, AtomicUsize, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::thread::ThreadId;

use crate::util::lock_recover;

/// Sentinel meaning "not yet claimed by any channel". Descriptor 0 is the
/// table's reserved/unused slot, so it doubles as a safe "no channel" value.
pub(crate) const CLAIM_NONE: i32 = 0;

pub(crate) struct Token {
    guard: Mutex<()>,
    cond: Condvar,
    claim: AtomicI32,
    refcount: AtomicUsize,
    thread: ThreadId,
}

impl Token {
    fn new() -> Self {
        Self {
            guard: Mutex::new(()),
            cond: Condvar::new(),
            claim: AtomicI32::new(CLAIM_NONE),
            refcount: AtomicUsize::new(0),
            thread: std::thread::current().id(),
        }
    }

    /// Resets the atomic fields for reuse from the pool. Only valid to call
    /// when no other select still holds a clone of the surrounding `Arc`
    /// (the pool enforces this before calling in).
    fn reset_for_reuse(&mut self) {
        *self.claim.get_mut() = CLAIM_NONE;
        *self.refcount.get_mut() = 0;
        self.thread = std::thread::current().id();
    }

    pub fn thread(&self) -> ThreadId {
        self.thread
    }

    pub fn inc_ref(&self) {
        self.refcount.fetch_add(1, Ordering::AcqRel);
    }

    /// Decrements the protocol refcount. Returns `true` if this was the last
    /// hold, meaning the caller must release the token back to the pool.
    #[must_use]
    pub fn dec_ref(&self) -> bool {
        self.refcount.fetch_sub(1, Ordering::AcqRel) == 1
    }

    /// Attempts to atomically claim this token for `cd`. Only one caller
    /// across all channels this token is parked on will ever see `true`.
    #[must_use]
    pub fn try_claim(&self, cd: i32) -> bool {
        self.claim
            .compare_exchange(CLAIM_NONE, cd, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Wakes whichever thread is parked in [`Token::wait_for_claim`].
    pub fn signal(&self) {
        let _guard = lock_recover(self.guard.lock());
        self.cond.notify_one();
    }

    /// Blocks until some channel claims this token, then returns the
    /// winning descriptor.
    pub fn wait_for_claim(&self) -> i32 {
        let mut guard = lock_recover(self.guard.lock());
        loop {
            let cd = self.claim.load(Ordering::Acquire);
            if cd != CLAIM_NONE {
                return cd;
            }
            guard = lock_recover(self.cond.wait(guard));
        }
    }

    #[cfg(test)]
    pub(crate) fn for_test() -> Self {
        Self::new()
    }
}

/// Bounded free-list of released tokens (§4.3, mirrors `cvpool.c`).
pub(crate) struct TokenPool {
    free: Mutex<VecDeque<Arc<Token>>>,
    max: usize,
}

impl TokenPool {
    pub fn new(max: usize) -> Self {
        Self {
            free: Mutex::new(VecDeque::new()),
            max,
        }
    }

    pub fn acquire(&self) -> Arc<Token> {
        let mut free = lock_recover(self.free.lock());
        match free.pop_front() {
            Some(mut tok) => {
                if let Some(inner) = Arc::get_mut(&mut tok) {
                    inner.reset_for_reuse();
                } else {
                    // Should be unreachable: a token only returns to the
                    // pool once its last outstanding clone is being handed
                    // back. Fresh allocation keeps us correct either way.
                    debug_assert!(false, "pooled token still has outstanding clones");
                    return Arc::new(Token::new());
                }
                tok
            }
            None => Arc::new(Token::new()),
        }
    }

    pub fn release(&self, tok: Arc<Token>) {
        debug_assert_eq!(
            tok.refcount.load(Ordering::Acquire),
            0,
            "token released to the pool with outstanding holds"
        );
        let mut free = lock_recover(self.free.lock());
        if free.len() < self.max {
            free.push_back(tok);
        }
        // else: drop here, freeing it — mirrors `release_condvar`'s
        // free-when-pool-is-full branch.
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reused_token_has_reset_state() {
        let pool = TokenPool::new(4);
        let tok = pool.acquire();
        tok.inc_ref();
        assert!(tok.try_claim(7));
        assert!(tok.dec_ref());
        pool.release(tok);

        let tok2 = pool.acquire();
        assert_eq!(tok2.claim.load(Ordering::Acquire), CLAIM_NONE);
        assert_eq!(tok2.refcount.load(Ordering::Acquire), 0);
    }

    #[test]
    fn pool_frees_beyond_max_instead_of_growing_unbounded() {
        let pool = TokenPool::new(1);
        let a = pool.acquire();
        let b = pool.acquire();
        pool.release(a);
        pool.release(b); // pool already has one, this one is simply dropped
        assert_eq!(lock_recover(pool.free.lock()).len(), 1);
    }

    #[test]
    fn claim_is_one_shot() {
        let tok = Token::for_test();
        assert!(tok.try_claim(3));
        assert!(!tok.try_claim(4));
        assert_eq!(tok.claim.load(Ordering::Acquire), 3);
    }
}
