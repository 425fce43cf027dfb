//! Channel descriptor table and process-wide singletons (§4.5, §6).
//!
//! Descriptor 0 is the reserved sentinel; live channels get 1, 2, 3, ...
//! monotonically and a descriptor is never reused once assigned, matching
//! the source's `chpool.c`. The table also owns the token pool, since both
//! are the two pieces of process-wide state `init()` is responsible for.

use std::sync::{Arc, Mutex, OnceLock};

use crate::channel::Channel;
use crate::error::ChannelError;
use crate::token::TokenPool;
use crate::util::lock_recover;

/// Process-wide knobs, replacing the source's compile-time constants
/// (`MAX_CHANNELS`, the condvar pool cap) with one documented, overridable
/// struct.
#[derive(Debug, Clone, Copy)]
pub struct Config {
    /// Upper bound on simultaneously live channels (descriptor 0 excluded).
    pub max_channels: usize,
    /// Upper bound on how many released tokens the pool keeps around.
    pub token_pool_max: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_channels: 100,
            token_pool_max: 64,
        }
    }
}

struct TableInner {
    channels: Vec<Option<Arc<Channel>>>,
    next: usize,
    max: usize,
}

pub(crate) struct Table {
    inner: Mutex<TableInner>,
    pool: TokenPool,
}

impl Table {
    fn new(config: Config) -> Self {
        Self {
            inner: Mutex::new(TableInner {
                channels: vec![None], // index 0: reserved sentinel
                next: 1,
                max: config.max_channels,
            }),
            pool: TokenPool::new(config.token_pool_max),
        }
    }
}

static TABLE: OnceLock<Table> = OnceLock::new();

/// Returns the process-wide table, lazily installing the default
/// [`Config`] if nobody called [`install`] yet (§4.8's "lazily
/// self-initializes" stance).
fn table() -> &'static Table {
    TABLE.get_or_init(|| Table::new(Config::default()))
}

/// Installs `config` as the process-wide table, if one hasn't been
/// installed yet. Idempotent: a second call (whether explicit or via the
/// lazy default) is a harmless no-op, matching `init()`'s "0 on success"
/// contract — there is no failure mode to report.
pub(crate) fn install(config: Config) {
    let _ = TABLE.set(Table::new(config));
}

pub(crate) fn make(cap: usize) -> Result<i32, ChannelError> {
    if cap == 0 {
        return Err(ChannelError::InvalidCapacity(cap));
    }
    let table = table();
    let mut inner = lock_recover(table.inner.lock());
    if inner.next - 1 >= inner.max {
        return Err(ChannelError::TableExhausted { max: inner.max });
    }
    let cd = inner.next;
    inner.next += 1;
    if inner.channels.len() <= cd {
        inner.channels.resize(cd + 1, None);
    }
    inner.channels[cd] = Some(Arc::new(Channel::new(cap)));
    tracing::debug!(cd, cap, "channel created");
    Ok(cd as i32)
}

pub(crate) fn lookup(cd: i32) -> Option<Arc<Channel>> {
    if cd <= 0 {
        return None;
    }
    let table = table();
    let inner = lock_recover(table.inner.lock());
    inner.channels.get(cd as usize).and_then(|c| c.clone())
}

pub(crate) fn close(cd: i32) -> Result<(), ChannelError> {
    if cd <= 0 {
        return Err(ChannelError::UnknownDescriptor(cd));
    }
    let table = table();
    let mut inner = lock_recover(table.inner.lock());
    let slot = inner.channels.get(cd as usize);
    match slot.and_then(|c| c.as_ref()) {
        None => Err(ChannelError::UnknownDescriptor(cd)),
        Some(chan) => {
            let guard = lock_recover(chan.inner.lock());
            if guard.is_closeable() {
                drop(guard);
                inner.channels[cd as usize] = None;
                tracing::debug!(cd, "channel closed");
                Ok(())
            } else {
                Err(ChannelError::NotCloseable(cd))
            }
        }
    }
}

pub(crate) fn pool() -> &'static TokenPool {
    &table().pool
}
