//! A single channel: ring buffer, two wait queues, two shift slots, one
//! mutex (§4.4). Everything in [`ChannelInner`] is only ever touched while
//! the surrounding [`Channel::inner`] mutex is held — the select engine is
//! the sole caller of `try_send`/`try_recv`/`is_closeable`, always under
//! that lock.

use std::sync::Mutex;
use std::thread::ThreadId;

use crate::ring::RingBuffer;
use crate::value::Value;
use crate::waitqueue::WaitQueue;

pub(crate) struct ChannelInner {
    pub(crate) buffer: RingBuffer<Value>,
    pub(crate) sendq: WaitQueue,
    pub(crate) recvq: WaitQueue,
    pub(crate) send_shift: Option<ThreadId>,
    pub(crate) recv_shift: Option<ThreadId>,
}

impl ChannelInner {
    /// Permitted iff `send_shift` is unset or names the calling thread.
    /// Clears the shift on a successful write if it was this thread's turn.
    pub fn try_send(&mut self, thread: ThreadId, v: Value) -> bool {
        let permitted = self.send_shift.map_or(true, |owner| owner == thread);
        if !permitted {
            return false;
        }
        let wrote = self.buffer.write(v);
        if wrote && self.send_shift.is_some() {
            self.send_shift = None;
        }
        wrote
    }

    /// Symmetric to `try_send` on `recv_shift` and buffer-nonempty.
    pub fn try_recv(&mut self, thread: ThreadId) -> Option<Value> {
        let permitted = self.recv_shift.map_or(true, |owner| owner == thread);
        if !permitted {
            return None;
        }
        let v = self.buffer.read();
        if v.is_some() && self.recv_shift.is_some() {
            self.recv_shift = None;
        }
        v
    }

    /// True iff both wait queues are empty and both shift slots are nil.
    /// Deliberately does **not** examine buffer occupancy — see
    /// `DESIGN.md`'s note on the closeability stance this crate takes.
    pub fn is_closeable(&self) -> bool {
        self.send_shift.is_none()
            && self.recv_shift.is_none()
            && self.sendq.is_empty()
            && self.recvq.is_empty()
    }
}

pub(crate) struct Channel {
    pub(crate) inner: Mutex<ChannelInner>,
    cap: usize,
}

impl Channel {
    pub fn new(cap: usize) -> Self {
        Self {
            inner: Mutex::new(ChannelInner {
                buffer: RingBuffer::new(cap),
                sendq: WaitQueue::default(),
                recvq: WaitQueue::default(),
                send_shift: None,
                recv_shift: None,
            }),
            cap,
        }
    }

    pub fn cap(&self) -> usize {
        self.cap
    }
}
