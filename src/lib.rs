//! CSP-style buffered channels with multi-way `select` across OS threads.
//!
//! A channel is a bounded FIFO of tagged [`Value`]s, named by an integer
//! descriptor handed out by [`make`]. You can `send`/`recv` on one channel,
//! or hand a mixed set of send and receive candidates to [`select`] and let
//! it atomically pick whichever becomes ready first — that's the part this
//! crate actually exists for; single-channel send/recv are just a select of
//! size one underneath (see `select.rs`).
//!
//! ```
//! use chansel::{make, send, recv, Value};
//!
//! let cd = make(1).unwrap();
//! send(cd, Value::Int64(7)).unwrap();
//! assert_eq!(recv(cd).unwrap(), Value::Int64(7));
//! ```
//!
//! No unbuffered channels, no close-observable-to-readers semantics, no
//! timeouts or cancellation — see `DESIGN.md` for what's deliberately out
//! of scope and why.

mod api;
mod channel;
mod error;
/// The literal C-style calling surface (§6): same operations, `int`-style
/// return-value encodings instead of `Result`.
pub mod raw;
mod ring;
mod select;
mod table;
mod token;
mod util;
mod value;
mod waitqueue;

pub use api::{cap, close, init, init_with, len, make, recv, recv_nb, select, send, send_nb};
pub use error::ChannelError;
pub use select::{Completed, SelectOp, SelectOutcome};
pub use table::Config;
pub use value::{Value, ValueTag};
