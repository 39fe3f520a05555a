//! Configurable Snowflake-style identifiers.
//!
//! A snowflake packs four fields into one unsigned integer, most significant
//! first: the milliseconds elapsed since a configurable epoch, a worker id, a
//! process id, and a per-millisecond increment. The three low fields share a
//! fixed 22-bit budget whose split is configurable; the timestamp field is
//! unbounded, so values are carried as arbitrary-precision integers.
//!
//! - [`codec`] packs and unpacks fields and is stateless.
//! - [`BasicSequencer`] generates without locking. Fast, but the increment
//!   wraps without regard to the clock.
//! - [`LockSequencer`] serializes generation through a FIFO-fair async mutex
//!   and never emits a duplicate.
//! - [`Sequencer`] picks between the two from [`SnowflakeOptions`].
//!
//! ```
//! use flakeforge::{Sequencer, SnowflakeOptions};
//!
//! let generator = Sequencer::new(SnowflakeOptions::default()).unwrap();
//! let fields = generator.deconstruct("397282797158964394");
//!
//! assert_eq!(fields.timestamp_millis(), Some(1_514_790_000_000));
//! assert_eq!(fields.worker_id, 4);
//! assert_eq!(fields.process_id, 9);
//! assert_eq!(fields.increment, 3242);
//! ```

pub mod codec;
mod config;
mod error;
mod id;
mod sequencer;
#[cfg(feature = "serde")]
mod serde;
mod time;

pub use crate::codec::{BitLayout, Deconstructed};
pub use crate::config::*;
pub use crate::error::*;
pub use crate::id::*;
pub use crate::sequencer::*;
pub use crate::time::*;
