//! Run queue: one entry per (profile, round) unit of work.
//!
//! Entries are created in bulk at run start in round-major order and are
//! only ever transitioned, never removed.

mod builder;
mod types;

pub use builder::{build_queue, clamp_rounds, MAX_ROUNDS};
pub use types::{EntryStatus, QueueEntry};
