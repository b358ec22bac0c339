//! TTL event marking: event table, pulse channel, audit log, marker.
//!
//! Translates abstract event codes into single-byte hardware pulses and
//! an append-only audit trail.

pub mod channel;
pub mod log;
pub mod marker;
pub mod table;

pub use channel::{ChannelOpener, PulseChannel};
pub use log::EventLog;
pub use marker::{EmitStatus, EventMarker};
pub use table::{EventDef, EventTable, TableError};
