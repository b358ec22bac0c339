//! Trial state sequencer: state table, builder, and tick engine.
//!
//! A sequencer advances one active trial through an ordered (but not
//! strictly linear) set of states, gating stimulus-group visibility and
//! event-marker emission at state boundaries.

pub mod builder;
pub mod def;
pub mod engine;
pub mod error;
pub mod macros;

pub use builder::SequencerBuilder;
pub use def::{Action, DurationSource, ExitRule, StateDef, StateDefBuilder, TimerRule, WatchdogRule};
pub use engine::{Sequencer, TickOutcome, VisibilityBinding};
pub use error::{BuildError, SequencerError};
