//! Trialflow: trial sequencing and TTL event marking for behavioral
//! experiments.
//!
//! A trial is one pass through an explicit state table. Each state has an
//! entry action, an optional per-tick update, a conditional exit, a timed
//! exit, and an abort watchdog; the sequencer advances on a fixed external
//! tick supplied by the host loop. The TTL event marker turns semantic
//! event codes into single-byte hardware pulses plus an append-only audit
//! log, degrading gracefully when hardware is absent.
//!
//! # Core Concepts
//!
//! - **State**: type-safe trial states via the `State` trait
//! - **Sequencer**: tick-driven state table with deterministic exit
//!   tie-breaks (predicate before timer before watchdog)
//! - **Marker**: `emit(code)` resolving to SENT / TEST_ONLY / FAILED /
//!   LOG_ONLY, never panicking across a trial boundary
//!
//! # Example
//!
//! ```rust
//! use trialflow::sequencer::{SequencerBuilder, StateDef, TickOutcome};
//! use trialflow::state_enum;
//! use std::time::Duration;
//!
//! state_enum! {
//!     enum Phase {
//!         InitTrial,
//!         SearchDisplay,
//!         FinishTrial,
//!     }
//!     terminal: [FinishTrial]
//! }
//!
//! #[derive(Default)]
//! struct Env {
//!     choice_made: bool,
//! }
//!
//! let mut sequencer = SequencerBuilder::new()
//!     .initial(Phase::InitTrial)
//!     .state(
//!         StateDef::builder(Phase::InitTrial)
//!             .timer(|_: &Env| Duration::from_millis(500), Phase::SearchDisplay),
//!     )
//!     .unwrap()
//!     .state(
//!         StateDef::builder(Phase::SearchDisplay)
//!             .exit_when(|env: &Env| env.choice_made, Phase::FinishTrial),
//!     )
//!     .unwrap()
//!     .state(StateDef::builder(Phase::FinishTrial))
//!     .unwrap()
//!     .build()
//!     .unwrap();
//!
//! let mut env = Env::default();
//! let outcome = sequencer.tick(Duration::from_millis(0), &mut env).unwrap();
//! assert_eq!(outcome, TickOutcome::Remained);
//!
//! let outcome = sequencer.tick(Duration::from_millis(500), &mut env).unwrap();
//! assert!(matches!(outcome, TickOutcome::Transitioned { .. }));
//! ```

pub mod config;
pub mod core;
pub mod sequencer;
pub mod session;
pub mod stim;
pub mod trial;
pub mod ttl;

// Re-export commonly used types
pub use crate::core::{Guard, State, StateHistory, StateRecord, TransitionCause};
pub use config::{ConfigError, SessionConfig, TimingConfig, TtlConfig};
pub use sequencer::{Sequencer, SequencerBuilder, StateDef, TickOutcome};
pub use trial::{AbortCode, BlockTally, TrialCounters, TrialOutcome};
pub use ttl::{EmitStatus, EventMarker, EventTable};
