//! State transition history tracking.
//!
//! Provides immutable tracking of sequencer transitions over time. Every
//! transition carries the cause that fired it, so the audit trail can
//! distinguish a user response from a timeout or a watchdog abort.

use super::state::State;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Why a transition fired.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum TransitionCause {
    /// The state's exit predicate became true.
    Predicate,
    /// The state's duration timer elapsed.
    Timeout,
    /// The state's watchdog elapsed without the exit condition firing.
    Watchdog {
        /// Abort reason recorded for the trial.
        abort_code: u8,
    },
    /// The sequencer was rearmed for the next trial.
    Rearm,
}

/// Record of a single state transition.
///
/// Records are immutable values representing a move from one state to
/// another at a specific point in time, within a specific trial.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct StateRecord<S: State> {
    /// The state being transitioned from
    pub from: S,
    /// The state being transitioned to
    pub to: S,
    /// When the transition occurred
    pub timestamp: DateTime<Utc>,
    /// Zero-based index of the trial this transition belongs to
    pub trial: usize,
    /// What fired the transition
    pub cause: TransitionCause,
}

/// Ordered history of state transitions.
///
/// History is immutable - the `record` method returns a new history with
/// the transition added.
///
/// # Example
///
/// ```rust
/// use trialflow::core::{State, StateHistory, StateRecord, TransitionCause};
/// use serde::{Deserialize, Serialize};
/// use chrono::Utc;
///
/// #[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
/// enum Phase {
///     Fixation,
///     Stimulus,
///     Response,
/// }
///
/// impl State for Phase {
///     fn name(&self) -> &str {
///         match self {
///             Self::Fixation => "Fixation",
///             Self::Stimulus => "Stimulus",
///             Self::Response => "Response",
///         }
///     }
/// }
///
/// let history = StateHistory::new();
/// let history = history.record(StateRecord {
///     from: Phase::Fixation,
///     to: Phase::Stimulus,
///     timestamp: Utc::now(),
///     trial: 0,
///     cause: TransitionCause::Timeout,
/// });
/// let history = history.record(StateRecord {
///     from: Phase::Stimulus,
///     to: Phase::Response,
///     timestamp: Utc::now(),
///     trial: 0,
///     cause: TransitionCause::Predicate,
/// });
///
/// let path = history.get_path();
/// assert_eq!(path.len(), 3); // Fixation -> Stimulus -> Response
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct StateHistory<S: State> {
    records: Vec<StateRecord<S>>,
}

impl<S: State> Default for StateHistory<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: State> StateHistory<S> {
    /// Create a new empty history.
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
        }
    }

    /// Record a transition, returning a new history.
    ///
    /// The existing history is not mutated.
    pub fn record(&self, record: StateRecord<S>) -> Self {
        let mut records = self.records.clone();
        records.push(record);
        Self { records }
    }

    /// Get the path of states traversed.
    ///
    /// Returns references to states in order: initial state, then the
    /// `to` state of each transition.
    pub fn get_path(&self) -> Vec<&S> {
        let mut path = Vec::new();
        if let Some(first) = self.records.first() {
            path.push(&first.from);
        }
        for record in &self.records {
            path.push(&record.to);
        }
        path
    }

    /// Calculate wall-clock duration from first to last transition.
    ///
    /// Returns `None` if there are no transitions.
    pub fn duration(&self) -> Option<Duration> {
        if let (Some(first), Some(last)) = (self.records.first(), self.records.last()) {
            let duration = last.timestamp.signed_duration_since(first.timestamp);
            duration.to_std().ok()
        } else {
            None
        }
    }

    /// Get all records in order.
    pub fn records(&self) -> &[StateRecord<S>] {
        &self.records
    }

    /// Get the records belonging to one trial.
    pub fn trial_records(&self, trial: usize) -> Vec<&StateRecord<S>> {
        self.records.iter().filter(|r| r.trial == trial).collect()
    }

    /// Count transitions caused by watchdog aborts.
    pub fn abort_count(&self) -> usize {
        self.records
            .iter()
            .filter(|r| matches!(r.cause, TransitionCause::Watchdog { .. }))
            .count()
    }
}
