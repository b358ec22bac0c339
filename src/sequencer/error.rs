//! Build and runtime errors for the trial sequencer.

use thiserror::Error;

/// Errors that can occur when building a sequencer.
///
/// These are configuration errors: fatal at startup, surfaced immediately,
/// never retried.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Initial state not specified. Call .initial(state) before .build()")]
    MissingInitialState,

    #[error("No states defined. Add at least one state")]
    NoStates,

    #[error("State '{0}' defined more than once")]
    DuplicateState(String),

    #[error("Initial state '{0}' has no definition in the state table")]
    UndefinedInitialState(String),

    #[error("State '{from}' names successor '{to}' which has no definition")]
    UndefinedSuccessor { from: String, to: String },

    #[error("No terminal state defined. Mark one state as the trial-end marker")]
    NoTerminalState,

    #[error("Exit action set without an exit predicate. Call .exit_when(..) first")]
    ExitActionWithoutPredicate,

    #[error("Timer action set without a timer. Call .timer(..) first")]
    TimerActionWithoutTimer,
}

/// Errors that can occur while driving a sequencer.
#[derive(Debug, Error)]
pub enum SequencerError {
    /// The trial completed; `rearm()` must be called before the next tick.
    #[error("Trial {trial} is complete; rearm the sequencer before ticking")]
    NotArmed { trial: usize },

    /// The sequencer is mid-trial; rearming now would lose the trial.
    #[error("Cannot rearm while trial {trial} is still in progress")]
    TrialInProgress { trial: usize },
}
