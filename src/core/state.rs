//! Core State trait for trial states.
//!
//! Every state a sequencer can occupy implements this trait, which provides
//! pure methods for inspecting state properties without side effects.

use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// Trait for trial states.
///
/// All methods are pure - no side effects. States represent immutable
/// values that describe the current position in a trial's sequence.
/// Behavior (entry actions, exit rules, timers) lives in the sequencer's
/// state table, keyed by these values, never in the state itself.
///
/// # Required Traits
///
/// - `Clone`: States must be cloneable for history tracking
/// - `PartialEq`: States must be comparable for table lookup
/// - `Debug`: States must be debuggable for diagnostics
/// - `Serialize` + `Deserialize`: States must be serializable for the data record
///
/// # Example
///
/// ```rust
/// use trialflow::core::State;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
/// enum TrialState {
///     InitTrial,
///     SearchDisplay,
///     Iti,
///     FinishTrial,
/// }
///
/// impl State for TrialState {
///     fn name(&self) -> &str {
///         match self {
///             Self::InitTrial => "InitTrial",
///             Self::SearchDisplay => "SearchDisplay",
///             Self::Iti => "Iti",
///             Self::FinishTrial => "FinishTrial",
///         }
///     }
///
///     fn is_terminal(&self) -> bool {
///         matches!(self, Self::FinishTrial)
///     }
///
///     fn is_abort_target(&self) -> bool {
///         matches!(self, Self::Iti)
///     }
/// }
/// ```
pub trait State:
    Clone + PartialEq + Debug + Serialize + for<'de> Deserialize<'de> + Send + Sync
{
    /// Get the state's name for display/logging.
    fn name(&self) -> &str;

    /// Check if this is the trial-end marker state.
    ///
    /// Reaching a terminal state completes the trial: stimulus groups are
    /// torn down and the sequencer must be rearmed before the next trial.
    ///
    /// Default implementation returns `false`.
    fn is_terminal(&self) -> bool {
        false
    }

    /// Check if this state is a designated abort/cleanup target.
    ///
    /// Watchdog timeouts jump to such a state (typically the inter-trial
    /// interval) so the run continues after an aborted trial.
    ///
    /// Default implementation returns `false`.
    fn is_abort_target(&self) -> bool {
        false
    }
}
