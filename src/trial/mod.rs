//! Per-trial and per-block bookkeeping.
//!
//! A trial is one pass through the sequencer. Its counters are reset at
//! trial start and flushed to the data record at trial end; block tallies
//! accumulate across trials and are reset at block boundaries.

pub mod recorder;

pub use recorder::{DataRecorder, DataRow, DatumValue};

use serde::{Deserialize, Serialize};

/// Integer reason recorded when a trial terminates early/abnormally.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbortCode(pub u8);

impl AbortCode {
    /// No selection was made within the search window.
    pub const NO_SELECTION: AbortCode = AbortCode(6);
}

impl std::fmt::Display for AbortCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Result of one completed pass through the sequencer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrialOutcome {
    /// Zero-based trial index within the run.
    pub trial: usize,
    /// Abort reason, if the trial ended abnormally.
    pub abort_code: Option<AbortCode>,
}

impl TrialOutcome {
    /// Whether the trial ran to its terminal state without aborting.
    pub fn completed(&self) -> bool {
        self.abort_code.is_none()
    }
}

/// Mutable counters owned by a single trial.
///
/// Reset at trial start, before the first state's entry action runs.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TrialCounters {
    /// Whether a selection has been registered this trial.
    pub choice_made: bool,
    /// Whether the registered selection was the target.
    pub correct_selection: bool,
    /// Index of the selected stimulus, if any.
    pub selected_index: Option<usize>,
    /// Seconds spent in the search state; `None` until a choice lands.
    pub search_duration: Option<f64>,
    /// Tokens gained (or lost, negative) this trial.
    pub tokens_collected: i32,
}

impl TrialCounters {
    /// Reset all counters for the next trial.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Accumulated results for a block of trials.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct BlockTally {
    pub num_correct: usize,
    pub num_errors: usize,
    pub num_aborted: usize,
    pub num_token_bar_full: usize,
    pub total_tokens_collected: i32,
    /// One entry per trial; `None` where the trial aborted without a choice.
    pub search_durations: Vec<Option<f64>>,
}

impl BlockTally {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a scored selection.
    pub fn record_selection(&mut self, correct: bool, search_duration: f64) {
        if correct {
            self.num_correct += 1;
        } else {
            self.num_errors += 1;
        }
        self.search_durations.push(Some(search_duration));
    }

    /// Fold a finished trial's outcome into the tally.
    ///
    /// An outcome with an unresolved abort code increments the aborted
    /// counter exactly once; the search duration slot stays empty for
    /// aborts that never produced a choice.
    pub fn apply_outcome(&mut self, outcome: &TrialOutcome) {
        if outcome.abort_code.is_some() {
            self.num_aborted += 1;
            self.search_durations.push(None);
        }
    }

    /// Add tokens collected during a trial.
    pub fn add_tokens(&mut self, tokens: i32) {
        self.total_tokens_collected += tokens;
    }

    /// Fraction of scored trials answered correctly; 0.0 before any score.
    pub fn accuracy(&self) -> f64 {
        let scored = self.num_correct + self.num_errors;
        if scored == 0 {
            0.0
        } else {
            self.num_correct as f64 / scored as f64
        }
    }

    /// Reset at a block boundary.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_reset_clears_everything() {
        let mut counters = TrialCounters {
            choice_made: true,
            correct_selection: true,
            selected_index: Some(2),
            search_duration: Some(1.5),
            tokens_collected: 3,
        };

        counters.reset();

        assert!(!counters.choice_made);
        assert!(!counters.correct_selection);
        assert!(counters.selected_index.is_none());
        assert!(counters.search_duration.is_none());
        assert_eq!(counters.tokens_collected, 0);
    }

    #[test]
    fn aborted_outcome_increments_tally_once() {
        let mut tally = BlockTally::new();
        let outcome = TrialOutcome {
            trial: 0,
            abort_code: Some(AbortCode::NO_SELECTION),
        };

        tally.apply_outcome(&outcome);

        assert_eq!(tally.num_aborted, 1);
        assert_eq!(tally.search_durations, vec![None]);
    }

    #[test]
    fn completed_outcome_does_not_touch_abort_tally() {
        let mut tally = BlockTally::new();
        let outcome = TrialOutcome {
            trial: 0,
            abort_code: None,
        };

        tally.apply_outcome(&outcome);

        assert_eq!(tally.num_aborted, 0);
        assert!(tally.search_durations.is_empty());
        assert!(outcome.completed());
    }

    #[test]
    fn accuracy_tracks_scored_trials() {
        let mut tally = BlockTally::new();
        assert_eq!(tally.accuracy(), 0.0);

        tally.record_selection(true, 0.8);
        tally.record_selection(true, 1.2);
        tally.record_selection(false, 2.0);

        assert!((tally.accuracy() - 2.0 / 3.0).abs() < f64::EPSILON);
        assert_eq!(tally.num_correct, 2);
        assert_eq!(tally.num_errors, 1);
        assert_eq!(tally.search_durations.len(), 3);
    }

    #[test]
    fn tally_reset_clears_block() {
        let mut tally = BlockTally::new();
        tally.record_selection(true, 0.5);
        tally.add_tokens(4);
        tally.num_token_bar_full += 1;
        tally.reset();

        assert_eq!(tally.num_correct, 0);
        assert_eq!(tally.total_tokens_collected, 0);
        assert_eq!(tally.num_token_bar_full, 0);
        assert!(tally.search_durations.is_empty());
    }

    #[test]
    fn abort_code_displays_its_value() {
        assert_eq!(AbortCode::NO_SELECTION.to_string(), "6");
    }
}
