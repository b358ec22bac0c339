//! Tick-driven trial sequencer.
//!
//! The sequencer advances a single active trial through its state table on
//! a fixed external tick. Each tick runs at most three phases against the
//! current state: pending entry (once), update, then exit evaluation.
//! Observable side effects happen only at entry and exit boundaries.
//!
//! Exit tie-break is deterministic: the exit predicate is evaluated before
//! the duration timer, and the timer before the watchdog. A predicate that
//! fires on the same tick as the timer therefore always wins.

use crate::core::{State, StateHistory, StateRecord, TransitionCause};
use crate::sequencer::def::{Action, StateDef};
use crate::sequencer::error::SequencerError;
use crate::stim::{set_handle_active, StimHandle};
use crate::trial::{AbortCode, TrialOutcome};
use chrono::Utc;
use log::warn;
use std::time::Duration;

/// Binds a stimulus group's visibility to state boundaries.
///
/// The group activates when `on` is entered and deactivates when `off` is
/// exited. `None` for `on` means visible from trial start; `None` for
/// `off` means visible until trial teardown.
pub struct VisibilityBinding<S: State> {
    pub(crate) handle: StimHandle,
    pub(crate) on: Option<S>,
    pub(crate) off: Option<S>,
}

/// What one tick of the sequencer produced.
#[derive(Clone, Debug, PartialEq)]
pub enum TickOutcome<S: State> {
    /// The current state was not exited.
    Remained,
    /// A transition fired.
    Transitioned {
        from: S,
        to: S,
        cause: TransitionCause,
    },
    /// The terminal state was entered; the trial is over and the
    /// sequencer must be rearmed.
    TrialComplete(TrialOutcome),
}

/// Tick-driven state machine for one trial at a time.
///
/// Construct through [`SequencerBuilder`](crate::sequencer::SequencerBuilder);
/// the builder validates the table so every successor lookup below is
/// guaranteed to resolve.
pub struct Sequencer<S: State, E> {
    table: Vec<StateDef<S, E>>,
    bindings: Vec<VisibilityBinding<S>>,
    initial: S,
    current: S,
    entry_pending: bool,
    trial_started: bool,
    entered_at: Duration,
    timer_deadline: Option<Duration>,
    watchdog_deadline: Option<Duration>,
    history: StateHistory<S>,
    trial: usize,
    abort_code: Option<AbortCode>,
    finished: bool,
}

impl<S: State + 'static, E> Sequencer<S, E> {
    pub(crate) fn new(
        table: Vec<StateDef<S, E>>,
        bindings: Vec<VisibilityBinding<S>>,
        initial: S,
    ) -> Self {
        Self {
            table,
            bindings,
            current: initial.clone(),
            initial,
            entry_pending: true,
            trial_started: false,
            entered_at: Duration::ZERO,
            timer_deadline: None,
            watchdog_deadline: None,
            history: StateHistory::new(),
            trial: 0,
            abort_code: None,
            finished: false,
        }
    }

    /// The state currently occupied.
    pub fn current_state(&self) -> &S {
        &self.current
    }

    /// Zero-based index of the trial in progress (or just finished).
    pub fn trial_index(&self) -> usize {
        self.trial
    }

    /// Whether the trial has reached its terminal state.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Abort code recorded for the trial in progress, if any.
    pub fn abort_code(&self) -> Option<AbortCode> {
        self.abort_code
    }

    /// Full transition history across all trials of this run.
    pub fn history(&self) -> &StateHistory<S> {
        &self.history
    }

    /// Tick time spent in the current state, `None` before entry runs.
    pub fn state_elapsed(&self, now: Duration) -> Option<Duration> {
        if self.entry_pending {
            None
        } else {
            now.checked_sub(self.entered_at)
        }
    }

    /// Advance the trial by one scheduling tick.
    ///
    /// `now` is the tick clock: monotone, supplied by the host loop so
    /// timing stays deterministic under test.
    pub fn tick(&mut self, now: Duration, env: &mut E) -> Result<TickOutcome<S>, SequencerError> {
        if self.finished {
            return Err(SequencerError::NotArmed { trial: self.trial });
        }

        if self.entry_pending {
            if let Some(outcome) = self.run_entry(now, env) {
                return Ok(TickOutcome::TrialComplete(outcome));
            }
        }

        if let Some(update) = self.def(&self.current).on_update.clone() {
            update(env);
        }

        let decision = self.decide_exit(now, env);
        match decision {
            Some((to, action, cause)) => {
                if let TransitionCause::Watchdog { abort_code } = cause {
                    self.abort_code = Some(AbortCode(abort_code));
                    warn!(
                        "trial {}: state '{}' exceeded its max duration, aborting with code {}",
                        self.trial,
                        self.current.name(),
                        abort_code
                    );
                }
                if let Some(action) = action {
                    action(env);
                }
                let from = self.apply_transition(to.clone(), cause.clone());
                Ok(TickOutcome::Transitioned { from, to, cause })
            }
            None => Ok(TickOutcome::Remained),
        }
    }

    /// Reset for the next trial after the current one completed.
    ///
    /// The caller is expected to reset its per-trial environment counters
    /// before the rearmed trial's first tick.
    pub fn rearm(&mut self) -> Result<(), SequencerError> {
        if !self.finished {
            return Err(SequencerError::TrialInProgress { trial: self.trial });
        }

        self.history = self.history.record(StateRecord {
            from: self.current.clone(),
            to: self.initial.clone(),
            timestamp: Utc::now(),
            trial: self.trial,
            cause: TransitionCause::Rearm,
        });

        self.trial += 1;
        self.current = self.initial.clone();
        self.entry_pending = true;
        self.trial_started = false;
        self.timer_deadline = None;
        self.watchdog_deadline = None;
        self.abort_code = None;
        self.finished = false;
        Ok(())
    }

    /// Run the pending entry phase. Returns the trial outcome if the
    /// entered state is terminal.
    fn run_entry(&mut self, now: Duration, env: &mut E) -> Option<TrialOutcome> {
        self.entry_pending = false;
        self.entered_at = now;

        if !self.trial_started {
            self.trial_started = true;
            for binding in &self.bindings {
                if binding.on.is_none() {
                    set_handle_active(&binding.handle, true);
                }
            }
        }

        for binding in &self.bindings {
            if binding.on.as_ref() == Some(&self.current) {
                set_handle_active(&binding.handle, true);
            }
        }

        let (entry, timer_duration, watchdog_duration) = {
            let def = self.def(&self.current);
            (
                def.on_entry.clone(),
                def.timer.as_ref().map(|t| t.duration.clone()),
                def.watchdog.as_ref().map(|w| w.max_duration),
            )
        };

        if let Some(entry) = entry {
            entry(env);
        }
        self.timer_deadline = timer_duration.map(|d| now + d(env));
        self.watchdog_deadline = watchdog_duration.map(|d| now + d);

        if self.current.is_terminal() {
            for binding in &self.bindings {
                set_handle_active(&binding.handle, false);
            }
            self.finished = true;
            return Some(TrialOutcome {
                trial: self.trial,
                abort_code: self.abort_code,
            });
        }
        None
    }

    /// Evaluate exit rules in tie-break order: predicate, timer, watchdog.
    #[allow(clippy::type_complexity)]
    fn decide_exit(
        &self,
        now: Duration,
        env: &E,
    ) -> Option<(S, Option<Action<E>>, TransitionCause)> {
        let def = self.def(&self.current);

        if let Some(rule) = &def.exit {
            if rule.guard.check(env) {
                return Some((
                    rule.to.clone(),
                    rule.action.clone(),
                    TransitionCause::Predicate,
                ));
            }
        }

        if let Some(rule) = &def.timer {
            if self.timer_deadline.is_some_and(|deadline| now >= deadline) {
                return Some((rule.to.clone(), rule.action.clone(), TransitionCause::Timeout));
            }
        }

        if let Some(rule) = &def.watchdog {
            if self
                .watchdog_deadline
                .is_some_and(|deadline| now >= deadline)
            {
                return Some((
                    rule.to.clone(),
                    None,
                    TransitionCause::Watchdog {
                        abort_code: rule.abort_code.0,
                    },
                ));
            }
        }

        None
    }

    /// Commit a transition: deactivate bound groups leaving their
    /// off-state, record history, and move atomically to the successor.
    fn apply_transition(&mut self, to: S, cause: TransitionCause) -> S {
        let from = self.current.clone();

        for binding in &self.bindings {
            if binding.off.as_ref() == Some(&from) {
                set_handle_active(&binding.handle, false);
            }
        }

        self.history = self.history.record(StateRecord {
            from: from.clone(),
            to: to.clone(),
            timestamp: Utc::now(),
            trial: self.trial,
            cause,
        });

        self.current = to;
        self.entry_pending = true;
        self.timer_deadline = None;
        self.watchdog_deadline = None;
        from
    }

    fn def(&self, state: &S) -> &StateDef<S, E> {
        self.table
            .iter()
            .find(|def| def.state == *state)
            .expect("state table validated at build time")
    }
}
