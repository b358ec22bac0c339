//! Per-state definitions: entry actions, exit rules, timers, watchdogs.
//!
//! The sequencer is an explicit state table. Each entry is a `StateDef`
//! holding stored function values, never closures over mutable captures:
//! all mutation flows through the environment passed to each tick.

use crate::core::{Guard, State};
use crate::sequencer::error::BuildError;
use crate::trial::AbortCode;
use std::sync::Arc;
use std::time::Duration;

/// Side-effecting callback run against the tick environment.
pub type Action<E> = Arc<dyn Fn(&mut E) + Send + Sync>;

/// Source of a timer duration, evaluated once when the state is entered.
pub type DurationSource<E> = Arc<dyn Fn(&E) -> Duration + Send + Sync>;

/// Conditional exit: fires when the guard becomes true.
pub struct ExitRule<S: State, E> {
    pub guard: Guard<E>,
    pub to: S,
    pub action: Option<Action<E>>,
}

/// Timed exit: fires once the armed duration elapses.
pub struct TimerRule<S: State, E> {
    pub duration: DurationSource<E>,
    pub to: S,
    pub action: Option<Action<E>>,
}

/// Abort fallback: if the state is still occupied after `max_duration`,
/// the trial is aborted with `abort_code` and control jumps to `to`.
pub struct WatchdogRule<S: State> {
    pub max_duration: Duration,
    pub abort_code: AbortCode,
    pub to: S,
}

/// One row of the sequencer's state table.
pub struct StateDef<S: State, E> {
    pub state: S,
    pub on_entry: Option<Action<E>>,
    pub on_update: Option<Action<E>>,
    pub exit: Option<ExitRule<S, E>>,
    pub timer: Option<TimerRule<S, E>>,
    pub watchdog: Option<WatchdogRule<S>>,
}

impl<S: State + 'static, E> StateDef<S, E> {
    /// Start building a definition for `state`.
    pub fn builder(state: S) -> StateDefBuilder<S, E> {
        StateDefBuilder::new(state)
    }
}

/// Fluent builder for a single state definition.
///
/// # Example
///
/// ```rust
/// use trialflow::sequencer::StateDef;
/// use trialflow::state_enum;
/// use std::time::Duration;
///
/// state_enum! {
///     enum Phase {
///         DisplaySample,
///         SearchDisplay,
///         FinishTrial,
///     }
///     terminal: [FinishTrial]
/// }
///
/// struct Env {
///     sample_shown: bool,
/// }
///
/// let def = StateDef::builder(Phase::DisplaySample)
///     .on_entry(|env: &mut Env| env.sample_shown = true)
///     .timer(|_| Duration::from_millis(500), Phase::SearchDisplay)
///     .build()
///     .unwrap();
/// assert!(def.timer.is_some());
/// ```
pub struct StateDefBuilder<S: State, E> {
    state: S,
    on_entry: Option<Action<E>>,
    on_update: Option<Action<E>>,
    exit: Option<ExitRule<S, E>>,
    timer: Option<TimerRule<S, E>>,
    watchdog: Option<WatchdogRule<S>>,
    pending_exit_action: bool,
    pending_timer_action: bool,
}

impl<S: State + 'static, E> StateDefBuilder<S, E> {
    pub fn new(state: S) -> Self {
        Self {
            state,
            on_entry: None,
            on_update: None,
            exit: None,
            timer: None,
            watchdog: None,
            pending_exit_action: false,
            pending_timer_action: false,
        }
    }

    /// Set the entry action, run exactly once when the state is entered.
    pub fn on_entry<F>(mut self, action: F) -> Self
    where
        F: Fn(&mut E) + Send + Sync + 'static,
    {
        self.on_entry = Some(Arc::new(action));
        self
    }

    /// Set the update action, run every tick while the state is occupied.
    pub fn on_update<F>(mut self, action: F) -> Self
    where
        F: Fn(&mut E) + Send + Sync + 'static,
    {
        self.on_update = Some(Arc::new(action));
        self
    }

    /// Add a conditional exit to `to`, fired when `predicate` holds.
    pub fn exit_when<F>(mut self, predicate: F, to: S) -> Self
    where
        F: Fn(&E) -> bool + Send + Sync + 'static,
    {
        self.exit = Some(ExitRule {
            guard: Guard::new(predicate),
            to,
            action: None,
        });
        self
    }

    /// Attach a transition action to the conditional exit.
    ///
    /// Runs exactly once at the moment of transition, strictly after the
    /// predicate holds and before the successor's entry action.
    pub fn exit_action<F>(mut self, action: F) -> Self
    where
        F: Fn(&mut E) + Send + Sync + 'static,
    {
        match self.exit.as_mut() {
            Some(rule) => rule.action = Some(Arc::new(action)),
            None => self.pending_exit_action = true,
        }
        self
    }

    /// Add a timed exit to `to`. The duration source is evaluated against
    /// the environment when the state is entered.
    pub fn timer<F>(mut self, duration: F, to: S) -> Self
    where
        F: Fn(&E) -> Duration + Send + Sync + 'static,
    {
        self.timer = Some(TimerRule {
            duration: Arc::new(duration),
            to,
            action: None,
        });
        self
    }

    /// Add a timed exit with a fixed duration.
    pub fn timer_fixed(self, duration: Duration, to: S) -> Self {
        self.timer(move |_| duration, to)
    }

    /// Attach a transition action to the timed exit.
    pub fn timer_action<F>(mut self, action: F) -> Self
    where
        F: Fn(&mut E) + Send + Sync + 'static,
    {
        match self.timer.as_mut() {
            Some(rule) => rule.action = Some(Arc::new(action)),
            None => self.pending_timer_action = true,
        }
        self
    }

    /// Add an abort fallback: if the state is still occupied after
    /// `max_duration`, record `abort_code` and jump to `to`.
    pub fn watchdog(mut self, max_duration: Duration, abort_code: AbortCode, to: S) -> Self {
        self.watchdog = Some(WatchdogRule {
            max_duration,
            abort_code,
            to,
        });
        self
    }

    /// Build the definition.
    pub fn build(self) -> Result<StateDef<S, E>, BuildError> {
        if self.pending_exit_action {
            return Err(BuildError::ExitActionWithoutPredicate);
        }
        if self.pending_timer_action {
            return Err(BuildError::TimerActionWithoutTimer);
        }

        Ok(StateDef {
            state: self.state,
            on_entry: self.on_entry,
            on_update: self.on_update,
            exit: self.exit,
            timer: self.timer,
            watchdog: self.watchdog,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
    enum TestState {
        SearchDisplay,
        SelectionFeedback,
        Iti,
    }

    impl State for TestState {
        fn name(&self) -> &str {
            match self {
                Self::SearchDisplay => "SearchDisplay",
                Self::SelectionFeedback => "SelectionFeedback",
                Self::Iti => "Iti",
            }
        }
    }

    struct TestEnv {
        choice_made: bool,
    }

    #[test]
    fn builder_assembles_full_definition() {
        let def: StateDef<TestState, TestEnv> = StateDef::builder(TestState::SearchDisplay)
            .on_entry(|env: &mut TestEnv| env.choice_made = false)
            .on_update(|_| {})
            .exit_when(|env| env.choice_made, TestState::SelectionFeedback)
            .exit_action(|_| {})
            .timer_fixed(Duration::from_secs(5), TestState::Iti)
            .watchdog(
                Duration::from_secs(10),
                AbortCode::NO_SELECTION,
                TestState::Iti,
            )
            .build()
            .unwrap();

        assert!(def.on_entry.is_some());
        assert!(def.on_update.is_some());
        assert!(def.exit.is_some());
        assert!(def.timer.is_some());
        assert!(def.watchdog.is_some());
    }

    #[test]
    fn exit_action_requires_predicate() {
        let result: Result<StateDef<TestState, TestEnv>, _> =
            StateDef::builder(TestState::SearchDisplay)
                .exit_action(|_| {})
                .build();

        assert!(matches!(result, Err(BuildError::ExitActionWithoutPredicate)));
    }

    #[test]
    fn timer_action_requires_timer() {
        let result: Result<StateDef<TestState, TestEnv>, _> =
            StateDef::builder(TestState::SearchDisplay)
                .timer_action(|_| {})
                .build();

        assert!(matches!(result, Err(BuildError::TimerActionWithoutTimer)));
    }

    #[test]
    fn bare_state_builds() {
        let def: StateDef<TestState, TestEnv> =
            StateDef::builder(TestState::Iti).build().unwrap();

        assert!(def.on_entry.is_none());
        assert!(def.exit.is_none());
        assert!(def.timer.is_none());
    }

    #[test]
    fn guard_in_exit_rule_reads_env() {
        let def: StateDef<TestState, TestEnv> = StateDef::builder(TestState::SearchDisplay)
            .exit_when(|env: &TestEnv| env.choice_made, TestState::SelectionFeedback)
            .build()
            .unwrap();

        let rule = def.exit.unwrap();
        assert!(rule.guard.check(&TestEnv { choice_made: true }));
        assert!(!rule.guard.check(&TestEnv { choice_made: false }));
    }
}
