//! Builder for constructing trial sequencers.

use crate::core::State;
use crate::sequencer::def::{StateDef, StateDefBuilder};
use crate::sequencer::engine::{Sequencer, VisibilityBinding};
use crate::sequencer::error::BuildError;
use crate::stim::StimHandle;

/// Builder that assembles and validates a sequencer's state table.
///
/// Validation failures are configuration errors: fatal at startup.
pub struct SequencerBuilder<S: State, E> {
    initial: Option<S>,
    defs: Vec<StateDef<S, E>>,
    bindings: Vec<VisibilityBinding<S>>,
}

impl<S: State + 'static, E> SequencerBuilder<S, E> {
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            initial: None,
            defs: Vec::new(),
            bindings: Vec::new(),
        }
    }

    /// Set the initial state (required).
    pub fn initial(mut self, state: S) -> Self {
        self.initial = Some(state);
        self
    }

    /// Add a state using its builder.
    /// Returns an error if the builder fails validation.
    pub fn state(mut self, builder: StateDefBuilder<S, E>) -> Result<Self, BuildError> {
        let def = builder.build()?;
        self.defs.push(def);
        Ok(self)
    }

    /// Add a pre-built state definition.
    pub fn add_state(mut self, def: StateDef<S, E>) -> Self {
        self.defs.push(def);
        self
    }

    /// Bind a stimulus group's visibility to state boundaries.
    ///
    /// The group becomes active when `on` is entered (trial start if
    /// `None`) and inactive when `off` is exited (trial teardown if
    /// `None`).
    pub fn bind_visibility(mut self, handle: StimHandle, on: Option<S>, off: Option<S>) -> Self {
        self.bindings.push(VisibilityBinding { handle, on, off });
        self
    }

    /// Build the sequencer.
    /// Returns an error if the table is incomplete or inconsistent.
    pub fn build(self) -> Result<Sequencer<S, E>, BuildError> {
        let initial = self.initial.ok_or(BuildError::MissingInitialState)?;

        if self.defs.is_empty() {
            return Err(BuildError::NoStates);
        }

        for (i, def) in self.defs.iter().enumerate() {
            if self.defs[..i].iter().any(|d| d.state == def.state) {
                return Err(BuildError::DuplicateState(def.state.name().to_string()));
            }
        }

        if !self.defs.iter().any(|d| d.state == initial) {
            return Err(BuildError::UndefinedInitialState(
                initial.name().to_string(),
            ));
        }

        for def in &self.defs {
            let successors = def
                .exit
                .iter()
                .map(|r| &r.to)
                .chain(def.timer.iter().map(|r| &r.to))
                .chain(def.watchdog.iter().map(|r| &r.to));
            for to in successors {
                if !self.defs.iter().any(|d| d.state == *to) {
                    return Err(BuildError::UndefinedSuccessor {
                        from: def.state.name().to_string(),
                        to: to.name().to_string(),
                    });
                }
            }
        }

        if !self.defs.iter().any(|d| d.state.is_terminal()) {
            return Err(BuildError::NoTerminalState);
        }

        Ok(Sequencer::new(self.defs, self.bindings, initial))
    }
}

impl<S: State + 'static, E> Default for SequencerBuilder<S, E> {
    fn default() -> Self {
        Self::new()
    }
}
