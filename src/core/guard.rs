//! Guard predicates for conditional state exits.
//!
//! Guards are boolean functions of the tick environment that determine
//! whether a predicate exit fires. They are evaluated once per scheduling
//! tick and must not mutate anything.

/// Predicate over the tick environment that gates a state exit.
///
/// The environment `E` is whatever world/input snapshot the experiment
/// exposes to its sequencer (selection handlers, flags, counters). Guards
/// read it; only entry/exit actions may mutate it.
///
/// # Example
///
/// ```rust
/// use trialflow::core::Guard;
///
/// struct Env {
///     choice_made: bool,
/// }
///
/// let selection_made = Guard::new(|env: &Env| env.choice_made);
///
/// assert!(!selection_made.check(&Env { choice_made: false }));
/// assert!(selection_made.check(&Env { choice_made: true }));
/// ```
pub struct Guard<E> {
    predicate: Box<dyn Fn(&E) -> bool + Send + Sync>,
}

impl<E> Guard<E> {
    /// Create a guard from a predicate function.
    ///
    /// The predicate must be deterministic for a given environment and
    /// thread-safe (Send + Sync).
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&E) -> bool + Send + Sync + 'static,
    {
        Guard {
            predicate: Box::new(predicate),
        }
    }

    /// Evaluate the guard against the current environment.
    pub fn check(&self, env: &E) -> bool {
        (self.predicate)(env)
    }
}
