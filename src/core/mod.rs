//! Core types: the `State` trait, exit guards, and transition history.

pub mod guard;
pub mod history;
pub mod state;

pub use guard::Guard;
pub use history::{StateHistory, StateRecord, TransitionCause};
pub use state::State;
