//! Stimulus group visibility binding.
//!
//! A `StimGroup` is a named set of stimulus objects whose visibility is
//! gated by state boundaries: the group becomes active when its on-state
//! is entered and inactive when its off-state is exited. Rendering is an
//! external concern; this module only tracks activity and locations.

use log::warn;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

/// World-space position of one stimulus object.
pub type StimLocation = [f32; 3];

/// A group of stimulus objects toggled together.
#[derive(Debug, Serialize, Deserialize)]
pub struct StimGroup {
    name: String,
    locations: Vec<StimLocation>,
    active: bool,
}

impl StimGroup {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            locations: Vec::new(),
            active: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Assign positions for the group's stimulus objects.
    pub fn set_locations(&mut self, locations: Vec<StimLocation>) {
        self.locations = locations;
    }

    pub fn locations(&self) -> &[StimLocation] {
        &self.locations
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    /// Wrap the group in a shared handle for sequencer bindings.
    pub fn shared(self) -> StimHandle {
        Arc::new(Mutex::new(self))
    }
}

/// Shared handle to a stimulus group.
///
/// The sequencer's visibility bindings and the experiment environment both
/// hold clones of the same handle.
pub type StimHandle = Arc<Mutex<StimGroup>>;

/// Set a group's activity through its handle.
///
/// A poisoned lock is recovered (the group's flags are plain data) and
/// noted as a warning.
pub fn set_handle_active(handle: &StimHandle, active: bool) {
    let mut group = handle.lock().unwrap_or_else(|poisoned| {
        warn!("stim group lock poisoned; recovering");
        poisoned.into_inner()
    });
    group.set_active(active);
}

/// Read a group's activity through its handle.
pub fn handle_is_active(handle: &StimHandle) -> bool {
    let group = handle.lock().unwrap_or_else(|poisoned| {
        warn!("stim group lock poisoned; recovering");
        poisoned.into_inner()
    });
    group.is_active()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn group_starts_inactive() {
        let group = StimGroup::new("SearchStims");
        assert_eq!(group.name(), "SearchStims");
        assert!(!group.is_active());
        assert!(group.locations().is_empty());
    }

    #[test]
    fn set_locations_replaces_positions() {
        let mut group = StimGroup::new("SampleStim");
        group.set_locations(vec![[0.0, 1.5, 2.0]]);
        group.set_locations(vec![[1.0, 0.0, 0.0], [2.0, 0.0, 0.0]]);
        assert_eq!(group.locations().len(), 2);
    }

    #[test]
    fn handle_toggles_shared_group() {
        let handle = StimGroup::new("DisplayDistractors").shared();
        let observer = Arc::clone(&handle);

        set_handle_active(&handle, true);
        assert!(handle_is_active(&observer));

        set_handle_active(&handle, false);
        assert!(!handle_is_active(&observer));
    }

    #[test]
    fn group_serializes() {
        let mut group = StimGroup::new("SearchStims");
        group.set_locations(vec![[0.5, -0.5, 1.0]]);
        let json = serde_json::to_string(&group).unwrap();
        let back: StimGroup = serde_json::from_str(&json).unwrap();
        assert_eq!(back.name(), "SearchStims");
        assert_eq!(back.locations().len(), 1);
    }
}
