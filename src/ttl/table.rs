//! Event code table: code -> label mapping and pulse arithmetic.
//!
//! Codes are 1-indexed and exponentiated on the wire: code `n` pulses as
//! `2^(n-1)`. Only codes 1..=8 fit a single hardware byte, so the table
//! rejects hardware-enabled codes above 8 at construction.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use thiserror::Error;

/// Errors raised while validating an event table.
#[derive(Debug, Error)]
pub enum TableError {
    #[error("Event codes are 1-indexed; code 0 is not allowed")]
    ZeroCode,

    #[error("Event code {0} defined more than once")]
    DuplicateCode(u8),

    #[error("Event code {code} ('{label}') is hardware-enabled but its pulse does not fit one byte (codes 1..=8)")]
    HardwarePulseOverflow { code: u8, label: String },
}

/// One event definition.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EventDef {
    pub code: u8,
    pub label: String,
    /// Whether emission attempts a hardware pulse (allow-list membership).
    pub hardware: bool,
}

impl EventDef {
    pub fn new(code: u8, label: &str, hardware: bool) -> Self {
        Self {
            code,
            label: label.to_string(),
            hardware,
        }
    }
}

/// Immutable, ordered mapping of event codes to labels.
///
/// Defined once at startup and never mutated afterwards.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EventTable {
    events: Vec<EventDef>,
}

impl EventTable {
    /// The canonical 11-event table.
    ///
    /// Codes 1..=8 mark display and block boundaries and go to hardware;
    /// codes 9..=11 score the trial and are log-only.
    pub fn canonical() -> Self {
        let events = vec![
            EventDef::new(1, "TrialOn", true),
            EventDef::new(2, "SampleOn", true),
            EventDef::new(3, "SampleOff", true),
            EventDef::new(4, "DistractorOn", true),
            EventDef::new(5, "DistractorOff", true),
            EventDef::new(6, "TargetOn", true),
            EventDef::new(7, "ChoiceOn", true),
            EventDef::new(8, "StartEndBlock", true),
            EventDef::new(9, "Success", false),
            EventDef::new(10, "Failure", false),
            EventDef::new(11, "TrialAborted", false),
        ];
        Self { events }
    }

    /// Build a table from explicit definitions, validating the mapping.
    pub fn from_defs(events: Vec<EventDef>) -> Result<Self, TableError> {
        for (i, def) in events.iter().enumerate() {
            if def.code == 0 {
                return Err(TableError::ZeroCode);
            }
            if events[..i].iter().any(|d| d.code == def.code) {
                return Err(TableError::DuplicateCode(def.code));
            }
            if def.hardware && def.code > 8 {
                return Err(TableError::HardwarePulseOverflow {
                    code: def.code,
                    label: def.label.clone(),
                });
            }
        }
        Ok(Self { events })
    }

    /// Number of defined events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Label lookup, total for every code: codes outside the table fall
    /// back to `Event{code}`.
    pub fn label(&self, code: u8) -> Cow<'_, str> {
        match self.events.iter().find(|d| d.code == code) {
            Some(def) => Cow::Borrowed(def.label.as_str()),
            None => Cow::Owned(format!("Event{code}")),
        }
    }

    /// Whether the code's label is in the hardware-enabled allow-list.
    /// Unknown codes are never hardware-enabled.
    pub fn is_hardware(&self, code: u8) -> bool {
        self.events
            .iter()
            .any(|d| d.code == code && d.hardware)
    }

    /// The pulse value for a code: `2^(code-1)`.
    ///
    /// Returns `None` for code 0 and for codes whose pulse exceeds 64 bits.
    pub fn pulse(code: u8) -> Option<u64> {
        if code == 0 {
            return None;
        }
        1u64.checked_shl(u32::from(code) - 1)
    }

    /// The single-byte pulse for a hardware-enabled code.
    ///
    /// `None` when the pulse does not fit one byte (codes above 8).
    pub fn hardware_byte(code: u8) -> Option<u8> {
        match code {
            1..=8 => Some(1u8 << (code - 1)),
            _ => None,
        }
    }

    pub fn events(&self) -> &[EventDef] {
        &self.events
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_table_has_eleven_events() {
        let table = EventTable::canonical();
        assert_eq!(table.len(), 11);
        assert!(!table.is_empty());
    }

    #[test]
    fn pulse_is_exponentiated() {
        assert_eq!(EventTable::pulse(1), Some(1));
        assert_eq!(EventTable::pulse(3), Some(4));
        assert_eq!(EventTable::pulse(8), Some(128));
        assert_eq!(EventTable::pulse(9), Some(256));
        assert_eq!(EventTable::pulse(0), None);
    }

    #[test]
    fn hardware_byte_fits_codes_one_through_eight() {
        assert_eq!(EventTable::hardware_byte(1), Some(0x01));
        assert_eq!(EventTable::hardware_byte(8), Some(0x80));
        assert_eq!(EventTable::hardware_byte(9), None);
        assert_eq!(EventTable::hardware_byte(0), None);
    }

    #[test]
    fn label_lookup_is_total_with_fallback() {
        let table = EventTable::canonical();
        assert_eq!(table.label(1), "TrialOn");
        assert_eq!(table.label(9), "Success");
        assert_eq!(table.label(42), "Event42");
    }

    #[test]
    fn allow_list_membership() {
        let table = EventTable::canonical();
        assert!(table.is_hardware(1));
        assert!(table.is_hardware(8));
        assert!(!table.is_hardware(9));
        assert!(!table.is_hardware(11));
        assert!(!table.is_hardware(42));
    }

    #[test]
    fn from_defs_rejects_zero_code() {
        let result = EventTable::from_defs(vec![EventDef::new(0, "Bad", false)]);
        assert!(matches!(result, Err(TableError::ZeroCode)));
    }

    #[test]
    fn from_defs_rejects_duplicates() {
        let result = EventTable::from_defs(vec![
            EventDef::new(1, "TrialOn", true),
            EventDef::new(1, "Copy", false),
        ]);
        assert!(matches!(result, Err(TableError::DuplicateCode(1))));
    }

    #[test]
    fn from_defs_rejects_wide_hardware_pulse() {
        let result = EventTable::from_defs(vec![EventDef::new(9, "TooWide", true)]);
        assert!(matches!(
            result,
            Err(TableError::HardwarePulseOverflow { code: 9, .. })
        ));
    }

    #[test]
    fn table_serializes() {
        let table = EventTable::canonical();
        let json = serde_json::to_string(&table).unwrap();
        let back: EventTable = serde_json::from_str(&json).unwrap();
        assert_eq!(back.len(), 11);
        assert_eq!(back.label(7), "ChoiceOn");
    }
}
