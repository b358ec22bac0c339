//! Named, lazily-evaluated data bindings for trial and frame records.
//!
//! Bindings are declared once when the sequencer is defined; values are
//! pulled from the environment only at record time, once per trial and
//! once per tick ("frame"). Rows are handed to an external persistence
//! layer; this module does no I/O.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A single recorded value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum DatumValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl From<bool> for DatumValue {
    fn from(v: bool) -> Self {
        DatumValue::Bool(v)
    }
}

impl From<i64> for DatumValue {
    fn from(v: i64) -> Self {
        DatumValue::Int(v)
    }
}

impl From<f64> for DatumValue {
    fn from(v: f64) -> Self {
        DatumValue::Float(v)
    }
}

impl From<&str> for DatumValue {
    fn from(v: &str) -> Self {
        DatumValue::Text(v.to_string())
    }
}

impl<T: Into<DatumValue>> From<Option<T>> for DatumValue {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(inner) => inner.into(),
            None => DatumValue::Null,
        }
    }
}

/// One snapshot row: binding name paired with its value at record time.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DataRow {
    pub values: Vec<(String, DatumValue)>,
}

impl DataRow {
    /// Look up a value by binding name.
    pub fn get(&self, name: &str) -> Option<&DatumValue> {
        self.values
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }
}

type DatumSource<E> = Arc<dyn Fn(&E) -> DatumValue + Send + Sync>;

struct Datum<E> {
    name: String,
    source: DatumSource<E>,
}

/// Registry of trial-level and frame-level data bindings.
///
/// # Example
///
/// ```rust
/// use trialflow::trial::{DataRecorder, DatumValue};
///
/// struct Env {
///     correct: bool,
///     search_duration: Option<f64>,
/// }
///
/// let mut recorder = DataRecorder::new();
/// recorder.add_trial_datum("CorrectSelection", |env: &Env| env.correct.into());
/// recorder.add_trial_datum("SearchDuration", |env: &Env| env.search_duration.into());
///
/// let row = recorder.record_trial(&Env { correct: true, search_duration: None });
/// assert_eq!(row.get("CorrectSelection"), Some(&DatumValue::Bool(true)));
/// assert_eq!(row.get("SearchDuration"), Some(&DatumValue::Null));
/// ```
pub struct DataRecorder<E> {
    trial_data: Vec<Datum<E>>,
    frame_data: Vec<Datum<E>>,
}

impl<E> Default for DataRecorder<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> DataRecorder<E> {
    pub fn new() -> Self {
        Self {
            trial_data: Vec::new(),
            frame_data: Vec::new(),
        }
    }

    /// Declare a binding recorded once per trial, at trial end.
    pub fn add_trial_datum<F>(&mut self, name: &str, source: F)
    where
        F: Fn(&E) -> DatumValue + Send + Sync + 'static,
    {
        self.trial_data.push(Datum {
            name: name.to_string(),
            source: Arc::new(source),
        });
    }

    /// Declare a binding recorded once per tick.
    pub fn add_frame_datum<F>(&mut self, name: &str, source: F)
    where
        F: Fn(&E) -> DatumValue + Send + Sync + 'static,
    {
        self.frame_data.push(Datum {
            name: name.to_string(),
            source: Arc::new(source),
        });
    }

    /// Snapshot all trial-level bindings.
    pub fn record_trial(&self, env: &E) -> DataRow {
        Self::snapshot(&self.trial_data, env)
    }

    /// Snapshot all frame-level bindings.
    pub fn record_frame(&self, env: &E) -> DataRow {
        Self::snapshot(&self.frame_data, env)
    }

    fn snapshot(data: &[Datum<E>], env: &E) -> DataRow {
        DataRow {
            values: data
                .iter()
                .map(|d| (d.name.clone(), (d.source)(env)))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TestEnv {
        context_name: String,
        choice_made: bool,
        tokens: i32,
    }

    fn recorder() -> DataRecorder<TestEnv> {
        let mut recorder = DataRecorder::new();
        recorder.add_trial_datum("ContextName", |env: &TestEnv| {
            env.context_name.as_str().into()
        });
        recorder.add_trial_datum("Tokens", |env: &TestEnv| (env.tokens as i64).into());
        recorder.add_frame_datum("ChoiceMade", |env: &TestEnv| env.choice_made.into());
        recorder
    }

    #[test]
    fn values_are_pulled_at_record_time() {
        let recorder = recorder();
        let mut env = TestEnv {
            context_name: "Neutral".to_string(),
            choice_made: false,
            tokens: 0,
        };

        let before = recorder.record_frame(&env);
        env.choice_made = true;
        let after = recorder.record_frame(&env);

        assert_eq!(before.get("ChoiceMade"), Some(&DatumValue::Bool(false)));
        assert_eq!(after.get("ChoiceMade"), Some(&DatumValue::Bool(true)));
    }

    #[test]
    fn trial_and_frame_sets_are_independent() {
        let recorder = recorder();
        let env = TestEnv {
            context_name: "Neutral".to_string(),
            choice_made: true,
            tokens: 5,
        };

        let trial_row = recorder.record_trial(&env);
        let frame_row = recorder.record_frame(&env);

        assert_eq!(trial_row.values.len(), 2);
        assert_eq!(frame_row.values.len(), 1);
        assert!(trial_row.get("ChoiceMade").is_none());
        assert_eq!(trial_row.get("Tokens"), Some(&DatumValue::Int(5)));
    }

    #[test]
    fn rows_serialize_for_persistence() {
        let recorder = recorder();
        let env = TestEnv {
            context_name: "Neutral".to_string(),
            choice_made: false,
            tokens: 2,
        };

        let row = recorder.record_trial(&env);
        let json = serde_json::to_string(&row).unwrap();
        let back: DataRow = serde_json::from_str(&json).unwrap();
        assert_eq!(row, back);
    }

    #[test]
    fn option_conversion_maps_none_to_null() {
        let missing: Option<f64> = None;
        assert_eq!(DatumValue::from(missing), DatumValue::Null);
        assert_eq!(DatumValue::from(Some(1.5)), DatumValue::Float(1.5));
    }
}
