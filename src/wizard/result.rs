//! Typed accessors over a finished wizard's captured step values.

use indexmap::IndexMap;
use serde_json::Value;

use super::option::StepValue;

/// Immutable snapshot of one [`StepValue`] per step id, plus the cancelled
/// flag. Produced exactly once at the end of `Wizard::run`.
///
/// Getters return the zero value for a missing or unanswered key rather than
/// erroring — callers know their own flow's shape.
#[derive(Debug, Clone)]
pub struct WizardResult {
    values: IndexMap<String, StepValue>,
    cancelled: bool,
}

impl WizardResult {
    pub(crate) fn new(values: IndexMap<String, StepValue>, cancelled: bool) -> Self {
        Self { values, cancelled }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    /// The captured value for `id`, if the wizard had such a step.
    pub fn get_step(&self, id: &str) -> Option<&StepValue> {
        self.values.get(id)
    }

    /// Raw value for `id`; `Null` when missing or unanswered.
    pub fn get_value(&self, id: &str) -> Value {
        self.values
            .get(id)
            .map(|v| v.raw.clone())
            .unwrap_or(Value::Null)
    }

    /// String answer for `id`; empty when missing or not a string.
    pub fn get_string(&self, id: &str) -> String {
        match self.get_value(id) {
            Value::String(s) => s,
            _ => String::new(),
        }
    }

    /// Boolean answer for `id`; false when missing or not a boolean.
    pub fn get_bool(&self, id: &str) -> bool {
        self.get_value(id).as_bool().unwrap_or(false)
    }

    /// Multi-select string answers for `id`; empty when missing.
    pub fn get_strings(&self, id: &str) -> Vec<String> {
        match self.get_value(id) {
            Value::Array(items) => items
                .into_iter()
                .filter_map(|item| match item {
                    Value::String(s) => Some(s),
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        }
    }
}
