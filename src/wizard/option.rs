//! Options and step values: the data carried between steps and out to the
//! caller.

use serde_json::Value;

/// One selectable entry in a list step.
///
/// Immutable once constructed; a step replaces its whole option set via
/// `set_options` rather than mutating entries in place.
#[derive(Debug, Clone)]
pub struct SelectOption {
    label: String,
    value: Value,
    description: Option<String>,
    disabled: bool,
}

impl SelectOption {
    /// An enabled option whose value is its label.
    pub fn new(label: impl Into<String>) -> Self {
        let label = label.into();
        let value = Value::String(label.clone());
        Self {
            label,
            value,
            description: None,
            disabled: false,
        }
    }

    /// Attach an opaque payload returned through [`crate::wizard::StepValue::raw`].
    pub fn with_value(mut self, value: impl Into<Value>) -> Self {
        self.value = value.into();
        self
    }

    /// Secondary text: a sub-label, or the reason the entry is disabled.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Mark the entry as displayed but unselectable.
    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }
}

/// The externally visible result of a step.
///
/// Produced on demand by `Step::value()`; valid even before the step is
/// complete (a key-only value with `Null` raw).
#[derive(Debug, Clone, PartialEq)]
pub struct StepValue {
    /// Step id this value belongs to
    pub key: String,
    /// Human-readable value; joined labels for multi-select
    pub label: String,
    /// Underlying value; an array for multi-select
    pub raw: Value,
}

impl StepValue {
    /// The value of a step that has not been answered.
    pub fn empty(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: String::new(),
            raw: Value::Null,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn option_defaults_value_to_label() {
        let opt = SelectOption::new("main");
        assert_eq!(opt.value(), &Value::String("main".into()));
        assert!(!opt.is_disabled());
        assert_eq!(opt.description(), None);
    }

    #[test]
    fn option_builder_overrides() {
        let opt = SelectOption::new("PR #42")
            .with_value(42u64)
            .with_description("draft")
            .disabled(true);
        assert_eq!(opt.value(), &Value::from(42u64));
        assert_eq!(opt.description(), Some("draft"));
        assert!(opt.is_disabled());
    }

    #[test]
    fn empty_step_value_is_key_only() {
        let value = StepValue::empty("branch");
        assert_eq!(value.key, "branch");
        assert_eq!(value.label, "");
        assert_eq!(value.raw, Value::Null);
    }
}
