//! The polymorphic step contract every step type implements.

use std::any::Any;

use crossterm::event::KeyEvent;

use super::StepValue;
use crate::styling::Theme;

/// What a step asks the orchestrator to do after handling a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepEvent {
    /// Stay on this step; redraw.
    Continue,
    /// Move to the next step (ignored while the step is incomplete).
    Advance,
    /// Return to the previous step without committing this step's state.
    Back,
    /// Like [`StepEvent::Advance`], but if the landing step is the final one
    /// and already complete, finalize the wizard without another Enter.
    SubmitIfReady,
}

/// One screen/prompt in a multi-step wizard flow.
///
/// A step's internal state (cursor, filter, selection) is private and mutated
/// only through [`Step::update`] or the setters a concrete type exposes
/// (`set_options`, `set_selected`, ...). Callbacks reach those setters by
/// downcasting via [`Step::as_any_mut`].
pub trait Step {
    /// Unique id within the wizard; the key in the final result.
    fn id(&self) -> &str;

    /// Prompt shown above the step body.
    fn title(&self) -> &str;

    /// Called whenever the orchestrator enters the step. Re-derives any
    /// state that depends on data pushed in by callbacks since last visit.
    fn init(&mut self) {}

    /// Return the step to its just-constructed state.
    fn reset(&mut self);

    /// Handle one key event.
    fn update(&mut self, key: KeyEvent) -> StepEvent;

    /// Render the step body (not the title) into at most `width` columns.
    fn view(&self, theme: &Theme, width: usize) -> String;

    /// One-line key legend rendered below the step.
    fn help(&self) -> String;

    /// Whether the step currently holds a valid answer.
    fn is_complete(&self) -> bool;

    /// The step's current answer; key-only while incomplete.
    fn value(&self) -> StepValue;

    /// Whether Escape should clear step-local input (a filter or a text
    /// buffer) instead of cancelling the wizard.
    fn has_clearable_input(&self) -> bool {
        false
    }

    /// Clear step-local input. Only called when [`Step::has_clearable_input`]
    /// returned true.
    fn clear_input(&mut self) {}

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}
