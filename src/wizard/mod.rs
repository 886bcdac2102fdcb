//! Step-wizard engine for multi-step terminal prompts.
//!
//! A [`Wizard`] owns an ordered list of [`Step`]s and a cursor into it. Each
//! key event goes to the active step, which reports a [`StepEvent`]; the
//! orchestrator applies skip predicates when moving in either direction,
//! fires completion callbacks when a step transitions to complete, and on
//! submit snapshots every step's [`StepValue`] into a [`WizardResult`].
//!
//! Flows assemble a wizard like this:
//!
//! ```no_run
//! use grove::styling::Theme;
//! use grove::wizard::{ListStep, SelectOption, Wizard};
//!
//! let mut wizard = Wizard::new("demo");
//! wizard.add_step(ListStep::new(
//!     "branch",
//!     "Pick a branch",
//!     vec![SelectOption::new("main"), SelectOption::new("dev")],
//! ));
//! wizard.on_complete("branch", |w| {
//!     let picked = w.value_of("branch").label;
//!     // push data into later steps here
//!     let _ = picked;
//! });
//! let result = wizard.run(&Theme::ansi()).unwrap();
//! if result.is_cancelled() {
//!     return;
//! }
//! println!("chose {}", result.get_string("branch"));
//! ```
//!
//! The engine is single-threaded and event-driven: one key event is processed
//! to completion before the next render. Completion callbacks run
//! synchronously on the input thread — a callback that performs blocking I/O
//! (fetching branches, listing PRs) blocks the UI for that duration, which is
//! the accepted tradeoff for a short-lived CLI tool. The engine itself
//! performs no I/O; flows own all process invocation and push data into steps
//! through the setter surface.

mod filter;
mod list;
mod option;
mod result;
mod step;
mod terminal;
mod text;

pub use filter::{FilterMode, fuzzy_match, substring_match};
pub use list::ListStep;
pub use option::{SelectOption, StepValue};
pub use result::WizardResult;
pub use step::{Step, StepEvent};
pub use text::TextStep;

use std::collections::HashMap;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use indexmap::IndexMap;
use log::debug;
use serde_json::Value;

use crate::styling::{PROMPT_SYMBOL, SUCCESS_SYMBOL, Theme};

type SkipFn = Box<dyn Fn(&Wizard) -> bool>;
type CompleteFn = Box<dyn FnMut(&mut Wizard)>;
type InfoFn = Box<dyn Fn(&Wizard) -> Option<String>>;

/// Orchestrator state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardState {
    Running,
    Cancelled,
    Submitted,
}

/// Sequences steps, evaluates skip predicates, fires completion callbacks,
/// renders the step trail, and produces the final result.
///
/// Created once per interactive flow and discarded after [`Wizard::run`]
/// returns; not shared across flows, not persisted.
pub struct Wizard {
    name: String,
    steps: Vec<Box<dyn Step>>,
    current: usize,
    state: WizardState,
    skip_when: HashMap<String, SkipFn>,
    on_complete: HashMap<String, CompleteFn>,
    /// Raw value each step last fired its callback for; guards re-firing on
    /// pure re-navigation.
    fired: HashMap<String, Value>,
    info_line: Option<InfoFn>,
    started: bool,
}

impl Wizard {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            steps: Vec::new(),
            current: 0,
            state: WizardState::Running,
            skip_when: HashMap::new(),
            on_complete: HashMap::new(),
            fired: HashMap::new(),
            info_line: None,
            started: false,
        }
    }

    /// Append a step. Step ids must be unique; a duplicate is a wiring bug
    /// and panics.
    pub fn add_step(&mut self, step: impl Step + 'static) -> &mut Self {
        assert!(
            !self.steps.iter().any(|s| s.id() == step.id()),
            "wizard `{}`: duplicate step id `{}`",
            self.name,
            step.id()
        );
        self.steps.push(Box::new(step));
        self
    }

    /// Bypass the step whenever `predicate` is true at transition time.
    /// Honored identically moving forward and backward.
    pub fn skip_when(&mut self, id: &str, predicate: impl Fn(&Wizard) -> bool + 'static) -> &mut Self {
        self.step_index(id);
        self.skip_when.insert(id.to_string(), Box::new(predicate));
        self
    }

    /// Run `callback` when the step's answer becomes valid, strictly before
    /// the orchestrator advances past it. Fires once per completion; pure
    /// re-navigation without a value change does not re-fire, a changed
    /// answer does.
    ///
    /// The callback receives the whole wizard and may call setters on other
    /// steps — this is how answering one step repopulates a later one.
    pub fn on_complete(&mut self, id: &str, callback: impl FnMut(&mut Wizard) + 'static) -> &mut Self {
        self.step_index(id);
        self.on_complete.insert(id.to_string(), Box::new(callback));
        self
    }

    /// Register a pure render-time status line, recomputed on every render.
    pub fn with_info_line(&mut self, info: impl Fn(&Wizard) -> Option<String> + 'static) -> &mut Self {
        self.info_line = Some(Box::new(info));
        self
    }

    // ------------------------------------------------------------------
    // Step access (programmer-error on unknown ids)
    // ------------------------------------------------------------------

    fn step_index(&self, id: &str) -> usize {
        self.steps
            .iter()
            .position(|s| s.id() == id)
            .unwrap_or_else(|| panic!("wizard `{}`: unknown step id `{id}`", self.name))
    }

    pub fn step(&self, id: &str) -> &dyn Step {
        self.steps[self.step_index(id)].as_ref()
    }

    pub fn step_mut(&mut self, id: &str) -> &mut dyn Step {
        let index = self.step_index(id);
        self.steps[index].as_mut()
    }

    /// The list step with this id; panics when the id names another type.
    pub fn list_step(&self, id: &str) -> &ListStep {
        self.step(id)
            .as_any()
            .downcast_ref()
            .unwrap_or_else(|| panic!("step `{id}` is not a list step"))
    }

    pub fn list_step_mut(&mut self, id: &str) -> &mut ListStep {
        self.step_mut(id)
            .as_any_mut()
            .downcast_mut()
            .unwrap_or_else(|| panic!("step `{id}` is not a list step"))
    }

    pub fn text_step_mut(&mut self, id: &str) -> &mut TextStep {
        self.step_mut(id)
            .as_any_mut()
            .downcast_mut()
            .unwrap_or_else(|| panic!("step `{id}` is not a text step"))
    }

    /// Current value of a step (key-only while incomplete).
    pub fn value_of(&self, id: &str) -> StepValue {
        let step = &self.steps[self.step_index(id)];
        if step.is_complete() {
            step.value()
        } else {
            StepValue::empty(step.id())
        }
    }

    pub fn state(&self) -> WizardState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == WizardState::Running
    }

    /// Id of the active step.
    pub fn current_step_id(&self) -> &str {
        self.steps[self.current].id()
    }

    // ------------------------------------------------------------------
    // State machine
    // ------------------------------------------------------------------

    /// Initialize steps and skip forward over any entry steps whose
    /// predicate is already true. Idempotent; [`Wizard::run`] calls it.
    pub fn start(&mut self) {
        if self.started {
            return;
        }
        self.started = true;

        for step in &mut self.steps {
            step.init();
        }

        let mut index = 0;
        while index < self.steps.len() && self.is_skipped(index) {
            index += 1;
        }
        if index >= self.steps.len() {
            debug!("wizard `{}`: no visible steps, submitting", self.name);
            self.state = WizardState::Submitted;
        } else {
            self.current = index;
        }
    }

    /// Process one key event. Public so flows and tests can drive the wizard
    /// without a terminal.
    pub fn handle_key(&mut self, key: KeyEvent) {
        if !self.is_running() {
            return;
        }

        if is_cancel_key(&key) {
            let step = &mut self.steps[self.current];
            if step.has_clearable_input() {
                // Escape first clears step-local input; a second press cancels
                step.clear_input();
            } else {
                debug!("wizard `{}`: cancelled", self.name);
                self.state = WizardState::Cancelled;
            }
            return;
        }

        match self.steps[self.current].update(key) {
            StepEvent::Continue => {}
            StepEvent::Advance => self.advance(false),
            StepEvent::SubmitIfReady => self.advance(true),
            StepEvent::Back => self.go_back(),
        }
    }

    fn is_skipped(&self, index: usize) -> bool {
        self.skip_when
            .get(self.steps[index].id())
            .is_some_and(|predicate| predicate(self))
    }

    /// Fire the step's completion callback unless it already fired for the
    /// same raw value.
    fn fire_on_complete(&mut self, index: usize) {
        let id = self.steps[index].id().to_string();
        let raw = self.steps[index].value().raw;
        if self.fired.get(&id) == Some(&raw) {
            return;
        }

        // Take the callback out so it can borrow the wizard mutably
        if let Some(mut callback) = self.on_complete.remove(&id) {
            debug!("wizard `{}`: step `{id}` complete", self.name);
            callback(self);
            self.on_complete.insert(id.clone(), callback);
        }
        self.fired.insert(id, raw);
    }

    fn advance(&mut self, submit_if_ready: bool) {
        // Defensive: steps should not report Advance while incomplete
        if !self.steps[self.current].is_complete() {
            return;
        }
        self.fire_on_complete(self.current);

        let mut next = self.current + 1;
        while next < self.steps.len() && self.is_skipped(next) {
            next += 1;
        }
        if next >= self.steps.len() {
            debug!("wizard `{}`: submitted", self.name);
            self.state = WizardState::Submitted;
            return;
        }

        self.current = next;
        self.steps[next].init();

        if submit_if_ready && self.steps[next].is_complete() && !self.has_step_after(next) {
            self.fire_on_complete(next);
            debug!("wizard `{}`: submitted via ready final step", self.name);
            self.state = WizardState::Submitted;
        }
    }

    fn has_step_after(&self, index: usize) -> bool {
        (index + 1..self.steps.len()).any(|i| !self.is_skipped(i))
    }

    /// Move backward, skipping with the same predicates as forward motion.
    /// At the first visible step this is a no-op (Left is not Escape).
    fn go_back(&mut self) {
        let mut index = self.current;
        while index > 0 {
            index -= 1;
            if !self.is_skipped(index) {
                self.current = index;
                self.steps[index].init();
                return;
            }
        }
    }

    // ------------------------------------------------------------------
    // Rendering and results
    // ------------------------------------------------------------------

    /// Render the trail of answered steps plus the active step.
    pub fn render(&self, theme: &Theme, width: usize) -> String {
        let dim = theme.dim;
        let mut lines = Vec::new();

        for (index, step) in self.steps.iter().enumerate().take(self.current) {
            if self.is_skipped(index) || !step.is_complete() {
                continue;
            }
            let summary = theme.summary;
            lines.push(format!(
                "{SUCCESS_SYMBOL} {dim}{}:{dim:#} {summary}{}{summary:#}",
                step.title(),
                step.value().label
            ));
        }

        let step = &self.steps[self.current];
        let title = theme.title;
        lines.push(format!("{PROMPT_SYMBOL} {title}{}{title:#}", step.title()));
        lines.push(step.view(theme, width));

        if let Some(info) = &self.info_line
            && let Some(text) = info(self)
        {
            lines.push(format!("  {dim}{text}{dim:#}"));
        }
        lines.push(format!("  {dim}{}{dim:#}", step.help()));

        lines.join("\n")
    }

    /// Snapshot every step's value. Steps that were never answered — or
    /// whose skip predicate holds at snapshot time — contribute key-only
    /// empty values, even if they carry a preselection.
    pub fn result(&self) -> WizardResult {
        let mut values = IndexMap::new();
        for (index, step) in self.steps.iter().enumerate() {
            let value = if step.is_complete() && !self.is_skipped(index) {
                step.value()
            } else {
                StepValue::empty(step.id())
            };
            values.insert(step.id().to_string(), value);
        }
        WizardResult::new(values, self.state == WizardState::Cancelled)
    }
}

fn is_cancel_key(key: &KeyEvent) -> bool {
    key.code == KeyCode::Esc
        || (key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn esc() -> KeyEvent {
        key(KeyCode::Esc)
    }

    fn options(labels: &[&str]) -> Vec<SelectOption> {
        labels.iter().map(|label| SelectOption::new(*label)).collect()
    }

    fn three_step_wizard() -> Wizard {
        let mut wizard = Wizard::new("test");
        wizard.add_step(ListStep::new("a", "Step A", options(&["a1", "a2"])));
        wizard.add_step(ListStep::new("b", "Step B", options(&["b1", "b2"])));
        wizard.add_step(ListStep::new("c", "Step C", options(&["c1", "c2"])));
        wizard
    }

    #[test]
    fn advances_through_steps_and_submits() {
        let mut wizard = three_step_wizard();
        wizard.start();
        assert_eq!(wizard.current_step_id(), "a");

        wizard.handle_key(key(KeyCode::Enter));
        assert_eq!(wizard.current_step_id(), "b");
        wizard.handle_key(key(KeyCode::Enter));
        assert_eq!(wizard.current_step_id(), "c");
        wizard.handle_key(key(KeyCode::Enter));
        assert_eq!(wizard.state(), WizardState::Submitted);

        let result = wizard.result();
        assert!(!result.is_cancelled());
        assert_eq!(result.get_string("a"), "a1");
        assert_eq!(result.get_string("c"), "c1");
    }

    #[test]
    fn skipped_step_is_bypassed_both_directions() {
        let mut wizard = three_step_wizard();
        wizard.skip_when("b", |_| true);
        wizard.start();

        wizard.handle_key(key(KeyCode::Enter));
        // B skipped on the way in
        assert_eq!(wizard.current_step_id(), "c");

        // ...and on the way back
        wizard.handle_key(key(KeyCode::Left));
        assert_eq!(wizard.current_step_id(), "a");

        wizard.handle_key(key(KeyCode::Enter));
        wizard.handle_key(key(KeyCode::Enter));
        assert_eq!(wizard.state(), WizardState::Submitted);

        // The skipped step contributes a zero value
        let result = wizard.result();
        assert_eq!(result.get_string("b"), "");
        assert_eq!(result.get_value("b"), Value::Null);
    }

    #[test]
    fn skip_predicate_sees_earlier_answers() {
        let mut wizard = three_step_wizard();
        // Skip C unless A answered "a2"
        wizard.skip_when("c", |w| w.value_of("a").label != "a2");
        wizard.start();

        wizard.handle_key(key(KeyCode::Down)); // cursor to a2
        wizard.handle_key(key(KeyCode::Enter));
        assert_eq!(wizard.current_step_id(), "b");
        wizard.handle_key(key(KeyCode::Enter));
        assert_eq!(wizard.current_step_id(), "c");
    }

    #[test]
    fn entry_steps_can_be_skipped() {
        let mut wizard = three_step_wizard();
        wizard.skip_when("a", |_| true);
        wizard.start();
        assert_eq!(wizard.current_step_id(), "b");
    }

    #[test]
    fn all_steps_skipped_submits_immediately() {
        let mut wizard = three_step_wizard();
        wizard.skip_when("a", |_| true);
        wizard.skip_when("b", |_| true);
        wizard.skip_when("c", |_| true);
        wizard.start();
        assert_eq!(wizard.state(), WizardState::Submitted);
    }

    #[test]
    fn left_at_first_step_is_a_noop() {
        let mut wizard = three_step_wizard();
        wizard.start();
        wizard.handle_key(key(KeyCode::Left));
        assert_eq!(wizard.state(), WizardState::Running);
        assert_eq!(wizard.current_step_id(), "a");
    }

    #[test]
    fn escape_cancels_without_clearable_input() {
        let mut wizard = three_step_wizard();
        wizard.start();
        wizard.handle_key(esc());
        assert_eq!(wizard.state(), WizardState::Cancelled);
        assert!(wizard.result().is_cancelled());
    }

    #[test]
    fn escape_clears_filter_before_cancelling() {
        let mut wizard = three_step_wizard();
        wizard.start();
        wizard.handle_key(key(KeyCode::Char('a')));

        wizard.handle_key(esc());
        assert_eq!(wizard.state(), WizardState::Running);
        assert_eq!(wizard.list_step("a").filter_text(), "");

        wizard.handle_key(esc());
        assert_eq!(wizard.state(), WizardState::Cancelled);
    }

    #[test]
    fn ctrl_c_cancels_like_escape() {
        let mut wizard = three_step_wizard();
        wizard.start();
        wizard.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert_eq!(wizard.state(), WizardState::Cancelled);
    }

    #[test]
    fn on_complete_fires_once_before_advancing() {
        let order: Rc<std::cell::RefCell<Vec<String>>> = Rc::default();

        let mut wizard = three_step_wizard();
        let seen = order.clone();
        wizard.on_complete("a", move |w| {
            seen.borrow_mut()
                .push(format!("callback at {}", w.current_step_id()));
        });
        wizard.start();
        wizard.handle_key(key(KeyCode::Enter));

        // Fired exactly once, while A was still the active step
        assert_eq!(order.borrow().as_slice(), ["callback at a"]);
    }

    #[test]
    fn on_complete_not_refired_on_pure_renavigation() {
        let count = Rc::new(Cell::new(0u32));

        let mut wizard = three_step_wizard();
        let seen = count.clone();
        wizard.on_complete("a", move |_| seen.set(seen.get() + 1));
        wizard.start();

        wizard.handle_key(key(KeyCode::Enter)); // answer A
        assert_eq!(count.get(), 1);

        wizard.handle_key(key(KeyCode::Left)); // back to A
        wizard.handle_key(key(KeyCode::Enter)); // forward again, same answer
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn on_complete_refires_when_answer_changes() {
        let count = Rc::new(Cell::new(0u32));

        let mut wizard = three_step_wizard();
        let seen = count.clone();
        wizard.on_complete("a", move |_| seen.set(seen.get() + 1));
        wizard.start();

        wizard.handle_key(key(KeyCode::Enter));
        wizard.handle_key(key(KeyCode::Left));
        wizard.handle_key(key(KeyCode::Down)); // change answer to a2
        wizard.handle_key(key(KeyCode::Enter));
        assert_eq!(count.get(), 2);
    }

    #[test]
    fn callback_repopulates_a_later_step() {
        let mut wizard = three_step_wizard();
        wizard.on_complete("a", |w| {
            let picked = w.value_of("a").label;
            w.list_step_mut("b")
                .set_options(vec![SelectOption::new(format!("{picked}-child"))]);
        });
        wizard.start();

        wizard.handle_key(key(KeyCode::Down));
        wizard.handle_key(key(KeyCode::Enter));
        assert_eq!(wizard.current_step_id(), "b");
        wizard.handle_key(key(KeyCode::Enter));

        assert_eq!(wizard.value_of("b").label, "a2-child");
    }

    #[test]
    fn submit_if_ready_finalizes_on_complete_last_step() {
        let mut wizard = Wizard::new("test");
        wizard.add_step(ListStep::new("a", "A", options(&["a1"])));
        let mut last = ListStep::new("b", "B", options(&["b1", "b2"]));
        last.set_selected(&[1]);
        wizard.add_step(last);
        wizard.start();

        // Enter on A: B is last, already complete, so no extra Enter needed
        wizard.handle_key(key(KeyCode::Enter));
        assert_eq!(wizard.state(), WizardState::Submitted);
        assert_eq!(wizard.result().get_string("b"), "b2");
    }

    #[test]
    fn right_advances_without_finalizing_ready_last_step() {
        let mut wizard = Wizard::new("test");
        wizard.add_step(ListStep::new("a", "A", options(&["a1"])));
        let mut last = ListStep::new("b", "B", options(&["b1"]));
        last.set_selected(&[0]);
        wizard.add_step(last);
        wizard.start();

        wizard.handle_key(key(KeyCode::Right));
        // Plain Advance lands on B and waits for explicit confirmation
        assert_eq!(wizard.state(), WizardState::Running);
        assert_eq!(wizard.current_step_id(), "b");
    }

    #[test]
    fn advance_ignored_while_incomplete() {
        let mut wizard = Wizard::new("test");
        wizard.add_step(ListStep::new("a", "A", options(&["a1", "a2"])).multi_select());
        wizard.start();

        // min_select defaults to 1; Enter without a toggle must not move
        wizard.handle_key(key(KeyCode::Enter));
        assert_eq!(wizard.state(), WizardState::Running);
        assert_eq!(wizard.current_step_id(), "a");

        wizard.handle_key(key(KeyCode::Char(' ')));
        wizard.handle_key(key(KeyCode::Enter));
        assert_eq!(wizard.state(), WizardState::Submitted);
    }

    #[test]
    fn info_line_appears_in_render() {
        let mut wizard = three_step_wizard();
        wizard.with_info_line(|w| Some(format!("at {}", w.current_step_id())));
        wizard.start();
        let frame = wizard.render(&Theme::plain(), 80);
        assert!(frame.contains("at a"));
    }

    #[test]
    fn render_shows_trail_of_answers() {
        let mut wizard = three_step_wizard();
        wizard.start();
        wizard.handle_key(key(KeyCode::Enter));
        let frame = wizard.render(&Theme::plain(), 80);
        assert!(frame.contains("Step A"));
        assert!(frame.contains("a1"));
        assert!(frame.contains("Step B"));
    }

    #[test]
    #[should_panic(expected = "unknown step id")]
    fn unknown_step_id_panics() {
        let mut wizard = three_step_wizard();
        wizard.skip_when("nope", |_| true);
    }

    #[test]
    #[should_panic(expected = "duplicate step id")]
    fn duplicate_step_id_panics() {
        let mut wizard = Wizard::new("test");
        wizard.add_step(ListStep::new("a", "A", vec![]));
        wizard.add_step(ListStep::new("a", "A again", vec![]));
    }

    #[test]
    #[should_panic(expected = "not a list step")]
    fn wrong_step_type_panics() {
        let mut wizard = Wizard::new("test");
        wizard.add_step(TextStep::new("name", "Name"));
        wizard.start();
        let _ = wizard.list_step("name");
    }

    #[test]
    fn text_step_integrates() {
        let mut wizard = Wizard::new("test");
        wizard.add_step(ListStep::new("a", "A", options(&["a1"])));
        wizard.add_step(TextStep::new("name", "Name"));
        wizard.start();

        wizard.handle_key(key(KeyCode::Enter));
        assert_eq!(wizard.current_step_id(), "name");
        for ch in "scratch".chars() {
            wizard.handle_key(key(KeyCode::Char(ch)));
        }
        wizard.handle_key(key(KeyCode::Enter));
        assert_eq!(wizard.state(), WizardState::Submitted);
        assert_eq!(wizard.result().get_string("name"), "scratch");
    }

    #[test]
    fn zero_steps_submits_immediately() {
        let mut wizard = Wizard::new("empty");
        wizard.start();
        assert_eq!(wizard.state(), WizardState::Submitted);
        assert!(!wizard.result().is_cancelled());
    }
}
