//! Selectable-list step: single- or multi-select over a filterable list with
//! disableable entries.
//!
//! Multi-select is a mode flag on this one type rather than a separate step
//! type; both modes share the filtering, cursor, and rendering machinery.

use std::any::Any;
use std::collections::BTreeSet;

use anstyle::Style;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use serde_json::Value;
use unicode_width::UnicodeWidthStr;

use super::filter::{FilterMode, filter_labels};
use super::option::{SelectOption, StepValue};
use super::step::{Step, StepEvent};
use crate::styling::{Theme, truncate_to_width};

/// Rows shown above/below the cursor before the list scrolls.
const MAX_VISIBLE_ROWS: usize = 8;

type CharFilter = Box<dyn Fn(char) -> bool>;
type CreateLabelFn = Box<dyn Fn(&str) -> String>;
type ValueLabelFn = Box<dyn Fn(&SelectOption) -> String>;

/// A row of the current filtered view.
#[derive(Debug, Clone, PartialEq)]
enum Row {
    /// An option that survived the filter, with matched char positions
    Item { index: usize, positions: Vec<usize> },
    /// The synthesized "create `<filter>`" entry
    Create,
}

pub struct ListStep {
    id: String,
    title: String,
    options: Vec<SelectOption>,
    /// The filtered set; display order
    rows: Vec<Row>,
    /// Position within `rows`. Points at a non-disabled row whenever one
    /// exists; meaningless while `rows` is empty.
    cursor: usize,
    /// Committed choice (single-select)
    selected: Option<usize>,
    /// Toggled option indices (multi-select)
    selected_set: BTreeSet<usize>,
    /// Filter text committed through the create entry (single-select)
    created: Option<String>,
    multi: bool,
    min_select: usize,
    /// 0 = unbounded
    max_select: usize,
    filter: String,
    mode: FilterMode,
    char_filter: Option<CharFilter>,
    create_label: Option<CreateLabelFn>,
    value_label: Option<ValueLabelFn>,
}

impl ListStep {
    /// Single-select substring-filtered list over `options`.
    ///
    /// The initial cursor lands on the first non-disabled option (index 0
    /// when all are disabled — the step is then unusable until `set_options`
    /// supplies a usable set).
    pub fn new(id: impl Into<String>, title: impl Into<String>, options: Vec<SelectOption>) -> Self {
        let mut step = Self {
            id: id.into(),
            title: title.into(),
            options,
            rows: Vec::new(),
            cursor: 0,
            selected: None,
            selected_set: BTreeSet::new(),
            created: None,
            multi: false,
            min_select: 1,
            max_select: 0,
            filter: String::new(),
            mode: FilterMode::Substring,
            char_filter: None,
            create_label: None,
            value_label: None,
        };
        step.rebuild_rows();
        step.cursor = step.first_enabled();
        step
    }

    /// Use fuzzy matching: best matches float to the top as the user types.
    pub fn fuzzy(mut self) -> Self {
        self.mode = FilterMode::Fuzzy;
        self.rebuild_rows();
        self
    }

    /// Allow several selections, toggled with Space.
    pub fn multi_select(mut self) -> Self {
        self.multi = true;
        self
    }

    /// Restrict which characters the filter accepts. Rejected input is
    /// dropped silently, never surfaced as an error.
    pub fn with_char_filter(mut self, accept: impl Fn(char) -> bool + 'static) -> Self {
        self.char_filter = Some(Box::new(accept));
        self
    }

    /// Enable create-from-filter: when no option's label equals the filter,
    /// a virtual entry labeled by `label` is appended; selecting it resolves
    /// to the raw filter text.
    pub fn with_create_label(mut self, label: impl Fn(&str) -> String + 'static) -> Self {
        self.create_label = Some(Box::new(label));
        self.rebuild_rows();
        self
    }

    /// Override how a chosen option is displayed in values and the trail.
    pub fn with_value_label(mut self, label: impl Fn(&SelectOption) -> String + 'static) -> Self {
        self.value_label = Some(Box::new(label));
        self
    }

    /// Builder form of [`Self::set_min_max`].
    pub fn with_min_max(mut self, min: usize, max: usize) -> Self {
        self.set_min_max(min, max);
        self
    }

    // ------------------------------------------------------------------
    // Setter surface (reached from callbacks via downcast)
    // ------------------------------------------------------------------

    /// Replace the whole option set. Clears any selection; the filter is
    /// re-applied to the new options.
    pub fn set_options(&mut self, options: Vec<SelectOption>) {
        self.options = options;
        self.selected = None;
        self.selected_set.clear();
        self.created = None;
        self.rebuild_rows();
        self.cursor = self.first_enabled();
    }

    /// Pre-select options by index.
    ///
    /// Panics on an out-of-range index: that is a wiring bug in the flow
    /// definition, not a runtime condition.
    pub fn set_selected(&mut self, indices: &[usize]) {
        for &index in indices {
            assert!(
                index < self.options.len(),
                "step `{}`: selected index {index} out of range ({} options)",
                self.id,
                self.options.len()
            );
        }
        if self.multi {
            self.selected_set = indices.iter().copied().collect();
        } else {
            self.selected = indices.first().copied();
            self.created = None;
        }
    }

    /// Selection-count bounds for multi-select mode; 0 = unbounded (for max)
    /// or no minimum (for min). Gates advancement, not toggling.
    pub fn set_min_max(&mut self, min: usize, max: usize) {
        self.min_select = min;
        self.max_select = max;
    }

    /// Move the cursor to `position` within the filtered set, nudging onto a
    /// non-disabled row if needed.
    pub fn set_cursor(&mut self, position: usize) {
        self.cursor = position;
        self.clamp_cursor();
    }

    // ------------------------------------------------------------------
    // Read surface
    // ------------------------------------------------------------------

    /// Whether the committed choice is the synthesized create entry.
    pub fn is_create_selected(&self) -> bool {
        self.created.is_some()
    }

    /// Toggled option indices (multi-select), in display order.
    pub fn selected_indices(&self) -> Vec<usize> {
        self.selected_set.iter().copied().collect()
    }

    pub fn filter_text(&self) -> &str {
        &self.filter
    }

    /// Index into the option list under the cursor, if the filtered set is
    /// non-empty and the cursor is not on the create entry.
    pub fn option_under_cursor(&self) -> Option<usize> {
        match self.rows.get(self.cursor) {
            Some(Row::Item { index, .. }) => Some(*index),
            _ => None,
        }
    }

    #[cfg(test)]
    fn filtered_indices(&self) -> Vec<usize> {
        self.rows
            .iter()
            .filter_map(|row| match row {
                Row::Item { index, .. } => Some(*index),
                Row::Create => None,
            })
            .collect()
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn rebuild_rows(&mut self) {
        let matches = filter_labels(
            self.options.iter().map(|o| o.label()),
            &self.filter,
            self.mode,
        );
        self.rows = matches
            .into_iter()
            .map(|m| Row::Item {
                index: m.index,
                positions: m.positions,
            })
            .collect();

        let exact_exists = self.options.iter().any(|o| o.label() == self.filter);
        if self.create_label.is_some() && !self.filter.is_empty() && !exact_exists {
            self.rows.push(Row::Create);
        }

        self.clamp_cursor();
    }

    fn row_disabled(&self, row: usize) -> bool {
        match &self.rows[row] {
            Row::Item { index, .. } => self.options[*index].is_disabled(),
            Row::Create => false,
        }
    }

    fn first_enabled(&self) -> usize {
        (0..self.rows.len())
            .find(|&r| !self.row_disabled(r))
            .unwrap_or(0)
    }

    /// Keep the cursor inside `rows` and off disabled entries when possible.
    fn clamp_cursor(&mut self) {
        if self.rows.is_empty() {
            self.cursor = 0;
            return;
        }
        if self.cursor >= self.rows.len() {
            self.cursor = self.rows.len() - 1;
        }
        if self.row_disabled(self.cursor) {
            let nearest = (self.cursor..self.rows.len())
                .find(|&r| !self.row_disabled(r))
                .or_else(|| (0..self.cursor).rev().find(|&r| !self.row_disabled(r)));
            if let Some(row) = nearest {
                self.cursor = row;
            }
        }
    }

    fn move_up(&mut self) {
        if let Some(row) = (0..self.cursor).rev().find(|&r| !self.row_disabled(r)) {
            self.cursor = row;
        }
    }

    fn move_down(&mut self) {
        let below = self.cursor + 1..self.rows.len();
        if let Some(row) = below.into_iter().find(|&r| !self.row_disabled(r)) {
            self.cursor = row;
        }
    }

    fn move_first(&mut self) {
        if let Some(row) = (0..self.rows.len()).find(|&r| !self.row_disabled(r)) {
            self.cursor = row;
        }
    }

    fn move_last(&mut self) {
        if let Some(row) = (0..self.rows.len()).rev().find(|&r| !self.row_disabled(r)) {
            self.cursor = row;
        }
    }

    fn toggle_under_cursor(&mut self) {
        let Some(Row::Item { index, .. }) = self.rows.get(self.cursor) else {
            return;
        };
        let index = *index;
        if self.options[index].is_disabled() {
            return;
        }
        if self.selected_set.contains(&index) {
            self.selected_set.remove(&index);
        } else if self.max_select == 0 || self.selected_set.len() < self.max_select {
            self.selected_set.insert(index);
        }
        // Toggling past max is refused, not an error
    }

    /// Commit the entry under the cursor (single-select) or validate the
    /// selection count (multi-select), then report `event` on success.
    fn commit(&mut self, event: StepEvent) -> StepEvent {
        if self.multi {
            return if self.selected_set.len() >= self.min_select {
                event
            } else {
                StepEvent::Continue
            };
        }

        match self.rows.get(self.cursor) {
            Some(Row::Item { index, .. }) => {
                let index = *index;
                if self.options[index].is_disabled() {
                    return StepEvent::Continue;
                }
                self.selected = Some(index);
                self.created = None;
                event
            }
            Some(Row::Create) => {
                self.created = Some(self.filter.clone());
                self.selected = None;
                event
            }
            None => StepEvent::Continue,
        }
    }

    fn push_filter_char(&mut self, ch: char) {
        if ch.is_control() {
            return;
        }
        if let Some(accept) = &self.char_filter
            && !accept(ch)
        {
            return;
        }
        self.filter.push(ch);
        self.rebuild_rows();
    }

    fn delete_filter_char(&mut self) {
        if self.filter.pop().is_some() {
            self.rebuild_rows();
        }
    }

    fn delete_filter_word(&mut self) {
        let trimmed = self.filter.trim_end_matches(|c| !word_char(c));
        let trimmed = trimmed.trim_end_matches(word_char);
        self.filter.truncate(trimmed.len());
        self.rebuild_rows();
    }

    fn display_label(&self, option: &SelectOption) -> String {
        match &self.value_label {
            Some(label) => label(option),
            None => option.label().to_string(),
        }
    }

    /// Window of rows to render, keeping the cursor visible.
    fn visible_window(&self) -> (usize, usize) {
        let len = self.rows.len();
        if len <= MAX_VISIBLE_ROWS {
            return (0, len);
        }
        let start = self
            .cursor
            .saturating_sub(MAX_VISIBLE_ROWS / 2)
            .min(len - MAX_VISIBLE_ROWS);
        (start, start + MAX_VISIBLE_ROWS)
    }

    fn render_row(&self, row: usize, theme: &Theme, width: usize) -> String {
        let at_cursor = row == self.cursor;
        let cursor = theme.cursor;
        let marker = if at_cursor {
            format!("{cursor}❯{cursor:#} ")
        } else {
            "  ".to_string()
        };

        match &self.rows[row] {
            Row::Create => {
                let label = self
                    .create_label
                    .as_ref()
                    .map(|f| f(&self.filter))
                    .unwrap_or_else(|| format!("create \"{}\"", self.filter));
                let style = if at_cursor { theme.cursor } else { theme.selected };
                format!(
                    "{marker}{style}{}{style:#}",
                    truncate_to_width(&label, width.saturating_sub(4))
                )
            }
            Row::Item { index, positions } => {
                let option = &self.options[*index];
                let disabled = option.is_disabled();
                let toggled = self.multi && self.selected_set.contains(index);

                let checkbox = if self.multi {
                    let selected = theme.selected;
                    if toggled {
                        format!("{selected}◉{selected:#} ")
                    } else if disabled {
                        let dim = theme.disabled;
                        format!("{dim}○{dim:#} ")
                    } else {
                        "○ ".to_string()
                    }
                } else {
                    String::new()
                };

                let base = if disabled {
                    theme.disabled
                } else if at_cursor {
                    theme.cursor
                } else if toggled {
                    theme.selected
                } else {
                    Style::new()
                };

                let description = option
                    .description()
                    .map(|d| truncate_to_width(d, 30))
                    .unwrap_or_default();
                let reserved = 4
                    + if self.multi { 2 } else { 0 }
                    + if description.is_empty() {
                        0
                    } else {
                        description.width() + 3
                    };
                let label = truncate_to_width(option.label(), width.saturating_sub(reserved).max(8));
                let label = highlight_label(&label, positions, base, theme.matched);

                let dim = theme.disabled;
                let description = if description.is_empty() {
                    String::new()
                } else {
                    format!("  {dim}({description}){dim:#}")
                };

                format!("{marker}{checkbox}{label}{description}")
            }
        }
    }
}

/// Characters treated as word constituents for Alt+Backspace.
fn word_char(c: char) -> bool {
    c.is_alphanumeric()
}

/// Render `label` with `positions` styled as matches, everything else in
/// `base`. Runs of equal styling share one escape sequence.
fn highlight_label(label: &str, positions: &[usize], base: Style, matched: Style) -> String {
    if positions.is_empty() {
        return format!("{base}{label}{base:#}");
    }

    let matched_set: BTreeSet<usize> = positions.iter().copied().collect();
    let mut out = String::new();
    let mut run = String::new();
    let mut run_matched = false;

    let flush = |out: &mut String, run: &mut String, was_matched: bool| {
        if run.is_empty() {
            return;
        }
        let style = if was_matched { matched } else { base };
        out.push_str(&format!("{style}{run}{style:#}"));
        run.clear();
    };

    for (i, ch) in label.chars().enumerate() {
        let is_match = matched_set.contains(&i);
        if is_match != run_matched {
            flush(&mut out, &mut run, run_matched);
            run_matched = is_match;
        }
        run.push(ch);
    }
    flush(&mut out, &mut run, run_matched);

    out
}

impl Step for ListStep {
    fn id(&self) -> &str {
        &self.id
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn init(&mut self) {
        self.rebuild_rows();
    }

    fn reset(&mut self) {
        self.filter.clear();
        self.selected = None;
        self.selected_set.clear();
        self.created = None;
        self.rebuild_rows();
        self.cursor = self.first_enabled();
    }

    fn update(&mut self, key: KeyEvent) -> StepEvent {
        match key.code {
            KeyCode::Up => self.move_up(),
            KeyCode::Down => self.move_down(),
            KeyCode::Char('k') if key.modifiers.is_empty() => self.move_up(),
            KeyCode::Char('j') if key.modifiers.is_empty() => self.move_down(),
            KeyCode::Home | KeyCode::PageUp => self.move_first(),
            KeyCode::End | KeyCode::PageDown => self.move_last(),
            KeyCode::Char(' ') if self.multi => self.toggle_under_cursor(),
            KeyCode::Enter => return self.commit(StepEvent::SubmitIfReady),
            KeyCode::Right => return self.commit(StepEvent::Advance),
            KeyCode::Left => return StepEvent::Back,
            KeyCode::Backspace if key.modifiers.contains(KeyModifiers::ALT) => {
                self.delete_filter_word()
            }
            KeyCode::Backspace => self.delete_filter_char(),
            KeyCode::Char(c)
                if !key
                    .modifiers
                    .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
            {
                self.push_filter_char(c)
            }
            _ => {}
        }
        StepEvent::Continue
    }

    fn view(&self, theme: &Theme, width: usize) -> String {
        let mut lines = Vec::new();
        let dim = theme.dim;
        let input = theme.input;

        if self.filter.is_empty() {
            lines.push(format!("  {dim}type to filter{dim:#}"));
        } else {
            lines.push(format!("  {input}{}{input:#}", self.filter));
        }

        if self.rows.is_empty() {
            lines.push(format!("  {dim}no matches{dim:#}"));
            return lines.join("\n");
        }

        let (start, end) = self.visible_window();
        if start > 0 {
            lines.push(format!("  {dim}… {start} above{dim:#}"));
        }
        for row in start..end {
            lines.push(self.render_row(row, theme, width));
        }
        if end < self.rows.len() {
            let below = self.rows.len() - end;
            lines.push(format!("  {dim}… {below} below{dim:#}"));
        }

        lines.join("\n")
    }

    fn help(&self) -> String {
        let mut parts = vec!["↑/↓ move"];
        if self.multi {
            parts.push("space toggle");
        }
        parts.push("enter confirm");
        parts.push("← back");
        parts.push("type to filter");
        parts.push("esc cancel");
        parts.join(" · ")
    }

    fn is_complete(&self) -> bool {
        if self.multi {
            self.selected_set.len() >= self.min_select
        } else {
            self.selected.is_some() || self.created.is_some()
        }
    }

    fn value(&self) -> StepValue {
        if !self.is_complete() {
            return StepValue::empty(self.id.as_str());
        }

        if self.multi {
            let mut labels = Vec::new();
            let mut raws = Vec::new();
            for &index in &self.selected_set {
                let option = &self.options[index];
                labels.push(self.display_label(option));
                raws.push(option.value().clone());
            }
            return StepValue {
                key: self.id.clone(),
                label: labels.join(", "),
                raw: Value::Array(raws),
            };
        }

        if let Some(created) = &self.created {
            return StepValue {
                key: self.id.clone(),
                label: created.clone(),
                raw: Value::String(created.clone()),
            };
        }

        let option = &self.options[self.selected.expect("single-select complete")];
        StepValue {
            key: self.id.clone(),
            label: self.display_label(option),
            raw: option.value().clone(),
        }
    }

    fn has_clearable_input(&self) -> bool {
        !self.filter.is_empty()
    }

    fn clear_input(&mut self) {
        self.filter.clear();
        self.rebuild_rows();
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn alt(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::ALT)
    }

    fn branches() -> Vec<SelectOption> {
        vec![
            SelectOption::new("main"),
            SelectOption::new("dev"),
            SelectOption::new("feature/x"),
        ]
    }

    fn type_str(step: &mut ListStep, text: &str) {
        for ch in text.chars() {
            step.update(key(KeyCode::Char(ch)));
        }
    }

    #[test]
    fn substring_filter_scenario() {
        // Options ["main","dev","feature/x"], filter "fe" → only feature/x
        let mut step = ListStep::new("branch", "Pick a branch", branches());
        type_str(&mut step, "fe");
        assert_eq!(step.filtered_indices(), vec![2]);
        assert_eq!(step.option_under_cursor(), Some(2));
    }

    #[test]
    fn enter_commits_and_requests_submit() {
        let mut step = ListStep::new("branch", "Pick a branch", branches());
        step.update(key(KeyCode::Down));
        let event = step.update(key(KeyCode::Enter));
        assert_eq!(event, StepEvent::SubmitIfReady);
        assert!(step.is_complete());
        assert_eq!(step.value().raw, Value::String("dev".into()));
    }

    #[test]
    fn right_commits_and_advances() {
        let mut step = ListStep::new("branch", "Pick a branch", branches());
        let event = step.update(key(KeyCode::Right));
        assert_eq!(event, StepEvent::Advance);
        assert_eq!(step.value().label, "main");
    }

    #[test]
    fn left_goes_back_without_committing() {
        let mut step = ListStep::new("branch", "Pick a branch", branches());
        let event = step.update(key(KeyCode::Left));
        assert_eq!(event, StepEvent::Back);
        assert!(!step.is_complete());
    }

    #[test]
    fn cursor_skips_disabled_entries() {
        let options = vec![
            SelectOption::new("main").disabled(true),
            SelectOption::new("dev"),
            SelectOption::new("wip").disabled(true),
            SelectOption::new("feature/x"),
        ];
        let mut step = ListStep::new("branch", "Pick", options);
        // Initial cursor lands on the first non-disabled entry
        assert_eq!(step.option_under_cursor(), Some(1));
        step.update(key(KeyCode::Down));
        assert_eq!(step.option_under_cursor(), Some(3));
        // No wraparound past the last enabled entry
        step.update(key(KeyCode::Down));
        assert_eq!(step.option_under_cursor(), Some(3));
        step.update(key(KeyCode::Up));
        assert_eq!(step.option_under_cursor(), Some(1));
        step.update(key(KeyCode::Up));
        assert_eq!(step.option_under_cursor(), Some(1));
    }

    #[rstest]
    #[case(KeyCode::Home)]
    #[case(KeyCode::PageUp)]
    fn home_jumps_to_first_enabled(#[case] code: KeyCode) {
        let options = vec![
            SelectOption::new("a").disabled(true),
            SelectOption::new("b"),
            SelectOption::new("c"),
        ];
        let mut step = ListStep::new("s", "t", options);
        step.update(key(KeyCode::End));
        assert_eq!(step.option_under_cursor(), Some(2));
        step.update(key(code));
        assert_eq!(step.option_under_cursor(), Some(1));
    }

    #[test]
    fn cursor_invariant_holds_under_arbitrary_navigation() {
        let options = vec![
            SelectOption::new("alpha").disabled(true),
            SelectOption::new("beta"),
            SelectOption::new("gamma").disabled(true),
            SelectOption::new("delta"),
            SelectOption::new("epsilon").disabled(true),
        ];
        let mut step = ListStep::new("s", "t", options);
        let keys = [
            KeyCode::Down,
            KeyCode::Up,
            KeyCode::End,
            KeyCode::Char('a'),
            KeyCode::Down,
            KeyCode::Backspace,
            KeyCode::Home,
            KeyCode::Char('e'),
            KeyCode::Char('l'),
            KeyCode::Backspace,
            KeyCode::Backspace,
            KeyCode::Up,
        ];
        for code in keys {
            step.update(key(code));
            if let Some(index) = step.option_under_cursor() {
                assert!(
                    !matches!(index, 0 | 2 | 4),
                    "cursor landed on disabled option {index}"
                );
            }
        }
    }

    #[test]
    fn enter_on_disabled_entry_is_a_noop() {
        let options = vec![SelectOption::new("only").disabled(true)];
        let mut step = ListStep::new("s", "t", options);
        let event = step.update(key(KeyCode::Enter));
        assert_eq!(event, StepEvent::Continue);
        assert!(!step.is_complete());
    }

    #[test]
    fn filter_with_no_matches_degrades_gracefully() {
        let mut step = ListStep::new("s", "t", branches());
        type_str(&mut step, "zzz");
        assert!(step.filtered_indices().is_empty());
        assert_eq!(step.update(key(KeyCode::Enter)), StepEvent::Continue);
        // Backspace restores the full set
        step.update(key(KeyCode::Backspace));
        step.update(key(KeyCode::Backspace));
        step.update(key(KeyCode::Backspace));
        assert_eq!(step.filtered_indices(), vec![0, 1, 2]);
    }

    #[test]
    fn alt_backspace_deletes_a_word() {
        let mut step = ListStep::new("s", "t", branches()).fuzzy();
        type_str(&mut step, "feature/x");
        step.update(alt(KeyCode::Backspace));
        assert_eq!(step.filter_text(), "feature/");
        step.update(alt(KeyCode::Backspace));
        assert_eq!(step.filter_text(), "");
    }

    #[test]
    fn char_filter_drops_rejected_input_silently() {
        let mut step =
            ListStep::new("s", "t", branches()).with_char_filter(|c| !c.is_whitespace());
        type_str(&mut step, "a b");
        assert_eq!(step.filter_text(), "ab");
    }

    #[test]
    fn multi_select_toggles_and_respects_max() {
        let mut step = ListStep::new("s", "t", branches())
            .multi_select()
            .with_min_max(0, 2);
        step.update(key(KeyCode::Char(' ')));
        step.update(key(KeyCode::Down));
        step.update(key(KeyCode::Char(' ')));
        step.update(key(KeyCode::Down));
        // Third toggle exceeds max_select and is refused
        step.update(key(KeyCode::Char(' ')));
        assert_eq!(step.selected_indices(), vec![0, 1]);
        // Untoggle works
        step.update(key(KeyCode::Up));
        step.update(key(KeyCode::Char(' ')));
        assert_eq!(step.selected_indices(), vec![0]);
    }

    #[test]
    fn multi_select_enter_refused_below_min() {
        let mut step = ListStep::new("s", "t", branches()).multi_select();
        // Default min is 1: Enter with nothing selected is refused
        assert_eq!(step.update(key(KeyCode::Enter)), StepEvent::Continue);
        assert!(!step.is_complete());
        step.update(key(KeyCode::Char(' ')));
        assert!(step.is_complete());
        assert_eq!(step.update(key(KeyCode::Enter)), StepEvent::SubmitIfReady);
    }

    #[test]
    fn multi_select_explicit_zero_min_allows_empty() {
        let mut step = ListStep::new("s", "t", branches())
            .multi_select()
            .with_min_max(0, 0);
        assert!(step.is_complete());
        assert_eq!(step.update(key(KeyCode::Enter)), StepEvent::SubmitIfReady);
        assert_eq!(step.value().raw, Value::Array(vec![]));
    }

    #[test]
    fn multi_select_value_joins_labels() {
        let mut step = ListStep::new("s", "t", branches()).multi_select();
        step.update(key(KeyCode::Char(' ')));
        step.update(key(KeyCode::Down));
        step.update(key(KeyCode::Char(' ')));
        let value = step.value();
        assert_eq!(value.label, "main, dev");
        assert_eq!(
            value.raw,
            Value::Array(vec!["main".into(), "dev".into()])
        );
    }

    #[test]
    fn create_from_filter_scenario() {
        let mut step = ListStep::new("branch", "Pick", branches())
            .with_create_label(|filter| format!("create branch \"{filter}\""));
        type_str(&mut step, "hotfix");
        // No option matches "hotfix"; the create entry is the only row
        assert!(step.filtered_indices().is_empty());
        let event = step.update(key(KeyCode::Enter));
        assert_eq!(event, StepEvent::SubmitIfReady);
        assert!(step.is_create_selected());
        assert_eq!(step.value().raw, Value::String("hotfix".into()));
        assert_eq!(step.value().label, "hotfix");
    }

    #[test]
    fn create_entry_absent_when_label_matches_exactly() {
        let mut step = ListStep::new("branch", "Pick", branches())
            .with_create_label(|f| format!("create \"{f}\""));
        type_str(&mut step, "dev");
        // "dev" exists; committing selects the real option, not a creation
        step.update(key(KeyCode::Enter));
        assert!(!step.is_create_selected());
        assert_eq!(step.value().raw, Value::String("dev".into()));
    }

    #[test]
    fn recommitting_a_real_option_clears_created() {
        let mut step = ListStep::new("branch", "Pick", branches())
            .with_create_label(|f| format!("create \"{f}\""));
        type_str(&mut step, "hotfix");
        step.update(key(KeyCode::Enter));
        assert!(step.is_create_selected());

        step.clear_input();
        step.update(key(KeyCode::Enter));
        assert!(!step.is_create_selected());
        assert_eq!(step.value().raw, Value::String("main".into()));
    }

    #[test]
    fn set_options_resets_selection_and_reapplies_filter() {
        let mut step = ListStep::new("branch", "Pick", branches());
        type_str(&mut step, "de");
        step.update(key(KeyCode::Enter));
        assert!(step.is_complete());

        step.set_options(vec![
            SelectOption::new("release/1.0"),
            SelectOption::new("dev2"),
        ]);
        assert!(!step.is_complete());
        // Filter "de" still applies, now matching dev2 only
        assert_eq!(step.filtered_indices(), vec![1]);
    }

    #[test]
    fn set_selected_marks_complete() {
        let mut step = ListStep::new("branch", "Pick", branches());
        step.set_selected(&[2]);
        assert!(step.is_complete());
        assert_eq!(step.value().raw, Value::String("feature/x".into()));
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn set_selected_out_of_range_panics() {
        let mut step = ListStep::new("branch", "Pick", branches());
        step.set_selected(&[17]);
    }

    #[test]
    fn value_label_formatter_applies() {
        let options = vec![SelectOption::new("Fix the frobnicator").with_value(42u64)];
        let mut step = ListStep::new("pr", "Pick", options)
            .with_value_label(|o| format!("#{}", o.value().as_u64().unwrap_or(0)));
        step.update(key(KeyCode::Enter));
        assert_eq!(step.value().label, "#42");
        assert_eq!(step.value().raw, Value::from(42u64));
    }

    #[test]
    fn clearable_input_reflects_filter() {
        let mut step = ListStep::new("s", "t", branches());
        assert!(!step.has_clearable_input());
        type_str(&mut step, "ma");
        assert!(step.has_clearable_input());
        step.clear_input();
        assert!(!step.has_clearable_input());
        assert_eq!(step.filtered_indices(), vec![0, 1, 2]);
    }

    #[test]
    fn reset_returns_to_initial_state() {
        let mut step = ListStep::new("s", "t", branches());
        type_str(&mut step, "fe");
        step.update(key(KeyCode::Enter));
        step.reset();
        assert!(!step.is_complete());
        assert_eq!(step.filter_text(), "");
        assert_eq!(step.option_under_cursor(), Some(0));
    }

    #[test]
    fn incomplete_value_is_key_only() {
        let step = ListStep::new("branch", "Pick", branches());
        let value = step.value();
        assert_eq!(value.key, "branch");
        assert_eq!(value.raw, Value::Null);
    }

    #[test]
    fn view_renders_rows_and_cursor() {
        let step = ListStep::new("s", "t", branches());
        let view = step.view(&Theme::plain(), 80);
        assert!(view.contains("❯ main"));
        assert!(view.contains("  dev"));
        assert!(view.contains("type to filter"));
    }

    #[test]
    fn view_shows_disabled_reason() {
        let options = vec![
            SelectOption::new("main")
                .disabled(true)
                .with_description("checked out"),
            SelectOption::new("dev"),
        ];
        let step = ListStep::new("s", "t", options);
        let view = step.view(&Theme::plain(), 80);
        assert!(view.contains("(checked out)"));
    }

    #[test]
    fn view_windows_long_lists() {
        let options: Vec<SelectOption> = (0..30)
            .map(|i| SelectOption::new(format!("branch-{i:02}")))
            .collect();
        let mut step = ListStep::new("s", "t", options);
        step.update(key(KeyCode::End));
        let view = step.view(&Theme::plain(), 80);
        assert!(view.contains("branch-29"));
        assert!(view.contains("above"));
        assert!(!view.contains("branch-00"));
    }

    #[test]
    fn fuzzy_mode_reorders_rows() {
        let options = vec![
            SelectOption::new("scattered-fe-match"),
            SelectOption::new("fex"),
        ];
        let mut step = ListStep::new("s", "t", options).fuzzy();
        type_str(&mut step, "fe");
        assert_eq!(step.filtered_indices(), vec![1, 0]);
    }
}
