//! Free-text input step.
//!
//! A thin specialization next to [`super::ListStep`]: one string buffer,
//! Enter commits (empty input is permitted), Escape clears the buffer before
//! cancelling via the clearable-input path. No filtering or fuzzy logic.

use std::any::Any;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use serde_json::Value;

use super::option::StepValue;
use super::step::{Step, StepEvent};
use crate::styling::{Theme, truncate_to_width};

type CharFilter = Box<dyn Fn(char) -> bool>;

pub struct TextStep {
    id: String,
    title: String,
    buffer: String,
    committed: bool,
    placeholder: Option<String>,
    char_filter: Option<CharFilter>,
}

impl TextStep {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            buffer: String::new(),
            committed: false,
            placeholder: None,
            char_filter: None,
        }
    }

    /// Dim hint shown while the buffer is empty.
    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    /// Restrict accepted characters; rejected input is dropped silently.
    pub fn with_char_filter(mut self, accept: impl Fn(char) -> bool + 'static) -> Self {
        self.char_filter = Some(Box::new(accept));
        self
    }

    /// Pre-fill the buffer (does not mark the step complete).
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.buffer = text.into();
    }

    pub fn text(&self) -> &str {
        &self.buffer
    }

    fn push_char(&mut self, ch: char) {
        if ch.is_control() {
            return;
        }
        if let Some(accept) = &self.char_filter
            && !accept(ch)
        {
            return;
        }
        self.buffer.push(ch);
    }

    fn delete_word(&mut self) {
        let trimmed = self.buffer.trim_end_matches(|c: char| !c.is_alphanumeric());
        let trimmed = trimmed.trim_end_matches(char::is_alphanumeric);
        self.buffer.truncate(trimmed.len());
    }
}

impl Step for TextStep {
    fn id(&self) -> &str {
        &self.id
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn reset(&mut self) {
        self.buffer.clear();
        self.committed = false;
    }

    fn update(&mut self, key: KeyEvent) -> StepEvent {
        match key.code {
            KeyCode::Enter => {
                self.committed = true;
                return StepEvent::SubmitIfReady;
            }
            KeyCode::Backspace if key.modifiers.contains(KeyModifiers::ALT) => self.delete_word(),
            KeyCode::Backspace => {
                self.buffer.pop();
            }
            KeyCode::Char(c)
                if !key
                    .modifiers
                    .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
            {
                self.push_char(c)
            }
            _ => {}
        }
        StepEvent::Continue
    }

    fn view(&self, theme: &Theme, width: usize) -> String {
        let input = theme.input;
        let dim = theme.dim;
        if self.buffer.is_empty() {
            let hint = self.placeholder.as_deref().unwrap_or("type a value");
            format!("  {input}▌{input:#} {dim}{hint}{dim:#}")
        } else {
            let text = truncate_to_width(&self.buffer, width.saturating_sub(4));
            format!("  {input}{text}▌{input:#}")
        }
    }

    fn help(&self) -> String {
        "enter confirm · esc clear/cancel".to_string()
    }

    fn is_complete(&self) -> bool {
        self.committed
    }

    fn value(&self) -> StepValue {
        if !self.committed {
            return StepValue::empty(self.id.as_str());
        }
        StepValue {
            key: self.id.clone(),
            label: self.buffer.clone(),
            raw: Value::String(self.buffer.clone()),
        }
    }

    fn has_clearable_input(&self) -> bool {
        !self.buffer.is_empty()
    }

    fn clear_input(&mut self) {
        self.buffer.clear();
        self.committed = false;
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
