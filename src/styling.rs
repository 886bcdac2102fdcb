//! Consolidated styling module for terminal output.
//!
//! Built on the anstyle ecosystem:
//! - anstream for auto-detecting color support (respects `NO_COLOR`)
//! - anstyle for composable styles
//! - color-print for inline-markup messages
//!
//! ## stdout vs stderr principle
//!
//! - **stdout**: data output (`list --json`, config dumps)
//! - **stderr**: everything interactive — the wizard renders to stderr so
//!   stdout stays clean when redirected
//!
//! Use `cformat!` with HTML-like tags for user-facing messages:
//!
//! ```
//! use color_print::cformat;
//!
//! let branch = "feature";
//! let msg = cformat!("<green>Created worktree for <bold>{branch}</></>");
//! ```
//!
//! Semantic mapping: errors `<red>`, warnings `<yellow>`, hints `<dim>`,
//! progress `<cyan>`, success `<green>`, secondary `<bright-black>`.

use anstyle::{AnsiColor, Color, Style};
use color_print::{cformat, cstr};
use unicode_width::UnicodeWidthStr;

/// Auto-detecting print macros that respect NO_COLOR, CLICOLOR_FORCE, and
/// terminal capabilities.
pub use anstream::{eprint, eprintln, print, println};

// ============================================================================
// Message Symbols
// ============================================================================
//
// Single-width Unicode symbols for message prefixes with embedded colors.
// `cstr!` creates colored `&'static str` constants that work everywhere.

/// Progress symbol (cyan ◎)
pub const PROGRESS_SYMBOL: &str = cstr!("<cyan>◎</>");

/// Success symbol (green ✓)
pub const SUCCESS_SYMBOL: &str = cstr!("<green>✓</>");

/// Error symbol (red ✗)
pub const ERROR_SYMBOL: &str = cstr!("<red>✗</>");

/// Warning symbol (yellow ▲)
pub const WARNING_SYMBOL: &str = cstr!("<yellow>▲</>");

/// Hint symbol (dim ↳)
pub const HINT_SYMBOL: &str = cstr!("<dim>↳</>");

/// Info symbol (dim ○) - for neutral status
pub const INFO_SYMBOL: &str = cstr!("<dim>○</>");

/// Prompt symbol (cyan ❯) - for questions requiring user input
pub const PROMPT_SYMBOL: &str = cstr!("<cyan>❯</>");

// ============================================================================
// Formatted Message Type
// ============================================================================

use std::fmt;

/// A message that has already been formatted with symbol and styling.
///
/// Message functions take `impl AsRef<str>` and return `FormattedMessage`.
/// Since `FormattedMessage` does NOT implement `AsRef<str>`, passing one back
/// into a message function is a compile error — double-formatting is
/// unrepresentable.
#[derive(Debug, Clone)]
pub struct FormattedMessage(String);

impl FormattedMessage {
    /// Create a formatted message from a pre-formatted string.
    ///
    /// Use this when implementing `Into<FormattedMessage>` for error types
    /// that format themselves (like `GitError`).
    pub fn new(content: String) -> Self {
        Self(content)
    }

    /// Borrow the inner string for inspection (e.g., in tests).
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FormattedMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<FormattedMessage> for String {
    fn from(msg: FormattedMessage) -> String {
        msg.0
    }
}

/// Format an error message with symbol and red styling.
///
/// Content can include inner styling like `<bold>`:
/// ```
/// use color_print::cformat;
/// use grove::styling::error_message;
///
/// let name = "feature";
/// println!("{}", error_message(cformat!("Branch <bold>{name}</> not found")));
/// ```
pub fn error_message(content: impl AsRef<str>) -> FormattedMessage {
    FormattedMessage(cformat!("{ERROR_SYMBOL} <red>{}</>", content.as_ref()))
}

/// Format a hint message with symbol and dim styling
pub fn hint_message(content: impl AsRef<str>) -> FormattedMessage {
    FormattedMessage(cformat!("{HINT_SYMBOL} <dim>{}</>", content.as_ref()))
}

/// Format a warning message with symbol and yellow styling
pub fn warning_message(content: impl AsRef<str>) -> FormattedMessage {
    FormattedMessage(cformat!("{WARNING_SYMBOL} <yellow>{}</>", content.as_ref()))
}

/// Format a success message with symbol and green styling
pub fn success_message(content: impl AsRef<str>) -> FormattedMessage {
    FormattedMessage(cformat!("{SUCCESS_SYMBOL} <green>{}</>", content.as_ref()))
}

/// Format a progress message with symbol and cyan styling
pub fn progress_message(content: impl AsRef<str>) -> FormattedMessage {
    FormattedMessage(cformat!("{PROGRESS_SYMBOL} <cyan>{}</>", content.as_ref()))
}

/// Format an info message with symbol (no color on text - neutral status)
pub fn info_message(content: impl AsRef<str>) -> FormattedMessage {
    FormattedMessage(format!("{INFO_SYMBOL} {}", content.as_ref()))
}

// ============================================================================
// Terminal Width
// ============================================================================

/// Default terminal width fallback if detection fails
const DEFAULT_TERMINAL_WIDTH: usize = 80;

/// Get terminal width, defaulting to 80 if detection fails.
///
/// Checks the COLUMNS environment variable first (for testing and scripts),
/// then falls back to actual terminal size detection.
pub fn terminal_width() -> usize {
    if let Ok(cols) = std::env::var("COLUMNS")
        && let Ok(width) = cols.parse::<usize>()
    {
        return width;
    }

    terminal_size::terminal_size()
        .map(|(terminal_size::Width(w), _)| w as usize)
        .unwrap_or(DEFAULT_TERMINAL_WIDTH)
}

/// Truncate `text` to at most `max_width` columns, appending `…` when cut.
///
/// Width is measured in display columns (unicode-aware), not bytes or chars.
pub fn truncate_to_width(text: &str, max_width: usize) -> String {
    if text.width() <= max_width {
        return text.to_string();
    }
    if max_width == 0 {
        return String::new();
    }

    let mut out = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let w = unicode_width::UnicodeWidthChar::width(ch).unwrap_or(0);
        if used + w > max_width.saturating_sub(1) {
            break;
        }
        out.push(ch);
        used += w;
    }
    out.push('…');
    out
}

// ============================================================================
// Styled Output Types
// ============================================================================

/// A piece of text with an optional style
#[derive(Clone, Debug)]
pub struct StyledString {
    pub text: String,
    pub style: Option<Style>,
}

impl StyledString {
    pub fn new(text: impl Into<String>, style: Option<Style>) -> Self {
        Self {
            text: text.into(),
            style,
        }
    }

    pub fn raw(text: impl Into<String>) -> Self {
        Self::new(text, None)
    }

    pub fn styled(text: impl Into<String>, style: Style) -> Self {
        Self::new(text, Some(style))
    }

    /// Returns the visual width (unicode-aware, no ANSI codes)
    pub fn width(&self) -> usize {
        self.text.width()
    }

    /// Renders to a string with ANSI escape codes
    pub fn render(&self) -> String {
        if let Some(style) = &self.style {
            format!("{}{}{}", style.render(), self.text, style.render_reset())
        } else {
            self.text.clone()
        }
    }
}

/// A line composed of multiple styled strings
#[derive(Clone, Debug, Default)]
pub struct StyledLine {
    pub segments: Vec<StyledString>,
}

impl StyledLine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a raw (unstyled) segment
    pub fn push_raw(&mut self, text: impl Into<String>) {
        self.segments.push(StyledString::raw(text));
    }

    /// Add a styled segment
    pub fn push_styled(&mut self, text: impl Into<String>, style: Style) {
        self.segments.push(StyledString::styled(text, style));
    }

    /// Pad with spaces to reach a specific width
    pub fn pad_to(&mut self, target_width: usize) {
        let current_width = self.width();
        if current_width < target_width {
            self.push_raw(" ".repeat(target_width - current_width));
        }
    }

    /// Returns the total visual width
    pub fn width(&self) -> usize {
        self.segments.iter().map(|s| s.width()).sum()
    }

    /// Renders the entire line with ANSI escape codes
    pub fn render(&self) -> String {
        self.segments.iter().map(|s| s.render()).collect()
    }
}

// ============================================================================
// Wizard Theme
// ============================================================================

/// Styles for wizard rendering, passed explicitly into every render call.
///
/// Steps never reach for global style state; the active theme is resolved
/// once per command from user config and threaded through `view()`.
#[derive(Clone, Debug)]
pub struct Theme {
    /// Step title of the active step
    pub title: Style,
    /// Cursor marker and the row under it
    pub cursor: Style,
    /// Toggled entries in multi-select lists
    pub selected: Style,
    /// Disabled entries and their reason text
    pub disabled: Style,
    /// Matched characters under a fuzzy filter
    pub matched: Style,
    /// The filter / text-input buffer
    pub input: Style,
    /// Help and info lines
    pub dim: Style,
    /// Completed-step values in the trail
    pub summary: Style,
}

impl Theme {
    /// The standard ANSI theme.
    pub fn ansi() -> Self {
        Self {
            title: Style::new().bold(),
            cursor: Style::new().fg_color(Some(Color::Ansi(AnsiColor::Cyan))),
            selected: Style::new().fg_color(Some(Color::Ansi(AnsiColor::Green))),
            disabled: Style::new().dimmed(),
            matched: Style::new()
                .bold()
                .fg_color(Some(Color::Ansi(AnsiColor::Magenta))),
            input: Style::new().fg_color(Some(Color::Ansi(AnsiColor::Cyan))),
            dim: Style::new().dimmed(),
            summary: Style::new().fg_color(Some(Color::Ansi(AnsiColor::Green))),
        }
    }

    /// No styling at all. Used when the user sets `ui.theme = "plain"` and in
    /// tests that assert on rendered output.
    pub fn plain() -> Self {
        Self {
            title: Style::new(),
            cursor: Style::new(),
            selected: Style::new(),
            disabled: Style::new(),
            matched: Style::new(),
            input: Style::new(),
            dim: Style::new(),
            summary: Style::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbol_constants_contain_their_glyphs() {
        // Symbols are pre-colored with ANSI codes, but contain the Unicode character
        assert!(PROGRESS_SYMBOL.contains("◎"));
        assert!(SUCCESS_SYMBOL.contains("✓"));
        assert!(ERROR_SYMBOL.contains("✗"));
        assert!(WARNING_SYMBOL.contains("▲"));
        assert!(HINT_SYMBOL.contains("↳"));
        assert!(INFO_SYMBOL.contains("○"));
        assert!(PROMPT_SYMBOL.contains("❯"));
    }

    #[test]
    fn error_message_wraps_content() {
        let msg = error_message("Something went wrong");
        assert!(msg.as_str().contains(ERROR_SYMBOL));
        assert!(msg.as_str().contains("Something went wrong"));
    }

    #[test]
    fn info_message_has_no_color_on_text() {
        let msg = info_message("5 worktrees");
        assert!(msg.as_str().contains(INFO_SYMBOL));
        assert!(msg.as_str().ends_with("5 worktrees"));
    }

    #[test]
    fn truncate_short_text_unchanged() {
        assert_eq!(truncate_to_width("abc", 10), "abc");
    }

    #[test]
    fn truncate_cuts_and_marks() {
        assert_eq!(truncate_to_width("abcdefgh", 5), "abcd…");
    }

    #[test]
    fn truncate_handles_wide_chars() {
        // Each CJK char is two columns wide
        let out = truncate_to_width("日本語テキスト", 5);
        assert!(unicode_width::UnicodeWidthStr::width(out.as_str()) <= 5);
        assert!(out.ends_with('…'));
    }

    #[test]
    fn styled_line_pads_to_width() {
        let mut line = StyledLine::new();
        line.push_raw("ab");
        line.pad_to(5);
        assert_eq!(line.width(), 5);
        assert_eq!(line.render(), "ab   ");
    }
}
