//! Crossterm runtime for the wizard: raw mode, inline repaint, key decoding.
//!
//! The wizard renders to stderr so prompts appear even when stdout is
//! redirected. Rendering is inline (no alternate screen): each frame repaints
//! over the previous one and the whole area is cleared when the wizard ends,
//! leaving the scrollback clean.

use std::io::{self, Write};

use anyhow::Context;
use crossterm::event::{Event, KeyEventKind};
use crossterm::{cursor, event, execute, terminal};

use super::{Wizard, WizardResult};
use crate::styling::{Theme, terminal_width};

/// Restores the terminal even when the event loop errors or panics.
struct RawModeGuard;

impl RawModeGuard {
    fn enter() -> anyhow::Result<Self> {
        terminal::enable_raw_mode().context("failed to enable raw terminal mode")?;
        let _ = execute!(io::stderr(), cursor::Hide);
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = execute!(io::stderr(), cursor::Show);
        let _ = terminal::disable_raw_mode();
    }
}

impl Wizard {
    /// Drive the wizard against the terminal until it is submitted or
    /// cancelled, then snapshot the result.
    ///
    /// Terminal runtime failures (raw mode, event decoding) propagate as
    /// errors; cancellation is not an error but a flag on the result.
    pub fn run(&mut self, theme: &Theme) -> anyhow::Result<WizardResult> {
        self.start();
        if !self.is_running() {
            // Every step was skipped; nothing to show
            return Ok(self.result());
        }

        let guard = RawModeGuard::enter()?;
        let mut drawn_lines = 0u16;
        let outcome = self.event_loop(theme, &mut drawn_lines);
        let _ = clear_frame(&mut io::stderr(), drawn_lines);
        drop(guard);
        outcome?;

        Ok(self.result())
    }

    fn event_loop(&mut self, theme: &Theme, drawn_lines: &mut u16) -> anyhow::Result<()> {
        let mut err = io::stderr();
        loop {
            let frame = self.render(theme, terminal_width());
            repaint(&mut err, &frame, drawn_lines)?;

            match event::read().context("failed to read terminal event")? {
                Event::Key(key) if key.kind != KeyEventKind::Release => self.handle_key(key),
                Event::Resize(_, _) => {}
                _ => {}
            }

            if !self.is_running() {
                return Ok(());
            }
        }
    }
}

/// Repaint the frame in place, overwriting the previous one.
fn repaint(out: &mut impl Write, frame: &str, drawn_lines: &mut u16) -> anyhow::Result<()> {
    clear_frame(out, *drawn_lines)?;

    let mut count = 0u16;
    for line in frame.lines() {
        // Raw mode: \n alone does not return the carriage
        out.write_all(line.as_bytes())?;
        out.write_all(b"\r\n")?;
        count += 1;
    }
    out.flush()?;

    *drawn_lines = count;
    Ok(())
}

fn clear_frame(out: &mut impl Write, drawn_lines: u16) -> anyhow::Result<()> {
    if drawn_lines > 0 {
        execute!(
            out,
            cursor::MoveUp(drawn_lines),
            cursor::MoveToColumn(0),
            terminal::Clear(terminal::ClearType::FromCursorDown)
        )?;
    }
    Ok(())
}
