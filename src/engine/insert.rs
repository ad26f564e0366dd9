//! Insert and Replace mode: typed text goes straight into the buffer and is
//! remembered for `.` and the `".` register.

use tracing::debug;

use super::{Engine, Host, escape_left, insert_at, outcome, replicate_block, repeated_text};
use crate::edit::EditPlan;
use crate::error::Result;
use crate::key::{InputEvent, KeyCode};
use crate::mode::{InsertOrigin, ModeState};
use crate::operator::Operator;
use crate::repeat::{self, ChangeDescriptor, InsertKind};
use crate::text::{self, graphemes};
use crate::types::{KeyOutcome, Position, Range};

impl Engine {
    pub(super) fn handle_insert(&mut self, host: &mut Host<'_>, input: &InputEvent) -> KeyOutcome {
        let key = input.as_key();
        let result = match (input, key.code) {
            (_, KeyCode::Esc) => self.finish_insert(host),
            (InputEvent::ReceivedChar(c), _) => self.type_text(host, &c.to_string()),
            (_, KeyCode::Char(c)) if key.text_char().is_some() => {
                self.type_text(host, &c.to_string())
            }
            (_, KeyCode::Enter) => self.type_text(host, "\n"),
            (_, KeyCode::Tab) => {
                let indent = tab_text(host);
                self.type_text(host, &indent)
            }
            (_, KeyCode::Backspace) => self.insert_backspace(host),
            (_, KeyCode::Delete) => delete_forward(host),
            (_, KeyCode::Left | KeyCode::Right | KeyCode::Up | KeyCode::Down) => {
                move_in_line(host, key.code);
                if let ModeState::Insert(session) = &mut self.mode
                    && let Some(change) = session.restart()
                {
                    self.repeat.record_change(change);
                }
                Ok(())
            }
            _ => return KeyOutcome::Ignored,
        };
        outcome(result)
    }

    fn type_text(&mut self, host: &mut Host<'_>, typed: &str) -> Result<()> {
        let caret = host.caret();
        let before = host.text.line_len(caret.line);
        let mut plan = EditPlan::new();
        plan.insert(caret, typed);
        plan.apply(&mut *host.text)?;
        // a combining mark merges into the previous cell, so measure the line
        let next = if typed.contains('\n') {
            text::advance(caret, typed)
        } else {
            let grown = host.text.line_len(caret.line).saturating_sub(before);
            Position::new(caret.line, caret.col + grown)
        };
        host.view.set_caret(next);
        if let ModeState::Insert(session) = &mut self.mode {
            session.typed.push_str(typed);
        }
        Ok(())
    }

    fn insert_backspace(&mut self, host: &mut Host<'_>) -> Result<()> {
        let caret = host.caret();
        let (range, next) = if caret.col > 0 {
            let back = Position::new(caret.line, caret.col - 1);
            (Range::new(back, caret), back)
        } else if caret.line > 0 {
            let prev = caret.line - 1;
            let end = Position::new(prev, host.text.line_len(prev));
            (Range::new(end, caret), end)
        } else {
            return Ok(());
        };
        let mut plan = EditPlan::new();
        plan.delete(range);
        plan.apply(&mut *host.text)?;
        host.view.set_caret(next);
        if let ModeState::Insert(session) = &mut self.mode {
            session.typed.pop();
        }
        Ok(())
    }

    /// Escape: repeats a counted insert, fills the other rows of a block
    /// change, records the change and steps the caret back onto text.
    fn finish_insert(&mut self, host: &mut Host<'_>) -> Result<()> {
        let ModeState::Insert(session) = self.take_mode() else {
            return Ok(());
        };
        let mut caret = host.caret();
        let kind = match session.origin {
            InsertOrigin::Insert(kind) => kind,
            InsertOrigin::Change { .. } => InsertKind::Before,
        };
        let copies = repeat::clamp_count(session.count.unwrap_or(1)) - 1;
        if copies > 0 && !session.typed.is_empty() {
            caret = insert_at(host, caret, &repeated_text(kind, &session.typed, copies))?;
        }
        if let Some(rows) = session.block {
            replicate_block(host, rows, &session.typed)?;
        }
        self.registers.set_last_inserted(&session.typed);
        match session.origin {
            InsertOrigin::Insert(kind) if !session.typed.is_empty() => {
                self.repeat.record_change(ChangeDescriptor::Insert {
                    kind,
                    count: session.count,
                    text: session.typed,
                });
            }
            InsertOrigin::Insert(_) => {}
            InsertOrigin::Change {
                target,
                count,
                register,
            } => {
                self.repeat.record_change(ChangeDescriptor::Operator {
                    op: Operator::Change,
                    target,
                    count,
                    register,
                    inserted: Some(session.typed),
                });
            }
        }
        host.view.set_caret(escape_left(&*host.text, caret));
        Ok(())
    }

    pub(super) fn handle_replace(&mut self, host: &mut Host<'_>, input: &InputEvent) -> KeyOutcome {
        let key = input.as_key();
        let result = match (input, key.code) {
            (_, KeyCode::Esc) => self.finish_replace(host),
            (InputEvent::ReceivedChar(c), _) => self.overwrite_char(host, *c),
            (_, KeyCode::Char(c)) if key.text_char().is_some() => self.overwrite_char(host, c),
            (_, KeyCode::Enter) => self.replace_newline(host),
            (_, KeyCode::Backspace) => self.replace_backspace(host),
            (_, KeyCode::Left | KeyCode::Right | KeyCode::Up | KeyCode::Down) => {
                move_in_line(host, key.code);
                if let ModeState::Replace(session) = &mut self.mode {
                    session.typed.clear();
                    session.overwritten.clear();
                    session.count = None;
                }
                Ok(())
            }
            _ => return KeyOutcome::Ignored,
        };
        outcome(result)
    }

    fn overwrite_char(&mut self, host: &mut Host<'_>, c: char) -> Result<()> {
        let caret = host.caret();
        let original = {
            let line = host.text.line(caret.line);
            text::grapheme_at(&line, caret.col).map(str::to_owned)
        };
        let mut plan = EditPlan::new();
        match original {
            Some(_) => plan.replace(
                Range::new(caret, Position::new(caret.line, caret.col + 1)),
                c.to_string(),
            ),
            None => plan.insert(caret, c.to_string()),
        }
        plan.apply(&mut *host.text)?;
        host.view.set_caret(Position::new(caret.line, caret.col + 1));
        if let ModeState::Replace(session) = &mut self.mode {
            session.typed.push(c);
            session.overwritten.push(original);
        }
        Ok(())
    }

    /// Enter in Replace mode breaks the line instead of overwriting.
    fn replace_newline(&mut self, host: &mut Host<'_>) -> Result<()> {
        let caret = host.caret();
        let next = insert_at(host, caret, "\n")?;
        host.view.set_caret(next);
        if let ModeState::Replace(session) = &mut self.mode {
            session.typed.push('\n');
            session.overwritten.clear();
        }
        Ok(())
    }

    /// Backspace in Replace mode puts back what the last typed character
    /// overwrote.
    fn replace_backspace(&mut self, host: &mut Host<'_>) -> Result<()> {
        let caret = host.caret();
        if caret.col == 0 {
            return Ok(());
        }
        let back = Position::new(caret.line, caret.col - 1);
        if let ModeState::Replace(session) = &mut self.mode
            && let Some(original) = session.overwritten.pop()
        {
            session.typed.pop();
            let range = Range::new(back, caret);
            let mut plan = EditPlan::new();
            match original {
                Some(cell) => plan.replace(range, cell),
                None => plan.delete(range),
            }
            plan.apply(&mut *host.text)?;
        }
        host.view.set_caret(back);
        Ok(())
    }

    fn finish_replace(&mut self, host: &mut Host<'_>) -> Result<()> {
        let ModeState::Replace(session) = self.take_mode() else {
            return Ok(());
        };
        let mut caret = host.caret();
        let copies = repeat::clamp_count(session.count.unwrap_or(1)) - 1;
        if copies > 0 && !session.typed.is_empty() {
            caret = overwrite(host, caret, &session.typed.repeat(copies as usize))?;
        }
        self.registers.set_last_inserted(&session.typed);
        if !session.typed.is_empty() {
            debug!(typed = %session.typed, "replace mode finished");
            self.repeat.record_change(ChangeDescriptor::Overwrite {
                text: session.typed,
                count: session.count,
            });
        }
        host.view.set_caret(escape_left(&*host.text, caret));
        Ok(())
    }
}

/// Types `typed` over existing text from `at`, the way Replace mode
/// does: characters past the line end are appended and line breaks are
/// inserted. Returns the position after the text.
pub(super) fn overwrite(host: &mut Host<'_>, at: Position, typed: &str) -> Result<Position> {
    let mut caret = at;
    for (i, segment) in typed.split('\n').enumerate() {
        if i > 0 {
            caret = insert_at(host, caret, "\n")?;
        }
        if segment.is_empty() {
            continue;
        }
        let width = graphemes(segment).len() as u32;
        let len = host.text.line_len(caret.line);
        let covered = width.min(len.saturating_sub(caret.col));
        let mut plan = EditPlan::new();
        plan.replace(
            Range::new(caret, Position::new(caret.line, caret.col + covered)),
            segment,
        );
        plan.apply(&mut *host.text)?;
        caret = Position::new(caret.line, caret.col + width);
    }
    Ok(caret)
}

/// What Tab types: a tab character, or spaces to the next tab stop with
/// `expandtab`.
fn tab_text(host: &Host<'_>) -> String {
    if !host.settings.expand_tab() {
        return "\t".to_string();
    }
    let tab_stop = host.settings.tab_stop().max(1);
    let caret = host.caret();
    let line = host.text.line(caret.line);
    let mut column = 0;
    for cell in graphemes(&line).into_iter().take(caret.col as usize) {
        column = match cell {
            "\t" => column + tab_stop - column % tab_stop,
            _ => column + 1,
        };
    }
    " ".repeat((tab_stop - column % tab_stop) as usize)
}

/// The Delete key: removes the character under the caret, or joins the next
/// line at the end of a line.
fn delete_forward(host: &mut Host<'_>) -> Result<()> {
    let caret = host.caret();
    let len = host.text.line_len(caret.line);
    let range = if caret.col < len {
        Range::new(caret, Position::new(caret.line, caret.col + 1))
    } else if caret.line < host.text.last_line() {
        Range::new(caret, Position::new(caret.line + 1, 0))
    } else {
        return Ok(());
    };
    let mut plan = EditPlan::new();
    plan.delete(range);
    plan.apply(&mut *host.text)
}

/// Arrow keys in Insert and Replace mode; the caret may sit past the last
/// character.
fn move_in_line(host: &mut Host<'_>, code: KeyCode) {
    let caret = host.caret();
    let next = match code {
        KeyCode::Left => Position::new(caret.line, caret.col.saturating_sub(1)),
        KeyCode::Right => Position::new(caret.line, caret.col + 1),
        KeyCode::Up => Position::new(caret.line.saturating_sub(1), caret.col),
        _ => Position::new(caret.line + 1, caret.col),
    };
    host.view.set_caret(host.text.clamp(next));
}
