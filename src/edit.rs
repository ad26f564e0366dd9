//! Edit plans and the edits that are not operators: put, join, replace and
//! case toggling under the caret.
//!
//! Every edit is first written out as a list of [`Command`]s computed against
//! the unchanged buffer. The plan is checked as a whole and applied bottom-up
//! only when every range is valid, so a command either edits everything it
//! meant to or nothing at all.

use tracing::trace;

use crate::error::{Result, VimError};
use crate::register::RegisterValue;
use crate::text::{self, graphemes, line_total};
use crate::traits::TextBuffer;
use crate::types::{Command, Position, Range, Shape};

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct EditPlan {
    commands: Vec<Command>,
}

impl EditPlan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn delete(&mut self, range: Range) {
        if !range.is_empty() {
            self.commands.push(Command::Delete { range });
        }
    }

    pub fn insert(&mut self, at: Position, text: impl Into<String>) {
        let text = text.into();
        if !text.is_empty() {
            self.commands.push(Command::InsertText { at, text });
        }
    }

    pub fn replace(&mut self, range: Range, text: impl Into<String>) {
        self.commands.push(Command::Replace {
            range,
            text: text.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    pub fn validate<B: TextBuffer + ?Sized>(&self, buf: &B) -> Result<()> {
        for command in &self.commands {
            match command {
                Command::Delete { range } | Command::Replace { range, .. } => {
                    text::validate_range(buf, *range)?
                }
                Command::InsertText { at, .. } => text::validate(buf, *at)?,
                Command::SetCursor(_) | Command::SetSelection(_) => {}
            }
        }
        Ok(())
    }

    /// Validates, then applies every edit from the bottom of the buffer up
    /// so earlier positions stay valid.
    pub fn apply<B: TextBuffer + ?Sized>(mut self, buf: &mut B) -> Result<()> {
        self.validate(buf)?;
        if self.commands.is_empty() {
            return Ok(());
        }
        // edits at the same spot land in plan order
        self.commands.reverse();
        self.commands.sort_by_key(|command| std::cmp::Reverse(edit_start(command)));
        buf.begin_edit();
        for command in self.commands {
            trace!(?command, "applying edit");
            match command {
                Command::Delete { range } => buf.delete(range),
                Command::InsertText { at, text } => buf.insert(at, &text),
                Command::Replace { range, text } => buf.replace(range, &text),
                Command::SetCursor(_) | Command::SetSelection(_) => {}
            }
        }
        buf.end_edit();
        Ok(())
    }
}

fn edit_start(command: &Command) -> Position {
    match command {
        Command::Delete { range } | Command::Replace { range, .. } => range.start,
        Command::InsertText { at, .. } => *at,
        Command::SetCursor(_) | Command::SetSelection(_) => Position::ZERO,
    }
}

/// Puts register contents `count` times after (`p`) or before (`P`) the
/// caret. Returns where the caret ends up.
pub fn put<B: TextBuffer + ?Sized>(
    buf: &mut B,
    caret: Position,
    value: &RegisterValue,
    count: u32,
    before: bool,
) -> Result<Position> {
    let caret = text::clamp_normal(buf, caret);
    let count = count.max(1) as usize;
    let mut plan = EditPlan::new();
    match value.shape {
        Shape::Line => {
            let body = value.text.repeat(count);
            let target_line = if before { caret.line } else { caret.line + 1 };
            if target_line < line_total(buf) {
                plan.insert(Position::new(target_line, 0), body);
            } else {
                // below the last line there is no line start to insert at
                let last = buf.last_line();
                let body = body.strip_suffix('\n').unwrap_or(&body);
                plan.insert(Position::new(last, buf.line_len(last)), format!("\n{body}"));
            }
            plan.apply(buf)?;
            Ok(text::first_non_blank(buf, target_line.min(buf.last_line())))
        }
        Shape::Character => {
            let len = buf.line_len(caret.line);
            let at = if before || len == 0 {
                caret
            } else {
                Position::new(caret.line, caret.col + 1)
            };
            let body = value.text.repeat(count);
            plan.insert(at, body.clone());
            plan.apply(buf)?;
            if body.contains('\n') {
                return Ok(at);
            }
            let width = graphemes(&body).len() as u32;
            Ok(Position::new(at.line, at.col + width.saturating_sub(1)))
        }
        Shape::Block => {
            let col = if before || buf.line_len(caret.line) == 0 {
                caret.col
            } else {
                caret.col + 1
            };
            let rows: Vec<&str> = value.text.split('\n').collect();
            let width = rows.iter().map(|r| graphemes(r).len()).max().unwrap_or(0);
            let total = line_total(buf);
            let mut appended = String::new();
            for (i, row) in rows.iter().enumerate() {
                let line = caret.line + i as u32;
                let mut cell = String::new();
                for _ in 0..count {
                    cell.push_str(row);
                    let pad = width - graphemes(row).len();
                    cell.push_str(&" ".repeat(pad));
                }
                if line >= total {
                    // new rows below the buffer start at the block column
                    appended.push('\n');
                    appended.push_str(&" ".repeat(col as usize));
                    appended.push_str(cell.trim_end());
                    continue;
                }
                let len = buf.line_len(line);
                if len < col {
                    let padding = " ".repeat((col - len) as usize);
                    plan.insert(Position::new(line, len), padding + cell.trim_end());
                } else if len == col {
                    plan.insert(Position::new(line, col), cell.trim_end().to_string());
                } else {
                    plan.insert(Position::new(line, col), cell);
                }
            }
            if !appended.is_empty() {
                let last = buf.last_line();
                plan.insert(Position::new(last, buf.line_len(last)), appended);
            }
            plan.apply(buf)?;
            Ok(Position::new(caret.line, col))
        }
    }
}

/// Joins `count` lines (at least two) starting at `line`, Vim style: leading
/// whitespace of each joined line is dropped and a single space separates
/// the pieces. Returns the caret position at the last join.
pub fn join_lines<B: TextBuffer + ?Sized>(buf: &mut B, line: u32, count: u32) -> Result<Position> {
    let last = buf.last_line();
    if line >= last {
        return Err(VimError::OutOfRange { line: line + 1, col: 0 });
    }
    let end = (line + count.max(2) - 1).min(last);
    let mut joined = buf.line(line).into_owned();
    let mut caret_col = 0;
    for next in line + 1..=end {
        let next_text = buf.line(next);
        let trimmed = next_text.trim_start_matches([' ', '\t']);
        let trailing_blank = joined.ends_with(' ') || joined.ends_with('\t');
        if trimmed.is_empty() || trailing_blank || trimmed.starts_with(')') {
            caret_col = graphemes(&joined).len();
        } else {
            caret_col = graphemes(&joined).len();
            joined.push(' ');
        }
        joined.push_str(trimmed);
    }
    let range = Range::new(
        Position::new(line, 0),
        Position::new(end, buf.line_len(end)),
    );
    let mut plan = EditPlan::new();
    plan.replace(range, joined);
    plan.apply(buf)?;
    Ok(text::clamp_normal(buf, Position::new(line, caret_col as u32)))
}

/// Replaces `count` characters under and after the caret with `ch` (`r`).
/// Fails when fewer than `count` characters remain on the line.
pub fn replace_chars<B: TextBuffer + ?Sized>(
    buf: &mut B,
    caret: Position,
    ch: char,
    count: u32,
) -> Result<Position> {
    let count = count.max(1);
    let len = buf.line_len(caret.line);
    if caret.col + count > len {
        return Err(VimError::OutOfRange {
            line: caret.line,
            col: caret.col + count,
        });
    }
    let range = Range::new(caret, Position::new(caret.line, caret.col + count));
    let mut plan = EditPlan::new();
    plan.replace(range, ch.to_string().repeat(count as usize));
    plan.apply(buf)?;
    Ok(Position::new(caret.line, caret.col + count - 1))
}

/// Toggles the case of `count` characters from the caret (`~`) and returns
/// the position after them.
pub fn toggle_case_chars<B: TextBuffer + ?Sized>(
    buf: &mut B,
    caret: Position,
    count: u32,
) -> Result<Position> {
    let len = buf.line_len(caret.line);
    if len == 0 {
        return Ok(caret);
    }
    let end = (caret.col + count.max(1)).min(len);
    let range = Range::new(caret, Position::new(caret.line, end));
    let swapped = swap_case(&text::slice(buf, range));
    let mut plan = EditPlan::new();
    plan.replace(range, swapped);
    plan.apply(buf)?;
    Ok(text::clamp_normal(buf, Position::new(caret.line, end)))
}

pub fn swap_case(s: &str) -> String {
    s.chars()
        .flat_map(|c| {
            let flipped: Vec<char> = if c.is_lowercase() {
                c.to_uppercase().collect()
            } else if c.is_uppercase() {
                c.to_lowercase().collect()
            } else {
                vec![c]
            };
            flipped
        })
        .collect()
}
