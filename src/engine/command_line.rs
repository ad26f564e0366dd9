//! Command-line mode: the line typed after `:` and a small set of ex
//! commands working on line ranges.

use tracing::debug;

use super::{Engine, Host, outcome};
use crate::edit;
use crate::error::Result;
use crate::key::{InputEvent, KeyCode};
use crate::mode::ModeState;
use crate::operator::Operator;
use crate::register::RegisterName;
use crate::text;
use crate::types::KeyOutcome;

/// Where an address starts counting from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Base {
    /// A 1-based line number.
    Number(u32),
    /// `.`
    Current,
    /// `$`
    Last,
    /// `'<`
    VisualStart,
    /// `'>`
    VisualEnd,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Address {
    base: Base,
    offset: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineRange {
    /// No address: the caret line.
    Current,
    /// `%`
    Whole,
    Single(Address),
    Pair(Address, Address),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExCommand {
    /// A bare range jumps to its last line.
    Goto,
    Delete(Option<char>),
    Yank(Option<char>),
    /// `>` or `<`, repeated `amount` times.
    Shift { op: Operator, amount: u32 },
    Join,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ExLine {
    range: LineRange,
    command: ExCommand,
}

impl Engine {
    pub(super) fn handle_command_line(&mut self, host: &mut Host<'_>, input: &InputEvent) -> KeyOutcome {
        let ModeState::CommandLine(state) = &mut self.mode else {
            return KeyOutcome::Ignored;
        };
        let key = input.as_key();
        match (input, key.code) {
            (_, KeyCode::Esc) => {
                self.set_mode(ModeState::Normal);
                KeyOutcome::Handled
            }
            (_, KeyCode::Enter) => {
                let line = std::mem::take(&mut state.text);
                self.set_mode(ModeState::Normal);
                let result = self.run_ex(host, &line);
                let caret = text::clamp_normal(&*host.text, host.caret());
                host.view.set_caret(caret);
                outcome(result)
            }
            (_, KeyCode::Backspace) => {
                // backspace on an empty line leaves the command line
                if state.text.pop().is_none() {
                    self.set_mode(ModeState::Normal);
                }
                KeyOutcome::Handled
            }
            (InputEvent::ReceivedChar(c), _) => {
                state.text.push(*c);
                KeyOutcome::Handled
            }
            (_, KeyCode::Char(c)) if key.text_char().is_some() => {
                state.text.push(c);
                KeyOutcome::Handled
            }
            _ => KeyOutcome::Ignored,
        }
    }

    fn run_ex(&mut self, host: &mut Host<'_>, input: &str) -> Result<()> {
        let Some(ex) = parse_ex(input) else {
            debug!(input, "unsupported ex command");
            return Ok(());
        };
        debug!(?ex, "ex command");
        let caret = host.caret();
        let last = host.text.last_line();
        let resolve = |address: Address| self.resolve_address(address, caret.line, last);
        let (first, end) = match ex.range {
            LineRange::Current => (caret.line, caret.line),
            LineRange::Whole => (0, last),
            LineRange::Single(address) => {
                let line = resolve(address);
                (line, line)
            }
            LineRange::Pair(a, b) => {
                let (a, b) = (resolve(a), resolve(b));
                (a.min(b), a.max(b))
            }
        };
        let span = text::line_span(&*host.text, first, end)?;
        match ex.command {
            ExCommand::Goto => {
                if ex.range != LineRange::Current {
                    host.view.set_caret(text::first_non_blank(&*host.text, end));
                }
            }
            ExCommand::Delete(register) => {
                let register = register.map(RegisterName::parse_or_unnamed);
                let result = self.apply_operator(host, Operator::Delete, span, 1, register)?;
                host.view.set_caret(result.caret);
            }
            ExCommand::Yank(register) => {
                let register = register.map(RegisterName::parse_or_unnamed);
                self.apply_operator(host, Operator::Yank, span, 1, register)?;
            }
            ExCommand::Shift { op, amount } => {
                let result = self.apply_operator(host, op, span, amount, None)?;
                host.view.set_caret(result.caret);
            }
            ExCommand::Join => {
                let caret = edit::join_lines(&mut *host.text, first, (end - first + 1).max(2))?;
                host.view.set_caret(caret);
            }
        }
        Ok(())
    }

    /// A zero-based line for `address`, clamped into the buffer.
    fn resolve_address(&self, address: Address, current: u32, last: u32) -> u32 {
        let base = match address.base {
            Base::Number(n) => n.saturating_sub(1),
            Base::Current => current,
            Base::Last => last,
            Base::VisualStart => self.last_visual.map_or(current, |(start, _)| start),
            Base::VisualEnd => self.last_visual.map_or(current, |(_, end)| end),
        };
        (i64::from(base) + address.offset).clamp(0, i64::from(last)) as u32
    }
}

fn parse_ex(input: &str) -> Option<ExLine> {
    let mut rest = input.trim_start_matches([' ', ':']);
    let range = if let Some(after) = rest.strip_prefix('%') {
        rest = after;
        LineRange::Whole
    } else {
        match parse_address(&mut rest)? {
            None => LineRange::Current,
            Some(first) => match rest.strip_prefix(',') {
                Some(after) => {
                    rest = after;
                    let second = parse_address(&mut rest)??;
                    LineRange::Pair(first, second)
                }
                None => LineRange::Single(first),
            },
        }
    };
    let command = parse_command(rest.trim())?;
    Some(ExLine { range, command })
}

/// Parses one address off the front of `rest`. The outer `None` is a
/// malformed address, the inner one no address at all.
fn parse_address(rest: &mut &str) -> Option<Option<Address>> {
    let s = *rest;
    let (base, mut after) = if let Some(after) = s.strip_prefix("'<") {
        (Base::VisualStart, after)
    } else if let Some(after) = s.strip_prefix("'>") {
        (Base::VisualEnd, after)
    } else if let Some(after) = s.strip_prefix('.') {
        (Base::Current, after)
    } else if let Some(after) = s.strip_prefix('$') {
        (Base::Last, after)
    } else if s.starts_with(['+', '-']) {
        (Base::Current, s)
    } else {
        let (digits, after) = split_digits(s);
        if digits.is_empty() {
            return Some(None);
        }
        (Base::Number(digits.parse().ok()?), after)
    };

    let mut offset = 0i64;
    while let Some(sign) = after.chars().next().filter(|c| matches!(c, '+' | '-')) {
        let (digits, tail) = split_digits(&after[1..]);
        let n: i64 = if digits.is_empty() { 1 } else { digits.parse().ok()? };
        offset += if sign == '+' { n } else { -n };
        after = tail;
    }
    *rest = after;
    Some(Some(Address { base, offset }))
}

fn split_digits(s: &str) -> (&str, &str) {
    let end = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    s.split_at(end)
}

fn parse_command(rest: &str) -> Option<ExCommand> {
    if rest.is_empty() {
        return Some(ExCommand::Goto);
    }
    if let Some(ch) = rest.chars().next().filter(|c| matches!(c, '>' | '<')) {
        let amount = rest.chars().take_while(|c| *c == ch).count();
        if !rest[amount..].trim().is_empty() {
            return None;
        }
        let op = if ch == '>' {
            Operator::ShiftRight
        } else {
            Operator::ShiftLeft
        };
        return Some(ExCommand::Shift {
            op,
            amount: amount as u32,
        });
    }
    let name_len = rest
        .find(|c: char| !c.is_ascii_alphabetic())
        .unwrap_or(rest.len());
    let (name, arg) = rest.split_at(name_len);
    let register = arg.trim().chars().next();
    if abbreviates(name, "delete") {
        Some(ExCommand::Delete(register))
    } else if abbreviates(name, "yank") {
        Some(ExCommand::Yank(register))
    } else if abbreviates(name, "join") {
        Some(ExCommand::Join)
    } else {
        None
    }
}

/// Ex command names may be shortened to any prefix of at least one letter.
fn abbreviates(name: &str, full: &str) -> bool {
    !name.is_empty() && full.starts_with(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn number(n: u32) -> Address {
        Address {
            base: Base::Number(n),
            offset: 0,
        }
    }

    #[test]
    fn bare_number_is_a_jump() {
        assert_eq!(
            parse_ex("12"),
            Some(ExLine {
                range: LineRange::Single(number(12)),
                command: ExCommand::Goto,
            })
        );
    }

    #[test]
    fn ranges_and_abbreviations() {
        assert_eq!(
            parse_ex("2,4d a"),
            Some(ExLine {
                range: LineRange::Pair(number(2), number(4)),
                command: ExCommand::Delete(Some('a')),
            })
        );
        assert_eq!(
            parse_ex("%yank"),
            Some(ExLine {
                range: LineRange::Whole,
                command: ExCommand::Yank(None),
            })
        );
    }

    #[test]
    fn visual_range_with_repeated_shift() {
        assert_eq!(
            parse_ex("'<,'>>>"),
            Some(ExLine {
                range: LineRange::Pair(
                    Address {
                        base: Base::VisualStart,
                        offset: 0
                    },
                    Address {
                        base: Base::VisualEnd,
                        offset: 0
                    }
                ),
                command: ExCommand::Shift {
                    op: Operator::ShiftRight,
                    amount: 2
                },
            })
        );
    }

    #[test]
    fn offsets_accumulate() {
        assert_eq!(
            parse_ex(".,.+2j"),
            Some(ExLine {
                range: LineRange::Pair(
                    Address {
                        base: Base::Current,
                        offset: 0
                    },
                    Address {
                        base: Base::Current,
                        offset: 2
                    }
                ),
                command: ExCommand::Join,
            })
        );
        assert_eq!(
            parse_ex("$-1"),
            Some(ExLine {
                range: LineRange::Single(Address {
                    base: Base::Last,
                    offset: -1
                }),
                command: ExCommand::Goto,
            })
        );
    }

    #[test]
    fn unknown_commands_do_not_parse() {
        assert_eq!(parse_ex("wq"), None);
        assert_eq!(parse_ex("3,"), None);
        assert_eq!(parse_ex(">x"), None);
    }
}
