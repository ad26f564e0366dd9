//! Accumulates Normal and Visual mode keys into complete commands.
//!
//! [`PendingCommand::advance`] is a pure transition: it takes the state so far
//! and one key, and returns the next state plus what the key produced. The
//! engine owns the state between keys and runs whatever command completes.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::key::{KeyCode, KeyEvent};
use crate::motion::{FindSpec, Motion};
use crate::operator::Operator;
use crate::register::RegisterName;
use crate::repeat::InsertKind;
use crate::types::VisualKind;

/// Counts larger than this are clamped.
pub const MAX_COUNT: u32 = 99_999;

/// A key that needs one more key to mean anything.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Prefix {
    #[default]
    None,
    /// `g`
    G,
    /// `"`: the next key names a register.
    Register,
    /// `f F t T`: the next key is the character to find.
    Find { forward: bool, till: bool },
    /// `r`: the next key is the replacement character.
    ReplaceChar,
}

/// Keys typed so far for a command that is not complete yet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingCommand {
    /// Count typed before the operator (or before a plain motion).
    pub count: Option<u32>,
    /// Count typed before a register prefix; later digits start a new count.
    pub register_count: Option<u32>,
    pub register: Option<RegisterName>,
    pub operator: Option<Operator>,
    /// Count typed between the operator and its motion.
    pub motion_count: Option<u32>,
    pub prefix: Prefix,
}

/// Whether keys are parsed for Normal or Visual mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseContext {
    Normal,
    Visual,
}

/// What an operator typed in Normal mode applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Target {
    Motion(Motion),
    /// Doubled operator: whole lines.
    Lines,
}

/// A complete Normal or Visual mode command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NormalCommand {
    Move {
        motion: Motion,
        count: Option<u32>,
    },
    Operate {
        op: Operator,
        target: Target,
        /// Operator count times motion count.
        count: Option<u32>,
        register: Option<RegisterName>,
    },
    /// An operator typed in Visual mode, applied to the selection.
    VisualOperate {
        op: Operator,
        count: Option<u32>,
        register: Option<RegisterName>,
        /// Forces whole lines (`X D Y C S R` in Visual mode).
        linewise: bool,
    },
    Repeat {
        count: Option<u32>,
    },
    Put {
        before: bool,
        count: Option<u32>,
        register: Option<RegisterName>,
    },
    EnterInsert {
        kind: InsertKind,
        count: Option<u32>,
    },
    EnterReplace {
        count: Option<u32>,
    },
    ReplaceChar {
        ch: char,
        count: Option<u32>,
    },
    JoinLines {
        count: Option<u32>,
    },
    ToggleCaseChars {
        count: Option<u32>,
    },
    EnterVisual(VisualKind),
    /// `o` in Visual mode.
    SwapVisualEnds,
    EnterCommandLine,
}

/// The result of feeding one key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parsed {
    /// More keys are needed.
    Incomplete,
    Complete(NormalCommand),
    /// Escape dropped everything typed so far.
    Cancelled,
    /// The key cannot extend what was typed; everything is dropped.
    Rejected,
}

impl PendingCommand {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Every typed count multiplied, or `None` when none was typed.
    pub fn total_count(&self) -> Option<u32> {
        [self.register_count, self.count, self.motion_count]
            .into_iter()
            .flatten()
            .reduce(|a, b| a.saturating_mul(b))
            .map(|n| n.min(MAX_COUNT))
    }

    /// Feeds one key.
    pub fn advance(mut self, key: KeyEvent, context: ParseContext) -> (PendingCommand, Parsed) {
        trace!(?key, pending = ?self, "parser input");
        if key.code == KeyCode::Esc {
            return (Self::default(), Parsed::Cancelled);
        }

        match std::mem::take(&mut self.prefix) {
            Prefix::None => {}
            Prefix::Register => {
                let Some(c) = key.text_char() else {
                    return reject();
                };
                self.register = Some(RegisterName::parse_or_unnamed(c));
                self.register_count = self.count.take();
                return (self, Parsed::Incomplete);
            }
            Prefix::Find { forward, till } => {
                let Some(ch) = key.text_char() else {
                    return reject();
                };
                return self.motion(Motion::FindChar(FindSpec { ch, forward, till }), context);
            }
            Prefix::ReplaceChar => {
                let Some(ch) = key.text_char() else {
                    return reject();
                };
                let count = self.total_count();
                return done(NormalCommand::ReplaceChar { ch, count });
            }
            Prefix::G => return self.after_g(key, context),
        }

        if key.is_ctrl('v') {
            return self.standalone(NormalCommand::EnterVisual(VisualKind::BlockWise));
        }

        let c = match key.code {
            KeyCode::Char(c) if key.text_char().is_some() => c,
            KeyCode::Left | KeyCode::Backspace => return self.motion(Motion::Left, context),
            KeyCode::Right => return self.motion(Motion::Right, context),
            KeyCode::Up => return self.motion(Motion::Up, context),
            KeyCode::Down => return self.motion(Motion::Down, context),
            KeyCode::Enter => return self.motion(Motion::NextLine, context),
            KeyCode::Delete => return self.shorthand('x', context),
            _ => return reject(),
        };

        // digits extend a count, except a leading 0 which is a motion
        if let Some(d) = c.to_digit(10) {
            let slot = if self.operator.is_some() {
                &mut self.motion_count
            } else {
                &mut self.count
            };
            if d != 0 || slot.is_some() {
                *slot = Some(
                    slot.unwrap_or(0)
                        .saturating_mul(10)
                        .saturating_add(d)
                        .min(MAX_COUNT),
                );
                return (self, Parsed::Incomplete);
            }
        }

        if c == '"' {
            if self.operator.is_some() || self.register.is_some() {
                return reject();
            }
            self.prefix = Prefix::Register;
            return (self, Parsed::Incomplete);
        }

        if let Some(motion) = motion_for(c) {
            return self.motion(motion, context);
        }
        match c {
            'f' | 'F' | 't' | 'T' => {
                self.prefix = Prefix::Find {
                    forward: c == 'f' || c == 't',
                    till: c == 't' || c == 'T',
                };
                return (self, Parsed::Incomplete);
            }
            'g' => {
                self.prefix = Prefix::G;
                return (self, Parsed::Incomplete);
            }
            _ => {}
        }

        if let Some(op) = Operator::from_char(c) {
            return self.operator(op, c, context);
        }
        if let Some(pending) = self.operator {
            // `g~~`, `guu` and `gUU` double with the last key only
            if doubled_key(pending) == c {
                return self.operate(Target::Lines);
            }
            return reject();
        }
        self.shorthand(c, context)
    }

    fn after_g(self, key: KeyEvent, context: ParseContext) -> (PendingCommand, Parsed) {
        let Some(c) = key.text_char() else {
            return reject();
        };
        if c == 'g' {
            return self.motion(Motion::FirstLine, context);
        }
        match Operator::from_g_char(c) {
            Some(op) => self.operator(op, c, context),
            None => reject(),
        }
    }

    fn motion(self, motion: Motion, context: ParseContext) -> (PendingCommand, Parsed) {
        let count = self.total_count();
        match self.operator {
            Some(_) if context == ParseContext::Visual => reject(),
            Some(_) => self.operate(Target::Motion(motion)),
            None => done(NormalCommand::Move { motion, count }),
        }
    }

    fn operator(mut self, op: Operator, key: char, context: ParseContext) -> (PendingCommand, Parsed) {
        if context == ParseContext::Visual {
            return done(NormalCommand::VisualOperate {
                op,
                count: self.total_count(),
                register: self.register,
                linewise: false,
            });
        }
        match self.operator {
            None => {
                self.operator = Some(op);
                (self, Parsed::Incomplete)
            }
            Some(pending) if pending == op || doubled_key(pending) == key => {
                self.operate(Target::Lines)
            }
            Some(_) => reject(),
        }
    }

    fn operate(self, target: Target) -> (PendingCommand, Parsed) {
        let Some(op) = self.operator else {
            return reject();
        };
        done(NormalCommand::Operate {
            op,
            target,
            count: self.total_count(),
            register: self.register,
        })
    }

    /// A command that cannot follow an operator.
    fn standalone(self, command: NormalCommand) -> (PendingCommand, Parsed) {
        if self.operator.is_some() {
            return reject();
        }
        done(command)
    }

    fn shorthand(mut self, c: char, context: ParseContext) -> (PendingCommand, Parsed) {
        if self.operator.is_some() {
            return reject();
        }
        let count = self.total_count();
        let register = self.register;
        if context == ParseContext::Visual {
            let visual = |op, linewise| {
                done(NormalCommand::VisualOperate {
                    op,
                    count,
                    register,
                    linewise,
                })
            };
            return match c {
                'x' => visual(Operator::Delete, false),
                'X' | 'D' => visual(Operator::Delete, true),
                's' => visual(Operator::Change, false),
                'C' | 'S' | 'R' => visual(Operator::Change, true),
                'Y' => visual(Operator::Yank, true),
                '~' => visual(Operator::SwapCase, false),
                'u' => visual(Operator::Lowercase, false),
                'U' => visual(Operator::Uppercase, false),
                'J' => done(NormalCommand::JoinLines { count }),
                'o' | 'O' => done(NormalCommand::SwapVisualEnds),
                'v' => done(NormalCommand::EnterVisual(VisualKind::CharWise)),
                'V' => done(NormalCommand::EnterVisual(VisualKind::LineWise)),
                ':' => done(NormalCommand::EnterCommandLine),
                _ => reject(),
            };
        }

        let with = |op, motion| NormalCommand::Operate {
            op,
            target: Target::Motion(motion),
            count,
            register,
        };
        let command = match c {
            'x' => with(Operator::Delete, Motion::Right),
            'X' => with(Operator::Delete, Motion::Left),
            'D' => with(Operator::Delete, Motion::LineEnd),
            'C' => with(Operator::Change, Motion::LineEnd),
            's' => with(Operator::Change, Motion::Right),
            'S' | 'Y' => NormalCommand::Operate {
                op: if c == 'S' { Operator::Change } else { Operator::Yank },
                target: Target::Lines,
                count,
                register,
            },
            'p' | 'P' => NormalCommand::Put {
                before: c == 'P',
                count,
                register,
            },
            '.' => NormalCommand::Repeat { count },
            'i' | 'a' | 'I' | 'A' | 'o' | 'O' => {
                let kind = match c {
                    'i' => InsertKind::Before,
                    'a' => InsertKind::After,
                    'I' => InsertKind::LineStart,
                    'A' => InsertKind::LineEnd,
                    'o' => InsertKind::OpenBelow,
                    _ => InsertKind::OpenAbove,
                };
                NormalCommand::EnterInsert { kind, count }
            }
            'R' => NormalCommand::EnterReplace { count },
            'r' => {
                self.prefix = Prefix::ReplaceChar;
                return (self, Parsed::Incomplete);
            }
            'J' => NormalCommand::JoinLines { count },
            '~' => NormalCommand::ToggleCaseChars { count },
            'v' => NormalCommand::EnterVisual(VisualKind::CharWise),
            'V' => NormalCommand::EnterVisual(VisualKind::LineWise),
            ':' => NormalCommand::EnterCommandLine,
            _ => return reject(),
        };
        done(command)
    }
}

fn done(command: NormalCommand) -> (PendingCommand, Parsed) {
    (PendingCommand::default(), Parsed::Complete(command))
}

fn reject() -> (PendingCommand, Parsed) {
    (PendingCommand::default(), Parsed::Rejected)
}

/// The key that repeats `op` to make it line-wise.
fn doubled_key(op: Operator) -> char {
    match op {
        Operator::Delete => 'd',
        Operator::Yank => 'y',
        Operator::Change => 'c',
        Operator::ShiftLeft => '<',
        Operator::ShiftRight => '>',
        Operator::SwapCase => '~',
        Operator::Lowercase => 'u',
        Operator::Uppercase => 'U',
    }
}

fn motion_for(c: char) -> Option<Motion> {
    let motion = match c {
        'h' => Motion::Left,
        'l' | ' ' => Motion::Right,
        'k' => Motion::Up,
        'j' => Motion::Down,
        '0' => Motion::LineStart,
        '^' => Motion::FirstNonBlank,
        '$' => Motion::LineEnd,
        'w' => Motion::WordForward { big: false },
        'W' => Motion::WordForward { big: true },
        'b' => Motion::WordBackward { big: false },
        'B' => Motion::WordBackward { big: true },
        'e' => Motion::WordEnd { big: false },
        'E' => Motion::WordEnd { big: true },
        'G' => Motion::LastLine,
        '+' => Motion::NextLine,
        '-' => Motion::PrevLine,
        '_' => Motion::CurrentLine,
        '}' => Motion::ParagraphForward,
        '{' => Motion::ParagraphBackward,
        ';' => Motion::RepeatFind { reverse: false },
        ',' => Motion::RepeatFind { reverse: true },
        '%' => Motion::MatchPair,
        _ => return None,
    };
    Some(motion)
}
