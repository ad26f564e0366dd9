//! Per-mode state carried by the engine between keys.

use crate::operator::Operator;
use crate::register::RegisterName;
use crate::repeat::{ChangeDescriptor, InsertKind, OperatorTarget};
use crate::types::{Mode, Position, VisualKind};

/// How the current insert session began, which decides what `.` repeats
/// once it ends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum InsertOrigin {
    Insert(InsertKind),
    /// Entered by a change operator; the operator and the typed text are
    /// recorded together.
    Change {
        target: OperatorTarget,
        count: Option<u32>,
        register: Option<RegisterName>,
    },
}

/// Rows a block change copies its typed text to on exit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct BlockRows {
    pub first: u32,
    pub last: u32,
    pub col: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct InsertSession {
    pub origin: InsertOrigin,
    pub count: Option<u32>,
    /// Text typed since the session began or the caret was last moved.
    pub typed: String,
    pub block: Option<BlockRows>,
}

impl InsertSession {
    pub fn new(origin: InsertOrigin, count: Option<u32>) -> Self {
        Self {
            origin,
            count,
            typed: String::new(),
            block: None,
        }
    }

    /// Closes the change typed so far and starts a plain insert at the
    /// caret. Returns what `.` should repeat for the closed part.
    pub fn restart(&mut self) -> Option<ChangeDescriptor> {
        let origin = std::mem::replace(
            &mut self.origin,
            InsertOrigin::Insert(InsertKind::Before),
        );
        let text = std::mem::take(&mut self.typed);
        self.count = None;
        self.block = None;
        match origin {
            InsertOrigin::Change {
                target,
                count,
                register,
            } => Some(ChangeDescriptor::Operator {
                op: Operator::Change,
                target,
                count,
                register,
                inserted: Some(text),
            }),
            // the count was not applied, so the closed part repeats once
            InsertOrigin::Insert(kind) if !text.is_empty() => Some(ChangeDescriptor::Insert {
                kind,
                count: None,
                text,
            }),
            InsertOrigin::Insert(_) => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct ReplaceSession {
    pub count: Option<u32>,
    pub typed: String,
    /// One entry per typed character still on the current line: the text it
    /// overwrote, or `None` when it was appended past the line end.
    pub overwritten: Vec<Option<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct CommandLineState {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ModeState {
    Normal,
    Insert(InsertSession),
    Replace(ReplaceSession),
    Visual { kind: VisualKind, anchor: Position },
    CommandLine(CommandLineState),
}

impl ModeState {
    pub fn tag(&self) -> Mode {
        match self {
            ModeState::Normal => Mode::Normal,
            ModeState::Insert(_) => Mode::Insert,
            ModeState::Replace(_) => Mode::Replace,
            ModeState::Visual { kind, .. } => Mode::Visual(*kind),
            ModeState::CommandLine(_) => Mode::CommandLine,
        }
    }

    pub fn plain_insert() -> Self {
        ModeState::Insert(InsertSession::new(
            InsertOrigin::Insert(InsertKind::Before),
            None,
        ))
    }
}

