//! Named and unnamed storage for yanked and deleted text.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, VimError};
use crate::traits::Clipboard;
use crate::types::Shape;

/// A register identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RegisterName {
    /// `"`: written by every yank and delete.
    Unnamed,
    /// `a`-`z`. Writing through `A`-`Z` appends instead of replacing.
    Named { letter: char, append: bool },
    /// `0`-`9`: last yank and the delete history.
    Numbered(u8),
    /// `-`: deletes smaller than a line.
    SmallDelete,
    /// `+`: the system clipboard.
    Clipboard,
    /// `*`: the primary selection; shares the system clipboard.
    Selection,
    /// `_`: discards writes, reads empty.
    BlackHole,
    /// `.`: the last inserted text, read-only.
    LastInserted,
}

impl RegisterName {
    pub fn parse(c: char) -> Result<Self> {
        let name = match c {
            '"' => RegisterName::Unnamed,
            'a'..='z' => RegisterName::Named {
                letter: c,
                append: false,
            },
            'A'..='Z' => RegisterName::Named {
                letter: c.to_ascii_lowercase(),
                append: true,
            },
            '0'..='9' => RegisterName::Numbered(c as u8 - b'0'),
            '-' => RegisterName::SmallDelete,
            '+' => RegisterName::Clipboard,
            '*' => RegisterName::Selection,
            '_' => RegisterName::BlackHole,
            '.' => RegisterName::LastInserted,
            _ => return Err(VimError::InvalidRegister(c)),
        };
        Ok(name)
    }

    /// Parses `c`, treating unsupported names as the unnamed register.
    pub fn parse_or_unnamed(c: char) -> Self {
        Self::parse(c).unwrap_or_else(|err| {
            debug!(%err, "falling back to the unnamed register");
            RegisterName::Unnamed
        })
    }

    pub fn as_char(&self) -> char {
        match self {
            RegisterName::Unnamed => '"',
            RegisterName::Named { letter, append } => {
                if *append {
                    letter.to_ascii_uppercase()
                } else {
                    *letter
                }
            }
            RegisterName::Numbered(n) => (b'0' + n) as char,
            RegisterName::SmallDelete => '-',
            RegisterName::Clipboard => '+',
            RegisterName::Selection => '*',
            RegisterName::BlackHole => '_',
            RegisterName::LastInserted => '.',
        }
    }

    /// The storage slot this name reads from and writes to.
    fn slot(&self) -> char {
        match self {
            RegisterName::Named { letter, .. } => *letter,
            RegisterName::Selection => '+',
            other => other.as_char(),
        }
    }
}

impl fmt::Display for RegisterName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}", self.as_char())
    }
}

/// Register contents: the text plus the shape it was taken with.
///
/// Line-wise text always ends with `\n`. Block-wise text holds one row per
/// line, joined with `\n`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterValue {
    pub text: String,
    pub shape: Shape,
}

impl RegisterValue {
    pub fn new(text: impl Into<String>, shape: Shape) -> Self {
        Self {
            text: text.into(),
            shape,
        }
    }

    pub fn is_multiline(&self) -> bool {
        self.text.trim_end_matches('\n').contains('\n')
    }
}

/// Storage for all registers of one buffer.
#[derive(Default)]
pub struct RegisterStore {
    slots: HashMap<char, RegisterValue>,
    clipboard: Option<Box<dyn Clipboard>>,
}

impl fmt::Debug for RegisterStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisterStore")
            .field("slots", &self.slots)
            .field("clipboard", &self.clipboard.is_some())
            .finish()
    }
}

impl RegisterStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_clipboard(clipboard: Box<dyn Clipboard>) -> Self {
        Self {
            slots: HashMap::new(),
            clipboard: Some(clipboard),
        }
    }

    pub fn set_clipboard(&mut self, clipboard: Option<Box<dyn Clipboard>>) {
        self.clipboard = clipboard;
    }

    pub fn get(&mut self, name: RegisterName) -> Option<RegisterValue> {
        match name {
            RegisterName::BlackHole => None,
            RegisterName::Clipboard | RegisterName::Selection => {
                if let Some(clipboard) = self.clipboard.as_mut() {
                    let text = clipboard.get()?;
                    // text copied elsewhere with a trailing newline pastes as lines
                    let shape = match self.slots.get(&'+') {
                        Some(value) if value.text == text => value.shape,
                        _ if text.ends_with('\n') => Shape::Line,
                        _ => Shape::Character,
                    };
                    return Some(RegisterValue::new(text, shape));
                }
                self.slots.get(&name.slot()).cloned()
            }
            _ => self.slots.get(&name.slot()).cloned(),
        }
    }

    /// The stored value of `name` without consulting the system clipboard.
    pub fn peek(&self, name: RegisterName) -> Option<&RegisterValue> {
        match name {
            RegisterName::BlackHole => None,
            _ => self.slots.get(&name.slot()),
        }
    }

    /// Records a yank. Fills `"0` unless a register was named explicitly.
    pub fn write_yank(&mut self, target: RegisterName, value: RegisterValue) {
        if target == RegisterName::BlackHole {
            return;
        }
        if target == RegisterName::Unnamed {
            self.slots.insert('0', value.clone());
        }
        self.store(target, value);
    }

    /// Records a delete. Unless a register was named explicitly, line-wise
    /// and multi-line deletes shift the numbered history and small deletes
    /// go to `"-`.
    pub fn write_delete(&mut self, target: RegisterName, value: RegisterValue) {
        if target == RegisterName::BlackHole {
            return;
        }
        if target == RegisterName::Unnamed {
            if value.shape == Shape::Line || value.is_multiline() {
                self.shift_numbered();
                self.slots.insert('1', value.clone());
            } else {
                self.slots.insert('-', value.clone());
            }
        }
        self.store(target, value);
    }

    /// Feeds `".` at the end of an insert session.
    pub fn set_last_inserted(&mut self, text: &str) {
        self.slots
            .insert('.', RegisterValue::new(text, Shape::Character));
    }

    fn store(&mut self, target: RegisterName, value: RegisterValue) {
        debug!(register = %target, shape = ?value.shape, "register write");
        let value = match target {
            RegisterName::Named { letter, append: true } => match self.slots.get(&letter) {
                Some(existing) => append(existing, value),
                None => value,
            },
            _ => value,
        };
        if matches!(target, RegisterName::Clipboard | RegisterName::Selection)
            && let Some(clipboard) = self.clipboard.as_mut()
        {
            clipboard.set(value.text.clone());
        }
        if target != RegisterName::LastInserted {
            self.slots.insert(target.slot(), value.clone());
        }
        self.slots.insert('"', value);
    }

    fn shift_numbered(&mut self) {
        for n in (1..9u8).rev() {
            let from = (b'0' + n) as char;
            let to = (b'0' + n + 1) as char;
            if let Some(value) = self.slots.remove(&from) {
                self.slots.insert(to, value);
            }
        }
    }
}

fn append(existing: &RegisterValue, value: RegisterValue) -> RegisterValue {
    match (existing.shape, value.shape) {
        (Shape::Line, _) | (_, Shape::Line) => {
            let mut text = existing.text.clone();
            if !text.ends_with('\n') {
                text.push('\n');
            }
            text.push_str(&value.text);
            if !text.ends_with('\n') {
                text.push('\n');
            }
            RegisterValue::new(text, Shape::Line)
        }
        _ => RegisterValue::new(existing.text.clone() + &value.text, existing.shape),
    }
}
