pub mod buffer;
#[cfg(feature = "clipboard")]
pub mod clipboard;
pub mod edit;
pub mod engine;
pub mod error;
pub mod key;
mod mode;
pub mod motion;
pub mod operator;
pub mod parser;
pub mod register;
pub mod repeat;
pub mod settings;
pub mod text;
pub mod traits;
pub mod types;

pub use crate::buffer::VimBuffer;
#[cfg(feature = "clipboard")]
pub use crate::clipboard::SystemClipboard;
pub use crate::engine::{Engine, EngineBuilder, EngineSnapshot};
pub use crate::error::{Result, VimError};
pub use crate::key::{InputEvent, KeyCode, KeyEvent, Modifiers, parse_keys};
pub use crate::motion::Motion;
pub use crate::operator::Operator;
pub use crate::parser::{NormalCommand, Parsed, PendingCommand};
pub use crate::register::{RegisterName, RegisterStore, RegisterValue};
pub use crate::repeat::ChangeDescriptor;
pub use crate::settings::GlobalSettings;
pub use crate::traits::{Clipboard, Settings, TextBuffer, View};
pub use crate::types::{
    Command, KeyOutcome, Mode, Position, Range, Selection, Shape, Span, VisualKind,
};
