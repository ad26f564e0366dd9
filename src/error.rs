use thiserror::Error;

/// Failures raised inside the engine.
///
/// None of these ever reach the host: every public entry point converts them
/// into "nothing happened" (see [`crate::KeyOutcome`]). They exist so internal
/// layers can use `?` and so the reason a command was dropped shows up in logs.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum VimError {
    /// A position or line exceeded the buffer extent.
    #[error("position {line}:{col} is outside the buffer")]
    OutOfRange { line: u32, col: u32 },

    /// The key sequence cannot form any valid command.
    #[error("key sequence does not form a command")]
    AmbiguousCommand,

    /// Repeat was requested before any change was recorded.
    #[error("no previous change to repeat")]
    NoPriorChange,

    /// A register name outside the supported set.
    #[error("invalid register {0:?}")]
    InvalidRegister(char),

    /// A visual operator ran without a selection to act on.
    #[error("no selection")]
    NoSelection,
}

pub type Result<T> = std::result::Result<T, VimError>;
