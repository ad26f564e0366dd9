//! The per-buffer engine: holds the mode, the pending command, registers and
//! the last change, and routes every input to the handler for the current
//! mode.

mod command_line;
mod insert;
mod normal;
mod visual;

use tracing::{debug, trace};

use crate::edit::EditPlan;
use crate::error::{Result, VimError};
use crate::key::InputEvent;
use crate::mode::{BlockRows, CommandLineState, ModeState, ReplaceSession};
use crate::motion::{FindSpec, MotionContext};
use crate::operator::{self, EditResult, Operator, OperatorContext};
use crate::parser::PendingCommand;
use crate::register::{RegisterName, RegisterStore};
use crate::repeat::{ChangeDescriptor, InsertKind, RepeatEngine};
use crate::text;
use crate::traits::{Clipboard, Settings, TextBuffer, View};
use crate::types::{KeyOutcome, Mode, Position, Selection, Shape, Span, VisualKind};

/// The host parts one input is processed against.
pub(crate) struct Host<'a> {
    pub text: &'a mut dyn TextBuffer,
    pub view: &'a mut dyn View,
    pub settings: &'a dyn Settings,
}

impl Host<'_> {
    /// The view's caret, clamped into the buffer.
    fn caret(&self) -> Position {
        self.text.clamp(self.view.caret())
    }
}

#[derive(Debug)]
pub struct Engine {
    mode: ModeState,
    pending: PendingCommand,
    registers: RegisterStore,
    repeat: RepeatEngine,
    /// Column `j` and `k` aim for; `u32::MAX` after `$`.
    preferred_col: Option<u32>,
    last_find: Option<FindSpec>,
    /// Lines of the last visual selection, for the `'<,'>` range.
    last_visual: Option<(u32, u32)>,
}

/// A read-only view of the engine state, for hosts and tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineSnapshot {
    pub mode: Mode,
    pub preferred_col: Option<u32>,
    pub pending: PendingCommand,
    pub last_change: Option<ChangeDescriptor>,
    /// The text typed after `:` while in command-line mode.
    pub command_line: Option<String>,
}

pub struct EngineBuilder {
    mode: Mode,
    clipboard: Option<Box<dyn Clipboard>>,
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self {
            mode: Mode::Normal,
            clipboard: None,
        }
    }
}

impl EngineBuilder {
    /// The starting mode. A visual start anchors at the buffer start until
    /// the first key adopts the view's selection.
    pub fn mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    /// Backs the `+` and `*` registers with a system clipboard.
    pub fn clipboard(mut self, clipboard: Box<dyn Clipboard>) -> Self {
        self.clipboard = Some(clipboard);
        self
    }

    pub fn build(self) -> Engine {
        let mode = match self.mode {
            Mode::Normal => ModeState::Normal,
            Mode::Insert => ModeState::plain_insert(),
            Mode::Replace => ModeState::Replace(ReplaceSession::default()),
            Mode::Visual(kind) => ModeState::Visual {
                kind,
                anchor: Position::ZERO,
            },
            Mode::CommandLine => ModeState::CommandLine(CommandLineState::default()),
        };
        let mut registers = RegisterStore::new();
        registers.set_clipboard(self.clipboard);
        Engine {
            mode,
            pending: PendingCommand::default(),
            registers,
            repeat: RepeatEngine::new(),
            preferred_col: None,
            last_find: None,
            last_visual: None,
        }
    }
}

impl Default for Engine {
    fn default() -> Self {
        EngineBuilder::default().build()
    }
}

impl Engine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    pub fn mode(&self) -> Mode {
        self.mode.tag()
    }

    pub fn registers(&self) -> &RegisterStore {
        &self.registers
    }

    pub fn registers_mut(&mut self) -> &mut RegisterStore {
        &mut self.registers
    }

    pub fn last_change(&self) -> Option<&ChangeDescriptor> {
        self.repeat.last()
    }

    pub fn snapshot(&self) -> EngineSnapshot {
        EngineSnapshot {
            mode: self.mode.tag(),
            preferred_col: self.preferred_col,
            pending: self.pending,
            last_change: self.repeat.last().cloned(),
            command_line: match &self.mode {
                ModeState::CommandLine(state) => Some(state.text.clone()),
                _ => None,
            },
        }
    }

    /// Processes one input. Never fails: a key that cannot be carried out is
    /// reported as [`KeyOutcome::Ignored`] and leaves everything unchanged.
    pub fn handle_event<B: TextBuffer, V: View, S: Settings>(
        &mut self,
        text: &mut B,
        view: &mut V,
        settings: &S,
        input: InputEvent,
    ) -> KeyOutcome {
        let mut host = Host {
            text,
            view,
            settings,
        };
        trace!(?input, mode = ?self.mode.tag(), "key received");
        self.reconcile_selection(&mut host);
        match self.mode {
            ModeState::Normal | ModeState::Visual { .. } => {
                self.handle_normal(&mut host, input.as_key())
            }
            ModeState::Insert(_) => self.handle_insert(&mut host, &input),
            ModeState::Replace(_) => self.handle_replace(&mut host, &input),
            ModeState::CommandLine(_) => self.handle_command_line(&mut host, &input),
        }
    }

    /// Switches mode at the host's request, dropping any pending keys.
    pub fn switch_mode<B: TextBuffer, V: View, S: Settings>(
        &mut self,
        text: &mut B,
        view: &mut V,
        settings: &S,
        mode: Mode,
    ) {
        let mut host = Host {
            text,
            view,
            settings,
        };
        self.enter_mode(&mut host, mode);
    }

    /// Tells the engine the host changed the selection on its own, e.g. by
    /// a mouse drag.
    pub fn handle_selection_changed<B: TextBuffer, V: View, S: Settings>(
        &mut self,
        text: &mut B,
        view: &mut V,
        settings: &S,
    ) {
        let mut host = Host {
            text,
            view,
            settings,
        };
        self.reconcile_selection(&mut host);
    }

    fn enter_mode(&mut self, host: &mut Host<'_>, mode: Mode) {
        self.pending = PendingCommand::default();
        let caret = host.caret();
        let next = match mode {
            Mode::Normal => {
                host.view.clear_selection();
                host.view.set_caret(text::clamp_normal(&*host.text, caret));
                ModeState::Normal
            }
            Mode::Insert => {
                host.view.clear_selection();
                ModeState::plain_insert()
            }
            Mode::Replace => {
                host.view.clear_selection();
                ModeState::Replace(ReplaceSession::default())
            }
            Mode::Visual(kind) => {
                let caret = text::clamp_normal(&*host.text, caret);
                host.view.set_caret(caret);
                host.view.set_selection(Selection::new(caret, caret, kind));
                ModeState::Visual {
                    kind,
                    anchor: caret,
                }
            }
            Mode::CommandLine => {
                host.view.clear_selection();
                ModeState::CommandLine(CommandLineState::default())
            }
        };
        self.set_mode(next);
    }

    /// Brings the mode in line with the view: a selection made by the host
    /// enters Visual mode, a cleared one leaves it, and in Visual mode the
    /// view's anchor and caret win.
    fn reconcile_selection(&mut self, host: &mut Host<'_>) {
        let selection = host.view.selection();
        match (&self.mode, selection) {
            (ModeState::Normal, Some(selection)) => {
                debug!(?selection, "host selection starts visual mode");
                self.pending = PendingCommand::default();
                self.adopt_selection(host, selection.kind, selection);
            }
            (ModeState::Visual { kind, anchor }, Some(selection)) => {
                if *anchor != selection.anchor {
                    trace!(?selection, "adopting host anchor");
                }
                let kind = *kind;
                self.adopt_selection(host, kind, selection);
            }
            (ModeState::Visual { .. }, None) => {
                debug!("host cleared the selection");
                self.pending = PendingCommand::default();
                self.set_mode(ModeState::Normal);
                let caret = text::clamp_normal(&*host.text, host.caret());
                host.view.set_caret(caret);
            }
            _ => {}
        }
    }

    fn adopt_selection(
        &mut self,
        host: &mut Host<'_>,
        kind: VisualKind,
        selection: Selection,
    ) {
        let anchor = host.text.clamp(selection.anchor);
        let caret = host.text.clamp(selection.caret);
        if host.view.caret() != caret {
            host.view.set_caret(caret);
        }
        self.set_mode(ModeState::Visual { kind, anchor });
    }

    fn set_mode(&mut self, next: ModeState) {
        let (from, to) = (self.mode.tag(), next.tag());
        if from != to {
            debug!(?from, ?to, "mode change");
        }
        self.mode = next;
    }

    /// Leaves the current mode for Normal and hands back its state.
    fn take_mode(&mut self) -> ModeState {
        let previous = std::mem::replace(&mut self.mode, ModeState::Normal);
        debug!(from = ?previous.tag(), to = ?Mode::Normal, "mode change");
        previous
    }

    /// Pushes the engine's visual selection to the view.
    fn sync_selection(&self, host: &mut Host<'_>) {
        if let ModeState::Visual { kind, anchor } = self.mode {
            let caret = host.caret();
            host.view.set_selection(Selection::new(anchor, caret, kind));
        }
    }

    fn motion_context(&self, op: Option<Operator>) -> MotionContext {
        MotionContext {
            operator_pending: op.is_some(),
            change: op == Some(Operator::Change),
            preferred_col: self.preferred_col,
            last_find: self.last_find,
        }
    }

    fn register_or_default(&self, host: &Host<'_>, register: Option<RegisterName>) -> RegisterName {
        register.unwrap_or_else(|| RegisterName::parse_or_unnamed(host.settings.default_register()))
    }

    fn apply_operator(
        &mut self,
        host: &mut Host<'_>,
        op: Operator,
        span: Span,
        shift_count: u32,
        register: Option<RegisterName>,
    ) -> Result<EditResult> {
        let register = self.register_or_default(host, register);
        let mut ctx = OperatorContext {
            text: &mut *host.text,
            settings: host.settings,
            registers: &mut self.registers,
        };
        operator::apply(op, span, shift_count, register, &mut ctx)
    }
}

/// Converts the result of a dispatched command into what the host sees.
fn outcome(result: Result<()>) -> KeyOutcome {
    match result {
        Ok(()) => KeyOutcome::Handled,
        Err(err) => {
            debug!(%err, "command dropped");
            KeyOutcome::Ignored
        }
    }
}

/// Inserts `inserted` at `at` and returns the position just after it.
fn insert_at(host: &mut Host<'_>, at: Position, inserted: &str) -> Result<Position> {
    let mut plan = EditPlan::new();
    plan.insert(at, inserted);
    plan.apply(&mut *host.text)?;
    Ok(text::advance(at, inserted))
}

/// Where the caret rests after leaving Insert or Replace mode at `pos`.
fn escape_left<B: TextBuffer + ?Sized>(buf: &B, pos: Position) -> Position {
    let pos = Position::new(pos.line, pos.col.saturating_sub(1));
    text::clamp_normal(buf, pos)
}

/// Copies single-line text typed into a block change onto the block's
/// other rows. Rows too short to reach the block are skipped.
fn replicate_block(host: &mut Host<'_>, rows: BlockRows, typed: &str) -> Result<()> {
    if typed.is_empty() || typed.contains('\n') {
        return Ok(());
    }
    let mut plan = EditPlan::new();
    for line in rows.first..=rows.last.min(host.text.last_line()) {
        if host.text.line_len(line) >= rows.col {
            plan.insert(Position::new(line, rows.col), typed);
        }
    }
    plan.apply(&mut *host.text)
}

/// The extra copies a counted insert adds on exit: plain text repeats in
/// place, opened lines repeat as new lines.
fn repeated_text(kind: InsertKind, typed: &str, copies: u32) -> String {
    match kind {
        InsertKind::OpenBelow | InsertKind::OpenAbove => {
            format!("\n{typed}").repeat(copies as usize)
        }
        _ => typed.repeat(copies as usize),
    }
}

/// Block rows below the first, for a block change entering Insert mode.
fn block_rows(span: &Span) -> Option<BlockRows> {
    (span.shape == Shape::Block && span.end.line > span.start.line).then(|| {
        BlockRows {
            first: span.start.line + 1,
            last: span.end.line,
            col: span.start.col,
        }
    })
}

/// `OutOfRange` at `pos`, for motions that find nothing.
fn not_found(pos: Position) -> VimError {
    VimError::OutOfRange {
        line: pos.line,
        col: pos.col,
    }
}
