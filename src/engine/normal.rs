use tracing::debug;

use super::insert::overwrite;
use super::{
    Engine, Host, block_rows, escape_left, insert_at, not_found, outcome, replicate_block,
    repeated_text,
};
use crate::edit;
use crate::error::{Result, VimError};
use crate::key::KeyEvent;
use crate::mode::{InsertOrigin, InsertSession, ModeState, ReplaceSession};
use crate::motion::{self, Motion};
use crate::operator::Operator;
use crate::parser::{NormalCommand, ParseContext, Parsed, Target};
use crate::register::RegisterName;
use crate::repeat::{self, ChangeDescriptor, InsertKind, OperatorTarget};
use crate::text;
use crate::types::{KeyOutcome, Position, Shape, Span};

impl Engine {
    /// Normal and Visual mode keys go through the command parser.
    pub(super) fn handle_normal(&mut self, host: &mut Host<'_>, key: KeyEvent) -> KeyOutcome {
        let context = match self.mode {
            ModeState::Visual { .. } => ParseContext::Visual,
            _ => ParseContext::Normal,
        };
        let (pending, parsed) = std::mem::take(&mut self.pending).advance(key, context);
        self.pending = pending;
        match parsed {
            Parsed::Incomplete => KeyOutcome::Pending,
            Parsed::Cancelled => {
                if context == ParseContext::Visual {
                    self.exit_visual(host);
                }
                KeyOutcome::Handled
            }
            Parsed::Rejected => {
                debug!(error = %VimError::AmbiguousCommand, ?key, "key sequence rejected");
                KeyOutcome::Ignored
            }
            Parsed::Complete(command) => {
                debug!(?command, "dispatching");
                let result = self.execute(host, command);
                self.settle(host);
                outcome(result)
            }
        }
    }

    /// Keeps the caret and the view consistent with the mode after a
    /// command: Normal mode rests on a character, Visual mode shows the
    /// selection.
    fn settle(&mut self, host: &mut Host<'_>) {
        let caret = host.caret();
        match self.mode {
            ModeState::Normal => {
                let clamped = text::clamp_normal(&*host.text, caret);
                if clamped != host.view.caret() {
                    host.view.set_caret(clamped);
                }
            }
            ModeState::Visual { .. } => self.sync_selection(host),
            _ => {
                if caret != host.view.caret() {
                    host.view.set_caret(caret);
                }
            }
        }
    }

    fn execute(&mut self, host: &mut Host<'_>, command: NormalCommand) -> Result<()> {
        match command {
            NormalCommand::Move { motion, count } => self.move_caret(host, motion, count),
            NormalCommand::Operate {
                op,
                target,
                count,
                register,
            } => {
                let target = match target {
                    Target::Motion(motion) => OperatorTarget::Motion(motion),
                    Target::Lines => OperatorTarget::Lines,
                };
                let span = self.target_span(host, op, target, count)?;
                self.run_operator(host, op, target, span, count, register)
            }
            NormalCommand::VisualOperate {
                op,
                count,
                register,
                linewise,
            } => self.visual_operate(host, op, count, register, linewise),
            NormalCommand::Repeat { count } => {
                let change = self.repeat.repeat_last(count)?;
                debug!(?change, "repeating last change");
                host.text.begin_edit();
                let replayed = self.replay(host, &change);
                host.text.end_edit();
                replayed?;
                self.repeat.record_change(change);
                Ok(())
            }
            NormalCommand::Put {
                before,
                count,
                register,
            } => self.put(host, before, count, register),
            NormalCommand::EnterInsert { kind, count } => {
                let at = self.prepare_insert(host, kind)?;
                host.view.set_caret(at);
                self.set_mode(ModeState::Insert(InsertSession::new(
                    InsertOrigin::Insert(kind),
                    count,
                )));
                Ok(())
            }
            NormalCommand::EnterReplace { count } => {
                self.set_mode(ModeState::Replace(ReplaceSession {
                    count,
                    ..ReplaceSession::default()
                }));
                Ok(())
            }
            NormalCommand::ReplaceChar { ch, count } => {
                let caret = host.caret();
                let caret = edit::replace_chars(&mut *host.text, caret, ch, count.unwrap_or(1))?;
                host.view.set_caret(caret);
                self.repeat
                    .record_change(ChangeDescriptor::ReplaceChar { ch, count });
                Ok(())
            }
            NormalCommand::JoinLines { count } => {
                if matches!(self.mode, ModeState::Visual { .. }) {
                    return self.visual_join(host);
                }
                let line = host.caret().line;
                let caret = edit::join_lines(&mut *host.text, line, count.unwrap_or(2))?;
                host.view.set_caret(caret);
                self.repeat
                    .record_change(ChangeDescriptor::JoinLines { count });
                Ok(())
            }
            NormalCommand::ToggleCaseChars { count } => {
                let caret = host.caret();
                let caret = edit::toggle_case_chars(&mut *host.text, caret, count.unwrap_or(1))?;
                host.view.set_caret(caret);
                self.repeat
                    .record_change(ChangeDescriptor::ToggleCaseChars { count });
                Ok(())
            }
            NormalCommand::EnterVisual(kind) => {
                self.enter_visual(host, kind);
                Ok(())
            }
            NormalCommand::SwapVisualEnds => self.swap_visual_ends(host),
            NormalCommand::EnterCommandLine => self.enter_command_line(host),
        }
    }

    fn move_caret(&mut self, host: &mut Host<'_>, motion: Motion, count: Option<u32>) -> Result<()> {
        let caret = host.caret();
        let ctx = self.motion_context(None);
        let result =
            motion::resolve(&*host.text, caret, motion, count, &ctx).ok_or(not_found(caret))?;
        if let Motion::FindChar(spec) = motion {
            self.last_find = Some(spec);
        }
        self.preferred_col = match motion {
            Motion::LineEnd => Some(u32::MAX),
            m if m.keeps_column() => Some(self.preferred_col.unwrap_or(caret.col)),
            _ => None,
        };
        host.view
            .set_caret(text::clamp_normal(&*host.text, result.target));
        Ok(())
    }

    /// The span an operator acts on from the caret. Shifts always cover
    /// whole lines unless they come from a block.
    pub(super) fn target_span(
        &mut self,
        host: &Host<'_>,
        op: Operator,
        target: OperatorTarget,
        count: Option<u32>,
    ) -> Result<Span> {
        let caret = host.caret();
        let span = match target {
            OperatorTarget::Lines => repeat::lines_from(&*host.text, caret.line, count.unwrap_or(1)),
            OperatorTarget::Motion(motion) => {
                let ctx = self.motion_context(Some(op));
                let result = motion::resolve(&*host.text, caret, motion, count, &ctx)
                    .ok_or(not_found(caret))?;
                if let Motion::FindChar(spec) = motion {
                    self.last_find = Some(spec);
                }
                result.span(&*host.text, caret)
            }
            OperatorTarget::Visual(extent) => extent.span_at(&*host.text, caret),
        };
        Ok(match span.shape {
            Shape::Character if op.is_shift() => {
                repeat::lines_from(&*host.text, span.first_line(), span.line_count())
            }
            _ => span,
        })
    }

    /// Applies `op` to `span`, then places the caret, enters Insert mode for
    /// a change and records the change for `.`.
    pub(super) fn run_operator(
        &mut self,
        host: &mut Host<'_>,
        op: Operator,
        target: OperatorTarget,
        span: Span,
        count: Option<u32>,
        register: Option<RegisterName>,
    ) -> Result<()> {
        self.preferred_col = None;
        let origin = InsertOrigin::Change {
            target,
            count,
            register,
        };
        if span.is_empty() {
            // nothing to delete; a change still starts typing here
            if op == Operator::Change {
                host.view.set_caret(span.start);
                self.set_mode(ModeState::Insert(InsertSession::new(origin, None)));
            }
            return Ok(());
        }
        let shift_count = match target {
            OperatorTarget::Visual(_) => count.unwrap_or(1),
            _ => 1,
        };
        let result = self.apply_operator(host, op, span, shift_count, register)?;
        if result.enter_insert {
            host.view.set_caret(result.caret);
            let mut session = InsertSession::new(origin, None);
            session.block = block_rows(&span);
            self.set_mode(ModeState::Insert(session));
            return Ok(());
        }
        host.view
            .set_caret(text::clamp_normal(&*host.text, result.caret));
        if op.is_change() {
            self.repeat.record_change(ChangeDescriptor::Operator {
                op,
                target,
                count,
                register,
                inserted: None,
            });
        }
        Ok(())
    }

    /// Moves the caret to where Insert mode starts for `kind`, opening a new
    /// line for `o` and `O`.
    pub(super) fn prepare_insert(&mut self, host: &mut Host<'_>, kind: InsertKind) -> Result<Position> {
        let caret = host.caret();
        let len = host.text.line_len(caret.line);
        let at = match kind {
            InsertKind::Before => caret,
            InsertKind::After => Position::new(caret.line, (caret.col + 1).min(len)),
            InsertKind::LineStart => {
                let first = text::first_non_blank(&*host.text, caret.line);
                let line = host.text.line(caret.line);
                match text::grapheme_at(&line, first.col) {
                    Some(g) if !text::is_blank(g) => first,
                    _ => Position::new(caret.line, len),
                }
            }
            InsertKind::LineEnd => Position::new(caret.line, len),
            InsertKind::OpenBelow => {
                insert_at(host, Position::new(caret.line, len), "\n")?;
                Position::new(caret.line + 1, 0)
            }
            InsertKind::OpenAbove => {
                insert_at(host, Position::new(caret.line, 0), "\n")?;
                Position::new(caret.line, 0)
            }
        };
        self.preferred_col = None;
        Ok(at)
    }

    fn put(
        &mut self,
        host: &mut Host<'_>,
        before: bool,
        count: Option<u32>,
        register: Option<RegisterName>,
    ) -> Result<()> {
        let name = self.register_or_default(host, register);
        let Some(value) = self.registers.get(name) else {
            debug!(register = %name, "nothing to put");
            return Ok(());
        };
        let caret = host.caret();
        let caret = edit::put(&mut *host.text, caret, &value, count.unwrap_or(1), before)?;
        host.view.set_caret(text::clamp_normal(&*host.text, caret));
        self.repeat.record_change(ChangeDescriptor::Put {
            before,
            count,
            register,
        });
        Ok(())
    }

    /// Runs a recorded change again at the current caret.
    fn replay(&mut self, host: &mut Host<'_>, change: &ChangeDescriptor) -> Result<()> {
        match change {
            ChangeDescriptor::Operator {
                op,
                target,
                count,
                register,
                inserted,
            } => {
                let span = self.target_span(host, *op, *target, *count)?;
                if span.is_empty() && *op != Operator::Change {
                    return Ok(());
                }
                let shift_count = match target {
                    OperatorTarget::Visual(_) => count.unwrap_or(1),
                    _ => 1,
                };
                let result = if span.is_empty() {
                    None
                } else {
                    Some(self.apply_operator(host, *op, span, shift_count, *register)?)
                };
                let caret = result.map_or(span.start, |r| r.caret);
                if *op != Operator::Change {
                    host.view
                        .set_caret(text::clamp_normal(&*host.text, caret));
                    return Ok(());
                }
                let typed = inserted.as_deref().unwrap_or("");
                let end = insert_at(host, caret, typed)?;
                if let Some(rows) = block_rows(&span) {
                    replicate_block(host, rows, typed)?;
                }
                host.view.set_caret(escape_left(&*host.text, end));
                Ok(())
            }
            ChangeDescriptor::Insert { kind, count, text } => {
                let at = self.prepare_insert(host, *kind)?;
                let copies = repeat::clamp_count(count.unwrap_or(1)) - 1;
                let body = format!("{text}{}", repeated_text(*kind, text, copies));
                let end = insert_at(host, at, &body)?;
                host.view.set_caret(escape_left(&*host.text, end));
                Ok(())
            }
            ChangeDescriptor::Put {
                before,
                count,
                register,
            } => self.put(host, *before, *count, *register),
            ChangeDescriptor::ReplaceChar { ch, count } => {
                let caret = host.caret();
                let caret = edit::replace_chars(&mut *host.text, caret, *ch, count.unwrap_or(1))?;
                host.view.set_caret(caret);
                Ok(())
            }
            ChangeDescriptor::JoinLines { count } => {
                let line = host.caret().line;
                let caret = edit::join_lines(&mut *host.text, line, count.unwrap_or(2))?;
                host.view.set_caret(caret);
                Ok(())
            }
            ChangeDescriptor::ToggleCaseChars { count } => {
                let caret = host.caret();
                let caret = edit::toggle_case_chars(&mut *host.text, caret, count.unwrap_or(1))?;
                host.view.set_caret(caret);
                Ok(())
            }
            ChangeDescriptor::Overwrite { text, count } => {
                let copies = repeat::clamp_count(count.unwrap_or(1));
                let caret = host.caret();
                let end = overwrite(host, caret, &text.repeat(copies as usize))?;
                host.view.set_caret(escape_left(&*host.text, end));
                Ok(())
            }
        }
    }
}
