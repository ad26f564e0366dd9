use super::{Engine, Host};
use crate::edit;
use crate::error::{Result, VimError};
use crate::mode::{CommandLineState, ModeState};
use crate::operator::Operator;
use crate::register::RegisterName;
use crate::repeat::{self, ChangeDescriptor, OperatorTarget, VisualExtent};
use crate::text;
use crate::types::{Selection, Shape, VisualKind};

impl Engine {
    /// The selection between the anchor and the caret.
    fn visual_selection(&self, host: &Host<'_>) -> Result<Selection> {
        match self.mode {
            ModeState::Visual { kind, anchor } => Ok(Selection::new(anchor, host.caret(), kind)),
            _ => Err(VimError::NoSelection),
        }
    }

    /// Leaves Visual mode for Normal, keeping the caret where it is.
    pub(super) fn exit_visual(&mut self, host: &mut Host<'_>) {
        if let Ok(selection) = self.visual_selection(host) {
            let (start, end) = selection.ordered();
            self.last_visual = Some((start.line, end.line));
        }
        host.view.clear_selection();
        self.set_mode(ModeState::Normal);
    }

    /// `v`, `V` and Ctrl-V: enter Visual mode, switch kind, or leave when the
    /// kind is already active.
    pub(super) fn enter_visual(&mut self, host: &mut Host<'_>, kind: VisualKind) {
        match self.mode {
            ModeState::Visual { kind: current, .. } if current == kind => self.exit_visual(host),
            ModeState::Visual { anchor, .. } => self.set_mode(ModeState::Visual { kind, anchor }),
            _ => {
                let caret = text::clamp_normal(&*host.text, host.caret());
                host.view.set_caret(caret);
                self.set_mode(ModeState::Visual {
                    kind,
                    anchor: caret,
                });
            }
        }
    }

    pub(super) fn swap_visual_ends(&mut self, host: &mut Host<'_>) -> Result<()> {
        let selection = self.visual_selection(host)?;
        self.set_mode(ModeState::Visual {
            kind: selection.kind,
            anchor: selection.caret,
        });
        host.view.set_caret(selection.anchor);
        Ok(())
    }

    /// Applies `op` to the selection and returns to Normal mode (Insert mode
    /// for a change). A count multiplies the shift width.
    pub(super) fn visual_operate(
        &mut self,
        host: &mut Host<'_>,
        op: Operator,
        count: Option<u32>,
        register: Option<RegisterName>,
        linewise: bool,
    ) -> Result<()> {
        let mut selection = self.visual_selection(host)?;
        if linewise {
            selection.kind = VisualKind::LineWise;
        }
        let span = repeat::selection_span(&*host.text, &selection);
        let span = match span.shape {
            Shape::Character if op.is_shift() => {
                repeat::lines_from(&*host.text, span.first_line(), span.line_count())
            }
            _ => span,
        };
        self.exit_visual(host);
        let count = if op.is_shift() { count } else { None };
        let target = OperatorTarget::Visual(VisualExtent::of(&span));
        self.run_operator(host, op, target, span, count, register)
    }

    /// `J` in Visual mode joins every selected line.
    pub(super) fn visual_join(&mut self, host: &mut Host<'_>) -> Result<()> {
        let selection = self.visual_selection(host)?;
        let (start, end) = selection.ordered();
        let count = (end.line - start.line + 1).max(2);
        self.exit_visual(host);
        let caret = edit::join_lines(&mut *host.text, start.line, count)?;
        host.view.set_caret(caret);
        self.repeat.record_change(ChangeDescriptor::JoinLines {
            count: Some(count),
        });
        Ok(())
    }

    /// `:` prefills the range of a visual selection.
    pub(super) fn enter_command_line(&mut self, host: &mut Host<'_>) -> Result<()> {
        let text = match self.mode {
            ModeState::Visual { .. } => {
                self.exit_visual(host);
                "'<,'>".to_string()
            }
            _ => String::new(),
        };
        self.set_mode(ModeState::CommandLine(CommandLineState { text }));
        Ok(())
    }
}
