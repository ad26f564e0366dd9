//! Operators: edits applied to a shaped span coming from a motion or a
//! visual selection.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::edit::{EditPlan, swap_case};
use crate::error::Result;
use crate::register::{RegisterName, RegisterStore, RegisterValue};
use crate::text::{self, graphemes};
use crate::traits::{Settings, TextBuffer};
use crate::types::{Position, Range, Shape, Span};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operator {
    /// `d`
    Delete,
    /// `y`
    Yank,
    /// `c`
    Change,
    /// `<`
    ShiftLeft,
    /// `>`
    ShiftRight,
    /// `g~`
    SwapCase,
    /// `gu`
    Lowercase,
    /// `gU`
    Uppercase,
}

impl Operator {
    /// Operators typed with a single key.
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'd' => Some(Operator::Delete),
            'y' => Some(Operator::Yank),
            'c' => Some(Operator::Change),
            '<' => Some(Operator::ShiftLeft),
            '>' => Some(Operator::ShiftRight),
            _ => None,
        }
    }

    /// Operators typed after a `g` prefix.
    pub fn from_g_char(c: char) -> Option<Self> {
        match c {
            '~' => Some(Operator::SwapCase),
            'u' => Some(Operator::Lowercase),
            'U' => Some(Operator::Uppercase),
            _ => None,
        }
    }

    /// Whether applying this operator modifies the buffer and so becomes
    /// the change `.` repeats.
    pub fn is_change(&self) -> bool {
        !matches!(self, Operator::Yank)
    }

    pub fn is_shift(&self) -> bool {
        matches!(self, Operator::ShiftLeft | Operator::ShiftRight)
    }
}

/// Where the caret goes after an operator, and whether Insert mode follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditResult {
    pub caret: Position,
    pub enter_insert: bool,
}

/// Everything an operator touches besides the span itself.
pub struct OperatorContext<'a> {
    pub text: &'a mut dyn TextBuffer,
    pub settings: &'a dyn Settings,
    pub registers: &'a mut RegisterStore,
}

/// Applies `op` to `span`.
///
/// `count` only matters for the shift operators, where it multiplies the
/// shift width; counts typed before motions are already folded into the span.
/// The whole edit is planned and validated before the buffer or any register
/// changes.
pub fn apply(
    op: Operator,
    span: Span,
    count: u32,
    register: RegisterName,
    ctx: &mut OperatorContext<'_>,
) -> Result<EditResult> {
    debug!(?op, ?span, count, %register, "applying operator");
    let count = count.max(1);
    match op {
        Operator::Yank => {
            let value = register_value(&*ctx.text, &span);
            ctx.registers.write_yank(register, value);
            Ok(EditResult {
                caret: span.start,
                enter_insert: false,
            })
        }
        Operator::Delete | Operator::Change => delete(op, span, register, ctx),
        Operator::ShiftLeft | Operator::ShiftRight => shift(op, span, count, ctx),
        Operator::SwapCase | Operator::Lowercase | Operator::Uppercase => {
            let convert: fn(&str) -> String = match op {
                Operator::SwapCase => swap_case,
                Operator::Lowercase => str::to_lowercase,
                _ => str::to_uppercase,
            };
            let mut plan = EditPlan::new();
            for range in pieces(&*ctx.text, &span) {
                let original = text::slice(&*ctx.text, range);
                plan.replace(range, convert(&original));
            }
            plan.apply(&mut *ctx.text)?;
            Ok(EditResult {
                caret: span.start,
                enter_insert: false,
            })
        }
    }
}

/// The raw ranges a span covers: one per line for blocks, a single range
/// otherwise. Line spans exclude the final line break.
fn pieces<B: TextBuffer + ?Sized>(buf: &B, span: &Span) -> Vec<Range> {
    match span.shape {
        Shape::Block => (span.first_line()..=span.end.line)
            .map(|line| {
                let (left, right) = text::block_columns(buf, line, span);
                Range::new(Position::new(line, left), Position::new(line, right))
            })
            .collect(),
        _ => vec![span.range()],
    }
}

/// The text a span holds, shaped for a register.
pub fn register_value<B: TextBuffer + ?Sized>(buf: &B, span: &Span) -> RegisterValue {
    match span.shape {
        Shape::Character => RegisterValue::new(text::slice(buf, span.range()), Shape::Character),
        Shape::Line => {
            let mut body = text::slice(buf, span.range());
            body.push('\n');
            RegisterValue::new(body, Shape::Line)
        }
        Shape::Block => {
            let rows: Vec<String> = pieces(buf, span)
                .into_iter()
                .map(|range| text::slice(buf, range))
                .collect();
            RegisterValue::new(rows.join("\n"), Shape::Block)
        }
    }
}

fn delete(
    op: Operator,
    span: Span,
    register: RegisterName,
    ctx: &mut OperatorContext<'_>,
) -> Result<EditResult> {
    let change = op == Operator::Change;
    let value = register_value(&*ctx.text, &span);
    let mut plan = EditPlan::new();
    match span.shape {
        Shape::Line if change => {
            // the lines collapse into one empty line to type into
            plan.replace(span.range(), "");
        }
        Shape::Line => {
            let range = text::line_span_including_line_break(
                &*ctx.text,
                span.first_line(),
                span.end.line,
            )?;
            plan.delete(range);
        }
        Shape::Character | Shape::Block => {
            for range in pieces(&*ctx.text, &span) {
                plan.delete(range);
            }
        }
    }
    plan.validate(&*ctx.text)?;
    ctx.registers.write_delete(register, value);
    plan.apply(&mut *ctx.text)?;

    let caret = match span.shape {
        Shape::Line if !change => {
            let line = span.first_line().min(ctx.text.last_line());
            text::first_non_blank(&*ctx.text, line)
        }
        _ => ctx.text.clamp(span.start),
    };
    Ok(EditResult {
        caret,
        enter_insert: change,
    })
}

fn shift(
    op: Operator,
    span: Span,
    count: u32,
    ctx: &mut OperatorContext<'_>,
) -> Result<EditResult> {
    let amount = ctx.settings.shift_width().saturating_mul(count);
    let tab_stop = ctx.settings.tab_stop();
    let mut plan = EditPlan::new();
    let first = span.first_line();
    let last = span.last_line();

    for line in first..=last {
        let content = ctx.text.line(line);
        if span.shape == Shape::Block {
            let cells = graphemes(&content);
            let left = span.start.col;
            if left as usize >= cells.len() {
                continue;
            }
            if op == Operator::ShiftRight {
                plan.insert(Position::new(line, left), " ".repeat(amount as usize));
            } else {
                let mut removed = 0;
                let mut width = 0;
                for cell in &cells[left as usize..] {
                    let cell_width = match *cell {
                        " " => 1,
                        "\t" => tab_stop,
                        _ => break,
                    };
                    if width + cell_width > amount {
                        break;
                    }
                    width += cell_width;
                    removed += 1;
                }
                plan.delete(Range::new(
                    Position::new(line, left),
                    Position::new(line, left + removed),
                ));
            }
            continue;
        }

        if content.is_empty() {
            continue;
        }
        let (indent_len, width) = text::leading_whitespace(&content, tab_stop);
        let new_width = match op {
            Operator::ShiftRight => width.saturating_add(amount),
            _ => width.saturating_sub(amount),
        };
        if new_width == width {
            continue;
        }
        let indent = text::build_indent(new_width, ctx.settings);
        plan.replace(
            Range::new(Position::new(line, 0), Position::new(line, indent_len)),
            indent,
        );
    }
    plan.apply(&mut *ctx.text)?;

    Ok(EditResult {
        caret: text::first_non_blank(&*ctx.text, first),
        enter_insert: false,
    })
}
