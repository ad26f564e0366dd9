use vim_core::text;
use vim_core::{GlobalSettings, Position, Range, Shape, Span, VimError};

mod support;
use support::mock_buffer::MockBuffer;

fn pos(line: u32, col: u32) -> Position {
    Position::new(line, col)
}

fn sample() -> MockBuffer {
    MockBuffer::from_lines(&["ab", "cde", "f"])
}

#[test]
fn line_span_covers_whole_lines() {
    let buf = sample();

    assert_eq!(
        text::line_span(&buf, 0, 1),
        Ok(Span {
            start: pos(0, 0),
            end: pos(1, 3),
            shape: Shape::Line,
        })
    );
    assert_eq!(text::line_span(&buf, 2, 1).map(|s| s.start), Ok(pos(1, 0)));
    assert_eq!(
        text::line_span(&buf, 0, 5),
        Err(VimError::OutOfRange { line: 5, col: 0 })
    );
}

#[test]
fn line_break_is_taken_from_below_then_above() {
    let buf = sample();

    assert_eq!(
        text::line_span_including_line_break(&buf, 1, 1),
        Ok(Range::new(pos(1, 0), pos(2, 0)))
    );
    assert_eq!(
        text::line_span_including_line_break(&buf, 2, 2),
        Ok(Range::new(pos(1, 3), pos(2, 1)))
    );
    assert_eq!(
        text::line_span_including_line_break(&buf, 0, 2),
        Ok(Range::new(pos(0, 0), pos(2, 1)))
    );
}

#[test]
fn offsets_count_line_breaks() {
    let buf = sample();

    assert_eq!(text::position_to_offset(&buf, pos(0, 0)), Ok(0));
    assert_eq!(text::position_to_offset(&buf, pos(1, 2)), Ok(5));
    assert_eq!(text::position_to_offset(&buf, pos(2, 1)), Ok(8));
    assert_eq!(text::offset_to_position(&buf, 5), Ok(pos(1, 2)));
    assert_eq!(text::offset_to_position(&buf, 2), Ok(pos(0, 2)));
    assert_eq!(text::offset_to_position(&buf, 3), Ok(pos(1, 0)));
}

#[test]
fn offsets_outside_the_buffer_fail() {
    let buf = sample();

    assert_eq!(
        text::position_to_offset(&buf, pos(0, 3)),
        Err(VimError::OutOfRange { line: 0, col: 3 })
    );
    assert_eq!(
        text::offset_to_position(&buf, 9),
        Err(VimError::OutOfRange { line: 3, col: 0 })
    );
}

#[test]
fn clamp_normal_rests_on_a_character() {
    let buf = MockBuffer::from_lines(&["abc", ""]);

    assert_eq!(text::clamp_normal(&buf, pos(0, 3)), pos(0, 2));
    assert_eq!(text::clamp_normal(&buf, pos(7, 9)), pos(1, 0));
}

#[test]
fn slice_joins_lines_with_breaks() {
    let buf = sample();

    assert_eq!(text::slice(&buf, Range::new(pos(0, 1), pos(1, 2))), "b\ncd");
    assert_eq!(text::slice(&buf, Range::new(pos(1, 0), pos(2, 0))), "cde\n");
    assert_eq!(text::slice(&buf, Range::new(pos(0, 0), pos(3, 0))), "ab\ncde\nf\n");
}

#[test]
fn columns_are_graphemes() {
    assert_eq!(text::byte_index("e\u{301}👍🏽x", 2), 11);
    assert_eq!(text::byte_index("ab", 9), 2);
    assert_eq!(text::grapheme_at("e\u{301}x", 0), Some("e\u{301}"));
    assert_eq!(text::graphemes("👍🏽!").len(), 2);
}

#[test]
fn indentation_width_and_rebuild() {
    assert_eq!(text::leading_whitespace("\t  x", 4), (3, 6));
    assert_eq!(text::leading_whitespace("  \tx", 4), (3, 4));
    assert_eq!(text::leading_whitespace("x", 4), (0, 0));

    let tabs = GlobalSettings {
        tab_stop: 4,
        ..GlobalSettings::default()
    };
    assert_eq!(text::build_indent(10, &tabs), "\t\t  ");

    let spaces = GlobalSettings {
        expand_tab: true,
        ..tabs
    };
    assert_eq!(text::build_indent(10, &spaces), " ".repeat(10));
}

#[test]
fn advance_follows_inserted_text() {
    assert_eq!(text::advance(pos(1, 3), "ab"), pos(1, 5));
    assert_eq!(text::advance(pos(1, 3), "x\nyz"), pos(2, 2));
    assert_eq!(text::advance(pos(1, 3), "\n"), pos(2, 0));
}

#[test]
fn default_position_is_the_origin() {
    assert_eq!(Position::default(), Position::ZERO);
    assert_eq!(support::mock_view::MockView::new().caret, pos(0, 0));
}
