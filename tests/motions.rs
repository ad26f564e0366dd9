use vim_core::{KeyOutcome, Position};

mod support;
use support::{lines, vim, vim_at};

fn pos(line: u32, col: u32) -> Position {
    Position::new(line, col)
}

fn caret_after(lines: &[&str], start: Position, keys: &str) -> Position {
    let mut vim = vim_at(lines, start.line, start.col);
    vim.process_as_string(keys);
    vim.view().caret
}

#[test]
fn hjkl_clamp_at_edges() {
    let text = ["abc", "de"];
    assert_eq!(caret_after(&text, pos(0, 0), "h"), pos(0, 0));
    assert_eq!(caret_after(&text, pos(0, 0), "5l"), pos(0, 2));
    assert_eq!(caret_after(&text, pos(0, 2), "j"), pos(1, 1));
    assert_eq!(caret_after(&text, pos(1, 0), "9k"), pos(0, 0));
    assert_eq!(caret_after(&text, pos(0, 0), "9j"), pos(1, 0));
}

#[test]
fn vertical_moves_remember_column() {
    let text = ["abcdef", "x", "abcdef"];
    assert_eq!(caret_after(&text, pos(0, 4), "j"), pos(1, 0));
    assert_eq!(caret_after(&text, pos(0, 4), "jj"), pos(2, 4));
}

#[test]
fn dollar_sticks_to_line_end() {
    let text = ["ab", "abcdef"];
    assert_eq!(caret_after(&text, pos(0, 0), "$"), pos(0, 1));
    assert_eq!(caret_after(&text, pos(0, 0), "$j"), pos(1, 5));
}

#[test]
fn line_start_motions() {
    let text = ["   indented"];
    assert_eq!(caret_after(&text, pos(0, 6), "0"), pos(0, 0));
    assert_eq!(caret_after(&text, pos(0, 6), "^"), pos(0, 3));
}

#[test]
fn word_motions() {
    let text = ["foo.bar baz", "qux"];
    assert_eq!(caret_after(&text, pos(0, 0), "w"), pos(0, 3));
    assert_eq!(caret_after(&text, pos(0, 0), "W"), pos(0, 8));
    assert_eq!(caret_after(&text, pos(0, 0), "3w"), pos(0, 8));
    assert_eq!(caret_after(&text, pos(0, 8), "w"), pos(1, 0));
    assert_eq!(caret_after(&text, pos(0, 0), "e"), pos(0, 2));
    assert_eq!(caret_after(&text, pos(0, 0), "E"), pos(0, 6));
    assert_eq!(caret_after(&text, pos(1, 0), "b"), pos(0, 8));
    assert_eq!(caret_after(&text, pos(0, 8), "B"), pos(0, 0));
}

#[test]
fn empty_line_is_a_word() {
    let text = ["foo", "", "bar"];
    assert_eq!(caret_after(&text, pos(0, 0), "w"), pos(1, 0));
    assert_eq!(caret_after(&text, pos(2, 0), "b"), pos(1, 0));
}

#[test]
fn line_number_motions() {
    let text = ["one", "  two", "three"];
    assert_eq!(caret_after(&text, pos(0, 0), "G"), pos(2, 0));
    assert_eq!(caret_after(&text, pos(2, 0), "gg"), pos(0, 0));
    assert_eq!(caret_after(&text, pos(0, 0), "2G"), pos(1, 2));
    assert_eq!(caret_after(&text, pos(0, 0), "99G"), pos(2, 0));
    assert_eq!(caret_after(&text, pos(0, 0), "+"), pos(1, 2));
    assert_eq!(caret_after(&text, pos(0, 0), "<CR>"), pos(1, 2));
    assert_eq!(caret_after(&text, pos(2, 0), "-"), pos(1, 2));
}

#[test]
fn paragraph_motions() {
    let text = ["a", "b", "", "c", "", "d"];
    assert_eq!(caret_after(&text, pos(0, 0), "}"), pos(2, 0));
    assert_eq!(caret_after(&text, pos(0, 0), "2}"), pos(4, 0));
    assert_eq!(caret_after(&text, pos(5, 0), "{"), pos(4, 0));
    assert_eq!(caret_after(&text, pos(3, 0), "{"), pos(2, 0));
}

#[test]
fn find_and_repeat_find() {
    let text = ["a-b-c-d"];
    assert_eq!(caret_after(&text, pos(0, 0), "f-"), pos(0, 1));
    assert_eq!(caret_after(&text, pos(0, 0), "f-;"), pos(0, 3));
    assert_eq!(caret_after(&text, pos(0, 0), "f-;;,"), pos(0, 3));
    assert_eq!(caret_after(&text, pos(0, 0), "2f-"), pos(0, 3));
    assert_eq!(caret_after(&text, pos(0, 0), "t-"), pos(0, 0));
    assert_eq!(caret_after(&text, pos(0, 0), "t-;"), pos(0, 2));
    assert_eq!(caret_after(&text, pos(0, 6), "F-"), pos(0, 5));
    assert_eq!(caret_after(&text, pos(0, 6), "T-"), pos(0, 6));
}

#[test]
fn find_without_match_is_ignored() {
    let mut vim = vim_at(&["abc"], 0, 1);

    let outcome = vim.process_as_string("fz");

    assert_eq!(outcome, KeyOutcome::Ignored);
    assert_eq!(vim.view().caret, pos(0, 1));
}

#[test]
fn percent_jumps_between_pairs() {
    let text = ["if (a[1]) {", "}"];
    assert_eq!(caret_after(&text, pos(0, 3), "%"), pos(0, 8));
    assert_eq!(caret_after(&text, pos(0, 8), "%"), pos(0, 3));
    assert_eq!(caret_after(&text, pos(0, 0), "%"), pos(0, 8));
    assert_eq!(caret_after(&text, pos(0, 10), "%"), pos(1, 0));
}

#[test]
fn counts_are_capped_not_overflowed() {
    let mut vim = vim(&["abc"]);

    vim.process_as_string("99999999999l");

    assert_eq!(vim.view().caret, pos(0, 2));
    assert_eq!(lines(&vim), vec!["abc"]);
}

#[test]
fn wide_graphemes_are_one_column() {
    let text = ["e\u{301}x👍🏽y"];
    assert_eq!(caret_after(&text, pos(0, 0), "l"), pos(0, 1));
    assert_eq!(caret_after(&text, pos(0, 0), "$"), pos(0, 3));
}

#[test]
fn motions_do_not_touch_registers_or_history() {
    let mut vim = vim(&["one two", "three"]);

    vim.process_as_string("wjb$0");

    assert!(vim.engine().last_change().is_none());
    assert!(vim.registers().peek(vim_core::RegisterName::Unnamed).is_none());
}
