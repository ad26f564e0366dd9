use vim_core::{ChangeDescriptor, KeyOutcome, Operator, Position};

mod support;
use support::{lines, vim, vim_with_shift_width};

fn pos(line: u32, col: u32) -> Position {
    Position::new(line, col)
}

#[test]
fn dot_repeats_line_delete() {
    let mut vim = vim(&["a", "b", "c", "d"]);

    vim.process_as_string("dd.");

    assert_eq!(lines(&vim), vec!["c", "d"]);
}

#[test]
fn count_overrides_and_sticks() {
    let mut vim = vim(&["1", "2", "3", "4", "5", "6", "7"]);

    vim.process_as_string("dd3.");
    assert_eq!(lines(&vim), vec!["5", "6", "7"]);

    vim.process_as_string(".");
    assert_eq!(lines(&vim), vec![""]);
}

#[test]
fn change_word_repeats_with_text() {
    let mut vim = vim(&["foo bar baz"]);

    vim.process_as_string("cwxy<Esc>w.");

    assert_eq!(lines(&vim), vec!["xy xy baz"]);
    assert_eq!(vim.view().caret, pos(0, 4));
}

#[test]
fn insert_repeats_at_caret() {
    let mut vim = vim(&["x"]);

    vim.process_as_string("ia<Esc>.");

    assert_eq!(lines(&vim), vec!["aax"]);
    assert_eq!(vim.view().caret, pos(0, 0));
}

#[test]
fn append_repeats_on_other_line() {
    let mut vim = vim(&["a", "b"]);

    vim.process_as_string("A!<Esc>j.");

    assert_eq!(lines(&vim), vec!["a!", "b!"]);
}

#[test]
fn open_line_repeats() {
    let mut vim = vim(&["a"]);

    vim.process_as_string("onew<Esc>.");

    assert_eq!(lines(&vim), vec!["a", "new", "new"]);
    assert_eq!(vim.view().caret, pos(2, 2));
}

#[test]
fn counted_delete_repeats_same_count() {
    let mut vim = vim(&["abcdef"]);

    vim.process_as_string("2x.");

    assert_eq!(lines(&vim), vec!["ef"]);
}

#[test]
fn replace_char_and_join_repeat() {
    let mut vim = vim(&["abcd"]);
    vim.process_as_string("rxl.");
    assert_eq!(lines(&vim), vec!["xxcd"]);

    let mut vim = support::vim(&["a", "b", "c"]);
    vim.process_as_string("J.");
    assert_eq!(lines(&vim), vec!["a b c"]);
}

#[test]
fn put_repeats() {
    let mut vim = vim(&["a"]);

    vim.process_as_string("yyp.");

    assert_eq!(lines(&vim), vec!["a", "a", "a"]);
}

#[test]
fn visual_delete_repeats_same_width() {
    let mut vim = vim(&["abcdef", "abcdef"]);

    vim.process_as_string("vld");
    assert_eq!(lines(&vim)[0], "cdef");

    vim.process_as_string("j.");
    assert_eq!(lines(&vim), vec!["cdef", "cdef"]);
}

#[test]
fn normal_shift_repeats_cumulatively() {
    let mut vim = vim_with_shift_width(&["a", "b"], 2);

    vim.process_as_string(">>.");

    assert_eq!(lines(&vim), vec!["    a", "b"]);
}

#[test]
fn replace_mode_repeats() {
    let mut vim = vim(&["abcd", "abcd"]);

    vim.process_as_string("Rxy<Esc>j0.");

    assert_eq!(lines(&vim), vec!["xycd", "xycd"]);
}

#[test]
fn yank_is_not_recorded() {
    let mut vim = vim(&["ab"]);

    vim.process_as_string("xyl");

    assert!(matches!(
        vim.engine().last_change(),
        Some(ChangeDescriptor::Operator {
            op: Operator::Delete,
            ..
        })
    ));
    vim.process_as_string(".");
    assert_eq!(lines(&vim), vec![""]);
}

#[test]
fn repeat_without_history_is_ignored() {
    let mut vim = vim(&["abc"]);

    let outcome = vim.process_as_string(".");

    assert_eq!(outcome, KeyOutcome::Ignored);
    assert_eq!(lines(&vim), vec!["abc"]);
}

#[test]
fn empty_insert_keeps_previous_change() {
    let mut vim = vim(&["abc"]);

    vim.process_as_string("xi<Esc>.");

    assert_eq!(lines(&vim), vec!["c"]);
}

#[test]
fn repeated_change_is_one_edit_group() {
    let mut vim = vim(&["foo bar baz"]);
    vim.process_as_string("cwxy<Esc>w");
    let groups = vim.text().edit_groups;

    vim.process_as_string(".");

    assert_eq!(lines(&vim), vec!["xy xy baz"]);
    assert_eq!(vim.text().edit_groups, groups + 1);
}

#[test]
fn arrow_key_splits_a_change_into_an_insert() {
    let mut vim = vim(&["foo bar"]);

    vim.process_as_string("cwab<Left>c<Esc>w.");

    assert_eq!(lines(&vim), vec!["acb cbar"]);
    assert!(matches!(
        vim.engine().last_change(),
        Some(ChangeDescriptor::Insert { .. })
    ));
}

#[test]
fn arrow_key_keeps_the_change_typed_before_it() {
    let mut vim = vim(&["foo bar baz"]);

    vim.process_as_string("cwab<Left><Esc>w.");

    assert_eq!(lines(&vim), vec!["ab ab baz"]);
}
