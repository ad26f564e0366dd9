use vim_core::{GlobalSettings, InputEvent, KeyEvent, KeyOutcome, Mode, Position, VimBuffer};

mod support;
use support::mock_buffer::MockBuffer;
use support::mock_view::MockView;
use support::{lines, vim, vim_at};

fn pos(line: u32, col: u32) -> Position {
    Position::new(line, col)
}

#[test]
fn insert_then_escape_steps_left() {
    let mut vim = vim_at(&["abc"], 0, 1);

    vim.process_as_string("iXY");
    assert_eq!(vim.mode(), Mode::Insert);
    assert_eq!(vim.view().caret, pos(0, 3));

    vim.process_as_string("<Esc>");
    assert_eq!(lines(&vim), vec!["aXYbc"]);
    assert_eq!(vim.view().caret, pos(0, 2));
    assert_eq!(vim.mode(), Mode::Normal);
}

#[test]
fn escape_at_column_zero_stays() {
    let mut vim = vim(&["abc"]);

    vim.process_as_string("i<Esc>");

    assert_eq!(vim.view().caret, pos(0, 0));
    assert_eq!(lines(&vim), vec!["abc"]);
}

#[test]
fn append_variants() {
    let mut vim = vim(&["abc"]);
    vim.process_as_string("a!<Esc>");
    assert_eq!(lines(&vim), vec!["a!bc"]);
    assert_eq!(vim.view().caret, pos(0, 1));

    let mut vim = support::vim(&[""]);
    vim.process_as_string("ax<Esc>");
    assert_eq!(lines(&vim), vec!["x"]);

    let mut vim = vim_at(&["  abc"], 0, 4);
    vim.process_as_string("I-<Esc>A;<Esc>");
    assert_eq!(lines(&vim), vec!["  -abc;"]);
}

#[test]
fn open_lines_above_and_below() {
    let mut vim = vim(&["a", "b"]);
    vim.process_as_string("ox<Esc>");
    assert_eq!(lines(&vim), vec!["a", "x", "b"]);
    assert_eq!(vim.view().caret, pos(1, 0));

    let mut vim = support::vim(&["a"]);
    vim.process_as_string("Oy<Esc>");
    assert_eq!(lines(&vim), vec!["y", "a"]);
}

#[test]
fn enter_splits_and_backspace_joins() {
    let mut vim = vim_at(&["ab"], 0, 1);
    vim.process_as_string("i<CR><Esc>");
    assert_eq!(lines(&vim), vec!["a", "b"]);
    assert_eq!(vim.view().caret, pos(1, 0));

    let mut vim = vim_at(&["a", "b"], 1, 0);
    vim.process_as_string("i<BS><Esc>");
    assert_eq!(lines(&vim), vec!["ab"]);
    assert_eq!(vim.view().caret, pos(0, 0));
}

#[test]
fn backspace_removes_typed_text() {
    let mut vim = vim(&[""]);

    vim.process_as_string("iabc<BS><Esc>");

    assert_eq!(lines(&vim), vec!["ab"]);
    assert_eq!(
        vim.registers()
            .peek(vim_core::RegisterName::LastInserted)
            .map(|v| v.text.as_str()),
        Some("ab")
    );
}

#[test]
fn tab_follows_expandtab() {
    let mut vim = vim(&[""]);
    vim.process_as_string("i<Tab>x<Esc>");
    assert_eq!(lines(&vim), vec!["\tx"]);

    let settings = GlobalSettings {
        expand_tab: true,
        tab_stop: 4,
        ..GlobalSettings::default()
    };
    let mut vim = VimBuffer::with_settings(MockBuffer::from_lines(&["ab"]), MockView::new(), settings);
    vim.process_as_string("A<Tab>x<Esc>");
    assert_eq!(vim.text().lines(), vec!["ab  x"]);
}

#[test]
fn delete_key_removes_forward() {
    let mut vim = vim(&["abc", "d"]);
    vim.process_as_string("i<Del><Esc>");
    assert_eq!(lines(&vim), vec!["bc", "d"]);

    vim.process_as_string("A<Del><Esc>");
    assert_eq!(lines(&vim), vec!["bcd"]);
}

#[test]
fn counted_inserts_repeat_on_escape() {
    let mut vim = vim(&[""]);
    vim.process_as_string("3ix<Esc>");
    assert_eq!(lines(&vim), vec!["xxx"]);
    assert_eq!(vim.view().caret, pos(0, 2));

    let mut vim = support::vim(&["a"]);
    vim.process_as_string("2ox<Esc>");
    assert_eq!(lines(&vim), vec!["a", "x", "x"]);
}

#[test]
fn arrow_keys_move_within_insert() {
    let mut vim = vim(&[""]);

    vim.process_as_string("iab<Left>c<Esc>");

    assert_eq!(lines(&vim), vec!["acb"]);
    assert_eq!(vim.view().caret, pos(0, 1));
}

#[test]
fn received_chars_are_typed() {
    let mut vim = vim(&["x"]);

    vim.process_as_string("i");
    assert_eq!(vim.process(InputEvent::ReceivedChar('é')), KeyOutcome::Handled);
    assert_eq!(vim.process(InputEvent::ReceivedChar('\u{301}')), KeyOutcome::Handled);
    vim.process_as_string("<Esc>");

    assert_eq!(lines(&vim), vec!["é\u{301}x"]);
    assert_eq!(vim.view().caret, pos(0, 0));
}

#[test]
fn control_keys_are_not_text() {
    let mut vim = vim(&["x"]);

    vim.process_as_string("i");
    let outcome = vim.process_key(KeyEvent::ctrl('a'));

    assert_eq!(outcome, KeyOutcome::Ignored);
    assert_eq!(lines(&vim), vec!["x"]);
}

#[test]
fn host_can_switch_modes() {
    let mut vim = vim_at(&["abc"], 0, 2);

    vim.switch_mode(Mode::Insert);
    vim.process_as_string("Z");
    assert_eq!(lines(&vim), vec!["abZc"]);

    vim.switch_mode(Mode::Normal);
    assert_eq!(vim.mode(), Mode::Normal);
    assert_eq!(vim.view().caret, pos(0, 3));
}

#[test]
fn replace_overwrites_and_extends() {
    let mut vim = vim(&["abcd"]);
    vim.process_as_string("R");
    assert_eq!(vim.mode(), Mode::Replace);
    vim.process_as_string("xy<Esc>");
    assert_eq!(lines(&vim), vec!["xycd"]);
    assert_eq!(vim.view().caret, pos(0, 1));

    let mut vim = support::vim(&["ab"]);
    vim.process_as_string("Rxyz<Esc>");
    assert_eq!(lines(&vim), vec!["xyz"]);
}

#[test]
fn replace_backspace_restores_original() {
    let mut vim = vim(&["abcd"]);
    vim.process_as_string("Rxy<BS><BS>z<Esc>");
    assert_eq!(lines(&vim), vec!["zbcd"]);

    let mut vim = support::vim(&["a"]);
    vim.process_as_string("Rxy<BS><Esc>");
    assert_eq!(lines(&vim), vec!["x"]);
}

#[test]
fn counted_replace_repeats_text() {
    let mut vim = vim(&["abcdef"]);

    vim.process_as_string("2Rxy<Esc>");

    assert_eq!(lines(&vim), vec!["xyxyef"]);
    assert_eq!(vim.view().caret, pos(0, 3));
}

#[test]
fn replace_enter_breaks_line() {
    let mut vim = vim(&["abcd"]);

    vim.process_as_string("lR<CR><Esc>");

    assert_eq!(lines(&vim), vec!["a", "bcd"]);
}
