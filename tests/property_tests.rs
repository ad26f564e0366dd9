use proptest::prelude::*;
use vim_core::motion::{self, MotionContext};
use vim_core::parser::{ParseContext, Target};
use vim_core::text;
use vim_core::{
    KeyEvent, Mode, NormalCommand, Parsed, PendingCommand, Position, TextBuffer, parse_keys,
};

mod support;
use support::{TestVim, lines, vim_at, vim_with_shift_width};

// Lines without tabs, so that indentation round-trips through spaces
fn lines_strategy() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("[a-z .()]{0,12}", 1..6)
}

// Arbitrary text, including blank lines, tabs and multi-codepoint graphemes
fn text_strategy() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(
        prop_oneof![
            Just(String::new()),
            "[a-zA-Z0-9 .,;()\\[\\]{}\t-]{0,30}",
            "[a-z \u{00E9}\u{4E00}-\u{4E10}]{0,10}",
            Just("e\u{301}x👍🏽 y".to_string()),
        ],
        1..8,
    )
}

fn motion_strategy() -> impl Strategy<Value = &'static str> {
    prop::sample::select(vec![
        "h", "j", "k", "l", "w", "W", "b", "B", "e", "E", "0", "^", "$", "{", "}", "G", "gg",
        "%", "2w", "3j", "fa", "t.",
    ])
}

fn harness(text: &[String], line: u32, col: u32) -> TestVim {
    let refs: Vec<&str> = text.iter().map(String::as_str).collect();
    let mut vim = vim_at(&refs, 0, 0);
    let line = line % vim.text().line_count().max(1);
    let col = col % vim.text().line_len(line).max(1);
    vim.view_mut().caret = Position::new(line, col);
    vim
}

/// Where `y` followed by `keys` should leave the caret: the start of the
/// yanked span, or where it was when the motion fails.
fn yank_start(vim: &TestVim, keys: &str) -> Position {
    let caret = vim.view().caret;
    let mut pending = PendingCommand::default();
    let mut parsed = Parsed::Incomplete;
    for key in parse_keys(&format!("y{keys}")) {
        (pending, parsed) = pending.advance(key, ParseContext::Normal);
    }
    let Parsed::Complete(NormalCommand::Operate {
        target: Target::Motion(m),
        count,
        ..
    }) = parsed
    else {
        return caret;
    };
    let ctx = MotionContext {
        operator_pending: true,
        ..MotionContext::default()
    };
    match motion::resolve(vim.text(), caret, m, count, &ctx) {
        Some(result) => text::clamp_normal(vim.text(), result.span(vim.text(), caret).start),
        None => caret,
    }
}

fn assert_caret_in_bounds(vim: &TestVim) {
    let caret = vim.view().caret;
    assert!(caret.line < vim.text().line_count().max(1), "caret {caret:?} below buffer");
    assert!(
        caret.col <= vim.text().line_len(caret.line),
        "caret {caret:?} past line end"
    );
}

proptest! {
    #[test]
    fn shift_right_then_left_restores(text in lines_strategy(), width in 1u32..9, seed in 0usize..8) {
        let refs: Vec<&str> = text.iter().map(String::as_str).collect();
        let mut vim = vim_with_shift_width(&refs, width);
        let n = seed % text.len() + 1;

        vim.process_as_string(&format!("{n}>>"));
        vim.process_as_string(&format!("{n}<<"));

        prop_assert_eq!(lines(&vim), text);
    }

    #[test]
    fn yank_leaves_buffer_alone(
        text in text_strategy(),
        line in 0u32..10,
        col in 0u32..40,
        motion in motion_strategy(),
    ) {
        let mut vim = harness(&text, line, col);
        let before = lines(&vim);
        let start = vim.view().caret;
        let expected = yank_start(&vim, motion);

        vim.process_as_string(&format!("y{motion}"));

        prop_assert_eq!(lines(&vim), before);
        prop_assert_eq!(vim.view().caret, expected);
        prop_assert!(expected <= start);
        prop_assert_eq!(vim.mode(), Mode::Normal);
        prop_assert!(vim.engine().last_change().is_none());
    }

    #[test]
    fn escape_discards_pending_keys(
        text in text_strategy(),
        line in 0u32..10,
        col in 0u32..40,
        prefix in prop::sample::select(vec!["d", "2d", "c", "y3", "\"a", "\"ad", "g", "gu", "f", "dt", "r", ">", "3"]),
    ) {
        let mut vim = harness(&text, line, col);
        let before = lines(&vim);
        let start = vim.view().caret;

        vim.process_as_string(prefix);
        vim.process_as_string("<Esc>");

        prop_assert_eq!(lines(&vim), before);
        prop_assert_eq!(vim.view().caret, start);
        prop_assert_eq!(vim.mode(), Mode::Normal);
        prop_assert_eq!(vim.engine().snapshot().pending, PendingCommand::default());
    }

    #[test]
    fn visual_anchor_survives_motions(
        text in text_strategy(),
        line in 0u32..10,
        col in 0u32..40,
        motions in prop::collection::vec(motion_strategy(), 0..6),
    ) {
        let mut vim = harness(&text, line, col);
        let start = vim.view().caret;

        vim.process_as_string("v");
        for motion in motions {
            vim.process_as_string(motion);
        }

        prop_assert!(matches!(vim.mode(), Mode::Visual(_)));
        let selection = vim.view().selection;
        prop_assert_eq!(selection.map(|s| s.anchor), Some(start));
        prop_assert_eq!(selection.map(|s| s.caret), Some(vim.view().caret));
    }

    #[test]
    fn random_keys_keep_caret_in_bounds(
        text in text_strategy(),
        line in 0u32..10,
        col in 0u32..40,
        keys in prop::collection::vec(
            prop_oneof![
                prop::sample::select(vec![
                    'h', 'j', 'k', 'l', 'w', 'b', 'e', 'x', 'X', 'd', 'c', 'y', 'p', 'P', 'u', 'i',
                    'a', 'o', 'O', 'v', 'V', 'r', 'R', 'J', '~', '>', '<', '.', '0', '2', '$', 'g',
                    'G', 'f', 't', ';', ':', '"', 'q', ' ', '%', '}',
                ])
                .prop_map(KeyEvent::char),
                Just(KeyEvent::plain(vim_core::KeyCode::Esc)),
                Just(KeyEvent::plain(vim_core::KeyCode::Enter)),
                Just(KeyEvent::plain(vim_core::KeyCode::Backspace)),
                Just(KeyEvent::ctrl('v')),
            ],
            0..40,
        ),
    ) {
        let mut vim = harness(&text, line, col);

        for key in keys {
            vim.process_key(key);
            assert_caret_in_bounds(&vim);
        }
    }
}
