#![allow(dead_code)]

pub mod mock_buffer;
pub mod mock_clipboard;
pub mod mock_view;

use mock_buffer::MockBuffer;
use mock_view::MockView;
use vim_core::{GlobalSettings, RegisterName, VimBuffer};

pub type TestVim = VimBuffer<MockBuffer, MockView, GlobalSettings>;

/// A harness over `lines` with the caret at the origin.
pub fn vim(lines: &[&str]) -> TestVim {
    VimBuffer::new(MockBuffer::from_lines(lines), MockView::new())
}

/// A harness over `lines` with the caret at `line`, `col`.
pub fn vim_at(lines: &[&str], line: u32, col: u32) -> TestVim {
    VimBuffer::new(MockBuffer::from_lines(lines), MockView::at(line, col))
}

/// Like [`vim`], with the given shift width and spaces for indentation.
pub fn vim_with_shift_width(lines: &[&str], shift_width: u32) -> TestVim {
    let settings = GlobalSettings {
        shift_width,
        expand_tab: true,
        ..GlobalSettings::default()
    };
    VimBuffer::with_settings(MockBuffer::from_lines(lines), MockView::new(), settings)
}

pub fn lines(vim: &TestVim) -> Vec<String> {
    vim.text().lines()
}

/// Text held by register `name`, without touching the clipboard.
pub fn register(vim: &TestVim, name: char) -> Option<String> {
    vim.registers()
        .peek(RegisterName::parse_or_unnamed(name))
        .map(|value| value.text.clone())
}
