use std::borrow::Cow;

use ropey::Rope;
use unicode_segmentation::UnicodeSegmentation;
use vim_core::traits::TextBuffer;
use vim_core::types::{Position, Range};

/// Rope-backed buffer that counts the edit brackets the engine opens.
pub struct MockBuffer {
    rope: Rope,
    pub edit_groups: u32,
    depth: u32,
}

impl MockBuffer {
    pub fn new(text: &str) -> Self {
        Self {
            rope: Rope::from_str(text),
            edit_groups: 0,
            depth: 0,
        }
    }

    pub fn from_lines(lines: &[&str]) -> Self {
        Self::new(&lines.join("\n"))
    }

    pub fn contents(&self) -> String {
        self.rope.to_string()
    }

    pub fn lines(&self) -> Vec<String> {
        (0..self.line_count()).map(|l| self.line(l).into_owned()).collect()
    }

    /// Char index of a grapheme position. `(line_count, 0)` is the end of
    /// the rope.
    fn char_index(&self, pos: Position) -> usize {
        if pos.line as usize >= self.rope.len_lines() {
            return self.rope.len_chars();
        }
        let line = self.line(pos.line);
        let byte = line
            .grapheme_indices(true)
            .nth(pos.col as usize)
            .map(|(i, _)| i)
            .unwrap_or(line.len());
        self.rope.line_to_char(pos.line as usize) + line[..byte].chars().count()
    }
}

impl TextBuffer for MockBuffer {
    fn line_count(&self) -> u32 {
        self.rope.len_lines() as u32
    }

    fn line(&self, line: u32) -> Cow<'_, str> {
        if line as usize >= self.rope.len_lines() {
            return Cow::Borrowed("");
        }
        let mut s = self.rope.line(line as usize).to_string();
        if s.ends_with('\n') {
            s.pop();
        }
        Cow::Owned(s)
    }

    fn insert(&mut self, at: Position, text: &str) {
        assert!(self.depth > 0, "edit outside of a bracket");
        let idx = self.char_index(at);
        self.rope.insert(idx, text);
    }

    fn delete(&mut self, range: Range) {
        assert!(self.depth > 0, "edit outside of a bracket");
        let start = self.char_index(range.start);
        let end = self.char_index(range.end);
        self.rope.remove(start..end);
    }

    fn replace(&mut self, range: Range, text: &str) {
        self.delete(range);
        self.insert(range.start, text);
    }

    fn begin_edit(&mut self) {
        if self.depth == 0 {
            self.edit_groups += 1;
        }
        self.depth += 1;
    }

    fn end_edit(&mut self) {
        self.depth -= 1;
    }
}
