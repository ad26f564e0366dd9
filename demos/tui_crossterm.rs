//! Terminal UI example using crossterm and ratatui.
//!
//! Hosts a rope buffer behind the vim_core engine. Run with:
//! `cargo run --example tui_crossterm`. Set `VIM_CORE_LOG=<file>` to write
//! engine logs there (filtered by `RUST_LOG`).

use std::borrow::Cow;
use std::fs::File;
use std::io;
use std::sync::Mutex;

use crossterm::{
    event::{self, Event, KeyCode as CKeyCode, KeyEvent as CKeyEvent, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};
use ropey::Rope;
use tracing_subscriber::EnvFilter;
use unicode_segmentation::UnicodeSegmentation;
use vim_core::{
    GlobalSettings, KeyCode, KeyEvent, Mode, Position, Range, Selection, TextBuffer, View,
    VimBuffer, VisualKind,
};

const WELCOME: &str = "Welcome to vim_core!\n\
\n\
Press 'i' to enter insert mode and 'Esc' to return to normal mode.\n\
Type :q<Enter> or Ctrl-C to quit.\n\
\n\
Try vim commands like:\n\
- hjkl, w, b, e, %, gg, G for movement\n\
- dd, dw, cw, x to delete and change\n\
- yy and p to yank and put, \"a to pick a register\n\
- V, v, Ctrl-V and > to select and shift\n\
- . to repeat the last change\n";

/// Text buffer implementation using ropey
struct RopeBuffer {
    rope: Rope,
}

impl RopeBuffer {
    fn char_index(&self, pos: Position) -> usize {
        if pos.line as usize >= self.rope.len_lines() {
            return self.rope.len_chars();
        }
        let line = self.line(pos.line);
        let byte = line
            .grapheme_indices(true)
            .nth(pos.col as usize)
            .map_or(line.len(), |(i, _)| i);
        self.rope.line_to_char(pos.line as usize) + line[..byte].chars().count()
    }
}

impl TextBuffer for RopeBuffer {
    fn line_count(&self) -> u32 {
        self.rope.len_lines() as u32
    }

    fn line(&self, line: u32) -> Cow<'_, str> {
        if line as usize >= self.rope.len_lines() {
            return Cow::Borrowed("");
        }
        let mut text = self.rope.line(line as usize).to_string();
        if text.ends_with('\n') {
            text.pop();
        }
        Cow::Owned(text)
    }

    fn insert(&mut self, at: Position, text: &str) {
        let idx = self.char_index(at);
        self.rope.insert(idx, text);
    }

    fn delete(&mut self, range: Range) {
        let start = self.char_index(range.start);
        let end = self.char_index(range.end);
        self.rope.remove(start..end);
    }

    fn replace(&mut self, range: Range, text: &str) {
        self.delete(range);
        self.insert(range.start, text);
    }
}

#[derive(Default)]
struct TermView {
    caret: Position,
    selection: Option<Selection>,
}

impl View for TermView {
    fn caret(&self) -> Position {
        self.caret
    }

    fn set_caret(&mut self, pos: Position) {
        self.caret = pos;
    }

    fn selection(&self) -> Option<Selection> {
        self.selection
    }

    fn set_selection(&mut self, selection: Selection) {
        self.selection = Some(selection);
    }

    fn clear_selection(&mut self) {
        self.selection = None;
    }
}

struct App {
    vim: VimBuffer<RopeBuffer, TermView, GlobalSettings>,
    should_quit: bool,
}

impl App {
    fn new() -> Self {
        let settings = GlobalSettings {
            shift_width: 4,
            expand_tab: true,
            ..GlobalSettings::default()
        };
        let text = RopeBuffer {
            rope: Rope::from_str(WELCOME),
        };
        Self {
            vim: VimBuffer::with_settings(text, TermView::default(), settings),
            should_quit: false,
        }
    }

    fn handle_crossterm_event(&mut self, event: CKeyEvent) {
        let Some(key) = convert_crossterm_event(event) else {
            return;
        };
        let command = self.vim.engine().snapshot().command_line;
        if key.code == KeyCode::Enter && command.as_deref().is_some_and(|c| c.trim() == "q") {
            self.should_quit = true;
            return;
        }
        self.vim.process_key(key);
    }

    fn status(&self) -> String {
        let snapshot = self.vim.engine().snapshot();
        if let Some(command) = snapshot.command_line {
            return format!(":{command}");
        }
        let mode = match snapshot.mode {
            Mode::Normal => "-- NORMAL --",
            Mode::Insert => "-- INSERT --",
            Mode::Replace => "-- REPLACE --",
            Mode::Visual(VisualKind::CharWise) => "-- VISUAL --",
            Mode::Visual(VisualKind::LineWise) => "-- VISUAL LINE --",
            Mode::Visual(VisualKind::BlockWise) => "-- VISUAL BLOCK --",
            Mode::CommandLine => ":",
        };
        let caret = self.vim.view().caret;
        format!("{mode}    {}:{}", caret.line + 1, caret.col + 1)
    }
}

fn convert_crossterm_event(event: CKeyEvent) -> Option<KeyEvent> {
    let key = match event.code {
        CKeyCode::Char(c) if event.modifiers.contains(KeyModifiers::CONTROL) => KeyEvent::ctrl(c),
        CKeyCode::Char(c) => KeyEvent::char(c),
        CKeyCode::Esc => KeyEvent::plain(KeyCode::Esc),
        CKeyCode::Enter => KeyEvent::plain(KeyCode::Enter),
        CKeyCode::Backspace => KeyEvent::plain(KeyCode::Backspace),
        CKeyCode::Delete => KeyEvent::plain(KeyCode::Delete),
        CKeyCode::Tab => KeyEvent::plain(KeyCode::Tab),
        CKeyCode::Left => KeyEvent::plain(KeyCode::Left),
        CKeyCode::Right => KeyEvent::plain(KeyCode::Right),
        CKeyCode::Up => KeyEvent::plain(KeyCode::Up),
        CKeyCode::Down => KeyEvent::plain(KeyCode::Down),
        _ => return None,
    };
    Some(key)
}

/// Splits one line into plain and selected pieces.
fn render_line(text: &str, line: u32, selection: Option<Selection>) -> Line<'static> {
    let Some(selection) = selection else {
        return Line::from(text.to_string());
    };
    let (start, end) = selection.ordered();
    if line < start.line || line > end.line {
        return Line::from(text.to_string());
    }
    let cells: Vec<&str> = text.graphemes(true).collect();
    let len = cells.len();
    let (from, to) = match selection.kind {
        VisualKind::LineWise => (0, len),
        VisualKind::BlockWise => {
            let left = start.col.min(end.col) as usize;
            let right = start.col.max(end.col) as usize + 1;
            (left.min(len), right.min(len))
        }
        VisualKind::CharWise => {
            let from = if line == start.line { start.col as usize } else { 0 };
            let to = if line == end.line { end.col as usize + 1 } else { len };
            (from.min(len), to.min(len))
        }
    };
    let selected = Style::default().bg(Color::Blue);
    Line::from(vec![
        Span::raw(cells[..from].concat()),
        Span::styled(cells[from..to].concat(), selected),
        Span::raw(cells[to..].concat()),
    ])
}

fn ui(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([Constraint::Min(3), Constraint::Length(3)].as_ref())
        .split(f.size());

    let text = app.vim.text();
    let selection = app.vim.view().selection;
    let lines: Vec<Line> = (0..text.line_count())
        .map(|i| render_line(&text.line(i), i, selection))
        .collect();

    let body = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title("vim_core demo"),
    );
    f.render_widget(body, chunks[0]);

    let status = Paragraph::new(app.status())
        .style(Style::default().add_modifier(Modifier::BOLD))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(status, chunks[1]);

    let caret = app.vim.view().caret;
    f.set_cursor(
        chunks[0].x + 1 + caret.col as u16,
        chunks[0].y + 1 + caret.line as u16,
    );
}

/// Sends engine logs to the file named by `VIM_CORE_LOG`; the terminal
/// itself belongs to the UI.
fn init_logging() -> io::Result<()> {
    let Ok(path) = std::env::var("VIM_CORE_LOG") else {
        return Ok(());
    };
    let file = File::create(path)?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}

fn main() -> Result<(), io::Error> {
    init_logging()?;

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new();

    loop {
        terminal.draw(|f| ui(f, &app))?;

        if let Event::Key(key) = event::read()? {
            if key.code == CKeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                break;
            }

            app.handle_crossterm_event(key);

            if app.should_quit {
                break;
            }
        }
    }

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    Ok(())
}
