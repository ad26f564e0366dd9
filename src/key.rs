/// Key codes representing individual keys on the keyboard.
///
/// This enum provides a platform-agnostic representation of keys.
/// Hosts should map their platform-specific key events to these codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    /// A character key. Shifted letters arrive as their uppercase form.
    Char(char),
    /// The Escape key, used to exit modes and cancel operations.
    Esc,
    /// The Enter/Return key.
    Enter,
    /// The Backspace key for deleting characters in insert/command-line modes.
    Backspace,
    /// The Delete key.
    Delete,
    /// The Tab key.
    Tab,
    Left,
    Right,
    Up,
    Down,
}

bitflags::bitflags! {
    /// Keyboard modifier flags.
    ///
    /// These can be combined to represent multiple modifiers held simultaneously.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Modifiers: u8 {
        const SHIFT = 0b0001;
        const CTRL  = 0b0010;
        const ALT   = 0b0100;
        const META  = 0b1000;
    }
}

/// A key press event with optional modifiers.
///
/// This represents a single key press, including any modifier keys held down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyEvent {
    /// The key that was pressed.
    pub code: KeyCode,
    /// Modifier keys held during the key press.
    pub mods: Modifiers,
}

impl KeyEvent {
    pub const fn new(code: KeyCode, mods: Modifiers) -> Self {
        Self { code, mods }
    }

    pub const fn plain(code: KeyCode) -> Self {
        Self::new(code, Modifiers::empty())
    }

    pub const fn char(c: char) -> Self {
        Self::plain(KeyCode::Char(c))
    }

    pub const fn ctrl(c: char) -> Self {
        Self::new(KeyCode::Char(c), Modifiers::CTRL)
    }

    /// The character this key types, ignoring SHIFT. Keys held with CTRL, ALT
    /// or META are commands, not text.
    pub fn text_char(&self) -> Option<char> {
        match self.code {
            KeyCode::Char(c) if !self.has_command_modifier() => Some(c),
            _ => None,
        }
    }

    pub fn is_ctrl(&self, c: char) -> bool {
        self.mods.contains(Modifiers::CTRL)
            && matches!(self.code, KeyCode::Char(k) if k.eq_ignore_ascii_case(&c))
    }

    fn has_command_modifier(&self) -> bool {
        self.mods
            .intersects(Modifiers::CTRL | Modifiers::ALT | Modifiers::META)
    }
}

/// Input events that can be processed by the vim engine.
///
/// This enum distinguishes between key presses (used for commands)
/// and text input (used in insert/command-line modes).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    /// A key press event, typically used for commands and navigation.
    Key(KeyEvent),
    /// A character received in text input mode (insert or command-line).
    /// This allows hosts to handle composed characters and IME input.
    ReceivedChar(char),
}

impl InputEvent {
    /// Normalizes both variants to a key event.
    pub fn as_key(&self) -> KeyEvent {
        match self {
            InputEvent::Key(key) => *key,
            InputEvent::ReceivedChar(c) => KeyEvent::char(*c),
        }
    }
}

impl From<KeyEvent> for InputEvent {
    fn from(key: KeyEvent) -> Self {
        InputEvent::Key(key)
    }
}

/// Splits a key string into events.
///
/// Plain characters map to themselves. Special keys use Vim notation:
/// `<Esc>`, `<CR>`/`<Enter>`, `<BS>`, `<Del>`, `<Tab>`, `<Left>`, `<Right>`,
/// `<Up>`, `<Down>`, `<lt>` and `<C-x>`. A `<` that does not open a known
/// name is taken literally, so `"<"` and `">."` need no escaping.
pub fn parse_keys(input: &str) -> Vec<KeyEvent> {
    let mut keys = Vec::with_capacity(input.len());
    let mut rest = input;
    while let Some(c) = rest.chars().next() {
        if c == '<'
            && let Some(close) = rest.find('>')
            && let Some(key) = notation(&rest[1..close])
        {
            keys.push(key);
            rest = &rest[close + 1..];
            continue;
        }
        keys.push(KeyEvent::char(c));
        rest = &rest[c.len_utf8()..];
    }
    keys
}

fn notation(name: &str) -> Option<KeyEvent> {
    let lower = name.to_ascii_lowercase();
    let key = match lower.as_str() {
        "esc" => KeyEvent::plain(KeyCode::Esc),
        "cr" | "enter" | "return" => KeyEvent::plain(KeyCode::Enter),
        "bs" => KeyEvent::plain(KeyCode::Backspace),
        "del" => KeyEvent::plain(KeyCode::Delete),
        "tab" => KeyEvent::plain(KeyCode::Tab),
        "left" => KeyEvent::plain(KeyCode::Left),
        "right" => KeyEvent::plain(KeyCode::Right),
        "up" => KeyEvent::plain(KeyCode::Up),
        "down" => KeyEvent::plain(KeyCode::Down),
        "lt" => KeyEvent::char('<'),
        "space" => KeyEvent::char(' '),
        _ => {
            let c = lower.strip_prefix("c-")?;
            let mut chars = c.chars();
            let ch = chars.next()?;
            if chars.next().is_some() {
                return None;
            }
            KeyEvent::ctrl(ch)
        }
    };
    Some(key)
}
