//! A buffer bundled with its engine: the convenient way to drive the engine
//! from tests, scripts and simple hosts.

use tracing::trace;

use crate::engine::Engine;
use crate::key::{self, InputEvent, KeyEvent};
use crate::register::RegisterStore;
use crate::settings::GlobalSettings;
use crate::traits::{Settings, TextBuffer, View};
use crate::types::{KeyOutcome, Mode};

/// Owns the host parts of one buffer and the engine that edits it.
///
/// ```ignore
/// let mut vim = VimBuffer::new(text, view);
/// vim.process_as_string("Vj>.");
/// ```
#[derive(Debug)]
pub struct VimBuffer<B, V, S = GlobalSettings> {
    text: B,
    view: V,
    settings: S,
    engine: Engine,
}

impl<B: TextBuffer, V: View> VimBuffer<B, V, GlobalSettings> {
    pub fn new(text: B, view: V) -> Self {
        Self::with_settings(text, view, GlobalSettings::default())
    }
}

impl<B: TextBuffer, V: View, S: Settings> VimBuffer<B, V, S> {
    pub fn with_settings(text: B, view: V, settings: S) -> Self {
        Self::with_engine(text, view, settings, Engine::new())
    }

    /// Uses a preconfigured engine, e.g. one built with a clipboard.
    pub fn with_engine(text: B, view: V, settings: S, engine: Engine) -> Self {
        Self {
            text,
            view,
            settings,
            engine,
        }
    }

    pub fn process(&mut self, input: InputEvent) -> KeyOutcome {
        self.engine
            .handle_event(&mut self.text, &mut self.view, &self.settings, input)
    }

    pub fn process_key(&mut self, key: KeyEvent) -> KeyOutcome {
        self.process(InputEvent::Key(key))
    }

    /// Feeds every key in `keys`, written in Vim notation (see
    /// [`key::parse_keys`]), and returns the outcome of the last one.
    pub fn process_as_string(&mut self, keys: &str) -> KeyOutcome {
        trace!(keys, "processing key string");
        key::parse_keys(keys)
            .into_iter()
            .fold(KeyOutcome::Ignored, |_, key| self.process_key(key))
    }

    pub fn switch_mode(&mut self, mode: Mode) {
        self.engine
            .switch_mode(&mut self.text, &mut self.view, &self.settings, mode);
    }

    /// Call after the host changed the view's selection itself.
    pub fn handle_selection_changed(&mut self) {
        self.engine
            .handle_selection_changed(&mut self.text, &mut self.view, &self.settings);
    }

    pub fn mode(&self) -> Mode {
        self.engine.mode()
    }

    pub fn text(&self) -> &B {
        &self.text
    }

    pub fn text_mut(&mut self) -> &mut B {
        &mut self.text
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    pub fn settings(&self) -> &S {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut S {
        &mut self.settings
    }

    pub fn registers(&self) -> &RegisterStore {
        self.engine.registers()
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut Engine {
        &mut self.engine
    }

    /// Gives back the host parts.
    pub fn into_parts(self) -> (B, V, S) {
        (self.text, self.view, self.settings)
    }
}
