use serde::{Deserialize, Serialize};

use crate::traits::Settings;

/// A plain settings store with Vim's defaults.
///
/// Every field is optional when deserializing, so a host can load a partial
/// table (`{ "shift_width": 4 }`) from whatever format it uses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobalSettings {
    pub shift_width: u32,
    pub tab_stop: u32,
    pub expand_tab: bool,
    pub default_register: char,
}

impl Default for GlobalSettings {
    fn default() -> Self {
        Self {
            shift_width: 8,
            tab_stop: 8,
            expand_tab: false,
            default_register: '"',
        }
    }
}

impl Settings for GlobalSettings {
    fn shift_width(&self) -> u32 {
        // shiftwidth=0 means "use tabstop"
        if self.shift_width == 0 {
            self.tab_stop.max(1)
        } else {
            self.shift_width
        }
    }

    fn tab_stop(&self) -> u32 {
        self.tab_stop.max(1)
    }

    fn expand_tab(&self) -> bool {
        self.expand_tab
    }

    fn default_register(&self) -> char {
        self.default_register
    }
}
