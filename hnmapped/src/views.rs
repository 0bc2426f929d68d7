//! View mode: map or list

use serde::{Deserialize, Serialize};

/// Which surface the matching posts are rendered into
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Deserialize,
    Serialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    strum::AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum ViewMode {
    #[default]
    Map,
    List,
}

impl ViewMode {
    /// The other mode
    pub fn flipped(self) -> Self {
        match self {
            Self::Map => Self::List,
            Self::List => Self::Map,
        }
    }
}

/// Holds the current mode. Two states, one transition.
#[derive(Debug, Clone, Default)]
pub struct ViewModeController {
    mode: ViewMode,
}

impl ViewModeController {
    pub fn new(mode: ViewMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> ViewMode {
        self.mode
    }

    /// Flips the mode and returns the new one. The caller re-renders.
    pub fn toggle(&mut self) -> ViewMode {
        self.mode = self.mode.flipped();
        self.mode
    }

    /// Text of the toggle control: names the mode a toggle would switch to.
    pub fn toggle_label(&self) -> &'static str {
        match self.mode {
            ViewMode::Map => "View as list",
            ViewMode::List => "View as map",
        }
    }
}
