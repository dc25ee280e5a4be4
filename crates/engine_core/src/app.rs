// crates/engine_core/src/app.rs

use std::path::PathBuf;

use crate::error::HostError;
use crate::gui::GuiSystem;
use crate::input::InputMap;
use crate::platform_runner::PlatformRunner;

/// Host configuration plus the state the runner shares across frames.
pub struct App {
    pub plugin_path: PathBuf,
    pub assets_dir: PathBuf,
    pub window_title: String,
    pub gui: GuiSystem,
    pub input_map: InputMap,
}

impl App {
    pub fn new(plugin_path: impl Into<PathBuf>, assets_dir: impl Into<PathBuf>) -> Self {
        Self {
            plugin_path: plugin_path.into(),
            assets_dir: assets_dir.into(),
            window_title: "King Donkey".to_string(),
            gui: GuiSystem::new(),
            input_map: InputMap::standard(),
        }
    }

    pub fn run(self) -> Result<(), HostError> {
        PlatformRunner::new(self).start()
    }
}
