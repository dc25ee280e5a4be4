// crates/game_plugin/src/lib.rs
//! King Donkey: the hot-reloadable simulation module.
//!
//! The host loads this library, calls `_create_game` once per load, and talks
//! to the result only through `SimulationModule`.

pub mod config;
pub mod error;
pub mod events;
pub mod level;
pub mod lifecycle;
pub mod logging;
pub mod physics;
pub mod render;
pub mod shims;
pub mod state;
pub mod systems;
pub mod timing;

use engine_shared::{
    Canvas, FrameStatus, GameEvent, InputState, ModuleError, SimulationModule, ENGINE_API_VERSION,
};

use crate::config::GameConfig;
use crate::state::GameState;

pub struct KingDonkey {
    state: GameState,
}

impl KingDonkey {
    pub fn new(config: GameConfig) -> Self {
        Self {
            state: GameState::new(config),
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }
}

impl Default for KingDonkey {
    fn default() -> Self {
        Self::new(GameConfig::from_env())
    }
}

impl SimulationModule for KingDonkey {
    fn init(&mut self, canvas: &mut dyn Canvas) -> Result<(), ModuleError> {
        let config = self.state.config.clone();
        self.state = lifecycle::init(config, canvas)?;
        Ok(())
    }

    fn handle_event(&mut self, event: &GameEvent) {
        events::handle_event(&mut self.state, event);
    }

    fn update(&mut self, input: &InputState) -> FrameStatus {
        lifecycle::update(&mut self.state, input)
    }

    fn render(&mut self, canvas: &mut dyn Canvas) {
        render::render(&mut self.state, canvas);
    }

    fn pre_reload(&mut self, canvas: &mut dyn Canvas) -> Result<Vec<u8>, ModuleError> {
        lifecycle::pre_reload(&mut self.state, canvas)
    }

    fn post_reload(&mut self, snapshot: &[u8], canvas: &mut dyn Canvas) -> Result<(), ModuleError> {
        self.state = lifecycle::post_reload(snapshot, canvas)?;
        Ok(())
    }
}

//
// FFI exports
//

/// Ownership of the box passes to the host, which drops it before unloading
/// this library. Both sides are built by the same toolchain, so the trait
/// object layout agrees.
#[no_mangle]
#[allow(improper_ctypes_definitions)]
pub extern "C" fn _create_game() -> *mut dyn SimulationModule {
    logging::init_tracing();
    let game: Box<dyn SimulationModule> = Box::new(KingDonkey::default());
    Box::into_raw(game)
}

#[no_mangle]
pub extern "C" fn get_api_version() -> u32 {
    ENGINE_API_VERSION
}
