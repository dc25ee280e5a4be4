// crates/engine_core/src/lib.rs
//! The host: window, presentation, input and the hot-reloadable module.

pub mod app;
pub mod canvas;
pub mod error;
pub mod gui;
pub mod input;
pub mod platform_runner;
pub mod plugin_manager;

mod renderer;

pub use app::App;
pub use error::HostError;
pub use plugin_manager::default_plugin_path;
