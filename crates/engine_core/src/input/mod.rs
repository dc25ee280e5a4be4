// crates/engine_core/src/input/mod.rs
pub mod map;
pub mod poller;

pub use map::{translate_key, InputMap};
pub use poller::InputPoller;
