// crates/engine_core/src/error.rs

use std::path::PathBuf;

use engine_shared::ModuleError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HostError {
    #[error("failed to stage plugin copy {path}: {source}")]
    Stage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to load plugin library: {0}")]
    Library(#[from] libloading::Error),
    #[error("plugin API version {found} does not match host version {expected}")]
    ApiVersion { expected: u32, found: u32 },
    #[error("plugin returned null from _create_game")]
    NullModule,
    /// The module could not acquire its render resources.
    #[error("simulation module failed: {0}")]
    Module(#[from] ModuleError),
    #[error("simulation module panicked during {0}")]
    Panic(&'static str),
    #[error("graphics initialization failed: {0}")]
    Graphics(String),
    #[error("window system error: {0}")]
    Window(String),
}
