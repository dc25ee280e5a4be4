// crates/engine_core/src/plugin_manager.rs
//! Loads the simulation module, forwards frames to it and swaps it at runtime.
//!
//! Each load works on a uniquely named copy of the library so the build can
//! overwrite the original while it is mapped. Every call into the module is
//! wrapped in `catch_unwind`; a panic parks the manager in `PausedError` until
//! the next successful reload.

use std::ffi::OsStr;
use std::fs;
use std::mem::ManuallyDrop;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use libloading::{Library, Symbol};
use tracing::{error, info, warn};

use engine_shared::{Canvas, FrameStatus, GameEvent, InputState, ModuleError, SimulationModule, ENGINE_API_VERSION};

use crate::error::HostError;

pub const RELOAD_DEBOUNCE: Duration = Duration::from_millis(500);

type CreateGameFn = extern "C" fn() -> *mut dyn SimulationModule;
type ApiVersionFn = extern "C" fn() -> u32;

pub struct PluginHandle {
    game: ManuallyDrop<Box<dyn SimulationModule>>,
    lib: ManuallyDrop<Library>,
    pub path: PathBuf,
}

impl PluginHandle {
    fn game(&mut self) -> &mut dyn SimulationModule {
        self.game.as_mut()
    }
}

impl Drop for PluginHandle {
    fn drop(&mut self) {
        // The module's code lives in `lib`: drop the instance, then unmap,
        // then remove the staged copy.
        unsafe {
            ManuallyDrop::drop(&mut self.game);
            ManuallyDrop::drop(&mut self.lib);
        }
        if let Err(err) = fs::remove_file(&self.path) {
            warn!(path = %self.path.display(), %err, "could not remove staged plugin copy");
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PluginRuntimeState {
    Running,
    PausedError(String),
}

pub struct PluginManager {
    plugin: Option<PluginHandle>,
    pub runtime_state: PluginRuntimeState,
    plugin_source_path: PathBuf,
    last_reload: Option<Instant>,
    reload_debounce: Duration,
}

fn pause(state: &mut PluginRuntimeState, during: &str, msg: String) {
    error!(during, %msg, "plugin panicked; paused until reload");
    *state = PluginRuntimeState::PausedError(format!("Panic during {during}: {msg}"));
}

/// Run `f`, turning a panic into `Err` with the panic message.
fn guarded<T>(f: impl FnOnce() -> T) -> Result<T, String> {
    panic::catch_unwind(AssertUnwindSafe(f)).map_err(|payload| {
        payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic".to_string())
    })
}

impl PluginManager {
    pub fn new(path: impl AsRef<Path>) -> Result<Self, HostError> {
        let source_path = path.as_ref().to_path_buf();
        let plugin = unsafe { load_plugin(&source_path)? };

        Ok(Self {
            plugin: Some(plugin),
            runtime_state: PluginRuntimeState::Running,
            plugin_source_path: source_path,
            last_reload: None,
            reload_debounce: RELOAD_DEBOUNCE,
        })
    }

    fn is_running(&self) -> bool {
        self.runtime_state == PluginRuntimeState::Running
    }

    /// Cold start the loaded module. Resource failures are fatal.
    pub fn initial_load(&mut self, canvas: &mut dyn Canvas) -> Result<(), HostError> {
        let Some(plugin) = self.plugin.as_mut() else {
            return Ok(());
        };
        match guarded(|| plugin.game().init(canvas)) {
            Ok(result) => Ok(result?),
            Err(msg) => {
                pause(&mut self.runtime_state, "init", msg);
                Err(HostError::Panic("init"))
            }
        }
    }

    pub fn handle_event(&mut self, event: &GameEvent) {
        if !self.is_running() {
            return;
        }
        let Some(plugin) = self.plugin.as_mut() else {
            return;
        };
        if let Err(msg) = guarded(|| plugin.game().handle_event(event)) {
            pause(&mut self.runtime_state, "handle_event", msg);
        }
    }

    pub fn update(&mut self, input: &InputState) -> Option<FrameStatus> {
        if !self.is_running() {
            return None;
        }
        let plugin = self.plugin.as_mut()?;
        match guarded(|| plugin.game().update(input)) {
            Ok(status) => Some(status),
            Err(msg) => {
                pause(&mut self.runtime_state, "update", msg);
                None
            }
        }
    }

    pub fn render(&mut self, canvas: &mut dyn Canvas) {
        if !self.is_running() {
            return;
        }
        let Some(plugin) = self.plugin.as_mut() else {
            return;
        };
        if let Err(msg) = guarded(|| plugin.game().render(canvas)) {
            pause(&mut self.runtime_state, "render", msg);
        }
    }

    fn save_plugin_state(&mut self, canvas: &mut dyn Canvas) -> Option<Vec<u8>> {
        if !self.is_running() {
            return None;
        }
        let plugin = self.plugin.as_mut()?;
        match guarded(|| plugin.game().pre_reload(canvas)) {
            Ok(Ok(bytes)) => Some(bytes),
            Ok(Err(err)) => {
                warn!(%err, "state export failed; the new module will start cold");
                None
            }
            Err(msg) => {
                pause(&mut self.runtime_state, "pre_reload", msg);
                None
            }
        }
    }

    /// Swap in a fresh copy of the library, carrying the live state across.
    ///
    /// Returns `Ok(false)` when debounced or when the new library cannot be
    /// loaded (the manager is then paused). `Err` means the module could not
    /// acquire render resources, which the host treats as fatal.
    pub fn try_hot_reload(&mut self, canvas: &mut dyn Canvas) -> Result<bool, HostError> {
        let now = Instant::now();
        if !debounce_elapsed(self.last_reload, now, self.reload_debounce) {
            return Ok(false);
        }
        self.last_reload = Some(now);

        info!("hot reload requested");

        // 1. SAVE STATE
        let snapshot = self.save_plugin_state(canvas);

        // 2. UNLOAD OLD
        self.plugin = None;

        // 3. LOAD NEW
        let plugin = match unsafe { load_plugin(&self.plugin_source_path) } {
            Ok(p) => self.plugin.insert(p),
            Err(err) => {
                error!(%err, "failed to load new plugin");
                self.runtime_state = PluginRuntimeState::PausedError(format!("Failed to load new plugin: {err}"));
                return Ok(false);
            }
        };

        // 4. RESTORE STATE, or start cold
        let restored = match snapshot {
            Some(bytes) => match guarded(|| plugin.game().post_reload(&bytes, canvas)) {
                Ok(Ok(())) => {
                    info!("state restored");
                    true
                }
                Ok(Err(ModuleError::State(err))) => {
                    warn!(%err, "state import failed; starting cold");
                    false
                }
                Ok(Err(err)) => return Err(err.into()),
                Err(msg) => {
                    pause(&mut self.runtime_state, "post_reload", msg);
                    return Ok(false);
                }
            },
            None => false,
        };

        if !restored {
            match guarded(|| plugin.game().init(canvas)) {
                Ok(result) => result?,
                Err(msg) => {
                    pause(&mut self.runtime_state, "init", msg);
                    return Ok(false);
                }
            }
        }

        self.runtime_state = PluginRuntimeState::Running;
        Ok(true)
    }
}

/// Whether enough time has passed since the previous reload.
pub fn debounce_elapsed(last: Option<Instant>, now: Instant, window: Duration) -> bool {
    last.map_or(true, |last| now.saturating_duration_since(last) >= window)
}

/// Removes the staged copy on drop unless the load went through.
struct StagedCopy {
    path: PathBuf,
    keep: bool,
}

impl StagedCopy {
    fn stage(original: &Path) -> Result<Self, HostError> {
        let path = unique_copy_path(original);
        fs::copy(original, &path).map_err(|source| HostError::Stage {
            path: path.clone(),
            source,
        })?;
        Ok(Self { path, keep: false })
    }

    fn keep(mut self) -> PathBuf {
        self.keep = true;
        std::mem::take(&mut self.path)
    }
}

impl Drop for StagedCopy {
    fn drop(&mut self) {
        if !self.keep {
            let _ = fs::remove_file(&self.path);
        }
    }
}

// `staged` is declared before `lib`, so on every early return the library is
// unmapped before its file is removed.
unsafe fn load_plugin(path: &Path) -> Result<PluginHandle, HostError> {
    let staged = StagedCopy::stage(path)?;
    let lib = Library::new(&staged.path)?;

    let version: Symbol<ApiVersionFn> = lib.get(b"get_api_version")?;
    let found = version();
    if found != ENGINE_API_VERSION {
        return Err(HostError::ApiVersion {
            expected: ENGINE_API_VERSION,
            found,
        });
    }

    let create: Symbol<CreateGameFn> = lib.get(b"_create_game")?;
    let raw = create();
    if raw.is_null() {
        return Err(HostError::NullModule);
    }
    let game = Box::from_raw(raw);

    let copy_path = staged.keep();
    info!(path = %copy_path.display(), "plugin loaded");
    Ok(PluginHandle {
        game: ManuallyDrop::new(game),
        lib: ManuallyDrop::new(lib),
        path: copy_path,
    })
}

/// Sibling of `original` named `<stem>_loaded_<millis>.<ext>`.
pub fn unique_copy_path(original: &Path) -> PathBuf {
    let ts = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();
    let stem = original
        .file_stem()
        .and_then(OsStr::to_str)
        .unwrap_or("plugin");
    let ext = original
        .extension()
        .and_then(OsStr::to_str)
        .unwrap_or(std::env::consts::DLL_EXTENSION);
    original.with_file_name(format!("{stem}_loaded_{ts}.{ext}"))
}

/// `target/debug/<platform library name for game_plugin>`.
pub fn default_plugin_path() -> PathBuf {
    Path::new("target").join("debug").join(libloading::library_filename("game_plugin"))
}
