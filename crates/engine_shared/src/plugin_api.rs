// crates/engine_shared/src/plugin_api.rs
//! The versioned boundary between the host and a hot-reloadable simulation
//! module.
//!
//! A reload is bracketed by `pre_reload` (release presentation resources,
//! export the state as bytes) and `post_reload` (import the bytes into the
//! freshly loaded module and re-acquire resources). Only the envelope format
//! below is fixed; the payload belongs to the module.

use thiserror::Error;

use crate::input_types::{GameEvent, InputState};
use crate::render_api::{Canvas, ResourceError};

// ==================================================================================
// 1. STATE ENVELOPE
// ==================================================================================

pub const SNAPSHOT_MAGIC_HEADER: u32 = 0x4B44_534E; // "KDSN"

/// Fixed-size header in front of every exported state payload.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateEnvelope {
    pub magic_header: u32,
    pub state_version: u32,
    pub schema_hash: u64,
    pub payload_len: u64,
}

impl StateEnvelope {
    pub const SIZE: usize = 24;

    pub fn new(state_version: u32, schema_hash: u64, payload_len: usize) -> Self {
        Self {
            magic_header: SNAPSHOT_MAGIC_HEADER,
            state_version,
            schema_hash,
            payload_len: payload_len as u64,
        }
    }

    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut out = [0u8; Self::SIZE];
        out[0..4].copy_from_slice(&self.magic_header.to_le_bytes());
        out[4..8].copy_from_slice(&self.state_version.to_le_bytes());
        out[8..16].copy_from_slice(&self.schema_hash.to_le_bytes());
        out[16..24].copy_from_slice(&self.payload_len.to_le_bytes());
        out
    }

    /// Parse the header and return it with the payload slice it describes.
    pub fn split(bytes: &[u8]) -> Result<(StateEnvelope, &[u8]), StateError> {
        if bytes.len() < Self::SIZE {
            return Err(StateError::Truncated);
        }
        let (head, rest) = bytes.split_at(Self::SIZE);
        let envelope = StateEnvelope {
            magic_header: u32::from_le_bytes(head[0..4].try_into().unwrap_or_default()),
            state_version: u32::from_le_bytes(head[4..8].try_into().unwrap_or_default()),
            schema_hash: u64::from_le_bytes(head[8..16].try_into().unwrap_or_default()),
            payload_len: u64::from_le_bytes(head[16..24].try_into().unwrap_or_default()),
        };
        if envelope.magic_header != SNAPSHOT_MAGIC_HEADER {
            return Err(StateError::BadMagic(envelope.magic_header));
        }
        let len = envelope.payload_len as usize;
        if rest.len() < len {
            return Err(StateError::Truncated);
        }
        Ok((envelope, &rest[..len]))
    }
}

// ==================================================================================
// 2. STRUCTURAL HASHING
// ==================================================================================

/// FNV-1a over a schema description string. Modules hash a textual listing
/// of their persisted fields, so reordering or renaming a field changes it.
pub const fn calculate_layout_hash(schema: &str) -> u64 {
    let bytes = schema.as_bytes();
    let mut hash: u64 = 0xcbf29ce484222325;
    const PRIME: u64 = 0x100000001b3;
    let mut i = 0;
    while i < bytes.len() {
        hash ^= bytes[i] as u64;
        hash = hash.wrapping_mul(PRIME);
        i += 1;
    }
    hash
}

// ==================================================================================
// 3. ERRORS
// ==================================================================================

#[derive(Debug, Error)]
pub enum StateError {
    #[error("state snapshot is truncated")]
    Truncated,
    #[error("bad snapshot magic {0:#x}")]
    BadMagic(u32),
    #[error("schema mismatch: module expects {expected:#x}, snapshot has {found:#x}")]
    SchemaMismatch { expected: u64, found: u64 },
    #[error("state version mismatch: module expects {expected}, snapshot has {found}")]
    VersionMismatch { expected: u32, found: u32 },
    #[error("state codec failed: {0}")]
    Codec(String),
}

#[derive(Debug, Error)]
pub enum ModuleError {
    /// Render resources could not be acquired. Always fatal for the host.
    #[error(transparent)]
    Resource(#[from] ResourceError),
    #[error(transparent)]
    State(#[from] StateError),
}

// ==================================================================================
// 4. MODULE INTERFACE
// ==================================================================================

/// What the host gets back from a frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameStatus {
    /// New window title, emitted about once per second.
    pub window_title: Option<String>,
}

pub trait SimulationModule {
    /// Cold start: fresh state, menu level loaded, resources acquired.
    fn init(&mut self, canvas: &mut dyn Canvas) -> Result<(), ModuleError>;

    /// Dispatch one discrete input event.
    fn handle_event(&mut self, event: &GameEvent);

    /// Advance the simulation by one frame.
    fn update(&mut self, input: &InputState) -> FrameStatus;

    /// Draw the current state.
    fn render(&mut self, canvas: &mut dyn Canvas);

    /// Release presentation resources and export the live state.
    fn pre_reload(&mut self, canvas: &mut dyn Canvas) -> Result<Vec<u8>, ModuleError>;

    /// Import state exported by `pre_reload` and re-acquire resources.
    fn post_reload(&mut self, snapshot: &[u8], canvas: &mut dyn Canvas) -> Result<(), ModuleError>;
}
