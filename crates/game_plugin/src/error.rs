// crates/game_plugin/src/error.rs

use std::path::PathBuf;

use thiserror::Error;

/// Why a level could not be loaded. Never fatal: the caller logs and keeps
/// the level it already has.
#[derive(Debug, Error)]
pub enum LevelError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("line {line}: unknown entity tag `{tag}`")]
    UnknownTag { line: usize, tag: String },
    #[error("line {line}: malformed record `{text}`")]
    Malformed { line: usize, text: String },
    #[error("line {line}: {tag} is missing its {field}")]
    MissingField {
        line: usize,
        tag: &'static str,
        field: &'static str,
    },
    #[error("level {0} does not exist")]
    OutOfRange(u8),
}

#[derive(Debug, Error)]
pub enum LeaderboardError {
    #[error("leaderboard {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
