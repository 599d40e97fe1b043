//! Error types for the state manager.

use std::path::PathBuf;

use thiserror::Error;

use crate::core::state::GameState;

#[derive(Debug, Error)]
pub enum Error {
    /// A state has no entry in the dispatch table.
    #[error("no update operation mapped for state `{0}`")]
    UnmappedState(GameState),

    /// A state was given more than one entry in the dispatch table.
    #[error("state `{0}` is mapped to more than one update operation")]
    DuplicateMapping(GameState),

    /// A registrant handle that is null or whose owner has been dropped.
    #[error("registrant handle is null or no longer alive")]
    InvalidRegistrant,

    #[error("failed to read config {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    ConfigParse(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
