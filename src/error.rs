// Error types shared by the document model, the link controller and the CLI

use crate::richtext::content_state::BlockKey;
use thiserror::Error;

/// Errors raised by editing operations on the document model
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EditError {
    #[error("unknown block: {0}")]
    UnknownBlock(BlockKey),

    #[error("offset {offset} out of range for block {key} (length {len})")]
    OffsetOutOfRange {
        key: BlockKey,
        offset: usize,
        len: usize,
    },

    #[error("link actions are disabled for a selection spanning several blocks")]
    LinkActionsDisabled,

    #[error("no link at the current selection")]
    NoLinkAtSelection,
}

/// Result of an editing operation
pub type EditResult<T = ()> = Result<T, EditError>;

/// Errors raised while reading the raw interchange format
#[derive(Debug, Error)]
pub enum RawError {
    #[error("invalid raw content: {0}")]
    Json(#[from] serde_json::Error),

    #[error("entity range in block {block} refers to missing entity {key}")]
    UnknownEntity { block: String, key: String },

    #[error("range {offset}+{length} exceeds the text of block {block} (length {len})")]
    RangeOutOfBounds {
        block: String,
        offset: usize,
        length: usize,
        len: usize,
    },

    #[error("duplicate block key: {0}")]
    DuplicateKey(String),
}

/// Errors raised while loading the configuration file
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

/// Top-level error for the command line driver
#[derive(Debug, Error)]
pub enum LinkpadError {
    #[error(transparent)]
    Edit(#[from] EditError),

    #[error(transparent)]
    Raw(#[from] RawError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid selection: {0}")]
    InvalidSelection(String),
}
