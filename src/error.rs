use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum VjsonError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON parsing error: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Document root must be an object or an array")]
    RootNotCollection,

    #[error("Snapshot parsing error: {0}")]
    SnapshotParse(String),

    #[error("Node '{name}' has no recognizable type tag")]
    MissingTypeTag { name: String },

    #[error("Node '{name}' carries {count} type tags; tags must be unambiguous")]
    AmbiguousTypeTag { name: String, count: usize },

    #[error("'{text}' is not a valid JSON number (at '{name}')")]
    InvalidNumber { name: String, text: String },

    #[error("'{text}' is not a boolean literal (at '{name}')")]
    InvalidBoolean { name: String, text: String },

    #[error("Decoded an empty {container} from a non-empty snapshot; refusing to continue")]
    EmptyDecode { container: &'static str },

    #[error("A sibling named '{name}' already exists; sibling names must be unique")]
    DuplicateName { name: String },

    #[error("Array elements are named by their index; '{name}' cannot be renamed")]
    RenameInArray { name: String },

    #[error("Conversion from {from} to {to} is not supported")]
    UnsupportedConversion { from: &'static str, to: &'static str },

    #[error("Path '{0}' does not resolve to a node")]
    PathUnresolved(String),

    #[error("Edit is malformed: {0}")]
    MalformedEdit(String),

    #[error("Operation was cancelled before it committed")]
    Cancelled,

    #[error("Invalid node ID: {0}")]
    InvalidNodeId(usize),
}

pub type Result<T> = std::result::Result<T, VjsonError>;
