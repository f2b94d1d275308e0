//! vjson - Visual JSON editor core
//!
//! The round-trip engine of a visual JSON editor: encode a JSON value into an
//! editable tree of typed, named nodes, decode the tree (or a serialized
//! markup snapshot of it) back into JSON without losing data, and reconstruct
//! document state by replaying a path-addressed edit log.

pub mod cli;
pub mod config;
pub mod document;
pub mod edit;
pub mod error;
pub mod replay;
pub mod snapshot;
pub mod tree;
pub mod types;

pub use error::{Result, VjsonError};
