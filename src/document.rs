//! Document state: the loaded value, the edit log, and file I/O.
//!
//! A document owns the base value read from disk plus two edit lists:
//! `fresh_edits` (everything applied since load) and `saved_edits` (the
//! snapshot captured at the last successful save). Undo/redo and
//! backup/revert are all expressed over these lists; the tree itself is
//! always reconstructed by replay, never diffed.

use std::cell::Cell;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use serde_json::Value;
use tracing::error;

use crate::edit::Edit;
use crate::error::{Result, VjsonError};
use crate::replay::{replay, ReplayOptions};
use crate::snapshot::{self, DecodeMode};
use crate::tree::Tree;

/// Cooperative cancellation. The core is single-threaded: the host flips the
/// token from its own event handling before a write commits, and nothing is
/// partially written once it has.
#[derive(Debug, Default)]
pub struct CancelToken(Cell<bool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.set(true);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.get()
    }
}

#[derive(Debug, Clone, Default)]
pub struct DocumentOptions {
    pub replay: ReplayOptions,
    pub mode: DecodeMode,
    /// Indent width for persisted output; 0 writes compact JSON
    pub prettiness: usize,
}

pub struct Document {
    path: PathBuf,
    value: Value,
    fresh_edits: Vec<Edit>,
    saved_edits: Vec<Edit>,
    options: DocumentOptions,
}

impl Document {
    /// Load a document from disk. Read and parse failures fall back to an
    /// empty document with a logged error (the host reports it to the user;
    /// the core never crashes over a broken source file). A scalar root is
    /// treated the same way: a document is always rooted in a collection.
    pub fn load(path: impl Into<PathBuf>, options: DocumentOptions) -> Self {
        let path = path.into();
        let value = match fs::read_to_string(&path) {
            Ok(text) => match serde_json::from_str::<Value>(&text) {
                Ok(v) if v.is_object() || v.is_array() => v,
                Ok(_) => {
                    error!(path = %path.display(), "file is not rooted in an object or array");
                    Value::Object(Default::default())
                }
                Err(e) => {
                    error!(path = %path.display(), %e, "file is not valid JSON");
                    Value::Object(Default::default())
                }
            },
            Err(e) => {
                error!(path = %path.display(), %e, "failed to read file");
                Value::Object(Default::default())
            }
        };
        Self::from_value(path, value, options)
    }

    /// Build a document around an already-parsed value (untitled documents,
    /// tests).
    pub fn from_value(path: impl Into<PathBuf>, value: Value, options: DocumentOptions) -> Self {
        Self {
            path: path.into(),
            value,
            fresh_edits: Vec::new(),
            saved_edits: Vec::new(),
            options,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn edits(&self) -> &[Edit] {
        &self.fresh_edits
    }

    pub fn is_dirty(&self) -> bool {
        self.fresh_edits != self.saved_edits
    }

    /// Append an edit reported by the live UI.
    pub fn record(&mut self, edit: Edit) {
        self.fresh_edits.push(edit);
    }

    /// Pop the latest edit and hand it back; the host keeps it on its redo
    /// stack.
    pub fn undo(&mut self) -> Option<Edit> {
        self.fresh_edits.pop()
    }

    /// Re-append a previously undone edit.
    pub fn redo(&mut self, edit: Edit) {
        self.fresh_edits.push(edit);
    }

    /// Reconstruct the current tree: a fresh encoding of the base value with
    /// the fresh edit log replayed over it.
    pub fn current_tree(&self) -> Result<Tree> {
        replay(&self.value, &self.fresh_edits, &self.options.replay)
    }

    /// Persist the current state to the document's own path and capture the
    /// saved-edits snapshot.
    pub fn save(&mut self, cancel: &CancelToken) -> Result<()> {
        let path = self.path.clone();
        self.save_as(&path, cancel)?;
        self.saved_edits = self.fresh_edits.clone();
        Ok(())
    }

    /// Persist the current state to an arbitrary path. The state round-trips
    /// through the snapshot codec, so the empty-result guard blocks a save
    /// that would write an empty collection over real content.
    pub fn save_as(&self, path: &Path, cancel: &CancelToken) -> Result<()> {
        let tree = self.current_tree()?;
        let snap = snapshot::render(&tree);
        let value = snapshot::decode_snapshot(snap.container, &snap.markup, self.options.mode)?;

        if cancel.is_cancelled() {
            return Err(VjsonError::Cancelled);
        }
        write_value(path, &value, self.options.prettiness)
    }

    /// Save a backup copy; the host tracks and deletes it.
    pub fn backup(&self, destination: &Path, cancel: &CancelToken) -> Result<()> {
        self.save_as(destination, cancel)
    }

    /// Reload the on-disk value and reset the edit log to the state of the
    /// last save.
    ///
    /// A file that no longer reads, parses, or roots in a collection is
    /// rejected before anything commits: the document keeps its prior valid
    /// state instead of taking on a value that every later
    /// [`Document::current_tree`] would choke on.
    pub fn revert(&mut self, cancel: &CancelToken) -> Result<()> {
        let text = fs::read_to_string(&self.path)?;
        let value: Value = serde_json::from_str(&text)?;
        if !value.is_object() && !value.is_array() {
            return Err(VjsonError::RootNotCollection);
        }
        if cancel.is_cancelled() {
            return Err(VjsonError::Cancelled);
        }
        self.value = value;
        self.fresh_edits = self.saved_edits.clone();
        Ok(())
    }
}

/// Serialize with the lossless numeric formatter at the given indent width.
/// Numbers are emitted as their exact decimal text, so nothing the source
/// file carried is rounded away.
pub fn to_json_bytes(value: &Value, prettiness: usize) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    if prettiness == 0 {
        serde_json::to_writer(&mut buf, value)?;
    } else {
        let indent = vec![b' '; prettiness];
        let formatter = PrettyFormatter::with_indent(&indent);
        let mut ser = Serializer::with_formatter(&mut buf, formatter);
        value.serialize(&mut ser)?;
    }
    buf.push(b'\n');
    Ok(buf)
}

/// Write a value atomically: the content lands in a sibling temp file that is
/// renamed over the target, so a failed write never truncates the document.
pub fn write_value(path: &Path, value: &Value, prettiness: usize) -> Result<()> {
    let bytes = to_json_bytes(value, prettiness)?;
    let tmp = path.with_extension("vjson.tmp");
    fs::write(&tmp, &bytes)?;
    fs::rename(&tmp, path)?;
    Ok(())
}
