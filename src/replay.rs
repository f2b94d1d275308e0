use serde_json::Value;
use tracing::{debug, warn};

use crate::edit::{Direction, Edit, EditKind};
use crate::error::{Result, VjsonError};
use crate::tree::{encode, encode_child, resolve, EncodeOptions, Tree};
use crate::types::TypeTag;

/// Context for a replay pass, threaded explicitly through every call rather
/// than held in any process-wide state. A host that must suppress edit
/// recording during replay does so on its side; the replayer itself is
/// re-entrant over independent trees.
#[derive(Debug, Clone, Default)]
pub struct ReplayOptions {
    pub encode: EncodeOptions,
}

/// Reconstruct a tree by applying an edit log, in strict append order, to a
/// fresh encoding of `base`.
///
/// Later edits may depend on paths created or renamed by earlier ones, so
/// entries are never reordered or batched. An entry that fails to apply
/// (unresolvable path, rename collision, bad coercion, malformed payload) is
/// skipped with a diagnostic; one corrupted record must not block
/// reconstructing the rest of the document. Replaying the same log against
/// independent fresh copies of the same base yields identical trees.
pub fn replay(base: &Value, edits: &[Edit], opts: &ReplayOptions) -> Result<Tree> {
    let mut tree = encode(base, &opts.encode)?;
    for (index, edit) in edits.iter().enumerate() {
        if let Err(err) = apply_edit(&mut tree, edit, opts) {
            warn!(
                index,
                kind = ?edit.kind,
                path = %edit.path.join("/"),
                %err,
                "skipping edit that failed to apply"
            );
        }
    }
    Ok(tree)
}

/// Apply a single edit to a live tree.
///
/// Unlike [`replay`], failures here are returned to the caller: when the host
/// applies a user action directly it needs the typed rejection (collision,
/// invalid number, unsupported conversion) to roll back the in-progress
/// change and warn the user.
pub fn apply_edit(tree: &mut Tree, edit: &Edit, opts: &ReplayOptions) -> Result<()> {
    match edit.kind {
        EditKind::Contents => {
            let id = resolve_exact(tree, &edit.path)?;
            apply_contents(tree, id, edit.change_text()?)
        }
        EditKind::Add => apply_add(tree, edit, opts),
        EditKind::Delete => {
            let id = resolve_exact(tree, &edit.path)?;
            tree.detach(id)
        }
        EditKind::Rename => {
            let id = resolve_exact(tree, &edit.path)?;
            tree.rename(id, edit.change_text()?)
        }
        EditKind::Move => {
            let id = resolve_exact(tree, &edit.path)?;
            let towards_end = edit.direction()? == Direction::Down;
            tree.move_child(id, towards_end)?;
            Ok(())
        }
        EditKind::Type => {
            let id = resolve_exact(tree, &edit.path)?;
            apply_retype(tree, id, edit.new_type()?)
        }
    }
}

fn resolve_exact(tree: &Tree, path: &[String]) -> Result<usize> {
    let res = resolve(tree, path);
    if res.is_exact(path) {
        Ok(res.id)
    } else {
        Err(VjsonError::PathUnresolved(path.join("/")))
    }
}

/// Overwrite a leaf's stored content. Numbers and booleans are re-validated
/// before the tree changes so the value keeps its prior valid state on a bad
/// entry.
fn apply_contents(tree: &mut Tree, id: usize, new_text: &str) -> Result<()> {
    let node = tree.get_node(id).ok_or(VjsonError::InvalidNodeId(id))?;
    if node.tag.is_collection() {
        return Err(VjsonError::MalformedEdit(format!(
            "contents edit targets the {} '{}'",
            node.tag, node.name
        )));
    }
    match node.tag.base() {
        TypeTag::Number => {
            if serde_json::from_str::<serde_json::Number>(new_text).is_err() {
                return Err(VjsonError::InvalidNumber {
                    name: node.name.clone(),
                    text: new_text.to_string(),
                });
            }
        }
        TypeTag::Boolean => {
            if new_text != "true" && new_text != "false" {
                return Err(VjsonError::InvalidBoolean {
                    name: node.name.clone(),
                    text: new_text.to_string(),
                });
            }
        }
        _ => {}
    }
    // Checked above; the borrow was released by the validation block
    if let Some(node) = tree.get_node_mut(id) {
        node.text = new_text.to_string();
    }
    Ok(())
}

/// The last path segment is the new child's name; the prefix addresses the
/// parent collection. The child is encoded from the payload's value and
/// appended as the last sibling.
fn apply_add(tree: &mut Tree, edit: &Edit, opts: &ReplayOptions) -> Result<()> {
    let Some((name, parent_path)) = edit.path.split_last() else {
        return Err(VjsonError::MalformedEdit(
            "add edit has an empty path".into(),
        ));
    };
    let parent_id = resolve_exact(tree, parent_path)?;
    let addition = edit.addition()?;

    let parent = tree
        .get_node(parent_id)
        .ok_or(VjsonError::InvalidNodeId(parent_id))?;
    if !parent.tag.is_collection() {
        return Err(VjsonError::MalformedEdit(format!(
            "add edit targets the non-collection '{}'",
            parent.name
        )));
    }
    if parent.tag != addition.parent_type.tag() {
        debug!(
            parent = %parent.name,
            recorded = addition.parent_type.as_str(),
            actual = %parent.tag,
            "add payload disagrees about the parent's container kind"
        );
    }
    if tree.child_by_name(parent_id, name).is_some() {
        return Err(VjsonError::DuplicateName { name: name.clone() });
    }

    encode_child(
        tree,
        parent_id,
        name,
        &addition.value,
        Some(addition.item_type),
        &opts.encode,
    );
    tree.renumber_children(parent_id);
    Ok(())
}

/// Re-encode a node in place with its content coerced into `new_tag`.
///
/// Gated by the conversion matrix; content that doesn't survive the coercion
/// is discarded (object members when converting to string, displayed text
/// when clearing to null). Empty text coerces to an empty collection when the
/// target is object/array; non-empty scalars don't. Array and object never
/// reinterpret as each other.
fn apply_retype(tree: &mut Tree, id: usize, new_tag: TypeTag) -> Result<()> {
    let node = tree.get_node(id).ok_or(VjsonError::InvalidNodeId(id))?;
    let current = node.tag;
    if current == new_tag {
        return Ok(());
    }
    if !current.can_convert(new_tag) {
        return Err(VjsonError::UnsupportedConversion {
            from: current.as_str(),
            to: new_tag.as_str(),
        });
    }

    let text = node.text.clone();
    let new_text = match new_tag {
        TypeTag::Null => String::new(),
        TypeTag::Object | TypeTag::Array => {
            if !text.trim().is_empty() {
                return Err(VjsonError::UnsupportedConversion {
                    from: current.as_str(),
                    to: new_tag.as_str(),
                });
            }
            String::new()
        }
        TypeTag::String | TypeTag::Color | TypeTag::Datetime => {
            if current.is_collection() {
                String::new() // members discarded
            } else {
                text
            }
        }
        TypeTag::Number => {
            let candidate = if text.trim().is_empty() {
                "0".to_string()
            } else {
                text
            };
            if serde_json::from_str::<serde_json::Number>(&candidate).is_err() {
                return Err(VjsonError::InvalidNumber {
                    name: node.name.clone(),
                    text: candidate,
                });
            }
            candidate
        }
        TypeTag::Boolean => {
            if text.is_empty() {
                "false".to_string()
            } else if text == "true" || text == "false" {
                text
            } else {
                return Err(VjsonError::InvalidBoolean {
                    name: node.name.clone(),
                    text,
                });
            }
        }
    };

    if current.is_collection() || new_tag == TypeTag::Null {
        tree.clear_children(id);
    }
    if let Some(node) = tree.get_node_mut(id) {
        node.tag = new_tag;
        node.text = new_text;
    }
    Ok(())
}
