use serde_json::Value;

use super::{Node, Tree};
use crate::error::{Result, VjsonError};
use crate::types::TypeTag;

/// Options threaded through an encoding pass.
#[derive(Debug, Clone)]
pub struct EncodeOptions {
    /// Run the subtype patterns (color, datetime) on plain strings
    pub detect_special_strings: bool,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            detect_special_strings: true,
        }
    }
}

/// Convert a JSON value into an editable tree.
///
/// A document is always rooted in a collection; scalar or null roots are
/// rejected. Object members are encoded in insertion order; array elements
/// are named by their stringified index, contiguous from 0. Numbers carry
/// their exact decimal literal so an untouched value survives a
/// load-edit-save round trip unchanged.
pub fn encode(value: &Value, opts: &EncodeOptions) -> Result<Tree> {
    let root_tag = match value {
        Value::Object(_) => TypeTag::Object,
        Value::Array(_) => TypeTag::Array,
        _ => return Err(VjsonError::RootNotCollection),
    };

    let mut tree = Tree::new(Node::collection("root", root_tag));
    let root_id = tree.root_id();
    encode_children(&mut tree, root_id, value, opts);
    Ok(tree)
}

/// Encode one value as a new child of `parent_id` and return its ID.
///
/// When `tag` is omitted the type detector runs first. An explicit tag is
/// honored as long as its base type matches the value's actual shape (the
/// `add` edit supplies one); otherwise detection wins.
pub fn encode_child(
    tree: &mut Tree,
    parent_id: usize,
    name: &str,
    value: &Value,
    tag: Option<TypeTag>,
    opts: &EncodeOptions,
) -> usize {
    let detected = TypeTag::detect(value, opts.detect_special_strings);
    let tag = tag
        .filter(|t| t.base() == detected.base())
        .unwrap_or(detected);

    let node_id = match value {
        Value::Object(_) => tree.add_child_node(parent_id, Node::collection(name, TypeTag::Object)),
        Value::Array(_) => tree.add_child_node(parent_id, Node::collection(name, TypeTag::Array)),
        Value::String(s) => tree.add_child_node(parent_id, Node::scalar(name, tag, s)),
        Value::Number(n) => {
            tree.add_child_node(parent_id, Node::scalar(name, TypeTag::Number, n.to_string()))
        }
        Value::Bool(b) => {
            tree.add_child_node(parent_id, Node::scalar(name, TypeTag::Boolean, b.to_string()))
        }
        Value::Null => tree.add_child_node(parent_id, Node::null(name)),
    };

    if value.is_object() || value.is_array() {
        encode_children(tree, node_id, value, opts);
    }
    node_id
}

fn encode_children(tree: &mut Tree, parent_id: usize, value: &Value, opts: &EncodeOptions) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                encode_child(tree, parent_id, key, child, None, opts);
            }
        }
        Value::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                encode_child(tree, parent_id, &index.to_string(), item, None, opts);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_encode_object_in_insertion_order() {
        let value = json!({"zeta": 1, "alpha": "two", "nested": {"ok": true}});
        let tree = encode(&value, &EncodeOptions::default()).unwrap();

        let names: Vec<_> = tree
            .get_children(tree.root_id())
            .into_iter()
            .map(|id| tree.get_node(id).unwrap().name.clone())
            .collect();
        assert_eq!(names, vec!["zeta", "alpha", "nested"]);

        let nested = tree.child_by_name(tree.root_id(), "nested").unwrap();
        assert_eq!(tree.get_node(nested).unwrap().tag, TypeTag::Object);
        let ok = tree.child_by_name(nested, "ok").unwrap();
        assert_eq!(tree.get_node(ok).unwrap().text, "true");
    }

    #[test]
    fn test_encode_array_names_are_indices() {
        let value = json!(["a", null, {"k": 1}]);
        let tree = encode(&value, &EncodeOptions::default()).unwrap();

        let children = tree.get_children(tree.root_id());
        assert_eq!(children.len(), 3);
        for (i, id) in children.iter().enumerate() {
            assert_eq!(tree.get_node(*id).unwrap().name, i.to_string());
        }
        assert_eq!(tree.get_node(children[1]).unwrap().tag, TypeTag::Null);
    }

    #[test]
    fn test_encode_detects_subtypes() {
        let value = json!({"tint": "#AA00FF", "when": "2024-01-01T00:00:00.000Z", "note": "hi"});
        let tree = encode(&value, &EncodeOptions::default()).unwrap();

        let tint = tree.child_by_name(0, "tint").unwrap();
        assert_eq!(tree.get_node(tint).unwrap().tag, TypeTag::Color);
        let when = tree.child_by_name(0, "when").unwrap();
        assert_eq!(tree.get_node(when).unwrap().tag, TypeTag::Datetime);
        let note = tree.child_by_name(0, "note").unwrap();
        assert_eq!(tree.get_node(note).unwrap().tag, TypeTag::String);
    }

    #[test]
    fn test_encode_keeps_number_literal() {
        let value: Value = serde_json::from_str(r#"[100000000000000000000.500]"#).unwrap();
        let tree = encode(&value, &EncodeOptions::default()).unwrap();
        let id = tree.get_children(0)[0];
        assert_eq!(tree.get_node(id).unwrap().text, "100000000000000000000.500");
    }

    #[test]
    fn test_scalar_root_rejected() {
        let err = encode(&json!(5), &EncodeOptions::default()).unwrap_err();
        assert!(matches!(err, VjsonError::RootNotCollection));
    }

    #[test]
    fn test_explicit_tag_must_match_value_shape() {
        let mut tree = Tree::new(Node::collection("root", TypeTag::Object));
        // A bogus tag falls back to detection instead of corrupting the node
        let id = encode_child(
            &mut tree,
            0,
            "n",
            &json!(7),
            Some(TypeTag::Object),
            &EncodeOptions::default(),
        );
        assert_eq!(tree.get_node(id).unwrap().tag, TypeTag::Number);
    }
}
