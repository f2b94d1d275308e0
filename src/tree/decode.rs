use serde_json::{Map, Number, Value};

use super::Tree;
use crate::error::{Result, VjsonError};
use crate::types::TypeTag;

/// Read a tree back into a JSON value; the inverse of [`super::encode`].
///
/// The output container shape comes from the root's declared tag, never by
/// inference from children (an empty collection has none to infer from).
/// Every node contributes through its base type: subtypes collapse to plain
/// strings, numbers re-parse through the lossless decimal representation and
/// fail the whole decode when the text isn't a valid JSON number literal,
/// booleans accept exactly `true`/`false`, and null ignores any displayed
/// content.
pub fn decode(tree: &Tree) -> Result<Value> {
    decode_node(tree, tree.root_id())
}

fn decode_node(tree: &Tree, id: usize) -> Result<Value> {
    let node = tree.get_node(id).ok_or(VjsonError::InvalidNodeId(id))?;

    match node.tag.base() {
        TypeTag::String => Ok(Value::String(node.text.clone())),
        TypeTag::Number => {
            let number: Number =
                serde_json::from_str(&node.text).map_err(|_| VjsonError::InvalidNumber {
                    name: node.name.clone(),
                    text: node.text.clone(),
                })?;
            Ok(Value::Number(number))
        }
        TypeTag::Boolean => match node.text.as_str() {
            "true" => Ok(Value::Bool(true)),
            "false" => Ok(Value::Bool(false)),
            other => Err(VjsonError::InvalidBoolean {
                name: node.name.clone(),
                text: other.to_string(),
            }),
        },
        TypeTag::Null => Ok(Value::Null),
        TypeTag::Object => {
            let mut map = Map::new();
            for child_id in tree.get_children(id) {
                let child = tree.get_node(child_id).ok_or(VjsonError::InvalidNodeId(child_id))?;
                map.insert(child.name.clone(), decode_node(tree, child_id)?);
            }
            Ok(Value::Object(map))
        }
        TypeTag::Array => {
            let mut items = Vec::new();
            for child_id in tree.get_children(id) {
                items.push(decode_node(tree, child_id)?);
            }
            Ok(Value::Array(items))
        }
        // base() never returns a subtype
        TypeTag::Color | TypeTag::Datetime => unreachable!(),
    }
}
