use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Result, VjsonError};
use crate::types::TypeTag;

/// Atomic mutation kinds. Serialized lowercase; this spelling is the wire
/// format of persisted edit logs and must stay compatible across the
/// document's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EditKind {
    Contents,
    Add,
    Delete,
    Rename,
    Move,
    Type,
}

/// Whether a collection is an object or an array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContainerKind {
    Object,
    Array,
}

impl ContainerKind {
    pub fn tag(self) -> TypeTag {
        match self {
            ContainerKind::Object => TypeTag::Object,
            ContainerKind::Array => TypeTag::Array,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ContainerKind::Object => "object",
            ContainerKind::Array => "array",
        }
    }
}

/// Direction token for the `move` edit. Direction is canonical; older
/// path-based swap payloads are treated as corrupted records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
}

/// The change payload for an `add` edit. Parent and name information already
/// live in the edit's path; these are the remaining inputs for encoding the
/// new child.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Addition {
    pub item_type: TypeTag,
    pub value: Value,
    pub parent_type: ContainerKind,
}

/// One path-addressed mutation record.
///
/// `change` is kind-dependent and kept as raw JSON so the record stays
/// readable even when a payload is malformed; the typed accessors interpret
/// it when the edit is applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edit {
    pub path: Vec<String>,
    pub kind: EditKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub change: Option<Value>,
}

impl Edit {
    pub fn contents(path: Vec<String>, new_text: impl Into<String>) -> Self {
        Self {
            path,
            kind: EditKind::Contents,
            change: Some(Value::String(new_text.into())),
        }
    }

    pub fn add(path: Vec<String>, addition: &Addition) -> Self {
        Self {
            path,
            kind: EditKind::Add,
            // Addition serialization cannot fail: it is three plain fields
            change: serde_json::to_value(addition).ok(),
        }
    }

    pub fn delete(path: Vec<String>) -> Self {
        Self {
            path,
            kind: EditKind::Delete,
            change: None,
        }
    }

    pub fn rename(path: Vec<String>, new_name: impl Into<String>) -> Self {
        Self {
            path,
            kind: EditKind::Rename,
            change: Some(Value::String(new_name.into())),
        }
    }

    pub fn movement(path: Vec<String>, direction: Direction) -> Self {
        Self {
            path,
            kind: EditKind::Move,
            change: serde_json::to_value(direction).ok(),
        }
    }

    pub fn retype(path: Vec<String>, new_type: TypeTag) -> Self {
        Self {
            path,
            kind: EditKind::Type,
            change: serde_json::to_value(new_type).ok(),
        }
    }

    /// New literal text for `contents` and `rename` edits.
    pub fn change_text(&self) -> Result<&str> {
        match &self.change {
            Some(Value::String(s)) => Ok(s),
            other => Err(VjsonError::MalformedEdit(format!(
                "{:?} edit expects a string change, got {:?}",
                self.kind, other
            ))),
        }
    }

    pub fn addition(&self) -> Result<Addition> {
        let change = self.change.clone().ok_or_else(|| {
            VjsonError::MalformedEdit("add edit is missing its change payload".into())
        })?;
        serde_json::from_value(change)
            .map_err(|e| VjsonError::MalformedEdit(format!("bad add payload: {}", e)))
    }

    pub fn direction(&self) -> Result<Direction> {
        let change = self.change.clone().ok_or_else(|| {
            VjsonError::MalformedEdit("move edit is missing its direction".into())
        })?;
        serde_json::from_value(change)
            .map_err(|e| VjsonError::MalformedEdit(format!("bad move payload: {}", e)))
    }

    pub fn new_type(&self) -> Result<TypeTag> {
        let change = self.change.clone().ok_or_else(|| {
            VjsonError::MalformedEdit("type edit is missing its target type".into())
        })?;
        serde_json::from_value(change)
            .map_err(|e| VjsonError::MalformedEdit(format!("bad type payload: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_wire_format_shape() {
        let edit = Edit::movement(vec!["items".into(), "1".into()], Direction::Down);
        let wire = serde_json::to_value(&edit).unwrap();
        assert_eq!(wire, json!({"path": ["items", "1"], "kind": "move", "change": "down"}));

        let parsed: Edit = serde_json::from_value(wire).unwrap();
        assert_eq!(parsed.kind, EditKind::Move);
        assert_eq!(parsed.direction().unwrap(), Direction::Down);
    }

    #[test]
    fn test_delete_omits_change() {
        let wire = serde_json::to_string(&Edit::delete(vec!["a".into()])).unwrap();
        assert!(!wire.contains("change"));
        let parsed: Edit = serde_json::from_str(r#"{"path": ["a"], "kind": "delete"}"#).unwrap();
        assert_eq!(parsed.kind, EditKind::Delete);
        assert!(parsed.change.is_none());
    }

    #[test]
    fn test_addition_round_trip() {
        let addition = Addition {
            item_type: TypeTag::String,
            value: json!("I'm new!"),
            parent_type: ContainerKind::Array,
        };
        let edit = Edit::add(vec!["items".into(), "2".into()], &addition);
        let wire = serde_json::to_value(&edit).unwrap();
        assert_eq!(wire["change"]["itemType"], json!("string"));
        assert_eq!(wire["change"]["parentType"], json!("array"));

        let back = edit.addition().unwrap();
        assert_eq!(back.item_type, TypeTag::String);
        assert_eq!(back.value, json!("I'm new!"));
        assert_eq!(back.parent_type, ContainerKind::Array);
    }

    #[test]
    fn test_path_based_move_payload_is_malformed() {
        let parsed: Edit = serde_json::from_str(
            r#"{"path": ["a"], "kind": "move", "change": ["b", "c"]}"#,
        )
        .unwrap();
        assert!(parsed.direction().is_err());
    }

    #[test]
    fn test_change_text_rejects_non_strings() {
        let parsed: Edit =
            serde_json::from_str(r#"{"path": ["a"], "kind": "contents", "change": 5}"#).unwrap();
        assert!(matches!(parsed.change_text(), Err(VjsonError::MalformedEdit(_))));
    }
}
