use crate::types::TypeTag;

/// Represents one addressable item of the editable tree.
///
/// Each node has:
/// - A name (object key, or stringified index under an array parent)
/// - A [`TypeTag`] set at construction, never inferred afterwards
/// - Scalar text content (exact literal for numbers and booleans, raw
///   character data for strings; empty for null and collections)
/// - References to child nodes (by ID)
/// - Reference to its parent node (by ID)
///
/// Names are unique among immediate siblings: paths are built from name
/// sequences and must resolve unambiguously. Children of an array node are
/// named `"0"`, `"1"`, ... contiguous from zero; the tree renumbers them
/// whenever siblings are inserted, deleted or reordered.
///
/// # Examples
///
/// ```
/// use vjson::tree::Node;
/// use vjson::types::TypeTag;
///
/// let node = Node::scalar("price", TypeTag::Number, "19.99");
/// assert_eq!(node.name, "price");
/// assert_eq!(node.text, "19.99");
/// assert!(!node.tag.is_collection());
/// ```
#[derive(Debug, Clone)]
pub struct Node {
    /// Name of this node, unique among its siblings
    pub name: String,

    /// Semantic type, fixed at construction
    pub tag: TypeTag,

    /// Scalar content as literal text (empty for null and collections)
    pub text: String,

    /// Child node IDs (indices into the tree's node vector)
    pub children: Vec<usize>,

    /// Parent node ID (None for the root node)
    pub parent_id: Option<usize>,
}

impl Node {
    /// Creates a node carrying scalar text content.
    pub fn scalar(name: impl Into<String>, tag: TypeTag, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tag,
            text: text.into(),
            children: Vec::new(),
            parent_id: None,
        }
    }

    /// Creates an empty collection node (`TypeTag::Object` or
    /// `TypeTag::Array`); children are attached through the tree.
    pub fn collection(name: impl Into<String>, tag: TypeTag) -> Self {
        debug_assert!(tag.is_collection());
        Self {
            name: name.into(),
            tag,
            text: String::new(),
            children: Vec::new(),
            parent_id: None,
        }
    }

    /// Creates an explicit null node. Null is a node with empty content, not
    /// the absence of a node.
    pub fn null(name: impl Into<String>) -> Self {
        Self::scalar(name, TypeTag::Null, "")
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_node() {
        let node = Node::scalar("flag", TypeTag::Boolean, "true");
        assert_eq!(node.name, "flag");
        assert_eq!(node.tag, TypeTag::Boolean);
        assert_eq!(node.text, "true");
        assert!(!node.has_children());
        assert!(node.parent_id.is_none());
    }

    #[test]
    fn test_null_node_is_explicit() {
        let node = Node::null("missing");
        assert_eq!(node.tag, TypeTag::Null);
        assert_eq!(node.text, "");
    }
}
