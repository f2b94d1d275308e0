pub mod decode;
pub mod encode;
pub mod node;
pub mod path;

pub use decode::decode;
pub use encode::{encode, encode_child, EncodeOptions};
pub use node::Node;
pub use path::{path_of, resolve, Resolution};

use crate::error::{Result, VjsonError};
use crate::types::TypeTag;

/// Editable tree that stores nodes in a Vec for efficient access.
///
/// The tree is the single source of truth for document state; any rendered
/// view is a projection of it. Node IDs are indices into the vector and stay
/// valid for the life of the tree. Detaching a node only unlinks it from its
/// parent; the slot is not reused.
#[derive(Debug)]
pub struct Tree {
    nodes: Vec<Node>,
    root_id: usize,
}

impl Tree {
    /// Create a new tree with a root node. The root of a document is always a
    /// collection (object or array) and its type is fixed for the document's
    /// lifetime.
    pub fn new(root: Node) -> Self {
        debug_assert!(root.tag.is_collection());
        Self {
            nodes: vec![root],
            root_id: 0,
        }
    }

    /// Add a node to the tree and return its ID
    pub fn add_node(&mut self, node: Node) -> usize {
        let id = self.nodes.len();
        self.nodes.push(node);
        id
    }

    /// Add a node as a child of a parent node, setting the parent_id on the
    /// child and appending it to the parent's children list.
    ///
    /// The caller is responsible for sibling-name uniqueness; edits that take
    /// names from outside (add, rename) must check with
    /// [`Tree::child_by_name`] first.
    pub fn add_child_node(&mut self, parent_id: usize, mut node: Node) -> usize {
        node.parent_id = Some(parent_id);
        let node_id = self.add_node(node);
        if let Some(parent) = self.get_node_mut(parent_id) {
            parent.children.push(node_id);
        }
        node_id
    }

    /// Get a reference to a node by ID
    pub fn get_node(&self, id: usize) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// Get a mutable reference to a node by ID
    pub fn get_node_mut(&mut self, id: usize) -> Option<&mut Node> {
        self.nodes.get_mut(id)
    }

    /// Get the root node ID
    pub fn root_id(&self) -> usize {
        self.root_id
    }

    /// Get the children IDs of a node
    pub fn get_children(&self, id: usize) -> Vec<usize> {
        self.get_node(id)
            .map(|node| node.children.clone())
            .unwrap_or_default()
    }

    /// Get the total number of nodes ever added to the tree, detached
    /// included
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Find the parent of a given node by ID.
    /// Returns None if the node is the root. O(1) via the parent_id field.
    pub fn get_parent(&self, child_id: usize) -> Option<usize> {
        self.get_node(child_id).and_then(|node| node.parent_id)
    }

    /// Find the child of `parent_id` carrying `name`. Sibling uniqueness
    /// guarantees at most one match; the first match is returned regardless.
    pub fn child_by_name(&self, parent_id: usize, name: &str) -> Option<usize> {
        self.get_node(parent_id)?
            .children
            .iter()
            .copied()
            .find(|&id| self.nodes[id].name == name)
    }

    /// Unlink a node from its parent. Array parents are renumbered so child
    /// names stay contiguous from 0. The node's arena slot is not reclaimed.
    pub fn detach(&mut self, id: usize) -> Result<()> {
        let parent_id = self
            .get_parent(id)
            .ok_or(VjsonError::InvalidNodeId(id))?;
        let parent = self
            .get_node_mut(parent_id)
            .ok_or(VjsonError::InvalidNodeId(parent_id))?;
        parent.children.retain(|&child| child != id);
        if let Some(node) = self.get_node_mut(id) {
            node.parent_id = None;
        }
        self.renumber_children(parent_id);
        Ok(())
    }

    /// Rename a node, re-validating sibling uniqueness first. On collision
    /// the tree is left unchanged and the edit must be rejected. Children of
    /// an array carry their index as their name and cannot be renamed at all.
    pub fn rename(&mut self, id: usize, new_name: &str) -> Result<()> {
        if let Some(parent_id) = self.get_parent(id) {
            if self.get_node(parent_id).is_some_and(|p| p.tag == TypeTag::Array) {
                let name = self
                    .get_node(id)
                    .map(|n| n.name.clone())
                    .unwrap_or_else(|| new_name.to_string());
                return Err(VjsonError::RenameInArray { name });
            }
            if let Some(existing) = self.child_by_name(parent_id, new_name) {
                if existing != id {
                    return Err(VjsonError::DuplicateName {
                        name: new_name.to_string(),
                    });
                }
            }
        }
        let node = self.get_node_mut(id).ok_or(VjsonError::InvalidNodeId(id))?;
        node.name = new_name.to_string();
        Ok(())
    }

    /// Swap a node with its previous (`up`) or next (`down`) sibling. A move
    /// past either end is a no-op; returns whether anything changed. Array
    /// parents are renumbered afterwards.
    pub fn move_child(&mut self, id: usize, towards_end: bool) -> Result<bool> {
        let parent_id = self
            .get_parent(id)
            .ok_or(VjsonError::InvalidNodeId(id))?;
        let parent = self
            .get_node_mut(parent_id)
            .ok_or(VjsonError::InvalidNodeId(parent_id))?;
        let pos = parent
            .children
            .iter()
            .position(|&child| child == id)
            .ok_or(VjsonError::InvalidNodeId(id))?;

        let target = if towards_end {
            if pos + 1 >= parent.children.len() {
                return Ok(false);
            }
            pos + 1
        } else {
            if pos == 0 {
                return Ok(false);
            }
            pos - 1
        };

        parent.children.swap(pos, target);
        self.renumber_children(parent_id);
        Ok(true)
    }

    /// If `parent_id` is an array node, rewrite every child's name to its
    /// position so indices stay contiguous from 0. Objects are untouched.
    pub fn renumber_children(&mut self, parent_id: usize) {
        let Some(parent) = self.get_node(parent_id) else {
            return;
        };
        if parent.tag != TypeTag::Array {
            return;
        }
        let children = parent.children.clone();
        for (index, child_id) in children.into_iter().enumerate() {
            if let Some(child) = self.get_node_mut(child_id) {
                child.name = index.to_string();
            }
        }
    }

    /// Drop all children of a node (used when a type coercion discards
    /// content that doesn't survive).
    pub fn clear_children(&mut self, id: usize) {
        let children = self.get_children(id);
        for child_id in children {
            if let Some(child) = self.get_node_mut(child_id) {
                child.parent_id = None;
            }
        }
        if let Some(node) = self.get_node_mut(id) {
            node.children.clear();
        }
    }
}
