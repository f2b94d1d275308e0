use super::Tree;

/// Outcome of resolving a path against a tree.
///
/// `matched` counts how many leading path segments descended successfully;
/// the best-effort result of a failed descent is the deepest matched
/// ancestor, so callers must check [`Resolution::is_exact`] before treating
/// `id` as the addressed node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub id: usize,
    pub matched: usize,
}

impl Resolution {
    pub fn is_exact(&self, path: &[String]) -> bool {
        self.matched == path.len()
    }
}

/// Trace a node's lineage up to (not including) the tree root, producing the
/// name sequence in root-to-node order.
///
/// A path is only valid against the tree it was computed from, at the moment
/// it was computed: any structural edit to an ancestor invalidates it.
/// Callers recompute paths fresh rather than caching them across edits.
pub fn path_of(tree: &Tree, id: usize) -> Vec<String> {
    let mut path = Vec::new();
    let mut current = id;
    while let Some(node) = tree.get_node(current) {
        let Some(parent) = node.parent_id else {
            break; // reached the root, which is not part of the path
        };
        path.push(node.name.clone());
        current = parent;
    }
    path.reverse();
    path
}

/// Walk the tree from the root, matching one child name per segment.
///
/// Sibling-name uniqueness guarantees at most one match per step; the first
/// match is taken regardless, so a tree violating the invariant resolves
/// deterministically rather than by accident of ordering.
pub fn resolve(tree: &Tree, path: &[String]) -> Resolution {
    let mut id = tree.root_id();
    let mut matched = 0;
    for name in path {
        match tree.child_by_name(id, name) {
            Some(child) => {
                id = child;
                matched += 1;
            }
            None => break,
        }
    }
    Resolution { id, matched }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{encode, EncodeOptions};
    use serde_json::json;

    fn sample_tree() -> Tree {
        encode(
            &json!({"user": {"name": "Alice", "pets": ["cat", "dog"]}, "active": true}),
            &EncodeOptions::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_path_of_is_root_exclusive() {
        let tree = sample_tree();
        let user = tree.child_by_name(tree.root_id(), "user").unwrap();
        let pets = tree.child_by_name(user, "pets").unwrap();
        let dog = tree.child_by_name(pets, "1").unwrap();

        assert_eq!(path_of(&tree, dog), vec!["user", "pets", "1"]);
        assert_eq!(path_of(&tree, tree.root_id()), Vec::<String>::new());
    }

    #[test]
    fn test_resolve_inverts_path_of() {
        let tree = sample_tree();
        let user = tree.child_by_name(tree.root_id(), "user").unwrap();
        let pets = tree.child_by_name(user, "pets").unwrap();
        for id in [user, pets, tree.child_by_name(pets, "0").unwrap()] {
            let path = path_of(&tree, id);
            let res = resolve(&tree, &path);
            assert!(res.is_exact(&path));
            assert_eq!(res.id, id);
        }
    }

    #[test]
    fn test_short_match_is_detectable() {
        let tree = sample_tree();
        let path: Vec<String> = ["user", "pets", "9"].map(String::from).to_vec();
        let res = resolve(&tree, &path);
        assert!(!res.is_exact(&path));
        assert_eq!(res.matched, 2);
        // Deepest successfully matched ancestor
        let user = tree.child_by_name(tree.root_id(), "user").unwrap();
        assert_eq!(res.id, tree.child_by_name(user, "pets").unwrap());
    }

    #[test]
    fn test_structural_edit_invalidates_captured_path() {
        let mut tree = sample_tree();
        let user = tree.child_by_name(tree.root_id(), "user").unwrap();
        let pets = tree.child_by_name(user, "pets").unwrap();
        let dog = tree.child_by_name(pets, "1").unwrap();
        let stale = path_of(&tree, dog);

        // Deleting the earlier sibling renumbers the array: "1" now means dog's
        // old position but a different element once recomputed.
        let cat = tree.child_by_name(pets, "0").unwrap();
        tree.detach(cat).unwrap();

        let res = resolve(&tree, &stale);
        assert!(!res.is_exact(&stale) || res.id != dog || path_of(&tree, dog) != stale);
        // The fresh path is the one that resolves
        let fresh = path_of(&tree, dog);
        assert_eq!(resolve(&tree, &fresh).id, dog);
    }
}
