//! Serialized tree snapshots.
//!
//! The host's tree-snapshot request answers with `{containerType,
//! serializedTree}` where the serialized form is HTML-ish markup, one
//! `<details>` element per item. This module renders a [`Tree`] to that
//! markup and parses it back. The type tag travels in a dedicated
//! `data-type` attribute so general-purpose class lists can never make
//! tagging ambiguous; scanning the class list survives only as a lenient
//! fallback for snapshots produced before the dedicated attribute existed.

use std::str::FromStr;

use ego_tree::NodeRef;
use scraper::{node::Node as HtmlNode, ElementRef, Html};
use serde_json::Value;
use tracing::warn;

use crate::edit::ContainerKind;
use crate::error::{Result, VjsonError};
use crate::tree::{decode, Node, Tree};
use crate::types::TypeTag;

/// How the parser reacts to corrupted type tagging and duplicate names.
/// Lenient recovers with a warning where the original data is still usable;
/// strict aborts the decode instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DecodeMode {
    #[default]
    Lenient,
    Strict,
}

/// A rendered tree: the container's kind plus the markup of its children.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub container: ContainerKind,
    pub markup: String,
}

/// Render a tree into snapshot markup. Names and string content are escaped
/// so the markup renders the literal character sequence rather than being
/// interpreted as further elements.
pub fn render(tree: &Tree) -> Snapshot {
    let root = tree.root_id();
    let container = match tree.get_node(root).map(|n| n.tag) {
        Some(TypeTag::Array) => ContainerKind::Array,
        _ => ContainerKind::Object,
    };

    let mut markup = String::new();
    for child in tree.get_children(root) {
        render_item(tree, child, &mut markup);
    }
    Snapshot { container, markup }
}

fn render_item(tree: &Tree, id: usize, out: &mut String) {
    let Some(node) = tree.get_node(id) else {
        return;
    };

    out.push_str(&format!(
        "<details class=\"item\" data-type=\"{}\" open><summary class=\"key\"><span class=\"name\">{}</span></summary><div class=\"value\">",
        node.tag,
        escape_html(&node.name)
    ));

    match node.tag.base() {
        TypeTag::Object | TypeTag::Array => {
            for child in tree.get_children(id) {
                render_item(tree, child, out);
            }
        }
        TypeTag::Null => out.push_str("(null)"),
        _ => out.push_str(&escape_html(&node.text)),
    }

    out.push_str("</div></details>");
}

/// Parse snapshot markup back into a tree.
///
/// The output container shape comes from the declared `containerType`, never
/// by inference from children. Items missing a recognizable type tag, or
/// (via the class fallback) carrying more than one, are a corruption signal:
/// strict mode aborts, lenient mode warns and takes the first tag found.
pub fn parse(container: ContainerKind, markup: &str, mode: DecodeMode) -> Result<Tree> {
    let fragment = Html::parse_fragment(markup);
    let mut tree = Tree::new(Node::collection("root", container.tag()));
    let root_id = tree.root_id();

    for child in fragment.root_element().children() {
        parse_item(&mut tree, root_id, child, mode)?;
    }
    Ok(tree)
}

/// Parse plus decode plus the data-loss guard: non-blank markup that bottoms
/// out in zero entries must be rejected rather than silently producing an
/// empty collection over real content.
pub fn decode_snapshot(container: ContainerKind, markup: &str, mode: DecodeMode) -> Result<Value> {
    let tree = parse(container, markup, mode)?;
    if !markup.trim().is_empty() && tree.get_children(tree.root_id()).is_empty() {
        return Err(VjsonError::EmptyDecode {
            container: container.as_str(),
        });
    }
    decode(&tree)
}

fn parse_item(
    tree: &mut Tree,
    parent_id: usize,
    html_node: NodeRef<HtmlNode>,
    mode: DecodeMode,
) -> Result<()> {
    let Some(element) = ElementRef::wrap(html_node) else {
        return Ok(()); // whitespace, comments
    };
    if element.value().name() != "details" {
        return Ok(());
    }

    let name = item_name(element)?;
    let tag = item_tag(element, &name, mode)?;

    if tree.child_by_name(parent_id, &name).is_some() {
        match mode {
            DecodeMode::Strict => return Err(VjsonError::DuplicateName { name }),
            // Last sibling wins on decode, as the original readback did
            DecodeMode::Lenient => warn!(name = %name, "snapshot contains duplicate sibling names"),
        }
    }

    let value_el = child_element_with_class(element, "div", "value").ok_or_else(|| {
        VjsonError::SnapshotParse(format!("item '{}' has no value element", name))
    })?;

    match tag.base() {
        TypeTag::Object | TypeTag::Array => {
            let node_id = tree.add_child_node(parent_id, Node::collection(&name, tag));
            for grandchild in value_el.children() {
                parse_item(tree, node_id, grandchild, mode)?;
            }
        }
        TypeTag::Null => {
            tree.add_child_node(parent_id, Node::null(&name));
        }
        _ => {
            let text: String = value_el.text().collect();
            tree.add_child_node(parent_id, Node::scalar(&name, tag, text));
        }
    }
    Ok(())
}

fn item_name(element: ElementRef) -> Result<String> {
    let summary = child_element_with_class(element, "summary", "key")
        .ok_or_else(|| VjsonError::SnapshotParse("item without a key element".into()))?;
    let name_span = child_element_with_class(summary, "span", "name")
        .ok_or_else(|| VjsonError::SnapshotParse("item without a name".into()))?;
    Ok(name_span.text().collect())
}

/// Resolve an item's type tag: the dedicated attribute when present,
/// otherwise a scan over the class list for old snapshots.
fn item_tag(element: ElementRef, name: &str, mode: DecodeMode) -> Result<TypeTag> {
    if let Some(declared) = element.value().attr("data-type") {
        return TypeTag::from_str(declared).map_err(|_| VjsonError::SnapshotParse(format!(
            "item '{}' declares unknown type '{}'",
            name, declared
        )));
    }

    let found: Vec<TypeTag> = element
        .value()
        .classes()
        .filter_map(|class| TypeTag::from_str(class).ok())
        .collect();

    match found.len() {
        0 => Err(VjsonError::MissingTypeTag {
            name: name.to_string(),
        }),
        1 => Ok(found[0]),
        count => match mode {
            DecodeMode::Strict => Err(VjsonError::AmbiguousTypeTag {
                name: name.to_string(),
                count,
            }),
            DecodeMode::Lenient => {
                warn!(name, count, tag = %found[0], "item carries multiple type tags, taking the first");
                Ok(found[0])
            }
        },
    }
}

fn child_element_with_class<'a>(
    element: ElementRef<'a>,
    tag_name: &str,
    class: &str,
) -> Option<ElementRef<'a>> {
    element
        .children()
        .filter_map(ElementRef::wrap)
        .find(|child| {
            child.value().name() == tag_name && child.value().classes().any(|c| c == class)
        })
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}
