//! Size tree data model.
//!
//! A payload carries a list of [`RootNode`]s, each one a named bundle (or
//! category) holding a [`Node`] tree of byte sizes. Nodes are plain owned
//! values: cloning a tree yields a structure that shares nothing with its
//! source, which is what the viewer relies on when it mutates labels and
//! element handles during rendering.

use serde::{Deserialize, Deserializer, Serialize};

use crate::dom::ElementId;

/// A top-level bundle shown as one entry of the selector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RootNode {
    pub id: String,
    #[serde(default)]
    pub group: String,
    pub node: Node,
}

/// One entry of the size tree.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    /// Display label. Rewritten on every relabel pass.
    #[serde(default)]
    pub id: String,
    /// Bytes attributed to this node and its subtree.
    #[serde(default)]
    pub size: f64,
    /// Estimated unused bytes within `size`.
    #[serde(default)]
    pub wasted_bytes: f64,
    #[serde(
        default,
        deserialize_with = "nullable_children",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub children: Vec<Node>,
    /// The label as it arrived, before any display formatting.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_id: Option<String>,
    /// Palette key shared by every node of a root.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_hash: Option<u32>,
    /// Element the layout rendered for this node, if it was visible.
    #[serde(skip)]
    pub dom: Option<ElementId>,
}

fn nullable_children<'de, D>(deserializer: D) -> Result<Vec<Node>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<Node>>::deserialize(deserializer)?.unwrap_or_default())
}

impl Node {
    pub fn new(id: impl Into<String>, size: f64, wasted_bytes: f64) -> Self {
        Self {
            id: id.into(),
            size,
            wasted_bytes,
            ..Self::default()
        }
    }

    pub fn with_children(mut self, children: Vec<Node>) -> Self {
        self.children = children;
        self
    }

    /// The label this node had before relabeling.
    pub fn label_source(&self) -> &str {
        self.original_id.as_deref().unwrap_or(&self.id)
    }

    /// Share of `size` that is wasted, in `[0, 1]` for well-formed data.
    /// A zero-size node counts as fully used.
    pub fn waste_ratio(&self) -> f64 {
        if self.size > 0.0 {
            self.wasted_bytes / self.size
        } else {
            0.0
        }
    }
}

/// Pre-order traversal: `f` sees a parent before any of its descendants.
pub fn dfs<'a, F>(node: &'a Node, f: &mut F)
where
    F: FnMut(&'a Node),
{
    f(node);
    for child in &node.children {
        dfs(child, f);
    }
}

pub fn dfs_mut<F>(node: &mut Node, f: &mut F)
where
    F: FnMut(&mut Node),
{
    f(node);
    for child in &mut node.children {
        dfs_mut(child, f);
    }
}

/// Sum of the UTF-16 code units of `id`.
///
/// Only used to spread roots over the palette; unrelated ids can collide.
pub fn id_hash(id: &str) -> u32 {
    id.encode_utf16()
        .fold(0u32, |acc, unit| acc.wrapping_add(u32::from(unit)))
}

/// One-time bookkeeping applied to every root when a viewer is built.
///
/// Copies labels into `original_id` and stamps the root's hash on every
/// node. An unnamed top-level node takes the root's id as its label.
pub fn annotate(root: &mut RootNode) {
    if root.node.id.is_empty() {
        root.node.id = root.id.clone();
    }
    let hash = id_hash(&root.id);
    dfs_mut(&mut root.node, &mut |node| {
        node.original_id = Some(node.id.clone());
        node.id_hash = Some(hash);
    });
}
