use tracing::debug;

use crate::color::node_color;
use crate::dom::{Document, ElementId};
use crate::error::{Error, Result};
use crate::label::{LabelMode, create_titles};
use crate::layout::{RenderOptions, SliceLayout, TreemapLayout};
use crate::node::{Node, RootNode, annotate, dfs};

/// Selector value of the view combining every JavaScript root.
pub const ALL_JAVASCRIPT_ID: &str = "javascript";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewerConfig {
    pub mode: LabelMode,
    pub render: RenderOptions,
}

/// Shows one root (or the JavaScript aggregate) at a time inside a mount
/// element.
///
/// `root_nodes` stay pristine after construction; everything the display
/// mutates lives in `current_root_node`, a fresh clone per selection.
#[derive(Debug)]
pub struct TreemapViewer<L = SliceLayout> {
    document_url: String,
    root_nodes: Vec<RootNode>,
    mount: ElementId,
    current_root_node: Option<Node>,
    config: ViewerConfig,
    layout: L,
}

impl<L: TreemapLayout> TreemapViewer<L> {
    pub fn new(
        document_url: impl Into<String>,
        mut root_nodes: Vec<RootNode>,
        mount: ElementId,
        config: ViewerConfig,
        layout: L,
    ) -> Self {
        for root in &mut root_nodes {
            annotate(root);
            layout.sort(&mut root.node);
        }
        Self {
            document_url: document_url.into(),
            root_nodes,
            mount,
            current_root_node: None,
            config,
            layout,
        }
    }

    pub fn document_url(&self) -> &str {
        &self.document_url
    }

    pub fn root_nodes(&self) -> &[RootNode] {
        &self.root_nodes
    }

    pub fn current_root_node(&self) -> Option<&Node> {
        self.current_root_node.as_ref()
    }

    pub fn current_root_node_mut(&mut self) -> Option<&mut Node> {
        self.current_root_node.as_mut()
    }

    /// Sum of every root in `group`, with their top-level nodes as children.
    pub fn aggregate(&self, group: &str) -> Node {
        let mut node = Node::new(self.document_url.clone(), 0.0, 0.0);
        node.original_id = Some(self.document_url.clone());
        for root in self.root_nodes.iter().filter(|r| r.group == group) {
            node.size += root.node.size;
            node.wasted_bytes += root.node.wasted_bytes;
            node.children.push(root.node.clone());
        }
        node
    }

    /// An owned copy of the tree `id` refers to.
    fn select(&self, id: &str) -> Result<Node> {
        if id == ALL_JAVASCRIPT_ID {
            return Ok(self.aggregate(ALL_JAVASCRIPT_ID));
        }
        self.root_nodes
            .iter()
            .find(|root| root.id == id)
            .map(|root| root.node.clone())
            .ok_or_else(|| Error::UnknownRoot { id: id.to_string() })
    }

    /// Switches the display to `id`. An unknown id leaves the current view
    /// untouched.
    pub fn show(&mut self, doc: &mut Document, id: &str) -> Result<()> {
        let mut node = self.select(id)?;
        create_titles(&mut node, self.config.mode);
        debug!(id, size = node.size, wasted_bytes = node.wasted_bytes, "showing root");

        doc.clear_children(self.mount);
        self.current_root_node = Some(node);
        self.render(doc);
        Ok(())
    }

    /// Lays out the current root again and recolors it.
    pub fn render(&mut self, doc: &mut Document) {
        let Some(node) = self.current_root_node.as_mut() else {
            return;
        };
        self.layout
            .render(doc, self.mount, node, &self.config.render);
        self.update_colors(doc);
    }

    /// Sets background and text color on every rendered node.
    pub fn update_colors(&self, doc: &mut Document) {
        let Some(root) = self.current_root_node.as_ref() else {
            return;
        };
        let mut painted = 0usize;
        dfs(root, &mut |node| {
            let Some(el) = node.dom else { return };
            let color = node_color(node.id_hash.unwrap_or(0), node.waste_ratio());
            doc.set_style(el, "background-color", color.to_string());
            doc.set_style(el, "color", color.text_color());
            painted += 1;
        });
        debug!(painted, "updated node colors");
    }
}
