//! Treemap layout.
//!
//! The viewer only relies on the [`TreemapLayout`] trait: sort a tree once,
//! then render it into a mount element, recording each visible node's
//! element in [`Node::dom`]. [`SliceLayout`] is the engine used by the page:
//! a slice-and-dice layout whose split direction alternates per depth.

use crate::dom::{Document, ElementId};
use crate::node::{Node, dfs_mut};

pub const NODE_CLASS: &str = "treemap-node";
pub const CAPTION_CLASS: &str = "treemap-caption";

#[derive(Debug, Clone, PartialEq)]
pub struct RenderOptions {
    /// Inner padding of every node box: top, right, bottom, left.
    /// The top edge leaves room for the caption.
    pub padding: [f64; 4],
    /// Boxes narrower or shorter than this are not rendered.
    pub min_side: f64,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            padding: [18.0, 3.0, 3.0, 3.0],
            min_side: 4.0,
        }
    }
}

pub trait TreemapLayout {
    /// Orders siblings for display. Applied once to pristine trees.
    fn sort(&self, node: &mut Node);

    /// Replaces the contents of `mount` with the rendered `node`.
    fn render(&self, doc: &mut Document, mount: ElementId, node: &mut Node, options: &RenderOptions);
}

#[derive(Debug, Clone, Copy)]
struct Rect {
    x: f64,
    y: f64,
    w: f64,
    h: f64,
}

impl Rect {
    fn inset(self, [top, right, bottom, left]: [f64; 4]) -> Self {
        Self {
            x: self.x + left,
            y: self.y + top,
            w: (self.w - left - right).max(0.0),
            h: (self.h - top - bottom).max(0.0),
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SliceLayout;

impl SliceLayout {
    fn place(
        &self,
        doc: &mut Document,
        parent: ElementId,
        node: &mut Node,
        rect: Rect,
        depth: usize,
        options: &RenderOptions,
    ) {
        // Also rejects NaN extents.
        if !(rect.w >= options.min_side && rect.h >= options.min_side) {
            return;
        }

        let el = doc.create_element("div");
        doc.add_class(el, NODE_CLASS);
        doc.set_style(el, "left", px(rect.x));
        doc.set_style(el, "top", px(rect.y));
        doc.set_style(el, "width", px(rect.w));
        doc.set_style(el, "height", px(rect.h));
        doc.append_child(parent, el);

        let caption = doc.create_element("div");
        doc.add_class(caption, CAPTION_CLASS);
        doc.set_text(caption, node.id.clone());
        doc.append_child(el, caption);
        node.dom = Some(el);

        let total: f64 = node.children.iter().map(|c| c.size.max(0.0)).sum();
        if total <= 0.0 {
            return;
        }

        // Children are positioned relative to this node's box.
        let inner = Rect { x: 0.0, y: 0.0, w: rect.w, h: rect.h }.inset(options.padding);
        let horizontal = depth % 2 == 0;
        let mut offset = 0.0;
        for child in &mut node.children {
            let share = child.size.max(0.0) / total;
            let child_rect = if horizontal {
                let w = inner.w * share;
                Rect { x: inner.x + offset, y: inner.y, w, h: inner.h }
            } else {
                let h = inner.h * share;
                Rect { x: inner.x, y: inner.y + offset, w: inner.w, h }
            };
            offset += if horizontal { child_rect.w } else { child_rect.h };
            self.place(doc, el, child, child_rect, depth + 1, options);
        }
    }
}

fn px(v: f64) -> String {
    format!("{}px", (v * 100.0).round() / 100.0)
}

impl TreemapLayout for SliceLayout {
    fn sort(&self, node: &mut Node) {
        dfs_mut(node, &mut |n| {
            n.children.sort_by(|a, b| b.size.total_cmp(&a.size));
        });
    }

    fn render(&self, doc: &mut Document, mount: ElementId, node: &mut Node, options: &RenderOptions) {
        doc.clear_children(mount);
        dfs_mut(node, &mut |n| n.dom = None);

        let viewport = doc.viewport();
        let rect = Rect { x: 0.0, y: 0.0, w: viewport.width, h: viewport.height };
        self.place(doc, mount, node, rect, 0, options);
    }
}
