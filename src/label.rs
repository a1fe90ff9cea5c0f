use std::fmt;
use std::str::FromStr;

use crate::node::{Node, dfs_mut};

/// What the percentage in a node label measures.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LabelMode {
    /// Share of the displayed root's size.
    Default,
    /// Share of the node's own size that is wasted.
    #[default]
    WastedBytes,
}

impl FromStr for LabelMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "default" => Ok(LabelMode::Default),
            "wasted-bytes" | "wastedBytes" => Ok(LabelMode::WastedBytes),
            other => Err(format!("unknown label mode {other:?}")),
        }
    }
}

impl fmt::Display for LabelMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LabelMode::Default => f.write_str("default"),
            LabelMode::WastedBytes => f.write_str("wasted-bytes"),
        }
    }
}

fn percent(part: f64, whole: f64) -> f64 {
    if whole == 0.0 {
        return 0.0;
    }
    part / whole * 100.0
}

/// `"<original id> • <size> • <percentage>"` with both numbers rounded.
pub fn format_label(node: &Node, mode: LabelMode, total: f64) -> String {
    let pct = match mode {
        LabelMode::Default => percent(node.size, total),
        LabelMode::WastedBytes => percent(node.wasted_bytes, node.size),
    };
    format!(
        "{} • {} • {}",
        node.label_source(),
        node.size.round(),
        pct.round()
    )
}

/// Rewrites the display label of every node under `root`.
pub fn create_titles(root: &mut Node, mode: LabelMode) {
    let total = root.size;
    dfs_mut(root, &mut |node| {
        node.id = format_label(node, mode, total);
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{RootNode, annotate, dfs};
    use proptest::prelude::*;

    #[test]
    fn wasted_bytes_label() {
        let mut node = Node::new("a.js", 100.0, 40.0);
        node.original_id = Some("a.js".into());
        assert_eq!(format_label(&node, LabelMode::WastedBytes, 0.0), "a.js • 100 • 40");
    }

    #[test]
    fn default_mode_uses_root_total() {
        let mut root = Node::new("root", 200.0, 0.0)
            .with_children(vec![Node::new("half", 100.0, 0.0)]);
        create_titles(&mut root, LabelMode::Default);
        assert_eq!(root.id, "root • 200 • 100");
        assert_eq!(root.children[0].id, "half • 100 • 50");
    }

    #[test]
    fn zero_size_renders_zero_percent() {
        let node = Node::new("empty", 0.0, 0.0);
        assert_eq!(format_label(&node, LabelMode::WastedBytes, 0.0), "empty • 0 • 0");
        assert_eq!(format_label(&node, LabelMode::Default, 0.0), "empty • 0 • 0");
    }

    #[test]
    fn rounds_fractional_values() {
        let node = Node::new("f", 10.6, 3.0);
        assert_eq!(format_label(&node, LabelMode::WastedBytes, 0.0), "f • 11 • 28");
    }

    #[test]
    fn parses_modes() {
        assert_eq!("default".parse::<LabelMode>(), Ok(LabelMode::Default));
        assert_eq!("wasted-bytes".parse::<LabelMode>(), Ok(LabelMode::WastedBytes));
        assert!("bytes".parse::<LabelMode>().is_err());
    }

    proptest! {
        #[test]
        fn prop_relabel_is_idempotent(size in 0.0f64..1e7, wasted in 0.0f64..1e7, times in 1usize..5) {
            let mut root = RootNode {
                id: "bundle.js".into(),
                group: "javascript".into(),
                node: Node::new("bundle.js", size, wasted)
                    .with_children(vec![Node::new("dep.js", size / 2.0, wasted / 2.0)]),
            };
            annotate(&mut root);

            create_titles(&mut root.node, LabelMode::WastedBytes);
            let mut first = Vec::new();
            dfs(&root.node, &mut |n| first.push(n.id.clone()));

            for _ in 0..times {
                create_titles(&mut root.node, LabelMode::WastedBytes);
            }
            let mut again = Vec::new();
            dfs(&root.node, &mut |n| again.push(n.id.clone()));
            prop_assert_eq!(first, again);
        }
    }
}
