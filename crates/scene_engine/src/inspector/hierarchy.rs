//! Flattened hierarchy view

use std::fmt::Write;

use crate::scene::{NodeHandle, SceneGraph};

/// One node in a [`HierarchyView`]
#[derive(Debug, Clone, PartialEq)]
pub struct HierarchyRow {
    /// Node handle
    pub handle: NodeHandle,
    /// Distance from the root (roots are 0)
    pub depth: usize,
    /// Display name
    pub name: String,
    /// Kind label, e.g. `"Mesh"`
    pub kind: &'static str,
    /// Number of direct children
    pub child_count: usize,
    /// Parent's display name, `None` for roots
    pub parent_name: Option<String>,
}

/// Pre-order snapshot of the whole graph
#[derive(Debug, Clone, Default)]
pub struct HierarchyView {
    rows: Vec<HierarchyRow>,
}

impl HierarchyView {
    /// Capture the current state of `graph`
    pub fn capture(graph: &SceneGraph) -> Self {
        let mut rows = Vec::with_capacity(graph.len());
        let mut stack: Vec<(NodeHandle, usize)> = graph.roots().iter().rev().map(|&root| (root, 0)).collect();

        while let Some((handle, depth)) = stack.pop() {
            let Ok(node) = graph.node(handle) else {
                continue;
            };
            let parent_name = node
                .parent()
                .and_then(|parent| graph.node(parent).ok())
                .map(|parent| parent.name().to_string());

            rows.push(HierarchyRow {
                handle,
                depth,
                name: node.name().to_string(),
                kind: node.kind.label(),
                child_count: node.children().len(),
                parent_name,
            });
            stack.extend(node.children().iter().rev().map(|&child| (child, depth + 1)));
        }

        Self { rows }
    }

    /// Rows in pre-order
    pub fn rows(&self) -> &[HierarchyRow] {
        &self.rows
    }

    /// Row for `handle`
    pub fn row(&self, handle: NodeHandle) -> Option<&HierarchyRow> {
        self.rows.iter().find(|row| row.handle == handle)
    }

    /// Indented text tree, one node per line
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        for row in &self.rows {
            let _ = writeln!(out, "{}{} ({})", "  ".repeat(row.depth), row.name, row.kind);
        }
        out
    }
}
