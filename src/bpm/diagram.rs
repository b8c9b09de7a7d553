//! Linear flow diagrams.
//!
//! A diagram is always a single chain `start -> task -> ... -> end`, even
//! when the source text describes branches or loops.

use serde::{Deserialize, Serialize};

use super::truncate_label;

/// Maximum characters of a task label shown in a diagram node.
pub const NODE_LABEL_BUDGET: usize = 30;

/// Kind of diagram node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    /// Synthetic start marker
    Start,
    /// One process step
    Task,
    /// Synthetic end marker
    End,
}

impl NodeKind {
    fn dot_attrs(self) -> &'static str {
        match self {
            Self::Start => ", shape=circle, fillcolor=lightgreen",
            Self::End => ", shape=circle, fillcolor=lightcoral",
            Self::Task => "",
        }
    }
}

/// A node in a flow diagram.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagramNode {
    pub id: String,
    pub label: String,
    pub kind: NodeKind,
}

/// A directed edge between two nodes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagramEdge {
    pub from: String,
    pub to: String,
}

/// A linear process flow diagram.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowDiagram {
    /// Diagram title (rendered as a DOT comment)
    pub title: String,

    /// Nodes in chain order: start, tasks, end
    pub nodes: Vec<DiagramNode>,

    /// Edges in chain order
    pub edges: Vec<DiagramEdge>,
}

impl FlowDiagram {
    /// Build a diagram chaining the tasks between a start and an end node.
    ///
    /// With no tasks the diagram holds only the start and end nodes and no
    /// edge between them.
    pub fn build(tasks: &[String], title: impl Into<String>) -> Self {
        let mut nodes = Vec::with_capacity(tasks.len() + 2);
        let mut edges = Vec::with_capacity(tasks.len() + 1);

        nodes.push(DiagramNode {
            id: "start".to_string(),
            label: "START".to_string(),
            kind: NodeKind::Start,
        });

        let mut prev = "start".to_string();
        for (i, task) in tasks.iter().enumerate() {
            let id = format!("task_{i}");
            nodes.push(DiagramNode {
                id: id.clone(),
                label: truncate_label(task, NODE_LABEL_BUDGET),
                kind: NodeKind::Task,
            });
            edges.push(DiagramEdge { from: prev, to: id.clone() });
            prev = id;
        }

        nodes.push(DiagramNode { id: "end".to_string(), label: "END".to_string(), kind: NodeKind::End });
        if !tasks.is_empty() {
            edges.push(DiagramEdge { from: prev, to: "end".to_string() });
        }

        Self { title: title.into(), nodes, edges }
    }

    /// Number of task nodes.
    pub fn task_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.kind == NodeKind::Task).count()
    }

    /// Render as Graphviz DOT.
    pub fn to_dot(&self) -> String {
        let mut out = format!("// {}\n", self.title.replace('\n', " "));
        out.push_str("digraph {\n");
        out.push_str("  rankdir=LR;\n");
        out.push_str("  size=\"12,8\";\n");
        out.push_str("  node [shape=box, style=\"rounded,filled\", fillcolor=lightblue];\n");

        for node in &self.nodes {
            out.push_str(&format!(
                "  {} [label=\"{}\"{}];\n",
                node.id,
                escape_dot(&node.label),
                node.kind.dot_attrs()
            ));
        }

        for edge in &self.edges {
            out.push_str(&format!("  {} -> {};\n", edge.from, edge.to));
        }

        out.push_str("}\n");
        out
    }
}

/// Escape a string for use inside a quoted DOT label.
fn escape_dot(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"").replace('\n', "\\n").replace('\r', "")
}
