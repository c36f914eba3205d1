//! Directed file-level import graph (SPEC §4.6.6 expansion).
//!
//! One node per indexed file; one edge per resolved import. Barrel files are
//! flagged on the node so expansion can apply the "barrel contributes
//! re-exports, not its own content" rule without a second lookup.

use std::collections::HashMap;

use codeplane_protocol::ArtifactKind;
use petgraph::graph::{DiGraph, NodeIndex};

#[derive(Debug, Clone)]
pub struct FileNode {
    pub file_id: i64,
    pub path: String,
    pub artifact_kind: ArtifactKind,
}

#[derive(Debug, Clone, Copy)]
pub struct ImportEdge {
    pub is_star: bool,
}

pub struct FileGraph {
    pub(crate) graph: DiGraph<FileNode, ImportEdge>,
    pub(crate) index_by_file_id: HashMap<i64, NodeIndex>,
}

impl FileGraph {
    pub fn new() -> Self {
        Self { graph: DiGraph::new(), index_by_file_id: HashMap::new() }
    }

    pub fn add_file(&mut self, node: FileNode) -> NodeIndex {
        if let Some(&idx) = self.index_by_file_id.get(&node.file_id) {
            return idx;
        }
        let file_id = node.file_id;
        let idx = self.graph.add_node(node);
        self.index_by_file_id.insert(file_id, idx);
        idx
    }

    pub fn add_import(&mut self, from_file_id: i64, to_file_id: i64, is_star: bool) {
        if let (Some(&from), Some(&to)) = (self.index_by_file_id.get(&from_file_id), self.index_by_file_id.get(&to_file_id)) {
            self.graph.add_edge(from, to, ImportEdge { is_star });
        }
    }

    pub fn node(&self, file_id: i64) -> Option<&FileNode> {
        self.index_by_file_id.get(&file_id).and_then(|&idx| self.graph.node_weight(idx))
    }

    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }
}

impl Default for FileGraph {
    fn default() -> Self {
        Self::new()
    }
}
