//! Structural neighbour expansion (SPEC §4.6.6): from a seed set of files,
//! walk import edges up to `max_depth`. Barrel files contribute their
//! re-exports (the edges leaving them) but are themselves excluded from the
//! result — a barrel's own content rarely answers the task.

use std::collections::{HashMap, HashSet, VecDeque};

use codeplane_protocol::ArtifactKind;
use petgraph::visit::EdgeRef;

use crate::types::FileGraph;

#[derive(Debug, Clone, Copy)]
pub struct ExpansionHit {
    pub file_id: i64,
    pub depth: u32,
}

pub fn expand(graph: &FileGraph, seeds: &[i64], max_depth: u32) -> Vec<ExpansionHit> {
    let mut visited: HashSet<i64> = seeds.iter().copied().collect();
    let mut queue: VecDeque<(i64, u32)> = seeds.iter().map(|&id| (id, 0)).collect();
    let mut hits: HashMap<i64, ExpansionHit> = HashMap::new();

    while let Some((file_id, depth)) = queue.pop_front() {
        if depth >= max_depth {
            continue;
        }
        let Some(&idx) = graph.index_by_file_id.get(&file_id) else { continue };

        for edge in graph.graph.edges(idx) {
            let target = edge.target();
            let Some(target_node) = graph.graph.node_weight(target) else { continue };
            let target_id = target_node.file_id;
            if visited.contains(&target_id) {
                continue;
            }
            visited.insert(target_id);
            hits.insert(target_id, ExpansionHit { file_id: target_id, depth: depth + 1 });
            queue.push_back((target_id, depth + 1));
        }
    }

    // Barrel files themselves never surface as a hit, only their targets do.
    hits.into_values().filter(|hit| graph.node(hit.file_id).map(|n| n.artifact_kind != ArtifactKind::Barrel).unwrap_or(true)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FileNode;

    fn node(graph: &mut FileGraph, id: i64, path: &str, kind: ArtifactKind) {
        graph.add_file(FileNode { file_id: id, path: path.to_string(), artifact_kind: kind });
    }

    #[test]
    fn expands_one_hop_neighbours() {
        let mut graph = FileGraph::new();
        node(&mut graph, 1, "a.rs", ArtifactKind::Production);
        node(&mut graph, 2, "b.rs", ArtifactKind::Production);
        node(&mut graph, 3, "c.rs", ArtifactKind::Production);
        graph.add_import(1, 2, false);
        graph.add_import(2, 3, false);

        let hits = expand(&graph, &[1], 1);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].file_id, 2);
    }

    #[test]
    fn respects_depth_limit_of_two() {
        let mut graph = FileGraph::new();
        node(&mut graph, 1, "a.rs", ArtifactKind::Production);
        node(&mut graph, 2, "b.rs", ArtifactKind::Production);
        node(&mut graph, 3, "c.rs", ArtifactKind::Production);
        graph.add_import(1, 2, false);
        graph.add_import(2, 3, false);

        let hits = expand(&graph, &[1], 2);
        let ids: Vec<_> = hits.iter().map(|h| h.file_id).collect();
        assert!(ids.contains(&2));
        assert!(ids.contains(&3));
    }

    #[test]
    fn barrel_file_itself_is_excluded_from_hits() {
        let mut graph = FileGraph::new();
        node(&mut graph, 1, "a.rs", ArtifactKind::Production);
        node(&mut graph, 2, "mod.rs", ArtifactKind::Barrel);
        node(&mut graph, 3, "real.rs", ArtifactKind::Production);
        graph.add_import(1, 2, false);
        graph.add_import(2, 3, false);

        let hits = expand(&graph, &[1], 2);
        let ids: Vec<_> = hits.iter().map(|h| h.file_id).collect();
        assert!(!ids.contains(&2));
        assert!(ids.contains(&3));
    }
}
