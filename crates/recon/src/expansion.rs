//! Expansion (§4.6.6): pulls in immediate structural neighbours of the seed
//! set via the import graph, depth-limited to 2. Each added file inherits a
//! reduced score based on its distance from the nearest seed.

use codeplane_graph::{expand, FileGraph};

pub const MAX_EXPANSION_DEPTH: u32 = 2;

#[derive(Debug, Clone)]
pub struct ExpansionAdd {
    pub file_id: i64,
    pub depth: u32,
    /// Fraction of a seed's score this expanded file should inherit.
    pub score_factor: f32,
}

fn score_factor_for_depth(depth: u32) -> f32 {
    match depth {
        1 => 0.5,
        _ => 0.2,
    }
}

pub fn expand_seeds(graph: &FileGraph, seed_file_ids: &[i64]) -> Vec<ExpansionAdd> {
    expand(graph, seed_file_ids, MAX_EXPANSION_DEPTH)
        .into_iter()
        .map(|hit| ExpansionAdd { file_id: hit.file_id, depth: hit.depth, score_factor: score_factor_for_depth(hit.depth) })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use codeplane_graph::{FileGraph as Graph, FileNode};
    use codeplane_protocol::ArtifactKind;

    #[test]
    fn depth_one_neighbours_inherit_more_score_than_depth_two() {
        let mut graph = Graph::new();
        graph.add_file(FileNode { file_id: 1, path: "a.rs".into(), artifact_kind: ArtifactKind::Production });
        graph.add_file(FileNode { file_id: 2, path: "b.rs".into(), artifact_kind: ArtifactKind::Production });
        graph.add_file(FileNode { file_id: 3, path: "c.rs".into(), artifact_kind: ArtifactKind::Production });
        graph.add_import(1, 2, false);
        graph.add_import(2, 3, false);

        let adds = expand_seeds(&graph, &[1]);
        let depth_one = adds.iter().find(|a| a.file_id == 2).unwrap();
        let depth_two = adds.iter().find(|a| a.file_id == 3).unwrap();
        assert!(depth_one.score_factor > depth_two.score_factor);
    }
}
