//! Tier assignment (§4.6.7): decides how much of each file's content ships.

use serde::{Deserialize, Serialize};

use crate::expansion::ExpansionAdd;
use crate::score::FileScore;

/// Edit likelihood at or above this is rendered in full.
pub const HIGH_EDIT_LIKELIHOOD_THRESHOLD: f32 = 0.75;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tier {
    FullFile,
    MinScaffold,
    SummaryOnly,
}

#[derive(Debug, Clone)]
pub struct TieredFile {
    pub path: String,
    pub file_id: Option<i64>,
    pub tier: Tier,
    pub score: f32,
}

pub fn assign_seed_tiers(seeds: &[FileScore]) -> Vec<TieredFile> {
    seeds
        .iter()
        .map(|f| {
            let tier = if f.edit_likelihood >= HIGH_EDIT_LIKELIHOOD_THRESHOLD {
                Tier::FullFile
            } else {
                Tier::MinScaffold
            };
            TieredFile { path: f.path.clone(), file_id: f.file_id, tier, score: f.score }
        })
        .collect()
}

/// Expansion-added files: depth-1 (medium relevance) get a scaffold,
/// depth-2 (low relevance, imports only) get a one-line summary.
pub fn assign_expansion_tiers(adds: &[ExpansionAdd], path_for_file_id: impl Fn(i64) -> Option<String>) -> Vec<TieredFile> {
    adds.iter()
        .filter_map(|add| {
            let path = path_for_file_id(add.file_id)?;
            let tier = if add.depth <= 1 { Tier::MinScaffold } else { Tier::SummaryOnly };
            Some(TieredFile { path, file_id: Some(add.file_id), tier, score: add.score_factor })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn score(path: &str, edit_likelihood: f32) -> FileScore {
        FileScore { path: path.to_string(), file_id: None, score: 1.0, edit_likelihood, is_test: false, is_barrel: false, evidence: vec![], kind: None }
    }

    #[test]
    fn high_edit_likelihood_gets_full_file() {
        let tiers = assign_seed_tiers(&[score("a.rs", 0.9)]);
        assert_eq!(tiers[0].tier, Tier::FullFile);
    }

    #[test]
    fn low_edit_likelihood_gets_scaffold() {
        let tiers = assign_seed_tiers(&[score("a.rs", 0.3)]);
        assert_eq!(tiers[0].tier, Tier::MinScaffold);
    }

    #[test]
    fn depth_two_expansion_gets_summary_only() {
        let adds = vec![ExpansionAdd { file_id: 1, depth: 2, score_factor: 0.2 }];
        let tiers = assign_expansion_tiers(&adds, |_| Some("b.rs".to_string()));
        assert_eq!(tiers[0].tier, Tier::SummaryOnly);
    }
}
