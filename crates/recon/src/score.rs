//! Score + filter (§4.6.4): linear combination of per-source scores with
//! view-aware weights, modulated by artifact-classifier penalties, context
//! value and edit likelihood, aggregated per file with square-root
//! dampening so one file with many weak hits does not out-rank a file with
//! one strong hit.

use codeplane_protocol::DefKind;

use crate::enrich::EnrichedCandidate;
use crate::harvest::HarvestSource;
use crate::task::Intent;

fn source_weight(source: HarvestSource) -> f32 {
    match source {
        HarvestSource::Explicit => 1.0,
        HarvestSource::DefEmbedding => 0.6,
        HarvestSource::Lexical => 0.5,
        HarvestSource::TermMatch => 0.4,
        HarvestSource::FileEmbedding => 0.3,
    }
}

/// Intent=edit favours non-test, non-barrel production code. Intent=understand
/// favours tests and docs, which explain behaviour better than they change it.
fn edit_likelihood(intent: Intent, is_test: bool, is_barrel: bool) -> f32 {
    match intent {
        Intent::Edit if !is_test && !is_barrel => 0.9,
        Intent::Edit => 0.3,
        Intent::Understand if is_test => 0.7,
        Intent::Understand => 0.5,
        Intent::Debug | Intent::StacktraceDriven => 0.6,
        Intent::TestDriven => {
            if is_test {
                0.9
            } else {
                0.4
            }
        }
        Intent::Other => 0.5,
    }
}

fn artifact_penalty(intent: Intent, is_test: bool, is_barrel: bool) -> f32 {
    let mut penalty = 1.0;
    if is_barrel {
        penalty *= 0.3;
    }
    if is_test && !matches!(intent, Intent::TestDriven | Intent::Understand) {
        penalty *= 0.5;
    }
    penalty
}

#[derive(Debug, Clone)]
pub struct FileScore {
    pub path: String,
    pub file_id: Option<i64>,
    pub score: f32,
    pub edit_likelihood: f32,
    pub is_test: bool,
    pub is_barrel: bool,
    pub evidence: Vec<String>,
    pub kind: Option<DefKind>,
}

pub fn score_candidates(candidates: &[EnrichedCandidate], intent: Intent) -> Vec<FileScore> {
    candidates
        .iter()
        .map(|c| {
            let penalty = artifact_penalty(intent, c.is_test, c.is_barrel);
            let weighted_sum: f32 = c.sources.iter().map(|s| source_weight(s.source) * s.score).sum::<f32>() * penalty;
            let n = c.sources.len().max(1) as f32;
            // Square-root dampening: many weak hits contribute less than their
            // raw sum would suggest, while still outscoring a single weak hit.
            let dampened = weighted_sum.max(0.0).sqrt() * n.sqrt().ln_1p().max(1.0);
            let evidence = c.sources.iter().flat_map(|s| s.evidence.clone()).collect();
            FileScore {
                path: c.path.clone(),
                file_id: c.file_id,
                score: dampened,
                edit_likelihood: edit_likelihood(intent, c.is_test, c.is_barrel),
                is_test: c.is_test,
                is_barrel: c.is_barrel,
                evidence,
                kind: c.kind,
            }
        })
        .collect()
}

pub fn sort_descending(scores: &mut [FileScore]) {
    scores.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enrich::EnrichedCandidate;
    use crate::harvest::HarvestCandidate;

    fn candidate(path: &str, source: HarvestSource, score: f32, is_test: bool, is_barrel: bool) -> EnrichedCandidate {
        EnrichedCandidate {
            path: path.to_string(),
            def_uid: None,
            file_id: Some(1),
            signature: None,
            kind: None,
            is_test,
            is_barrel,
            sources: vec![HarvestCandidate { def_uid: None, path: path.to_string(), score, source, evidence: vec![] }],
        }
    }

    #[test]
    fn test_files_are_penalized_for_edit_intent() {
        let prod = candidate("a.rs", HarvestSource::Explicit, 1.0, false, false);
        let test = candidate("a_test.rs", HarvestSource::Explicit, 1.0, true, false);
        let scores = score_candidates(&[prod, test], Intent::Edit);
        assert!(scores[0].score > scores[1].score);
    }

    #[test]
    fn test_files_are_favored_for_test_driven_intent() {
        let scores = score_candidates(&[candidate("a_test.rs", HarvestSource::Explicit, 1.0, true, false)], Intent::TestDriven);
        assert!(scores[0].edit_likelihood > 0.8);
    }

    #[test]
    fn barrel_files_are_always_penalized() {
        let scores = score_candidates(&[candidate("mod.rs", HarvestSource::Lexical, 1.0, false, true)], Intent::Understand);
        assert!(scores[0].score < 1.0);
    }
}
