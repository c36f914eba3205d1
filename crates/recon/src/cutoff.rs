//! Cutoff (§4.6.5): scree/elbow detection over the score-sorted file list,
//! with an anchor floor so explicitly-mentioned paths are never dropped.

use crate::score::FileScore;

/// Minimum seed-set size for a query with no explicit path/identifier anchors.
pub const UNANCHORED_FLOOR: usize = 5;

/// Index *k* maximising the perpendicular distance from `(k, score[k])` to
/// the line through `(0, score[0])` and `(N-1, score[N-1])`. Returns `None`
/// for fewer than 3 points (nothing to bend around).
fn elbow_index(scores: &[f32]) -> Option<usize> {
    let n = scores.len();
    if n < 3 {
        return None;
    }
    let (x1, y1) = (0.0_f64, scores[0] as f64);
    let (x2, y2) = ((n - 1) as f64, scores[n - 1] as f64);
    let dx = x2 - x1;
    let dy = y2 - y1;
    let norm = (dx * dx + dy * dy).sqrt();
    if norm == 0.0 {
        return None;
    }

    let mut best_idx = 0;
    let mut best_dist = -1.0_f64;
    for (k, &score) in scores.iter().enumerate() {
        let (x0, y0) = (k as f64, score as f64);
        let dist = ((dy * x0 - dx * y0 + x2 * y1 - y2 * x1).abs()) / norm;
        if dist > best_dist {
            best_dist = dist;
            best_idx = k;
        }
    }
    Some(best_idx)
}

/// How many leading files (sorted by score descending) are needed to cover
/// every explicitly-mentioned path or identifier.
fn anchor_coverage(files: &[FileScore], anchored_paths: &[String]) -> usize {
    if anchored_paths.is_empty() {
        return 0;
    }
    let needed = anchored_paths.len();
    let mut covered = 0usize;
    for (idx, file) in files.iter().enumerate() {
        if anchored_paths.iter().any(|p| file.path.ends_with(p.as_str())) {
            covered += 1;
            if covered == needed {
                return idx + 1;
            }
        }
    }
    // Not every anchored path turned up in `files` at all; fall back to
    // covering the whole list rather than silently dropping one.
    files.len()
}

/// Returns the seed-set size `max(k, floor)` where `k` is the elbow index
/// (1-indexed count) and `floor` guarantees anchor coverage, or the fixed
/// unanchored floor when the task mentioned nothing literally.
pub fn seed_set_size(files: &[FileScore], anchored_paths: &[String]) -> usize {
    if files.is_empty() {
        return 0;
    }
    let scores: Vec<f32> = files.iter().map(|f| f.score).collect();
    let elbow = elbow_index(&scores).map(|k| k + 1).unwrap_or(files.len());

    let floor = if anchored_paths.is_empty() {
        UNANCHORED_FLOOR.min(files.len())
    } else {
        anchor_coverage(files, anchored_paths)
    };

    elbow.max(floor).min(files.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(path: &str, score: f32) -> FileScore {
        FileScore { path: path.to_string(), file_id: None, score, edit_likelihood: 0.5, is_test: false, is_barrel: false, evidence: vec![], kind: None }
    }

    #[test]
    fn elbow_finds_the_drop_point_in_a_steep_then_flat_curve() {
        let scores = vec![10.0, 9.0, 8.0, 2.0, 1.9, 1.8, 1.7];
        let k = elbow_index(&scores).unwrap();
        assert!(k >= 2 && k <= 4, "expected elbow near the drop, got {k}");
    }

    #[test]
    fn anchor_floor_never_drops_an_explicitly_mentioned_path() {
        let files = vec![file("a.rs", 5.0), file("b.rs", 4.0), file("target.rs", 0.1)];
        let size = seed_set_size(&files, &["target.rs".to_string()]);
        assert_eq!(size, 3);
    }

    #[test]
    fn unanchored_queries_use_the_fixed_floor() {
        let files: Vec<_> = (0..10).map(|i| file(&format!("f{i}.rs"), 10.0 - i as f32)).collect();
        let size = seed_set_size(&files, &[]);
        assert!(size >= UNANCHORED_FLOOR);
    }
}
