/// Greedy radius-aware suppression of overlapping matches
use super::types::Match;
use std::cmp::Ordering;

/// Sort candidates by score (highest first) and keep a candidate only if its
/// center is at least `max(own radius, accepted radius)` away from every
/// match accepted before it.
///
/// The sort is stable, so candidates with equal scores keep their input order.
pub fn suppress_overlaps(mut candidates: Vec<Match>) -> Vec<Match> {
    candidates.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));

    let mut accepted: Vec<Match> = Vec::new();
    for candidate in candidates {
        let overlaps = accepted.iter().any(|kept| {
            let min_separation = candidate.radius.max(kept.radius) as f64;
            candidate.distance_to(kept) < min_separation
        });
        if !overlaps {
            accepted.push(candidate);
        }
    }
    accepted
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_center_keeps_strongest() {
        let weak = Match::new(50, 50, 10, 0.7, 1.0);
        let strong = Match::new(50, 50, 10, 0.9, 1.0);

        let kept = suppress_overlaps(vec![weak, strong]);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].score, 0.9);
    }

    #[test]
    fn test_larger_radius_wins_the_separation() {
        // 12px apart: outside the small radius but inside the big one
        let big = Match::new(0, 0, 20, 0.95, 1.0);
        let small = Match::new(12, 0, 5, 0.90, 0.5);
        let kept = suppress_overlaps(vec![small, big]);
        assert_eq!(kept, vec![big]);
    }

    #[test]
    fn test_distinct_matches_survive_sorted() {
        let a = Match::new(10, 10, 5, 0.8, 1.0);
        let b = Match::new(100, 10, 5, 0.95, 1.0);
        let c = Match::new(10, 100, 5, 0.85, 1.0);

        let kept = suppress_overlaps(vec![a, b, c]);
        let scores: Vec<f32> = kept.iter().map(|m| m.score).collect();
        assert_eq!(scores, vec![0.95, 0.85, 0.8]);
    }

    #[test]
    fn test_exact_radius_distance_is_not_overlap() {
        let a = Match::new(0, 0, 10, 0.9, 1.0);
        let b = Match::new(10, 0, 10, 0.8, 1.0);
        assert_eq!(suppress_overlaps(vec![a, b]).len(), 2);
    }

    #[test]
    fn test_empty_input() {
        assert!(suppress_overlaps(Vec::new()).is_empty());
    }
}
