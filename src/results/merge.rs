//! Merging, deduplication and ranking of suggestion lists

use super::types::Suggestion;
use std::collections::HashSet;

/// Drop suggestions whose label was already seen, keeping the first
pub fn dedup_by_label(suggestions: Vec<Suggestion>) -> Vec<Suggestion> {
    let mut seen = HashSet::new();
    suggestions
        .into_iter()
        .filter(|s| seen.insert(s.formatted.clone()))
        .collect()
}

/// Merge a priority list with a secondary list.
///
/// The priority list goes first, so it wins any duplicate label. The
/// deduplicated list is then stable-sorted by descending score; equal scores
/// keep merge order.
pub fn merge_ranked(priority: Vec<Suggestion>, secondary: Vec<Suggestion>) -> Vec<Suggestion> {
    let merged = priority.into_iter().chain(secondary).collect();
    let mut results = dedup_by_label(merged);

    // sort_by is stable
    results.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    results
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(label: &str, score: f64) -> Suggestion {
        Suggestion::new(label, format!("id-{}", label)).with_score(score)
    }

    fn labels(list: &[Suggestion]) -> Vec<&str> {
        list.iter().map(|s| s.formatted.as_str()).collect()
    }

    #[test]
    fn test_priority_wins_duplicate() {
        let scoped = vec![s("X", 1.0)];
        let global = vec![s("X", 9.0), s("Y", 5.0)];

        let merged = merge_ranked(scoped, global);

        assert_eq!(labels(&merged), vec!["Y", "X"]);
        let x = merged.iter().find(|s| s.formatted == "X").unwrap();
        assert_eq!(x.score, 1.0);
    }

    #[test]
    fn test_sorted_descending_by_score() {
        let merged = merge_ranked(vec![s("A", 0.2), s("B", 0.9)], vec![s("C", 0.5)]);
        assert_eq!(labels(&merged), vec!["B", "C", "A"]);
    }

    #[test]
    fn test_ties_keep_merge_order() {
        let merged = merge_ranked(vec![s("A", 1.0), s("B", 1.0)], vec![s("C", 1.0)]);
        assert_eq!(labels(&merged), vec!["A", "B", "C"]);
    }

    #[test]
    fn test_dedup_is_case_sensitive() {
        let deduped = dedup_by_label(vec![s("Paris", 1.0), s("paris", 1.0), s("Paris", 2.0)]);
        assert_eq!(labels(&deduped), vec!["Paris", "paris"]);
        assert_eq!(deduped[0].score, 1.0);
    }

    #[test]
    fn test_empty_inputs() {
        assert!(merge_ranked(vec![], vec![]).is_empty());
        assert_eq!(labels(&merge_ranked(vec![], vec![s("Y", 1.0)])), vec!["Y"]);
    }
}
