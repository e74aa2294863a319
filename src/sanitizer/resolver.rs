// Copyright 2025
// SPDX-License-Identifier: Apache-2.0
//
// Conflict resolution between overlapping candidate spans

use std::cmp::Ordering;
use std::collections::BTreeMap;

use super::span::SpanMatch;

/// Accepted intervals keyed by start, for O(log n) overlap checks
#[derive(Debug, Default)]
struct IntervalSet {
    spans: BTreeMap<usize, usize>,
}

impl IntervalSet {
    fn overlaps(&self, start: usize, end: usize) -> bool {
        // Accepted intervals are disjoint, so only the nearest one starting
        // before `end` can reach into [start, end).
        self.spans
            .range(..end)
            .next_back()
            .is_some_and(|(_, &e)| e > start)
    }

    fn insert(&mut self, start: usize, end: usize) {
        self.spans.insert(start, end);
    }
}

fn priority(a: &SpanMatch, b: &SpanMatch) -> Ordering {
    b.confidence
        .total_cmp(&a.confidence)
        .then_with(|| b.len().cmp(&a.len()))
}

/// Pick a non-overlapping subset of `matches`, sorted by start.
///
/// Candidates are taken greedily by confidence, then by length; anything
/// overlapping an accepted span is dropped. Ties beyond that keep input
/// order, which callers should not rely on.
pub fn resolve(mut matches: Vec<SpanMatch>) -> Vec<SpanMatch> {
    if matches.len() < 2 {
        return matches;
    }

    matches.sort_by(priority);

    let mut taken = IntervalSet::default();
    let mut resolved = Vec::with_capacity(matches.len());
    for m in matches {
        if m.is_empty() || taken.overlaps(m.start, m.end) {
            continue;
        }
        taken.insert(m.start, m.end);
        resolved.push(m);
    }

    resolved.sort_by_key(|m| m.start);
    resolved
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sanitizer::config::Category;

    fn span(start: usize, end: usize, category: Category, confidence: f32) -> SpanMatch {
        SpanMatch {
            text: "x".repeat(end - start),
            start,
            end,
            category,
            confidence,
            context: String::new(),
        }
    }

    #[test]
    fn test_higher_confidence_wins() {
        let resolved = resolve(vec![
            span(0, 10, Category::Person, 0.80),
            span(5, 15, Category::Phone, 0.95),
        ]);
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].category, Category::Phone);
    }

    #[test]
    fn test_longer_wins_on_equal_confidence() {
        let resolved = resolve(vec![
            span(4, 12, Category::Person, 0.80),
            span(0, 15, Category::Person, 0.80),
        ]);
        assert_eq!(resolved.len(), 1);
        assert_eq!((resolved[0].start, resolved[0].end), (0, 15));
    }

    #[test]
    fn test_touching_spans_both_kept() {
        let resolved = resolve(vec![
            span(5, 10, Category::Place, 0.75),
            span(0, 5, Category::Person, 0.80),
            span(10, 12, Category::Road, 0.95),
        ]);
        let starts: Vec<usize> = resolved.iter().map(|m| m.start).collect();
        assert_eq!(starts, vec![0, 5, 10]);
    }

    #[test]
    fn test_nested_span_dropped() {
        let resolved = resolve(vec![
            span(0, 20, Category::Address, 0.85),
            span(0, 10, Category::Street, 0.85),
            span(12, 16, Category::Place, 0.75),
        ]);
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].category, Category::Address);
    }

    #[test]
    fn test_overlap_detected_through_earlier_interval() {
        let resolved = resolve(vec![
            span(0, 30, Category::Person, 0.95),
            span(10, 12, Category::Road, 0.90),
            span(25, 40, Category::Place, 0.80),
        ]);
        assert_eq!(resolved.len(), 1);
    }

    #[test]
    fn test_empty_and_single() {
        assert!(resolve(Vec::new()).is_empty());
        assert_eq!(resolve(vec![span(3, 5, Category::Id, 0.7)]).len(), 1);
    }
}
