// Copyright 2025
// SPDX-License-Identifier: Apache-2.0
//
// Person names: regex families plus document-context heuristics

use super::{PatternDetector, SpanSink};
use crate::sanitizer::config::Category;
use crate::sanitizer::patterns::{
    ALLCAPS_NAME_CONFIDENCE, CONTEXT_NAME_STOPWORDS, NAME_BEFORE_DATE_CONFIDENCE, NAME_CONFIDENCE,
    NAME_EXCLUSIONS, NAME_MIN_LEN, NAME_REGION_WORDS, PARTIAL_NAME_CONFIDENCE,
    PLACEHOLDER_WORDS, PLACE_SUFFIX_EXCLUSIONS,
};
use crate::sanitizer::span::SpanMatch;

/// The token after the leading particle starts with a rejected word
fn rejected_after_particle(name: &str, rejected: &[&str]) -> bool {
    if rejected.is_empty() {
        return false;
    }
    name.split_whitespace()
        .nth(1)
        .is_some_and(|token| rejected.iter().any(|r| token.starts_with(r)))
}

fn is_name_candidate(name: &str) -> bool {
    let upper = name.to_uppercase();
    if NAME_EXCLUSIONS.contains(&upper.as_str()) {
        return false;
    }
    if NAME_REGION_WORDS.iter().any(|w| upper.contains(w)) {
        return false;
    }
    let last_word = name.split_whitespace().last().unwrap_or("").to_lowercase();
    if PLACE_SUFFIX_EXCLUSIONS.contains(&last_word.as_str()) {
        return false;
    }
    !name.contains('\n') && name.chars().count() >= NAME_MIN_LEN
}

impl PatternDetector {
    /// Name-shaped spans from the regex families, minus legal phrases and places
    pub fn detect_names(&self, text: &str) -> Vec<SpanMatch> {
        let mut sink = SpanSink::default();
        for pattern in &self.patterns.names {
            for m in pattern.regex.find_iter(text) {
                let name = m.as_str();
                if rejected_after_particle(name, pattern.reject_after_particle) {
                    continue;
                }
                if !is_name_candidate(name) {
                    continue;
                }
                sink.push(SpanMatch::from_text(
                    text,
                    m.start(),
                    m.end(),
                    Category::Person,
                    NAME_CONFIDENCE,
                    30,
                    20,
                ));
            }
        }
        sink.into_vec()
    }

    /// Names recognised from their surroundings: before a birth date, an
    /// ALLCAPS surname before nationality or birth data, and name remnants
    /// next to an existing PERSON placeholder.
    pub fn detect_names_by_context(&self, text: &str) -> Vec<SpanMatch> {
        let mut sink = SpanSink::default();

        for caps in self.patterns.name_before_date.captures_iter(text) {
            let Some(group) = caps.get(1) else { continue };
            let name = group.as_str();
            if name.chars().count() < 3 || name.contains('_') || name.contains('\n') {
                continue;
            }
            if CONTEXT_NAME_STOPWORDS.contains(&name.to_lowercase().as_str()) {
                continue;
            }
            sink.push(SpanMatch::from_text(
                text,
                group.start(),
                group.end(),
                Category::Person,
                NAME_BEFORE_DATE_CONFIDENCE,
                10,
                30,
            ));
        }

        for caps in self.patterns.allcaps_name.captures_iter(text) {
            let Some(group) = caps.get(1) else { continue };
            let name = group.as_str();
            if name.contains('_') || PLACEHOLDER_WORDS.contains(&name) {
                continue;
            }
            if sink.overlaps_any(group.start(), group.end()) {
                continue;
            }
            sink.push(SpanMatch::from_text(
                text,
                group.start(),
                group.end(),
                Category::Person,
                ALLCAPS_NAME_CONFIDENCE,
                10,
                30,
            ));
        }

        for caps in self.patterns.partial_name.captures_iter(text) {
            let Some(group) = caps.get(1) else { continue };
            if group.as_str().chars().count() < 4 {
                continue;
            }
            sink.push(SpanMatch::from_text(
                text,
                group.start(),
                group.end(),
                Category::Person,
                PARTIAL_NAME_CONFIDENCE,
                10,
                30,
            ));
        }

        sink.into_vec()
    }
}
