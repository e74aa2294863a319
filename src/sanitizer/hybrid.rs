// Copyright 2025
// SPDX-License-Identifier: Apache-2.0
//
// Hybrid merger: structured patterns first, entity recognizer for the rest
//
// Pattern spans are reserved; entity spans that overlap them are dropped, so
// structured data is always owned by the pattern layer.

use std::collections::BTreeSet;

use tracing::{debug, info, warn};

use super::config::{Category, Language, SanitizerConfig};
use super::detector::PatternDetector;
use super::entity::{map_label, EntityRecognizer, EntitySpan};
use super::error::Result;
use super::span::{ceil_boundary, floor_boundary, SpanMatch};

/// Confidence given to every accepted entity span
pub const ENTITY_CONFIDENCE: f32 = 0.90;

/// Merger settings
#[derive(Debug, Clone)]
pub struct HybridOptions {
    pub language: Language,
    pub include_org: bool,
    pub include_misc: bool,
    /// Max bytes per recognizer call
    pub chunk_size: usize,
}

impl Default for HybridOptions {
    fn default() -> Self {
        Self {
            language: Language::Nl,
            include_org: false,
            include_misc: false,
            chunk_size: 500_000,
        }
    }
}

impl HybridOptions {
    pub fn from_config(config: &SanitizerConfig) -> Self {
        Self {
            language: config.language,
            include_org: config.include_org,
            include_misc: config.include_misc,
            chunk_size: config.chunk_size,
        }
    }

    /// Entity categories that survive the merge
    pub fn included(&self) -> BTreeSet<Category> {
        let mut set: BTreeSet<Category> = [Category::Person, Category::Place].into_iter().collect();
        if self.include_org {
            set.insert(Category::Org);
        }
        if self.include_misc {
            set.insert(Category::Misc);
        }
        set
    }
}

/// Split `text` into `(start, end)` byte ranges of at most `chunk_size`.
///
/// A chunk ends after the last blank line, or failing that the last ". ",
/// provided the cut lands past the middle of the window. Ranges are
/// contiguous, cover the whole text, and fall on char boundaries.
pub fn chunk_bounds(text: &str, chunk_size: usize) -> Vec<(usize, usize)> {
    let len = text.len();
    let size = chunk_size.max(1);
    let mut chunks = Vec::new();
    let mut pos = 0;

    while pos < len {
        let mut end = (pos + size).min(len);

        if end < len {
            end = floor_boundary(text, end);
            let window = &text[pos..end];
            let half = pos + size / 2;

            let cut = window
                .rfind("\n\n")
                .map(|i| pos + i)
                .filter(|&i| i > half)
                .or_else(|| window.rfind(". ").map(|i| pos + i).filter(|&i| i > half));
            if let Some(i) = cut {
                end = i + 2;
            }
        }

        if end <= pos {
            end = ceil_boundary(text, pos + 1);
        }

        chunks.push((pos, end));
        pos = end;
    }

    chunks
}

/// Pattern detector plus optional entity recognizer
pub struct HybridMerger<'a> {
    patterns: &'a PatternDetector,
    recognizer: Option<&'a dyn EntityRecognizer>,
    options: HybridOptions,
}

impl<'a> HybridMerger<'a> {
    pub fn new(
        patterns: &'a PatternDetector,
        recognizer: Option<&'a dyn EntityRecognizer>,
        options: HybridOptions,
    ) -> Self {
        Self {
            patterns,
            recognizer,
            options,
        }
    }

    /// The recognizer, if one is configured and serves the language
    pub fn available_recognizer(&self) -> Option<&'a dyn EntityRecognizer> {
        self.recognizer
            .filter(|r| r.is_available(self.options.language))
    }

    /// Structured patterns merged with entity spans, sorted by start.
    ///
    /// Without a usable recognizer this degrades to the full pattern set; it
    /// never fails.
    pub fn detect(&self, text: &str) -> Vec<SpanMatch> {
        if text.is_empty() {
            return Vec::new();
        }

        let Some(recognizer) = self.available_recognizer() else {
            match self.recognizer {
                Some(r) => warn!(
                    recognizer = r.name(),
                    language = %self.options.language,
                    "entity recognizer unavailable, using pattern detection only"
                ),
                None => info!("no entity recognizer configured, using pattern detection only"),
            }
            return self.patterns.detect_all(text);
        };

        let structured = self.patterns.detect_structured(text);

        let entities = match self.recognize_chunked(recognizer, text) {
            Ok(entities) => entities,
            Err(e) => {
                warn!(
                    recognizer = recognizer.name(),
                    error = %e,
                    "entity recognizer failed, using pattern detection only"
                );
                return self.patterns.detect_all(text);
            }
        };

        let reserved: Vec<(usize, usize)> = structured.iter().map(|m| (m.start, m.end)).collect();
        let accepted = self.accept_entities(text, entities, reserved);
        debug!(
            patterns = structured.len(),
            entities = accepted.len(),
            "hybrid merge finished"
        );

        let mut all = structured;
        all.extend(accepted);
        all.sort_by_key(|m| m.start);
        all
    }

    /// Entity spans only, for the explicit entity backend
    pub fn detect_entities(&self, text: &str, recognizer: &dyn EntityRecognizer) -> Result<Vec<SpanMatch>> {
        if text.is_empty() {
            return Ok(Vec::new());
        }
        let entities = self.recognize_chunked(recognizer, text)?;
        let mut accepted = self.accept_entities(text, entities, Vec::new());
        accepted.sort_by_key(|m| m.start);
        Ok(accepted)
    }

    /// Run the recognizer per chunk and shift spans back to document offsets.
    /// Spans outside their chunk or off char boundaries are discarded.
    fn recognize_chunked(
        &self,
        recognizer: &dyn EntityRecognizer,
        text: &str,
    ) -> Result<Vec<EntitySpan>> {
        let bounds = if text.len() > self.options.chunk_size {
            chunk_bounds(text, self.options.chunk_size)
        } else {
            vec![(0, text.len())]
        };
        if bounds.len() > 1 {
            debug!(chunks = bounds.len(), "recognizing in chunks");
        }

        let mut spans = Vec::new();
        for (offset, end) in bounds {
            let chunk = &text[offset..end];
            for span in recognizer.recognize(chunk, self.options.language)? {
                if span.start >= span.end || span.end > chunk.len() {
                    continue;
                }
                if !chunk.is_char_boundary(span.start) || !chunk.is_char_boundary(span.end) {
                    continue;
                }
                spans.push(EntitySpan {
                    start: span.start + offset,
                    end: span.end + offset,
                    ..span
                });
            }
        }
        Ok(spans)
    }

    fn accept_entities(
        &self,
        text: &str,
        entities: Vec<EntitySpan>,
        mut reserved: Vec<(usize, usize)>,
    ) -> Vec<SpanMatch> {
        let included = self.options.included();
        let mut accepted = Vec::new();

        for span in entities {
            let category = map_label(&span.label);
            if !included.contains(&category) {
                continue;
            }
            if reserved.iter().any(|&(s, e)| !(span.end <= s || span.start >= e)) {
                continue;
            }

            let value = &text[span.start..span.end];
            if value.trim().chars().count() < 2 {
                continue;
            }
            if value.contains('@') || value.to_lowercase() == "email" {
                continue;
            }
            if value.contains('\n') {
                continue;
            }

            reserved.push((span.start, span.end));
            accepted.push(SpanMatch::from_text(
                text,
                span.start,
                span.end,
                category,
                ENTITY_CONFIDENCE,
                20,
                20,
            ));
        }

        accepted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sanitizer::entity::LexiconRecognizer;
    use crate::sanitizer::error::SanitizerError;

    struct Failing;

    impl EntityRecognizer for Failing {
        fn name(&self) -> &str {
            "failing"
        }
        fn is_available(&self, _language: Language) -> bool {
            true
        }
        fn recognize(&self, _text: &str, _language: Language) -> Result<Vec<EntitySpan>> {
            Err(SanitizerError::Recognizer {
                name: "failing".to_string(),
                reason: "model crashed".to_string(),
            })
        }
    }

    /// Reports fixed spans regardless of input
    struct Fixed(Vec<EntitySpan>);

    impl EntityRecognizer for Fixed {
        fn name(&self) -> &str {
            "fixed"
        }
        fn is_available(&self, _language: Language) -> bool {
            true
        }
        fn recognize(&self, _text: &str, _language: Language) -> Result<Vec<EntitySpan>> {
            Ok(self.0.clone())
        }
    }

    fn span(text: &str, start: usize, end: usize, label: &str) -> EntitySpan {
        EntitySpan {
            text: text.to_string(),
            start,
            end,
            label: label.to_string(),
            score: 0.99,
        }
    }

    #[test]
    fn test_chunk_bounds_cover_text() {
        let text = "Eerste alinea.\n\nTweede alinea met tekst. Derde zin hier. Vierde.";
        let bounds = chunk_bounds(text, 20);
        assert_eq!(bounds.first().unwrap().0, 0);
        assert_eq!(bounds.last().unwrap().1, text.len());
        for pair in bounds.windows(2) {
            assert_eq!(pair[0].1, pair[1].0);
        }
        // The first cut lands after the blank line
        assert_eq!(bounds[0], (0, 16));
    }

    #[test]
    fn test_chunk_bounds_multibyte() {
        let text = "é".repeat(50);
        for (start, end) in chunk_bounds(&text, 7) {
            assert!(text.is_char_boundary(start));
            assert!(text.is_char_boundary(end));
            assert!(end > start);
        }
    }

    #[test]
    fn test_chunked_offsets_are_shifted() {
        let detector = PatternDetector::new().unwrap();
        let lexicon = LexiconRecognizer::new([("Lelystad", "LOC")]).unwrap();
        let options = HybridOptions {
            chunk_size: 30,
            ..Default::default()
        };
        let merger = HybridMerger::new(&detector, Some(&lexicon), options);
        let text = "Eerst een lange zin hier. Daarna Lelystad. Dan zagen we Lelystad.";
        let found: Vec<_> = merger
            .detect(text)
            .into_iter()
            .filter(|m| m.text == "Lelystad")
            .collect();
        assert_eq!(found.len(), 2);
        for m in found {
            assert_eq!(&text[m.start..m.end], "Lelystad");
            assert_eq!(m.category, Category::Place);
        }
    }

    #[test]
    fn test_patterns_win_over_entities() {
        let detector = PatternDetector::new().unwrap();
        let text = "Mail jan@example.com nu";
        let start = text.find("jan").unwrap();
        let fixed = Fixed(vec![span("jan", start, start + 3, "PER")]);
        let merger = HybridMerger::new(&detector, Some(&fixed), HybridOptions::default());
        let found = merger.detect(text);
        assert!(found.iter().any(|m| m.category == Category::Email));
        assert!(found.iter().all(|m| m.category != Category::Person));
    }

    #[test]
    fn test_entity_filters() {
        let detector = PatternDetector::new().unwrap();
        let text = "A en Jansen\nPeters en Email, ACME";
        let fixed = Fixed(vec![
            span("A", 0, 1, "PER"),
            span("Jansen\nPeters", 5, 18, "PER"),
            span("Email", 22, 27, "PER"),
            span("ACME", 29, 33, "ORG"),
            span("bad", 30, 99, "PER"),
        ]);
        let merger = HybridMerger::new(&detector, Some(&fixed), HybridOptions::default());
        let rejected = ["A", "Jansen\nPeters", "Email", "ACME"];
        let found = merger.detect(text);
        assert!(
            found.iter().all(|m| !rejected.contains(&m.text.as_str()) && m.end <= text.len()),
            "unexpected: {:?}",
            found
        );
    }

    #[test]
    fn test_include_org() {
        let detector = PatternDetector::new().unwrap();
        let text = "Werkt bij Acme Logistics";
        let start = text.find("Acme").unwrap();
        let fixed = Fixed(vec![span("Acme Logistics", start, text.len(), "ORG")]);

        let merger = HybridMerger::new(&detector, Some(&fixed), HybridOptions::default());
        assert!(merger.detect(text).iter().all(|m| m.category != Category::Org));

        let options = HybridOptions {
            include_org: true,
            ..Default::default()
        };
        let merger = HybridMerger::new(&detector, Some(&fixed), options);
        assert!(merger.detect(text).iter().any(|m| m.category == Category::Org));
    }

    #[test]
    fn test_failing_recognizer_degrades() {
        let detector = PatternDetector::new().unwrap();
        let merger = HybridMerger::new(&detector, Some(&Failing), HybridOptions::default());
        let found = merger.detect("Bel 052/26.08.60 of ga naar Amsterdam");
        assert!(found.iter().any(|m| m.category == Category::Phone));
        // Full pattern set includes known places
        assert!(found.iter().any(|m| m.text == "Amsterdam"));
    }

    #[test]
    fn test_no_recognizer_uses_full_patterns() {
        let detector = PatternDetector::new().unwrap();
        let merger = HybridMerger::new(&detector, None, HybridOptions::default());
        let text = "Verhoor van VAN LOOVEREN Thomas";
        assert!(merger.detect(text).iter().any(|m| m.category == Category::Person));
    }

    #[test]
    fn test_results_sorted_by_start() {
        let detector = PatternDetector::new().unwrap();
        let lexicon = LexiconRecognizer::new([("Jan Peeters", "PER")]).unwrap();
        let merger = HybridMerger::new(&detector, Some(&lexicon), HybridOptions::default());
        let found = merger.detect("Jan Peeters: jan@example.com, 0489 66 70 88");
        let starts: Vec<usize> = found.iter().map(|m| m.start).collect();
        let mut sorted = starts.clone();
        sorted.sort_unstable();
        assert_eq!(starts, sorted);
        assert!(found.iter().any(|m| m.text == "Jan Peeters"));
    }
}
