// Copyright 2025
// SPDX-License-Identifier: Apache-2.0
//
// Pattern detector: regex and context-heuristic detectors per category
//
// Every `detect_*` method is a pure function of the input text. Detectors
// deduplicate their own identical spans but leave cross-detector overlaps to
// the resolver.

mod contact;
mod identity;
mod location;
mod person;

use std::collections::{BTreeSet, HashSet};

use tracing::debug;

use super::config::{Category, SanitizerConfig};
use super::error::Result;
use super::patterns::{compile_patterns, CompiledPatterns};
use super::span::SpanMatch;

pub use identity::{validate_be_national, validate_bsn, validate_dni, validate_nie};

/// Collects matches for one detector, dropping repeated `(start, end)` spans
#[derive(Debug, Default)]
pub(crate) struct SpanSink {
    seen: HashSet<(usize, usize)>,
    matches: Vec<SpanMatch>,
}

impl SpanSink {
    /// Returns false when the span was already recorded
    pub(crate) fn push(&mut self, m: SpanMatch) -> bool {
        if !self.seen.insert((m.start, m.end)) {
            return false;
        }
        self.matches.push(m);
        true
    }

    pub(crate) fn contains(&self, start: usize, end: usize) -> bool {
        self.seen.contains(&(start, end))
    }

    pub(crate) fn overlaps_any(&self, start: usize, end: usize) -> bool {
        self.seen.iter().any(|&(s, e)| !(end <= s || start >= e))
    }

    pub(crate) fn into_vec(self) -> Vec<SpanMatch> {
        self.matches
    }
}

/// Regex-driven detector over the compiled pattern tables
#[derive(Debug, Clone)]
pub struct PatternDetector {
    patterns: CompiledPatterns,
    enabled: BTreeSet<Category>,
}

impl PatternDetector {
    /// Detector with every category enabled
    pub fn new() -> Result<Self> {
        Ok(Self {
            patterns: compile_patterns()?,
            enabled: Category::ALL.iter().copied().collect(),
        })
    }

    /// Detector honouring the `detect_*` flags of a configuration
    pub fn from_config(config: &SanitizerConfig) -> Result<Self> {
        Ok(Self {
            patterns: compile_patterns()?,
            enabled: Category::ALL
                .iter()
                .copied()
                .filter(|c| config.detects(*c))
                .collect(),
        })
    }

    pub fn patterns(&self) -> &CompiledPatterns {
        &self.patterns
    }

    pub fn is_enabled(&self, category: Category) -> bool {
        self.enabled.contains(&category)
    }

    /// Full pattern set, unresolved: overlapping candidates are all returned
    pub fn detect_all(&self, text: &str) -> Vec<SpanMatch> {
        let mut all = Vec::new();
        if text.is_empty() {
            return all;
        }

        self.collect(&mut all, "email", Category::Email, || self.detect_emails(text));
        self.collect(&mut all, "iban", Category::Iban, || self.detect_ibans(text));
        self.collect(&mut all, "phone", Category::Phone, || self.detect_phones(text));
        self.collect(&mut all, "vehicle", Category::Vehicle, || self.detect_vehicles(text));
        self.collect(&mut all, "road", Category::Road, || self.detect_roads(text));
        self.collect(&mut all, "dob", Category::Dob, || self.detect_dates_of_birth(text));
        self.collect(&mut all, "address", Category::Address, || self.detect_addresses(text));
        self.collect(&mut all, "street", Category::Street, || self.detect_streets(text));
        self.collect(&mut all, "any_street", Category::Street, || self.detect_any_street(text));
        self.collect(&mut all, "context_place", Category::Place, || {
            self.detect_context_places(text)
        });
        self.collect(&mut all, "place", Category::Place, || self.detect_places(text));
        self.collect(&mut all, "national_id", Category::Id, || self.detect_national_ids(text));
        self.collect(&mut all, "context_name", Category::Person, || {
            self.detect_names_by_context(text)
        });
        self.collect(&mut all, "name", Category::Person, || self.detect_names(text));

        all
    }

    /// Structured subset run alongside an entity recognizer.
    ///
    /// Generic names and known places are left to the recognizer.
    pub fn detect_structured(&self, text: &str) -> Vec<SpanMatch> {
        let mut all = Vec::new();
        if text.is_empty() {
            return all;
        }

        self.collect(&mut all, "email", Category::Email, || self.detect_emails(text));
        self.collect(&mut all, "phone", Category::Phone, || self.detect_phones(text));
        self.collect(&mut all, "iban", Category::Iban, || self.detect_ibans(text));
        self.collect(&mut all, "dob", Category::Dob, || self.detect_dates_of_birth(text));
        self.collect(&mut all, "national_id", Category::Id, || self.detect_national_ids(text));
        self.collect(&mut all, "vehicle", Category::Vehicle, || self.detect_vehicles(text));
        self.collect(&mut all, "road", Category::Road, || self.detect_roads(text));
        self.collect(&mut all, "any_street", Category::Street, || self.detect_any_street(text));
        self.collect(&mut all, "context_place", Category::Place, || {
            self.detect_context_places(text)
        });
        self.collect(&mut all, "context_name", Category::Person, || {
            self.detect_names_by_context(text)
        });

        all
    }

    fn collect<F>(&self, out: &mut Vec<SpanMatch>, family: &'static str, category: Category, run: F)
    where
        F: FnOnce() -> Vec<SpanMatch>,
    {
        if !self.is_enabled(category) {
            return;
        }
        let found = run();
        debug!(family, count = found.len(), "pattern detector finished");
        out.extend(found);
    }
}
