// Copyright 2025
// SPDX-License-Identifier: Apache-2.0
//
// Contact data: email addresses, phone numbers, bank accounts

use super::{PatternDetector, SpanSink};
use crate::sanitizer::config::Category;
use crate::sanitizer::span::SpanMatch;

impl PatternDetector {
    pub fn detect_emails(&self, text: &str) -> Vec<SpanMatch> {
        let mut sink = SpanSink::default();
        for pattern in self.patterns.email.matching(text) {
            for m in pattern.regex.find_iter(text) {
                sink.push(SpanMatch::from_text(
                    text,
                    m.start(),
                    m.end(),
                    Category::Email,
                    pattern.confidence,
                    20,
                    20,
                ));
            }
        }
        sink.into_vec()
    }

    /// Regional phone formats; overlapping alternatives are all reported
    pub fn detect_phones(&self, text: &str) -> Vec<SpanMatch> {
        let mut sink = SpanSink::default();
        for pattern in self.patterns.phone.matching(text) {
            for m in pattern.regex.find_iter(text) {
                sink.push(SpanMatch::from_text(
                    text,
                    m.start(),
                    m.end(),
                    Category::Phone,
                    pattern.confidence,
                    20,
                    20,
                ));
            }
        }
        sink.into_vec()
    }

    /// IBANs; values already masked with `XX` are left alone
    pub fn detect_ibans(&self, text: &str) -> Vec<SpanMatch> {
        let mut sink = SpanSink::default();
        for pattern in self.patterns.iban.matching(text) {
            for m in pattern.regex.find_iter(text) {
                let value = m.as_str();
                if value.contains("XX") || value.contains("xx") {
                    continue;
                }
                sink.push(SpanMatch::from_text(
                    text,
                    m.start(),
                    m.end(),
                    Category::Iban,
                    pattern.confidence,
                    20,
                    20,
                ));
            }
        }
        sink.into_vec()
    }
}
