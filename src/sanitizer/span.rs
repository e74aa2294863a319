// Copyright 2025
// SPDX-License-Identifier: Apache-2.0
//
// Detected spans and offset helpers

use serde::{Deserialize, Serialize};

use super::config::Category;

/// A detected candidate span.
///
/// Offsets are byte offsets into the text the detector was given, half-open
/// (`start..end`), and always fall on char boundaries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpanMatch {
    pub text: String,
    pub start: usize,
    pub end: usize,
    pub category: Category,
    pub confidence: f32,
    /// Surrounding text, for debugging only
    #[serde(default)]
    pub context: String,
}

impl SpanMatch {
    /// Build a match for `text[start..end]` with a context window around it
    pub fn from_text(
        text: &str,
        start: usize,
        end: usize,
        category: Category,
        confidence: f32,
        before: usize,
        after: usize,
    ) -> Self {
        Self {
            text: text[start..end].to_string(),
            start,
            end,
            category,
            confidence,
            context: context_window(text, start, end, before, after).to_string(),
        }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Half-open interval overlap
    pub fn overlaps(&self, start: usize, end: usize) -> bool {
        !(self.end <= start || self.start >= end)
    }

    /// Offsets counted in chars of `text`, for callers that index by code point
    pub fn char_range(&self, text: &str) -> (usize, usize) {
        let start = text[..floor_boundary(text, self.start)].chars().count();
        let end = text[..floor_boundary(text, self.end)].chars().count();
        (start, end)
    }
}

/// Largest char boundary `<= index`
pub fn floor_boundary(text: &str, index: usize) -> usize {
    if index >= text.len() {
        return text.len();
    }
    let mut i = index;
    while !text.is_char_boundary(i) {
        i -= 1;
    }
    i
}

/// Smallest char boundary `>= index`
pub fn ceil_boundary(text: &str, index: usize) -> usize {
    if index >= text.len() {
        return text.len();
    }
    let mut i = index;
    while !text.is_char_boundary(i) {
        i += 1;
    }
    i
}

/// `before` bytes ahead of `start` and `after` bytes past `end`, snapped to char boundaries
pub fn context_window(text: &str, start: usize, end: usize, before: usize, after: usize) -> &str {
    let from = floor_boundary(text, start.saturating_sub(before));
    let to = ceil_boundary(text, end.saturating_add(after));
    &text[from..to]
}

/// Lowercased text in the `window` bytes before `start`
pub fn lookbehind(text: &str, start: usize, window: usize) -> String {
    let from = ceil_boundary(text, start.saturating_sub(window));
    text[from..start].to_lowercase()
}
