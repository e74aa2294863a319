// Copyright 2025
// SPDX-License-Identifier: Apache-2.0
//
// Entity recognizer capability
//
// A recognizer turns text into generic named-entity spans. Providers can be
// absent at runtime, so callers ask `is_available` before relying on one.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use once_cell::sync::OnceCell;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::config::{Category, Language};
use super::error::{Result, SanitizerError};
use super::patterns::{alternation, compile};

/// A raw span as reported by an entity provider.
///
/// Offsets are byte offsets into the text handed to `recognize`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntitySpan {
    pub text: String,
    pub start: usize,
    pub end: usize,
    pub label: String,
    pub score: f32,
}

/// Named-entity provider
pub trait EntityRecognizer: Send + Sync {
    fn name(&self) -> &str;

    /// Whether the provider can serve `language` right now
    fn is_available(&self, language: Language) -> bool;

    fn recognize(&self, text: &str, language: Language) -> Result<Vec<EntitySpan>>;
}

/// Map provider labels (spaCy and GLiNER vocabularies) onto our categories
pub fn map_label(label: &str) -> Category {
    match label.trim().to_lowercase().as_str() {
        "per" | "person" | "name" | "first name" | "last name" => Category::Person,
        "loc" | "gpe" | "fac" | "location" | "city" | "country" | "state" | "address"
        | "street" => Category::Place,
        "org" | "organization" | "organisation" | "company" => Category::Org,
        _ => Category::Misc,
    }
}

type Loader = dyn Fn(Language) -> Option<Arc<dyn EntityRecognizer>> + Send + Sync;

/// Loads one provider per language on first use and keeps it for the process.
///
/// Warm-up runs at most once per language; later reads do not lock.
pub struct LazyRecognizer {
    name: String,
    loader: Box<Loader>,
    slots: [OnceCell<Option<Arc<dyn EntityRecognizer>>>; 6],
}

impl LazyRecognizer {
    pub fn new<F>(name: impl Into<String>, loader: F) -> Self
    where
        F: Fn(Language) -> Option<Arc<dyn EntityRecognizer>> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            loader: Box::new(loader),
            slots: Default::default(),
        }
    }

    fn get(&self, language: Language) -> Option<&Arc<dyn EntityRecognizer>> {
        self.slots[language.index()]
            .get_or_init(|| {
                let loaded = (self.loader)(language);
                info!(
                    recognizer = %self.name,
                    language = %language,
                    loaded = loaded.is_some(),
                    "entity recognizer initialised"
                );
                loaded
            })
            .as_ref()
    }

    /// Whether the provider for `language` has already been loaded
    pub fn is_warm(&self, language: Language) -> bool {
        self.slots[language.index()].get().is_some()
    }
}

impl fmt::Debug for LazyRecognizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazyRecognizer")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl EntityRecognizer for LazyRecognizer {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_available(&self, language: Language) -> bool {
        self.get(language)
            .is_some_and(|inner| inner.is_available(language))
    }

    fn recognize(&self, text: &str, language: Language) -> Result<Vec<EntitySpan>> {
        match self.get(language) {
            Some(inner) => inner.recognize(text, language),
            None => Err(SanitizerError::Recognizer {
                name: self.name.clone(),
                reason: format!("no provider for language '{}'", language),
            }),
        }
    }
}

/// Local provider that recognizes a fixed list of surface forms.
///
/// Useful for case-specific name lists and as a deterministic stand-in for a
/// statistical model. Matching is case-sensitive on word boundaries.
#[derive(Debug, Clone)]
pub struct LexiconRecognizer {
    name: String,
    regex: Option<Regex>,
    labels: HashMap<String, String>,
    languages: Vec<Language>,
}

impl LexiconRecognizer {
    /// Build from `(surface, label)` pairs
    pub fn new<S, L>(entries: impl IntoIterator<Item = (S, L)>) -> Result<Self>
    where
        S: Into<String>,
        L: Into<String>,
    {
        let labels: HashMap<String, String> = entries
            .into_iter()
            .map(|(surface, label)| (surface.into(), label.into()))
            .filter(|(surface, _)| !surface.trim().is_empty())
            .collect();

        let regex = if labels.is_empty() {
            None
        } else {
            let surfaces: Vec<&str> = labels.keys().map(String::as_str).collect();
            Some(compile(&format!(r"\b{}\b", alternation(&surfaces)))?)
        };

        Ok(Self {
            name: "lexicon".to_string(),
            regex,
            labels,
            languages: Language::ALL.to_vec(),
        })
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Restrict the languages this lexicon claims to serve
    pub fn with_languages(mut self, languages: &[Language]) -> Self {
        self.languages = languages.to_vec();
        self
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

impl EntityRecognizer for LexiconRecognizer {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_available(&self, language: Language) -> bool {
        self.languages.contains(&language)
    }

    fn recognize(&self, text: &str, _language: Language) -> Result<Vec<EntitySpan>> {
        let Some(regex) = &self.regex else {
            return Ok(Vec::new());
        };

        let spans: Vec<EntitySpan> = regex
            .find_iter(text)
            .filter_map(|m| {
                self.labels.get(m.as_str()).map(|label| EntitySpan {
                    text: m.as_str().to_string(),
                    start: m.start(),
                    end: m.end(),
                    label: label.clone(),
                    score: 1.0,
                })
            })
            .collect();

        debug!(recognizer = %self.name, count = spans.len(), "lexicon matches");
        Ok(spans)
    }
}
