// Copyright 2025
// SPDX-License-Identifier: Apache-2.0
//
// Encode pipeline: preprocess, detect, filter, resolve, rewrite
//
// Placeholders are assigned in document order; the rewrite runs back to
// front so earlier offsets stay valid.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, info};

use super::config::{Backend, SanitizerConfig};
use super::detector::PatternDetector;
use super::entity::EntityRecognizer;
use super::error::{Result, SanitizerError};
use super::hybrid::{HybridMerger, HybridOptions};
use super::mapping::{parse_placeholder, Mapping, Normalizer};
use super::masking::{AnonymizedValue, Strategy};
use super::patterns::compile_whitelist;
use super::resolver::resolve;
use super::span::SpanMatch;

/// A name particle at the end of a line, its surname on the next
static WRAPPED_PARTICLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(EL|VAN|DE|DER|DEN|TEN|TER|LA|LE)\n([A-Z][A-Za-z]+)")
        .expect("wrapped particle pattern is valid")
});

const LEGEND_RULE_WIDTH: usize = 60;

/// Rejoin "EL\nMANSOURI" into "EL MANSOURI" so name patterns see one line
pub fn preprocess(text: &str) -> Cow<'_, str> {
    WRAPPED_PARTICLE.replace_all(text, "$1 $2")
}

/// Values that already carry masking marks are left alone
fn is_already_masked(value: &str) -> bool {
    value.contains("XX") || value.contains("xx") || value.contains("***")
}

/// Output of one encode run
#[derive(Debug, Clone)]
pub struct Encoded {
    pub text: String,
    pub mapping: Mapping,
    /// One entry per replaced span, in document order
    pub values: Vec<AnonymizedValue>,
    encryption_key: Option<String>,
}

impl Encoded {
    /// Base64 session key when the encrypt strategy was used
    pub fn encryption_key(&self) -> Option<&str> {
        self.encryption_key.as_deref()
    }

    pub fn into_parts(self) -> (String, Mapping) {
        (self.text, self.mapping)
    }
}

/// Configured detection and anonymization pipeline.
///
/// Holds the compiled detector, the optional entity recognizer and the
/// strategy, so one instance serves many documents. The encrypt strategy
/// keeps its key for the lifetime of the instance.
pub struct Sanitizer {
    config: SanitizerConfig,
    detector: PatternDetector,
    recognizer: Option<Arc<dyn EntityRecognizer>>,
    strategy: Strategy,
    whitelist: Vec<Regex>,
}

impl Sanitizer {
    pub fn new(config: SanitizerConfig) -> Result<Self> {
        config.validate()?;
        let detector = PatternDetector::from_config(&config)?;
        let strategy = Strategy::from_config(&config)?;
        let whitelist = compile_whitelist(&config.whitelist_patterns)?;

        info!(
            backend = %config.backend,
            strategy = %config.strategy,
            language = %config.language,
            "sanitizer initialised"
        );

        Ok(Self {
            config,
            detector,
            recognizer: None,
            strategy,
            whitelist,
        })
    }

    /// Attach an entity recognizer for the hybrid, entity and auto backends
    pub fn with_recognizer(mut self, recognizer: Arc<dyn EntityRecognizer>) -> Self {
        self.recognizer = Some(recognizer);
        self
    }

    pub fn config(&self) -> &SanitizerConfig {
        &self.config
    }

    pub fn strategy(&self) -> &Strategy {
        &self.strategy
    }

    pub fn detector(&self) -> &PatternDetector {
        &self.detector
    }

    fn merger(&self) -> HybridMerger<'_> {
        HybridMerger::new(
            &self.detector,
            self.recognizer.as_deref(),
            HybridOptions::from_config(&self.config),
        )
    }

    /// Whether `backend` can run without degrading
    pub fn backend_available(&self, backend: Backend) -> bool {
        match backend {
            Backend::Patterns | Backend::Auto => true,
            Backend::Hybrid | Backend::Entity => self.merger().available_recognizer().is_some(),
        }
    }

    /// Backend the configuration resolves to for this instance
    pub fn effective_backend(&self) -> Backend {
        match self.config.backend {
            Backend::Auto if self.backend_available(Backend::Hybrid) => Backend::Hybrid,
            Backend::Auto => Backend::Patterns,
            other => other,
        }
    }

    fn run_backend(&self, text: &str) -> Result<Vec<SpanMatch>> {
        let merger = self.merger();
        match self.effective_backend() {
            Backend::Patterns => Ok(self.detector.detect_all(text)),
            Backend::Entity => {
                let recognizer = merger
                    .available_recognizer()
                    .ok_or(SanitizerError::BackendUnavailable(Backend::Entity))?;
                merger.detect_entities(text, recognizer)
            }
            Backend::Hybrid | Backend::Auto => Ok(merger.detect(text)),
        }
    }

    /// Resolved, filtered matches for `text` as given (no preprocessing)
    pub fn detect(&self, text: &str) -> Result<Vec<SpanMatch>> {
        if text.is_empty() {
            return Ok(Vec::new());
        }

        let candidates = self.run_backend(text)?;
        let found = candidates.len();

        // A whitelisted value stays verbatim, so nothing inside it may be
        // rewritten either
        let protected: Vec<(usize, usize)> = candidates
            .iter()
            .filter(|m| self.whitelist.iter().any(|w| w.is_match(&m.text)))
            .map(|m| (m.start, m.end))
            .collect();

        let kept: Vec<SpanMatch> = candidates
            .into_iter()
            .filter(|m| self.config.detects(m.category))
            .filter(|m| !(self.config.skip_already_masked && is_already_masked(&m.text)))
            .filter(|m| !protected.iter().any(|&(start, end)| m.overlaps(start, end)))
            .collect();
        let filtered = found - kept.len();

        let resolved = resolve(kept);
        debug!(
            candidates = found,
            filtered,
            resolved = resolved.len(),
            "detection finished"
        );

        if self.config.log_detections {
            for m in &resolved {
                debug!(
                    category = %m.category,
                    start = m.start,
                    end = m.end,
                    confidence = m.confidence,
                    "detected"
                );
            }
        }

        Ok(resolved)
    }

    /// Encode with a fresh mapping
    pub fn encode(&self, text: &str) -> Result<Encoded> {
        let mapping = Mapping::with_normalizer(Normalizer::new(
            self.config.phone_country_code.clone(),
        ));
        self.encode_with_mapping(text, mapping)
    }

    /// Encode continuing an existing mapping, so a batch of documents shares
    /// one placeholder space
    pub fn encode_with_mapping(&self, text: &str, mut mapping: Mapping) -> Result<Encoded> {
        let text = preprocess(text);
        let matches = self.detect(&text)?;

        let mut values = Vec::with_capacity(matches.len());
        for m in &matches {
            let placeholder = mapping.get_or_create_placeholder(&m.text, m.category)?;
            values.push(self.strategy.anonymize(&m.text, m.category, &placeholder)?);
        }

        let mut output = text.into_owned();
        for (m, value) in matches.iter().zip(values.iter()).rev() {
            output.replace_range(m.start..m.end, &value.anonymized);
        }

        info!(
            replaced = values.len(),
            placeholders = mapping.len(),
            strategy = %self.strategy.kind(),
            "document encoded"
        );

        Ok(Encoded {
            text: output,
            mapping,
            values,
            encryption_key: self.strategy.encryption_key(),
        })
    }

    /// Encode and prepend the placeholder legend
    pub fn encode_with_legend(&self, text: &str) -> Result<Encoded> {
        let mut encoded = self.encode(text)?;
        encoded.text = format!("{}{}", generate_legend(&encoded.mapping), encoded.text);
        Ok(encoded)
    }
}

/// Human-readable key to the placeholder categories present in `mapping`
pub fn generate_legend(mapping: &Mapping) -> String {
    let mut counts: BTreeMap<&'static str, (usize, &'static str)> = BTreeMap::new();
    for entry in mapping.entries() {
        if let Some((category, _)) = parse_placeholder(&entry.placeholder) {
            counts
                .entry(category.as_str())
                .or_insert((0, category.description()))
                .0 += 1;
        }
    }

    let rule = "=".repeat(LEGEND_RULE_WIDTH);
    let mut lines = vec![
        rule.clone(),
        "DOCUMENT LEGEND - PLACEHOLDER KEY".to_string(),
        rule.clone(),
        String::new(),
        "This document has been sanitized. Sensitive data has been".to_string(),
        "replaced with placeholders. Each placeholder follows the".to_string(),
        "format CATEGORY_NNN (e.g., PERSON_001, PLACE_002).".to_string(),
        String::new(),
        "PLACEHOLDER CATEGORIES:".to_string(),
        String::new(),
    ];

    for (name, (count, description)) in counts {
        lines.push(format!("  {}_NNN : {} ({} unique)", name, description, count));
    }

    lines.extend([
        String::new(),
        "IMPORTANT: Different numbers = different entities.".to_string(),
        "  PERSON_001 and PERSON_002 are two different people.".to_string(),
        "  PLACE_001 appearing twice means the SAME location.".to_string(),
        String::new(),
        rule,
        String::new(),
    ]);

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sanitizer::config::{Category, StrategyKind};
    use crate::sanitizer::entity::LexiconRecognizer;

    fn patterns_config() -> SanitizerConfig {
        SanitizerConfig {
            backend: Backend::Patterns,
            ..Default::default()
        }
    }

    #[test]
    fn test_preprocess_joins_wrapped_particle() {
        assert_eq!(preprocess("Verhoor EL\nMANSOURI Brahim"), "Verhoor EL MANSOURI Brahim");
        assert_eq!(preprocess("DE\ngroot"), "DE\ngroot");
        assert!(matches!(preprocess("geen wijziging"), Cow::Borrowed(_)));
    }

    #[test]
    fn test_empty_input() {
        let sanitizer = Sanitizer::new(SanitizerConfig::default()).unwrap();
        let encoded = sanitizer.encode("").unwrap();
        assert_eq!(encoded.text, "");
        assert!(encoded.mapping.is_empty());
        assert!(encoded.values.is_empty());
    }

    #[test]
    fn test_placeholders_follow_document_order() {
        let sanitizer = Sanitizer::new(patterns_config()).unwrap();
        let encoded = sanitizer
            .encode("Mail eerst a@voorbeeld.be en daarna b@voorbeeld.be")
            .unwrap();
        assert_eq!(encoded.text, "Mail eerst EMAIL_001 en daarna EMAIL_002");
        assert_eq!(encoded.mapping.get_original("EMAIL_001"), Some("a@voorbeeld.be"));
    }

    #[test]
    fn test_skip_already_masked() {
        let sanitizer = Sanitizer::new(patterns_config()).unwrap();
        let encoded = sanitizer.encode("Rekening BE71 XXXX XXXX 6769").unwrap();
        assert!(encoded.mapping.is_empty());
    }

    #[test]
    fn test_whitelist_keeps_value() {
        let config = SanitizerConfig {
            whitelist_patterns: vec![r"^info@".to_string()],
            ..patterns_config()
        };
        let sanitizer = Sanitizer::new(config).unwrap();
        let encoded = sanitizer
            .encode("Schrijf naar INFO@politie.be of jan@example.com")
            .unwrap();
        assert!(encoded.text.contains("INFO@politie.be"));
        assert!(encoded.text.contains("EMAIL_001"));
    }

    #[test]
    fn test_whitelist_protects_nested_spans() {
        let config = SanitizerConfig {
            whitelist_patterns: vec![r"@stad\.be$".to_string()],
            ..patterns_config()
        };
        let sanitizer = Sanitizer::new(config).unwrap();
        let text = "Schrijf naar Gent@stad.be voor info";

        // The gazetteer alone would rewrite the city inside the address
        assert!(sanitizer
            .detector()
            .detect_all(text)
            .iter()
            .any(|m| m.category == Category::Place && m.text == "Gent"));

        let encoded = sanitizer.encode(text).unwrap();
        assert_eq!(encoded.text, text);
        assert!(encoded.mapping.is_empty());
    }

    #[test]
    fn test_redact_still_records_mapping() {
        let config = SanitizerConfig {
            strategy: StrategyKind::Redact,
            ..patterns_config()
        };
        let sanitizer = Sanitizer::new(config).unwrap();
        let encoded = sanitizer.encode("Mail jan@example.com").unwrap();
        assert_eq!(encoded.text, "Mail [EMAIL]");
        assert_eq!(encoded.mapping.get_original("EMAIL_001"), Some("jan@example.com"));
    }

    #[test]
    fn test_entity_backend_requires_recognizer() {
        let config = SanitizerConfig {
            backend: Backend::Entity,
            ..Default::default()
        };
        let sanitizer = Sanitizer::new(config).unwrap();
        assert!(matches!(
            sanitizer.encode("Jan woont in Gent"),
            Err(SanitizerError::BackendUnavailable(Backend::Entity))
        ));
    }

    #[test]
    fn test_entity_backend_with_lexicon() {
        let config = SanitizerConfig {
            backend: Backend::Entity,
            ..Default::default()
        };
        let lexicon = LexiconRecognizer::new([("Jan Peeters", "PER"), ("Gent", "LOC")]).unwrap();
        let sanitizer = Sanitizer::new(config).unwrap().with_recognizer(Arc::new(lexicon));
        let encoded = sanitizer
            .encode("Jan Peeters woont in Gent, mail jan@example.com")
            .unwrap();
        assert_eq!(
            encoded.text,
            "PERSON_001 woont in PLACE_001, mail jan@example.com"
        );
    }

    #[test]
    fn test_auto_backend_resolution() {
        let config = SanitizerConfig {
            backend: Backend::Auto,
            ..Default::default()
        };
        let sanitizer = Sanitizer::new(config.clone()).unwrap();
        assert_eq!(sanitizer.effective_backend(), Backend::Patterns);

        let lexicon = LexiconRecognizer::new([("Gent", "LOC")]).unwrap();
        let sanitizer = Sanitizer::new(config).unwrap().with_recognizer(Arc::new(lexicon));
        assert_eq!(sanitizer.effective_backend(), Backend::Hybrid);
    }

    #[test]
    fn test_disabled_category_not_replaced() {
        let config = SanitizerConfig {
            detect_email: false,
            ..patterns_config()
        };
        let sanitizer = Sanitizer::new(config).unwrap();
        let encoded = sanitizer.encode("Mail jan@example.com").unwrap();
        assert_eq!(encoded.text, "Mail jan@example.com");
    }

    #[test]
    fn test_legend_lists_categories() {
        let mut mapping = Mapping::new();
        mapping.get_or_create_placeholder("Jan", Category::Person).unwrap();
        mapping.get_or_create_placeholder("Piet", Category::Person).unwrap();
        mapping.get_or_create_placeholder("Gent", Category::Place).unwrap();

        let legend = generate_legend(&mapping);
        assert!(legend.starts_with(&"=".repeat(60)));
        assert!(legend.contains("DOCUMENT LEGEND - PLACEHOLDER KEY"));
        assert!(legend.contains("  PERSON_NNN : Person names (individuals) (2 unique)"));
        assert!(legend.contains("  PLACE_NNN : Locations (cities, towns, regions) (1 unique)"));
        assert!(legend.contains("Different numbers = different entities."));
        assert!(legend.ends_with('\n'));

        let person = legend.find("PERSON_NNN").unwrap();
        let place = legend.find("PLACE_NNN").unwrap();
        assert!(person < place);
    }

    #[test]
    fn test_invalid_whitelist_fails_fast() {
        let config = SanitizerConfig {
            whitelist_patterns: vec!["(".to_string()],
            ..Default::default()
        };
        assert!(matches!(
            Sanitizer::new(config),
            Err(SanitizerError::Pattern { .. })
        ));
    }
}
