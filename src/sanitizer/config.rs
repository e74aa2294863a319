// Copyright 2025
// SPDX-License-Identifier: Apache-2.0
//
// Configuration types for the document sanitizer

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::error::{Result, SanitizerError};

/// Sensitive-data categories. The string form doubles as the placeholder prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Category {
    Person,
    Phone,
    Email,
    Iban,
    Id,
    Dob,
    Address,
    Street,
    Road,
    Place,
    Vehicle,
    Org,
    Misc,
}

impl Category {
    pub const ALL: [Category; 13] = [
        Category::Person,
        Category::Phone,
        Category::Email,
        Category::Iban,
        Category::Id,
        Category::Dob,
        Category::Address,
        Category::Street,
        Category::Road,
        Category::Place,
        Category::Vehicle,
        Category::Org,
        Category::Misc,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Person => "PERSON",
            Category::Phone => "PHONE",
            Category::Email => "EMAIL",
            Category::Iban => "IBAN",
            Category::Id => "ID",
            Category::Dob => "DOB",
            Category::Address => "ADDRESS",
            Category::Street => "STREET",
            Category::Road => "ROAD",
            Category::Place => "PLACE",
            Category::Vehicle => "VEHICLE",
            Category::Org => "ORG",
            Category::Misc => "MISC",
        }
    }

    /// Human-readable description used in the legend header
    pub fn description(&self) -> &'static str {
        match self {
            Category::Person => "Person names (individuals)",
            Category::Phone => "Phone numbers",
            Category::Email => "Email addresses",
            Category::Iban => "Bank account numbers",
            Category::Id => "National ID numbers (BSN, etc.)",
            Category::Dob => "Dates of birth",
            Category::Address => "Full addresses",
            Category::Street => "Street names",
            Category::Road => "Road/highway numbers (N-roads, A-roads, E-roads)",
            Category::Place => "Locations (cities, towns, regions)",
            Category::Vehicle => "Vehicle brands and models (cars, vans, trucks)",
            Category::Org => "Organizations",
            Category::Misc => "Other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = SanitizerError;

    fn from_str(s: &str) -> Result<Self> {
        Category::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| SanitizerError::UnknownCategory(s.to_string()))
    }
}

/// Document languages understood by entity providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Nl,
    En,
    De,
    Fr,
    It,
    Es,
}

impl Language {
    pub const ALL: [Language; 6] = [
        Language::Nl,
        Language::En,
        Language::De,
        Language::Fr,
        Language::It,
        Language::Es,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            Language::Nl => "nl",
            Language::En => "en",
            Language::De => "de",
            Language::Fr => "fr",
            Language::It => "it",
            Language::Es => "es",
        }
    }

    /// Stable slot index, used by per-language caches
    pub fn index(&self) -> usize {
        match self {
            Language::Nl => 0,
            Language::En => 1,
            Language::De => 2,
            Language::Fr => 3,
            Language::It => 4,
            Language::Es => 5,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = SanitizerError;

    fn from_str(s: &str) -> Result<Self> {
        let lang = match s.trim().to_lowercase().as_str() {
            "nl" | "dutch" | "nederlands" | "flemish" | "vlaams" => Language::Nl,
            "en" | "english" | "engels" => Language::En,
            "de" | "german" | "deutsch" | "duits" => Language::De,
            "fr" | "french" | "français" | "frans" => Language::Fr,
            "it" | "italian" | "italiano" | "italiaans" => Language::It,
            "es" | "spanish" | "español" | "spaans" => Language::Es,
            _ => return Err(SanitizerError::UnsupportedLanguage(s.to_string())),
        };
        Ok(lang)
    }
}

/// Detection backend selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Structured patterns plus the entity provider (falls back to patterns)
    #[default]
    Hybrid,
    /// Full regex pattern set, no entity provider
    Patterns,
    /// Entity provider only; a hard error when no provider is available
    Entity,
    /// Best available: hybrid when a provider is present, else patterns
    Auto,
}

impl Backend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Backend::Hybrid => "hybrid",
            Backend::Patterns => "patterns",
            Backend::Entity => "entity",
            Backend::Auto => "auto",
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Backend {
    type Err = SanitizerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "hybrid" => Ok(Backend::Hybrid),
            "patterns" => Ok(Backend::Patterns),
            "entity" | "ner" => Ok(Backend::Entity),
            "auto" => Ok(Backend::Auto),
            _ => Err(SanitizerError::UnknownBackend(s.to_string())),
        }
    }
}

/// Anonymization strategies for detected values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    #[default]
    Replace, // PERSON_001, reversible through the mapping
    Redact,  // [PERSON] or a fixed marker
    Mask,    // j**@e******.com
    Hash,    // salted digest
    Encrypt, // AEAD token, reversible with the session key
}

impl StrategyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyKind::Replace => "replace",
            StrategyKind::Redact => "redact",
            StrategyKind::Mask => "mask",
            StrategyKind::Hash => "hash",
            StrategyKind::Encrypt => "encrypt",
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StrategyKind {
    type Err = SanitizerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "replace" => Ok(StrategyKind::Replace),
            "redact" => Ok(StrategyKind::Redact),
            "mask" => Ok(StrategyKind::Mask),
            "hash" => Ok(StrategyKind::Hash),
            "encrypt" => Ok(StrategyKind::Encrypt),
            _ => Err(SanitizerError::UnknownStrategy(s.to_string())),
        }
    }
}

/// Digest used by the hash strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    #[default]
    Sha256,
    Sha512,
}

/// Configuration for the sanitizer
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SanitizerConfig {
    // Detection flags
    pub detect_person: bool,
    pub detect_phone: bool,
    pub detect_email: bool,
    pub detect_iban: bool,
    pub detect_id: bool,
    pub detect_dob: bool,
    pub detect_address: bool,
    pub detect_street: bool,
    pub detect_place: bool,
    pub detect_road: bool,
    pub detect_vehicle: bool,

    // Pipeline selection
    pub backend: Backend,
    pub strategy: StrategyKind,
    pub language: Language,
    pub include_org: bool,
    pub include_misc: bool,
    pub skip_already_masked: bool,
    /// Max bytes handed to the entity provider per call
    pub chunk_size: usize,

    /// Country code assumed for bare 10-digit national numbers ("+32").
    /// Heuristic: leave unset unless every document comes from one country.
    pub phone_country_code: Option<String>,

    // Redact strategy
    pub redaction_text: String,
    pub redact_include_category: bool,

    // Mask strategy
    pub mask_char: char,
    pub mask_keep_start: usize,
    pub mask_keep_end: usize,

    // Hash strategy
    pub hash_algorithm: HashAlgorithm,
    pub hash_truncate: Option<usize>,
    pub hash_salt: String,

    /// Base64 32-byte key for the encrypt strategy; generated per session if unset
    pub encryption_key: Option<String>,

    // Behavior
    pub log_detections: bool,

    /// Regexes for values that must never be replaced
    pub whitelist_patterns: Vec<String>,
}

impl Default for SanitizerConfig {
    fn default() -> Self {
        Self {
            detect_person: true,
            detect_phone: true,
            detect_email: true,
            detect_iban: true,
            detect_id: true,
            detect_dob: true,
            detect_address: true,
            detect_street: true,
            detect_place: true,
            detect_road: true,
            detect_vehicle: true,

            backend: Backend::Hybrid,
            strategy: StrategyKind::Replace,
            language: Language::Nl,
            include_org: false,
            include_misc: false,
            skip_already_masked: true,
            chunk_size: 500_000,

            phone_country_code: None,

            redaction_text: "[REDACTED]".to_string(),
            redact_include_category: true,

            mask_char: '*',
            mask_keep_start: 1,
            mask_keep_end: 2,

            hash_algorithm: HashAlgorithm::Sha256,
            hash_truncate: Some(16),
            hash_salt: String::new(),

            encryption_key: None,

            log_detections: true,

            whitelist_patterns: Vec::new(),
        }
    }
}

impl SanitizerConfig {
    /// Parse a JSON configuration document; missing keys keep their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| SanitizerError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges and key formats before any text is processed
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(SanitizerError::InvalidConfig(
                "chunk_size must be greater than zero".to_string(),
            ));
        }

        if let Some(code) = &self.phone_country_code {
            let digits = code.strip_prefix('+').unwrap_or("");
            if digits.is_empty() || digits.len() > 3 || !digits.chars().all(|c| c.is_ascii_digit())
            {
                return Err(SanitizerError::InvalidConfig(format!(
                    "phone_country_code must look like '+32', got '{}'",
                    code
                )));
            }
        }

        if self.hash_truncate == Some(0) {
            return Err(SanitizerError::InvalidConfig(
                "hash_truncate must be greater than zero".to_string(),
            ));
        }

        if let Some(key) = &self.encryption_key {
            let bytes = BASE64
                .decode(key)
                .map_err(|e| SanitizerError::InvalidConfig(format!("encryption_key: {}", e)))?;
            if bytes.len() != 32 {
                return Err(SanitizerError::InvalidConfig(format!(
                    "encryption_key must decode to 32 bytes, got {}",
                    bytes.len()
                )));
            }
        }

        Ok(())
    }

    /// Whether the pattern layer should run detectors for this category
    pub fn detects(&self, category: Category) -> bool {
        match category {
            Category::Person => self.detect_person,
            Category::Phone => self.detect_phone,
            Category::Email => self.detect_email,
            Category::Iban => self.detect_iban,
            Category::Id => self.detect_id,
            Category::Dob => self.detect_dob,
            Category::Address => self.detect_address,
            Category::Street => self.detect_street,
            Category::Place => self.detect_place,
            Category::Road => self.detect_road,
            Category::Vehicle => self.detect_vehicle,
            Category::Org | Category::Misc => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_as_str() {
        assert_eq!(Category::Person.as_str(), "PERSON");
        assert_eq!(Category::Iban.as_str(), "IBAN");
        assert_eq!("DOB".parse::<Category>().unwrap(), Category::Dob);
        assert!("LOCATION".parse::<Category>().is_err());
    }

    #[test]
    fn test_category_serde_matches_prefix() {
        for category in Category::ALL {
            let json = serde_json::to_string(&category).unwrap();
            assert_eq!(json, format!("\"{}\"", category.as_str()));
        }
    }

    #[test]
    fn test_default_config() {
        let config = SanitizerConfig::default();
        assert!(config.detect_person);
        assert_eq!(config.backend, Backend::Hybrid);
        assert_eq!(config.strategy, StrategyKind::Replace);
        assert_eq!(config.redaction_text, "[REDACTED]");
        assert!(config.phone_country_code.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_language_aliases() {
        assert_eq!("Vlaams".parse::<Language>().unwrap(), Language::Nl);
        assert_eq!("deutsch".parse::<Language>().unwrap(), Language::De);
        assert_eq!(" EN ".parse::<Language>().unwrap(), Language::En);
        assert!(matches!(
            "klingon".parse::<Language>(),
            Err(SanitizerError::UnsupportedLanguage(_))
        ));
    }

    #[test]
    fn test_unknown_names_fail_fast() {
        assert!(matches!(
            "spacy3".parse::<Backend>(),
            Err(SanitizerError::UnknownBackend(_))
        ));
        assert!(matches!(
            "shuffle".parse::<StrategyKind>(),
            Err(SanitizerError::UnknownStrategy(_))
        ));
    }

    #[test]
    fn test_from_json_partial() {
        let config =
            SanitizerConfig::from_json(r#"{"strategy": "mask", "language": "fr"}"#).unwrap();
        assert_eq!(config.strategy, StrategyKind::Mask);
        assert_eq!(config.language, Language::Fr);
        assert!(config.detect_email);
    }

    #[test]
    fn test_from_json_rejects_unknown_strategy() {
        let err = SanitizerConfig::from_json(r#"{"strategy": "shuffle"}"#).unwrap_err();
        assert!(matches!(err, SanitizerError::InvalidConfig(_)));
    }

    #[test]
    fn test_validate_country_code() {
        let config = SanitizerConfig {
            phone_country_code: Some("32".to_string()),
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = SanitizerConfig {
            phone_country_code: Some("+31".to_string()),
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_encryption_key_length() {
        let config = SanitizerConfig {
            encryption_key: Some(BASE64.encode([7u8; 16])),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
