// Copyright 2025
// SPDX-License-Identifier: Apache-2.0
//
// Placeholder mapping: canonicalization, bidirectional lookup and persistence
//
// The reverse index is a cache over `entries`; it is rebuilt on load and
// never persisted.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::config::Category;
use super::error::{Result, SanitizerError};

pub const MAPPING_VERSION: &str = "1.0";

/// Highest number a placeholder can carry (`CATEGORY_9999`)
pub const MAX_PLACEHOLDER_NUMBER: u32 = 9999;

/// Name particles ignored when grouping person names
const NAME_PARTICLES: &[&str] = &["EL", "AL", "VAN", "DE", "DER", "DEN", "TEN", "TER", "LA", "LE"];

/// Surface forms longer than this are cut in statistics examples
const EXAMPLE_MAX_CHARS: usize = 30;
const EXAMPLES_PER_CATEGORY: usize = 3;

/// Per-category grouping keys.
///
/// Keys are only used for lookup; the display value is always the first
/// surface form seen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Normalizer {
    /// Prefix for bare 10-digit national numbers, e.g. "+32". This is a
    /// deployment guess: a Dutch 06 number would get the wrong prefix.
    phone_country_code: Option<String>,
}

impl Normalizer {
    pub fn new(phone_country_code: Option<String>) -> Self {
        Self { phone_country_code }
    }

    pub fn phone_country_code(&self) -> Option<&str> {
        self.phone_country_code.as_deref()
    }

    pub fn normalize(&self, value: &str, category: Category) -> String {
        match category {
            Category::Person => normalize_person(value),
            Category::Phone => self.normalize_phone(value),
            Category::Iban => normalize_iban(value),
            _ => value.to_uppercase().trim().to_string(),
        }
    }

    /// Digits with an optional leading '+'; "00" becomes "+"
    pub fn normalize_phone(&self, value: &str) -> String {
        let mut digits = String::with_capacity(value.len());
        for c in value.chars() {
            if c.is_ascii_digit() || (c == '+' && digits.is_empty()) {
                digits.push(c);
            }
        }

        if let Some(rest) = digits.strip_prefix("00") {
            return format!("+{}", rest);
        }
        if let Some(code) = &self.phone_country_code {
            if digits.len() == 10 && digits.starts_with('0') {
                return format!("{}{}", code, &digits[1..]);
            }
        }
        digits
    }
}

/// "El Mansouri Brahim" and "EL MANSOURI Brahim" both become "BRAHIM|MANSOURI"
pub fn normalize_person(value: &str) -> String {
    let upper = value.to_uppercase();
    let mut parts: Vec<&str> = upper
        .split_whitespace()
        .filter(|p| !NAME_PARTICLES.contains(p))
        .collect();
    parts.sort_unstable();
    parts.join("|")
}

pub fn normalize_iban(value: &str) -> String {
    value
        .to_uppercase()
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect()
}

/// Split "PERSON_012" into its category and number
pub fn parse_placeholder(placeholder: &str) -> Option<(Category, u32)> {
    let (prefix, number) = placeholder.rsplit_once('_')?;
    if !(3..=4).contains(&number.len()) || !number.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let category = prefix.parse::<Category>().ok()?;
    let number = number.parse::<u32>().ok()?;
    Some((category, number))
}

/// One placeholder and every surface form it stands for
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MappingEntry {
    #[serde(skip)]
    pub placeholder: String,
    /// First surface form seen; decode restores this one
    pub canonical: String,
    pub variations: BTreeSet<String>,
    pub occurrences: u32,
}

impl MappingEntry {
    pub fn category(&self) -> Option<Category> {
        parse_placeholder(&self.placeholder).map(|(category, _)| category)
    }
}

#[derive(Deserialize)]
struct StoredEntry {
    canonical: String,
    variations: Option<Vec<String>>,
    occurrences: Option<u32>,
}

#[derive(Deserialize)]
struct StoredMapping {
    version: Option<String>,
    created: Option<String>,
    mappings: BTreeMap<String, StoredEntry>,
}

#[derive(Serialize)]
struct MappingDocument<'a> {
    version: &'a str,
    created: &'a str,
    statistics: &'a BTreeMap<Category, u32>,
    mappings: &'a BTreeMap<String, MappingEntry>,
}

/// Per-category totals
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CategoryStatistics {
    pub unique: usize,
    pub occurrences: u64,
    /// Up to three "PLACEHOLDER → value" samples
    pub examples: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MappingStatistics {
    pub total_unique_values: usize,
    pub total_occurrences: u64,
    pub by_category: BTreeMap<Category, CategoryStatistics>,
}

/// Bidirectional placeholder table owned by one encode or decode session
#[derive(Debug, Clone)]
pub struct Mapping {
    entries: BTreeMap<String, MappingEntry>,
    reverse: HashMap<(Category, String), String>,
    counters: BTreeMap<Category, u32>,
    normalizer: Normalizer,
    version: String,
    created: String,
}

impl Default for Mapping {
    fn default() -> Self {
        Self::new()
    }
}

impl Mapping {
    pub fn new() -> Self {
        Self::with_normalizer(Normalizer::default())
    }

    pub fn with_normalizer(normalizer: Normalizer) -> Self {
        Self {
            entries: BTreeMap::new(),
            reverse: HashMap::new(),
            counters: BTreeMap::new(),
            normalizer,
            version: MAPPING_VERSION.to_string(),
            created: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Reuse the placeholder of an equivalent value, or mint the next one.
    ///
    /// Fails once a category has used every number up to `CATEGORY_9999`.
    pub fn get_or_create_placeholder(
        &mut self,
        value: &str,
        category: Category,
    ) -> Result<String> {
        let key = (category, self.normalizer.normalize(value, category));

        if let Some(placeholder) = self.reverse.get(&key) {
            if let Some(entry) = self.entries.get_mut(placeholder) {
                entry.variations.insert(value.to_string());
                entry.occurrences += 1;
                return Ok(placeholder.clone());
            }
        }

        let counter = self.counters.entry(category).or_insert(0);
        if *counter >= MAX_PLACEHOLDER_NUMBER {
            return Err(SanitizerError::PlaceholdersExhausted(category));
        }
        *counter += 1;
        let placeholder = format!("{}_{:03}", category.as_str(), *counter);
        debug!(placeholder = %placeholder, "new placeholder");

        self.entries.insert(
            placeholder.clone(),
            MappingEntry {
                placeholder: placeholder.clone(),
                canonical: value.to_string(),
                variations: BTreeSet::from([value.to_string()]),
                occurrences: 1,
            },
        );
        self.reverse.insert(key, placeholder.clone());
        Ok(placeholder)
    }

    /// Canonical value for a placeholder
    pub fn get_original(&self, placeholder: &str) -> Option<&str> {
        self.entries.get(placeholder).map(|e| e.canonical.as_str())
    }

    pub fn entry(&self, placeholder: &str) -> Option<&MappingEntry> {
        self.entries.get(placeholder)
    }

    /// Entries in placeholder order
    pub fn entries(&self) -> impl Iterator<Item = &MappingEntry> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Highest number issued per category
    pub fn counters(&self) -> &BTreeMap<Category, u32> {
        &self.counters
    }

    pub fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn created(&self) -> &str {
        &self.created
    }

    pub fn statistics(&self) -> MappingStatistics {
        let mut stats = MappingStatistics {
            total_unique_values: self.entries.len(),
            ..Default::default()
        };

        for (placeholder, entry) in &self.entries {
            stats.total_occurrences += u64::from(entry.occurrences);
            let Some((category, _)) = parse_placeholder(placeholder) else {
                continue;
            };
            let slot = stats.by_category.entry(category).or_default();
            slot.unique += 1;
            slot.occurrences += u64::from(entry.occurrences);
            if slot.examples.len() < EXAMPLES_PER_CATEGORY {
                slot.examples.push(format_example(placeholder, &entry.canonical));
            }
        }

        stats
    }

    pub fn to_json(&self) -> Result<String> {
        let document = MappingDocument {
            version: &self.version,
            created: &self.created,
            statistics: &self.counters,
            mappings: &self.entries,
        };
        Ok(serde_json::to_string_pretty(&document)?)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        fs::write(path, self.to_json()?)?;
        info!(
            path = %path.display(),
            entries = self.entries.len(),
            "mapping saved"
        );
        Ok(())
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Self::from_json_with(json, Normalizer::default())
    }

    /// Parse a persisted mapping, rebuilding the reverse index and counters.
    ///
    /// A missing `mappings` object, a missing canonical value or a malformed
    /// placeholder fails the whole load.
    pub fn from_json_with(json: &str, normalizer: Normalizer) -> Result<Self> {
        let stored: StoredMapping =
            serde_json::from_str(json).map_err(|e| SanitizerError::MappingFormat(e.to_string()))?;

        let mut mapping = Self::with_normalizer(normalizer);
        mapping.version = stored.version.unwrap_or_else(|| MAPPING_VERSION.to_string());
        mapping.created = stored.created.unwrap_or_default();

        for (placeholder, raw) in stored.mappings {
            let (category, number) = parse_placeholder(&placeholder).ok_or_else(|| {
                SanitizerError::MappingFormat(format!("invalid placeholder '{}'", placeholder))
            })?;

            let mut variations: BTreeSet<String> =
                raw.variations.unwrap_or_default().into_iter().collect();
            variations.insert(raw.canonical.clone());
            let key = (category, mapping.normalizer.normalize(&raw.canonical, category));
            mapping.reverse.insert(key, placeholder.clone());

            let counter = mapping.counters.entry(category).or_insert(0);
            *counter = (*counter).max(number);

            mapping.entries.insert(
                placeholder.clone(),
                MappingEntry {
                    placeholder,
                    canonical: raw.canonical,
                    variations,
                    occurrences: raw.occurrences.unwrap_or(1),
                },
            );
        }

        Ok(mapping)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Self::load_with(path, Normalizer::default())
    }

    pub fn load_with(path: impl AsRef<Path>, normalizer: Normalizer) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)?;
        let mapping = Self::from_json_with(&json, normalizer)?;
        info!(
            path = %path.display(),
            entries = mapping.entries.len(),
            "mapping loaded"
        );
        Ok(mapping)
    }
}

impl fmt::Display for Mapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let counts: Vec<String> = self
            .counters
            .iter()
            .map(|(category, count)| format!("{}: {}", category, count))
            .collect();
        write!(
            f,
            "Mapping({} entries: {{{}}})",
            self.entries.len(),
            counts.join(", ")
        )
    }
}

fn format_example(placeholder: &str, canonical: &str) -> String {
    if canonical.chars().count() > EXAMPLE_MAX_CHARS {
        let cut: String = canonical.chars().take(EXAMPLE_MAX_CHARS).collect();
        format!("{} → {}...", placeholder, cut)
    } else {
        format!("{} → {}", placeholder, canonical)
    }
}
