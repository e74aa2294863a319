// Copyright 2025
// SPDX-License-Identifier: Apache-2.0
//
// Decode: restore placeholders from a mapping

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::Serialize;
use tracing::info;

use super::mapping::Mapping;

/// `CATEGORY_NNN` for the known categories, 3 or 4 digits
pub const PLACEHOLDER_PATTERN: &str =
    r"\b(PERSON|PHONE|EMAIL|IBAN|ID|DOB|ADDRESS|STREET|ROAD|PLACE|VEHICLE|ORG|MISC)_(\d{3,4})\b";

static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(PLACEHOLDER_PATTERN).expect("placeholder pattern is valid"));

/// Excerpt radius around the first difference, in chars
const DIFF_CONTEXT: usize = 20;

/// Replace every known placeholder with its canonical value.
///
/// Placeholders missing from the mapping stay as they are; the text may
/// legitimately contain look-alikes.
pub fn decode(text: &str, mapping: &Mapping) -> String {
    let mut restored = 0usize;
    let mut unknown = 0usize;

    let decoded = PLACEHOLDER.replace_all(text, |caps: &Captures| {
        let placeholder = &caps[0];
        match mapping.get_original(placeholder) {
            Some(original) => {
                restored += 1;
                original.to_string()
            }
            None => {
                unknown += 1;
                placeholder.to_string()
            }
        }
    });

    info!(restored, unknown, "document decoded");
    decoded.into_owned()
}

/// Every placeholder in `text` as `(category, number)`, in order
pub fn find_placeholders(text: &str) -> Vec<(String, String)> {
    PLACEHOLDER
        .captures_iter(text)
        .map(|caps| (caps[1].to_string(), caps[2].to_string()))
        .collect()
}

/// Where two texts first diverge
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FirstDifference {
    /// Char index of the first differing char
    pub position: usize,
    pub original: String,
    pub decoded: String,
}

/// Comparison of an original document with its decoded round trip
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DecodeValidation {
    pub original_length: usize,
    pub sanitized_length: usize,
    pub decoded_length: usize,
    pub lengths_match: bool,
    pub content_match: bool,
    /// Absent when one text is a prefix of the other
    pub first_diff: Option<FirstDifference>,
}

impl DecodeValidation {
    pub fn is_valid(&self) -> bool {
        self.content_match
    }
}

fn excerpt(chars: &[char], position: usize) -> String {
    let from = position.saturating_sub(DIFF_CONTEXT);
    let to = (position + DIFF_CONTEXT).min(chars.len());
    chars[from.min(to)..to].iter().collect()
}

/// Check that decoding reproduced the original. Lengths are in chars.
pub fn validate_decode(original: &str, sanitized: &str, decoded: &str) -> DecodeValidation {
    let original_chars: Vec<char> = original.chars().collect();
    let decoded_chars: Vec<char> = decoded.chars().collect();
    let content_match = original == decoded;

    let first_diff = if content_match {
        None
    } else {
        original_chars
            .iter()
            .zip(decoded_chars.iter())
            .position(|(a, b)| a != b)
            .map(|position| FirstDifference {
                position,
                original: excerpt(&original_chars, position),
                decoded: excerpt(&decoded_chars, position),
            })
    };

    DecodeValidation {
        original_length: original_chars.len(),
        sanitized_length: sanitized.chars().count(),
        decoded_length: decoded_chars.len(),
        lengths_match: original_chars.len() == decoded_chars.len(),
        content_match,
        first_diff,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sanitizer::config::Category;

    fn mapping() -> Mapping {
        let mut mapping = Mapping::new();
        mapping.get_or_create_placeholder("El Mansouri Mohand", Category::Person).unwrap();
        mapping.get_or_create_placeholder("El Mansouri Brahim", Category::Person).unwrap();
        mapping
    }

    #[test]
    fn test_decode_known_placeholders() {
        let decoded = decode("PERSON_001 is vader van PERSON_002", &mapping());
        assert_eq!(decoded, "El Mansouri Mohand is vader van El Mansouri Brahim");
    }

    #[test]
    fn test_unknown_placeholders_pass_through() {
        let decoded = decode("PERSON_009 en PLACE_001 en FOO_001", &mapping());
        assert_eq!(decoded, "PERSON_009 en PLACE_001 en FOO_001");
    }

    #[test]
    fn test_placeholder_boundaries() {
        let m = mapping();
        assert_eq!(decode("XPERSON_001", &m), "XPERSON_001");
        assert_eq!(decode("PERSON_00123", &m), "PERSON_00123");
        assert_eq!(decode("(PERSON_001).", &m), "(El Mansouri Mohand).");
    }

    #[test]
    fn test_find_placeholders() {
        let found = find_placeholders("PERSON_001 belde PHONE_0012 over ID_003");
        assert_eq!(
            found,
            vec![
                ("PERSON".to_string(), "001".to_string()),
                ("PHONE".to_string(), "0012".to_string()),
                ("ID".to_string(), "003".to_string()),
            ]
        );
    }

    #[test]
    fn test_validate_match() {
        let report = validate_decode("abc", "PERSON_001", "abc");
        assert!(report.is_valid());
        assert!(report.lengths_match);
        assert_eq!(report.sanitized_length, 10);
        assert!(report.first_diff.is_none());
    }

    #[test]
    fn test_validate_reports_first_difference() {
        let original = "Jan woont in Liège sinds lang";
        let decoded = "Jan woont in Luik sinds lang";
        let report = validate_decode(original, "", decoded);
        assert!(!report.content_match);
        assert!(!report.lengths_match);
        let diff = report.first_diff.unwrap();
        assert_eq!(diff.position, 14);
        assert_eq!(diff.original, "Jan woont in Liège sinds lang");
        assert_eq!(diff.decoded, "Jan woont in Luik sinds lang");
    }

    #[test]
    fn test_validate_prefix_has_no_position() {
        let report = validate_decode("abc", "", "abcd");
        assert!(!report.content_match);
        assert!(report.first_diff.is_none());
    }
}
