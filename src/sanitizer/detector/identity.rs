// Copyright 2025
// SPDX-License-Identifier: Apache-2.0
//
// Identity data: national ID numbers with checksums, dates of birth

use super::{PatternDetector, SpanSink};
use crate::sanitizer::config::Category;
use crate::sanitizer::patterns::{
    IdKind, DOB_CONFIDENCE, DOB_CONTEXT_BEFORE, DOB_LOOKBEHIND, ID_CONFIDENCE_CHECKSUM,
    ID_CONFIDENCE_CONTEXT, ID_CONTEXT, ID_LOOKBEHIND, SSN_CONTEXT,
};
use crate::sanitizer::span::{lookbehind, SpanMatch};

const BSN_WEIGHTS: [i32; 9] = [9, 8, 7, 6, 5, 4, 3, 2, -1];
const DNI_LETTERS: &[u8; 23] = b"TRWAGMYFPDXBNJZSQVHLCKE";

fn digits_of(value: &str) -> Vec<u32> {
    value.chars().filter_map(|c| c.to_digit(10)).collect()
}

/// Dutch BSN 11-proef: nine digits whose weighted sum is divisible by 11.
///
/// Separators are ignored; anything other than nine digits fails.
pub fn validate_bsn(value: &str) -> bool {
    let digits = digits_of(value);
    if digits.len() != 9 {
        return false;
    }
    let total: i32 = digits
        .iter()
        .zip(BSN_WEIGHTS.iter())
        .map(|(d, w)| *d as i32 * w)
        .sum();
    total.rem_euclid(11) == 0
}

/// Belgian rijksregisternummer: 97 minus (first nine digits mod 97) equals
/// the last two. People born from 2000 on use a `2` prefix before the modulus.
pub fn validate_be_national(value: &str) -> bool {
    let digits = digits_of(value);
    if digits.len() != 11 {
        return false;
    }
    let base = digits[..9].iter().fold(0u64, |acc, d| acc * 10 + *d as u64);
    let check = (digits[9] * 10 + digits[10]) as u64;
    97 - base % 97 == check || 97 - (2_000_000_000 + base) % 97 == check
}

/// Spanish DNI: eight digits and a control letter
pub fn validate_dni(value: &str) -> bool {
    let compact: String = value.chars().filter(|c| c.is_ascii_alphanumeric()).collect();
    if compact.len() != 9 {
        return false;
    }
    let (number, letter) = compact.split_at(8);
    match number.parse::<usize>() {
        Ok(n) if number.chars().all(|c| c.is_ascii_digit()) => {
            letter.as_bytes()[0].to_ascii_uppercase() == DNI_LETTERS[n % 23]
        }
        _ => false,
    }
}

/// Spanish NIE: X/Y/Z stand for 0/1/2, then the DNI rule applies
pub fn validate_nie(value: &str) -> bool {
    let compact: String = value.chars().filter(|c| c.is_ascii_alphanumeric()).collect();
    let mut chars = compact.chars();
    let prefix = match chars.next().map(|c| c.to_ascii_uppercase()) {
        Some('X') => '0',
        Some('Y') => '1',
        Some('Z') => '2',
        _ => return false,
    };
    let rest: String = chars.collect();
    validate_dni(&format!("{}{}", prefix, rest))
}

impl IdKind {
    /// Whether the subtype carries a checksum and `value` passes it
    pub fn checksum_valid(&self, value: &str) -> bool {
        match self {
            IdKind::NlBsn => validate_bsn(value),
            IdKind::BeNational => validate_be_national(value),
            IdKind::EsDni => validate_dni(value),
            IdKind::EsNie => validate_nie(value),
            _ => false,
        }
    }

    /// Keywords that qualify a candidate of this subtype
    pub fn context_keywords(&self) -> &'static [&'static str] {
        match self {
            IdKind::UsSsn => SSN_CONTEXT,
            _ => ID_CONTEXT,
        }
    }
}

fn has_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| haystack.contains(n))
}

impl PatternDetector {
    /// National ID numbers.
    ///
    /// A candidate is kept only when its checksum passes or an ID keyword
    /// appears in the preceding 50 bytes. US SSNs need an SSN keyword.
    pub fn detect_national_ids(&self, text: &str) -> Vec<SpanMatch> {
        let mut sink = SpanSink::default();

        for (regex, kind) in &self.patterns.national_id {
            for m in regex.find_iter(text) {
                if sink.contains(m.start(), m.end()) {
                    continue;
                }

                let before = lookbehind(text, m.start(), ID_LOOKBEHIND);
                let qualified = has_any(&before, kind.context_keywords());
                let has_context = has_any(&before, ID_CONTEXT);

                let keep = match kind {
                    IdKind::UsSsn => qualified,
                    _ => qualified || kind.checksum_valid(m.as_str()),
                };
                if !keep {
                    continue;
                }

                let confidence = if has_context {
                    ID_CONFIDENCE_CONTEXT
                } else {
                    ID_CONFIDENCE_CHECKSUM
                };
                sink.push(SpanMatch::from_text(
                    text,
                    m.start(),
                    m.end(),
                    Category::Id,
                    confidence,
                    30,
                    20,
                ));
            }
        }

        sink.into_vec()
    }

    /// Dates preceded by birth phrasing; other dates are never reported
    pub fn detect_dates_of_birth(&self, text: &str) -> Vec<SpanMatch> {
        let mut sink = SpanSink::default();
        for m in self.patterns.date.find_iter(text) {
            let before = lookbehind(text, m.start(), DOB_LOOKBEHIND);
            if has_any(&before, DOB_CONTEXT_BEFORE) {
                sink.push(SpanMatch::from_text(
                    text,
                    m.start(),
                    m.end(),
                    Category::Dob,
                    DOB_CONFIDENCE,
                    30,
                    20,
                ));
            }
        }
        sink.into_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detector() -> PatternDetector {
        PatternDetector::new().unwrap()
    }

    #[test]
    fn test_validate_bsn() {
        // 9*1 + 8*1 + 7*1 + 6*2 + 5*2 + 4*2 + 3*3 + 2*3 - 3 = 66
        assert!(validate_bsn("111222333"));
        // 147 % 11 == 4
        assert!(!validate_bsn("123456789"));
        assert!(validate_bsn("11122233-3"));
        assert!(!validate_bsn("11122233"));
        assert!(!validate_bsn(""));
    }

    #[test]
    fn test_validate_be_national() {
        // 930426123 % 97 = 86, 97 - 86 = 11
        assert!(validate_be_national("93.04.26-123.11"));
        assert!(!validate_be_national("93.04.26-123.45"));
        // 2010101123 % 97 = 96, 97 - 96 = 1
        assert!(validate_be_national("01010112301"));
        assert!(!validate_be_national("0101011230"));
    }

    #[test]
    fn test_validate_dni_and_nie() {
        // 12345678 % 23 = 14 -> 'Z'
        assert!(validate_dni("12345678Z"));
        assert!(validate_dni("12345678-Z"));
        assert!(!validate_dni("12345678A"));
        // X1234567 -> 01234567 % 23 = 19 -> 'L'
        assert!(validate_nie("X-1234567-L"));
        assert!(!validate_nie("X-1234567-A"));
    }

    #[test]
    fn test_bsn_with_valid_checksum_is_detected() {
        let matches = detector().detect_national_ids("Nummer 111222333 staat op de kaart");
        let m = matches.iter().find(|m| m.text == "111222333").unwrap();
        assert_eq!(m.category, Category::Id);
        assert!((m.confidence - ID_CONFIDENCE_CHECKSUM).abs() < f32::EPSILON);
    }

    #[test]
    fn test_invalid_bsn_without_context_is_dropped() {
        let matches = detector().detect_national_ids("Dossier 123456789 werd afgesloten");
        assert!(matches.is_empty());
    }

    #[test]
    fn test_invalid_bsn_with_context_is_kept() {
        let matches = detector().detect_national_ids("BSN: 123456789");
        let m = matches.iter().find(|m| m.text == "123456789").unwrap();
        assert!((m.confidence - ID_CONFIDENCE_CONTEXT).abs() < f32::EPSILON);
    }

    #[test]
    fn test_ssn_requires_ssn_keyword() {
        let d = detector();
        assert!(d
            .detect_national_ids("Order 123-45-6789 shipped")
            .iter()
            .all(|m| m.text != "123-45-6789"));
        assert!(d
            .detect_national_ids("SSN 123-45-6789")
            .iter()
            .any(|m| m.text == "123-45-6789"));
    }

    #[test]
    fn test_dob_requires_context() {
        let d = detector();
        let text = "Jan, geboren op 09/06/1998, werd later op 16/10/2023 aangetroffen.";
        let matches = d.detect_dates_of_birth(text);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].text, "09/06/1998");
        assert_eq!(matches[0].category, Category::Dob);
    }

    #[test]
    fn test_dob_multilingual_context() {
        let d = detector();
        assert_eq!(d.detect_dates_of_birth("née le 01.02.1985").len(), 1);
        assert_eq!(d.detect_dates_of_birth("Date of birth: 3-4-71").len(), 1);
        assert!(d.detect_dates_of_birth("Vergadering op 3-4-2021").is_empty());
    }
}
