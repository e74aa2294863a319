// Copyright 2025
// SPDX-License-Identifier: Apache-2.0
//
// Locations: addresses, streets, places, roads and vehicles

use super::{PatternDetector, SpanSink};
use crate::sanitizer::config::Category;
use crate::sanitizer::patterns::{
    known_places, ADDRESS_CONFIDENCE, ANY_STREET_CONFIDENCE, ANY_STREET_MIN_LEN,
    CONTEXT_PLACE_CONFIDENCE, CONTEXT_PLACE_STOPWORDS, KNOWN_PLACE_CONFIDENCE, NOT_STREETS,
    PLACE_EXCLUSIONS, PLACE_MIN_LEN, ROAD_CONFIDENCE, STREET_CONFIDENCE, STREET_SUFFIXES,
    VEHICLE_BRAND_CONFIDENCE, VEHICLE_MIN_LEN, VEHICLE_MODEL_CONFIDENCE,
};
use crate::sanitizer::span::SpanMatch;

/// A house number follows within the next few characters
fn followed_by_number(text: &str, end: usize) -> bool {
    let after: String = text[end..].chars().take(10).collect();
    after
        .trim_start()
        .starts_with(|c: char| c.is_ascii_digit())
}

fn is_known_place(word: &str) -> bool {
    let lower = word.to_lowercase();
    known_places().any(|p| p.to_lowercase() == lower)
}

impl PatternDetector {
    /// Full addresses: street + number, postal code + city, US/UK/FR/DE forms
    pub fn detect_addresses(&self, text: &str) -> Vec<SpanMatch> {
        let mut sink = SpanSink::default();
        for pattern in self.patterns.address.matching(text) {
            for m in pattern.regex.find_iter(text) {
                if m.as_str().contains('\n') {
                    continue;
                }
                sink.push(SpanMatch::from_text(
                    text,
                    m.start(),
                    m.end(),
                    Category::Address,
                    ADDRESS_CONFIDENCE,
                    30,
                    20,
                ));
            }
        }
        sink.into_vec()
    }

    /// Standalone street names; a street followed by a number is an address
    pub fn detect_streets(&self, text: &str) -> Vec<SpanMatch> {
        let mut sink = SpanSink::default();
        for regex in &self.patterns.streets {
            for m in regex.find_iter(text) {
                let raw = m.as_str();
                let start = m.start() + (raw.len() - raw.trim_start().len());
                let name = &text[start..m.end()];

                if followed_by_number(text, m.end()) {
                    continue;
                }
                if name.contains('\n') || name.chars().count() < 5 {
                    continue;
                }
                sink.push(SpanMatch::from_text(
                    text,
                    start,
                    m.end(),
                    Category::Street,
                    STREET_CONFIDENCE,
                    20,
                    20,
                ));
            }
        }
        sink.into_vec()
    }

    /// Any word ending in a locative suffix, minus a deny-list of ordinary words
    pub fn detect_any_street(&self, text: &str) -> Vec<SpanMatch> {
        let mut sink = SpanSink::default();
        for m in self.patterns.any_street.find_iter(text) {
            let word = m.as_str();
            let lower = word.to_lowercase();

            if word.chars().count() < ANY_STREET_MIN_LEN {
                continue;
            }
            if STREET_SUFFIXES.contains(&lower.as_str()) {
                continue;
            }
            if NOT_STREETS.contains(&lower.as_str()) || lower.ends_with("ering") {
                continue;
            }
            // Amsterdam, Rotterdam
            if is_known_place(word) {
                continue;
            }

            sink.push(SpanMatch::from_text(
                text,
                m.start(),
                m.end(),
                Category::Street,
                ANY_STREET_CONFIDENCE,
                20,
                20,
            ));
        }
        sink.into_vec()
    }

    /// Known cities, then capitalised words after a place preposition
    pub fn detect_places(&self, text: &str) -> Vec<SpanMatch> {
        let mut sink = SpanSink::default();

        for m in self.patterns.known_places.find_iter(text) {
            sink.push(SpanMatch::from_text(
                text,
                m.start(),
                m.end(),
                Category::Place,
                KNOWN_PLACE_CONFIDENCE,
                20,
                20,
            ));
        }

        for caps in self.patterns.context_place.captures_iter(text) {
            let Some(place) = caps.get(1) else { continue };
            let name = place.as_str();

            if CONTEXT_PLACE_STOPWORDS.contains(&name.to_lowercase().as_str()) {
                continue;
            }
            if known_places().any(|p| p == name) {
                continue;
            }
            if name.chars().count() < PLACE_MIN_LEN {
                continue;
            }
            sink.push(SpanMatch::from_text(
                text,
                place.start(),
                place.end(),
                Category::Place,
                CONTEXT_PLACE_CONFIDENCE,
                20,
                20,
            ));
        }

        sink.into_vec()
    }

    /// Places introduced by Dutch location markers ("te", "richting", postal codes)
    pub fn detect_context_places(&self, text: &str) -> Vec<SpanMatch> {
        let mut sink = SpanSink::default();
        for pattern in self.patterns.location_markers.matching(text) {
            for caps in pattern.regex.captures_iter(text) {
                let Some(place) = caps.get(1) else { continue };
                let name = place.as_str();

                if PLACE_EXCLUSIONS.contains(&name) || name.chars().count() < PLACE_MIN_LEN {
                    continue;
                }
                sink.push(SpanMatch::from_text(
                    text,
                    place.start(),
                    place.end(),
                    Category::Place,
                    pattern.confidence,
                    20,
                    10,
                ));
            }
        }
        sink.into_vec()
    }

    /// N-, A-, E- and R-road numbers
    pub fn detect_roads(&self, text: &str) -> Vec<SpanMatch> {
        let mut sink = SpanSink::default();
        for m in self.patterns.road.find_iter(text) {
            sink.push(SpanMatch::from_text(
                text,
                m.start(),
                m.end(),
                Category::Road,
                ROAD_CONFIDENCE,
                20,
                20,
            ));
        }
        sink.into_vec()
    }

    /// Brand with an optional model word, then standalone models
    pub fn detect_vehicles(&self, text: &str) -> Vec<SpanMatch> {
        let mut sink = SpanSink::default();

        let brands = self
            .patterns
            .vehicle_brands
            .find_iter(text)
            .chain(self.patterns.vehicle_brands_cased.find_iter(text));
        for m in brands {
            if m.as_str().chars().count() < VEHICLE_MIN_LEN {
                continue;
            }
            sink.push(SpanMatch::from_text(
                text,
                m.start(),
                m.end(),
                Category::Vehicle,
                VEHICLE_BRAND_CONFIDENCE,
                20,
                20,
            ));
        }

        for m in self.patterns.vehicle_models.find_iter(text) {
            if sink.overlaps_any(m.start(), m.end()) {
                continue;
            }
            sink.push(SpanMatch::from_text(
                text,
                m.start(),
                m.end(),
                Category::Vehicle,
                VEHICLE_MODEL_CONFIDENCE,
                20,
                20,
            ));
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

    fn texts(matches: &[SpanMatch]) -> Vec<&str> {
        matches.iter().map(|m| m.text.as_str()).collect()
    }

    #[test]
    fn test_address_with_number() {
        let found = detector().detect_addresses("Hij woont in de Stationsstraat 756/A000 te Gent");
        assert!(texts(&found).contains(&"Stationsstraat 756/A000"));
    }

    #[test]
    fn test_belgian_postal_city() {
        let found = detector().detect_addresses("Adres: 9000 Gent");
        assert!(texts(&found).contains(&"9000 Gent"));
    }

    #[test]
    fn test_address_across_lines_is_skipped() {
        let found = detector().detect_addresses("9000\nGent");
        assert!(found.iter().all(|m| !m.text.contains('\n')));
    }

    #[test]
    fn test_standalone_street() {
        let found = detector().detect_streets("We liepen langs Kerkstraat en door de Molenstraat.");
        let names = texts(&found);
        assert!(names.contains(&"Kerkstraat"));
        assert!(names.contains(&"de Molenstraat"));
        assert!(found.iter().all(|m| !m.text.starts_with(' ')));
    }

    #[test]
    fn test_standalone_street_skips_numbered() {
        let found = detector().detect_streets("Kerkstraat 12");
        assert!(found.is_empty());
    }

    #[test]
    fn test_any_street_suffixes() {
        let found = detector().detect_any_street("Via de Kampweg en de Noorderlaan naar de Sint-Jacobsstraat");
        let names = texts(&found);
        assert!(names.contains(&"Kampweg"));
        assert!(names.contains(&"Noorderlaan"));
        assert!(names.contains(&"Sint-Jacobsstraat"));
    }

    #[test]
    fn test_any_street_deny_list() {
        let found = detector().detect_any_street(
            "Tijdens de vergadering werd de levering onderweg besproken, paspoort en loopbaan.",
        );
        assert!(found.is_empty(), "unexpected: {:?}", texts(&found));
    }

    #[test]
    fn test_any_street_skips_known_places() {
        let found = detector().detect_any_street("Hij reed naar Amsterdam en Rotterdam");
        assert!(found.is_empty());
    }

    #[test]
    fn test_known_places() {
        let found = detector().detect_places("Van Antwerpen naar ANTWERPEN en Sint-Jans-Molenbeek");
        let names = texts(&found);
        assert!(names.contains(&"Antwerpen"));
        assert!(names.contains(&"ANTWERPEN"));
        assert!(names.contains(&"Sint-Jans-Molenbeek"));
        assert!(!names.contains(&"Molenbeek"));
    }

    #[test]
    fn test_known_place_needs_capital() {
        let found = detector().detect_places("een boom in het bos");
        assert!(found.is_empty());
    }

    #[test]
    fn test_context_place_unknown_city() {
        let found = detector().detect_places("Hij verbleef in Lelystad");
        let m = found.iter().find(|m| m.text == "Lelystad").unwrap();
        assert!((m.confidence - CONTEXT_PLACE_CONFIDENCE).abs() < f32::EPSILON);
    }

    #[test]
    fn test_location_markers() {
        let found = detector().detect_context_places(
            "Aangetroffen te Wuustwezel, richting breda, mast WUUSTWEZEL 2990",
        );
        let names = texts(&found);
        assert!(names.contains(&"Wuustwezel"));
        assert!(names.contains(&"breda"));
        assert!(names.contains(&"WUUSTWEZEL"));
    }

    #[test]
    fn test_location_marker_exclusions() {
        let found = detector().detect_context_places("naar Politie en te Maandag");
        assert!(found.is_empty());
    }

    #[test]
    fn test_roads() {
        let found = detector().detect_roads("Via de E19 en de N133, later de r1");
        assert_eq!(texts(&found), vec!["E19", "N133", "r1"]);
    }

    #[test]
    fn test_vehicle_brand_and_model() {
        let found = detector().detect_vehicles("Een witte Fiat Ducato en een BMW volgden");
        let names = texts(&found);
        assert!(names.contains(&"Fiat Ducato"));
        assert!(names.contains(&"BMW"));
        assert!(!names.contains(&"Ducato"));
    }

    #[test]
    fn test_vehicle_standalone_model() {
        let found = detector().detect_vehicles("De Sprinter stond geparkeerd");
        assert_eq!(texts(&found), vec!["Sprinter"]);
    }

    #[test]
    fn test_vehicle_common_words_stay() {
        let found =
            detector().detect_vehicles("Haar partner speelt golf, de man las een mini boek");
        assert!(found.is_empty(), "unexpected: {:?}", texts(&found));
    }
}
