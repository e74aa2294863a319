// Copyright 2025
// SPDX-License-Identifier: Apache-2.0
//
// Pattern tables for PII detection
// Tables are plain data (pattern, subtype, confidence, exclusions) compiled once per detector

use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder, RegexSet};

use super::error::{Result, SanitizerError};

/// Pattern definitions (pattern, subtype, confidence)
pub type PatternDef = (&'static str, &'static str, f32);

/// Compiled pattern with metadata
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    pub regex: Regex,
    pub subtype: &'static str,
    pub confidence: f32,
}

// =============================================================================
// Contact data
// =============================================================================

pub static PHONE_PATTERNS: Lazy<Vec<PatternDef>> = Lazy::new(|| {
    vec![
        // Belgian landline: 052/26.08.60, 03/217.81.11
        (r"\b0\d{1,2}[/.\s]\d{2,3}[/.\s]\d{2}[/.\s]\d{2}\b", "BE_LANDLINE", 0.95),
        // Belgian landline, international: +32 3 217 84 30
        (r"\+32\s?\d{1,2}(?:[\s./]?\d{2,3}){3}\b", "BE_LANDLINE_INTL", 0.95),
        // Belgian mobile, international: 32489667088, +32 489 66 70 88
        (r"\+?32\s?\d{9}", "BE_MOBILE", 0.95),
        (r"\+?32\s?\d{3}\s?\d{2}\s?\d{2}\s?\d{2}", "BE_MOBILE", 0.95),
        // Belgian mobile, local: 0489/66.70.88, 0489 66 70 88
        (r"\b0[4-9]\d{2}[/.\s]?\d{2}[/.\s]?\d{2}[/.\s]?\d{2}\b", "BE_MOBILE_LOCAL", 0.95),
        // Dutch
        (r"\+?31\s?\d{9}", "NL_MOBILE", 0.95),
        (r"\+?31\s?6\s?\d{4}\s?\d{4}", "NL_MOBILE", 0.95),
        // US/Canada: (555) 123-4567, 555-123-4567, +1 555 123 4567
        (r"\(\d{3}\)\s?\d{3}[-.\s]?\d{4}", "US_PHONE", 0.95),
        (r"\b\d{3}[-.\s]\d{3}[-.\s]\d{4}\b", "US_PHONE", 0.95),
        (r"\+?1[-.\s]?\d{3}[-.\s]?\d{3}[-.\s]?\d{4}", "US_PHONE", 0.95),
        // UK: +44 20 7946 0958, 020 7946 0958
        (r"\+?44\s?\d{2,4}\s?\d{3,4}\s?\d{4}", "UK_PHONE", 0.95),
        (r"\b0\d{2,4}\s?\d{3,4}\s?\d{4}\b", "UK_PHONE", 0.95),
        // French: +33 1 23 45 67 89, 01 23 45 67 89
        (r"\+?33\s?\d{9}", "FR_MOBILE", 0.95),
        (r"\+?33\s?\d\s?\d{2}\s?\d{2}\s?\d{2}\s?\d{2}", "FR_PHONE", 0.95),
        (r"\b0\d\s?\d{2}\s?\d{2}\s?\d{2}\s?\d{2}\b", "FR_PHONE", 0.95),
        // German: +49 30 12345678, 030 12345678
        (r"\+?49\s?\d{2,4}\s?\d{6,8}", "DE_PHONE", 0.95),
        (r"\b0\d{2,4}\s?\d{6,8}\b", "DE_PHONE", 0.95),
        // Moroccan and Russian mobiles
        (r"\+?212\s?\d{9}", "MA_MOBILE", 0.95),
        (r"\+?79\s?\d{9}", "RU_MOBILE", 0.95),
        // Generic international with + prefix
        (r"\+\d{2,3}\s?\d{8,12}", "INTL_GENERIC", 0.95),
    ]
});

pub static EMAIL_PATTERNS: Lazy<Vec<PatternDef>> = Lazy::new(|| {
    vec![(
        r"[a-zA-Z0-9._%+\-]+@[a-zA-Z0-9.\-]+\.[a-zA-Z]{2,}",
        "EMAIL",
        0.99,
    )]
});

pub static IBAN_PATTERNS: Lazy<Vec<PatternDef>> = Lazy::new(|| {
    vec![
        // BE44 3770 8065 6345
        (r"\bBE\d{2}\s?\d{4}\s?\d{4}\s?\d{4}\b", "BE_IBAN", 0.95),
        // NL91ABNA0417164300
        (r"\bNL\d{2}\s?[A-Z]{4}\s?\d{4}\s?\d{4}\s?\d{2}\b", "NL_IBAN", 0.95),
        // DE89 3704 0044 0532 0130 00
        (r"\bDE\d{2}\s?\d{4}\s?\d{4}\s?\d{4}\s?\d{4}\s?\d{2}\b", "DE_IBAN", 0.95),
        // FR76 3000 6000 0112 3456 7890 189
        (r"\bFR\d{2}\s?\d{4}\s?\d{4}\s?\d{4}\s?\d{4}\s?\d{4}\s?\d{3}\b", "FR_IBAN", 0.95),
        // GB29 NWBK 6016 1331 9268 19
        (r"\bGB\d{2}\s?[A-Z]{4}\s?\d{4}\s?\d{4}\s?\d{4}\s?\d{2}\b", "GB_IBAN", 0.95),
        // ES91 2100 0418 4502 0005 1332
        (r"\bES\d{2}\s?\d{4}\s?\d{4}\s?\d{4}\s?\d{4}\s?\d{4}\b", "ES_IBAN", 0.95),
        // IT60 X054 2811 1010 0000 0123 456
        (r"\bIT\d{2}\s?[A-Z]\d{3}\s?\d{4}\s?\d{4}\s?\d{4}\s?\d{4}\s?\d{3}\b", "IT_IBAN", 0.95),
        // Generic: country + check digits + 12..28 alphanumerics in groups of four
        (r"\b[A-Z]{2}\d{2}\s?[A-Z0-9]{4}(?:\s?[A-Z0-9]{4}){2,6}\b", "GENERIC_IBAN", 0.95),
    ]
});

// =============================================================================
// Identity data
// =============================================================================

pub const DATE_PATTERN: &str = r"\b\d{1,2}[-/.]\d{1,2}[-/.]\d{2,4}\b";
pub const DOB_CONFIDENCE: f32 = 0.90;
pub const DOB_LOOKBEHIND: usize = 30;

/// Phrases that mark a date as a date of birth rather than an event date
pub const DOB_CONTEXT_BEFORE: &[&str] = &[
    // Dutch/Belgian
    "geboren op",
    "geboren",
    "geboortedatum",
    // English
    "birth",
    "date of birth",
    "dob",
    "born on",
    "born",
    // French
    "né le",
    "née le",
    "naissance",
    "date de naissance",
    // German
    "geboren am",
    "geburtsdatum",
    "geb.",
    // Symbols
    "°",
    "*",
];

/// National ID subtypes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdKind {
    NlBsn,
    BeNational,
    UsSsn,
    UkNi,
    FrInsee,
    DeSozvers,
    DePerso,
    EsDni,
    EsNie,
    ItCf,
    Passport,
}

/// National ID definitions (pattern, subtype)
pub static NATIONAL_ID_PATTERNS: Lazy<Vec<(&'static str, IdKind)>> = Lazy::new(|| {
    vec![
        // BSN: 123456789 or 12345678-9
        (r"\b\d{9}\b", IdKind::NlBsn),
        (r"\b\d{8}[-.\s]?\d\b", IdKind::NlBsn),
        // Rijksregisternummer: 93.04.26-123.45 or 93042612345
        (r"\b\d{2}\.?\d{2}\.?\d{2}[-.\s]?\d{3}[-.\s]?\d{2}\b", IdKind::BeNational),
        // SSN: 123-45-6789
        (r"\b\d{3}[-\s]?\d{2}[-\s]?\d{4}\b", IdKind::UsSsn),
        // National Insurance: AB 12 34 56 C
        (r"\b[A-Z]{2}\s?\d{2}\s?\d{2}\s?\d{2}\s?[A-Z]\b", IdKind::UkNi),
        // INSEE: 1 85 12 75 108 123 45
        (r"\b[12]\s?\d{2}\s?\d{2}\s?\d{2}\s?\d{3}\s?\d{3}\s?\d{2}\b", IdKind::FrInsee),
        // Sozialversicherungsnummer: 12 150485 A 123 4
        (r"\b\d{2}\s?\d{6}\s?[A-Z]\s?\d{3}\s?\d\b", IdKind::DeSozvers),
        // Personalausweis: L12345678
        (r"\b[A-Z]\d{8}\b", IdKind::DePerso),
        // DNI: 12345678-Z
        (r"\b\d{8}[-\s]?[A-Z]\b", IdKind::EsDni),
        // NIE: X-1234567-L
        (r"\b[XYZ][-\s]?\d{7}[-\s]?[A-Z]\b", IdKind::EsNie),
        // Codice fiscale: RSSMRA85M01H501Z
        (r"\b[A-Z]{6}\d{2}[A-Z]\d{2}[A-Z]\d{3}[A-Z]\b", IdKind::ItCf),
        // Generic passport
        (r"\b[A-Z]{1,2}\d{6,8}\b", IdKind::Passport),
    ]
});

pub const ID_LOOKBEHIND: usize = 50;
pub const ID_CONFIDENCE_CONTEXT: f32 = 0.85;
pub const ID_CONFIDENCE_CHECKSUM: f32 = 0.70;

pub const ID_CONTEXT: &[&str] = &[
    // Dutch
    "bsn",
    "burgerservicenummer",
    "sofinummer",
    "sofi-nummer",
    // Belgian
    "nationaal nummer",
    "rijksregisternummer",
    "identiteitskaartnummer",
    "national number",
    "id number",
    // English
    "ssn",
    "social security",
    "national insurance",
    "ni number",
    "passport",
    "driver license",
    "driving licence",
    // French
    "numéro de sécurité sociale",
    "numéro insee",
    "passeport",
    // German
    "sozialversicherungsnummer",
    "personalausweis",
    "reisepass",
    // Spanish
    "dni",
    "nie",
    "documento nacional",
    // Italian
    "codice fiscale",
];

pub const SSN_CONTEXT: &[&str] = &["ssn", "social security"];

// =============================================================================
// Person names
// =============================================================================

/// Independent regex families for person names
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameFamily {
    /// EL MANSOURI Brahim, Van Looveren Thomas
    ParticleSurname,
    /// Jean-Pierre Dupont
    CompoundGiven,
    /// de la Fontaine, von der Leyen
    LowerParticle,
    /// O'Brien, McDonald
    Gaelic,
    /// GOURMA Jonathan, Renaat DETOLLENAERE
    UppercaseSurname,
    /// Mr. John Smith
    TitlePrefixed,
}

/// Name pattern with the words that may not directly follow the particle
pub struct NamePatternDef {
    pub pattern: &'static str,
    pub family: NameFamily,
    pub reject_after_particle: &'static [&'static str],
}

pub const NAME_CONFIDENCE: f32 = 0.80;

pub static NAME_PATTERNS: Lazy<Vec<NamePatternDef>> = Lazy::new(|| {
    vec![
        NamePatternDef {
            pattern: r"\b(?:EL|VAN|DE|DER|DEN|TEN|TER)\s+[A-Z]{2,}\s+[A-Z][a-zé]+(?:\s+[A-Z][a-zé]+)?\b",
            family: NameFamily::ParticleSurname,
            reject_after_particle: &[],
        },
        NamePatternDef {
            pattern: r"\b(?:El|Van|De|Der|Den|Ten|Ter|La|Le)\s+[A-Z][a-zé]+\s+[A-Z][a-zé]+(?:\s+[A-Z][a-zé]+)?\b",
            family: NameFamily::ParticleSurname,
            reject_after_particle: &[],
        },
        NamePatternDef {
            pattern: r"\b(?:Jean|Marie|Pierre|Jacques|Philippe|François|Michel|André|Louis|Charles)[-\s][A-Z][a-zé]+(?:\s+(?:de|du|la|le)\s+[A-Z][a-zé]+)?\b",
            family: NameFamily::CompoundGiven,
            reject_after_particle: &[],
        },
        NamePatternDef {
            pattern: r"\b(?:de|du)\s+(?:la\s+)?[A-Z][a-zé]+\s+[A-Z][a-zé]+\b",
            family: NameFamily::LowerParticle,
            reject_after_particle: &[],
        },
        NamePatternDef {
            pattern: r"\b(?:von|zu|vom)\s+(?:der\s+)?[A-Z][a-zé]+(?:\s+[A-Z][a-zé]+)?\b",
            family: NameFamily::LowerParticle,
            reject_after_particle: &[],
        },
        NamePatternDef {
            pattern: r"\bO'[A-Z][a-z]+\b",
            family: NameFamily::Gaelic,
            reject_after_particle: &[],
        },
        NamePatternDef {
            pattern: r"\b(?:Mc|Mac)[A-Z][a-z]+\b",
            family: NameFamily::Gaelic,
            reject_after_particle: &[],
        },
        NamePatternDef {
            pattern: r"\b[A-Z]{2,}(?:\s+[A-Z][a-zé]+){1,3}\b",
            family: NameFamily::UppercaseSurname,
            reject_after_particle: &[],
        },
        NamePatternDef {
            pattern: r"\b[A-Z][a-zé]+\s+[A-Z]{2,}\b",
            family: NameFamily::UppercaseSurname,
            reject_after_particle: &[],
        },
        NamePatternDef {
            pattern: r"\b(?:EL|VAN|DE)\s+[A-Z]{2,}\b",
            family: NameFamily::UppercaseSurname,
            reject_after_particle: &[
                "ERSTE",
                "EERSTE",
                "AANLEG",
                "VLAANDEREN",
                "NEDERLAND",
                "FRANCE",
                "GERMANY",
            ],
        },
        NamePatternDef {
            pattern: r"\b(?:Mr|Mrs|Ms|Miss|Dr|Prof)\.?\s+[A-Z][a-z]+(?:\s+[A-Z][a-z]+){0,2}\b",
            family: NameFamily::TitlePrefixed,
            reject_after_particle: &[],
        },
    ]
});

/// Legal and administrative phrases that look like names
pub const NAME_EXCLUSIONS: &[&str] = &[
    "VAN EERSTE",
    "DE EERSTE",
    "VAN AANLEG",
    "DE AANLEG",
    "VLAANDEREN",
    "NEDERLAND",
    "BELGIE",
    "BELGIUM",
    "PRO JUSTITIA",
    "EUR",
    "SEPA",
    "BTW",
    "BIC",
    "DE GROTE MARKT",
    "DE KLEINE MARKT",
    "DE OUDE MARKT",
    "DE GROTE PLAATS",
    "HET GROTE PLEIN",
    "DE MARKT",
    "VAN DE MARKT",
    "VAN HET PLEIN",
];

/// Region words that disqualify a name candidate wherever they appear
pub const NAME_REGION_WORDS: &[&str] = &["VLAANDEREN", "NEDERLAND", "BELGIE", "AFDELING"];

/// A name-shaped match whose last word is one of these is a place
pub const PLACE_SUFFIX_EXCLUSIONS: &[&str] = &[
    "markt", "plein", "straat", "laan", "weg", "dreef", "lei", "kaai", "dijk", "gracht", "park",
    "bos", "hof", "tuin", "kerk", "station", "haven", "poort", "brug", "centrum",
];

pub const NAME_MIN_LEN: usize = 5;

/// "OPO KUAA Daniel Kwame - 27-01-2001"
pub const NAME_BEFORE_DATE: &str = r"([A-Z][A-Za-zé'\-]+(?:\s+[A-Z]?[a-zé'\-]+)*(?:\s+[A-Z][A-Za-zé'\-]+)*)\s*[-–]\s*\d{1,2}[-/.]\d{1,2}[-/.]\d{2,4}";
pub const NAME_BEFORE_DATE_CONFIDENCE: f32 = 0.88;

/// "THOMPSON - 12/..", "SEEDORF Nationaliteit", "ARKO geboren"
pub const ALLCAPS_NAME: &str = r"\b([A-Z]{3,}(?:\s+[A-Z][a-z]+)*)\s*(?:[-–]\s*\d{1,2}[-/.]|Nationaliteit|PERSON_|geboren)";
pub const ALLCAPS_NAME_CONFIDENCE: f32 = 0.85;

/// "Salu Kia Zola PERSON_012": name remnants next to an existing placeholder
pub const PARTIAL_NAME: &str = r"([A-Z][a-z]+(?:\s+[A-Z][a-z]+)+)\s+PERSON_\d{3,4}";
pub const PARTIAL_NAME_CONFIDENCE: f32 = 0.82;

pub const CONTEXT_NAME_STOPWORDS: &[&str] = &[
    "geboren",
    "geboortedatum",
    "datum",
    "nationaliteit",
    "wettelijke",
    "werkelijke",
];

/// Placeholder prefixes that must never be taken for an ALLCAPS surname
pub const PLACEHOLDER_WORDS: &[&str] = &[
    "PERSON", "PLACE", "STREET", "PHONE", "EMAIL", "VEHICLE", "ROAD", "PAGE", "ADDRESS", "IBAN",
    "DOB", "ORG",
];

// =============================================================================
// Locations
// =============================================================================

pub const ADDRESS_CONFIDENCE: f32 = 0.85;

pub static ADDRESS_PATTERNS: Lazy<Vec<PatternDef>> = Lazy::new(|| {
    vec![
        // Belgian street + number: Stationsstraat 756/A000
        (
            r"[A-Z][a-zé]+(?:straat|laan|weg|plein|singel|dreef|lei|steenweg|kaai)[a-z]*\s+\d+(?:/[A-Z]?\d+)?",
            "BE_STREET_NUMBER",
            ADDRESS_CONFIDENCE,
        ),
        // Belgian postal code + city: 9000 Gent
        (r"\b[1-9]\d{3} [A-Z][a-z]+\b", "BE_POSTAL_CITY", ADDRESS_CONFIDENCE),
        // Dutch postal code + city: 3011 HE Rotterdam
        (r"\b\d{4}\s?[A-Z]{2}\s+[A-Z][a-z]+(?:\s+\([A-Za-z]+\))?", "NL_POSTAL_CITY", ADDRESS_CONFIDENCE),
        // US street: 123 Main Street
        (
            r"\b\d+\s+[A-Z][a-z]+(?:\s+[A-Z][a-z]+)?\s+(?:Street|St|Avenue|Ave|Road|Rd|Drive|Dr|Lane|Ln|Boulevard|Blvd|Way|Court|Ct|Place|Pl)\b",
            "US_STREET",
            ADDRESS_CONFIDENCE,
        ),
        // US ZIP
        (r"\b\d{5}(?:-\d{4})?\b", "US_ZIP", ADDRESS_CONFIDENCE),
        // City, ST 12345
        (r"\b[A-Z][a-z]+(?:\s+[A-Z][a-z]+)?,\s*[A-Z]{2}\s+\d{5}(?:-\d{4})?\b", "US_CITY_STATE", ADDRESS_CONFIDENCE),
        // UK postcode: SW1A 1AA
        (r"\b[A-Z]{1,2}\d[A-Z\d]?\s*\d[A-Z]{2}\b", "UK_POSTCODE", ADDRESS_CONFIDENCE),
        // UK street: 123 High Street
        (
            r"\b\d+\s+[A-Z][a-z]+(?:\s+[A-Z][a-z]+)?\s+(?:Street|Road|Lane|Avenue|Gardens|Square|Terrace|Close|Crescent)\b",
            "UK_STREET",
            ADDRESS_CONFIDENCE,
        ),
        // French street: 123 rue de la Paix
        (
            r"\b\d+\s+(?:rue|avenue|boulevard|place|allée|chemin|impasse)\s+(?:de\s+(?:la\s+)?|du\s+|des\s+)?[A-Z][a-zé\-]+(?:\s+[A-Z][a-zé\-]+)*\b",
            "FR_STREET",
            ADDRESS_CONFIDENCE,
        ),
        // French postal code + city: 75001 Paris
        (r"\b\d{5}\s+[A-Z][a-zé\-]+(?:-[A-Z][a-zé\-]+)*\b", "FR_POSTAL_CITY", ADDRESS_CONFIDENCE),
        // German street: Hauptstraße 123
        (
            r"\b[A-Z][a-zäöüß]+(?:straße|strasse|weg|platz|allee|gasse)\s+\d+[a-z]?\b",
            "DE_STREET",
            ADDRESS_CONFIDENCE,
        ),
        // German postal code + city: 10115 Berlin
        (r"\b\d{5}\s+[A-Z][a-zäöüß]+\b", "DE_POSTAL_CITY", ADDRESS_CONFIDENCE),
    ]
});

pub const STREET_CONFIDENCE: f32 = 0.85;

/// Standalone street names, without a house number
pub const STREET_PATTERNS: &[&str] = &[
    r"\b(?:de\s+)?(?:Grote|Kleine|Oude|Nieuwe|Sint|St\.|Heilige|Lange|Korte)?\s*[A-Z][a-zé]+(?:straat|laan|weg|plein|singel|dreef|lei|steenweg|kaai|baan|dijk|gracht|kade|pad|hof|park|boulevard|avenue|ring|markt)\b",
    r"\b(?:Van|De|Het|Den|Ter)\s+[A-Z][a-zé]+(?:straat|laan|weg|plein)\b",
    r"\b(?:Koning|Koningin|President|Generaal|Kolonel|Burgemeester|Professor|Dokter|Prins|Prinses)\s+[A-Z][a-zé]+(?:straat|laan|weg|plein)\b",
];

pub const ANY_STREET_CONFIDENCE: f32 = 0.88;
pub const ANY_STREET_MIN_LEN: usize = 6;

/// Locative suffixes for the aggressive street detector
pub const STREET_SUFFIXES: &[&str] = &[
    "straat", "laan", "weg", "plein", "singel", "dreef", "lei", "steenweg", "kaai", "baan", "dijk",
    "gracht", "kade", "pad", "hof", "park", "boulevard", "avenue", "ring", "passage", "markt",
    "poort", "dam", "vest", "wal", "statie", "square", "plaats", "berg", "brug",
];

/// Words that end in a street suffix without being streets
pub const NOT_STREETS: &[&str] = &[
    // -ring
    "overlevering",
    "uitvoering",
    "niet-uitvoering",
    "levering",
    "bezorging",
    "herinnering",
    "verandering",
    "verbetering",
    "verklaring",
    "bewering",
    "ervaring",
    "oefening",
    "vergadering",
    "bediening",
    "besturing",
    "verwijdering",
    "verschijning",
    "verbinding",
    "beëindiging",
    "opening",
    "sluiting",
    "aflevering",
    "inlevering",
    "aanlevering",
    "toelevering",
    // -weg
    "onderweg",
    "halverwege",
    "vanwege",
    "wegens",
    // -laan
    "verlaan",
    // -dam
    "schadedam",
    // -plein
    "volplein",
    // -baan
    "loopbaan",
    "rijbaan",
    "racebaan",
    "vliegbaan",
    "schaatsbaan",
    "wielerbaan",
    "omloopbaan",
    "glijbaan",
    // -pad
    "tegenpad",
    "voetpad",
    "fietspad",
    "wandelpad",
    "bospad",
    // -berg
    "ijsberg",
    "zandberg",
    "afvalberg",
    "schuldenberg",
    // -poort
    "paspoort",
    "exportpoort",
    "importpoort",
    // -brug
    "luchtbrug",
    "touwbrug",
    // -vest
    "zwemvest",
    "reddingsvest",
    "kogelvrijevest",
    // -markt
    "arbeidsmarkt",
    "huizenmarkt",
    "woningmarkt",
    "aandelenmarkt",
    "obligatiemarkt",
    // other
    "rechtbank",
    "vooruitgang",
    "achteruitgang",
];

pub const KNOWN_PLACE_CONFIDENCE: f32 = 0.95;
pub const CONTEXT_PLACE_CONFIDENCE: f32 = 0.75;
pub const LOCATION_MARKER_CONFIDENCE: f32 = 0.90;

pub const BELGIAN_PLACES: &[&str] = &[
    // Flemish Region
    "Antwerpen", "Gent", "Brugge", "Leuven", "Mechelen", "Aalst", "Hasselt", "Sint-Niklaas",
    "Kortrijk", "Oostende", "Genk", "Roeselare", "Dendermonde", "Turnhout", "Lokeren", "Beveren",
    "Vilvoorde", "Waregem", "Ieper", "Herentals", "Diest", "Tongeren", "Lommel", "Tienen",
    "Maasmechelen", "Geraardsbergen", "Ninove", "Wetteren", "Brasschaat", "Beringen", "Temse",
    "Knokke-Heist", "Mol", "Aarschot", "Izegem", "Eeklo", "Deinze", "Halle", "Dilsen-Stokkem",
    "Pelt", "Zottegem", "Oudenaarde", "Menen", "Willebroek", "Zele", "Wevelgem", "Bree", "Bornem",
    // Brussels Region
    "Brussel", "Brussels", "Bruxelles", "Schaarbeek", "Anderlecht", "Molenbeek", "Etterbeek",
    "Elsene", "Ixelles", "Ukkel", "Uccle", "Jette", "Evere", "Sint-Gillis", "Sint-Jans-Molenbeek",
    "Vorst", "Forest", "Watermaal-Bosvoorde",
    // Walloon Region
    "Luik", "Liège", "Charleroi", "Namen", "Namur", "Bergen", "Mons", "La Louvière", "Doornik",
    "Tournai", "Seraing", "Verviers", "Moeskroen", "Châtelet", "Binche", "Soignies", "Ath",
    "Eupen", "Malmedy", "Arlon",
    // Antwerp districts and surroundings
    "Zaventem", "Mortsel", "Boom", "Kapellen", "Schoten", "Wijnegem", "Merksem", "Deurne",
    "Berchem", "Hoboken", "Borgerhout", "Wilrijk",
];

pub const DUTCH_PLACES: &[&str] = &[
    "Amsterdam", "Rotterdam", "Den Haag", "'s-Gravenhage", "Utrecht", "Eindhoven", "Tilburg",
    "Groningen", "Almere", "Breda", "Nijmegen", "Enschede", "Apeldoorn", "Haarlem", "Arnhem",
    "Zaanstad", "Amersfoort", "Haarlemmermeer", "Dordrecht", "Leiden", "Zoetermeer", "Maastricht",
    "Delft", "Deventer", "Alkmaar", "Venlo", "Hilversum", "Heerlen", "Roosendaal", "Oss",
    "Schiedam", "Spijkenisse", "Helmond",
];

pub const GERMAN_PLACES: &[&str] = &[
    "Aken", "Aachen", "Keulen", "Köln", "Düsseldorf", "Dusseldorf", "Bonn", "Duisburg", "Essen",
    "Mönchengladbach",
];

/// "in Lelystad": marker word followed by a capitalised word
pub const CONTEXT_PLACE: &str = r"\b(?:te|in|naar|uit|van|bij)\s+([A-Z][a-zé\-]+(?:-[A-Z][a-zé]+)?)\b";

pub const CONTEXT_PLACE_STOPWORDS: &[&str] = &["het", "de", "een", "dit", "dat", "deze"];

/// Location markers; group 1 is the place
pub static LOCATION_MARKERS: Lazy<Vec<PatternDef>> = Lazy::new(|| {
    vec![
        (r"\bte\s+([A-Z][a-zA-Zé\-]+(?:\s*-\s*[A-Z][a-zA-Zé]+)?)", "te", LOCATION_MARKER_CONFIDENCE),
        (r"\brichting\s+([A-Z][a-zA-Zé\-]+)", "richting", LOCATION_MARKER_CONFIDENCE),
        (r"\bnaar\s+([A-Z][a-zA-Zé\-]+)", "naar", LOCATION_MARKER_CONFIDENCE),
        (r"\bvanuit\s+([A-Z][a-zA-Zé\-]+)", "vanuit", LOCATION_MARKER_CONFIDENCE),
        (r"\bvia\s+([A-Z][a-zA-Zé\-]+)", "via", LOCATION_MARKER_CONFIDENCE),
        (r"\bt\.?h\.?v\.?\s+([A-Z][a-zA-Zé\-]+)", "thv", LOCATION_MARKER_CONFIDENCE),
        (r"\bter hoogte van\s+([A-Z][a-zA-Zé\-]+)", "thv", LOCATION_MARKER_CONFIDENCE),
        (r"\b\d{4}\s+([A-Z][a-zA-Zé\-]+)\b", "postalcode_be", LOCATION_MARKER_CONFIDENCE),
        (r"\b\d{4}\s*[A-Z]{2}\s+([A-Z][a-zA-Zé\-]+)\b", "postalcode_nl", LOCATION_MARKER_CONFIDENCE),
        (r"\b([A-Z]{3,})\s+\d{4}\b", "place_postalcode", LOCATION_MARKER_CONFIDENCE),
        (r"\brichting\s+([a-zA-Z][a-zA-Zé\-]+)", "richting_ci", LOCATION_MARKER_CONFIDENCE),
    ]
});

/// Capitalised words that follow location markers without being places
pub const PLACE_EXCLUSIONS: &[&str] = &[
    "het", "de", "een", "van", "naar", "met", "voor", "door", "over", "België", "Nederland",
    "Duitsland", "Frankrijk", "Politie", "Justitie", "Parket", "Rechtbank", "Procureur",
    "Onderzoeksrechter", "Commissaris", "Maandag", "Dinsdag", "Woensdag", "Donderdag", "Vrijdag",
    "Zaterdag", "Zondag", "Januari", "Februari", "Maart", "April", "Mei", "Juni", "Juli",
    "Augustus", "September", "Oktober", "November", "December",
];

pub const PLACE_MIN_LEN: usize = 3;

// =============================================================================
// Vehicles and roads
// =============================================================================

pub const VEHICLE_BRAND_CONFIDENCE: f32 = 0.92;
pub const VEHICLE_MODEL_CONFIDENCE: f32 = 0.88;

/// Brands matched case-insensitively
pub const VEHICLE_BRANDS: &[&str] = &[
    // European
    "fiat", "bmw", "mercedes", "mercedes-benz", "audi", "volkswagen", "vw", "opel", "peugeot",
    "renault", "citroën", "citroen", "volvo", "skoda", "porsche", "ferrari", "lamborghini",
    "jaguar", "land rover", "landrover", "bentley", "rolls-royce", "aston martin", "maserati",
    "bugatti", "dacia", "lancia", "saab",
    // Asian
    "toyota", "honda", "nissan", "mazda", "hyundai", "kia", "suzuki", "mitsubishi", "lexus",
    "subaru", "isuzu", "daihatsu", "infiniti", "acura", "ssangyong",
    // American
    "ford", "chevrolet", "chevy", "dodge", "jeep", "tesla", "cadillac", "chrysler", "buick", "gmc",
    "hummer",
    // Commercial vehicles
    "iveco", "daf", "scania", "renault trucks",
];

/// Brands that are also everyday words; matched only in these spellings
pub const VEHICLE_BRANDS_CASED: &[&str] = &[
    "MAN", "RAM", "Mini", "MINI", "Smart", "Seat", "SEAT", "Alfa Romeo", "Alfa", "Genesis",
    "Lincoln",
];

/// Common van/truck models, matched in capitalised or upper-case form
pub const VEHICLE_MODELS: &[&str] = &[
    "ducato", "sprinter", "transit", "transporter", "crafter", "vivaro", "trafic", "master",
    "boxer", "jumper", "daily", "vito", "caddy", "berlingo", "partner", "kangoo", "combo", "doblo",
    "nv200", "hiace", "golf", "polo", "passat", "corsa", "astra", "focus", "fiesta", "civic",
    "corolla", "camry", "yaris", "clio", "megane", "scenic", "3-serie", "5-serie", "a3", "a4",
    "a6", "c-klasse", "e-klasse",
];

pub const VEHICLE_MIN_LEN: usize = 3;

/// N133, A12, E19, R1
pub const ROAD_PATTERN: &str = r"\b[NAERnaer]\d{1,4}\b";
pub const ROAD_CONFIDENCE: f32 = 0.95;

// =============================================================================
// Compilation
// =============================================================================

/// Compile a single pattern, surfacing failures as configuration errors
pub fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|source| SanitizerError::Pattern {
        pattern: pattern.to_string(),
        source,
    })
}

/// Compile a case-insensitive pattern
pub fn compile_ci(pattern: &str) -> Result<Regex> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .map_err(|source| SanitizerError::Pattern {
            pattern: pattern.to_string(),
            source,
        })
}

/// Compile a `PatternDef` table
pub fn compile_table(defs: &[PatternDef]) -> Result<Vec<CompiledPattern>> {
    defs.iter()
        .map(|(pattern, subtype, confidence)| {
            Ok(CompiledPattern {
                regex: compile(pattern)?,
                subtype,
                confidence: *confidence,
            })
        })
        .collect()
}

/// `(?:a|b|c)` over escaped words, longest first so the longest form wins at a position
pub fn alternation<S: AsRef<str>>(words: &[S]) -> String {
    let mut sorted: Vec<&str> = words.iter().map(|w| w.as_ref()).collect();
    sorted.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
    sorted.dedup();
    let escaped: Vec<String> = sorted.into_iter().map(regex::escape).collect();
    format!("(?:{})", escaped.join("|"))
}

/// Capitalised and upper-case spellings of each word
pub fn cased_forms(words: &[&str]) -> Vec<String> {
    let mut forms = Vec::with_capacity(words.len() * 2);
    for word in words {
        let mut chars = word.chars();
        if let Some(first) = chars.next() {
            forms.push(first.to_uppercase().chain(chars).collect());
        }
        forms.push(word.to_uppercase());
    }
    forms
}

/// All known places across regions
pub fn known_places() -> impl Iterator<Item = &'static str> {
    BELGIAN_PLACES
        .iter()
        .chain(DUTCH_PLACES.iter())
        .chain(GERMAN_PLACES.iter())
        .copied()
}

/// A pattern table with a RegexSet prefilter
#[derive(Debug, Clone)]
pub struct CompiledTable {
    pub regex_set: RegexSet,
    pub patterns: Vec<CompiledPattern>,
}

impl CompiledTable {
    pub fn new(defs: &[PatternDef]) -> Result<Self> {
        let regex_set = RegexSet::new(defs.iter().map(|(pattern, _, _)| *pattern)).map_err(
            |source| SanitizerError::Pattern {
                pattern: "<pattern set>".to_string(),
                source,
            },
        )?;
        Ok(Self {
            regex_set,
            patterns: compile_table(defs)?,
        })
    }

    /// Patterns with at least one match in `text`, in table order
    pub fn matching<'a>(&'a self, text: &str) -> impl Iterator<Item = &'a CompiledPattern> + 'a {
        self.regex_set
            .matches(text)
            .into_iter()
            .map(move |idx| &self.patterns[idx])
    }
}

/// Name regex with its family metadata
#[derive(Debug, Clone)]
pub struct CompiledNamePattern {
    pub regex: Regex,
    pub family: NameFamily,
    pub reject_after_particle: &'static [&'static str],
}

/// Every table, compiled once per detector
#[derive(Debug, Clone)]
pub struct CompiledPatterns {
    pub phone: CompiledTable,
    pub email: CompiledTable,
    pub iban: CompiledTable,
    pub address: CompiledTable,
    pub location_markers: CompiledTable,
    pub date: Regex,
    pub national_id: Vec<(Regex, IdKind)>,
    pub names: Vec<CompiledNamePattern>,
    pub name_before_date: Regex,
    pub allcaps_name: Regex,
    pub partial_name: Regex,
    pub streets: Vec<Regex>,
    pub any_street: Regex,
    pub known_places: Regex,
    pub context_place: Regex,
    pub vehicle_brands: Regex,
    pub vehicle_brands_cased: Regex,
    pub vehicle_models: Regex,
    pub road: Regex,
}

pub fn compile_patterns() -> Result<CompiledPatterns> {
    let national_id = NATIONAL_ID_PATTERNS
        .iter()
        .map(|(pattern, kind)| Ok((compile(pattern)?, *kind)))
        .collect::<Result<Vec<_>>>()?;

    let names = NAME_PATTERNS
        .iter()
        .map(|def| {
            Ok(CompiledNamePattern {
                regex: compile(def.pattern)?,
                family: def.family,
                reject_after_particle: def.reject_after_particle,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let streets = STREET_PATTERNS
        .iter()
        .map(|pattern| compile(pattern))
        .collect::<Result<Vec<_>>>()?;

    let places: Vec<&str> = known_places().collect();
    let place_forms = cased_forms(&places);
    let models = cased_forms(VEHICLE_MODELS);

    Ok(CompiledPatterns {
        phone: CompiledTable::new(&PHONE_PATTERNS)?,
        email: CompiledTable::new(&EMAIL_PATTERNS)?,
        iban: CompiledTable::new(&IBAN_PATTERNS)?,
        address: CompiledTable::new(&ADDRESS_PATTERNS)?,
        location_markers: CompiledTable::new(&LOCATION_MARKERS)?,
        date: compile(DATE_PATTERN)?,
        national_id,
        names,
        name_before_date: compile(NAME_BEFORE_DATE)?,
        allcaps_name: compile(ALLCAPS_NAME)?,
        partial_name: compile(PARTIAL_NAME)?,
        streets,
        any_street: compile_ci(&format!(
            r"\b[a-zé\-]+{}\b",
            alternation(STREET_SUFFIXES)
        ))?,
        known_places: compile(&format!(r"\b{}\b", alternation(&place_forms)))?,
        context_place: compile(CONTEXT_PLACE)?,
        vehicle_brands: compile(&format!(
            r"\b(?i:{})(?:\s+[A-Z0-9][A-Za-z0-9\-]*)?\b",
            alternation(VEHICLE_BRANDS)
        ))?,
        vehicle_brands_cased: compile(&format!(
            r"\b{}(?:\s+[A-Z0-9][A-Za-z0-9\-]*)?\b",
            alternation(VEHICLE_BRANDS_CASED)
        ))?,
        vehicle_models: compile(&format!(r"\b{}\b", alternation(&models)))?,
        road: compile(ROAD_PATTERN)?,
    })
}

/// Whitelist regexes, matched case-insensitively against detected values
pub fn compile_whitelist(patterns: &[String]) -> Result<Vec<Regex>> {
    patterns.iter().map(|pattern| compile_ci(pattern)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_table_compiles() {
        compile_table(&PHONE_PATTERNS).unwrap();
        compile_table(&EMAIL_PATTERNS).unwrap();
        compile_table(&IBAN_PATTERNS).unwrap();
        compile_table(&ADDRESS_PATTERNS).unwrap();
        compile_table(&LOCATION_MARKERS).unwrap();
        for (pattern, _) in NATIONAL_ID_PATTERNS.iter() {
            compile(pattern).unwrap();
        }
        for def in NAME_PATTERNS.iter() {
            compile(def.pattern).unwrap();
        }
        for pattern in STREET_PATTERNS {
            compile(pattern).unwrap();
        }
        for pattern in [
            DATE_PATTERN,
            NAME_BEFORE_DATE,
            ALLCAPS_NAME,
            PARTIAL_NAME,
            CONTEXT_PLACE,
            ROAD_PATTERN,
        ] {
            compile(pattern).unwrap();
        }
    }

    #[test]
    fn test_phone_table_entries() {
        let compiled = compile_table(&PHONE_PATTERNS).unwrap();
        let by_subtype = |subtype: &str, text: &str| {
            compiled
                .iter()
                .filter(|p| p.subtype == subtype)
                .any(|p| p.regex.is_match(text))
        };
        assert!(by_subtype("BE_LANDLINE", "Tel: 052/26.08.60"));
        assert!(by_subtype("BE_LANDLINE_INTL", "+32 3 217 84 30"));
        assert!(by_subtype("BE_MOBILE", "32489667088"));
        assert!(by_subtype("US_PHONE", "(555) 123-4567"));
        assert!(by_subtype("NL_MOBILE", "+31 6 1234 5678"));
    }

    #[test]
    fn test_iban_table_entries() {
        let compiled = compile_table(&IBAN_PATTERNS).unwrap();
        let hit = |subtype: &str, text: &str| {
            compiled
                .iter()
                .filter(|p| p.subtype == subtype)
                .any(|p| p.regex.is_match(text))
        };
        assert!(hit("BE_IBAN", "BE44 3770 8065 6345"));
        assert!(hit("NL_IBAN", "NL91ABNA0417164300"));
        assert!(hit("GB_IBAN", "GB29 NWBK 6016 1331 9268 19"));
    }

    #[test]
    fn test_alternation_prefers_longest() {
        let re = compile(&format!(r"\b{}\b", alternation(&["Molenbeek", "Sint-Jans-Molenbeek"])))
            .unwrap();
        let m = re.find("in Sint-Jans-Molenbeek gezien").unwrap();
        assert_eq!(m.as_str(), "Sint-Jans-Molenbeek");
    }

    #[test]
    fn test_cased_forms() {
        let forms = cased_forms(&["ducato", "nv200"]);
        assert_eq!(forms, vec!["Ducato", "DUCATO", "Nv200", "NV200"]);
    }
}
