// Copyright 2025
// SPDX-License-Identifier: Apache-2.0
//
// Document sanitizer - reversible PII anonymization
//
// Pipeline: preprocess, pattern and entity detection, conflict resolution,
// placeholder mapping, strategy rendering, back-to-front rewrite.
// - RegexSet prefilters keep multi-pattern scans cheap
// - Copy-on-write preprocessing when nothing needs rejoining
// - Mappings persist as JSON for later decoding

pub mod config;
pub mod decoder;
pub mod detector;
pub mod encoder;
pub mod entity;
pub mod error;
pub mod hybrid;
pub mod mapping;
pub mod masking;
pub mod patterns;
pub mod resolver;
pub mod span;

pub use config::{Backend, Category, HashAlgorithm, Language, SanitizerConfig, StrategyKind};
pub use decoder::{decode, find_placeholders, validate_decode, DecodeValidation};
pub use detector::{validate_bsn, PatternDetector};
pub use encoder::{generate_legend, preprocess, Encoded, Sanitizer};
pub use entity::{map_label, EntityRecognizer, EntitySpan, LazyRecognizer, LexiconRecognizer};
pub use error::{Result, SanitizerError};
pub use hybrid::{HybridMerger, HybridOptions};
pub use mapping::{Mapping, MappingEntry, MappingStatistics, Normalizer};
pub use masking::{AnonymizedValue, EncryptStrategy, Strategy};
pub use resolver::resolve;
pub use span::SpanMatch;
