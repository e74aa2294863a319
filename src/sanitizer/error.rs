// Copyright 2025
// SPDX-License-Identifier: Apache-2.0
//
// Error taxonomy for the sanitizer pipeline

use thiserror::Error;

use super::config::{Backend, Category};

/// Errors surfaced by the sanitizer.
///
/// Detectors never fail: a missed or spurious span is a heuristic miss, not an
/// error. Only configuration, backend availability, persistence and crypto
/// problems end up here.
#[derive(Debug, Error)]
pub enum SanitizerError {
    #[error("unknown backend '{0}' (expected one of: hybrid, patterns, entity, auto)")]
    UnknownBackend(String),

    #[error("unknown strategy '{0}' (expected one of: replace, redact, mask, hash, encrypt)")]
    UnknownStrategy(String),

    #[error("unsupported language '{0}' (supported: nl, en, de, fr, it, es)")]
    UnsupportedLanguage(String),

    #[error("unknown category '{0}'")]
    UnknownCategory(String),

    #[error("backend '{0}' is not available")]
    BackendUnavailable(Backend),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to compile pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("malformed mapping: {0}")]
    MappingFormat(String),

    #[error("no {0} placeholders left (limit is {0}_9999)")]
    PlaceholdersExhausted(Category),

    #[error("encryption error: {0}")]
    Crypto(String),

    #[error("entity recognizer '{name}' failed: {reason}")]
    Recognizer { name: String, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SanitizerError>;
