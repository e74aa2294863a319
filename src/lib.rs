// Copyright 2025
// SPDX-License-Identifier: Apache-2.0
//
// Reversible PII detection and placeholder anonymization
// Optional Python bindings through PyO3 (feature `python`)

// PyO3 macros expand to non-local impls
#![cfg_attr(feature = "python", allow(non_local_definitions))]

pub mod logging;
pub mod sanitizer;

#[cfg(feature = "python")]
mod python;

pub use sanitizer::{
    decode, validate_decode, Backend, Category, Encoded, Language, Mapping, Result, Sanitizer,
    SanitizerConfig, SanitizerError, StrategyKind,
};

/// Python module: doc_sanitizer
///
/// # Examples
///
/// ```python
/// from doc_sanitizer import Sanitizer
///
/// sanitizer = Sanitizer({"backend": "patterns", "strategy": "replace"})
/// text, mapping_json = sanitizer.encode("Mail jan@example.com")
/// print(text)  # "Mail EMAIL_001"
///
/// restored = sanitizer.decode(text, mapping_json)
/// print(restored)  # "Mail jan@example.com"
/// ```
#[cfg(feature = "python")]
#[pyo3::pymodule]
fn doc_sanitizer(m: &pyo3::Bound<'_, pyo3::types::PyModule>) -> pyo3::PyResult<()> {
    use pyo3::prelude::*;

    m.add_class::<python::PySanitizer>()?;

    m.add("__version__", env!("CARGO_PKG_VERSION"))?;
    m.add(
        "__doc__",
        "Reversible PII detection and placeholder anonymization",
    )?;

    Ok(())
}
