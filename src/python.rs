// Copyright 2025
// SPDX-License-Identifier: Apache-2.0
//
// Python bindings for the sanitizer

use pyo3::exceptions::{PyIOError, PyRuntimeError, PyValueError};
use pyo3::prelude::*;
use pyo3::types::{PyDict, PyList};

use crate::sanitizer::mapping::Normalizer;
use crate::sanitizer::{
    decode, Backend, HashAlgorithm, Language, Mapping, Sanitizer, SanitizerConfig,
    SanitizerError, StrategyKind,
};

fn to_py_err(err: SanitizerError) -> PyErr {
    match err {
        SanitizerError::Io(e) => PyIOError::new_err(e.to_string()),
        SanitizerError::BackendUnavailable(_) | SanitizerError::Recognizer { .. } => {
            PyRuntimeError::new_err(err.to_string())
        }
        other => PyValueError::new_err(other.to_string()),
    }
}

fn config_from_py_dict(dict: &Bound<'_, PyDict>) -> PyResult<SanitizerConfig> {
    let mut config = SanitizerConfig::default();

    macro_rules! extract_field {
        ($field:ident) => {
            if let Some(value) = dict.get_item(stringify!($field))? {
                config.$field = value.extract()?;
            }
        };
    }

    macro_rules! parse_field {
        ($field:ident, $ty:ty) => {
            if let Some(value) = dict.get_item(stringify!($field))? {
                let name: String = value.extract()?;
                config.$field = name.parse::<$ty>().map_err(to_py_err)?;
            }
        };
    }

    extract_field!(detect_person);
    extract_field!(detect_phone);
    extract_field!(detect_email);
    extract_field!(detect_iban);
    extract_field!(detect_id);
    extract_field!(detect_dob);
    extract_field!(detect_address);
    extract_field!(detect_street);
    extract_field!(detect_place);
    extract_field!(detect_road);
    extract_field!(detect_vehicle);
    extract_field!(include_org);
    extract_field!(include_misc);
    extract_field!(skip_already_masked);
    extract_field!(chunk_size);
    extract_field!(phone_country_code);
    extract_field!(redaction_text);
    extract_field!(redact_include_category);
    extract_field!(mask_char);
    extract_field!(mask_keep_start);
    extract_field!(mask_keep_end);
    extract_field!(hash_truncate);
    extract_field!(hash_salt);
    extract_field!(encryption_key);
    extract_field!(log_detections);
    extract_field!(whitelist_patterns);

    parse_field!(backend, Backend);
    parse_field!(strategy, StrategyKind);
    parse_field!(language, Language);

    if let Some(value) = dict.get_item("hash_algorithm")? {
        let name: String = value.extract()?;
        config.hash_algorithm = match name.to_lowercase().as_str() {
            "sha256" => HashAlgorithm::Sha256,
            "sha512" => HashAlgorithm::Sha512,
            _ => {
                return Err(PyValueError::new_err(format!(
                    "unknown hash algorithm '{}'",
                    name
                )))
            }
        };
    }

    config.validate().map_err(to_py_err)?;
    Ok(config)
}

/// Reversible document sanitizer
#[pyclass(name = "Sanitizer")]
pub struct PySanitizer {
    inner: Sanitizer,
}

#[pymethods]
impl PySanitizer {
    /// Create a sanitizer from an optional configuration dict.
    ///
    /// Keys mirror `SanitizerConfig`: `backend` ("hybrid", "patterns",
    /// "entity", "auto"), `strategy` ("replace", "redact", "mask", "hash",
    /// "encrypt"), `language`, the `detect_*` flags and strategy options.
    #[new]
    #[pyo3(signature = (config=None))]
    pub fn new(config: Option<&Bound<'_, PyDict>>) -> PyResult<Self> {
        let config = match config {
            Some(dict) => config_from_py_dict(dict)?,
            None => SanitizerConfig::default(),
        };
        let inner = Sanitizer::new(config).map_err(to_py_err)?;
        Ok(Self { inner })
    }

    /// Encode text; returns `(sanitized_text, mapping_json)`
    pub fn encode(&self, text: &str) -> PyResult<(String, String)> {
        let encoded = self.inner.encode(text).map_err(to_py_err)?;
        let json = encoded.mapping.to_json().map_err(to_py_err)?;
        Ok((encoded.text, json))
    }

    /// Encode text with the placeholder legend prepended
    pub fn encode_with_legend(&self, text: &str) -> PyResult<(String, String)> {
        let encoded = self.inner.encode_with_legend(text).map_err(to_py_err)?;
        let json = encoded.mapping.to_json().map_err(to_py_err)?;
        Ok((encoded.text, json))
    }

    /// Restore placeholders using a mapping produced by `encode`
    pub fn decode(&self, text: &str, mapping_json: &str) -> PyResult<String> {
        let normalizer = Normalizer::new(self.inner.config().phone_country_code.clone());
        let mapping = Mapping::from_json_with(mapping_json, normalizer).map_err(to_py_err)?;
        Ok(decode(text, &mapping))
    }

    /// Resolved detections:
    /// ```python
    /// [{"text": "jan@example.com", "start": 5, "end": 20, "category": "EMAIL", "confidence": 0.99}]
    /// ```
    /// Offsets index the Python `str` (code points), so `text[start:end]`
    /// is the match.
    pub fn detect(&self, text: &str) -> PyResult<Py<PyAny>> {
        let matches = self.inner.detect(text).map_err(to_py_err)?;

        Python::attach(|py| {
            let py_list = PyList::empty(py);
            for m in matches {
                let (start, end) = m.char_range(text);
                let item = PyDict::new(py);
                item.set_item("text", m.text)?;
                item.set_item("start", start)?;
                item.set_item("end", end)?;
                item.set_item("category", m.category.as_str())?;
                item.set_item("confidence", m.confidence)?;
                py_list.append(item)?;
            }
            Ok(py_list.into_any().unbind())
        })
    }

    /// Base64 session key when the strategy is "encrypt"
    #[getter]
    pub fn encryption_key(&self) -> Option<String> {
        self.inner.strategy().encryption_key()
    }
}
