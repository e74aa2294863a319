// Copyright 2025
// SPDX-License-Identifier: Apache-2.0
//
// Anonymization strategies for detected values

use std::collections::BTreeMap;
use std::fmt;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use chacha20poly1305::aead::{Aead, AeadCore, KeyInit, OsRng};
use chacha20poly1305::{ChaCha20Poly1305, Key, Nonce};
use serde::Serialize;
use sha2::{Digest, Sha256, Sha512};

use super::config::{Category, HashAlgorithm, SanitizerConfig, StrategyKind};
use super::error::{Result, SanitizerError};

const NONCE_LEN: usize = 12;
const TAG_LEN: usize = 16;

/// Result of anonymizing one value
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnonymizedValue {
    pub original: String,
    pub anonymized: String,
    pub category: Category,
    pub strategy: StrategyKind,
    /// Strategy secrets, e.g. the encryption key
    pub metadata: BTreeMap<String, String>,
}

/// `[CATEGORY]`, or a fixed marker
#[derive(Debug, Clone)]
pub struct RedactStrategy {
    pub marker: String,
    pub include_category: bool,
}

impl Default for RedactStrategy {
    fn default() -> Self {
        Self {
            marker: "[REDACTED]".to_string(),
            include_category: true,
        }
    }
}

impl RedactStrategy {
    pub fn redact(&self, category: Category) -> String {
        if self.include_category {
            format!("[{}]", category)
        } else {
            self.marker.clone()
        }
    }
}

/// Format-aware partial masking
#[derive(Debug, Clone)]
pub struct MaskStrategy {
    pub mask_char: char,
    pub keep_start: usize,
    pub keep_end: usize,
}

impl Default for MaskStrategy {
    fn default() -> Self {
        Self {
            mask_char: '*',
            keep_start: 1,
            keep_end: 2,
        }
    }
}

impl MaskStrategy {
    pub fn mask(&self, value: &str, category: Category) -> String {
        match category {
            Category::Email => self.mask_email(value),
            Category::Phone => self.mask_phone(value),
            Category::Iban => self.mask_iban(value),
            _ => self.mask_generic(value),
        }
    }

    fn fill(&self, count: usize) -> String {
        std::iter::repeat(self.mask_char).take(count).collect()
    }

    /// First char kept, rest masked
    fn mask_head(&self, part: &str) -> String {
        let mut chars = part.chars();
        match chars.next() {
            Some(first) => format!("{}{}", first, self.fill(chars.count())),
            None => String::new(),
        }
    }

    /// Keeps the first char of the local part and of the domain label:
    /// `jan@example.com` becomes `j**@e******.com`
    pub fn mask_email(&self, value: &str) -> String {
        let Some((local, domain)) = value.rsplit_once('@') else {
            return self.mask_generic(value);
        };

        let local = self.mask_head(local);
        match domain.rsplit_once('.') {
            Some((name, tld)) => format!("{}@{}.{}", local, self.mask_head(name), tld),
            None => format!("{}@{}", local, self.fill(domain.chars().count())),
        }
    }

    /// First and last two digits kept, punctuation left where it was
    pub fn mask_phone(&self, value: &str) -> String {
        let digit_count = value.chars().filter(|c| c.is_ascii_digit()).count();
        if digit_count <= 4 {
            return self.fill(value.chars().count());
        }

        let mut seen = 0;
        value
            .chars()
            .map(|c| {
                if !c.is_ascii_digit() {
                    return c;
                }
                let keep = seen < 2 || seen >= digit_count - 2;
                seen += 1;
                if keep {
                    c
                } else {
                    self.mask_char
                }
            })
            .collect()
    }

    /// Country code, check digits and last four kept; grouped by four if
    /// the input was
    pub fn mask_iban(&self, value: &str) -> String {
        let clean: Vec<char> = value.chars().filter(|c| *c != ' ').collect();
        if clean.len() < 8 {
            return self.fill(value.chars().count());
        }

        let masked: Vec<char> = clean[..4]
            .iter()
            .copied()
            .chain(std::iter::repeat(self.mask_char).take(clean.len() - 8))
            .chain(clean[clean.len() - 4..].iter().copied())
            .collect();

        if value.contains(' ') {
            masked
                .chunks(4)
                .map(|group| group.iter().collect::<String>())
                .collect::<Vec<_>>()
                .join(" ")
        } else {
            masked.into_iter().collect()
        }
    }

    /// Per word: keep `keep_start` and `keep_end` chars, mask the middle.
    /// Words too short to keep anything are masked whole.
    pub fn mask_generic(&self, value: &str) -> String {
        value
            .split_whitespace()
            .map(|word| {
                let chars: Vec<char> = word.chars().collect();
                if chars.len() <= self.keep_start + self.keep_end {
                    return self.fill(chars.len());
                }
                let head: String = chars[..self.keep_start].iter().collect();
                let tail: String = chars[chars.len() - self.keep_end..].iter().collect();
                format!(
                    "{}{}{}",
                    head,
                    self.fill(chars.len() - self.keep_start - self.keep_end),
                    tail
                )
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Salted one-way digest, lowercase hex
#[derive(Debug, Clone, Default)]
pub struct HashStrategy {
    pub algorithm: HashAlgorithm,
    pub truncate: Option<usize>,
    pub salt: String,
}

impl HashStrategy {
    pub fn hash(&self, value: &str, category: Category) -> String {
        let salted = format!("{}{}{}", self.salt, value, category);
        let mut hex = match self.algorithm {
            HashAlgorithm::Sha256 => format!("{:x}", Sha256::digest(salted.as_bytes())),
            HashAlgorithm::Sha512 => format!("{:x}", Sha512::digest(salted.as_bytes())),
        };
        if let Some(n) = self.truncate {
            hex.truncate(n);
        }
        hex
    }
}

/// Authenticated encryption with a per-session key.
///
/// Tokens are `base64(nonce || ciphertext)`; every token carries a fresh
/// random nonce, so equal values encrypt differently.
#[derive(Clone)]
pub struct EncryptStrategy {
    key: Key,
    cipher: ChaCha20Poly1305,
}

impl fmt::Debug for EncryptStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncryptStrategy").finish_non_exhaustive()
    }
}

impl EncryptStrategy {
    /// Fresh random key
    pub fn generate() -> Self {
        let key = ChaCha20Poly1305::generate_key(&mut OsRng);
        let cipher = ChaCha20Poly1305::new(&key);
        Self { key, cipher }
    }

    /// Key from its base64 form (32 bytes once decoded)
    pub fn from_base64(encoded: &str) -> Result<Self> {
        let bytes = BASE64
            .decode(encoded.trim())
            .map_err(|e| SanitizerError::Crypto(format!("invalid key encoding: {}", e)))?;
        if bytes.len() != 32 {
            return Err(SanitizerError::Crypto(format!(
                "key must be 32 bytes, got {}",
                bytes.len()
            )));
        }
        let key = *Key::from_slice(&bytes);
        let cipher = ChaCha20Poly1305::new(&key);
        Ok(Self { key, cipher })
    }

    pub fn key_base64(&self) -> String {
        BASE64.encode(self.key.as_slice())
    }

    pub fn encrypt(&self, value: &str) -> Result<String> {
        let nonce = ChaCha20Poly1305::generate_nonce(&mut OsRng);
        let ciphertext = self
            .cipher
            .encrypt(&nonce, value.as_bytes())
            .map_err(|e| SanitizerError::Crypto(e.to_string()))?;

        let mut token = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        token.extend_from_slice(nonce.as_slice());
        token.extend_from_slice(&ciphertext);
        Ok(BASE64.encode(token))
    }

    pub fn decrypt(&self, token: &str) -> Result<String> {
        let bytes = BASE64
            .decode(token.trim())
            .map_err(|e| SanitizerError::Crypto(format!("invalid token encoding: {}", e)))?;
        if bytes.len() < NONCE_LEN + TAG_LEN {
            return Err(SanitizerError::Crypto("token too short".to_string()));
        }

        let (nonce, ciphertext) = bytes.split_at(NONCE_LEN);
        let plaintext = self
            .cipher
            .decrypt(Nonce::from_slice(nonce), ciphertext)
            .map_err(|_| SanitizerError::Crypto("token failed authentication".to_string()))?;
        String::from_utf8(plaintext).map_err(|e| SanitizerError::Crypto(e.to_string()))
    }
}

/// The closed set of anonymization strategies
#[derive(Debug, Clone)]
pub enum Strategy {
    Replace,
    Redact(RedactStrategy),
    Mask(MaskStrategy),
    Hash(HashStrategy),
    Encrypt(EncryptStrategy),
}

impl Strategy {
    pub fn from_config(config: &SanitizerConfig) -> Result<Self> {
        let strategy = match config.strategy {
            StrategyKind::Replace => Strategy::Replace,
            StrategyKind::Redact => Strategy::Redact(RedactStrategy {
                marker: config.redaction_text.clone(),
                include_category: config.redact_include_category,
            }),
            StrategyKind::Mask => Strategy::Mask(MaskStrategy {
                mask_char: config.mask_char,
                keep_start: config.mask_keep_start,
                keep_end: config.mask_keep_end,
            }),
            StrategyKind::Hash => Strategy::Hash(HashStrategy {
                algorithm: config.hash_algorithm,
                truncate: config.hash_truncate,
                salt: config.hash_salt.clone(),
            }),
            StrategyKind::Encrypt => Strategy::Encrypt(match &config.encryption_key {
                Some(key) => EncryptStrategy::from_base64(key)?,
                None => EncryptStrategy::generate(),
            }),
        };
        Ok(strategy)
    }

    pub fn kind(&self) -> StrategyKind {
        match self {
            Strategy::Replace => StrategyKind::Replace,
            Strategy::Redact(_) => StrategyKind::Redact,
            Strategy::Mask(_) => StrategyKind::Mask,
            Strategy::Hash(_) => StrategyKind::Hash,
            Strategy::Encrypt(_) => StrategyKind::Encrypt,
        }
    }

    /// Replace reverses through the mapping, encrypt through the key
    pub fn supports_reversal(&self) -> bool {
        matches!(self, Strategy::Replace | Strategy::Encrypt(_))
    }

    /// Session key for the encrypt strategy
    pub fn encryption_key(&self) -> Option<String> {
        match self {
            Strategy::Encrypt(e) => Some(e.key_base64()),
            _ => None,
        }
    }

    /// Render the replacement for `value`. `placeholder` is the value's
    /// mapping placeholder; only the replace strategy emits it.
    pub fn anonymize(
        &self,
        value: &str,
        category: Category,
        placeholder: &str,
    ) -> Result<AnonymizedValue> {
        let mut metadata = BTreeMap::new();
        let anonymized = match self {
            Strategy::Replace => placeholder.to_string(),
            Strategy::Redact(r) => r.redact(category),
            Strategy::Mask(m) => m.mask(value, category),
            Strategy::Hash(h) => h.hash(value, category),
            Strategy::Encrypt(e) => {
                metadata.insert("key".to_string(), e.key_base64());
                e.encrypt(value)?
            }
        };

        Ok(AnonymizedValue {
            original: value.to_string(),
            anonymized,
            category,
            strategy: self.kind(),
            metadata,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_email_exact() {
        let mask = MaskStrategy::default();
        assert_eq!(mask.mask_email("jan@example.com"), "j**@e******.com");
        assert_eq!(mask.mask_email("a@localhost"), "a@*********");
    }

    #[test]
    fn test_mask_phone_keeps_punctuation() {
        let mask = MaskStrategy::default();
        assert_eq!(mask.mask_phone("0612345678"), "06******78");
        assert_eq!(mask.mask_phone("052/26.08.60"), "05*/**.**.60");
        assert_eq!(mask.mask_phone("+32 4"), "*****");
    }

    #[test]
    fn test_mask_iban_grouping() {
        let mask = MaskStrategy::default();
        assert_eq!(mask.mask_iban("BE71 0961 2345 6769"), "BE71 **** **** 6769");
        assert_eq!(mask.mask_iban("BE71096123456769"), "BE71********6769");
        assert_eq!(mask.mask_iban("BE71"), "****");
    }

    #[test]
    fn test_mask_generic_per_word() {
        let mask = MaskStrategy::default();
        assert_eq!(mask.mask_generic("Jan de Vries"), "*** ** V**es");
        let wide = MaskStrategy {
            mask_char: '#',
            keep_start: 2,
            keep_end: 0,
        };
        assert_eq!(wide.mask_generic("Antwerpen"), "An#######");
    }

    #[test]
    fn test_redact() {
        let redact = RedactStrategy::default();
        assert_eq!(redact.redact(Category::Person), "[PERSON]");
        let plain = RedactStrategy {
            include_category: false,
            ..Default::default()
        };
        assert_eq!(plain.redact(Category::Person), "[REDACTED]");
    }

    #[test]
    fn test_hash_is_salted_and_truncated() {
        let hash = HashStrategy {
            truncate: Some(16),
            ..Default::default()
        };
        assert_eq!(hash.hash("Jan", Category::Person), "8c795c12416245ec");

        let salted = HashStrategy {
            truncate: Some(16),
            salt: "salt".to_string(),
            ..Default::default()
        };
        assert_eq!(salted.hash("Jan", Category::Person), "e8bff1cac52b279c");

        let full = HashStrategy {
            algorithm: HashAlgorithm::Sha512,
            truncate: None,
            salt: String::new(),
        };
        assert_eq!(full.hash("x", Category::Misc).len(), 128);
    }

    #[test]
    fn test_encrypt_round_trip() {
        let strategy = EncryptStrategy::generate();
        let token = strategy.encrypt("Jan de Vries").unwrap();
        assert_ne!(token, "Jan de Vries");
        assert_eq!(strategy.decrypt(&token).unwrap(), "Jan de Vries");

        // Same key, new instance
        let again = EncryptStrategy::from_base64(&strategy.key_base64()).unwrap();
        assert_eq!(again.decrypt(&token).unwrap(), "Jan de Vries");
    }

    #[test]
    fn test_decrypt_rejects_tampering() {
        let strategy = EncryptStrategy::generate();
        let other = EncryptStrategy::generate();
        let token = strategy.encrypt("secret").unwrap();
        assert!(matches!(other.decrypt(&token), Err(SanitizerError::Crypto(_))));
        assert!(matches!(strategy.decrypt("AAAA"), Err(SanitizerError::Crypto(_))));
        assert!(matches!(strategy.decrypt("not base64!"), Err(SanitizerError::Crypto(_))));
    }

    #[test]
    fn test_encrypt_metadata_carries_key() {
        let strategy = Strategy::Encrypt(EncryptStrategy::generate());
        let value = strategy.anonymize("Gent", Category::Place, "PLACE_001").unwrap();
        assert_eq!(value.metadata.get("key"), strategy.encryption_key().as_ref());
        assert!(strategy.supports_reversal());
    }

    #[test]
    fn test_from_config() {
        let config = SanitizerConfig {
            strategy: StrategyKind::Mask,
            mask_char: 'x',
            ..Default::default()
        };
        let strategy = Strategy::from_config(&config).unwrap();
        assert_eq!(strategy.kind(), StrategyKind::Mask);
        assert!(!strategy.supports_reversal());
        let value = strategy
            .anonymize("jan@example.com", Category::Email, "EMAIL_001")
            .unwrap();
        assert_eq!(value.anonymized, "jxx@exxxxxx.com");
    }

    #[test]
    fn test_replace_emits_placeholder() {
        let value = Strategy::Replace
            .anonymize("Jan", Category::Person, "PERSON_001")
            .unwrap();
        assert_eq!(value.anonymized, "PERSON_001");
        assert!(value.metadata.is_empty());
    }

    #[test]
    fn test_from_config_bad_key() {
        let config = SanitizerConfig {
            strategy: StrategyKind::Encrypt,
            encryption_key: Some("c2hvcnQ=".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            Strategy::from_config(&config),
            Err(SanitizerError::Crypto(_))
        ));
    }
}
