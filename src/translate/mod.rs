pub mod gemini;

pub use gemini::GeminiTranslator;

use crate::error::{BurnsubError, Result};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use tracing::{info, warn};

#[async_trait]
pub trait Translator: Send + Sync {
    /// Translate each text, returning one entry per text the service
    /// produced. The count may differ from the input on a garbled response.
    async fn translate_batch(&self, texts: &[&str], target_lang: &str) -> Result<Vec<String>>;
    fn name(&self) -> &'static str;
}

/// Exact-match mapping from original text to its replacement.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TranslationMap {
    entries: HashMap<String, String>,
}

impl TranslationMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Map every text to itself.
    pub fn identity<'a>(texts: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            entries: texts
                .into_iter()
                .map(|t| (t.to_string(), t.to_string()))
                .collect(),
        }
    }

    pub fn insert(&mut self, original: String, translated: String) {
        self.entries.insert(original, translated);
    }

    pub fn get(&self, original: &str) -> Option<&str> {
        self.entries.get(original).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Distinct texts in order of first occurrence.
pub fn unique_texts<'a>(texts: &[&'a str]) -> Vec<&'a str> {
    let mut seen = HashSet::new();
    texts.iter().copied().filter(|t| seen.insert(*t)).collect()
}

/// Translate every distinct text in one batch.
///
/// Only configuration errors propagate. Any other failure, including a
/// response with the wrong number of entries, maps each text to itself so
/// the run still produces a usable (untranslated) document.
pub async fn translate_texts(
    translator: &dyn Translator,
    texts: &[&str],
    target_lang: &str,
) -> Result<TranslationMap> {
    if texts.is_empty() {
        return Ok(TranslationMap::new());
    }

    let unique = unique_texts(texts);
    info!(
        "Translating {} distinct texts ({} total) to {} with {}",
        unique.len(),
        texts.len(),
        target_lang,
        translator.name()
    );

    let translations = match translator.translate_batch(&unique, target_lang).await {
        Ok(translations) => translations,
        Err(e) if e.is_fatal() => return Err(e),
        Err(e) => {
            warn!("Translation failed, keeping original text: {}", e);
            return Ok(TranslationMap::identity(unique));
        }
    };

    if translations.len() != unique.len() {
        let mismatch = BurnsubError::TranslationMismatch {
            expected: unique.len(),
            actual: translations.len(),
        };
        warn!("{}, keeping original text", mismatch);
        return Ok(TranslationMap::identity(unique));
    }

    let mut map = TranslationMap::new();
    for (original, translated) in unique.into_iter().zip(translations) {
        let translated = translated.trim();
        let value = if translated.is_empty() {
            original
        } else {
            translated
        };
        map.insert(original.to_string(), value.to_string());
    }

    Ok(map)
}
