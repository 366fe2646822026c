//! Gemini-based translation using a `---` delimited batch protocol.

use crate::error::Result;
use crate::gemini::{ClientSource, GenerateContentRequest};
use crate::translate::Translator;
use async_trait::async_trait;
use tracing::debug;

/// Line that separates snippets in both the request and the response.
const SEPARATOR: &str = "---";

/// Translator using Google Gemini API.
pub struct GeminiTranslator {
    source: ClientSource,
}

impl GeminiTranslator {
    pub fn new(source: ClientSource) -> Self {
        Self { source }
    }

    /// Build the translation prompt.
    fn build_prompt(texts: &[&str], target_lang: &str) -> String {
        let lang_name = language_code_to_name(target_lang);
        let joined = texts.join(format!("\n{SEPARATOR}\n").as_str());

        format!(
            "Translate the following text snippets to {lang_name}. Provide the translation for each \
snippet on a new line, in the same order, separated by a line containing only {SEPARATOR}. \
Do not add any extra formatting or numbering.

TEXTS TO TRANSLATE:
{SEPARATOR}
{joined}
{SEPARATOR}
"
        )
    }

    /// Split a response on lines holding only the separator.
    ///
    /// The model sometimes echoes the fence around the whole list. A leading
    /// or trailing empty entry is dropped only while there are more entries
    /// than `expected`, so a genuinely empty last translation survives.
    fn parse_response(response: &str, expected: usize) -> Vec<String> {
        let normalized = response.replace("\r\n", "\n");
        let body = normalized.trim();
        if body.is_empty() {
            return Vec::new();
        }

        let mut segments: Vec<Vec<&str>> = vec![Vec::new()];
        for line in body.lines() {
            if line.trim() == SEPARATOR {
                segments.push(Vec::new());
            } else if let Some(current) = segments.last_mut() {
                current.push(line);
            }
        }

        let mut entries: Vec<String> = segments
            .iter()
            .map(|lines| lines.join("\n").trim().to_string())
            .collect();

        if entries.len() > expected && entries.first().is_some_and(|e| e.is_empty()) {
            entries.remove(0);
        }
        if entries.len() > expected && entries.last().is_some_and(|e| e.is_empty()) {
            entries.pop();
        }

        entries
    }
}

#[async_trait]
impl Translator for GeminiTranslator {
    async fn translate_batch(&self, texts: &[&str], target_lang: &str) -> Result<Vec<String>> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        let client = self.source.get()?;
        debug!("Translating {} text(s) to {}", texts.len(), target_lang);

        let request = GenerateContentRequest::text(Self::build_prompt(texts, target_lang));
        let response = client.generate(&request).await?;
        debug!(
            "Translation response: {}",
            response.chars().take(500).collect::<String>()
        );

        Ok(Self::parse_response(&response, texts.len()))
    }

    fn name(&self) -> &'static str {
        "gemini"
    }
}

/// Convert language code to human-readable name for better prompting.
fn language_code_to_name(code: &str) -> &'static str {
    let lowercase = code.to_lowercase();
    match lowercase.as_str() {
        "en" => "English",
        "es" => "Spanish",
        "fr" => "French",
        "de" => "German",
        "it" => "Italian",
        "pt" => "Portuguese",
        "ru" => "Russian",
        "ja" => "Japanese",
        "ko" => "Korean",
        "zh" => "Chinese",
        "ar" => "Arabic",
        "hi" => "Hindi",
        "th" => "Thai",
        "vi" => "Vietnamese",
        "id" => "Indonesian",
        "ms" => "Malay",
        "tl" => "Tagalog",
        "nl" => "Dutch",
        "pl" => "Polish",
        "tr" => "Turkish",
        "uk" => "Ukrainian",
        "cs" => "Czech",
        "sv" => "Swedish",
        "el" => "Greek",
        "he" => "Hebrew",
        "bn" => "Bengali",
        // For unknown codes, return a static fallback
        _ => "the target language",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_prompt() {
        let prompt = GeminiTranslator::build_prompt(&["Hello", "Big SALE"], "vi");
        assert!(prompt.contains("to Vietnamese"));
        assert!(prompt.contains("---\nHello\n---\nBig SALE\n---\n"));
        assert!(prompt.contains("same order"));
    }

    #[test]
    fn test_parse_response() {
        let results = GeminiTranslator::parse_response("Xin chào\n---\nGiảm giá lớn", 2);
        assert_eq!(results, vec!["Xin chào", "Giảm giá lớn"]);
    }

    #[test]
    fn test_parse_response_with_fences_and_crlf() {
        let results = GeminiTranslator::parse_response("---\r\nXin chào \r\n---\r\n Tạm biệt\r\n---\r\n", 2);
        assert_eq!(results, vec!["Xin chào", "Tạm biệt"]);
    }

    #[test]
    fn test_parse_response_single() {
        assert_eq!(GeminiTranslator::parse_response("  chào \n", 1), vec!["chào"]);
        assert!(GeminiTranslator::parse_response("   ", 1).is_empty());
    }

    #[test]
    fn test_parse_response_keeps_dashes_inside_text() {
        let results = GeminiTranslator::parse_response("---- sale ----\n---\nok", 2);
        assert_eq!(results, vec!["---- sale ----", "ok"]);
    }

    #[test]
    fn test_parse_response_without_separators_is_one_entry() {
        let results = GeminiTranslator::parse_response("one\ntwo", 2);
        assert_eq!(results.len(), 1);
    }

    #[test]
    fn test_parse_response_keeps_empty_last_entry() {
        assert_eq!(GeminiTranslator::parse_response("a\n---\n", 2), vec!["a", ""]);
        assert_eq!(GeminiTranslator::parse_response("a\n---\n", 1), vec!["a"]);
        assert_eq!(
            GeminiTranslator::parse_response("---\n\n---\nb\n---", 2),
            vec!["", "b"]
        );
    }

    #[test]
    fn test_parse_response_multiline_entry() {
        let results = GeminiTranslator::parse_response("line one\nline two\n---\nok", 2);
        assert_eq!(results, vec!["line one\nline two", "ok"]);
    }

    #[test]
    fn test_language_code_to_name() {
        assert_eq!(language_code_to_name("vi"), "Vietnamese");
        assert_eq!(language_code_to_name("JA"), "Japanese");
        assert_eq!(language_code_to_name("xyz"), "the target language");
    }
}
