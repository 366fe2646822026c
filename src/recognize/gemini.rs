use crate::error::{BurnsubError, Result};
use crate::gemini::{
    ClientSource, Content, GenerateContentRequest, GenerationConfig, InlineData, Part,
};
use crate::recognize::{RecognizedSpan, Recognizer};
use crate::video::Frame;
use async_trait::async_trait;
use base64::Engine;
use regex::Regex;
use serde_json::json;
use std::sync::OnceLock;
use tracing::debug;

const OCR_PROMPT: &str = "You are an expert OCR system. Analyze the image to find all text blocks. \
Provide the text and bounding box for each. Respond ONLY with a JSON object matching the provided \
schema. If no text is found, return an empty array.";

/// Text recognizer using Gemini vision with structured JSON output.
pub struct GeminiRecognizer {
    source: ClientSource,
}

impl GeminiRecognizer {
    pub fn new(source: ClientSource) -> Self {
        Self { source }
    }

    /// Response schema: an array of `{text, boundingBox{x, y, width, height}}`.
    fn response_schema() -> serde_json::Value {
        json!({
            "type": "ARRAY",
            "items": {
                "type": "OBJECT",
                "properties": {
                    "text": {
                        "type": "STRING",
                        "description": "The recognized text content."
                    },
                    "boundingBox": {
                        "type": "OBJECT",
                        "properties": {
                            "x": { "type": "NUMBER" },
                            "y": { "type": "NUMBER" },
                            "width": { "type": "NUMBER" },
                            "height": { "type": "NUMBER" }
                        },
                        "required": ["x", "y", "width", "height"]
                    }
                },
                "required": ["text", "boundingBox"]
            }
        })
    }

    fn build_request(frame: &Frame) -> GenerateContentRequest {
        let data = base64::engine::general_purpose::STANDARD.encode(&frame.image);

        GenerateContentRequest {
            contents: vec![Content {
                parts: vec![
                    Part::InlineData {
                        inline_data: InlineData {
                            mime_type: "image/jpeg".to_string(),
                            data,
                        },
                    },
                    Part::Text {
                        text: OCR_PROMPT.to_string(),
                    },
                ],
            }],
            generation_config: Some(GenerationConfig {
                temperature: None,
                response_mime_type: Some("application/json".to_string()),
                response_schema: Some(Self::response_schema()),
            }),
        }
    }

    /// Parse the model's JSON array, tolerating a surrounding markdown fence.
    fn parse_spans(text: &str) -> Result<Vec<RecognizedSpan>> {
        static FENCE: OnceLock<Regex> = OnceLock::new();
        let fence = FENCE.get_or_init(|| {
            Regex::new(r"(?s)^\s*```(?:json)?\s*(.*?)\s*```\s*$").expect("Invalid regex")
        });

        let body = fence
            .captures(text)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str())
            .unwrap_or(text)
            .trim();

        serde_json::from_str(body).map_err(|e| {
            BurnsubError::Recognition(format!(
                "Malformed recognition response: {} ({})",
                e,
                body.chars().take(200).collect::<String>()
            ))
        })
    }
}

#[async_trait]
impl Recognizer for GeminiRecognizer {
    async fn recognize(&self, frame: &Frame) -> Result<Vec<RecognizedSpan>> {
        let client = self.source.get()?;

        debug!(
            "Recognizing frame at {:.3}s with {} ({} bytes)",
            frame.time,
            client.model(),
            frame.image.len()
        );

        let request = Self::build_request(frame);
        let text = client.generate(&request).await?;
        let spans = Self::parse_spans(&text)?;

        debug!("Frame at {:.3}s: {} text blocks", frame.time, spans.len());
        Ok(spans)
    }

    fn name(&self) -> &'static str {
        "Google Gemini"
    }
}
