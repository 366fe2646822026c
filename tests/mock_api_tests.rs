//! Mock API tests for the Gemini recognizer and translator
//!
//! These tests run the real HTTP clients against a local wiremock server.

use burnsub::error::BurnsubError;
use burnsub::gemini::{ClientSource, GeminiClient, GenerateContentRequest};
use burnsub::recognize::{GeminiRecognizer, RecognitionOrchestrator, Recognizer};
use burnsub::translate::{translate_texts, GeminiTranslator, Translator};
use burnsub::video::Frame;
use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{body_partial_json, body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ENDPOINT: &str = "/v1beta/models/gemini-2.5-flash:generateContent";

fn client_for(server: &MockServer) -> GeminiClient {
    GeminiClient::new("test-key".to_string()).with_base_url(format!("{}/v1beta", server.uri()))
}

fn candidate(text: &str) -> serde_json::Value {
    json!({
        "candidates": [
            { "content": { "parts": [ { "text": text } ], "role": "model" } }
        ]
    })
}

fn jpeg_frame(time: f64) -> Frame {
    Frame {
        time,
        image: vec![0xFF, 0xD8, 0xFF, 0xD9],
    }
}

// ============================================================================
// Client Tests
// ============================================================================

mod client_tests {
    use super::*;

    #[tokio::test]
    async fn test_sends_key_header_and_returns_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(ENDPOINT))
            .and(header("x-goog-api-key", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(candidate("pong")))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let text = client
            .generate(&GenerateContentRequest::text("ping"))
            .await
            .unwrap();
        assert_eq!(text, "pong");
    }

    #[tokio::test]
    async fn test_http_error_is_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(ENDPOINT))
            .respond_with(ResponseTemplate::new(500).set_body_string("backend unavailable"))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .generate(&GenerateContentRequest::text("ping"))
            .await
            .unwrap_err();
        assert!(matches!(err, BurnsubError::Api(ref m) if m.contains("backend unavailable")));
        assert!(!err.is_fatal());
    }

    #[tokio::test]
    async fn test_empty_candidates_is_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(ENDPOINT))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "candidates": [] })))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .generate(&GenerateContentRequest::text("ping"))
            .await
            .unwrap_err();
        assert!(matches!(err, BurnsubError::Api(_)));
    }

    #[tokio::test]
    async fn test_missing_key_is_config_error() {
        // No server involved: the key is checked before any request.
        let recognizer = GeminiRecognizer::new(ClientSource::lazy(None, "gemini-2.5-flash"));
        let err = recognizer.recognize(&jpeg_frame(0.0)).await.unwrap_err();
        assert!(matches!(err, BurnsubError::Config(_)));
        assert!(err.is_fatal());
    }
}

// ============================================================================
// Recognizer Tests
// ============================================================================

mod recognizer_tests {
    use super::*;

    #[tokio::test]
    async fn test_recognize_requests_structured_json() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(ENDPOINT))
            .and(body_partial_json(json!({
                "generation_config": { "response_mime_type": "application/json" }
            })))
            .and(body_string_contains("\"data\":\"/9j/2Q==\""))
            .respond_with(ResponseTemplate::new(200).set_body_json(candidate(
                r#"[{"text":"hi","boundingBox":{"x":10,"y":20,"width":4,"height":6}}]"#,
            )))
            .expect(1)
            .mount(&server)
            .await;

        let recognizer = GeminiRecognizer::new(ClientSource::fixed(client_for(&server)));
        let spans = recognizer.recognize(&jpeg_frame(0.5)).await.unwrap();

        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].text, "hi");
        assert_eq!(spans[0].bounding_box.center(), (12.0, 23.0));
    }

    #[tokio::test]
    async fn test_recognize_accepts_fenced_json() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(ENDPOINT))
            .respond_with(ResponseTemplate::new(200).set_body_json(candidate(
                "```json\n[{\"text\":\"SALE\",\"boundingBox\":{\"x\":0,\"y\":0,\"width\":8,\"height\":2}}]\n```",
            )))
            .mount(&server)
            .await;

        let recognizer = GeminiRecognizer::new(ClientSource::fixed(client_for(&server)));
        let spans = recognizer.recognize(&jpeg_frame(0.0)).await.unwrap();
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].text, "SALE");
    }

    #[tokio::test]
    async fn test_recognize_malformed_payload() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(ENDPOINT))
            .respond_with(ResponseTemplate::new(200).set_body_json(candidate("not json at all")))
            .mount(&server)
            .await;

        let recognizer = GeminiRecognizer::new(ClientSource::fixed(client_for(&server)));
        let err = recognizer.recognize(&jpeg_frame(0.0)).await.unwrap_err();
        assert!(matches!(err, BurnsubError::Recognition(_)));
        assert!(!err.is_fatal());
    }

    #[tokio::test]
    async fn test_orchestrator_survives_server_errors() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(ENDPOINT))
            .respond_with(ResponseTemplate::new(503))
            .expect(3)
            .mount(&server)
            .await;

        let recognizer: Arc<dyn Recognizer> =
            Arc::new(GeminiRecognizer::new(ClientSource::fixed(client_for(&server))));
        let orchestrator = RecognitionOrchestrator::new(recognizer).with_concurrency(2);

        let frames = vec![jpeg_frame(0.0), jpeg_frame(0.5), jpeg_frame(1.0)];
        let (results, stats) = orchestrator
            .process_frames(frames, &|_: f64| {})
            .await
            .unwrap();

        assert_eq!(results.len(), 3);
        assert!(results.iter().all(|r| r.spans.is_empty()));
        assert_eq!(stats.failed_frames, 3);
    }
}

// ============================================================================
// Translator Tests
// ============================================================================

mod translator_tests {
    use super::*;

    #[tokio::test]
    async fn test_translate_batch_splits_on_separator() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(ENDPOINT))
            .and(body_string_contains("TEXTS TO TRANSLATE"))
            .and(body_string_contains("Vietnamese"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(candidate("xin chào\n---\ntạm biệt\n")),
            )
            .expect(1)
            .mount(&server)
            .await;

        let translator = GeminiTranslator::new(ClientSource::fixed(client_for(&server)));
        let out = translator
            .translate_batch(&["hello", "goodbye"], "vi")
            .await
            .unwrap();
        assert_eq!(out, vec!["xin chào", "tạm biệt"]);
    }

    #[tokio::test]
    async fn test_translate_texts_maps_duplicates() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(ENDPOINT))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(candidate("---\nchào\n---\nbán\n---")),
            )
            .expect(1)
            .mount(&server)
            .await;

        let translator = GeminiTranslator::new(ClientSource::fixed(client_for(&server)));
        let map = translate_texts(&translator, &["hi", "sale", "hi"], "vi")
            .await
            .unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map.get("hi"), Some("chào"));
        assert_eq!(map.get("sale"), Some("bán"));
    }

    #[tokio::test]
    async fn test_translate_texts_empty_last_entry_falls_back_alone() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(ENDPOINT))
            .respond_with(ResponseTemplate::new(200).set_body_json(candidate("xin chào\n---\n")))
            .mount(&server)
            .await;

        let translator = GeminiTranslator::new(ClientSource::fixed(client_for(&server)));
        let map = translate_texts(&translator, &["hello", "SALE"], "vi")
            .await
            .unwrap();
        assert_eq!(map.get("hello"), Some("xin chào"));
        assert_eq!(map.get("SALE"), Some("SALE"));
    }

    #[tokio::test]
    async fn test_translate_texts_count_mismatch_is_identity() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(ENDPOINT))
            .respond_with(ResponseTemplate::new(200).set_body_json(candidate("only one line")))
            .mount(&server)
            .await;

        let translator = GeminiTranslator::new(ClientSource::fixed(client_for(&server)));
        let map = translate_texts(&translator, &["a", "b"], "vi").await.unwrap();
        assert_eq!(map.get("a"), Some("a"));
        assert_eq!(map.get("b"), Some("b"));
    }

    #[tokio::test]
    async fn test_translate_texts_server_error_is_identity() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(ENDPOINT))
            .respond_with(ResponseTemplate::new(429).set_body_string("quota exceeded"))
            .mount(&server)
            .await;

        let translator = GeminiTranslator::new(ClientSource::fixed(client_for(&server)));
        let map = translate_texts(&translator, &["SALE"], "vi").await.unwrap();
        assert_eq!(map.get("SALE"), Some("SALE"));
    }
}
