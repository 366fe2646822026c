pub mod gemini;
pub mod orchestrator;

pub use gemini::GeminiRecognizer;
pub use orchestrator::{RecognitionOrchestrator, RecognitionStats};

use crate::error::Result;
use crate::video::Frame;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in source-frame pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

/// A block of text found in a frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecognizedSpan {
    pub text: String,
    #[serde(rename = "boundingBox")]
    pub bounding_box: BoundingBox,
}

/// Everything recognized in one frame.
#[derive(Debug, Clone)]
pub struct FrameRecognition {
    pub index: usize,
    pub time: f64,
    pub spans: Vec<RecognizedSpan>,
    /// Set when the frame failed and contributes no spans.
    pub error: Option<String>,
}

#[async_trait]
pub trait Recognizer: Send + Sync {
    async fn recognize(&self, frame: &Frame) -> Result<Vec<RecognizedSpan>>;
    fn name(&self) -> &'static str;
}
