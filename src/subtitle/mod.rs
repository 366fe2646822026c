pub mod ass;

pub use ass::{format_time, generate_ass, output_path_for};

use crate::recognize::FrameRecognition;
use crate::translate::TranslationMap;
use serde::Serialize;

/// A timed cue anchored at a point in source-frame pixel coordinates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubtitleEvent {
    pub start: f64,
    pub end: f64,
    pub text: String,
    pub x: f64,
    pub y: f64,
}

/// Turn every recognized span into one event lasting one sample interval.
///
/// Detections are not merged across frames: text that stays on screen for
/// several samples produces several back-to-back events.
pub fn assemble_events(recognitions: &[FrameRecognition], interval: f64) -> Vec<SubtitleEvent> {
    recognitions
        .iter()
        .flat_map(|frame| {
            frame
                .spans
                .iter()
                .map(move |span| {
                    let (x, y) = span.bounding_box.center();
                    SubtitleEvent {
                        start: frame.time,
                        end: frame.time + interval,
                        text: span.text.clone(),
                        x,
                        y,
                    }
                })
        })
        .collect()
}

/// Replace each event's text through the translation map.
pub fn apply_translations(events: Vec<SubtitleEvent>, map: &TranslationMap) -> Vec<SubtitleEvent> {
    events
        .into_iter()
        .map(|mut event| {
            if let Some(translated) = map.get(&event.text) {
                event.text = translated.to_string();
            }
            event
        })
        .collect()
}
