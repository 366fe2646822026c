//! Stage reporting and the blending of per-stage progress into one value.

/// A step of the subtitle pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Sampling,
    Recognition,
    Translation,
    Generation,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::Sampling => write!(f, "Extracting frames from video..."),
            Stage::Recognition => write!(f, "Analyzing text with Gemini..."),
            Stage::Translation => write!(f, "Translating text..."),
            Stage::Generation => write!(f, "Generating subtitle file..."),
        }
    }
}

/// Terminal-facing state of a run. Fallbacks inside a run do not show up
/// here; a run that degraded to untranslated text is still `Completed`.
#[derive(Debug, Clone, PartialEq)]
pub enum RunState {
    InProgress(Stage),
    Completed,
    Failed(String),
}

impl std::fmt::Display for RunState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunState::InProgress(stage) => write!(f, "{}", stage),
            RunState::Completed => write!(f, "Processing complete!"),
            RunState::Failed(message) => write!(f, "An error occurred: {}", message),
        }
    }
}

/// Share of the overall progress bar given to each stage, as `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StageWeights {
    pub sampling: (f64, f64),
    pub recognition: (f64, f64),
    pub translation: (f64, f64),
    pub generation: (f64, f64),
}

impl Default for StageWeights {
    fn default() -> Self {
        Self {
            sampling: (0.0, 0.2),
            recognition: (0.2, 0.7),
            translation: (0.7, 0.85),
            generation: (0.85, 1.0),
        }
    }
}

impl StageWeights {
    /// Map a stage-local fraction onto the overall `[0, 1]` range.
    pub fn overall(&self, stage: Stage, fraction: f64) -> f64 {
        let (start, end) = match stage {
            Stage::Sampling => self.sampling,
            Stage::Recognition => self.recognition,
            Stage::Translation => self.translation,
            Stage::Generation => self.generation,
        };
        let fraction = if fraction.is_finite() {
            fraction.clamp(0.0, 1.0)
        } else {
            0.0
        };
        start + (end - start) * fraction
    }
}
