pub mod config;
pub mod error;
pub mod gemini;
pub mod pipeline;
pub mod progress;
pub mod recognize;
pub mod subtitle;
pub mod translate;
pub mod video;

pub use config::Config;
pub use error::{BurnsubError, Result};
pub use pipeline::{
    generate_subtitles, print_summary, Pipeline, PipelineConfig, PipelineResult, PipelineStats,
};
pub use progress::{RunState, Stage, StageWeights};
