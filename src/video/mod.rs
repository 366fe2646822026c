pub mod probe;
pub mod sampler;

pub use probe::{check_ffmpeg, check_ffprobe, probe_video};
pub use sampler::{sample_times, FfmpegSampler};

use crate::error::Result;
use async_trait::async_trait;
use std::path::Path;

/// A still image captured at a fixed sample time.
#[derive(Clone)]
pub struct Frame {
    /// Sample time in seconds from the start of the video.
    pub time: f64,
    /// JPEG-encoded image.
    pub image: Vec<u8>,
}

impl std::fmt::Debug for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Frame")
            .field("time", &self.time)
            .field("image_bytes", &self.image.len())
            .finish()
    }
}

/// Metadata about a video file.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VideoMetadata {
    pub width: u32,
    pub height: u32,
    /// Duration in seconds.
    pub duration: f64,
}

/// The output of a sampling pass.
#[derive(Debug, Clone)]
pub struct SampledVideo {
    pub frames: Vec<Frame>,
    pub width: u32,
    pub height: u32,
    pub duration: f64,
    /// Seconds between consecutive frames.
    pub interval: f64,
}

/// Produces fixed-rate stills from a video.
#[async_trait]
pub trait FrameSource: Send + Sync {
    async fn sample(
        &self,
        input: &Path,
        rate: f64,
        on_progress: &(dyn Fn(f64) + Send + Sync),
    ) -> Result<SampledVideo>;

    fn name(&self) -> &'static str;
}
