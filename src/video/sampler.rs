use std::path::Path;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info};

use crate::config::DEFAULT_JPEG_QUALITY;
use crate::error::{BurnsubError, Result};

use super::{check_ffmpeg, check_ffprobe, probe_video, Frame, FrameSource, SampledVideo};

/// Samples at or past this distance from the end are decoded from here
/// instead, since seeking to the reported duration decodes nothing.
const END_GUARD_SECS: f64 = 0.1;

/// Absorbs float error in `duration * rate` (e.g. 0.3s at 10 Hz).
const COUNT_EPSILON: f64 = 1e-9;

/// Sample times `0, 1/rate, 2/rate, ...` up to and including `duration`.
///
/// Always yields `floor(duration * rate) + 1` entries. Computed by index
/// rather than by accumulation so the times are exact multiples of the
/// interval.
pub fn sample_times(duration: f64, rate: f64) -> Result<Vec<f64>> {
    if !rate.is_finite() || rate <= 0.0 {
        return Err(BurnsubError::Decode(format!(
            "Capture rate must be positive, got {rate}"
        )));
    }
    if !duration.is_finite() || duration <= 0.0 {
        return Err(BurnsubError::Decode(format!(
            "Video duration must be positive, got {duration}"
        )));
    }

    let count = (duration * rate + COUNT_EPSILON).floor() as usize + 1;
    Ok((0..count).map(|i| i as f64 / rate).collect())
}

/// Where to actually seek for a nominal sample time.
fn seek_position(time: f64, duration: f64) -> f64 {
    let last_decodable = (duration - END_GUARD_SECS).max(0.0);
    time.min(last_decodable)
}

/// Frame sampler backed by the `ffmpeg` and `ffprobe` executables.
///
/// Every sample is an independent input seek followed by a single-frame
/// decode, so frame times do not depend on the container frame rate.
pub struct FfmpegSampler {
    jpeg_quality: u8,
}

impl Default for FfmpegSampler {
    fn default() -> Self {
        Self::new()
    }
}

impl FfmpegSampler {
    pub fn new() -> Self {
        Self {
            jpeg_quality: DEFAULT_JPEG_QUALITY,
        }
    }

    /// Set the MJPEG quality scale, clamped to ffmpeg's 2..=31 range.
    pub fn with_jpeg_quality(mut self, quality: u8) -> Self {
        self.jpeg_quality = quality.clamp(2, 31);
        self
    }

    /// Decode the frame shown at `seek` seconds and encode it as JPEG.
    async fn extract_frame(&self, input: &Path, seek: f64) -> Result<Vec<u8>> {
        let seek_arg = format!("{:.3}", seek);
        let quality = self.jpeg_quality.to_string();

        // kill_on_drop reaps the child if this future is dropped mid-decode.
        let output = Command::new("ffmpeg")
            .args(["-v", "error", "-ss"])
            .arg(&seek_arg)
            .arg("-i")
            .arg(input)
            .args(["-frames:v", "1", "-an", "-f", "image2pipe", "-c:v", "mjpeg", "-q:v"])
            .arg(&quality)
            .arg("pipe:1")
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| BurnsubError::Decode(format!("Failed to run FFmpeg: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(BurnsubError::Decode(format!(
                "FFmpeg failed to decode frame at {}s: {}",
                seek_arg,
                stderr.trim()
            )));
        }

        if output.stdout.is_empty() {
            return Err(BurnsubError::Decode(format!(
                "No frame decoded at {}s",
                seek_arg
            )));
        }

        Ok(output.stdout)
    }
}

#[async_trait]
impl FrameSource for FfmpegSampler {
    async fn sample(
        &self,
        input: &Path,
        rate: f64,
        on_progress: &(dyn Fn(f64) + Send + Sync),
    ) -> Result<SampledVideo> {
        check_ffmpeg()?;
        check_ffprobe()?;

        let metadata = probe_video(input)?;
        let times = sample_times(metadata.duration, rate)?;

        info!(
            "Sampling {} frames from {} ({}x{}, {:.2}s) at {} Hz",
            times.len(),
            input.display(),
            metadata.width,
            metadata.height,
            metadata.duration,
            rate
        );

        let mut frames = Vec::with_capacity(times.len());
        for time in times {
            let seek = seek_position(time, metadata.duration);
            let image = self.extract_frame(input, seek).await?;
            debug!("Captured frame at {:.3}s ({} bytes)", time, image.len());

            frames.push(Frame { time, image });
            on_progress((time / metadata.duration).clamp(0.0, 1.0));
        }
        on_progress(1.0);

        Ok(SampledVideo {
            frames,
            width: metadata.width,
            height: metadata.height,
            duration: metadata.duration,
            interval: 1.0 / rate,
        })
    }

    fn name(&self) -> &'static str {
        "ffmpeg"
    }
}
