use std::path::Path;
use std::process::Command;

use serde::Deserialize;
use tracing::debug;

use crate::error::{BurnsubError, Result};

use super::VideoMetadata;

/// Check if FFmpeg is installed and accessible.
pub fn check_ffmpeg() -> Result<()> {
    let output = Command::new("ffmpeg")
        .arg("-version")
        .output()
        .map_err(|e| {
            BurnsubError::Decode(format!(
                "FFmpeg not found. Please install FFmpeg and ensure it's in your PATH. Error: {e}"
            ))
        })?;

    if !output.status.success() {
        return Err(BurnsubError::Decode("FFmpeg check failed".to_string()));
    }

    debug!("FFmpeg is available");
    Ok(())
}

/// Check if FFprobe is installed and accessible.
pub fn check_ffprobe() -> Result<()> {
    let output = Command::new("ffprobe")
        .arg("-version")
        .output()
        .map_err(|e| {
            BurnsubError::Decode(format!(
                "FFprobe not found. Please install FFmpeg (includes FFprobe). Error: {e}"
            ))
        })?;

    if !output.status.success() {
        return Err(BurnsubError::Decode("FFprobe check failed".to_string()));
    }

    debug!("FFprobe is available");
    Ok(())
}

#[derive(Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    streams: Vec<ProbeStream>,
    format: Option<ProbeFormat>,
}

#[derive(Deserialize)]
struct ProbeStream {
    width: Option<u32>,
    height: Option<u32>,
    duration: Option<String>,
}

#[derive(Deserialize)]
struct ProbeFormat {
    duration: Option<String>,
}

/// Read dimensions and duration of the first video stream using FFprobe.
pub fn probe_video(input: &Path) -> Result<VideoMetadata> {
    if !input.exists() {
        return Err(BurnsubError::FileNotFound(input.display().to_string()));
    }

    let output = Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-select_streams",
            "v:0",
            "-show_entries",
            "stream=width,height,duration:format=duration",
            "-of",
            "json",
        ])
        .arg(input)
        .output()
        .map_err(|e| BurnsubError::Decode(format!("Failed to run FFprobe: {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(BurnsubError::Decode(format!(
            "FFprobe could not open {}: {}",
            input.display(),
            stderr.trim()
        )));
    }

    parse_probe_output(&String::from_utf8_lossy(&output.stdout))
}

/// Parse `ffprobe -of json` output into metadata.
///
/// The container duration wins over the stream duration; both are optional in
/// ffprobe output, so a file that reports neither is rejected here rather than
/// sampled forever.
fn parse_probe_output(json: &str) -> Result<VideoMetadata> {
    let probe: ProbeOutput = serde_json::from_str(json)
        .map_err(|e| BurnsubError::Decode(format!("Unreadable FFprobe output: {e}")))?;

    let stream = probe
        .streams
        .first()
        .ok_or_else(|| BurnsubError::Decode("No video stream found".to_string()))?;

    let (width, height) = match (stream.width, stream.height) {
        (Some(w), Some(h)) if w > 0 && h > 0 => (w, h),
        _ => {
            return Err(BurnsubError::Decode(
                "Video stream has no pixel dimensions".to_string(),
            ))
        }
    };

    let parse = |d: Option<&str>| d.and_then(|d| d.trim().parse::<f64>().ok());
    let duration = parse(probe.format.as_ref().and_then(|f| f.duration.as_deref()))
        .or_else(|| parse(stream.duration.as_deref()))
        .ok_or_else(|| BurnsubError::Decode("Video duration is unknown".to_string()))?;

    if !duration.is_finite() || duration <= 0.0 {
        return Err(BurnsubError::Decode(format!(
            "Video duration must be positive, got {duration}"
        )));
    }

    debug!("Probed video: {}x{}, {:.3}s", width, height, duration);

    Ok(VideoMetadata {
        width,
        height,
        duration,
    })
}
