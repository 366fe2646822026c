use crate::config::Config;
use crate::error::{BurnsubError, Result};
use crate::gemini::ClientSource;
use crate::progress::Stage;
use crate::recognize::{GeminiRecognizer, RecognitionOrchestrator, Recognizer};
use crate::subtitle::{apply_translations, assemble_events, generate_ass, SubtitleEvent};
use crate::translate::{translate_texts, unique_texts, GeminiTranslator, Translator};
use crate::video::{FfmpegSampler, FrameSource};
use console::style;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::info;

/// Configuration for the subtitle generation pipeline.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Frames sampled per second of video.
    pub capture_rate: f64,
    /// Language code the recognized text is translated into.
    pub target_language: String,
    /// Recognition requests allowed in flight.
    pub concurrency: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for PipelineConfig {
    fn from(config: &Config) -> Self {
        Self {
            capture_rate: config.capture_rate,
            target_language: config.target_language.clone(),
            concurrency: config.concurrency,
        }
    }
}

/// Statistics from the subtitle generation process.
#[derive(Debug, Clone, Default)]
pub struct PipelineStats {
    pub total_time: Duration,
    pub sampling_time: Duration,
    pub recognition_time: Duration,
    pub translation_time: Duration,
    pub frames_sampled: usize,
    pub frames_failed: usize,
    pub distinct_texts: usize,
    pub subtitle_events: usize,
    /// Video duration in seconds.
    pub video_duration: f64,
}

/// Result of a pipeline run.
#[derive(Debug)]
pub struct PipelineResult {
    /// The rendered .ass document.
    pub document: String,
    /// Events after translation, in frame order.
    pub events: Vec<SubtitleEvent>,
    pub width: u32,
    pub height: u32,
    pub stats: PipelineStats,
    /// Set once the document has been written to disk.
    pub output_path: Option<PathBuf>,
}

/// Sampling, recognition, translation, and rendering wired together.
pub struct Pipeline {
    frames: Box<dyn FrameSource>,
    recognizer: Arc<dyn Recognizer>,
    translator: Box<dyn Translator>,
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(
        frames: Box<dyn FrameSource>,
        recognizer: Arc<dyn Recognizer>,
        translator: Box<dyn Translator>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            frames,
            recognizer,
            translator,
            config,
        }
    }

    /// The production pipeline: ffmpeg sampling and Gemini for both
    /// recognition and translation. The API key is checked on the first
    /// request, not here.
    pub fn gemini(config: &Config) -> Self {
        let source = ClientSource::lazy(config.gemini_api_key.clone(), config.model.clone());

        Self::new(
            Box::new(FfmpegSampler::new().with_jpeg_quality(config.jpeg_quality)),
            Arc::new(GeminiRecognizer::new(source.clone())),
            Box::new(GeminiTranslator::new(source)),
            PipelineConfig::from(config),
        )
    }

    /// Run every stage in order and return the rendered document.
    ///
    /// `on_progress` receives each stage's own fraction in `[0, 1]`;
    /// combining them is left to the caller (see `progress::StageWeights`).
    pub async fn run(
        &self,
        input: &Path,
        on_progress: &(dyn Fn(Stage, f64) + Send + Sync),
    ) -> Result<PipelineResult> {
        let start_time = Instant::now();

        if !input.exists() {
            return Err(BurnsubError::FileNotFound(input.display().to_string()));
        }

        // Stage 1: frame sampling
        info!(
            "Stage 1/4: Sampling frames at {} Hz with {}",
            self.config.capture_rate,
            self.frames.name()
        );
        on_progress(Stage::Sampling, 0.0);
        let sampling_start = Instant::now();
        let sampled = self
            .frames
            .sample(input, self.config.capture_rate, &|p: f64| {
                on_progress(Stage::Sampling, p)
            })
            .await?;
        let sampling_time = sampling_start.elapsed();
        let frames_sampled = sampled.frames.len();
        info!(
            "Sampled {} frames ({}x{}) in {:.2}s",
            frames_sampled,
            sampled.width,
            sampled.height,
            sampling_time.as_secs_f64()
        );

        // Stage 2: text recognition
        info!("Stage 2/4: Recognizing text with {}", self.recognizer.name());
        on_progress(Stage::Recognition, 0.0);
        let recognition_start = Instant::now();
        let orchestrator = RecognitionOrchestrator::new(self.recognizer.clone())
            .with_concurrency(self.config.concurrency);
        let (recognitions, recognition_stats) = orchestrator
            .process_frames(sampled.frames, &|p: f64| on_progress(Stage::Recognition, p))
            .await?;
        let recognition_time = recognition_start.elapsed();

        let events = assemble_events(&recognitions, sampled.interval);
        info!("Assembled {} subtitle events", events.len());

        // Stage 3: translation
        info!(
            "Stage 3/4: Translating to {} with {}",
            self.config.target_language,
            self.translator.name()
        );
        on_progress(Stage::Translation, 0.0);
        let translation_start = Instant::now();
        let texts: Vec<&str> = events.iter().map(|e| e.text.as_str()).collect();
        let distinct_texts = unique_texts(&texts).len();
        let map = translate_texts(
            self.translator.as_ref(),
            &texts,
            &self.config.target_language,
        )
        .await?;
        let events = apply_translations(events, &map);
        let translation_time = translation_start.elapsed();
        on_progress(Stage::Translation, 1.0);

        // Stage 4: document generation
        info!("Stage 4/4: Generating subtitle document");
        on_progress(Stage::Generation, 0.0);
        let document = generate_ass(&events, sampled.width, sampled.height);
        on_progress(Stage::Generation, 1.0);

        let stats = PipelineStats {
            total_time: start_time.elapsed(),
            sampling_time,
            recognition_time,
            translation_time,
            frames_sampled,
            frames_failed: recognition_stats.failed_frames,
            distinct_texts,
            subtitle_events: events.len(),
            video_duration: sampled.duration,
        };

        Ok(PipelineResult {
            document,
            events,
            width: sampled.width,
            height: sampled.height,
            stats,
            output_path: None,
        })
    }
}

/// Generate a subtitle file for `input` and write it to `output`.
///
/// This is the main entry point for burnsub. It:
/// 1. Samples frames from the video with ffmpeg
/// 2. Recognizes on-screen text in each frame
/// 3. Translates the distinct texts in one batch
/// 4. Renders and writes the .ass document
pub async fn generate_subtitles(
    input: &Path,
    output: &Path,
    config: &Config,
    on_progress: &(dyn Fn(Stage, f64) + Send + Sync),
) -> Result<PipelineResult> {
    config.validate()?;

    let pipeline = Pipeline::gemini(config);
    let mut result = pipeline.run(input, on_progress).await?;

    fs::write(output, &result.document)?;
    info!(
        "Wrote {} events to {:?}",
        result.stats.subtitle_events, output
    );

    result.output_path = Some(output.to_path_buf());
    Ok(result)
}

/// Print a summary of the pipeline results.
pub fn print_summary(result: &PipelineResult) {
    println!();
    println!("{}", style("Subtitle Generation Complete").bold().green());
    println!();
    if let Some(ref path) = result.output_path {
        println!("  Output:     {}", style(path.display()).cyan());
    }
    println!("  Resolution: {}x{}", result.width, result.height);
    println!(
        "  Video:      {:.1}s, {} frames sampled",
        result.stats.video_duration, result.stats.frames_sampled
    );
    println!(
        "  Events:     {} ({} distinct texts)",
        result.stats.subtitle_events, result.stats.distinct_texts
    );
    println!();
    println!("  Timing:");
    println!(
        "    Sample:      {:.2}s",
        result.stats.sampling_time.as_secs_f64()
    );
    println!(
        "    Recognize:   {:.2}s",
        result.stats.recognition_time.as_secs_f64()
    );
    println!(
        "    Translate:   {:.2}s",
        result.stats.translation_time.as_secs_f64()
    );
    println!(
        "    Total:       {:.2}s",
        result.stats.total_time.as_secs_f64()
    );
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipeline_config_default() {
        let config = PipelineConfig::default();
        assert_eq!(config.capture_rate, 2.0);
        assert_eq!(config.target_language, "vi");
        assert_eq!(config.concurrency, 1);
    }

    #[test]
    fn test_pipeline_config_from_config() {
        let mut config = Config::default();
        config.capture_rate = 4.0;
        config.target_language = "ja".to_string();
        config.concurrency = 3;

        let pipeline_config = PipelineConfig::from(&config);
        assert_eq!(pipeline_config.capture_rate, 4.0);
        assert_eq!(pipeline_config.target_language, "ja");
        assert_eq!(pipeline_config.concurrency, 3);
    }

    #[tokio::test]
    async fn test_generate_subtitles_missing_input() {
        let dir = tempfile::tempdir().unwrap();
        let result = generate_subtitles(
            Path::new("/nonexistent/clip.mp4"),
            &dir.path().join("clip.vi.ass"),
            &Config::default(),
            &|_: Stage, _: f64| {},
        )
        .await;
        assert!(matches!(result, Err(BurnsubError::FileNotFound(_))));
    }

    #[tokio::test]
    async fn test_generate_subtitles_rejects_invalid_config() {
        let mut config = Config::default();
        config.capture_rate = 0.0;
        let result = generate_subtitles(
            Path::new("/nonexistent/clip.mp4"),
            Path::new("/tmp/unused.ass"),
            &config,
            &|_: Stage, _: f64| {},
        )
        .await;
        assert!(matches!(result, Err(BurnsubError::Config(_))));
    }

    #[tokio::test]
    async fn test_generate_subtitles_rejects_bad_jpeg_quality() {
        let mut config = Config::default();
        config.jpeg_quality = 0;
        let result = generate_subtitles(
            Path::new("Cargo.toml"),
            Path::new("/tmp/unused.ass"),
            &config,
            &|_: Stage, _: f64| {},
        )
        .await;
        assert!(matches!(result, Err(BurnsubError::Config(_))));
    }
}
