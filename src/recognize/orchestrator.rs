use crate::error::{BurnsubError, Result};
use crate::recognize::{FrameRecognition, Recognizer};
use crate::video::Frame;
use futures::stream::{FuturesUnordered, StreamExt};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

/// Statistics from the recognition pass.
#[derive(Debug, Clone, Default)]
pub struct RecognitionStats {
    pub total_frames: usize,
    pub successful_frames: usize,
    pub failed_frames: usize,
    pub total_spans: usize,
    pub total_time: Duration,
    pub avg_frame_time: Duration,
}

/// Runs the recognizer over every sampled frame.
///
/// With the default concurrency of 1 frames are sent strictly one after
/// another. Higher values bound the number of requests in flight; results
/// are put back into frame order either way.
pub struct RecognitionOrchestrator {
    recognizer: Arc<dyn Recognizer>,
    concurrency: usize,
}

impl RecognitionOrchestrator {
    pub fn new(recognizer: Arc<dyn Recognizer>) -> Self {
        Self {
            recognizer,
            concurrency: 1,
        }
    }

    /// Allow up to `concurrency` requests in flight (minimum 1).
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Recognize all frames. A failing frame yields no spans; only fatal
    /// errors (missing credentials) abort.
    pub async fn process_frames(
        &self,
        frames: Vec<Frame>,
        on_progress: &(dyn Fn(f64) + Send + Sync),
    ) -> Result<(Vec<FrameRecognition>, RecognitionStats)> {
        let total_frames = frames.len();
        if total_frames == 0 {
            on_progress(1.0);
            return Ok((Vec::new(), RecognitionStats::default()));
        }

        let start_time = Instant::now();
        info!(
            "Recognizing text in {} frames with {} (concurrency: {})",
            total_frames,
            self.recognizer.name(),
            self.concurrency
        );

        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let mut futures = FuturesUnordered::new();

        for (index, frame) in frames.into_iter().enumerate() {
            let sem = semaphore.clone();
            let recognizer = self.recognizer.clone();

            futures.push(async move {
                let frame_start = Instant::now();
                let result = match sem.acquire().await {
                    Ok(_permit) => recognizer.recognize(&frame).await,
                    Err(_) => Err(BurnsubError::Recognition(
                        "Recognition worker pool closed".to_string(),
                    )),
                };
                (index, frame.time, result, frame_start.elapsed())
            });
        }

        let mut results: Vec<FrameRecognition> = Vec::with_capacity(total_frames);
        let mut total_frame_time = Duration::ZERO;

        while let Some((index, time, result, elapsed)) = futures.next().await {
            total_frame_time += elapsed;

            let recognition = match result {
                Ok(spans) => {
                    debug!(
                        "Frame {} ({:.3}s) completed in {}ms",
                        index,
                        time,
                        elapsed.as_millis()
                    );
                    FrameRecognition {
                        index,
                        time,
                        spans,
                        error: None,
                    }
                }
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    warn!("Error processing frame {} ({:.3}s): {}", index, time, e);
                    FrameRecognition {
                        index,
                        time,
                        spans: Vec::new(),
                        error: Some(e.to_string()),
                    }
                }
            };

            results.push(recognition);
            on_progress(results.len() as f64 / total_frames as f64);
        }

        results.sort_by_key(|r| r.index);

        let failed_frames = results.iter().filter(|r| r.error.is_some()).count();
        let stats = RecognitionStats {
            total_frames,
            successful_frames: total_frames - failed_frames,
            failed_frames,
            total_spans: results.iter().map(|r| r.spans.len()).sum(),
            total_time: start_time.elapsed(),
            avg_frame_time: total_frame_time / total_frames as u32,
        };

        info!(
            "Recognition complete: {}/{} frames successful, {} text blocks in {:.2}s",
            stats.successful_frames,
            stats.total_frames,
            stats.total_spans,
            stats.total_time.as_secs_f64()
        );

        Ok((results, stats))
    }
}
