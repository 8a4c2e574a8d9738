//! Structured per-video logging.

use tracing::{error, info, warn};
use uuid::Uuid;

use heatclip_models::{VideoId, VideoStage};

/// Logger carrying run and video context for every message.
///
/// The run ID ties together the interleaved logs of concurrently
/// processed videos within one bulk invocation.
#[derive(Debug, Clone)]
pub struct VideoLogger {
    run_id: Uuid,
    video_id: String,
}

impl VideoLogger {
    pub fn new(run_id: Uuid, video_id: &VideoId) -> Self {
        Self {
            run_id,
            video_id: video_id.to_string(),
        }
    }

    /// Log entry into a pipeline stage.
    pub fn stage(&self, stage: VideoStage) {
        info!(
            run_id = %self.run_id,
            video_id = %self.video_id,
            stage = %stage,
            "Entering stage"
        );
    }

    pub fn progress(&self, message: &str) {
        info!(
            run_id = %self.run_id,
            video_id = %self.video_id,
            "{}", message
        );
    }

    pub fn warning(&self, message: &str) {
        warn!(
            run_id = %self.run_id,
            video_id = %self.video_id,
            "{}", message
        );
    }

    pub fn failure(&self, message: &str) {
        error!(
            run_id = %self.run_id,
            video_id = %self.video_id,
            "Video failed: {}", message
        );
    }

    pub fn completion(&self, clips: usize) {
        info!(
            run_id = %self.run_id,
            video_id = %self.video_id,
            clips = clips,
            "Video processed"
        );
    }
}
