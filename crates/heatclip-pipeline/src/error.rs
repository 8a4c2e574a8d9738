//! Pipeline error taxonomy.
//!
//! Per-video failures are folded into the final report rather than
//! aborting the run; these variants are what ends up in each failed
//! outcome's error string.

use thiserror::Error;

use heatclip_heatmap::HeatmapError;
use heatclip_media::MediaError;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Errors from a single video's processing pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Invalid video source: {0}")]
    InvalidSource(String),

    #[error("No clips above the attention threshold")]
    NoValidClips,

    #[error("Media error: {0}")]
    Media(#[from] MediaError),

    #[error("Heatmap error: {0}")]
    Heatmap(#[from] HeatmapError),

    #[error("Video ID error: {0}")]
    VideoId(#[from] heatclip_models::VideoIdError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
