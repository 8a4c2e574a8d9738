//! Error types for heatmap operations.

use thiserror::Error;

/// Result type for heatmap operations.
pub type HeatmapResult<T> = Result<T, HeatmapError>;

/// Errors that can occur while fetching or analyzing a heatmap.
#[derive(Debug, Error)]
pub enum HeatmapError {
    #[error("No heatmap markup found for video {0}")]
    NotFound(String),

    #[error("Heatmap page request failed with status {0}")]
    BadStatus(u16),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}
