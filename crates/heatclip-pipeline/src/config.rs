//! Pipeline configuration.

use std::path::PathBuf;

/// Bulk pipeline configuration.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Maximum videos processed concurrently.
    pub concurrency: usize,

    /// Work directory for downloads and temporary files.
    pub work_dir: PathBuf,

    /// Preferred transcript language (English is always the fallback).
    pub language: String,

    /// Maximum videos taken from a single channel or playlist source.
    pub source_video_limit: usize,

    /// Maximum clips cut per video, taken in detection order.
    pub max_clips_per_video: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            concurrency: 4,
            work_dir: PathBuf::from("/tmp/heatclip"),
            language: "en".to_string(),
            source_video_limit: 50,
            max_clips_per_video: 10,
        }
    }
}

impl PipelineConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            concurrency: std::env::var("HEATCLIP_CONCURRENCY")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(|n: usize| n.clamp(1, 8))
                .unwrap_or(defaults.concurrency),
            work_dir: std::env::var("HEATCLIP_WORK_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.work_dir),
            language: std::env::var("HEATCLIP_LANGUAGE").unwrap_or(defaults.language),
            source_video_limit: std::env::var("HEATCLIP_SOURCE_VIDEO_LIMIT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.source_video_limit),
            max_clips_per_video: std::env::var("HEATCLIP_MAX_CLIPS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_clips_per_video),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.concurrency, 4);
        assert_eq!(config.language, "en");
        assert_eq!(config.max_clips_per_video, 10);
    }
}
