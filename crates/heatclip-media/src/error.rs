//! Error types for media operations.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for media operations.
pub type MediaResult<T> = Result<T, MediaError>;

/// Errors that can occur while driving yt-dlp, ffmpeg, and ffprobe.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("yt-dlp not found in PATH")]
    YtDlpNotFound,

    #[error("FFmpeg not found in PATH")]
    FfmpegNotFound,

    #[error("FFprobe not found in PATH")]
    FfprobeNotFound,

    #[error("Download failed: {message}")]
    DownloadFailed { message: String },

    #[error("Transcript unavailable: {0}")]
    TranscriptUnavailable(String),

    #[error("Clip cutting failed: {0}")]
    ClipCuttingFailed(String),

    #[error("FFprobe command failed: {message}")]
    FfprobeFailed {
        message: String,
        stderr: Option<String>,
    },

    #[error("Invalid video file: {0}")]
    InvalidVideo(String),

    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),
}

impl MediaError {
    /// Create a download failure error.
    pub fn download_failed(message: impl Into<String>) -> Self {
        Self::DownloadFailed {
            message: message.into(),
        }
    }

    /// Create a transcript-unavailable error.
    pub fn transcript_unavailable(message: impl Into<String>) -> Self {
        Self::TranscriptUnavailable(message.into())
    }

    /// Create a clip-cutting failure error.
    pub fn clip_cutting_failed(message: impl Into<String>) -> Self {
        Self::ClipCuttingFailed(message.into())
    }
}
