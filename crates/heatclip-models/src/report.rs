//! Per-video outcomes and the aggregate batch report.

use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{Clip, VideoId};

/// Stage of a single video's processing sequence.
///
/// Stages run strictly in order; `Succeeded`/`Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum VideoStage {
    Queued,
    Downloading,
    FetchingTranscript,
    AnalyzingHeatmap,
    CuttingClips,
    SavingResults,
}

impl VideoStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            VideoStage::Queued => "queued",
            VideoStage::Downloading => "downloading",
            VideoStage::FetchingTranscript => "fetching_transcript",
            VideoStage::AnalyzingHeatmap => "analyzing_heatmap",
            VideoStage::CuttingClips => "cutting_clips",
            VideoStage::SavingResults => "saving_results",
        }
    }
}

impl fmt::Display for VideoStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Terminal status of a video's pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum VideoStatus {
    Succeeded,
    Failed,
}

impl VideoStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VideoStatus::Succeeded => "succeeded",
            VideoStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for VideoStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Result of one video's pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct VideoOutcome {
    /// Video this outcome belongs to.
    pub video_id: VideoId,

    /// Terminal status.
    pub status: VideoStatus,

    /// Clips that survived the validity filter, in detector order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub clips: Vec<Clip>,

    /// Paths of the clip files that were cut.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub clip_paths: Vec<PathBuf>,

    /// Directory the clips were written to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clip_dir: Option<PathBuf>,

    /// Path of the transcript sidecar file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transcript_path: Option<PathBuf>,

    /// Error message when `status` is `Failed`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl VideoOutcome {
    /// Build a success outcome.
    pub fn succeeded(
        video_id: VideoId,
        clips: Vec<Clip>,
        clip_paths: Vec<PathBuf>,
        clip_dir: PathBuf,
        transcript_path: PathBuf,
    ) -> Self {
        Self {
            video_id,
            status: VideoStatus::Succeeded,
            clips,
            clip_paths,
            clip_dir: Some(clip_dir),
            transcript_path: Some(transcript_path),
            error: None,
        }
    }

    /// Build a failure outcome with a captured error message.
    pub fn failed(video_id: VideoId, error: impl Into<String>) -> Self {
        Self {
            video_id,
            status: VideoStatus::Failed,
            clips: Vec::new(),
            clip_paths: Vec::new(),
            clip_dir: None,
            transcript_path: None,
            error: Some(error.into()),
        }
    }
}

/// Aggregate result of a batch run.
///
/// The `success`/`failed` lists preserve completion order, not input
/// order.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Report {
    /// Successful video outcomes in completion order.
    pub success: Vec<VideoOutcome>,

    /// Failed video outcomes in completion order.
    pub failed: Vec<VideoOutcome>,

    /// Total number of videos processed.
    pub total_processed: usize,

    /// Number of successes.
    pub success_count: usize,

    /// Number of failures.
    pub failure_count: usize,

    /// `success_count / total_processed * 100`, rounded to two
    /// decimals. Zero when nothing was processed.
    pub success_rate: f64,

    /// When the report was assembled.
    pub generated_at: DateTime<Utc>,
}

impl Report {
    /// Aggregate per-video outcomes in their completion order.
    pub fn from_outcomes(outcomes: Vec<VideoOutcome>) -> Self {
        let total_processed = outcomes.len();
        let mut success = Vec::new();
        let mut failed = Vec::new();

        for outcome in outcomes {
            match outcome.status {
                VideoStatus::Succeeded => success.push(outcome),
                VideoStatus::Failed => failed.push(outcome),
            }
        }

        let success_count = success.len();
        let failure_count = failed.len();
        let success_rate = if total_processed > 0 {
            (success_count as f64 / total_processed as f64 * 100.0 * 100.0).round() / 100.0
        } else {
            0.0
        };

        Self {
            success,
            failed,
            total_processed,
            success_count,
            failure_count,
            success_rate,
            generated_at: Utc::now(),
        }
    }
}
