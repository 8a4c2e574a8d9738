//! Shared data models for the HeatClip backend.
//!
//! This crate provides Serde-serializable types for:
//! - Attention samples and one-second bins
//! - Detected clips
//! - Transcript entries and per-clip transcript sidecars
//! - Per-video outcomes and the aggregate batch report

pub mod attention;
pub mod clip;
pub mod report;
pub mod transcript;
pub mod video;

// Re-export common types
pub use attention::{BinnedPoint, Sample};
pub use clip::Clip;
pub use report::{Report, VideoOutcome, VideoStage, VideoStatus};
pub use transcript::{extract_clip_transcripts, ClipTranscript, TranscriptEntry};
pub use video::{VideoId, VideoIdError};
