//! yt-dlp and FFmpeg wrappers.
//!
//! Everything that touches external media tooling lives here: video
//! downloads, subtitle retrieval, duration probing, and clip cutting.

pub mod cut;
pub mod download;
pub mod error;
pub mod probe;
pub mod transcript;

pub use cut::cut_clips;
pub use download::download_video;
pub use error::{MediaError, MediaResult};
pub use probe::probe_duration;
pub use transcript::{fetch_transcript, parse_json3_transcript};
