//! Bulk processing pipeline.
//!
//! Resolves mixed video/playlist/channel sources to video IDs and runs
//! each video through download, transcript fetch, heatmap analysis,
//! clip cutting, and result saving, with bounded concurrency.

pub mod config;
pub mod error;
pub mod logging;
pub mod processor;
pub mod progress;
pub mod resolver;

pub use config::PipelineConfig;
pub use error::{PipelineError, PipelineResult};
pub use processor::BulkProcessor;
pub use progress::{ProgressEvent, ProgressSender};
pub use resolver::{classify_source, resolve_sources, SourceKind};
