//! Attention time-series models.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A single point sampled off the attention curve.
///
/// Produced by the heatmap parser. `attention` is the normalized
/// (inverted, rescaled) vertical position on the original graphic.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Sample {
    /// Timestamp in seconds from the start of the video.
    pub time: f64,

    /// Attention value in `0..=100`.
    pub attention: f64,
}

impl Sample {
    pub fn new(time: f64, attention: f64) -> Self {
        Self { time, attention }
    }
}

/// One second of the resampled attention timeline.
///
/// The binner emits exactly one point per integer second of video
/// duration, ordered by `second` with no gaps.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct BinnedPoint {
    /// Second index, `0..duration`.
    pub second: u32,

    /// Mean attention for this second, forward-filled when empty.
    pub attention: f64,
}

impl BinnedPoint {
    pub fn new(second: u32, attention: f64) -> Self {
        Self { second, attention }
    }
}
