//! Detected clip model.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A contiguous high-attention interval of the source video.
///
/// Created by the clip detector from merged candidate intervals and
/// immutable once produced. The `end > start` invariant is enforced by
/// the orchestrator's clip filter before cutting.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Clip {
    /// Start of the clip in seconds.
    pub start: f64,

    /// End of the clip in seconds.
    pub end: f64,

    /// Mean attention across the clip's above-threshold points,
    /// rounded to two decimals.
    pub average_attention: f64,
}

impl Clip {
    pub fn new(start: f64, end: f64, average_attention: f64) -> Self {
        Self {
            start,
            end,
            average_attention,
        }
    }

    /// Clip length in seconds. Negative for degenerate clips that the
    /// orchestrator filters out.
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    /// Whether the clip satisfies the `end > start` invariant.
    pub fn is_valid(&self) -> bool {
        self.end > self.start
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clip_validity() {
        assert!(Clip::new(10.0, 70.0, 80.0).is_valid());
        assert!(!Clip::new(70.0, 70.0, 80.0).is_valid());
        assert!(!Clip::new(70.0, 10.0, 80.0).is_valid());
    }

    #[test]
    fn test_clip_duration() {
        let clip = Clip::new(12.5, 75.0, 91.3);
        assert!((clip.duration() - 62.5).abs() < 1e-9);
    }
}
