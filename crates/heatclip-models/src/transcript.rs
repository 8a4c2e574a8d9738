//! Transcript entries and per-clip transcript extraction.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::Clip;

/// A single timestamped transcript line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TranscriptEntry {
    /// Caption text.
    pub text: String,

    /// Start time in seconds.
    pub start: f64,

    /// Duration in seconds.
    pub duration: f64,
}

impl TranscriptEntry {
    pub fn new(text: impl Into<String>, start: f64, duration: f64) -> Self {
        Self {
            text: text.into(),
            start,
            duration,
        }
    }

    /// End time of this entry in seconds.
    pub fn end(&self) -> f64 {
        self.start + self.duration
    }

    /// Whether this entry's `[start, end)` interval overlaps the clip's.
    pub fn overlaps(&self, clip: &Clip) -> bool {
        self.start < clip.end && self.end() > clip.start
    }
}

/// A clip joined with its overlapping transcript entries.
///
/// One of these per clip makes up the `clip_transcripts.json` sidecar
/// written next to each video's clips.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ClipTranscript {
    /// Clip start in seconds.
    pub start: f64,

    /// Clip end in seconds.
    pub end: f64,

    /// Mean attention over the clip.
    pub average_attention: f64,

    /// Transcript entries overlapping the clip interval.
    pub transcript: Vec<TranscriptEntry>,

    /// Total whitespace-separated token count across the entries.
    pub word_count: usize,
}

/// Join each clip with the transcript entries whose `[start, start+duration)`
/// interval overlaps the clip's `[start, end)` interval.
pub fn extract_clip_transcripts(
    transcript: &[TranscriptEntry],
    clips: &[Clip],
) -> Vec<ClipTranscript> {
    clips
        .iter()
        .map(|clip| {
            let entries: Vec<TranscriptEntry> = transcript
                .iter()
                .filter(|entry| entry.overlaps(clip))
                .cloned()
                .collect();

            let word_count = entries
                .iter()
                .map(|entry| entry.text.split_whitespace().count())
                .sum();

            ClipTranscript {
                start: clip.start,
                end: clip.end,
                average_attention: clip.average_attention,
                transcript: entries,
                word_count,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transcript() -> Vec<TranscriptEntry> {
        vec![
            TranscriptEntry::new("hello there", 0.0, 4.0),
            TranscriptEntry::new("general kenobi", 4.0, 4.0),
            TranscriptEntry::new("you are a bold one", 10.0, 5.0),
            TranscriptEntry::new("back away", 30.0, 2.0),
        ]
    }

    #[test]
    fn test_overlap_selection() {
        let clips = vec![Clip::new(3.0, 12.0, 80.0)];
        let result = extract_clip_transcripts(&transcript(), &clips);

        assert_eq!(result.len(), 1);
        let texts: Vec<&str> = result[0]
            .transcript
            .iter()
            .map(|e| e.text.as_str())
            .collect();
        assert_eq!(texts, vec!["hello there", "general kenobi", "you are a bold one"]);
    }

    #[test]
    fn test_word_count() {
        let clips = vec![Clip::new(3.0, 12.0, 80.0)];
        let result = extract_clip_transcripts(&transcript(), &clips);
        // "hello there" + "general kenobi" + "you are a bold one"
        assert_eq!(result[0].word_count, 9);
    }

    #[test]
    fn test_touching_intervals_do_not_overlap() {
        // Entry ends exactly where the clip starts: half-open intervals.
        let clips = vec![Clip::new(8.0, 10.0, 50.0)];
        let result = extract_clip_transcripts(&transcript(), &clips);
        assert!(result[0].transcript.is_empty());
        assert_eq!(result[0].word_count, 0);
    }

    #[test]
    fn test_no_entries() {
        let clips = vec![Clip::new(100.0, 120.0, 60.0)];
        let result = extract_clip_transcripts(&transcript(), &clips);
        assert!(result[0].transcript.is_empty());
    }
}
