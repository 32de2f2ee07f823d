//! Serialisable result records.
//!
//! These are what a trial logger or the `vowelgate` binary writes out; the
//! analysis types themselves stay free of presentation concerns.

use serde::{Deserialize, Serialize};

use crate::{
    gate::{RecordingOutcome, RejectReason, Verdict},
    pitch::PitchRangeEstimate,
};

/// Verdict as a single lowercase word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerdictLabel {
    Accepted,
    Short,
    Quiet,
}

impl From<Verdict> for VerdictLabel {
    fn from(verdict: Verdict) -> Self {
        match verdict {
            Verdict::Accepted => VerdictLabel::Accepted,
            Verdict::Rejected(RejectReason::TooShort) => VerdictLabel::Short,
            Verdict::Rejected(RejectReason::TooQuiet) => VerdictLabel::Quiet,
        }
    }
}

/// One analysed recording.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordingReport {
    pub file: String,
    pub sample_rate: u32,
    /// Kept range of the source, in samples.
    pub trim_start: usize,
    pub trim_end: usize,
    pub active_duration_s: f64,
    pub active_rms: f64,
    pub passed: bool,
    pub verdict: VerdictLabel,
    /// `[start, end)` pairs relative to `trim_start`.
    pub segments: Vec<[usize; 2]>,
}

impl RecordingReport {
    pub fn new(file: impl Into<String>, sample_rate: u32, outcome: &RecordingOutcome) -> Self {
        Self {
            file: file.into(),
            sample_rate,
            trim_start: outcome.trim.start,
            trim_end: outcome.trim.end,
            active_duration_s: outcome.stats.active_duration_s,
            active_rms: outcome.stats.active_rms,
            passed: outcome.verdict.is_accepted(),
            verdict: outcome.verdict.into(),
            segments: outcome.segments.iter().map(|s| [s.start, s.end]).collect(),
        }
    }
}

/// Pitch range for a corpus, with the number of tracks it was pooled from.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PitchRangeReport {
    pub tracks: usize,
    #[serde(flatten)]
    pub estimate: PitchRangeEstimate,
}
