//! Pass/fail acceptance of a recorded trial.
//!
//! ```text
//! full buffer ─► detect ─► trim(pre/post roll) ─► detect + stats on trimmed view ─► verdict
//! ```
//!
//! The trial loop (prompting, retries, storage) is the caller's business;
//! this module only answers "was that long and loud enough?".

use std::ops::Range;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    buffering::SampleBuffer,
    config::AnalysisConfig,
    error::{invalid, Result},
    vad::{
        energy::EnergyVad,
        stats::ActivityStats,
        trim::{trim_range, TrimConfig},
        ActiveSegment, SegmentDetector,
    },
};

/// Minimum active duration and loudness for a recording to be accepted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(default)]
pub struct AcceptanceCriteria {
    pub min_duration_s: f64,
    pub min_active_rms: f64,
}

impl Default for AcceptanceCriteria {
    fn default() -> Self {
        Self {
            min_duration_s: 0.150,
            min_active_rms: 0.015,
        }
    }
}

impl AcceptanceCriteria {
    pub fn validate(&self) -> Result<()> {
        if !(self.min_duration_s.is_finite() && self.min_duration_s >= 0.0) {
            return Err(invalid(format!(
                "min_duration_s must be non-negative and finite, got {}",
                self.min_duration_s
            )));
        }
        if !(self.min_active_rms.is_finite() && self.min_active_rms >= 0.0) {
            return Err(invalid(format!(
                "min_active_rms must be non-negative and finite, got {}",
                self.min_active_rms
            )));
        }
        Ok(())
    }

    /// Loudness is checked last, so a recording failing both criteria is
    /// reported as `TooQuiet`.
    pub fn evaluate(&self, stats: &ActivityStats) -> Verdict {
        let mut reason = None;
        if stats.active_duration_s < self.min_duration_s {
            reason = Some(RejectReason::TooShort);
        }
        if stats.active_rms < self.min_active_rms {
            reason = Some(RejectReason::TooQuiet);
        }
        match reason {
            Some(r) => Verdict::Rejected(r),
            None => Verdict::Accepted,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    TooShort,
    TooQuiet,
}

impl RejectReason {
    /// Word used when re-prompting ("your recording was too ...").
    pub fn prompt(self) -> &'static str {
        match self {
            RejectReason::TooShort => "short",
            RejectReason::TooQuiet => "quiet",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Accepted,
    Rejected(RejectReason),
}

impl Verdict {
    pub fn is_accepted(self) -> bool {
        self == Verdict::Accepted
    }
}

/// Everything the trial loop needs to log and act on one recording.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordingOutcome {
    /// Kept range of the original buffer.
    pub trim: Range<usize>,
    /// Segments detected on the trimmed view, relative to `trim.start`.
    pub segments: Vec<ActiveSegment>,
    pub stats: ActivityStats,
    pub verdict: Verdict,
}

/// Detector + trimming + criteria, applied as one step per recording.
#[derive(Debug, Clone)]
pub struct RecordingAnalyzer<D = EnergyVad> {
    detector: D,
    trim: TrimConfig,
    criteria: AcceptanceCriteria,
}

impl RecordingAnalyzer<EnergyVad> {
    /// Build the default energy-detector analyzer from a loaded config.
    pub fn from_config(config: &AnalysisConfig) -> Result<Self> {
        Self::new(EnergyVad::new(config.vad)?, config.trim, config.acceptance)
    }
}

impl<D: SegmentDetector> RecordingAnalyzer<D> {
    pub fn new(detector: D, trim: TrimConfig, criteria: AcceptanceCriteria) -> Result<Self> {
        trim.validate()?;
        criteria.validate()?;
        Ok(Self {
            detector,
            trim,
            criteria,
        })
    }

    pub fn detector(&self) -> &D {
        &self.detector
    }

    pub fn criteria(&self) -> &AcceptanceCriteria {
        &self.criteria
    }

    pub fn analyze(&self, buffer: &SampleBuffer<'_>) -> Result<RecordingOutcome> {
        let full = self.detector.detect(buffer)?;
        let trim = trim_range(buffer, &full, &self.trim);

        let trimmed = buffer.slice(trim.clone());
        let segments = self.detector.detect(&trimmed)?;
        let stats = ActivityStats::from_segments(&trimmed, &segments);
        let verdict = self.criteria.evaluate(&stats);

        debug!(
            samples = buffer.len(),
            trim_start = trim.start,
            trim_end = trim.end,
            active_duration_s = stats.active_duration_s,
            active_rms = stats.active_rms,
            accepted = verdict.is_accepted(),
            "recording analysed"
        );

        Ok(RecordingOutcome {
            trim,
            segments,
            stats,
            verdict,
        })
    }
}
