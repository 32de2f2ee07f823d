//! Aggregate statistics over the active part of a recording.

use serde::{Deserialize, Serialize};

use super::{ActiveSegment, SegmentDetector};
use crate::buffering::SampleBuffer;
use crate::error::Result;

/// The two quantities an acceptance test gates on.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityStats {
    /// Total length of all active segments, in seconds.
    pub active_duration_s: f64,
    /// RMS of the active samples concatenated in segment order.
    pub active_rms: f64,
}

impl ActivityStats {
    /// Compute statistics for already-detected segments.
    ///
    /// Segment bounds past the end of the buffer are clamped. An empty
    /// segment list yields `(0.0, 0.0)`.
    pub fn from_segments(buffer: &SampleBuffer<'_>, segments: &[ActiveSegment]) -> Self {
        let samples = buffer.samples();
        let mut total = 0usize;
        let mut sum_sq = 0.0f64;

        for seg in segments {
            let end = seg.end.min(samples.len());
            let start = seg.start.min(end);
            total += end - start;
            sum_sq += samples[start..end]
                .iter()
                .map(|&s| f64::from(s) * f64::from(s))
                .sum::<f64>();
        }

        if total == 0 {
            return Self::default();
        }
        Self {
            active_duration_s: total as f64 / buffer.sample_rate() as f64,
            active_rms: (sum_sq / total as f64).sqrt(),
        }
    }
}

/// Run `detector` over `buffer` and aggregate the result.
pub fn summarize<D>(detector: &D, buffer: &SampleBuffer<'_>) -> Result<ActivityStats>
where
    D: SegmentDetector + ?Sized,
{
    let segments = detector.detect(buffer)?;
    Ok(ActivityStats::from_segments(buffer, &segments))
}
