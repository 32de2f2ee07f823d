//! Energy-based VAD using a whole-buffer adaptive threshold + hangover.
//!
//! ## Algorithm
//!
//! 1. Split the buffer into non-overlapping frames of `frame_len` samples
//!    (trailing partial frame ignored) and compute each frame's RMS.
//! 2. Threshold = `max(mean + z * (std + ε), abs_floor)` over *all* frame
//!    RMS values. The detector is two-pass: no running estimate.
//! 3. A frame with RMS ≥ threshold opens a segment (or keeps it open) and
//!    resets the hangover counter to `hang_frames`.
//! 4. A frame below threshold decrements the counter; once the counter is
//!    spent, the next quiet frame closes the segment after that frame.
//! 5. A segment still open at end of input extends to the last sample.

use tracing::debug;

use super::{rms, ActiveSegment, SegmentDetector, VadConfig};
use crate::buffering::SampleBuffer;
use crate::error::Result;

/// Guards the threshold against zero variance.
const STD_EPSILON: f64 = 1e-9;

/// Whole-recording energy detector.
#[derive(Debug, Clone, Default)]
pub struct EnergyVad {
    config: VadConfig,
}

impl EnergyVad {
    /// # Errors
    /// `InvalidConfiguration` if any duration or threshold is out of range.
    pub fn new(config: VadConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// RMS of each full, non-overlapping frame.
    pub fn frame_rms(samples: &[f32], frame_len: usize) -> Vec<f64> {
        samples.chunks_exact(frame_len).map(rms).collect()
    }

    /// Global threshold over a frame RMS distribution.
    pub fn threshold(&self, frame_rms: &[f64]) -> f64 {
        if frame_rms.is_empty() {
            return self.config.abs_floor;
        }
        let n = frame_rms.len() as f64;
        let mean = frame_rms.iter().sum::<f64>() / n;
        let variance = frame_rms.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / n;
        let std = variance.sqrt();
        (mean + self.config.z * (std + STD_EPSILON)).max(self.config.abs_floor)
    }
}

impl SegmentDetector for EnergyVad {
    fn detect(&self, buffer: &SampleBuffer<'_>) -> Result<Vec<ActiveSegment>> {
        let samples = buffer.samples();
        let n = samples.len();
        let frame_len = self.config.frame_len(buffer.sample_rate());
        if n < frame_len {
            return Ok(Vec::new());
        }

        let frame_rms = Self::frame_rms(samples, frame_len);
        let threshold = self.threshold(&frame_rms);
        let hang_frames = self.config.hang_frames();

        let mut segments = Vec::new();
        let mut onset: Option<usize> = None;
        let mut hang = 0u32;

        for (i, &level) in frame_rms.iter().enumerate() {
            if level >= threshold {
                onset.get_or_insert(i);
                hang = hang_frames;
            } else if let Some(on) = onset {
                if hang > 0 {
                    hang -= 1;
                } else {
                    let end = ((i + 1) * frame_len).min(n);
                    segments.push(ActiveSegment::new(on * frame_len, end));
                    onset = None;
                }
            }
        }
        if let Some(on) = onset {
            segments.push(ActiveSegment::new(on * frame_len, n));
        }

        debug!(
            frames = frame_rms.len(),
            frame_len,
            threshold,
            hang_frames,
            segments = segments.len(),
            "energy vad pass"
        );
        Ok(segments)
    }

    fn config(&self) -> &VadConfig {
        &self.config
    }
}
