//! Voice Activity Detection (VAD) over whole recordings.
//!
//! The `SegmentDetector` trait is the extensibility point: `EnergyVad` is
//! the default, and `ActivityStats` or the gate accept any detector.

pub mod energy;
pub mod stats;
pub mod trim;

use serde::{Deserialize, Serialize};

use crate::buffering::SampleBuffer;
use crate::error::{invalid, Result};

/// Half-open sample range `[start, end)` judged speech-active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveSegment {
    pub start: usize,
    pub end: usize,
}

impl ActiveSegment {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }
}

/// Parameters of the energy detector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(default)]
pub struct VadConfig {
    /// Frame length in milliseconds. Frames do not overlap.
    pub frame_ms: f64,
    /// How long a segment stays open after energy drops below threshold.
    pub hangover_ms: f64,
    /// Threshold = mean + z * std of the frame RMS distribution.
    pub z: f64,
    /// Absolute lower bound on the threshold (RMS units).
    pub abs_floor: f64,
}

impl Default for VadConfig {
    fn default() -> Self {
        Self {
            frame_ms: 10.0,
            hangover_ms: 50.0,
            z: 0.5,
            abs_floor: 0.01,
        }
    }
}

impl VadConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.frame_ms.is_finite() && self.frame_ms > 0.0) {
            return Err(invalid(format!(
                "frame_ms must be positive and finite, got {}",
                self.frame_ms
            )));
        }
        if !(self.hangover_ms.is_finite() && self.hangover_ms >= 0.0) {
            return Err(invalid(format!(
                "hangover_ms must be non-negative and finite, got {}",
                self.hangover_ms
            )));
        }
        if !self.z.is_finite() {
            return Err(invalid(format!("z must be finite, got {}", self.z)));
        }
        if !(self.abs_floor.is_finite() && self.abs_floor >= 0.0) {
            return Err(invalid(format!(
                "abs_floor must be non-negative and finite, got {}",
                self.abs_floor
            )));
        }
        Ok(())
    }

    /// Samples per frame at `sample_rate`, never less than one.
    pub fn frame_len(&self, sample_rate: u32) -> usize {
        ((sample_rate as f64 * self.frame_ms / 1000.0).round() as usize).max(1)
    }

    /// Inactive frames tolerated before a segment closes, never less than one.
    pub fn hang_frames(&self) -> u32 {
        ((self.hangover_ms / self.frame_ms).round() as u32).max(1)
    }
}

/// Trait for whole-buffer activity detectors.
///
/// Implementors must be pure: the same buffer always yields the same
/// segments, sorted by `start` and non-overlapping.
pub trait SegmentDetector: Send + Sync {
    fn detect(&self, buffer: &SampleBuffer<'_>) -> Result<Vec<ActiveSegment>>;

    /// Parameters in effect, so callers can re-run on sub-views.
    fn config(&self) -> &VadConfig;
}

/// Root-mean-square of a sample slice, accumulated in f64.
pub fn rms(samples: &[f32]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum_sq: f64 = samples.iter().map(|&s| f64::from(s) * f64::from(s)).sum();
    (sum_sq / samples.len() as f64).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_recording_protocol() {
        let cfg = VadConfig::default();
        assert_eq!(cfg.frame_len(44_100), 441);
        assert_eq!(cfg.hang_frames(), 5);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn hang_frames_has_floor_of_one() {
        let cfg = VadConfig {
            hangover_ms: 0.0,
            ..VadConfig::default()
        };
        assert_eq!(cfg.hang_frames(), 1);
    }

    #[test]
    fn frame_len_has_floor_of_one() {
        let cfg = VadConfig {
            frame_ms: 0.01,
            ..VadConfig::default()
        };
        assert_eq!(cfg.frame_len(8000), 1);
    }

    #[test]
    fn validate_rejects_bad_durations() {
        for cfg in [
            VadConfig { frame_ms: 0.0, ..VadConfig::default() },
            VadConfig { frame_ms: f64::NAN, ..VadConfig::default() },
            VadConfig { hangover_ms: -1.0, ..VadConfig::default() },
            VadConfig { z: f64::INFINITY, ..VadConfig::default() },
            VadConfig { abs_floor: -0.1, ..VadConfig::default() },
        ] {
            assert!(cfg.validate().is_err(), "{cfg:?} should be rejected");
        }
    }

    #[test]
    fn rms_of_square_wave() {
        // A square wave at ±0.5 should have RMS = 0.5
        let samples: Vec<f32> = (0..256)
            .map(|i| if i % 2 == 0 { 0.5 } else { -0.5 })
            .collect();
        let rms = rms(&samples);
        assert!((rms - 0.5).abs() < 1e-9, "rms={rms}");
    }

    #[test]
    fn rms_of_empty_is_zero() {
        assert_eq!(rms(&[]), 0.0);
    }

    #[test]
    fn segment_len() {
        assert_eq!(ActiveSegment::new(10, 25).len(), 15);
        assert!(ActiveSegment::new(5, 5).is_empty());
    }
}
