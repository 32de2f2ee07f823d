//! Typed mono sample containers.

use std::ops::Range;

use crate::error::{invalid, Result};

/// A contiguous block of mono PCM samples at a known sample rate.
///
/// Produced once per recording by whatever decodes or captures audio.
#[derive(Debug, Clone, PartialEq)]
pub struct Recording {
    /// Mono f32 samples in [-1.0, 1.0].
    pub samples: Vec<f32>,
    /// Sample rate in Hz (e.g. 16000, 44100, 48000).
    pub sample_rate: u32,
}

impl Recording {
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    /// Borrow the recording as an analysis view.
    ///
    /// # Errors
    /// `InvalidConfiguration` if the sample rate is zero.
    pub fn as_buffer(&self) -> Result<SampleBuffer<'_>> {
        SampleBuffer::new(&self.samples, self.sample_rate)
    }

    /// Returns the duration of this recording in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate as f64
    }

    /// Returns true if the recording contains no samples.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Immutable view over mono samples with a validated, positive sample rate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleBuffer<'a> {
    samples: &'a [f32],
    sample_rate: u32,
}

impl<'a> SampleBuffer<'a> {
    /// # Errors
    /// `InvalidConfiguration` if `sample_rate` is zero.
    pub fn new(samples: &'a [f32], sample_rate: u32) -> Result<Self> {
        if sample_rate == 0 {
            return Err(invalid("sample rate must be positive"));
        }
        Ok(Self {
            samples,
            sample_rate,
        })
    }

    pub fn samples(&self) -> &'a [f32] {
        self.samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Number of samples covering `ms` milliseconds, rounded to nearest.
    pub fn samples_for_ms(&self, ms: f64) -> usize {
        (self.sample_rate as f64 * ms / 1000.0).round().max(0.0) as usize
    }

    /// Sub-view over `range`, clamped to the buffer bounds.
    pub fn slice(&self, range: Range<usize>) -> SampleBuffer<'a> {
        let end = range.end.min(self.samples.len());
        let start = range.start.min(end);
        SampleBuffer {
            samples: &self.samples[start..end],
            sample_rate: self.sample_rate,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_sample_rate_is_rejected() {
        let samples = [0.0f32; 4];
        assert!(SampleBuffer::new(&samples, 0).is_err());
        assert!(Recording::new(samples.to_vec(), 0).as_buffer().is_err());
    }

    #[test]
    fn slice_clamps_out_of_range_bounds() {
        let samples: Vec<f32> = (0..10).map(|i| i as f32).collect();
        let buf = SampleBuffer::new(&samples, 8000).unwrap();
        assert_eq!(buf.slice(2..5).samples(), &[2.0, 3.0, 4.0]);
        assert_eq!(buf.slice(8..50).len(), 2);
        assert!(buf.slice(12..20).is_empty());
        assert_eq!(buf.slice(3..7).sample_rate(), 8000);
    }

    #[test]
    fn samples_for_ms_rounds_to_nearest() {
        let samples = [0.0f32; 1];
        let buf = SampleBuffer::new(&samples, 44_100).unwrap();
        assert_eq!(buf.samples_for_ms(10.0), 441);
        assert_eq!(buf.samples_for_ms(20.0), 882);
        let buf = SampleBuffer::new(&samples, 22_050).unwrap();
        // 220.5 rounds away from zero
        assert_eq!(buf.samples_for_ms(10.0), 221);
    }

    #[test]
    fn recording_duration() {
        let rec = Recording::new(vec![0.0; 24_000], 48_000);
        assert!((rec.duration_secs() - 0.5).abs() < 1e-12);
        assert!(!rec.is_empty());
    }
}
