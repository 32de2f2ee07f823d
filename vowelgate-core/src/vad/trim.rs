//! Endpoint trimming: cut a recording down to its spoken content plus a
//! short pre/post roll.

use std::ops::Range;

use serde::{Deserialize, Serialize};

use super::ActiveSegment;
use crate::buffering::SampleBuffer;
use crate::error::{invalid, Result};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(default)]
pub struct TrimConfig {
    /// Audio kept before the first active segment.
    pub pre_roll_ms: f64,
    /// Audio kept after the last active segment.
    pub post_roll_ms: f64,
}

impl Default for TrimConfig {
    fn default() -> Self {
        Self {
            pre_roll_ms: 20.0,
            post_roll_ms: 20.0,
        }
    }
}

impl TrimConfig {
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("pre_roll_ms", self.pre_roll_ms),
            ("post_roll_ms", self.post_roll_ms),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(invalid(format!(
                    "{name} must be non-negative and finite, got {value}"
                )));
            }
        }
        Ok(())
    }
}

/// Range of `buffer` spanning first segment start to last segment end,
/// widened by the configured rolls. Without segments the whole buffer is
/// kept.
pub fn trim_range(
    buffer: &SampleBuffer<'_>,
    segments: &[ActiveSegment],
    config: &TrimConfig,
) -> Range<usize> {
    let len = buffer.len();
    match (segments.first(), segments.last()) {
        (Some(first), Some(last)) => {
            let start = first.start.saturating_sub(buffer.samples_for_ms(config.pre_roll_ms));
            let end = last
                .end
                .saturating_add(buffer.samples_for_ms(config.post_roll_ms))
                .min(len);
            start.min(end)..end
        }
        _ => 0..len,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_segments_keeps_everything() {
        let samples = vec![0.0f32; 500];
        let buf = SampleBuffer::new(&samples, 1000).unwrap();
        assert_eq!(trim_range(&buf, &[], &TrimConfig::default()), 0..500);
    }

    #[test]
    fn rolls_extend_outer_segments() {
        let samples = vec![0.0f32; 1000];
        let buf = SampleBuffer::new(&samples, 1000).unwrap();
        let segs = [ActiveSegment::new(100, 200), ActiveSegment::new(400, 600)];
        assert_eq!(trim_range(&buf, &segs, &TrimConfig::default()), 80..620);
    }

    #[test]
    fn rolls_clamp_at_buffer_edges() {
        let samples = vec![0.0f32; 1000];
        let buf = SampleBuffer::new(&samples, 1000).unwrap();
        let segs = [ActiveSegment::new(5, 990)];
        assert_eq!(trim_range(&buf, &segs, &TrimConfig::default()), 0..1000);
    }

    #[test]
    fn negative_roll_is_invalid() {
        let cfg = TrimConfig {
            pre_roll_ms: -5.0,
            ..TrimConfig::default()
        };
        assert!(cfg.validate().is_err());
    }
}
