//! Speaker-adaptive pitch-range estimation.
//!
//! Turns raw pitch-tracker output (Hz per frame, `0` = unvoiced) pooled
//! over many recordings into a floor/ceiling pair for configuring the
//! final pitch extraction pass.
//!
//! ## Pipeline
//!
//! ```text
//! tracks ─► voicing filter ─► physical clip ─► octave fold (pre-fold median)
//!        ─► log-domain MAD rejection (fallback to folded set if < min_robust_count)
//!        ─► percentiles ± margins ─► hard clamps ─► minimum span
//! ```
//!
//! Each stage feeds the next; the order is part of the contract.

pub mod robust;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{invalid, Result};
use robust::{percentile_sorted, robust_abs_z, round2, sorted};

/// Values above `median * FOLD_DOWN_RATIO` are treated as octave doubles.
const FOLD_DOWN_RATIO: f64 = 1.9;
/// Values below `median * FOLD_UP_RATIO` are treated as octave halves.
const FOLD_UP_RATIO: f64 = 0.55;
/// A range narrower than this (Hz) is considered degenerate...
const MIN_SPAN_HZ: f64 = 40.0;
/// ...and is widened to this span above the floor.
const FORCED_SPAN_HZ: f64 = 80.0;
/// Upper bound on any frequency or margin in the config.
const MAX_CONFIG_HZ: f64 = 100_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(default)]
pub struct PitchRangeConfig {
    /// Physically plausible bounds; values outside are dropped before folding.
    pub low_clip: f64,
    pub high_clip: f64,
    /// Percentile cut points in [0, 100].
    pub pct_low: f64,
    pub pct_high: f64,
    /// Padding (Hz) added outside the percentile band.
    pub margin_low: f64,
    pub margin_high: f64,
    /// Absolute clamps, also returned as-is when no data survives.
    pub hard_floor: f64,
    pub hard_ceiling: f64,
    /// Robust |z| at or above which a value is rejected.
    pub mad_z: f64,
    /// Below this many survivors the MAD filter is discarded. At least 1.
    pub min_robust_count: usize,
}

impl Default for PitchRangeConfig {
    fn default() -> Self {
        Self {
            low_clip: 45.0,
            high_clip: 800.0,
            pct_low: 5.0,
            pct_high: 95.0,
            margin_low: 10.0,
            margin_high: 20.0,
            hard_floor: 50.0,
            hard_ceiling: 600.0,
            mad_z: 3.5,
            min_robust_count: 30,
        }
    }
}

impl PitchRangeConfig {
    pub fn validate(&self) -> Result<()> {
        let scalars = [
            ("low_clip", self.low_clip),
            ("high_clip", self.high_clip),
            ("pct_low", self.pct_low),
            ("pct_high", self.pct_high),
            ("margin_low", self.margin_low),
            ("margin_high", self.margin_high),
            ("hard_floor", self.hard_floor),
            ("hard_ceiling", self.hard_ceiling),
            ("mad_z", self.mad_z),
        ];
        if let Some((name, value)) = scalars.iter().find(|(_, v)| !v.is_finite()) {
            return Err(invalid(format!("{name} must be finite, got {value}")));
        }
        if let Some((name, value)) = scalars[..8]
            .iter()
            .find(|(_, v)| v.abs() > MAX_CONFIG_HZ)
        {
            return Err(invalid(format!(
                "{name} must be within ±{MAX_CONFIG_HZ} Hz, got {value}"
            )));
        }
        if self.low_clip > self.high_clip {
            return Err(invalid(format!(
                "low_clip ({}) exceeds high_clip ({})",
                self.low_clip, self.high_clip
            )));
        }
        if !(0.0..=100.0).contains(&self.pct_low)
            || !(0.0..=100.0).contains(&self.pct_high)
            || self.pct_low > self.pct_high
        {
            return Err(invalid(format!(
                "percentiles must satisfy 0 <= pct_low <= pct_high <= 100, got {} / {}",
                self.pct_low, self.pct_high
            )));
        }
        if self.hard_floor >= self.hard_ceiling {
            return Err(invalid(format!(
                "hard_floor ({}) must be below hard_ceiling ({})",
                self.hard_floor, self.hard_ceiling
            )));
        }
        if self.mad_z <= 0.0 {
            return Err(invalid(format!("mad_z must be positive, got {}", self.mad_z)));
        }
        if self.min_robust_count == 0 {
            return Err(invalid("min_robust_count must be at least 1"));
        }
        Ok(())
    }
}

/// Why an estimate fell back to the hard bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EstimateNote {
    NoVoicedFrames,
    AllFramesClipped,
}

/// Floor/ceiling pair plus diagnostics of the surviving sample set.
///
/// `ceiling_hz > floor_hz` holds for every estimate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PitchRangeEstimate {
    pub floor_hz: f64,
    pub ceiling_hz: f64,
    /// Size of the final surviving set; 0 on the degenerate paths.
    pub voiced_count: usize,
    pub median_hz: Option<f64>,
    /// `pct_low` percentile of the surviving set (5th by default).
    pub p5_hz: Option<f64>,
    /// `pct_high` percentile of the surviving set (95th by default).
    pub p95_hz: Option<f64>,
    /// False when too few values survived MAD rejection and the folded set
    /// was used instead.
    pub used_robust_filter: bool,
    pub note: Option<EstimateNote>,
}

impl PitchRangeEstimate {
    pub fn is_degenerate(&self) -> bool {
        self.note.is_some()
    }
}

#[derive(Debug, Clone, Default)]
pub struct PitchRangeEstimator {
    config: PitchRangeConfig,
}

impl PitchRangeEstimator {
    /// # Errors
    /// `InvalidConfiguration` if the config is inconsistent.
    pub fn new(config: PitchRangeConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &PitchRangeConfig {
        &self.config
    }

    /// Estimate a floor/ceiling from per-recording pitch tracks.
    ///
    /// Deterministic: the same tracks in the same order give a bit-identical
    /// result.
    pub fn estimate<T: AsRef<[f64]>>(&self, tracks: &[T]) -> PitchRangeEstimate {
        let cfg = &self.config;

        let voiced: Vec<f64> = tracks
            .iter()
            .flat_map(|t| t.as_ref().iter().copied())
            .filter(|f| f.is_finite() && *f > 0.0)
            .collect();
        if voiced.is_empty() {
            warn!(tracks = tracks.len(), "no voiced frames; using hard pitch bounds");
            return self.degenerate(EstimateNote::NoVoicedFrames);
        }

        let clipped: Vec<f64> = voiced
            .iter()
            .copied()
            .filter(|f| (cfg.low_clip..=cfg.high_clip).contains(f))
            .collect();
        if clipped.is_empty() {
            warn!(
                voiced = voiced.len(),
                "all frames outside clip range; using hard pitch bounds"
            );
            return self.degenerate(EstimateNote::AllFramesClipped);
        }

        let folded = fold_octaves(&clipped);
        let kept = self.reject_outliers(&folded);
        debug!(
            voiced = voiced.len(),
            clipped = clipped.len(),
            kept = kept.len(),
            "pitch pool filtered"
        );

        let used_robust_filter = !kept.is_empty() && kept.len() >= cfg.min_robust_count;
        let survivors = if used_robust_filter {
            sorted(&kept)
        } else {
            warn!(
                kept = kept.len(),
                min = cfg.min_robust_count,
                "too few values after MAD rejection; using folded set"
            );
            sorted(&folded)
        };

        // `survivors` is non-empty: `kept` is only used when non-empty and
        // folding preserves the clipped count.
        let p_low = percentile_sorted(&survivors, cfg.pct_low).unwrap_or(cfg.hard_floor);
        let p_high = percentile_sorted(&survivors, cfg.pct_high).unwrap_or(cfg.hard_ceiling);
        let median = percentile_sorted(&survivors, 50.0);

        let floor = cfg.hard_floor.max(p_low - cfg.margin_low);
        let mut ceiling = cfg.hard_ceiling.min(p_high + cfg.margin_high);
        if ceiling <= floor + MIN_SPAN_HZ {
            ceiling = floor + FORCED_SPAN_HZ;
        }

        let estimate = PitchRangeEstimate {
            floor_hz: round2(floor),
            ceiling_hz: round2(ceiling),
            voiced_count: survivors.len(),
            median_hz: median.map(round2),
            p5_hz: Some(round2(p_low)),
            p95_hz: Some(round2(p_high)),
            used_robust_filter,
            note: None,
        };
        info!(
            floor_hz = estimate.floor_hz,
            ceiling_hz = estimate.ceiling_hz,
            voiced_count = estimate.voiced_count,
            "pitch range estimated"
        );
        estimate
    }

    /// Keep values whose log-domain robust |z| is below `mad_z`.
    fn reject_outliers(&self, folded: &[f64]) -> Vec<f64> {
        let log_f0: Vec<f64> = folded.iter().map(|f| f.ln()).collect();
        let z = robust_abs_z(&log_f0);
        folded
            .iter()
            .zip(z)
            .filter(|(_, z)| *z < self.config.mad_z)
            .map(|(f, _)| *f)
            .collect()
    }

    fn degenerate(&self, note: EstimateNote) -> PitchRangeEstimate {
        PitchRangeEstimate {
            floor_hz: self.config.hard_floor,
            ceiling_hz: self.config.hard_ceiling,
            voiced_count: 0,
            median_hz: None,
            p5_hz: None,
            p95_hz: None,
            used_robust_filter: false,
            note: Some(note),
        }
    }
}

/// Single fold pass around the pre-fold median: halve apparent doubles,
/// then double apparent halves.
pub fn fold_octaves(values: &[f64]) -> Vec<f64> {
    let Some(reference) = robust::median(values).filter(|m| *m > 0.0) else {
        return values.to_vec();
    };
    values
        .iter()
        .map(|&v| {
            let mut f = v;
            if f / reference > FOLD_DOWN_RATIO {
                f /= 2.0;
            }
            if f / reference < FOLD_UP_RATIO {
                f *= 2.0;
            }
            f
        })
        .collect()
}
