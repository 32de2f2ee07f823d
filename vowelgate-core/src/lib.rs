//! # vowelgate-core
//!
//! Audio gating and pitch-range estimation for vowel-production recordings.
//!
//! ## Architecture
//!
//! ```text
//! SampleBuffer ──► EnergyVad (two-pass frame RMS + hangover) ──► ActiveSegment[]
//!                        │                                          │
//!                        │                                 trim (pre/post roll)
//!                        │                                          │
//!                        └──────────► ActivityStats ◄───────────────┘
//!                                          │
//!                                 AcceptanceCriteria ──► Verdict
//!
//! pitch tracks (Hz, 0 = unvoiced) ──► PitchRangeEstimator ──► floor / ceiling
//! ```
//!
//! Every analysis entry point is a pure function over in-memory data. File
//! and device I/O live in the `vowelgate` binary.

#![forbid(unsafe_code)]
#![warn(clippy::all)]

pub mod batch;
pub mod buffering;
pub mod config;
pub mod error;
pub mod gate;
pub mod pitch;
pub mod report;
pub mod vad;

// Convenience re-exports for downstream crates
pub use buffering::SampleBuffer;
pub use config::AnalysisConfig;
pub use error::VowelGateError;
pub use gate::{AcceptanceCriteria, RecordingAnalyzer, RecordingOutcome, RejectReason, Verdict};
pub use pitch::{PitchRangeConfig, PitchRangeEstimate, PitchRangeEstimator};
pub use vad::{
    energy::EnergyVad, stats::ActivityStats, ActiveSegment, SegmentDetector, VadConfig,
};
