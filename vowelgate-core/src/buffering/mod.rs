//! Sample containers handed to the analysis stages.
//!
//! `Recording` owns decoded audio; `SampleBuffer` is the borrowed,
//! read-only view every detector and statistic consumes.

pub mod chunk;

pub use chunk::{Recording, SampleBuffer};
