//! Parallel analysis of independent recordings.
//!
//! Each recording is analysed in isolation, so a batch is a plain fan-out:
//! indices go into a `crossbeam_channel` work queue drained by scoped
//! worker threads, and results are put back in input order.

use std::thread;

use tracing::{debug, error};

use crate::{
    buffering::SampleBuffer,
    error::{Result, VowelGateError},
    gate::{RecordingAnalyzer, RecordingOutcome},
    vad::SegmentDetector,
};

/// Analyse every buffer with `analyzer` on up to `workers` threads.
///
/// The output has one entry per input, in input order. A worker panic is
/// reported as an error for the recordings it did not finish.
pub fn analyze_all<D: SegmentDetector>(
    analyzer: &RecordingAnalyzer<D>,
    buffers: &[SampleBuffer<'_>],
    workers: usize,
) -> Vec<Result<RecordingOutcome>> {
    if buffers.is_empty() {
        return Vec::new();
    }
    let workers = workers.clamp(1, buffers.len());

    let (job_tx, job_rx) = crossbeam_channel::unbounded::<usize>();
    let (out_tx, out_rx) = crossbeam_channel::unbounded::<(usize, Result<RecordingOutcome>)>();
    for index in 0..buffers.len() {
        // Receiver is alive until the scope below ends.
        let _ = job_tx.send(index);
    }
    drop(job_tx);

    thread::scope(|scope| {
        let handles: Vec<_> = (0..workers)
            .map(|_| {
                let job_rx = job_rx.clone();
                let out_tx = out_tx.clone();
                scope.spawn(move || {
                    for index in job_rx.iter() {
                        let result = analyzer.analyze(&buffers[index]);
                        if out_tx.send((index, result)).is_err() {
                            break;
                        }
                    }
                })
            })
            .collect();
        for handle in handles {
            if handle.join().is_err() {
                error!("batch worker panicked");
            }
        }
    });
    drop(out_tx);

    let mut slots: Vec<Option<Result<RecordingOutcome>>> = buffers.iter().map(|_| None).collect();
    for (index, result) in out_rx.try_iter() {
        slots[index] = Some(result);
    }
    debug!(recordings = buffers.len(), workers, "batch analysed");

    slots
        .into_iter()
        .enumerate()
        .map(|(index, slot)| {
            slot.unwrap_or_else(|| {
                Err(VowelGateError::Other(anyhow::anyhow!(
                    "recording {index} was not analysed (worker panicked)"
                )))
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AnalysisConfig;

    fn tone(len: usize, onset: usize, burst: usize, amp: f32) -> Vec<f32> {
        let mut samples = vec![0.0f32; len];
        for (i, s) in samples[onset..onset + burst].iter_mut().enumerate() {
            let envelope = (std::f32::consts::PI * i as f32 / burst as f32).sin();
            *s = amp * envelope * (i as f32 * 0.06).sin();
        }
        samples
    }

    #[test]
    fn results_follow_input_order() {
        let analyzer = RecordingAnalyzer::from_config(&AnalysisConfig::default()).unwrap();
        let recordings: Vec<Vec<f32>> = vec![
            tone(32_000, 4_000, 12_000, 0.5),
            vec![0.0; 16_000],
            tone(32_000, 8_000, 1_000, 0.5),
            tone(32_000, 2_000, 20_000, 0.4),
        ];
        let buffers: Vec<SampleBuffer<'_>> = recordings
            .iter()
            .map(|r| SampleBuffer::new(r, 16_000).unwrap())
            .collect();

        let parallel = analyze_all(&analyzer, &buffers, 3);
        assert_eq!(parallel.len(), buffers.len());
        for (buf, result) in buffers.iter().zip(&parallel) {
            let sequential = analyzer.analyze(buf).unwrap();
            assert_eq!(result.as_ref().unwrap(), &sequential);
        }
    }

    #[test]
    fn empty_batch_is_empty() {
        let analyzer = RecordingAnalyzer::from_config(&AnalysisConfig::default()).unwrap();
        assert!(analyze_all(&analyzer, &[], 4).is_empty());
    }

    #[test]
    fn zero_workers_still_runs() {
        let analyzer = RecordingAnalyzer::from_config(&AnalysisConfig::default()).unwrap();
        let samples = vec![0.0f32; 1600];
        let buffers = [SampleBuffer::new(&samples, 16_000).unwrap()];
        let results = analyze_all(&analyzer, &buffers, 0);
        assert_eq!(results.len(), 1);
        assert!(results[0].is_ok());
    }
}
