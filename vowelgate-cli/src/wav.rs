//! WAV decoding to mono f32 and 16-bit PCM encoding of trimmed takes.

use std::path::Path;

use anyhow::{bail, Context, Result};
use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use vowelgate_core::buffering::Recording;

/// Decode a WAV file, averaging all channels down to mono.
///
/// Integer PCM is scaled to [-1.0, 1.0) by its bit depth.
pub fn read_mono(path: &Path) -> Result<Recording> {
    let mut reader =
        WavReader::open(path).with_context(|| format!("opening {}", path.display()))?;
    let spec = reader.spec();
    if spec.channels == 0 {
        bail!("{}: WAV header declares zero channels", path.display());
    }

    let interleaved: Vec<f32> = match spec.sample_format {
        SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<std::result::Result<_, _>>()
            .with_context(|| format!("decoding {}", path.display()))?,
        SampleFormat::Int => {
            let scale = 1.0 / (1u64 << (spec.bits_per_sample.saturating_sub(1))) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 * scale))
                .collect::<std::result::Result<_, _>>()
                .with_context(|| format!("decoding {}", path.display()))?
        }
    };

    Ok(Recording::new(
        downmix(&interleaved, spec.channels as usize),
        spec.sample_rate,
    ))
}

fn downmix(interleaved: &[f32], channels: usize) -> Vec<f32> {
    if channels <= 1 {
        return interleaved.to_vec();
    }
    interleaved
        .chunks_exact(channels)
        .map(|frame| frame.iter().sum::<f32>() / channels as f32)
        .collect()
}

/// Write mono samples as 16-bit PCM, clipping to [-1.0, 1.0].
pub fn write_pcm16(path: &Path, samples: &[f32], sample_rate: u32) -> Result<()> {
    let spec = WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut writer =
        WavWriter::create(path, spec).with_context(|| format!("creating {}", path.display()))?;
    for &s in samples {
        let v = (s.clamp(-1.0, 1.0) * f32::from(i16::MAX)).round() as i16;
        writer.write_sample(v)?;
    }
    writer
        .finalize()
        .with_context(|| format!("finalizing {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("vowelgate-{}-{name}", std::process::id()))
    }

    #[test]
    fn stereo_int_file_is_scaled_and_downmixed() {
        let path = temp_path("stereo.wav");
        let spec = WavSpec {
            channels: 2,
            sample_rate: 22_050,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let mut writer = WavWriter::create(&path, spec).unwrap();
        for _ in 0..100 {
            writer.write_sample(16_384i16).unwrap(); // 0.5
            writer.write_sample(0i16).unwrap();
        }
        writer.finalize().unwrap();

        let rec = read_mono(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!(rec.sample_rate, 22_050);
        assert_eq!(rec.samples.len(), 100);
        assert!(rec.samples.iter().all(|&s| (s - 0.25).abs() < 1e-6));
    }

    #[test]
    fn pcm16_output_clips_out_of_range_samples() {
        let path = temp_path("clip.wav");
        write_pcm16(&path, &[2.0, -2.0, 0.0], 16_000).unwrap();
        let rec = read_mono(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!(rec.sample_rate, 16_000);
        assert!((rec.samples[0] - 32_767.0 / 32_768.0).abs() < 1e-6);
        assert!((rec.samples[1] + 32_767.0 / 32_768.0).abs() < 1e-6);
        assert_eq!(rec.samples[2], 0.0);
    }

    #[test]
    fn missing_file_reports_path() {
        let err = read_mono(Path::new("/nonexistent/take.wav")).unwrap_err();
        assert!(format!("{err:#}").contains("/nonexistent/take.wav"));
    }
}
