//! `vowelgate` — batch front end for vowelgate-core.
//!
//! Reads recorded takes and pitch tracks from disk, runs the core analyses
//! and prints one JSON record per result on stdout.

mod args;
mod wav;

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use tracing::{debug, info, warn};
use vowelgate_core::{
    batch,
    buffering::{Recording, SampleBuffer},
    config::{load_config, save_config},
    report::{PitchRangeReport, RecordingReport},
    AnalysisConfig, PitchRangeEstimator, RecordingAnalyzer,
};

use args::{parse_args, Command, USAGE};

fn main() {
    // ── Tracing ───────────────────────────────────────────────────────────
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("vowelgate=info")),
        )
        .init();

    let command = match parse_args(std::env::args().skip(1)) {
        Ok(cmd) => cmd,
        Err(e) => {
            eprintln!("vowelgate: {e}\n\n{USAGE}");
            std::process::exit(2);
        }
    };

    if let Err(e) = run(command) {
        eprintln!("vowelgate failed: {e:#}");
        std::process::exit(1);
    }
}

fn run(command: Command) -> Result<()> {
    match command {
        Command::Gate {
            config,
            trimmed_dir,
            workers,
            files,
        } => gate(config.as_deref(), trimmed_dir.as_deref(), workers, &files),
        Command::PitchRange { config, tracks } => pitch_range(config.as_deref(), &tracks),
        Command::InitConfig { path } => {
            save_config(&path, &AnalysisConfig::default())
                .with_context(|| format!("writing {}", path.display()))?;
            info!(path = %path.display(), "default config written");
            Ok(())
        }
        Command::Help => {
            println!("{USAGE}");
            Ok(())
        }
    }
}

fn config_from(path: Option<&Path>) -> Result<AnalysisConfig> {
    match path {
        Some(p) => load_config(p).with_context(|| format!("loading config {}", p.display())),
        None => Ok(AnalysisConfig::default()),
    }
}

fn gate(
    config: Option<&Path>,
    trimmed_dir: Option<&Path>,
    workers: Option<usize>,
    files: &[PathBuf],
) -> Result<()> {
    let config = config_from(config)?;
    let analyzer = RecordingAnalyzer::from_config(&config)?;

    let trimmed_paths = match trimmed_dir {
        Some(dir) => {
            fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
            Some(trimmed_outputs(dir, files)?)
        }
        None => None,
    };

    let recordings: Vec<Recording> = files
        .iter()
        .map(|p| wav::read_mono(p))
        .collect::<Result<_>>()?;
    for (rec, path) in recordings.iter().zip(files) {
        if rec.is_empty() {
            warn!(file = %path.display(), "take has no samples");
        } else {
            debug!(
                file = %path.display(),
                duration_s = rec.duration_secs(),
                sample_rate = rec.sample_rate,
                "take decoded"
            );
        }
    }
    let buffers: Vec<SampleBuffer<'_>> = recordings
        .iter()
        .zip(files)
        .map(|(rec, path)| {
            rec.as_buffer()
                .with_context(|| format!("{} has an invalid header", path.display()))
        })
        .collect::<Result<_>>()?;

    let workers = workers.unwrap_or_else(|| {
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
    });
    let outcomes = batch::analyze_all(&analyzer, &buffers, workers);

    let mut accepted = 0usize;
    for (i, ((path, buffer), outcome)) in files.iter().zip(&buffers).zip(outcomes).enumerate() {
        let outcome = outcome.with_context(|| format!("analysing {}", path.display()))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        if let Some(out) = trimmed_paths.as_ref().map(|paths| &paths[i]) {
            let trimmed = buffer.slice(outcome.trim.clone());
            wav::write_pcm16(out, trimmed.samples(), buffer.sample_rate())?;
        }
        if outcome.verdict.is_accepted() {
            accepted += 1;
        } else {
            warn!(file = %name, verdict = ?outcome.verdict, "take rejected");
        }

        let report = RecordingReport::new(name, buffer.sample_rate(), &outcome);
        println!("{}", serde_json::to_string(&report)?);
    }

    info!(takes = files.len(), accepted, "gating finished");
    Ok(())
}

/// Output path in `dir` for each take.
///
/// Fails if two takes share a file name or an output would overwrite its own
/// input.
fn trimmed_outputs(dir: &Path, files: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let dir = dir
        .canonicalize()
        .with_context(|| format!("resolving {}", dir.display()))?;
    let mut seen = HashSet::new();
    let mut outputs = Vec::with_capacity(files.len());
    for path in files {
        let Some(name) = path.file_name() else {
            bail!("{} has no file name", path.display());
        };
        if !seen.insert(name.to_os_string()) {
            bail!(
                "more than one take is named {}; trimmed copies would overwrite each other",
                name.to_string_lossy()
            );
        }
        let out = dir.join(name);
        if path.canonicalize().is_ok_and(|input| input == out) {
            bail!(
                "trimmed copy of {} would overwrite the original; choose another --trimmed-dir",
                path.display()
            );
        }
        outputs.push(out);
    }
    Ok(outputs)
}

fn pitch_range(config: Option<&Path>, tracks_path: &Path) -> Result<()> {
    let config = config_from(config)?;
    let estimator = PitchRangeEstimator::new(config.pitch)?;

    let raw = fs::read_to_string(tracks_path)
        .with_context(|| format!("reading {}", tracks_path.display()))?;
    // `null` frames are treated as unvoiced, like zeros.
    let parsed: Vec<Vec<Option<f64>>> = serde_json::from_str(&raw)
        .with_context(|| format!("parsing {} as a JSON array of arrays", tracks_path.display()))?;
    let tracks: Vec<Vec<f64>> = parsed
        .into_iter()
        .map(|track| track.into_iter().map(|f| f.unwrap_or(0.0)).collect())
        .collect();

    let estimate = estimator.estimate(&tracks);
    let report = PitchRangeReport {
        tracks: tracks.len(),
        estimate,
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("vowelgate-{name}-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn trimmed_outputs_keep_file_names() {
        let src = scratch_dir("outputs-src");
        let out = scratch_dir("outputs-dst");
        let files = vec![src.join("a.wav"), src.join("b.wav")];
        let paths = trimmed_outputs(&out, &files).unwrap();
        let canon = out.canonicalize().unwrap();
        assert_eq!(paths, vec![canon.join("a.wav"), canon.join("b.wav")]);
        fs::remove_dir_all(src).ok();
        fs::remove_dir_all(out).ok();
    }

    #[test]
    fn colliding_basenames_are_refused() {
        let out = scratch_dir("collide-dst");
        let files = vec![PathBuf::from("s1/take.wav"), PathBuf::from("s2/take.wav")];
        let err = trimmed_outputs(&out, &files).unwrap_err();
        assert!(err.to_string().contains("take.wav"), "{err}");
        fs::remove_dir_all(out).ok();
    }

    #[test]
    fn trimming_into_the_source_dir_is_refused() {
        let src = scratch_dir("inplace");
        let take = src.join("take.wav");
        wav::write_pcm16(&take, &[0.0, 0.5, -0.5], 8_000).unwrap();
        let err = trimmed_outputs(&src, &[take.clone()]).unwrap_err();
        assert!(err.to_string().contains("overwrite the original"), "{err}");
        // the raw take is untouched
        assert_eq!(wav::read_mono(&take).unwrap().samples.len(), 3);
        fs::remove_dir_all(src).ok();
    }
}
