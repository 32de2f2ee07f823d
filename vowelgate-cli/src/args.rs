//! Command-line parsing.

use std::path::PathBuf;

pub const USAGE: &str = "\
Usage:
  vowelgate gate [--config <file.json>] [--trimmed-dir <dir>] [--workers <n>] <take.wav>...
  vowelgate pitch-range [--config <file.json>] <tracks.json>
  vowelgate init-config <file.json>

Logging is controlled by RUST_LOG (default: vowelgate=info).";

#[derive(Debug, PartialEq)]
pub enum Command {
    Gate {
        config: Option<PathBuf>,
        trimmed_dir: Option<PathBuf>,
        workers: Option<usize>,
        files: Vec<PathBuf>,
    },
    PitchRange {
        config: Option<PathBuf>,
        tracks: PathBuf,
    },
    InitConfig {
        path: PathBuf,
    },
    Help,
}

pub fn parse_args<I>(args: I) -> Result<Command, String>
where
    I: IntoIterator<Item = String>,
{
    let mut it = args.into_iter();
    let Some(sub) = it.next() else {
        return Err("missing subcommand".into());
    };

    let mut config: Option<PathBuf> = None;
    let mut trimmed_dir: Option<PathBuf> = None;
    let mut workers: Option<usize> = None;
    let mut positional: Vec<PathBuf> = Vec::new();

    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--config" => {
                let Some(v) = it.next() else {
                    return Err("missing value for --config".into());
                };
                config = Some(PathBuf::from(v));
            }
            "--trimmed-dir" => {
                let Some(v) = it.next() else {
                    return Err("missing value for --trimmed-dir".into());
                };
                trimmed_dir = Some(PathBuf::from(v));
            }
            "--workers" => {
                let Some(v) = it.next() else {
                    return Err("missing value for --workers".into());
                };
                workers = Some(
                    v.parse::<usize>()
                        .map_err(|_| "invalid value for --workers".to_string())?
                        .max(1),
                );
            }
            "--help" | "-h" => return Ok(Command::Help),
            other if other.starts_with("--") => {
                return Err(format!("unknown argument: {other}"));
            }
            _ => positional.push(PathBuf::from(&arg)),
        }
    }

    match sub.as_str() {
        "gate" => {
            if positional.is_empty() {
                return Err("gate needs at least one WAV file".into());
            }
            Ok(Command::Gate {
                config,
                trimmed_dir,
                workers,
                files: positional,
            })
        }
        "pitch-range" => {
            if trimmed_dir.is_some() || workers.is_some() {
                return Err("pitch-range only accepts --config".into());
            }
            match <[PathBuf; 1]>::try_from(positional) {
                Ok([tracks]) => Ok(Command::PitchRange { config, tracks }),
                Err(_) => Err("pitch-range needs exactly one tracks file".into()),
            }
        }
        "init-config" => match <[PathBuf; 1]>::try_from(positional) {
            Ok([path]) => Ok(Command::InitConfig { path }),
            Err(_) => Err("init-config needs exactly one output path".into()),
        },
        "help" | "--help" | "-h" => Ok(Command::Help),
        other => Err(format!("unknown subcommand: {other}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Command, String> {
        parse_args(args.iter().map(|s| s.to_string()))
    }

    #[test]
    fn gate_with_options() {
        let cmd = parse(&["gate", "--workers", "0", "--trimmed-dir", "out", "a.wav", "b.wav"]);
        assert_eq!(
            cmd,
            Ok(Command::Gate {
                config: None,
                trimmed_dir: Some(PathBuf::from("out")),
                workers: Some(1),
                files: vec![PathBuf::from("a.wav"), PathBuf::from("b.wav")],
            })
        );
    }

    #[test]
    fn pitch_range_needs_one_file() {
        assert!(parse(&["pitch-range"]).is_err());
        assert!(parse(&["pitch-range", "a.json", "b.json"]).is_err());
        assert_eq!(
            parse(&["pitch-range", "--config", "c.json", "t.json"]),
            Ok(Command::PitchRange {
                config: Some(PathBuf::from("c.json")),
                tracks: PathBuf::from("t.json"),
            })
        );
    }

    #[test]
    fn unknown_flags_and_subcommands_are_errors() {
        assert!(parse(&["gate", "--fast", "a.wav"]).is_err());
        assert!(parse(&["record"]).is_err());
        assert!(parse(&[]).is_err());
        assert!(parse(&["gate", "--workers"]).is_err());
    }

    #[test]
    fn help_anywhere() {
        assert_eq!(parse(&["--help"]), Ok(Command::Help));
        assert_eq!(parse(&["gate", "-h"]), Ok(Command::Help));
    }
}
