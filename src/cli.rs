//! Shared argument parsing for the stage binaries.
//!
//! The four augmentation binaries take the same flags, so the parse loop
//! lives here; each binary supplies its name and description for the help
//! text. Parsed flags become override structs layered on top of the stage
//! defaults and any `wavprep.toml` values.

use std::path::PathBuf;

use crate::config::{
    AugmentStageConfig, CONFIG_FILE_NAME, ConvertOverrides, StageOverrides, ToolsOverrides,
};
use crate::pipeline::RunCounters;

/// Parsed command line for an augmentation stage binary.
#[derive(Debug, Default)]
pub struct StageArgs {
    pub config_path: PathBuf,
    pub stage: StageOverrides,
    pub tools: ToolsOverrides,
    /// Seed for the per-row random draws; defaults to OS entropy.
    pub seed: Option<u64>,
}

/// Parsed command line for the conversion binary.
#[derive(Debug, Default)]
pub struct ConvertArgs {
    pub config_path: PathBuf,
    pub convert: ConvertOverrides,
    pub tools: ToolsOverrides,
}

/// Parse an augmentation binary's arguments.
///
/// `with_seed` enables the `--seed` flag for stages that draw random
/// parameters. Returns `Ok(None)` when help was requested and printed.
pub fn parse_stage_args(
    program: &str,
    about: &str,
    with_seed: bool,
    args: Vec<String>,
) -> Result<Option<StageArgs>, String> {
    let mut parsed = StageArgs {
        config_path: PathBuf::from(CONFIG_FILE_NAME),
        ..StageArgs::default()
    };

    let mut idx = 0usize;
    while idx < args.len() {
        match args[idx].as_str() {
            "-h" | "--help" => {
                println!("{}", stage_help_text(program, about, with_seed));
                return Ok(None);
            }
            "--config" => {
                parsed.config_path = PathBuf::from(required_value(&args, &mut idx)?);
            }
            "--input-dir" => {
                parsed.stage.input_dir = Some(PathBuf::from(required_value(&args, &mut idx)?));
            }
            "--output-dir" => {
                parsed.stage.output_dir = Some(PathBuf::from(required_value(&args, &mut idx)?));
            }
            "--manifest-in" => {
                parsed.stage.input_manifest =
                    Some(PathBuf::from(required_value(&args, &mut idx)?));
            }
            "--manifest-out" => {
                parsed.stage.output_manifest =
                    Some(PathBuf::from(required_value(&args, &mut idx)?));
            }
            "--max-duration" => {
                let value = required_value(&args, &mut idx)?;
                parsed.stage.max_duration_secs = Some(
                    value
                        .parse::<f64>()
                        .map_err(|_| format!("Invalid --max-duration value: {value}"))?,
                );
            }
            "--ffmpeg" => {
                parsed.tools.ffmpeg = Some(required_value(&args, &mut idx)?);
            }
            "--ffprobe" => {
                parsed.tools.ffprobe = Some(required_value(&args, &mut idx)?);
            }
            "--seed" if with_seed => {
                let value = required_value(&args, &mut idx)?;
                parsed.seed = Some(
                    value
                        .parse::<u64>()
                        .map_err(|_| format!("Invalid --seed value: {value}"))?,
                );
            }
            unknown => {
                return Err(format!(
                    "Unknown argument: {unknown}\n\n{}",
                    stage_help_text(program, about, with_seed)
                ));
            }
        }
        idx += 1;
    }

    Ok(Some(parsed))
}

/// Parse the conversion binary's arguments.
///
/// Returns `Ok(None)` when help was requested and printed.
pub fn parse_convert_args(
    program: &str,
    about: &str,
    args: Vec<String>,
) -> Result<Option<ConvertArgs>, String> {
    let mut parsed = ConvertArgs {
        config_path: PathBuf::from(CONFIG_FILE_NAME),
        ..ConvertArgs::default()
    };

    let mut idx = 0usize;
    while idx < args.len() {
        match args[idx].as_str() {
            "-h" | "--help" => {
                println!("{}", convert_help_text(program, about));
                return Ok(None);
            }
            "--config" => {
                parsed.config_path = PathBuf::from(required_value(&args, &mut idx)?);
            }
            "--input-dir" => {
                parsed.convert.input_dir = Some(PathBuf::from(required_value(&args, &mut idx)?));
            }
            "--wav-dir" => {
                parsed.convert.wav_dir = Some(PathBuf::from(required_value(&args, &mut idx)?));
            }
            "--kept-dir" => {
                parsed.convert.kept_dir = Some(PathBuf::from(required_value(&args, &mut idx)?));
            }
            "--max-duration" => {
                let value = required_value(&args, &mut idx)?;
                parsed.convert.max_duration_secs = Some(
                    value
                        .parse::<f64>()
                        .map_err(|_| format!("Invalid --max-duration value: {value}"))?,
                );
            }
            "--ffmpeg" => {
                parsed.tools.ffmpeg = Some(required_value(&args, &mut idx)?);
            }
            "--ffprobe" => {
                parsed.tools.ffprobe = Some(required_value(&args, &mut idx)?);
            }
            unknown => {
                return Err(format!(
                    "Unknown argument: {unknown}\n\n{}",
                    convert_help_text(program, about)
                ));
            }
        }
        idx += 1;
    }

    Ok(Some(parsed))
}

fn required_value(args: &[String], idx: &mut usize) -> Result<String, String> {
    let flag = args[*idx].clone();
    *idx += 1;
    args.get(*idx)
        .cloned()
        .ok_or_else(|| format!("{flag} requires a value"))
}

/// Print the end-of-run summary block for an augmentation stage.
pub fn print_stage_summary(title: &str, counters: &RunCounters, config: &AugmentStageConfig) {
    let rule = "=".repeat(50);
    println!();
    println!("{rule}");
    println!("{title}");
    println!("{rule}");
    println!("Successfully augmented: {}", counters.success);
    println!("Failed: {}", counters.failed);
    println!("Files not found: {}", counters.not_found);
    if let Some(max_secs) = config.max_duration_secs {
        println!("Skipped (duration > {max_secs:.0}s): {}", counters.filtered);
    }
    println!();
    println!(
        "Updated manifest saved as: {}",
        config.output_manifest.display()
    );
    println!("Augmented audio files in: {}", config.output_dir.display());
}

fn stage_help_text(program: &str, about: &str, with_seed: bool) -> String {
    let mut lines = vec![
        program.to_string(),
        String::new(),
        about.to_string(),
        String::new(),
        "Usage:".to_string(),
        format!("  {program} [options]"),
        String::new(),
        "Options:".to_string(),
        "  --config <path>        Config file (default: wavprep.toml).".to_string(),
        "  --input-dir <dir>      Directory holding the source WAVs.".to_string(),
        "  --output-dir <dir>     Directory receiving derived files.".to_string(),
        "  --manifest-in <path>   Manifest CSV to read.".to_string(),
        "  --manifest-out <path>  Manifest CSV to write.".to_string(),
        "  --max-duration <secs>  Skip rows probed longer than this.".to_string(),
        "  --ffmpeg <program>     Transcoder program (default: ffmpeg).".to_string(),
        "  --ffprobe <program>    Prober program (default: ffprobe).".to_string(),
    ];
    if with_seed {
        lines.push("  --seed <u64>           Seed the per-row random draws.".to_string());
    }
    lines.join("\n")
}

fn convert_help_text(program: &str, about: &str) -> String {
    [
        program,
        "",
        about,
        "",
        "Usage:",
        &format!("  {program} [options]"),
        "",
        "Options:",
        "  --config <path>        Config file (default: wavprep.toml).",
        "  --input-dir <dir>      Directory scanned for .webm recordings.",
        "  --wav-dir <dir>        Directory receiving every converted WAV.",
        "  --kept-dir <dir>       Directory receiving WAVs under the threshold.",
        "  --max-duration <secs>  Keep only recordings at or under this.",
        "  --ffmpeg <program>     Transcoder program (default: ffmpeg).",
        "  --ffprobe <program>    Prober program (default: ffprobe).",
    ]
    .join("\n")
}
