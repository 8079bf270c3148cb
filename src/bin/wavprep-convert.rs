//! Container-to-WAV conversion stage.

use wavprep::cli;
use wavprep::config::{self, ConvertConfig, ToolsConfig};
use wavprep::logging;
use wavprep::media::MediaTools;
use wavprep::stages::convert;

const PROGRAM: &str = "wavprep-convert";
const ABOUT: &str =
    "Converts .webm recordings to 16-bit 16 kHz mono WAV and keeps those at or under 30 seconds.";

fn main() {
    if let Err(err) = run() {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let Some(args) =
        cli::parse_convert_args(PROGRAM, ABOUT, std::env::args().skip(1).collect())?
    else {
        return Ok(());
    };
    if let Err(err) = logging::init(PROGRAM) {
        eprintln!("Logging disabled: {err}");
    }

    let overrides = config::load_overrides(&args.config_path).map_err(|err| err.to_string())?;
    let mut tools = ToolsConfig::default();
    tools.apply(&overrides.tools);
    tools.apply(&args.tools);
    let mut convert_config = ConvertConfig::default();
    convert_config.apply(&overrides.convert);
    convert_config.apply(&args.convert);

    let media = MediaTools::new(&tools.ffmpeg, &tools.ffprobe);
    let counters = convert::run(&convert_config, &media).map_err(|err| err.to_string())?;

    let rule = "=".repeat(50);
    println!();
    println!("{rule}");
    println!("Conversion and filtering complete");
    println!("{rule}");
    println!(
        "Files kept (<= {:.0}s): {}",
        convert_config.max_duration_secs, counters.kept
    );
    println!(
        "Files skipped (> {:.0}s): {}",
        convert_config.max_duration_secs, counters.skipped
    );
    if !counters.failed_files.is_empty() {
        println!("Failed conversions: {}", counters.failed_files.len());
        for name in &counters.failed_files {
            println!("  - {name}");
        }
    }
    println!();
    println!(
        "Filtered files saved in: {}",
        convert_config.kept_dir.display()
    );
    Ok(())
}
