//! Random low-pass filter augmentation stage.

use rand::{SeedableRng, rngs::StdRng};

use wavprep::cli;
use wavprep::config::{self, AugmentStageConfig, ToolsConfig};
use wavprep::logging;
use wavprep::media::MediaTools;
use wavprep::stages::lowpass;

const PROGRAM: &str = "wavprep-lowpass";
const ABOUT: &str = "Applies a low-pass filter with a random 3000-6000 Hz cutoff per manifest row.";

fn main() {
    if let Err(err) = run() {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let Some(args) =
        cli::parse_stage_args(PROGRAM, ABOUT, true, std::env::args().skip(1).collect())?
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
    let mut stage = AugmentStageConfig::lowpass();
    stage.apply(&overrides.lowpass);
    stage.apply(&args.stage);

    let media = MediaTools::new(&tools.ffmpeg, &tools.ffprobe);
    let counters = match args.seed {
        Some(seed) => lowpass::run(&stage, &media, &mut StdRng::seed_from_u64(seed)),
        None => lowpass::run(&stage, &media, &mut rand::rng()),
    }
    .map_err(|err| err.to_string())?;

    cli::print_stage_summary("Low-pass augmentation complete", &counters, &stage);
    Ok(())
}
