//! Random volume gain augmentation stage.

use rand::{SeedableRng, rngs::StdRng};

use wavprep::cli;
use wavprep::config::{self, AugmentStageConfig, ToolsConfig};
use wavprep::logging;
use wavprep::media::MediaTools;
use wavprep::stages::volume;

const PROGRAM: &str = "wavprep-volume";
const ABOUT: &str = "Applies a random volume gain in [-3.00, +3.00] dB to each manifest row.";

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
    let mut stage = AugmentStageConfig::volume();
    stage.apply(&overrides.volume);
    stage.apply(&args.stage);

    let media = MediaTools::new(&tools.ffmpeg, &tools.ffprobe);
    let counters = match args.seed {
        Some(seed) => volume::run(&stage, &media, &mut StdRng::seed_from_u64(seed)),
        None => volume::run(&stage, &media, &mut rand::rng()),
    }
    .map_err(|err| err.to_string())?;

    cli::print_stage_summary("Volume augmentation complete", &counters, &stage);
    Ok(())
}
