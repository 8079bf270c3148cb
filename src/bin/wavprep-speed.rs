//! Fixed 2x speed augmentation stage.

use wavprep::cli;
use wavprep::config::{self, AugmentStageConfig, ToolsConfig};
use wavprep::logging;
use wavprep::media::MediaTools;
use wavprep::stages::speed;

const PROGRAM: &str = "wavprep-speed";
const ABOUT: &str = "Transcodes each manifest row at double tempo.";

fn main() {
    if let Err(err) = run() {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let Some(args) =
        cli::parse_stage_args(PROGRAM, ABOUT, false, std::env::args().skip(1).collect())?
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
    let mut stage = AugmentStageConfig::speed();
    stage.apply(&overrides.speed);
    stage.apply(&args.stage);

    let media = MediaTools::new(&tools.ffmpeg, &tools.ffprobe);
    let counters = speed::run(&stage, &media).map_err(|err| err.to_string())?;

    cli::print_stage_summary("Speed augmentation complete", &counters, &stage);
    Ok(())
}
