//! Ladder Snake: snake in the terminal, with ladders up an endless tower of floors.

mod app;
mod direction;
mod floors;
mod game;
mod highscores;
mod input;
mod settings;
mod storage;
mod telemetry;
mod theme;
mod ui;

use anyhow::Result;
use app::App;
use clap::{Parser, ValueEnum};
use env_logger::{Env, Target};
use floors::{CommandNameSource, DEFAULT_NAMER_TIMEOUT, FloorNamer};
use settings::{Settings, SpeedTier};
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::time::Duration;
use storage::Store;
use telemetry::{JsonlTelemetry, LogTelemetry, Tracker};

const LOG_FILE: &str = "ladder-snake.log";

/// Options derived from CLI that shape each session.
#[derive(Debug, Clone)]
pub struct GameConfig {
    pub grid_size: u16,
    pub seed: Option<u64>,
    pub no_menu: bool,
    /// Speed for this run only; never saved.
    pub speed: Option<SpeedTier>,
    /// Threshold for this run only (already through `cli_threshold`); never saved.
    pub ladder_threshold: Option<u32>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config_dir = args
        .config_dir
        .clone()
        .unwrap_or_else(storage::default_config_dir);
    init_logging(&config_dir);
    log::info!("ladder-snake {} starting", env!("CARGO_PKG_VERSION"));

    let store = Store::new(&config_dir);
    let settings = Settings::load(&store);

    let theme = theme::Theme::load(args.theme.as_deref(), args.palette).unwrap_or_else(|e| {
        log::warn!("theme not loaded: {}", e);
        let mut theme = theme::Theme::default();
        theme.apply_palette(args.palette);
        theme
    });

    let mut tracker = Tracker::new().with_sink(LogTelemetry);
    if let Some(path) = &args.events_file {
        match JsonlTelemetry::open(path) {
            Ok(sink) => tracker = tracker.with_sink(sink),
            Err(e) => log::warn!("events file {} not opened: {}", path.display(), e),
        }
    }

    let namer = args.namer_cmd.as_deref().and_then(|cmd| {
        let timeout = Duration::from_millis(args.namer_timeout_ms);
        let source = CommandNameSource::from_command_line(cmd, timeout)?;
        match FloorNamer::new(source) {
            Ok(namer) => Some(namer),
            Err(e) => {
                log::warn!("floor namer unavailable: {}", e);
                None
            }
        }
    });

    let config = GameConfig {
        grid_size: args.grid_size,
        seed: args.seed,
        no_menu: args.no_menu,
        speed: args.speed,
        ladder_threshold: args.ladder_threshold.map(settings::cli_threshold),
    };
    let mut app = App::new(config, theme, store, settings, tracker, namer);
    app.run()?;
    log::info!("bye");
    Ok(())
}

/// Log to a file in the config dir; stdout belongs to the TUI. Failure only disables logging.
fn init_logging(dir: &Path) {
    let path = dir.join(LOG_FILE);
    let file = std::fs::create_dir_all(dir)
        .and_then(|()| OpenOptions::new().create(true).append(true).open(&path));
    match file {
        Ok(file) => {
            env_logger::Builder::from_env(Env::default().default_filter_or("info"))
                .target(Target::Pipe(Box::new(file)))
                .init();
        }
        Err(e) => eprintln!("ladder-snake: logging disabled ({}: {})", path.display(), e),
    }
}

/// Snake in the terminal with ladders between floors.
#[derive(Debug, Parser)]
#[command(
    name = "ladder-snake",
    version,
    about = "Snake in the terminal. Score points to spawn ladders and climb an endless tower of floors.",
    long_about = "Ladder Snake is classic snake with a twist: every N points a ladder appears. \
        Steer into it to climb to a fresh floor with its own colours (and, with --namer-cmd, its own name).\n\n\
        Touching a wall is forgiven for half a second: turn away before the border stops pulsing.\n\n\
        CONTROLS:\n  Arrows / hjkl / wasd  Steer\n  Space / P             Pause\n  Q / Esc               Quit menu\n\n\
        Use --theme to load a btop-style theme (e.g. onedark.theme)."
)]
pub struct Args {
    /// Snake speed (overrides the saved setting for this run).
    #[arg(short, long, value_name = "TIER")]
    pub speed: Option<SpeedTier>,

    /// Points between ladders (min 20; 0 disables ladders). Overrides the saved setting for this run.
    #[arg(short, long, value_name = "POINTS")]
    pub ladder_threshold: Option<u32>,

    /// Board size in cells (square). Shrunk to fit the terminal.
    #[arg(short, long, default_value_t = game::DEFAULT_GRID_SIZE, value_name = "CELLS")]
    pub grid_size: u16,

    /// Seed food and ladder placement for a reproducible run.
    #[arg(long, value_name = "N")]
    pub seed: Option<u64>,

    /// Path to theme file (btop-style theme[key]=\"value\"). Uses One Dark if not set.
    #[arg(short, long, value_name = "FILE")]
    pub theme: Option<PathBuf>,

    /// Colour palette: normal (theme), high-contrast, or colorblind.
    #[arg(long, default_value = "normal")]
    pub palette: Palette,

    /// Command that names new floors: reads a prompt on stdin, prints a name on stdout.
    #[arg(long, value_name = "CMD")]
    pub namer_cmd: Option<String>,

    /// Give up on a floor name after this long.
    #[arg(long, default_value_t = DEFAULT_NAMER_TIMEOUT.as_millis() as u64, value_name = "MS")]
    pub namer_timeout_ms: u64,

    /// Append gameplay events as JSON lines to this file.
    #[arg(long, value_name = "FILE")]
    pub events_file: Option<PathBuf>,

    /// Where settings, high score and the log live. Defaults to $XDG_CONFIG_HOME/ladder-snake.
    #[arg(long, value_name = "DIR")]
    pub config_dir: Option<PathBuf>,

    /// Skip the start screen and play immediately.
    #[arg(long)]
    pub no_menu: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Palette {
    #[default]
    Normal,

    #[value(alias = "highcontrast", alias = "contrast")]
    HighContrast,

    #[value(alias = "colourblind")]
    Colorblind,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_cli_defaults() {
        let args = Args::try_parse_from(["ladder-snake"]).unwrap();
        assert_eq!(args.grid_size, game::DEFAULT_GRID_SIZE);
        assert_eq!(args.namer_timeout_ms, 10_000);
        assert!(args.speed.is_none());
        assert!(args.ladder_threshold.is_none());
        assert_eq!(args.palette, Palette::Normal);
    }

    #[test]
    fn test_cli_overrides() {
        let args = Args::try_parse_from([
            "ladder-snake",
            "--speed",
            "impossible",
            "--ladder-threshold",
            "0",
            "--seed",
            "42",
            "--palette",
            "colourblind",
            "--no-menu",
        ])
        .unwrap();
        assert_eq!(args.speed, Some(SpeedTier::Impossible));
        assert_eq!(args.ladder_threshold, Some(0));
        assert_eq!(args.seed, Some(42));
        assert_eq!(args.palette, Palette::Colorblind);
        assert!(args.no_menu);
    }
}
