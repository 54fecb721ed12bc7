//! tetris2048: Tetris 2048 in the terminal.

mod app;
mod input;
mod logging;
mod ui;

use anyhow::Result;
use app::App;
use clap::Parser;
use log::{info, warn};
use std::path::PathBuf;
use tetris2048::config::{DEFAULT_COLS, DEFAULT_ROWS, Difficulty, GameConfig};
use tetris2048::profile::{Profile, ProfileStore};
use tetris2048::theme::Theme;

fn main() -> Result<()> {
    let args = Args::parse();
    logging::init(args.log_file.as_deref(), args.verbose)?;

    let store = args
        .profile
        .clone()
        .map_or_else(ProfileStore::from_env, ProfileStore::at);
    let profile = store.load().unwrap_or_else(|e| {
        warn!("ignoring profile {}: {e}", store.path().display());
        Profile::default()
    });
    let theme = Theme::load(args.theme.as_deref()).unwrap_or_else(|e| {
        warn!("ignoring theme: {e}");
        Theme::default()
    });
    let config = GameConfig {
        rows: args.rows.max(MIN_ROWS),
        cols: args.cols.max(MIN_COLS),
        difficulty: args.difficulty.unwrap_or(profile.difficulty),
        seed: args.seed,
    };
    info!("starting with {config:?}");

    let mut app = App::new(&args, config, theme, store, profile);
    app.run()?;
    app.save_profile();
    Ok(())
}

/// Smallest board every tetromino can spawn on.
const MIN_ROWS: usize = 4;
const MIN_COLS: usize = 4;

/// Tetris 2048 in the terminal.
#[derive(Debug, Parser)]
#[command(
    name = "tetris2048",
    version,
    about = "Tetris 2048 in the terminal: tetrominoes of numbered tiles that merge like 2048.",
    long_about = "Tetris 2048 is a falling-block puzzle where every block carries a 2 or a 4.\n\n\
        When a piece lands, equal tiles stacked in a column merge into their sum and the \
        merged value is added to your score. Full rows clear for the sum of their tiles, and \
        clusters left hanging fall until they rest on something.\n\n\
        CONTROLS:\n  Left/Right h/l   Move        Up/k/i   Rotate CW    u        Rotate CCW\n  \
        Down/j           Soft drop   Space/Enter Hard drop  p        Pause\n  \
        r                Restart     q / Esc  Quit\n\n\
        Use --theme to load a btop-style theme (e.g. onedark.theme)."
)]
pub struct Args {
    /// Board height in rows.
    #[arg(long, default_value_t = DEFAULT_ROWS, value_name = "ROWS")]
    pub rows: usize,

    /// Board width in columns.
    #[arg(long, default_value_t = DEFAULT_COLS, value_name = "COLS")]
    pub cols: usize,

    /// Difficulty: easy, medium or hard (gravity speed). Defaults to the profile's choice.
    #[arg(short, long)]
    pub difficulty: Option<Difficulty>,

    /// Seed for the piece sequence; the same seed deals the same pieces.
    #[arg(long, value_name = "N")]
    pub seed: Option<u64>,

    /// Path to theme file (btop-style theme[key]=\"value\"). Uses One Dark if not set.
    #[arg(short, long, value_name = "FILE")]
    pub theme: Option<PathBuf>,

    /// Skip the main menu and start a game immediately.
    #[arg(long)]
    pub no_menu: bool,

    /// Disable the row-clear flash.
    #[arg(long)]
    pub no_animation: bool,

    /// Gravity ticks per second, overriding the difficulty's rate.
    #[arg(long, value_name = "RATE")]
    pub tick_rate: Option<f64>,

    /// Profile file (settings and best score). Defaults to the XDG config directory.
    #[arg(long, value_name = "FILE")]
    pub profile: Option<PathBuf>,

    /// Append logs to this file.
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Log every merge, clear and gravity step.
    #[arg(short, long)]
    pub verbose: bool,
}
