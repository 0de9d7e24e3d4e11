//! LEDTRIS - falling blocks for a chain of 8x8 LED matrix modules
//!
//! The engine in `game` is pure state; this binary is the thin shell around
//! it: parse the module count, set up logging and the terminal, then run the
//! poll-input / tick / render loop until the game ends and print the score.

mod board;
mod display;
mod game;
mod input;
mod piece;
mod shape;

use std::io::stdout;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::cursor::{Hide, Show};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};

use board::MODULE_HEIGHT;
use display::{DisplaySink, TerminalDisplay};
use game::{Game, GameStatus};
use input::{InputSource, Keyboard};

/// Normal tick cadence
const TICK_INTERVAL: Duration = Duration::from_millis(160);
/// Tick cadence while the fast-drop flag is set
const FAST_DROP_INTERVAL: Duration = Duration::from_millis(10);

#[derive(Debug, Parser)]
#[command(name = "ledtris")]
#[command(about = "Falling blocks on a vertical chain of 8x8 LED modules")]
struct Cli {
    /// Number of display modules in the chain (board height is 8 per module)
    #[arg(value_parser = clap::value_parser!(u16).range(1..))]
    modules: u16,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // The terminal belongs to the renderer, so logs go to a file
    let log_dir = std::env::temp_dir().join("ledtris");
    std::fs::create_dir_all(&log_dir)
        .with_context(|| format!("could not create log dir {}", log_dir.display()))?;
    let file_appender = tracing_appender::rolling::never(&log_dir, "ledtris.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("ledtris=debug".parse().unwrap()),
        )
        .with_ansi(false)
        .init();

    // u16 modules keep the height multiply far below usize overflow
    let mut game = Game::new(MODULE_HEIGHT * cli.modules as usize)?;
    tracing::info!(modules = cli.modules, height = game.board.height(), "starting");

    enable_raw_mode().context("failed to enable raw mode")?;
    execute!(stdout(), EnterAlternateScreen, Hide)?;

    let result = run(&mut game);

    execute!(stdout(), LeaveAlternateScreen, Show)?;
    disable_raw_mode()?;
    result?;

    // The final score is the process's one observable output
    println!("{}", game.score);
    Ok(())
}

fn run(game: &mut Game) -> Result<()> {
    let mut keyboard = Keyboard::new();
    let mut display = TerminalDisplay::new(stdout());

    while game.status == GameStatus::InPlay && !keyboard.quit_requested() {
        for action in keyboard.poll()? {
            game.apply(action);
        }
        game.tick();
        display.refresh(&game.board)?;
        thread::sleep(if game.fast_drop() {
            FAST_DROP_INTERVAL
        } else {
            TICK_INTERVAL
        });
    }
    tracing::info!(score = game.score, "game over");
    Ok(())
}
