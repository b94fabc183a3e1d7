use std::io::{self, BufRead};

use anyhow::Context;
use clap::Parser;
use rand::{rngs::StdRng, SeedableRng};
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use twenty48_rules::engine as GameEngine;
use twenty48_rules::game::{Game, Outcome};
use twenty48_rules::input;
use twenty48_rules::render::{RenderContext, Style};

#[derive(Debug, Parser)]
#[command(
    name = "play",
    about = "Play 2048 in the terminal: type w/a/s/d (or up/left/down/right) and Enter"
)]
struct Args {
    /// Seed for tile spawns; random if omitted
    #[arg(long)]
    seed: Option<u64>,

    /// Plain text output without ANSI colors or cursor control
    #[arg(long)]
    no_color: bool,

    /// Tracing filter for stderr logs, e.g. "info", "twenty48_rules=debug"
    #[arg(long, default_value = "warn")]
    log: String,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(args.log.clone()))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    GameEngine::new();
    let rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    info!(seed = ?args.seed, "starting");

    let stdout = io::stdout();
    let mut screen = RenderContext::new(stdout.lock(), Style { color: !args.no_color });
    screen.begin().context("failed to set up terminal")?;

    let played = play(Game::new(rng), &mut screen);
    // Restore the terminal even when the loop failed.
    screen.finish().context("failed to restore terminal")?;
    played
}

fn play<W: io::Write>(mut game: Game<StdRng>, screen: &mut RenderContext<W>) -> anyhow::Result<()> {
    screen.draw(game.grid(), game.status())?;
    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line.context("failed to read input")?;
        for cmd in input::parse_line(&line) {
            match game.handle(cmd)? {
                Outcome::Quit => return Ok(()),
                Outcome::Ignored => debug!(?cmd, status = ?game.status(), "command ignored"),
                Outcome::Moved | Outcome::Restarted | Outcome::Unchanged => {}
            }
        }
        screen.draw(game.grid(), game.status())?;
    }
    Ok(())
}
