//! # Flatcraft Headless Runner
//!
//! Generates a map, puts a player and a few mobs on it, plays a short
//! scripted session and prints the final state as JSON.

use clap::Parser;
use flatcraft::{
    Direction, FlatcraftError, FlatcraftGame, FlatcraftResult, GameSession, GenerationConfig,
    LoggingView, SessionHandle,
};
use log::{info, warn};
use std::path::PathBuf;

/// Command line arguments for the Flatcraft runner.
#[derive(Parser, Debug)]
#[command(name = "flatcraft")]
#[command(about = "Headless runner for the Flatcraft sandbox game model")]
#[command(version)]
struct Args {
    /// JSON generation configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Random seed for map generation and mob movement
    #[arg(short, long)]
    seed: Option<u64>,

    /// Number of rows of the map
    #[arg(long)]
    height: Option<i32>,

    /// Number of columns of the map
    #[arg(long)]
    width: Option<i32>,

    /// Number of trees to plant
    #[arg(long)]
    trees: Option<u32>,

    /// Number of slag heaps to pile
    #[arg(long)]
    slag_heaps: Option<u32>,

    /// Number of mobs dropped in the sky
    #[arg(long, default_value_t = 2)]
    mobs: u32,

    /// Number of mob ticks to run
    #[arg(long, default_value_t = 10)]
    ticks: u32,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> FlatcraftResult<()> {
    let args = Args::parse();

    // Initialize logging
    initialize_logging(&args.log_level);

    info!("Starting Flatcraft v{}", flatcraft::VERSION);

    let config = load_config(&args)?;
    let mut game = FlatcraftGame::new(config);
    game.set_view(Box::new(LoggingView));
    game.prepare()?;
    spawn_mobs(&mut game, args.mobs)?;

    let (handle, task) = GameSession::spawn(game);
    let outcome = play(&handle, args.ticks);
    #[cfg(feature = "dev-tools")]
    let outcome = {
        use tracing::Instrument;
        outcome.instrument(tracing::info_span!("play", ticks = args.ticks))
    };
    let outcome = outcome.await;
    handle.shutdown().await?;
    task.await
        .map_err(|error| FlatcraftError::InvalidState(format!("session task failed: {}", error)))?;

    let snapshot = outcome?;
    println!("{}", serde_json::to_string_pretty(&snapshot)?);
    Ok(())
}

/// Initializes the logging system based on the specified log level.
fn initialize_logging(log_level: &str) {
    #[cfg(feature = "dev-tools")]
    {
        use tracing_subscriber::EnvFilter;

        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::new(log_level))
            .with_target(false)
            .init();
    }

    #[cfg(not(feature = "dev-tools"))]
    {
        env_logger::Builder::new()
            .parse_filters(log_level)
            .parse_default_env()
            .init();
    }
}

/// Builds the generation configuration from the file and flags.
///
/// Flags override the file, which overrides the defaults.
fn load_config(args: &Args) -> FlatcraftResult<GenerationConfig> {
    let mut config = match &args.config {
        Some(path) => {
            info!("Loading configuration from {}", path.display());
            GenerationConfig::from_json_file(path)?
        }
        None => GenerationConfig::default(),
    };

    if let Some(height) = args.height {
        config.height = height;
    }
    if let Some(width) = args.width {
        config.width = width;
    }
    if let Some(trees) = args.trees {
        config.tree_count = trees;
    }
    if let Some(slag_heaps) = args.slag_heaps {
        config.slag_heap_count = slag_heaps;
    }
    if args.seed.is_some() {
        config.seed = args.seed;
    }

    config.validate()?;
    Ok(config)
}

/// Drops animated mobs on the top row, spread evenly across the map.
fn spawn_mobs(game: &mut FlatcraftGame, count: u32) -> FlatcraftResult<()> {
    let width = game.width();
    for index in 0..count {
        let column = ((index as i64 + 1) * width as i64 / (count as i64 + 1)) as i32;
        let mob_id = game.spawn_mob(0, column, index + 1)?;
        game.animate_mob(mob_id)?;
    }
    Ok(())
}

/// Digs around the player, then lets the mobs roam.
async fn play(handle: &SessionHandle, ticks: u32) -> FlatcraftResult<flatcraft::GameSnapshot> {
    for direction in [Direction::Down, Direction::Left, Direction::Right, Direction::Down] {
        let collected = handle.dig(direction).await?;
        info!("Dig {:?}: collected {}", direction, collected);
    }
    if !handle.move_left().await? {
        warn!("Player is stuck on the left edge");
    }

    for _ in 0..ticks {
        handle.tick().await?;
    }
    handle.snapshot().await
}
