mod converter;
mod reader;

use chusst_pgn::pgn::VariationErrorPolicy;

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// PGN file, possibly holding several games
    file: String,

    /// Path of the YAML file (if not specified, same as the PGN file with the extension changed)
    #[arg(short, long)]
    output: Option<String>,

    /// YAML file with parsing options
    #[arg(short, long)]
    config: Option<String>,

    /// Do not validate the moves inside variations
    #[arg(long)]
    skip_variations: bool,

    /// Fail the whole game when a variation holds an invalid move
    #[arg(long)]
    strict_variations: bool,

    /// Stop parsing a game after this many tokens
    #[arg(long)]
    max_tokens: Option<usize>,

    /// Stop parsing a game after this many milliseconds
    #[arg(long)]
    time_limit: Option<u64>,

    /// Number of worker threads
    #[arg(short = 'j', long)]
    threads: Option<usize>,

    /// Log every move rejection and each parsed game
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| default_level.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut options = match &cli.config {
        Some(config) => reader::read_options(&PathBuf::from(config))?,
        None => Default::default(),
    };
    if cli.skip_variations {
        options.validate_variations = false;
    }
    if cli.strict_variations {
        options.variation_errors = VariationErrorPolicy::AbortGame;
    }
    options.max_tokens = cli.max_tokens.or(options.max_tokens);
    options.time_limit_ms = cli.time_limit.or(options.time_limit_ms);
    options.threads = cli.threads.or(options.threads);

    let pgn_path = PathBuf::from(cli.file);

    let games = reader::read_games(&pgn_path, &options).context("Unable to parse PGN file")?;

    let failed = games.iter().filter(|game| game.is_err()).count();
    for err in games.iter().filter_map(|game| game.as_ref().err()) {
        error!("{}", err);
    }

    let yaml_path = cli.output.map_or(
        {
            let mut path = pgn_path;
            path.set_extension("yaml");
            path
        },
        PathBuf::from,
    );
    info!("Writing YAML file to {}", yaml_path.to_string_lossy());
    converter::write_games(&games, &yaml_path)?;

    println!(
        "{} games converted, {} failed, written to {}",
        games.len() - failed,
        failed,
        yaml_path.to_string_lossy()
    );

    Ok(())
}
