use chusst_pgn::pgn::{parse_games, Game, ParseOptions, PgnError};

use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing::debug;

pub fn read_options(config_path: &PathBuf) -> Result<ParseOptions> {
    let file = std::fs::File::open(config_path).context(format!(
        "Could not open configuration file {}",
        config_path.to_string_lossy()
    ))?;

    serde_yaml::from_reader(file).context(format!(
        "Invalid configuration in {}",
        config_path.to_string_lossy()
    ))
}

pub fn read_games(
    pgn_file_path: &PathBuf,
    options: &ParseOptions,
) -> Result<Vec<Result<Game, PgnError>>> {
    let text = std::fs::read_to_string(pgn_file_path).context(format!(
        "Could not read {}",
        pgn_file_path.to_string_lossy()
    ))?;

    let games = parse_games(&text, options);
    debug!(
        games = games.len(),
        path = %pgn_file_path.to_string_lossy(),
        "read PGN file"
    );

    Ok(games)
}
