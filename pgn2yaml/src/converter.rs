mod interpreter;
mod serializer;

use self::interpreter::{game_to_long_algebraic, DetailedEntry};
use self::serializer::write_yaml;
use chusst_pgn::pgn::{Game, PgnError};

use anyhow::Result;
use std::path::PathBuf;

pub fn write_games(games: &[Result<Game, PgnError>], path: &PathBuf) -> Result<()> {
    let entries: Vec<DetailedEntry> = games
        .iter()
        .map(|game| match game {
            Ok(game) => DetailedEntry::Game(game_to_long_algebraic(game)),
            Err(err) => DetailedEntry::Failed(err),
        })
        .collect();

    write_yaml(path, &entries)
}
