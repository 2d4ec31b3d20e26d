mod diagnostic;
mod error;
mod lexer;
mod model;
mod options;
mod san;
mod split;
mod tags;
mod tree;
mod validator;

#[cfg(test)]
mod tests;

pub use self::diagnostic::{Diagnostic, DiagnosticKind};
pub use self::error::{ErrorKind, Location, PgnError};
pub use self::lexer::{GameResult, Lexer, Spanned, Token};
pub use self::model::{CheckStatus, Game, Line, MoveNode, ResolvedMove};
pub use self::options::{HasStopSignal, ParseOptions, VariationErrorPolicy};
pub use self::san::{parse_san, CastlingSide, SanIntent, SanKind, SanSuffix};
pub use self::split::{split_games, GameSource};
pub use self::tags::{TagPair, TagPairs};
pub use self::tree::MoveTree;

use self::diagnostic::Diagnostics;
use self::validator::Validator;
use crate::game::SimpleGame;

use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use std::sync::atomic::AtomicBool;
use tracing::{debug, warn};

/// Parses the tag section of a game on its own.
pub fn parse_tags(text: &str) -> Result<TagPairs, PgnError> {
    let mut diagnostics = Diagnostics::new(text);
    tags::extract_tags(text, &mut diagnostics).map(|(tags, _)| tags)
}

/// Builds the variation tree of a movetext without checking any move against the board.
pub fn parse_movetext(text: &str, options: &ParseOptions) -> Result<MoveTree, PgnError> {
    let mut diagnostics = Diagnostics::new(text);
    let lexer = Lexer::with_options(text, 0, options, ());
    tree::build_tree(lexer, text, 0, &mut diagnostics)
}

pub fn parse_game(text: &str, options: &ParseOptions) -> Result<Game, PgnError> {
    parse_game_with_signal(text, options, ())
}

/// Parses and validates a single game, checking `signal` between tokens.
pub fn parse_game_with_signal(
    text: &str,
    options: &ParseOptions,
    signal: impl HasStopSignal,
) -> Result<Game, PgnError> {
    let mut diagnostics = Diagnostics::new(text);

    let (tags, movetext_start) = tags::extract_tags(text, &mut diagnostics)?;

    let initial = match tags.get_pair("FEN") {
        Some(fen) => SimpleGame::try_from_fen(&fen.value).map_err(|err| {
            PgnError::new(
                ErrorKind::InvalidFen,
                format!("FEN tag \"{}\": {}", fen.value, err),
                text,
                fen.offset,
            )
        })?,
        None => SimpleGame::new(),
    };

    let mut lexer = Lexer::with_options(text, movetext_start, options, signal);
    let mut tree = tree::build_tree(lexer.by_ref(), text, initial.ply(), &mut diagnostics)?;

    let mut final_position = initial.clone();
    Validator::new(text, options, &mut diagnostics)
        .validate_line(&mut final_position, &mut tree.mainline)?;

    if let (Some(result_tag), Some(result)) = (tags.get_pair("Result"), tree.result) {
        if result_tag.value != result.as_str() {
            diagnostics.record(
                DiagnosticKind::ResultTagMismatch,
                format!(
                    "Result tag says {} but the movetext ends with {}",
                    result_tag.value, result
                ),
                tree.result_offset.unwrap_or(result_tag.offset),
            );
        }
    }

    debug!(
        tags = tags.len(),
        tokens = lexer.token_count(),
        plies = tree.mainline.len(),
        "parsed game"
    );

    Ok(Game {
        tags,
        moves: tree.mainline,
        result: tree.result,
        initial,
        final_position,
        diagnostics: diagnostics.into_vec(),
    })
}

fn parse_sources(
    text: &str,
    sources: &[GameSource],
    options: &ParseOptions,
    stop: &AtomicBool,
) -> Vec<Result<Game, PgnError>> {
    sources
        .par_iter()
        .map(|source| {
            parse_game_with_signal(source.text, options, stop)
                .map(|game| game.rebase(text, source.offset))
                .map_err(|err| err.rebase(text, source.offset))
        })
        .collect()
}

/// Parses every game of a multi-game text in parallel, in input order.
///
/// A failing game does not affect the others. Locations refer to the whole `text`.
pub fn parse_games(text: &str, options: &ParseOptions) -> Vec<Result<Game, PgnError>> {
    parse_games_with_signal(text, options, &AtomicBool::new(false))
}

/// Like [`parse_games`], cancelling every game still being lexed once `stop` is set.
pub fn parse_games_with_signal(
    text: &str,
    options: &ParseOptions,
    stop: &AtomicBool,
) -> Vec<Result<Game, PgnError>> {
    let sources = split_games(text);
    debug!(games = sources.len(), "parsing games");

    let Some(threads) = options.threads else {
        return parse_sources(text, &sources, options, stop);
    };

    match ThreadPoolBuilder::new().num_threads(threads).build() {
        Ok(pool) => pool.install(|| parse_sources(text, &sources, options, stop)),
        Err(err) => {
            warn!("Failed to build a pool of {} threads: {}", threads, err);
            parse_sources(text, &sources, options, stop)
        }
    }
}
