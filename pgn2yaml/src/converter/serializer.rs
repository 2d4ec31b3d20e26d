use crate::converter::interpreter::{
    DetailedEntry, DetailedGame, DetailedMove, DetailedMoveInfo, GameEnding, MoveType,
};
use chusst_pgn::game::PromotionPieces;
use chusst_pgn::pgn::{CheckStatus, PgnError};

use anyhow::{Context, Result};
use serde::ser::SerializeMap;
use serde::Serialize;
use std::path::PathBuf;

fn promotion_name(piece: &PromotionPieces) -> &'static str {
    match piece {
        PromotionPieces::Knight => "knight",
        PromotionPieces::Bishop => "bishop",
        PromotionPieces::Rook => "rook",
        PromotionPieces::Queen => "queen",
    }
}

impl Serialize for DetailedMoveInfo {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut map = serializer.serialize_map(None)?;

        map.serialize_entry("short", &self.short)?;
        map.serialize_entry("long", &self.long)?;
        match &self.move_type {
            MoveType::Normal => (),
            MoveType::Promotion(piece) => map.serialize_entry(
                "type",
                &format!("promotion to {}", promotion_name(piece)),
            )?,
            MoveType::PromotionWithCapture(piece) => map.serialize_entry(
                "type",
                &format!("promotion to {} with capture", promotion_name(piece)),
            )?,
            other => map.serialize_entry(
                "type",
                match other {
                    MoveType::Capture => "capture",
                    MoveType::PassingPawn => "passing pawn",
                    MoveType::EnPassant => "en passant",
                    MoveType::KingsideCastling => "kingside castling",
                    _ => "queenside castling",
                },
            )?,
        }

        match self.check_type {
            CheckStatus::None => (),
            CheckStatus::Check => map.serialize_entry("check", "check")?,
            CheckStatus::Checkmate => map.serialize_entry("check", "checkmate")?,
        }

        if !self.comments.is_empty() {
            map.serialize_entry("comments", &self.comments)?;
        }
        if self.variations > 0 {
            map.serialize_entry("variations", &self.variations)?;
        }

        map.end()
    }
}

impl Serialize for DetailedMove {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut map = serializer.serialize_map(None)?;

        if let Some(white) = &self.white {
            map.serialize_entry("white", white)?;
        }
        if let Some(black) = &self.black {
            map.serialize_entry("black", black)?;
        }

        map.end()
    }
}

struct SerializedMoveList<'a>(&'a Vec<(u32, DetailedMove)>);

impl<'a> Serialize for SerializedMoveList<'a> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;

        for (number, mv) in self.0 {
            map.serialize_entry(number, mv)?;
        }

        map.end()
    }
}

struct SerializedGameEnding(GameEnding);

impl Serialize for SerializedGameEnding {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut map = serializer.serialize_map(Some(2))?;

        let (result_str, reason_str) = match self.0 {
            GameEnding::Draw => ("1/2-1/2", "draw"),
            GameEnding::Stalemate => ("1/2-1/2", "stalemate"),
            GameEnding::WhiteWinsCheckmate => ("1-0", "checkmate"),
            GameEnding::BlackWinsCheckmate => ("0-1", "checkmate"),
            GameEnding::WhiteResigned => ("0-1", "resignation"),
            GameEnding::BlackResigned => ("1-0", "resignation"),
            GameEnding::Unfinished => ("*", "unfinished"),
        };
        map.serialize_entry("result", result_str)?;
        map.serialize_entry("reason", reason_str)?;

        map.end()
    }
}

impl<'a> Serialize for DetailedGame<'a> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut map = serializer.serialize_map(None)?;

        map.serialize_entry("tags", self.tags)?;
        map.serialize_entry("ending", &SerializedGameEnding(self.ending))?;
        map.serialize_entry("moves", &SerializedMoveList(&self.moves))?;
        if !self.diagnostics.is_empty() {
            let warnings: Vec<String> = self
                .diagnostics
                .iter()
                .map(|diagnostic| diagnostic.to_string())
                .collect();
            map.serialize_entry("warnings", &warnings)?;
        }

        map.end()
    }
}

struct SerializedError<'a>(&'a PgnError);

impl<'a> Serialize for SerializedError<'a> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut map = serializer.serialize_map(Some(4))?;

        map.serialize_entry("kind", &self.0.kind.to_string())?;
        map.serialize_entry("message", &self.0.message)?;
        map.serialize_entry("line", &self.0.location.line)?;
        map.serialize_entry("column", &self.0.location.column)?;

        map.end()
    }
}

impl<'a> Serialize for DetailedEntry<'a> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            DetailedEntry::Game(game) => game.serialize(serializer),
            DetailedEntry::Failed(err) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("error", &SerializedError(*err))?;
                map.end()
            }
        }
    }
}

pub fn write_yaml(yaml_path: &PathBuf, entries: &[DetailedEntry]) -> Result<()> {
    let output = std::fs::File::create(yaml_path).context(format!(
        "Could not open file {} for writing",
        yaml_path.to_string_lossy()
    ))?;

    serde_yaml::to_writer(output, entries).context(format!(
        "Error writing YAML data to {}",
        yaml_path.to_string_lossy()
    ))
}

#[cfg(test)]
mod tests {
    use crate::converter::interpreter::{game_to_long_algebraic, DetailedEntry};
    use chusst_pgn::pgn::{parse_games, ParseOptions};

    #[test]
    fn yaml_document() {
        let text = "[White \"A\"]\n\n1. e4 {king pawn} e5 (1... c5) 2. Qh5 Ke7 3. Qxe5# 1-0\n\n\
                    [White \"B\"]\n\n1. e4 e5 2. Ke3 *\n";
        let games = parse_games(text, &ParseOptions::default());
        let entries: Vec<DetailedEntry> = games
            .iter()
            .map(|game| match game {
                Ok(game) => DetailedEntry::Game(game_to_long_algebraic(game)),
                Err(err) => DetailedEntry::Failed(err),
            })
            .collect();

        let yaml = serde_yaml::to_string(&entries).unwrap();
        let value: serde_yaml::Value = serde_yaml::from_str(&yaml).unwrap();

        let first = &value[0];
        assert_eq!(first["tags"]["White"].as_str(), Some("A"));
        assert_eq!(first["ending"]["result"].as_str(), Some("1-0"));
        assert_eq!(first["ending"]["reason"].as_str(), Some("checkmate"));
        assert_eq!(first["moves"][1]["white"]["long"].as_str(), Some("e2-e4"));
        assert_eq!(first["moves"][1]["white"]["type"].as_str(), Some("passing pawn"));
        assert_eq!(first["moves"][1]["white"]["comments"][0].as_str(), Some("king pawn"));
        assert_eq!(first["moves"][1]["black"]["variations"].as_u64(), Some(1));
        assert_eq!(first["moves"][3]["white"]["check"].as_str(), Some("checkmate"));

        let second = &value[1];
        assert_eq!(second["error"]["kind"].as_str(), Some("IllegalMoveError"));
        assert_eq!(second["error"]["line"].as_u64(), Some(7));
    }
}
