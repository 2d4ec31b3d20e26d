use super::diagnostic::Diagnostic;
use super::lexer::GameResult;
use super::san::{CastlingSide, SanSuffix};
use super::tags::TagPairs;
use crate::board::{PieceType, Position};
use crate::game::{PromotionPieces, SimpleGame};

use serde::ser::SerializeMap;
use serde::Serialize;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
pub enum CheckStatus {
    None,
    Check,
    Checkmate,
}

impl From<Option<SanSuffix>> for CheckStatus {
    fn from(value: Option<SanSuffix>) -> Self {
        match value {
            None => CheckStatus::None,
            Some(SanSuffix::Check) => CheckStatus::Check,
            Some(SanSuffix::Checkmate) => CheckStatus::Checkmate,
        }
    }
}

/// A SAN token matched against the position it was played in.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct ResolvedMove {
    pub source: Position,
    pub target: Position,
    pub piece: PieceType,
    pub capture: bool,
    pub captured: Option<PieceType>,
    pub promotion: Option<PromotionPieces>,
    pub check: CheckStatus,
    pub castle: Option<CastlingSide>,
    pub en_passant: bool,
    /// The move as the engine would write it.
    pub canonical_san: String,
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct MoveNode {
    /// SAN text as written in the input.
    pub san: String,
    pub offset: usize,
    pub resolved: Option<ResolvedMove>,
    /// Alternatives to this move, each starting from the position before it.
    pub variations: Vec<Line>,
    pub comments_before: Vec<String>,
    pub comments_after: Vec<String>,
    pub nags: Vec<u32>,
}

impl MoveNode {
    pub fn new(san: &str, offset: usize) -> Self {
        MoveNode {
            san: san.to_string(),
            offset,
            ..Default::default()
        }
    }

    fn rebase(&mut self, base: usize) {
        self.offset += base;
        for variation in &mut self.variations {
            variation.rebase(base);
        }
    }
}

/// A sequence of consecutive moves: the mainline or one variation.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct Line {
    pub moves: Vec<MoveNode>,
    /// Comments not attached to any move, as in a line without moves.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub comments: Vec<String>,
}

impl Line {
    pub fn len(&self) -> usize {
        self.moves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    /// Whether every move of this line and its variations has been resolved.
    pub fn is_resolved(&self) -> bool {
        self.moves.iter().all(|node| {
            node.resolved.is_some() && node.variations.iter().all(Line::is_resolved)
        })
    }

    fn rebase(&mut self, base: usize) {
        for node in &mut self.moves {
            node.rebase(base);
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Game {
    pub tags: TagPairs,
    pub moves: Line,
    pub result: Option<GameResult>,
    pub initial: SimpleGame,
    pub final_position: SimpleGame,
    pub diagnostics: Vec<Diagnostic>,
}

impl Game {
    pub fn plies(&self) -> usize {
        self.moves.len()
    }

    /// Number of move numbers the mainline spans.
    pub fn full_moves(&self) -> u32 {
        if self.moves.is_empty() {
            return 0;
        }
        let first = self.initial.ply();
        let last = first + self.moves.len() as u32 - 1;
        last / 2 - first / 2 + 1
    }

    pub fn mainline_san(&self) -> Vec<&str> {
        self.moves.moves.iter().map(|node| node.san.as_str()).collect()
    }

    pub fn final_fen(&self) -> String {
        self.final_position.to_fen()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub(crate) fn rebase(mut self, full_text: &str, base: usize) -> Self {
        self.tags.rebase(base);
        self.moves.rebase(base);
        for diagnostic in &mut self.diagnostics {
            diagnostic.location = diagnostic.location.rebase(full_text, base);
        }
        self
    }
}

impl Serialize for MoveNode {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut map = serializer.serialize_map(None)?;

        map.serialize_entry("san", &self.san)?;
        if let Some(resolved) = &self.resolved {
            map.serialize_entry("move", resolved)?;
        }
        if !self.nags.is_empty() {
            map.serialize_entry("nags", &self.nags)?;
        }
        if !self.comments_before.is_empty() {
            map.serialize_entry("comments_before", &self.comments_before)?;
        }
        if !self.comments_after.is_empty() {
            map.serialize_entry("comments_after", &self.comments_after)?;
        }
        if !self.variations.is_empty() {
            map.serialize_entry("variations", &self.variations)?;
        }

        map.end()
    }
}

impl Serialize for Game {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut map = serializer.serialize_map(Some(6))?;

        map.serialize_entry("tags", &self.tags)?;
        map.serialize_entry("result", &self.result.map(|result| result.as_str()))?;
        map.serialize_entry("initial_position", &self.initial)?;
        map.serialize_entry("moves", &self.moves)?;
        map.serialize_entry("final_position", &self.final_position)?;
        map.serialize_entry("diagnostics", &self.diagnostics)?;

        map.end()
    }
}
