mod fen;
mod play;

pub use self::fen::FenError;
pub use self::play::ModifiableGame;

use crate::board::{Board, ModifiableBoard, Piece, PieceType, Player, Position, SimpleBoard};

use serde::Serialize;
use std::fmt;

#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq, Serialize)]
pub struct Move {
    pub source: Position,
    pub target: Position,
}

#[derive(Debug, Copy, Clone, Eq, Hash, PartialEq, Serialize)]
pub enum PromotionPieces {
    Knight,
    Bishop,
    Rook,
    Queen,
}

impl PromotionPieces {
    pub const ALL: [PromotionPieces; 4] = [
        PromotionPieces::Knight,
        PromotionPieces::Bishop,
        PromotionPieces::Rook,
        PromotionPieces::Queen,
    ];

    pub fn try_from_char(value: char) -> Option<Self> {
        match value.to_ascii_lowercase() {
            'n' => Some(PromotionPieces::Knight),
            'b' => Some(PromotionPieces::Bishop),
            'r' => Some(PromotionPieces::Rook),
            'q' => Some(PromotionPieces::Queen),
            _ => None,
        }
    }
}

impl From<PromotionPieces> for PieceType {
    fn from(value: PromotionPieces) -> Self {
        match value {
            PromotionPieces::Knight => PieceType::Knight,
            PromotionPieces::Bishop => PieceType::Bishop,
            PromotionPieces::Rook => PieceType::Rook,
            PromotionPieces::Queen => PieceType::Queen,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq, Serialize)]
pub enum MoveActionType {
    Normal,
    Promotion(PromotionPieces),
}

#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq, Serialize)]
pub struct MoveAction {
    pub mv: Move,
    pub move_type: MoveActionType,
}

impl MoveAction {
    pub fn promotion(&self) -> Option<PromotionPieces> {
        match self.move_type {
            MoveActionType::Normal => None,
            MoveActionType::Promotion(piece) => Some(piece),
        }
    }
}

#[macro_export]
macro_rules! mv {
    ($src:expr, $tgt:expr) => {
        $crate::game::Move {
            source: $src,
            target: $tgt,
        }
    };
}

#[macro_export]
macro_rules! mva {
    ($src:expr, $tgt:expr) => {
        $crate::game::MoveAction {
            mv: $crate::game::Move {
                source: $src,
                target: $tgt,
            },
            move_type: $crate::game::MoveActionType::Normal,
        }
    };
    ($src:expr, $tgt:expr, $promoted:expr) => {
        $crate::game::MoveAction {
            mv: $crate::game::Move {
                source: $src,
                target: $tgt,
            },
            move_type: $crate::game::MoveActionType::Promotion($promoted),
        }
    };
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} -> {}", self.source, self.target)
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
pub enum MoveExtraInfo {
    Other,
    Promotion(PromotionPieces),
    Passed,
    EnPassant,
    CastleKingside,
    CastleQueenside,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct MoveInfo {
    pub mv: Move,
    pub info: MoveExtraInfo,
    pub captured: Option<PieceType>,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
pub struct GameInfo {
    white_kingside_castling_allowed: bool,
    white_queenside_castling_allowed: bool,
    black_kingside_castling_allowed: bool,
    black_queenside_castling_allowed: bool,
}

impl GameInfo {
    pub const fn new() -> GameInfo {
        Self {
            white_kingside_castling_allowed: true,
            white_queenside_castling_allowed: true,
            black_kingside_castling_allowed: true,
            black_queenside_castling_allowed: true,
        }
    }

    pub const fn none() -> GameInfo {
        Self {
            white_kingside_castling_allowed: false,
            white_queenside_castling_allowed: false,
            black_kingside_castling_allowed: false,
            black_queenside_castling_allowed: false,
        }
    }

    pub fn can_castle_kingside(&self, player: &Player) -> bool {
        match player {
            Player::White => self.white_kingside_castling_allowed,
            Player::Black => self.black_kingside_castling_allowed,
        }
    }

    pub fn can_castle_queenside(&self, player: &Player) -> bool {
        match player {
            Player::White => self.white_queenside_castling_allowed,
            Player::Black => self.black_queenside_castling_allowed,
        }
    }

    pub fn disable_castle_kingside(&mut self, player: &Player) {
        match player {
            Player::White => self.white_kingside_castling_allowed = false,
            Player::Black => self.black_kingside_castling_allowed = false,
        }
    }

    pub fn disable_castle_queenside(&mut self, player: &Player) {
        match player {
            Player::White => self.white_queenside_castling_allowed = false,
            Player::Black => self.black_queenside_castling_allowed = false,
        }
    }
}

impl fmt::Display for GameInfo {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut rights = String::new();
        if self.white_kingside_castling_allowed {
            rights.push('K');
        }
        if self.white_queenside_castling_allowed {
            rights.push('Q');
        }
        if self.black_kingside_castling_allowed {
            rights.push('k');
        }
        if self.black_queenside_castling_allowed {
            rights.push('q');
        }
        if rights.is_empty() {
            rights.push('-');
        }
        write!(f, "{}", rights)
    }
}

impl Default for GameInfo {
    fn default() -> Self {
        GameInfo::new()
    }
}

/// Full position: piece placement plus everything a FEN string carries.
#[derive(Clone, Debug, PartialEq)]
pub struct GameState<B: Board> {
    pub(crate) board: B,
    pub(crate) player: Player,
    pub(crate) info: GameInfo,
    pub(crate) en_passant: Option<Position>,
    pub(crate) halfmove_clock: u32,
    pub(crate) fullmove_number: u32,
}

impl<B: Board> From<B> for GameState<B> {
    fn from(value: B) -> Self {
        GameState {
            board: value,
            player: Player::White,
            en_passant: None,
            info: GameInfo::new(),
            halfmove_clock: 0,
            fullmove_number: 1,
        }
    }
}

impl<B: Board> Default for GameState<B> {
    fn default() -> Self {
        GameState::new()
    }
}

impl<B: Board> GameState<B> {
    pub const fn new() -> GameState<B> {
        GameState {
            board: B::NEW_BOARD,
            player: Player::White,
            en_passant: None,
            info: GameInfo::new(),
            halfmove_clock: 0,
            fullmove_number: 1,
        }
    }

    pub fn player(&self) -> Player {
        self.player
    }

    pub fn board(&self) -> &B {
        &self.board
    }

    pub fn info(&self) -> &GameInfo {
        &self.info
    }

    pub fn en_passant(&self) -> Option<Position> {
        self.en_passant
    }

    pub fn halfmove_clock(&self) -> u32 {
        self.halfmove_clock
    }

    pub fn fullmove_number(&self) -> u32 {
        self.fullmove_number
    }

    /// Zero-based half-move index of the next move, counted from the standard start.
    pub fn ply(&self) -> u32 {
        (self.fullmove_number.saturating_sub(1)) * 2
            + match self.player {
                Player::White => 0,
                Player::Black => 1,
            }
    }
}

impl<B: Board> ModifiableBoard<Position, Option<Piece>> for GameState<B> {
    fn at(&self, pos: &Position) -> Option<Piece> {
        self.board.at(pos)
    }

    fn update(&mut self, pos: &Position, value: Option<Piece>) {
        self.board.update(pos, value)
    }

    fn move_piece(&mut self, source: &Position, target: &Position) {
        self.board.move_piece(source, target)
    }
}

impl<B: Board> Serialize for GameState<B> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_fen())
    }
}

// Board representations

pub type SimpleGame = GameState<SimpleBoard>;
