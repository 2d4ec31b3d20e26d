use core::fmt;

use serde::Serialize;

use super::{format_board, Board, ModifiableBoard, Piece, Position, Ranks};
use crate::p;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SimpleBoard {
    ranks: Ranks<Option<Piece>>,
}

impl SimpleBoard {
    #[rustfmt::skip]
    pub const fn new() -> Self {
        Self {
            ranks: [
                [p!(Rook @ White), p!(Knight @ White), p!(Bishop @ White), p!(Queen @ White),
                 p!(King @ White), p!(Bishop @ White), p!(Knight @ White), p!(Rook @ White)],
                [p!(Pawn @ White); 8],
                [p!(); 8],
                [p!(); 8],
                [p!(); 8],
                [p!(); 8],
                [p!(Pawn @ Black); 8],
                [p!(Rook @ Black), p!(Knight @ Black), p!(Bishop @ Black), p!(Queen @ Black),
                 p!(King @ Black), p!(Bishop @ Black), p!(Knight @ Black), p!(Rook @ Black)],
            ],
        }
    }
}

impl ModifiableBoard<Position, Option<Piece>> for SimpleBoard {
    fn at(&self, pos: &Position) -> Option<Piece> {
        self.ranks[pos.rank][pos.file]
    }

    fn update(&mut self, pos: &Position, value: Option<Piece>) {
        self.ranks[pos.rank][pos.file] = value;
    }

    fn move_piece(&mut self, source: &Position, target: &Position) {
        self.ranks[target.rank][target.file] = self.ranks[source.rank][source.file];
        self.ranks[source.rank][source.file] = None;
    }
}

impl Board for SimpleBoard {
    const NEW_BOARD: Self = SimpleBoard::new();
}

// Serialized as the piece placement field of a FEN string
impl Serialize for SimpleBoard {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_fen())
    }
}

impl fmt::Display for SimpleBoard {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        format_board(self, f)
    }
}
