mod iter;
mod simple;

pub use self::iter::{try_move, Direction, DirectionIter};
pub use simple::SimpleBoard;

use crate::game::FenError;

use atty;
use colored::Colorize;
use serde::Serialize;
use std::{fmt, ops::Not};

#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq, Serialize)]
pub enum PieceType {
    Pawn,   // p
    Knight, // n
    Bishop, // b
    Rook,   // r
    Queen,  // q
    King,   // k
}

impl PieceType {
    /// Upper-case letter used by SAN, `None` for pawns.
    pub fn san_char(&self) -> Option<char> {
        match self {
            PieceType::Pawn => None,
            PieceType::Knight => Some('N'),
            PieceType::Bishop => Some('B'),
            PieceType::Rook => Some('R'),
            PieceType::Queen => Some('Q'),
            PieceType::King => Some('K'),
        }
    }

    pub fn try_from_san_char(value: char) -> Option<Self> {
        match value {
            'N' => Some(PieceType::Knight),
            'B' => Some(PieceType::Bishop),
            'R' => Some(PieceType::Rook),
            'Q' => Some(PieceType::Queen),
            'K' => Some(PieceType::King),
            _ => None,
        }
    }
}

impl fmt::Display for PieceType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}",
            match &self {
                PieceType::Pawn => "pawn",
                PieceType::Knight => "knight",
                PieceType::Bishop => "bishop",
                PieceType::Rook => "rook",
                PieceType::Queen => "queen",
                PieceType::King => "king",
            }
        )
    }
}

#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq, Serialize)]
pub enum Player {
    White,
    Black,
}

impl Not for Player {
    type Output = Self;

    fn not(self) -> Self::Output {
        match self {
            Player::White => Player::Black,
            Player::Black => Player::White,
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}",
            match &self {
                Player::White => "white",
                Player::Black => "black",
            }
        )
    }
}

#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq, Serialize)]
pub struct Piece {
    pub piece: PieceType,
    pub player: Player,
}

impl Piece {
    pub fn try_from_fen_char(value: char) -> Option<Piece> {
        let player = if value.is_ascii_uppercase() {
            Player::White
        } else {
            Player::Black
        };
        let piece = match value.to_ascii_lowercase() {
            'p' => PieceType::Pawn,
            'n' => PieceType::Knight,
            'b' => PieceType::Bishop,
            'r' => PieceType::Rook,
            'q' => PieceType::Queen,
            'k' => PieceType::King,
            _ => return None,
        };
        Some(Piece { piece, player })
    }

    pub fn fen_char(&self) -> char {
        let c = match self.piece {
            PieceType::Pawn => 'p',
            PieceType::Knight => 'n',
            PieceType::Bishop => 'b',
            PieceType::Rook => 'r',
            PieceType::Queen => 'q',
            PieceType::King => 'k',
        };
        match self.player {
            Player::White => c.to_ascii_uppercase(),
            Player::Black => c,
        }
    }

    fn unicode(&self) -> char {
        match (self.player, self.piece) {
            (Player::White, PieceType::Pawn) => '♙',
            (Player::White, PieceType::Knight) => '♘',
            (Player::White, PieceType::Bishop) => '♗',
            (Player::White, PieceType::Rook) => '♖',
            (Player::White, PieceType::Queen) => '♕',
            (Player::White, PieceType::King) => '♔',
            (Player::Black, PieceType::Pawn) => '♟',
            (Player::Black, PieceType::Knight) => '♞',
            (Player::Black, PieceType::Bishop) => '♝',
            (Player::Black, PieceType::Rook) => '♜',
            (Player::Black, PieceType::Queen) => '♛',
            (Player::Black, PieceType::King) => '♚',
        }
    }
}

/// `p!(Knight @ White)` is a square holding a white knight, `p!()` an empty one.
#[macro_export]
macro_rules! p {
    ($piece:ident @ $player:ident) => {
        Some($crate::board::Piece {
            piece: $crate::board::PieceType::$piece,
            player: $crate::board::Player::$player,
        })
    };
    () => {
        Option::<$crate::board::Piece>::None
    };
}

#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq, Serialize)]
pub struct Position {
    pub rank: usize,
    pub file: usize,
}

impl Position {
    pub fn try_from_str(pos_str: &str) -> Option<Position> {
        let mut chars = pos_str.chars();
        let file = Self::file_from_char(chars.next()?)?;
        let rank = Self::rank_from_char(chars.next()?)?;

        if chars.next().is_some() {
            return None;
        }

        Some(Position { rank, file })
    }

    pub fn file_from_char(value: char) -> Option<usize> {
        match value {
            'a'..='h' => Some(value as usize - 'a' as usize),
            _ => None,
        }
    }

    pub fn rank_from_char(value: char) -> Option<usize> {
        match value {
            '1'..='8' => Some(value as usize - '1' as usize),
            _ => None,
        }
    }

    pub fn file_char(&self) -> char {
        ['a', 'b', 'c', 'd', 'e', 'f', 'g', 'h'][self.file]
    }

    pub fn rank_char(&self) -> char {
        ['1', '2', '3', '4', '5', '6', '7', '8'][self.rank]
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}{}", self.file_char(), self.rank_char())
    }
}

/// `pos!(e4)` or `pos!(rank, file)` with zero-based indices.
#[macro_export]
macro_rules! pos {
    ($square:ident) => {
        $crate::board::Position::try_from_str(stringify!($square))
            .expect(concat!("invalid square ", stringify!($square)))
    };
    ($rank:expr, $file:expr) => {
        $crate::board::Position {
            rank: $rank,
            file: $file,
        }
    };
}

pub type Files<T> = [T; 8];
pub type Ranks<T> = [Files<T>; 8];

pub trait ModifiableBoard<K, V>
where
    Self: Sized,
{
    fn at(&self, pos: &K) -> V;
    fn update(&mut self, pos: &K, value: V);
    fn move_piece(&mut self, source: &K, target: &K);
}

pub trait Board:
    ModifiableBoard<Position, Option<Piece>> + Clone + Default + fmt::Debug + PartialEq + fmt::Display
{
    const NEW_BOARD: Self;

    fn iter(&self) -> impl Iterator<Item = Position> {
        (0..8usize).flat_map(|rank| (0..8usize).map(move |file| Position { rank, file }))
    }

    fn direction_iter(&self, position: &Position, direction: &Direction) -> DirectionIter {
        DirectionIter::new(*position, *direction)
    }

    fn home_rank(player: &Player) -> usize {
        match player {
            Player::White => 0,
            Player::Black => 7,
        }
    }

    fn pawn_start_rank(player: &Player) -> usize {
        match player {
            Player::White => 1,
            Player::Black => 6,
        }
    }

    fn promotion_rank(player: &Player) -> usize {
        match player {
            Player::White => 7,
            Player::Black => 0,
        }
    }

    fn pawn_progress_direction(player: &Player) -> i8 {
        match player {
            Player::White => 1,
            Player::Black => -1,
        }
    }

    fn try_from_fen(fen: &str) -> Result<Self, FenError> {
        // Example initial
        // rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR

        let mut board: Self = Default::default();

        let ranks = fen.split('/').collect::<Vec<&str>>();

        if ranks.len() != 8 {
            return Err(FenError::RankCount(ranks.len()));
        }

        for (rank, pieces) in ranks.iter().rev().enumerate() {
            let mut file: usize = 0;
            for piece_char in pieces.chars() {
                if let Some(skip) = piece_char.to_digit(10) {
                    if !(1..=8).contains(&skip) {
                        return Err(FenError::PieceChar(piece_char));
                    }
                    file += skip as usize;
                    continue;
                }

                let piece =
                    Piece::try_from_fen_char(piece_char).ok_or(FenError::PieceChar(piece_char))?;

                if file > 7 {
                    return Err(FenError::RankWidth { rank: rank + 1 });
                }

                board.update(&pos!(rank, file), Some(piece));

                file += 1;
            }

            if file != 8 {
                return Err(FenError::RankWidth { rank: rank + 1 });
            }
        }

        Ok(board)
    }

    fn to_fen(&self) -> String {
        let mut ranks: Vec<String> = Vec::with_capacity(8);

        for rank in (0..8).rev() {
            let mut rank_str = String::new();
            let mut empty = 0;
            for file in 0..8 {
                match self.at(&pos!(rank, file)) {
                    Some(piece) => {
                        if empty > 0 {
                            rank_str.push_str(&empty.to_string());
                            empty = 0;
                        }
                        rank_str.push(piece.fen_char());
                    }
                    None => empty += 1,
                }
            }
            if empty > 0 {
                rank_str.push_str(&empty.to_string());
            }
            ranks.push(rank_str);
        }

        ranks.join("/")
    }
}

fn format_board(board: &impl Board, f: &mut fmt::Formatter) -> fmt::Result {
    let mut rows: Vec<String> = Default::default();

    let square_dark = |rank: usize, file: usize| -> bool { (rank + file) % 2 == 0 };

    let is_atty = atty::is(atty::Stream::Stdout) && atty::is(atty::Stream::Stderr);
    let (left_square, right_square) = if is_atty { (" ", " ") } else { ("[", "]") };

    rows.push("   a  b  c  d  e  f  g  h ".to_owned());
    for rank in (0..8).rev() {
        let mut row_str = format!("{} ", rank + 1);
        for file in 0..8 {
            let colored_piece_str = match board.at(&pos!(rank, file)) {
                Some(piece) => {
                    let piece_str = format!("{}{}{}", left_square, piece.unicode(), right_square);
                    match piece.player {
                        Player::White => piece_str.black(),
                        Player::Black => piece_str.red(),
                    }
                }
                None => format!("{} {}", left_square, right_square).normal(),
            };

            let colored_square_str = if square_dark(rank, file) {
                colored_piece_str.on_black()
            } else {
                colored_piece_str.on_white()
            };

            let square_str = if !is_atty {
                colored_square_str.clear()
            } else {
                colored_square_str
            };

            row_str += format!("{}", square_str).as_str();
        }
        rows.push(row_str);
    }

    writeln!(f, "{}", rows.join("\n"))
}
