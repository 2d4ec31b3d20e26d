use super::{GameInfo, GameState};
use crate::board::{Board, Piece, PieceType, Player, Position};

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FenError {
    #[error("empty FEN string")]
    Empty,
    #[error("invalid number of fields: expected 6, got {0}")]
    FieldCount(usize),
    #[error("invalid number of ranks: expected 8, got {0}")]
    RankCount(usize),
    #[error("invalid character in piece placement: {0}")]
    PieceChar(char),
    #[error("invalid number of files in rank {rank}")]
    RankWidth { rank: usize },
    #[error("invalid active color: {0}")]
    ActiveColor(String),
    #[error("invalid castling availability: {0}")]
    Castling(String),
    #[error("invalid en passant square: {0}")]
    EnPassant(String),
    #[error("invalid {field}: {value}")]
    Clock { field: &'static str, value: String },
    #[error("{player} must have exactly one king, found {count}")]
    KingCount { player: Player, count: usize },
}

impl<B: Board> GameState<B> {
    pub fn try_from_fen(fen: &str) -> Result<Self, FenError> {
        // rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1
        // ^                                           ^ ^    ^ ^ ^
        // |                                           | |    | | ` Fullmove number
        // |                                           | |    | ` Halfmove clock
        // |                                           | |    ` En passant target square
        // |                                           | ` Castling availability
        // |                                           ` Active color
        // ` Pieces

        let fields = fen.split_ascii_whitespace().collect::<Vec<&str>>();

        if fields.is_empty() {
            return Err(FenError::Empty);
        }

        let [pieces, player_str, castling, en_passant, halfmove, fullmove] = fields[..] else {
            return Err(FenError::FieldCount(fields.len()));
        };

        let board = B::try_from_fen(pieces)?;

        for player in [Player::White, Player::Black] {
            let king = Some(Piece {
                piece: PieceType::King,
                player,
            });
            let count = board.iter().filter(|pos| board.at(pos) == king).count();
            if count != 1 {
                return Err(FenError::KingCount { player, count });
            }
        }

        let player = match player_str {
            "w" => Player::White,
            "b" => Player::Black,
            _ => return Err(FenError::ActiveColor(player_str.to_string())),
        };

        let info = parse_castling(castling)?;

        let en_passant = if en_passant != "-" {
            let en_passant_pos = Position::try_from_str(en_passant)
                .ok_or_else(|| FenError::EnPassant(en_passant.to_string()))?;
            // The pawn that passed belongs to the player who is not on move
            let passed_rank = match player {
                Player::White => 5,
                Player::Black => 2,
            };

            if en_passant_pos.rank != passed_rank {
                return Err(FenError::EnPassant(en_passant.to_string()));
            }

            Some(en_passant_pos)
        } else {
            None
        };

        let halfmove_clock = halfmove.parse::<u32>().map_err(|_| FenError::Clock {
            field: "halfmove clock",
            value: halfmove.to_string(),
        })?;
        let fullmove_number = match fullmove.parse::<u32>() {
            Ok(value) if value > 0 => value,
            _ => {
                return Err(FenError::Clock {
                    field: "fullmove number",
                    value: fullmove.to_string(),
                })
            }
        };

        Ok(GameState {
            board,
            player,
            info,
            en_passant,
            halfmove_clock,
            fullmove_number,
        })
    }

    pub fn to_fen(&self) -> String {
        format!(
            "{} {} {} {} {} {}",
            self.board.to_fen(),
            match self.player {
                Player::White => "w",
                Player::Black => "b",
            },
            self.info,
            self.en_passant
                .map_or("-".to_string(), |position| position.to_string()),
            self.halfmove_clock,
            self.fullmove_number
        )
    }
}

fn parse_castling(castling: &str) -> Result<GameInfo, FenError> {
    let mut info = GameInfo::none();

    if castling == "-" {
        return Ok(info);
    }

    let invalid = || FenError::Castling(castling.to_string());

    if castling.is_empty() || castling.len() > 4 {
        return Err(invalid());
    }

    let mut seen = Vec::with_capacity(4);
    for right in castling.chars() {
        if seen.contains(&right) {
            return Err(invalid());
        }
        seen.push(right);

        match right {
            'K' => info.white_kingside_castling_allowed = true,
            'Q' => info.white_queenside_castling_allowed = true,
            'k' => info.black_kingside_castling_allowed = true,
            'q' => info.black_queenside_castling_allowed = true,
            _ => return Err(invalid()),
        }
    }

    Ok(info)
}
