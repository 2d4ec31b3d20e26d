mod check;
mod iter;


pub use self::check::SafetyChecks;
use self::iter::piece_targets;
use crate::board::{Board, Piece, PieceType, Position};
use crate::dir;
use crate::game::{GameState, ModifiableGame, MoveAction, MoveInfo, PromotionPieces};
use crate::mva;

use anyhow::{bail, Result};
use serde::Serialize;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
pub enum MateType {
    Checkmate,
    Stalemate,
}

trait GamePrivate<B: Board>: ModifiableGame<B> {
    fn as_ref(&self) -> &GameState<B>;

    // Only for moves from the move generator, not from unknown sources
    fn clone_and_move_with_checks(&self, move_action: &MoveAction) -> Option<GameState<B>> {
        let game = self.as_ref();
        let mv = &move_action.mv;
        let piece = game.board.at(&mv.source)?;
        let player = piece.player;
        let is_king = piece.piece == PieceType::King;

        // Before moving, check if it is a castling and it is valid
        if is_king && mv.source.file.abs_diff(mv.target.file) == 2 {
            let crossed = match mv.target.file {
                // Queenside
                2 => dir!(0, -1),
                // Kingside
                6 => dir!(0, 1),
                _ => return None,
            };
            let crossed_square = crate::board::try_move(&mv.source, &crossed)?;
            let castling_is_safe = !game.board.is_position_unsafe(&mv.source, &player)
                && !game.board.is_position_unsafe(&crossed_square, &player);

            if !castling_is_safe {
                return None;
            }
        }

        let mut new_game = game.clone();
        new_game.do_move_no_checks(move_action).ok()?;

        // After moving, check if the king is in check
        let king_position = new_game.board.find_king(&player)?;
        if new_game.board.is_position_unsafe(&king_position, &player) {
            return None;
        }

        Some(new_game)
    }

    fn get_possible_moves_no_checks(&self, position: Position) -> Vec<MoveAction> {
        let game = self.as_ref();
        let mut possible_moves: Vec<MoveAction> = Vec::new();

        let can_promote = |target: &Position| match game.board.at(&position) {
            Some(piece) => {
                piece.piece == PieceType::Pawn && target.rank == B::promotion_rank(&piece.player)
            }
            None => false,
        };

        for target in piece_targets(game, &position) {
            if can_promote(&target) {
                for promotion_piece in PromotionPieces::ALL {
                    possible_moves.push(mva!(position, target, promotion_piece));
                }
            } else {
                possible_moves.push(mva!(position, target));
            }
        }

        possible_moves
    }

    fn get_possible_moves_from_game(&self, position: Position) -> Vec<MoveAction> {
        self.get_possible_moves_no_checks(position)
            .into_iter()
            .filter(|mv| self.clone_and_move_with_checks(mv).is_some())
            .collect()
    }

    fn has_any_legal_move(&self) -> bool {
        let game = self.as_ref();
        game.board
            .iter()
            .filter(|position| matches!(game.board.at(position), Some(piece) if piece.player == game.player))
            .any(|position| {
                self.get_possible_moves_no_checks(position)
                    .iter()
                    .any(|mv| self.clone_and_move_with_checks(mv).is_some())
            })
    }
}

#[allow(private_bounds)]
pub trait Game<B: Board>: GamePrivate<B> {
    /// Legal moves of the piece at `position`, which must belong to the player on move.
    fn get_possible_moves(&self, position: Position) -> Vec<MoveAction> {
        let game = self.as_ref();
        match game.board.at(&position) {
            Some(Piece { piece: _, player }) if player == game.player => {
                self.get_possible_moves_from_game(position)
            }
            _ => vec![],
        }
    }

    fn get_all_possible_moves(&self) -> Vec<MoveAction> {
        let game = self.as_ref();
        let mut moves: Vec<MoveAction> = vec![];

        for piece_position in game.board.iter() {
            moves.extend(self.get_possible_moves(piece_position));
        }

        moves
    }

    /// Whether the player on move is in check.
    fn is_check(&self) -> bool {
        let game = self.as_ref();
        match game.board.find_king(&game.player) {
            Some(king_position) => game.board.is_position_unsafe(&king_position, &game.player),
            None => false,
        }
    }

    fn is_mate(&self) -> Option<MateType> {
        if self.has_any_legal_move() {
            return None;
        }

        if self.is_check() {
            Some(MateType::Checkmate)
        } else {
            Some(MateType::Stalemate)
        }
    }

    fn is_capture(&self, move_action: &MoveAction) -> bool {
        let game = self.as_ref();
        let mv = &move_action.mv;
        if game.board.at(&mv.target).is_some() {
            return true;
        }
        matches!(game.board.at(&mv.source), Some(piece) if piece.piece == PieceType::Pawn)
            && mv.source.file != mv.target.file
    }

    /// Standard algebraic notation of a legal move, with minimal disambiguation and check suffix.
    fn move_name(&self, move_action: &MoveAction) -> Result<String> {
        let game = self.as_ref();
        let board = &game.board;
        let mv = &move_action.mv;
        let mut name = String::new();
        let Some(src_piece) = board.at(&mv.source) else {
            bail!("No piece at {}", mv.source);
        };

        let is_castling =
            src_piece.piece == PieceType::King && mv.source.file.abs_diff(mv.target.file) == 2;

        if is_castling {
            // Castling doesn't need piece or position
            match mv.target.file {
                2 => name.push_str("O-O-O"),
                6 => name.push_str("O-O"),
                _ => bail!("invalid castling {} in:\n{}", mv, board),
            }
        } else {
            if let Some(piece_char_value) = src_piece.piece.san_char() {
                name.push(piece_char_value);
            }

            let is_pawn = src_piece.piece == PieceType::Pawn;
            let is_capture = self.is_capture(move_action);

            // Other pieces of the same kind that can legally reach the same square
            let rivals: Vec<Position> = self
                .get_all_possible_moves()
                .iter()
                .filter(|other| {
                    other.mv.target == mv.target
                        && other.mv.source != mv.source
                        && board.at(&other.mv.source).map(|piece| piece.piece)
                            == Some(src_piece.piece)
                })
                .map(|other| other.mv.source)
                .collect();

            if is_pawn {
                if is_capture {
                    name.push(mv.source.file_char());
                }
            } else if !rivals.is_empty() {
                let piece_in_same_file = rivals.iter().any(|rival| rival.file == mv.source.file);
                let piece_in_same_rank = rivals.iter().any(|rival| rival.rank == mv.source.rank);

                if !piece_in_same_file {
                    name.push(mv.source.file_char());
                } else if !piece_in_same_rank {
                    name.push(mv.source.rank_char());
                } else {
                    name.push(mv.source.file_char());
                    name.push(mv.source.rank_char());
                }
            }

            if is_capture {
                name.push('x');
            }

            name.push_str(format!("{}", mv.target).as_str());

            if let Some(promotion_piece) = move_action.promotion() {
                name.push('=');
                if let Some(promotion_char) = PieceType::from(promotion_piece).san_char() {
                    name.push(promotion_char);
                }
            }
        }

        // Is check?
        let Some(new_game) = self.clone_and_move_with_checks(move_action) else {
            bail!("Invalid move {}", move_action.mv);
        };

        if new_game.is_check() {
            let is_checkmate = !new_game.has_any_legal_move();
            name.push(if is_checkmate { '#' } else { '+' });
        }

        Ok(name)
    }

    /// Plays a move if it is legal for the player on move.
    fn do_move(&mut self, move_action: &MoveAction) -> Option<MoveInfo>;
}

impl<B: Board> GamePrivate<B> for GameState<B> {
    fn as_ref(&self) -> &GameState<B> {
        self
    }
}

impl<B: Board> Game<B> for GameState<B> {
    fn do_move(&mut self, move_action: &MoveAction) -> Option<MoveInfo> {
        if !self.get_possible_moves(move_action.mv.source).contains(move_action) {
            return None;
        }

        ModifiableGame::do_move_no_checks(self, move_action).ok()
    }
}
