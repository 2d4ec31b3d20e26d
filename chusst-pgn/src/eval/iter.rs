use super::check::{DIAGONALS, KNIGHT_JUMPS, STRAIGHTS};
use crate::board::{try_move, Board, Direction, PieceType, Player, Position};
use crate::{dir, pos};
use crate::game::GameState;

fn only_empty<B: Board>(board: &B, position: Option<Position>) -> Option<Position> {
    position.filter(|pos| board.at(pos).is_none())
}

fn only_enemy<B: Board>(board: &B, position: Option<Position>, player: &Player) -> Option<Position> {
    position.filter(|pos| matches!(board.at(pos), Some(piece) if piece.player != *player))
}

fn only_empty_or_enemy<B: Board>(
    board: &B,
    position: Option<Position>,
    player: &Player,
) -> Option<Position> {
    position.filter(|pos| match board.at(pos) {
        Some(piece) => piece.player != *player,
        None => true,
    })
}

// Walks in a direction until the edge, a friendly piece, or just past an enemy piece
fn walk<B: Board>(
    board: &B,
    position: &Position,
    direction: &Direction,
    player: &Player,
    targets: &mut Vec<Position>,
) {
    for target in board.direction_iter(position, direction) {
        match board.at(&target) {
            None => targets.push(target),
            Some(piece) => {
                if piece.player != *player {
                    targets.push(target);
                }
                break;
            }
        }
    }
}

fn pawn_targets<B: Board>(game: &GameState<B>, position: &Position, player: &Player) -> Vec<Position> {
    let board = &game.board;
    let direction = B::pawn_progress_direction(player);
    let mut targets = Vec::with_capacity(4);

    if let Some(advance) = only_empty(board, try_move(position, &dir!(direction, 0))) {
        targets.push(advance);

        if position.rank == B::pawn_start_rank(player) {
            if let Some(pass) = only_empty(board, try_move(position, &dir!(direction * 2, 0))) {
                targets.push(pass);
            }
        }
    }

    for side in [-1, 1] {
        let diagonal = try_move(position, &dir!(direction, side));
        if let Some(capture) = only_enemy(board, diagonal, player) {
            targets.push(capture);
        } else if let Some(en_passant) =
            diagonal.filter(|pos| *player == game.player && Some(*pos) == game.en_passant)
        {
            targets.push(en_passant);
        }
    }

    targets
}

fn king_targets<B: Board>(game: &GameState<B>, position: &Position, player: &Player) -> Vec<Position> {
    let board = &game.board;
    let mut targets: Vec<Position> = DIAGONALS
        .iter()
        .chain(STRAIGHTS.iter())
        .filter_map(|direction| only_empty_or_enemy(board, try_move(position, direction), player))
        .collect();

    let home = pos!(B::home_rank(player), 4);
    if *position != home {
        return targets;
    }

    let own_rook = |file: usize| {
        matches!(
            board.at(&pos!(home.rank, file)),
            Some(piece) if piece.piece == PieceType::Rook && piece.player == *player
        )
    };
    let empty = |files: &[usize]| {
        files
            .iter()
            .all(|file| board.at(&pos!(home.rank, *file)).is_none())
    };

    // Safety of the squares the king crosses is checked when filtering legal moves
    if game.info.can_castle_kingside(player) && own_rook(7) && empty(&[5, 6]) {
        targets.push(pos!(home.rank, 6));
    }
    if game.info.can_castle_queenside(player) && own_rook(0) && empty(&[1, 2, 3]) {
        targets.push(pos!(home.rank, 2));
    }

    targets
}

/// Pseudo-legal target squares of the piece at `position`: own king safety is not considered.
pub fn piece_targets<B: Board>(game: &GameState<B>, position: &Position) -> Vec<Position> {
    let board = &game.board;
    let Some(square) = board.at(position) else {
        return vec![];
    };
    let player = &square.player;

    match square.piece {
        PieceType::Pawn => pawn_targets(game, position, player),
        PieceType::Knight => KNIGHT_JUMPS
            .iter()
            .filter_map(|jump| only_empty_or_enemy(board, try_move(position, jump), player))
            .collect(),
        PieceType::Bishop | PieceType::Rook | PieceType::Queen => {
            let directions: Vec<&Direction> = match square.piece {
                PieceType::Bishop => DIAGONALS.iter().collect(),
                PieceType::Rook => STRAIGHTS.iter().collect(),
                _ => DIAGONALS.iter().chain(STRAIGHTS.iter()).collect(),
            };
            let mut targets = Vec::new();
            for direction in directions {
                walk(board, position, direction, player, &mut targets);
            }
            targets
        }
        PieceType::King => king_targets(game, position, player),
    }
}
