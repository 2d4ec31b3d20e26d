use crate::board::{try_move, Board, Direction, Piece, PieceType, Player, Position};
use crate::dir;

pub(crate) const KNIGHT_JUMPS: [Direction; 8] = [
    dir!(-1, -2),
    dir!(-1, 2),
    dir!(-2, -1),
    dir!(-2, 1),
    dir!(2, -1),
    dir!(2, 1),
    dir!(1, -2),
    dir!(1, 2),
];

pub(crate) const DIAGONALS: [Direction; 4] = [dir!(-1, -1), dir!(-1, 1), dir!(1, -1), dir!(1, 1)];

pub(crate) const STRAIGHTS: [Direction; 4] = [dir!(0, -1), dir!(0, 1), dir!(-1, 0), dir!(1, 0)];

fn find_king(board: &impl Board, player: &Player) -> Option<Position> {
    let king = Some(Piece {
        piece: PieceType::King,
        player: *player,
    });
    board.iter().find(|position| board.at(position) == king)
}

fn is_position_unsafe<B: Board>(board: &B, position: &Position, player: &Player) -> bool {
    let enemy_player = !*player;
    // Enemy pawns attack against their own direction of progress
    let enemy_pawn_direction = B::pawn_progress_direction(player);

    let is_enemy_piece = |position: Option<Position>, piece: PieceType| match position {
        Some(pos) => match board.at(&pos) {
            Some(square) => square.piece == piece && square.player == enemy_player,
            None => false,
        },
        None => false,
    };

    let enemy_in_direction = |direction: &Direction| {
        board
            .direction_iter(position, direction)
            .find_map(|pos| board.at(&pos))
            .filter(|piece| piece.player == enemy_player)
            .map(|piece| piece.piece)
    };

    // 1. Pawns
    if is_enemy_piece(
        try_move(position, &dir!(enemy_pawn_direction, -1)),
        PieceType::Pawn,
    ) || is_enemy_piece(
        try_move(position, &dir!(enemy_pawn_direction, 1)),
        PieceType::Pawn,
    ) {
        return true;
    }

    // 2. Knights
    if KNIGHT_JUMPS
        .iter()
        .any(|jump| is_enemy_piece(try_move(position, jump), PieceType::Knight))
    {
        return true;
    }

    // 3. Bishops or queens on diagonals
    if DIAGONALS.iter().any(|direction| {
        matches!(
            enemy_in_direction(direction),
            Some(PieceType::Bishop) | Some(PieceType::Queen)
        )
    }) {
        return true;
    }

    // 4. Rooks or queens on files or ranks
    if STRAIGHTS.iter().any(|direction| {
        matches!(
            enemy_in_direction(direction),
            Some(PieceType::Rook) | Some(PieceType::Queen)
        )
    }) {
        return true;
    }

    // 5. King
    DIAGONALS
        .iter()
        .chain(STRAIGHTS.iter())
        .any(|direction| is_enemy_piece(try_move(position, direction), PieceType::King))
}

pub trait SafetyChecks {
    fn find_king(&self, player: &Player) -> Option<Position>;
    fn is_position_unsafe(&self, position: &Position, player: &Player) -> bool;
    fn is_piece_unsafe(&self, position: &Position) -> bool;
}

impl<B: Board> SafetyChecks for B {
    fn find_king(&self, player: &Player) -> Option<Position> {
        find_king(self, player)
    }

    fn is_position_unsafe(&self, position: &Position, player: &Player) -> bool {
        is_position_unsafe(self, position, player)
    }

    fn is_piece_unsafe(&self, position: &Position) -> bool {
        match self.at(position) {
            Some(Piece { piece: _, player }) => is_position_unsafe(self, position, &player),
            None => false,
        }
    }
}
