use chusst_pgn::board::PieceType;
use chusst_pgn::eval::{Game as _, MateType};
use chusst_pgn::game::PromotionPieces;
use chusst_pgn::pgn::{
    CastlingSide, CheckStatus, Diagnostic, Game, GameResult, MoveNode, PgnError, ResolvedMove,
    TagPairs,
};

#[derive(PartialEq)]
pub enum MoveType {
    Normal,
    Capture,
    PassingPawn,
    EnPassant,
    Promotion(PromotionPieces),
    PromotionWithCapture(PromotionPieces),
    KingsideCastling,
    QueensideCastling,
}

pub struct DetailedMoveInfo {
    pub short: String,
    pub long: String,
    pub move_type: MoveType,
    pub check_type: CheckStatus,
    pub comments: Vec<String>,
    pub variations: usize,
}

#[derive(Default)]
pub struct DetailedMove {
    pub white: Option<DetailedMoveInfo>,
    pub black: Option<DetailedMoveInfo>,
}

#[derive(Clone, Copy)]
pub enum GameEnding {
    Draw,
    Stalemate,
    WhiteWinsCheckmate,
    BlackWinsCheckmate,
    WhiteResigned,
    BlackResigned,
    Unfinished,
}

pub struct DetailedGame<'a> {
    pub tags: &'a TagPairs,
    /// Full moves keyed by their move number
    pub moves: Vec<(u32, DetailedMove)>,
    pub ending: GameEnding,
    pub diagnostics: &'a [Diagnostic],
}

pub enum DetailedEntry<'a> {
    Game(DetailedGame<'a>),
    Failed(&'a PgnError),
}

fn long(resolved: &ResolvedMove) -> String {
    let promotion = resolved
        .promotion
        .and_then(|piece| PieceType::from(piece).san_char())
        .map(|piece| piece.to_ascii_lowercase().to_string())
        .unwrap_or_default();

    format!(
        "{}{}{}{}",
        resolved.source,
        if resolved.capture { "x" } else { "-" },
        resolved.target,
        promotion
    )
}

fn move_type(resolved: &ResolvedMove) -> MoveType {
    match (resolved.castle, resolved.promotion) {
        (Some(CastlingSide::Kingside), _) => MoveType::KingsideCastling,
        (Some(CastlingSide::Queenside), _) => MoveType::QueensideCastling,
        (None, Some(piece)) if resolved.capture => MoveType::PromotionWithCapture(piece),
        (None, Some(piece)) => MoveType::Promotion(piece),
        (None, None) if resolved.en_passant => MoveType::EnPassant,
        (None, None)
            if resolved.piece == PieceType::Pawn
                && resolved.source.rank.abs_diff(resolved.target.rank) == 2 =>
        {
            MoveType::PassingPawn
        }
        (None, None) if resolved.capture => MoveType::Capture,
        (None, None) => MoveType::Normal,
    }
}

fn detailed_move(node: &MoveNode, resolved: &ResolvedMove) -> DetailedMoveInfo {
    DetailedMoveInfo {
        short: node.san.clone(),
        long: long(resolved),
        move_type: move_type(resolved),
        check_type: resolved.check,
        comments: node
            .comments_before
            .iter()
            .chain(&node.comments_after)
            .cloned()
            .collect(),
        variations: node.variations.len(),
    }
}

fn ending(game: &Game) -> GameEnding {
    let checkmate = game
        .moves
        .moves
        .last()
        .and_then(|node| node.resolved.as_ref())
        .is_some_and(|resolved| resolved.check == CheckStatus::Checkmate);

    match game.result {
        Some(GameResult::WhiteWin) if checkmate => GameEnding::WhiteWinsCheckmate,
        Some(GameResult::WhiteWin) => GameEnding::BlackResigned,
        Some(GameResult::BlackWin) if checkmate => GameEnding::BlackWinsCheckmate,
        Some(GameResult::BlackWin) => GameEnding::WhiteResigned,
        Some(GameResult::Draw) => {
            if game.final_position.is_mate() == Some(MateType::Stalemate) {
                GameEnding::Stalemate
            } else {
                GameEnding::Draw
            }
        }
        Some(GameResult::Unknown) | None => GameEnding::Unfinished,
    }
}

pub fn game_to_long_algebraic(game: &Game) -> DetailedGame<'_> {
    let mut moves: Vec<(u32, DetailedMove)> = Vec::new();

    let first_ply = game.initial.ply();
    for (index, node) in game.moves.moves.iter().enumerate() {
        let Some(resolved) = &node.resolved else {
            continue;
        };

        let ply = first_ply + index as u32;
        let number = ply / 2 + 1;
        let info = detailed_move(node, resolved);

        if ply % 2 == 0 {
            moves.push((
                number,
                DetailedMove {
                    white: Some(info),
                    black: None,
                },
            ));
            continue;
        }

        match moves.last_mut() {
            Some((last_number, full_move)) if *last_number == number => {
                full_move.black = Some(info)
            }
            _ => moves.push((
                number,
                DetailedMove {
                    white: None,
                    black: Some(info),
                },
            )),
        }
    }

    DetailedGame {
        tags: &game.tags,
        moves,
        ending: ending(game),
        diagnostics: &game.diagnostics,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chusst_pgn::pgn::{parse_game, ParseOptions};

    fn detailed(text: &str) -> (Game, Vec<String>) {
        let game = parse_game(text, &ParseOptions::default()).unwrap();
        let longs = game
            .moves
            .moves
            .iter()
            .map(|node| long(node.resolved.as_ref().unwrap()))
            .collect();
        (game, longs)
    }

    #[test]
    fn long_notation() {
        let (_, longs) = detailed("1. e4 d5 2. exd5 Qxd5 3. Nc3 *");
        assert_eq!(longs, vec!["e2-e4", "d7-d5", "e4xd5", "d8xd5", "b1-c3"]);

        let (_, longs) = detailed("[FEN \"1n2k3/P7/8/8/8/8/8/4K3 w - - 0 1\"]\n\n1. axb8=N *");
        assert_eq!(longs, vec!["a7xb8n"]);
    }

    #[test]
    fn move_types() {
        let (game, _) = detailed("1. e4 a6 2. e5 d5 3. exd6 Nf6 4. dxc7 Ng8 5. cxb8=Q Ra7 *");
        let types: Vec<MoveType> = game
            .moves
            .moves
            .iter()
            .map(|node| move_type(node.resolved.as_ref().unwrap()))
            .collect();

        assert!(types[0] == MoveType::PassingPawn);
        assert!(types[1] == MoveType::Normal);
        assert!(types[4] == MoveType::EnPassant);
        assert!(types[6] == MoveType::Capture);
        assert!(types[8] == MoveType::PromotionWithCapture(PromotionPieces::Queen));
    }

    #[test]
    fn black_first() {
        let text = "[FEN \"4k3/8/8/8/8/8/4P3/4K3 b - - 0 12\"]\n\n12... Kd7 13. e4 Kc6 *";
        let game = parse_game(text, &ParseOptions::default()).unwrap();
        let detailed = game_to_long_algebraic(&game);

        assert_eq!(detailed.moves.len(), 2);
        assert_eq!(detailed.moves[0].0, 12);
        assert!(detailed.moves[0].1.white.is_none());
        assert_eq!(detailed.moves[1].0, 13);
        assert!(detailed.moves[1].1.black.is_some());
        assert!(matches!(detailed.ending, GameEnding::Unfinished));
    }

    #[test]
    fn endings() {
        let game = parse_game("1. f3 e5 2. g4 Qh4# 0-1", &ParseOptions::default()).unwrap();
        assert!(matches!(ending(&game), GameEnding::BlackWinsCheckmate));

        let game = parse_game("1. e4 e5 1-0", &ParseOptions::default()).unwrap();
        assert!(matches!(ending(&game), GameEnding::BlackResigned));

        let game = parse_game("1. e4 e5 1/2-1/2", &ParseOptions::default()).unwrap();
        assert!(matches!(ending(&game), GameEnding::Draw));

        let text = "[FEN \"k7/8/2Q5/8/8/8/8/4K3 w - - 0 1\"]\n\n1. Qb6 1/2-1/2";
        let game = parse_game(text, &ParseOptions::default()).unwrap();
        assert!(matches!(ending(&game), GameEnding::Stalemate));
    }
}
