use super::diagnostic::{Diagnostic, DiagnosticKind, Diagnostics};
use super::error::{ErrorKind, PgnError};
use super::model::{CheckStatus, Line, MoveNode, ResolvedMove};
use super::options::{ParseOptions, VariationErrorPolicy};
use super::san::{parse_san, CastlingSide, SanIntent, SanKind};
use crate::board::{Board, ModifiableBoard, PieceType, SimpleBoard};
use crate::eval::{Game, MateType};
use crate::game::{MoveAction, MoveExtraInfo, SimpleGame};
use crate::pos;

use tracing::debug;

pub(crate) struct Validator<'a, 'd> {
    text: &'a str,
    options: &'d ParseOptions,
    diagnostics: &'d mut Diagnostics<'a>,
}

impl<'a, 'd> Validator<'a, 'd> {
    pub(crate) fn new(
        text: &'a str,
        options: &'d ParseOptions,
        diagnostics: &'d mut Diagnostics<'a>,
    ) -> Self {
        Validator {
            text,
            options,
            diagnostics,
        }
    }

    fn error(&self, kind: ErrorKind, message: impl Into<String>, offset: usize) -> PgnError {
        PgnError::new(kind, message, self.text, offset)
    }

    /// Resolves every move of `line`, advancing `state` through it.
    pub(crate) fn validate_line(
        &mut self,
        state: &mut SimpleGame,
        line: &mut Line,
    ) -> Result<(), PgnError> {
        for node in &mut line.moves {
            let explore = self.options.validate_variations && !node.variations.is_empty();
            let before = explore.then(|| state.clone());

            let resolved = self.resolve(state, node)?;
            node.resolved = Some(resolved);

            let Some(before) = before else {
                continue;
            };

            for variation in &mut node.variations {
                // Each branch plays on its own copy of the position
                let mut branch = before.clone();
                self.validate_variation(&mut branch, variation)?;
            }
        }

        Ok(())
    }

    fn validate_variation(
        &mut self,
        state: &mut SimpleGame,
        variation: &mut Line,
    ) -> Result<(), PgnError> {
        match self.validate_line(state, variation) {
            Err(err) if self.options.variation_errors == VariationErrorPolicy::AbortVariation => {
                self.diagnostics.push(Diagnostic {
                    kind: DiagnosticKind::VariationAborted,
                    message: format!("variation abandoned: {}", err),
                    location: err.location,
                });
                Ok(())
            }
            other => other,
        }
    }

    fn candidates(&self, state: &SimpleGame, intent: &SanIntent) -> Vec<MoveAction> {
        let player = state.player();
        let home_rank = SimpleBoard::home_rank(&player);

        match intent.kind {
            SanKind::Castle(side) => {
                let target_file = match side {
                    CastlingSide::Kingside => 6,
                    CastlingSide::Queenside => 2,
                };
                state
                    .get_possible_moves(pos!(home_rank, 4))
                    .into_iter()
                    .filter(|mv| {
                        state.at(&mv.mv.source).map(|piece| piece.piece) == Some(PieceType::King)
                            && mv.mv.target == pos!(home_rank, target_file)
                    })
                    .collect()
            }
            SanKind::Normal {
                piece,
                from_file,
                from_rank,
                target,
                promotion,
                ..
            } => state
                .board()
                .iter()
                .filter(|position| {
                    matches!(state.at(position), Some(square) if square.piece == piece && square.player == player)
                        && from_file.map_or(true, |file| file == position.file)
                        && from_rank.map_or(true, |rank| rank == position.rank)
                })
                .flat_map(|position| state.get_possible_moves(position))
                .filter(|mv| {
                    let is_castling = piece == PieceType::King
                        && mv.mv.source.file.abs_diff(mv.mv.target.file) == 2;
                    mv.mv.target == target && !is_castling && mv.promotion() == promotion
                })
                .collect(),
        }
    }

    fn reject(&self, state: &SimpleGame, node: &MoveNode, kind: ErrorKind, message: String) -> PgnError {
        debug!(
            san = node.san.as_str(),
            player = %state.player(),
            fen = %state.to_fen(),
            "rejected move\n{}",
            state.board()
        );
        self.error(kind, message, node.offset)
    }

    fn resolve(&mut self, state: &mut SimpleGame, node: &MoveNode) -> Result<ResolvedMove, PgnError> {
        let player = state.player();

        let Some(intent) = parse_san(&node.san) else {
            return Err(self.reject(
                state,
                node,
                ErrorKind::IllegalMove,
                format!("'{}' is not a valid move", node.san),
            ));
        };

        let candidates = self.candidates(state, &intent);

        let move_action = match candidates.as_slice() {
            [move_action] => *move_action,
            [] => {
                let missing_promotion = matches!(
                    intent.kind,
                    SanKind::Normal { piece: PieceType::Pawn, promotion: None, target, .. }
                        if target.rank == SimpleBoard::promotion_rank(&player)
                );
                let message = if missing_promotion {
                    format!("{} for {} does not name a promotion piece", node.san, player)
                } else {
                    format!("{} is not a legal move for {}", node.san, player)
                };
                return Err(self.reject(state, node, ErrorKind::IllegalMove, message));
            }
            _ => {
                let options = candidates
                    .iter()
                    .filter_map(|mv| state.move_name(mv).ok())
                    .collect::<Vec<String>>()
                    .join(", ");
                return Err(self.reject(
                    state,
                    node,
                    ErrorKind::AmbiguousMove,
                    format!("{} is ambiguous for {}, it could be {}", node.san, player, options),
                ));
            }
        };

        let declared_capture = matches!(intent.kind, SanKind::Normal { capture: true, .. });
        let is_capture = state.is_capture(&move_action);

        if declared_capture && !is_capture {
            return Err(self.reject(
                state,
                node,
                ErrorKind::IllegalMove,
                format!("{} is marked as a capture but captures nothing", node.san),
            ));
        }
        if is_capture && !declared_capture {
            self.diagnostics.record(
                DiagnosticKind::CaptureMarkerMissing,
                format!("{} captures but has no 'x'", node.san),
                node.offset,
            );
        }

        let canonical_san = state
            .move_name(&move_action)
            .map_err(|err| self.error(ErrorKind::IllegalMove, err.to_string(), node.offset))?;

        let Some(piece) = state.at(&move_action.mv.source).map(|square| square.piece) else {
            return Err(self.reject(
                state,
                node,
                ErrorKind::IllegalMove,
                format!("{} moves from an empty square", node.san),
            ));
        };

        let Some(info) = state.do_move(&move_action) else {
            return Err(self.reject(
                state,
                node,
                ErrorKind::IllegalMove,
                format!("{} is not a legal move for {}", node.san, player),
            ));
        };

        let check = if state.is_check() {
            match state.is_mate() {
                Some(MateType::Checkmate) => CheckStatus::Checkmate,
                _ => CheckStatus::Check,
            }
        } else {
            CheckStatus::None
        };

        let declared_check = CheckStatus::from(intent.suffix);
        if declared_check != check {
            self.diagnostics.record(
                DiagnosticKind::CheckSuffixMismatch,
                format!("{} is written as {:?} but gives {:?}", node.san, declared_check, check),
                node.offset,
            );
        }

        Ok(ResolvedMove {
            source: move_action.mv.source,
            target: move_action.mv.target,
            piece,
            capture: info.captured.is_some(),
            captured: info.captured,
            promotion: move_action.promotion(),
            check,
            castle: match info.info {
                MoveExtraInfo::CastleKingside => Some(CastlingSide::Kingside),
                MoveExtraInfo::CastleQueenside => Some(CastlingSide::Queenside),
                _ => None,
            },
            en_passant: info.info == MoveExtraInfo::EnPassant,
            canonical_san,
        })
    }
}
