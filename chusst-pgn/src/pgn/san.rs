use crate::board::{PieceType, Position};
use crate::game::PromotionPieces;
use crate::pos;

use nom::branch::alt;
use nom::bytes::complete::tag;
use nom::character::complete::{char, one_of};
use nom::combinator::{all_consuming, map, map_opt, opt, value};
use nom::sequence::{pair, preceded, tuple};
use nom::IResult;
use serde::Serialize;

#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq, Serialize)]
pub enum CastlingSide {
    Kingside,
    Queenside,
}

#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq, Serialize)]
pub enum SanSuffix {
    Check,
    Checkmate,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum SanKind {
    Castle(CastlingSide),
    Normal {
        piece: PieceType,
        from_file: Option<usize>,
        from_rank: Option<usize>,
        capture: bool,
        target: Position,
        promotion: Option<PromotionPieces>,
    },
}

/// What a SAN token asks for, before looking at any board.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct SanIntent {
    pub kind: SanKind,
    pub suffix: Option<SanSuffix>,
}

fn file(input: &str) -> IResult<&str, usize> {
    map_opt(one_of("abcdefgh"), Position::file_from_char)(input)
}

fn rank(input: &str) -> IResult<&str, usize> {
    map_opt(one_of("12345678"), Position::rank_from_char)(input)
}

fn square(input: &str) -> IResult<&str, Position> {
    map(pair(file, rank), |(file, rank)| pos!(rank, file))(input)
}

fn capture(input: &str) -> IResult<&str, bool> {
    map(opt(char('x')), |marker| marker.is_some())(input)
}

fn castle(input: &str) -> IResult<&str, SanKind> {
    map(
        alt((
            value(CastlingSide::Queenside, alt((tag("O-O-O"), tag("0-0-0")))),
            value(CastlingSide::Kingside, alt((tag("O-O"), tag("0-0")))),
        )),
        SanKind::Castle,
    )(input)
}

fn piece_move(input: &str) -> IResult<&str, SanKind> {
    let (input, piece) = map_opt(one_of("NBRQK"), PieceType::try_from_san_char)(input)?;

    // Longest disambiguation first
    let (input, (from_file, from_rank, capture, target)) = alt((
        map(tuple((file, rank, capture, square)), |(f, r, x, t)| {
            (Some(f), Some(r), x, t)
        }),
        map(tuple((file, capture, square)), |(f, x, t)| (Some(f), None, x, t)),
        map(tuple((rank, capture, square)), |(r, x, t)| (None, Some(r), x, t)),
        map(pair(capture, square), |(x, t)| (None, None, x, t)),
    ))(input)?;

    Ok((
        input,
        SanKind::Normal {
            piece,
            from_file,
            from_rank,
            capture,
            target,
            promotion: None,
        },
    ))
}

fn pawn_move(input: &str) -> IResult<&str, SanKind> {
    let (input, (from_file, capture, target)) = alt((
        map(tuple((file, char('x'), square)), |(f, _, t)| (Some(f), true, t)),
        // A push never leaves its file
        map(square, |t| (Some(t.file), false, t)),
    ))(input)?;

    let (input, promotion) = opt(preceded(
        opt(char('=')),
        map_opt(one_of("NBRQ"), PromotionPieces::try_from_char),
    ))(input)?;

    Ok((
        input,
        SanKind::Normal {
            piece: PieceType::Pawn,
            from_file,
            from_rank: None,
            capture,
            target,
            promotion,
        },
    ))
}

fn suffix(input: &str) -> IResult<&str, Option<SanSuffix>> {
    opt(alt((
        value(SanSuffix::Checkmate, char('#')),
        value(SanSuffix::Check, char('+')),
    )))(input)
}

/// Parses a SAN move such as `Nbd2`, `exd8=Q+` or `O-O-O`. Annotation suffixes (`!`, `?`) must
/// have been removed already.
pub fn parse_san(san: &str) -> Option<SanIntent> {
    let result: IResult<&str, SanIntent> = all_consuming(map(
        pair(alt((castle, piece_move, pawn_move)), suffix),
        |(kind, suffix)| SanIntent { kind, suffix },
    ))(san);

    result.ok().map(|(_, intent)| intent)
}
