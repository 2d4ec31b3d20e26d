use serde::Serialize;
use std::fmt;
use thiserror::Error;

#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq, Serialize)]
pub enum ErrorKind {
    MalformedTag,
    UnterminatedComment,
    UnbalancedVariation,
    UnexpectedResult,
    AmbiguousMove,
    IllegalMove,
    Cancelled,
    InvalidFen,
    UnexpectedToken,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                ErrorKind::MalformedTag => "MalformedTagError",
                ErrorKind::UnterminatedComment => "UnterminatedCommentError",
                ErrorKind::UnbalancedVariation => "UnbalancedVariationError",
                ErrorKind::UnexpectedResult => "UnexpectedResultError",
                ErrorKind::AmbiguousMove => "AmbiguousMoveError",
                ErrorKind::IllegalMove => "IllegalMoveError",
                ErrorKind::Cancelled => "CancelledError",
                ErrorKind::InvalidFen => "InvalidFenError",
                ErrorKind::UnexpectedToken => "UnexpectedTokenError",
            }
        )
    }
}

/// Byte offset into the parsed text, with the 1-based line and column it falls on.
#[derive(Copy, Clone, Debug, Default, Eq, Hash, PartialEq, Serialize)]
pub struct Location {
    pub offset: usize,
    pub line: usize,
    pub column: usize,
}

impl Location {
    pub fn from_offset(text: &str, offset: usize) -> Location {
        let mut offset = offset.min(text.len());
        while !text.is_char_boundary(offset) {
            offset -= 1;
        }

        let before = &text[..offset];
        let line_start = before.rfind('\n').map_or(0, |index| index + 1);

        Location {
            offset,
            line: before.matches('\n').count() + 1,
            column: before[line_start..].chars().count() + 1,
        }
    }

    // Offsets relative to a slice starting at `base` of `full_text`
    pub(crate) fn rebase(&self, full_text: &str, base: usize) -> Location {
        Location::from_offset(full_text, base + self.offset)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Error, Serialize)]
#[error("{kind} at {location}: {message}")]
pub struct PgnError {
    pub kind: ErrorKind,
    pub message: String,
    pub location: Location,
}

impl PgnError {
    pub fn new(kind: ErrorKind, message: impl Into<String>, text: &str, offset: usize) -> Self {
        PgnError {
            kind,
            message: message.into(),
            location: Location::from_offset(text, offset),
        }
    }

    pub(crate) fn rebase(self, full_text: &str, base: usize) -> Self {
        PgnError {
            location: self.location.rebase(full_text, base),
            ..self
        }
    }
}
