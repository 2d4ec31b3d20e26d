use super::error::Location;

use serde::Serialize;
use std::fmt;
use tracing::warn;

#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq, Serialize)]
pub enum DiagnosticKind {
    DuplicateTag,
    MoveNumberMismatch,
    CheckSuffixMismatch,
    CaptureMarkerMissing,
    ResultTagMismatch,
    VariationAborted,
    DanglingAnnotation,
}

/// A problem found in the input that did not stop the game from being parsed.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub message: String,
    pub location: Location,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?} at {}: {}", self.kind, self.location, self.message)
    }
}

pub(crate) struct Diagnostics<'a> {
    text: &'a str,
    items: Vec<Diagnostic>,
}

impl<'a> Diagnostics<'a> {
    pub(crate) fn new(text: &'a str) -> Self {
        Diagnostics {
            text,
            items: Vec::new(),
        }
    }

    pub(crate) fn record(&mut self, kind: DiagnosticKind, message: impl Into<String>, offset: usize) {
        self.push(Diagnostic {
            kind,
            message: message.into(),
            location: Location::from_offset(self.text, offset),
        });
    }

    pub(crate) fn push(&mut self, diagnostic: Diagnostic) {
        warn!(
            kind = ?diagnostic.kind,
            line = diagnostic.location.line,
            column = diagnostic.location.column,
            "{}",
            diagnostic.message
        );
        self.items.push(diagnostic);
    }

    pub(crate) fn into_vec(self) -> Vec<Diagnostic> {
        self.items
    }
}
