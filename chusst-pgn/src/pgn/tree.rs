use super::diagnostic::{DiagnosticKind, Diagnostics};
use super::error::{ErrorKind, PgnError};
use super::lexer::{GameResult, Spanned, Token};
use super::model::{Line, MoveNode};

/// Unvalidated movetext: the mainline with its nested variations and the termination marker.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MoveTree {
    pub mainline: Line,
    pub result: Option<GameResult>,
    pub result_offset: Option<usize>,
}

struct OpenLine {
    line: Line,
    // Comments waiting for the next move of this line
    pending_comments: Vec<String>,
    // Half-move index of the next move
    ply: u32,
    start: usize,
}

impl OpenLine {
    fn new(ply: u32, start: usize) -> Self {
        OpenLine {
            line: Line::default(),
            pending_comments: Vec::new(),
            ply,
            start,
        }
    }

    fn close(mut self) -> Line {
        self.line.comments.append(&mut self.pending_comments);
        self.line
    }
}

fn side_name(black: bool) -> &'static str {
    if black {
        "black"
    } else {
        "white"
    }
}

struct TreeBuilder<'a, 'd> {
    text: &'a str,
    diagnostics: &'d mut Diagnostics<'a>,
    // The mainline is at the bottom, the innermost open variation on top
    lines: Vec<OpenLine>,
    result: Option<(GameResult, usize)>,
}

impl<'a, 'd> TreeBuilder<'a, 'd> {
    fn error(&self, kind: ErrorKind, message: impl Into<String>, offset: usize) -> PgnError {
        PgnError::new(kind, message, self.text, offset)
    }

    fn current(&mut self) -> &mut OpenLine {
        // The mainline is never popped
        let last = self.lines.len() - 1;
        &mut self.lines[last]
    }

    fn after_result(&self, offset: usize) -> Result<(), PgnError> {
        match self.result {
            Some((result, _)) => Err(self.error(
                ErrorKind::UnexpectedResult,
                format!("movetext continues after the game result {}", result),
                offset,
            )),
            None => Ok(()),
        }
    }

    fn move_number(&mut self, number: u32, black: bool, offset: usize) {
        let ply = self.current().ply;
        let expected_number = ply / 2 + 1;
        let expected_black = ply % 2 == 1;

        if number != expected_number || black != expected_black {
            self.diagnostics.record(
                DiagnosticKind::MoveNumberMismatch,
                format!(
                    "move number {}{} found where {} move {} is expected",
                    number,
                    if black { "..." } else { "." },
                    side_name(expected_black),
                    expected_number
                ),
                offset,
            );
        }
    }

    fn san(&mut self, san: String, offset: usize) {
        let current = self.current();
        let mut node = MoveNode::new(&san, offset);
        node.comments_before.append(&mut current.pending_comments);
        current.line.moves.push(node);
        current.ply += 1;
    }

    fn comment(&mut self, comment: String) {
        let current = self.current();
        match current.line.moves.last_mut() {
            Some(node) => node.comments_after.push(comment),
            None => current.pending_comments.push(comment),
        }
    }

    fn nag(&mut self, nag: u32, offset: usize) {
        match self.current().line.moves.last_mut() {
            Some(node) => node.nags.push(nag),
            None => self.diagnostics.record(
                DiagnosticKind::DanglingAnnotation,
                format!("annotation ${} does not follow any move", nag),
                offset,
            ),
        }
    }

    fn variation_start(&mut self, offset: usize) -> Result<(), PgnError> {
        if self.current().line.moves.is_empty() {
            return Err(self.error(
                ErrorKind::UnexpectedToken,
                "variation does not follow any move",
                offset,
            ));
        }

        // Alternative to the last move: same ply
        let ply = self.current().ply - 1;
        self.lines.push(OpenLine::new(ply, offset));
        Ok(())
    }

    fn variation_end(&mut self, offset: usize) -> Result<(), PgnError> {
        if self.lines.len() < 2 {
            return Err(self.error(
                ErrorKind::UnbalancedVariation,
                "')' without a matching '('",
                offset,
            ));
        }

        let variation = match self.lines.pop() {
            Some(open) => open.close(),
            None => return Ok(()),
        };

        if let Some(node) = self.current().line.moves.last_mut() {
            node.variations.push(variation);
        }
        Ok(())
    }

    fn result(&mut self, result: GameResult, offset: usize) -> Result<(), PgnError> {
        if self.lines.len() > 1 {
            return Err(self.error(
                ErrorKind::UnexpectedResult,
                format!("game result {} inside a variation", result),
                offset,
            ));
        }

        match self.result {
            Some((previous, _)) if previous != result => Err(self.error(
                ErrorKind::UnexpectedResult,
                format!("second game result {} contradicts {}", result, previous),
                offset,
            )),
            Some(_) => Ok(()),
            None => {
                self.result = Some((result, offset));
                Ok(())
            }
        }
    }

    fn token(&mut self, spanned: Spanned) -> Result<(), PgnError> {
        let Spanned { token, offset } = spanned;

        match token {
            Token::MoveNumber { number, black } => {
                self.after_result(offset)?;
                self.move_number(number, black, offset);
            }
            Token::San(san) => {
                self.after_result(offset)?;
                self.san(san, offset);
            }
            Token::BraceComment(comment) | Token::LineComment(comment) => self.comment(comment),
            Token::VariationStart => {
                self.after_result(offset)?;
                self.variation_start(offset)?;
            }
            Token::VariationEnd => self.variation_end(offset)?,
            Token::Nag(nag) => self.nag(nag, offset),
            Token::Result(result) => self.result(result, offset)?,
        }

        Ok(())
    }

    fn finish(mut self) -> Result<MoveTree, PgnError> {
        if self.lines.len() > 1 {
            let start = self.current().start;
            return Err(self.error(
                ErrorKind::UnbalancedVariation,
                "variation opened here is never closed",
                start,
            ));
        }

        let mainline = match self.lines.pop() {
            Some(open) => open.close(),
            None => Line::default(),
        };

        Ok(MoveTree {
            mainline,
            result: self.result.map(|(result, _)| result),
            result_offset: self.result.map(|(_, offset)| offset),
        })
    }
}

/// Builds the variation tree from a token stream.
///
/// `initial_ply` is the half-move index of the first move, used to check the printed move
/// numbers.
pub(crate) fn build_tree<'a>(
    tokens: impl Iterator<Item = Result<Spanned, PgnError>>,
    text: &'a str,
    initial_ply: u32,
    diagnostics: &mut Diagnostics<'a>,
) -> Result<MoveTree, PgnError> {
    let mut builder = TreeBuilder {
        text,
        diagnostics,
        lines: vec![OpenLine::new(initial_ply, 0)],
        result: None,
    };

    for spanned in tokens {
        builder.token(spanned?)?;
    }

    builder.finish()
}
