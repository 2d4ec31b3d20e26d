use super::error::{ErrorKind, PgnError};
use super::options::{Budget, HasStopSignal, ParseOptions};

use serde::Serialize;
use std::collections::VecDeque;
use std::fmt;
use tracing::trace;

#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq, Serialize)]
pub enum GameResult {
    WhiteWin,
    BlackWin,
    Draw,
    Unknown,
}

impl GameResult {
    pub fn try_from_str(value: &str) -> Option<GameResult> {
        match value {
            "1-0" => Some(GameResult::WhiteWin),
            "0-1" => Some(GameResult::BlackWin),
            "1/2-1/2" => Some(GameResult::Draw),
            "*" => Some(GameResult::Unknown),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GameResult::WhiteWin => "1-0",
            GameResult::BlackWin => "0-1",
            GameResult::Draw => "1/2-1/2",
            GameResult::Unknown => "*",
        }
    }
}

impl fmt::Display for GameResult {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub enum Token {
    /// `12.` or `12...`, the latter announcing a black move.
    MoveNumber { number: u32, black: bool },
    San(String),
    BraceComment(String),
    LineComment(String),
    VariationStart,
    VariationEnd,
    Nag(u32),
    Result(GameResult),
}

/// A token and the byte offset where it starts.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Spanned {
    pub token: Token,
    pub offset: usize,
}

// Move suffixes and the glyphs they stand for
const SUFFIX_ANNOTATIONS: [(&str, u32); 6] = [
    ("!", 1),
    ("?", 2),
    ("!!", 3),
    ("??", 4),
    ("!?", 5),
    ("?!", 6),
];

// Characters scanned inside a comment between two cancellation checks
const COMMENT_CHECK_INTERVAL: usize = 4096;

fn is_delimiter(c: char) -> bool {
    c.is_whitespace() || matches!(c, '{' | '}' | '(' | ')' | ';' | '$')
}

/// Splits movetext into tokens.
///
/// Brace comments nest and accept `\{` and `\}` as literal braces. Parentheses are only counted
/// outside comments. The lexer stops at the first error; iterating again after that yields
/// `None`.
#[derive(Clone)]
pub struct Lexer<'a, S: HasStopSignal = ()> {
    text: &'a str,
    position: usize,
    open_variations: Vec<usize>,
    pending: VecDeque<Spanned>,
    budget: Budget,
    signal: S,
    finished: bool,
}

impl<'a> Lexer<'a, ()> {
    pub fn new(text: &'a str) -> Self {
        Lexer::with_options(text, 0, &ParseOptions::default(), ())
    }
}

impl<'a, S: HasStopSignal> Lexer<'a, S> {
    /// Lexes `text` from byte `start` on. Offsets in tokens and errors refer to the whole `text`.
    pub fn with_options(text: &'a str, start: usize, options: &ParseOptions, signal: S) -> Self {
        Lexer {
            text,
            position: start.min(text.len()),
            open_variations: Vec::new(),
            pending: VecDeque::new(),
            budget: Budget::new(options),
            signal,
            finished: false,
        }
    }

    /// Tokens produced so far.
    pub fn token_count(&self) -> usize {
        self.budget.tokens()
    }

    fn error(&self, kind: ErrorKind, message: impl Into<String>, offset: usize) -> PgnError {
        PgnError::new(kind, message, self.text, offset)
    }

    fn rest(&self) -> &'a str {
        &self.text[self.position..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn at_line_start(&self) -> bool {
        self.position == 0 || self.text[..self.position].ends_with('\n')
    }

    // Whitespace and `%` escape lines
    fn skip_ignored(&mut self) {
        loop {
            let rest = self.rest();
            let trimmed = rest.trim_start();
            self.position += rest.len() - trimmed.len();

            if self.peek() == Some('%') && self.at_line_start() {
                self.skip_line();
            } else {
                break;
            }
        }
    }

    fn skip_line(&mut self) -> &'a str {
        let rest = self.rest();
        let line = match rest.find('\n') {
            Some(end) => &rest[..end],
            None => rest,
        };
        self.position += line.len();
        line
    }

    fn check_signal(&mut self, offset: usize) -> Result<(), PgnError> {
        if self.budget.stop() || self.signal.stop() {
            return Err(self.error(
                ErrorKind::Cancelled,
                format!("parsing stopped after {} tokens", self.budget.tokens()),
                offset,
            ));
        }
        Ok(())
    }

    fn brace_comment(&mut self) -> Result<Token, PgnError> {
        let start = self.position;
        let mut depth = 0usize;
        let mut comment = String::new();
        let mut chars = self.rest().char_indices().peekable();
        let mut scanned = 0usize;

        while let Some((index, c)) = chars.next() {
            scanned += 1;
            if scanned % COMMENT_CHECK_INTERVAL == 0
                && (self.budget.expired() || self.signal.stop())
            {
                return Err(self.error(
                    ErrorKind::Cancelled,
                    format!("parsing stopped inside a comment after {} characters", scanned),
                    start,
                ));
            }

            match c {
                '\\' if matches!(chars.peek(), Some((_, '{' | '}'))) => {
                    if let Some((_, escaped)) = chars.next() {
                        comment.push(escaped);
                    }
                }
                '{' => {
                    if depth > 0 {
                        comment.push(c);
                    }
                    depth += 1;
                }
                '}' => {
                    depth -= 1;
                    if depth == 0 {
                        self.position = start + index + c.len_utf8();
                        return Ok(Token::BraceComment(comment.trim().to_string()));
                    }
                    comment.push(c);
                }
                _ => comment.push(c),
            }
        }

        Err(self.error(
            ErrorKind::UnterminatedComment,
            "comment opened here is never closed",
            start,
        ))
    }

    fn nag(&mut self) -> Result<Token, PgnError> {
        let start = self.position;
        let digits = self.rest()[1..]
            .chars()
            .take_while(|c| c.is_ascii_digit())
            .count();

        let value = self.rest()[1..1 + digits].parse::<u32>().map_err(|_| {
            self.error(
                ErrorKind::UnexpectedToken,
                "'$' must be followed by a glyph number",
                start,
            )
        })?;

        self.position += 1 + digits;
        Ok(Token::Nag(value))
    }

    // Classifies a whitespace-delimited word, queueing the extra tokens glued to it
    fn word(&mut self) -> Result<(), PgnError> {
        let start = self.position;
        let length = self
            .rest()
            .find(is_delimiter)
            .unwrap_or_else(|| self.rest().len());
        let word = &self.rest()[..length];
        self.position += length;

        if let Some(result) = GameResult::try_from_str(word) {
            self.queue(Token::Result(result), start);
            return Ok(());
        }

        if word.starts_with('[') {
            return Err(self.error(
                ErrorKind::UnexpectedToken,
                "tag pair found inside movetext",
                start,
            ));
        }

        let mut san = word;
        let mut san_offset = start;

        let digits = word.chars().take_while(|c| c.is_ascii_digit()).count();
        let dots = word[digits..].chars().take_while(|c| *c == '.').count();

        // Move numbers, except castling written with zeros
        if digits > 0 && (dots > 0 || digits == word.len()) {
            let number = word[..digits].parse::<u32>().map_err(|_| {
                self.error(ErrorKind::UnexpectedToken, "move number out of range", start)
            })?;
            self.queue(
                Token::MoveNumber {
                    number,
                    black: dots >= 2,
                },
                start,
            );

            san = &word[digits + dots..];
            san_offset = start + digits + dots;
        }

        if san.is_empty() {
            return Ok(());
        }

        let suffix_start = san.find(|c| c == '!' || c == '?').unwrap_or(san.len());
        let (mv, suffix) = san.split_at(suffix_start);

        if !mv.is_empty() {
            self.queue(Token::San(mv.to_string()), san_offset);
        }

        if !suffix.is_empty() {
            let Some((_, glyph)) = SUFFIX_ANNOTATIONS
                .iter()
                .find(|(annotation, _)| *annotation == suffix)
            else {
                return Err(self.error(
                    ErrorKind::UnexpectedToken,
                    format!("unknown move annotation '{}'", suffix),
                    san_offset + suffix_start,
                ));
            };
            self.queue(Token::Nag(*glyph), san_offset + suffix_start);
        }

        Ok(())
    }

    fn queue(&mut self, token: Token, offset: usize) {
        self.pending.push_back(Spanned { token, offset });
    }

    fn scan(&mut self) -> Result<Option<Spanned>, PgnError> {
        if let Some(spanned) = self.pending.pop_front() {
            self.check_signal(spanned.offset)?;
            return Ok(Some(spanned));
        }

        self.skip_ignored();

        let Some(c) = self.peek() else {
            if let Some(open) = self.open_variations.last() {
                return Err(self.error(
                    ErrorKind::UnbalancedVariation,
                    "variation opened here is never closed",
                    *open,
                ));
            }
            return Ok(None);
        };

        let start = self.position;
        self.check_signal(start)?;

        let token = match c {
            '{' => self.brace_comment()?,
            '}' => {
                return Err(self.error(
                    ErrorKind::UnexpectedToken,
                    "'}' outside of a comment",
                    start,
                ))
            }
            ';' => {
                let line = self.skip_line();
                Token::LineComment(line[1..].trim().to_string())
            }
            '(' => {
                self.position += 1;
                self.open_variations.push(start);
                Token::VariationStart
            }
            ')' => {
                if self.open_variations.pop().is_none() {
                    return Err(self.error(
                        ErrorKind::UnbalancedVariation,
                        "')' without a matching '('",
                        start,
                    ));
                }
                self.position += 1;
                Token::VariationEnd
            }
            '$' => self.nag()?,
            _ => {
                self.word()?;
                // A word always queues at least one token
                return match self.pending.pop_front() {
                    Some(spanned) => Ok(Some(spanned)),
                    None => self.scan(),
                };
            }
        };

        Ok(Some(Spanned {
            token,
            offset: start,
        }))
    }
}

impl<'a, S: HasStopSignal> Iterator for Lexer<'a, S> {
    type Item = Result<Spanned, PgnError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        match self.scan() {
            Ok(Some(spanned)) => {
                trace!(token = ?spanned.token, offset = spanned.offset, "token");
                Some(Ok(spanned))
            }
            Ok(None) => {
                self.finished = true;
                None
            }
            Err(err) => {
                self.finished = true;
                Some(Err(err))
            }
        }
    }
}
