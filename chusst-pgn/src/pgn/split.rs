use super::lexer::GameResult;

/// One game's slice of a multi-game text.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct GameSource<'a> {
    pub text: &'a str,
    /// Byte offset of `text` in the whole input.
    pub offset: usize,
}

fn is_result(word: &str) -> bool {
    GameResult::try_from_str(word).is_some()
}

// Brace depth after scanning a movetext line, and whether a result marker appeared outside
// comments
fn scan_line(line: &str, mut depth: usize) -> (usize, bool) {
    let mut has_result = false;
    let mut word_start = None;
    let mut chars = line.char_indices();

    while let Some((index, c)) = chars.next() {
        if depth > 0 {
            match c {
                '\\' if matches!(chars.clone().next(), Some((_, '{' | '}'))) => {
                    chars.next();
                }
                '{' => depth += 1,
                '}' => depth -= 1,
                _ => (),
            }
            continue;
        }

        if c.is_whitespace() || matches!(c, '{' | '}' | '(' | ')' | ';' | '$') {
            if let Some(start) = word_start.take() {
                has_result |= is_result(&line[start..index]);
            }
        } else if word_start.is_none() {
            word_start = Some(index);
        }

        match c {
            ';' => return (depth, has_result),
            '{' => depth += 1,
            _ => (),
        }
    }
    if let Some(start) = word_start {
        has_result |= is_result(&line[start..]);
    }

    (depth, has_result)
}

/// Cuts a text holding several games into one slice per game.
///
/// A game ends where a tag line follows its movetext, or at the first line after a blank line
/// that follows its result marker. Neither counts inside an open brace comment. Slices holding
/// only whitespace are dropped.
pub fn split_games(text: &str) -> Vec<GameSource<'_>> {
    let mut games = Vec::new();
    let mut game_start = 0;
    let mut line_offset = 0;
    let mut in_movetext = false;
    let mut depth = 0;
    // Result marker seen, then a blank line after it
    let mut has_result = false;
    let mut finished = false;

    for line in text.split_inclusive('\n') {
        let trimmed = line.trim_start();

        if trimmed.is_empty() {
            finished |= has_result && depth == 0;
            line_offset += line.len();
            continue;
        }
        if line.starts_with('%') {
            line_offset += line.len();
            continue;
        }

        let new_game = depth == 0 && ((in_movetext && trimmed.starts_with('[')) || finished);
        if new_game {
            games.push(GameSource {
                text: &text[game_start..line_offset],
                offset: game_start,
            });
            game_start = line_offset;
            in_movetext = false;
            has_result = false;
            finished = false;
        }

        let header_line =
            depth == 0 && !in_movetext && (trimmed.starts_with('[') || trimmed.starts_with(';'));
        if !header_line {
            in_movetext = true;
            let (line_depth, line_result) = scan_line(line, depth);
            depth = line_depth;
            has_result |= line_result;
        }

        line_offset += line.len();
    }

    games.push(GameSource {
        text: &text[game_start..],
        offset: game_start,
    });

    games.retain(|game| !game.text.trim().is_empty());
    games
}
