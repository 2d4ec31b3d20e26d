use super::*;
use crate::board::{PieceType, Position};
use crate::game::PromotionPieces;
use crate::pos;

fn tokens(text: &str) -> Vec<Token> {
    Lexer::new(text)
        .map(|spanned| spanned.map(|spanned| spanned.token))
        .collect::<Result<Vec<Token>, PgnError>>()
        .unwrap_or_else(|err| panic!("lexing {:?} failed: {}", text, err))
}

fn lex_error(text: &str) -> PgnError {
    match Lexer::new(text).find_map(Result::err) {
        Some(err) => err,
        None => panic!("lexing {:?} did not fail", text),
    }
}

fn san(text: &str) -> Token {
    Token::San(text.to_string())
}

fn number(number: u32, black: bool) -> Token {
    Token::MoveNumber { number, black }
}

#[test]
fn lexer_basic_movetext() {
    assert_eq!(
        tokens("1. e4 e5 2.Nf3 2... Nc6 1-0"),
        vec![
            number(1, false),
            san("e4"),
            san("e5"),
            number(2, false),
            san("Nf3"),
            number(2, true),
            san("Nc6"),
            Token::Result(GameResult::WhiteWin),
        ]
    );
}

#[test]
fn lexer_castling_with_zeros_is_a_move() {
    assert_eq!(
        tokens("5. 0-0 0-0-0 *"),
        vec![
            number(5, false),
            san("0-0"),
            san("0-0-0"),
            Token::Result(GameResult::Unknown)
        ]
    );
}

#[test]
fn lexer_comments_and_annotations() {
    assert_eq!(
        tokens("1. e4!? $14 {best by test} e5 ; the answer\n2. Nf3?!"),
        vec![
            number(1, false),
            san("e4"),
            Token::Nag(5),
            Token::Nag(14),
            Token::BraceComment("best by test".to_string()),
            san("e5"),
            Token::LineComment("the answer".to_string()),
            number(2, false),
            san("Nf3"),
            Token::Nag(6),
        ]
    );
}

#[test]
fn lexer_nested_and_escaped_braces() {
    assert_eq!(
        tokens(r"{outer {inner} (not a variation) \} done} e4"),
        vec![
            Token::BraceComment("outer {inner} (not a variation) } done".to_string()),
            san("e4"),
        ]
    );
}

#[test]
fn lexer_variations() {
    assert_eq!(
        tokens("1. e4 (1. d4 d5 (1... Nf6)) e5"),
        vec![
            number(1, false),
            san("e4"),
            Token::VariationStart,
            number(1, false),
            san("d4"),
            san("d5"),
            Token::VariationStart,
            number(1, true),
            san("Nf6"),
            Token::VariationEnd,
            Token::VariationEnd,
            san("e5"),
        ]
    );
}

#[test]
fn lexer_skips_escape_lines() {
    assert_eq!(
        tokens("%evil data ( {\n1. e4 %not an escape\n"),
        vec![number(1, false), san("e4"), san("%not"), san("an"), san("escape")]
    );
}

#[test]
fn lexer_unterminated_comment() {
    let err = lex_error("1. e4 {opening");
    assert_eq!(err.kind, ErrorKind::UnterminatedComment);
    assert_eq!(err.location.offset, 6);
}

#[test]
fn lexer_unbalanced_variations() {
    let err = lex_error("1. e4 (1. d4 (1. c4) e5");
    assert_eq!(err.kind, ErrorKind::UnbalancedVariation);
    assert_eq!(err.location.offset, 6);

    let err = lex_error("1. e4 ) e5");
    assert_eq!(err.kind, ErrorKind::UnbalancedVariation);
    assert_eq!(err.location.offset, 6);
}

#[test]
fn lexer_unexpected_tokens() {
    assert_eq!(lex_error("1. e4 } e5").kind, ErrorKind::UnexpectedToken);
    assert_eq!(lex_error("1. e4 $ e5").kind, ErrorKind::UnexpectedToken);
    assert_eq!(lex_error("1. e4!!? e5").kind, ErrorKind::UnexpectedToken);
    assert_eq!(lex_error("1. e4 [Event \"x\"]").kind, ErrorKind::UnexpectedToken);
}

#[test]
fn lexer_stops_after_error() {
    let mut lexer = Lexer::new("} e4");
    assert!(matches!(lexer.next(), Some(Err(_))));
    assert!(lexer.next().is_none());
}

#[test]
fn lexer_variation_balance() {
    let text = "1. e4 (1. d4 {a (b} d5 (1... Nf6 2. c4) 2. c4) (1. c4) e5 2. Nf3 (2. f4 exf4) *";
    let mut depth = 0i32;
    for token in tokens(text) {
        match token {
            Token::VariationStart => depth += 1,
            Token::VariationEnd => depth -= 1,
            _ => (),
        }
        assert!(depth >= 0);
    }
    assert_eq!(depth, 0);
}

#[test]
fn lexer_token_budget() {
    let options = ParseOptions {
        max_tokens: Some(3),
        ..Default::default()
    };
    let results: Vec<_> = Lexer::with_options("1. e4 e5 2. Nf3", 0, &options, ()).collect();

    assert_eq!(results.len(), 4);
    assert!(results[..3].iter().all(Result::is_ok));
    assert!(matches!(&results[3], Err(err) if err.kind == ErrorKind::Cancelled));
}

#[test]
fn lexer_stop_signal() {
    let stop = std::sync::atomic::AtomicBool::new(true);
    let mut lexer = Lexer::with_options("1. e4", 0, &ParseOptions::default(), &stop);

    assert!(matches!(lexer.next(), Some(Err(err)) if err.kind == ErrorKind::Cancelled));
}

struct StopAfter(usize);

impl HasStopSignal for StopAfter {
    fn stop(&mut self) -> bool {
        if self.0 == 0 {
            return true;
        }
        self.0 -= 1;
        false
    }
}

#[test]
fn lexer_stop_signal_inside_comment() {
    let text = format!("1. e4 {{{}", "x".repeat(20_000));

    // The signal turns on while the comment is being scanned
    let mut lexer = Lexer::with_options(&text, 0, &ParseOptions::default(), StopAfter(4));
    let err = lexer.find_map(Result::err).unwrap();
    assert_eq!(err.kind, ErrorKind::Cancelled);
    assert_eq!(err.location.offset, 6);

    assert_eq!(lex_error(&text).kind, ErrorKind::UnterminatedComment);
}

#[test]
fn tags_parse() {
    let tags = parse_tags(
        "[Event \"F/S Return Match\"]\n[Site \"Belgrade\"] [Round \"29\"]\n\n1. e4 *",
    )
    .unwrap();

    assert_eq!(tags.len(), 3);
    assert_eq!(tags.get("Event"), Some("F/S Return Match"));
    assert_eq!(tags.get("Round"), Some("29"));
    assert_eq!(tags.get_pair("Round").map(|pair| pair.offset), Some(45));
    assert_eq!(tags.get("White"), None);
}

#[test]
fn tags_unescape_and_unicode() {
    let tags = parse_tags(r#"[Annotator "Ni\"ls \\ Åström"] [Empty ""]"#).unwrap();

    assert_eq!(tags.get("Annotator"), Some(r#"Ni"ls \ Åström"#));
    assert_eq!(tags.get("Empty"), Some(""));
}

#[test]
fn tags_round_trip() {
    let tags = parse_tags(
        r#"[Event "Quote \" and backslash \\"]
[White "Åström, Nils"]
[Result "*"]"#,
    )
    .unwrap();

    let serialized = tags.to_pgn();
    assert_eq!(parse_tags(&serialized).unwrap(), tags);
    assert_eq!(
        TagPair::new("Event", r#"a "b" \c"#).to_pgn(),
        r#"[Event "a \"b\" \\c"]"#
    );
}

#[test]
fn tags_malformed() {
    let err = parse_tags("[Event missing-quotes]").unwrap_err();
    assert_eq!(err.kind, ErrorKind::MalformedTag);
    assert_eq!(
        err.location,
        Location {
            offset: 7,
            line: 1,
            column: 8
        }
    );

    let err = parse_tags("[Event \"ok\"]\n[Site \"Belgrade\" extra]").unwrap_err();
    assert_eq!(err.kind, ErrorKind::MalformedTag);
    assert_eq!(err.location.line, 2);
    assert_eq!(err.location.column, 18);

    assert_eq!(
        parse_tags("[Event \"never closed]").unwrap_err().kind,
        ErrorKind::MalformedTag
    );
}

#[test]
fn tags_duplicate_last_wins() {
    let game = parse_game(
        "[Event \"first\"]\n[Site \"x\"]\n[Event \"second\"]\n\n*",
        &ParseOptions::default(),
    )
    .unwrap();

    assert_eq!(game.tags.get("Event"), Some("second"));
    assert_eq!(game.tags.iter().next().map(|pair| pair.name.as_str()), Some("Event"));
    assert_eq!(game.diagnostics.len(), 1);
    assert_eq!(game.diagnostics[0].kind, DiagnosticKind::DuplicateTag);
    assert_eq!(game.diagnostics[0].location.line, 3);
}

#[test]
fn san_intents() {
    assert_eq!(
        parse_san("Nbd2"),
        Some(SanIntent {
            kind: SanKind::Normal {
                piece: PieceType::Knight,
                from_file: Some(1),
                from_rank: None,
                capture: false,
                target: pos!(d2),
                promotion: None,
            },
            suffix: None,
        })
    );
    assert_eq!(
        parse_san("R1xa3+"),
        Some(SanIntent {
            kind: SanKind::Normal {
                piece: PieceType::Rook,
                from_file: None,
                from_rank: Some(0),
                capture: true,
                target: pos!(a3),
                promotion: None,
            },
            suffix: Some(SanSuffix::Check),
        })
    );
    assert_eq!(
        parse_san("exd8=Q#"),
        Some(SanIntent {
            kind: SanKind::Normal {
                piece: PieceType::Pawn,
                from_file: Some(4),
                from_rank: None,
                capture: true,
                target: pos!(d8),
                promotion: Some(PromotionPieces::Queen),
            },
            suffix: Some(SanSuffix::Checkmate),
        })
    );
    assert_eq!(
        parse_san("Qh4e1"),
        Some(SanIntent {
            kind: SanKind::Normal {
                piece: PieceType::Queen,
                from_file: Some(7),
                from_rank: Some(3),
                capture: false,
                target: Position { rank: 0, file: 4 },
                promotion: None,
            },
            suffix: None,
        })
    );
    assert_eq!(
        parse_san("d5").map(|intent| intent.kind),
        Some(SanKind::Normal {
            piece: PieceType::Pawn,
            from_file: Some(3),
            from_rank: None,
            capture: false,
            target: pos!(d5),
            promotion: None,
        })
    );
    assert_eq!(
        parse_san("O-O-O").map(|intent| intent.kind),
        Some(SanKind::Castle(CastlingSide::Queenside))
    );
    assert_eq!(
        parse_san("0-0+").map(|intent| intent.kind),
        Some(SanKind::Castle(CastlingSide::Kingside))
    );
}

#[test]
fn san_rejects_garbage() {
    for text in ["", "e9", "Zf3", "Nf3x", "e4e5", "O-O-O-O", "exd", "--"] {
        assert_eq!(parse_san(text), None, "{} should not parse", text);
    }
}

#[test]
fn tree_variations_and_comments() {
    let tree = parse_movetext(
        "{start} 1. e4 {king pawn} $1 (1. d4 {queen pawn} (1. c4)) 1... e5 2. Nf3 *",
        &ParseOptions::default(),
    )
    .unwrap();

    let mainline = &tree.mainline;
    assert_eq!(tree.result, Some(GameResult::Unknown));
    assert_eq!(mainline.len(), 3);

    let e4 = &mainline.moves[0];
    assert_eq!(e4.san, "e4");
    assert_eq!(e4.comments_before, vec!["start".to_string()]);
    assert_eq!(e4.comments_after, vec!["king pawn".to_string()]);
    assert_eq!(e4.nags, vec![1]);
    assert_eq!(e4.variations.len(), 1);

    let d4 = &e4.variations[0].moves[0];
    assert_eq!(d4.san, "d4");
    assert_eq!(d4.comments_after, vec!["queen pawn".to_string()]);
    assert_eq!(d4.variations[0].moves[0].san, "c4");

    assert!(mainline.moves[1].variations.is_empty());
}

#[test]
fn tree_structural_errors() {
    let options = ParseOptions::default();

    let err = parse_movetext("(1. d4) 1. e4", &options).unwrap_err();
    assert_eq!(err.kind, ErrorKind::UnexpectedToken);

    let err = parse_movetext("1. e4 (1. d4 1-0) e5", &options).unwrap_err();
    assert_eq!(err.kind, ErrorKind::UnexpectedResult);

    let err = parse_movetext("1. e4 e5 1-0 0-1", &options).unwrap_err();
    assert_eq!(err.kind, ErrorKind::UnexpectedResult);

    let err = parse_movetext("1. e4 1-0 e5", &options).unwrap_err();
    assert_eq!(err.kind, ErrorKind::UnexpectedResult);

    let tree = parse_movetext("1. e4 1-0 {annotator's note} 1-0", &options).unwrap();
    assert_eq!(tree.result, Some(GameResult::WhiteWin));
    assert_eq!(
        tree.mainline.moves[0].comments_after,
        vec!["annotator's note".to_string()]
    );
}

#[test]
fn tree_move_number_diagnostics() {
    let game = parse_game("1. e4 e5 3. Nf3 3... Nc6 *", &ParseOptions::default()).unwrap();
    let mismatches = game
        .diagnostics
        .iter()
        .filter(|diagnostic| diagnostic.kind == DiagnosticKind::MoveNumberMismatch)
        .count();

    assert_eq!(mismatches, 2);
    assert_eq!(game.plies(), 4);
}

#[test]
fn tree_dangling_annotation() {
    let game = parse_game("$2 1. e4 *", &ParseOptions::default()).unwrap();
    assert_eq!(game.diagnostics.len(), 1);
    assert_eq!(game.diagnostics[0].kind, DiagnosticKind::DanglingAnnotation);
}

#[test]
fn split_multiple_games() {
    let text = "[Event \"a\"]\n\n1. e4 e5 *\n\n[Event \"b\"]\n[Site \"c\"]\n\n1. d4 {\n[Not \"a tag\"]\n} d5 *\n";
    let games = split_games(text);

    assert_eq!(games.len(), 2);
    assert_eq!(games[0].offset, 0);
    assert_eq!(games[0].text, "[Event \"a\"]\n\n1. e4 e5 *\n\n");
    assert_eq!(games[1].offset, 25);
    assert!(games[1].text.contains("[Not \"a tag\"]"));
}

#[test]
fn split_games_without_tags() {
    assert_eq!(split_games("1. e4 *\n").len(), 1);
    assert!(split_games("  \n\n").is_empty());
}

#[test]
fn split_games_after_result_and_blank_line() {
    let text = "1. e4 e5 1-0\n\n1. d4 d5 0-1\n";
    let games = split_games(text);

    assert_eq!(games.len(), 2);
    assert_eq!(games[0].text, "1. e4 e5 1-0\n\n");
    assert_eq!(games[1].offset, 14);
    assert_eq!(games[1].text, "1. d4 d5 0-1\n");

    let parsed = parse_games(text, &ParseOptions::default());
    assert_eq!(parsed.len(), 2);
    let results: Vec<Option<GameResult>> = parsed
        .iter()
        .map(|game| game.as_ref().unwrap().result)
        .collect();
    assert_eq!(results, vec![Some(GameResult::WhiteWin), Some(GameResult::BlackWin)]);
    assert_eq!(parsed[1].as_ref().unwrap().moves.moves[0].offset, 17);
}

#[test]
fn split_ignores_results_in_comments() {
    assert_eq!(split_games("1. e4 {1-0\n\nstill a comment} e5 *\n").len(), 1);
    assert_eq!(split_games("1. e4 ; 1-0\n\ne5 *\n").len(), 1);
    assert_eq!(split_games("1. e4 e5 1-0\n{a note}\n").len(), 1);
}

#[test]
fn pawn_push_is_not_a_capture() {
    let text = "1. e4 d5 2. d5 *";
    let err = parse_game(text, &ParseOptions::default()).unwrap_err();
    assert_eq!(err.kind, ErrorKind::IllegalMove);
    assert_eq!(err.location.offset, 12);

    let game = parse_game("1. e4 d5 2. exd5 *", &ParseOptions::default()).unwrap();
    let resolved = game.moves.moves[2].resolved.as_ref().unwrap();
    assert_eq!(resolved.source, pos!(e4));
    assert!(game.diagnostics.is_empty());
}

#[test]
fn location_from_offset() {
    let text = "ab\ncdé\nf";
    assert_eq!(
        Location::from_offset(text, 0),
        Location {
            offset: 0,
            line: 1,
            column: 1
        }
    );
    assert_eq!(
        Location::from_offset(text, 8),
        Location {
            offset: 8,
            line: 3,
            column: 1
        }
    );
    assert_eq!(Location::from_offset(text, 7).column, 4);
    assert_eq!(Location::from_offset(text, 100).offset, text.len());
}

#[test]
fn error_kind_names() {
    assert_eq!(ErrorKind::MalformedTag.to_string(), "MalformedTagError");
    assert_eq!(ErrorKind::Cancelled.to_string(), "CancelledError");

    let err = PgnError::new(ErrorKind::IllegalMove, "Qh5 is not legal", "1. e4 e5 2. Qh5", 12);
    assert_eq!(
        err.to_string(),
        "IllegalMoveError at line 1, column 13: Qh5 is not legal"
    );
}

#[test]
fn options_from_json() {
    let options: ParseOptions =
        serde_json::from_str(r#"{"variation_errors": "abort_game", "max_tokens": 10}"#).unwrap();

    assert_eq!(options.variation_errors, VariationErrorPolicy::AbortGame);
    assert_eq!(options.max_tokens, Some(10));
    assert!(options.validate_variations);
    assert_eq!(options.time_limit_ms, None);
}
