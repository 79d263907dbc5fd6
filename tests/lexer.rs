use test_case::test_case;

use triangle::{
    ast::Op,
    error::Error,
    lexer::{ErrorKind, TokenKind},
};

mod common;

fn kinds_and_offsets(source: &str) -> Vec<(TokenKind, u32)> {
    common::scan_str(source)
        .unwrap()
        .into_iter()
        .map(|token| (token.kind, token.span.offset))
        .collect()
}

#[test]
fn scanning_is_deterministic() {
    let source = "let var x: Integer in begin x := 1; putint(x) end";

    assert_eq!(
        common::scan_str(source).unwrap(),
        common::scan_str(source).unwrap()
    );
}

#[test]
fn positions_are_char_offsets() {
    assert_eq!(
        kinds_and_offsets("let x"),
        vec![
            (TokenKind::Let, 0),
            (TokenKind::Ident("x".to_string()), 4),
            (TokenKind::Eot, 5),
        ]
    );
}

#[test]
fn keywords_are_not_identifiers() {
    assert_eq!(
        kinds_and_offsets("begin beginning"),
        vec![
            (TokenKind::Begin, 0),
            (TokenKind::Ident("beginning".to_string()), 6),
            (TokenKind::Eot, 15),
        ]
    );
}

#[test]
fn becomes_needs_two_chars_of_lookahead() {
    assert_eq!(
        kinds_and_offsets(":= :"),
        vec![
            (TokenKind::Becomes, 0),
            (TokenKind::Colon, 3),
            (TokenKind::Eot, 4),
        ]
    );
}

#[test]
fn comments_run_to_end_of_line() {
    assert_eq!(
        kinds_and_offsets("x ! junk\ny"),
        vec![
            (TokenKind::Ident("x".to_string()), 0),
            (TokenKind::Ident("y".to_string()), 9),
            (TokenKind::Eot, 10),
        ]
    );
}

#[test]
fn comment_at_end_of_input() {
    assert_eq!(
        kinds_and_offsets("x ! no newline"),
        vec![(TokenKind::Ident("x".to_string()), 0), (TokenKind::Eot, 14)]
    );
}

#[test]
fn integer_literals_carry_their_value() {
    assert_eq!(
        kinds_and_offsets("42 7"),
        vec![
            (TokenKind::IntLit(42), 0),
            (TokenKind::IntLit(7), 3),
            (TokenKind::Eot, 4),
        ]
    );
}

#[test_case('+', Op::Add; "plus")]
#[test_case('-', Op::Sub; "minus")]
#[test_case('*', Op::Mul; "star")]
#[test_case('/', Op::Div; "slash")]
#[test_case('\\', Op::Mod; "backslash")]
#[test_case('<', Op::Lt; "less than")]
#[test_case('>', Op::Gt; "greater than")]
#[test_case('=', Op::Eq; "equals")]
fn operators(c: char, op: Op) {
    assert_eq!(
        kinds_and_offsets(&c.to_string()),
        vec![(TokenKind::Operator(op), 0), (TokenKind::Eot, 1)]
    );
}

#[test]
fn bad_character_reports_its_position() {
    match common::scan_str("a # b").unwrap_err() {
        Error::Scan(e) => {
            assert_eq!(e.span.offset, 2);
            assert!(matches!(e.kind, ErrorKind::InvalidInput('#')));
        }
        other => panic!("expected a scan error, got {other}"),
    }
}

#[test]
fn literal_too_large_for_i64() {
    match common::scan_str("99999999999999999999").unwrap_err() {
        Error::Scan(e) => assert!(matches!(e.kind, ErrorKind::ParseInt(_))),
        other => panic!("expected a scan error, got {other}"),
    }
}
