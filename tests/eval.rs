use test_case::test_case;

use triangle::{error::Error, eval::EvalError};

mod common;

#[test_case("eval/while.mt", "", "3\n"; "while loop")]
#[test_case("eval/conditional.mt", "", "1\n"; "conditional")]
#[test_case("eval/add_input.mt", "40\n", "42\n"; "getint feeds putint")]
#[test_case("eval/factorial.mt", "5\n", "120\n"; "factorial")]
#[test_case("eval/factorial.mt", "0\n", "1\n"; "factorial of zero")]
fn programs(name: &str, input: &str, expected: &str) {
    assert_eq!(common::eval(name, input).unwrap(), expected);
}

#[test_case("2 + 3 * 4", "14"; "precedence")]
#[test_case("(2 + 3) * 4", "20"; "parentheses")]
#[test_case("-7 / 2", "-3"; "division truncates toward zero")]
#[test_case("7 / 2", "3"; "division")]
#[test_case("-7 \\ 2", "-1"; "remainder keeps the dividend sign")]
#[test_case("7 \\ 2", "1"; "remainder")]
#[test_case("+5", "5"; "unary plus")]
#[test_case("- -5", "5"; "unary minus nests")]
#[test_case("1 < 2", "1"; "less than")]
#[test_case("2 > 3", "0"; "greater than")]
#[test_case("2 = 2", "1"; "equality")]
#[test_case("1 + 2 = 3", "1"; "comparison binds loosest")]
fn exprs(expr: &str, expected: &str) {
    let source = format!("let var x: Integer in begin x := {expr}; putint(x) end");
    let output = common::eval_str(&source, "").unwrap();

    assert_eq!(output.trim_end(), expected);
}

fn eval_err(source: &str, input: &str) -> EvalError {
    match common::eval_str(source, input).unwrap_err() {
        Error::Eval(e) => e,
        other => panic!("expected an eval error, got {other}"),
    }
}

#[test]
fn rejects_function_declarations() {
    let err = match common::eval("eval/unsupported_func.mt", "").unwrap_err() {
        Error::Eval(e) => e,
        other => panic!("expected an eval error, got {other}"),
    };

    assert!(matches!(err, EvalError::FunctionDecl));
}

#[test]
fn rejects_return() {
    let err = eval_err("let var x: Integer in return 1", "");
    assert!(matches!(err, EvalError::Return));
}

#[test]
fn rejects_user_calls() {
    let err = eval_err("let var x: Integer in x := f(1)", "");
    assert!(matches!(err, EvalError::UserCall(name) if name == "f"));
}

#[test]
fn rejects_read_before_assignment() {
    let err = eval_err("let var x: Integer in putint(x)", "");
    assert!(matches!(err, EvalError::Unassigned(name) if name == "x"));
}

#[test]
fn rejects_unknown_names() {
    let err = eval_err("let var x: Integer in y := 1", "");
    assert!(matches!(err, EvalError::UnknownName(name) if name == "y"));
}

#[test]
fn rejects_division_by_zero() {
    let err = eval_err("let var x: Integer in x := 1 / 0", "");
    assert!(matches!(err, EvalError::DivisionByZero));
}

#[test]
fn rejects_malformed_input() {
    let err = eval_err("let var x: Integer in getint(x)", "not a number\n");
    assert!(matches!(err, EvalError::InvalidInput));
}

#[test]
fn rejects_exhausted_input() {
    let err = eval_err("let var x: Integer in getint(x)", "");
    assert!(matches!(err, EvalError::EndOfInput));
}

#[test]
fn constants_are_readable() {
    let source = "let const n ~ 6; var x: Integer in begin x := n * 7; putint(x) end";
    assert_eq!(common::eval_str(source, "").unwrap(), "42\n");
}

#[test]
fn getint_blocks_per_line() {
    let source = "let var a: Integer; var b: Integer
in
  begin
    getint(a);
    getint(b);
    putint(a - b)
  end";

    assert_eq!(common::eval_str(source, "10\n4\n").unwrap(), "6\n");
}
