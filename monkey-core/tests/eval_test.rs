// monkey-core - Evaluator tests
// Copyright (c) 2025 Tom Waddington. MIT licensed.

use monkey_core::{Env, EvalError, Object, eval::eval_program};
use monkey_parser::parser::parse;
use monkey_parser::token::{Location, Span};

fn eval(source: &str) -> Result<Object, EvalError> {
    let program = parse(source);
    assert!(
        program.diagnostics.is_empty(),
        "parse diagnostics for {:?}: {:?}",
        source,
        program.diagnostics
    );
    eval_program(&program, &Env::new())
}

fn eval_ok(source: &str) -> Object {
    eval(source).unwrap_or_else(|e| panic!("eval error for {:?}: {}", source, e))
}

fn assert_int(source: &str, expected: i64) {
    assert_eq!(eval_ok(source), Object::Integer(expected), "input: {}", source);
}

fn assert_bool(source: &str, expected: bool) {
    assert_eq!(eval_ok(source), Object::Boolean(expected), "input: {}", source);
}

fn span(start: (usize, usize), end: (usize, usize)) -> Span {
    Span::new(Location::new(start.0, start.1), Location::new(end.0, end.1))
}

#[test]
fn test_integer_expressions() {
    assert_int("5", 5);
    assert_int("10", 10);
    assert_int("-5", -5);
    assert_int("5 + 5 + 5 + 5 - 10", 10);
    assert_int("2 * 2 * 2 * 2 * 2", 32);
    assert_int("50 / 2 * 2 + 10", 60);
    assert_int("3 * (3 * 3) + 10", 37);
    assert_int("(5 + 10 * 2 + 15 / 3) * 2 + -10", 50);
}

#[test]
fn test_boolean_expressions() {
    assert_bool("true", true);
    assert_bool("false", false);
    assert_bool("1 < 2", true);
    assert_bool("1 > 2", false);
    assert_bool("1 == 1", true);
    assert_bool("1 != 1", false);
    assert_bool("true == true", true);
    assert_bool("false == true", false);
    assert_bool("true != false", true);
    assert_bool("\"a\" == \"a\"", true);
    assert_bool("\"a\" != \"b\"", true);
    assert_bool("!true", false);
    assert_bool("!!true", true);
}

#[test]
fn test_if_expressions() {
    assert_int("if (true) { 10 }", 10);
    assert_int("if (1 < 2) { 10 } else { 20 }", 10);
    assert_int("if (1 > 2) { 10 } else { 20 }", 20);
    assert_eq!(eval_ok("if (false) { 10 }"), Object::Null);
}

#[test]
fn test_return_statements() {
    assert_int("return 10;", 10);
    assert_int("return 10; 9;", 10);
    assert_int("return 2 * 5; 9;", 10);
    assert_int("9; return 2 * 5; 9;", 10);
    assert_int(
        "if (true) { if (true) { return 10; } return 1; }",
        10,
    );
    assert_eq!(eval_ok("return;"), Object::Null);
}

#[test]
fn test_let_statements() {
    assert_int("let a = 5; a", 5);
    assert_bool("let b = true; b", true);
    assert_int("let a = 100; let b = 200; let c = 323; let d = a * b; d + c", 20323);
}

#[test]
fn test_string_expressions() {
    assert_eq!(eval_ok("\"Hello world!\""), Object::str("Hello world!"));
    assert_eq!(eval_ok("\"Hello\" + \" \" + \"world!\""), Object::str("Hello world!"));
}

#[test]
fn test_runtime_errors() {
    let tests = [
        (
            "if (10 + true) {}",
            span((0, 9), (0, 13)),
            "Expression does not evaluate to an integer or string object",
        ),
        (
            "if (true + 10) {}",
            span((0, 4), (0, 8)),
            "Expression does not evaluate to an integer or string object",
        ),
        (
            "let a = \"str\" + 10",
            span((0, 8), (0, 18)),
            "Left and right arguments to the infix operator do not have the same type",
        ),
        (
            "let a = 10 == \"str\"",
            span((0, 8), (0, 19)),
            "Left and right arguments to the infix operator do not have the same type",
        ),
        (
            "if (!10) {}",
            span((0, 4), (0, 7)),
            "\"!\" requires a boolean argument",
        ),
        (
            "-true",
            span((0, 0), (0, 5)),
            "\"-\" requires an integer argument",
        ),
        (
            "if (10) {}",
            span((0, 4), (0, 6)),
            "Condition must evaluate to a boolean object",
        ),
        ("foobar", span((0, 0), (0, 6)), "Identifier not found"),
        (
            "len(3)",
            span((0, 0), (0, 6)),
            "\"len\" builtin takes a single string or array argument",
        ),
        (
            "len(\"\", \"\")",
            span((0, 0), (0, 11)),
            "\"len\" builtin takes a single string or array argument",
        ),
        (
            "let a = [123, 123]; a[2]",
            span((0, 22), (0, 23)),
            "Index 2 exceeds length of the array (2)",
        ),
        ("10 / 0", span((0, 0), (0, 6)), "Division by zero"),
    ];

    for (source, expected_span, expected_msg) in tests {
        let err = eval(source).expect_err(source);
        assert_eq!(err.message, expected_msg, "input: {}", source);
        assert_eq!(err.span, expected_span, "input: {}", source);
    }
}

#[test]
fn test_functions_and_calls() {
    assert_int("let identity = fn(x) { x; }; identity(5);", 5);
    assert_int("let identity = fn(x) { return x; }; identity(5);", 5);
    assert_int("let double = fn(x) { x * 2; }; double(5);", 10);
    assert_int("let add = fn(x, y) { x + y; }; add(5, 5);", 10);
    assert_int("let add = fn(x, y) { x + y; }; add(5 + 5, add(5, 5));", 20);
    assert_int("fn(x) { x; }(5)", 5);
    assert_int(
        "let x = 100; let y = 100; let add = fn(x, y) { return x + y; }; add(3, add(4, 3));",
        10,
    );
    assert_int(
        "let x = 100; let y = 100; let add = fn(x, y) { return x + y; }; add(3, add(4, 3)); x + y",
        200,
    );
}

#[test]
fn test_closures_capture_by_copy() {
    assert_int(
        "let makeAddN = fn(x) { fn(y) { x + y } }; let addTwo = makeAddN(2); addTwo(123)",
        125,
    );
    assert_int(
        "let makeAddN = fn(x) { fn(y) { x + y } }; let addTwo = makeAddN(2); let addThree = makeAddN(3); addThree(123)",
        126,
    );
    // The lexical view is frozen at definition time.
    assert_int("let x = 100; let add = fn(a) { return a + x; }; let x = 200; add(1)", 101);
}

#[test]
fn test_arity_errors() {
    assert_eq!(
        eval("fn(a) { a }()").unwrap_err().message,
        "wrong number of arguments: want=1, got=0"
    );
    assert_eq!(
        eval("fn() { 1 }(1)").unwrap_err().message,
        "wrong number of arguments: want=0, got=1"
    );
    assert_eq!(
        eval("fn(a, ...) { a }()").unwrap_err().message,
        "wrong number of arguments: want>=1, got=0"
    );
}

#[test]
fn test_variadic_functions() {
    assert_int("fn(a, ...) { let v = toArray(...); len(v) + a }(12, 1, 2, 3, 4)", 16);
    assert_int("fn(...) { len(toArray(...)) }()", 0);
    // The carrier flattens into the argument list of a further call.
    assert_int(
        "fn(a, ...) { fn(a, b, c, d) { return a + b + c + d }(a, ...) }(1, 2, 3, 4)",
        10,
    );
    assert_int(
        "fn(a, ...) { fn(a, b, c, d, ...) { return len(toArray(...)) }(a, ...) }(1, 2, 3, 4, 5)",
        1,
    );
    assert_eq!(
        eval("...").unwrap_err().message,
        "\"...\" is only valid inside a variadic function"
    );
}

#[test]
fn test_arrays_and_indexing() {
    assert_eq!(
        eval_ok("[123, 234, \"hello\"]").to_string(),
        "[123, 234, hello]"
    );
    assert_int("[123, 234][0]", 123);
    assert_int("let a = [123, 234]; a[1]", 234);
    assert_int("[1, 2, 3][1 + 1]", 3);
    assert_eq!(
        eval("[1, 2][true]").unwrap_err().message,
        "Array index must evaluate to an integer object"
    );
    assert_eq!(
        eval("5[0]").unwrap_err().message,
        "Expression is not indexable"
    );
}

#[test]
fn test_maps() {
    assert_int("{1: 3, \"34\": 4}[\"3\" + \"4\"]", 4);
    assert_int("{1: 3, \"34\": 4}[1]", 3);
    assert_bool("contains({1: 3}, 1)", true);
    assert_bool("contains({1: 3}, 2)", false);
    assert_eq!(
        eval("{1: 2}[\"missing\"]").unwrap_err().message,
        "Key not found in map"
    );
    assert_eq!(
        eval("{[1]: 2}").unwrap_err().message,
        "Map key is not a hashable object"
    );
    assert_eq!(
        eval("{1: 2}[[1]]").unwrap_err().message,
        "Map key is not a hashable object"
    );
}

#[test]
fn test_ranges() {
    assert_eq!(eval_ok("1..5").to_string(), "[1, 2, 3, 4]");
    assert_eq!(eval_ok("5..1").to_string(), "[5, 4, 3, 2]");
    assert_eq!(eval_ok("3..3").to_string(), "[]");
    assert_eq!(
        eval("true..3").unwrap_err().message,
        "Range start does not evaluate to an integer object"
    );
}

#[test]
fn test_builtins_from_source() {
    assert_int("len(\"hello world\")", 11);
    assert_int("let a = [\"\", \"\"]; let b = len; b(a)", 2);
    assert_int("first([5, 6])", 5);
    assert_int("last([5, 6])", 6);
    assert_eq!(eval_ok("rest([1, 2, 3])").to_string(), "[2, 3]");
    assert_eq!(eval_ok("push([1], 2)").to_string(), "[1, 2]");
}

#[test]
fn test_function_inspect() {
    let result = eval_ok("fn(x) { x + 2; }");
    assert_eq!(result.to_string(), "fn(x) { (x+2); }");
}
