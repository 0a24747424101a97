use super::helpers::{in_main, lines};

fn expression_code(expr: &str) -> Vec<String> {
    let code = lines(&in_main(&format!("do Output.printInt({}); return;", expr)));
    // strip the function entry and the trailing call/discard/return frame
    code[1..code.len() - 4].to_vec()
}

#[test]
fn test_binary_operators_emit_post_order() {
    assert_eq!(expression_code("1 + 2"), vec!["push constant 1", "push constant 2", "add"]);
    assert_eq!(expression_code("3 - 4"), vec!["push constant 3", "push constant 4", "sub"]);
    assert_eq!(expression_code("1 = 2"), vec!["push constant 1", "push constant 2", "eq"]);
    assert_eq!(expression_code("1 > 2"), vec!["push constant 1", "push constant 2", "gt"]);
    assert_eq!(expression_code("1 < 2"), vec!["push constant 1", "push constant 2", "lt"]);
    assert_eq!(expression_code("1 & 2"), vec!["push constant 1", "push constant 2", "and"]);
    assert_eq!(expression_code("1 | 2"), vec!["push constant 1", "push constant 2", "or"]);
}

#[test]
fn test_multiply_and_divide_lower_to_runtime_calls() {
    assert_eq!(
        expression_code("6 * 7"),
        vec!["push constant 6", "push constant 7", "call Math.multiply 2"]
    );
    assert_eq!(
        expression_code("20 / 4"),
        vec!["push constant 20", "push constant 4", "call Math.divide 2"]
    );
}

#[test]
fn test_expressions_are_left_associative() {
    // (1 - 2) - 3, not 1 - (2 - 3)
    assert_eq!(
        expression_code("1 - 2 - 3"),
        vec![
            "push constant 1",
            "push constant 2",
            "sub",
            "push constant 3",
            "sub",
        ]
    );
}

#[test]
fn test_parentheses_override_order() {
    assert_eq!(
        expression_code("1 - (2 - 3)"),
        vec![
            "push constant 1",
            "push constant 2",
            "push constant 3",
            "sub",
            "sub",
        ]
    );
}

#[test]
fn test_unary_operators_emit_after_their_term() {
    assert_eq!(expression_code("-5"), vec!["push constant 5", "neg"]);
    assert_eq!(expression_code("~5"), vec!["push constant 5", "not"]);
    assert_eq!(
        expression_code("-(1 + 2)"),
        vec!["push constant 1", "push constant 2", "add", "neg"]
    );
}

#[test]
fn test_keyword_constants() {
    assert_eq!(expression_code("true"), vec!["push constant 0", "not"]);
    assert_eq!(expression_code("false"), vec!["push constant 0"]);
    assert_eq!(expression_code("null"), vec!["push constant 0"]);
}

#[test]
fn test_this_pushes_the_receiver_base() {
    let code = lines(
        "class Point {
            constructor Point new() {
                return this;
            }
        }",
    );
    assert!(code.contains(&"push pointer 0".to_string()));
}

#[test]
fn test_string_literal_builds_by_repeated_append() {
    assert_eq!(
        expression_code("\"Hi\""),
        vec![
            "push constant 2",
            "call String.new 1",
            "push constant 72",
            "call String.appendChar 2",
            "push constant 105",
            "call String.appendChar 2",
        ]
    );
}

#[test]
fn test_string_character_codes_are_emitted_in_full() {
    // U+00E9 is outside ASCII but fits the word pushed for appendChar
    assert_eq!(
        expression_code("\"\u{00E9}\""),
        vec![
            "push constant 1",
            "call String.new 1",
            "push constant 233",
            "call String.appendChar 2",
        ]
    );
}

#[test]
fn test_empty_string_is_just_the_constructor() {
    assert_eq!(
        expression_code("\"\""),
        vec!["push constant 0", "call String.new 1"]
    );
}

#[test]
fn test_array_read_goes_through_that_zero() {
    let code = lines(&in_main("var Array a; var int x; let x = a[3]; return;"));
    assert_eq!(
        code,
        vec![
            "function Main.main 2",
            "push local 0",
            "push constant 3",
            "add",
            "pop pointer 1",
            "push that 0",
            "pop local 1",
            "push constant 0",
            "return",
        ]
    );
}

#[test]
fn test_plain_reference_pushes_from_its_segment() {
    let code = lines(
        "class Ref {
            static int s;
            field int f;
            method int sum(int a) {
                var int v;
                let v = s + f + a;
                return v;
            }
        }",
    );
    let body = &code[3..8];
    assert_eq!(
        body,
        &[
            "push static 0",
            "push this 0",
            "add",
            "push argument 1",
            "add",
        ]
    );
}
