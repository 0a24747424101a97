use super::helpers::{lines, translate};

#[test]
fn test_empty_class_emits_nothing() {
    assert_eq!(translate("class Main { }"), "");
}

#[test]
fn test_function_entry_carries_local_count() {
    let code = lines(
        "class Main {
            function void main() {
                var int a, b;
                var boolean c;
                return;
            }
        }",
    );
    assert_eq!(code[0], "function Main.main 3");
}

#[test]
fn test_parameters_do_not_count_as_locals() {
    let code = lines(
        "class Main {
            function int twice(int x) {
                return x + x;
            }
        }",
    );
    assert_eq!(code[0], "function Main.twice 0");
}

#[test]
fn test_constructor_allocates_one_word_per_field() {
    // Scenario: three declared fields
    let code = lines(
        "class Point {
            field int x, y, z;
            constructor Point new() {
                return this;
            }
        }",
    );
    assert_eq!(
        code,
        vec![
            "function Point.new 0",
            "push constant 3",
            "call Memory.alloc 1",
            "pop pointer 0",
            "push pointer 0",
            "return",
        ]
    );
}

#[test]
fn test_constructor_alloc_ignores_statics() {
    let code = lines(
        "class Counter {
            static int total;
            field int value;
            constructor Counter new() {
                return this;
            }
        }",
    );
    assert_eq!(code[1], "push constant 1");
}

#[test]
fn test_method_rebinds_receiver_from_argument_zero() {
    // Scenario: a routine returning a field value
    let code = lines(
        "class Point {
            field int x;
            method int getX() {
                return x;
            }
        }",
    );
    assert_eq!(
        code,
        vec![
            "function Point.getX 0",
            "push argument 0",
            "pop pointer 0",
            "push this 0",
            "return",
        ]
    );
}

#[test]
fn test_method_parameters_start_at_argument_one() {
    let code = lines(
        "class Point {
            field int x;
            method void setX(int value) {
                let x = value;
                return;
            }
        }",
    );
    // value lands at argument 1; slot 0 is the receiver
    assert!(code.contains(&"push argument 1".to_string()));
    assert!(code.contains(&"pop this 0".to_string()));
}

#[test]
fn test_function_parameters_start_at_argument_zero() {
    let code = lines(
        "class Math2 {
            function int first(int a, int b) {
                return a;
            }
        }",
    );
    assert_eq!(code, vec!["function Math2.first 0", "push argument 0", "return"]);
}

#[test]
fn test_declaration_indices_are_dense_and_ordered() {
    let code = translate(
        "class Bag {
            static int s0, s1;
            field int f0;
            field int f1, f2;
            method void touch() {
                let s0 = 0;
                let s1 = 1;
                let f0 = 0;
                let f1 = 1;
                let f2 = 2;
                return;
            }
        }",
    );
    for expected in [
        "pop static 0",
        "pop static 1",
        "pop this 0",
        "pop this 1",
        "pop this 2",
    ] {
        assert!(code.contains(expected), "missing '{}' in:\n{}", expected, code);
    }
}

#[test]
fn test_every_routine_emits_exactly_one_function_entry() {
    let code = lines(
        "class Trio {
            function void a() { return; }
            function void b() { return; }
            method void c() { return; }
        }",
    );
    let entries: Vec<&String> = code.iter().filter(|l| l.starts_with("function ")).collect();
    assert_eq!(
        entries,
        vec!["function Trio.a 0", "function Trio.b 0", "function Trio.c 0"]
    );
}

#[test]
fn test_locals_reset_between_subroutines() {
    let code = lines(
        "class Two {
            function void a() {
                var int x, y;
                return;
            }
            function void b() {
                var int z;
                let z = 9;
                return;
            }
        }",
    );
    assert!(code.contains(&"function Two.b 1".to_string()));
    // z takes local 0 again, not local 2
    assert!(code.contains(&"pop local 0".to_string()));
}
