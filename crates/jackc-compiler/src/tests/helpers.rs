//! Helper functions for compiler integration tests

use crate::error::CompileError;

/// Compile one Jack class and return the emitted VM code.
pub fn translate(source: &str) -> String {
    crate::translate_to_string(source).expect("translation failed")
}

/// Compile one Jack class and return the emitted instructions line by line.
pub fn lines(source: &str) -> Vec<String> {
    translate(source).lines().map(str::to_string).collect()
}

/// Compile and return the error.
pub fn translate_err(source: &str) -> CompileError {
    crate::translate_to_string(source).expect_err("translation unexpectedly succeeded")
}

/// Wrap a statement sequence in a `function void main` inside class `Main`.
pub fn in_main(statements: &str) -> String {
    format!("class Main {{ function void main() {{ {} }} }}", statements)
}
