//! Error types for the compiler

use jackc_tokenizer::LexError;
use thiserror::Error;

/// Compilation errors, positioned at the offending token's source line.
///
/// The engine assumes well-formed input (no structural validation beyond
/// what parsing itself requires), so these cover the failures it can
/// actually detect: a token that breaks the grammar, input ending inside a
/// construct, and a name that resolves in neither scope.
#[derive(Debug, Error)]
pub enum CompileError {
    /// Token does not fit the grammar production being parsed
    #[error("line {line}: expected {expected}, found {found}")]
    UnexpectedToken {
        expected: String,
        found: String,
        line: u32,
    },

    /// Input ended inside an unterminated construct
    #[error("unexpected end of input, expected {expected}")]
    UnexpectedEof { expected: String },

    /// Identifier not declared in the subroutine or class scope
    #[error("line {line}: undeclared name '{name}'")]
    UndeclaredName { name: String, line: u32 },

    /// Tokenizer failure
    #[error(transparent)]
    Lex(#[from] LexError),

    /// Output sink failure
    #[error("output error: {0}")]
    Io(#[from] std::io::Error),
}
