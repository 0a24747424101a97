//! Jack to VM code compiler
//!
//! This crate implements the code-generating half of a Jack compiler: a
//! single-pass, syntax-directed translator from tokenized Jack source to
//! stack-machine VM code. Parsing and emission are fused per grammar
//! production; no syntax tree is built. Instructions are written forward
//! only, so branch labels are chosen before their referencing jumps.
//!
//! # Modules
//!
//! - `engine`: recursive-descent compilation engine (parse + codegen)
//! - `symbol_table`: two-level class/subroutine identifier registry
//! - `vm_writer`: line-oriented VM instruction sink
//! - `error`: error types for tokenizing and compilation

pub mod engine;
pub mod error;
pub mod symbol_table;
pub mod vm_writer;

// Re-export main types
pub use engine::CompilationEngine;
pub use error::CompileError;
pub use symbol_table::{Kind, SymbolTable};
pub use vm_writer::{Command, Segment, VmWriter};

use std::io::Write;

/// Translate one Jack compilation unit into VM code on `out`.
///
/// This is the top-level entry point: it tokenizes `source`, runs the
/// compilation engine, and flushes the sink. The sink is released on every
/// exit path; on error the partial output should be discarded.
pub fn translate<W: Write>(source: &str, out: W) -> Result<(), CompileError> {
    let tokens = jackc_tokenizer::tokenize(source)?;
    let mut engine = CompilationEngine::new(tokens, out);
    engine.compile_class()
}

/// Translate one Jack compilation unit into a VM code string.
pub fn translate_to_string(source: &str) -> Result<String, CompileError> {
    let mut out = Vec::new();
    translate(source, &mut out)?;
    // The writer only ever emits ASCII
    Ok(String::from_utf8_lossy(&out).into_owned())
}

#[cfg(test)]
mod tests;
