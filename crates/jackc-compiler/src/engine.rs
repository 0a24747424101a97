//! Recursive-descent compilation engine (parse + codegen)
//!
//! The engine walks the Jack grammar one production at a time and emits VM
//! instructions the moment enough context is known; there is no syntax
//! tree. Correctness therefore rides on four things handled here:
//!
//! - operand order: expressions are translated term-by-term left to right,
//!   operators emitted post-order, which matches the stack machine exactly;
//! - scope resolution: the two-level symbol table, reset per subroutine,
//!   with the implicit receiver pre-assigned to argument slot 0 in methods;
//! - label uniqueness: separate monotonic `if`/`while` counters, owned by
//!   this instance so independent units never collide;
//! - call-target resolution: the three-way instance/class/same-unit branch,
//!   which decides whether a receiver is pushed before the call.
//!
//! Lookahead is an index over the token vector; peeking never consumes, so
//! the term-level disambiguation (indexed access vs. call vs. plain
//! reference) costs nothing.

use crate::error::CompileError;
use crate::symbol_table::{Kind, SymbolTable};
use crate::vm_writer::{Command, Segment, VmWriter};
use jackc_tokenizer::{Keyword, Token, TokenKind};
use std::io::Write;

/// Compiles one tokenized Jack class to VM code on a sink.
///
/// All translation state (symbol table, label counters, token cursor) is
/// owned by the instance and lives for exactly one compilation unit, so
/// separate units can be compiled concurrently with separate engines.
pub struct CompilationEngine<W: Write> {
    tokens: Vec<Token>,
    pos: usize,
    class_name: String,
    table: SymbolTable,
    writer: VmWriter<W>,
    if_index: u32,
    while_index: u32,
}

impl<W: Write> CompilationEngine<W> {
    pub fn new(tokens: Vec<Token>, out: W) -> Self {
        CompilationEngine {
            tokens,
            pos: 0,
            class_name: String::new(),
            table: SymbolTable::new(),
            writer: VmWriter::new(out),
            if_index: 0,
            while_index: 0,
        }
    }

    // ===== Token cursor =====

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    /// The token after the next one. Drives the indexed-access / call /
    /// plain-reference split without consuming anything.
    fn peek_second(&self) -> Option<&Token> {
        self.tokens.get(self.pos + 1)
    }

    fn peek_symbol(&self, ch: char) -> bool {
        matches!(self.peek(), Some(tok) if tok.kind == TokenKind::Symbol(ch))
    }

    fn peek_keyword(&self, kw: Keyword) -> bool {
        matches!(self.peek(), Some(tok) if tok.kind == TokenKind::Keyword(kw))
    }

    fn unexpected(&self, expected: &str) -> CompileError {
        match self.peek() {
            Some(tok) => CompileError::UnexpectedToken {
                expected: expected.to_string(),
                found: tok.kind.to_string(),
                line: tok.line,
            },
            None => CompileError::UnexpectedEof {
                expected: expected.to_string(),
            },
        }
    }

    fn expect_symbol(&mut self, ch: char) -> Result<(), CompileError> {
        if self.peek_symbol(ch) {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.unexpected(&format!("'{}'", ch)))
        }
    }

    fn expect_keyword(&mut self, kw: Keyword) -> Result<(), CompileError> {
        if self.peek_keyword(kw) {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.unexpected(&format!("'{}'", kw)))
        }
    }

    fn expect_identifier(&mut self) -> Result<(String, u32), CompileError> {
        match self.peek() {
            Some(Token {
                kind: TokenKind::Identifier(name),
                line,
            }) => {
                let result = (name.clone(), *line);
                self.pos += 1;
                Ok(result)
            }
            _ => Err(self.unexpected("an identifier")),
        }
    }

    /// A type name: `int`, `char`, `boolean` or a class identifier.
    fn expect_type(&mut self) -> Result<String, CompileError> {
        match self.peek() {
            Some(Token {
                kind: TokenKind::Keyword(kw @ (Keyword::Int | Keyword::Char | Keyword::Boolean)),
                ..
            }) => {
                let ty = kw.as_str().to_string();
                self.pos += 1;
                Ok(ty)
            }
            Some(Token {
                kind: TokenKind::Identifier(name),
                ..
            }) => {
                let ty = name.clone();
                self.pos += 1;
                Ok(ty)
            }
            _ => Err(self.unexpected("a type")),
        }
    }

    fn resolve_variable(&self, name: &str, line: u32) -> Result<(Kind, u16), CompileError> {
        match (self.table.kind_of(name), self.table.index_of(name)) {
            (Some(kind), Some(index)) => Ok((kind, index)),
            _ => Err(CompileError::UndeclaredName {
                name: name.to_string(),
                line,
            }),
        }
    }

    // ===== Declarations =====

    /// Compile the whole class: `class Name { classVarDec* subroutineDec* }`.
    ///
    /// Top-level entry point; flushes the sink on success. On error the
    /// engine (and with it the sink) is simply dropped, so partial output
    /// never outlives the failed run.
    pub fn compile_class(&mut self) -> Result<(), CompileError> {
        self.expect_keyword(Keyword::Class)?;
        let (name, _) = self.expect_identifier()?;
        self.class_name = name;
        self.expect_symbol('{')?;
        while self.peek_keyword(Keyword::Static) || self.peek_keyword(Keyword::Field) {
            self.compile_class_var_dec()?;
        }
        while self.peek_keyword(Keyword::Constructor)
            || self.peek_keyword(Keyword::Function)
            || self.peek_keyword(Keyword::Method)
        {
            self.compile_subroutine()?;
        }
        self.expect_symbol('}')?;
        self.writer.flush()?;
        Ok(())
    }

    /// `(static | field) type name (, name)* ;`: registers each name.
    fn compile_class_var_dec(&mut self) -> Result<(), CompileError> {
        let kind = if self.peek_keyword(Keyword::Static) {
            Kind::Static
        } else {
            Kind::Field
        };
        self.pos += 1;
        let ty = self.expect_type()?;
        let (name, _) = self.expect_identifier()?;
        self.table.define(&name, &ty, kind);
        while self.peek_symbol(',') {
            self.pos += 1;
            let (name, _) = self.expect_identifier()?;
            self.table.define(&name, &ty, kind);
        }
        self.expect_symbol(';')?;
        Ok(())
    }

    /// One subroutine: declarations, entry instruction, prologue, body.
    ///
    /// The `function` instruction needs the local count, so it is emitted
    /// only after all `var` declarations are registered. Constructors
    /// allocate the object and methods rebind the receiver before any
    /// statement runs; receiver state is per-frame and never inherited.
    fn compile_subroutine(&mut self) -> Result<(), CompileError> {
        let category = match self.peek().map(|t| &t.kind) {
            Some(TokenKind::Keyword(
                kw @ (Keyword::Constructor | Keyword::Function | Keyword::Method),
            )) => {
                let kw = *kw;
                self.pos += 1;
                kw
            }
            _ => return Err(self.unexpected("'constructor', 'function' or 'method'")),
        };
        if self.peek_keyword(Keyword::Void) {
            self.pos += 1;
        } else {
            self.expect_type()?;
        }
        let (name, _) = self.expect_identifier()?;

        self.table.start_subroutine();
        if category == Keyword::Method {
            let receiver_type = self.class_name.clone();
            self.table.define("this", &receiver_type, Kind::Arg);
        }

        self.expect_symbol('(')?;
        self.compile_parameter_list()?;
        self.expect_symbol(')')?;
        self.expect_symbol('{')?;
        while self.peek_keyword(Keyword::Var) {
            self.compile_var_dec()?;
        }

        let full_name = format!("{}.{}", self.class_name, name);
        self.writer
            .write_function(&full_name, self.table.var_count(Kind::Var))?;
        match category {
            Keyword::Constructor => {
                self.writer
                    .write_push(Segment::Constant, self.table.var_count(Kind::Field))?;
                self.writer.write_call("Memory.alloc", 1)?;
                self.writer.write_pop(Segment::Pointer, 0)?;
            }
            Keyword::Method => {
                self.writer.write_push(Segment::Argument, 0)?;
                self.writer.write_pop(Segment::Pointer, 0)?;
            }
            _ => {}
        }

        self.compile_statements()?;
        self.expect_symbol('}')?;
        Ok(())
    }

    /// `((type name) (, type name)*)?`: each registered as an argument.
    fn compile_parameter_list(&mut self) -> Result<(), CompileError> {
        if self.peek_symbol(')') {
            return Ok(());
        }
        let ty = self.expect_type()?;
        let (name, _) = self.expect_identifier()?;
        self.table.define(&name, &ty, Kind::Arg);
        while self.peek_symbol(',') {
            self.pos += 1;
            let ty = self.expect_type()?;
            let (name, _) = self.expect_identifier()?;
            self.table.define(&name, &ty, Kind::Arg);
        }
        Ok(())
    }

    /// `var type name (, name)* ;`: each registered as a local.
    fn compile_var_dec(&mut self) -> Result<(), CompileError> {
        self.expect_keyword(Keyword::Var)?;
        let ty = self.expect_type()?;
        let (name, _) = self.expect_identifier()?;
        self.table.define(&name, &ty, Kind::Var);
        while self.peek_symbol(',') {
            self.pos += 1;
            let (name, _) = self.expect_identifier()?;
            self.table.define(&name, &ty, Kind::Var);
        }
        self.expect_symbol(';')?;
        Ok(())
    }

    // ===== Statements =====

    fn compile_statements(&mut self) -> Result<(), CompileError> {
        loop {
            if self.peek_keyword(Keyword::Let) {
                self.compile_let()?;
            } else if self.peek_keyword(Keyword::If) {
                self.compile_if()?;
            } else if self.peek_keyword(Keyword::While) {
                self.compile_while()?;
            } else if self.peek_keyword(Keyword::Do) {
                self.compile_do()?;
            } else if self.peek_keyword(Keyword::Return) {
                self.compile_return()?;
            } else {
                return Ok(());
            }
        }
    }

    /// `let name ([expr])? = expr ;`
    ///
    /// For the indexed form the target address is computed and stashed in
    /// temp 0 before the right-hand side runs: that expression may itself
    /// use indexed access, which retargets pointer 1.
    fn compile_let(&mut self) -> Result<(), CompileError> {
        self.expect_keyword(Keyword::Let)?;
        let (name, line) = self.expect_identifier()?;
        let (kind, index) = self.resolve_variable(&name, line)?;
        if self.peek_symbol('[') {
            self.pos += 1;
            self.writer.write_push(Segment::from(kind), index)?;
            self.compile_expression()?;
            self.expect_symbol(']')?;
            self.writer.write_arithmetic(Command::Add)?;
            self.writer.write_pop(Segment::Temp, 0)?;
            self.expect_symbol('=')?;
            self.compile_expression()?;
            self.expect_symbol(';')?;
            self.writer.write_push(Segment::Temp, 0)?;
            self.writer.write_pop(Segment::Pointer, 1)?;
            self.writer.write_pop(Segment::That, 0)?;
        } else {
            self.expect_symbol('=')?;
            self.compile_expression()?;
            self.expect_symbol(';')?;
            self.writer.write_pop(Segment::from(kind), index)?;
        }
        Ok(())
    }

    /// `if (expr) { statements } (else { statements })?`
    ///
    /// Negate-and-skip: the condition is inverted and a taken branch means
    /// "skip the then block". Both labels derive from one counter value, so
    /// sibling and nested conditionals never share names. The end label is
    /// only needed when an else branch exists.
    fn compile_if(&mut self) -> Result<(), CompileError> {
        self.expect_keyword(Keyword::If)?;
        let n = self.if_index;
        self.if_index += 1;
        let false_label = format!("IF_FALSE{}", n);
        let end_label = format!("IF_END{}", n);

        self.expect_symbol('(')?;
        self.compile_expression()?;
        self.expect_symbol(')')?;
        self.writer.write_arithmetic(Command::Not)?;
        self.writer.write_if(&false_label)?;
        self.expect_symbol('{')?;
        self.compile_statements()?;
        self.expect_symbol('}')?;
        if self.peek_keyword(Keyword::Else) {
            self.pos += 1;
            self.writer.write_goto(&end_label)?;
            self.writer.write_label(&false_label)?;
            self.expect_symbol('{')?;
            self.compile_statements()?;
            self.expect_symbol('}')?;
            self.writer.write_label(&end_label)?;
        } else {
            self.writer.write_label(&false_label)?;
        }
        Ok(())
    }

    /// `while (expr) { statements }`
    fn compile_while(&mut self) -> Result<(), CompileError> {
        self.expect_keyword(Keyword::While)?;
        let n = self.while_index;
        self.while_index += 1;
        let top_label = format!("WHILE{}", n);
        let end_label = format!("WHILE_END{}", n);

        self.writer.write_label(&top_label)?;
        self.expect_symbol('(')?;
        self.compile_expression()?;
        self.expect_symbol(')')?;
        self.writer.write_arithmetic(Command::Not)?;
        self.writer.write_if(&end_label)?;
        self.expect_symbol('{')?;
        self.compile_statements()?;
        self.expect_symbol('}')?;
        self.writer.write_goto(&top_label)?;
        self.writer.write_label(&end_label)?;
        Ok(())
    }

    /// `do call ;`: every call leaves one value on the stack, even a
    /// semantically void one, so it is discarded into temp 0.
    fn compile_do(&mut self) -> Result<(), CompileError> {
        self.expect_keyword(Keyword::Do)?;
        self.compile_subroutine_call()?;
        self.writer.write_pop(Segment::Temp, 0)?;
        self.expect_symbol(';')?;
        Ok(())
    }

    /// `return expr? ;`: a value-less return still pushes constant 0;
    /// every routine leaves exactly one value for its caller.
    fn compile_return(&mut self) -> Result<(), CompileError> {
        self.expect_keyword(Keyword::Return)?;
        if self.peek_symbol(';') {
            self.writer.write_push(Segment::Constant, 0)?;
        } else {
            self.compile_expression()?;
        }
        self.writer.write_return()?;
        self.expect_symbol(';')?;
        Ok(())
    }

    // ===== Expressions =====

    const BINARY_OPS: &'static [char] = &['+', '-', '*', '/', '&', '|', '<', '>', '='];

    fn peek_binary_op(&self) -> Option<char> {
        match self.peek() {
            Some(Token {
                kind: TokenKind::Symbol(ch),
                ..
            }) if Self::BINARY_OPS.contains(ch) => Some(*ch),
            _ => None,
        }
    }

    /// `term (op term)*`, left-associative, operators emitted post-order.
    ///
    /// `*` and `/` are not native stack-machine instructions; they lower to
    /// two-argument calls into the runtime's Math class.
    fn compile_expression(&mut self) -> Result<(), CompileError> {
        self.compile_term()?;
        while let Some(op) = self.peek_binary_op() {
            self.pos += 1;
            self.compile_term()?;
            match op {
                '+' => self.writer.write_arithmetic(Command::Add)?,
                '-' => self.writer.write_arithmetic(Command::Sub)?,
                '=' => self.writer.write_arithmetic(Command::Eq)?,
                '>' => self.writer.write_arithmetic(Command::Gt)?,
                '<' => self.writer.write_arithmetic(Command::Lt)?,
                '&' => self.writer.write_arithmetic(Command::And)?,
                '|' => self.writer.write_arithmetic(Command::Or)?,
                '*' => self.writer.write_call("Math.multiply", 2)?,
                '/' => self.writer.write_call("Math.divide", 2)?,
                _ => unreachable!("filtered by peek_binary_op"),
            }
        }
        Ok(())
    }

    fn compile_term(&mut self) -> Result<(), CompileError> {
        let token = match self.peek() {
            Some(tok) => tok.clone(),
            None => return Err(CompileError::UnexpectedEof { expected: "a term".to_string() }),
        };
        match token.kind {
            TokenKind::Symbol('-') => {
                self.pos += 1;
                self.compile_term()?;
                self.writer.write_arithmetic(Command::Neg)?;
            }
            TokenKind::Symbol('~') => {
                self.pos += 1;
                self.compile_term()?;
                self.writer.write_arithmetic(Command::Not)?;
            }
            TokenKind::Symbol('(') => {
                self.pos += 1;
                self.compile_expression()?;
                self.expect_symbol(')')?;
            }
            TokenKind::IntConst(value) => {
                self.pos += 1;
                self.writer.write_push(Segment::Constant, value)?;
            }
            TokenKind::StringConst(body) => {
                self.pos += 1;
                self.compile_string(&body)?;
            }
            TokenKind::Keyword(Keyword::This) => {
                self.pos += 1;
                self.writer.write_push(Segment::Pointer, 0)?;
            }
            TokenKind::Keyword(Keyword::True) => {
                // all-ones word
                self.pos += 1;
                self.writer.write_push(Segment::Constant, 0)?;
                self.writer.write_arithmetic(Command::Not)?;
            }
            TokenKind::Keyword(Keyword::False) | TokenKind::Keyword(Keyword::Null) => {
                self.pos += 1;
                self.writer.write_push(Segment::Constant, 0)?;
            }
            TokenKind::Identifier(name) => match self.peek_second().map(|t| &t.kind) {
                Some(TokenKind::Symbol('[')) => self.compile_array_read()?,
                Some(TokenKind::Symbol('.')) | Some(TokenKind::Symbol('(')) => {
                    self.compile_subroutine_call()?;
                }
                _ => {
                    self.pos += 1;
                    let (kind, index) = self.resolve_variable(&name, token.line)?;
                    self.writer.write_push(Segment::from(kind), index)?;
                }
            },
            _ => return Err(self.unexpected("a term")),
        }
        Ok(())
    }

    /// `name [ expr ]` as a value: compute base + index, retarget pointer 1,
    /// read through `that 0`.
    fn compile_array_read(&mut self) -> Result<(), CompileError> {
        let (name, line) = self.expect_identifier()?;
        let (kind, index) = self.resolve_variable(&name, line)?;
        self.expect_symbol('[')?;
        self.writer.write_push(Segment::from(kind), index)?;
        self.compile_expression()?;
        self.expect_symbol(']')?;
        self.writer.write_arithmetic(Command::Add)?;
        self.writer.write_pop(Segment::Pointer, 1)?;
        self.writer.write_push(Segment::That, 0)?;
        Ok(())
    }

    /// A string literal is built by repeated mutation: allocate via
    /// `String.new`, then append one character code at a time.
    fn compile_string(&mut self, body: &str) -> Result<(), CompileError> {
        let length = body.chars().count() as u16;
        self.writer.write_push(Segment::Constant, length)?;
        self.writer.write_call("String.new", 1)?;
        for ch in body.chars() {
            // the tokenizer rejects codes above 0xFFFF, so this cannot lose bits
            self.writer.write_push(Segment::Constant, u32::from(ch) as u16)?;
            self.writer.write_call("String.appendChar", 2)?;
        }
        Ok(())
    }

    // ===== Call resolution =====

    /// The three-way call branch, on identifier `I`:
    ///
    /// - `I.m(...)` where `I` is a declared variable of type `T`: instance
    ///   call; push `I`'s value as the receiver and call `T.m` with one
    ///   extra argument.
    /// - `I.m(...)` where `I` does not resolve: `I` names a class; call
    ///   `I.m` with the explicit arguments only.
    /// - `I(...)`: same-unit instance call; push the current receiver and
    ///   call `<class>.I` with one extra argument.
    ///
    /// Getting the implicit-receiver decision wrong corrupts the argument
    /// frame of every cross-class or bare call, so variable resolution here
    /// is the one absence check the engine must perform.
    fn compile_subroutine_call(&mut self) -> Result<(), CompileError> {
        let (name, line) = self.expect_identifier()?;
        let mut n_args: u16 = 0;
        let full_name;
        if self.peek_symbol('.') {
            self.pos += 1;
            let (subroutine, _) = self.expect_identifier()?;
            if let Some(ty) = self.table.type_of(&name).map(str::to_string) {
                // receiver is a declared variable; its type names the class
                let (kind, index) = self.resolve_variable(&name, line)?;
                self.writer.write_push(Segment::from(kind), index)?;
                n_args += 1;
                full_name = format!("{}.{}", ty, subroutine);
            } else {
                full_name = format!("{}.{}", name, subroutine);
            }
        } else {
            self.writer.write_push(Segment::Pointer, 0)?;
            n_args += 1;
            full_name = format!("{}.{}", self.class_name, name);
        }
        self.expect_symbol('(')?;
        n_args += self.compile_expression_list()?;
        self.expect_symbol(')')?;
        self.writer.write_call(&full_name, n_args)?;
        Ok(())
    }

    /// `(expr (, expr)*)?` translated left to right; returns the count.
    fn compile_expression_list(&mut self) -> Result<u16, CompileError> {
        let mut count = 0;
        if self.peek_symbol(')') {
            return Ok(count);
        }
        self.compile_expression()?;
        count += 1;
        while self.peek_symbol(',') {
            self.pos += 1;
            self.compile_expression()?;
            count += 1;
        }
        Ok(count)
    }
}
