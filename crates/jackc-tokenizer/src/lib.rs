//! Tokenizer for the Jack language
//!
//! Classifies raw Jack source text into a stream of tokens: keywords,
//! symbols, identifiers, integer literals and string literals. Whitespace
//! and both comment forms (`//`, `/* ... */`) are skipped; line numbers are
//! tracked so downstream errors can point at the offending token.
//!
//! Two interfaces are provided:
//! - [`Tokenizer`]: the classic cursor API (`has_more_tokens` / `advance` /
//!   `token_type` plus per-type accessors).
//! - [`tokenize`]: drains a whole source string into a `Vec<Token>`, which
//!   is what the compiler's lookahead cursor wants.

use std::fmt;
use thiserror::Error;

/// Lexical errors, positioned at the line where scanning stopped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexError {
    /// String literal with no closing quote
    #[error("unterminated string literal starting on line {line}")]
    UnterminatedString { line: u32 },

    /// Block comment with no closing `*/`
    #[error("unterminated block comment starting on line {line}")]
    UnterminatedComment { line: u32 },

    /// Character outside the Jack alphabet
    #[error("illegal character '{ch}' on line {line}")]
    IllegalCharacter { ch: char, line: u32 },

    /// Integer literal outside 0..=32767
    #[error("integer literal '{literal}' out of range on line {line}")]
    IntOutOfRange { literal: String, line: u32 },

    /// `advance` called with no tokens remaining
    #[error("no more tokens")]
    Exhausted,
}

/// The Jack keyword set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    Class,
    Constructor,
    Function,
    Method,
    Field,
    Static,
    Var,
    Int,
    Char,
    Boolean,
    Void,
    True,
    False,
    Null,
    This,
    Let,
    Do,
    If,
    Else,
    While,
    Return,
}

impl Keyword {
    /// Parse an identifier-shaped word as a keyword, if it is one.
    pub fn from_str(word: &str) -> Option<Keyword> {
        let kw = match word {
            "class" => Keyword::Class,
            "constructor" => Keyword::Constructor,
            "function" => Keyword::Function,
            "method" => Keyword::Method,
            "field" => Keyword::Field,
            "static" => Keyword::Static,
            "var" => Keyword::Var,
            "int" => Keyword::Int,
            "char" => Keyword::Char,
            "boolean" => Keyword::Boolean,
            "void" => Keyword::Void,
            "true" => Keyword::True,
            "false" => Keyword::False,
            "null" => Keyword::Null,
            "this" => Keyword::This,
            "let" => Keyword::Let,
            "do" => Keyword::Do,
            "if" => Keyword::If,
            "else" => Keyword::Else,
            "while" => Keyword::While,
            "return" => Keyword::Return,
            _ => return None,
        };
        Some(kw)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Keyword::Class => "class",
            Keyword::Constructor => "constructor",
            Keyword::Function => "function",
            Keyword::Method => "method",
            Keyword::Field => "field",
            Keyword::Static => "static",
            Keyword::Var => "var",
            Keyword::Int => "int",
            Keyword::Char => "char",
            Keyword::Boolean => "boolean",
            Keyword::Void => "void",
            Keyword::True => "true",
            Keyword::False => "false",
            Keyword::Null => "null",
            Keyword::This => "this",
            Keyword::Let => "let",
            Keyword::Do => "do",
            Keyword::If => "if",
            Keyword::Else => "else",
            Keyword::While => "while",
            Keyword::Return => "return",
        }
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Token classification tags, as reported by [`Tokenizer::token_type`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenType {
    Keyword,
    Symbol,
    Identifier,
    IntConst,
    StringConst,
}

/// A classified token with its payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    Keyword(Keyword),
    Symbol(char),
    Identifier(String),
    /// Jack integers are unsigned 15-bit; `-` is a unary operator, not a sign
    IntConst(u16),
    /// String body without the surrounding quotes
    StringConst(String),
}

impl TokenKind {
    pub fn token_type(&self) -> TokenType {
        match self {
            TokenKind::Keyword(_) => TokenType::Keyword,
            TokenKind::Symbol(_) => TokenType::Symbol,
            TokenKind::Identifier(_) => TokenType::Identifier,
            TokenKind::IntConst(_) => TokenType::IntConst,
            TokenKind::StringConst(_) => TokenType::StringConst,
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Keyword(kw) => write!(f, "keyword '{}'", kw),
            TokenKind::Symbol(ch) => write!(f, "symbol '{}'", ch),
            TokenKind::Identifier(name) => write!(f, "identifier '{}'", name),
            TokenKind::IntConst(value) => write!(f, "integer '{}'", value),
            TokenKind::StringConst(body) => write!(f, "string \"{}\"", body),
        }
    }
}

/// A token together with the source line it starts on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub line: u32,
}

/// Symbols in the Jack alphabet.
const SYMBOLS: &[char] = &[
    '{', '}', '(', ')', '[', ']', '.', ',', ';', '+', '-', '*', '/', '&', '|', '<', '>', '=', '~',
];

/// Cursor-style tokenizer over one source text.
#[derive(Debug, Clone)]
pub struct Tokenizer {
    input: Vec<char>,
    pos: usize,
    line: u32,
    current: Option<Token>,
}

impl Tokenizer {
    pub fn new(source: &str) -> Self {
        Tokenizer {
            input: source.chars().collect(),
            pos: 0,
            line: 1,
            current: None,
        }
    }

    fn peek(&self) -> char {
        self.input.get(self.pos).copied().unwrap_or('\0')
    }

    fn peek_next(&self) -> char {
        self.input.get(self.pos + 1).copied().unwrap_or('\0')
    }

    fn next_char(&mut self) -> char {
        let ch = self.peek();
        self.pos += 1;
        if ch == '\n' {
            self.line += 1;
        }
        ch
    }

    fn skip_whitespace_and_comments(&mut self) -> Result<(), LexError> {
        loop {
            while self.peek().is_whitespace() {
                self.next_char();
            }

            if self.peek() == '/' && self.peek_next() == '/' {
                while self.peek() != '\n' && self.peek() != '\0' {
                    self.next_char();
                }
                continue;
            }

            if self.peek() == '/' && self.peek_next() == '*' {
                let start = self.line;
                self.next_char();
                self.next_char();
                loop {
                    if self.peek() == '\0' {
                        return Err(LexError::UnterminatedComment { line: start });
                    }
                    if self.peek() == '*' && self.peek_next() == '/' {
                        self.next_char();
                        self.next_char();
                        break;
                    }
                    self.next_char();
                }
                continue;
            }

            return Ok(());
        }
    }

    /// Whether any token remains after whitespace and comments.
    ///
    /// Errors only if a comment runs off the end of the input.
    pub fn has_more_tokens(&mut self) -> Result<bool, LexError> {
        self.skip_whitespace_and_comments()?;
        Ok(self.peek() != '\0')
    }

    /// Scan the next token and make it current.
    pub fn advance(&mut self) -> Result<(), LexError> {
        if !self.has_more_tokens()? {
            return Err(LexError::Exhausted);
        }
        let line = self.line;
        let ch = self.peek();

        let kind = if SYMBOLS.contains(&ch) {
            self.next_char();
            TokenKind::Symbol(ch)
        } else if ch == '"' {
            self.next_char();
            let mut body = String::new();
            loop {
                match self.peek() {
                    '\0' | '\n' => return Err(LexError::UnterminatedString { line }),
                    '"' => {
                        self.next_char();
                        break;
                    }
                    _ => {
                        let ch = self.next_char();
                        // character codes must fit the 16-bit word pushed
                        // for String.appendChar
                        if u32::from(ch) > 0xFFFF {
                            return Err(LexError::IllegalCharacter { ch, line });
                        }
                        body.push(ch);
                    }
                }
            }
            TokenKind::StringConst(body)
        } else if ch.is_ascii_digit() {
            let mut digits = String::new();
            while self.peek().is_ascii_digit() {
                digits.push(self.next_char());
            }
            let value: u32 = digits
                .parse()
                .map_err(|_| LexError::IntOutOfRange { literal: digits.clone(), line })?;
            if value > 32767 {
                return Err(LexError::IntOutOfRange { literal: digits, line });
            }
            TokenKind::IntConst(value as u16)
        } else if ch.is_ascii_alphabetic() || ch == '_' {
            let mut word = String::new();
            while self.peek().is_ascii_alphanumeric() || self.peek() == '_' {
                word.push(self.next_char());
            }
            match Keyword::from_str(&word) {
                Some(kw) => TokenKind::Keyword(kw),
                None => TokenKind::Identifier(word),
            }
        } else {
            return Err(LexError::IllegalCharacter { ch, line });
        };

        self.current = Some(Token { kind, line });
        Ok(())
    }

    /// Classification of the current token. `None` before the first `advance`.
    pub fn token_type(&self) -> Option<TokenType> {
        self.current.as_ref().map(|t| t.kind.token_type())
    }

    pub fn keyword(&self) -> Option<Keyword> {
        match self.current.as_ref()?.kind {
            TokenKind::Keyword(kw) => Some(kw),
            _ => None,
        }
    }

    pub fn symbol(&self) -> Option<char> {
        match self.current.as_ref()?.kind {
            TokenKind::Symbol(ch) => Some(ch),
            _ => None,
        }
    }

    pub fn identifier(&self) -> Option<&str> {
        match &self.current.as_ref()?.kind {
            TokenKind::Identifier(name) => Some(name),
            _ => None,
        }
    }

    pub fn int_val(&self) -> Option<u16> {
        match self.current.as_ref()?.kind {
            TokenKind::IntConst(value) => Some(value),
            _ => None,
        }
    }

    pub fn string_val(&self) -> Option<&str> {
        match &self.current.as_ref()?.kind {
            TokenKind::StringConst(body) => Some(body),
            _ => None,
        }
    }

    /// The current token, payload and position together.
    pub fn current(&self) -> Option<&Token> {
        self.current.as_ref()
    }
}

/// Tokenize a whole source text.
pub fn tokenize(source: &str) -> Result<Vec<Token>, LexError> {
    let mut tokenizer = Tokenizer::new(source);
    let mut tokens = Vec::new();
    while tokenizer.has_more_tokens()? {
        tokenizer.advance()?;
        if let Some(token) = tokenizer.current() {
            tokens.push(token.clone());
        }
    }
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        tokenize(source).unwrap().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn classifies_each_token_type() {
        assert_eq!(
            kinds("let x = 42;"),
            vec![
                TokenKind::Keyword(Keyword::Let),
                TokenKind::Identifier("x".to_string()),
                TokenKind::Symbol('='),
                TokenKind::IntConst(42),
                TokenKind::Symbol(';'),
            ]
        );
    }

    #[test]
    fn string_literal_keeps_body_without_quotes() {
        assert_eq!(
            kinds("\"hi there\""),
            vec![TokenKind::StringConst("hi there".to_string())]
        );
    }

    #[test]
    fn skips_line_and_block_comments() {
        let source = "// header\nclass /* inline */ Main /** api\n doc */ {}";
        assert_eq!(
            kinds(source),
            vec![
                TokenKind::Keyword(Keyword::Class),
                TokenKind::Identifier("Main".to_string()),
                TokenKind::Symbol('{'),
                TokenKind::Symbol('}'),
            ]
        );
    }

    #[test]
    fn tracks_line_numbers() {
        let tokens = tokenize("class\n\nMain").unwrap();
        assert_eq!(tokens[0].line, 1);
        assert_eq!(tokens[1].line, 3);
    }

    #[test]
    fn keyword_prefix_is_an_identifier() {
        assert_eq!(
            kinds("classes"),
            vec![TokenKind::Identifier("classes".to_string())]
        );
    }

    #[test]
    fn rejects_unterminated_string() {
        assert_eq!(
            tokenize("\"oops"),
            Err(LexError::UnterminatedString { line: 1 })
        );
    }

    #[test]
    fn rejects_string_character_above_one_word() {
        assert_eq!(
            tokenize("\"a\u{1F600}\""),
            Err(LexError::IllegalCharacter { ch: '\u{1F600}', line: 1 })
        );
    }

    #[test]
    fn accepts_string_character_at_the_word_boundary() {
        assert_eq!(
            kinds("\"\u{FFFF}\""),
            vec![TokenKind::StringConst("\u{FFFF}".to_string())]
        );
    }

    #[test]
    fn rejects_unterminated_block_comment() {
        assert_eq!(
            tokenize("let /* oops"),
            Err(LexError::UnterminatedComment { line: 1 })
        );
    }

    #[test]
    fn rejects_out_of_range_integer() {
        assert!(matches!(
            tokenize("32768"),
            Err(LexError::IntOutOfRange { .. })
        ));
        assert_eq!(
            kinds("32767"),
            vec![TokenKind::IntConst(32767)]
        );
    }

    #[test]
    fn rejects_illegal_character() {
        assert_eq!(
            tokenize("let x = #;"),
            Err(LexError::IllegalCharacter { ch: '#', line: 1 })
        );
    }

    #[test]
    fn cursor_api_exposes_classified_values() {
        let mut tokenizer = Tokenizer::new("do draw(3);");
        tokenizer.advance().unwrap();
        assert_eq!(tokenizer.token_type(), Some(TokenType::Keyword));
        assert_eq!(tokenizer.keyword(), Some(Keyword::Do));
        tokenizer.advance().unwrap();
        assert_eq!(tokenizer.identifier(), Some("draw"));
        tokenizer.advance().unwrap();
        assert_eq!(tokenizer.symbol(), Some('('));
        tokenizer.advance().unwrap();
        assert_eq!(tokenizer.int_val(), Some(3));
        assert!(tokenizer.has_more_tokens().unwrap());
    }

    #[test]
    fn advance_past_end_is_an_error() {
        let mut tokenizer = Tokenizer::new("  // nothing here\n");
        assert!(!tokenizer.has_more_tokens().unwrap());
        assert_eq!(tokenizer.advance(), Err(LexError::Exhausted));
    }
}
