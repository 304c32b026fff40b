use log::debug;
use logos::{Logos, Skip};

use crate::error::CompileError;
use crate::seq::Seq;
use crate::strings::{StrRef, StringTable};

/// Line bookkeeping carried through the scanner.
#[derive(Debug, Default)]
struct Lines {
    newlines: u32,
}

impl Lines {
    fn current(&self) -> u32 {
        self.newlines + 1
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
enum LexFault {
    #[default]
    Invalid,
    Overflow,
}

#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(source = [u8])]
#[logos(extras = Lines)]
#[logos(error = LexFault)]
#[logos(skip r"[ \t\r\x0B\x0C]+")]
#[logos(skip r"//[^\n]*")]
enum Lexeme {
    #[token("var")]
    KwVar,
    #[token("func")]
    KwFunc,

    #[regex(r"[0-9]+", parse_int)]
    Int(i64),
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*")]
    Ident,

    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token("^")]
    Caret,

    #[token(",")]
    Comma,
    #[token(":")]
    Colon,
    #[token(";")]
    Semicolon,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("=")]
    Equals,

    #[token("\n", newline)]
    Newline,
}

fn newline(lex: &mut logos::Lexer<Lexeme>) -> Skip {
    lex.extras.newlines += 1;
    Skip
}

fn parse_int(lex: &mut logos::Lexer<Lexeme>) -> Result<i64, LexFault> {
    lex.slice().iter().try_fold(0i64, |value, digit| {
        value
            .checked_mul(10)
            .and_then(|v| v.checked_add((digit - b'0') as i64))
            .ok_or(LexFault::Overflow)
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Ident(StrRef),
    NumInt(i64),

    // Operators
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Caret,

    // Punctuation
    Comma,
    Colon,
    Semicolon,
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Equals,

    // Keywords
    KwVar,
    KwFunc,

    Eof,
}

impl TokenKind {
    /// Name of the token class, as used in syntax errors.
    pub fn describe(&self) -> &'static str {
        match self {
            TokenKind::Ident(_) => "identifier",
            TokenKind::NumInt(_) => "integer",
            TokenKind::Plus => "'+'",
            TokenKind::Minus => "'-'",
            TokenKind::Star => "'*'",
            TokenKind::Slash => "'/'",
            TokenKind::Percent => "'%'",
            TokenKind::Caret => "'^'",
            TokenKind::Comma => "','",
            TokenKind::Colon => "':'",
            TokenKind::Semicolon => "';'",
            TokenKind::LParen => "'('",
            TokenKind::RParen => "')'",
            TokenKind::LBracket => "'['",
            TokenKind::RBracket => "']'",
            TokenKind::LBrace => "'{'",
            TokenKind::RBrace => "'}'",
            TokenKind::Equals => "'='",
            TokenKind::KwVar => "'var'",
            TokenKind::KwFunc => "'func'",
            TokenKind::Eof => "end of file",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub line: u32,
}

/// Output of the lexer: the token sequence, always terminated by a single
/// [`TokenKind::Eof`], and the identifier text it references.
#[derive(Debug)]
pub struct Lexed {
    pub tokens: Seq<Token>,
    pub strings: StringTable,
}

pub fn lex(source: &[u8]) -> Result<Lexed, CompileError> {
    let mut tokens = Seq::new();
    let mut strings = StringTable::new();

    let mut lexer = Lexeme::lexer(source);

    while let Some(result) = lexer.next() {
        let line = lexer.extras.current();
        let kind = match result {
            Ok(lexeme) => match lexeme {
                Lexeme::KwVar => TokenKind::KwVar,
                Lexeme::KwFunc => TokenKind::KwFunc,
                Lexeme::Int(value) => TokenKind::NumInt(value),
                Lexeme::Ident => TokenKind::Ident(strings.intern(lexer.slice())?),
                Lexeme::Plus => TokenKind::Plus,
                Lexeme::Minus => TokenKind::Minus,
                Lexeme::Star => TokenKind::Star,
                Lexeme::Slash => TokenKind::Slash,
                Lexeme::Percent => TokenKind::Percent,
                Lexeme::Caret => TokenKind::Caret,
                Lexeme::Comma => TokenKind::Comma,
                Lexeme::Colon => TokenKind::Colon,
                Lexeme::Semicolon => TokenKind::Semicolon,
                Lexeme::LParen => TokenKind::LParen,
                Lexeme::RParen => TokenKind::RParen,
                Lexeme::LBracket => TokenKind::LBracket,
                Lexeme::RBracket => TokenKind::RBracket,
                Lexeme::LBrace => TokenKind::LBrace,
                Lexeme::RBrace => TokenKind::RBrace,
                Lexeme::Equals => TokenKind::Equals,
                // Skipped by its callback.
                Lexeme::Newline => continue,
            },
            Err(LexFault::Overflow) => {
                return Err(CompileError::Lexical {
                    line,
                    msg: "integer literal too large".into(),
                });
            }
            Err(LexFault::Invalid) => {
                let byte = lexer.slice().first().copied().unwrap_or(0);
                let msg = if byte.is_ascii_graphic() {
                    format!("invalid character '{}'", byte as char)
                } else {
                    format!("invalid byte 0x{byte:02X}")
                };
                return Err(CompileError::Lexical { line, msg });
            }
        };
        tokens.push(Token { kind, line })?;
    }

    tokens.push(Token {
        kind: TokenKind::Eof,
        line: lexer.extras.current(),
    })?;

    debug!(
        "lexed {} tokens, {} distinct identifiers",
        tokens.len(),
        strings.len()
    );
    Ok(Lexed { tokens, strings })
}
