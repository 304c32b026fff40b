use std::mem::discriminant;

use log::debug;

use crate::ast::*;
use crate::error::CompileError;
use crate::lexer::{Lexed, Token, TokenKind};
use crate::seq::Seq;
use crate::strings::StrRef;

/// Deepest nesting of blocks, parentheses and `^` exponents the parser
/// accepts.
pub const MAX_NESTING_DEPTH: u32 = 256;

pub fn parse(lexed: Lexed) -> Result<Ast, CompileError> {
    let Lexed { tokens, strings } = lexed;
    let mut parser = Parser::new(tokens);
    let root = parser.parse_file()?;
    debug!("parsed {} nodes", parser.arena.len());
    Ok(Ast::new(parser.arena, root, strings))
}

struct Parser {
    tokens: Seq<Token>,
    pos: usize,
    depth: u32,
    arena: Arena,
}

impl Parser {
    fn new(tokens: Seq<Token>) -> Self {
        Parser {
            tokens,
            pos: 0,
            depth: 0,
            arena: Arena::new(),
        }
    }

    /// Current token. The stream always ends with `Eof` and the cursor never
    /// moves past it.
    fn token(&self) -> Token {
        match self.tokens.get(self.pos) {
            Some(token) => *token,
            None => Token {
                kind: TokenKind::Eof,
                line: self.tokens.last().map(|t| t.line).unwrap_or(1),
            },
        }
    }

    fn advance(&mut self) {
        if self.token().kind != TokenKind::Eof {
            self.pos += 1;
        }
    }

    fn check(&self, kind: &TokenKind) -> bool {
        discriminant(&self.token().kind) == discriminant(kind)
    }

    fn expect(&mut self, kind: &TokenKind) -> Result<(), CompileError> {
        if self.check(kind) {
            self.advance();
            Ok(())
        } else {
            Err(self.error(kind.describe()))
        }
    }

    fn expect_ident(&mut self) -> Result<StrRef, CompileError> {
        match self.token().kind {
            TokenKind::Ident(name) => {
                self.advance();
                Ok(name)
            }
            _ => Err(self.error("identifier")),
        }
    }

    fn error(&self, expected: &'static str) -> CompileError {
        let token = self.token();
        CompileError::Syntax {
            line: token.line,
            expected,
            found: token.kind.describe(),
        }
    }

    fn enter(&mut self) -> Result<(), CompileError> {
        if self.depth >= MAX_NESTING_DEPTH {
            return Err(CompileError::NestingLimit {
                line: self.token().line,
                limit: MAX_NESTING_DEPTH,
            });
        }
        self.depth += 1;
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    fn add(&mut self, kind: NodeKind, line: u32) -> Result<NodeId, CompileError> {
        self.arena.alloc(Node { kind, line })
    }

    fn parse_file(&mut self) -> Result<NodeId, CompileError> {
        let mut children = Seq::new();
        while !self.check(&TokenKind::Eof) {
            children.push(self.parse_statement()?)?;
        }
        self.add(
            NodeKind::Block {
                children: children.into_vec(),
            },
            1,
        )
    }

    fn parse_statement(&mut self) -> Result<NodeId, CompileError> {
        match self.token().kind {
            TokenKind::KwVar => self.parse_var_declr(),
            TokenKind::LBrace => self.parse_block(),
            _ => Err(self.error("statement")),
        }
    }

    fn parse_block(&mut self) -> Result<NodeId, CompileError> {
        let line = self.token().line;
        self.expect(&TokenKind::LBrace)?;
        self.enter()?;
        let mut children = Seq::new();
        while !self.check(&TokenKind::RBrace) {
            if self.check(&TokenKind::Eof) {
                return Err(self.error("'}'"));
            }
            children.push(self.parse_statement()?)?;
        }
        self.leave();
        self.expect(&TokenKind::RBrace)?;
        self.add(
            NodeKind::Block {
                children: children.into_vec(),
            },
            line,
        )
    }

    fn parse_var_declr(&mut self) -> Result<NodeId, CompileError> {
        let line = self.token().line;
        self.expect(&TokenKind::KwVar)?;
        let name = self.expect_ident()?;
        self.expect(&TokenKind::Equals)?;
        let value = self.parse_expr()?;
        self.expect(&TokenKind::Semicolon)?;
        self.add(NodeKind::VarDeclr { name, value }, line)
    }

    fn parse_expr(&mut self) -> Result<NodeId, CompileError> {
        let mut left = self.parse_mul()?;
        loop {
            let op = match self.token().kind {
                TokenKind::Plus => BinOp::Add,
                TokenKind::Minus => BinOp::Sub,
                _ => break,
            };
            let line = self.token().line;
            self.advance();
            let right = self.parse_mul()?;
            left = self.add(NodeKind::BinOp { op, lhs: left, rhs: right }, line)?;
        }
        Ok(left)
    }

    fn parse_mul(&mut self) -> Result<NodeId, CompileError> {
        let mut left = self.parse_pow()?;
        loop {
            let op = match self.token().kind {
                TokenKind::Star => BinOp::Mul,
                TokenKind::Slash => BinOp::Div,
                TokenKind::Percent => BinOp::Mod,
                _ => break,
            };
            let line = self.token().line;
            self.advance();
            let right = self.parse_pow()?;
            left = self.add(NodeKind::BinOp { op, lhs: left, rhs: right }, line)?;
        }
        Ok(left)
    }

    /// `^` associates to the right: `2 ^ 3 ^ 2` is `2 ^ (3 ^ 2)`.
    fn parse_pow(&mut self) -> Result<NodeId, CompileError> {
        let base = self.parse_value()?;
        if !self.check(&TokenKind::Caret) {
            return Ok(base);
        }
        let line = self.token().line;
        self.advance();
        self.enter()?;
        let exponent = self.parse_pow()?;
        self.leave();
        self.add(
            NodeKind::BinOp {
                op: BinOp::Pow,
                lhs: base,
                rhs: exponent,
            },
            line,
        )
    }

    fn parse_value(&mut self) -> Result<NodeId, CompileError> {
        let token = self.token();
        match token.kind {
            TokenKind::NumInt(value) => {
                self.advance();
                self.add(NodeKind::NumInt(value), token.line)
            }
            TokenKind::Ident(name) => {
                self.advance();
                self.add(NodeKind::Access(name), token.line)
            }
            TokenKind::LParen => {
                self.advance();
                self.enter()?;
                let expr = self.parse_expr()?;
                self.leave();
                self.expect(&TokenKind::RParen)?;
                Ok(expr)
            }
            _ => Err(self.error("expression")),
        }
    }
}
