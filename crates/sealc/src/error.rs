use std::collections::TryReserveError;
use std::fmt;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CompileError {
    #[error("{msg}")]
    Lexical { line: u32, msg: String },

    #[error("expected {expected} but found {found}")]
    Syntax {
        line: u32,
        expected: &'static str,
        found: &'static str,
    },

    #[error("name '{name}' {reason}")]
    Name {
        line: u32,
        name: String,
        reason: NameReason,
    },

    #[error("register r{register} exceeds the addressable range")]
    ResourceLimit { register: u32 },

    #[error("nesting deeper than {limit} levels")]
    NestingLimit { line: u32, limit: u32 },

    #[error("out of memory")]
    OutOfMemory,

    #[error("invalid source handle {0}")]
    InvalidHandle(i32),

    #[error("codegen error: {0}")]
    Codegen(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameReason {
    Duplicate,
    Undefined,
}

impl fmt::Display for NameReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NameReason::Duplicate => write!(f, "is already declared in this scope"),
            NameReason::Undefined => write!(f, "is not defined"),
        }
    }
}

/// Error taxonomy shared by every stage of the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    LexicalError,
    SyntaxError,
    NameError,
    ResourceLimitError,
    OutOfMemoryError,
    SourceError,
    InternalError,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl CompileError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CompileError::Lexical { .. } => ErrorKind::LexicalError,
            CompileError::Syntax { .. } => ErrorKind::SyntaxError,
            CompileError::Name { .. } => ErrorKind::NameError,
            CompileError::ResourceLimit { .. } | CompileError::NestingLimit { .. } => {
                ErrorKind::ResourceLimitError
            }
            CompileError::OutOfMemory => ErrorKind::OutOfMemoryError,
            CompileError::InvalidHandle(_) => ErrorKind::SourceError,
            CompileError::Codegen(_) => ErrorKind::InternalError,
        }
    }

    /// 1-based source line the error points at, when one is known.
    pub fn line(&self) -> Option<u32> {
        match self {
            CompileError::Lexical { line, .. }
            | CompileError::Syntax { line, .. }
            | CompileError::Name { line, .. }
            | CompileError::NestingLimit { line, .. } => Some(*line),
            _ => None,
        }
    }
}

impl From<TryReserveError> for CompileError {
    fn from(_: TryReserveError) -> Self {
        CompileError::OutOfMemory
    }
}
