pub mod ast;
pub mod codegen;
pub mod context;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod seq;
pub mod source;
pub mod strings;

pub use context::{Context, Diagnostic};
pub use error::{CompileError, ErrorKind};
pub use source::{SourceHandle, SourceMap};

use seal_bytecode::Chunk;

/// Result of a successful compilation. The tree and its string table are
/// handed back alongside the bytecode.
#[derive(Debug)]
pub struct Compiled {
    pub ast: ast::Ast,
    pub chunk: Chunk,
}

/// Compile source text to a bytecode chunk.
pub fn compile(source: &[u8]) -> Result<Compiled, CompileError> {
    let lexed = lexer::lex(source)?;
    let ast = parser::parse(lexed)?;
    let chunk = codegen::emit(&ast)?;
    Ok(Compiled { ast, chunk })
}
