use log::debug;

use crate::error::{CompileError, ErrorKind};
use crate::source::{SourceHandle, SourceMap};
use crate::Compiled;

/// Longest diagnostic message kept, in bytes.
pub const MAX_DIAGNOSTIC_LEN: usize = 511;

/// The error a compilation stopped on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub kind: ErrorKind,
    /// Formatted as `path:line: message` when the location is known.
    pub message: String,
    pub path: Option<String>,
    pub line: Option<u32>,
}

/// State shared by every stage of a compilation: the sources being compiled
/// and a single sticky error slot.
///
/// Once an error is recorded it is never overwritten, and [`Context::compile`]
/// refuses to run until the error is taken.
#[derive(Debug, Default)]
pub struct Context {
    sources: SourceMap,
    error: Option<Diagnostic>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sources(sources: SourceMap) -> Self {
        Context {
            sources,
            error: None,
        }
    }

    pub fn sources(&self) -> &SourceMap {
        &self.sources
    }

    pub fn sources_mut(&mut self) -> &mut SourceMap {
        &mut self.sources
    }

    pub fn has_error(&self) -> bool {
        self.error.is_some()
    }

    pub fn error(&self) -> Option<&Diagnostic> {
        self.error.as_ref()
    }

    /// Clear the error slot, returning what it held.
    pub fn take_error(&mut self) -> Option<Diagnostic> {
        self.error.take()
    }

    pub fn set_error(&mut self, kind: ErrorKind, message: impl Into<String>) {
        self.record(Diagnostic {
            kind,
            message: message.into(),
            path: None,
            line: None,
        });
    }

    pub fn set_out_of_memory_error(&mut self) {
        self.set_error(ErrorKind::OutOfMemoryError, "out of memory");
    }

    /// Record a pipeline error, prefixed with its location when known.
    pub fn report(&mut self, err: &CompileError, path: Option<&str>) {
        let line = err.line();
        let message = match (path, line) {
            (Some(path), Some(line)) => format!("{path}:{line}: {err}"),
            (Some(path), None) => format!("{path}: {err}"),
            _ => err.to_string(),
        };
        self.record(Diagnostic {
            kind: err.kind(),
            message,
            path: path.map(str::to_owned),
            line,
        });
    }

    fn record(&mut self, mut diagnostic: Diagnostic) {
        if let Some(existing) = &self.error {
            debug!("dropping diagnostic, slot already holds: {}", existing.message);
            return;
        }
        truncate_at_boundary(&mut diagnostic.message, MAX_DIAGNOSTIC_LEN);
        self.error = Some(diagnostic);
    }

    /// Run the whole pipeline over a registered source.
    ///
    /// Returns `None` with the error slot set on failure, or straight away if
    /// the slot was already set.
    pub fn compile(&mut self, handle: SourceHandle) -> Option<Compiled> {
        if let Some(existing) = &self.error {
            debug!("not compiling, pending error: {}", existing.message);
            return None;
        }

        let result = match self.sources.get(handle) {
            Ok(source) => {
                debug!("compiling {}", source.path);
                crate::compile(&source.text).map_err(|err| (err, Some(source.path.clone())))
            }
            Err(err) => Err((err, None)),
        };

        match result {
            Ok(compiled) => Some(compiled),
            Err((err, path)) => {
                self.report(&err, path.as_deref());
                None
            }
        }
    }
}

fn truncate_at_boundary(message: &mut String, max: usize) {
    if message.len() <= max {
        return;
    }
    let mut end = max;
    while !message.is_char_boundary(end) {
        end -= 1;
    }
    message.truncate(end);
}
