use std::io;
use std::path::Path;

use log::debug;

use crate::error::CompileError;

/// Handle to a compilation unit registered in a [`SourceMap`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SourceHandle(pub i32);

#[derive(Debug, Clone)]
pub struct Source {
    /// Path shown in diagnostics.
    pub path: String,
    pub text: Vec<u8>,
}

/// Owns the text of every compilation unit and hands it out by handle.
#[derive(Debug, Default)]
pub struct SourceMap {
    sources: Vec<Source>,
}

impl SourceMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, path: impl Into<String>, text: impl Into<Vec<u8>>) -> SourceHandle {
        let handle = SourceHandle(self.sources.len() as i32);
        self.sources.push(Source {
            path: path.into(),
            text: text.into(),
        });
        handle
    }

    /// Register an in-memory snippet under the display path `<string>`.
    pub fn add_str(&mut self, text: &str) -> SourceHandle {
        self.add("<string>", text)
    }

    /// Read a file from disk and register it under its own path.
    pub fn load(&mut self, path: impl AsRef<Path>) -> io::Result<SourceHandle> {
        let path = path.as_ref();
        let text = std::fs::read(path)?;
        debug!("loaded {} ({} bytes)", path.display(), text.len());
        Ok(self.add(path.display().to_string(), text))
    }

    pub fn get(&self, handle: SourceHandle) -> Result<&Source, CompileError> {
        usize::try_from(handle.0)
            .ok()
            .and_then(|index| self.sources.get(index))
            .ok_or(CompileError::InvalidHandle(handle.0))
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}
