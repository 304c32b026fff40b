use std::borrow::Cow;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::error::CompileError;
use crate::seq::Seq;

/// Reference to an entry of a [`StringTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StrRef {
    pub offset: u32,
    pub len: u32,
}

/// Append-only byte buffer holding identifier text.
///
/// Each distinct string is stored once; interning the same text again returns
/// the reference handed out the first time, so two references are equal
/// exactly when their text is.
#[derive(Debug, Default)]
pub struct StringTable {
    bytes: Seq<u8>,
    index: FxHashMap<Box<[u8]>, StrRef>,
}

impl StringTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn intern(&mut self, text: &[u8]) -> Result<StrRef, CompileError> {
        if let Some(existing) = self.index.get(text) {
            return Ok(*existing);
        }

        let offset = u32::try_from(self.bytes.len()).map_err(|_| CompileError::OutOfMemory)?;
        let len = u32::try_from(text.len()).map_err(|_| CompileError::OutOfMemory)?;
        self.bytes.extend_from_slice(text)?;

        let entry = StrRef { offset, len };
        self.index.try_reserve(1)?;
        self.index.insert(text.into(), entry);
        Ok(entry)
    }

    /// Bytes of an entry, or `None` if the reference does not belong to this
    /// table.
    pub fn get(&self, entry: StrRef) -> Option<&[u8]> {
        let start = entry.offset as usize;
        self.bytes.get(start..start + entry.len as usize)
    }

    pub fn text(&self, entry: StrRef) -> Cow<'_, str> {
        String::from_utf8_lossy(self.get(entry).unwrap_or_default())
    }

    /// Number of distinct entries.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Total bytes stored.
    pub fn byte_len(&self) -> usize {
        self.bytes.len()
    }
}
