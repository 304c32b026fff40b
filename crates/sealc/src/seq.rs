//! Growable sequence backing every buffer the pipeline builds.
//!
//! Growth goes through fallible reservation so that running out of memory
//! surfaces as [`CompileError::OutOfMemory`] instead of aborting the process.
//! Invariant: `len() <= capacity()`.

use std::ops::Deref;

use crate::error::CompileError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Seq<T> {
    items: Vec<T>,
}

impl<T> Default for Seq<T> {
    fn default() -> Self {
        Seq { items: Vec::new() }
    }
}

impl<T> Seq<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn capacity(&self) -> usize {
        self.items.capacity()
    }

    /// Make room for `additional` more items, growing the capacity by half
    /// when it runs out.
    pub fn reserve(&mut self, additional: usize) -> Result<(), CompileError> {
        let needed = self
            .items
            .len()
            .checked_add(additional)
            .ok_or(CompileError::OutOfMemory)?;
        let cap = self.items.capacity();
        if needed <= cap {
            return Ok(());
        }
        let target = (cap + cap / 2).max(needed).max(1);
        self.items.try_reserve_exact(target - self.items.len())?;
        Ok(())
    }

    /// Append an item and return its index.
    pub fn push(&mut self, item: T) -> Result<usize, CompileError> {
        self.reserve(1)?;
        let index = self.items.len();
        self.items.push(item);
        Ok(index)
    }

    pub fn pop(&mut self) -> Option<T> {
        self.items.pop()
    }

    pub fn last_mut(&mut self) -> Option<&mut T> {
        self.items.last_mut()
    }

    pub fn into_vec(self) -> Vec<T> {
        self.items
    }
}

impl<T: Copy> Seq<T> {
    pub fn extend_from_slice(&mut self, items: &[T]) -> Result<(), CompileError> {
        self.reserve(items.len())?;
        self.items.extend_from_slice(items);
        Ok(())
    }
}

impl<T> Deref for Seq<T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        &self.items
    }
}
