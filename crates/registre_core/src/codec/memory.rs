//! In-memory codec for tests and embedders.
//!
//! The analog of an in-memory database mode: workbooks live in a map keyed
//! by path, so store behavior can be exercised and the "persisted" state
//! inspected without touching the filesystem.

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use super::{CodecError, CodecResult, WorkbookCodec};
use crate::model::table::Workbook;

/// Codec that persists workbooks into process memory.
#[derive(Debug, Default)]
pub struct MemoryCodec {
    books: RefCell<HashMap<PathBuf, Workbook>>,
}

impl MemoryCodec {
    /// Creates an empty in-memory codec.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a codec pre-seeded with one workbook, ready for `load`.
    pub fn seeded(path: impl Into<PathBuf>, book: Workbook) -> Self {
        let codec = Self::new();
        codec.books.borrow_mut().insert(path.into(), book);
        codec
    }

    /// Returns a copy of the workbook last written under `path`.
    ///
    /// Lets tests assert on persisted state independently of the store's
    /// in-memory view.
    pub fn stored(&self, path: &Path) -> Option<Workbook> {
        self.books.borrow().get(path).cloned()
    }
}

impl WorkbookCodec for MemoryCodec {
    fn load_workbook(&self, path: &Path) -> CodecResult<Workbook> {
        self.books
            .borrow()
            .get(path)
            .cloned()
            .ok_or_else(|| CodecError::WorkbookMissing(path.to_path_buf()))
    }

    fn write_workbook(&self, path: &Path, book: &Workbook) -> CodecResult<()> {
        self.books
            .borrow_mut()
            .insert(path.to_path_buf(), book.clone());
        Ok(())
    }
}
