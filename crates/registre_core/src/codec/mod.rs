//! Workbook persistence boundary.
//!
//! # Responsibility
//! - Define the codec contract the store persists through.
//! - Keep file-format details out of the store and service layers so the
//!   backing storage can be swapped without touching CRUD logic.
//!
//! # Invariants
//! - `write_workbook` persists every sheet of the workbook; a one-sheet
//!   mutation never loses sibling sheets.
//! - `load_workbook` never yields a sheet without an `ID` header column.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

use crate::model::table::Workbook;

pub mod memory;
pub mod xlsx;

pub use memory::MemoryCodec;
pub use xlsx::XlsxCodec;

pub type CodecResult<T> = Result<T, CodecError>;

/// Codec error for workbook load and write operations.
#[derive(Debug)]
pub enum CodecError {
    /// Filesystem-level failure.
    Io(std::io::Error),
    /// Workbook could not be read or is not a valid spreadsheet file.
    Sheet(calamine::XlsxError),
    /// Workbook could not be serialized or written.
    Write(rust_xlsxwriter::XlsxError),
    /// A sheet has no header row at all.
    MissingHeader { sheet: String },
    /// A sheet's header row has no `ID` column.
    MissingIdColumn { sheet: String },
    /// An id cell did not hold a positive integer.
    InvalidId {
        sheet: String,
        row: usize,
        value: String,
    },
    /// No workbook is stored under the given path (in-memory codec).
    WorkbookMissing(PathBuf),
}

impl Display for CodecError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "{err}"),
            Self::Sheet(err) => write!(f, "{err}"),
            Self::Write(err) => write!(f, "{err}"),
            Self::MissingHeader { sheet } => {
                write!(f, "sheet `{sheet}` has no header row")
            }
            Self::MissingIdColumn { sheet } => {
                write!(f, "sheet `{sheet}` has no `ID` column in its header row")
            }
            Self::InvalidId { sheet, row, value } => write!(
                f,
                "sheet `{sheet}` row {row}: id cell `{value}` is not a positive integer"
            ),
            Self::WorkbookMissing(path) => {
                write!(f, "no workbook stored at `{}`", path.display())
            }
        }
    }
}

impl Error for CodecError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Sheet(err) => Some(err),
            Self::Write(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for CodecError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<calamine::XlsxError> for CodecError {
    fn from(value: calamine::XlsxError) -> Self {
        Self::Sheet(value)
    }
}

impl From<rust_xlsxwriter::XlsxError> for CodecError {
    fn from(value: rust_xlsxwriter::XlsxError) -> Self {
        Self::Write(value)
    }
}

/// Persistence contract between the store and a workbook file format.
pub trait WorkbookCodec {
    /// Materializes every sheet of the workbook at `path`.
    fn load_workbook(&self, path: &Path) -> CodecResult<Workbook>;

    /// Rewrites the workbook at `path` from the in-memory state.
    ///
    /// The write covers all sheets so the persisted file is always a full
    /// mirror of `book`.
    fn write_workbook(&self, path: &Path, book: &Workbook) -> CodecResult<()>;
}
