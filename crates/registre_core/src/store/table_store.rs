//! Workbook-backed table store.
//!
//! # Responsibility
//! - Own the in-memory workbook for the process session.
//! - Keep the persisted workbook consistent with every mutation,
//!   immediately and synchronously.
//!
//! # Invariants
//! - Record ids within a sheet are exactly `1..=len` after any sequence of
//!   store mutations.
//! - A mutation becomes visible in memory only after the workbook write
//!   succeeded; a failed write leaves memory and file at the pre-operation
//!   state.
//! - `view` never mutates and never writes.

use log::{error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::codec::{CodecError, WorkbookCodec};
use crate::model::record::{DraftError, FieldValue, Record, RecordDraft, RecordId};
use crate::model::table::{Table, Workbook};

pub type StoreResult<T> = Result<T, StoreError>;

/// Store error for workbook CRUD operations.
#[derive(Debug)]
pub enum StoreError {
    /// The workbook could not be loaded; the store is unusable.
    Load(CodecError),
    /// The full-workbook rewrite failed; the mutation was not committed.
    Persist(CodecError),
    /// The named sheet does not exist in the workbook.
    SheetNotFound(String),
    /// No record with the given id exists in the target sheet.
    RecordNotFound { sheet: String, id: RecordId },
    /// The draft addressed unknown or reserved fields.
    Draft(DraftError),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Load(err) => write!(f, "failed to load workbook: {err}"),
            Self::Persist(err) => write!(f, "failed to persist workbook: {err}"),
            Self::SheetNotFound(sheet) => write!(f, "sheet not found: `{sheet}`"),
            Self::RecordNotFound { sheet, id } => {
                write!(f, "record {id} not found in sheet `{sheet}`")
            }
            Self::Draft(err) => write!(f, "{err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Load(err) | Self::Persist(err) => Some(err),
            Self::Draft(err) => Some(err),
            Self::SheetNotFound(_) | Self::RecordNotFound { .. } => None,
        }
    }
}

impl From<DraftError> for StoreError {
    fn from(value: DraftError) -> Self {
        Self::Draft(value)
    }
}

/// Explicitly owned record store over one workbook file.
///
/// The store is created by loading the entire workbook once and lives for
/// the session; there is no teardown step. All reads and mutations of the
/// workbook go through it.
pub struct TableStore<C: WorkbookCodec> {
    path: PathBuf,
    codec: C,
    book: Workbook,
}

impl<C: WorkbookCodec> TableStore<C> {
    /// Loads the entire workbook at `path` and returns a ready store.
    ///
    /// Any load failure is fatal to the caller: there is no partial-load
    /// recovery.
    pub fn open(path: impl Into<PathBuf>, codec: C) -> StoreResult<Self> {
        let path = path.into();
        let book = codec.load_workbook(&path).map_err(StoreError::Load)?;
        info!(
            "event=store_open module=store status=ok path={} sheets={}",
            path.display(),
            book.sheets().len()
        );
        Ok(Self { path, codec, book })
    }

    /// Path of the backing workbook file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The codec this store persists through.
    pub fn codec(&self) -> &C {
        &self.codec
    }

    /// Known sheet names, in file order.
    pub fn sheet_names(&self) -> Vec<&str> {
        self.book.sheet_names()
    }

    /// Returns the current in-memory table for `sheet`, unchanged.
    pub fn view(&self, sheet: &str) -> StoreResult<&Table> {
        self.book
            .sheet(sheet)
            .ok_or_else(|| StoreError::SheetNotFound(sheet.to_string()))
    }

    /// Appends a new record to `sheet` and persists the workbook.
    ///
    /// The record's id is one past the highest existing id (`1` on an empty
    /// table); drafted fields are copied in and schema fields the draft
    /// omits are filled with empty text. Returns the assigned id.
    pub fn add(&mut self, sheet: &str, draft: &RecordDraft) -> StoreResult<RecordId> {
        let started_at = Instant::now();
        let current = self.view(sheet)?;
        current.validate_draft(draft)?;

        let mut next = current.clone();
        let id = next.next_id();
        let mut record = Record::new(id);
        for name in next.schema() {
            let value = draft
                .get(name)
                .cloned()
                .unwrap_or_else(|| FieldValue::Text(String::new()));
            record.set_field(name.clone(), value);
        }
        next.push(record);

        self.commit(sheet, next)?;
        info!(
            "event=record_add module=store status=ok sheet={sheet} id={id} duration_ms={}",
            started_at.elapsed().as_millis()
        );
        Ok(id)
    }

    /// Overwrites exactly the drafted fields of one record and persists.
    ///
    /// Fields the draft does not name are left untouched. Returns
    /// `RecordNotFound` without mutating or writing when no record has the
    /// given id.
    pub fn update(&mut self, sheet: &str, id: RecordId, draft: &RecordDraft) -> StoreResult<()> {
        let started_at = Instant::now();
        let current = self.view(sheet)?;
        current.validate_draft(draft)?;
        if current.record(id).is_none() {
            warn!("event=record_update module=store status=not_found sheet={sheet} id={id}");
            return Err(StoreError::RecordNotFound {
                sheet: sheet.to_string(),
                id,
            });
        }

        let mut next = current.clone();
        if let Some(record) = next.record_mut(id) {
            for (name, value) in draft.iter() {
                record.set_field(name.to_string(), value.clone());
            }
        }

        self.commit(sheet, next)?;
        info!(
            "event=record_update module=store status=ok sheet={sheet} id={id} duration_ms={}",
            started_at.elapsed().as_millis()
        );
        Ok(())
    }

    /// Removes one record, renumbers the survivors and persists.
    ///
    /// Every surviving record whose id was greater than the deleted id is
    /// decremented by exactly one, so ids stay dense. Returns
    /// `RecordNotFound` without mutating or writing when no record has the
    /// given id.
    pub fn delete(&mut self, sheet: &str, id: RecordId) -> StoreResult<()> {
        let started_at = Instant::now();
        let current = self.view(sheet)?;
        if current.record(id).is_none() {
            warn!("event=record_delete module=store status=not_found sheet={sheet} id={id}");
            return Err(StoreError::RecordNotFound {
                sheet: sheet.to_string(),
                id,
            });
        }

        let mut next = current.clone();
        next.remove(id);

        self.commit(sheet, next)?;
        info!(
            "event=record_delete module=store status=ok sheet={sheet} id={id} duration_ms={}",
            started_at.elapsed().as_millis()
        );
        Ok(())
    }

    /// Persists a candidate table state, then swaps it into memory.
    ///
    /// The write covers the whole workbook with the candidate in place, so
    /// sibling sheets are carried along unchanged. On a write failure the
    /// candidate is dropped and the in-memory workbook stays at its
    /// pre-operation state.
    fn commit(&mut self, sheet: &str, next: Table) -> StoreResult<()> {
        let mut candidate = self.book.clone();
        match candidate.sheet_mut(sheet) {
            Some(slot) => *slot = next,
            None => return Err(StoreError::SheetNotFound(sheet.to_string())),
        }

        match self.codec.write_workbook(&self.path, &candidate) {
            Ok(()) => {
                self.book = candidate;
                Ok(())
            }
            Err(err) => {
                error!(
                    "event=book_persist module=store status=error sheet={sheet} error={err}"
                );
                Err(StoreError::Persist(err))
            }
        }
    }
}
