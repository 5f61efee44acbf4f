//! Sheet and workbook containers.
//!
//! # Responsibility
//! - Hold the ordered record sequence and fixed schema of each sheet.
//! - Provide the id-assignment and renumbering primitives the store builds
//!   its mutation contract on.
//!
//! # Invariants
//! - Schema field order and sheet order mirror the backing file.
//! - `remove` closes the gap left by the removed record: surviving records
//!   keep their relative order and ids stay dense.
//! - `next_id` is `max + 1`; it never re-fills gaps left by external
//!   tampering.

use crate::model::record::{DraftError, Record, RecordDraft, RecordId, ID_FIELD};
use serde::{Deserialize, Serialize};

/// A named, independently schema'd collection of records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    schema: Vec<String>,
    records: Vec<Record>,
}

impl Table {
    /// Creates an empty table with the given non-ID schema fields.
    pub fn new(schema: Vec<String>) -> Self {
        Self {
            schema,
            records: Vec::new(),
        }
    }

    /// Non-ID field names in column order.
    pub fn schema(&self) -> &[String] {
        &self.schema
    }

    /// Records in insertion order.
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns whether the table has no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns the record with the given id.
    pub fn record(&self, id: RecordId) -> Option<&Record> {
        self.records.iter().find(|record| record.id == id)
    }

    /// Returns the record with the given id for in-place mutation.
    pub fn record_mut(&mut self, id: RecordId) -> Option<&mut Record> {
        self.records.iter_mut().find(|record| record.id == id)
    }

    /// Appends a record as loaded or built by the caller.
    ///
    /// The caller is responsible for id assignment; store mutations go
    /// through `next_id` instead of pushing arbitrary ids.
    pub fn push(&mut self, record: Record) {
        self.records.push(record);
    }

    /// Next id to assign on add: one past the highest existing id.
    ///
    /// An empty table yields `1`. Gaps are never re-filled, so an add after
    /// external tampering (`{1, 3, 5}`) still yields `6`.
    pub fn next_id(&self) -> RecordId {
        self.records
            .iter()
            .map(|record| record.id)
            .max()
            .unwrap_or(0)
            + 1
    }

    /// Removes the record with `id` and closes the gap it leaves.
    ///
    /// Every surviving record whose id was greater than `id` is decremented
    /// by exactly one, restoring the dense `1..=len` sequence. Returns
    /// `false` when no record has that id.
    pub fn remove(&mut self, id: RecordId) -> bool {
        let index = match self.records.iter().position(|record| record.id == id) {
            Some(index) => index,
            None => return false,
        };
        self.records.remove(index);
        for record in &mut self.records {
            if record.id > id {
                record.id -= 1;
            }
        }
        true
    }

    /// Checks a draft against this table's schema.
    ///
    /// Unknown fields and the reserved `ID` column are rejected; missing
    /// fields are legal (add fills them with empty text, update leaves them
    /// untouched).
    pub fn validate_draft(&self, draft: &RecordDraft) -> Result<(), DraftError> {
        for (name, _) in draft.iter() {
            if name == ID_FIELD {
                return Err(DraftError::IdFieldReserved);
            }
            if !self.schema.iter().any(|field| field == name) {
                return Err(DraftError::UnknownField(name.to_string()));
            }
        }
        Ok(())
    }
}

/// One named sheet of a workbook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sheet {
    /// Sheet name as it appears in the file.
    pub name: String,
    /// The sheet's table.
    pub table: Table,
}

/// All sheets of one workbook file, in file order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workbook {
    sheets: Vec<Sheet>,
}

impl Workbook {
    /// Creates an empty workbook.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a sheet, preserving file order.
    pub fn push_sheet(&mut self, name: impl Into<String>, table: Table) {
        self.sheets.push(Sheet {
            name: name.into(),
            table,
        });
    }

    /// Sheets in file order.
    pub fn sheets(&self) -> &[Sheet] {
        &self.sheets
    }

    /// Sheet names in file order.
    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|sheet| sheet.name.as_str()).collect()
    }

    /// Returns the table of the named sheet.
    pub fn sheet(&self, name: &str) -> Option<&Table> {
        self.sheets
            .iter()
            .find(|sheet| sheet.name == name)
            .map(|sheet| &sheet.table)
    }

    /// Returns the table of the named sheet for in-place mutation.
    pub fn sheet_mut(&mut self, name: &str) -> Option<&mut Table> {
        self.sheets
            .iter_mut()
            .find(|sheet| sheet.name == name)
            .map(|sheet| &mut sheet.table)
    }
}
