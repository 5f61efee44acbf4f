//! Record domain model and stored-text normalization.
//!
//! # Responsibility
//! - Define the canonical record shape shared by every sheet.
//! - Own the normalization between semantic field values and the text
//!   representation persisted in workbook cells.
//!
//! # Invariants
//! - `Record::id` is a positive integer; the `ID` column never appears in
//!   `Record::fields`.
//! - A `FieldValue` round-trips unchanged through `to_cell_text` /
//!   `from_cell_text`.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Reserved identifier column name present in every sheet.
pub const ID_FIELD: &str = "ID";

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M:%S";
const TIME_FORMAT_SHORT: &str = "%H:%M";

/// Dense 1-based rank of a record within its table.
///
/// Kept as a type alias to make semantic intent explicit in signatures.
/// These are positional ranks, not stable identifiers: deleting a record
/// renumbers every record behind it.
pub type RecordId = u32;

/// One cell value with its semantic type.
///
/// The stored (on-disk) representation is always text: dates serialize as
/// `YYYY-MM-DD` and times as `HH:MM:SS`, so a write/reload cycle yields the
/// same value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldValue {
    /// Free-form text.
    Text(String),
    /// Calendar date, normalized to `YYYY-MM-DD`.
    Date(NaiveDate),
    /// Time of day, normalized to `HH:MM:SS`.
    Time(NaiveTime),
}

impl FieldValue {
    /// Serializes this value into its stored cell representation.
    pub fn to_cell_text(&self) -> String {
        match self {
            Self::Text(value) => value.clone(),
            Self::Date(value) => value.format(DATE_FORMAT).to_string(),
            Self::Time(value) => value.format(TIME_FORMAT).to_string(),
        }
    }

    /// Parses a stored cell into the richest matching semantic type.
    ///
    /// Detection is intentionally narrow: only the exact stored formats
    /// (`YYYY-MM-DD`, `HH:MM:SS`, `HH:MM`) are promoted. Everything else
    /// stays text, so loading never reinterprets data the store did not
    /// write itself.
    pub fn from_cell_text(raw: &str) -> Self {
        let trimmed = raw.trim();
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, DATE_FORMAT) {
            return Self::Date(date);
        }
        if let Ok(time) = NaiveTime::parse_from_str(trimmed, TIME_FORMAT) {
            return Self::Time(time);
        }
        if let Ok(time) = NaiveTime::parse_from_str(trimmed, TIME_FORMAT_SHORT) {
            return Self::Time(time);
        }
        Self::Text(raw.to_string())
    }

    /// Returns whether this value counts as absent for required-field checks.
    ///
    /// Date and time values are never empty; text is empty when it is blank
    /// after trimming.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(value) => value.trim().is_empty(),
            Self::Date(_) | Self::Time(_) => false,
        }
    }
}

/// One row of a sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Dense 1-based rank within the owning table.
    pub id: RecordId,
    /// Non-ID field values keyed by schema field name.
    pub fields: BTreeMap<String, FieldValue>,
}

impl Record {
    /// Creates an empty record with the given rank.
    pub fn new(id: RecordId) -> Self {
        Self {
            id,
            fields: BTreeMap::new(),
        }
    }

    /// Returns one field value by schema name.
    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    /// Sets one field value by schema name.
    pub fn set_field(&mut self, name: impl Into<String>, value: FieldValue) {
        self.fields.insert(name.into(), value);
    }
}

/// Caller-supplied field values for add/update operations.
///
/// A draft never carries the `ID` column; ranks are assigned and maintained
/// by the store alone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordDraft {
    values: BTreeMap<String, FieldValue>,
}

impl RecordDraft {
    /// Creates an empty draft.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style field assignment.
    pub fn with(mut self, name: impl Into<String>, value: FieldValue) -> Self {
        self.insert(name, value);
        self
    }

    /// Sets one drafted field value.
    pub fn insert(&mut self, name: impl Into<String>, value: FieldValue) {
        self.values.insert(name.into(), value);
    }

    /// Returns one drafted value by field name.
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.values.get(name)
    }

    /// Returns whether the draft carries no fields at all.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterates drafted `(field, value)` pairs in field-name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.values.iter().map(|(name, value)| (name.as_str(), value))
    }
}

/// Validation error for drafted field input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DraftError {
    /// Draft addresses a field the sheet schema does not contain.
    UnknownField(String),
    /// Draft tries to write the reserved `ID` column.
    IdFieldReserved,
}

impl Display for DraftError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownField(name) => write!(f, "unknown field: `{name}`"),
            Self::IdFieldReserved => write!(f, "the `{ID_FIELD}` column cannot be written directly"),
        }
    }
}

impl Error for DraftError {}
