//! Record use-case service.
//!
//! # Responsibility
//! - Enforce interaction-level validation (required fields) before store
//!   mutations.
//! - Map store errors onto the warning/failure split presentation layers
//!   render from.
//!
//! # Invariants
//! - Required-field checks run before any store mutation or file write.
//! - A rejected request leaves in-memory and persisted state unchanged.

use log::warn;
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

use crate::codec::WorkbookCodec;
use crate::model::record::{DraftError, FieldValue, RecordDraft, RecordId};
use crate::model::table::Table;
use crate::store::table_store::{StoreError, TableStore};

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Service error for record use-cases.
#[derive(Debug)]
pub enum ServiceError {
    /// A required field is absent or empty; nothing was created or changed.
    MissingRequiredField { sheet: String, field: String },
    /// The referenced record does not exist; reported as a warning.
    RecordNotFound { sheet: String, id: RecordId },
    /// The selected sheet does not exist; reported as a warning.
    SheetNotFound(String),
    /// The draft addressed unknown or reserved fields.
    Draft(DraftError),
    /// Load or persistence failure surfaced from the store.
    Store(StoreError),
}

impl ServiceError {
    /// Whether this error is a non-fatal warning for the caller.
    ///
    /// Warnings report a rejected or misaddressed request with state
    /// guaranteed unchanged; everything else is a real failure.
    pub fn is_warning(&self) -> bool {
        !matches!(self, Self::Store(_))
    }
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingRequiredField { sheet, field } => {
                write!(f, "sheet `{sheet}`: required field `{field}` is missing or empty")
            }
            Self::RecordNotFound { sheet, id } => {
                write!(f, "record with ID {id} does not exist in sheet `{sheet}`")
            }
            Self::SheetNotFound(sheet) => write!(f, "sheet not found: `{sheet}`"),
            Self::Draft(err) => write!(f, "{err}"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Draft(err) => Some(err),
            Self::Store(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StoreError> for ServiceError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::SheetNotFound(sheet) => Self::SheetNotFound(sheet),
            StoreError::RecordNotFound { sheet, id } => Self::RecordNotFound { sheet, id },
            StoreError::Draft(err) => Self::Draft(err),
            other => Self::Store(other),
        }
    }
}

/// Use-case facade over the table store.
///
/// Fields listed as optional are exempt from the required-on-add rule; every
/// other schema field must arrive non-empty.
pub struct RecordService<C: WorkbookCodec> {
    store: TableStore<C>,
    optional_fields: BTreeSet<String>,
}

impl<C: WorkbookCodec> RecordService<C> {
    /// Creates a service where every schema field is required on add.
    pub fn new(store: TableStore<C>) -> Self {
        Self {
            store,
            optional_fields: BTreeSet::new(),
        }
    }

    /// Creates a service with the given fields exempt from required checks.
    pub fn with_optional_fields<I, S>(store: TableStore<C>, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            store,
            optional_fields: fields.into_iter().map(Into::into).collect(),
        }
    }

    /// Known sheet names, in file order.
    pub fn sheet_names(&self) -> Vec<&str> {
        self.store.sheet_names()
    }

    /// Returns the current table for `sheet`, unchanged.
    pub fn view_sheet(&self, sheet: &str) -> ServiceResult<&Table> {
        Ok(self.store.view(sheet)?)
    }

    /// Validates and adds one record; returns the assigned id.
    ///
    /// Every schema field must be present with a non-empty value unless it
    /// was listed as optional.
    pub fn add_record(&mut self, sheet: &str, draft: &RecordDraft) -> ServiceResult<RecordId> {
        let schema: Vec<String> = self.view_sheet(sheet)?.schema().to_vec();
        for field in &schema {
            if self.optional_fields.contains(field) {
                continue;
            }
            let missing = draft.get(field).map_or(true, FieldValue::is_empty);
            if missing {
                warn!(
                    "event=record_add module=service status=rejected sheet={sheet} field={field}"
                );
                return Err(ServiceError::MissingRequiredField {
                    sheet: sheet.to_string(),
                    field: field.clone(),
                });
            }
        }
        Ok(self.store.add(sheet, draft)?)
    }

    /// Validates and applies a partial update to one record.
    ///
    /// Only drafted fields are checked: a required field may be left out of
    /// the draft entirely, but cannot be blanked.
    pub fn update_record(
        &mut self,
        sheet: &str,
        id: RecordId,
        draft: &RecordDraft,
    ) -> ServiceResult<()> {
        for (field, value) in draft.iter() {
            if self.optional_fields.contains(field) {
                continue;
            }
            if value.is_empty() {
                warn!(
                    "event=record_update module=service status=rejected sheet={sheet} field={field}"
                );
                return Err(ServiceError::MissingRequiredField {
                    sheet: sheet.to_string(),
                    field: field.to_string(),
                });
            }
        }
        Ok(self.store.update(sheet, id, draft)?)
    }

    /// Deletes one record by id.
    pub fn delete_record(&mut self, sheet: &str, id: RecordId) -> ServiceResult<()> {
        Ok(self.store.delete(sheet, id)?)
    }

    /// Read access to the underlying store.
    pub fn store(&self) -> &TableStore<C> {
        &self.store
    }
}
