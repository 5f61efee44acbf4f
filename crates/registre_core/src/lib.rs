//! Core domain logic for Registre.
//! This crate is the single source of truth for record-management
//! invariants over a workbook file.

pub mod codec;
pub mod logging;
pub mod model;
pub mod service;
pub mod store;

pub use codec::{CodecError, CodecResult, MemoryCodec, WorkbookCodec, XlsxCodec};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::record::{
    DraftError, FieldValue, Record, RecordDraft, RecordId, ID_FIELD,
};
pub use model::table::{Sheet, Table, Workbook};
pub use service::record_service::{RecordService, ServiceError, ServiceResult};
pub use store::table_store::{StoreError, StoreResult, TableStore};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
