//! Store layer: session ownership of the workbook and its mutations.
//!
//! # Responsibility
//! - Provide the CRUD contract presentation layers operate through.
//! - Isolate codec/file details from service and UI orchestration.
//!
//! # Invariants
//! - Every mutation is mirrored to the backing file before it becomes
//!   visible in memory.
//! - The store returns semantic errors (`RecordNotFound`, `SheetNotFound`)
//!   in addition to codec transport errors.

pub mod table_store;
