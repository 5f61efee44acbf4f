//! In-memory data model for workbook-backed record management.
//!
//! # Responsibility
//! - Define the canonical record/table/workbook shapes used by core logic.
//! - Keep one storage-agnostic model shared by codec, store and service.
//!
//! # Invariants
//! - Record ids within a table maintained by the store are dense and
//!   1-based.
//! - Date and time values normalize to a fixed text form before they reach
//!   any persisted cell.

pub mod record;
pub mod table;
