//! XLSX codec: calamine for reading, rust_xlsxwriter for writing.
//!
//! # Responsibility
//! - Map between workbook cells and the typed in-memory model.
//! - Keep the on-disk file a full mirror of the in-memory workbook.
//!
//! # Invariants
//! - Row 1 of every sheet is the header; `ID` is written as the first
//!   column.
//! - Date and time values are written in their normalized text form.
//! - A write lands in a sibling staging file first and is renamed into
//!   place, so a failed write leaves the previous file intact.

use calamine::{open_workbook, Data, Range, Reader, Xlsx};
use chrono::{Duration, NaiveDate, NaiveTime};
use log::{error, info};
use rust_xlsxwriter::Workbook as XlsxWorkbook;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Instant;

use super::{CodecError, CodecResult, WorkbookCodec};
use crate::model::record::{FieldValue, Record, RecordId, ID_FIELD};
use crate::model::table::{Table, Workbook};

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Codec for `.xlsx` workbook files.
#[derive(Debug, Default)]
pub struct XlsxCodec;

impl XlsxCodec {
    pub fn new() -> Self {
        Self
    }
}

impl WorkbookCodec for XlsxCodec {
    /// Loads every sheet of the workbook at `path`.
    ///
    /// # Side effects
    /// - Emits `book_load` logging events with duration and status.
    fn load_workbook(&self, path: &Path) -> CodecResult<Workbook> {
        let started_at = Instant::now();
        info!(
            "event=book_load module=codec status=start path={}",
            path.display()
        );

        match read_workbook(path) {
            Ok(book) => {
                info!(
                    "event=book_load module=codec status=ok path={} sheets={} duration_ms={}",
                    path.display(),
                    book.sheets().len(),
                    started_at.elapsed().as_millis()
                );
                Ok(book)
            }
            Err(err) => {
                error!(
                    "event=book_load module=codec status=error path={} duration_ms={} error={}",
                    path.display(),
                    started_at.elapsed().as_millis(),
                    err
                );
                Err(err)
            }
        }
    }

    /// Rewrites the whole workbook file from `book`.
    ///
    /// # Side effects
    /// - Replaces the file at `path` atomically via a staging file.
    /// - Emits `book_write` logging events with duration and status.
    fn write_workbook(&self, path: &Path, book: &Workbook) -> CodecResult<()> {
        let started_at = Instant::now();

        match write_book(path, book) {
            Ok(()) => {
                info!(
                    "event=book_write module=codec status=ok path={} sheets={} duration_ms={}",
                    path.display(),
                    book.sheets().len(),
                    started_at.elapsed().as_millis()
                );
                Ok(())
            }
            Err(err) => {
                error!(
                    "event=book_write module=codec status=error path={} duration_ms={} error={}",
                    path.display(),
                    started_at.elapsed().as_millis(),
                    err
                );
                Err(err)
            }
        }
    }
}

fn read_workbook(path: &Path) -> CodecResult<Workbook> {
    let mut source: Xlsx<_> = open_workbook(path)?;
    let sheet_names = source.sheet_names().to_owned();

    let mut book = Workbook::new();
    for name in sheet_names {
        let range = source.worksheet_range(&name)?;
        let table = read_table(&name, &range)?;
        book.push_sheet(name, table);
    }

    Ok(book)
}

fn read_table(sheet: &str, range: &Range<Data>) -> CodecResult<Table> {
    let mut rows = range.rows();
    let header = rows.next().ok_or_else(|| CodecError::MissingHeader {
        sheet: sheet.to_string(),
    })?;

    let mut id_column = None;
    let mut columns = Vec::new();
    for (index, cell) in header.iter().enumerate() {
        let name = cell_to_text(cell);
        let name = name.trim();
        if name.is_empty() {
            continue;
        }
        if name == ID_FIELD {
            id_column = Some(index);
        } else {
            columns.push((index, name.to_string()));
        }
    }
    let id_column = id_column.ok_or_else(|| CodecError::MissingIdColumn {
        sheet: sheet.to_string(),
    })?;

    let schema = columns.iter().map(|(_, name)| name.clone()).collect();
    let mut table = Table::new(schema);

    for (offset, row) in rows.enumerate() {
        if row.iter().all(|cell| matches!(cell, Data::Empty)) {
            continue;
        }
        // Header occupies row 1, so data rows start at 2 in file terms.
        let file_row = offset + 2;
        let id_cell = row.get(id_column).unwrap_or(&Data::Empty);
        let id = parse_id(sheet, file_row, id_cell)?;

        let mut record = Record::new(id);
        for (index, name) in &columns {
            let value = row
                .get(*index)
                .map(cell_to_value)
                .unwrap_or_else(|| FieldValue::Text(String::new()));
            record.set_field(name.clone(), value);
        }
        table.push(record);
    }

    Ok(table)
}

fn write_book(path: &Path, book: &Workbook) -> CodecResult<()> {
    let mut target = XlsxWorkbook::new();

    for sheet in book.sheets() {
        let worksheet = target.add_worksheet();
        worksheet.set_name(sheet.name.as_str())?;

        worksheet.write_string(0, 0, ID_FIELD)?;
        for (column, name) in sheet.table.schema().iter().enumerate() {
            worksheet.write_string(0, column as u16 + 1, name.as_str())?;
        }

        for (row, record) in sheet.table.records().iter().enumerate() {
            let row = row as u32 + 1;
            worksheet.write_number(row, 0, f64::from(record.id))?;
            for (column, name) in sheet.table.schema().iter().enumerate() {
                let text = record
                    .field(name)
                    .map(FieldValue::to_cell_text)
                    .unwrap_or_default();
                worksheet.write_string(row, column as u16 + 1, text.as_str())?;
            }
        }
    }

    let staging = staging_path(path);
    target.save(&staging)?;
    std::fs::rename(&staging, path)?;
    Ok(())
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(OsString::from)
        .unwrap_or_else(|| OsString::from("workbook.xlsx"));
    name.push(".tmp");
    path.with_file_name(name)
}

fn parse_id(sheet: &str, file_row: usize, cell: &Data) -> CodecResult<RecordId> {
    let parsed = match cell {
        Data::Int(value) if *value > 0 => RecordId::try_from(*value).ok(),
        Data::Float(value) if value.fract() == 0.0 && *value > 0.0 => {
            RecordId::try_from(*value as i64).ok()
        }
        Data::String(value) => value.trim().parse::<RecordId>().ok().filter(|id| *id > 0),
        _ => None,
    };

    parsed.ok_or_else(|| CodecError::InvalidId {
        sheet: sheet.to_string(),
        row: file_row,
        value: cell_to_text(cell),
    })
}

fn cell_to_value(cell: &Data) -> FieldValue {
    match cell {
        Data::String(value) => FieldValue::from_cell_text(value),
        Data::DateTimeIso(value) => FieldValue::from_cell_text(value),
        Data::DateTime(value) => serial_to_value(value.as_f64()),
        other => FieldValue::Text(cell_to_text(other)),
    }
}

fn cell_to_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(value) => value.clone(),
        Data::Int(value) => value.to_string(),
        Data::Float(value) => format_float(*value),
        Data::Bool(value) => value.to_string(),
        Data::DateTime(value) => format_float(value.as_f64()),
        Data::DateTimeIso(value) => value.clone(),
        Data::DurationIso(value) => value.clone(),
        Data::Error(err) => format!("{err}"),
    }
}

/// Renders integral floats without the trailing `.0` Excel would not show.
fn format_float(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

/// Converts an Excel serial datetime into a date or time-of-day value.
///
/// Serial values count days since 1899-12-30, with the fraction carrying the
/// time of day. A pure fraction (serial < 1) is a time; anything else is
/// treated as a calendar date.
fn serial_to_value(serial: f64) -> FieldValue {
    let days = serial.trunc() as i64;
    let seconds = ((serial - serial.trunc()) * SECONDS_PER_DAY).round() as u32;

    if days == 0 {
        if let Some(time) = NaiveTime::from_num_seconds_from_midnight_opt(seconds % 86_400, 0) {
            return FieldValue::Time(time);
        }
    } else if let Some(base) = NaiveDate::from_ymd_opt(1899, 12, 30) {
        if let Some(date) = base.checked_add_signed(Duration::days(days)) {
            return FieldValue::Date(date);
        }
    }

    FieldValue::Text(format_float(serial))
}

#[cfg(test)]
mod tests {
    use super::{format_float, serial_to_value, staging_path};
    use crate::model::record::FieldValue;
    use chrono::{NaiveDate, NaiveTime};
    use std::path::Path;

    #[test]
    fn format_float_drops_integral_fraction() {
        assert_eq!(format_float(7.0), "7");
        assert_eq!(format_float(7.5), "7.5");
    }

    #[test]
    fn serial_fraction_is_a_time_of_day() {
        let value = serial_to_value(0.5);
        assert_eq!(
            value,
            FieldValue::Time(NaiveTime::from_hms_opt(12, 0, 0).unwrap())
        );
    }

    #[test]
    fn serial_whole_days_are_dates() {
        // 45292 days past 1899-12-30 is 2024-01-01.
        let value = serial_to_value(45_292.0);
        assert_eq!(
            value,
            FieldValue::Date(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap())
        );
    }

    #[test]
    fn staging_path_is_a_sibling_of_the_target() {
        let staging = staging_path(Path::new("/data/registre.xlsx"));
        assert_eq!(staging, Path::new("/data/registre.xlsx.tmp"));
    }
}
