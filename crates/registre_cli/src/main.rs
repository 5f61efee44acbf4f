//! Command-line front end for the workbook record store.
//!
//! # Responsibility
//! - Map sheet/action/field arguments onto the core store operations.
//! - Render tables, confirmations and warnings for terminal use.
//!
//! # Invariants
//! - Rejected requests (missing record, empty required field) are warnings
//!   and exit zero; load and persistence failures exit non-zero.

use registre_core::{
    core_version, default_log_level, init_logging, FieldValue, RecordDraft, RecordId,
    RecordService, ServiceError, Table, TableStore, XlsxCodec,
};
use std::env;
use std::process::ExitCode;

const LOG_DIR_ENV: &str = "REGISTRE_LOG_DIR";

const USAGE: &str = "usage: registre <workbook.xlsx> [--optional FIELD]... <command>

commands:
  sheets                              list sheet names
  view <sheet>                        print the sheet's records
  add <sheet> FIELD=VALUE...          append a record
  update <sheet> <id> FIELD=VALUE...  overwrite the given fields
  delete <sheet> <id>                 remove a record and renumber

Fields named with --optional are exempt from the required-on-add rule.
Values matching YYYY-MM-DD or HH:MM[:SS] are stored as dates/times.";

enum CliError {
    Usage(String),
    Warning(String),
    Fatal(String),
}

impl From<ServiceError> for CliError {
    fn from(value: ServiceError) -> Self {
        if value.is_warning() {
            Self::Warning(value.to_string())
        } else {
            Self::Fatal(value.to_string())
        }
    }
}

fn main() -> ExitCode {
    let args: Vec<String> = env::args().skip(1).collect();

    if args.iter().any(|arg| arg == "--version") {
        println!("registre {}", core_version());
        return ExitCode::SUCCESS;
    }
    if args.is_empty() || args.iter().any(|arg| arg == "--help") {
        println!("{USAGE}");
        return ExitCode::SUCCESS;
    }

    if let Ok(log_dir) = env::var(LOG_DIR_ENV) {
        if let Err(message) = init_logging(default_log_level(), &log_dir) {
            eprintln!("warning: {message}");
        }
    }

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(CliError::Usage(message)) => {
            eprintln!("error: {message}");
            eprintln!();
            eprintln!("{USAGE}");
            ExitCode::from(2)
        }
        Err(CliError::Warning(message)) => {
            eprintln!("warning: {message}");
            ExitCode::SUCCESS
        }
        Err(CliError::Fatal(message)) => {
            eprintln!("error: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &[String]) -> Result<(), CliError> {
    let mut optional_fields = Vec::new();
    let mut positional = Vec::new();

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if arg == "--optional" {
            let field = iter
                .next()
                .ok_or_else(|| CliError::Usage("--optional needs a field name".to_string()))?;
            optional_fields.push(field.clone());
        } else {
            positional.push(arg.as_str());
        }
    }

    let (workbook_path, rest) = positional
        .split_first()
        .ok_or_else(|| CliError::Usage("missing workbook path".to_string()))?;
    let (command, rest) = rest
        .split_first()
        .ok_or_else(|| CliError::Usage("missing command".to_string()))?;

    let store = TableStore::open(*workbook_path, XlsxCodec::new())
        .map_err(|err| CliError::Fatal(err.to_string()))?;
    let mut service = RecordService::with_optional_fields(store, optional_fields);

    match *command {
        "sheets" => {
            for name in service.sheet_names() {
                println!("{name}");
            }
            Ok(())
        }
        "view" => {
            let sheet = expect_sheet(rest)?;
            let table = service.view_sheet(sheet)?;
            render_table(table);
            Ok(())
        }
        "add" => {
            let (&sheet, fields) = rest
                .split_first()
                .ok_or_else(|| CliError::Usage("add needs a sheet name".to_string()))?;
            let draft = parse_draft(fields)?;
            let id = service.add_record(sheet, &draft)?;
            println!("added record {id} to `{sheet}`");
            Ok(())
        }
        "update" => {
            let (&sheet, rest) = rest
                .split_first()
                .ok_or_else(|| CliError::Usage("update needs a sheet name".to_string()))?;
            let (&id, fields) = rest
                .split_first()
                .ok_or_else(|| CliError::Usage("update needs a record id".to_string()))?;
            let id = parse_record_id(id)?;
            let draft = parse_draft(fields)?;
            if draft.is_empty() {
                return Err(CliError::Usage(
                    "update needs at least one FIELD=VALUE pair".to_string(),
                ));
            }
            service.update_record(sheet, id, &draft)?;
            println!("updated record {id} in `{sheet}`");
            Ok(())
        }
        "delete" => {
            let (&sheet, rest) = rest
                .split_first()
                .ok_or_else(|| CliError::Usage("delete needs a sheet name".to_string()))?;
            let (&id, rest) = rest
                .split_first()
                .ok_or_else(|| CliError::Usage("delete needs a record id".to_string()))?;
            if !rest.is_empty() {
                return Err(CliError::Usage("delete takes no further arguments".to_string()));
            }
            let id = parse_record_id(id)?;
            service.delete_record(sheet, id)?;
            println!("deleted record {id} from `{sheet}`");
            Ok(())
        }
        other => Err(CliError::Usage(format!("unknown command `{other}`"))),
    }
}

fn expect_sheet<'a>(rest: &[&'a str]) -> Result<&'a str, CliError> {
    match rest {
        [sheet] => Ok(*sheet),
        [] => Err(CliError::Usage("missing sheet name".to_string())),
        _ => Err(CliError::Usage("too many arguments".to_string())),
    }
}

fn parse_record_id(raw: &str) -> Result<RecordId, CliError> {
    raw.parse::<RecordId>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| CliError::Usage(format!("`{raw}` is not a positive record id")))
}

fn parse_draft(pairs: &[&str]) -> Result<RecordDraft, CliError> {
    let mut draft = RecordDraft::new();
    for pair in pairs {
        let (field, value) = pair.split_once('=').ok_or_else(|| {
            CliError::Usage(format!("`{pair}` is not a FIELD=VALUE pair"))
        })?;
        if field.is_empty() {
            return Err(CliError::Usage(format!("`{pair}` has an empty field name")));
        }
        draft.insert(field, FieldValue::from_cell_text(value));
    }
    Ok(draft)
}

fn render_table(table: &Table) {
    let mut headers = vec!["ID".to_string()];
    headers.extend(table.schema().iter().cloned());

    let rows: Vec<Vec<String>> = table
        .records()
        .iter()
        .map(|record| {
            let mut row = vec![record.id.to_string()];
            for field in table.schema() {
                row.push(
                    record
                        .field(field)
                        .map(FieldValue::to_cell_text)
                        .unwrap_or_default(),
                );
            }
            row
        })
        .collect();

    let mut widths: Vec<usize> = headers.iter().map(String::len).collect();
    for row in &rows {
        for (index, cell) in row.iter().enumerate() {
            if cell.len() > widths[index] {
                widths[index] = cell.len();
            }
        }
    }

    print_row(&headers, &widths);
    let ruler: Vec<String> = widths.iter().map(|width| "-".repeat(*width)).collect();
    print_row(&ruler, &widths);
    for row in &rows {
        print_row(row, &widths);
    }
    println!("{} record(s)", rows.len());
}

fn print_row(cells: &[String], widths: &[usize]) {
    let mut line = String::new();
    for (index, cell) in cells.iter().enumerate() {
        if index > 0 {
            line.push_str("  ");
        }
        let width = widths.get(index).copied().unwrap_or(0);
        line.push_str(&format!("{cell:<width$}"));
    }
    println!("{}", line.trim_end());
}
