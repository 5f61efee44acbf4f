use chrono::{NaiveDate, NaiveTime};
use registre_core::{
    CodecError, FieldValue, Record, RecordDraft, StoreError, Table, TableStore, Workbook,
    WorkbookCodec, XlsxCodec,
};
use rust_xlsxwriter::Workbook as RawWorkbook;
use std::path::Path;

fn courier_schema() -> Vec<String> {
    ["OBJET", "DATE ENTREE", "HEURE ENTREE"]
        .iter()
        .map(|name| name.to_string())
        .collect()
}

fn courier_record(id: u32, objet: &str, day: u32) -> Record {
    let mut record = Record::new(id);
    record.set_field("OBJET", FieldValue::Text(objet.to_string()));
    record.set_field(
        "DATE ENTREE",
        FieldValue::Date(NaiveDate::from_ymd_opt(2024, 4, day).unwrap()),
    );
    record.set_field(
        "HEURE ENTREE",
        FieldValue::Time(NaiveTime::from_hms_opt(9, 30, 0).unwrap()),
    );
    record
}

fn seeded_book() -> Workbook {
    let mut arrivee = Table::new(courier_schema());
    arrivee.push(courier_record(1, "Convocation", 2));
    arrivee.push(courier_record(2, "Facture", 3));

    let mut depart = Table::new(courier_schema());
    depart.push(courier_record(1, "Reponse convocation", 4));

    let mut book = Workbook::new();
    book.push_sheet("ARRIVEE", arrivee);
    book.push_sheet("DEPART", depart);
    book
}

#[test]
fn write_then_load_round_trips_every_sheet() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("registre.xlsx");
    let codec = XlsxCodec::new();
    let book = seeded_book();

    codec.write_workbook(&path, &book).unwrap();
    let loaded = codec.load_workbook(&path).unwrap();

    assert_eq!(loaded, book);
}

#[test]
fn normalized_date_and_time_text_survives_reload() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("registre.xlsx");
    let codec = XlsxCodec::new();
    codec.write_workbook(&path, &seeded_book()).unwrap();

    let loaded = codec.load_workbook(&path).unwrap();
    let record = loaded.sheet("ARRIVEE").unwrap().record(1).unwrap();

    assert_eq!(
        record.field("DATE ENTREE"),
        Some(&FieldValue::Date(NaiveDate::from_ymd_opt(2024, 4, 2).unwrap()))
    );
    assert_eq!(
        record.field("HEURE ENTREE"),
        Some(&FieldValue::Time(NaiveTime::from_hms_opt(9, 30, 0).unwrap()))
    );
}

#[test]
fn store_mutations_survive_a_fresh_reload() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("registre.xlsx");
    let codec = XlsxCodec::new();
    codec.write_workbook(&path, &seeded_book()).unwrap();

    let mut store = TableStore::open(&path, XlsxCodec::new()).unwrap();
    let draft = RecordDraft::new()
        .with("OBJET", FieldValue::Text("Recommande".to_string()))
        .with(
            "DATE ENTREE",
            FieldValue::Date(NaiveDate::from_ymd_opt(2024, 4, 5).unwrap()),
        )
        .with(
            "HEURE ENTREE",
            FieldValue::Time(NaiveTime::from_hms_opt(14, 0, 0).unwrap()),
        );
    let added = store.add("ARRIVEE", &draft).unwrap();
    assert_eq!(added, 3);
    store
        .update(
            "ARRIVEE",
            1,
            &RecordDraft::new().with("OBJET", FieldValue::Text("Convocation urgente".to_string())),
        )
        .unwrap();
    store.delete("ARRIVEE", 2).unwrap();
    drop(store);

    let reloaded = TableStore::open(&path, XlsxCodec::new()).unwrap();
    let table = reloaded.view("ARRIVEE").unwrap();

    let ids: Vec<u32> = table.records().iter().map(|record| record.id).collect();
    assert_eq!(ids, vec![1, 2]);
    assert_eq!(
        table.record(1).unwrap().field("OBJET"),
        Some(&FieldValue::Text("Convocation urgente".to_string()))
    );
    // The added record was renumbered from 3 to 2 by the delete.
    assert_eq!(
        table.record(2).unwrap().field("OBJET"),
        Some(&FieldValue::Text("Recommande".to_string()))
    );
    // The sibling sheet was carried through every rewrite.
    assert_eq!(reloaded.view("DEPART").unwrap().len(), 1);
}

#[test]
fn open_on_a_missing_file_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.xlsx");

    let result = TableStore::open(&path, XlsxCodec::new());
    assert!(matches!(result, Err(StoreError::Load(_))));
}

#[test]
fn sheet_without_an_id_column_fails_to_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("no_id.xlsx");
    write_raw_sheet(&path, "ARRIVEE", &["OBJET", "EXPEDITEUR"]);

    let err = XlsxCodec::new().load_workbook(&path).unwrap_err();
    assert!(matches!(err, CodecError::MissingIdColumn { sheet } if sheet == "ARRIVEE"));
}

#[test]
fn sheet_without_a_header_row_fails_to_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("blank.xlsx");
    write_raw_sheet(&path, "VIDE", &[]);

    let err = XlsxCodec::new().load_workbook(&path).unwrap_err();
    assert!(matches!(err, CodecError::MissingHeader { sheet } if sheet == "VIDE"));
}

#[test]
fn id_cells_must_be_positive_integers() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad_id.xlsx");

    let mut raw = RawWorkbook::new();
    let worksheet = raw.add_worksheet();
    worksheet.set_name("ARRIVEE").unwrap();
    worksheet.write_string(0, 0, "ID").unwrap();
    worksheet.write_string(0, 1, "OBJET").unwrap();
    worksheet.write_string(1, 0, "premier").unwrap();
    worksheet.write_string(1, 1, "Pli").unwrap();
    raw.save(&path).unwrap();

    let err = XlsxCodec::new().load_workbook(&path).unwrap_err();
    assert!(matches!(
        err,
        CodecError::InvalidId { row: 2, ref value, .. } if value == "premier"
    ));
}

fn write_raw_sheet(path: &Path, sheet: &str, header: &[&str]) {
    let mut raw = RawWorkbook::new();
    let worksheet = raw.add_worksheet();
    worksheet.set_name(sheet).unwrap();
    for (column, name) in header.iter().enumerate() {
        worksheet.write_string(0, column as u16, *name).unwrap();
    }
    raw.save(path).unwrap();
}
