use chrono::{NaiveDate, NaiveTime};
use registre_core::{DraftError, FieldValue, Record, RecordDraft, Table};

#[test]
fn date_values_normalize_to_iso_text() {
    let value = FieldValue::Date(NaiveDate::from_ymd_opt(2024, 3, 7).unwrap());
    assert_eq!(value.to_cell_text(), "2024-03-07");
}

#[test]
fn time_values_normalize_with_seconds() {
    let value = FieldValue::Time(NaiveTime::from_hms_opt(9, 5, 0).unwrap());
    assert_eq!(value.to_cell_text(), "09:05:00");
}

#[test]
fn stored_text_round_trips_through_detection() {
    for value in [
        FieldValue::Text("Colis urgent".to_string()),
        FieldValue::Date(NaiveDate::from_ymd_opt(2023, 12, 31).unwrap()),
        FieldValue::Time(NaiveTime::from_hms_opt(16, 45, 30).unwrap()),
    ] {
        let reparsed = FieldValue::from_cell_text(&value.to_cell_text());
        assert_eq!(reparsed, value);
    }
}

#[test]
fn detection_promotes_only_exact_formats() {
    assert_eq!(
        FieldValue::from_cell_text("2024-05-01"),
        FieldValue::Date(NaiveDate::from_ymd_opt(2024, 5, 1).unwrap())
    );
    assert_eq!(
        FieldValue::from_cell_text("08:30"),
        FieldValue::Time(NaiveTime::from_hms_opt(8, 30, 0).unwrap())
    );
    // Near-miss formats stay text.
    assert_eq!(
        FieldValue::from_cell_text("01/05/2024"),
        FieldValue::Text("01/05/2024".to_string())
    );
    assert_eq!(
        FieldValue::from_cell_text("8h30"),
        FieldValue::Text("8h30".to_string())
    );
}

#[test]
fn empty_check_applies_to_text_only() {
    assert!(FieldValue::Text("   ".to_string()).is_empty());
    assert!(!FieldValue::Text("x".to_string()).is_empty());
    assert!(!FieldValue::Date(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()).is_empty());
    assert!(!FieldValue::Time(NaiveTime::from_hms_opt(0, 0, 0).unwrap()).is_empty());
}

#[test]
fn field_value_serialization_uses_expected_wire_fields() {
    let value = FieldValue::Date(NaiveDate::from_ymd_opt(2024, 3, 7).unwrap());
    let json = serde_json::to_value(&value).unwrap();
    assert_eq!(json, serde_json::json!({ "date": "2024-03-07" }));

    let decoded: FieldValue = serde_json::from_value(json).unwrap();
    assert_eq!(decoded, value);
}

#[test]
fn next_id_on_empty_table_is_one() {
    let table = Table::new(vec!["OBJET".to_string()]);
    assert_eq!(table.next_id(), 1);
}

#[test]
fn next_id_never_fills_gaps() {
    let mut table = Table::new(vec!["OBJET".to_string()]);
    for id in [1, 3, 5] {
        let mut record = Record::new(id);
        record.set_field("OBJET", FieldValue::Text(format!("record {id}")));
        table.push(record);
    }
    assert_eq!(table.next_id(), 6);
}

#[test]
fn remove_renumbers_higher_ids_only() {
    let mut table = Table::new(vec!["OBJET".to_string()]);
    for id in 1..=4 {
        let mut record = Record::new(id);
        record.set_field("OBJET", FieldValue::Text(format!("record {id}")));
        table.push(record);
    }

    assert!(table.remove(2));

    let ids: Vec<u32> = table.records().iter().map(|record| record.id).collect();
    assert_eq!(ids, vec![1, 2, 3]);
    // Former record 3 now answers to id 2 with its fields intact.
    assert_eq!(
        table.record(2).unwrap().field("OBJET"),
        Some(&FieldValue::Text("record 3".to_string()))
    );
}

#[test]
fn remove_missing_id_is_a_noop() {
    let mut table = Table::new(vec!["OBJET".to_string()]);
    table.push(Record::new(1));

    assert!(!table.remove(9));
    assert_eq!(table.len(), 1);
}

#[test]
fn draft_validation_rejects_unknown_fields() {
    let table = Table::new(vec!["OBJET".to_string()]);
    let draft = RecordDraft::new().with("OBJETS", FieldValue::Text("typo".to_string()));

    let err = table.validate_draft(&draft).unwrap_err();
    assert_eq!(err, DraftError::UnknownField("OBJETS".to_string()));
}

#[test]
fn draft_validation_rejects_the_id_column() {
    let table = Table::new(vec!["OBJET".to_string()]);
    let draft = RecordDraft::new().with("ID", FieldValue::Text("7".to_string()));

    let err = table.validate_draft(&draft).unwrap_err();
    assert_eq!(err, DraftError::IdFieldReserved);
}

#[test]
fn draft_validation_accepts_partial_drafts() {
    let table = Table::new(vec!["OBJET".to_string(), "EXPEDITEUR".to_string()]);
    let draft = RecordDraft::new().with("OBJET", FieldValue::Text("Pli interne".to_string()));

    assert!(table.validate_draft(&draft).is_ok());
}
