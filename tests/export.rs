// tests/export.rs

//! Load, filter and export without the terminal.

use std::fs;

use csvview::columns::ColumnSchema;
use csvview::data_loader::parse_csv;
use csvview::export::export_to_path;
use csvview::filter::FilterKind;
use csvview::virtual_table::VirtualTable;

const NUMBERS: &str = "msisdn,grade,type,reserved_at\n\
                       62811000001,gold,Prepaid,2021-01-04\n\
                       62811000002,silver,Postpaid,2021-01-05\n\
                       62811000003,gold,Postpaid,2021-02-01\n\
                       62811000004,platinum,Prepaid\n\
                       62811000005,gold,Prepaid,2021-02-11\n";

#[test]
fn exports_rows_matching_all_filters() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out.csv");

    let mut view = VirtualTable::new(parse_csv(NUMBERS, ','), ColumnSchema::standard(), 1000);
    view.set_filter("grade", "gold").unwrap();
    view.set_filter("reserved_at", "2021-02").unwrap();

    let written = export_to_path(&view, &out).unwrap();
    assert_eq!(written, 2);

    let mut reader = csv::Reader::from_path(&out).unwrap();
    let headers: Vec<String> = reader.headers().unwrap().iter().map(String::from).collect();
    assert_eq!(headers, vec!["msisdn", "grade", "type", "reserved_at"]);
    let msisdns: Vec<String> = reader
        .records()
        .map(|r| r.unwrap()[0].to_string())
        .collect();
    assert_eq!(msisdns, vec!["62811000003", "62811000005"]);
}

#[test]
fn blank_trailing_record_survives_text_filters_only() {
    let mut view = VirtualTable::new(parse_csv(NUMBERS, ','), ColumnSchema::standard(), 1000);
    assert_eq!(view.data().len(), 6);

    // missing cells pass prefix filters
    view.set_filter("msisdn", "6281100000").unwrap();
    assert!(view.visible_rows().contains(&5));

    // but never an exact match
    view.set_filter("type", "Prepaid").unwrap();
    assert_eq!(view.visible_rows(), &[0, 3, 4]);
}

#[test]
fn numeric_threshold_column() {
    let mut view = VirtualTable::new(parse_csv(NUMBERS, ','), ColumnSchema::standard(), 1000);
    view.set_filter_kind("msisdn", FilterKind::GreaterThan).unwrap();
    view.set_filter("msisdn", "62811000004").unwrap();
    assert_eq!(view.visible_rows(), &[3, 4]);

    view.set_filter("msisdn", "four").unwrap();
    assert!(view.filters().get("msisdn").is_none());
    assert_eq!(view.visible_rows().len(), 6);
}

#[test]
fn exported_file_is_replaced_not_appended() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out.csv");
    fs::write(&out, "stale contents\n").unwrap();

    let view = VirtualTable::new(parse_csv("msisdn\n1", ','), ColumnSchema::standard(), 1000);
    export_to_path(&view, &out).unwrap();
    let text = fs::read_to_string(&out).unwrap();
    assert_eq!(text, "msisdn,grade,type,reserved_at\n1,,,\n");
}
