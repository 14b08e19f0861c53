// tests/loader.rs

//! Background loading against real files.

use std::io::Write;
use std::sync::Arc;

use csvview::data_loader::{get_loader, DataLoader, FileFormat};
use csvview::loader::{read_table, Loader};
use csvview::ViewerError;
use tempfile::NamedTempFile;
use tokio::runtime::Handle;

fn csv_file(content: &[u8]) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("temp file");
    file.write_all(content).expect("write temp file");
    file
}

fn parser() -> Arc<dyn DataLoader> {
    Arc::from(get_loader(FileFormat::Csv, None))
}

#[tokio::test]
async fn reads_and_parses_file() {
    let file = csv_file(b"msisdn,grade,type,reserved_at\n0811,gold,prepaid,2021-01-01\n");
    let table = read_table(file.path(), parser().as_ref()).await.unwrap();
    assert_eq!(table.len(), 2);
    assert_eq!(table.value(0, "grade"), Some("gold"));
    assert!(table.records[1].is_blank());
}

#[tokio::test]
async fn invalid_utf8_is_replaced() {
    let file = csv_file(b"a,b\n\xff,2");
    let table = read_table(file.path(), parser().as_ref()).await.unwrap();
    assert_eq!(table.value(0, "a"), Some("\u{fffd}"));
}

#[tokio::test]
async fn missing_file_is_a_typed_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.csv");
    let err = read_table(&path, parser().as_ref()).await.unwrap_err();
    assert!(matches!(err, ViewerError::Read { .. }));
    assert!(err.to_string().contains("absent.csv"));
}

#[tokio::test(flavor = "multi_thread")]
async fn only_the_latest_request_is_delivered() {
    let first = csv_file(b"a\n1\n2\n3");
    let second = csv_file(b"a\nlatest");

    let mut loader = Loader::new(Handle::current(), parser());
    let stale = loader.request(first.path());
    let current = loader.request(second.path());
    assert!(current > stale);

    let loaded = loader.next().await.expect("load outcome");
    assert_eq!(loaded.generation, current);
    assert_eq!(loaded.path, second.path());
    assert_eq!(loaded.result.unwrap().value(0, "a"), Some("latest"));
}

#[tokio::test(flavor = "multi_thread")]
async fn failed_request_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let mut loader = Loader::new(Handle::current(), parser());
    loader.request(dir.path().join("nope.csv"));
    let loaded = loader.next().await.expect("load outcome");
    assert!(loaded.result.is_err());
}
