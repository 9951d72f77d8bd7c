use std::io::Write;

use table::{ColumnSpec, DatasetSource, TableError};

const SCHEMA: &[ColumnSpec] = &[
    ColumnSpec::number("Year"),
    ColumnSpec::text("Vehicle_Type"),
    ColumnSpec::number("Automobile_Sales"),
];

#[test]
fn parses_urls_and_paths() {
    assert!(matches!(
        DatasetSource::parse("https://example.com/data.csv"),
        DatasetSource::Url(_)
    ));
    assert!(matches!(
        DatasetSource::parse("./data/sales.csv"),
        DatasetSource::Path(_)
    ));
    assert!(matches!(
        DatasetSource::parse("C:\\data\\sales.csv"),
        DatasetSource::Path(_)
    ));
}

#[tokio::test]
async fn loads_local_csv_against_schema() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    writeln!(file, "Year,Vehicle_Type,Automobile_Sales").expect("write");
    writeln!(file, "1980,Supperminicar,123.2").expect("write");
    writeln!(file, "1981,Mediumfamilycar,456.1").expect("write");

    let source = DatasetSource::Path(file.path().to_path_buf());
    let dataset = source.load(SCHEMA).await.expect("load");
    assert_eq!(dataset.len(), 2);
}

#[tokio::test]
async fn missing_file_is_an_io_error() {
    let source = DatasetSource::parse("./definitely/not/here.csv");
    let err = source.load(SCHEMA).await.expect_err("missing file");
    assert!(matches!(err, TableError::Io { .. }));
}

#[tokio::test]
async fn missing_required_column_fails_the_load() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    writeln!(file, "Year,Automobile_Sales").expect("write");
    writeln!(file, "1980,1.0").expect("write");

    let source = DatasetSource::Path(file.path().to_path_buf());
    let err = source.load(SCHEMA).await.expect_err("schema");
    assert!(matches!(err, TableError::MissingColumn(name) if name == "Vehicle_Type"));
}
