//! Tests for loading populations from CSV and Parquet files

use std::fs::File;
use std::path::Path;

use cohort_match::{MatchingContext, MatchingError, load_table};
use parquet::arrow::ArrowWriter;

use crate::utils::{PATIENT_HEADER, PATIENT_ROWS, sequential_config, write_patient_csv};

#[test]
fn test_load_csv_and_match() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_patient_csv(dir.path(), "patients.csv", PATIENT_ROWS);

    let context = MatchingContext::load(&path, sequential_config()).unwrap();
    assert_eq!(context.population().len(), 8);

    let result = context.run().unwrap();
    assert_eq!(
        result.id_pairs().collect::<Vec<_>>(),
        vec![("P01", "P03"), ("P02", "P04"), ("P08", "P05")]
    );
}

#[test]
fn test_numeric_ids_become_strings() {
    let dir = tempfile::tempdir().unwrap();
    let rows = [
        "1,Treated,5,3,2",
        "2,Not Yet Treated,5,3,3",
        "3,Not Yet Treated,9,1,4",
        "4,Not Yet Treated,2,7,1",
        "5,Treated,6,6,6",
    ];
    let path = write_patient_csv(dir.path(), "numeric.csv", &rows);

    let context = MatchingContext::load(&path, sequential_config()).unwrap();
    let ids: Vec<&str> = context
        .population()
        .units()
        .iter()
        .map(|u| u.id.as_str())
        .collect();
    assert_eq!(ids, vec!["1", "2", "3", "4", "5"]);
}

#[test]
fn test_load_parquet_and_match() {
    let dir = tempfile::tempdir().unwrap();
    let csv_path = write_patient_csv(dir.path(), "patients.csv", PATIENT_ROWS);
    let batch = load_table(&csv_path, 1024).unwrap();

    let parquet_path = dir.path().join("patients.parquet");
    let file = File::create(&parquet_path).unwrap();
    let mut writer = ArrowWriter::try_new(file, batch.schema(), None).unwrap();
    writer.write(&batch).unwrap();
    writer.close().unwrap();

    let from_csv = MatchingContext::load(&csv_path, sequential_config())
        .unwrap()
        .run()
        .unwrap();
    let from_parquet = MatchingContext::load(&parquet_path, sequential_config())
        .unwrap()
        .run()
        .unwrap();

    assert_eq!(from_csv.pairs, from_parquet.pairs);
}

#[test]
fn test_small_batches_are_combined() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_patient_csv(dir.path(), "patients.csv", PATIENT_ROWS);

    let batch = load_table(&path, 3).unwrap();
    assert_eq!(batch.num_rows(), PATIENT_ROWS.len());
}

#[test]
fn test_missing_file() {
    let err = MatchingContext::load(Path::new("/no/such/patients.csv"), sequential_config())
        .unwrap_err();
    assert!(matches!(err, MatchingError::DataLoad { .. }));
    assert!(err.is_load_error());
}

#[test]
fn test_header_only_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_patient_csv(dir.path(), "empty.csv", &[]);
    let err = MatchingContext::load(&path, sequential_config()).unwrap_err();
    assert!(err.is_load_error());
}

#[test]
fn test_missing_covariate_column() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("partial.csv");
    std::fs::write(
        &path,
        "Patient_ID,Treatment_Status,Pain_Baseline,Urgency_Baseline\nP1,Treated,1,2\n",
    )
    .unwrap();

    let err = MatchingContext::load(&path, sequential_config()).unwrap_err();
    assert!(matches!(err, MatchingError::MissingColumn(ref c) if c == "Frequency_Baseline"));
}

#[test]
fn test_non_numeric_covariate() {
    let dir = tempfile::tempdir().unwrap();
    let rows = [
        "P1,Treated,5,3,2",
        "P2,Not Yet Treated,5,severe,3",
        "P3,Not Yet Treated,9,1,4",
    ];
    let path = write_patient_csv(dir.path(), "bad.csv", &rows);

    let err = MatchingContext::load(&path, sequential_config()).unwrap_err();
    assert!(matches!(
        err,
        MatchingError::InvalidCovariate { ref id, ref column }
            if id == "P2" && column == "Urgency_Baseline"
    ));
}

#[test]
fn test_empty_covariate_cell() {
    let dir = tempfile::tempdir().unwrap();
    let rows = ["P1,Treated,5,3,2", "P2,Not Yet Treated,,3,3", "P3,Treated,1,1,1"];
    let path = write_patient_csv(dir.path(), "gap.csv", &rows);

    let err = MatchingContext::load(&path, sequential_config()).unwrap_err();
    assert!(matches!(
        err,
        MatchingError::InvalidCovariate { ref id, ref column }
            if id == "P2" && column == "Pain_Baseline"
    ));
}

#[test]
fn test_failed_load_keeps_previous_context() {
    let dir = tempfile::tempdir().unwrap();
    let good = write_patient_csv(dir.path(), "good.csv", PATIENT_ROWS);
    let bad = dir.path().join("bad.csv");
    std::fs::write(&bad, format!("{PATIENT_HEADER}\nP1,Treated,1,2\n")).unwrap();

    let context = MatchingContext::load(&good, sequential_config()).unwrap();
    let before = context.run().unwrap();

    assert!(MatchingContext::load(&bad, sequential_config()).is_err());

    let after = context.run().unwrap();
    assert_eq!(before.pairs, after.pairs);
}
