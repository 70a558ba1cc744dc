//! The `test-model` command.

use crate::{init_tracing, CATALOG, CUSTOMERS, SEED};
use datagen::{run_test_model, TestModelArgs};
use std::path::PathBuf;

fn args(model: &str, rows: u64) -> TestModelArgs {
    TestModelArgs {
        model: PathBuf::from(model),
        rows,
        seed: Some(SEED),
    }
}

#[test]
fn test_model_rows_include_ghost_fields() {
    init_tracing();
    let rows = run_test_model(&args(CUSTOMERS, 3)).unwrap();
    assert_eq!(rows.len(), 3);
    for row in &rows {
        let object = row.as_object().expect("row is a JSON object");
        assert_eq!(object.len(), 15);
        let code = object["internal_code"].as_str().expect("uuid is text");
        assert_eq!(code.len(), 36);
    }
}

#[test]
fn test_model_is_deterministic() {
    let first = run_test_model(&args(CATALOG, 2)).unwrap();
    let second = run_test_model(&args(CATALOG, 2)).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_model_missing_file() {
    let err = run_test_model(&args("tests/fixtures/missing.yaml", 1)).unwrap_err();
    assert!(format!("{err:#}").contains("Failed to load model"));
}
