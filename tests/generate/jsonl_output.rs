//! JSON Lines output, including the async command entry point.

use crate::{generate_args, init_tracing, CATALOG, CUSTOMERS, ROW_COUNT};
use datagen::{generate, run_generate};
use datagen_generator::CancellationFlag;
use datagen_sink::SinkFormat;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn read_jsonl(path: &Path) -> Vec<serde_json::Map<String, Value>> {
    fs::read_to_string(path)
        .expect("Failed to read JSONL output")
        .lines()
        .map(|line| match serde_json::from_str(line) {
            Ok(Value::Object(object)) => object,
            other => panic!("expected a JSON object, got {other:?}"),
        })
        .collect()
}

#[test]
fn test_customers_jsonl_typed_values() {
    init_tracing();
    let temp_dir = TempDir::new().unwrap();
    let output = temp_dir.path().join("customers.jsonl");

    let summary = generate(
        &generate_args(CUSTOMERS, SinkFormat::Jsonl, &output),
        &CancellationFlag::new(),
    )
    .unwrap();
    assert_eq!(summary.metrics.rows_written, ROW_COUNT);

    let rows = read_jsonl(&output);
    assert_eq!(rows.len() as u64, ROW_COUNT);

    for (i, row) in rows.iter().enumerate() {
        assert!(!row.contains_key("internal_code"), "ghost field in output");
        assert_eq!(row.len(), 14);

        assert_eq!(row["id"], Value::from(i as u64 + 1));
        let age = row["age"].as_i64().expect("age is a number");
        assert_eq!(row["age_next_year"].as_i64(), Some(age + 1));
        assert!(row["vip"].is_boolean());
        assert!(row["latitude"].is_f64());
        assert_eq!(row["country"], "France");
        // Structured values are written as their display name
        assert!(row["city"].is_string());
        assert!(row["first_name"].is_string());
    }
}

#[test]
fn test_jsonl_writes_null_for_uncastable_values() {
    init_tracing();
    let temp_dir = TempDir::new().unwrap();
    let model = temp_dir.path().join("nulls.yaml");
    fs::write(
        &model,
        r#"
name: nulls
fields:
  - name: word
    type: string
    possible_values: [alpha, beta]
  - name: as_number
    type: integer
    link: "$word.length"
  - name: echoed
    type: integer
    injection: "${word}"
"#,
    )
    .unwrap();
    let output = temp_dir.path().join("nulls.jsonl");

    generate(
        &generate_args(model.to_str().unwrap(), SinkFormat::Jsonl, &output),
        &CancellationFlag::new(),
    )
    .unwrap();

    for row in read_jsonl(&output) {
        assert!(matches!(row["word"].as_str(), Some("alpha" | "beta")));
        // Link on a scalar field yields nothing; text cannot become an integer
        assert_eq!(row["as_number"], Value::Null);
        assert_eq!(row["echoed"], Value::Null);
    }
}

#[tokio::test]
async fn test_run_generate_writes_output() {
    init_tracing();
    let temp_dir = TempDir::new().unwrap();
    let output = temp_dir.path().join("catalog.jsonl");
    let mut args = generate_args(CATALOG, SinkFormat::Jsonl, &output);
    args.batches = 2;
    args.timeout = Some("10m".to_string());

    let summary = run_generate(args).await.unwrap();

    assert!(!summary.cancelled);
    assert_eq!(summary.batches_written, 2);
    assert_eq!(summary.metrics.rows_written, 2 * ROW_COUNT);
    assert_eq!(read_jsonl(&output).len() as u64, 2 * ROW_COUNT);
}

#[tokio::test]
async fn test_run_generate_rejects_bad_timeout() {
    let temp_dir = TempDir::new().unwrap();
    let output = temp_dir.path().join("never.jsonl");
    let mut args = generate_args(CATALOG, SinkFormat::Jsonl, &output);
    args.timeout = Some("soon".to_string());

    let err = run_generate(args).await.unwrap_err();
    assert!(format!("{err:#}").contains("Invalid --timeout"));
}

#[test]
fn test_jsonl_date_binary_and_template_kinds() {
    init_tracing();
    let temp_dir = TempDir::new().unwrap();
    let model = temp_dir.path().join("events.yaml");
    fs::write(
        &model,
        r#"
name: events
fields:
  - name: created
    type: date
    min_date_time: 2020-01-01T00:00:00
    max_date_time: 2020-12-31T23:59:59
  - name: created_day
    type: date_as_string
    min_date_time: 2020-01-01T00:00:00
    max_date_time: 2020-12-31T23:59:59
    pattern: "%Y/%m/%d"
  - name: payload
    type: bytes
    length: 8
  - name: digest
    type: hash_md5
  - name: plate
    type: string_regex
    regex: "[A-Z]{2}-[0-9]{3}"
  - name: plate_digest
    type: hash_md5
    injection: "${plate}"
"#,
    )
    .unwrap();
    let output = temp_dir.path().join("events.jsonl");

    generate(
        &generate_args(model.to_str().unwrap(), SinkFormat::Jsonl, &output),
        &CancellationFlag::new(),
    )
    .unwrap();

    let is_hex = |text: &str, len: usize| {
        text.len() == len && text.chars().all(|c| c.is_ascii_digit() || ('A'..='F').contains(&c))
    };
    let rows = read_jsonl(&output);
    assert_eq!(rows.len() as u64, ROW_COUNT);
    for row in &rows {
        let created = row["created"].as_str().expect("date is written as text");
        assert!(created.starts_with("2020-") && created.ends_with('Z'), "{created}");
        assert_eq!(created.len(), "2020-01-01T00:00:00Z".len());

        let day = row["created_day"].as_str().unwrap();
        assert!(day.starts_with("2020/") && day.len() == 10, "{day}");

        assert!(is_hex(row["payload"].as_str().unwrap(), 16));
        assert!(is_hex(row["digest"].as_str().unwrap(), 32));
        assert!(is_hex(row["plate_digest"].as_str().unwrap(), 32));

        let plate = row["plate"].as_str().unwrap();
        let (letters, digits) = plate.split_once('-').unwrap();
        assert!(letters.len() == 2 && letters.chars().all(|c| c.is_ascii_uppercase()));
        assert!(digits.len() == 3 && digits.chars().all(|c| c.is_ascii_digit()));
    }
}
