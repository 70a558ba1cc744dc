//! CSV output of the customers and catalog models.

use crate::{generate_args, init_tracing, CATALOG, CUSTOMERS, ROW_COUNT, SEED};
use chrono::NaiveDate;
use datagen::generate;
use datagen_generator::CancellationFlag;
use datagen_sink::SinkFormat;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Read a CSV file as a header plus one column-to-value map per row.
fn read_csv(path: &Path) -> (Vec<String>, Vec<HashMap<String, String>>) {
    let mut reader = csv::Reader::from_path(path).expect("Failed to open CSV output");
    let header: Vec<String> = reader
        .headers()
        .expect("Missing CSV header")
        .iter()
        .map(String::from)
        .collect();
    let rows = reader
        .records()
        .map(|record| {
            let record = record.expect("Invalid CSV record");
            header
                .iter()
                .cloned()
                .zip(record.iter().map(String::from))
                .collect()
        })
        .collect();
    (header, rows)
}

#[test]
fn test_customers_csv_header_excludes_ghost_fields() {
    init_tracing();
    let temp_dir = TempDir::new().unwrap();
    let output = temp_dir.path().join("customers.csv");

    let summary = generate(
        &generate_args(CUSTOMERS, SinkFormat::Csv, &output),
        &CancellationFlag::new(),
    )
    .unwrap();

    assert_eq!(summary.seed, SEED);
    assert_eq!(summary.batches_written, 1);
    assert!(!summary.cancelled);
    assert_eq!(summary.metrics.rows_written, ROW_COUNT);
    assert!(summary.metrics.bytes_written > 0);

    let (header, rows) = read_csv(&output);
    assert_eq!(
        header,
        vec![
            "id",
            "first_name",
            "sex",
            "age",
            "vip",
            "city",
            "country",
            "latitude",
            "segment",
            "age_next_year",
            "email",
            "phone",
            "birthdate",
            "label",
        ]
    );
    assert_eq!(rows.len() as u64, ROW_COUNT);
}

#[test]
fn test_customers_csv_rules_hold_on_every_row() {
    init_tracing();
    let temp_dir = TempDir::new().unwrap();
    let output = temp_dir.path().join("customers.csv");
    let mut args = generate_args(CUSTOMERS, SinkFormat::Csv, &output);
    args.batches = 3;
    args.threads = 3;

    let summary = generate(&args, &CancellationFlag::new()).unwrap();
    assert_eq!(summary.batches_written, 3);

    let (_, rows) = read_csv(&output);
    assert_eq!(rows.len() as u64, 3 * ROW_COUNT);

    let min_birthdate = NaiveDate::from_ymd_opt(1950, 1, 1).unwrap();
    let max_birthdate = NaiveDate::from_ymd_opt(2005, 12, 31).unwrap();

    for (i, row) in rows.iter().enumerate() {
        // increment_long starting at 1, in global row order across batches
        assert_eq!(row["id"], (i as u64 + 1).to_string());

        let age: i32 = row["age"].parse().unwrap();
        assert!((18..=90).contains(&age), "age {age} out of range");
        assert_eq!(row["age_next_year"], (age + 1).to_string());

        assert_eq!(row["country"], "France");
        assert!(row["latitude"].parse::<f64>().is_ok());
        assert!(["MALE", "FEMALE", "UNKNOWN"].contains(&row["sex"].as_str()));

        let vip: bool = row["vip"].parse().unwrap();
        let expected_segment = if age < 30 {
            "young-fr"
        } else if age > 64 || vip {
            "senior-or-vip"
        } else {
            "standard"
        };
        assert_eq!(row["segment"], expected_segment, "row {i}: {row:?}");

        assert_eq!(
            row["label"],
            format!("{} from {}", row["first_name"], row["city"])
        );
        assert!(row["email"].contains('@'));
        assert!(row["phone"].starts_with("+33 "));

        let birthdate = NaiveDate::parse_from_str(&row["birthdate"], "%Y-%m-%d").unwrap();
        assert!(birthdate >= min_birthdate && birthdate <= max_birthdate);
    }
}

#[test]
fn test_same_seed_produces_identical_output() {
    init_tracing();
    let temp_dir = TempDir::new().unwrap();
    let first = temp_dir.path().join("first.csv");
    let second = temp_dir.path().join("second.csv");
    let other_seed = temp_dir.path().join("other.csv");

    generate(
        &generate_args(CUSTOMERS, SinkFormat::Csv, &first),
        &CancellationFlag::new(),
    )
    .unwrap();
    generate(
        &generate_args(CUSTOMERS, SinkFormat::Csv, &second),
        &CancellationFlag::new(),
    )
    .unwrap();
    let mut args = generate_args(CUSTOMERS, SinkFormat::Csv, &other_seed);
    args.seed = Some(SEED + 1);
    generate(&args, &CancellationFlag::new()).unwrap();

    let first = fs::read_to_string(first).unwrap();
    assert_eq!(first, fs::read_to_string(second).unwrap());
    assert_ne!(first, fs::read_to_string(other_seed).unwrap());
}

#[test]
fn test_model_seed_is_used_without_explicit_seed() {
    init_tracing();
    let temp_dir = TempDir::new().unwrap();
    let output = temp_dir.path().join("customers.csv");
    let mut args = generate_args(CUSTOMERS, SinkFormat::Csv, &output);
    args.seed = None;

    let summary = generate(&args, &CancellationFlag::new()).unwrap();
    // customers.yaml declares `seed: 42`
    assert_eq!(summary.seed, 42);
}

#[test]
fn test_catalog_csv_lookup_and_formula() {
    init_tracing();
    let temp_dir = TempDir::new().unwrap();
    let output = temp_dir.path().join("catalog.csv");

    generate(
        &generate_args(CATALOG, SinkFormat::Csv, &output),
        &CancellationFlag::new(),
    )
    .unwrap();

    let (header, rows) = read_csv(&output);
    assert_eq!(header, vec!["product", "price", "quantity", "total", "size"]);
    assert_eq!(rows.len() as u64, ROW_COUNT);

    for row in &rows {
        // Only kitchen products pass the filter
        let expected_price = match row["product"].as_str() {
            "Kettle" => 25,
            "Toaster" => 40,
            other => panic!("unexpected product {other}"),
        };
        assert_eq!(row["price"], expected_price.to_string());

        let quantity: i32 = row["quantity"].parse().unwrap();
        assert!((1..=5).contains(&quantity));
        let total: i32 = row["total"].parse().unwrap();
        assert_eq!(total, expected_price * quantity);

        let expected_size = if total > 100 {
            "large"
        } else if total > 50 {
            "medium"
        } else {
            "small"
        };
        assert_eq!(row["size"], expected_size);
    }
}

#[test]
fn test_cancelled_run_writes_header_only() {
    init_tracing();
    let temp_dir = TempDir::new().unwrap();
    let output = temp_dir.path().join("cancelled.csv");
    let mut args = generate_args(CATALOG, SinkFormat::Csv, &output);
    args.batches = 5;

    let cancellation = CancellationFlag::new();
    cancellation.cancel();
    let summary = generate(&args, &cancellation).unwrap();

    assert!(summary.cancelled);
    assert_eq!(summary.batches_written, 1);
    assert_eq!(summary.metrics.rows_written, 0);
    assert_eq!(
        fs::read_to_string(&output).unwrap(),
        "product,price,quantity,total,size\n"
    );
}

#[test]
fn test_dry_run_writes_nothing() {
    init_tracing();
    let temp_dir = TempDir::new().unwrap();
    let output = temp_dir.path().join("dry.csv");
    let mut args = generate_args(CUSTOMERS, SinkFormat::Csv, &output);
    args.dry_run = true;

    let summary = generate(&args, &CancellationFlag::new()).unwrap();
    assert_eq!(summary.seed, SEED);
    assert_eq!(summary.metrics.rows_written, 0);
    assert!(!output.exists());
}

#[test]
fn test_broken_rules_do_not_abort_generation() {
    init_tracing();
    let temp_dir = TempDir::new().unwrap();
    let model = temp_dir.path().join("broken.yaml");
    fs::write(
        &model,
        r#"
name: broken
fields:
  - name: n
    type: integer
    min: 1
    max: 9
  - name: label
    type: string
    conditionals:
      "$missing>3": never
      "$n>3 & nonsense": never
      default: fallback
  - name: doubled
    type: integer
    formula: "$n * 2"
"#,
    )
    .unwrap();
    let output = temp_dir.path().join("broken.csv");
    let args = generate_args(model.to_str().unwrap(), SinkFormat::Csv, &output);

    generate(&args, &CancellationFlag::new()).unwrap();

    let (_, rows) = read_csv(&output);
    assert_eq!(rows.len() as u64, ROW_COUNT);
    for row in &rows {
        assert_eq!(row["label"], "fallback");
        let n: i32 = row["n"].parse().unwrap();
        assert_eq!(row["doubled"], (n * 2).to_string());
    }
}

#[test]
fn test_missing_model_is_an_error() {
    let temp_dir = TempDir::new().unwrap();
    let output = temp_dir.path().join("never.csv");
    let args = generate_args("tests/fixtures/does-not-exist.yaml", SinkFormat::Csv, &output);

    let err = generate(&args, &CancellationFlag::new()).unwrap_err();
    assert!(format!("{err:#}").contains("Failed to load model"));
    assert!(!output.exists());
}
