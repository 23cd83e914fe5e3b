//! Error paths: missing tables and fields, backend failures, bad input

use crate::common::{sample_data, CliTestRunner, TestFixture};
use rowdiff::{
    compare, BackendConfig, ComparisonSpec, DatabaseAdapter, DuckDbAdapter, RowdiffError, Source,
};

#[test]
fn test_missing_table_in_memory() {
    let adapter = sample_data::mixed_scenario();
    let err = compare(&ComparisonSpec::tables("a", "nope"), &adapter, &adapter).unwrap_err();
    assert!(matches!(err, RowdiffError::TableNotFound { ref name } if name == "nope"));
}

#[test]
fn test_missing_table_in_duckdb_is_normalized() {
    let fixture = TestFixture::new().unwrap();
    let db = fixture.create_mixed_scenario_db().unwrap();
    let adapter = DuckDbAdapter::open(&BackendConfig::DuckDb { path: Some(db) }).unwrap();

    let err = compare(&ComparisonSpec::tables("missing", "b"), &adapter, &adapter).unwrap_err();
    match err {
        RowdiffError::TableNotFound { name } => assert_eq!(name, "missing"),
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn test_mid_stream_failure_is_comparison_failed() {
    let adapter = sample_data::mixed_scenario().failing_after(1);
    let err = compare(&ComparisonSpec::tables("a", "b"), &adapter, &adapter).unwrap_err();

    match &err {
        RowdiffError::ComparisonFailed { source } => {
            assert!(source.to_string().contains("connection lost"));
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert!(err.to_string().contains("connection lost"));
}

#[test]
fn test_invalid_filter_is_comparison_failed() {
    let fixture = TestFixture::new().unwrap();
    let db = fixture.create_mixed_scenario_db().unwrap();
    let adapter = DuckDbAdapter::open(&BackendConfig::DuckDb { path: Some(db) }).unwrap();

    let spec = ComparisonSpec::tables("a", "b").with_filter("no_such_column > 1");
    let err = compare(&spec, &adapter, &adapter).unwrap_err();
    assert!(matches!(err, RowdiffError::ComparisonFailed { .. }), "got {:?}", err);
}

#[test]
fn test_unknown_function_in_filter_is_comparison_failed() {
    let fixture = TestFixture::new().unwrap();
    let db = fixture.create_mixed_scenario_db().unwrap();
    let adapter = DuckDbAdapter::open(&BackendConfig::DuckDb { path: Some(db) }).unwrap();

    let spec = ComparisonSpec::tables("a", "b").with_filter("no_such_fn(id) > 0");
    let err = compare(&spec, &adapter, &adapter).unwrap_err();

    assert!(matches!(err, RowdiffError::ComparisonFailed { .. }), "got {:?}", err);
    assert!(err.to_string().contains("no_such_fn"));
}

#[test]
fn test_explicit_field_missing_on_both_sides() {
    let adapter = sample_data::mixed_scenario();
    let spec = ComparisonSpec::tables("a", "b").with_fields(&["name", "price"]);
    let err = compare(&spec, &adapter, &adapter).unwrap_err();

    match err {
        RowdiffError::FieldNotFound {
            missing_in_a,
            missing_in_b,
        } => {
            assert_eq!(missing_in_a, vec!["price"]);
            assert_eq!(missing_in_b, vec!["price"]);
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn test_excluding_everything_leaves_no_comparable_fields() {
    let adapter = sample_data::positional_scenario();
    let spec = ComparisonSpec::tables("a", "b").with_exclude(&["id", "name"]);
    let err = compare(&spec, &adapter, &adapter).unwrap_err();
    assert!(matches!(err, RowdiffError::NoComparableFields));
}

#[test]
fn test_closed_adapter_rejects_reads() {
    let mut adapter = DuckDbAdapter::open(&BackendConfig::DuckDb { path: None }).unwrap();
    adapter.close().unwrap();
    assert!(adapter.fields(&Source::table("a")).is_err());
}

#[test]
fn test_cli_rejects_unknown_connection_parameter() {
    let runner = CliTestRunner::new().unwrap();
    let err = runner.expect_failure(&[
        "compare",
        "--source",
        "postgres:host=db user=app dbname=x sslmode=require",
        "--table1",
        "a",
        "--table2",
        "b",
    ]);
    assert!(matches!(err, RowdiffError::Config { .. }));
}

#[test]
fn test_cli_rejects_unknown_format() {
    let runner = CliTestRunner::new().unwrap();
    let db = runner.fixture().create_mixed_scenario_db().unwrap();
    let err = runner.expect_failure(&[
        "compare", "--source", db.to_str().unwrap(), "--table1", "a", "--table2", "b",
        "--format", "xml",
    ]);
    assert!(matches!(err, RowdiffError::InvalidInput { .. }));
}

#[test]
fn test_cli_missing_table_fails() {
    let runner = CliTestRunner::new().unwrap();
    let db = runner.fixture().create_mixed_scenario_db().unwrap();
    let err = runner.expect_failure(&["fields", db.to_str().unwrap(), "ghost"]);
    assert!(matches!(err, RowdiffError::TableNotFound { .. }));
}
