//! End-to-end comparisons against DuckDB database files

use crate::common::{assertions, sample_data, CliTestRunner, TestFixture};
use rowdiff::{
    compare, BackendConfig, ComparisonProfile, ComparisonSpec, DatabaseAdapter, DuckDbAdapter,
    RowClass, Source, Value,
};

fn open(path: &std::path::Path) -> DuckDbAdapter {
    DuckDbAdapter::open(&BackendConfig::DuckDb {
        path: Some(path.to_path_buf()),
    })
    .unwrap()
}

#[test]
fn test_mixed_scenario_on_duckdb() {
    let fixture = TestFixture::new().unwrap();
    let db = fixture.create_mixed_scenario_db().unwrap();
    let adapter = open(&db);

    let result = compare(&ComparisonSpec::tables("a", "b"), &adapter, &adapter).unwrap();

    assert_eq!(result.row_count_a, 2);
    assert_eq!(result.row_count_b, 3);
    assert_eq!(result.count_by_class(RowClass::DifferentData), 1);
    assert_eq!(result.count_by_class(RowClass::OnlyInB), 1);
    assert_eq!(result.row_differences[0].key_info(), "id=2");
}

#[test]
fn test_explicit_fields_with_extra_column() {
    let fixture = TestFixture::new().unwrap();
    let db = fixture
        .create_duckdb("staff.duckdb", sample_data::EMPLOYEES_SQL)
        .unwrap();
    let adapter = open(&db);

    let spec = ComparisonSpec::tables("employees", "employees_v2").with_fields(&["name", "salary"]);
    let result = compare(&spec, &adapter, &adapter).unwrap();

    assert_eq!(result.fields, vec!["name", "salary", "id"]);
    assert_eq!(result.row_differences.len(), 1);
    let diff = &result.row_differences[0].differences[0];
    assert_eq!(diff.field, "salary");
    assert_eq!(diff.value_a, Value::Int(4000));
    assert_eq!(diff.value_b, Value::Int(4200));
}

#[test]
fn test_shared_and_side_filters_combine() {
    let fixture = TestFixture::new().unwrap();
    let db = fixture
        .create_duckdb("staff.duckdb", sample_data::EMPLOYEES_SQL)
        .unwrap();
    let adapter = open(&db);

    let spec = ComparisonSpec::tables("employees", "employees_v2")
        .with_exclude(&["phone"])
        .with_filter("dept = 'eng'")
        .with_side_filters(None, Some("salary > 4600".to_string()));
    let result = compare(&spec, &adapter, &adapter).unwrap();

    // table1 keeps Alice and Carol, table2 only Alice
    assert_eq!(result.row_count_a, 2);
    assert_eq!(result.row_count_b, 1);
    assert_eq!(result.row_differences.len(), 1);
    assert_eq!(result.row_differences[0].class, RowClass::OnlyInA);
    assert_eq!(result.row_differences[0].key_info(), "id=3");
}

#[test]
fn test_query_sources_compare_positionally() {
    let fixture = TestFixture::new().unwrap();
    let db = fixture.create_mixed_scenario_db().unwrap();
    let adapter = open(&db);

    let spec = ComparisonSpec::new(
        Source::query("SELECT name, value FROM a"),
        Source::query("SELECT name, value FROM b WHERE id < 3"),
    );
    let result = compare(&spec, &adapter, &adapter).unwrap();

    assert_eq!(result.row_count_a, 2);
    assert_eq!(result.row_count_b, 2);
    assert_eq!(result.row_differences.len(), 1);
    let row = &result.row_differences[0];
    assert!(row.key.is_none());
    assert_eq!(row.row_number, 2);
    assert_eq!(row.differences[0].field, "value");
}

#[test]
fn test_cross_database_comparison() {
    let fixture = TestFixture::new().unwrap();
    let left = fixture
        .create_duckdb(
            "left.duckdb",
            "CREATE TABLE items (sku VARCHAR PRIMARY KEY, qty INTEGER);
             INSERT INTO items VALUES ('A1', 5), ('B2', 7);",
        )
        .unwrap();
    let right = fixture
        .create_duckdb(
            "right.duckdb",
            "CREATE TABLE items (sku VARCHAR PRIMARY KEY, qty INTEGER);
             INSERT INTO items VALUES ('A1', 5), ('B2', 8);",
        )
        .unwrap();

    let mut adapter_a = open(&left);
    let mut adapter_b = open(&right);
    let result = compare(&ComparisonSpec::tables("items", "items"), &adapter_a, &adapter_b).unwrap();
    adapter_a.close().unwrap();
    adapter_b.close().unwrap();

    assert_eq!(result.row_differences.len(), 1);
    assert_eq!(result.row_differences[0].key_info(), "sku=B2");
}

#[test]
fn test_compare_command_writes_csv_report() {
    let runner = CliTestRunner::new().unwrap();
    let db = runner.fixture().create_mixed_scenario_db().unwrap();
    let report = runner.fixture().path("out/report.csv");

    runner.expect_success(&[
        "compare",
        "--source",
        db.to_str().unwrap(),
        "--table1",
        "a",
        "--table2",
        "b",
        "--csv-report",
        report.to_str().unwrap(),
        "--format",
        "json",
    ]);

    assertions::assert_file_exists_and_not_empty(&report);
    let lines = assertions::read_lines(&report);
    assert_eq!(lines.len(), 5);
    assert_eq!(lines[1], "different_data,id=2,2,value,200,250");
}

#[test]
fn test_compare_command_with_saved_profile() {
    let runner = CliTestRunner::new().unwrap();
    let db = runner.fixture().create_mixed_scenario_db().unwrap();
    let profile_path = runner.fixture().path("profile.json");
    let report = runner.fixture().path("report.csv");

    runner.expect_success(&[
        "compare",
        "--source",
        &format!("duckdb:{}", db.display()),
        "--table1",
        "a",
        "--table2",
        "b",
        "--exclude",
        "name",
        "--save-profile",
        profile_path.to_str().unwrap(),
    ]);

    let profile = ComparisonProfile::load(&profile_path).unwrap();
    assert_eq!(profile.table1, Source::table("a"));
    assert_eq!(profile.exclude, vec!["name"]);

    runner.expect_success(&[
        "compare",
        "--profile",
        profile_path.to_str().unwrap(),
        "--csv-report",
        report.to_str().unwrap(),
    ]);
    let lines = assertions::read_lines(&report);
    assert!(lines.iter().all(|l| !l.contains(",name,")));
}

#[test]
fn test_fields_command() {
    let runner = CliTestRunner::new().unwrap();
    let db = runner.fixture().create_mixed_scenario_db().unwrap();

    runner.expect_success(&["fields", db.to_str().unwrap(), "a"]);
    runner.expect_success(&["fields", db.to_str().unwrap(), "b", "--format", "json"]);
}
