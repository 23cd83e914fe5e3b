//! Common test utilities and helpers

use rowdiff::{Result, RowdiffError};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Test fixture manager for creating temporary test environments
pub struct TestFixture {
    pub temp_dir: TempDir,
}

impl TestFixture {
    pub fn new() -> Result<Self> {
        Ok(Self {
            temp_dir: TempDir::new()?,
        })
    }

    /// Get the root path of the test fixture
    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.root().join(name)
    }

    /// Create a DuckDB database file and run `sql` against it
    pub fn create_duckdb(&self, name: &str, sql: &str) -> Result<PathBuf> {
        let path = self.path(name);
        let connection = duckdb::Connection::open(&path)?;
        connection.execute_batch(sql)?;
        connection
            .close()
            .map_err(|(_, e)| RowdiffError::DuckDb(e))?;
        Ok(path)
    }

    /// Create a database file holding two related tables
    pub fn create_mixed_scenario_db(&self) -> Result<PathBuf> {
        self.create_duckdb("mixed.duckdb", sample_data::MIXED_SCENARIO_SQL)
    }
}

/// Helper for running CLI commands in tests
pub struct CliTestRunner {
    fixture: TestFixture,
}

impl CliTestRunner {
    pub fn new() -> Result<Self> {
        Ok(Self {
            fixture: TestFixture::new()?,
        })
    }

    pub fn fixture(&self) -> &TestFixture {
        &self.fixture
    }

    /// Run a rowdiff command and return the result
    pub fn run_command(&self, args: &[&str]) -> Result<()> {
        use clap::Parser;
        use rowdiff::cli::Cli;
        use rowdiff::commands::execute_command;

        let mut cmd_args = vec!["rowdiff"];
        cmd_args.extend(args);

        let cli = Cli::try_parse_from(cmd_args)
            .map_err(|e| RowdiffError::invalid_input(e.to_string()))?;

        execute_command(cli.command)
    }

    /// Run a command and expect it to succeed
    pub fn expect_success(&self, args: &[&str]) {
        self.run_command(args).expect("Command should succeed");
    }

    /// Run a command and expect it to fail
    pub fn expect_failure(&self, args: &[&str]) -> RowdiffError {
        self.run_command(args).expect_err("Command should fail")
    }
}

/// Sample data generators for testing
pub mod sample_data {
    use rowdiff::{MemoryAdapter, MemoryTable, Value};

    /// Keyed tables: `a` = {1:(x,100), 2:(y,200)}, `b` = {1:(x,100), 2:(y,250), 3:(z,300)}
    pub const MIXED_SCENARIO_SQL: &str = "
        CREATE TABLE a (id INTEGER PRIMARY KEY, name VARCHAR, value INTEGER);
        CREATE TABLE b (id INTEGER PRIMARY KEY, name VARCHAR, value INTEGER);
        INSERT INTO a VALUES (1, 'x', 100), (2, 'y', 200);
        INSERT INTO b VALUES (1, 'x', 100), (2, 'y', 250), (3, 'z', 300);
    ";

    /// Employee tables differing in one column and one salary
    pub const EMPLOYEES_SQL: &str = "
        CREATE TABLE employees (id INTEGER PRIMARY KEY, name VARCHAR, salary INTEGER, dept VARCHAR);
        CREATE TABLE employees_v2 (id INTEGER PRIMARY KEY, name VARCHAR, salary INTEGER, dept VARCHAR, phone VARCHAR);
        INSERT INTO employees VALUES
            (1, 'Alice', 5000, 'eng'),
            (2, 'Bob', 4000, 'ops'),
            (3, 'Carol', 4500, 'eng');
        INSERT INTO employees_v2 VALUES
            (1, 'Alice', 5000, 'eng', '555-0101'),
            (2, 'Bob', 4200, 'ops', '555-0102'),
            (3, 'Carol', 4500, 'eng', NULL);
    ";

    fn keyed(rows: &[(i64, &str, i64)]) -> MemoryTable {
        rows.iter().fold(
            MemoryTable::new(&["id", "name", "value"]).with_primary_key(&["id"]),
            |table, (id, name, value)| {
                table.with_row(vec![Value::Int(*id), (*name).into(), Value::Int(*value)])
            },
        )
    }

    fn unkeyed(rows: &[(i64, &str)]) -> MemoryTable {
        rows.iter().fold(MemoryTable::new(&["id", "name"]), |table, (id, name)| {
            table.with_row(vec![Value::Int(*id), (*name).into()])
        })
    }

    /// In-memory version of [`MIXED_SCENARIO_SQL`]
    pub fn mixed_scenario() -> MemoryAdapter {
        MemoryAdapter::new()
            .with_table("a", keyed(&[(1, "x", 100), (2, "y", 200)]))
            .with_table("b", keyed(&[(1, "x", 100), (2, "y", 250), (3, "z", 300)]))
    }

    /// Tables without a primary key: `a` = [(1,a),(2,b)], `b` = [(1,a),(2,c),(3,d)]
    pub fn positional_scenario() -> MemoryAdapter {
        MemoryAdapter::new()
            .with_table("a", unkeyed(&[(1, "a"), (2, "b")]))
            .with_table("b", unkeyed(&[(1, "a"), (2, "c"), (3, "d")]))
    }
}

/// Assertion helpers for test validation
pub mod assertions {
    use std::path::Path;

    /// Assert that a file exists and is not empty
    pub fn assert_file_exists_and_not_empty(path: &Path) {
        assert!(path.exists(), "File should exist: {}", path.display());
        let metadata = std::fs::metadata(path).expect("Should be able to read file metadata");
        assert!(metadata.len() > 0, "File should not be empty: {}", path.display());
    }

    /// Read a CSV report and split it into lines
    pub fn read_lines(path: &Path) -> Vec<String> {
        std::fs::read_to_string(path)
            .expect("Should be able to read report")
            .lines()
            .map(|l| l.to_string())
            .collect()
    }
}
