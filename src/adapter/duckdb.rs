//! DuckDB-backed adapter.
//!
//! DuckDB reads its own database files directly and reaches SQLite,
//! PostgreSQL and MySQL sources through `ATTACH ... (TYPE ...)`, so every
//! backend in [`BackendConfig`] is served by this one adapter.
//!
//! Result sets are streamed in pages of `LIMIT`/`OFFSET` over the plan's
//! `ORDER BY`, so at most one page per cursor is held in memory.

use super::{DatabaseAdapter, RowCursor};
use crate::config::{BackendConfig, ServerConfig};
use crate::error::{Result, RowdiffError};
use crate::query::{QueryPlan, Source};
use crate::value::{Row, Value};
use ::duckdb::types::{TimeUnit, ValueRef};
use ::duckdb::Connection;
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use std::sync::Arc;

const ATTACH_ALIAS: &str = "src";

/// Rows fetched per page while streaming a result set
pub const DEFAULT_BATCH_SIZE: usize = 10_000;

pub struct DuckDbAdapter {
    connection: Option<Connection>,
    backend: &'static str,
    batch_size: usize,
}

impl DuckDbAdapter {
    /// Open a connection for the given backend configuration.
    pub fn open(config: &BackendConfig) -> Result<Self> {
        config.validate()?;

        let connection = match config {
            BackendConfig::DuckDb { path: Some(path) } => {
                log::debug!("Opening DuckDB database {}", path.display());
                Connection::open(path)?
            }
            BackendConfig::DuckDb { path: None } => Connection::open_in_memory()?,
            other => {
                let connection = Connection::open_in_memory()?;
                let attach = attach_statement(other);
                log::debug!("Attaching {} source", other.kind());
                connection.execute_batch(&attach).map_err(|e| {
                    RowdiffError::adapter(format!(
                        "Failed to attach {} source: {}",
                        other.kind(),
                        e
                    ))
                })?;
                connection
            }
        };

        Ok(Self {
            connection: Some(connection),
            backend: config.kind(),
            batch_size: DEFAULT_BATCH_SIZE,
        })
    }

    /// Wrap an existing DuckDB connection.
    pub fn from_connection(connection: Connection) -> Self {
        Self {
            connection: Some(connection),
            backend: "duckdb",
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    /// Set the number of rows fetched per page; zero is treated as one.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    fn connection(&self) -> Result<&Connection> {
        self.connection
            .as_ref()
            .ok_or_else(|| RowdiffError::adapter("connection is closed"))
    }
}

impl DatabaseAdapter for DuckDbAdapter {
    fn backend(&self) -> &str {
        self.backend
    }

    fn fields(&self, source: &Source) -> Result<Vec<String>> {
        let sql = format!("DESCRIBE {}", select_all(source));
        let connection = self.connection()?;

        let mut stmt = connection
            .prepare(&sql)
            .map_err(|e| convert_duckdb_error(e, source))?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(|e| convert_duckdb_error(e, source))?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| convert_duckdb_error(e, source))?;

        log::debug!("{} has {} columns", source, names.len());
        Ok(names)
    }

    fn primary_keys(&self, source: &Source) -> Result<Vec<String>> {
        let table = match source {
            Source::Table(name) => name,
            Source::Query(_) => return Ok(Vec::new()),
        };

        let sql = format!(
            "SELECT name FROM pragma_table_info('{}') WHERE pk ORDER BY cid",
            table.replace('\'', "''")
        );
        let connection = self.connection()?;

        let mut stmt = connection
            .prepare(&sql)
            .map_err(|e| convert_duckdb_error(e, source))?;
        let keys = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(|e| convert_duckdb_error(e, source))?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| convert_duckdb_error(e, source))?;

        Ok(keys)
    }

    fn execute(&self, plan: &QueryPlan) -> Result<RowCursor<'_>> {
        let sql = render_sql(plan);
        log::debug!("Executing: {} (pages of {})", sql, self.batch_size);

        let mut cursor = PagedCursor {
            connection: self.connection()?,
            sql,
            source: plan.source.clone(),
            columns: plan.columns.iter().cloned().collect(),
            batch_size: self.batch_size,
            offset: 0,
            page: Vec::new().into_iter(),
            exhausted: false,
        };
        // The first page is read eagerly so that bad SQL fails here
        cursor.load_page()?;

        Ok(Box::new(cursor))
    }

    fn close(&mut self) -> Result<()> {
        if let Some(connection) = self.connection.take() {
            connection.close().map_err(|(_, e)| RowdiffError::DuckDb(e))?;
        }
        Ok(())
    }
}

/// Forward-only cursor that re-issues the ordered query one page at a time
struct PagedCursor<'a> {
    connection: &'a Connection,
    sql: String,
    source: Source,
    columns: Arc<[String]>,
    batch_size: usize,
    offset: usize,
    page: std::vec::IntoIter<Row>,
    exhausted: bool,
}

impl PagedCursor<'_> {
    fn load_page(&mut self) -> Result<()> {
        let sql = format!("{} LIMIT {} OFFSET {}", self.sql, self.batch_size, self.offset);
        let width = self.columns.len();

        let mut stmt = self
            .connection
            .prepare(&sql)
            .map_err(|e| convert_duckdb_error(e, &self.source))?;
        let rows = stmt
            .query_map([], |row| {
                let mut values = Vec::with_capacity(width);
                for i in 0..width {
                    values.push(convert_value(row.get_ref(i)?));
                }
                Ok(values)
            })
            .map_err(|e| convert_duckdb_error(e, &self.source))?;

        let mut page = Vec::with_capacity(self.batch_size);
        for values in rows {
            let values = values.map_err(|e| convert_duckdb_error(e, &self.source))?;
            page.push(Row::new(Arc::clone(&self.columns), values));
        }

        log::debug!(
            "Read {} rows from {} at offset {}",
            page.len(),
            self.source,
            self.offset
        );
        self.offset += page.len();
        self.exhausted = page.len() < self.batch_size;
        self.page = page.into_iter();
        Ok(())
    }
}

impl Iterator for PagedCursor<'_> {
    type Item = Result<Row>;

    fn next(&mut self) -> Option<Result<Row>> {
        loop {
            if let Some(row) = self.page.next() {
                return Some(Ok(row));
            }
            if self.exhausted {
                return None;
            }
            if let Err(e) = self.load_page() {
                self.exhausted = true;
                return Some(Err(e));
            }
        }
    }
}

/// Convert DuckDB errors, mapping missing-relation failures to `TableNotFound`
fn convert_duckdb_error(error: ::duckdb::Error, source: &Source) -> RowdiffError {
    match source {
        Source::Table(name) if is_missing_relation(&error.to_string()) => {
            RowdiffError::table_not_found(name.clone())
        }
        _ => RowdiffError::DuckDb(error),
    }
}

/// Missing table or view, as reported by DuckDB and attached SQLite/PostgreSQL
/// catalogs. Other catalog errors (unknown functions, types) are not matched.
fn is_missing_relation(message: &str) -> bool {
    message.contains("Table with name")
        || message.contains("no such table")
        || (message.contains("relation") && message.contains("does not exist"))
}

fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn select_all(source: &Source) -> String {
    format!("SELECT * FROM {}", from_clause(source))
}

fn from_clause(source: &Source) -> String {
    match source {
        Source::Table(name) => name.clone(),
        Source::Query(sql) => format!("({}) AS q", sql.trim().trim_end_matches(';')),
    }
}

/// Render a plan as a DuckDB `SELECT`
pub(crate) fn render_sql(plan: &QueryPlan) -> String {
    let columns = plan
        .columns
        .iter()
        .map(|c| quote_identifier(c))
        .collect::<Vec<_>>()
        .join(", ");

    let mut sql = format!("SELECT {} FROM {}", columns, from_clause(&plan.source));
    if let Some(filter) = &plan.filter {
        sql.push_str(&format!(" WHERE {}", filter));
    }
    if !plan.order_by.is_empty() {
        let order = plan
            .order_by
            .iter()
            .map(|c| quote_identifier(c))
            .collect::<Vec<_>>()
            .join(", ");
        sql.push_str(&format!(" ORDER BY {}", order));
    }
    sql
}

fn attach_statement(config: &BackendConfig) -> String {
    let escape = |s: &str| s.replace('\'', "''");

    match config {
        BackendConfig::Sqlite { path } => format!(
            "ATTACH '{}' AS {} (TYPE sqlite, READ_ONLY); USE {};",
            escape(&path.to_string_lossy()),
            ATTACH_ALIAS,
            ATTACH_ALIAS
        ),
        BackendConfig::Postgres(server) => {
            let schema = server.schema.as_deref().unwrap_or("public");
            format!(
                "ATTACH '{}' AS {} (TYPE postgres, READ_ONLY); USE {}.{};",
                escape(&server_dsn(server, "dbname", "password")),
                ATTACH_ALIAS,
                ATTACH_ALIAS,
                quote_identifier(schema)
            )
        }
        BackendConfig::MySql(server) => format!(
            "ATTACH '{}' AS {} (TYPE mysql, READ_ONLY); USE {};",
            escape(&server_dsn(server, "database", "password")),
            ATTACH_ALIAS,
            ATTACH_ALIAS
        ),
        BackendConfig::DuckDb { .. } => String::new(),
    }
}

fn server_dsn(server: &ServerConfig, database_key: &str, password_key: &str) -> String {
    let mut parts = vec![format!("host={}", server.host)];
    if let Some(port) = server.port {
        parts.push(format!("port={}", port));
    }
    parts.push(format!("user={}", server.user));
    if let Some(password) = &server.password {
        parts.push(format!("{}={}", password_key, password));
    }
    parts.push(format!("{}={}", database_key, server.database));
    parts.join(" ")
}

fn convert_value(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Boolean(b) => Value::Bool(b),
        ValueRef::TinyInt(i) => Value::Int(i64::from(i)),
        ValueRef::SmallInt(i) => Value::Int(i64::from(i)),
        ValueRef::Int(i) => Value::Int(i64::from(i)),
        ValueRef::BigInt(i) => Value::Int(i),
        ValueRef::HugeInt(i) => i64::try_from(i)
            .map(Value::Int)
            .unwrap_or_else(|_| Value::Text(i.to_string())),
        ValueRef::UTinyInt(i) => Value::Int(i64::from(i)),
        ValueRef::USmallInt(i) => Value::Int(i64::from(i)),
        ValueRef::UInt(i) => Value::Int(i64::from(i)),
        ValueRef::UBigInt(i) => i64::try_from(i)
            .map(Value::Int)
            .unwrap_or_else(|_| Value::Text(i.to_string())),
        ValueRef::Float(f) => Value::Float(f64::from(f)),
        ValueRef::Double(f) => Value::Float(f),
        ValueRef::Decimal(d) => Value::Decimal(d),
        ValueRef::Text(s) => Value::Text(String::from_utf8_lossy(s).into_owned()),
        ValueRef::Blob(b) => Value::Bytes(b.to_vec()),
        ValueRef::Date32(days) => NaiveDate::default()
            .checked_add_signed(Duration::days(i64::from(days)))
            .map(Value::Date)
            .unwrap_or_else(|| Value::Text(days.to_string())),
        ValueRef::Time64(unit, t) => {
            let micros = to_micros(unit, t);
            NaiveTime::from_num_seconds_from_midnight_opt(
                (micros.div_euclid(1_000_000)) as u32,
                (micros.rem_euclid(1_000_000) * 1_000) as u32,
            )
            .map(Value::Time)
            .unwrap_or_else(|| Value::Text(t.to_string()))
        }
        ValueRef::Timestamp(unit, ts) => {
            let micros = to_micros(unit, ts);
            NaiveDateTime::default()
                .checked_add_signed(Duration::microseconds(micros))
                .map(Value::Timestamp)
                .unwrap_or_else(|| Value::Text(ts.to_string()))
        }
        other => Value::Text(format!("{:?}", other)),
    }
}

fn to_micros(unit: TimeUnit, value: i64) -> i64 {
    match unit {
        TimeUnit::Second => value.saturating_mul(1_000_000),
        TimeUnit::Millisecond => value.saturating_mul(1_000),
        TimeUnit::Microsecond => value,
        TimeUnit::Nanosecond => value / 1_000,
    }
}
