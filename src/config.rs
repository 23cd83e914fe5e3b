//! Connection configuration and comparison profiles

use crate::error::{Result, RowdiffError};
use crate::query::Source;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Connection settings for a server-based backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    pub user: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    pub database: String,
    /// Schema to resolve unqualified table names against
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
}

/// Validated configuration for one backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum BackendConfig {
    /// DuckDB database file; in-memory when no path is given
    DuckDb {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        path: Option<PathBuf>,
    },
    Sqlite {
        path: PathBuf,
    },
    Postgres(ServerConfig),
    MySql(ServerConfig),
}

impl BackendConfig {
    /// Parse the command-line connection syntax.
    ///
    /// * `duckdb:<path>` or a bare path: a DuckDB database file
    /// * `duckdb::memory:`: an in-memory DuckDB database
    /// * `sqlite:<path>`: a SQLite database file
    /// * `postgres:host=.. port=.. user=.. password=.. dbname=.. schema=..`
    /// * `mysql:` with the same keys
    ///
    /// `{VAR}` placeholders are replaced from the environment and the result
    /// is validated.
    pub fn parse(spec: &str) -> Result<Self> {
        let spec = substitute_env_vars(spec.trim())?;

        let config = match spec.split_once(':') {
            Some(("duckdb", ":memory:")) | Some(("duckdb", "")) => BackendConfig::DuckDb { path: None },
            Some(("duckdb", path)) => BackendConfig::DuckDb {
                path: Some(PathBuf::from(path)),
            },
            Some(("sqlite", path)) => BackendConfig::Sqlite {
                path: PathBuf::from(path),
            },
            Some(("postgres", params)) | Some(("postgresql", params)) => {
                BackendConfig::Postgres(parse_server_params(params)?)
            }
            Some(("mysql", params)) => BackendConfig::MySql(parse_server_params(params)?),
            _ if spec == ":memory:" => BackendConfig::DuckDb { path: None },
            _ => BackendConfig::DuckDb {
                path: Some(PathBuf::from(&spec)),
            },
        };

        config.validate()?;
        Ok(config)
    }

    /// Reject settings that cannot describe a reachable source.
    pub fn validate(&self) -> Result<()> {
        match self {
            BackendConfig::DuckDb { path: Some(path) } | BackendConfig::Sqlite { path }
                if path.as_os_str().is_empty() =>
            {
                Err(RowdiffError::config(format!(
                    "{} connection requires a database path",
                    self.kind()
                )))
            }
            BackendConfig::Postgres(server) | BackendConfig::MySql(server) => {
                let missing: Vec<&str> = [
                    ("host", server.host.as_str()),
                    ("user", server.user.as_str()),
                    ("database", server.database.as_str()),
                ]
                .iter()
                .filter(|(_, v)| v.trim().is_empty())
                .map(|(k, _)| *k)
                .collect();

                if missing.is_empty() {
                    Ok(())
                } else {
                    Err(RowdiffError::config(format!(
                        "{} connection is missing: {}",
                        self.kind(),
                        missing.join(", ")
                    )))
                }
            }
            _ => Ok(()),
        }
    }

    /// Backend name as used in logs and profiles
    pub fn kind(&self) -> &'static str {
        match self {
            BackendConfig::DuckDb { .. } => "duckdb",
            BackendConfig::Sqlite { .. } => "sqlite",
            BackendConfig::Postgres(_) => "postgres",
            BackendConfig::MySql(_) => "mysql",
        }
    }
}

fn parse_server_params(params: &str) -> Result<ServerConfig> {
    let mut server = ServerConfig {
        host: String::new(),
        port: None,
        user: String::new(),
        password: None,
        database: String::new(),
        schema: None,
    };

    for pair in params.split_whitespace() {
        let (key, value) = pair.split_once('=').ok_or_else(|| {
            RowdiffError::config(format!("Expected key=value in connection string, got '{}'", pair))
        })?;

        match key {
            "host" => server.host = value.to_string(),
            "port" => {
                server.port = Some(value.parse().map_err(|_| {
                    RowdiffError::config(format!("Invalid port: '{}'", value))
                })?)
            }
            "user" => server.user = value.to_string(),
            "password" | "passwd" => server.password = Some(value.to_string()),
            "dbname" | "database" | "db" => server.database = value.to_string(),
            "schema" => server.schema = Some(value.to_string()),
            other => {
                return Err(RowdiffError::config(format!(
                    "Unknown connection parameter: '{}'",
                    other
                )))
            }
        }
    }

    Ok(server)
}

/// Substitute environment variables written as `{VAR_NAME}`.
pub fn substitute_env_vars(input: &str) -> Result<String> {
    let mut result = input.to_string();

    let mut start = 0;
    while let Some(open_pos) = result[start..].find('{') {
        let open_pos = start + open_pos;
        if let Some(close_pos) = result[open_pos..].find('}') {
            let close_pos = open_pos + close_pos;
            let var_name = &result[open_pos + 1..close_pos];

            let var_value = env::var(var_name).map_err(|_| {
                RowdiffError::config(format!("Environment variable '{}' not found", var_name))
            })?;

            result.replace_range(open_pos..=close_pos, &var_value);
            start = open_pos + var_value.len();
        } else {
            start = open_pos + 1;
        }
    }

    Ok(result)
}

/// A saved comparison: both connections, both sources and the options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonProfile {
    pub source: BackendConfig,
    /// Defaults to `source` when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<BackendConfig>,
    pub table1: Source,
    pub table2: Source,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exclude: Vec<String>,
    #[serde(default, rename = "where", skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
    #[serde(default, rename = "where1", skip_serializing_if = "Option::is_none")]
    pub filter_a: Option<String>,
    #[serde(default, rename = "where2", skip_serializing_if = "Option::is_none")]
    pub filter_b: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub csv_report: Option<PathBuf>,
}

impl ComparisonProfile {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            RowdiffError::config(format!("Failed to read profile '{}': {}", path.display(), e))
        })?;
        let profile: Self = serde_json::from_str(&content)?;

        profile.source.validate()?;
        if let Some(target) = &profile.target {
            target.validate()?;
        }
        Ok(profile)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn target(&self) -> &BackendConfig {
        self.target.as_ref().unwrap_or(&self.source)
    }
}
