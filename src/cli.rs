//! Command-line interface for rowdiff

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "rowdiff")]
#[command(about = "Row-level comparison of database tables and queries")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compare two tables or queries row by row
    Compare(CompareArgs),

    /// List the columns and primary key of a table
    Fields {
        /// Connection, e.g. "data.duckdb", "sqlite:app.db" or
        /// "postgres:host=.. user=.. dbname=.."
        connection: String,

        /// Table name
        table: String,

        /// Output format: "pretty", "json"
        #[arg(long, default_value = "pretty")]
        format: String,
    },
}

#[derive(Args, Debug)]
pub struct CompareArgs {
    /// Connection for table1 (and table2 unless --target is given)
    #[arg(long)]
    pub source: Option<String>,

    /// Connection for table2
    #[arg(long)]
    pub target: Option<String>,

    /// First table
    #[arg(long, conflicts_with = "query1")]
    pub table1: Option<String>,

    /// Second table
    #[arg(long, conflicts_with = "query2")]
    pub table2: Option<String>,

    /// SELECT statement used in place of table1
    #[arg(long)]
    pub query1: Option<String>,

    /// SELECT statement used in place of table2
    #[arg(long)]
    pub query2: Option<String>,

    /// Compare only these fields (comma separated)
    #[arg(long, value_delimiter = ',')]
    pub fields: Vec<String>,

    /// Leave these fields out of the comparison (comma separated)
    #[arg(long, value_delimiter = ',')]
    pub exclude: Vec<String>,

    /// SQL predicate applied to both sides. Passed to the database verbatim.
    #[arg(long = "where")]
    pub filter: Option<String>,

    /// SQL predicate applied to table1 only
    #[arg(long = "where1")]
    pub filter1: Option<String>,

    /// SQL predicate applied to table2 only
    #[arg(long = "where2")]
    pub filter2: Option<String>,

    /// Write field-level differences to this CSV file
    #[arg(long)]
    pub csv_report: Option<PathBuf>,

    /// List every field difference
    #[arg(long)]
    pub detailed: bool,

    /// Output format: "pretty", "json"
    #[arg(long, default_value = "pretty")]
    pub format: String,

    /// Load connections, sources and options from a JSON profile.
    /// Options given on the command line take precedence.
    #[arg(long)]
    pub profile: Option<PathBuf>,

    /// Save the effective comparison settings as a JSON profile
    #[arg(long)]
    pub save_profile: Option<PathBuf>,
}

/// Parse output format string
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputFormat {
    Pretty,
    Json,
}

impl OutputFormat {
    pub fn parse(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            _ => Err(format!("Invalid output format: {}. Use 'pretty' or 'json'", s)),
        }
    }
}
