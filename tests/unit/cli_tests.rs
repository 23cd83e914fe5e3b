//! Command-line parsing

use clap::Parser;
use rowdiff::cli::{Cli, Commands};

#[test]
fn test_verbose_flag_is_global() {
    let cli = Cli::try_parse_from(["rowdiff", "fields", "db.duckdb", "users", "-v"]).unwrap();
    assert!(cli.verbose);
    match cli.command {
        Commands::Fields {
            connection, table, format,
        } => {
            assert_eq!(connection, "db.duckdb");
            assert_eq!(table, "users");
            assert_eq!(format, "pretty");
        }
        _ => panic!("expected fields command"),
    }
}

#[test]
fn test_per_side_filters_and_lists() {
    let cli = Cli::try_parse_from([
        "rowdiff", "compare", "--source", "a.duckdb", "--target", "sqlite:b.db",
        "--table1", "t", "--table2", "t", "--exclude", "updated_at,phone",
        "--where1", "id < 10", "--where2", "id < 20", "--detailed",
    ])
    .unwrap();

    match cli.command {
        Commands::Compare(args) => {
            assert_eq!(args.target.as_deref(), Some("sqlite:b.db"));
            assert_eq!(args.exclude, vec!["updated_at", "phone"]);
            assert_eq!(args.filter1.as_deref(), Some("id < 10"));
            assert_eq!(args.filter2.as_deref(), Some("id < 20"));
            assert!(args.detailed);
            assert!(args.fields.is_empty());
        }
        _ => panic!("expected compare command"),
    }
}

#[test]
fn test_fields_requires_table() {
    assert!(Cli::try_parse_from(["rowdiff", "fields", "db.duckdb"]).is_err());
}

#[test]
fn test_unknown_subcommand() {
    assert!(Cli::try_parse_from(["rowdiff", "merge"]).is_err());
}
