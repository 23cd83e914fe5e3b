//! Connection parsing and comparison profiles

use crate::common::TestFixture;
use rowdiff::config::ServerConfig;
use rowdiff::{BackendConfig, ComparisonProfile, RowdiffError, Source};
use std::fs;
use std::path::PathBuf;

#[test]
fn test_mysql_connection_with_env_password() {
    std::env::set_var("ROWDIFF_IT_MYSQL_PASS", "pw");
    let config =
        BackendConfig::parse("mysql:host=db user=app password={ROWDIFF_IT_MYSQL_PASS} dbname=shop")
            .unwrap();

    assert_eq!(
        config,
        BackendConfig::MySql(ServerConfig {
            host: "db".to_string(),
            port: None,
            user: "app".to_string(),
            password: Some("pw".to_string()),
            database: "shop".to_string(),
            schema: None,
        })
    );
    assert_eq!(config.kind(), "mysql");
}

#[test]
fn test_unset_env_var_is_config_error() {
    let err = BackendConfig::parse("postgres:host={ROWDIFF_IT_NEVER_SET} user=u dbname=d")
        .unwrap_err();
    assert!(matches!(err, RowdiffError::Config { .. }));
}

#[test]
fn test_profile_with_separate_target() {
    let fixture = TestFixture::new().unwrap();
    let path = fixture.path("cross.json");
    fs::write(
        &path,
        r#"{
            "source": {"type": "duckdb", "path": "left.duckdb"},
            "target": {"type": "sqlite", "path": "right.db"},
            "table1": {"table": "orders"},
            "table2": {"query": "SELECT * FROM orders_archive"},
            "where2": "year = 2023"
        }"#,
    )
    .unwrap();

    let profile = ComparisonProfile::load(&path).unwrap();
    assert_eq!(
        profile.target(),
        &BackendConfig::Sqlite {
            path: PathBuf::from("right.db")
        }
    );
    assert_eq!(profile.table2, Source::query("SELECT * FROM orders_archive"));
    assert_eq!(profile.filter_b.as_deref(), Some("year = 2023"));
    assert!(profile.fields.is_empty());
}

#[test]
fn test_profile_with_invalid_backend_is_rejected() {
    let fixture = TestFixture::new().unwrap();
    let path = fixture.path("bad.json");
    fs::write(
        &path,
        r#"{
            "source": {"type": "postgres", "host": "", "user": "u", "database": "d"},
            "table1": {"table": "a"},
            "table2": {"table": "b"}
        }"#,
    )
    .unwrap();

    let err = ComparisonProfile::load(&path).unwrap_err();
    assert!(err.to_string().contains("host"));
}

#[test]
fn test_missing_profile_file() {
    let fixture = TestFixture::new().unwrap();
    let err = ComparisonProfile::load(&fixture.path("absent.json")).unwrap_err();
    assert!(matches!(err, RowdiffError::Config { .. }));
}
