//! Tests for TOML bootstrap configuration
//!
//! Covers file location priority (CLI → ENV → user config dir), parsing with
//! partial files, and error reporting for unreadable or malformed files.
//!
//! Note: Uses serial_test crate to prevent ENV variable race conditions.
//! Tests that manipulate CDL_TEST_CONFIG are marked with #[serial].

use cdl_common::config::{load_toml_config, parse_toml_config, resolve_config_path, PipelineSettings};
use cdl_common::Error;
use serial_test::serial;
use std::env;
use std::io::Write;
use std::path::PathBuf;
use tempfile::NamedTempFile;

const ENV_VAR: &str = "CDL_TEST_CONFIG";

#[test]
fn test_parse_full_config() {
    let config = parse_toml_config(
        r#"
        port = 9000
        bind_address = "0.0.0.0"
        supabase_url = "https://example.supabase.co"
        supabase_key = "service-key"
        evolution_url = "https://evolution.example.com"
        evolution_instance = "Campaign"
        evolution_api_key = "evo-key"

        [logging]
        level = "debug"

        [pipeline]
        max_in_flight = 8
        call_timeout_secs = 10
        "#,
    )
    .expect("Should parse full config");

    assert_eq!(config.port, Some(9000));
    assert_eq!(config.bind_address.as_deref(), Some("0.0.0.0"));
    assert_eq!(config.supabase_url.as_deref(), Some("https://example.supabase.co"));
    assert_eq!(config.evolution_instance.as_deref(), Some("Campaign"));
    assert_eq!(config.logging.level, "debug");
    assert_eq!(config.pipeline.max_in_flight, 8);
    assert_eq!(config.pipeline.call_timeout_secs, 10);
}

#[test]
fn test_parse_empty_config_uses_defaults() {
    let config = parse_toml_config("").expect("Empty file is valid");

    assert!(config.port.is_none());
    assert!(config.supabase_key.is_none());
    assert_eq!(config.logging.level, "info");
    assert_eq!(config.pipeline, PipelineSettings::default());
}

#[test]
fn test_parse_partial_pipeline_section() {
    let config = parse_toml_config("[pipeline]\nmax_in_flight = 2\n").unwrap();

    assert_eq!(config.pipeline.max_in_flight, 2);
    assert_eq!(config.pipeline.call_timeout_secs, 30);
}

#[test]
fn test_parse_rejects_wrong_types() {
    assert!(parse_toml_config("port = \"eight thousand\"").is_err());
}

#[test]
fn test_load_from_file() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "port = 8123").unwrap();

    let config = load_toml_config(Some(file.path())).expect("Should load file");
    assert_eq!(config.port, Some(8123));
}

#[test]
fn test_load_missing_file_is_config_error() {
    let path = PathBuf::from("/nonexistent/cdl/cdl-api.toml");
    let err = load_toml_config(Some(&path)).unwrap_err();

    assert!(matches!(err, Error::Config(_)));
    assert!(err.to_string().contains("/nonexistent/cdl/cdl-api.toml"));
}

#[test]
fn test_load_malformed_file_is_config_error() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "port = [").unwrap();

    let err = load_toml_config(Some(file.path())).unwrap_err();
    assert!(matches!(err, Error::Config(ref msg) if msg.contains("Parse")));
}

#[test]
#[serial]
fn test_cli_path_wins_over_env() {
    env::set_var(ENV_VAR, "/tmp/from-env.toml");

    let cli = PathBuf::from("/tmp/from-cli.toml");
    let resolved = resolve_config_path(Some(&cli), ENV_VAR, "cdl-api.toml");
    assert_eq!(resolved, Some(cli));

    env::remove_var(ENV_VAR);
}

#[test]
#[serial]
fn test_env_path_used_without_cli() {
    env::set_var(ENV_VAR, "/tmp/from-env.toml");

    let resolved = resolve_config_path(None, ENV_VAR, "cdl-api.toml");
    assert_eq!(resolved, Some(PathBuf::from("/tmp/from-env.toml")));

    env::remove_var(ENV_VAR);
}

#[test]
#[serial]
fn test_blank_env_path_is_ignored() {
    env::set_var(ENV_VAR, "   ");

    // Falls through to the user config dir, which won't hold this file name
    let resolved = resolve_config_path(None, ENV_VAR, "cdl-test-does-not-exist.toml");
    assert_eq!(resolved, None);

    env::remove_var(ENV_VAR);
}
