//! Integration tests for Settings config loading with layered precedence.
//!
//! Environment overrides use an explicit variable map instead of the process
//! environment so tests stay independent of each other.

use std::collections::HashMap;
use std::fs;

use tempfile::TempDir;

use treewalk::application::{ApplicationError, Strategy};
use treewalk::config::{environment, local_config_path, Settings, LOCAL_CONFIG_NAME};

fn env(vars: &[(&str, &str)]) -> config::Environment {
    let map: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    environment().source(Some(map))
}

#[test]
fn given_local_config_when_load_then_overrides_defaults() {
    let dir = TempDir::new().unwrap();
    let local = local_config_path(dir.path());
    fs::write(
        &local,
        r#"
[compare]
strategy = "early-exit"
channel_capacity = 8
"#,
    )
    .unwrap();

    let settings = Settings::load_from(None, Some(local.as_path()), env(&[])).unwrap();

    assert_eq!(settings.compare.strategy, Strategy::EarlyExit);
    assert_eq!(settings.compare.channel_capacity, 8);
    assert_eq!(settings.tree.size, 10, "unspecified values keep defaults");
}

#[test]
fn given_global_and_local_when_load_then_local_wins_per_field() {
    let dir = TempDir::new().unwrap();
    let global = dir.path().join("treewalk.toml");
    let local = dir.path().join(LOCAL_CONFIG_NAME);
    fs::write(
        &global,
        r#"
[compare]
strategy = "early-exit"

[tree]
size = 20
seed = 1
"#,
    )
    .unwrap();
    fs::write(
        &local,
        r#"
[tree]
seed = 2
"#,
    )
    .unwrap();

    let settings = Settings::load_from(Some(global.as_path()), Some(local.as_path()), env(&[])).unwrap();

    assert_eq!(settings.compare.strategy, Strategy::EarlyExit);
    assert_eq!(settings.tree.size, 20);
    assert_eq!(settings.tree.seed, Some(2));
}

#[test]
fn given_env_vars_when_load_then_env_wins_over_files() {
    let dir = TempDir::new().unwrap();
    let local = local_config_path(dir.path());
    fs::write(&local, "[tree]\nsize = 20\n").unwrap();

    let settings = Settings::load_from(
        None,
        Some(local.as_path()),
        env(&[
            ("TREEWALK_COMPARE__STRATEGY", "early-exit"),
            ("TREEWALK_COMPARE__CHANNEL_CAPACITY", "3"),
            ("TREEWALK_TREE__SIZE", "7"),
            ("TREEWALK_TREE__SEED", "42"),
        ]),
    )
    .unwrap();

    assert_eq!(settings.compare.strategy, Strategy::EarlyExit);
    assert_eq!(settings.compare.channel_capacity, 3);
    assert_eq!(settings.tree.size, 7);
    assert_eq!(settings.tree.seed, Some(42));
}

#[test]
fn given_missing_files_when_load_then_they_are_skipped() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("nope.toml");
    let settings = Settings::load_from(Some(missing.as_path()), Some(missing.as_path()), env(&[])).unwrap();
    assert_eq!(settings, Settings::default());
}

#[test]
fn given_invalid_strategy_in_env_when_load_then_config_error() {
    let result = Settings::load_from(None, None, env(&[("TREEWALK_COMPARE__STRATEGY", "maybe")]));
    assert!(matches!(result, Err(ApplicationError::Config { .. })));
}

#[test]
fn given_unknown_key_in_file_when_load_then_config_error_names_file() {
    let dir = TempDir::new().unwrap();
    let local = local_config_path(dir.path());
    fs::write(&local, "[compare]\nstrategi = \"drain\"\n").unwrap();

    let err = Settings::load_from(None, Some(local.as_path()), env(&[])).unwrap_err();
    assert!(matches!(err, ApplicationError::Config { .. }));
    assert!(err.to_string().contains(LOCAL_CONFIG_NAME));
}

#[test]
fn given_explicit_config_file_that_does_not_exist_when_load_then_errors() {
    let dir = TempDir::new().unwrap();
    let result = Settings::load(Some(dir.path().join("absent.toml").as_path()));
    assert!(matches!(result, Err(ApplicationError::Config { .. })));
}

#[test]
fn given_effective_settings_when_serialized_then_parses_back() {
    let dir = TempDir::new().unwrap();
    let local = local_config_path(dir.path());
    fs::write(&local, "[tree]\nseed = 5\n").unwrap();
    let settings = Settings::load_from(None, Some(local.as_path()), env(&[])).unwrap();

    let written = dir.path().join("effective.toml");
    fs::write(&written, settings.to_toml().unwrap()).unwrap();
    let reloaded = Settings::load_from(None, Some(written.as_path()), env(&[])).unwrap();
    assert_eq!(reloaded, settings);
}
