//! Layered configuration loading

use crate::integration::with_config_env;
use stagetree::config::{ConfigLoader, StageConfig};
use stagetree::MergeStrategy;
use std::fs;

#[test]
fn test_defaults_without_files() {
    with_config_env(|home| {
        let workspace = home.path().join("workspace");
        fs::create_dir_all(&workspace).unwrap();

        let config = ConfigLoader::load(&workspace).unwrap();
        assert!(config.tree.record_identical_overwrites);
        assert_eq!(config.tree.merge_strategy, MergeStrategy::Default);
        assert_eq!(config.logging.level, "info");
        assert!(config.validate().is_ok());
    });
}

#[test]
fn test_workspace_overrides_global() {
    with_config_env(|home| {
        let global_dir = home.path().join("xdg").join("stagetree");
        fs::create_dir_all(&global_dir).unwrap();
        fs::write(
            global_dir.join("config.toml"),
            "[tree]\nmerge_strategy = \"overwrite\"\nrecord_identical_overwrites = false\n",
        )
        .unwrap();

        let workspace = home.path().join("workspace");
        fs::create_dir_all(workspace.join("config")).unwrap();
        fs::write(
            workspace.join("config").join("stagetree.toml"),
            "[tree]\nmerge_strategy = \"error\"\n",
        )
        .unwrap();

        let config = ConfigLoader::load(&workspace).unwrap();
        assert_eq!(config.tree.merge_strategy, MergeStrategy::Error);
        assert!(!config.tree.record_identical_overwrites);
    });
}

#[test]
fn test_environment_specific_file() {
    with_config_env(|home| {
        let workspace = home.path().join("workspace");
        fs::create_dir_all(workspace.join("config")).unwrap();
        fs::write(
            workspace.join("config").join("stagetree.toml"),
            "[logging]\nlevel = \"warn\"\n",
        )
        .unwrap();
        fs::write(
            workspace.join("config").join("stagetree.ci.toml"),
            "[logging]\nlevel = \"debug\"\n",
        )
        .unwrap();

        std::env::set_var("STAGETREE_ENV", "ci");
        let config = ConfigLoader::load(&workspace).unwrap();
        assert_eq!(config.logging.level, "debug");
    });
}

#[test]
fn test_invalid_strategy_is_an_error() {
    with_config_env(|home| {
        let path = home.path().join("broken.toml");
        fs::write(&path, "[tree]\nmerge_strategy = \"sometimes\"\n").unwrap();
        assert!(ConfigLoader::load_from_file(&path).is_err());
    });
}

#[test]
fn test_validation_reports_bad_logging() {
    let mut config = StageConfig::default();
    config.logging.output = "syslog".to_string();
    let errors = config.validate().unwrap_err();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].to_string().contains("syslog"));
}
