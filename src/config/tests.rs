//! Tests for config functionality.

use crate::config::Config;
use std::path::Path;
use tempfile::TempDir;

#[test]
fn test_default_config() {
    let config = Config::default();

    assert_eq!(config.max_parallel, 1);
    assert!(config.lexicographic_tie_break);
    assert_eq!(config.agents_file, "agents.yaml");
    assert_eq!(config.roadmap_file, "roadmaps.json");
    assert!(config.extra.is_empty());
}

#[test]
fn test_parse_empty_yaml() {
    let config = Config::from_yaml("").unwrap();
    assert_eq!(config, Config::default());
}

#[test]
fn test_parse_partial_yaml() {
    let yaml = r#"
max_parallel: 4
lexicographic_tie_break: false
"#;
    let config = Config::from_yaml(yaml).unwrap();

    assert_eq!(config.max_parallel, 4);
    assert!(!config.lexicographic_tie_break);
    assert_eq!(config.agents_file, "agents.yaml");
}

#[test]
fn test_unknown_fields_preserved() {
    let yaml = r#"
max_parallel: 2
future_setting: enabled
nested:
  key: value
"#;
    let config = Config::from_yaml(yaml).unwrap();
    assert_eq!(config.extra.len(), 2);

    let written = config.to_yaml().unwrap();
    let reparsed = Config::from_yaml(&written).unwrap();
    assert_eq!(reparsed, config);
    assert!(written.contains("future_setting: enabled"));
}

#[test]
fn test_zero_max_parallel_rejected() {
    let err = Config::from_yaml("max_parallel: 0").unwrap_err();
    assert!(err.to_string().contains("max_parallel must be greater than 0"));
}

#[test]
fn test_empty_file_names_rejected() {
    let err = Config::from_yaml("agents_file: \"\"").unwrap_err();
    assert!(err.to_string().contains("agents_file must not be empty"));

    let err = Config::from_yaml("roadmap_file: \"  \"").unwrap_err();
    assert!(err.to_string().contains("roadmap_file must not be empty"));
}

#[test]
fn test_invalid_yaml() {
    let err = Config::from_yaml("max_parallel: [unclosed").unwrap_err();
    assert!(err.to_string().contains("failed to parse config YAML"));
}

#[test]
fn test_wrong_type() {
    let err = Config::from_yaml("max_parallel: many").unwrap_err();
    assert!(err.to_string().contains("failed to parse config YAML"));
}

#[test]
fn test_load_from_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.yaml");
    std::fs::write(&path, "max_parallel: 3\nroadmap_file: plans.json\n").unwrap();

    let config = Config::load(&path).unwrap();

    assert_eq!(config.max_parallel, 3);
    assert_eq!(config.roadmap_file, "plans.json");
}

#[test]
fn test_load_missing_file() {
    let temp_dir = TempDir::new().unwrap();
    let err = Config::load(temp_dir.path().join("missing.yaml")).unwrap_err();
    assert!(err.to_string().contains("failed to read config file"));
}

#[test]
fn test_paths_relative_to_state_dir() {
    let config = Config::default();
    let state_dir = Path::new("/work/.sprintctl");

    assert_eq!(
        config.agents_path(state_dir),
        Path::new("/work/.sprintctl/agents.yaml")
    );
    assert_eq!(
        config.roadmap_path(state_dir),
        Path::new("/work/.sprintctl/roadmaps.json")
    );
}

#[cfg(unix)]
#[test]
fn test_absolute_paths_kept() {
    let config = Config {
        roadmap_file: "/srv/roadmaps.json".to_string(),
        ..Config::default()
    };
    assert_eq!(
        config.roadmap_path(Path::new("/work/.sprintctl")),
        Path::new("/srv/roadmaps.json")
    );
}
