use exectime_job::config::{Config, OrderPolicy};
use std::io::Write;
use std::path::PathBuf;
use tempfile::NamedTempFile;

#[test]
fn test_default_config() {
    let config = Config::default();
    assert_eq!(config.baseline.window_hours, 24);
    assert_eq!(config.baseline.band_multiplier, 1.5);
    assert_eq!(config.baseline.order, OrderPolicy::Arrival);
    assert_eq!(config.feed.timeout_seconds, 30);
    assert_eq!(config.logging.level, "info");
    assert!(config.validate().is_ok());
}

#[test]
fn test_load_from_toml() {
    let toml_content = r#"
[database]
path = "/tmp/analytics.db"

[feed]
endpoint = "http://feed.internal:5000/generate-data"
timeout_seconds = 5

[baseline]
window_hours = 12
band_multiplier = 2.0
order = "chronological"

[logging]
level = "debug"
file = "status.log"
"#;
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(toml_content.as_bytes()).unwrap();
    let config = Config::load(file.path()).unwrap();
    assert_eq!(config.database.path, PathBuf::from("/tmp/analytics.db"));
    assert_eq!(config.feed.endpoint, "http://feed.internal:5000/generate-data");
    assert_eq!(config.feed.timeout_seconds, 5);
    assert_eq!(config.baseline.window_hours, 12);
    assert_eq!(config.baseline.band_multiplier, 2.0);
    assert_eq!(config.baseline.order, OrderPolicy::Chronological);
    assert_eq!(config.logging.file, Some(PathBuf::from("status.log")));
}

#[test]
fn test_partial_toml_falls_back_to_defaults() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(b"[feed]\nendpoint = \"http://localhost:9000/data\"\n").unwrap();
    let config = Config::load(file.path()).unwrap();
    assert_eq!(config.feed.endpoint, "http://localhost:9000/data");
    assert_eq!(config.feed.timeout_seconds, 30);
    assert_eq!(config.baseline.window_hours, 24);
    assert_eq!(config.baseline.band_multiplier, 1.5);
}

#[test]
fn test_load_rejects_zero_window() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(b"[baseline]\nwindow_hours = 0\n").unwrap();
    assert!(Config::load(file.path()).is_err());
}

#[test]
fn test_validate_rejects_bad_band_and_endpoint() {
    let mut config = Config::default();
    config.baseline.band_multiplier = -1.0;
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.baseline.band_multiplier = f64::NAN;
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.feed.endpoint = "  ".to_string();
    assert!(config.validate().is_err());
}

#[test]
fn test_save_config() {
    let mut config = Config::default();
    config.baseline.order = OrderPolicy::Chronological;
    config.baseline.window_hours = 48;
    let file = NamedTempFile::new().unwrap();
    config.save(file.path()).unwrap();
    let loaded = Config::load(file.path()).unwrap();
    assert_eq!(loaded.baseline.order, OrderPolicy::Chronological);
    assert_eq!(loaded.baseline.window_hours, 48);
    assert_eq!(loaded.database.path, config.database.path);
}
