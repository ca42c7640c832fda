use std::io::Write;

use voxview_core::config::ViewerConfig;
use voxview_core::register::{Metric, Optimizer};
use voxview_core::types::DisplaySize;

#[test]
fn test_empty_toml_gives_defaults() {
    let config = ViewerConfig::from_toml("").unwrap();
    assert_eq!(config, ViewerConfig::default());
    assert_eq!(config.max_display_size, Some(DisplaySize::new(400, 400)));
    assert_eq!(config.segmentation.marker_radius, 10);
    assert_eq!(config.histogram.bins, 256);
    assert_eq!(config.headers.truncate_threshold, 200);
    assert_eq!(config.headers.truncate_length, 400);
    assert_eq!(config.fusion.alpha, 0.5);
}

#[test]
fn test_partial_override() {
    let text = r#"
max_display_size = { width = 512, height = 300 }

[segmentation]
marker_radius = 3

[registration]
optimizer = "PhaseCorrelation"
metric = "NormalizedCorrelation"
iterations = 20
"#;
    let config = ViewerConfig::from_toml(text).unwrap();
    assert_eq!(config.max_display_size, Some(DisplaySize::new(512, 300)));
    assert_eq!(config.segmentation.marker_radius, 3);
    assert_eq!(config.registration.optimizer, Optimizer::PhaseCorrelation);
    assert_eq!(config.registration.metric, Metric::NormalizedCorrelation);
    assert_eq!(config.registration.iterations, 20);
    // Untouched keys keep their defaults.
    assert_eq!(config.registration.learning_rate, 1.0);
    assert_eq!(config.histogram.width, 400);
}

#[test]
fn test_unknown_enum_value_is_an_error() {
    let text = "[registration]\noptimizer = \"Simplex\"\n";
    assert!(ViewerConfig::from_toml(text).is_err());
}

#[test]
fn test_load_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[fusion]\nalpha = 0.25").unwrap();
    let config = ViewerConfig::load(file.path()).unwrap();
    assert_eq!(config.fusion.alpha, 0.25);
}

#[test]
fn test_default_serializes_back_to_toml() {
    let text = toml::to_string(&ViewerConfig::default()).unwrap();
    let parsed = ViewerConfig::from_toml(&text).unwrap();
    assert_eq!(parsed, ViewerConfig::default());
}

#[test]
fn test_config_round_trips_through_json() {
    let mut config = ViewerConfig::default();
    config.histogram.grab_threshold = 4.0;
    let json = serde_json::to_string(&config).unwrap();
    let back: ViewerConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(back, config);
}
