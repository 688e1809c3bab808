//! The shipped configuration matches the built-in default run.

use std::path::PathBuf;

use pipeline::RunConfig;

fn shipped_config() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../config/kochi.yaml")
}

#[test]
fn test_kochi_yaml_matches_default() {
    std::env::remove_var("COMFORT_DATA_DIR");
    std::env::remove_var("COMFORT_EXPORT_DIR");

    let config = RunConfig::from_file(shipped_config()).unwrap();
    config.validate().unwrap();

    let default = RunConfig::default_kochi();
    assert_eq!(config.region, default.region);
    assert_eq!(config.time, default.time);
    assert_eq!(config.catalog_dir, default.catalog_dir);
    assert_eq!(config.products, default.products);
    assert_eq!(config.export.destination, default.export.destination);
    assert_eq!(config.export.raster_prefix, default.export.raster_prefix);
    assert_eq!(config.comfort.unwrap().weights, default.comfort.unwrap().weights);
}

#[test]
fn test_missing_file() {
    assert!(RunConfig::from_file("/nonexistent/run.yaml").is_err());
}
