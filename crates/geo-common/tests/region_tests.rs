//! Tests for regions, windows and descriptor validation working together.

use chrono::NaiveDate;
use geo_common::{
    BoundingBox, CrsCode, GeoError, Palette, PaletteStop, ProductDescriptor, RegionOfInterest,
    StatKind, TimeWindow, TimeWindowSpec,
};

// ============================================================================
// Region tests
// ============================================================================

#[test]
fn test_region_serde_defaults_to_wgs84() {
    let json = r#"{"name":"Kochi","bbox":{"min_x":76.2,"min_y":9.85,"max_x":76.4,"max_y":10.1}}"#;
    let region: RegionOfInterest = serde_json::from_str(json).unwrap();
    assert_eq!(region.crs, CrsCode::Epsg4326);
    assert!(region.validate().is_ok());
}

#[test]
fn test_region_in_web_mercator() {
    let region = RegionOfInterest::new(
        "tile",
        BoundingBox::new(8_480_000.0, 1_100_000.0, 8_500_000.0, 1_130_000.0),
        CrsCode::Epsg3857,
    )
    .unwrap();
    assert!(!region.crs.is_geographic());
}

#[test]
fn test_region_errors_are_configuration_errors() {
    let err = RegionOfInterest::wgs84("bad", 10.0, 10.0, 5.0, 5.0).unwrap_err();
    assert!(matches!(err, GeoError::InvalidRegion(_)));
}

// ============================================================================
// Window tests
// ============================================================================

#[test]
fn test_literal_window_ignores_run_date() {
    let spec = TimeWindowSpec::Literal {
        start: NaiveDate::from_ymd_opt(2024, 4, 1).unwrap(),
        end: NaiveDate::from_ymd_opt(2024, 4, 30).unwrap(),
    };
    let a = spec.resolve(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()).unwrap();
    let b = spec.resolve(NaiveDate::from_ymd_opt(2026, 6, 1).unwrap()).unwrap();
    assert_eq!(a, b);
    assert_eq!(a.date_from(), "2024-04-01");
    assert_eq!(a.date_to(), "2024-04-30");
    assert_eq!(a.to_string(), "2024-04-01/2024-04-30");
}

#[test]
fn test_reversed_literal_window_is_rejected() {
    let spec = TimeWindowSpec::Literal {
        start: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
        end: NaiveDate::from_ymd_opt(2024, 4, 1).unwrap(),
    };
    assert!(spec.resolve(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()).is_err());
}

#[test]
fn test_window_serializes_as_iso_dates() {
    let window = TimeWindow::parse("2024-01-01/2024-01-31").unwrap();
    let json = serde_json::to_string(&window).unwrap();
    assert_eq!(json, r#"{"start":"2024-01-01","end":"2024-01-31"}"#);
}

// ============================================================================
// Descriptor tests
// ============================================================================

#[test]
fn test_aerosol_descriptor_from_json() {
    let json = r##"{
        "id": "aod",
        "name": "Aerosol Optical Depth (470 nm)",
        "catalog_id": "MODIS/061/MCD19A2_GRANULES",
        "band": "Optical_Depth_047",
        "scale_factor": 0.001,
        "native_resolution_m": 1000,
        "statistics": ["mean", "min", "max"],
        "palette": [
            {"value": 0.0, "color": "#ffffb2", "label": "clean"},
            {"value": 0.5, "color": "#fd8d3c"},
            {"value": 1.0, "color": "#bd0026", "label": "hazy"}
        ]
    }"##;

    let d: ProductDescriptor = serde_json::from_str(json).unwrap();
    d.validate().unwrap();
    assert_eq!(
        d.stat_kinds(),
        vec![StatKind::Mean, StatKind::Min, StatKind::Max]
    );
    assert_eq!(d.palette.len(), 3);
}

#[test]
fn test_descriptor_with_single_stop_palette_is_invalid() {
    let d = ProductDescriptor {
        id: "x".to_string(),
        name: String::new(),
        catalog_id: "C".to_string(),
        band: "B".to_string(),
        scale_factor: 1.0,
        offset: 0.0,
        native_resolution_m: 30.0,
        units: None,
        palette: Palette::new(vec![PaletteStop::new(0.0, "red")]),
        statistics: vec![StatKind::Mean],
    };
    assert!(matches!(
        d.validate(),
        Err(GeoError::InvalidDescriptor { .. })
    ));
}
