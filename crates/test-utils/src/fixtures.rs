//! Common test fixtures for comfort-stats tests.
//!
//! Regions, windows and product descriptors mirroring the default Kochi run.

use chrono::NaiveDate;
use geo_common::{
    BoundingBox, CrsCode, Palette, PaletteStop, ProductDescriptor, RegionOfInterest, StatKind,
    TimeWindow,
};
use raster::RasterGrid;

/// Common bounding box definitions for testing.
pub mod bbox {
    /// Kochi, India
    pub const KOCHI: (f64, f64, f64, f64) = (76.20, 9.85, 76.40, 10.10);

    /// Arabian Sea, west of Kochi; no overlap with `KOCHI`
    pub const OFFSHORE: (f64, f64, f64, f64) = (74.00, 9.00, 74.50, 9.50);

    /// Invalid bbox (min > max)
    pub const INVALID: (f64, f64, f64, f64) = (10.0, 10.0, 5.0, 5.0);
}

/// Degrees per pixel used for 1 km test grids.
pub const DEG_PER_KM: f64 = 0.01;

/// The Kochi region.
pub fn kochi() -> RegionOfInterest {
    let (a, b, c, d) = bbox::KOCHI;
    region("Kochi, India", a, b, c, d)
}

/// A region off the coast, disjoint from Kochi.
pub fn offshore() -> RegionOfInterest {
    let (a, b, c, d) = bbox::OFFSHORE;
    region("Offshore", a, b, c, d)
}

/// Build a WGS84 region, panicking on invalid input.
pub fn region(name: &str, min_lon: f64, min_lat: f64, max_lon: f64, max_lat: f64) -> RegionOfInterest {
    RegionOfInterest::wgs84(name, min_lon, min_lat, max_lon, max_lat)
        .unwrap_or_else(|e| panic!("invalid test region {}: {}", name, e))
}

/// March 2024, both ends inclusive.
pub fn march_2024() -> TimeWindow {
    TimeWindow::new(date(2024, 3, 1), date(2024, 3, 31)).expect("valid window")
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

/// Grid exactly covering `bbox` with square cells of `cell_deg` degrees.
pub fn grid_over(bbox: &BoundingBox, cell_deg: f64, resolution_m: f64) -> RasterGrid {
    let width = (bbox.width() / cell_deg).round().max(1.0) as usize;
    let height = (bbox.height() / cell_deg).round().max(1.0) as usize;
    RasterGrid::new(width, height, *bbox, CrsCode::Epsg4326, resolution_m).expect("valid grid")
}

/// 1 km grid over a region.
pub fn km_grid(region: &RegionOfInterest) -> RasterGrid {
    grid_over(&region.bbox, DEG_PER_KM, 1000.0)
}

/// 250 m grid over a region (four cells per 1 km cell).
pub fn quarter_km_grid(region: &RegionOfInterest) -> RasterGrid {
    grid_over(&region.bbox, DEG_PER_KM / 4.0, 250.0)
}

/// Land surface temperature: Kelvin * 50 in the catalog, Celsius out.
pub fn lst_descriptor() -> ProductDescriptor {
    ProductDescriptor {
        id: "lst".to_string(),
        name: "Land Surface Temperature".to_string(),
        catalog_id: "MODIS/061/MOD11A1".to_string(),
        band: "LST_Day_1km".to_string(),
        scale_factor: 0.02,
        offset: -273.15,
        native_resolution_m: 1000.0,
        units: Some("°C".to_string()),
        palette: Palette::new(vec![
            PaletteStop::new(20.0, "#313695"),
            PaletteStop::new(25.0, "#74add1"),
            PaletteStop::new(30.0, "#fee090"),
            PaletteStop::new(35.0, "#f46d43"),
            PaletteStop::new(40.0, "#a50026"),
        ]),
        statistics: vec![StatKind::Mean],
    }
}

/// Vegetation index at 250 m.
pub fn ndvi_descriptor() -> ProductDescriptor {
    ProductDescriptor {
        id: "ndvi".to_string(),
        name: "NDVI".to_string(),
        catalog_id: "MODIS/061/MOD13Q1".to_string(),
        band: "NDVI".to_string(),
        scale_factor: 0.0001,
        offset: 0.0,
        native_resolution_m: 250.0,
        units: None,
        palette: Palette::new(vec![
            PaletteStop::new(0.0, "#d73027"),
            PaletteStop::new(0.2, "#fc8d59"),
            PaletteStop::new(0.4, "#fee08b"),
            PaletteStop::new(0.6, "#91cf60"),
            PaletteStop::new(0.8, "#1a9850"),
        ]),
        statistics: vec![StatKind::Mean],
    }
}

/// Aerosol optical depth with mean, min and max.
pub fn aod_descriptor() -> ProductDescriptor {
    ProductDescriptor {
        id: "aod".to_string(),
        name: "Aerosol Optical Depth".to_string(),
        catalog_id: "MODIS/061/MCD19A2_GRANULES".to_string(),
        band: "Optical_Depth_047".to_string(),
        scale_factor: 0.001,
        offset: 0.0,
        native_resolution_m: 1000.0,
        units: None,
        palette: Palette::new(vec![
            PaletteStop::new(0.0, "#ffffb2"),
            PaletteStop::new(0.25, "#fecc5c"),
            PaletteStop::new(0.5, "#fd8d3c"),
            PaletteStop::new(0.75, "#f03b20"),
            PaletteStop::new(1.0, "#bd0026"),
        ]),
        statistics: vec![StatKind::Mean, StatKind::Min, StatKind::Max],
    }
}

/// All three descriptors in run order.
pub fn all_descriptors() -> Vec<ProductDescriptor> {
    vec![lst_descriptor(), ndvi_descriptor(), aod_descriptor()]
}
