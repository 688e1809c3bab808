//! Run configuration.
//!
//! A run is described by one YAML document:
//!
//! ```yaml
//! region:
//!   name: Kochi, India
//!   min_lon: 76.20
//!   min_lat: 9.85
//!   max_lon: 76.40
//!   max_lat: 10.10
//! time:
//!   last_days: 30
//! catalog_dir: ${COMFORT_DATA_DIR:-data/catalog}
//! products: [...]
//! export:
//!   destination: { type: local, dir: output }
//! comfort:
//!   weights: { lst: 0.5, ndvi: 0.3, aod: 0.2 }
//! ```
//!
//! `${VAR}` and `${VAR:-default}` are substituted before parsing. The
//! `COMFORT_CATALOG_DIR`, `COMFORT_OUTPUT_DIR` and `COMFORT_LAST_DAYS`
//! environment variables override the loaded values.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use export::Destination;
use geo_common::{
    BoundingBox, CrsCode, GeoError, Palette, PaletteStop, ProductDescriptor, RegionOfInterest,
    StatKind, TimeWindow, TimeWindowSpec,
};
use raster::downsample::integer_factor;
use raster::{ComfortWeights, Resolution, COMFORT_PRODUCT};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{PipelineError, Result};

pub const ENV_CATALOG_DIR: &str = "COMFORT_CATALOG_DIR";
pub const ENV_OUTPUT_DIR: &str = "COMFORT_OUTPUT_DIR";
pub const ENV_LAST_DAYS: &str = "COMFORT_LAST_DAYS";

/// Everything one run needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    pub region: RegionConfig,
    pub time: TimeWindowSpec,

    /// Root of the GeoTIFF catalog.
    #[serde(default = "default_catalog_dir")]
    pub catalog_dir: PathBuf,

    /// Reduce every product at this scale (meters) instead of its native
    /// resolution. Must be a whole multiple of each native resolution.
    #[serde(default)]
    pub statistics_scale_m: Option<f64>,

    pub products: Vec<ProductDescriptor>,

    #[serde(default)]
    pub export: ExportConfig,

    /// Comfort index over three of the products. Disabled when absent.
    #[serde(default)]
    pub comfort: Option<ComfortConfig>,
}

/// Region corners as written in YAML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionConfig {
    pub name: String,
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
    #[serde(default)]
    pub crs: CrsCode,
}

impl RegionConfig {
    pub fn to_region(&self) -> Result<RegionOfInterest> {
        Ok(RegionOfInterest::new(
            self.name.clone(),
            BoundingBox::new(self.min_lon, self.min_lat, self.max_lon, self.max_lat),
            self.crs,
        )?)
    }
}

/// Where and under which names artifacts are written.
///
/// Prefix templates accept `{product}`, `{PRODUCT}` (upper case),
/// `{region}` (file-name form of the region name) and `{window}` (the
/// configured window, e.g. `last30d`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportConfig {
    #[serde(default = "default_destination")]
    pub destination: Destination,
    #[serde(default = "default_raster_prefix")]
    pub raster_prefix: String,
    #[serde(default = "default_table_prefix")]
    pub table_prefix: String,
    /// Description of the summary table job; the file prefix when unset.
    #[serde(default)]
    pub table_description: Option<String>,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            destination: default_destination(),
            raster_prefix: default_raster_prefix(),
            table_prefix: default_table_prefix(),
            table_description: None,
        }
    }
}

impl ExportConfig {
    pub fn raster_prefix_for(&self, product: &str, region: &RegionOfInterest, window: &str) -> String {
        render_template(&self.raster_prefix, Some(product), region, window)
    }

    pub fn table_prefix_for(&self, region: &RegionOfInterest, window: &str) -> String {
        render_template(&self.table_prefix, None, region, window)
    }
}

fn render_template(
    template: &str,
    product: Option<&str>,
    region: &RegionOfInterest,
    window: &str,
) -> String {
    let product = product.unwrap_or_default();
    template
        .replace("{product}", product)
        .replace("{PRODUCT}", &product.to_uppercase())
        .replace("{region}", &region.slug())
        .replace("{window}", window)
}

/// Comfort index settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComfortConfig {
    #[serde(default)]
    pub weights: ComfortWeights,
    #[serde(default)]
    pub inputs: ComfortInputs,
    #[serde(default = "default_comfort_palette")]
    pub palette: Palette,
}

impl Default for ComfortConfig {
    fn default() -> Self {
        Self {
            weights: ComfortWeights::default(),
            inputs: ComfortInputs::default(),
            palette: default_comfort_palette(),
        }
    }
}

impl ComfortConfig {
    /// Descriptor for the derived comfort raster at `resolution_m`.
    pub fn descriptor(&self, resolution_m: f64) -> ProductDescriptor {
        ProductDescriptor {
            id: COMFORT_PRODUCT.to_string(),
            name: "Comfort Index".to_string(),
            catalog_id: "derived".to_string(),
            band: COMFORT_PRODUCT.to_string(),
            scale_factor: 1.0,
            offset: 0.0,
            native_resolution_m: resolution_m,
            units: None,
            palette: self.palette.clone(),
            statistics: vec![StatKind::Mean],
        }
    }
}

/// Product ids feeding the comfort index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComfortInputs {
    pub lst: String,
    pub ndvi: String,
    pub aod: String,
}

impl Default for ComfortInputs {
    fn default() -> Self {
        Self {
            lst: "lst".to_string(),
            ndvi: "ndvi".to_string(),
            aod: "aod".to_string(),
        }
    }
}

fn default_catalog_dir() -> PathBuf {
    PathBuf::from("data/catalog")
}

fn default_destination() -> Destination {
    Destination::local("output")
}

fn default_raster_prefix() -> String {
    "{PRODUCT}_{region}_{window}".to_string()
}

fn default_table_prefix() -> String {
    "{region}_stats_{window}".to_string()
}

fn default_comfort_palette() -> Palette {
    Palette::new(vec![
        PaletteStop::new(0.0, "#d7191c").with_label("uncomfortable"),
        PaletteStop::new(0.5, "#ffffbf"),
        PaletteStop::new(1.0, "#1a9641").with_label("comfortable"),
    ])
}

impl RunConfig {
    /// Parse YAML after environment substitution. Not validated.
    pub fn from_yaml(content: &str) -> Result<Self> {
        let expanded = expand_env_vars(content)?;
        Ok(serde_yaml::from_str(&expanded)?)
    }

    /// Load a YAML file. Not validated.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            PipelineError::config(format!("failed to read config from {:?}: {}", path, e))
        })?;
        let config = Self::from_yaml(&content)?;
        debug!(path = ?path, products = config.products.len(), "Loaded run configuration");
        Ok(config)
    }

    /// Built-in Kochi configuration with environment overrides applied.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default_kochi();
        config.apply_env_overrides()?;
        Ok(config)
    }

    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply `COMFORT_*` overrides read through `lookup`. Empty values are
    /// ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(dir) = get(ENV_CATALOG_DIR) {
            self.catalog_dir = PathBuf::from(dir);
        }
        if let Some(dir) = get(ENV_OUTPUT_DIR) {
            self.export.destination = Destination::local(dir);
        }
        if let Some(days) = get(ENV_LAST_DAYS) {
            let last_days = days.trim().parse::<u32>().map_err(|e| {
                PipelineError::config(format!("{}={:?} is not a day count: {}", ENV_LAST_DAYS, days, e))
            })?;
            self.time = TimeWindowSpec::Rolling { last_days };
        }
        Ok(())
    }

    /// Check the whole configuration. Every fault found here is fatal and
    /// must be reported before anything is fetched.
    pub fn validate(&self) -> Result<()> {
        self.region.to_region()?;

        match &self.time {
            TimeWindowSpec::Literal { start, end } => {
                TimeWindow::new(*start, *end).map_err(GeoError::from)?;
            }
            TimeWindowSpec::Rolling { last_days: 0 } => {
                return Err(GeoError::InvalidTime(
                    "rolling window must cover at least one day".to_string(),
                )
                .into());
            }
            TimeWindowSpec::Rolling { .. } => {}
        }

        if self.products.is_empty() {
            return Err(PipelineError::config("no products configured"));
        }

        let mut seen = HashSet::new();
        for descriptor in &self.products {
            descriptor.validate()?;
            if !seen.insert(descriptor.id.as_str()) {
                return Err(GeoError::invalid_descriptor(
                    &descriptor.id,
                    "product id is used more than once",
                )
                .into());
            }
            if let Some(scale) = self.statistics_scale_m {
                integer_factor(descriptor.native_resolution_m, scale)?;
            }
        }

        if let Some(comfort) = &self.comfort {
            comfort.weights.validate()?;
            if seen.contains(COMFORT_PRODUCT) {
                return Err(GeoError::invalid_descriptor(
                    COMFORT_PRODUCT,
                    "product id is reserved for the comfort index",
                )
                .into());
            }
            for input in [&comfort.inputs.lst, &comfort.inputs.ndvi, &comfort.inputs.aod] {
                if !seen.contains(input.as_str()) {
                    return Err(PipelineError::config(format!(
                        "comfort input '{}' is not a configured product",
                        input
                    )));
                }
            }
            comfort.descriptor(1.0).validate()?;
        }

        if self.export.raster_prefix.trim().is_empty() || self.export.table_prefix.trim().is_empty() {
            return Err(PipelineError::config("export file prefixes must not be empty"));
        }

        Ok(())
    }

    pub fn to_region(&self) -> Result<RegionOfInterest> {
        self.region.to_region()
    }

    /// Resolve the time window against the run date.
    pub fn window(&self, today: NaiveDate) -> Result<TimeWindow> {
        Ok(self.time.resolve(today).map_err(GeoError::from)?)
    }

    /// Reduction scale for statistics.
    pub fn resolution(&self) -> Resolution {
        self.statistics_scale_m
            .map(Resolution::Override)
            .unwrap_or_default()
    }

    /// Kochi, India over the last 30 days with LST, NDVI and AOD.
    pub fn default_kochi() -> Self {
        Self {
            region: RegionConfig {
                name: "Kochi, India".to_string(),
                min_lon: 76.20,
                min_lat: 9.85,
                max_lon: 76.40,
                max_lat: 10.10,
                crs: CrsCode::Epsg4326,
            },
            time: TimeWindowSpec::Rolling { last_days: 30 },
            catalog_dir: default_catalog_dir(),
            statistics_scale_m: None,
            products: default_products(),
            export: ExportConfig::default(),
            comfort: Some(ComfortConfig::default()),
        }
    }
}

fn expand_env_vars(content: &str) -> Result<String> {
    shellexpand::env(content)
        .map(|expanded| expanded.into_owned())
        .map_err(|e| PipelineError::config(format!("environment substitution failed: {}", e)))
}

fn default_products() -> Vec<ProductDescriptor> {
    vec![
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
        },
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
        },
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
        },
    ]
}

// ============================================================================
// Tests
// ============================================================================
