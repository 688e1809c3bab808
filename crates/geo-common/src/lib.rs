//! Common types shared across the comfort-stats workspace.

pub mod bbox;
pub mod crs;
pub mod error;
pub mod product;
pub mod region;
pub mod stats;
pub mod style;
pub mod time;

pub use bbox::BoundingBox;
pub use crs::CrsCode;
pub use error::{GeoError, GeoResult};
pub use product::ProductDescriptor;
pub use region::RegionOfInterest;
pub use stats::{StatKind, StatisticsResult};
pub use style::{Color, Palette, PaletteStop};
pub use time::{TimeWindow, TimeWindowSpec};
