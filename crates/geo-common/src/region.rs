//! Named region of interest shared by every product in a run.

use serde::{Deserialize, Serialize};

use crate::{BoundingBox, CrsCode, GeoError, GeoResult};

/// An axis-aligned rectangular region in a named CRS.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionOfInterest {
    /// Human readable name, written into the summary table
    pub name: String,
    pub bbox: BoundingBox,
    #[serde(default)]
    pub crs: CrsCode,
}

impl RegionOfInterest {
    /// Build a validated region.
    pub fn new(name: impl Into<String>, bbox: BoundingBox, crs: CrsCode) -> GeoResult<Self> {
        let region = Self {
            name: name.into(),
            bbox,
            crs,
        };
        region.validate()?;
        Ok(region)
    }

    /// Region in WGS84 from corner coordinates.
    pub fn wgs84(
        name: impl Into<String>,
        min_lon: f64,
        min_lat: f64,
        max_lon: f64,
        max_lat: f64,
    ) -> GeoResult<Self> {
        Self::new(
            name,
            BoundingBox::new(min_lon, min_lat, max_lon, max_lat),
            CrsCode::Epsg4326,
        )
    }

    pub fn validate(&self) -> GeoResult<()> {
        if self.name.trim().is_empty() {
            return Err(GeoError::InvalidRegion("region name is empty".to_string()));
        }
        if !self.bbox.is_valid() {
            return Err(GeoError::InvalidRegion(format!(
                "{}: bbox {:?} must have min < max on both axes",
                self.name, self.bbox
            )));
        }
        if !self.crs.valid_bounds().contains(&self.bbox) {
            return Err(GeoError::InvalidRegion(format!(
                "{}: bbox {:?} lies outside the valid bounds of {}",
                self.name, self.bbox, self.crs
            )));
        }
        Ok(())
    }

    /// File-name friendly form of the region name ("Kochi, India" -> "Kochi_India").
    pub fn slug(&self) -> String {
        let mut slug = String::with_capacity(self.name.len());
        let mut pending_sep = false;
        for c in self.name.chars() {
            if c.is_ascii_alphanumeric() {
                if pending_sep && !slug.is_empty() {
                    slug.push('_');
                }
                pending_sep = false;
                slug.push(c);
            } else {
                pending_sep = true;
            }
        }
        slug
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wgs84_region() {
        let region = RegionOfInterest::wgs84("Kochi", 76.20, 9.85, 76.40, 10.10).unwrap();
        assert_eq!(region.crs, CrsCode::Epsg4326);
        assert!((region.bbox.width() - 0.2).abs() < 1e-9);
    }

    #[test]
    fn test_invalid_regions() {
        assert!(RegionOfInterest::wgs84("", 0.0, 0.0, 1.0, 1.0).is_err());
        assert!(RegionOfInterest::wgs84("flipped", 1.0, 0.0, 0.0, 1.0).is_err());
        assert!(RegionOfInterest::wgs84("outside", 170.0, 0.0, 190.0, 1.0).is_err());
    }

    #[test]
    fn test_slug() {
        let region = RegionOfInterest::wgs84("Kochi, India", 76.2, 9.85, 76.4, 10.1).unwrap();
        assert_eq!(region.slug(), "Kochi_India");

        let region = RegionOfInterest::wgs84("  west--coast ", 76.2, 9.85, 76.4, 10.1).unwrap();
        assert_eq!(region.slug(), "west_coast");
    }
}
