//! Single-band float GeoTIFF reading and writing.
//!
//! Georeferencing uses ModelPixelScale + ModelTiepoint for a north-up grid,
//! a minimal GeoKey directory for the EPSG code and the GDAL_NODATA ASCII tag
//! for the no-data value.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Seek, Write};
use std::path::Path;

use geo_common::{BoundingBox, CrsCode};
use tiff::decoder::{Decoder, DecodingResult};
use tiff::encoder::{colortype, TiffEncoder};
use tiff::tags::Tag;

use crate::error::{RasterError, Result};
use crate::types::{RasterGrid, RawRaster};

/// GeoKey ids used in the key directory.
const GT_MODEL_TYPE: u16 = 1024;
const GT_RASTER_TYPE: u16 = 1025;
const GEOGRAPHIC_TYPE: u16 = 2048;
const PROJECTED_CS_TYPE: u16 = 3072;

const MODEL_TYPE_PROJECTED: u16 = 1;
const MODEL_TYPE_GEOGRAPHIC: u16 = 2;
const RASTER_PIXEL_IS_AREA: u16 = 1;

/// A decoded single-band GeoTIFF.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoTiffImage {
    pub width: usize,
    pub height: usize,
    pub bbox: BoundingBox,
    pub crs: CrsCode,
    pub data: Vec<f32>,
    pub nodata: Option<f32>,
}

impl GeoTiffImage {
    /// Turn into a raw raster labelled with a nominal resolution.
    pub fn into_raw(self, resolution_m: f64) -> Result<RawRaster> {
        let grid = RasterGrid::new(self.width, self.height, self.bbox, self.crs, resolution_m)?;
        RawRaster::new(grid, self.data, self.nodata)
    }
}

/// Read a GeoTIFF from disk.
pub fn read_geotiff(path: &Path) -> Result<GeoTiffImage> {
    let file = File::open(path)?;
    decode_geotiff(BufReader::new(file))
}

/// Decode a GeoTIFF from any seekable reader.
pub fn decode_geotiff<R: Read + Seek>(reader: R) -> Result<GeoTiffImage> {
    let mut decoder = Decoder::new(reader)?;
    let (width, height) = decoder.dimensions()?;
    let (width, height) = (width as usize, height as usize);

    let scale = decoder
        .get_tag_f64_vec(Tag::ModelPixelScaleTag)
        .map_err(|_| RasterError::decode("missing ModelPixelScaleTag"))?;
    let tiepoint = decoder
        .get_tag_f64_vec(Tag::ModelTiepointTag)
        .map_err(|_| RasterError::decode("missing ModelTiepointTag"))?;
    if scale.len() < 2 || tiepoint.len() < 6 {
        return Err(RasterError::decode(format!(
            "short georeferencing tags: {} scale values, {} tiepoint values",
            scale.len(),
            tiepoint.len()
        )));
    }

    let (sx, sy) = (scale[0], scale[1]);
    let origin_x = tiepoint[3] - tiepoint[0] * sx;
    let origin_y = tiepoint[4] + tiepoint[1] * sy;
    let bbox = BoundingBox::new(
        origin_x,
        origin_y - height as f64 * sy,
        origin_x + width as f64 * sx,
        origin_y,
    );

    let crs = match decoder.find_tag(Tag::GeoKeyDirectoryTag)? {
        Some(value) => crs_from_geo_keys(&value.into_u16_vec()?)?,
        None => CrsCode::Epsg4326,
    };

    let nodata = match decoder.find_tag(Tag::GdalNodata)? {
        Some(value) => {
            let text = value.into_string()?;
            let text = text.trim_matches(|c: char| c == '\0' || c.is_whitespace());
            Some(text.parse::<f32>().map_err(|_| {
                RasterError::decode(format!("unparseable GDAL_NODATA value '{}'", text))
            })?)
        }
        None => None,
    };

    let data: Vec<f32> = match decoder.read_image()? {
        DecodingResult::F32(v) => v,
        DecodingResult::F64(v) => v.into_iter().map(|x| x as f32).collect(),
        DecodingResult::U8(v) => v.into_iter().map(f32::from).collect(),
        DecodingResult::U16(v) => v.into_iter().map(f32::from).collect(),
        DecodingResult::I8(v) => v.into_iter().map(f32::from).collect(),
        DecodingResult::I16(v) => v.into_iter().map(f32::from).collect(),
        DecodingResult::U32(v) => v.into_iter().map(|x| x as f32).collect(),
        DecodingResult::I32(v) => v.into_iter().map(|x| x as f32).collect(),
        _ => return Err(RasterError::decode("unsupported sample format")),
    };

    if data.len() != width * height {
        return Err(RasterError::decode(format!(
            "expected a single band of {} pixels, got {} samples",
            width * height,
            data.len()
        )));
    }

    Ok(GeoTiffImage {
        width,
        height,
        bbox,
        crs,
        data,
        nodata,
    })
}

/// Write a single-band float GeoTIFF to disk.
pub fn write_geotiff(path: &Path, grid: &RasterGrid, data: &[f32], nodata: f32) -> Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    encode_geotiff(&mut writer, grid, data, nodata)?;
    writer.flush()?;
    Ok(())
}

/// Encode a single-band float GeoTIFF into any seekable writer.
pub fn encode_geotiff<W: Write + Seek>(
    writer: W,
    grid: &RasterGrid,
    data: &[f32],
    nodata: f32,
) -> Result<()> {
    if data.len() != grid.len() {
        return Err(RasterError::geometry(format!(
            "expected {} pixels, got {}",
            grid.len(),
            data.len()
        )));
    }

    let (dx, dy) = grid.cell_size();
    let tiepoint = [0.0, 0.0, 0.0, grid.bbox.min_x, grid.bbox.max_y, 0.0];
    let keys = geo_keys(grid.crs);
    let nodata_text = nodata.to_string();

    let mut encoder = TiffEncoder::new(writer)?;
    let mut image =
        encoder.new_image::<colortype::Gray32Float>(grid.width as u32, grid.height as u32)?;
    image
        .encoder()
        .write_tag(Tag::ModelPixelScaleTag, &[dx, dy, 0.0][..])?;
    image
        .encoder()
        .write_tag(Tag::ModelTiepointTag, &tiepoint[..])?;
    image
        .encoder()
        .write_tag(Tag::GeoKeyDirectoryTag, &keys[..])?;
    image
        .encoder()
        .write_tag(Tag::GdalNodata, nodata_text.as_str())?;
    image.write_data(data)?;

    Ok(())
}

#[rustfmt::skip]
fn geo_keys(crs: CrsCode) -> Vec<u16> {
    let (model_type, crs_key) = if crs.is_geographic() {
        (MODEL_TYPE_GEOGRAPHIC, GEOGRAPHIC_TYPE)
    } else {
        (MODEL_TYPE_PROJECTED, PROJECTED_CS_TYPE)
    };
    // Header: version 1, revision 1.0, 3 keys.
    vec![
        1, 1, 0, 3,
        GT_MODEL_TYPE, 0, 1, model_type,
        GT_RASTER_TYPE, 0, 1, RASTER_PIXEL_IS_AREA,
        crs_key, 0, 1, crs.epsg(),
    ]
}

fn crs_from_geo_keys(keys: &[u16]) -> Result<CrsCode> {
    if keys.len() < 4 {
        return Err(RasterError::decode("truncated GeoKey directory"));
    }
    let count = keys[3] as usize;
    for entry in keys[4..].chunks_exact(4).take(count) {
        let (key, location, value) = (entry[0], entry[1], entry[3]);
        if (key == GEOGRAPHIC_TYPE || key == PROJECTED_CS_TYPE) && location == 0 {
            return CrsCode::from_epsg(value)
                .ok_or_else(|| RasterError::decode(format!("unsupported EPSG code {}", value)));
        }
    }
    Ok(CrsCode::Epsg4326)
}
