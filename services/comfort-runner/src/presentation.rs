//! Map layer and legend files for a finished run.
//!
//! Per product:
//! - `<id>_legend.json`: legend entries (empty when the product had no imagery)
//! - `<id>_legend.png`: color ramp across the display domain
//! - `<id>_layer.png`: colorized sample, only for succeeded products

use std::path::{Path, PathBuf};

use anyhow::Result;
use pipeline::{ProductReport, RunReport};
use renderer::render_legend_strip;
use tracing::{debug, info};

const STRIP_WIDTH: usize = 256;
const STRIP_HEIGHT: usize = 16;

/// Write presentation files for every product of `report` into `dir`.
pub async fn write_all(dir: &Path, report: &RunReport) -> Result<Vec<PathBuf>> {
    tokio::fs::create_dir_all(dir).await?;

    let mut written = Vec::new();
    for product in report.products.iter().chain(report.comfort.iter()) {
        written.extend(write_product(dir, product).await?);
    }

    info!(dir = ?dir, files = written.len(), "Wrote map layers and legends");
    Ok(written)
}

async fn write_product(dir: &Path, product: &ProductReport) -> Result<Vec<PathBuf>> {
    let id = product.id();
    let mut written = Vec::new();

    let legend_path = dir.join(format!("{}_legend.json", id));
    tokio::fs::write(&legend_path, product.legend.to_json()?).await?;
    written.push(legend_path);

    if !product.legend.is_empty() {
        let strip = render_legend_strip(&product.descriptor, STRIP_WIDTH, STRIP_HEIGHT)?;
        let strip_path = dir.join(format!("{}_legend.png", id));
        tokio::fs::write(&strip_path, strip).await?;
        written.push(strip_path);
    }

    if let Some(layer) = &product.layer {
        let layer_path = dir.join(format!("{}_layer.png", id));
        tokio::fs::write(&layer_path, layer.to_png()?).await?;
        written.push(layer_path);
    }

    debug!(product = %id, state = product.outcome.state(), files = written.len(), "Wrote presentation files");
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use geo_common::TimeWindowSpec;
    use pipeline::{Pipeline, RunConfig};
    use test_utils::{constant_raster, date, km_grid, kochi, lst_descriptor, RecordingQueue, StaticFetcher};

    #[tokio::test]
    async fn test_files_per_product_state() {
        let lst = lst_descriptor();
        let fetcher = StaticFetcher::new().with_raster(
            &lst.catalog_id,
            &lst.band,
            constant_raster(&km_grid(&kochi()), 15000.0),
        );
        let mut config = RunConfig::default_kochi();
        config.time = TimeWindowSpec::Literal {
            start: date(2024, 3, 1),
            end: date(2024, 3, 31),
        };

        let report = Pipeline::new(
            config,
            date(2024, 4, 1),
            Arc::new(fetcher),
            Arc::new(RecordingQueue::new()),
        )
        .unwrap()
        .run()
        .await
        .unwrap();

        let dir = tempfile::tempdir().unwrap();
        write_all(dir.path(), &report).await.unwrap();

        let exists = |name: &str| dir.path().join(name).exists();
        assert!(exists("lst_legend.json"));
        assert!(exists("lst_legend.png"));
        assert!(exists("lst_layer.png"));

        // No imagery: empty legend, no images
        assert!(exists("ndvi_legend.json"));
        assert!(!exists("ndvi_legend.png"));
        assert!(!exists("ndvi_layer.png"));
        assert!(exists("comfort_legend.json"));
        assert!(!exists("comfort_layer.png"));
    }
}
