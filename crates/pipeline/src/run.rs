//! Run orchestration.
//!
//! ```text
//! RunConfig::validate            (fatal faults stop here, before any fetch)
//!      │
//!      ▼
//! per product, concurrently:
//!   fetch ─► convert ─► aggregate ─► legend + layer
//!      │
//!      ▼
//! comfort index (optional, needs its three inputs)
//!      │
//!      ▼
//! raster jobs for succeeded products, one summary table job
//! ```

use std::sync::Arc;

use chrono::NaiveDate;
use export::{
    build_raster_export, build_table_export, ExportJob, ExportParameters, JobHandle, JobQueue,
    ProductStatistics, TableRow,
};
use futures::stream::{self, StreamExt};
use geo_common::{ProductDescriptor, RegionOfInterest, TimeWindow};
use raster::{
    aggregate, comfort_index, convert, coverage, FetchRequest, RasterFetcher, RasterSample,
    RawRaster,
};
use renderer::{build_legend, MapLayer};
use tracing::{debug, error, info, instrument, warn};

use crate::config::{ComfortConfig, RunConfig};
use crate::error::Result;
use crate::outcome::{ProductOutcome, ProductReport};

/// A job handed to the queue, or the reason it was not.
#[derive(Debug, Clone)]
pub struct SubmittedJob {
    pub parameters: ExportParameters,
    pub handle: std::result::Result<JobHandle, String>,
}

/// Result of one run.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub region: RegionOfInterest,
    pub window: TimeWindow,
    /// One report per configured product, in configuration order.
    pub products: Vec<ProductReport>,
    pub comfort: Option<ProductReport>,
    /// The summary row submitted for export.
    pub table: TableRow,
    pub jobs: Vec<SubmittedJob>,
}

impl RunReport {
    pub fn product(&self, id: &str) -> Option<&ProductReport> {
        self.products
            .iter()
            .chain(self.comfort.iter())
            .find(|report| report.id() == id)
    }

    pub fn succeeded(&self) -> usize {
        self.products
            .iter()
            .filter(|report| report.outcome.is_success())
            .count()
    }

    /// Jobs the queue refused.
    pub fn rejected(&self) -> impl Iterator<Item = &SubmittedJob> {
        self.jobs.iter().filter(|job| job.handle.is_err())
    }
}

/// A validated run, ready to execute.
pub struct Pipeline {
    config: RunConfig,
    region: RegionOfInterest,
    window: TimeWindow,
    fetcher: Arc<dyn RasterFetcher>,
    queue: Arc<dyn JobQueue>,
}

impl Pipeline {
    /// Validate `config` and resolve its window against `today`.
    ///
    /// Nothing is fetched when this fails.
    pub fn new(
        config: RunConfig,
        today: NaiveDate,
        fetcher: Arc<dyn RasterFetcher>,
        queue: Arc<dyn JobQueue>,
    ) -> Result<Self> {
        config.validate()?;
        let region = config.to_region()?;
        let window = config.window(today)?;
        Ok(Self {
            config,
            region,
            window,
            fetcher,
            queue,
        })
    }

    pub fn region(&self) -> &RegionOfInterest {
        &self.region
    }

    pub fn window(&self) -> TimeWindow {
        self.window
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Run every product, then submit exports.
    ///
    /// Per-product failures never fail the run; the summary table job is
    /// always built and submitted.
    #[instrument(skip(self), fields(region = %self.region.name, window = %self.window, fetcher = self.fetcher.name()))]
    pub async fn run(&self) -> Result<RunReport> {
        info!(products = self.config.products.len(), "Starting run");

        let concurrency = self.config.products.len().max(1);
        let products: Vec<ProductReport> = stream::iter(&self.config.products)
            .map(|descriptor| self.run_product(descriptor))
            .buffered(concurrency)
            .collect()
            .await;

        let comfort = self
            .config
            .comfort
            .as_ref()
            .map(|comfort| self.run_comfort(comfort, &products));

        let mut jobs = Vec::new();
        for report in products.iter().chain(comfort.iter()) {
            if let Some(sample) = report.outcome.sample() {
                match self.raster_job(report, Arc::clone(sample)) {
                    Ok(job) => jobs.push(self.submit(job).await),
                    Err(e) => error!(product = %report.id(), error = %e, "Cannot build raster export"),
                }
            }
        }

        let table_job = self.table_job(&products, comfort.as_ref())?;
        let table = table_job.table_row().cloned().unwrap_or_default();
        jobs.push(self.submit(table_job).await);

        let report = RunReport {
            region: self.region.clone(),
            window: self.window,
            products,
            comfort,
            table,
            jobs,
        };
        info!(
            succeeded = report.succeeded(),
            jobs = report.jobs.len(),
            rejected = report.rejected().count(),
            "Run finished"
        );
        Ok(report)
    }

    #[instrument(skip(self, descriptor), fields(product = %descriptor.id))]
    async fn run_product(&self, descriptor: &ProductDescriptor) -> ProductReport {
        let request = FetchRequest::for_product(descriptor, &self.region, self.window);
        debug!(catalog = %request.catalog_id, band = %request.band, "Fetching");

        match self.fetcher.fetch(&request).await {
            Ok(Some(raw)) => match self.reduce(descriptor, raw) {
                Ok(report) => report,
                Err(e) => {
                    warn!(error = %e, "Product failed after fetch");
                    ProductReport::unavailable(
                        descriptor,
                        ProductOutcome::Failed {
                            error: e.to_string(),
                        },
                    )
                }
            },
            Ok(None) => {
                warn!("No imagery for region and window");
                ProductReport::unavailable(descriptor, ProductOutcome::NoImagery)
            }
            Err(e) => {
                warn!(error = %e, "Fetch failed");
                ProductReport::unavailable(
                    descriptor,
                    ProductOutcome::Failed {
                        error: e.to_string(),
                    },
                )
            }
        }
    }

    fn reduce(&self, descriptor: &ProductDescriptor, raw: RawRaster) -> Result<ProductReport> {
        let sample = convert(raw, descriptor)?;
        self.summarize(descriptor, sample)
    }

    /// Statistics, legend and layer of a converted or derived sample.
    fn summarize(
        &self,
        descriptor: &ProductDescriptor,
        sample: RasterSample,
    ) -> Result<ProductReport> {
        let statistics = aggregate(
            &sample,
            &self.region,
            self.config.resolution(),
            &descriptor.stat_kinds(),
        )?;
        let coverage = coverage(&sample, &self.region)?;
        let legend = build_legend(descriptor)?;
        let layer = match MapLayer::render(&sample, descriptor) {
            Ok(layer) => Some(layer),
            Err(e) => {
                warn!(product = %descriptor.id, error = %e, "Cannot render map layer");
                None
            }
        };

        info!(
            product = %descriptor.id,
            valid_pixels = coverage.valid_pixels,
            coverage = coverage.fraction,
            statistics = ?statistics,
            "Product reduced"
        );

        Ok(ProductReport {
            descriptor: descriptor.clone(),
            outcome: ProductOutcome::Succeeded {
                sample: Arc::new(sample),
            },
            statistics,
            coverage: Some(coverage),
            legend,
            layer,
        })
    }

    fn run_comfort(&self, comfort: &ComfortConfig, products: &[ProductReport]) -> ProductReport {
        let input = |id: &str| {
            products
                .iter()
                .find(|report| report.id() == id)
                .and_then(|report| report.outcome.sample())
        };
        let inputs = &comfort.inputs;

        let (lst, ndvi, aod) = match (input(&inputs.lst), input(&inputs.ndvi), input(&inputs.aod)) {
            (Some(lst), Some(ndvi), Some(aod)) => (lst, ndvi, aod),
            _ => {
                let missing: Vec<&str> = [&inputs.lst, &inputs.ndvi, &inputs.aod]
                    .into_iter()
                    .filter(|id| input(id).is_none())
                    .map(String::as_str)
                    .collect();
                warn!(missing = ?missing, "Comfort index skipped");
                return ProductReport::unavailable(
                    &comfort.descriptor(1.0),
                    ProductOutcome::Skipped {
                        reason: format!("inputs unavailable: {}", missing.join(", ")),
                    },
                );
            }
        };

        let result: Result<ProductReport> = comfort_index(lst, ndvi, aod, &comfort.weights)
            .map_err(Into::into)
            .and_then(|sample| {
                let descriptor = comfort.descriptor(sample.resolution_m());
                self.summarize(&descriptor, sample)
            });

        match result {
            Ok(report) => report,
            Err(e) => {
                warn!(error = %e, "Comfort index failed");
                ProductReport::unavailable(
                    &comfort.descriptor(1.0),
                    ProductOutcome::Failed {
                        error: e.to_string(),
                    },
                )
            }
        }
    }

    fn raster_job(&self, report: &ProductReport, sample: Arc<RasterSample>) -> Result<ExportJob> {
        let export = &self.config.export;
        let prefix = export.raster_prefix_for(report.id(), &self.region, &self.config.time.label());
        let job = build_raster_export(sample, &self.region, &report.descriptor, &export.destination)?;
        Ok(job.with_description(prefix.clone()).with_file_prefix(prefix))
    }

    fn table_job(
        &self,
        products: &[ProductReport],
        comfort: Option<&ProductReport>,
    ) -> Result<ExportJob> {
        let export = &self.config.export;
        let stats: Vec<ProductStatistics> = products
            .iter()
            .chain(comfort)
            .map(|report| ProductStatistics::new(report.id(), report.statistics.clone()))
            .collect();

        let prefix = export.table_prefix_for(&self.region, &self.config.time.label());
        let description = export
            .table_description
            .clone()
            .unwrap_or_else(|| prefix.clone());
        let job = build_table_export(&stats, &self.window, &self.region, &export.destination)?;
        Ok(job.with_description(description).with_file_prefix(prefix))
    }

    async fn submit(&self, job: ExportJob) -> SubmittedJob {
        let parameters = job.parameters();
        let handle = match self.queue.submit(job).await {
            Ok(handle) => {
                debug!(job_id = %handle.id, description = %handle.description, "Export submitted");
                Ok(handle)
            }
            Err(e) => {
                error!(description = %parameters.description, error = %e, "Export rejected");
                Err(e.to_string())
            }
        };
        SubmittedJob { parameters, handle }
    }
}
