//! End-to-end runs against an in-memory catalog and a recording job queue.

use std::sync::Arc;

use export::{Destination, ExportFormat};
use geo_common::{BoundingBox, StatKind, TimeWindowSpec};
use pipeline::{Pipeline, ProductOutcome, RegionConfig, RunConfig, RunReport};
use raster::{GeoTiffCatalog, RasterFetcher};
use test_utils::{
    aod_descriptor, assert_approx_eq, assert_stat_approx, constant_raster, date, grid_over,
    km_grid, kochi, lst_descriptor, ndvi_descriptor, quarter_km_grid, write_scene, RecordingQueue,
    StaticFetcher, DEG_PER_KM,
};

// ============================================================================
// Helpers
// ============================================================================

fn march_config() -> RunConfig {
    let mut config = RunConfig::default_kochi();
    config.time = TimeWindowSpec::Literal {
        start: date(2024, 3, 1),
        end: date(2024, 3, 31),
    };
    config.export.destination = Destination::local("/out");
    config
}

fn fetcher_with(lst: bool, ndvi: bool, aod: bool) -> StaticFetcher {
    let region = kochi();
    let mut fetcher = StaticFetcher::new();
    let (l, n, a) = (lst_descriptor(), ndvi_descriptor(), aod_descriptor());
    if lst {
        fetcher = fetcher.with_raster(&l.catalog_id, &l.band, constant_raster(&km_grid(&region), 15000.0));
    }
    if ndvi {
        fetcher = fetcher.with_raster(
            &n.catalog_id,
            &n.band,
            constant_raster(&quarter_km_grid(&region), 5000.0),
        );
    }
    if aod {
        fetcher = fetcher.with_raster(&a.catalog_id, &a.band, constant_raster(&km_grid(&region), 300.0));
    }
    fetcher
}

async fn run<F: RasterFetcher + 'static>(
    config: RunConfig,
    fetcher: Arc<F>,
    queue: Arc<RecordingQueue>,
) -> RunReport {
    Pipeline::new(config, date(2024, 4, 1), fetcher, queue)
        .unwrap()
        .run()
        .await
        .unwrap()
}

fn header(report: &RunReport) -> Vec<String> {
    report.table.header().into_iter().map(String::from).collect()
}

// ============================================================================
// Full runs
// ============================================================================

#[tokio::test]
async fn test_all_products_succeed() {
    let queue = Arc::new(RecordingQueue::new());
    let report = run(march_config(), Arc::new(fetcher_with(true, true, true)), queue.clone()).await;

    assert_eq!(report.succeeded(), 3);
    assert_stat_approx!(report.product("lst").unwrap().statistics, StatKind::Mean, 26.85, 1e-9);
    assert_stat_approx!(report.product("ndvi").unwrap().statistics, StatKind::Mean, 0.5, 1e-9);
    let aod = &report.product("aod").unwrap().statistics;
    assert_stat_approx!(aod, StatKind::Min, 0.3, 1e-9);
    assert_stat_approx!(aod, StatKind::Max, 0.3, 1e-9);

    // Flat inputs normalize to zero: 0.5 * 1 + 0.3 * 0 + 0.2 * 1
    let comfort = report.comfort.as_ref().unwrap();
    assert!(comfort.outcome.is_success());
    assert_stat_approx!(comfort.statistics, StatKind::Mean, 0.7, 1e-9);

    for id in ["lst", "ndvi", "aod"] {
        let product = report.product(id).unwrap();
        assert_eq!(product.legend.len(), product.descriptor.palette.len());
        assert!(product.layer.is_some());
    }

    let jobs = queue.jobs();
    assert_eq!(jobs.len(), 5);
    let rasters: Vec<_> = jobs
        .iter()
        .filter(|job| job.format == ExportFormat::GeoTiff)
        .map(|job| job.file_prefix.clone())
        .collect();
    assert_eq!(
        rasters,
        vec![
            "LST_Kochi_India_2024-03-01_2024-03-31",
            "NDVI_Kochi_India_2024-03-01_2024-03-31",
            "AOD_Kochi_India_2024-03-01_2024-03-31",
            "COMFORT_Kochi_India_2024-03-01_2024-03-31",
        ]
    );

    let table = jobs.last().unwrap();
    assert_eq!(table.format, ExportFormat::Csv);
    assert_eq!(table.file_name(), "Kochi_India_stats_2024-03-01_2024-03-31.csv");
    assert_eq!(
        header(&report),
        vec![
            "date_from", "date_to", "region", "avg_lst", "avg_ndvi", "avg_aod", "min_aod",
            "max_aod", "avg_comfort"
        ]
    );
    assert_approx_eq!(report.table.get("avg_lst").unwrap().as_f64().unwrap(), 26.85, 1e-9);
}

#[tokio::test]
async fn test_ndvi_resolution_is_native() {
    let queue = Arc::new(RecordingQueue::new());
    let fetcher = Arc::new(fetcher_with(true, true, true));
    let report = run(march_config(), fetcher.clone(), queue.clone()).await;

    let ndvi_request = fetcher
        .requests()
        .into_iter()
        .find(|r| r.band == "NDVI")
        .unwrap();
    assert_eq!(ndvi_request.resolution_m, 250.0);
    assert_eq!(ndvi_request.window.start, date(2024, 3, 1));

    let ndvi_job = queue
        .jobs()
        .into_iter()
        .find(|job| job.product() == Some("ndvi"))
        .unwrap();
    assert_eq!(ndvi_job.resolution_m, Some(250.0));
    assert_eq!(ndvi_job.crs, Some(report.region.crs));
}

#[tokio::test]
async fn test_comfort_with_region_off_the_coarse_grid() {
    // Scenes cover a wider tile; the region edges fall inside 1 km cells
    let dir = tempfile::tempdir().unwrap();
    let tile = BoundingBox::new(76.0, 9.8, 76.6, 10.2);
    let scene_date = date(2024, 3, 10);
    let (l, n, a) = (lst_descriptor(), ndvi_descriptor(), aod_descriptor());
    write_scene(dir.path(), &l, scene_date, &constant_raster(&grid_over(&tile, DEG_PER_KM, 1000.0), 15000.0));
    write_scene(
        dir.path(),
        &n,
        scene_date,
        &constant_raster(&grid_over(&tile, DEG_PER_KM / 4.0, 250.0), 5000.0),
    );
    write_scene(dir.path(), &a, scene_date, &constant_raster(&grid_over(&tile, DEG_PER_KM, 1000.0), 300.0));

    let mut config = march_config();
    config.region = RegionConfig {
        name: "Kochi, India".to_string(),
        min_lon: 76.205,
        min_lat: 9.855,
        max_lon: 76.395,
        max_lat: 10.095,
        crs: Default::default(),
    };
    let queue = Arc::new(RecordingQueue::new());
    let report = run(config, Arc::new(GeoTiffCatalog::new(dir.path())), queue.clone()).await;

    assert_eq!(report.succeeded(), 3);
    let comfort = report.comfort.as_ref().unwrap();
    assert!(comfort.outcome.is_success(), "{:?}", comfort.outcome);
    assert_stat_approx!(comfort.statistics, StatKind::Mean, 0.7, 1e-6);
    assert_approx_eq!(report.table.get("avg_comfort").unwrap().as_f64().unwrap(), 0.7, 1e-6);
    assert!(queue.jobs().iter().any(|job| job.product() == Some("comfort")));
}

// ============================================================================
// Recovery
// ============================================================================

#[tokio::test]
async fn test_no_imagery_is_recovered() {
    let queue = Arc::new(RecordingQueue::new());
    let report = run(march_config(), Arc::new(fetcher_with(true, true, false)), queue.clone()).await;

    let aod = report.product("aod").unwrap();
    assert!(matches!(aod.outcome, ProductOutcome::NoImagery));
    assert!(aod.statistics.all_unavailable());
    assert_eq!(aod.statistics.len(), 3);
    assert!(aod.legend.is_empty());
    assert!(aod.layer.is_none());

    let comfort = report.comfort.as_ref().unwrap();
    assert!(matches!(comfort.outcome, ProductOutcome::Skipped { .. }));

    // lst + ndvi rasters, then the table
    let jobs = queue.jobs();
    assert_eq!(jobs.len(), 3);
    assert!(jobs.iter().all(|job| job.product() != Some("aod")));

    for column in ["avg_aod", "min_aod", "max_aod", "avg_comfort"] {
        assert!(report.table.get(column).unwrap().is_empty(), "{column}");
    }
}

#[tokio::test]
async fn test_fetch_error_only_fails_that_product() {
    let n = ndvi_descriptor();
    let fetcher = fetcher_with(true, false, true).with_error(&n.catalog_id, &n.band, "disk on fire");
    let queue = Arc::new(RecordingQueue::new());
    let report = run(march_config(), Arc::new(fetcher), queue.clone()).await;

    match &report.product("ndvi").unwrap().outcome {
        ProductOutcome::Failed { error } => assert!(error.contains("disk on fire")),
        other => panic!("expected failure, got {:?}", other),
    }
    assert!(report.product("lst").unwrap().outcome.is_success());
    assert!(report.product("aod").unwrap().outcome.is_success());
    assert!(queue.jobs().iter().all(|job| job.product() != Some("ndvi")));
    assert!(report.table.get("avg_ndvi").unwrap().is_empty());
}

#[tokio::test]
async fn test_region_outside_footprint() {
    let mut config = march_config();
    config.region = RegionConfig {
        name: "Offshore".to_string(),
        min_lon: 74.0,
        min_lat: 9.0,
        max_lon: 74.5,
        max_lat: 9.5,
        crs: Default::default(),
    };
    config.products = vec![aod_descriptor()];
    config.comfort = None;

    let queue = Arc::new(RecordingQueue::new());
    let report = run(config, Arc::new(fetcher_with(false, false, true)), queue.clone()).await;

    let aod = report.product("aod").unwrap();
    assert!(aod.statistics.all_unavailable());
    assert_eq!(aod.coverage.unwrap().valid_pixels, 0);

    let table = queue.jobs().pop().unwrap();
    let row = table.table_row().unwrap();
    assert_eq!(row.header()[3..], ["avg_aod", "min_aod", "max_aod"]);
    for column in ["avg_aod", "min_aod", "max_aod"] {
        assert!(row.get(column).unwrap().is_empty());
    }
}

#[tokio::test]
async fn test_rejected_submissions_do_not_fail_run() {
    let queue = Arc::new(RecordingQueue::rejecting());
    let report = run(march_config(), Arc::new(fetcher_with(true, true, true)), queue).await;

    assert_eq!(report.rejected().count(), report.jobs.len());
    assert!(!report.table.is_empty());
}

// ============================================================================
// Fatal configuration
// ============================================================================

#[test]
fn test_invalid_descriptor_stops_before_fetch() {
    let mut config = march_config();
    config.products[2].scale_factor = 0.0;
    let fetcher = Arc::new(fetcher_with(true, true, true));
    let queue = Arc::new(RecordingQueue::new());

    let err = match Pipeline::new(config, date(2024, 4, 1), fetcher.clone(), queue.clone()) {
        Err(err) => err,
        Ok(_) => panic!("zero scale factor accepted"),
    };
    assert!(err.is_invalid_descriptor());
    assert!(fetcher.requests().is_empty());
    assert!(queue.jobs().is_empty());
}

// ============================================================================
// Stability
// ============================================================================

#[tokio::test]
async fn test_columns_stable_when_imagery_missing() {
    let full = run(
        march_config(),
        Arc::new(fetcher_with(true, true, true)),
        Arc::new(RecordingQueue::new()),
    )
    .await;
    let partial = run(
        march_config(),
        Arc::new(fetcher_with(false, true, false)),
        Arc::new(RecordingQueue::new()),
    )
    .await;

    assert_eq!(header(&full), header(&partial));
}

#[tokio::test]
async fn test_repeated_runs_submit_identical_jobs() {
    let first = Arc::new(RecordingQueue::new());
    let second = Arc::new(RecordingQueue::new());
    let a = run(march_config(), Arc::new(fetcher_with(true, true, true)), first.clone()).await;
    let b = run(march_config(), Arc::new(fetcher_with(true, true, true)), second.clone()).await;

    let params = |queue: &RecordingQueue| {
        queue
            .jobs()
            .iter()
            .map(|job| job.parameters())
            .collect::<Vec<_>>()
    };
    assert_eq!(params(&first), params(&second));
    assert_eq!(a.table, b.table);
    for id in ["lst", "ndvi", "aod", "comfort"] {
        assert_eq!(
            a.product(id).unwrap().statistics,
            b.product(id).unwrap().statistics
        );
    }
}
