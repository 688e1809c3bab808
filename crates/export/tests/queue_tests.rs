//! Integration tests for export builders and the local job queue.

use std::sync::Arc;

use export::{
    build_raster_export, build_table_export, Destination, ExportError, ExportFormat, JobQueue,
    DrainSummary, JobStatus, LocalJobQueue, ProductStatistics, GEOTIFF_NODATA,
};
use geo_common::{StatKind, StatisticsResult};
use raster::{aggregate, read_geotiff, Resolution};
use test_utils::{
    aod_descriptor, constant_raster, km_grid, kochi, lst_descriptor, march_2024, offshore,
    raster_with_holes, sample_for,
};

fn read_csv(path: &str) -> (Vec<String>, Vec<Vec<String>>) {
    let mut reader = csv::Reader::from_path(path).unwrap();
    let header = reader.headers().unwrap().iter().map(String::from).collect();
    let rows = reader
        .records()
        .map(|r| r.unwrap().iter().map(String::from).collect())
        .collect();
    (header, rows)
}

fn completed_location(status: Option<JobStatus>) -> String {
    match status {
        Some(JobStatus::Completed { location }) => location,
        other => panic!("job not completed: {:?}", other),
    }
}

// ============================================================================
// Local queue artifacts
// ============================================================================

#[tokio::test]
async fn test_csv_has_header_and_one_row() {
    let dir = tempfile::tempdir().unwrap();
    let region = kochi();
    let lst = lst_descriptor();
    let aod = aod_descriptor();

    let lst_sample = sample_for(&lst, constant_raster(&km_grid(&region), 15000.0));
    let lst_stats = aggregate(&lst_sample, &region, Resolution::Native, &StatKind::ALL).unwrap();
    let aod_stats = StatisticsResult::unavailable(&aod.statistics);

    let job = build_table_export(
        &[
            ProductStatistics::new(&lst.id, lst_stats),
            ProductStatistics::new(&aod.id, aod_stats),
        ],
        &march_2024(),
        &region,
        &Destination::local(dir.path()),
    )
    .unwrap();

    let queue = LocalJobQueue::new();
    let handle = queue.submit(job).await.unwrap();
    let summary = queue.drain().await;
    assert_eq!(summary.completed, 1);
    assert_eq!(summary.failed, 0);

    let location = completed_location(queue.status(handle.id).await);
    assert!(location.ends_with("Kochi_India_stats_2024-03-01_2024-03-31.csv"));

    let (header, rows) = read_csv(&location);
    assert_eq!(
        header,
        vec![
            "date_from", "date_to", "region", "avg_lst", "min_lst", "max_lst", "avg_aod",
            "min_aod", "max_aod"
        ]
    );
    assert_eq!(rows.len(), 1);
    let row = &rows[0];
    assert_eq!(row[0], "2024-03-01");
    assert_eq!(row[1], "2024-03-31");
    assert_eq!(row[2], "Kochi, India");
    assert!((row[3].parse::<f64>().unwrap() - 26.85).abs() < 1e-6);
    assert_eq!(&row[6..], &["", "", ""]);
}

#[tokio::test]
async fn test_geotiff_is_readable() {
    let dir = tempfile::tempdir().unwrap();
    let region = kochi();
    let lst = lst_descriptor();
    let grid = km_grid(&region);
    let sample = Arc::new(sample_for(&lst, raster_with_holes(&grid, 15000.0, &[(1, 1)])));

    let job =
        build_raster_export(sample, &region, &lst, &Destination::local(dir.path())).unwrap();
    assert_eq!(job.format, ExportFormat::GeoTiff);
    assert_eq!(job.file_name(), "LST_Kochi_India.tif");

    let queue = LocalJobQueue::new();
    let handle = queue.submit(job).await.unwrap();
    queue.drain().await;

    let location = completed_location(queue.status(handle.id).await);
    let image = read_geotiff(std::path::Path::new(&location)).unwrap();
    assert_eq!((image.width, image.height), (grid.width, grid.height));
    assert_eq!(image.crs, region.crs);
    assert!(image.nodata.unwrap().is_nan());
    assert!(GEOTIFF_NODATA.is_nan());
    assert!((image.data[0] - 26.85).abs() < 1e-4);
    assert!(image.data[grid.width + 1].is_nan());
}

#[tokio::test]
async fn test_minus_9999_is_a_valid_value() {
    let dir = tempfile::tempdir().unwrap();
    let region = kochi();
    let aod = aod_descriptor();
    let grid = km_grid(&region);
    // -9_999_000 * 0.001 converts to -9999.0
    let sample = Arc::new(sample_for(&aod, constant_raster(&grid, -9_999_000.0)));

    let job =
        build_raster_export(sample, &region, &aod, &Destination::local(dir.path())).unwrap();
    let queue = LocalJobQueue::new();
    let handle = queue.submit(job).await.unwrap();
    queue.drain().await;

    let location = completed_location(queue.status(handle.id).await);
    let image = read_geotiff(std::path::Path::new(&location)).unwrap();
    assert_eq!(image.data[0], -9999.0);

    let raw = image.into_raw(1000.0).unwrap();
    assert_eq!(raw.valid_count(), grid.len());
}

#[tokio::test]
async fn test_prune_finished_jobs() {
    let dir = tempfile::tempdir().unwrap();
    let queue = LocalJobQueue::new();
    for _ in 0..2 {
        let job = build_table_export(&[], &march_2024(), &kochi(), &Destination::local(dir.path()))
            .unwrap();
        queue.submit(job).await.unwrap();
    }

    let summary = queue.drain().await;
    assert_eq!(summary.completed, 2);
    assert_eq!(queue.prune_finished().await, 2);
    assert!(queue.statuses().await.is_empty());
    assert_eq!(queue.drain().await, DrainSummary::default());
}

#[tokio::test]
async fn test_bucket_destination_rejected() {
    let region = kochi();
    let job = build_table_export(
        &[],
        &march_2024(),
        &region,
        &Destination::Bucket {
            bucket: "comfort-exports".to_string(),
            prefix: "kochi/".to_string(),
        },
    )
    .unwrap();

    let queue = LocalJobQueue::new();
    assert!(matches!(
        queue.submit(job).await,
        Err(ExportError::UnsupportedDestination(_))
    ));
    assert!(queue.statuses().await.is_empty());
}

#[tokio::test]
async fn test_unwritable_directory_fails_job() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("not-a-dir");
    std::fs::write(&blocker, b"file").unwrap();

    let job = build_table_export(&[], &march_2024(), &kochi(), &Destination::local(&blocker))
        .unwrap();
    let queue = LocalJobQueue::new();
    let handle = queue.submit(job).await.unwrap();

    let summary = queue.drain().await;
    assert_eq!(summary.failed, 1);
    assert!(matches!(
        queue.status(handle.id).await,
        Some(JobStatus::Failed { .. })
    ));
}

// ============================================================================
// Scenario and column stability
// ============================================================================

#[tokio::test]
async fn test_region_outside_footprint_keeps_empty_fields() {
    let aod = aod_descriptor();
    let region = offshore();
    // Raster covers Kochi only; the offshore region sees none of it.
    let sample = sample_for(&aod, constant_raster(&km_grid(&kochi()), 300.0));
    let stats = aggregate(&sample, &region, Resolution::Native, &aod.statistics).unwrap();
    assert!(stats.all_unavailable());

    let job = build_table_export(
        &[ProductStatistics::new(&aod.id, stats)],
        &march_2024(),
        &region,
        &Destination::local("/unused"),
    )
    .unwrap();

    let columns = job.parameters().columns.unwrap();
    assert_eq!(&columns[3..], &["avg_aod", "min_aod", "max_aod"]);
    match &job.payload {
        export::ExportPayload::Table(row) => {
            for column in ["avg_aod", "min_aod", "max_aod"] {
                assert!(row.get(column).unwrap().is_empty());
            }
        }
        other => panic!("expected a table payload, got {:?}", other),
    }
}

#[test]
fn test_columns_stable_with_and_without_imagery() {
    let region = kochi();
    let lst = lst_descriptor();
    let sample = sample_for(&lst, constant_raster(&km_grid(&region), 15000.0));
    let available = aggregate(&sample, &region, Resolution::Native, &lst.statistics).unwrap();
    let unavailable = StatisticsResult::unavailable(&lst.statistics);

    let columns = |stats: StatisticsResult| {
        build_table_export(
            &[ProductStatistics::new(&lst.id, stats)],
            &march_2024(),
            &region,
            &Destination::local("/out"),
        )
        .unwrap()
        .parameters()
        .columns
        .unwrap()
    };

    assert_eq!(columns(available), columns(unavailable));
}
