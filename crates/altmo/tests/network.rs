use std::{
    collections::HashSet,
    fs,
    sync::{Arc, Mutex},
};

use altmo::commands::network::{find_study_area, measure, NetworkJob};
use async_trait::async_trait;
use batches::{
    database::{DatabaseError, DistanceRepo, Result, StudyAreaRepo, WorkRowSource},
    BatchConfig, MatrixClient, MatrixError, Output, Parallel, PipelineSettings,
};
use model::{Costing, DistanceRecord, MatrixRequest, MatrixResult, Measurement, Point, StudyArea, WorkRow};
use tokio_util::sync::CancellationToken;

struct Rows(Vec<WorkRow>);

#[async_trait]
impl WorkRowSource for Rows {
    async fn count(&self) -> Result<u64> {
        Ok(self.0.len() as u64)
    }

    async fn page(&self, start: u64, limit: u64) -> Result<Vec<WorkRow>> {
        Ok(self
            .0
            .iter()
            .skip(start as usize)
            .take(limit as usize)
            .copied()
            .collect())
    }
}

struct Matrix;

#[async_trait]
impl MatrixClient for Matrix {
    async fn sources_to_targets(
        &self,
        request: &MatrixRequest,
    ) -> std::result::Result<MatrixResult, MatrixError> {
        Ok(vec![Measurement::new(0.8, 600); request.target_count()])
    }
}

#[derive(Clone, Default)]
struct Distances(Arc<Mutex<HashSet<(i32, i32)>>>);

#[async_trait]
impl DistanceRepo for Distances {
    async fn insert_distances(&self, records: &[DistanceRecord]) -> Result<u64> {
        let mut keys = self.0.lock().unwrap();
        if records.iter().any(|record| keys.contains(&record.key())) {
            return Err(DatabaseError::Duplicate("residence_amenity_distances_pkey".to_owned()));
        }
        keys.extend(records.iter().map(DistanceRecord::key));
        Ok(records.len() as u64)
    }
}

struct Areas;

#[async_trait]
impl StudyAreaRepo for Areas {
    async fn study_area_by_name(&self, name: &str) -> Result<Option<StudyArea>> {
        Ok((name == "kiel").then(|| StudyArea {
            id: 1,
            name: "kiel".to_owned(),
            description: None,
        }))
    }
}

fn rows() -> Vec<WorkRow> {
    (1..=4)
        .flat_map(|r| {
            (1..=30).map(move |a| {
                WorkRow::new(Point::new(r, 54.3 + r as f64 / 100.0, 10.1), Point::new(a, 54.3, 10.1 + a as f64 / 100.0))
            })
        })
        .collect()
}

fn job(output: Output, file_name: Option<std::path::PathBuf>) -> NetworkJob {
    NetworkJob {
        config: BatchConfig {
            costing: Costing::Bicycle,
            output,
            file_name,
        },
        pipeline: PipelineSettings::for_parallel(Parallel::Low),
        page_size: 50,
    }
}

#[tokio::test]
async fn unknown_study_area_fails() {
    assert_eq!(find_study_area(&Areas, "kiel").await.unwrap().id, 1);

    let err = find_study_area(&Areas, "atlantis").await.unwrap_err();
    assert!(err.to_string().contains("atlantis"));
}

#[tokio::test]
async fn writes_every_row_to_the_database_once() {
    let distances = Distances::default();
    let source = Rows(rows());

    for _ in 0..2 {
        let summary = measure(
            &job(Output::Db, None),
            &source,
            Arc::new(Matrix),
            distances.clone(),
            &CancellationToken::new(),
        )
        .await
        .unwrap();
        assert_eq!(summary.pages, 3);
        assert_eq!(summary.report.records + summary.report.skipped, 120);
    }
    assert_eq!(distances.0.lock().unwrap().len(), 120);
}

#[tokio::test]
async fn csv_output_is_split_by_page() {
    let dir = tempfile::tempdir().unwrap();
    let base = dir.path().join("kiel.csv");

    let summary = measure(
        &job(Output::Csv, Some(base)),
        &Rows(rows()),
        Arc::new(Matrix),
        Distances::default(),
        &CancellationToken::new(),
    )
    .await
    .unwrap();
    assert_eq!(summary.report.records, 120);

    let first = fs::read_to_string(dir.path().join("1-kiel.csv")).unwrap();
    assert_eq!(first.lines().count(), 50);
    assert!(first.lines().all(|line| line.starts_with("0.8,600,") && line.ends_with(",bicycle")));
    let last = fs::read_to_string(dir.path().join("3-kiel.csv")).unwrap();
    assert_eq!(last.lines().count(), 20);
}

/// Answers with a routing error for the residence at `lat`.
struct RefusingMatrix {
    lat: f64,
}

#[async_trait]
impl MatrixClient for RefusingMatrix {
    async fn sources_to_targets(
        &self,
        request: &MatrixRequest,
    ) -> std::result::Result<MatrixResult, MatrixError> {
        if (request.sources[0].lat - self.lat).abs() < 1e-9 {
            return Err(MatrixError::MalformedResponse {
                response: r#"{"error_code":171,"error":"No suitable edges near location"}"#.to_owned(),
            });
        }
        Ok(vec![Measurement::new(0.8, 600); request.target_count()])
    }
}

#[tokio::test]
async fn refused_batches_are_counted_once() {
    // residence 2 spans the first two pages, so it is requested twice
    let summary = measure(
        &job(Output::Db, None),
        &Rows(rows()),
        Arc::new(RefusingMatrix { lat: 54.32 }),
        Distances::default(),
        &CancellationToken::new(),
    )
    .await
    .unwrap();

    assert_eq!(summary.pages, 3);
    assert_eq!(summary.report.failures.len(), 2);
    assert_eq!(summary.report.malformed(), 2);
    assert_eq!(summary.report.records, 90);
}
