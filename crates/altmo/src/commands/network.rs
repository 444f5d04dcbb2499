use std::{path::PathBuf, sync::Arc};

use anyhow::{anyhow, Context, Result};
use batches::{
    database::{DistanceRepo, StudyAreaRepo, WorkFilter, WorkRowSource},
    pages::{page_file_name, run_pages, PagesReport},
    writers::{CsvWriterBatch, DatabaseWriterBatch, StdOutWriterBatch},
    BatchConfig, BatchManager, BatchReport, MatrixClient, MatrixItem, MatrixReaderBatch, Output,
    PipelineSettings, WriterBatch, WriterBatchError,
};
use database::PgDatabase;
use log::{info, warn};
use model::{StudyArea, WorkRow};
use tokio_util::sync::CancellationToken;
use valhalla::ValhallaClient;

use crate::{cli::NetworkArgs, settings::Settings};

/// Everything a run needs besides its collaborators.
#[derive(Debug, Clone)]
pub struct NetworkJob {
    pub config: BatchConfig,
    pub pipeline: PipelineSettings,
    pub page_size: u64,
}

impl From<&NetworkArgs> for NetworkJob {
    fn from(args: &NetworkArgs) -> Self {
        Self {
            config: BatchConfig {
                costing: args.mode.into(),
                output: args.out,
                file_name: args.file_name.clone(),
            },
            pipeline: PipelineSettings::for_parallel(args.parallel.into()),
            page_size: args.page_size,
        }
    }
}

pub async fn run(args: NetworkArgs, settings: &Settings) -> Result<PagesReport> {
    let job = NetworkJob::from(&args);

    let url = settings.database_url().context("invalid configuration")?;
    let max_connections = job.pipeline.consumers as u32 + 1;
    let database = PgDatabase::connect(&url, max_connections)
        .await
        .context("could not connect to database")?;

    let study_area = find_study_area(&database, &args.study_area).await?;
    let client = ValhallaClient::new(&settings.valhalla_server, settings.valhalla_timeout())
        .context("could not create valhalla client")?;
    let source = database.work_rows(
        study_area.id,
        WorkFilter {
            category: args.category.clone(),
            name: args.name.clone(),
        },
    );

    let cancel = CancellationToken::new();
    let on_ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupted, finishing items in progress");
            on_ctrl_c.cancel();
        }
    });

    info!(
        "measuring {} distances in study area {} ({}), writing to {}",
        job.config.costing, study_area.name, study_area.id, job.config.output
    );
    measure(&job, &source, Arc::new(client), database, &cancel).await
}

pub async fn find_study_area<R: StudyAreaRepo>(repo: &R, name: &str) -> Result<StudyArea> {
    repo.study_area_by_name(name)
        .await
        .context("could not look up study area")?
        .ok_or_else(|| anyhow!("study area \"{name}\" not found"))
}

/// Runs one pipeline per page of `source` into the sink chosen by `job`.
pub async fn measure<S, C, D>(
    job: &NetworkJob,
    source: &S,
    client: Arc<C>,
    distances: D,
    cancel: &CancellationToken,
) -> Result<PagesReport>
where
    S: WorkRowSource,
    C: MatrixClient,
    D: DistanceRepo + Clone,
{
    let summary = run_pages(source, job.page_size, cancel, |index, rows| {
        run_page(
            job,
            index,
            rows,
            Arc::clone(&client),
            distances.clone(),
            cancel.clone(),
        )
    })
    .await?;

    let report = &summary.report;
    info!(
        "{} rows in {} pages: {} records written, {} already stored, {} failed batches ({} malformed), {} failed writes",
        summary.total_rows,
        summary.pages,
        report.records,
        report.skipped,
        report.failures.len(),
        report.malformed(),
        report.failed_writes
    );
    Ok(summary)
}

async fn run_page<C, D>(
    job: &NetworkJob,
    index: u64,
    rows: Vec<WorkRow>,
    client: Arc<C>,
    distances: D,
    cancel: CancellationToken,
) -> Result<BatchReport, WriterBatchError>
where
    C: MatrixClient,
    D: DistanceRepo,
{
    let costing = job.config.costing;
    let reader = MatrixReaderBatch::new(rows, client, costing, &job.pipeline);
    match job.config.output {
        Output::Db => {
            let writer = DatabaseWriterBatch::new(distances, costing);
            pipeline(reader, writer, job, cancel).await
        }
        Output::Csv => {
            let base = job
                .config
                .file_name
                .clone()
                .unwrap_or_else(|| PathBuf::from("distances.csv"));
            let writer = CsvWriterBatch::create(page_file_name(index, &base), costing)?;
            pipeline(reader, writer, job, cancel).await
        }
        Output::Stdout => {
            let writer = StdOutWriterBatch::new(costing);
            pipeline(reader, writer, job, cancel).await
        }
    }
}

async fn pipeline<C, W>(
    reader: MatrixReaderBatch<C>,
    writer: W,
    job: &NetworkJob,
    cancel: CancellationToken,
) -> Result<BatchReport, WriterBatchError>
where
    C: MatrixClient,
    W: WriterBatch<Item = MatrixItem>,
{
    BatchManager::new(reader, Arc::new(writer), &job.pipeline)
        .with_cancel(cancel)
        .run()
        .await
}
