use std::{
    future::Future,
    path::{Path, PathBuf},
};

use log::{info, warn};
use model::WorkRow;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::{
    database::{DatabaseError, WorkRowSource},
    manager::BatchReport,
    writer::WriterBatchError,
};

pub const DEFAULT_PAGE_SIZE: u64 = 500_000;

#[derive(Debug, Error)]
pub enum PageError {
    #[error("reading page {page}: {source}")]
    Source {
        page: u64,
        #[source]
        source: DatabaseError,
    },
    #[error("writing page {page}: {source}")]
    Writer {
        page: u64,
        #[source]
        source: WriterBatchError,
    },
}

/// Summed outcome of all pages.
#[derive(Debug, Default)]
pub struct PagesReport {
    pub total_rows: u64,
    pub pages: u64,
    pub report: BatchReport,
}

pub fn page_count(rows: u64, page_size: u64) -> u64 {
    rows.div_ceil(page_size.max(1))
}

/// Prefixes the file name component of `path` with the 1-based page index,
/// so `out/distances.csv` becomes `out/2-distances.csv` for page 2.
pub fn page_file_name(index: u64, path: &Path) -> PathBuf {
    match path.file_name() {
        Some(name) => path.with_file_name(format!("{index}-{}", name.to_string_lossy())),
        None => path.join(index.to_string()),
    }
}

/// Reads `source` page by page and hands every page to `run_page` together
/// with its 1-based index. Pages run one after another; a cancelled token
/// stops before the next page.
pub async fn run_pages<S, F, Fut>(
    source: &S,
    page_size: u64,
    cancel: &CancellationToken,
    mut run_page: F,
) -> Result<PagesReport, PageError>
where
    S: WorkRowSource + ?Sized,
    F: FnMut(u64, Vec<WorkRow>) -> Fut,
    Fut: Future<Output = Result<BatchReport, WriterBatchError>>,
{
    let page_size = page_size.max(1);
    let total_rows = source
        .count()
        .await
        .map_err(|source| PageError::Source { page: 0, source })?;
    let pages = page_count(total_rows, page_size);
    info!("{total_rows} rows in {pages} pages of at most {page_size}");

    let mut summary = PagesReport {
        total_rows,
        ..PagesReport::default()
    };
    for index in 1..=pages {
        if cancel.is_cancelled() {
            warn!("cancelled before page {index} of {pages}");
            summary.report.cancelled = true;
            break;
        }

        let start = (index - 1) * page_size;
        let rows = source
            .page(start, page_size)
            .await
            .map_err(|source| PageError::Source {
                page: index,
                source,
            })?;
        if rows.is_empty() {
            warn!("page {index} of {pages} is empty, stopping");
            break;
        }

        info!("page {index} of {pages}: {} rows", rows.len());
        let report = run_page(index, rows)
            .await
            .map_err(|source| PageError::Writer {
                page: index,
                source,
            })?;
        summary.pages += 1;
        summary.report += report;
    }
    Ok(summary)
}
