use std::{
    fs::File,
    path::{Path, PathBuf},
    sync::{Mutex, PoisonError},
};

use async_trait::async_trait;
use log::info;
use model::Costing;

use crate::{
    item::MatrixItem,
    writer::{WriteOutcome, WriterBatch, WriterBatchError},
};

/// Appends records to a single headerless CSV file.
pub struct CsvWriterBatch {
    writer: Mutex<csv::Writer<File>>,
    path: PathBuf,
    mode: Costing,
}

impl CsvWriterBatch {
    /// Creates or truncates the file at `path`.
    pub fn create(path: impl AsRef<Path>, mode: Costing) -> Result<Self, WriterBatchError> {
        let path = path.as_ref().to_path_buf();
        let writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_path(&path)?;
        info!("writing distances to {}", path.display());
        Ok(Self {
            writer: Mutex::new(writer),
            path,
            mode,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl WriterBatch for CsvWriterBatch {
    type Item = MatrixItem;

    async fn consume(&self, item: MatrixItem) -> Result<WriteOutcome, WriterBatchError> {
        let records = item.records(self.mode);
        let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        for record in &records {
            writer.serialize(record)?;
        }
        Ok(WriteOutcome::written(records.len()))
    }

    async fn finish(&self) -> Result<(), WriterBatchError> {
        self.writer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .flush()?;
        Ok(())
    }
}
