use async_trait::async_trait;
use log::{debug, warn};
use model::Costing;

use crate::{
    database::{DatabaseError, DistanceRepo},
    item::MatrixItem,
    writer::{WriteOutcome, WriterBatch, WriterBatchError},
};

/// Stores records in the distance table, tolerating records that are
/// already there.
pub struct DatabaseWriterBatch<D: DistanceRepo> {
    repo: D,
    mode: Costing,
}

impl<D: DistanceRepo> DatabaseWriterBatch<D> {
    pub fn new(repo: D, mode: Costing) -> Self {
        Self { repo, mode }
    }
}

#[async_trait]
impl<D: DistanceRepo> WriterBatch for DatabaseWriterBatch<D> {
    type Item = MatrixItem;

    async fn consume(&self, item: MatrixItem) -> Result<WriteOutcome, WriterBatchError> {
        let records = item.records(self.mode);
        if records.is_empty() {
            return Ok(WriteOutcome::default());
        }

        match self.repo.insert_distances(&records).await {
            Ok(_) => return Ok(WriteOutcome::written(records.len())),
            Err(DatabaseError::Duplicate(why)) => {
                debug!(
                    "bulk insert of {} records hit a duplicate, inserting one by one: {why}",
                    records.len()
                );
            }
            Err(why) => return Err(why.into()),
        }

        let mut outcome = WriteOutcome::default();
        for record in &records {
            match self.repo.insert_distances(std::slice::from_ref(record)).await {
                Ok(_) => outcome.written += 1,
                Err(DatabaseError::Duplicate(why)) => {
                    warn!(
                        "skipping duplicate distance for residence {} and amenity {}: {why}",
                        record.residence_id, record.amenity_id
                    );
                    outcome.skipped += 1;
                }
                Err(why) => return Err(why.into()),
            }
        }
        Ok(outcome)
    }
}
