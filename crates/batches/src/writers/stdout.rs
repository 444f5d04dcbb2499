use std::{
    io::{self, Stdout, Write},
    sync::{Mutex, PoisonError},
};

use async_trait::async_trait;
use model::Costing;

use crate::{
    item::MatrixItem,
    writer::{WriteOutcome, WriterBatch, WriterBatchError},
};

/// Writes one comma separated line per record.
pub struct StdOutWriterBatch<W = Stdout> {
    out: Mutex<W>,
    mode: Costing,
}

impl StdOutWriterBatch<Stdout> {
    pub fn new(mode: Costing) -> Self {
        Self::with_writer(io::stdout(), mode)
    }
}

impl<W: Write + Send + 'static> StdOutWriterBatch<W> {
    pub fn with_writer(out: W, mode: Costing) -> Self {
        Self {
            out: Mutex::new(out),
            mode,
        }
    }

    pub fn into_inner(self) -> W {
        self.out.into_inner().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl<W: Write + Send + 'static> WriterBatch for StdOutWriterBatch<W> {
    type Item = MatrixItem;

    async fn consume(&self, item: MatrixItem) -> Result<WriteOutcome, WriterBatchError> {
        let records = item.records(self.mode);
        let mut out = self.out.lock().unwrap_or_else(PoisonError::into_inner);
        for record in &records {
            writeln!(out, "{}", record.to_line())?;
        }
        Ok(WriteOutcome::written(records.len()))
    }

    async fn finish(&self) -> Result<(), WriterBatchError> {
        self.out
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use model::{Measurement, Point, WorkRow};

    use super::*;

    #[tokio::test]
    async fn writes_one_line_per_record() {
        let rows = vec![
            WorkRow::new(Point::new(3, 0.0, 0.0), Point::new(9, 1.0, 1.0)),
            WorkRow::new(Point::new(3, 0.0, 0.0), Point::new(10, 1.0, 1.0)),
        ];
        let result = vec![Measurement::new(4.949, 1191), Measurement::new(0.5, 60)];
        let item = MatrixItem::new(result, rows).unwrap();

        let writer = StdOutWriterBatch::with_writer(Vec::new(), Costing::Pedestrian);
        let outcome = writer.consume(item).await.unwrap();
        assert_eq!(outcome, WriteOutcome::written(2));

        let out = String::from_utf8(writer.into_inner()).unwrap();
        assert_eq!(out, "4.949,1191,9,3,pedestrian\n0.5,60,10,3,pedestrian\n");
    }
}
