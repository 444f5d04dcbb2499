use model::{Costing, DistanceRecord, MatrixResult, WorkRow};

use crate::reader::ReaderBatchError;

/// A matrix result together with the rows it was requested for.
///
/// Constructed only when both have the same length, so the positional zip in
/// [`MatrixItem::records`] never drops or misattributes a row.
#[derive(Debug, Clone)]
pub struct MatrixItem {
    result: MatrixResult,
    rows: Vec<WorkRow>,
}

impl MatrixItem {
    pub fn new(result: MatrixResult, rows: Vec<WorkRow>) -> Result<Self, ReaderBatchError> {
        if result.len() != rows.len() {
            return Err(ReaderBatchError::Misaligned {
                residence_id: rows.first().map(|row| row.residence_id),
                expected: rows.len(),
                actual: result.len(),
            });
        }
        Ok(Self { result, rows })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[WorkRow] {
        &self.rows
    }

    pub fn records(&self, mode: Costing) -> Vec<DistanceRecord> {
        self.result
            .iter()
            .zip(&self.rows)
            .map(|(measurement, row)| DistanceRecord::new(measurement, row, mode))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use model::{Measurement, Point};

    use super::*;

    fn rows(n: i32) -> Vec<WorkRow> {
        (1..=n)
            .map(|a| WorkRow::new(Point::new(1, 0.0, 0.0), Point::new(100 + a, 1.0, 1.0)))
            .collect()
    }

    #[test]
    fn zips_by_position() {
        for n in [1, 17, 50] {
            let result = (0..n)
                .map(|i| Measurement::new(i as f64, i as i64 * 10))
                .collect::<Vec<_>>();
            let item = MatrixItem::new(result, rows(n)).unwrap();
            let records = item.records(Costing::Pedestrian);

            assert_eq!(records.len(), n as usize);
            for (i, (record, row)) in records.iter().zip(item.rows()).enumerate() {
                assert_eq!(record.amenity_id, row.amenity_id);
                assert_eq!(record.residence_id, row.residence_id);
                assert_eq!(record.time, Some(i as i64 * 10));
                assert_eq!(record.mode, Costing::Pedestrian);
            }
        }
    }

    #[test]
    fn rejects_short_result() {
        let result = vec![Measurement::new(1.0, 1); 9];
        let err = MatrixItem::new(result, rows(10)).unwrap_err();
        assert!(matches!(
            err,
            ReaderBatchError::Misaligned {
                expected: 10,
                actual: 9,
                ..
            }
        ));
    }

    #[test]
    fn rejects_long_result() {
        let result = vec![Measurement::new(1.0, 1); 11];
        assert!(MatrixItem::new(result, rows(10)).is_err());
    }
}
