use indexmap::IndexMap;
use model::{Costing, MatrixRequest, Point, WorkRow};

/// Maximum number of targets the matrix API accepts per request.
pub const VALHALLA_BATCH_LIMIT: usize = 50;

/// Amenities of a single residence that fit into one matrix request.
///
/// Never empty and never longer than the size it was chunked with.
#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    residence: Point,
    amenities: Vec<Point>,
}

impl Batch {
    pub fn residence(&self) -> &Point {
        &self.residence
    }

    pub fn len(&self) -> usize {
        self.amenities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.amenities.is_empty()
    }

    pub fn request(&self, costing: Costing) -> MatrixRequest {
        MatrixRequest::new(&self.residence, &self.amenities, costing)
    }

    /// Rows in the same order as the targets of [`Batch::request`].
    pub fn rows(&self) -> Vec<WorkRow> {
        self.amenities
            .iter()
            .map(|amenity| WorkRow::new(self.residence, *amenity))
            .collect()
    }
}

/// Groups amenities by residence, keeping residences in order of first
/// appearance and amenities in row order.
pub fn group_by_residence<'a, I>(rows: I) -> IndexMap<Point, Vec<Point>>
where
    I: IntoIterator<Item = &'a WorkRow>,
{
    let mut groups: IndexMap<Point, Vec<Point>> = IndexMap::new();
    for row in rows {
        groups.entry(row.residence()).or_default().push(row.amenity());
    }
    groups
}

/// Splits one residence's amenities into batches of at most `size`. Only the
/// last batch may be shorter.
pub fn chunk(residence: Point, amenities: &[Point], size: usize) -> Vec<Batch> {
    amenities
        .chunks(size.max(1))
        .map(|chunk| Batch {
            residence,
            amenities: chunk.to_vec(),
        })
        .collect()
}

/// Groups `rows` by residence and chunks every group.
pub fn batches(rows: &[WorkRow], size: usize) -> Vec<Batch> {
    group_by_residence(rows)
        .into_iter()
        .flat_map(|(residence, amenities)| chunk(residence, &amenities, size))
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    fn rows(residences: i32, amenities: i32) -> Vec<WorkRow> {
        let mut rows = Vec::new();
        for r in 1..=residences {
            for a in 1..=amenities {
                rows.push(WorkRow::new(
                    Point::new(r, 54.0 + r as f64 / 100.0, 10.0),
                    Point::new(a, 54.5, 10.0 + a as f64 / 100.0),
                ));
            }
        }
        rows
    }

    #[test]
    fn keeps_first_appearance_order() {
        let a = Point::new(2, 1.0, 1.0);
        let b = Point::new(1, 2.0, 2.0);
        let x = Point::new(10, 3.0, 3.0);
        let y = Point::new(11, 4.0, 4.0);
        let input = vec![
            WorkRow::new(a, x),
            WorkRow::new(b, x),
            WorkRow::new(a, y),
        ];

        let groups = group_by_residence(&input);
        assert_eq!(groups.keys().copied().collect::<Vec<_>>(), vec![a, b]);
        assert_eq!(groups[&a], vec![x, y]);
        assert_eq!(groups[&b], vec![x]);
    }

    #[test]
    fn trailing_batch_is_shorter() {
        let input = rows(2, 60);
        let batches = batches(&input, VALHALLA_BATCH_LIMIT);

        let sizes = batches.iter().map(Batch::len).collect::<Vec<_>>();
        assert_eq!(sizes, vec![50, 10, 50, 10]);
        assert!(batches.iter().all(|batch| !batch.is_empty()));
    }

    #[test]
    fn batches_share_one_residence() {
        let input = rows(3, 7);
        for batch in batches(&input, 3) {
            assert!(batch.len() <= 3);
            assert!(batch
                .rows()
                .iter()
                .all(|row| row.residence_id == batch.residence().id));
        }
    }

    #[test]
    fn no_loss_and_no_duplication() {
        for (residences, amenities, size) in [(1, 1, 50), (4, 49, 50), (3, 101, 50), (5, 13, 4)] {
            let input = rows(residences, amenities);
            let flattened = batches(&input, size)
                .iter()
                .flat_map(Batch::rows)
                .collect::<Vec<_>>();

            assert_eq!(flattened.len(), input.len());
            let expected = input
                .iter()
                .map(|row| (row.residence_id, row.amenity_id))
                .collect::<HashSet<_>>();
            let actual = flattened
                .iter()
                .map(|row| (row.residence_id, row.amenity_id))
                .collect::<HashSet<_>>();
            assert_eq!(actual, expected);
        }
    }

    #[test]
    fn request_targets_follow_rows() {
        let input = rows(1, 5);
        let batch = &batches(&input, 50)[0];
        let request = batch.request(Costing::Bicycle);

        assert_eq!(request.sources.len(), 1);
        assert_eq!(request.target_count(), batch.len());
        for (target, row) in request.targets.iter().zip(batch.rows()) {
            assert_eq!(target.lat, row.amenity_lat);
            assert_eq!(target.lon, row.amenity_lng);
        }
    }
}
