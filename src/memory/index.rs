use super::MemoryError;

/// Append-only exact nearest-neighbor index over fixed-dimension embeddings.
///
/// Positions are assigned monotonically from 0 and never reused; every
/// position maps to the case identifier supplied at its `add` call. Search is
/// a brute-force linear scan over squared Euclidean distance (same ordering
/// as Euclidean, no square root needed).
///
/// The index itself is not synchronized: `add` takes `&mut self` and the
/// owning [`CaseMemory`](super::CaseMemory) serializes access behind its
/// lock.
#[derive(Debug)]
pub struct VectorIndex {
    dimension: usize,
    vectors: Vec<Vec<f32>>,
    case_ids: Vec<String>,
}

impl VectorIndex {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            vectors: Vec::new(),
            case_ids: Vec::new(),
        }
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn size(&self) -> usize {
        self.vectors.len()
    }

    /// Append one entry, returning its position.
    ///
    /// The vector and its case id become visible together; there is no state
    /// in which one exists without the other.
    pub fn add(&mut self, vector: Vec<f32>, case_id: impl Into<String>) -> Result<usize, MemoryError> {
        if vector.len() != self.dimension {
            return Err(MemoryError::DimensionMismatch {
                expected: self.dimension,
                actual: vector.len(),
            });
        }

        let position = self.vectors.len();
        self.vectors.push(vector);
        self.case_ids.push(case_id.into());
        tracing::debug!(position, size = self.vectors.len(), "index entry appended");
        Ok(position)
    }

    /// Return up to `k` entries ordered by ascending distance to `query`.
    ///
    /// Ties break toward the lower position (earlier insertion wins), so
    /// results are deterministic. `k` larger than the index returns
    /// everything; an empty index returns an empty vec.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<(usize, f32)>, MemoryError> {
        if query.len() != self.dimension {
            return Err(MemoryError::DimensionMismatch {
                expected: self.dimension,
                actual: query.len(),
            });
        }

        let mut scored: Vec<(usize, f32)> = self
            .vectors
            .iter()
            .enumerate()
            .map(|(position, vector)| (position, squared_distance(query, vector)))
            .collect();

        scored.sort_by(|a, b| {
            a.1.partial_cmp(&b.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.0.cmp(&b.0))
        });

        scored.truncate(k);
        Ok(scored)
    }

    /// The case id stored at `position`, if the position exists.
    pub fn case_id_at(&self, position: usize) -> Option<&str> {
        self.case_ids.get(position).map(String::as_str)
    }
}

fn squared_distance(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_and_positions_follow_call_order() {
        let mut index = VectorIndex::new(2);
        let ids = ["case_a", "case_b", "case_c"];

        for (i, id) in ids.iter().enumerate() {
            let position = index.add(vec![i as f32, 0.0], *id).unwrap();
            assert_eq!(position, i);
        }

        assert_eq!(index.size(), 3);
        for (i, id) in ids.iter().enumerate() {
            assert_eq!(index.case_id_at(i), Some(*id));
        }
        assert_eq!(index.case_id_at(3), None);
    }

    #[test]
    fn wrong_dimension_is_rejected() {
        let mut index = VectorIndex::new(3);
        let result = index.add(vec![1.0, 2.0], "case_x");
        assert!(matches!(
            result,
            Err(MemoryError::DimensionMismatch {
                expected: 3,
                actual: 2
            })
        ));
        assert_eq!(index.size(), 0);
    }

    #[test]
    fn search_orders_by_ascending_distance() {
        let mut index = VectorIndex::new(2);
        index.add(vec![10.0, 0.0], "far").unwrap();
        index.add(vec![1.0, 0.0], "near").unwrap();
        index.add(vec![5.0, 0.0], "mid").unwrap();

        let hits = index.search(&[0.0, 0.0], 3).unwrap();
        let order: Vec<usize> = hits.iter().map(|(p, _)| *p).collect();
        assert_eq!(order, vec![1, 2, 0]);
        assert!(hits[0].1 <= hits[1].1 && hits[1].1 <= hits[2].1);
    }

    #[test]
    fn ties_break_toward_earlier_insertion() {
        let mut index = VectorIndex::new(2);
        index.add(vec![1.0, 1.0], "first").unwrap();
        index.add(vec![1.0, 1.0], "second").unwrap();

        let hits = index.search(&[1.0, 1.0], 2).unwrap();
        assert_eq!(hits[0].0, 0);
        assert_eq!(hits[1].0, 1);
        assert!(hits[0].1.abs() < f32::EPSILON);
    }

    #[test]
    fn k_beyond_size_returns_everything() {
        let mut index = VectorIndex::new(1);
        index.add(vec![1.0], "a").unwrap();
        index.add(vec![2.0], "b").unwrap();

        let hits = index.search(&[0.0], 100).unwrap();
        assert_eq!(hits.len(), 2);
    }

    #[test]
    fn empty_index_returns_empty_results() {
        let index = VectorIndex::new(4);
        let hits = index.search(&[0.0; 4], 5).unwrap();
        assert!(hits.is_empty());
    }

    #[test]
    fn mismatched_query_is_rejected() {
        let index = VectorIndex::new(4);
        assert!(matches!(
            index.search(&[0.0; 3], 1),
            Err(MemoryError::DimensionMismatch { .. })
        ));
    }
}
