//! Exact L2 vector storage addressed by dense integer identifiers.

/// Row-major storage for vectors of one fixed dimension.
///
/// Row `n` holds the vector with identifier `n`. The store knows nothing about
/// payloads; callers map identifiers back to text themselves.
#[derive(Debug, Clone, PartialEq)]
pub struct FlatL2 {
    /// Length of every stored vector, always non-zero
    dimension: usize,
    /// Concatenated rows
    data: Vec<f32>,
}

impl FlatL2 {
    /// Create an empty store for vectors of `dimension` components.
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            data: Vec::default(),
        }
    }

    /// Rebuild a store from persisted rows.
    ///
    /// Returns `None` if `dimension` is zero or `data` is not a whole number of rows.
    pub fn from_rows(dimension: usize, data: Vec<f32>) -> Option<Self> {
        (dimension > 0 && data.len() % dimension == 0).then_some(Self { dimension, data })
    }

    /// Vector length accepted by this store.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Number of stored vectors.
    pub fn len(&self) -> usize {
        self.data.len() / self.dimension
    }

    /// Raw row-major contents.
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// Append one row. The caller has already checked its length.
    pub fn push(&mut self, vector: &[f32]) {
        debug_assert_eq!(vector.len(), self.dimension);
        self.data.extend_from_slice(vector);
    }

    /// Identifier and squared distance of the row closest to `query`.
    ///
    /// Equidistant rows resolve to the lowest identifier. A NaN distance counts
    /// as infinitely far.
    pub fn nearest(&self, query: &[f32]) -> Option<(usize, f32)> {
        let mut best: Option<(usize, f32)> = None;
        for (id, row) in self.data.chunks_exact(self.dimension).enumerate() {
            let raw = squared_l2(query, row);
            let distance = if raw.is_nan() { f32::INFINITY } else { raw };
            let closer = match best {
                None => true,
                Some((_, best_distance)) => distance < best_distance,
            };
            if closer {
                best = Some((id, distance));
            }
        }
        best
    }
}

/// Squared Euclidean distance between two equally long vectors.
fn squared_l2(left: &[f32], right: &[f32]) -> f32 {
    left.iter()
        .zip(right)
        .map(|(lhs, rhs)| {
            let delta = lhs - rhs;
            delta * delta
        })
        .sum()
}
