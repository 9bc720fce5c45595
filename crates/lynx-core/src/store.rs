//! Contiguous in-memory vector storage.
//!
//! All vectors live in a single row-major `Vec<f32>` buffer, with each
//! vector occupying `dimension` consecutive elements. This keeps search
//! scans cache-friendly and makes the id of a vector its row index.
//!
//! # Memory Layout
//!
//! ```text
//! Buffer: [v0_d0, v0_d1, ..., v0_dn, v1_d0, v1_d1, ..., v1_dn, ...]
//! Index:  |<---- vector 0 ---->|    |<---- vector 1 ---->|
//! ```

use crate::error::{Error, Result};
use std::ops::Range;

/// Append-only store of fixed-dimension `f32` vectors.
///
/// Ids are dense and monotonic starting at 0: the id of a vector is its
/// positional index in the buffer, and the next id equals [`len`].
/// The dimension is discovered at first insert and immutable afterwards.
///
/// The store is a plain value type with no interior locking; callers that
/// share it across threads wrap it in the engine's reader-writer lock.
///
/// [`len`]: VectorStore::len
#[derive(Debug, Default, Clone)]
pub struct VectorStore {
    /// Contiguous buffer holding all vectors.
    buffer: Vec<f32>,
    /// Vector dimension; 0 until the first insert.
    dimension: usize,
    /// Number of vectors stored.
    count: usize,
}

impl VectorStore {
    /// Creates an empty store. The dimension is fixed by the first insert.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty store pre-sized for `capacity` vectors of the
    /// given dimension.
    #[must_use]
    pub fn with_capacity(dimension: usize, capacity: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(dimension * capacity),
            dimension,
            count: 0,
        }
    }

    /// Appends a vector and returns its id.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyInput`] for a zero-length vector and
    /// [`Error::DimensionMismatch`] when the length differs from the
    /// store dimension.
    pub fn add(&mut self, vector: &[f32]) -> Result<u64> {
        self.check_row(vector)?;

        self.buffer.extend_from_slice(vector);
        if self.dimension == 0 {
            self.dimension = vector.len();
        }

        let id = self.count as u64;
        self.count += 1;
        Ok(id)
    }

    /// Appends a batch of vectors and returns the assigned id range.
    ///
    /// The batch is validated in full before anything is written: either
    /// every vector is appended or none is.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyInput`] for an empty batch or a zero-length
    /// row, and [`Error::DimensionMismatch`] when any row disagrees with
    /// the batch (or store) dimension.
    pub fn add_batch(&mut self, vectors: &[Vec<f32>]) -> Result<Range<u64>> {
        if vectors.is_empty() {
            return Err(Error::EmptyInput("batch"));
        }

        let dim = if self.dimension == 0 {
            vectors[0].len()
        } else {
            self.dimension
        };

        for vector in vectors {
            if vector.is_empty() {
                return Err(Error::EmptyInput("vector"));
            }
            if vector.len() != dim {
                return Err(Error::DimensionMismatch {
                    expected: dim,
                    actual: vector.len(),
                });
            }
        }

        let first = self.count as u64;
        self.buffer.reserve(vectors.len() * dim);
        for vector in vectors {
            self.buffer.extend_from_slice(vector);
        }
        self.dimension = dim;
        self.count += vectors.len();

        Ok(first..self.count as u64)
    }

    /// Returns a read-only view of the vector with the given id.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IdOutOfRange`] when `id >= len()`.
    pub fn get(&self, id: u64) -> Result<&[f32]> {
        let row = usize::try_from(id).map_err(|_| Error::IdOutOfRange {
            id,
            size: self.count,
        })?;

        if row >= self.count {
            return Err(Error::IdOutOfRange {
                id,
                size: self.count,
            });
        }

        let start = row * self.dimension;
        Ok(&self.buffer[start..start + self.dimension])
    }

    /// Returns the row for an id the caller already validated.
    ///
    /// Internal hot-path accessor used by index scans; `row` must be
    /// smaller than [`len`](VectorStore::len).
    #[inline]
    pub(crate) fn row(&self, row: usize) -> &[f32] {
        let start = row * self.dimension;
        &self.buffer[start..start + self.dimension]
    }

    /// Iterates all `(id, vector)` pairs in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = (u64, &[f32])> {
        self.buffer
            .chunks_exact(self.dimension.max(1))
            .enumerate()
            .map(|(i, row)| (i as u64, row))
    }

    /// Number of vectors stored.
    #[must_use]
    pub fn len(&self) -> usize {
        self.count
    }

    /// Returns true when the store holds no vectors.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Vector dimension; 0 until the first insert.
    #[must_use]
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// The flat row-major buffer of all vectors.
    ///
    /// Length is always `len() * dimension()`.
    #[must_use]
    pub fn as_flat(&self) -> &[f32] {
        &self.buffer
    }

    /// Copies every vector out as an owned row, in id order.
    ///
    /// Used by the snapshot path, which serialises the store contents
    /// outside the engine lock.
    #[must_use]
    pub fn to_rows(&self) -> Vec<Vec<f32>> {
        self.iter().map(|(_, row)| row.to_vec()).collect()
    }

    fn check_row(&self, vector: &[f32]) -> Result<()> {
        if vector.is_empty() {
            return Err(Error::EmptyInput("vector"));
        }
        if self.dimension != 0 && vector.len() != self.dimension {
            return Err(Error::DimensionMismatch {
                expected: self.dimension,
                actual: vector.len(),
            });
        }
        Ok(())
    }
}
