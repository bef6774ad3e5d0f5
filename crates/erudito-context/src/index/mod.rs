//! Append-only exact nearest-neighbor index over embedding vectors.
//!
//! Vectors live in a flat L2 store that only knows integer identifiers; a reverse
//! map turns the identifier of the nearest vector back into its chunk of text.
//! Identifiers are assigned sequentially and never reused, so an index that was
//! saved and loaded again keeps counting from where it stopped.

mod flat;
mod persistence;
mod reverse_map;

use core::ops::Range;
use std::path::Path;
use tracing::{debug, info};

use erudito_core::{Error, Result};
use flat::FlatL2;
use reverse_map::ReverseMap;

pub use persistence::{INDEX_FILE, REVERSE_INDEX_FILE};

/// Result of a nearest-neighbor lookup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor<'index> {
    /// Identifier of the closest vector
    pub id: u64,
    /// Squared L2 distance to the query
    pub distance: f32,
    /// Payload stored with the closest vector
    pub payload: &'index str,
}

/// Vector store plus reverse map, saved and loaded as a unit.
#[derive(Debug, Clone, Default)]
pub struct VectorIndex {
    /// `None` until the first vectors are added or an index is loaded
    store: Option<FlatL2>,
    /// Identifier to payload lookup, same length as `store`
    reverse: ReverseMap,
}

impl VectorIndex {
    /// Create an empty index. The dimension is fixed by the first added vector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a persisted index from `directory`.
    ///
    /// # Errors
    /// Returns [`Error::NotFound`] if either artifact is missing and
    /// [`Error::CorruptIndex`] if they cannot be decoded
    pub fn open(directory: &Path) -> Result<Self> {
        let mut index = Self::new();
        index.load(directory)?;
        Ok(index)
    }

    /// Whether `directory` holds at least one index artifact.
    ///
    /// A directory with only one of the two artifacts still counts, so that
    /// [`VectorIndex::load`] reports it instead of it being silently overwritten.
    pub fn exists(directory: &Path) -> bool {
        persistence::any_artifact(directory)
    }

    /// Replace the contents of this index with the one persisted in `directory`.
    ///
    /// On failure the index is left exactly as it was.
    ///
    /// # Errors
    /// Returns [`Error::NotFound`] if either artifact is missing and
    /// [`Error::CorruptIndex`] if they cannot be decoded or disagree on the entry count
    pub fn load(&mut self, directory: &Path) -> Result<()> {
        let (store, reverse) = persistence::read(directory)?;
        info!(
            "Loaded index from {}: {} vectors of dimension {}",
            directory.display(),
            store.len(),
            store.dimension()
        );
        self.store = Some(store);
        self.reverse = reverse;
        Ok(())
    }

    /// Write the index to `directory`, creating it if needed and overwriting
    /// any previous artifacts.
    ///
    /// # Errors
    /// Returns [`Error::Precondition`] if nothing was ever added or loaded, and
    /// [`Error::Persistence`] if the artifacts cannot be written
    pub fn save(&self, directory: &Path) -> Result<()> {
        let Some(store) = &self.store else {
            return Err(Error::Precondition(
                "Index has not been populated yet, nothing to save".to_owned(),
            ));
        };
        persistence::write(directory, store, &self.reverse)
    }

    /// Append `vectors` with their `payloads`, returning the identifiers assigned.
    ///
    /// The batch is checked as a whole before anything is stored: either every
    /// vector is added or none is.
    ///
    /// # Errors
    /// Returns [`Error::Precondition`] if the counts differ, a vector is empty, or
    /// a vector does not match the dimension of the index
    pub fn add_vectors<V: AsRef<[f32]>>(
        &mut self,
        vectors: &[V],
        payloads: Vec<String>,
    ) -> Result<Range<u64>> {
        if vectors.len() != payloads.len() {
            return Err(Error::Precondition(format!(
                "Got {} vectors but {} payloads",
                vectors.len(),
                payloads.len()
            )));
        }

        let start = self.len() as u64;
        let Some(first) = vectors.first() else {
            return Ok(start..start);
        };

        let dimension = self
            .store
            .as_ref()
            .map_or_else(|| first.as_ref().len(), FlatL2::dimension);
        if dimension == 0 {
            return Err(Error::Precondition(
                "Cannot index zero-length vectors".to_owned(),
            ));
        }
        if let Some((position, vector)) = vectors
            .iter()
            .enumerate()
            .find(|(_, vector)| vector.as_ref().len() != dimension)
        {
            return Err(Error::Precondition(format!(
                "Embedding dimensions do not match: vector {position} has {} components, index expects {dimension}",
                vector.as_ref().len()
            )));
        }

        let store = self.store.get_or_insert_with(|| FlatL2::new(dimension));
        for vector in vectors {
            store.push(vector.as_ref());
        }
        self.reverse.extend(payloads);

        let end = self.len() as u64;
        debug!("Added vectors {start}..{end} (dimension {dimension})");
        Ok(start..end)
    }

    /// Payload of the vector closest to `query`.
    ///
    /// # Errors
    /// Returns [`Error::Precondition`] if the index was never populated or loaded,
    /// or if the query dimension differs from the index dimension
    pub fn search(&self, query: &[f32]) -> Result<&str> {
        self.nearest(query).map(|neighbor| neighbor.payload)
    }

    /// Closest vector to `query` by squared L2 distance.
    ///
    /// Exact search over every stored vector; equidistant vectors resolve to the
    /// lowest identifier.
    ///
    /// # Errors
    /// Returns [`Error::Precondition`] if the index was never populated or loaded,
    /// or if the query dimension differs from the index dimension
    pub fn nearest(&self, query: &[f32]) -> Result<Neighbor<'_>> {
        let Some(store) = &self.store else {
            return Err(Error::Precondition(
                "Index has not been loaded yet".to_owned(),
            ));
        };
        if query.len() != store.dimension() {
            return Err(Error::Precondition(format!(
                "Embedding dimensions do not match: query has {} components, index expects {}",
                query.len(),
                store.dimension()
            )));
        }

        let (id, distance) = store.nearest(query).ok_or_else(|| {
            Error::Precondition("Index does not contain any vectors".to_owned())
        })?;
        let payload = self.reverse.get(id).ok_or_else(|| {
            Error::CorruptIndex(format!("No payload recorded for vector {id}"))
        })?;

        Ok(Neighbor {
            id: id as u64,
            distance,
            payload,
        })
    }

    /// Number of indexed vectors, which is also the next identifier to assign.
    pub fn len(&self) -> usize {
        self.reverse.len()
    }

    /// Whether nothing has been indexed.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Dimension fixed by the first added vector, if any.
    pub fn dimension(&self) -> Option<usize> {
        self.store.as_ref().map(FlatL2::dimension)
    }

    /// Payload stored under `id`.
    pub fn payload(&self, id: u64) -> Option<&str> {
        usize::try_from(id)
            .ok()
            .and_then(|index| self.reverse.get(index))
    }
}
