//! On-disk format of a persisted index.

use bincode::config::standard as bincode_config;
use bincode::{Decode, Encode, decode_from_slice, encode_to_vec};
use std::fs::{self, File};
use std::io::Write as _;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use super::flat::FlatL2;
use super::reverse_map::ReverseMap;
use erudito_core::{Error, Result};

/// File holding the vector rows.
pub const INDEX_FILE: &str = "index.bin";
/// File holding the identifier to payload map.
pub const REVERSE_INDEX_FILE: &str = "reverse_index.bin";

/// Format version shared by both artifacts
const FORMAT_VERSION: u32 = 1;

/// Suffix of an artifact written but not yet moved into place
const PENDING_SUFFIX: &str = ".pending";

/// Serialized vector store
#[derive(Debug, Encode, Decode)]
struct VectorArtifact {
    /// Version identifier for format changes
    version: u32,
    /// Length of every row
    dimension: u64,
    /// Row-major vectors, row `n` is identifier `n`
    vectors: Vec<f32>,
}

/// Serialized reverse map
#[derive(Debug, Encode, Decode)]
struct ReverseArtifact {
    /// Version identifier for format changes
    version: u32,
    /// Payloads in identifier order
    payloads: Vec<String>,
}

/// Write both artifacts into `directory`, creating it when absent.
///
/// Both artifacts are first written next to their final names and synced.
/// Moving the vector file into place commits the save; the reverse map follows.
/// A save cut short before the commit leaves the previous index untouched, and
/// one cut short after it is completed by the next [`read`] or [`write`].
///
/// # Errors
/// Returns an error if the directory cannot be created or an artifact cannot be written
pub fn write(directory: &Path, store: &FlatL2, reverse: &ReverseMap) -> Result<()> {
    fs::create_dir_all(directory).map_err(|error| {
        Error::Persistence(format!(
            "Failed to create index directory {}: {error}",
            directory.display()
        ))
    })?;
    recover(directory)?;

    let (vector_bytes, payload_bytes) = stage(directory, store, reverse)?;
    commit(directory)?;

    info!(
        "  ✓ Saved {} vectors to {} ({vector_bytes} + {payload_bytes} bytes)",
        store.len(),
        directory.display()
    );
    Ok(())
}

/// Encode both artifacts into their pending files, returning their sizes
fn stage(directory: &Path, store: &FlatL2, reverse: &ReverseMap) -> Result<(usize, usize)> {
    let vectors = VectorArtifact {
        version: FORMAT_VERSION,
        dimension: store.dimension() as u64,
        vectors: store.as_slice().to_vec(),
    };
    let vector_bytes = encode_to_vec(&vectors, bincode_config())
        .map_err(|error| Error::Persistence(format!("Failed to serialize index: {error}")))?;

    let payloads = ReverseArtifact {
        version: FORMAT_VERSION,
        payloads: reverse.payloads().to_vec(),
    };
    let payload_bytes = encode_to_vec(&payloads, bincode_config()).map_err(|error| {
        Error::Persistence(format!("Failed to serialize reverse index: {error}"))
    })?;

    write_synced(&pending(directory, INDEX_FILE), &vector_bytes)?;
    write_synced(&pending(directory, REVERSE_INDEX_FILE), &payload_bytes)?;
    Ok((vector_bytes.len(), payload_bytes.len()))
}

/// Move both pending files into place, vector file first
fn commit(directory: &Path) -> Result<()> {
    promote(directory, INDEX_FILE)?;
    promote(directory, REVERSE_INDEX_FILE)?;
    sync_directory(directory)
}

/// Finish or discard a save that was cut short.
///
/// A pending vector file means the commit never happened, so both pending
/// files are dropped. A lone pending reverse map belongs to a committed save
/// and is moved into place.
fn recover(directory: &Path) -> Result<()> {
    let index_pending = pending(directory, INDEX_FILE);
    let reverse_pending = pending(directory, REVERSE_INDEX_FILE);

    if index_pending.exists() {
        warn!("Discarding an unfinished save in {}", directory.display());
        remove_if_present(&index_pending)?;
        remove_if_present(&reverse_pending)?;
    } else if reverse_pending.exists() {
        warn!("Completing an interrupted save in {}", directory.display());
        promote(directory, REVERSE_INDEX_FILE)?;
        sync_directory(directory)?;
    }
    Ok(())
}

/// Read both artifacts from `directory`.
///
/// # Errors
/// Returns [`Error::NotFound`] if either artifact is missing and
/// [`Error::CorruptIndex`] if they cannot be decoded or disagree on the entry count
pub fn read(directory: &Path) -> Result<(FlatL2, ReverseMap)> {
    if directory.is_dir() {
        recover(directory)?;
    }
    let index_file = directory.join(INDEX_FILE);
    let reverse_file = directory.join(REVERSE_INDEX_FILE);

    if !index_file.is_file() {
        return Err(Error::NotFound(format!(
            "No index found in {}",
            index_file.display()
        )));
    }
    if !reverse_file.is_file() {
        return Err(Error::NotFound(format!(
            "No reverse index found in {}",
            reverse_file.display()
        )));
    }

    let vectors: VectorArtifact = decode_file(&index_file)?;
    let payloads: ReverseArtifact = decode_file(&reverse_file)?;

    if vectors.version != FORMAT_VERSION || payloads.version != FORMAT_VERSION {
        return Err(Error::CorruptIndex(format!(
            "Unsupported index format in {} (index v{}, reverse index v{}, expected v{FORMAT_VERSION})",
            directory.display(),
            vectors.version,
            payloads.version
        )));
    }

    let dimension = usize::try_from(vectors.dimension)
        .map_err(|error| Error::CorruptIndex(format!("Invalid dimension: {error}")))?;
    let store = FlatL2::from_rows(dimension, vectors.vectors).ok_or_else(|| {
        Error::CorruptIndex(format!(
            "Vector data in {} does not match dimension {dimension}",
            index_file.display()
        ))
    })?;

    if store.len() != payloads.payloads.len() {
        return Err(Error::CorruptIndex(format!(
            "{} holds {} vectors but {} holds {} payloads",
            index_file.display(),
            store.len(),
            reverse_file.display(),
            payloads.payloads.len()
        )));
    }

    Ok((store, ReverseMap::from_payloads(payloads.payloads)))
}

/// Whether `directory` holds at least one index artifact.
pub fn any_artifact(directory: &Path) -> bool {
    directory.join(INDEX_FILE).exists() || directory.join(REVERSE_INDEX_FILE).exists()
}

/// Decode one artifact
fn decode_file<T: Decode<()>>(path: &Path) -> Result<T> {
    let data = fs::read(path)?;
    decode_from_slice(&data, bincode_config())
        .map(|(value, _)| value)
        .map_err(|error| {
            Error::CorruptIndex(format!("Failed to deserialize {}: {error}", path.display()))
        })
}

/// Pending path of the artifact `name`
fn pending(directory: &Path, name: &str) -> PathBuf {
    directory.join(format!(".{name}{PENDING_SUFFIX}"))
}

/// Write `data` to `path` and flush it to disk
fn write_synced(path: &Path, data: &[u8]) -> Result<()> {
    File::create(path)
        .and_then(|mut file| {
            file.write_all(data)?;
            file.sync_all()
        })
        .map_err(|error| {
            Error::Persistence(format!("Failed to write {}: {error}", path.display()))
        })
}

/// Replace the artifact `name` with its pending file
fn promote(directory: &Path, name: &str) -> Result<()> {
    let source = pending(directory, name);
    let target = directory.join(name);
    fs::rename(&source, &target).map_err(|error| {
        Error::Persistence(format!(
            "Failed to move {} into place: {error}",
            target.display()
        ))
    })
}

fn remove_if_present(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(error) => Err(Error::Persistence(format!(
            "Failed to remove {}: {error}",
            path.display()
        ))),
    }
}

/// Make the renames in `directory` durable
#[cfg(unix)]
fn sync_directory(directory: &Path) -> Result<()> {
    File::open(directory)
        .and_then(|handle| handle.sync_all())
        .map_err(|error| {
            Error::Persistence(format!("Failed to sync {}: {error}", directory.display()))
        })
}

#[cfg(not(unix))]
fn sync_directory(_directory: &Path) -> Result<()> {
    Ok(())
}
