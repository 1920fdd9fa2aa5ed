//! Object database
//!
//! The database stores all objects (blobs, trees) using content-addressable
//! storage. Objects are identified by their SHA-1 hash and stored in a
//! directory structure based on the hash prefix for efficient lookup.
//!
//! ## Storage format
//!
//! - Path: `.gitlet/objects/ab/cdef123...` (first 2 chars as directory,
//!   rest as filename)
//! - Content: zlib-compressed raw bytes
//!
//! Objects are append-only: once a file exists under its identifier it is
//! never rewritten. Writes go to a temporary sibling first and appear under
//! the final name only at the rename step, so a concurrent reader can never
//! observe a partially written object.

use crate::artifacts::objects::object_id::ObjectId;
use crate::error::{GitletError, Result};
use bytes::Bytes;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Compress a byte sequence with zlib at the default level.
pub fn compress(data: &[u8]) -> Result<Bytes> {
    let mut encoder = flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::default());
    encoder.write_all(data)?;

    Ok(encoder.finish()?.into())
}

/// Decompress a zlib byte sequence.
///
/// Fails with [`GitletError::Format`] on malformed input.
pub fn decompress(data: &[u8]) -> Result<Bytes> {
    let mut decoder = flate2::read::ZlibDecoder::new(data);
    let mut decompressed = Vec::new();
    decoder
        .read_to_end(&mut decompressed)
        .map_err(|err| GitletError::Format(format!("zlib stream rejected: {err}")))?;

    Ok(decompressed.into())
}

/// Content-addressed object database
///
/// Manages storage and retrieval of immutable objects under the objects
/// directory.
#[derive(Debug)]
pub struct Database {
    /// Path to the objects directory (typically `.gitlet/objects`)
    path: Box<Path>,
}

impl Database {
    /// Create a new database instance
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the objects directory (typically `.gitlet/objects`)
    pub fn new(path: Box<Path>) -> Self {
        Database { path }
    }

    /// Get the path to the objects directory
    pub fn objects_path(&self) -> &Path {
        &self.path
    }

    /// Compute the storage path for an identifier
    ///
    /// Pure pathing; never touches the filesystem.
    pub fn object_path(&self, uid: &ObjectId) -> PathBuf {
        self.path.join(uid.to_path())
    }

    /// Store bytes under an identifier unless already present
    ///
    /// Creates the shard directory if missing, writes to a temporary sibling
    /// and renames it into place. If the filesystem rejects the rename the
    /// write falls back to a plain copy.
    pub fn write_if_absent(&self, uid: &ObjectId, bytes: &[u8]) -> Result<()> {
        let object_path = self.object_path(uid);
        if object_path.exists() {
            debug!(%uid, "object already present");
            return Ok(());
        }

        let object_dir = object_path
            .parent()
            .ok_or_else(|| GitletError::Format(format!("invalid object path for {uid}")))?;
        std::fs::create_dir_all(object_dir)?;

        let mut temp_object = tempfile::NamedTempFile::new_in(object_dir)?;
        temp_object.write_all(bytes)?;

        if let Err(persist_error) = temp_object.persist(&object_path) {
            // the rename step can be rejected by exotic filesystems; a
            // concurrent writer of the same uid may also have won the race
            if object_path.exists() {
                return Ok(());
            }
            std::fs::copy(persist_error.file.path(), &object_path)?;
        }

        debug!(%uid, "wrote object");
        Ok(())
    }

    /// Read the stored bytes for an identifier
    ///
    /// Fails with [`GitletError::NotFound`] if no object exists under `uid`.
    pub fn read(&self, uid: &ObjectId) -> Result<Bytes> {
        let object_path = self.object_path(uid);
        if !object_path.is_file() {
            return Err(GitletError::NotFound(uid.to_string()));
        }

        Ok(std::fs::read(&object_path)?.into())
    }
}
