//! Blob object
//!
//! Blobs snapshot one file's byte content. The working-tree basename is
//! carried only for display and tree construction; it is never hashed, so
//! identical content anywhere in the tree collapses to one object.
//!
//! ## Format
//!
//! On disk: `blob <size>\0<content>`, zlib-compressed.

use crate::areas::database::{Database, compress, decompress};
use crate::artifacts::objects::object::{Object, frame};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::error::{GitletError, Result};
use bytes::Bytes;
use std::path::Path;

/// Blob object representing file content
///
/// Immutable once built: `raw` is the framed content and `uid` its SHA-1.
/// Equality is equality of `uid`.
#[derive(Debug, Clone)]
pub struct Blob {
    /// Working-tree basename; `None` when read back from the object store
    name: Option<String>,
    /// Header plus content, before compression
    raw: Bytes,
    /// SHA-1 of `raw`
    uid: ObjectId,
}

impl Blob {
    /// Snapshot a working-tree file into a blob
    ///
    /// Fails with [`GitletError::NotReadable`] if the path is missing, not a
    /// regular file, or unreadable.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = read_regular_file(path)?;
        let raw = frame(ObjectType::Blob, &content);
        let uid = ObjectId::digest([&raw]);
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned());

        Ok(Blob { name, raw, uid })
    }

    /// Compute the identifier a file's blob would have, persisting nothing
    pub fn compute_uid(path: &Path) -> Result<ObjectId> {
        let content = read_regular_file(path)?;
        let raw = frame(ObjectType::Blob, &content);

        Ok(ObjectId::digest([&raw]))
    }

    /// Write this blob into the object store if absent
    ///
    /// The raw bytes are compressed once. Re-persisting an already stored
    /// blob is a no-op.
    pub fn persist(&self, database: &Database) -> Result<&ObjectId> {
        let compressed = compress(&self.raw)?;
        database.write_if_absent(&self.uid, &compressed)?;

        Ok(&self.uid)
    }

    /// Read a blob back from the object store
    ///
    /// Verifies the header framing, the declared content length, and the
    /// SHA-1 of the raw bytes against `uid`; any mismatch fails with
    /// [`GitletError::Corrupt`]. The returned blob has no `name`.
    pub fn read(database: &Database, uid: &ObjectId) -> Result<Self> {
        let stored = database.read(uid)?;
        let raw = decompress(&stored).map_err(|err| corrupt(uid, err.to_string()))?;

        let (declared_size, content_offset) =
            parse_header(&raw).map_err(|reason| corrupt(uid, reason))?;
        let content_len = raw.len() - content_offset;
        if declared_size != content_len {
            return Err(corrupt(
                uid,
                format!("size mismatch, header says {declared_size}, content is {content_len}"),
            ));
        }

        let actual = ObjectId::digest([&raw]);
        if actual != *uid {
            return Err(corrupt(uid, format!("sha1 mismatch, computed {actual}")));
        }

        Ok(Blob {
            name: None,
            raw,
            uid: uid.clone(),
        })
    }

    /// Working-tree basename, when known
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Content bytes, without the header
    pub fn content(&self) -> &[u8] {
        match self.raw.iter().position(|&byte| byte == 0) {
            Some(nul) => &self.raw[nul + 1..],
            None => &[],
        }
    }

    /// Content byte length
    pub fn size(&self) -> usize {
        self.content().len()
    }
}

impl Object for Blob {
    fn object_type(&self) -> ObjectType {
        ObjectType::Blob
    }

    fn raw(&self) -> &Bytes {
        &self.raw
    }

    fn uid(&self) -> &ObjectId {
        &self.uid
    }
}

impl PartialEq for Blob {
    fn eq(&self, other: &Self) -> bool {
        self.uid == other.uid
    }
}

impl Eq for Blob {}

fn corrupt(uid: &ObjectId, reason: String) -> GitletError {
    GitletError::Corrupt {
        uid: uid.to_string(),
        reason,
    }
}

/// Read a file's bytes, mapping every failure mode to `NotReadable`.
fn read_regular_file(path: &Path) -> Result<Bytes> {
    let metadata =
        std::fs::metadata(path).map_err(|_| GitletError::NotReadable(path.to_path_buf()))?;
    if !metadata.is_file() {
        return Err(GitletError::NotReadable(path.to_path_buf()));
    }

    std::fs::read(path)
        .map(Bytes::from)
        .map_err(|_| GitletError::NotReadable(path.to_path_buf()))
}

/// Scan for the first NUL and parse the `blob <size>` prefix.
///
/// Returns the declared content size and the offset where content starts.
fn parse_header(raw: &[u8]) -> std::result::Result<(usize, usize), String> {
    let nul = raw
        .iter()
        .position(|&byte| byte == 0)
        .ok_or_else(|| String::from("missing NUL header terminator"))?;

    let header = &raw[..nul];
    let size_bytes = header
        .strip_prefix(b"blob ")
        .ok_or_else(|| format!("invalid header: {}", String::from_utf8_lossy(header)))?;

    if size_bytes.is_empty() || !size_bytes.iter().all(|byte| byte.is_ascii_digit()) {
        return Err(format!(
            "invalid size in header: {}",
            String::from_utf8_lossy(size_bytes)
        ));
    }

    let declared_size = std::str::from_utf8(size_bytes)
        .ok()
        .and_then(|size| size.parse::<usize>().ok())
        .ok_or_else(|| {
            format!(
                "invalid size in header: {}",
                String::from_utf8_lossy(size_bytes)
            )
        })?;

    Ok((declared_size, nul + 1))
}
