//! Staging area (index)
//!
//! The index is the bookkeeping structure between the working tree and the
//! next tree build. It owns three collections keyed by canonicalized
//! absolute path strings:
//!
//! - `added`: staged additions/modifications, path -> blob uid
//! - `removed`: staged deletions
//! - `tracked`: HEAD snapshot supplied by an external commit layer
//!
//! The path is the key, never the content; content identity is the blob
//! uid. `add` always cancels a pending deletion of the same path, and
//! staging a file whose content equals HEAD unstages it instead. The index
//! is rewritten after every state-changing operation, always after
//! validation and any blob writes have succeeded.
//!
//! ## Persistence
//!
//! Serialized to `.gitlet/index` in the checksummed binary format described
//! in [`crate::artifacts::index`]. Loading acquires a shared lock, saving
//! an exclusive one; multi-process coordination beyond that is the caller's
//! problem.

use crate::areas::database::Database;
use crate::areas::workspace::Workspace;
use crate::artifacts::index::checksum::Checksum;
use crate::artifacts::index::{HEADER_SIZE, SIGNATURE, VERSION};
use crate::artifacts::objects::OBJECT_ID_LENGTH;
use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::object_id::ObjectId;
use crate::error::{GitletError, Result};
use byteorder::{BigEndian, ByteOrder, WriteBytesExt};
use std::collections::{BTreeMap, BTreeSet};
use std::io::{Read, Write};
use std::path::Path;
use tracing::{debug, warn};

/// Staging area tracking pending additions, pending deletions, and the
/// HEAD snapshot
#[derive(Debug)]
pub struct Index {
    /// Path to the index file (typically `.gitlet/index`)
    path: Box<Path>,
    /// Staged additions/modifications: canonical path -> blob uid
    added: BTreeMap<String, ObjectId>,
    /// Staged deletions: canonical paths
    removed: BTreeSet<String>,
    /// HEAD snapshot: canonical path -> blob uid
    tracked: BTreeMap<String, ObjectId>,
}

impl Index {
    /// Create a new empty index
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the index file (typically `.gitlet/index`)
    pub fn new(path: Box<Path>) -> Self {
        Index {
            path,
            added: BTreeMap::new(),
            removed: BTreeSet::new(),
            tracked: BTreeMap::new(),
        }
    }

    /// Load the index from disk, falling back to an empty index
    ///
    /// A missing file yields a fresh empty index. A file that fails to
    /// deserialize for any reason (signature, version, truncation, bad
    /// checksum) also yields an empty index, with a warning; the file is
    /// left on disk untouched until the next save.
    pub fn load_or_create(path: Box<Path>) -> Self {
        let mut index = Self::new(path);
        if !index.path.exists() {
            return index;
        }

        if let Err(err) = index.rehydrate() {
            warn!(
                path = %index.path.display(),
                error = %err,
                "index file unreadable, falling back to an empty index"
            );
            return Self::new(index.path);
        }

        index
    }

    /// Get the path to the index file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stage a file addition or modification
    ///
    /// - Cancels any pending deletion of the same path.
    /// - If the content equals the HEAD version, unstages the path instead
    ///   and writes no blob.
    /// - Otherwise persists a blob for the current content and stages
    ///   `path -> uid`.
    ///
    /// Fails with [`GitletError::NotReadable`] when `file` is missing, not
    /// a regular file, or unreadable; nothing is persisted in that case.
    pub fn add(&mut self, workspace: &Workspace, database: &Database, file: &Path) -> Result<()> {
        let absolute = workspace.resolve(file);
        let path = workspace.canonicalize(file);
        let new_uid = Blob::compute_uid(&absolute)?;

        // a pending deletion of the same path is always cancelled
        self.removed.remove(&path);

        if self.tracked.get(&path) == Some(&new_uid) {
            // content equals HEAD: nothing to stage, no blob to write
            self.added.remove(&path);
            return self.save();
        }

        let blob = Blob::from_file(&absolute)?;
        blob.persist(database)?;
        debug!(%path, uid = %new_uid, "staged addition");
        self.added.insert(path, new_uid);

        self.save()
    }

    /// Stage a file deletion, optionally deleting the working-tree file
    ///
    /// - Fails with [`GitletError::PathspecNoMatch`] when the path is
    ///   neither tracked nor staged for addition.
    /// - Fails with [`GitletError::HasLocalModifications`] when the path is
    ///   tracked, present, modified against HEAD, and `force` is false.
    ///   This check runs before any mutation.
    /// - Unstages a pending addition; stages a deletion for tracked paths
    ///   even when the working-tree file is already gone.
    /// - Unless `cached`, deletes the working-tree file (recursively for
    ///   directories, and never outside the repository root).
    pub fn remove(
        &mut self,
        workspace: &Workspace,
        file: &Path,
        force: bool,
        cached: bool,
    ) -> Result<()> {
        let absolute = workspace.resolve(file);
        let path = workspace.canonicalize(file);
        let exists = absolute.exists();

        let is_tracked = self.tracked.contains_key(&path);
        let is_staged_add = self.added.contains_key(&path);

        if !is_tracked && !is_staged_add {
            return Err(GitletError::PathspecNoMatch(basename(file)));
        }

        if is_tracked && exists && !force && self.modified_against_head(&absolute, &path)? {
            return Err(GitletError::HasLocalModifications(basename(file)));
        }

        if is_staged_add {
            self.added.remove(&path);
        }

        // tracked paths stage a deletion even when the file is already gone
        if is_tracked {
            debug!(%path, "staged deletion");
            self.removed.insert(path);
        }

        if !cached && exists {
            workspace.delete(file)?;
        }

        self.save()
    }

    /// Empty both staging collections, leaving `tracked` alone
    ///
    /// Called after a successful commit by an external collaborator.
    pub fn clean_stage_area(&mut self) -> Result<()> {
        self.added.clear();
        self.removed.clear();

        self.save()
    }

    /// Replace the HEAD snapshot wholesale
    ///
    /// Keys are canonicalized on the way in, so upstream sloppiness about
    /// path presentation cannot split one file across two keys.
    pub fn apply_head_snapshot<I>(&mut self, workspace: &Workspace, new_tracked: I) -> Result<()>
    where
        I: IntoIterator<Item = (String, ObjectId)>,
    {
        self.tracked.clear();
        for (path, uid) in new_tracked {
            self.tracked
                .insert(workspace.canonicalize(Path::new(&path)), uid);
        }

        self.save()
    }

    /// Staged additions, read-only
    pub fn added(&self) -> &BTreeMap<String, ObjectId> {
        &self.added
    }

    /// Staged deletions, read-only
    pub fn removed(&self) -> &BTreeSet<String> {
        &self.removed
    }

    /// HEAD snapshot, read-only
    pub fn tracked(&self) -> &BTreeMap<String, ObjectId> {
        &self.tracked
    }

    /// Serialize the index to its file
    ///
    /// Acquires an exclusive lock for the duration of the write.
    pub fn save(&self) -> Result<()> {
        let mut index_file = std::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(self.path())?;
        let mut lock = file_guard::lock(&mut index_file, file_guard::Lock::Exclusive, 0, 1)?;

        let mut writer = Checksum::new(&mut *lock);

        let mut header = Vec::with_capacity(HEADER_SIZE);
        header.extend_from_slice(SIGNATURE.as_bytes());
        header.write_u32::<BigEndian>(VERSION)?;
        header.write_u32::<BigEndian>(self.added.len() as u32)?;
        header.write_u32::<BigEndian>(self.removed.len() as u32)?;
        header.write_u32::<BigEndian>(self.tracked.len() as u32)?;
        writer.write(&header)?;

        for (path, uid) in &self.added {
            write_keyed_entry(&mut writer, path, uid)?;
        }
        for path in &self.removed {
            write_path(&mut writer, path)?;
        }
        for (path, uid) in &self.tracked {
            write_keyed_entry(&mut writer, path, uid)?;
        }

        writer.write_checksum()
    }

    /// Parse the index file into this instance
    ///
    /// Acquires a shared lock during reading. An empty file is a valid
    /// empty index.
    fn rehydrate(&mut self) -> Result<()> {
        let mut index_file = std::fs::OpenOptions::new().read(true).open(self.path())?;
        let mut lock = file_guard::lock(&mut index_file, file_guard::Lock::Shared, 0, 1)?;

        if lock.metadata()?.len() == 0 {
            return Ok(());
        }

        let mut reader = Checksum::new(&mut *lock);

        let header = reader.read(HEADER_SIZE)?;
        if &header[..4] != SIGNATURE.as_bytes() {
            return Err(GitletError::Format(String::from(
                "invalid index file signature",
            )));
        }
        let version = BigEndian::read_u32(&header[4..8]);
        if version != VERSION {
            return Err(GitletError::Format(format!(
                "unsupported index file version: {version}"
            )));
        }
        let added_count = BigEndian::read_u32(&header[8..12]);
        let removed_count = BigEndian::read_u32(&header[12..16]);
        let tracked_count = BigEndian::read_u32(&header[16..20]);

        for _ in 0..added_count {
            let (path, uid) = read_keyed_entry(&mut reader)?;
            self.added.insert(path, uid);
        }
        for _ in 0..removed_count {
            self.removed.insert(read_path(&mut reader)?);
        }
        for _ in 0..tracked_count {
            let (path, uid) = read_keyed_entry(&mut reader)?;
            self.tracked.insert(path, uid);
        }

        reader.verify()
    }

    /// Compare working-tree content against the HEAD snapshot.
    fn modified_against_head(&self, absolute: &Path, path: &str) -> Result<bool> {
        match self.tracked.get(path) {
            None => Ok(false),
            Some(head_uid) => Ok(Blob::compute_uid(absolute)? != *head_uid),
        }
    }
}

fn basename(file: &Path) -> String {
    file.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| file.to_string_lossy().into_owned())
}

fn write_path<W: Write>(writer: &mut Checksum<W>, path: &str) -> Result<()> {
    let mut entry = Vec::with_capacity(4 + path.len());
    entry.write_u32::<BigEndian>(path.len() as u32)?;
    entry.extend_from_slice(path.as_bytes());

    writer.write(&entry)
}

fn write_keyed_entry<W: Write>(writer: &mut Checksum<W>, path: &str, uid: &ObjectId) -> Result<()> {
    write_path(writer, path)?;
    writer.write(uid.as_ref().as_bytes())
}

fn read_path<R: Read>(reader: &mut Checksum<R>) -> Result<String> {
    let length_bytes = reader.read(4)?;
    let length = BigEndian::read_u32(&length_bytes) as usize;
    let path_bytes = reader.read(length)?;

    String::from_utf8(path_bytes.to_vec())
        .map_err(|err| GitletError::Format(format!("invalid path in index: {err}")))
}

fn read_keyed_entry<R: Read>(reader: &mut Checksum<R>) -> Result<(String, ObjectId)> {
    let path = read_path(reader)?;
    let uid_bytes = reader.read(OBJECT_ID_LENGTH)?;
    let uid = String::from_utf8(uid_bytes.to_vec())
        .map_err(|err| GitletError::Format(format!("invalid uid in index: {err}")))?;

    Ok((path, ObjectId::try_parse(uid)?))
}
