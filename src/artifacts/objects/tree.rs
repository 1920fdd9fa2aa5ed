//! Tree object
//!
//! Trees are ordered directory snapshots. Each entry references a blob or a
//! nested tree by name and identifier.
//!
//! ## Format
//!
//! On disk: `tree <size>\0<entries>`, zlib-compressed.
//! Each entry: `<mode> <name>\0<40-hex-ascii-sha1>`
//!
//! The child identifier is stored as 40 ASCII hex bytes, not the 20 raw
//! bytes canonical Git uses. This framing is normative here: the store
//! shares Git's empty-tree identifier but is not interoperable with Git
//! tooling.
//!
//! ## Tree building
//!
//! [`Tree::build`] materializes the whole object graph from the index's
//! effective working-set (`tracked − removed + added`). Entries are sorted
//! byte-wise by name before encoding, so the same logical content always
//! yields the same root identifier no matter in which order it was staged.

use crate::areas::database::{Database, compress};
use crate::areas::index::Index;
use crate::areas::workspace::Workspace;
use crate::artifacts::objects::object::{Object, frame};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::error::Result;
use bytes::Bytes;
use derive_new::new;
use std::collections::BTreeMap;

/// Identifier of the tree with zero entries, shared with Git.
pub const EMPTY_TREE_UID: &str = "4b825dc642cb6eb9a060e54bf8d69288fbee4904";

/// Mode tag of a tree entry. Exactly two modes exist in this store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryMode {
    /// A file entry, mode `100644`
    Blob,
    /// A subtree entry, mode `040000`
    Directory,
}

impl EntryMode {
    pub fn as_str(&self) -> &str {
        match self {
            EntryMode::Blob => "100644",
            EntryMode::Directory => "040000",
        }
    }
}

/// Single entry of a tree: mode, name, and the child's identifier
#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct TreeEntry {
    mode: EntryMode,
    name: String,
    oid: ObjectId,
}

impl TreeEntry {
    pub fn mode(&self) -> EntryMode {
        self.mode
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn oid(&self) -> &ObjectId {
        &self.oid
    }
}

/// Tree object representing one directory level
///
/// Immutable once built. `name` is the directory name, empty for the root.
#[derive(Debug, Clone)]
pub struct Tree {
    name: String,
    entries: Vec<TreeEntry>,
    raw: Bytes,
    uid: ObjectId,
}

impl Tree {
    /// Build and persist the tree object graph for the index's effective
    /// working-set
    ///
    /// The working-set is `tracked − removed + added`, every key remapped
    /// from its canonical absolute form to a repository-relative path with
    /// `/` separators. Children are persisted before their parents, so once
    /// this returns every identifier the root transitively references is
    /// durable.
    ///
    /// An empty working-set produces a tree with zero entries and the
    /// well-known identifier [`EMPTY_TREE_UID`].
    pub fn build(index: &Index, workspace: &Workspace, database: &Database) -> Result<Self> {
        let mut working_set: BTreeMap<String, ObjectId> = BTreeMap::new();

        for (path, uid) in index.tracked() {
            working_set.insert(workspace.rel_path(path), uid.clone());
        }
        for path in index.removed() {
            working_set.remove(&workspace.rel_path(path));
        }
        for (path, uid) in index.added() {
            working_set.insert(workspace.rel_path(path), uid.clone());
        }

        Self::build_level(working_set, String::new(), database)
    }

    /// Build one directory level and recurse into its subdirectories.
    ///
    /// Keys with no `/` are blob entries at this level; the rest are grouped
    /// by first segment into subdirectory maps.
    fn build_level(
        files: BTreeMap<String, ObjectId>,
        name: String,
        database: &Database,
    ) -> Result<Self> {
        let mut blobs_here: BTreeMap<String, ObjectId> = BTreeMap::new();
        let mut by_dir: BTreeMap<String, BTreeMap<String, ObjectId>> = BTreeMap::new();

        for (rel_path, uid) in files {
            match rel_path.split_once('/') {
                None => {
                    blobs_here.insert(rel_path, uid);
                }
                Some((dir, rest)) => {
                    by_dir
                        .entry(dir.to_string())
                        .or_default()
                        .insert(rest.to_string(), uid);
                }
            }
        }

        let mut entries = Vec::with_capacity(blobs_here.len() + by_dir.len());
        for (file_name, oid) in blobs_here {
            entries.push(TreeEntry::new(EntryMode::Blob, file_name, oid));
        }
        for (dir_name, children) in by_dir {
            let child = Self::build_level(children, dir_name.clone(), database)?;
            entries.push(TreeEntry::new(
                EntryMode::Directory,
                dir_name,
                child.uid.clone(),
            ));
        }

        // blob and directory entries interleave in name order
        entries.sort_by(|a, b| a.name.as_bytes().cmp(b.name.as_bytes()));

        let raw = encode(&entries);
        let uid = ObjectId::digest([&raw]);
        database.write_if_absent(&uid, &compress(&raw)?)?;

        Ok(Tree {
            name,
            entries,
            raw,
            uid,
        })
    }

    /// Directory name; empty for the root tree
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Entries in byte-wise name order
    pub fn entries(&self) -> &[TreeEntry] {
        &self.entries
    }
}

impl Object for Tree {
    fn object_type(&self) -> ObjectType {
        ObjectType::Tree
    }

    fn raw(&self) -> &Bytes {
        &self.raw
    }

    fn uid(&self) -> &ObjectId {
        &self.uid
    }
}

impl PartialEq for Tree {
    fn eq(&self, other: &Self) -> bool {
        self.uid == other.uid
    }
}

impl Eq for Tree {}

/// Encode sorted entries into the framed tree byte layout.
fn encode(entries: &[TreeEntry]) -> Bytes {
    let mut payload = Vec::new();
    for entry in entries {
        payload.extend_from_slice(entry.mode.as_str().as_bytes());
        payload.push(b' ');
        payload.extend_from_slice(entry.name.as_bytes());
        payload.push(0);
        payload.extend_from_slice(entry.oid.as_ref().as_bytes());
    }

    frame(ObjectType::Tree, &payload)
}
