//! Repository layout and initialization
//!
//! The repository root contains a `.gitlet/` metadata directory:
//!
//! ```text
//! .gitlet/
//! ├── HEAD           ref: refs/heads/<name>
//! ├── index          serialized staging state
//! ├── objects/       content-addressed object store
//! ├── refs/
//! │   ├── heads/     reserved for branch refs
//! │   └── remotes/   reserved for remote refs
//! └── logs/          reserved
//! ```
//!
//! The core only ever reads `HEAD`; branch and ref updates belong to an
//! external commit layer. `Repository` is the composition root wiring the
//! working directory, the object database, and the index paths together.
//! The repository root is explicit state here, never a process-wide global.

use crate::areas::database::Database;
use crate::areas::index::Index;
use crate::areas::workspace::Workspace;
use crate::error::Result;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Metadata directory name
const GITLET_DIR: &str = ".gitlet";

/// Object database directory name
const OBJECTS_DIR: &str = "objects";

/// Index file name
const INDEX_FILE: &str = "index";

/// HEAD pointer file name
const HEAD_FILE: &str = "HEAD";

/// Branch refs directory, reserved for the commit layer
const HEADS_DIR: &str = "refs/heads";

/// Remote refs directory, reserved
const REMOTES_DIR: &str = "refs/remotes";

/// Logs directory, reserved
const LOGS_DIR: &str = "logs";

/// Branch HEAD points at after init
const DEFAULT_BRANCH: &str = "main";

/// Repository facade over one working directory
pub struct Repository {
    /// Repository root path, symlink-resolved
    path: Box<Path>,
    /// Object database under `.gitlet/objects`
    database: Database,
    /// Working directory operations
    workspace: Workspace,
}

impl Repository {
    /// Open a repository rooted at an existing directory
    pub fn new(path: &Path) -> Result<Self> {
        let path = std::fs::canonicalize(path)?;

        let database = Database::new(path.join(GITLET_DIR).join(OBJECTS_DIR).into_boxed_path());
        let workspace = Workspace::new(path.clone().into_boxed_path());

        Ok(Repository {
            path: path.into_boxed_path(),
            database,
            workspace,
        })
    }

    /// Create the `.gitlet/` skeleton and an empty index
    ///
    /// Directories are created recursively. `HEAD` and `index` are only
    /// written when absent, so re-initialization never clobbers existing
    /// state; callers wanting a hard error on re-init should check
    /// [`Repository::is_initialized`] first.
    pub fn init(&self) -> Result<()> {
        for dir in [
            self.database.objects_path().to_path_buf(),
            self.gitlet_path().join(HEADS_DIR),
            self.gitlet_path().join(REMOTES_DIR),
            self.gitlet_path().join(LOGS_DIR),
        ] {
            std::fs::create_dir_all(dir)?;
        }

        if !self.head_path().exists() {
            std::fs::write(
                self.head_path(),
                format!("ref: refs/heads/{DEFAULT_BRANCH}\n"),
            )?;
        }
        if !self.index_path().exists() {
            Index::new(self.index_path().into_boxed_path()).save()?;
        }

        debug!(path = %self.path.display(), "initialized repository");
        Ok(())
    }

    /// Whether a `.gitlet/` directory exists under the root
    pub fn is_initialized(&self) -> bool {
        self.gitlet_path().is_dir()
    }

    /// Branch name HEAD currently points at
    ///
    /// Returns `None` when HEAD is absent or not a branch ref. The core
    /// never writes HEAD outside [`Repository::init`].
    pub fn head_ref(&self) -> Result<Option<String>> {
        if !self.head_path().exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(self.head_path())?;
        Ok(content
            .strip_prefix("ref: refs/heads/")
            .map(|name| name.trim_end().to_string()))
    }

    /// Load the index from disk, or create an empty one
    pub fn load_index(&self) -> Index {
        Index::load_or_create(self.index_path().into_boxed_path())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn gitlet_path(&self) -> PathBuf {
        self.path.join(GITLET_DIR)
    }

    pub fn index_path(&self) -> PathBuf {
        self.gitlet_path().join(INDEX_FILE)
    }

    pub fn head_path(&self) -> PathBuf {
        self.gitlet_path().join(HEAD_FILE)
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }
}
