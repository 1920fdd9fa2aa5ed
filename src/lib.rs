//! Content-addressed object store and staging engine
//!
//! The data plane of a git-compatible version control system: file bytes
//! become canonical, hash-named, compressed objects; an index tracks what
//! the next commit should contain; a tree builder materializes directory
//! snapshots with deterministic identifiers.
//!
//! ## Usage
//!
//! ```ignore
//! let repository = Repository::new(Path::new("."))?;
//! repository.init()?;
//!
//! let mut index = repository.load_index();
//! index.add(repository.workspace(), repository.database(), Path::new("a.txt"))?;
//!
//! let root = Tree::build(&index, repository.workspace(), repository.database())?;
//! println!("{}", root.uid());
//! ```
//!
//! The command-line front-end, the commit/branch workflow, and network
//! transports are external collaborators; this crate stops at blobs, trees,
//! and the index.

pub mod areas;
pub mod artifacts;
pub mod error;

pub use crate::error::{GitletError, Result};
