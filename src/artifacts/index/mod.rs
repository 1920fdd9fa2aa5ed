//! Index file format
//!
//! The index persists the staging state between invocations. It is a
//! **binary** file with three parts:
//!
//! ```text
//! Header (20 bytes):
//!   - Signature: "GLET" (4 bytes)
//!   - Version: 1 (4 bytes)
//!   - Added / removed / tracked entry counts (4 bytes each)
//!
//! Sections (variable length):
//!   - added   : count x { path length (4) | path UTF-8 | 40 hex uid }
//!   - removed : count x { path length (4) | path UTF-8 }
//!   - tracked : count x { path length (4) | path UTF-8 | 40 hex uid }
//!
//! Checksum (20 bytes):
//!   - SHA-1 hash of all preceding bytes
//! ```
//!
//! Any deviation on load (wrong signature, unknown version, truncation, bad
//! checksum) makes the loader fall back to an empty index; the staging
//! state is purely derived and safe to rebuild.

pub mod checksum;

/// Size of SHA-1 checksum in bytes
pub const CHECKSUM_SIZE: usize = 20;

/// Size of index header in bytes
pub const HEADER_SIZE: usize = 20; // 4 for signature, 4 for version, 4 per section count

/// Magic signature identifying index files
pub const SIGNATURE: &str = "GLET";

/// Index file format version
pub const VERSION: u32 = 1;
