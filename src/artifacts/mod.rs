//! Data structures and formats
//!
//! This module contains the core types and byte layouts:
//!
//! - `index`: On-disk index format (signature, version, checksum framing)
//! - `objects`: Object types (blob, tree), identifiers, and framing

pub mod index;
pub mod objects;
