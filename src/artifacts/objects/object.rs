//! Core object contract
//!
//! All objects share one byte layout:
//!
//! ```text
//! <type> <size>\0<payload>
//! ```
//!
//! Then compressed with zlib and stored in `.gitlet/objects/`. Objects are
//! immutable value types: `raw` and `uid` are computed once at construction
//! and never change afterwards.

use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use bytes::Bytes;
use std::path::PathBuf;

/// Common contract implemented by every object variant (Blob, Tree).
pub trait Object {
    /// Get the object's type tag
    fn object_type(&self) -> ObjectType;

    /// Pre-compression bytes: header plus payload
    fn raw(&self) -> &Bytes;

    /// The object's identifier, `SHA1(raw)`
    fn uid(&self) -> &ObjectId;

    /// Path of the object relative to the object store root
    fn object_path(&self) -> PathBuf {
        self.uid().to_path()
    }
}

/// Frame a payload with the `<type> <size>\0` header.
///
/// The size is the ASCII decimal byte length of the payload.
pub(crate) fn frame(object_type: ObjectType, payload: &[u8]) -> Bytes {
    let header = format!("{} {}\0", object_type.as_str(), payload.len());

    let mut raw = Vec::with_capacity(header.len() + payload.len());
    raw.extend_from_slice(header.as_bytes());
    raw.extend_from_slice(payload);

    Bytes::from(raw)
}
