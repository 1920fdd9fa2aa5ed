//! Checksummed index I/O
//!
//! Wraps a reader or writer and folds every byte that passes through into a
//! running SHA-1. The digest is written as a 20-byte trailer on save and
//! verified against the trailer on load, so torn or hand-edited index files
//! are detected before any entry is trusted.

use crate::artifacts::index::CHECKSUM_SIZE;
use crate::error::{GitletError, Result};
use bytes::Bytes;
use sha1::{Digest, Sha1};
use std::io::{Read, Write};

pub struct Checksum<T> {
    inner: T,
    hasher: Sha1,
}

impl<T> Checksum<T> {
    pub fn new(inner: T) -> Self {
        Checksum {
            inner,
            hasher: Sha1::new(),
        }
    }
}

impl<T: Read> Checksum<T> {
    /// Read exactly `size` bytes, folding them into the running digest
    pub fn read(&mut self, size: usize) -> Result<Bytes> {
        let mut buffer = vec![0u8; size];
        self.inner
            .read_exact(&mut buffer)
            .map_err(|err| GitletError::Format(format!("index file truncated: {err}")))?;
        self.hasher.update(&buffer);

        Ok(buffer.into())
    }

    /// Consume the reader and compare the digest against the trailer
    pub fn verify(mut self) -> Result<()> {
        let mut trailer = [0u8; CHECKSUM_SIZE];
        self.inner
            .read_exact(&mut trailer)
            .map_err(|err| GitletError::Format(format!("index checksum missing: {err}")))?;

        let actual = self.hasher.finalize();
        if actual.as_slice() != trailer.as_slice() {
            return Err(GitletError::Format(String::from(
                "index checksum mismatch",
            )));
        }

        Ok(())
    }
}

impl<T: Write> Checksum<T> {
    /// Write bytes, folding them into the running digest
    pub fn write(&mut self, bytes: &[u8]) -> Result<()> {
        self.inner.write_all(bytes)?;
        self.hasher.update(bytes);

        Ok(())
    }

    /// Consume the writer, appending the digest as the trailer
    pub fn write_checksum(mut self) -> Result<()> {
        let digest = self.hasher.finalize();
        self.inner.write_all(digest.as_slice())?;
        self.inner.flush()?;

        Ok(())
    }
}
