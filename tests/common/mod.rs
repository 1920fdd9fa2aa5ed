#![allow(dead_code)]

use assert_fs::TempDir;
use gitlet::areas::database::decompress;
use gitlet::areas::repository::Repository;
use gitlet::artifacts::objects::object_id::ObjectId;

/// Open and initialize a repository rooted at the given temp dir.
pub fn init_repository(dir: &TempDir) -> Result<Repository, Box<dyn std::error::Error>> {
    let repository = Repository::new(dir.path())?;
    repository.init()?;

    Ok(repository)
}

/// Parsed tree entry: (mode, name, 40-hex sha)
pub type RawTreeEntry = (String, String, String);

/// Read an object's raw (decompressed) bytes straight out of the store.
pub fn read_raw_object(
    repository: &Repository,
    uid: &ObjectId,
) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
    let stored = repository.database().read(uid)?;

    Ok(decompress(&stored)?.to_vec())
}

/// Parse a tree's raw bytes (header + payload) into a list of entries.
///
/// Format: `<mode> ' ' <name> '\0' <40-byte hex sha1>` repeated.
pub fn parse_tree_raw(raw: &[u8]) -> Vec<RawTreeEntry> {
    let mut cursor = raw
        .iter()
        .position(|&byte| byte == 0)
        .expect("missing header NUL")
        + 1;

    let mut entries = Vec::new();
    while cursor < raw.len() {
        let space = raw[cursor..]
            .iter()
            .position(|&byte| byte == b' ')
            .expect("missing mode delimiter")
            + cursor;
        let mode = String::from_utf8(raw[cursor..space].to_vec()).expect("mode is not UTF-8");

        let nul = raw[space + 1..]
            .iter()
            .position(|&byte| byte == 0)
            .expect("missing name delimiter")
            + space
            + 1;
        let name = String::from_utf8(raw[space + 1..nul].to_vec()).expect("name is not UTF-8");

        assert!(nul + 41 <= raw.len(), "truncated sha1 in tree entry");
        let sha = String::from_utf8(raw[nul + 1..nul + 41].to_vec()).expect("sha is not UTF-8");

        entries.push((mode, name, sha));
        cursor = nul + 41;
    }

    entries
}
