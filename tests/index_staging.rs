use fake::Fake;
use fake::faker::lorem::en::Words;
use gitlet::GitletError;
use gitlet::artifacts::objects::blob::Blob;
use pretty_assertions::assert_eq;
use std::path::Path;

mod common;

#[test]
fn add_new_file_stages_and_persists_blob() -> Result<(), Box<dyn std::error::Error>> {
    let dir = assert_fs::TempDir::new()?;
    let repository = common::init_repository(&dir)?;

    let file_path = dir.path().join("a.txt");
    std::fs::write(&file_path, "hello\n")?;
    let uid = Blob::compute_uid(&file_path)?;

    let mut index = repository.load_index();
    index.add(repository.workspace(), repository.database(), &file_path)?;

    assert!(index.added().values().any(|staged| *staged == uid));
    assert!(index.removed().is_empty());

    // the blob object was written into objects/xx/yyyy...
    let (shard, rest) = uid.as_ref().split_at(2);
    assert!(
        dir.path()
            .join(".gitlet/objects")
            .join(shard)
            .join(rest)
            .is_file()
    );

    Ok(())
}

#[test]
fn add_file_equal_to_head_unstages() -> Result<(), Box<dyn std::error::Error>> {
    let dir = assert_fs::TempDir::new()?;
    let repository = common::init_repository(&dir)?;

    let file_path = dir.path().join("b.txt");
    std::fs::write(&file_path, "same-as-head")?;
    let path = repository.workspace().canonicalize(&file_path);
    let uid = Blob::compute_uid(&file_path)?;

    let mut index = repository.load_index();
    index.apply_head_snapshot(repository.workspace(), vec![(path, uid)])?;

    index.add(repository.workspace(), repository.database(), &file_path)?;
    assert!(index.added().is_empty());
    assert!(index.removed().is_empty());

    Ok(())
}

#[test]
fn add_cancels_pending_deletion() -> Result<(), Box<dyn std::error::Error>> {
    let dir = assert_fs::TempDir::new()?;
    let repository = common::init_repository(&dir)?;

    let file_path = dir.path().join("c.txt");
    std::fs::write(&file_path, "keep-me")?;
    let path = repository.workspace().canonicalize(&file_path);
    let uid = Blob::compute_uid(&file_path)?;

    let mut index = repository.load_index();
    index.apply_head_snapshot(repository.workspace(), vec![(path.clone(), uid)])?;

    // stage a deletion but keep the working-tree file
    index.remove(repository.workspace(), &file_path, true, true)?;
    assert!(index.removed().contains(&path));

    index.add(repository.workspace(), repository.database(), &file_path)?;
    assert!(!index.removed().contains(&path));

    Ok(())
}

#[test]
fn remove_staged_addition_with_cached_keeps_file() -> Result<(), Box<dyn std::error::Error>> {
    let dir = assert_fs::TempDir::new()?;
    let repository = common::init_repository(&dir)?;

    let file_path = dir.path().join("d.txt");
    std::fs::write(&file_path, "new-file")?;

    let mut index = repository.load_index();
    index.add(repository.workspace(), repository.database(), &file_path)?;
    assert_eq!(index.added().len(), 1);

    index.remove(repository.workspace(), &file_path, false, true)?;
    assert!(index.added().is_empty());
    assert!(index.removed().is_empty());
    assert!(file_path.exists());

    Ok(())
}

#[test]
fn remove_tracked_modified_without_force_fails() -> Result<(), Box<dyn std::error::Error>> {
    let dir = assert_fs::TempDir::new()?;
    let repository = common::init_repository(&dir)?;

    let file_path = dir.path().join("e.txt");
    std::fs::write(&file_path, "v1")?;
    let path = repository.workspace().canonicalize(&file_path);
    let uid_v1 = Blob::compute_uid(&file_path)?;

    let mut index = repository.load_index();
    index.apply_head_snapshot(repository.workspace(), vec![(path, uid_v1)])?;

    // now the working tree differs from HEAD
    std::fs::write(&file_path, "v2")?;

    let err = index
        .remove(repository.workspace(), &file_path, false, false)
        .unwrap_err();
    assert!(matches!(err, GitletError::HasLocalModifications(_)));
    assert_eq!(err.to_string(), "'e.txt' has local modifications");

    // nothing was staged and the file is still there
    assert!(index.added().is_empty());
    assert!(index.removed().is_empty());
    assert!(file_path.exists());

    Ok(())
}

#[test]
fn remove_tracked_with_force_deletes_file() -> Result<(), Box<dyn std::error::Error>> {
    let dir = assert_fs::TempDir::new()?;
    let repository = common::init_repository(&dir)?;

    let file_path = dir.path().join("f.txt");
    std::fs::write(&file_path, "tracked")?;
    let path = repository.workspace().canonicalize(&file_path);
    let uid = Blob::compute_uid(&file_path)?;

    let mut index = repository.load_index();
    index.apply_head_snapshot(repository.workspace(), vec![(path.clone(), uid)])?;

    index.remove(repository.workspace(), &file_path, true, false)?;
    assert!(index.removed().contains(&path));
    assert!(!file_path.exists());

    Ok(())
}

#[test]
fn remove_tracked_missing_file_still_stages_deletion() -> Result<(), Box<dyn std::error::Error>> {
    let dir = assert_fs::TempDir::new()?;
    let repository = common::init_repository(&dir)?;

    let file_path = dir.path().join("gone.txt");
    std::fs::write(&file_path, "will vanish")?;
    let path = repository.workspace().canonicalize(&file_path);
    let uid = Blob::compute_uid(&file_path)?;

    let mut index = repository.load_index();
    index.apply_head_snapshot(repository.workspace(), vec![(path.clone(), uid)])?;

    std::fs::remove_file(&file_path)?;

    index.remove(repository.workspace(), &file_path, false, false)?;
    assert!(index.removed().contains(&path));

    Ok(())
}

#[test]
fn remove_unmatched_pathspec_fails() -> Result<(), Box<dyn std::error::Error>> {
    let dir = assert_fs::TempDir::new()?;
    let repository = common::init_repository(&dir)?;

    let err = repository
        .load_index()
        .remove(
            repository.workspace(),
            &dir.path().join("nope.txt"),
            false,
            false,
        )
        .unwrap_err();
    assert!(matches!(err, GitletError::PathspecNoMatch(_)));
    assert_eq!(
        err.to_string(),
        "pathspec 'nope.txt' did not match any files"
    );

    Ok(())
}

#[test]
fn clean_stage_area_clears_added_and_removed() -> Result<(), Box<dyn std::error::Error>> {
    let dir = assert_fs::TempDir::new()?;
    let repository = common::init_repository(&dir)?;

    let added_path = dir.path().join("g1.txt");
    std::fs::write(&added_path, "A")?;
    let tracked_path = dir.path().join("g2.txt");
    std::fs::write(&tracked_path, "B")?;

    let mut index = repository.load_index();
    index.add(repository.workspace(), repository.database(), &added_path)?;

    let path = repository.workspace().canonicalize(&tracked_path);
    let uid = Blob::compute_uid(&tracked_path)?;
    index.apply_head_snapshot(repository.workspace(), vec![(path, uid)])?;
    index.remove(repository.workspace(), &tracked_path, true, true)?;

    assert!(!index.added().is_empty());
    assert!(!index.removed().is_empty());

    index.clean_stage_area()?;
    assert!(index.added().is_empty());
    assert!(index.removed().is_empty());
    assert!(!index.tracked().is_empty());

    Ok(())
}

#[test]
fn apply_head_snapshot_replaces_tracked_wholesale() -> Result<(), Box<dyn std::error::Error>> {
    let dir = assert_fs::TempDir::new()?;
    let repository = common::init_repository(&dir)?;

    let first = dir.path().join("h1.txt");
    std::fs::write(&first, "H1")?;
    let second = dir.path().join("h2.txt");
    std::fs::write(&second, "H2")?;

    let first_key = repository.workspace().canonicalize(&first);
    let second_key = repository.workspace().canonicalize(&second);

    let mut index = repository.load_index();
    index.apply_head_snapshot(
        repository.workspace(),
        vec![(first_key.clone(), Blob::compute_uid(&first)?)],
    )?;
    assert!(index.tracked().contains_key(&first_key));
    assert!(!index.tracked().contains_key(&second_key));

    index.apply_head_snapshot(
        repository.workspace(),
        vec![(second_key.clone(), Blob::compute_uid(&second)?)],
    )?;
    assert!(!index.tracked().contains_key(&first_key));
    assert!(index.tracked().contains_key(&second_key));

    Ok(())
}

#[test]
fn index_round_trips_through_save_and_load() -> Result<(), Box<dyn std::error::Error>> {
    let dir = assert_fs::TempDir::new()?;
    let repository = common::init_repository(&dir)?;

    let file_path = dir.path().join("persist.txt");
    let content = Words(5..10).fake::<Vec<String>>().join(" ");
    std::fs::write(&file_path, &content)?;
    let uid = Blob::compute_uid(&file_path)?;

    {
        let mut index = repository.load_index();
        index.add(repository.workspace(), repository.database(), &file_path)?;
        // save happens inside add
    }

    let reloaded = repository.load_index();
    assert!(reloaded.added().values().any(|staged| *staged == uid));

    Ok(())
}

#[test]
fn same_file_different_presentations_share_one_key() -> Result<(), Box<dyn std::error::Error>> {
    let dir = assert_fs::TempDir::new()?;
    let repository = common::init_repository(&dir)?;

    std::fs::write(dir.path().join("norm.txt"), "norm")?;

    let mut index = repository.load_index();
    // stage via "./norm.txt", remove via "norm.txt": one canonical key
    index.add(
        repository.workspace(),
        repository.database(),
        Path::new("./norm.txt"),
    )?;
    assert_eq!(index.added().len(), 1);

    index.remove(repository.workspace(), Path::new("norm.txt"), false, true)?;
    assert!(index.added().is_empty());

    Ok(())
}

#[test]
fn corrupt_index_file_falls_back_to_empty() -> Result<(), Box<dyn std::error::Error>> {
    let dir = assert_fs::TempDir::new()?;
    let repository = common::init_repository(&dir)?;

    let file_path = dir.path().join("staged.txt");
    std::fs::write(&file_path, "staged")?;
    let mut index = repository.load_index();
    index.add(repository.workspace(), repository.database(), &file_path)?;

    std::fs::write(repository.index_path(), b"\xde\xad\xbe\xef scrambled")?;

    let reloaded = repository.load_index();
    assert!(reloaded.added().is_empty());
    assert!(reloaded.removed().is_empty());
    assert!(reloaded.tracked().is_empty());
    // the unreadable file is left in place
    assert!(repository.index_path().exists());

    Ok(())
}
