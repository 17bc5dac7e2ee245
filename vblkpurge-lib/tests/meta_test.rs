use std::path::Path;

use tempfile::TempDir;
use vblkpurge_lib::backup::{backup, backup_path, content_digest};
use vblkpurge_lib::{BlockState, MetaFile};

#[test]
fn load_then_persist_is_byte_identical() {
    let samples = [
        "nvme0\n\n\n0x01\n0x05\n0x04\n",
        "nvme0\n0x0000000000000000 0x0000000001000000\n17\n0x1\n0X04\n0xff\n02\n",
        "lnvm0n1\nhdr\nhdr\n",
        "nvme1\n\n\n0x001\n0x0004\n",
    ];

    let dir = TempDir::new().unwrap();
    for (i, content) in samples.iter().enumerate() {
        let path = dir.path().join(format!("sample{}.meta", i));
        std::fs::write(&path, content).unwrap();

        MetaFile::load(&path).unwrap().persist(&path).unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), *content);
    }
}

#[test]
fn persist_leaves_no_temp_files() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nvm.meta");
    std::fs::write(&path, "nvme0\n\n\n0x01\n").unwrap();

    let mut meta = MetaFile::load(&path).unwrap();
    meta.set_state(0, BlockState::Failed).unwrap();
    meta.persist(&path).unwrap();

    assert_eq!(std::fs::read_to_string(&path).unwrap(), "nvme0\n\n\n0x08\n");
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
}

#[cfg(unix)]
#[test]
fn persist_keeps_permissions() {
    use std::os::unix::fs::PermissionsExt;

    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nvm.meta");
    std::fs::write(&path, "nvme0\n\n\n0x01\n").unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o644)).unwrap();

    MetaFile::load(&path).unwrap().persist(&path).unwrap();

    let mode = std::fs::metadata(&path).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o644);
}

#[cfg(unix)]
#[test]
fn persist_writes_through_symlink() {
    let dir = TempDir::new().unwrap();
    let real = dir.path().join("real.meta");
    let link = dir.path().join("nvm.meta");
    std::fs::write(&real, "nvme0\n\n\n0x01\n").unwrap();
    std::os::unix::fs::symlink(&real, &link).unwrap();

    let mut meta = MetaFile::load(&link).unwrap();
    meta.set_state(0, BlockState::Erased).unwrap();
    meta.persist(&link).unwrap();

    assert!(std::fs::symlink_metadata(&link).unwrap().file_type().is_symlink());
    assert_eq!(std::fs::read_to_string(&real).unwrap(), "nvme0\n\n\n0x02\n");
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 2);
}

#[test]
fn backup_is_a_byte_identical_copy() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nvm.meta");
    let content = "nvme0\n\n\n0x01\n0x05\n";
    std::fs::write(&path, content).unwrap();

    let dst = backup(&path).unwrap();

    assert_eq!(dst.parent(), Some(dir.path()));
    let name = dst.file_name().unwrap().to_str().unwrap();
    assert_eq!(name, format!("nvm_{}.meta", content_digest(content.as_bytes())));
    assert_eq!(std::fs::read_to_string(&dst).unwrap(), content);
}

#[test]
fn backup_name_follows_content() {
    let path = Path::new("/var/lib/nvm/nvm.meta");
    let a = backup_path(path, b"nvme0\n\n\n0x01\n");
    let b = backup_path(path, b"nvme0\n\n\n0x01\n");
    let c = backup_path(path, b"nvme0\n\n\n0x02\n");

    assert_eq!(a, b);
    assert_ne!(a, c);
    assert_eq!(content_digest(b"x").len(), 8);
    assert!(
        content_digest(b"x")
            .chars()
            .all(|ch| ch.is_ascii_hexdigit() && !ch.is_ascii_uppercase())
    );
}
