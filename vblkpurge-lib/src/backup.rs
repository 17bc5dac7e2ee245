//! Content-addressed backup of the metadata file.

use crate::Result;
use crate::utils::Utils;
use std::path::{Path, PathBuf};

/// Number of digest hex characters embedded in the backup name.
pub const DIGEST_PREFIX_LEN: usize = 8;

/// Extension of every backup file.
pub const BACKUP_EXTENSION: &str = "meta";

/// Short hex digest identifying `content`.
pub fn content_digest(content: &[u8]) -> String {
    let digest = format!("{:x}", md5::compute(content));
    digest[..DIGEST_PREFIX_LEN].to_string()
}

/// Where the backup of `path` with the given `content` is written.
///
/// `/data/nvm.meta` holding content with digest `1a2b3c4d...` maps to
/// `/data/nvm_1a2b3c4d.meta`.
pub fn backup_path(path: &Path, content: &[u8]) -> PathBuf {
    let name = format!(
        "{}_{}.{}",
        Utils::file_stem(path),
        content_digest(content),
        BACKUP_EXTENSION
    );
    match path.parent() {
        Some(dir) => dir.join(name),
        None => PathBuf::from(name),
    }
}

/// Copy the metadata file at `path` next to itself under its digest name.
///
/// Returns the path of the backup.
pub fn backup<P: AsRef<Path>>(path: P) -> Result<PathBuf> {
    let path = path.as_ref();
    let content = std::fs::read(path)?;
    let dst = backup_path(path, &content);
    std::fs::write(&dst, &content)?;
    tracing::info!("backed up {} to {}", path.display(), dst.display());
    Ok(dst)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_is_md5_prefix() {
        // md5("") = d41d8cd98f00b204e9800998ecf8427e
        assert_eq!(content_digest(b""), "d41d8cd9");
    }

    #[test]
    fn backup_name_keeps_directory() {
        let path = Path::new("/data/nvm.meta");
        let dst = backup_path(path, b"");
        assert_eq!(dst, PathBuf::from("/data/nvm_d41d8cd9.meta"));
    }

    #[test]
    fn backup_name_without_extension() {
        let dst = backup_path(Path::new("/data/blocks"), b"");
        assert_eq!(dst, PathBuf::from("/data/blocks_d41d8cd9.meta"));
    }
}
