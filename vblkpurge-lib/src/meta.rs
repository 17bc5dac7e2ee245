//! Metadata file handling.
//!
//! The file is a flat list of lines: the device name, two reserved header
//! lines, then one hex state literal per block. Block `n` lives on line
//! `n + HEADER_LINES`. Lines are never reordered.

use crate::state::BlockState;
use crate::utils::Utils;
use crate::{Error, Result};
use std::io::Write;
use std::path::Path;

/// Number of lines preceding the first block entry.
pub const HEADER_LINES: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
struct BlockEntry {
    state: BlockState,
    literal: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetaFile {
    header: [String; HEADER_LINES],
    blocks: Vec<BlockEntry>,
}

impl MetaFile {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let meta = Self::parse(&content)?;
        tracing::debug!(
            "loaded {}: device {}, {} blocks",
            path.as_ref().display(),
            meta.device_id(),
            meta.len()
        );
        Ok(meta)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let lines: Vec<&str> = content.lines().map(str::trim).collect();

        if lines.len() < HEADER_LINES {
            return Err(Error::parse(
                lines.len(),
                "",
                format!(
                    "expected at least {} header lines, found {}",
                    HEADER_LINES,
                    lines.len()
                ),
            ));
        }
        if lines[0].is_empty() {
            return Err(Error::parse(0, "", "missing device identifier"));
        }

        let header = [
            lines[0].to_string(),
            lines[1].to_string(),
            lines[2].to_string(),
        ];

        let blocks = lines[HEADER_LINES..]
            .iter()
            .enumerate()
            .map(|(index, literal)| -> Result<BlockEntry> {
                let code = Utils::hex_to_u8(literal)
                    .map_err(|reason| Error::parse(index + HEADER_LINES, *literal, reason))?;
                Ok(BlockEntry {
                    state: BlockState::from_code(code),
                    literal: literal.to_string(),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { header, blocks })
    }

    pub fn device_id(&self) -> &str {
        &self.header[0]
    }

    /// Device node for this metadata file, e.g. `/dev/nvme0`.
    pub fn device_path(&self, prefix: &str) -> String {
        format!("{}{}", prefix, self.device_id())
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn states(&self) -> Vec<BlockState> {
        self.blocks.iter().map(|b| b.state).collect()
    }

    /// Blocks eligible for erasing, in ascending block order.
    pub fn classify(&self) -> Vec<(usize, BlockState)> {
        self.blocks
            .iter()
            .enumerate()
            .filter(|(_, b)| b.state.is_erasable())
            .map(|(index, b)| (index, b.state))
            .collect()
    }

    pub fn set_state(&mut self, index: usize, state: BlockState) -> Result<()> {
        let count = self.blocks.len();
        let entry = self.blocks.get_mut(index).ok_or_else(|| {
            Error::invalid_input(format!(
                "block {} out of range ({} blocks)",
                index, count
            ))
        })?;
        entry.state = state;
        entry.literal = state.to_string();
        Ok(())
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        for line in self
            .header
            .iter()
            .map(String::as_str)
            .chain(self.blocks.iter().map(|b| b.literal.as_str()))
        {
            out.push_str(line);
            out.push('\n');
        }
        out
    }

    /// Rewrite the metadata file at `path`.
    ///
    /// The content goes to a sibling temporary file first which then replaces
    /// `path`, so readers never observe a half-written file. Symlinks are
    /// resolved first so the rename lands on the file they point at.
    pub fn persist<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let target = std::fs::canonicalize(path.as_ref())
            .unwrap_or_else(|_| path.as_ref().to_path_buf());
        let path = target.as_path();
        let dir = match path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };

        let mut temp = tempfile::Builder::new()
            .prefix(&format!(".{}_", Utils::file_stem(path)))
            .suffix(".tmp")
            .tempfile_in(dir)?;
        temp.write_all(self.render().as_bytes())?;
        temp.as_file().sync_all()?;

        if let Ok(metadata) = std::fs::metadata(path) {
            std::fs::set_permissions(temp.path(), metadata.permissions())?;
        }

        temp.persist(path).map_err(|e| Error::Io(e.error))?;
        tracing::debug!("persisted {} blocks to {}", self.len(), path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_header_and_blocks() {
        let meta = MetaFile::parse("nvme0\n\n\n0x01\n0x05\n0x04\n").unwrap();
        assert_eq!(meta.device_id(), "nvme0");
        assert_eq!(meta.device_path("/dev/"), "/dev/nvme0");
        assert_eq!(
            meta.states(),
            vec![BlockState::Written, BlockState::Other(0x05), BlockState::Open]
        );
    }

    #[test]
    fn parse_error_names_line() {
        let err = MetaFile::parse("nvme0\n\n\n0x01\nbogus\n").unwrap_err();
        match err {
            Error::Parse { line, content, .. } => {
                assert_eq!(line, 4);
                assert_eq!(content, "bogus");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn short_header_is_rejected() {
        assert!(matches!(
            MetaFile::parse("nvme0\n\n"),
            Err(Error::Parse { .. })
        ));
        assert!(matches!(MetaFile::parse(""), Err(Error::Parse { .. })));
        assert!(matches!(
            MetaFile::parse("\n\n\n0x01\n"),
            Err(Error::Parse { line: 0, .. })
        ));
    }

    #[test]
    fn header_only_file_has_no_blocks() {
        let meta = MetaFile::parse("nvme0\nhead1\nhead2\n").unwrap();
        assert!(meta.is_empty());
        assert!(meta.classify().is_empty());
    }

    #[test]
    fn classify_keeps_order() {
        let meta = MetaFile::parse("nvme0\n\n\n0x04\n0x02\n0x01\n0x08\n0x04\n").unwrap();
        assert_eq!(
            meta.classify(),
            vec![
                (0, BlockState::Open),
                (2, BlockState::Written),
                (4, BlockState::Open)
            ]
        );
    }

    #[test]
    fn set_state_rewrites_literal_only() {
        let mut meta = MetaFile::parse("nvme0\na\nb\n0X1\n0x5\n").unwrap();
        meta.set_state(0, BlockState::Erased).unwrap();
        assert_eq!(meta.render(), "nvme0\na\nb\n0x02\n0x5\n");
    }

    #[test]
    fn set_state_out_of_range() {
        let mut meta = MetaFile::parse("nvme0\n\n\n0x01\n").unwrap();
        assert!(matches!(
            meta.set_state(1, BlockState::Erased),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn crlf_is_normalised() {
        let meta = MetaFile::parse("nvme0\r\nx\r\ny\r\n0x01\r\n").unwrap();
        assert_eq!(meta.render(), "nvme0\nx\ny\n0x01\n");
    }
}
