//! Per-block state codes stored in the metadata file.

use std::fmt;

/// State of one block as recorded in the metadata file.
///
/// Only [`BlockState::Written`] and [`BlockState::Open`] are candidates for
/// erasing; [`BlockState::Erased`] and [`BlockState::Failed`] are written by
/// a purge run and never leave that state again. Every other code is carried
/// through untouched as [`BlockState::Other`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockState {
    /// `0x01`
    Written,
    /// `0x02`
    Erased,
    /// `0x04`
    Open,
    /// `0x08`
    Failed,
    Other(u8),
}

impl BlockState {
    pub const fn from_code(code: u8) -> Self {
        match code {
            0x01 => Self::Written,
            0x02 => Self::Erased,
            0x04 => Self::Open,
            0x08 => Self::Failed,
            other => Self::Other(other),
        }
    }

    pub const fn code(self) -> u8 {
        match self {
            Self::Written => 0x01,
            Self::Erased => 0x02,
            Self::Open => 0x04,
            Self::Failed => 0x08,
            Self::Other(code) => code,
        }
    }

    pub const fn is_erasable(self) -> bool {
        matches!(self, Self::Written | Self::Open)
    }
}

impl From<u8> for BlockState {
    fn from(code: u8) -> Self {
        Self::from_code(code)
    }
}

impl fmt::Display for BlockState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#04x}", self.code())
    }
}
