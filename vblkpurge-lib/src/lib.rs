//! Metadata-driven purging of open-channel SSD blocks.
//!
//! A purge run loads the block metadata file, takes a content-addressed
//! backup of it, erases every block whose state marks it as erasable with
//! `nvm_vblk line_erase` and records the outcome of each erase back into the
//! metadata file.

pub mod backup;
pub mod erase;
mod error;
pub mod meta;
pub mod progress;
pub mod purge;
pub mod runner;
pub mod state;
pub mod utils;

pub use crate::error::{Error, Result};
pub use erase::{EraseDriver, EraseOutput};
pub use meta::MetaFile;
pub use purge::{BlockOutcome, BlockReport, PersistMode, PurgeConfig, PurgeReport, Purger};
pub use runner::{ProcessOutput, ProcessRunner, SystemRunner};
pub use state::BlockState;
