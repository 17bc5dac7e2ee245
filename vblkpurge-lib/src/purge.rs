//! The purge run.
//!
//! A [`Purger`] loads the metadata file, takes a backup, then erases every
//! block in state `0x01` or `0x04` in ascending order. Each real outcome is
//! recorded as `0x02` (erased) or `0x08` (failed) and persisted according to
//! [`PersistMode`]. Per-block report lines go to the progress callback and a
//! [`PurgeReport`] is returned at the end.
//!
//! ```no_run
//! use vblkpurge_lib::{PurgeConfig, Purger, SystemRunner};
//!
//! let mut config = PurgeConfig::new("/var/lib/nvm/nvme0.meta");
//! config.dry_run = true;
//! let report = Purger::new(config, SystemRunner).run()?;
//! println!("{} candidates", report.blocks.len());
//! # Ok::<(), vblkpurge_lib::Error>(())
//! ```

use crate::backup;
use crate::erase::{DEFAULT_PROGRAM, EraseDriver};
use crate::meta::MetaFile;
use crate::progress::{ProgressCallbackArc, ProgressHelper, no_op_progress_callback};
use crate::runner::ProcessRunner;
use crate::state::BlockState;
use crate::{Error, Result};
use std::path::PathBuf;
use strum::{Display, EnumString};

/// Prefix joined with the device name from the metadata file.
pub const DEFAULT_DEVICE_PREFIX: &str = "/dev/";

/// When the metadata file is rewritten during a real run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, EnumString, Display)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum PersistMode {
    /// After every erased block, so a crash loses at most the in-flight block.
    #[default]
    #[strum(serialize = "per_block")]
    #[cfg_attr(feature = "cli", value(name = "per_block"))]
    PerBlock,
    /// Once, after the last block was processed.
    #[strum(serialize = "on_completion")]
    #[cfg_attr(feature = "cli", value(name = "on_completion"))]
    OnCompletion,
}

/// Settings for one purge run.
#[derive(Debug, Clone)]
pub struct PurgeConfig {
    /// Absolute path to the metadata file.
    pub mpath: PathBuf,
    /// Print the commands but run nothing and never touch the metadata file.
    /// The backup is still written.
    pub dry_run: bool,
    pub persist: PersistMode,
    /// Erase utility, looked up on `PATH` unless absolute.
    pub program: String,
    /// Joined with the device name from the metadata file, see
    /// [`MetaFile::device_path`].
    pub device_prefix: String,
}

impl PurgeConfig {
    /// Defaults for everything but the metadata path: a real run persisting
    /// per block with `nvm_vblk` against `/dev/<device>`.
    pub fn new(mpath: impl Into<PathBuf>) -> Self {
        Self {
            mpath: mpath.into(),
            dry_run: false,
            persist: PersistMode::default(),
            program: DEFAULT_PROGRAM.to_string(),
            device_prefix: DEFAULT_DEVICE_PREFIX.to_string(),
        }
    }

    /// Reject an empty metadata path or erase program with [`Error::Config`].
    pub fn validate(&self) -> Result<()> {
        if self.mpath.as_os_str().is_empty() {
            return Err(Error::config("metadata path is empty"));
        }
        if self.program.trim().is_empty() {
            return Err(Error::config("erase program is empty"));
        }
        Ok(())
    }
}

/// What happened to one erase candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockOutcome {
    /// The utility exited 0; the block is now `0x02`.
    Erased,
    /// Non-zero exit or signal; the block is now `0x08`.
    Failed,
    /// Dry run; nothing was executed or recorded.
    DryRun,
}

/// Per-candidate line of a [`PurgeReport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockReport {
    /// Zero-based block index, which is also the `line_erase` block argument.
    pub index: usize,
    /// State before the run, `0x01` or `0x04`.
    pub previous: BlockState,
    pub outcome: BlockOutcome,
    pub exit_code: Option<i32>,
    /// [`crate::EraseOutput::summary`] of the attempt.
    pub summary: String,
}

/// Result of a completed run.
#[derive(Debug, Clone)]
pub struct PurgeReport {
    pub mpath: PathBuf,
    /// Device path the utility was pointed at, e.g. `/dev/nvme0`.
    pub device: String,
    /// Location of the backup taken before anything was erased.
    pub backup: PathBuf,
    pub dry_run: bool,
    pub total_blocks: usize,
    /// One entry per erase candidate, in block order.
    pub blocks: Vec<BlockReport>,
}

impl PurgeReport {
    fn count(&self, outcome: BlockOutcome) -> usize {
        self.blocks.iter().filter(|b| b.outcome == outcome).count()
    }

    pub fn erased(&self) -> usize {
        self.count(BlockOutcome::Erased)
    }

    pub fn failed(&self) -> usize {
        self.count(BlockOutcome::Failed)
    }

    /// Blocks that were not erase candidates.
    pub fn skipped(&self) -> usize {
        self.total_blocks - self.blocks.len()
    }
}

/// Walks the metadata file and erases every erasable block.
pub struct Purger<R> {
    config: PurgeConfig,
    driver: EraseDriver<R>,
    progress: ProgressHelper,
}

impl<R: ProcessRunner> Purger<R> {
    /// Purger with silent progress. Nothing is read until [`Purger::run`].
    pub fn new(config: PurgeConfig, runner: R) -> Self {
        let driver = EraseDriver::new(runner)
            .program(config.program.clone())
            .dry_run(config.dry_run);
        Self {
            config,
            driver,
            progress: ProgressHelper::new(no_op_progress_callback()),
        }
    }

    /// Send report lines and the block bar to `callback`.
    pub fn progress(mut self, callback: ProgressCallbackArc) -> Self {
        self.progress = ProgressHelper::new(callback);
        self
    }

    /// Perform the purge.
    ///
    /// Fails without side effects if the configuration is invalid or the
    /// metadata file cannot be read or parsed. Failed erases are recorded
    /// and the run continues; failure to launch the utility aborts the run,
    /// leaving already persisted blocks in their new state.
    pub fn run(&self) -> Result<PurgeReport> {
        self.config.validate()?;
        let mpath = &self.config.mpath;
        let dry_run = self.config.dry_run;

        let mut meta = MetaFile::load(mpath)?;
        let backup = backup::backup(mpath)?;
        let device = meta.device_path(&self.config.device_prefix);

        self.progress
            .println(format!("dry: {}, mpath: {}", dry_run, mpath.display()));

        let candidates = meta.classify();
        tracing::info!(
            "{} of {} blocks on {} are erase candidates",
            candidates.len(),
            meta.len(),
            device
        );

        let bar = self
            .progress
            .create_bar(candidates.len() as u64, format!("Purging {}", device));
        let mut blocks = Vec::with_capacity(candidates.len());
        let mut dirty = false;

        for (index, previous) in candidates {
            bar.set_message(format!("Erasing block {:04} on {}", index, device));
            self.progress
                .println(format!("Erasing: {{ blk: {:04}, dev: {} }}", index, device));
            self.progress
                .println(self.driver.command_line(&device, index).join(" "));

            let output = match self.driver.erase(&device, index) {
                Ok(output) => output,
                Err(e) => {
                    tracing::error!("erase of block {} on {} aborted: {}", index, device, e);
                    bar.finish_with_message("Aborted");
                    return Err(e);
                }
            };

            let summary = output.summary();
            self.progress.println(format!("Result: {{ {} }}", summary));
            bar.inc(1);

            if dry_run {
                blocks.push(BlockReport {
                    index,
                    previous,
                    outcome: BlockOutcome::DryRun,
                    exit_code: output.exit_code,
                    summary,
                });
                continue;
            }

            let (state, outcome) = if output.succeeded() {
                tracing::info!("block {} erased", index);
                (BlockState::Erased, BlockOutcome::Erased)
            } else {
                tracing::warn!("block {} erase failed: {}", index, summary);
                (BlockState::Failed, BlockOutcome::Failed)
            };
            meta.set_state(index, state)?;
            dirty = true;

            if self.config.persist == PersistMode::PerBlock {
                self.progress.println("Updating meta file");
                meta.persist(mpath)?;
            }

            blocks.push(BlockReport {
                index,
                previous,
                outcome,
                exit_code: output.exit_code,
                summary,
            });
        }

        if dirty && self.config.persist == PersistMode::OnCompletion {
            self.progress.println("Updating meta file");
            meta.persist(mpath)?;
        }

        bar.finish_with_message(format!("Purged {}", device));

        Ok(PurgeReport {
            mpath: mpath.clone(),
            device,
            backup,
            dry_run,
            total_blocks: meta.len(),
            blocks,
        })
    }
}
