//! Erasing single blocks with the external vblk utility.
//!
//! [`EraseDriver`] builds the `line_erase` command line for a block and runs
//! it through a [`ProcessRunner`]. The outcome is reported as an
//! [`EraseOutput`]; a non-zero exit is a failed erase, not an error. Only a
//! failure to launch the utility at all surfaces as [`crate::Error::Launch`].

use crate::Result;
use crate::runner::{ProcessOutput, ProcessRunner};
use crate::utils::Utils;

/// Default erase utility.
pub const DEFAULT_PROGRAM: &str = "nvm_vblk";

/// Parallel unit span handed to `line_erase`: channels 0-15, LUNs 0-7.
const LINE_SPAN: [&str; 4] = ["0", "15", "0", "7"];

/// stderr is cut to this many characters in result summaries.
const STDERR_SUMMARY_LEN: usize = 110;

/// Result of one erase attempt.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EraseOutput {
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl EraseOutput {
    /// Exit status 0. Termination by signal counts as failure.
    pub fn succeeded(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// Lines of stdout mentioning the elapsed time of the erase.
    pub fn elapsed_lines(&self) -> Vec<&str> {
        self.stdout
            .lines()
            .filter(|line| line.to_lowercase().contains("elapsed"))
            .collect()
    }

    /// Single-line digest of the output for reporting.
    pub fn summary(&self) -> String {
        let exit = match self.exit_code {
            Some(code) => code.to_string(),
            None => "signal".to_string(),
        };
        format!(
            "rcode: {}, out: '{}', err: '{}'",
            exit,
            Utils::join_lines(self.elapsed_lines(), None),
            Utils::join_lines(self.stderr.lines(), Some(STDERR_SUMMARY_LEN))
        )
    }
}

impl From<ProcessOutput> for EraseOutput {
    fn from(output: ProcessOutput) -> Self {
        Self {
            exit_code: output.exit_code,
            stdout: output.stdout,
            stderr: output.stderr,
        }
    }
}

/// Invokes `nvm_vblk line_erase` for single blocks.
pub struct EraseDriver<R> {
    runner: R,
    program: String,
    dry_run: bool,
}

impl<R: ProcessRunner> EraseDriver<R> {
    /// Driver for [`DEFAULT_PROGRAM`] that really runs the utility through
    /// `runner`.
    pub fn new(runner: R) -> Self {
        Self {
            runner,
            program: DEFAULT_PROGRAM.to_string(),
            dry_run: false,
        }
    }

    /// Use `program` instead of [`DEFAULT_PROGRAM`], e.g. an absolute path.
    pub fn program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// When set, [`EraseDriver::erase`] never calls the runner.
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    fn args(&self, device: &str, block: usize) -> Vec<String> {
        let mut args = vec!["line_erase".to_string(), device.to_string()];
        args.extend(LINE_SPAN.iter().map(|s| s.to_string()));
        args.push(block.to_string());
        args
    }

    /// Full command line that erases `block` on `device`.
    pub fn command_line(&self, device: &str, block: usize) -> Vec<String> {
        let mut cmd = vec![self.program.clone()];
        cmd.extend(self.args(device, block));
        cmd
    }

    /// Erase `block` on `device`, blocking until the utility exits.
    ///
    /// In dry-run mode nothing is spawned and a successful, silent result is
    /// returned.
    pub fn erase(&self, device: &str, block: usize) -> Result<EraseOutput> {
        let args = self.args(device, block);
        tracing::debug!("{} {}", self.program, args.join(" "));

        if self.dry_run {
            return Ok(ProcessOutput::success().into());
        }

        let output = self.runner.run(&self.program, &args)?;
        Ok(output.into())
    }
}
