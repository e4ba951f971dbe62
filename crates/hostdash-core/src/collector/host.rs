//! The environment a collector probes: a filesystem plus a command runner.

use std::path::Path;
use std::time::Duration;

use super::command::{CommandError, CommandRunner, Invocation};
use super::traits::FileSystem;

/// Filesystem and command runner shared by all collectors of one orchestrator.
#[derive(Debug, Clone)]
pub struct Host<F, R> {
    fs: F,
    runner: R,
}

impl<F: FileSystem, R: CommandRunner> Host<F, R> {
    pub fn new(fs: F, runner: R) -> Self {
        Self { fs, runner }
    }

    pub fn fs(&self) -> &F {
        &self.fs
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Reads a pseudo-file.
    pub fn read(&self, path: impl AsRef<Path>) -> std::io::Result<String> {
        self.fs.read_to_string(path.as_ref())
    }

    /// Runs a whitespace-tokenized command line with the default timeout.
    pub fn run(&self, command: &str) -> Result<String, CommandError> {
        self.runner.run(&Invocation::line(command))
    }

    /// Runs a command line with an explicit timeout.
    pub fn run_with_timeout(&self, command: &str, timeout: Duration) -> Result<String, CommandError> {
        self.runner
            .run(&Invocation::line(command).with_timeout(timeout))
    }

    /// Runs an explicit argument vector.
    pub fn run_argv(&self, argv: &[&str]) -> Result<String, CommandError> {
        self.runner.run(&Invocation::argv(argv.iter().copied()))
    }
}
