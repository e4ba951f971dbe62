//! Scripted command runner for tests.

use std::collections::HashMap;
use std::io;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use crate::collector::command::{CommandError, CommandRunner, Invocation};

/// Scripted outcome of one command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scripted {
    /// The command ran and printed this text.
    Stdout(String),
    /// The command hung past its timeout.
    Timeout,
    /// The binary does not exist.
    Missing,
}

/// [`CommandRunner`] that answers from a script keyed by command line.
///
/// Command lines are compared after whitespace normalization, so
/// `Invocation::argv(["df", "-h", "."])` and `Invocation::line("df -h .")`
/// hit the same entry. Unscripted commands behave like a missing binary.
/// Clones share call counters.
#[derive(Debug, Clone, Default)]
pub struct MockRunner {
    script: HashMap<String, Scripted>,
    calls: Arc<Mutex<HashMap<String, usize>>>,
}

fn normalize(command: &str) -> String {
    command.split_whitespace().collect::<Vec<_>>().join(" ")
}

impl MockRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scripts `command` to print `stdout`.
    pub fn with_output(mut self, command: &str, stdout: impl Into<String>) -> Self {
        self.set(command, Scripted::Stdout(stdout.into()));
        self
    }

    /// Scripts `command` to time out.
    pub fn with_timeout(mut self, command: &str) -> Self {
        self.set(command, Scripted::Timeout);
        self
    }

    /// Scripts `command` as a missing binary.
    pub fn with_missing(mut self, command: &str) -> Self {
        self.set(command, Scripted::Missing);
        self
    }

    pub fn set(&mut self, command: &str, outcome: Scripted) {
        self.script.insert(normalize(command), outcome);
    }

    /// How many times `command` has been run.
    pub fn calls(&self, command: &str) -> usize {
        let calls = self.calls.lock().unwrap_or_else(PoisonError::into_inner);
        calls.get(&normalize(command)).copied().unwrap_or(0)
    }

    /// Total number of commands run.
    pub fn total_calls(&self) -> usize {
        let calls = self.calls.lock().unwrap_or_else(PoisonError::into_inner);
        calls.values().sum()
    }
}

impl CommandRunner for MockRunner {
    fn run(&self, invocation: &Invocation) -> Result<String, CommandError> {
        invocation.to_argv()?;
        let command = normalize(&invocation.to_string());
        {
            let mut calls = self.calls.lock().unwrap_or_else(PoisonError::into_inner);
            *calls.entry(command.clone()).or_default() += 1;
        }

        match self.script.get(&command) {
            Some(Scripted::Stdout(out)) => Ok(out.trim().to_string()),
            Some(Scripted::Timeout) => Err(CommandError::Timeout {
                command,
                timeout: invocation.timeout().unwrap_or(Duration::from_secs(3)),
            }),
            Some(Scripted::Missing) | None => Err(CommandError::Spawn {
                command,
                source: io::Error::from(io::ErrorKind::NotFound),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scripted_outputs() {
        let runner = MockRunner::new()
            .with_output("hostname", "pixel\n")
            .with_timeout("top -bn1")
            .with_missing("nproc");

        assert_eq!(runner.run(&Invocation::line("hostname")).unwrap(), "pixel");
        assert!(matches!(
            runner.run(&Invocation::line("top -bn1")),
            Err(CommandError::Timeout { .. })
        ));
        assert!(matches!(
            runner.run(&Invocation::line("nproc")),
            Err(CommandError::Spawn { .. })
        ));
        assert!(matches!(
            runner.run(&Invocation::line("uptime")),
            Err(CommandError::Spawn { .. })
        ));
    }

    #[test]
    fn test_argv_and_line_share_entry() {
        let runner = MockRunner::new().with_output("df -h .", "Filesystem Size");
        assert!(runner.run(&Invocation::argv(["df", "-h", "."])).is_ok());
        assert!(runner.run(&Invocation::line("df   -h .")).is_ok());
        assert_eq!(runner.calls("df -h ."), 2);
    }

    #[test]
    fn test_clones_share_call_counts() {
        let runner = MockRunner::new().with_output("uptime", "up 1 day");
        let clone = runner.clone();
        clone.run(&Invocation::line("uptime")).unwrap();
        clone.run(&Invocation::line("nproc")).unwrap_err();
        assert_eq!(runner.calls("uptime"), 1);
        assert_eq!(runner.total_calls(), 2);
    }
}
