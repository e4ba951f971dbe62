//! External command execution with a bounded wait.
//!
//! Every tool a collector shells out to (`top`, `df`, `ps`, `termux-*`, ...)
//! goes through a [`CommandRunner`]. The production [`SystemRunner`] spawns the
//! process, waits at most the invocation's timeout, and always kills and
//! reaps the child when it leaves early. Tests use
//! [`MockRunner`](super::MockRunner) instead.

use std::fmt;
use std::io::{self, Read};
use std::process::{Child, Command, Stdio};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use tracing::{trace, warn};

use crate::config::DEFAULT_COMMAND_TIMEOUT;

/// How often a running child is polled for exit.
const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Errors from running an external command.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("command `{command}` timed out after {timeout:?}")]
    Timeout { command: String, timeout: Duration },

    #[error("failed to spawn `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },

    #[error("I/O error while running `{command}`: {source}")]
    Io {
        command: String,
        #[source]
        source: io::Error,
    },

    #[error("empty command line")]
    EmptyCommand,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Form {
    Argv(Vec<String>),
    Line(String),
    Shell(String),
}

/// A command to run: program plus arguments, and an optional timeout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    form: Form,
    timeout: Option<Duration>,
}

impl Invocation {
    /// An explicit argument vector; no tokenization happens.
    pub fn argv<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            form: Form::Argv(args.into_iter().map(Into::into).collect()),
            timeout: None,
        }
    }

    /// A single command line, split on whitespace before execution.
    pub fn line(command: impl Into<String>) -> Self {
        Self {
            form: Form::Line(command.into()),
            timeout: None,
        }
    }

    /// A script run through `sh -c`, so pipes and redirections work.
    pub fn shell(script: impl Into<String>) -> Self {
        Self {
            form: Form::Shell(script.into()),
            timeout: None,
        }
    }

    /// Overrides the runner's default timeout for this call.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// The argument vector that will be executed.
    pub fn to_argv(&self) -> Result<Vec<String>, CommandError> {
        let argv: Vec<String> = match &self.form {
            Form::Argv(args) => args.clone(),
            Form::Line(line) => line.split_whitespace().map(str::to_string).collect(),
            Form::Shell(script) => {
                if script.trim().is_empty() {
                    return Err(CommandError::EmptyCommand);
                }
                vec!["sh".to_string(), "-c".to_string(), script.clone()]
            }
        };
        if argv.first().is_none_or(|program| program.is_empty()) {
            return Err(CommandError::EmptyCommand);
        }
        Ok(argv)
    }
}

impl fmt::Display for Invocation {
    /// Normalized command line, also used as the lookup key by `MockRunner`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.form {
            Form::Argv(args) => write!(f, "{}", args.join(" ")),
            Form::Line(line) => {
                let mut first = true;
                for token in line.split_whitespace() {
                    if !first {
                        f.write_str(" ")?;
                    }
                    f.write_str(token)?;
                    first = false;
                }
                Ok(())
            }
            Form::Shell(script) => f.write_str(script.trim()),
        }
    }
}

/// Runs external commands and returns their trimmed standard output.
pub trait CommandRunner: Send + Sync {
    /// Runs `invocation` to completion.
    ///
    /// A nonzero exit status is not an error: the output is still returned
    /// and the caller decides whether it is usable.
    fn run(&self, invocation: &Invocation) -> Result<String, CommandError>;
}

/// [`CommandRunner`] backed by `std::process`.
#[derive(Debug, Clone, Copy)]
pub struct SystemRunner {
    default_timeout: Duration,
}

impl SystemRunner {
    pub fn new(default_timeout: Duration) -> Self {
        Self { default_timeout }
    }

    pub fn default_timeout(&self) -> Duration {
        self.default_timeout
    }
}

impl Default for SystemRunner {
    fn default() -> Self {
        Self::new(DEFAULT_COMMAND_TIMEOUT)
    }
}

/// Kills and reaps the child unless it has already been waited on.
struct ChildGuard {
    child: Child,
    reaped: bool,
}

impl ChildGuard {
    fn new(child: Child) -> Self {
        Self {
            child,
            reaped: false,
        }
    }
}

impl Drop for ChildGuard {
    fn drop(&mut self) {
        if !self.reaped {
            let _ = self.child.kill();
            let _ = self.child.wait();
        }
    }
}

impl CommandRunner for SystemRunner {
    fn run(&self, invocation: &Invocation) -> Result<String, CommandError> {
        let argv = invocation.to_argv()?;
        let command = invocation.to_string();
        let timeout = invocation.timeout().unwrap_or(self.default_timeout);
        trace!(command = %command, ?timeout, "running command");

        let child = Command::new(&argv[0])
            .args(&argv[1..])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| CommandError::Spawn {
                command: command.clone(),
                source,
            })?;
        let mut guard = ChildGuard::new(child);

        // Drain stdout on a separate thread so a chatty child cannot block on
        // a full pipe while we wait for it to exit.
        let (tx, rx) = mpsc::channel();
        if let Some(mut stdout) = guard.child.stdout.take() {
            thread::spawn(move || {
                let mut buf = Vec::new();
                let result = stdout.read_to_end(&mut buf).map(|_| buf);
                let _ = tx.send(result);
            });
        } else {
            let _ = tx.send(Ok(Vec::new()));
        }

        let deadline = Instant::now() + timeout;
        let status = loop {
            match guard.child.try_wait() {
                Ok(Some(status)) => {
                    guard.reaped = true;
                    break status;
                }
                Ok(None) if Instant::now() >= deadline => {
                    return Err(CommandError::Timeout { command, timeout });
                }
                Ok(None) => thread::sleep(POLL_INTERVAL),
                Err(source) => return Err(CommandError::Io { command, source }),
            }
        };

        // Background children of a shell script may keep the pipe open.
        let remaining = deadline
            .saturating_duration_since(Instant::now())
            .max(POLL_INTERVAL);
        let bytes = match rx.recv_timeout(remaining) {
            Ok(Ok(bytes)) => bytes,
            Ok(Err(source)) => return Err(CommandError::Io { command, source }),
            Err(_) => return Err(CommandError::Timeout { command, timeout }),
        };

        let output = String::from_utf8_lossy(&bytes).trim().to_string();
        if !status.success() {
            warn!(command = %command, status = ?status.code(), "command exited with nonzero status");
        }
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_is_tokenized_on_whitespace() {
        let inv = Invocation::line("df  -h   .");
        assert_eq!(inv.to_argv().unwrap(), vec!["df", "-h", "."]);
        assert_eq!(inv.to_string(), "df -h .");
    }

    #[test]
    fn test_shell_runs_under_sh() {
        let inv = Invocation::shell("ps aux | wc -l");
        assert_eq!(inv.to_argv().unwrap(), vec!["sh", "-c", "ps aux | wc -l"]);
        assert_eq!(inv.to_string(), "ps aux | wc -l");
    }

    #[test]
    fn test_argv_display_matches_line() {
        assert_eq!(
            Invocation::argv(["ip", "addr", "show", "wlan0"]).to_string(),
            Invocation::line("ip addr show wlan0").to_string()
        );
    }

    #[test]
    fn test_empty_command_rejected() {
        assert!(matches!(
            Invocation::line("   ").to_argv(),
            Err(CommandError::EmptyCommand)
        ));
        assert!(matches!(
            Invocation::argv(Vec::<String>::new()).to_argv(),
            Err(CommandError::EmptyCommand)
        ));
        assert!(matches!(
            Invocation::shell("").to_argv(),
            Err(CommandError::EmptyCommand)
        ));
    }

    #[test]
    fn test_timeout_override() {
        let inv = Invocation::line("top -bn1").with_timeout(Duration::from_secs(5));
        assert_eq!(inv.timeout(), Some(Duration::from_secs(5)));
        assert_eq!(Invocation::line("uptime").timeout(), None);
    }

    #[cfg(unix)]
    #[test]
    fn test_system_runner_captures_trimmed_stdout() {
        let runner = SystemRunner::default();
        let out = runner.run(&Invocation::line("echo hello")).unwrap();
        assert_eq!(out, "hello");
    }

    #[cfg(unix)]
    #[test]
    fn test_system_runner_shell_mode() {
        let runner = SystemRunner::default();
        let out = runner
            .run(&Invocation::shell("printf 'a\\nb\\nc\\n' | wc -l"))
            .unwrap();
        assert_eq!(out, "3");
    }

    #[cfg(unix)]
    #[test]
    fn test_system_runner_nonzero_exit_keeps_output() {
        let runner = SystemRunner::default();
        let out = runner
            .run(&Invocation::shell("echo partial; exit 3"))
            .unwrap();
        assert_eq!(out, "partial");
    }

    #[cfg(unix)]
    #[test]
    fn test_system_runner_times_out() {
        let runner = SystemRunner::new(Duration::from_millis(100));
        let started = Instant::now();
        let err = runner.run(&Invocation::line("sleep 5")).unwrap_err();
        assert!(matches!(err, CommandError::Timeout { .. }));
        assert!(started.elapsed() < Duration::from_secs(4));
    }

    #[test]
    fn test_system_runner_missing_binary() {
        let runner = SystemRunner::default();
        let err = runner
            .run(&Invocation::line("hostdash-no-such-tool --version"))
            .unwrap_err();
        assert!(matches!(err, CommandError::Spawn { .. }));
    }
}
