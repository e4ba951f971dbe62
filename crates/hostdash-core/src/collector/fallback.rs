//! Ordered fallback chains.
//!
//! Each logical value a collector reports (the primary IP, the CPU model,
//! the battery level, ...) may be available from several tools or pseudo-files
//! depending on the platform. A [`FallbackChain`] lists those strategies in
//! preference order and returns the first one that produces a value.
//!
//! ```
//! use hostdash_core::collector::FallbackChain;
//!
//! let cores = FallbackChain::new("cpu.cores")
//!     .step("cpuinfo", || Ok(None))
//!     .step("nproc", || Ok(Some(8)))
//!     .run();
//! assert_eq!(cores, Some(8));
//! ```

use std::io;

use tracing::debug;

use super::command::CommandError;

/// Why a single fallback step failed.
#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    #[error(transparent)]
    Command(#[from] CommandError),

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error("unexpected output: {0}")]
    Parse(String),
}

impl ProbeError {
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }
}

/// Result of one strategy: `Ok(None)` means "ran, found nothing".
pub type ProbeResult<T> = Result<Option<T>, ProbeError>;

type Step<'a, T> = (&'static str, Box<dyn FnOnce() -> ProbeResult<T> + 'a>);

/// Ordered list of strategies for obtaining one value.
pub struct FallbackChain<'a, T> {
    label: &'static str,
    steps: Vec<Step<'a, T>>,
}

impl<'a, T> FallbackChain<'a, T> {
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            steps: Vec::new(),
        }
    }

    /// Appends a strategy; strategies run in the order they were added.
    pub fn step(mut self, name: &'static str, f: impl FnOnce() -> ProbeResult<T> + 'a) -> Self {
        self.steps.push((name, Box::new(f)));
        self
    }

    /// Returns the first value produced by any strategy.
    pub fn run(self) -> Option<T> {
        self.run_accepting(|_| true)
    }

    /// Like [`run`](Self::run), but values rejected by `accept` count as
    /// failures and the next strategy is tried.
    pub fn run_accepting(self, accept: impl Fn(&T) -> bool) -> Option<T> {
        let label = self.label;
        for (name, f) in self.steps {
            match f() {
                Ok(Some(value)) if accept(&value) => {
                    debug!(chain = label, step = name, "fallback step succeeded");
                    return Some(value);
                }
                Ok(Some(_)) => debug!(chain = label, step = name, "fallback step value rejected"),
                Ok(None) => debug!(chain = label, step = name, "fallback step found nothing"),
                Err(e) => debug!(chain = label, step = name, error = %e, "fallback step failed"),
            }
        }
        debug!(chain = label, "fallback chain exhausted");
        None
    }
}
