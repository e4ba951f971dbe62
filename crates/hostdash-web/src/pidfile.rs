//! PID file written at startup and removed when the guard drops.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

const DEFAULT_FILE_NAME: &str = "dashboard.pid";

#[derive(Debug, thiserror::Error)]
pub(crate) enum PidFileError {
    #[error("failed to write PID file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// `$HOME/dashboard.pid`, or `dashboard.pid` in the working directory when
/// `HOME` is unset.
pub(crate) fn default_path() -> PathBuf {
    match std::env::var_os("HOME") {
        Some(home) if !home.is_empty() => Path::new(&home).join(DEFAULT_FILE_NAME),
        _ => PathBuf::from(DEFAULT_FILE_NAME),
    }
}

#[derive(Debug)]
pub(crate) struct PidFile {
    path: PathBuf,
}

impl PidFile {
    /// Writes the current process id to `path`, replacing any previous file.
    pub(crate) fn create(path: impl Into<PathBuf>) -> Result<Self, PidFileError> {
        let path = path.into();
        fs::write(&path, std::process::id().to_string()).map_err(|source| PidFileError::Write {
            path: path.clone(),
            source,
        })?;
        info!(path = %path.display(), "PID file written");
        Ok(Self { path })
    }
}

impl Drop for PidFile {
    fn drop(&mut self) {
        match fs::remove_file(&self.path) {
            Ok(()) => info!(path = %self.path.display(), "PID file removed"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => warn!(path = %self.path.display(), error = %e, "failed to remove PID file"),
        }
    }
}
