use serde::Serialize;

/// General host information.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SystemInfo {
    pub timestamp: String,
    pub uptime: String,
    pub hostname: String,
    /// Interpreter or agent version string; the key predates the agent.
    pub python_version: String,
    pub system_time: String,
    pub current_dir: String,
}
