use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessInfo {
    pub timestamp: String,
    pub summary: ProcessSummary,
    pub top_processes: Vec<ProcessEntry>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ProcessSummary {
    pub total: usize,
    pub running: usize,
    pub sleeping: usize,
    pub stopped: usize,
    pub zombie: usize,
}

impl ProcessSummary {
    /// Counts one process by its state letter.
    pub fn count_state(&mut self, state: char) {
        match state {
            'R' => self.running += 1,
            'S' => self.sleeping += 1,
            'T' => self.stopped += 1,
            'Z' => self.zombie += 1,
            _ => {}
        }
    }
}

/// One row of the top-N process list.
///
/// Rows parsed from `top` carry only pid, user, CPU/memory share, and
/// command; the `ps` columns stay unset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessEntry {
    pub user: String,
    pub pid: u32,
    pub cpu_percent: f64,
    pub mem_percent: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vsz: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rss: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tty: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stat: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    pub command: String,
}
