use std::path::PathBuf;
use std::time::SystemTime;

use library::LibraryStats;

/// Snapshot shared with handles so they can read scan state without a round trip.
#[derive(Clone, Debug, PartialEq)]
pub enum EngineStatus {
    Idle,
    Scanning { root: PathBuf, started: SystemTime },
    Ready(LibraryStats),
    Stopped,
}

impl EngineStatus {
    pub fn is_scanning(&self) -> bool {
        matches!(self, EngineStatus::Scanning { .. })
    }
}
