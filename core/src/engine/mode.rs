use std::fmt;

use crate::context::AppConfig;

/// Which craft source drives craft lists. Exactly one is honoured at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrackerSource {
    /// Legacy craft start/fail/complete events
    CraftMonitor,
    /// Item acquisitions tagged with a reason
    AcquisitionTracker,
}

impl TrackerSource {
    /// Snapshot of the switch. Taken once per event, before anything is mutated.
    pub fn from_config(config: &AppConfig) -> Self {
        if config.use_old_craft_tracker {
            TrackerSource::CraftMonitor
        } else {
            TrackerSource::AcquisitionTracker
        }
    }
}

impl fmt::Display for TrackerSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrackerSource::CraftMonitor => write!(f, "craft monitor"),
            TrackerSource::AcquisitionTracker => write!(f, "acquisition tracker"),
        }
    }
}
