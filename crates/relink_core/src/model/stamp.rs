//! Run timestamp captured once per run.
//!
//! # Responsibility
//! - Carry the single timestamp shared by every rendered fragment and by
//!   the backup directory name of one run.
//!
//! # Invariants
//! - Captured once at run start and read-only afterwards; core code never
//!   consults the ambient clock again, so a run is deterministic given this
//!   one value.

use chrono::{DateTime, Local};

/// The one wall-clock capture a run is allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunTimestamp(DateTime<Local>);

impl RunTimestamp {
    /// Captures the current local time. Call exactly once, at run start.
    pub fn now() -> Self {
        Self(Local::now())
    }

    /// Wraps a fixed datetime. Test and replay entry point.
    pub fn from_datetime(datetime: DateTime<Local>) -> Self {
        Self(datetime)
    }

    /// Human-readable rendering used in rendered fragments,
    /// e.g. `June 1, 2024 at 3:00 PM`.
    pub fn human(&self) -> String {
        self.0.format("%B %-d, %Y at %-I:%M %p").to_string()
    }

    /// Filesystem-safe rendering used as the backup run directory name,
    /// e.g. `2024-06-01T15-00-00+0200`.
    pub fn dir_name(&self) -> String {
        self.0.format("%Y-%m-%dT%H-%M-%S%z").to_string()
    }
}
