// src/boot/status.rs

//! Boot status lines and where they go.

use std::fmt;

/// Emitted when every required job succeeded.
pub const BOOT_COMPLETED: &str = "VIRTUAL_DEVICE_BOOT_COMPLETED";
/// Prefix of the periodic "still waiting" line.
pub const BOOT_PENDING: &str = "VIRTUAL_DEVICE_BOOT_PENDING";
/// Prefix of the line emitted when a required job failed.
pub const BOOT_FAILED: &str = "VIRTUAL_DEVICE_BOOT_FAILED";

/// A boot status report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BootStatus {
    /// Still waiting on the named jobs.
    Pending(Vec<String>),
    Completed,
    /// Boot cannot complete; carries the reason.
    Failed(String),
}

impl fmt::Display for BootStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BootStatus::Pending(names) => write!(f, "{BOOT_PENDING}: {}", names.join(", ")),
            BootStatus::Completed => f.write_str(BOOT_COMPLETED),
            BootStatus::Failed(reason) => write!(f, "{BOOT_FAILED}: {reason}"),
        }
    }
}

/// Destination for boot status lines (console, kernel log, ...).
pub trait StatusSink: Send + Sync {
    fn report(&self, status: &BootStatus);
}

/// Prints status lines on stdout; logs go to stderr.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutSink;

impl StatusSink for StdoutSink {
    fn report(&self, status: &BootStatus) {
        println!("{status}");
    }
}
