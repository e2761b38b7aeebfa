// src/types.rs

use std::fmt;
use std::num::NonZeroU32;

use serde::Deserialize;

/// How many straggler rounds a submission tolerates before its dependencies
/// are declared failed.
///
/// Deserialized from an integer where `0` means unlimited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(from = "u32")]
pub enum RoundLimit {
    /// Keep polling (and reporting stragglers) forever.
    #[default]
    Unlimited,
    /// Fail after this many rounds ended with stragglers.
    Rounds(NonZeroU32),
}

impl RoundLimit {
    /// `0` is unlimited.
    pub fn rounds(n: u32) -> Self {
        match NonZeroU32::new(n) {
            Some(n) => RoundLimit::Rounds(n),
            None => RoundLimit::Unlimited,
        }
    }

    /// Whether `completed` straggler rounds use up the limit.
    pub fn is_exhausted(&self, completed: u32) -> bool {
        match self {
            RoundLimit::Unlimited => false,
            RoundLimit::Rounds(max) => completed >= max.get(),
        }
    }
}

impl From<u32> for RoundLimit {
    fn from(n: u32) -> Self {
        RoundLimit::rounds(n)
    }
}

impl fmt::Display for RoundLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoundLimit::Unlimited => f.write_str("unlimited"),
            RoundLimit::Rounds(n) => write!(f, "{n}"),
        }
    }
}
