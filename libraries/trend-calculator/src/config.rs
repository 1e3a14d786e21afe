use serde::{Deserialize, Serialize};

/// How long a remembered peak is trusted by default, in milliseconds.
pub const DEFAULT_PEAK_HOLD_MS: u64 = 2000;

/// Tuning for a [`crate::TrendCalculator`].
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct TrendConfig {
    /// Maximum age of a held peak before a lower sample replaces it.
    #[serde(default = "default_peak_hold_ms")]
    pub peak_hold_ms: u64,
}

fn default_peak_hold_ms() -> u64 {
    DEFAULT_PEAK_HOLD_MS
}

impl Default for TrendConfig {
    fn default() -> Self {
        Self {
            peak_hold_ms: DEFAULT_PEAK_HOLD_MS,
        }
    }
}
