mod config;

use std::fmt;

use serde::Serialize;

pub use config::{TrendConfig, DEFAULT_PEAK_HOLD_MS};

/// A trend filter for a single scalar metric, such as a bitrate estimate.
///
/// Rises are reported immediately. Drops are masked by the most recent peak
/// until that peak is older than the hold window, at which point the lower
/// sample becomes the new peak. Timestamps are supplied by the caller in
/// monotonic milliseconds and must never go backwards.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TrendCalculator {
    value: u32,
    last_sample: u32,
    last_now_ms: u64,
    highest_value: u32,
    highest_value_updated_at_ms: u64,
    peak_hold_ms: u64,
}

/// Which way the filter is currently reporting.
#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TrendState {
    /// The reported value is the latest sample.
    TrackingRise,
    /// The reported value is a held peak above the latest sample.
    HoldingPeak,
}

impl fmt::Display for TrendState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrendState::TrackingRise => write!(f, "tracking"),
            TrendState::HoldingPeak => write!(f, "holding"),
        }
    }
}

impl Default for TrendCalculator {
    fn default() -> Self {
        Self::with_peak_hold_ms(DEFAULT_PEAK_HOLD_MS)
    }
}

impl From<TrendConfig> for TrendCalculator {
    fn from(config: TrendConfig) -> Self {
        Self::from_config(&config)
    }
}

impl TrendCalculator {
    /// Creates a calculator with the default hold window.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a calculator that trusts a peak for `peak_hold_ms` milliseconds.
    pub const fn with_peak_hold_ms(peak_hold_ms: u64) -> Self {
        Self {
            value: 0,
            last_sample: 0,
            last_now_ms: 0,
            highest_value: 0,
            highest_value_updated_at_ms: 0,
            peak_hold_ms,
        }
    }

    pub fn from_config(config: &TrendConfig) -> Self {
        Self::with_peak_hold_ms(config.peak_hold_ms)
    }

    /// The current smoothed value. Zero before the first update.
    pub fn value(&self) -> u32 {
        self.value
    }

    pub fn highest_value(&self) -> u32 {
        self.highest_value
    }

    pub fn highest_value_updated_at_ms(&self) -> u64 {
        self.highest_value_updated_at_ms
    }

    pub fn peak_hold_ms(&self) -> u64 {
        self.peak_hold_ms
    }

    pub fn state(&self) -> TrendState {
        if self.value > self.last_sample {
            TrendState::HoldingPeak
        } else {
            TrendState::TrackingRise
        }
    }

    /// Feeds in a new raw measurement taken at `now_ms`.
    pub fn update(&mut self, sample: u32, now_ms: u64) {
        self.observe(sample, now_ms);

        // zero doubles as "no peak yet"
        if self.highest_value == 0 || sample >= self.highest_value {
            self.set_peak(sample, now_ms);
            return;
        }

        let elapsed = now_ms.saturating_sub(self.highest_value_updated_at_ms);
        if elapsed <= self.peak_hold_ms {
            tracing::trace!(
                sample,
                now_ms,
                highest_value = self.highest_value,
                elapsed,
                "holding peak over dip"
            );
            self.value = self.highest_value;
        } else {
            tracing::trace!(
                sample,
                now_ms,
                highest_value = self.highest_value,
                elapsed,
                "held peak expired"
            );
            self.set_peak(sample, now_ms);
        }
    }

    /// Re-anchors the filter on `sample`, discarding any held peak.
    pub fn force_update(&mut self, sample: u32, now_ms: u64) {
        tracing::trace!(
            sample,
            now_ms,
            previous_peak = self.highest_value,
            "forced trend reset"
        );
        self.observe(sample, now_ms);
        self.set_peak(sample, now_ms);
    }

    fn observe(&mut self, sample: u32, now_ms: u64) {
        debug_assert!(
            now_ms >= self.last_now_ms,
            "trend timestamps went backwards: {now_ms} < {}",
            self.last_now_ms
        );
        self.last_sample = sample;
        self.last_now_ms = now_ms;
    }

    fn set_peak(&mut self, sample: u32, now_ms: u64) {
        self.highest_value = sample;
        self.highest_value_updated_at_ms = now_ms;
        self.value = sample;
    }
}
