#![allow(clippy::cast_precision_loss)]

use std::str::FromStr;
use std::time::Duration;

#[cfg(feature = "serde-support")]
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Name of a network device, e.g. `eth0` or `wlp3s0`
pub type InterfaceName = String;

/// Shortest timer period the scheduler will run with
pub const MIN_UPDATE_PERIOD: Duration = Duration::from_millis(500);

/// A single read of cumulative interface counters plus a monotonic timestamp
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub struct CounterSnapshot {
    /// Cumulative bytes received
    pub rx_bytes: u64,
    /// Cumulative bytes transmitted
    pub tx_bytes: u64,
    /// Monotonic clock reading in microseconds
    pub taken_at_micros: u64,
}

impl CounterSnapshot {
    /// Create a new snapshot
    #[must_use]
    pub const fn new(rx_bytes: u64, tx_bytes: u64, taken_at_micros: u64) -> Self {
        Self {
            rx_bytes,
            tx_bytes,
            taken_at_micros,
        }
    }

    /// Seconds elapsed since `earlier`; negative if the clock went backwards
    #[must_use]
    pub fn seconds_since(&self, earlier: &Self) -> f64 {
        (self.taken_at_micros as f64 - earlier.taken_at_micros as f64) / 1_000_000.0
    }
}

/// Per-cycle throughput in bytes per second
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub struct RateResult {
    /// Download rate
    pub rx_bytes_per_sec: f64,
    /// Upload rate
    pub tx_bytes_per_sec: f64,
}

impl RateResult {
    #[must_use]
    pub const fn new(rx_bytes_per_sec: f64, tx_bytes_per_sec: f64) -> Self {
        Self {
            rx_bytes_per_sec,
            tx_bytes_per_sec,
        }
    }

    /// The all-zero result used when there is nothing to measure
    #[must_use]
    pub const fn zero() -> Self {
        Self::new(0.0, 0.0)
    }
}

/// Policy for the unit a rate is rendered in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub enum UnitMode {
    /// KB/s below 1000 KiB/s, MB/s from there on
    #[default]
    Auto,
    /// Always KB/s
    Kb,
    /// Always MB/s
    Mb,
}

impl UnitMode {
    /// Map the integer stored under `unit-mode`.
    ///
    /// Unknown values fall back to [`UnitMode::Auto`].
    #[must_use]
    pub const fn from_setting(value: i32) -> Self {
        match value {
            1 => Self::Kb,
            2 => Self::Mb,
            _ => Self::Auto,
        }
    }

    /// The integer stored under `unit-mode`
    #[must_use]
    pub const fn as_setting(self) -> i32 {
        match self {
            Self::Auto => 0,
            Self::Kb => 1,
            Self::Mb => 2,
        }
    }
}

impl std::fmt::Display for UnitMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Auto => write!(f, "auto"),
            Self::Kb => write!(f, "kb"),
            Self::Mb => write!(f, "mb"),
        }
    }
}

impl FromStr for UnitMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" | "0" => Ok(Self::Auto),
            "kb" | "kb/s" | "1" => Ok(Self::Kb),
            "mb" | "mb/s" | "2" => Ok(Self::Mb),
            other => Err(Error::invalid_format(
                "unit-mode",
                format!("expected auto, kb or mb, got '{other}'"),
            )),
        }
    }
}

/// Display configuration read from the settings store
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub struct DisplayConfig {
    pub show_download: bool,
    pub show_upload: bool,
    pub unit_mode: UnitMode,
    pub update_interval_secs: f64,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            show_download: true,
            show_upload: true,
            unit_mode: UnitMode::Auto,
            update_interval_secs: 1.0,
        }
    }
}

impl DisplayConfig {
    /// Timer period for the configured interval, never shorter than
    /// [`MIN_UPDATE_PERIOD`]
    #[must_use]
    pub fn timer_period(&self) -> Duration {
        let secs = self.update_interval_secs;
        if !secs.is_finite() || secs <= MIN_UPDATE_PERIOD.as_secs_f64() {
            return MIN_UPDATE_PERIOD;
        }
        Duration::try_from_secs_f64(secs).unwrap_or(MIN_UPDATE_PERIOD)
    }
}
