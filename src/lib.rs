#![cfg_attr(docsrs, feature(doc_cfg))]

//! # Netspeed
//!
//! A network throughput sampler for the interface that carries default-route
//! traffic.
//!
//! This crate provides:
//! - Egress interface resolution via the routing table, skipping loopback,
//!   container, hypervisor and tunnel devices
//! - Cumulative byte counters from `/proc/net/dev`
//! - Download/upload rates from successive counter snapshots, tolerant of
//!   counter resets, clock anomalies and suspend/resume
//! - `KB/s` / `MB/s` rendering and a timer-driven indicator that pushes the
//!   text to a host display surface
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use netspeed::{format_speed, RateSampler, SampleOutcome, UnitMode};
//! use std::thread;
//! use std::time::Duration;
//!
//! let mut sampler = RateSampler::system();
//! thread::sleep(Duration::from_secs(1));
//!
//! if let SampleOutcome::Rate(rates) = sampler.sample() {
//!     println!("down {}", format_speed(rates.rx_bytes_per_sec, UnitMode::Auto));
//!     println!("up   {}", format_speed(rates.tx_bytes_per_sec, UnitMode::Auto));
//! }
//! ```
//!
//! ## Features
//!
//! - `linux-procfs` - Read counters through the `procfs` crate
//! - `serde-support` - Enable serialization support for the data model types

mod error;
mod types;

pub mod format;
pub mod interface;
pub mod monitor;
pub mod routing;
pub mod sampler;
pub mod settings;

// Re-export core types
pub use error::{Error, Result};
pub use types::{
    CounterSnapshot, DisplayConfig, InterfaceName, RateResult, UnitMode, MIN_UPDATE_PERIOD,
};

// Interface resolution and counters
pub use interface::{is_ignored_interface, CounterReader, ProcNetDev, StatsSource};
pub use routing::{InterfaceResolver, IpRouteQuery, RouteQuery};

// Sampling and rendering
pub use format::{compose_display, format_speed, PLACEHOLDER};
pub use sampler::{Clock, MonotonicClock, RateSampler, SampleOutcome, SampleState};

// Scheduling and settings
pub use monitor::{DisplaySurface, SpeedIndicator};
pub use settings::{MemorySettings, SettingKey, SettingsStore, SubscriptionHandle};
