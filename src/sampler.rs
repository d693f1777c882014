#![allow(clippy::cast_precision_loss)]

use std::time::Instant;

use bytesize::ByteSize;
use log::{debug, info, trace};

use crate::interface::CounterReader;
use crate::routing::InterfaceResolver;
use crate::types::{CounterSnapshot, InterfaceName, RateResult};

/// Cycles between two route lookups once an interface is known
pub const INTERFACE_RECHECK_CYCLES: u32 = 10;

/// Longest gap between samples that still yields a rate
pub const MAX_SAMPLE_GAP_SECS: f64 = 10.0;

/// Monotonic time source in microseconds
pub trait Clock: Send {
    fn now_micros(&self) -> u64;
}

/// `CLOCK_MONOTONIC` in microseconds, unaffected by wall-clock changes
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl MonotonicClock {
    #[must_use]
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Clock for MonotonicClock {
    fn now_micros(&self) -> u64 {
        #[cfg(unix)]
        {
            use nix::time::{clock_gettime, ClockId};

            if let Ok(ts) = clock_gettime(ClockId::CLOCK_MONOTONIC) {
                let secs = u64::try_from(ts.tv_sec()).unwrap_or(0);
                let nanos = u64::try_from(ts.tv_nsec()).unwrap_or(0);
                return secs.saturating_mul(1_000_000).saturating_add(nanos / 1_000);
            }
        }

        u64::try_from(self.origin.elapsed().as_micros()).unwrap_or(u64::MAX)
    }
}

/// Byte count accumulated between two cumulative counter readings.
///
/// A counter that went backwards was reset, so everything it holds now was
/// accumulated since the reset.
#[must_use]
pub const fn counter_delta(previous: u64, current: u64) -> u64 {
    if current >= previous {
        current - previous
    } else {
        current
    }
}

/// Mutable sampling state, owned by a single [`RateSampler`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SampleState {
    /// Baseline for the next delta computation
    pub last_snapshot: CounterSnapshot,
    /// Interface currently being sampled
    pub interface: Option<InterfaceName>,
    /// Cycles since the interface was last re-resolved
    pub cycles_since_resolve: u32,
}

/// Result of one sampling cycle
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SampleOutcome {
    /// Rates measured against the previous baseline
    Rate(RateResult),
    /// No interface is known yet
    NoInterface,
    /// Elapsed time was non-positive or too long; only the baseline moved
    Discarded,
}

impl SampleOutcome {
    /// Rates to show for this cycle, `None` if the display should keep its
    /// previous text
    #[must_use]
    pub const fn display_rates(&self) -> Option<RateResult> {
        match self {
            Self::Rate(rates) => Some(*rates),
            Self::NoInterface => Some(RateResult::zero()),
            Self::Discarded => None,
        }
    }
}

/// Turns successive counter snapshots into download/upload rates
pub struct RateSampler {
    resolver: InterfaceResolver,
    reader: CounterReader,
    clock: Box<dyn Clock>,
    state: SampleState,
}

impl RateSampler {
    /// Create a sampler and take the initial baseline snapshot
    pub fn new(
        resolver: InterfaceResolver,
        reader: CounterReader,
        clock: impl Clock + 'static,
    ) -> Self {
        let mut sampler = Self {
            resolver,
            reader,
            clock: Box::new(clock),
            state: SampleState::default(),
        };
        let (rx_bytes, tx_bytes) = sampler.read_active_counters();
        sampler.state.last_snapshot =
            CounterSnapshot::new(rx_bytes, tx_bytes, sampler.clock.now_micros());
        sampler
    }

    /// Sampler over `ip route get 1`, `/proc/net/dev` and `CLOCK_MONOTONIC`
    #[must_use]
    pub fn system() -> Self {
        Self::new(
            InterfaceResolver::default(),
            CounterReader::default(),
            MonotonicClock::new(),
        )
    }

    #[must_use]
    pub const fn state(&self) -> &SampleState {
        &self.state
    }

    /// Interface currently being sampled
    #[must_use]
    pub fn interface(&self) -> Option<&str> {
        self.state.interface.as_deref()
    }

    /// Run one sampling cycle
    pub fn sample(&mut self) -> SampleOutcome {
        let now = self.clock.now_micros();
        let (rx_bytes, tx_bytes) = self.read_active_counters();

        let snapshot = CounterSnapshot::new(rx_bytes, tx_bytes, now);
        let previous = std::mem::replace(&mut self.state.last_snapshot, snapshot);

        if self.state.interface.is_none() {
            return SampleOutcome::NoInterface;
        }

        let elapsed = snapshot.seconds_since(&previous);
        if elapsed <= 0.0 || elapsed > MAX_SAMPLE_GAP_SECS {
            debug!("Discarding sample after {elapsed:.3}s, baseline reset");
            return SampleOutcome::Discarded;
        }

        let rx_delta = counter_delta(previous.rx_bytes, rx_bytes);
        let tx_delta = counter_delta(previous.tx_bytes, tx_bytes);

        SampleOutcome::Rate(RateResult::new(
            rx_delta as f64 / elapsed,
            tx_delta as f64 / elapsed,
        ))
    }

    /// Re-resolve the interface when due, then read its counters
    fn read_active_counters(&mut self) -> (u64, u64) {
        self.refresh_interface();

        let Some(iface) = self.state.interface.as_deref() else {
            return (0, 0);
        };

        let (rx_bytes, tx_bytes) = self.reader.read_counters(iface);
        trace!(
            "{iface}: rx {} tx {}",
            ByteSize(rx_bytes),
            ByteSize(tx_bytes)
        );
        (rx_bytes, tx_bytes)
    }

    fn refresh_interface(&mut self) {
        self.state.cycles_since_resolve += 1;
        if self.state.interface.is_some()
            && self.state.cycles_since_resolve < INTERFACE_RECHECK_CYCLES
        {
            return;
        }

        if let Some(iface) = self.resolver.resolve() {
            if self.state.interface.as_deref() != Some(iface.as_str()) {
                info!("Sampling interface {iface}");
            }
            self.state.interface = Some(iface);
        }
        self.state.cycles_since_resolve = 0;
    }
}

impl std::fmt::Debug for RateSampler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateSampler")
            .field("resolver", &self.resolver)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}
