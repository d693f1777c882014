//! Scripted route, statistics and clock sources shared by the integration tests

#![allow(dead_code)]

use netspeed::{Clock, Error, Result, RouteQuery, StatsSource};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Clock whose reading is set by the test
#[derive(Clone, Default)]
pub struct ManualClock(Arc<AtomicU64>);

impl ManualClock {
    pub fn set_secs(&self, secs: f64) {
        self.0.store((secs * 1_000_000.0) as u64, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_micros(&self) -> u64 {
        self.0.load(Ordering::SeqCst)
    }
}

/// Statistics source that serves a table held in memory
#[derive(Clone, Default)]
pub struct TableSource(Arc<Mutex<String>>);

impl TableSource {
    pub fn set_counters(&self, iface: &str, rx: u64, tx: u64) {
        *self.0.lock().unwrap() = format!(
            "Inter-|   Receive                                                |  Transmit\n \
             face |bytes    packets errs drop fifo frame compressed multicast|bytes    packets errs drop fifo colls carrier compressed\n    \
             lo:  5000  50 0 0 0 0 0 0  5000  50 0 0 0 0 0 0\n  \
             {iface}: {rx} 10 0 0 0 0 0 0 {tx} 10 0 0 0 0 0 0\n"
        );
    }
}

impl StatsSource for TableSource {
    fn read_counters(&self, iface: &str) -> Result<(u64, u64)> {
        let table = self.0.lock().unwrap();
        netspeed::interface::parse_counters(&table, iface)
            .ok_or_else(|| Error::interface_not_found(iface))
    }
}

/// Route query answering with a configurable egress device
#[derive(Clone, Default)]
pub struct ScriptedRoute {
    device: Arc<Mutex<Option<String>>>,
    calls: Arc<AtomicUsize>,
}

impl ScriptedRoute {
    pub fn via(device: &str) -> Self {
        let route = Self::default();
        route.set_device(Some(device));
        route
    }

    pub fn set_device(&self, device: Option<&str>) {
        *self.device.lock().unwrap() = device.map(str::to_string);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl RouteQuery for ScriptedRoute {
    fn route_output(&self) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.device.lock().unwrap().as_deref() {
            Some(dev) => Ok(format!(
                "1.0.0.0 via 192.168.1.1 dev {dev} src 192.168.1.100 uid 1000\n    cache\n"
            )),
            None => Err(Error::command_failed("ip route get 1", 2)),
        }
    }
}

/// Clock that advances by one second on every reading
#[derive(Clone, Default)]
pub struct SteppingClock(Arc<AtomicU64>);

impl Clock for SteppingClock {
    fn now_micros(&self) -> u64 {
        self.0.fetch_add(1_000_000, Ordering::SeqCst)
    }
}
