mod counters;
#[cfg(feature = "linux-procfs")]
mod procfs_source;

pub use counters::{parse_counters, CounterReader, ProcNetDev, StatsSource, PROC_NET_DEV};
#[cfg(feature = "linux-procfs")]
pub use procfs_source::ProcfsDevStatus;

#[cfg(test)]
pub use counters::MockStatsSource;

/// Interface name prefixes that never count as internet egress.
///
/// Loopback, container bridges and veth pairs, hypervisor NICs and
/// tunnel/tap devices.
pub const IGNORED_INTERFACE_PREFIXES: [&str; 9] = [
    "lo", "docker", "br-", "veth", "virbr", "vmnet", "vboxnet", "tun", "tap",
];

/// Check if an interface should be ignored when looking for the egress device
#[must_use]
pub fn is_ignored_interface(name: &str) -> bool {
    IGNORED_INTERFACE_PREFIXES
        .iter()
        .any(|prefix| name.starts_with(prefix))
}
