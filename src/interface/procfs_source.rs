use crate::interface::StatsSource;
use crate::{Error, Result};

/// Statistics source backed by the `procfs` crate's `/proc/net/dev` parser
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcfsDevStatus;

impl StatsSource for ProcfsDevStatus {
    fn read_counters(&self, iface: &str) -> Result<(u64, u64)> {
        let devices = procfs::net::dev_status()
            .map_err(|e| Error::resource_access(crate::interface::PROC_NET_DEV, e.to_string()))?;

        devices
            .get(iface)
            .map(|status| (status.recv_bytes, status.sent_bytes))
            .ok_or_else(|| Error::interface_not_found(iface))
    }
}
