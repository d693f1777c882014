use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, trace, warn};

use crate::{Error, Result};

/// Kernel per-interface statistics table
pub const PROC_NET_DEV: &str = "/proc/net/dev";

/// Index of the transmitted-bytes field after the device name
const TX_BYTES_FIELD: usize = 8;

/// Source of a `/proc/net/dev` formatted statistics table
#[cfg_attr(test, mockall::automock)]
pub trait StatsSource: Send {
    /// Read cumulative `(rx_bytes, tx_bytes)` for `iface`
    ///
    /// # Errors
    /// Returns an error if the table cannot be read or has no line for `iface`
    fn read_counters(&self, iface: &str) -> Result<(u64, u64)>;
}

/// Reads counters from a file in `/proc/net/dev` format
#[derive(Debug, Clone)]
pub struct ProcNetDev {
    path: PathBuf,
}

impl Default for ProcNetDev {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcNetDev {
    /// Read from the kernel's `/proc/net/dev`
    #[must_use]
    pub fn new() -> Self {
        Self::with_path(PROC_NET_DEV)
    }

    /// Read from an alternate file with the same layout
    #[must_use]
    pub fn with_path(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StatsSource for ProcNetDev {
    fn read_counters(&self, iface: &str) -> Result<(u64, u64)> {
        let table = fs::read_to_string(&self.path)
            .map_err(|e| Error::resource_access(self.path.display().to_string(), e.to_string()))?;

        parse_counters(&table, iface).ok_or_else(|| Error::interface_not_found(iface))
    }
}

/// Find `iface` in a `/proc/net/dev` table and return its `(rx_bytes, tx_bytes)`.
///
/// Lines look like `  eth0: 1234 10 0 0 0 0 0 0 5678 12 0 0 0 0 0 0`. A field
/// that is not a number reads as 0. Lines with fewer than nine counters are
/// skipped.
#[must_use]
pub fn parse_counters(table: &str, iface: &str) -> Option<(u64, u64)> {
    for line in table.lines() {
        let Some((name, rest)) = line.trim().split_once(':') else {
            continue;
        };
        if name.trim_end() != iface {
            continue;
        }

        let fields: Vec<&str> = rest.split_whitespace().collect();
        if fields.len() <= TX_BYTES_FIELD {
            trace!("Skipping short statistics line for {iface}: {line}");
            continue;
        }

        let rx = fields[0].parse().unwrap_or(0);
        let tx = fields[TX_BYTES_FIELD].parse().unwrap_or(0);
        return Some((rx, tx));
    }

    None
}

/// Reads counters for one interface, degrading every failure to `(0, 0)`
pub struct CounterReader {
    source: Box<dyn StatsSource>,
}

impl Default for CounterReader {
    fn default() -> Self {
        Self::new(ProcNetDev::new())
    }
}

impl CounterReader {
    /// Create a reader over any statistics source
    pub fn new(source: impl StatsSource + 'static) -> Self {
        Self {
            source: Box::new(source),
        }
    }

    /// Cumulative `(rx_bytes, tx_bytes)` for `iface`, or `(0, 0)` if unavailable
    #[must_use]
    pub fn read_counters(&self, iface: &str) -> (u64, u64) {
        match self.source.read_counters(iface) {
            Ok(counters) => counters,
            Err(Error::InterfaceNotFound { name }) => {
                debug!("No statistics line for interface {name}");
                (0, 0)
            }
            Err(e) => {
                warn!("Error reading interface statistics: {e}");
                (0, 0)
            }
        }
    }
}

impl std::fmt::Debug for CounterReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CounterReader").finish_non_exhaustive()
    }
}
