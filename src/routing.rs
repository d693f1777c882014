use std::process::Command;

use log::{debug, warn};

use crate::interface::is_ignored_interface;
use crate::types::InterfaceName;
use crate::{Error, Result};

/// Destination whose route identifies the internet-facing interface
pub const ROUTE_PROBE_TARGET: &str = "1";

/// Runs a "get route to target" query and returns its textual output
#[cfg_attr(test, mockall::automock)]
pub trait RouteQuery: Send {
    /// Query the route used to reach [`ROUTE_PROBE_TARGET`]
    ///
    /// # Errors
    /// Returns an error if the query cannot be run or exits unsuccessfully
    fn route_output(&self) -> Result<String>;
}

/// Route query backed by iproute2's `ip route get`
#[derive(Debug, Clone)]
pub struct IpRouteQuery {
    program: String,
}

impl Default for IpRouteQuery {
    fn default() -> Self {
        Self::new()
    }
}

impl IpRouteQuery {
    #[must_use]
    pub fn new() -> Self {
        Self {
            program: "ip".to_string(),
        }
    }

    /// Use a different `ip` executable
    #[must_use]
    pub fn program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }
}

impl RouteQuery for IpRouteQuery {
    fn route_output(&self) -> Result<String> {
        let output = Command::new(&self.program)
            .args(["route", "get", ROUTE_PROBE_TARGET])
            .output()?;

        if !output.status.success() {
            return Err(Error::command_failed(
                format!("{} route get {ROUTE_PROBE_TARGET}", self.program),
                output.status.code().unwrap_or(-1),
            ));
        }

        Ok(String::from_utf8(output.stdout)?)
    }
}

/// Extract the egress device from route query output.
///
/// `1.0.0.0 via 192.168.1.1 dev eth0 src 192.168.1.100 uid 1000` yields `eth0`.
#[must_use]
pub fn parse_route_device(output: &str) -> Option<&str> {
    let mut tokens = output.split_whitespace();
    while let Some(token) = tokens.next() {
        if token == "dev" {
            return tokens.next();
        }
    }
    None
}

enum Strategy {
    Route(Box<dyn RouteQuery>),
    Pinned(InterfaceName),
}

/// Determines which interface currently carries default-route traffic
pub struct InterfaceResolver {
    strategy: Strategy,
}

impl Default for InterfaceResolver {
    fn default() -> Self {
        Self::new(IpRouteQuery::new())
    }
}

impl InterfaceResolver {
    /// Resolve through a route query
    pub fn new(query: impl RouteQuery + 'static) -> Self {
        Self {
            strategy: Strategy::Route(Box::new(query)),
        }
    }

    /// Always resolve to `name`, bypassing the route query and the ignore list
    pub fn pinned(name: impl Into<InterfaceName>) -> Self {
        Self {
            strategy: Strategy::Pinned(name.into()),
        }
    }

    /// The current egress interface, or `None` if it cannot be determined.
    ///
    /// Loopback, container, hypervisor and tunnel devices are never returned
    /// by route resolution.
    #[must_use]
    pub fn resolve(&self) -> Option<InterfaceName> {
        let query = match &self.strategy {
            Strategy::Pinned(name) => return Some(name.clone()),
            Strategy::Route(query) => query,
        };

        let output = match query.route_output() {
            Ok(output) => output,
            Err(e) => {
                warn!("Error detecting active interface: {e}");
                return None;
            }
        };

        let Some(device) = parse_route_device(&output) else {
            debug!("No device in route output: {}", output.trim());
            return None;
        };

        if is_ignored_interface(device) {
            debug!("Ignoring virtual egress interface {device}");
            return None;
        }

        Some(device.to_string())
    }
}

impl std::fmt::Debug for InterfaceResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.strategy {
            Strategy::Route(_) => f.debug_tuple("InterfaceResolver::Route").finish(),
            Strategy::Pinned(name) => f
                .debug_tuple("InterfaceResolver::Pinned")
                .field(name)
                .finish(),
        }
    }
}
