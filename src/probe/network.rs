//! Network probe
//!
//! One-shot interface enumeration plus an optional external speed test.
//! Both halves report failure through [`ProbeOutcome`] so a missing
//! `speedtest` utility never aborts the rest of the report.

use super::{run_utility, ProbeOutcome};
use crate::error::{OctaneError, Result};
use crate::rating::{self, ComponentRating};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use sysinfo::Networks;
use tracing::info;

/// External speed test utility
pub const SPEEDTEST_PROGRAM: &str = "speedtest";

/// One network interface
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterfaceInfo {
    /// Interface name
    pub name: String,
    /// IPv4 addresses
    pub addresses: Vec<String>,
    /// IPv6 addresses
    pub ipv6: Vec<String>,
    /// MAC address
    pub mac: Option<String>,
    /// Is this interface up?
    pub is_up: bool,
}

impl InterfaceInfo {
    fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            addresses: Vec::new(),
            ipv6: Vec::new(),
            mac: None,
            is_up: false,
        }
    }
}

impl fmt::Display for InterfaceInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, if self.is_up { "up" } else { "down" })?;
        if let Some(mac) = &self.mac {
            write!(f, " mac={}", mac)?;
        }
        if !self.addresses.is_empty() {
            write!(f, " ipv4={}", self.addresses.join(","))?;
        }
        if !self.ipv6.is_empty() {
            write!(f, " ipv6={}", self.ipv6.join(","))?;
        }
        Ok(())
    }
}

/// Enumerate network interfaces with their addresses
pub fn collect_interfaces() -> Result<Vec<InterfaceInfo>> {
    let mut interfaces: BTreeMap<String, InterfaceInfo> = BTreeMap::new();

    #[cfg(unix)]
    {
        use nix::ifaddrs::getifaddrs;
        use nix::net::if_::InterfaceFlags;
        use std::net::{SocketAddrV4, SocketAddrV6};

        let addrs = getifaddrs()
            .map_err(|e| OctaneError::probe("network", format!("getifaddrs failed: {}", e)))?;

        for ifaddr in addrs {
            let entry = interfaces
                .entry(ifaddr.interface_name.clone())
                .or_insert_with(|| InterfaceInfo::named(&ifaddr.interface_name));

            if ifaddr.flags.contains(InterfaceFlags::IFF_UP) {
                entry.is_up = true;
            }

            if let Some(address) = ifaddr.address {
                if let Some(sin) = address.as_sockaddr_in() {
                    entry.addresses.push(SocketAddrV4::from(*sin).ip().to_string());
                } else if let Some(sin6) = address.as_sockaddr_in6() {
                    entry.ipv6.push(SocketAddrV6::from(*sin6).ip().to_string());
                }
            }
        }
    }

    let networks = Networks::new_with_refreshed_list();
    for (name, data) in networks.iter() {
        let entry = interfaces
            .entry(name.clone())
            .or_insert_with(|| InterfaceInfo::named(name));

        let mac = data.mac_address().to_string();
        if mac != "00:00:00:00:00:00" {
            entry.mac = Some(mac);
        }

        #[cfg(not(unix))]
        {
            entry.is_up = true;
        }
    }

    Ok(interfaces.into_values().collect())
}

/// Parsed speed test output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeedTestResult {
    /// Download speed in Mbit/s
    pub download_mbps: f64,
    /// Upload speed in Mbit/s
    pub upload_mbps: f64,
    /// Latency in milliseconds
    pub ping_ms: f64,
    /// Server the test ran against
    pub server: Option<String>,
}

impl fmt::Display for SpeedTestResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "download {:.1} Mbit/s, upload {:.1} Mbit/s, ping {:.1} ms",
            self.download_mbps, self.upload_mbps, self.ping_ms
        )?;
        if let Some(server) = &self.server {
            write!(f, " via {}", server)?;
        }
        Ok(())
    }
}

#[derive(Deserialize)]
struct RawSpeedTest {
    download: f64,
    upload: f64,
    ping: f64,
    #[serde(default)]
    server: Option<RawServer>,
}

#[derive(Deserialize)]
struct RawServer {
    #[serde(default)]
    sponsor: Option<String>,
    #[serde(default)]
    name: Option<String>,
}

/// Parse `speedtest --json` output (speeds in bit/s)
pub fn parse_speedtest_output(output: &str) -> Result<SpeedTestResult> {
    let raw: RawSpeedTest = serde_json::from_str(output)
        .map_err(|e| OctaneError::probe("network", format!("unexpected speedtest output: {}", e)))?;

    let server = raw.server.and_then(|s| match (s.sponsor, s.name) {
        (Some(sponsor), Some(name)) => Some(format!("{} ({})", sponsor, name)),
        (sponsor, name) => sponsor.or(name),
    });

    Ok(SpeedTestResult {
        download_mbps: raw.download / 1_000_000.0,
        upload_mbps: raw.upload / 1_000_000.0,
        ping_ms: raw.ping,
        server,
    })
}

/// Run the external speed test
pub fn run_speedtest() -> ProbeOutcome<SpeedTestResult> {
    info!("Running speed test...");
    run_utility("network", SPEEDTEST_PROGRAM, &["--json"])
        .and_then(|stdout| parse_speedtest_output(&stdout))
        .into()
}

/// Network test report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkReport {
    /// Interface enumeration
    pub interfaces: ProbeOutcome<Vec<InterfaceInfo>>,
    /// Speed test, absent when skipped
    pub speedtest: Option<ProbeOutcome<SpeedTestResult>>,
    /// Octane rating of the download speed, present when the speed test succeeded
    pub rating: Option<ComponentRating>,
}

impl NetworkReport {
    /// Assemble a report, rating a successful speed test against `baseline`
    pub fn new(
        interfaces: ProbeOutcome<Vec<InterfaceInfo>>,
        speedtest: Option<ProbeOutcome<SpeedTestResult>>,
        baseline: &str,
    ) -> Self {
        let rating = match &speedtest {
            Some(ProbeOutcome::Success { value }) => Some(ComponentRating::rate(
                value.download_mbps,
                rating::baseline(baseline).network,
            )),
            _ => None,
        };
        Self {
            interfaces,
            speedtest,
            rating,
        }
    }

    /// True when every attempted probe succeeded
    pub fn is_success(&self) -> bool {
        self.interfaces.is_success() && self.speedtest.as_ref().map_or(true, |s| s.is_success())
    }
}

impl fmt::Display for NetworkReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Network Information ===")?;
        match &self.interfaces {
            ProbeOutcome::Success { value } => {
                for iface in value {
                    writeln!(f, "  {}", iface)?;
                }
            }
            ProbeOutcome::Failed { reason } => writeln!(f, "  Failed to enumerate interfaces: {}", reason)?,
        }
        match &self.speedtest {
            Some(ProbeOutcome::Success { value }) => writeln!(f, "Speed test: {}", value)?,
            Some(ProbeOutcome::Failed { reason }) => {
                writeln!(f, "Failed to retrieve speed test results: {}", reason)?
            }
            None => writeln!(f, "Speed test: skipped")?,
        }
        if let Some(rating) = &self.rating {
            writeln!(f, "Rating: {}", rating)?;
        }
        Ok(())
    }
}

/// Enumerate interfaces and optionally run the speed test, rated against `baseline`
pub fn run_network_test(speedtest: bool, baseline: &str) -> NetworkReport {
    info!("Collecting network information...");
    NetworkReport::new(collect_interfaces().into(), speedtest.then(run_speedtest), baseline)
}
