//! Host system description: OS, CPU, memory and byte order.
//!
//! On Linux the record is assembled from procfs. Other platforms report
//! [`HostError::UnsupportedPlatform`].

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::diag;

/// Longest string kept in a [`HostSystem`] field, matching the C record's
/// 256-byte buffers.
pub const FIELD_LIMIT: usize = 255;

#[derive(Debug, Error)]
pub enum HostError {
    #[error("host introspection is not supported on this platform")]
    UnsupportedPlatform,
    #[error("failed to read {path}: {source}")]
    Read {
        path: &'static str,
        #[source]
        source: std::io::Error,
    },
    #[error("{key} missing from {path}")]
    MissingField {
        path: &'static str,
        key: &'static str,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostSystem {
    pub os_name: String,
    pub os_version: String,
    pub cpu_model: String,
    pub cpu_cores: u32,
    pub total_memory_mb: u64,
    pub free_memory_mb: u64,
    pub is_big_endian: bool,
}

impl HostSystem {
    /// Probe the running host.
    pub fn query() -> Result<Self, HostError> {
        let result = query_platform();
        if let Err(err) = &result {
            diag::error("hostsys", "fossil_hostsys_get", format!("Error: {err}"));
        }
        result
    }

    /// `"Big Endian"` or `"Little Endian"` for this record.
    #[must_use]
    pub fn endian(&self) -> &'static str {
        if self.is_big_endian {
            "Big Endian"
        } else {
            "Little Endian"
        }
    }
}

impl fmt::Display for HostSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Operating System: {} {}", self.os_name, self.os_version)?;
        writeln!(f, "CPU: {}", self.cpu_model)?;
        writeln!(f, "Number of Cores: {}", self.cpu_cores)?;
        writeln!(f, "Total Memory: {} MB", self.total_memory_mb)?;
        writeln!(f, "Free Memory: {} MB", self.free_memory_mb)?;
        writeln!(f, "Endian: {}", self.endian())
    }
}

/// Byte order of the running build.
#[must_use]
pub fn endian_name() -> &'static str {
    if cfg!(target_endian = "big") {
        "Big Endian"
    } else {
        "Little Endian"
    }
}

/// Cut `s` to at most [`FIELD_LIMIT`] bytes on a char boundary.
#[must_use]
pub fn bounded(s: &str) -> String {
    if s.len() <= FIELD_LIMIT {
        return s.to_owned();
    }
    let mut end = FIELD_LIMIT;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    s[..end].to_owned()
}

/// Value of the first `model name` line in `/proc/cpuinfo` text.
#[must_use]
pub fn parse_cpu_model(cpuinfo: &str) -> Option<String> {
    cpuinfo
        .lines()
        .filter(|line| line.starts_with("model name"))
        .find_map(|line| line.split_once(':'))
        .map(|(_, value)| bounded(value.trim()))
}

/// Value in kB of `key` in `/proc/meminfo` text (e.g. `MemTotal`).
#[must_use]
pub fn parse_meminfo_kb(meminfo: &str, key: &str) -> Option<u64> {
    meminfo.lines().find_map(|line| {
        let (name, rest) = line.split_once(':')?;
        if name.trim() != key {
            return None;
        }
        rest.split_whitespace().next()?.parse().ok()
    })
}

#[cfg(target_os = "linux")]
fn query_platform() -> Result<HostSystem, HostError> {
    fn read(path: &'static str) -> Result<String, HostError> {
        std::fs::read_to_string(path).map_err(|source| HostError::Read { path, source })
    }

    const CPUINFO: &str = "/proc/cpuinfo";
    const MEMINFO: &str = "/proc/meminfo";

    let os_name = bounded(read("/proc/sys/kernel/ostype")?.trim());
    let os_version = bounded(read("/proc/sys/kernel/osrelease")?.trim());

    // Some architectures have no "model name" line.
    let cpu_model = parse_cpu_model(&read(CPUINFO)?).unwrap_or_default();

    let cpu_cores = std::thread::available_parallelism()
        .map(|n| u32::try_from(n.get()).unwrap_or(u32::MAX))
        .unwrap_or(1);

    let meminfo = read(MEMINFO)?;
    let total_kb = parse_meminfo_kb(&meminfo, "MemTotal").ok_or(HostError::MissingField {
        path: MEMINFO,
        key: "MemTotal",
    })?;
    let free_kb = parse_meminfo_kb(&meminfo, "MemFree").ok_or(HostError::MissingField {
        path: MEMINFO,
        key: "MemFree",
    })?;

    Ok(HostSystem {
        os_name,
        os_version,
        cpu_model,
        cpu_cores,
        total_memory_mb: total_kb / 1024,
        free_memory_mb: free_kb / 1024,
        is_big_endian: cfg!(target_endian = "big"),
    })
}

#[cfg(not(target_os = "linux"))]
fn query_platform() -> Result<HostSystem, HostError> {
    Err(HostError::UnsupportedPlatform)
}
