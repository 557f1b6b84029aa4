// src/utils/cpu.rs

use std::{fmt, fs, io};

use raw_cpuid::CpuId;

use crate::{
    constants::{AMD_VENDOR_ID, ONLINE_CPUS_PATH, ZEN_FAMILY},
    errors::{EnumerationError, GateError},
};

/// One logical processor, as numbered by the kernel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LogicalCoreId(pub u32);

impl fmt::Display for LogicalCoreId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Vendor string and family code, read once at process entry and passed by
/// reference wherever needed.
#[derive(Debug, Clone)]
pub struct ProcessorIdentity {
    pub vendor: String,
    pub family: u32,
}

impl ProcessorIdentity {
    /// Queries CPUID for the vendor string and the (extended) family code.
    pub fn detect() -> Self {
        let cpuid = CpuId::new();
        let vendor = cpuid
            .get_vendor_info()
            .map(|v| v.as_str().to_owned())
            .unwrap_or_default();
        let family = cpuid
            .get_feature_info()
            .map(|f| u32::from(f.family_id()))
            .unwrap_or(0);
        Self { vendor, family }
    }
}

/// Effective uid of the current process.
pub fn effective_uid() -> u32 {
    // SAFETY: geteuid takes no arguments and cannot fail.
    unsafe { libc::geteuid() }
}

/// Refuses to run unless this is a privileged process on a Zen (family 17h)
/// AMD processor. Pure validation; must pass before any MSR or sysctl I/O
/// is attempted.
pub fn sanity_check(identity: &ProcessorIdentity, euid: u32) -> Result<(), GateError> {
    if identity.vendor != AMD_VENDOR_ID {
        return Err(GateError::WrongVendor);
    }
    if identity.family != ZEN_FAMILY {
        return Err(GateError::WrongFamily {
            expected: ZEN_FAMILY,
            actual: identity.family,
        });
    }
    if euid != 0 {
        return Err(GateError::InsufficientPrivilege);
    }
    Ok(())
}

/// Enumerates the online logical cores from the kernel cpulist in sysfs.
/// Hosts without sysfs fall back to `0..num_cpus::get()`.
pub fn online_cores() -> Result<Vec<LogicalCoreId>, EnumerationError> {
    match fs::read_to_string(ONLINE_CPUS_PATH) {
        Ok(list) => parse_cpu_list(list.trim()),
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            Ok((0..num_cpus::get() as u32).map(LogicalCoreId).collect())
        }
        Err(source) => Err(EnumerationError::Topology {
            path: ONLINE_CPUS_PATH.to_owned(),
            source,
        }),
    }
}

/// Parses a kernel cpulist such as `0-7,9`. Returns the ids sorted and
/// deduplicated.
fn parse_cpu_list(list: &str) -> Result<Vec<LogicalCoreId>, EnumerationError> {
    let mut cores = Vec::new();
    for part in list.split(',') {
        if part.is_empty() {
            continue;
        }
        match part.split_once('-') {
            Some((start, end)) => {
                let start = parse_core(list, start)?;
                let end = parse_core(list, end)?;
                if start > end {
                    return Err(EnumerationError::Malformed {
                        list: list.to_owned(),
                        reason: format!("range start {start} exceeds range end {end}"),
                    });
                }
                cores.extend((start..=end).map(LogicalCoreId));
            }
            None => cores.push(LogicalCoreId(parse_core(list, part)?)),
        }
    }
    if cores.is_empty() {
        return Err(EnumerationError::Malformed {
            list: list.to_owned(),
            reason: "no cores listed".to_owned(),
        });
    }
    cores.sort_unstable();
    cores.dedup();
    Ok(cores)
}

fn parse_core(list: &str, token: &str) -> Result<u32, EnumerationError> {
    token
        .trim()
        .parse::<u32>()
        .map_err(|_| EnumerationError::Malformed {
            list: list.to_owned(),
            reason: format!("{token:?} is not a core id"),
        })
}
