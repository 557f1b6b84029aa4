// src/errors.rs

use std::io;

use thiserror::Error;

use crate::{tweaks::ControlOutcome, utils::cpu::LogicalCoreId};

/// Why the startup sanity check refused to run.
#[derive(Error, Debug)]
pub enum GateError {
    #[error("this is not an AMD processor")]
    WrongVendor,

    #[error("wrong family of AMD processors; expected {expected} (0x{expected:x}), got {actual}")]
    WrongFamily { expected: u32, actual: u32 },

    #[error("you need to be root to use this program")]
    InsufficientPrivilege,
}

/// Failure to discover the host's online logical cores.
#[derive(Error, Debug)]
pub enum EnumerationError {
    #[error("unable to read online cpu topology from {path}: {source}")]
    Topology { path: String, source: io::Error },

    #[error("malformed cpu list {list:?}: {reason}")]
    Malformed { list: String, reason: String },
}

/// A register access failure on one core. Never fatal on its own; the
/// feature controller decides aggregate policy.
#[derive(Error, Debug)]
pub enum RegisterError {
    #[error("access to the msr device of core {core} denied: {source}")]
    AccessDenied {
        core: LogicalCoreId,
        source: io::Error,
    },

    #[error("core {core} is unavailable: {source}")]
    CoreUnavailable {
        core: LogicalCoreId,
        source: io::Error,
    },

    #[error("msr {msr:#010x} i/o failed on core {core}: {source}")]
    Io {
        core: LogicalCoreId,
        msr: u32,
        source: io::Error,
    },
}

/// A mutating sweep that did not change a single core.
#[derive(Error, Debug)]
pub enum ControllerError {
    #[error("no core accepted the update: {}", .0.first_failure())]
    NoCoreUpdated(ControlOutcome),
}

/// Failure on the host-wide sysctl control path.
#[derive(Error, Debug)]
pub enum SysctlError {
    #[error("unable to write {path}: {source}")]
    Write { path: String, source: io::Error },

    #[error("unable to read {path}: {source}")]
    Read { path: String, source: io::Error },

    #[error("unexpected contents in {path}: {value:?}")]
    Parse { path: String, value: String },
}
