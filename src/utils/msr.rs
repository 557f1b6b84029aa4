// src/utils/msr.rs

use std::{
    fs::{File, OpenOptions},
    io,
    os::unix::fs::FileExt,
};

use crate::{errors::RegisterError, utils::cpu::LogicalCoreId};

/// Per-core MSR access, keyed by core id and register index.
///
/// Implemented by [`MsrDevice`] against the Linux msr module, and by
/// in-memory doubles in tests.
pub trait MsrAccess {
    /// Reads the full 64-bit register. No mutation.
    fn read_msr(&self, core: LogicalCoreId, msr: u32) -> Result<u64, RegisterError>;

    /// Rewrites the register in one scoped read-modify-write: reads the
    /// current value, applies `(value | set_mask) & !clear_mask`, writes the
    /// result back and confirms the targeted bits took. All other bits are
    /// preserved. Returns the value written.
    fn update_msr(
        &self,
        core: LogicalCoreId,
        msr: u32,
        set_mask: u64,
        clear_mask: u64,
    ) -> Result<u64, RegisterError>;
}

/// The `/dev/cpu/<id>/msr` interface exposed by the Linux msr module.
///
/// The register index doubles as the file offset; values are eight bytes in
/// native byte order. A handle is opened per operation and dropped on every
/// exit path, so no descriptor outlives its own read-modify-write.
#[derive(Debug, Clone, Copy, Default)]
pub struct MsrDevice;

impl MsrDevice {
    fn open(&self, core: LogicalCoreId, msr: u32, writable: bool) -> Result<File, RegisterError> {
        let path = format!("/dev/cpu/{core}/msr");
        OpenOptions::new()
            .read(true)
            .write(writable)
            .open(&path)
            .map_err(|source| match source.kind() {
                io::ErrorKind::PermissionDenied => RegisterError::AccessDenied { core, source },
                // The device node vanishes when a core goes offline; a
                // missing msr module looks the same from here.
                io::ErrorKind::NotFound => RegisterError::CoreUnavailable { core, source },
                _ => RegisterError::Io { core, msr, source },
            })
    }

    fn read_at(file: &File, core: LogicalCoreId, msr: u32) -> Result<u64, RegisterError> {
        let mut buf = [0u8; 8];
        file.read_exact_at(&mut buf, u64::from(msr))
            .map_err(|source| RegisterError::Io { core, msr, source })?;
        Ok(u64::from_ne_bytes(buf))
    }
}

impl MsrAccess for MsrDevice {
    fn read_msr(&self, core: LogicalCoreId, msr: u32) -> Result<u64, RegisterError> {
        let file = self.open(core, msr, false)?;
        Self::read_at(&file, core, msr)
    }

    fn update_msr(
        &self,
        core: LogicalCoreId,
        msr: u32,
        set_mask: u64,
        clear_mask: u64,
    ) -> Result<u64, RegisterError> {
        // One handle for the whole read-modify-write.
        let file = self.open(core, msr, true)?;
        let current = Self::read_at(&file, core, msr)?;
        let next = (current | set_mask) & !clear_mask;
        file.write_all_at(&next.to_ne_bytes(), u64::from(msr))
            .map_err(|source| RegisterError::Io { core, msr, source })?;
        let observed = Self::read_at(&file, core, msr)?;
        let targeted = set_mask | clear_mask;
        if observed & targeted != next & targeted {
            return Err(RegisterError::Io {
                core,
                msr,
                source: io::Error::other("write did not take effect"),
            });
        }
        Ok(next)
    }
}
