// src/tweaks/aslr.rs

use std::{fs, path::PathBuf};

use tracing::debug;

use crate::{
    constants::{ASLR_FULL_RANDOMIZATION, ASLR_NO_RANDOMIZATION, ASLR_SYSCTL_PATH},
    errors::SysctlError,
    tweaks::FeatureState,
};

/// Kernel address space layout randomization, controlled through a single
/// host-wide sysctl value rather than per-core register bits. `Mixed`
/// never applies here.
#[derive(Debug)]
pub struct AslrControl {
    path: PathBuf,
}

impl Default for AslrControl {
    fn default() -> Self {
        Self::new()
    }
}

impl AslrControl {
    pub fn new() -> Self {
        Self::at(ASLR_SYSCTL_PATH)
    }

    /// Points the controller at an alternate control file.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Requests full randomization of mmap base, stack, VDSO and brk.
    pub fn enable(&self) -> Result<(), SysctlError> {
        self.write(ASLR_FULL_RANDOMIZATION)
    }

    /// Turns randomization off entirely.
    pub fn disable(&self) -> Result<(), SysctlError> {
        self.write(ASLR_NO_RANDOMIZATION)
    }

    fn write(&self, value: u32) -> Result<(), SysctlError> {
        fs::write(&self.path, format!("{value}\n")).map_err(|source| SysctlError::Write {
            path: self.path.display().to_string(),
            source,
        })?;
        debug!("wrote {value} to {}", self.path.display());
        Ok(())
    }

    /// Reads the current setting. Any nonzero randomization level counts as
    /// enabled; a failed read degrades to `Unknown` instead of raising.
    pub fn state(&self) -> FeatureState {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(source) => {
                let err = SysctlError::Read {
                    path: self.path.display().to_string(),
                    source,
                };
                return FeatureState::Unknown(err.to_string());
            }
        };
        match raw.trim().parse::<u32>() {
            Ok(0) => FeatureState::Disabled,
            Ok(_) => FeatureState::Enabled,
            Err(_) => {
                let err = SysctlError::Parse {
                    path: self.path.display().to_string(),
                    value: raw.trim().to_owned(),
                };
                FeatureState::Unknown(err.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use tempfile::NamedTempFile;

    use super::*;

    #[test]
    fn enable_writes_full_randomization() {
        let file = NamedTempFile::new().unwrap();
        let control = AslrControl::at(file.path());

        control.enable().unwrap();
        assert_eq!(fs::read_to_string(file.path()).unwrap(), "2\n");
        assert_eq!(control.state(), FeatureState::Enabled);
    }

    #[test]
    fn disable_writes_zero() {
        let file = NamedTempFile::new().unwrap();
        let control = AslrControl::at(file.path());

        control.disable().unwrap();
        assert_eq!(fs::read_to_string(file.path()).unwrap(), "0\n");
        assert_eq!(control.state(), FeatureState::Disabled);
    }

    #[test]
    fn any_nonzero_level_counts_as_enabled() {
        let file = NamedTempFile::new().unwrap();
        fs::write(file.path(), "1\n").unwrap();
        let control = AslrControl::at(file.path());

        assert_eq!(control.state(), FeatureState::Enabled);
    }

    #[test]
    fn missing_control_path_degrades_to_unknown() {
        let control = AslrControl::at("/nonexistent/randomize_va_space");

        assert!(control.enable().is_err());
        assert!(matches!(control.state(), FeatureState::Unknown(_)));
    }

    #[test]
    fn garbage_contents_degrade_to_unknown() {
        let file = NamedTempFile::new().unwrap();
        fs::write(file.path(), "banana\n").unwrap();
        let control = AslrControl::at(file.path());

        match control.state() {
            FeatureState::Unknown(detail) => assert!(detail.contains("banana")),
            other => panic!("expected Unknown, got {other:?}"),
        }
    }
}
