// src/tweaks/mod.rs

pub mod aslr;
pub mod cpu;

use indexmap::IndexMap;
use tracing::{debug, warn};

use crate::{
    errors::{ControllerError, RegisterError},
    utils::{cpu::LogicalCoreId, msr::MsrAccess},
};

/// One register bit a feature drives: which MSR, which bit, and the level
/// the bit holds while the feature is enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MsrBitSpec {
    pub msr: u32,
    pub bit: u32,
    pub set_when_enabled: bool,
}

impl MsrBitSpec {
    fn mask(&self) -> u64 {
        1u64 << self.bit
    }

    /// Whether `value` holds this bit at its enabled level.
    fn enabled_in(&self, value: u64) -> bool {
        ((value >> self.bit) & 1 == 1) == self.set_when_enabled
    }
}

/// A named per-core processor feature, described by the MSR bits that hold
/// it. The bit list is a compile-time constant per feature, never
/// user-supplied.
#[derive(Debug, Clone)]
pub struct MsrFeature {
    pub label: &'static str,
    pub bits: &'static [MsrBitSpec],
}

/// Reduced verdict for a feature across every enumerated core.
///
/// `Enabled` and `Disabled` are only reported on unanimity; any
/// disagreement is `Mixed` and any read failure is `Unknown`, never a
/// majority vote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeatureState {
    Enabled,
    Disabled,
    Mixed,
    Unknown(String),
}

/// Per-core results of one mutating sweep, in enumeration order. Produced
/// fresh per call and discarded once reported.
#[derive(Debug, Default)]
pub struct ControlOutcome {
    results: IndexMap<LogicalCoreId, Result<(), RegisterError>>,
}

impl ControlOutcome {
    fn record(&mut self, core: LogicalCoreId, result: Result<(), RegisterError>) {
        self.results.insert(core, result);
    }

    /// Number of cores whose registers were rewritten.
    pub fn updated(&self) -> usize {
        self.results.values().filter(|r| r.is_ok()).count()
    }

    /// Number of cores the sweep could not update.
    pub fn failed(&self) -> usize {
        self.results.len() - self.updated()
    }

    /// The cores left unchanged, with the per-core error.
    pub fn failures(&self) -> impl Iterator<Item = (LogicalCoreId, &RegisterError)> {
        self.results
            .iter()
            .filter_map(|(core, r)| r.as_ref().err().map(|err| (*core, err)))
    }

    /// True when at least one core was updated and at least one was not.
    pub fn is_partial(&self) -> bool {
        self.updated() > 0 && self.failed() > 0
    }

    /// One-line account of the first failure, for error messages. The
    /// register errors already name the affected core.
    pub(crate) fn first_failure(&self) -> String {
        self.failures()
            .next()
            .map(|(_, err)| err.to_string())
            .unwrap_or_else(|| "no cores enumerated".to_owned())
    }
}

/// Drives one MSR-backed feature across every enumerated core.
///
/// Mutation is non-atomic across cores: each core is updated independently
/// and bits already written stay written if a later core fails. The
/// per-core results surface in the returned [`ControlOutcome`].
#[derive(Debug)]
pub struct MsrFeatureControl<'a, D> {
    feature: MsrFeature,
    cores: &'a [LogicalCoreId],
    driver: &'a D,
}

impl<'a, D: MsrAccess> MsrFeatureControl<'a, D> {
    pub fn new(feature: MsrFeature, cores: &'a [LogicalCoreId], driver: &'a D) -> Self {
        Self {
            feature,
            cores,
            driver,
        }
    }

    pub fn label(&self) -> &'static str {
        self.feature.label
    }

    /// Drives every feature bit to its enabled level on all cores.
    pub fn enable(&self) -> Result<ControlOutcome, ControllerError> {
        self.write_all(true)
    }

    /// Drives every feature bit to its disabled level on all cores.
    pub fn disable(&self) -> Result<ControlOutcome, ControllerError> {
        self.write_all(false)
    }

    /// Set/clear masks per distinct register, in descriptor order.
    fn masks(&self, enable: bool) -> Vec<(u32, u64, u64)> {
        let mut masks: Vec<(u32, u64, u64)> = Vec::new();
        for spec in self.feature.bits {
            let idx = match masks.iter().position(|(msr, ..)| *msr == spec.msr) {
                Some(idx) => idx,
                None => {
                    masks.push((spec.msr, 0, 0));
                    masks.len() - 1
                }
            };
            if spec.set_when_enabled == enable {
                masks[idx].1 |= spec.mask();
            } else {
                masks[idx].2 |= spec.mask();
            }
        }
        masks
    }

    fn write_all(&self, enable: bool) -> Result<ControlOutcome, ControllerError> {
        let masks = self.masks(enable);
        let mut outcome = ControlOutcome::default();
        for &core in self.cores {
            let mut result = Ok(());
            for &(msr, set_mask, clear_mask) in &masks {
                if let Err(err) = self.driver.update_msr(core, msr, set_mask, clear_mask) {
                    result = Err(err);
                    break;
                }
            }
            if let Err(ref err) = result {
                warn!("{}: core left unchanged: {err}", self.feature.label);
            }
            outcome.record(core, result);
        }
        if outcome.updated() == 0 {
            return Err(ControllerError::NoCoreUpdated(outcome));
        }
        debug!(
            "{}: updated {} of {} cores",
            self.feature.label,
            outcome.updated(),
            self.cores.len()
        );
        Ok(outcome)
    }

    /// Reads every feature bit on every core, fresh, and reduces to one
    /// verdict. A single unreadable core prevents a confident answer.
    pub fn state(&self) -> FeatureState {
        let mut first_error = None;
        let mut any_enabled = false;
        let mut any_disabled = false;
        for &core in self.cores {
            for spec in self.feature.bits {
                match self.driver.read_msr(core, spec.msr) {
                    Ok(value) if spec.enabled_in(value) => any_enabled = true,
                    Ok(_) => any_disabled = true,
                    Err(err) => {
                        if first_error.is_none() {
                            first_error = Some(err.to_string());
                        }
                    }
                }
            }
        }
        if let Some(detail) = first_error {
            return FeatureState::Unknown(detail);
        }
        match (any_enabled, any_disabled) {
            (true, false) => FeatureState::Enabled,
            (false, true) => FeatureState::Disabled,
            (true, true) => FeatureState::Mixed,
            (false, false) => FeatureState::Unknown("no cores enumerated".to_owned()),
        }
    }
}
