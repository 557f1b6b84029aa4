// src/actions.rs

use std::io::{self, Write};

use crate::{
    config::{toggle, Settings},
    status,
    tweaks::{aslr::AslrControl, MsrFeatureControl},
    utils::msr::MsrAccess,
};

/// One requested toggle, whatever its origin. Both the flag path and the
/// config path reduce to a plan of these, so the feature controllers never
/// see where a request came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    EnableBoosting,
    DisableBoosting,
    EnableC6,
    DisableC6,
    EnableAslr,
    DisableAslr,
}

impl Action {
    /// The progress label printed before the action's outcome.
    pub fn label(&self) -> &'static str {
        match self {
            Action::EnableBoosting => "Enabling processor boosting",
            Action::DisableBoosting => "Disabling processor boosting",
            Action::EnableC6 => "Enabling C6 C-state",
            Action::DisableC6 => "Disabling C6 C-state",
            Action::EnableAslr => "Enabling address space layout randomization (ASLR)",
            Action::DisableAslr => "Disabling address space layout randomization (ASLR)",
        }
    }
}

/// The individual feature flags, after CLI parsing.
#[derive(Debug, Default, Clone, Copy)]
pub struct FeatureFlags {
    pub enable_c6: bool,
    pub disable_c6: bool,
    pub enable_boosting: bool,
    pub disable_boosting: bool,
    pub enable_aslr: bool,
    pub disable_aslr: bool,
}

/// Builds the action plan from individual flags. Disable wins over enable
/// for the same feature; actions run in the fixed boost, C6, ASLR order.
pub fn plan_from_flags(flags: &FeatureFlags) -> Vec<Action> {
    let mut plan = Vec::new();
    if flags.disable_boosting {
        plan.push(Action::DisableBoosting);
    } else if flags.enable_boosting {
        plan.push(Action::EnableBoosting);
    }
    if flags.disable_c6 {
        plan.push(Action::DisableC6);
    } else if flags.enable_c6 {
        plan.push(Action::EnableC6);
    }
    if flags.disable_aslr {
        plan.push(Action::DisableAslr);
    } else if flags.enable_aslr {
        plan.push(Action::EnableAslr);
    }
    plan
}

/// Builds the action plan from a configuration document, in the same fixed
/// order. When a config file is in play it fully replaces flag handling.
pub fn plan_from_settings(settings: &Settings) -> Vec<Action> {
    let mut plan = Vec::new();
    match toggle(&settings.boosting) {
        Some(true) => plan.push(Action::EnableBoosting),
        Some(false) => plan.push(Action::DisableBoosting),
        None => {}
    }
    match toggle(&settings.c6) {
        Some(true) => plan.push(Action::EnableC6),
        Some(false) => plan.push(Action::DisableC6),
        None => {}
    }
    match toggle(&settings.aslr) {
        Some(true) => plan.push(Action::EnableAslr),
        Some(false) => plan.push(Action::DisableAslr),
        None => {}
    }
    plan
}

/// The three feature controllers a run dispatches into.
pub struct Toolbox<'a, D> {
    pub boosting: MsrFeatureControl<'a, D>,
    pub c6: MsrFeatureControl<'a, D>,
    pub aslr: AslrControl,
}

impl<D: MsrAccess> Toolbox<'_, D> {
    /// Runs one action and prints its outcome line. Per-core partial
    /// failures are logged by the controller as they happen; a line counts
    /// as SUCCESS as long as at least one core was updated.
    pub fn run(&self, action: Action) {
        print!("{}:   ", action.label());
        let _ = io::stdout().flush();
        let result = match action {
            Action::EnableBoosting => summarize(self.boosting.enable()),
            Action::DisableBoosting => summarize(self.boosting.disable()),
            Action::EnableC6 => summarize(self.c6.enable()),
            Action::DisableC6 => summarize(self.c6.disable()),
            Action::EnableAslr => self.aslr.enable().map_err(|err| err.to_string()),
            Action::DisableAslr => self.aslr.disable().map_err(|err| err.to_string()),
        };
        match result {
            Ok(()) => println!("SUCCESS"),
            Err(err) => println!("oops: {err}"),
        }
    }

    /// Prints the current status of all three features, whatever the
    /// preceding mutations did.
    pub fn show_status(&self) {
        println!();
        println!("{}", status::render(self.c6.label(), &self.c6.state()));
        println!("{}", status::render("ASLR", &self.aslr.state()));
        println!(
            "{}",
            status::render(self.boosting.label(), &self.boosting.state())
        );
    }
}

fn summarize<T, E: std::fmt::Display>(result: Result<T, E>) -> Result<(), String> {
    result.map(|_| ()).map_err(|err| err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_plan_keeps_the_fixed_order() {
        let flags = FeatureFlags {
            enable_c6: true,
            disable_boosting: true,
            enable_aslr: true,
            ..FeatureFlags::default()
        };
        assert_eq!(
            plan_from_flags(&flags),
            vec![Action::DisableBoosting, Action::EnableC6, Action::EnableAslr]
        );
    }

    #[test]
    fn disable_wins_over_enable_for_the_same_feature() {
        let flags = FeatureFlags {
            enable_c6: true,
            disable_c6: true,
            ..FeatureFlags::default()
        };
        assert_eq!(plan_from_flags(&flags), vec![Action::DisableC6]);
    }

    #[test]
    fn no_flags_means_an_empty_plan() {
        assert!(plan_from_flags(&FeatureFlags::default()).is_empty());
    }

    #[test]
    fn config_plan_overrides_flags_entirely() {
        // The flag asks to disable boosting, the config to enable it; with a
        // config file in play only the config counts.
        let flags = FeatureFlags {
            disable_boosting: true,
            ..FeatureFlags::default()
        };
        let settings = Settings {
            boosting: Some("enable".to_owned()),
            c6: Some("disable".to_owned()),
            aslr: None,
        };
        let plan = plan_from_settings(&settings);
        assert_eq!(plan, vec![Action::EnableBoosting, Action::DisableC6]);
        assert_ne!(plan, plan_from_flags(&flags));
    }

    #[test]
    fn unrecognized_config_values_skip_the_feature() {
        let settings = Settings {
            boosting: Some("on".to_owned()),
            c6: None,
            aslr: Some("DISABLE".to_owned()),
        };
        assert_eq!(plan_from_settings(&settings), vec![Action::DisableAslr]);
    }
}
