// src/status.rs

use crate::tweaks::FeatureState;

/// Renders one feature's reduced state as the fixed status sentence shown
/// at the end of every run. Pure formatting; always called after mutating
/// operations so the user sees the resulting state, not the requested one.
pub fn render(label: &str, state: &FeatureState) -> String {
    match state {
        FeatureState::Enabled => format!("{label} is ENABLED."),
        FeatureState::Disabled => format!("{label} is DISABLED."),
        FeatureState::Mixed => format!("{label} is MIXED: not all cores agree."),
        FeatureState::Unknown(detail) => {
            format!("Error while obtaining status of {label}: {detail}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_the_four_sentences() {
        assert_eq!(
            render("C6 C-state", &FeatureState::Enabled),
            "C6 C-state is ENABLED."
        );
        assert_eq!(render("ASLR", &FeatureState::Disabled), "ASLR is DISABLED.");
        assert_eq!(
            render("Processor boosting", &FeatureState::Mixed),
            "Processor boosting is MIXED: not all cores agree."
        );
        assert_eq!(
            render("ASLR", &FeatureState::Unknown("file vanished".to_owned())),
            "Error while obtaining status of ASLR: file vanished"
        );
    }
}
