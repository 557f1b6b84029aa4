// src/config.rs

use std::{fs, path::Path};

use anyhow::{Context, Result};
use serde::Deserialize;

/// Settings recognized in a configuration file. All three parameters are
/// strings accepting `enable` or `disable` (case-insensitive); any other
/// value leaves that feature untouched. Unknown fields are ignored.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub c6: Option<String>,
    pub boosting: Option<String>,
    pub aslr: Option<String>,
}

impl Settings {
    /// Loads and parses a TOML settings file.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("unable to read contents of config file {path:?}"))?;
        toml::from_str(&raw).with_context(|| format!("problem parsing config file {path:?}"))
    }
}

/// Maps one settings value onto a requested toggle, if any.
pub(crate) fn toggle(value: &Option<String>) -> Option<bool> {
    let value = value.as_deref()?;
    if value.eq_ignore_ascii_case("enable") {
        Some(true)
    } else if value.eq_ignore_ascii_case("disable") {
        Some(false)
    } else {
        None
    }
}
