//! ERC configuration.
//!
//! Every field has a default matching the built-in rule set, so a config file
//! only needs the keys it wants to change.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::SchemGuardError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ErcConfig {
    /// Capacitor value tags that count as decoupling (substring match).
    pub decoupling_tags: Vec<String>,
    /// Capacitor value tags that count as bulk capacitance (substring match).
    pub bulk_tags: Vec<String>,
    /// Net name substrings that mark an I2C net.
    pub i2c_markers: Vec<String>,
    pub pullup_min_kohm: f64,
    pub pullup_max_kohm: f64,
    pub max_pullups_per_net: usize,
    /// Port names exempt from hierarchy direction checks. Empty by default.
    ///
    /// Added to the graph's own `HierarchyPolicy` allowlist wherever this
    /// config is used: the hierarchy rule, export's structural check, and
    /// `SchemGuardCore::load_design`.
    pub power_rails: Vec<String>,
}

impl Default for ErcConfig {
    fn default() -> Self {
        Self {
            decoupling_tags: strings(&["100nF", "0.1uF", "104"]),
            bulk_tags: strings(&["1000uF", "470uF", "220uF", "47uF"]),
            i2c_markers: strings(&["I2C", "SDA", "SCL"]),
            pullup_min_kohm: 1.0,
            pullup_max_kohm: 10.0,
            max_pullups_per_net: 2,
            power_rails: Vec::new(),
        }
    }
}

impl ErcConfig {
    pub fn load(path: &Path) -> Result<Self, SchemGuardError> {
        let text = std::fs::read_to_string(path)?;
        let config: ErcConfig = serde_json::from_str(&text)?;
        config.check()?;
        tracing::debug!("Loaded ERC config from {}", path.display());
        Ok(config)
    }

    fn check(&self) -> Result<(), SchemGuardError> {
        if !(self.pullup_min_kohm <= self.pullup_max_kohm) {
            return Err(SchemGuardError::Config(format!(
                "pullup_min_kohm ({}) must not exceed pullup_max_kohm ({})",
                self.pullup_min_kohm, self.pullup_max_kohm
            )));
        }
        if self.max_pullups_per_net == 0 {
            return Err(SchemGuardError::Config(
                "max_pullups_per_net must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Options for a validation run (CLI or library).
#[derive(Clone, Debug, Default)]
pub struct ErcOptions {
    pub config: ErcConfig,
    /// Rule ids to run. Empty means all rules.
    pub rules: Vec<String>,
}
