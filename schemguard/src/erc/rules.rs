use std::collections::HashMap;
use std::sync::Arc;

use crate::config::ErcConfig;
use crate::error::{ErcError, ErcFailure, RuleFailure};
use crate::hierarchy::HierarchicalSchematic;

use super::classify::{parse_kilohms, value_has_tag, PartClass};
use super::view::DesignView;

/// Field on a resistor naming the net it pulls up.
pub const NET_FIELD: &str = "Net";

/// A design rule over the aggregated design.
///
/// Rules are pure: they read the view and return every violation they find.
pub trait ErcRule: Send + Sync {
    fn id(&self) -> &str;
    /// Short label, used as the line prefix in combined reports.
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    fn check(&self, design: &DesignView<'_>, config: &ErcConfig) -> Vec<ErcError>;
}

pub struct ErcEngine {
    rules: Vec<Arc<dyn ErcRule>>,
    config: ErcConfig,
}

impl ErcEngine {
    pub fn new(config: ErcConfig) -> Self {
        Self {
            rules: Vec::new(),
            config,
        }
    }

    pub fn with_default_rules(config: ErcConfig) -> Self {
        let mut engine = Self::new(config);
        engine.add_rule(Arc::new(HierarchyRule));
        engine.add_rule(Arc::new(PowerDecouplingRule));
        engine.add_rule(Arc::new(I2cPullupRule));
        engine
    }

    pub fn add_rule(&mut self, rule: Arc<dyn ErcRule>) {
        self.rules.push(rule);
    }

    /// Keep only the listed rule ids. An empty list keeps everything.
    pub fn retain_rules(&mut self, ids: &[String]) {
        if ids.is_empty() {
            return;
        }
        self.rules.retain(|r| ids.iter().any(|id| id == r.id()));
    }

    pub fn rules(&self) -> impl Iterator<Item = &dyn ErcRule> {
        self.rules.iter().map(|r| r.as_ref())
    }

    pub fn config(&self) -> &ErcConfig {
        &self.config
    }

    /// Run every rule and keep the ones that reported something.
    pub fn check(&self, graph: &HierarchicalSchematic) -> Vec<RuleFailure> {
        let view = DesignView::new(graph);
        self.rules
            .iter()
            .filter_map(|rule| {
                let errors = rule.check(&view, &self.config);
                if errors.is_empty() {
                    None
                } else {
                    Some(RuleFailure {
                        rule_id: rule.id().to_string(),
                        label: rule.name().to_string(),
                        errors,
                    })
                }
            })
            .collect()
    }

    /// Accumulates every rule's violations into one failure.
    pub fn run(&self, graph: &HierarchicalSchematic) -> Result<(), ErcFailure> {
        let failures = self.check(graph);
        if failures.is_empty() {
            Ok(())
        } else {
            Err(ErcFailure { failures })
        }
    }
}

impl Default for ErcEngine {
    fn default() -> Self {
        Self::with_default_rules(ErcConfig::default())
    }
}

pub struct HierarchyRule;

impl ErcRule for HierarchyRule {
    fn id(&self) -> &str {
        "hierarchy"
    }

    fn name(&self) -> &str {
        "Hierarchy"
    }

    fn description(&self) -> &str {
        "Connections resolve to existing sheets and ports, drivers feed receivers, references are unique per sheet"
    }

    fn check(&self, design: &DesignView<'_>, config: &ErcConfig) -> Vec<ErcError> {
        design.graph().hierarchy_violations_with(&config.power_rails)
    }
}

pub struct PowerDecouplingRule;

impl ErcRule for PowerDecouplingRule {
    fn id(&self) -> &str {
        "power_decoupling"
    }

    fn name(&self) -> &str {
        "Power decoupling"
    }

    fn description(&self) -> &str {
        "An MCU anywhere needs a 100nF-class capacitor; addressable LEDs need a bulk capacitor"
    }

    fn check(&self, design: &DesignView<'_>, config: &ErcConfig) -> Vec<ErcError> {
        let mut needs_decoupling = false;
        let mut needs_bulk = false;
        let mut has_decoupling = false;
        let mut has_bulk = false;

        for placed in design.symbols() {
            match placed.class {
                PartClass::Mcu => needs_decoupling = true,
                PartClass::AddressableLed => needs_bulk = true,
                PartClass::Capacitor => {
                    let value = placed.symbol.value_str();
                    has_decoupling |= value_has_tag(value, &config.decoupling_tags);
                    has_bulk |= value_has_tag(value, &config.bulk_tags);
                }
                PartClass::Resistor | PartClass::Other => {}
            }
        }

        let mut errors = Vec::new();
        if needs_decoupling && !has_decoupling {
            errors.push(ErcError::MissingDecouplingCapacitor);
        }
        if needs_bulk && !has_bulk {
            errors.push(ErcError::MissingBulkCapacitor);
        }
        errors
    }
}

pub struct I2cPullupRule;

impl I2cPullupRule {
    /// I2C net names in first-seen order.
    pub fn i2c_nets<'a>(design: &DesignView<'a>, config: &ErcConfig) -> Vec<&'a str> {
        design
            .net_names()
            .into_iter()
            .filter(|name| config.i2c_markers.iter().any(|m| name.contains(m.as_str())))
            .collect()
    }
}

impl ErcRule for I2cPullupRule {
    fn id(&self) -> &str {
        "i2c_pullups"
    }

    fn name(&self) -> &str {
        "I2C pull-up"
    }

    fn description(&self) -> &str {
        "Each I2C/SDA/SCL net has one or two pull-up resistors between 1k and 10k"
    }

    fn check(&self, design: &DesignView<'_>, config: &ErcConfig) -> Vec<ErcError> {
        let nets = Self::i2c_nets(design, config);
        if nets.is_empty() {
            return Vec::new();
        }

        let mut pullups: HashMap<&str, Vec<f64>> = HashMap::new();
        for placed in design.symbols_of(PartClass::Resistor) {
            if let Some(net) = placed.symbol.field(NET_FIELD) {
                pullups
                    .entry(net)
                    .or_default()
                    .push(parse_kilohms(placed.symbol.value_str()));
            }
        }

        let mut errors = Vec::new();
        for net in nets {
            let values = pullups.get(net).map(Vec::as_slice).unwrap_or(&[]);
            if values.is_empty() {
                errors.push(ErcError::MissingPullups {
                    net: net.to_string(),
                });
                continue;
            }
            if values.len() > config.max_pullups_per_net {
                errors.push(ErcError::MultiplePullupSets {
                    net: net.to_string(),
                    count: values.len(),
                });
            }
            for &value in values {
                if value < config.pullup_min_kohm || value > config.pullup_max_kohm {
                    errors.push(ErcError::InvalidPullupValue {
                        net: net.to_string(),
                        value_kohm: value,
                        min_kohm: config.pullup_min_kohm,
                        max_kohm: config.pullup_max_kohm,
                    });
                }
            }
        }
        errors
    }
}
