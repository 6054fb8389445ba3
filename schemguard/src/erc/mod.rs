//! Electrical rule checks over a hierarchical design.
//!
//! Three rules ship by default: hierarchy (structural), power decoupling and
//! I2C pull-ups. The standalone `validate_*` methods stop at the first
//! violation; [`HierarchicalSchematic::run_full_erc`] collects everything so a
//! caller sees every problem in one pass.

pub mod classify;
pub mod rules;
pub mod view;

pub use classify::{parse_kilohms, PartClass};
pub use rules::{ErcEngine, ErcRule, HierarchyRule, I2cPullupRule, PowerDecouplingRule, NET_FIELD};
pub use view::{DesignView, PlacedSymbol};

use crate::config::ErcConfig;
use crate::error::{ErcError, ErcFailure};
use crate::hierarchy::HierarchicalSchematic;

fn first_violation(rule: &dyn ErcRule, graph: &HierarchicalSchematic) -> Result<(), ErcError> {
    let config = ErcConfig::default();
    match rule.check(&DesignView::new(graph), &config).into_iter().next() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

impl HierarchicalSchematic {
    pub fn validate_power_decoupling(&self) -> Result<(), ErcError> {
        first_violation(&PowerDecouplingRule, self)
    }

    pub fn validate_i2c_pullups(&self) -> Result<(), ErcError> {
        first_violation(&I2cPullupRule, self)
    }

    /// Hierarchy, power decoupling and I2C pull-ups with default settings, all
    /// failures combined.
    pub fn run_full_erc(&self) -> Result<(), ErcFailure> {
        ErcEngine::default().run(self)
    }
}
