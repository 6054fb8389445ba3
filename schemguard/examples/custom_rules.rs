//! Adding a project-specific rule next to the built-in ones.
//!
//! Run with `cargo run --example custom_rules`.

use schemguard::erc::classify::value_has_tag;
use schemguard::erc::{DesignView, PartClass};
use schemguard::prelude::*;
use std::sync::Arc;

/// Long LED chains need bulk capacitance on their own sheet, not just somewhere
/// in the design.
struct LocalBulkRule;

impl ErcRule for LocalBulkRule {
    fn id(&self) -> &str {
        "local_bulk"
    }

    fn name(&self) -> &str {
        "Local bulk"
    }

    fn description(&self) -> &str {
        "Each sheet with addressable LEDs has a bulk capacitor on the same sheet"
    }

    fn check(&self, design: &DesignView<'_>, config: &ErcConfig) -> Vec<ErcError> {
        design
            .containers()
            .filter(|(_, sch)| {
                let classes: Vec<_> = sch.symbols.iter().map(|s| (s, PartClass::classify(s))).collect();
                let has_leds = classes.iter().any(|(_, c)| *c == PartClass::AddressableLed);
                let has_bulk = classes.iter().any(|(s, c)| {
                    *c == PartClass::Capacitor && value_has_tag(s.value_str(), &config.bulk_tags)
                });
                has_leds && !has_bulk
            })
            .map(|_| ErcError::MissingBulkCapacitor)
            .collect()
    }
}

fn build() -> Result<HierarchicalSchematic, ErcError> {
    let mut power = Schematic::new();
    power.add_symbol(Symbol::new("C1", "Device", "C").with_value("1000uF 10V"));
    let mut power = Sheet::new("power", power);
    power.add_port("5V_OUT", "out")?;

    let mut led = Schematic::new();
    for i in 1..=4 {
        led.add_symbol(Symbol::new(format!("D{}", i), "LED", "APA102").with_value("APA102"));
    }
    let mut led = Sheet::new("led", led);
    led.add_port("5V_IN", "in")?;

    let mut design = HierarchicalSchematic::new("custom_rules");
    design.add_sheet(power)?;
    design.add_sheet(led)?;
    design.connect("power", "5V_OUT", "led", "5V_IN");
    Ok(design)
}

fn main() {
    let design = match build() {
        Ok(design) => design,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let mut engine = ErcEngine::default();
    engine.add_rule(Arc::new(LocalBulkRule));

    println!("Rules:");
    for rule in engine.rules() {
        println!("  {} - {}", rule.id(), rule.description());
    }

    // The built-in bulk check is satisfied by the power sheet; the local one is not.
    match engine.run(&design) {
        Ok(()) => println!("All rules passed"),
        Err(failure) => {
            for line in failure.lines() {
                println!("{}", line);
            }
            std::process::exit(1);
        }
    }
}
