//! Integration tests for the SchemGuard library

use schemguard::prelude::*;
use schemguard::load_design;
use std::path::PathBuf;

fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn codes(result: &ValidationResult) -> Vec<&str> {
    result.issues.iter().map(|i| i.code.as_str()).collect()
}

#[test]
fn test_check_valid_design() {
    let result = SchemGuardCore::check_design(&fixture_path("valid_design.json"), &ErcOptions::default())
        .expect("Valid design should load");

    assert_eq!(result.title, "led_touch_grid_root");
    assert!(
        result.passed(),
        "Valid design should pass. Issues: {:?}",
        result.issues.iter().map(|i| &i.message).collect::<Vec<_>>()
    );
    assert_eq!(result.total_issues(), 0);
}

#[test]
fn test_check_missing_decap() {
    let result = SchemGuardCore::check_design(&fixture_path("missing_decap.json"), &ErcOptions::default())
        .expect("Design should load");

    assert!(!result.passed());
    assert_eq!(result.stats.errors, 2);
    assert_eq!(codes(&result), vec!["missing_decoupling_capacitor", "missing_bulk_capacitor"]);
    assert!(result.issues.iter().all(|i| i.rule_id == "power_decoupling"));
}

#[test]
fn test_check_bad_hierarchy_reports_every_connection() {
    let result = SchemGuardCore::check_design(&fixture_path("bad_hierarchy.json"), &ErcOptions::default())
        .expect("Design should load");

    assert_eq!(
        codes(&result),
        vec!["port_not_found", "direction_conflict", "sheet_not_found"]
    );
    assert_eq!(result.issues[0].message, "Parent pin '5V_OUT' not found on sheet 'mcu'");
    assert_eq!(result.issues[0].sheet.as_deref(), Some("mcu"));
}

#[test]
fn test_check_i2c_issues() {
    let result = SchemGuardCore::check_design(&fixture_path("i2c_issues.json"), &ErcOptions::default())
        .expect("Design should load");

    assert_eq!(
        codes(&result),
        vec!["invalid_pullup_value", "multiple_pullup_sets", "missing_pullups"]
    );
    assert!(result.issues[0].message.contains("I2C_SDA"));
    assert!(result.issues[1].message.contains("3 resistors"));
    assert!(result.issues[2].message.contains("SDA_AUX"));
}

#[test]
fn test_config_file_tightens_pullup_rules() {
    let config = ErcConfig::load(&fixture_path("strict_pullups.json")).expect("Config should load");
    assert_eq!(config.max_pullups_per_net, 1);
    assert_eq!(config.i2c_markers, ErcConfig::default().i2c_markers);

    let options = ErcOptions {
        config,
        rules: vec![],
    };
    let result = SchemGuardCore::check_design(&fixture_path("i2c_issues.json"), &options)
        .expect("Design should load");

    // 10k on I2C_SCL is now out of range too
    assert_eq!(result.stats.errors, 4);
}

#[test]
fn test_rule_filter_limits_checks() {
    let options = ErcOptions {
        config: ErcConfig::default(),
        rules: vec!["hierarchy".to_string()],
    };
    let result = SchemGuardCore::check_design(&fixture_path("missing_decap.json"), &options)
        .expect("Design should load");

    assert!(result.passed());
}

#[test]
fn test_floating_port_warnings_follow_the_hierarchy_rule() {
    let mut design = HierarchicalSchematic::new("filtered");
    let mut power = Sheet::new("power", Schematic::new());
    power.add_port("3V3_OUT", "out").unwrap();
    design.add_sheet(power).unwrap();

    let options = ErcOptions {
        config: ErcConfig::default(),
        rules: vec!["power_decoupling".to_string()],
    };
    assert!(SchemGuardCore::check_graph(&design, &options).is_empty());

    let all = SchemGuardCore::check_graph(&design, &ErcOptions::default());
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].code, "floating_port");
}

#[test]
fn test_config_power_rails_apply_to_hand_built_graphs() {
    let mut design = HierarchicalSchematic::new("rails");
    let mut usb = Sheet::new("usb", Schematic::new());
    usb.add_port("VBUS", "in").unwrap();
    let mut led = Sheet::new("led", Schematic::new());
    led.add_port("VBUS", "in").unwrap();
    design.add_sheet(usb).unwrap();
    design.add_sheet(led).unwrap();
    design.connect("usb", "VBUS", "led", "VBUS");

    assert!(matches!(
        design.run_full_erc(),
        Err(ErcFailure { ref failures }) if failures[0].rule_id == "hierarchy"
    ));

    let config = ErcConfig {
        power_rails: vec!["VBUS".to_string()],
        ..ErcConfig::default()
    };
    let engine = ErcEngine::with_default_rules(config.clone());
    assert_eq!(engine.run(&design), Ok(()));

    let options = ErcOptions {
        config,
        rules: vec![],
    };
    let dir = tempfile::tempdir().unwrap();
    let engine = SchemGuardCore::engine(&options);
    let report = schemguard::export::write_hierarchy_with(&design, dir.path(), &engine)
        .expect("Configured rails should let the export through");
    assert!(!report.files.is_empty());
}

#[test]
fn test_floating_ports_are_warnings() {
    let mut design = HierarchicalSchematic::new("floating");
    let mut power = Sheet::new("power", Schematic::new());
    power.add_port("5V_OUT", "out").unwrap();
    power.add_port("3V3_OUT", "out").unwrap();
    let mut led = Sheet::new("led", Schematic::new());
    led.add_port("5V_IN", "in").unwrap();
    design.add_sheet(power).unwrap();
    design.add_sheet(led).unwrap();
    design.connect("power", "5V_OUT", "led", "5V_IN");

    let issues = SchemGuardCore::check_graph(&design, &ErcOptions::default());
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].severity, Severity::Warning);
    assert_eq!(issues[0].code, "floating_port");
    assert!(issues[0].message.contains("3V3_OUT"));
}

#[test]
fn test_invalid_direction_fails_to_load() {
    let err = load_design(&fixture_path("invalid_direction.json")).unwrap_err();
    assert!(matches!(
        err,
        SchemGuardError::Erc(ErcError::InvalidDirection { ref value }) if value == "output"
    ));
}

#[test]
fn test_missing_file_is_io_error() {
    let err = SchemGuardCore::check_design(&fixture_path("does_not_exist.json"), &ErcOptions::default())
        .unwrap_err();
    assert!(matches!(err, SchemGuardError::Io(_)));
}

#[test]
fn test_configured_power_rails_exempt_direction_checks() {
    let options = ErcOptions {
        config: ErcConfig {
            power_rails: vec!["5V_IN".to_string()],
            ..ErcConfig::default()
        },
        rules: vec![],
    };
    let graph = SchemGuardCore::load_design(&fixture_path("bad_hierarchy.json"), &options)
        .expect("Design should load");

    let violations = graph.hierarchy_violations();
    assert_eq!(violations.len(), 2);
    assert!(violations
        .iter()
        .all(|e| !matches!(e, ErcError::DirectionConflict { .. })));
}
