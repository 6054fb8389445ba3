//! Export adapter tests against a temporary output directory

use schemguard::export::{write_hierarchy, HierarchyDescriptor, SHEETS_DIR};
use schemguard::prelude::*;
use serde_json::Value;
use std::path::{Path, PathBuf};

fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn read_json(path: &Path) -> Value {
    let text = std::fs::read_to_string(path).expect("file should exist");
    serde_json::from_str(&text).expect("file should be JSON")
}

fn chain(n: usize) -> HierarchicalSchematic {
    let mut design = HierarchicalSchematic::new("chain");
    for i in 0..n {
        let mut sheet = Sheet::new(format!("s{}", i), Schematic::new());
        sheet.add_port("IN", "in").unwrap();
        sheet.add_port("OUT", "out").unwrap();
        design.add_sheet(sheet).unwrap();
    }
    for i in 1..n {
        design.connect(&format!("s{}", i - 1), "OUT", &format!("s{}", i), "IN");
    }
    design
}

#[test]
fn test_descriptor_has_every_sheet_and_connection_in_order() {
    let design = chain(6);
    let dir = tempfile::tempdir().unwrap();
    write_hierarchy(&design, dir.path()).unwrap();

    let descriptor = read_json(&dir.path().join("chain_hierarchy.json"));
    let sheets = descriptor["sheets"].as_object().unwrap();
    assert_eq!(sheets.len(), 6);

    let connections = descriptor["connections"].as_array().unwrap();
    assert_eq!(connections.len(), 5);
    for (i, pair) in connections.iter().enumerate() {
        assert_eq!(pair[0], format!("s{}.OUT", i));
        assert_eq!(pair[1], format!("s{}.IN", i + 1));
    }

    let s0 = &sheets["s0"];
    assert_eq!(s0["title"], "s0");
    assert_eq!(s0["file"], format!("{}/s0.sch.txt", SHEETS_DIR));
    assert_eq!(s0["hierarchical_pins"][0]["name"], "IN");
    assert_eq!(s0["hierarchical_pins"][1]["direction"], "out");
}

#[test]
fn test_export_writes_all_artifacts() {
    let design = schemguard::load_design(&fixture_path("valid_design.json")).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let report = write_hierarchy(&design, dir.path()).unwrap();

    // top level text + summary, descriptor, and two files per sheet
    assert_eq!(report.files.len(), 3 + 2 * design.sheet_count());
    for file in &report.files {
        assert!(file.exists(), "{} should exist", file.display());
    }

    let sheets = dir.path().join(SHEETS_DIR);
    assert!(sheets.join("touch_sensors.sch.txt").exists());
    assert!(sheets.join("touch_sensors_summary.json").exists());

    let summary = read_json(&dir.path().join("led_touch_grid_root_summary.json"));
    assert_eq!(summary["erc_status"], "passed");
    assert_eq!(summary["erc_errors"].as_array().unwrap().len(), 0);

    let sheet_summary = read_json(&sheets.join("power_summary.json"));
    assert_eq!(sheet_summary["symbols"].as_array().unwrap().len(), 2);
    assert!(sheet_summary.get("erc_status").is_none());

    let text = std::fs::read_to_string(sheets.join("power.sch.txt")).unwrap();
    assert!(text.contains("- C2: Device/C value=100nF 50V footprint=C_0603"));
    assert!(text.contains("# Power flags:\n- GND at (10, 20)\n"));
    assert_eq!(sheet_summary["power_flags"][0]["name"], "GND");
}

#[test]
fn test_export_records_erc_failures_without_blocking() {
    let design = schemguard::load_design(&fixture_path("missing_decap.json")).unwrap();
    let dir = tempfile::tempdir().unwrap();
    write_hierarchy(&design, dir.path()).unwrap();

    let summary = read_json(&dir.path().join("missing_decap_summary.json"));
    assert_eq!(summary["erc_status"], "failed");
    assert_eq!(
        summary["erc_errors"][0],
        "Power decoupling validation failed: Missing 100nF decoupling capacitor near VDD pins"
    );
}

#[test]
fn test_structural_error_aborts_before_writing() {
    let mut design = chain(2);
    design.connect("s0", "MISSING", "s1", "IN");

    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out");
    let err = write_hierarchy(&design, &out).unwrap_err();

    assert!(matches!(
        err,
        SchemGuardError::Erc(ErcError::PortNotFound { ref port, .. }) if port == "MISSING"
    ));
    assert!(!out.exists());
}

#[test]
fn test_export_is_idempotent() {
    let design = schemguard::load_design(&fixture_path("valid_design.json")).unwrap();
    let dir = tempfile::tempdir().unwrap();

    let first = write_hierarchy(&design, dir.path()).unwrap();
    let before: Vec<String> = first
        .files
        .iter()
        .map(|f| std::fs::read_to_string(f).unwrap())
        .collect();

    let second = write_hierarchy(&design, dir.path()).unwrap();
    assert_eq!(first.files, second.files);
    let after: Vec<String> = second
        .files
        .iter()
        .map(|f| std::fs::read_to_string(f).unwrap())
        .collect();
    assert_eq!(before, after);
}

#[test]
fn test_descriptor_signals_and_in_memory_build() {
    let design = schemguard::load_design(&fixture_path("valid_design.json")).unwrap();
    let descriptor = HierarchyDescriptor::from_graph(&design);

    assert_eq!(descriptor.sheets.len(), 4);
    assert_eq!(descriptor.connections.len(), 6);
    assert_eq!(descriptor.signals, design.signal_groups());
    assert!(descriptor
        .signals
        .iter()
        .any(|g| g.ports == vec!["power.5V_OUT", "mcu.5V_IN", "led.5V_IN"]));
}

#[test]
fn test_export_design_with_required_erc() {
    let dir = tempfile::tempdir().unwrap();
    let err = SchemGuardCore::export_design(
        &fixture_path("missing_decap.json"),
        dir.path(),
        &ErcOptions::default(),
        true,
    )
    .unwrap_err();
    assert!(matches!(err, SchemGuardError::ErcFailed(_)));
    assert!(!dir.path().join("missing_decap_hierarchy.json").exists());

    let report = SchemGuardCore::export_design(
        &fixture_path("valid_design.json"),
        dir.path(),
        &ErcOptions::default(),
        true,
    )
    .unwrap();
    assert!(!report.files.is_empty());
}

#[test]
fn test_sheet_titles_cannot_collide() {
    let mut a = Schematic::new();
    a.add_symbol(Symbol::new("U1", "MCU_RaspberryPi", "RP2040"));
    let mut b = Schematic::new();
    b.add_symbol(Symbol::new("J1", "Connector", "USB_C_Receptacle"));

    let mut design = HierarchicalSchematic::new("titles");
    design.add_sheet(Sheet::new("a", a).with_title("same")).unwrap();
    let err = design
        .add_sheet(Sheet::new("b", b).with_title("same"))
        .unwrap_err();
    assert!(matches!(err, ErcError::DuplicateSheetTitle { ref existing, .. } if existing == "a"));

    let dir = tempfile::tempdir().unwrap();
    let report = write_hierarchy(&design, dir.path()).unwrap();
    assert_eq!(report.files.len(), 5);
    let text = std::fs::read_to_string(dir.path().join(SHEETS_DIR).join("same.sch.txt")).unwrap();
    assert!(text.contains("- U1:"));
}

#[test]
fn test_unsafe_titles_never_leave_the_output_dir() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("a").join("b");

    let mut design = chain(1);
    design.title = "../../escaped".to_string();
    let err = write_hierarchy(&design, &out).unwrap_err();
    assert!(matches!(err, SchemGuardError::Erc(ErcError::InvalidTitle { .. })));
    assert!(!out.exists());
    assert!(!dir.path().join("escaped.sch.txt").exists());

    let mut design = HierarchicalSchematic::new("slashes");
    assert!(matches!(
        design.add_sheet(Sheet::new("x/y", Schematic::new())),
        Err(ErcError::InvalidSheetName { .. })
    ));
    assert!(matches!(
        design.add_sheet(Sheet::new("x", Schematic::new()).with_title("../../escaped")),
        Err(ErcError::InvalidTitle { .. })
    ));
    assert_eq!(design.sheet_count(), 0);
}
