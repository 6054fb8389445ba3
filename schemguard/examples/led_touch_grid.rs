//! Five-sheet LED touch grid: power, MCU, touch, LED and I/O sheets composed
//! into one hierarchy, checked, and exported.
//!
//! Run with `cargo run --example led_touch_grid -- [OUT_DIR]`.

use schemguard::erc::NET_FIELD;
use schemguard::prelude::*;
use schemguard::export::write_hierarchy;
use std::error::Error;
use std::path::PathBuf;

const LED_COUNT: usize = 8;

fn power_sheet() -> Result<Sheet, ErcError> {
    let mut sch = Schematic::new();
    sch.add_symbol(Symbol::new("J1", "Connector", "USB_C_Receptacle").with_value("USB-C Input"));
    sch.add_symbol(Symbol::new("U1", "Regulator_Linear", "AMS1117-3.3").with_value("3.3V LDO"));
    sch.add_symbol(
        Symbol::new("C1", "Device", "C")
            .with_value("1000\u{b5}F 10V")
            .with_footprint("CP_Radial_D10.0mm"),
    );
    sch.add_symbol(Symbol::new("C2", "Device", "C").with_value("10\u{b5}F 10V"));
    sch.add_net("5V_OUT", ["J1.VBUS", "U1.VI", "C1.1"]);
    sch.add_net("3.3V_OUT", ["U1.VO", "C2.1"]);
    sch.add_wire("C1.2", "GND");
    sch.add_wire("C2.2", "GND");
    sch.add_power_flag("5V_OUT", None);
    sch.add_gnd(None);

    let mut sheet = Sheet::new("power", sch);
    sheet.add_port("5V_OUT", "out")?;
    sheet.add_port("3.3V_OUT", "out")?;
    sheet.add_port("GND", "inout")?;
    Ok(sheet)
}

fn mcu_sheet() -> Result<Sheet, ErcError> {
    let mut sch = Schematic::new();
    for (reference, role) in [("U1", "Touch"), ("U2", "LED")] {
        sch.add_symbol(
            Symbol::new(reference, "RP2040", "RP2040")
                .with_value(format!("{} RP2040", role))
                .with_footprint("RP2040-QFN56"),
        );
    }
    for i in 1..=4 {
        sch.add_symbol(Symbol::new(format!("C{}", i), "Device", "C").with_value("100nF 50V"));
    }
    sch.add_net("I2C_SDA", ["U1.GPIO4"]);
    sch.add_net("I2C_SCL", ["U1.GPIO5"]);

    let mut sheet = Sheet::new("mcu", sch).with_title("mcu_rp2040");
    sheet.add_port("3.3V_IN", "in")?;
    sheet.add_port("GND", "inout")?;
    sheet.add_port("TOUCH_GPIO_BUS", "inout")?;
    sheet.add_port("LED_SPI_BUS", "out")?;
    sheet.add_port("I2C_SDA", "inout")?;
    sheet.add_port("I2C_SCL", "inout")?;
    sheet.add_port("RESET", "in")?;
    Ok(sheet)
}

fn touch_sheet() -> Result<Sheet, ErcError> {
    let mut sch = Schematic::new();
    for i in 1..=16 {
        sch.add_symbol(Symbol::new(format!("TP{}", i), "Touch", "Pad").with_value("TouchPad"));
    }

    let mut sheet = Sheet::new("touch", sch);
    sheet.add_port("TOUCH_GRID_BUS", "inout")?;
    sheet.add_port("3.3V_IN", "in")?;
    sheet.add_port("GND", "inout")?;
    Ok(sheet)
}

fn led_sheet() -> Result<Sheet, ErcError> {
    let mut sch = Schematic::new();
    for i in 1..=LED_COUNT {
        sch.add_symbol(Symbol::new(format!("D{}", i), "LED", "APA102").with_value("APA102"));
        if i > 1 {
            sch.add_wire(format!("D{}.DO", i - 1), format!("D{}.DI", i));
        }
    }
    sch.add_symbol(Symbol::new("CB1", "Device", "C").with_value("470\u{b5}F 10V"));

    let mut sheet = Sheet::new("led", sch);
    sheet.add_port("5V_IN", "in")?;
    sheet.add_port("GND_IN", "inout")?;
    sheet.add_port("DATA_IN", "in")?;
    Ok(sheet)
}

fn io_sheet() -> Result<Sheet, ErcError> {
    let mut sch = Schematic::new();
    sch.add_symbol(Symbol::new("J2", "Connector", "Conn_01x04").with_value("I2C Header"));
    for (reference, net) in [("R1", "I2C_SDA"), ("R2", "I2C_SCL")] {
        sch.add_symbol(
            Symbol::new(reference, "Device", "R")
                .with_value("4.7k")
                .with_field(NET_FIELD, net),
        );
    }

    let mut sheet = Sheet::new("io", sch);
    sheet.add_port("I2C_SDA", "inout")?;
    sheet.add_port("I2C_SCL", "inout")?;
    sheet.add_port("RESET", "out")?;
    sheet.add_port("GND", "inout")?;
    Ok(sheet)
}

fn build() -> Result<HierarchicalSchematic, ErcError> {
    let mut design = HierarchicalSchematic::new("led_touch_grid_root");
    for sheet in [power_sheet()?, mcu_sheet()?, touch_sheet()?, led_sheet()?, io_sheet()?] {
        design.add_sheet(sheet)?;
    }

    design.connect("power", "3.3V_OUT", "mcu", "3.3V_IN");
    design.connect("power", "3.3V_OUT", "touch", "3.3V_IN");
    design.connect("power", "5V_OUT", "led", "5V_IN");
    design.connect("power", "GND", "mcu", "GND");
    design.connect("power", "GND", "touch", "GND");
    design.connect("power", "GND", "led", "GND_IN");
    design.connect("power", "GND", "io", "GND");

    design.connect("mcu", "TOUCH_GPIO_BUS", "touch", "TOUCH_GRID_BUS");
    design.connect("mcu", "I2C_SDA", "io", "I2C_SDA");
    design.connect("mcu", "I2C_SCL", "io", "I2C_SCL");
    design.connect("io", "RESET", "mcu", "RESET");
    design.connect("mcu", "LED_SPI_BUS", "led", "DATA_IN");
    Ok(design)
}

fn main() -> Result<(), Box<dyn Error>> {
    let out_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("out/led_touch_grid/root"));

    let design = build()?;
    println!(
        "Built '{}': {} sheets, {} connections",
        design.title,
        design.sheet_count(),
        design.connections().len()
    );

    design.validate_hierarchy()?;
    match design.run_full_erc() {
        Ok(()) => println!("ERC passed"),
        Err(failure) => {
            println!("ERC found {} problem(s):", failure.error_count());
            for line in failure.lines() {
                println!("  {}", line);
            }
        }
    }

    for group in design.signal_groups() {
        println!("  signal: {}", group.ports.join(" = "));
    }

    let report = write_hierarchy(&design, &out_dir)?;
    println!("Wrote {} files to {}", report.files.len(), out_dir.display());
    Ok(())
}
