//! SchemGuard - hierarchical schematic composition and electrical rule checking
//!
//! Sheets are built independently, wired together through named hierarchical
//! ports, checked for structural and electrical mistakes, and exported as a
//! machine-readable hierarchy descriptor plus per-sheet dumps.
//!
//! # Quick Start
//!
//! ```
//! use schemguard::prelude::*;
//!
//! let mut power = Sheet::new("power", Schematic::new());
//! power.add_port("5V_OUT", "out").unwrap();
//! let mut led = Sheet::new("led", Schematic::new());
//! led.add_port("5V_IN", "in").unwrap();
//!
//! let mut design = HierarchicalSchematic::new("demo");
//! design.add_sheet(power).unwrap();
//! design.add_sheet(led).unwrap();
//! design.connect("power", "5V_OUT", "led", "5V_IN");
//!
//! assert!(design.validate_hierarchy().is_ok());
//! assert!(design.run_full_erc().is_ok());
//! ```
//!
//! # Features
//!
//! - **Hierarchy**: sheet registry, typed ports, parent/child connections
//! - **ERC**: port direction compatibility, decoupling and bulk capacitors, I2C pull-ups
//! - **Export**: hierarchy descriptor JSON, text dumps and summaries per sheet

pub mod config;
pub mod core;
pub mod design;
pub mod erc;
pub mod error;
pub mod export;
pub mod hierarchy;
pub mod schematic;

// Re-export main types
pub use config::{ErcConfig, ErcOptions};
pub use crate::core::{Issue, SchemGuardCore, SchemGuardError, Severity, ValidationResult, ValidationStats};
pub use design::DesignDocument;
pub use erc::{ErcEngine, ErcRule};
pub use error::{ErcError, ErcFailure, RuleFailure};
pub use export::{write_hierarchy, ExportReport, HierarchyDescriptor};
pub use hierarchy::{Direction, HierarchicalSchematic, HierarchyPolicy, Port, Sheet};
pub use schematic::{Net, PowerFlag, Schematic, Symbol, Wire};

/// Load a design document from disk and build its graph (convenience wrapper).
pub fn load_design(path: &std::path::Path) -> Result<HierarchicalSchematic, SchemGuardError> {
    Ok(DesignDocument::load(path)?.into_graph()?)
}

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{
        Direction, ErcConfig, ErcEngine, ErcError, ErcFailure, ErcOptions, ErcRule,
        HierarchicalSchematic, Issue, Schematic, SchemGuardCore, SchemGuardError, Severity, Sheet,
        Symbol, ValidationResult,
    };
}
