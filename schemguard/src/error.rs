//! Error taxonomy for graph construction and ERC.
//!
//! Every variant is a pure function of the graph contents, so nothing here is
//! ever retried. `InvalidDirection`, `DuplicatePort` and the sheet naming
//! errors are raised while building; everything else comes out of a
//! validation pass.

use std::fmt;

use crate::hierarchy::{ConnectionEnd, Direction};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ErcError {
    #[error("Sheet with name '{name}' already exists")]
    DuplicateSheet { name: String },

    #[error("Invalid sheet name '{name}': {reason}")]
    InvalidSheetName { name: String, reason: &'static str },

    #[error("Sheet title '{title}' is already used by sheet '{existing}'")]
    DuplicateSheetTitle { title: String, existing: String },

    #[error("Invalid title '{title}': {reason}")]
    InvalidTitle { title: String, reason: &'static str },

    #[error("Port '{port}' is declared more than once on sheet '{sheet}'")]
    DuplicatePort { sheet: String, port: String },

    #[error("{end} sheet '{sheet}' not found for connection {connection}")]
    SheetNotFound {
        end: ConnectionEnd,
        sheet: String,
        connection: String,
    },

    #[error("{end} pin '{port}' not found on sheet '{sheet}'")]
    PortNotFound {
        end: ConnectionEnd,
        port: String,
        sheet: String,
    },

    #[error("Invalid direction '{value}'. Must be one of: in, out, inout")]
    InvalidDirection { value: String },

    #[error(
        "{end} pin '{port}' on '{sheet}' has direction '{direction}' and {action} '{peer}'",
        action = .end.conflict_action()
    )]
    DirectionConflict {
        end: ConnectionEnd,
        port: String,
        sheet: String,
        direction: Direction,
        peer: String,
    },

    #[error("Invalid hierarchical connection format: {parent} -> {child}")]
    InvalidConnectionFormat { parent: String, child: String },

    #[error("Symbol reference '{reference}' is used more than once on sheet '{sheet}'")]
    DuplicateSymbolReference { sheet: String, reference: String },

    #[error("Missing 100nF decoupling capacitor near VDD pins")]
    MissingDecouplingCapacitor,

    #[error("Missing bulk capacitor for LED power rail")]
    MissingBulkCapacitor,

    #[error("Missing pull-up resistors for I2C net '{net}'")]
    MissingPullups { net: String },

    #[error("Multiple pull-up sets detected for I2C net '{net}' ({count} resistors)")]
    MultiplePullupSets { net: String, count: usize },

    #[error("Invalid pull-up value {value_kohm}kΩ for I2C net '{net}'. Must be {min_kohm}-{max_kohm}kΩ")]
    InvalidPullupValue {
        net: String,
        value_kohm: f64,
        min_kohm: f64,
        max_kohm: f64,
    },
}

impl ErcError {
    /// Stable machine-readable code, used in JSON and CI output.
    pub fn code(&self) -> &'static str {
        match self {
            ErcError::DuplicateSheet { .. } => "duplicate_sheet",
            ErcError::InvalidSheetName { .. } => "invalid_sheet_name",
            ErcError::DuplicateSheetTitle { .. } => "duplicate_sheet_title",
            ErcError::InvalidTitle { .. } => "invalid_title",
            ErcError::DuplicatePort { .. } => "duplicate_port",
            ErcError::SheetNotFound { .. } => "sheet_not_found",
            ErcError::PortNotFound { .. } => "port_not_found",
            ErcError::InvalidDirection { .. } => "invalid_direction",
            ErcError::DirectionConflict { .. } => "direction_conflict",
            ErcError::InvalidConnectionFormat { .. } => "invalid_connection_format",
            ErcError::DuplicateSymbolReference { .. } => "duplicate_symbol_reference",
            ErcError::MissingDecouplingCapacitor => "missing_decoupling_capacitor",
            ErcError::MissingBulkCapacitor => "missing_bulk_capacitor",
            ErcError::MissingPullups { .. } => "missing_pullups",
            ErcError::MultiplePullupSets { .. } => "multiple_pullup_sets",
            ErcError::InvalidPullupValue { .. } => "invalid_pullup_value",
        }
    }

    /// Sheet the problem is attributed to, when there is one.
    pub fn sheet(&self) -> Option<&str> {
        match self {
            ErcError::SheetNotFound { sheet, .. }
            | ErcError::PortNotFound { sheet, .. }
            | ErcError::DirectionConflict { sheet, .. }
            | ErcError::DuplicatePort { sheet, .. }
            | ErcError::DuplicateSymbolReference { sheet, .. } => Some(sheet),
            _ => None,
        }
    }
}

/// All violations reported by one rule during a full ERC run.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleFailure {
    pub rule_id: String,
    /// Human label used as the line prefix, e.g. "Hierarchy".
    pub label: String,
    pub errors: Vec<ErcError>,
}

/// Combined result of a full ERC run that found at least one violation.
#[derive(Debug, Clone, PartialEq)]
pub struct ErcFailure {
    pub failures: Vec<RuleFailure>,
}

impl ErcFailure {
    pub fn errors(&self) -> impl Iterator<Item = &ErcError> {
        self.failures.iter().flat_map(|f| f.errors.iter())
    }

    pub fn error_count(&self) -> usize {
        self.failures.iter().map(|f| f.errors.len()).sum()
    }

    /// One line per violation.
    pub fn lines(&self) -> Vec<String> {
        self.failures
            .iter()
            .flat_map(|f| {
                f.errors
                    .iter()
                    .map(move |e| format!("{} validation failed: {}", f.label, e))
            })
            .collect()
    }
}

impl fmt::Display for ErcFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.lines().join("\n"))
    }
}

impl std::error::Error for ErcFailure {}
