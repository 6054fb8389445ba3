//! Export adapter: hierarchy descriptor, summaries and per-sheet dumps.
//!
//! Export always re-runs the fail-fast structural check, and checks that the
//! top-level title is a plain file name, before touching the filesystem. Non-structural rules are recorded in the top-level summary but
//! do not block writing.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use serde::{Serialize, Serializer};

use crate::core::SchemGuardError;
use crate::erc::ErcEngine;
use crate::error::ErcError;
use crate::hierarchy::graph::invalid_file_stem;
use crate::hierarchy::{HierarchicalSchematic, Port, Sheet, SignalGroup};
use crate::schematic::{Net, PowerFlag, Schematic, Symbol, Wire};

pub const SHEETS_DIR: &str = "sheets";

#[derive(Debug, Clone, Serialize)]
pub struct SheetDescriptor {
    pub title: String,
    /// Dump path relative to the output directory.
    pub file: String,
    pub symbols: Vec<Symbol>,
    pub hierarchical_pins: Vec<Port>,
}

impl SheetDescriptor {
    fn from_sheet(sheet: &Sheet) -> Self {
        Self {
            title: sheet.title.clone(),
            file: format!("{}/{}.sch.txt", SHEETS_DIR, sheet.title),
            symbols: sheet.schematic.symbols.clone(),
            hierarchical_pins: sheet.ports().to_vec(),
        }
    }
}

/// The document written to `<title>_hierarchy.json`.
#[derive(Debug, Clone, Serialize)]
pub struct HierarchyDescriptor {
    pub title: String,
    /// Insertion order, serialized as a JSON object keyed by sheet name.
    #[serde(serialize_with = "ordered_map")]
    pub sheets: Vec<(String, SheetDescriptor)>,
    pub connections: Vec<(String, String)>,
    pub signals: Vec<SignalGroup>,
}

fn ordered_map<S: Serializer>(
    entries: &[(String, SheetDescriptor)],
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_map(entries.iter().map(|(k, v)| (k, v)))
}

impl HierarchyDescriptor {
    pub fn from_graph(graph: &HierarchicalSchematic) -> Self {
        Self {
            title: graph.title.clone(),
            sheets: graph
                .sheets()
                .map(|s| (s.name.clone(), SheetDescriptor::from_sheet(s)))
                .collect(),
            connections: graph.connections().iter().map(|c| c.as_pair()).collect(),
            signals: graph.signal_groups(),
        }
    }
}

#[derive(Debug, Serialize)]
struct SchematicSummary<'a> {
    title: &'a str,
    symbols: &'a [Symbol],
    wires: &'a [Wire],
    nets: &'a [Net],
    power_flags: &'a [PowerFlag],
    #[serde(flatten)]
    erc: Option<ErcSummary>,
}

#[derive(Debug, Serialize)]
struct ErcSummary {
    erc_status: &'static str,
    erc_errors: Vec<String>,
}

/// Files written by one export.
#[derive(Debug, Clone, Default)]
pub struct ExportReport {
    pub files: Vec<PathBuf>,
}

impl ExportReport {
    fn write(&mut self, path: PathBuf, contents: &str) -> Result<(), SchemGuardError> {
        std::fs::write(&path, contents)?;
        tracing::debug!("Wrote {}", path.display());
        self.files.push(path);
        Ok(())
    }
}

/// Human-readable dump of one container.
pub fn render_text(title: &str, schematic: &Schematic) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# Schematic: {}", title);
    let _ = writeln!(out, "# Symbols:");
    for s in &schematic.symbols {
        let _ = write!(out, "- {}: {}/{}", s.reference, s.library, s.name);
        if let Some(value) = &s.value {
            let _ = write!(out, " value={}", value);
        }
        if let Some(footprint) = &s.footprint {
            let _ = write!(out, " footprint={}", footprint);
        }
        out.push('\n');
    }
    let _ = writeln!(out, "# Wires:");
    for w in &schematic.wires {
        let _ = writeln!(out, "- {} -> {}", w.a, w.b);
    }
    let _ = writeln!(out, "# Nets:");
    for n in &schematic.nets {
        let _ = writeln!(out, "- {}: {}", n.name, n.endpoints.join(", "));
    }
    if !schematic.power_flags.is_empty() {
        let _ = writeln!(out, "# Power flags:");
        for flag in &schematic.power_flags {
            match flag.at {
                Some((x, y)) => {
                    let _ = writeln!(out, "- {} at ({}, {})", flag.name, x, y);
                }
                None => {
                    let _ = writeln!(out, "- {}", flag.name);
                }
            }
        }
    }
    out
}

fn summary_json(
    title: &str,
    schematic: &Schematic,
    erc: Option<ErcSummary>,
) -> Result<String, SchemGuardError> {
    let summary = SchematicSummary {
        title,
        symbols: &schematic.symbols,
        wires: &schematic.wires,
        nets: &schematic.nets,
        power_flags: &schematic.power_flags,
        erc,
    };
    Ok(serde_json::to_string_pretty(&summary)?)
}

/// Write every artifact for `graph` under `out_dir`, recording a default ERC run
/// in the top-level summary.
///
/// Fails with the first structural problem before anything is written.
pub fn write_hierarchy(graph: &HierarchicalSchematic, out_dir: &Path) -> Result<ExportReport, SchemGuardError> {
    write_hierarchy_with(graph, out_dir, &ErcEngine::default())
}

/// Same as [`write_hierarchy`], with the summary's ERC status taken from `engine`.
pub fn write_hierarchy_with(
    graph: &HierarchicalSchematic,
    out_dir: &Path,
    engine: &ErcEngine,
) -> Result<ExportReport, SchemGuardError> {
    graph.validate_hierarchy_with(&engine.config().power_rails)?;
    if let Some(reason) = invalid_file_stem(&graph.title) {
        return Err(ErcError::InvalidTitle {
            title: graph.title.clone(),
            reason,
        }
        .into());
    }

    let sheets_dir = out_dir.join(SHEETS_DIR);
    std::fs::create_dir_all(&sheets_dir)?;

    let mut report = ExportReport::default();

    let erc = match engine.run(graph) {
        Ok(()) => ErcSummary {
            erc_status: "passed",
            erc_errors: Vec::new(),
        },
        Err(failure) => {
            tracing::warn!(
                "Exporting '{}' with {} ERC violation(s)",
                graph.title,
                failure.error_count()
            );
            ErcSummary {
                erc_status: "failed",
                erc_errors: failure.lines(),
            }
        }
    };

    report.write(
        out_dir.join(format!("{}.sch.txt", graph.title)),
        &render_text(&graph.title, &graph.schematic),
    )?;
    report.write(
        out_dir.join(format!("{}_summary.json", graph.title)),
        &summary_json(&graph.title, &graph.schematic, Some(erc))?,
    )?;

    for sheet in graph.sheets() {
        report.write(
            sheets_dir.join(format!("{}.sch.txt", sheet.title)),
            &render_text(&sheet.title, &sheet.schematic),
        )?;
        report.write(
            sheets_dir.join(format!("{}_summary.json", sheet.title)),
            &summary_json(&sheet.title, &sheet.schematic, None)?,
        )?;
    }

    let descriptor = HierarchyDescriptor::from_graph(graph);
    report.write(
        out_dir.join(format!("{}_hierarchy.json", graph.title)),
        &serde_json::to_string_pretty(&descriptor)?,
    )?;

    tracing::info!(
        "Exported '{}' to {} ({} files)",
        graph.title,
        out_dir.display(),
        report.files.len()
    );
    Ok(report)
}
