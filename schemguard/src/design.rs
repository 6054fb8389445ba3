//! JSON design documents written by external sheet generators.
//!
//! Loading goes through the same generator contract as hand-written Rust
//! builders: every sheet is added with `add_sheet`, every pair with
//! `connect_qualified`. Bad port directions, repeated port or sheet names and
//! unusable titles fail the build; connection problems wait for validation.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::SchemGuardError;
use crate::error::ErcError;
use crate::hierarchy::{HierarchicalSchematic, HierarchyPolicy, Sheet};
use crate::schematic::Schematic;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortDocument {
    pub name: String,
    /// Kept as text so bad values surface as `InvalidDirection` on build.
    pub direction: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SheetDocument {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(flatten)]
    pub schematic: Schematic,
    #[serde(default)]
    pub ports: Vec<PortDocument>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DesignDocument {
    pub title: String,
    #[serde(default)]
    pub root: Schematic,
    #[serde(default)]
    pub sheets: Vec<SheetDocument>,
    /// `("sheet.port", "sheet.port")` pairs, parent first.
    #[serde(default)]
    pub connections: Vec<(String, String)>,
    #[serde(default)]
    pub power_rails: Vec<String>,
}

impl DesignDocument {
    pub fn load(path: &Path) -> Result<Self, SchemGuardError> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    pub fn from_json(text: &str) -> Result<Self, SchemGuardError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn into_graph(self) -> Result<HierarchicalSchematic, ErcError> {
        let mut graph = HierarchicalSchematic::new(self.title).with_policy(HierarchyPolicy {
            power_rails: self.power_rails,
        });
        graph.schematic = self.root;

        for doc in self.sheets {
            let mut sheet = Sheet::new(doc.name, doc.schematic);
            if let Some(title) = doc.title {
                sheet = sheet.with_title(title);
            }
            for port in doc.ports {
                sheet.add_port(port.name, &port.direction)?;
            }
            graph.add_sheet(sheet)?;
        }

        for (parent, child) in self.connections {
            graph.connect_qualified(parent, child);
        }
        Ok(graph)
    }

    /// Snapshot a graph back into document form.
    pub fn from_graph(graph: &HierarchicalSchematic) -> Self {
        Self {
            title: graph.title.clone(),
            root: graph.schematic.clone(),
            sheets: graph
                .sheets()
                .map(|sheet| SheetDocument {
                    name: sheet.name.clone(),
                    title: (sheet.title != sheet.name).then(|| sheet.title.clone()),
                    schematic: sheet.schematic.clone(),
                    ports: sheet
                        .ports()
                        .iter()
                        .map(|p| PortDocument {
                            name: p.name.clone(),
                            direction: p.direction.to_string(),
                        })
                        .collect(),
                })
                .collect(),
            connections: graph.connections().iter().map(|c| c.as_pair()).collect(),
            power_rails: graph.policy.power_rails.clone(),
        }
    }
}
