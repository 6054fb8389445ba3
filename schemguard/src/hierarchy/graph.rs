//! The top-level hierarchical graph.
//!
//! Sheets live in an arena (`Vec<Sheet>`) addressed by [`SheetId`]; a
//! name → id table serves lookups. Sheets are never removed, so ids stay
//! stable for the lifetime of the graph.

use std::collections::{HashMap, HashSet};

use petgraph::algo::kosaraju_scc;
use petgraph::graph::{NodeIndex, UnGraph};
use serde::{Deserialize, Serialize};

use crate::error::ErcError;
use crate::schematic::Schematic;

use super::connection::{Connection, ConnectionEnd, ConnectionEndpoint, ROOT_SHEET};
use super::port::{Direction, Port};
use super::sheet::Sheet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SheetId(usize);

impl SheetId {
    pub fn index(&self) -> usize {
        self.0
    }
}

/// Knobs for structural validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HierarchyPolicy {
    /// Port names treated as power rails. A connection whose two port names are
    /// both listed skips the direction check; existence is still checked.
    /// `ErcConfig::power_rails` is added on top when a config is in play.
    #[serde(default)]
    pub power_rails: Vec<String>,
}

impl HierarchyPolicy {
    /// This policy plus `rails`, without repeats.
    pub fn with_rails(&self, rails: &[String]) -> HierarchyPolicy {
        let mut merged = self.clone();
        for rail in rails {
            if !merged.power_rails.contains(rail) {
                merged.power_rails.push(rail.clone());
            }
        }
        merged
    }

    fn exempts(&self, parent_port: &str, child_port: &str) -> bool {
        let listed = |name: &str| self.power_rails.iter().any(|r| r == name);
        listed(parent_port) && listed(child_port)
    }
}

/// Fully qualified ports that end up on the same inter-sheet signal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SignalGroup {
    pub ports: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct HierarchicalSchematic {
    pub title: String,
    /// Symbols, wires and nets that belong to the top level itself.
    pub schematic: Schematic,
    pub policy: HierarchyPolicy,
    sheets: Vec<Sheet>,
    sheet_indices: HashMap<String, SheetId>,
    connections: Vec<Connection>,
}

impl HierarchicalSchematic {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            schematic: Schematic::new(),
            policy: HierarchyPolicy::default(),
            sheets: Vec::new(),
            sheet_indices: HashMap::new(),
            connections: Vec::new(),
        }
    }

    pub fn with_policy(mut self, policy: HierarchyPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Take ownership of a sheet. Names must be unique, non-empty, dot-free and not `root`.
    /// Titles name the exported files, so they must be unique file stems.
    pub fn add_sheet(&mut self, sheet: Sheet) -> Result<SheetId, ErcError> {
        if let Some(reason) = invalid_sheet_name(&sheet.name) {
            return Err(ErcError::InvalidSheetName {
                name: sheet.name,
                reason,
            });
        }
        if self.sheet_indices.contains_key(&sheet.name) {
            return Err(ErcError::DuplicateSheet { name: sheet.name });
        }
        if let Some(reason) = invalid_file_stem(&sheet.title) {
            return Err(ErcError::InvalidTitle {
                title: sheet.title,
                reason,
            });
        }
        if let Some(existing) = self.sheets.iter().find(|s| s.title == sheet.title) {
            return Err(ErcError::DuplicateSheetTitle {
                title: sheet.title,
                existing: existing.name.clone(),
            });
        }

        let id = SheetId(self.sheets.len());
        self.sheet_indices.insert(sheet.name.clone(), id);
        self.sheets.push(sheet);
        Ok(id)
    }

    /// Record `parent_sheet.parent_port -> child_sheet.child_port`. Never fails;
    /// the referenced sheets and ports may not exist yet.
    pub fn connect(
        &mut self,
        parent_sheet: &str,
        parent_port: &str,
        child_sheet: &str,
        child_port: &str,
    ) {
        self.connections.push(Connection::new(
            format!("{}.{}", parent_sheet, parent_port),
            format!("{}.{}", child_sheet, child_port),
        ));
    }

    /// Record an already qualified pair. Malformed text is reported at validation.
    pub fn connect_qualified(&mut self, parent: impl Into<String>, child: impl Into<String>) {
        self.connections.push(Connection::new(parent, child));
    }

    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheet_indices.get(name).map(|id| &self.sheets[id.0])
    }

    pub fn sheet_id(&self, name: &str) -> Option<SheetId> {
        self.sheet_indices.get(name).copied()
    }

    pub fn sheet_by_id(&self, id: SheetId) -> Option<&Sheet> {
        self.sheets.get(id.0)
    }

    /// Sheets in insertion order.
    pub fn sheets(&self) -> impl Iterator<Item = &Sheet> {
        self.sheets.iter()
    }

    pub fn sheet_count(&self) -> usize {
        self.sheets.len()
    }

    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    /// Fail-fast structural check, returning the first problem in connection order.
    pub fn validate_hierarchy(&self) -> Result<(), ErcError> {
        self.validate_hierarchy_with(&[])
    }

    /// [`validate_hierarchy`](Self::validate_hierarchy) with `rails` added to the
    /// power-rail allowlist for this check only.
    pub fn validate_hierarchy_with(&self, rails: &[String]) -> Result<(), ErcError> {
        let policy = self.policy.with_rails(rails);
        let first = self.violations(&policy).next();
        match first {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Every structural problem, in connection order, then duplicate symbol references.
    pub fn hierarchy_violations(&self) -> Vec<ErcError> {
        self.hierarchy_violations_with(&[])
    }

    pub fn hierarchy_violations_with(&self, rails: &[String]) -> Vec<ErcError> {
        let policy = self.policy.with_rails(rails);
        self.violations(&policy).collect()
    }

    fn violations<'a>(&'a self, policy: &'a HierarchyPolicy) -> impl Iterator<Item = ErcError> + 'a {
        self.connections
            .iter()
            .flat_map(move |conn| self.check_connection(conn, policy))
            .chain(self.duplicate_reference_violations())
    }

    fn check_connection(&self, conn: &Connection, policy: &HierarchyPolicy) -> Vec<ErcError> {
        let (parent, child) = match conn.endpoints() {
            Ok(pair) => pair,
            Err(err) => return vec![err],
        };

        let mut errors = Vec::new();
        let parent_dir = self.resolve(&parent, ConnectionEnd::Parent, conn);
        let child_dir = self.resolve(&child, ConnectionEnd::Child, conn);

        let (parent_dir, child_dir) = match (parent_dir, child_dir) {
            (Ok(p), Ok(c)) => (p, c),
            (p, c) => {
                errors.extend(p.err());
                errors.extend(c.err());
                return errors;
            }
        };

        if policy.exempts(parent.port(), child.port()) {
            return errors;
        }

        if !parent_dir.can_drive() {
            errors.push(ErcError::DirectionConflict {
                end: ConnectionEnd::Parent,
                port: parent.port().to_string(),
                sheet: parent.sheet().to_string(),
                direction: parent_dir,
                peer: child.to_string(),
            });
        }
        if !child_dir.can_receive() {
            errors.push(ErcError::DirectionConflict {
                end: ConnectionEnd::Child,
                port: child.port().to_string(),
                sheet: child.sheet().to_string(),
                direction: child_dir,
                peer: parent.to_string(),
            });
        }
        errors
    }

    fn resolve(
        &self,
        endpoint: &ConnectionEndpoint,
        end: ConnectionEnd,
        conn: &Connection,
    ) -> Result<Direction, ErcError> {
        match endpoint {
            // Top-level signals can both drive and be driven.
            ConnectionEndpoint::Root { .. } => Ok(Direction::InOut),
            ConnectionEndpoint::Named { sheet, port } => {
                let owner = self.sheet(sheet).ok_or_else(|| ErcError::SheetNotFound {
                    end,
                    sheet: sheet.clone(),
                    connection: conn.to_string(),
                })?;
                owner
                    .find_port(port)
                    .map(|p| p.direction)
                    .ok_or_else(|| ErcError::PortNotFound {
                        end,
                        port: port.clone(),
                        sheet: sheet.clone(),
                    })
            }
        }
    }

    fn duplicate_reference_violations(&self) -> impl Iterator<Item = ErcError> + '_ {
        let root = std::iter::once((ROOT_SHEET, &self.schematic));
        let sheets = self.sheets.iter().map(|s| (s.name.as_str(), &s.schematic));
        root.chain(sheets).flat_map(|(sheet, schematic)| {
            schematic
                .duplicate_references()
                .into_iter()
                .map(move |reference| ErcError::DuplicateSymbolReference {
                    sheet: sheet.to_string(),
                    reference: reference.to_string(),
                })
        })
    }

    /// Declared ports that no connection refers to.
    pub fn floating_ports(&self) -> Vec<&Port> {
        let referenced: HashSet<ConnectionEndpoint> = self
            .connections
            .iter()
            .filter_map(|c| c.endpoints().ok())
            .flat_map(|(p, c)| [p, c])
            .collect();

        self.sheets
            .iter()
            .flat_map(|s| s.ports())
            .filter(|port| {
                !referenced.contains(&ConnectionEndpoint::Named {
                    sheet: port.sheet.clone(),
                    port: port.name.clone(),
                })
            })
            .collect()
    }

    /// Groups of ports joined (transitively) by connections, ignoring direction.
    ///
    /// Malformed connections are skipped. Groups come out in first-declared order.
    pub fn signal_groups(&self) -> Vec<SignalGroup> {
        let mut graph: UnGraph<String, ()> = UnGraph::new_undirected();
        let mut indices: HashMap<String, NodeIndex> = HashMap::new();

        let mut node = |graph: &mut UnGraph<String, ()>, name: String| -> NodeIndex {
            *indices
                .entry(name.clone())
                .or_insert_with(|| graph.add_node(name))
        };

        for port in self.sheets.iter().flat_map(|s| s.ports()) {
            node(&mut graph, port.qualified_name());
        }
        for (parent, child) in self.connections.iter().filter_map(|c| c.endpoints().ok()) {
            let a = node(&mut graph, parent.to_string());
            let b = node(&mut graph, child.to_string());
            graph.update_edge(a, b, ());
        }

        let mut components: Vec<Vec<NodeIndex>> = kosaraju_scc(&graph)
            .into_iter()
            .filter(|c| c.len() > 1)
            .map(|mut c| {
                c.sort();
                c
            })
            .collect();
        components.sort_by_key(|c| c[0]);

        components
            .into_iter()
            .map(|c| SignalGroup {
                ports: c.into_iter().map(|idx| graph[idx].clone()).collect(),
            })
            .collect()
    }
}

fn invalid_sheet_name(name: &str) -> Option<&'static str> {
    if name.is_empty() {
        Some("name is empty")
    } else if name == ROOT_SHEET {
        Some("'root' is reserved for top-level signals")
    } else if name.contains('.') {
        Some("name must not contain '.'")
    } else {
        invalid_file_stem(name)
    }
}

/// Why `stem` cannot be used as a file name directly under an output directory.
pub(crate) fn invalid_file_stem(stem: &str) -> Option<&'static str> {
    if stem.is_empty() {
        Some("name is empty")
    } else if stem == "." || stem == ".." {
        Some("name must not be '.' or '..'")
    } else if stem.contains(['/', '\\']) {
        Some("name must not contain path separators")
    } else if stem.contains('\0') {
        Some("name must not contain NUL")
    } else {
        None
    }
}
