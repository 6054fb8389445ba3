use std::collections::HashSet;

use crate::hierarchy::{HierarchicalSchematic, ROOT_SHEET};
use crate::schematic::{Schematic, Symbol};

use super::classify::PartClass;

/// A symbol together with where it lives and what it is.
#[derive(Debug, Clone, Copy)]
pub struct PlacedSymbol<'a> {
    pub sheet: &'a str,
    pub symbol: &'a Symbol,
    pub class: PartClass,
}

/// Read-only view over the top-level container and every sheet container.
///
/// Rules see one flat design; they never care which sheet a part sits on.
#[derive(Debug, Clone, Copy)]
pub struct DesignView<'a> {
    graph: &'a HierarchicalSchematic,
}

impl<'a> DesignView<'a> {
    pub fn new(graph: &'a HierarchicalSchematic) -> Self {
        Self { graph }
    }

    pub fn graph(&self) -> &'a HierarchicalSchematic {
        self.graph
    }

    /// `(sheet name, container)`, top level first.
    pub fn containers(&self) -> impl Iterator<Item = (&'a str, &'a Schematic)> {
        let graph = self.graph;
        std::iter::once((ROOT_SHEET, &graph.schematic))
            .chain(graph.sheets().map(|s| (s.name.as_str(), &s.schematic)))
    }

    pub fn symbols(&self) -> impl Iterator<Item = PlacedSymbol<'a>> {
        self.containers().flat_map(|(sheet, schematic)| {
            schematic.symbols.iter().map(move |symbol| PlacedSymbol {
                sheet,
                symbol,
                class: PartClass::classify(symbol),
            })
        })
    }

    pub fn symbols_of(&self, class: PartClass) -> impl Iterator<Item = PlacedSymbol<'a>> {
        self.symbols().filter(move |p| p.class == class)
    }

    /// Net names across all containers, first-seen order, no repeats.
    pub fn net_names(&self) -> Vec<&'a str> {
        let mut seen = HashSet::new();
        self.containers()
            .flat_map(|(_, schematic)| schematic.net_names())
            .filter(|name| seen.insert(*name))
            .collect()
    }
}
