//! Component container for a single sheet: symbols, wires, named nets and
//! power flags.
//!
//! Everything here is append-only data. Nothing is validated on insertion;
//! references to nets or pins that do not exist yet are resolved (if at all)
//! by the ERC rules that care about them.

use std::collections::{BTreeMap, HashSet};
use serde::{Deserialize, Serialize};

/// A placed part.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Symbol {
    /// Designator, unique within one sheet (R1, C1, U1)
    pub reference: String,
    /// Logical part family (Device, MCU_RaspberryPi, LED)
    pub library: String,
    pub name: String,
    /// Free text, often with units (100nF 50V, 3.3k)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub footprint: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub fields: BTreeMap<String, String>,
}

impl Symbol {
    pub fn new(
        reference: impl Into<String>,
        library: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            reference: reference.into(),
            library: library.into(),
            name: name.into(),
            value: None,
            footprint: None,
            fields: BTreeMap::new(),
        }
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn with_footprint(mut self, footprint: impl Into<String>) -> Self {
        self.footprint = Some(footprint.into());
        self
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Value text, empty when unset.
    pub fn value_str(&self) -> &str {
        self.value.as_deref().unwrap_or("")
    }

    pub fn field(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }
}

/// Point-to-point connection between two endpoints (`U1.1`, `R1.2` or a bare net name).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wire {
    pub a: String,
    pub b: String,
}

impl Wire {
    pub fn endpoints(&self) -> [&str; 2] {
        [&self.a, &self.b]
    }
}

/// A named group of endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Net {
    pub name: String,
    #[serde(default)]
    pub endpoints: Vec<String>,
}

/// Marks a net as intentionally driven, e.g. `GND` or `VBUS`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PowerFlag {
    pub name: String,
    /// Placement hint in sheet units.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub at: Option<(f64, f64)>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schematic {
    #[serde(default)]
    pub symbols: Vec<Symbol>,
    #[serde(default)]
    pub wires: Vec<Wire>,
    #[serde(default)]
    pub nets: Vec<Net>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub power_flags: Vec<PowerFlag>,
}

impl Schematic {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_symbol(&mut self, symbol: Symbol) {
        self.symbols.push(symbol);
    }

    pub fn add_wire(&mut self, a: impl Into<String>, b: impl Into<String>) {
        self.wires.push(Wire {
            a: a.into(),
            b: b.into(),
        });
    }

    /// Add a logical net made of endpoints such as `["U1.1", "R1.2"]`.
    pub fn add_net<I, S>(&mut self, name: impl Into<String>, endpoints: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.nets.push(Net {
            name: name.into(),
            endpoints: endpoints.into_iter().map(Into::into).collect(),
        });
    }

    pub fn add_power_flag(&mut self, name: impl Into<String>, at: Option<(f64, f64)>) {
        self.power_flags.push(PowerFlag {
            name: name.into(),
            at,
        });
    }

    pub fn add_gnd(&mut self, at: Option<(f64, f64)>) {
        self.add_power_flag("GND", at);
    }

    pub fn find_symbol(&self, reference: &str) -> Option<&Symbol> {
        self.symbols.iter().find(|s| s.reference == reference)
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
            && self.wires.is_empty()
            && self.nets.is_empty()
            && self.power_flags.is_empty()
    }

    /// References that appear on more than one symbol, each reported once.
    pub fn duplicate_references(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        let mut reported = HashSet::new();
        let mut duplicates = Vec::new();
        for symbol in &self.symbols {
            let reference = symbol.reference.as_str();
            if !seen.insert(reference) && reported.insert(reference) {
                duplicates.push(reference);
            }
        }
        duplicates
    }

    /// Named nets followed by bare (pin-less) wire endpoints, first-seen order, no repeats.
    pub fn net_names(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        let named = self.nets.iter().map(|n| n.name.as_str());
        let bare = self
            .wires
            .iter()
            .flat_map(|w| w.endpoints())
            .filter(|e| !e.contains('.'));
        named
            .chain(bare)
            .filter(|name| !name.is_empty() && seen.insert(*name))
            .collect()
    }
}
