//! Hierarchical schematic model: ports, sheets, connections and the graph that owns them.
//!
//! Builders add sheets and record connections in any order (forward references
//! are fine); nothing is resolved until a validation pass runs over the frozen
//! graph.

pub mod connection;
pub mod graph;
pub mod port;
pub mod sheet;

pub use connection::{Connection, ConnectionEnd, ConnectionEndpoint, ROOT_SHEET};
pub use graph::{HierarchicalSchematic, HierarchyPolicy, SheetId, SignalGroup};
pub use port::{Direction, Port};
pub use sheet::Sheet;
