use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ErcError;

/// Pseudo-sheet name for signals owned by the graph's own top level.
pub const ROOT_SHEET: &str = "root";

/// Which end of a connection a diagnostic is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConnectionEnd {
    /// Source, the driving end.
    Parent,
    /// Target, the driven end.
    Child,
}

impl ConnectionEnd {
    pub(crate) fn conflict_action(&self) -> &'static str {
        match self {
            ConnectionEnd::Parent => "cannot drive",
            ConnectionEnd::Child => "cannot be driven by",
        }
    }
}

impl fmt::Display for ConnectionEnd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionEnd::Parent => f.write_str("Parent"),
            ConnectionEnd::Child => f.write_str("Child"),
        }
    }
}

/// A resolved-by-name endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ConnectionEndpoint {
    Named { sheet: String, port: String },
    /// A top-level signal of the graph itself (`root.<port>`).
    Root { port: String },
}

impl ConnectionEndpoint {
    /// Split `sheet.port` on the first dot. Port names may contain dots (`power.3.3V_OUT`).
    pub fn parse(qualified: &str) -> Option<Self> {
        let (sheet, port) = qualified.split_once('.')?;
        if sheet.is_empty() || port.is_empty() {
            return None;
        }
        if sheet == ROOT_SHEET {
            return Some(ConnectionEndpoint::Root {
                port: port.to_string(),
            });
        }
        Some(ConnectionEndpoint::Named {
            sheet: sheet.to_string(),
            port: port.to_string(),
        })
    }

    pub fn sheet(&self) -> &str {
        match self {
            ConnectionEndpoint::Named { sheet, .. } => sheet,
            ConnectionEndpoint::Root { .. } => ROOT_SHEET,
        }
    }

    pub fn port(&self) -> &str {
        match self {
            ConnectionEndpoint::Named { port, .. } | ConnectionEndpoint::Root { port } => port,
        }
    }
}

impl fmt::Display for ConnectionEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.sheet(), self.port())
    }
}

/// A recorded `(parent, child)` pair of fully qualified `sheet.port` strings.
///
/// Kept as text so that recording never fails; parsing happens when the
/// hierarchy is validated.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Connection {
    pub parent: String,
    pub child: String,
}

impl Connection {
    pub fn new(parent: impl Into<String>, child: impl Into<String>) -> Self {
        Self {
            parent: parent.into(),
            child: child.into(),
        }
    }

    pub fn endpoints(&self) -> Result<(ConnectionEndpoint, ConnectionEndpoint), ErcError> {
        match (
            ConnectionEndpoint::parse(&self.parent),
            ConnectionEndpoint::parse(&self.child),
        ) {
            (Some(parent), Some(child)) => Ok((parent, child)),
            _ => Err(ErcError::InvalidConnectionFormat {
                parent: self.parent.clone(),
                child: self.child.clone(),
            }),
        }
    }

    pub fn as_pair(&self) -> (String, String) {
        (self.parent.clone(), self.child.clone())
    }
}

impl fmt::Display for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.parent, self.child)
    }
}
