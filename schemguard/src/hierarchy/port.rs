use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ErcError;

/// Direction of a hierarchical pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    In,
    Out,
    InOut,
}

impl Direction {
    pub const ALL: [Direction; 3] = [Direction::In, Direction::Out, Direction::InOut];

    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::In => "in",
            Direction::Out => "out",
            Direction::InOut => "inout",
        }
    }

    /// May sit on the source end of a connection.
    pub fn can_drive(&self) -> bool {
        matches!(self, Direction::Out | Direction::InOut)
    }

    /// May sit on the target end of a connection.
    pub fn can_receive(&self) -> bool {
        matches!(self, Direction::In | Direction::InOut)
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = ErcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "in" => Ok(Direction::In),
            "out" => Ok(Direction::Out),
            "inout" => Ok(Direction::InOut),
            other => Err(ErcError::InvalidDirection {
                value: other.to_string(),
            }),
        }
    }
}

/// A named pin on a sheet boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Port {
    pub name: String,
    pub direction: Direction,
    /// Name of the owning sheet.
    #[serde(skip)]
    pub sheet: String,
}

impl Port {
    /// Fails with `InvalidDirection` unless `direction` is `in`, `out` or `inout`.
    pub fn new(
        name: impl Into<String>,
        direction: &str,
        sheet: impl Into<String>,
    ) -> Result<Self, ErcError> {
        Ok(Self::with_direction(name, direction.parse()?, sheet))
    }

    pub fn with_direction(
        name: impl Into<String>,
        direction: Direction,
        sheet: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            direction,
            sheet: sheet.into(),
        }
    }

    /// `sheet.port`
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.sheet, self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_directions_construct() {
        for text in ["in", "out", "inout"] {
            let port = Port::new("SIG", text, "mcu").expect("valid direction");
            assert_eq!(port.direction.as_str(), text);
            assert_eq!(port.sheet, "mcu");
        }
    }

    #[test]
    fn invalid_direction_is_rejected_at_construction() {
        for text in ["", "IN", "input", "power", "bidirectional", " out"] {
            let err = Port::new("SIG", text, "mcu").unwrap_err();
            assert_eq!(
                err,
                ErcError::InvalidDirection {
                    value: text.to_string()
                }
            );
        }
    }

    #[test]
    fn drive_and_receive_capabilities() {
        assert!(Direction::Out.can_drive());
        assert!(Direction::InOut.can_drive());
        assert!(!Direction::In.can_drive());

        assert!(Direction::In.can_receive());
        assert!(Direction::InOut.can_receive());
        assert!(!Direction::Out.can_receive());
    }

    #[test]
    fn serializes_lowercase() {
        let port = Port::with_direction("I2C_SDA", Direction::InOut, "io");
        let json = serde_json::to_value(&port).unwrap();
        assert_eq!(json, serde_json::json!({"name": "I2C_SDA", "direction": "inout"}));
        assert_eq!(port.qualified_name(), "io.I2C_SDA");
    }
}
